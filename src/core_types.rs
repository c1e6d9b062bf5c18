use serde::{Deserialize, Serialize};

/// Globally unique identifier of a token.
pub type TokenId = i64;

/// Index of a category (project), always in `[0, num_categories)`.
pub type CategoryId = usize;

/// Opaque identity of an owner, e.g. a hex wallet address.
pub type OwnerId = String;

/// An immutable, identity-bearing item tagged with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub category: CategoryId,
}

impl Token {
    pub fn new(id: TokenId, category: CategoryId) -> Self {
        Self { id, category }
    }
}

/// Mints sequential synthetic token ids for fixtures.
/// Owned by the caller so independent fixtures never share a counter.
#[derive(Debug, Default, Clone)]
pub struct TokenIdGenerator {
    next: TokenId,
}

impl TokenIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: TokenId) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> TokenId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Builds one token per category id, with fresh sequential ids.
    pub fn tokens_from_categories(&mut self, categories: &[CategoryId]) -> Vec<Token> {
        categories
            .iter()
            .map(|&category| Token::new(self.next_id(), category))
            .collect()
    }
}
