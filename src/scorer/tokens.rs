use super::vector::CategoryVector;
use crate::core_types::{CategoryId, Token, TokenId};
use fastrand::Rng;
use std::collections::HashSet;

/// Aggregate operations over a list of tokens.
///
/// Histogram based operations take the category width explicitly since a bare
/// token list does not know how many categories the run uses.
pub trait TokenCollection {
    fn as_tokens(&self) -> &[Token];

    fn num_tokens(&self) -> usize {
        self.as_tokens().len()
    }

    /// Histogram of tokens per category.
    fn num_per_category(&self, width: usize) -> CategoryVector {
        let mut hist = CategoryVector::zeros(width);
        for t in self.as_tokens() {
            hist.increment(t.category);
        }
        hist
    }

    /// Number of distinct categories present.
    fn num_categories(&self, width: usize) -> usize {
        self.num_per_category(width).num_nonzero()
    }

    /// Number of tokens whose category is one of `categories`.
    fn num_in_categories(&self, categories: &[CategoryId]) -> usize {
        self.as_tokens()
            .iter()
            .filter(|t| categories.contains(&t.category))
            .count()
    }

    /// Size of the intersection of the token id sets of both lists.
    fn num_same_id(&self, other: &[Token]) -> usize {
        let seen: HashSet<TokenId> = self.as_tokens().iter().map(|t| t.id).collect();
        other.iter().filter(|t| seen.contains(&t.id)).count()
    }

    /// Number of tokens whose category is also present in `other`.
    fn num_in_same_categories(&self, other: &[Token], width: usize) -> u64 {
        self.num_per_category(width)
            .num_overlapping(&other.num_per_category(width))
    }

    /// Number of tokens beyond the first one in each category.
    fn num_in_duplicate_categories(&self, width: usize) -> u64 {
        self.num_per_category(width).num_excess()
    }

    /// Distinct categories over total tokens; 0 for an empty list.
    fn variability(&self, width: usize) -> f64 {
        let n = self.num_tokens();
        if n == 0 {
            return 0.0;
        }
        self.num_categories(width) as f64 / n as f64
    }

    /// Uniform index in `[0, num_tokens())`.
    fn draw_random_token_index(&self, rng: &mut Rng) -> usize {
        rng.usize(0..self.num_tokens())
    }
}

impl TokenCollection for [Token] {
    fn as_tokens(&self) -> &[Token] {
        self
    }
}

impl TokenCollection for Vec<Token> {
    fn as_tokens(&self) -> &[Token] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::TokenIdGenerator;

    #[test]
    fn test_num_same_id() {
        let a = vec![Token::new(1, 0), Token::new(2, 0), Token::new(3, 1)];
        let b = vec![Token::new(3, 1), Token::new(4, 2), Token::new(1, 0)];
        assert_eq!(a.num_same_id(&b), 2);
        assert_eq!(b.num_same_id(&a), 2);
    }

    #[test]
    fn test_category_statistics() {
        let mut ids = TokenIdGenerator::new();
        let ts = ids.tokens_from_categories(&[0, 0, 0, 1, 2]);

        assert_eq!(ts.num_per_category(4), CategoryVector::from_counts(vec![3, 1, 1, 0]));
        assert_eq!(ts.num_in_duplicate_categories(4), 2);
        assert_eq!(ts.num_categories(4), 3);
        assert!((ts.variability(4) - 0.6).abs() < 1e-12);

        let other = ids.tokens_from_categories(&[0, 3]);
        assert_eq!(ts.num_in_same_categories(&other, 4), 3);
        assert_eq!(other.num_in_same_categories(&ts, 4), 1);
    }

    #[test]
    fn test_num_in_categories() {
        let ts = TokenIdGenerator::new().tokens_from_categories(&[11, 3, 17, 11, 19, 20]);
        assert_eq!(ts.num_in_categories(&[11, 17, 19]), 4);
        assert_eq!(ts.num_in_categories(&[11, 11]), 2);
        assert_eq!(ts.num_in_categories(&[]), 0);
    }

    #[test]
    fn test_empty_variability_is_zero() {
        let ts: Vec<Token> = Vec::new();
        assert_eq!(ts.variability(3), 0.0);
    }

    #[test]
    fn test_generators_are_independent() {
        let mut a = TokenIdGenerator::new();
        let mut b = TokenIdGenerator::new();
        assert_eq!(a.tokens_from_categories(&[1, 2])[0].id, 0);
        assert_eq!(b.tokens_from_categories(&[1])[0].id, 0);
        assert_eq!(a.next_id(), 2);
    }

    #[test]
    fn test_draw_random_token_index_in_range() {
        let ts = TokenIdGenerator::new().tokens_from_categories(&[0, 1, 2]);
        let mut rng = Rng::with_seed(7);
        for _ in 0..100 {
            assert!(ts.draw_random_token_index(&mut rng) < 3);
        }
    }
}
