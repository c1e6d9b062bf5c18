use super::tokens::TokenCollection;
use super::vector::CategoryVector;
use crate::config::PenaltyWeights;
use crate::core_types::{OwnerId, Token, TokenId};
use crate::error::{ReshufflerError, RsResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum_macros::{Display, EnumString};

/// Whether an allocation takes part in scoring.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum AllocationKind {
    #[default]
    Participant,
    /// Unclaimed items. Scores a constant ceiling so it never moves the aggregate bound.
    Pool,
}

/// The three raw penalty terms of an allocation against its reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Penalties {
    /// `hist · hist`, quadratic in per-category concentration.
    pub duplication: u64,
    /// `hist · mask(initial_hist)`, tokens held in categories the owner contributed.
    pub returned_category: u64,
    /// Tokens held whose id the owner contributed.
    pub returned_token: u64,
}

impl Penalties {
    pub fn weighted(&self, weights: &PenaltyWeights) -> f64 {
        weights.weight_duplication * self.duplication as f64
            + weights.weight_returned_category * self.returned_category as f64
            + weights.weight_returned_token * self.returned_token as f64
    }
}

/// One owner's bag of tokens with its cached category histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    owner: OwnerId,
    tokens: Vec<Token>,
    // Always equal to `tokens.num_per_category(width)`.
    histogram: CategoryVector,
    kind: AllocationKind,
}

impl Allocation {
    /// Builds a participant allocation, rejecting categories outside `[0, num_categories)`.
    pub fn new(
        owner: impl Into<OwnerId>,
        tokens: Vec<Token>,
        num_categories: usize,
    ) -> RsResult<Self> {
        if let Some(t) = tokens.iter().find(|t| t.category >= num_categories) {
            return Err(ReshufflerError::CategoryOutOfRange {
                token: t.id,
                category: t.category,
                num_categories,
            });
        }

        let histogram = tokens.num_per_category(num_categories);
        Ok(Self {
            owner: owner.into(),
            tokens,
            histogram,
            kind: AllocationKind::Participant,
        })
    }

    /// Marks this allocation as the pool. Consumes `self` so the flag is fixed
    /// before the allocation enters a search.
    pub fn into_pool(mut self) -> Self {
        self.kind = AllocationKind::Pool;
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Cached histogram of tokens per category.
    #[inline(always)]
    pub fn histogram(&self) -> &CategoryVector {
        &self.histogram
    }

    pub fn kind(&self) -> AllocationKind {
        self.kind
    }

    #[inline(always)]
    pub fn is_pool(&self) -> bool {
        self.kind == AllocationKind::Pool
    }

    /// Width of the category space this allocation was built for.
    pub fn width(&self) -> usize {
        self.histogram.width()
    }

    pub fn penalties(&self, initial: &Allocation) -> Penalties {
        let c = &self.histogram;
        let i = &initial.histogram;
        Penalties {
            duplication: c.smul(c),
            returned_category: c.smul(&i.mask()),
            returned_token: self.num_same_id(&initial.tokens) as u64,
        }
    }

    /// Score against the reference allocation, higher is better.
    pub fn score(&self, initial: &Allocation, weights: &PenaltyWeights) -> f64 {
        if self.is_pool() {
            return -(self.tokens.len() as f64);
        }
        -self.penalties(initial).weighted(weights)
    }

    /// Best score any allocation of this size could reach: one token per
    /// category and nothing returned.
    pub fn score_ceiling(&self, weights: &PenaltyWeights) -> f64 {
        let n = self.tokens.len() as f64;
        if self.is_pool() {
            -n
        } else {
            -weights.weight_duplication * n
        }
    }

    /// Swaps `self.tokens[own_index]` with `other.tokens[other_index]`,
    /// updating both histograms in place.
    pub fn exchange_tokens(&mut self, other: &mut Allocation, own_index: usize, other_index: usize) {
        let outgoing = self.tokens[own_index].category;
        let incoming = other.tokens[other_index].category;

        self.histogram.decrement(outgoing);
        other.histogram.increment(outgoing);

        other.histogram.decrement(incoming);
        self.histogram.increment(incoming);

        std::mem::swap(&mut self.tokens[own_index], &mut other.tokens[other_index]);
    }
}

impl TokenCollection for Allocation {
    fn as_tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn num_per_category(&self, width: usize) -> CategoryVector {
        if width == self.histogram.width() {
            return self.histogram.clone();
        }
        self.tokens.num_per_category(width)
    }
}

impl AsRef<Allocation> for Allocation {
    fn as_ref(&self) -> &Allocation {
        self
    }
}

/// Operations over an ordered list of allocations.
pub trait AllocationSet {
    fn num_tokens(&self) -> usize;

    /// Aggregate histogram across all allocations.
    fn num_per_category(&self, width: usize) -> CategoryVector;

    /// Sum of `self[i].score(initial[i])`.
    fn score_against<I: AsRef<Allocation>>(&self, initial: &[I], weights: &PenaltyWeights) -> f64;

    fn avg_variability(&self) -> f64;

    /// Token ids seen more than once, in order of their repeated appearance.
    fn duplicate_token_ids(&self) -> Vec<TokenId>;
}

impl<A: AsRef<Allocation>> AllocationSet for [A] {
    fn num_tokens(&self) -> usize {
        self.iter().map(|a| a.as_ref().tokens.len()).sum()
    }

    fn num_per_category(&self, width: usize) -> CategoryVector {
        self.iter().fold(CategoryVector::zeros(width), |acc, a| {
            acc.add(&a.as_ref().num_per_category(width))
        })
    }

    fn score_against<I: AsRef<Allocation>>(&self, initial: &[I], weights: &PenaltyWeights) -> f64 {
        self.iter()
            .zip(initial)
            .map(|(c, i)| c.as_ref().score(i.as_ref(), weights))
            .sum()
    }

    fn avg_variability(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .iter()
            .map(|a| {
                let a = a.as_ref();
                a.variability(a.width())
            })
            .sum();
        total / self.len() as f64
    }

    fn duplicate_token_ids(&self) -> Vec<TokenId> {
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for a in self {
            for t in &a.as_ref().tokens {
                if !seen.insert(t.id) {
                    dupes.push(t.id);
                }
            }
        }
        dupes
    }
}
