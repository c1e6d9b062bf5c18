use crate::core_types::{CategoryId, TokenId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReshufflerError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Not all tokens unique: {0:?}")]
    DuplicateTokens(Vec<TokenId>),

    #[error("Token {token} has category {category}, outside of [0, {num_categories})")]
    CategoryOutOfRange {
        token: TokenId,
        category: CategoryId,
        num_categories: usize,
    },

    #[error("Invalid Seed: {0}")]
    InvalidSeed(String),

    #[error("Annealing Schedule Error: {0}")]
    Schedule(String),
}

pub type RsResult<T> = Result<T, ReshufflerError>;
