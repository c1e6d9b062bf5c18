pub mod config;
pub mod consts;
pub mod core_types;
pub mod error;
pub mod export;
pub mod loader;
pub mod optimizer;
pub mod scorer;
pub mod seed;
pub mod verifier;
