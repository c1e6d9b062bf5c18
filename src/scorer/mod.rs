pub mod allocation;
pub mod tokens;
pub mod vector;

pub use self::allocation::{Allocation, AllocationKind, AllocationSet, Penalties};
pub use self::tokens::TokenCollection;
pub use self::vector::CategoryVector;
