//! Scalar types, return codes and the evaluation contract.

pub mod error;
pub mod evaluation;
pub mod types;

// Re-export core types
pub use error::*;
pub use evaluation::*;
pub use types::*;
