//! Parameters, line searches and the optimizer interface.

pub mod backtracking;
pub mod callback;
pub mod line_search;
pub mod more_thuente;
pub mod optimizer;
pub mod orthantwise;
pub mod params;
pub mod path;

// Re-export optimization components
pub use backtracking::*;
pub use callback::*;
pub use line_search::*;
pub use more_thuente::MoreThuente;
pub use optimizer::*;
pub use orthantwise::*;
pub use params::*;
pub use path::*;
