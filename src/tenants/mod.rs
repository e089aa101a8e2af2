pub mod error;
pub mod registry;
pub mod types;

pub use error::*;
pub use registry::*;
pub use types::*;
