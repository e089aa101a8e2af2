pub mod builder;
pub mod error;
pub mod handlers;
pub mod types;
pub mod validator;

pub use builder::*;
pub use error::*;
pub use handlers::*;
pub use types::*;
pub use validator::*;
