pub mod attrs;
pub mod error;

pub use error::{Result, StateError};
