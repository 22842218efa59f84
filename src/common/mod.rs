//! Common types, traits, and error definitions for koules_dynamics
//!
//! This module provides the foundational building blocks shared by the
//! dynamics core and the planners that drive it.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
