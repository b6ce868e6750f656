//! Shared types for Karmicup

pub mod error;

pub use error::{KarmaError, Result};
