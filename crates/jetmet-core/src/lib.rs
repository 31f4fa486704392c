//! # jetmet-core
//!
//! Shared vocabulary for the jetmet calibration crates: the error type, the
//! [`ScaleFactorLookup`] capability trait and the [`Column`] representations
//! lookups are evaluated on.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::ScaleFactorLookup;
pub use types::{ArrayBackend, Column, EagerArray, JaggedArray, LazyArray};
