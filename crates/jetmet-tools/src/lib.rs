//! # jetmet-tools
//!
//! Columnar jet energy resolution (JER) scale factors.
//!
//! A [`JetResolutionScaleFactor`] is assembled from lookups named
//! `<campaign>_<dataera>_<datatype>_<level>_<jettype>`. Construction checks
//! that every lookup belongs to the same campaign, era, data type and jet
//! collection, orders them by calibration level and merges their input
//! signatures. Queries evaluate each level on eager, jagged or lazy columns
//! and return the highest level's scale factor.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod jersf;
pub mod level;
pub mod lookup;
pub mod naming;
pub mod signature;

pub use builder::JersfBuilder;
pub use jersf::{CorrectorEntry, JetResolutionScaleFactor, PipelineSummary};
pub use level::LEVEL_ORDER;
pub use lookup::{BinnedScaleFactor, Variation};
pub use naming::CorrectorIdentifier;
