//! Core traits for jetmet
//!
//! Pipelines only talk to calibration constants through [`ScaleFactorLookup`],
//! so the binning, interpolation and storage format of a lookup stay behind
//! this seam.

use crate::{Column, Result};

/// A single calibration lookup: an ordered input signature plus evaluation.
pub trait ScaleFactorLookup: Send + Sync {
    /// Ordered names of the inputs `evaluate` expects.
    fn signature(&self) -> &[String];

    /// Evaluate on positional arguments matching [`signature`](Self::signature).
    ///
    /// `label` is a human-readable tag for deferred task graphs; eager
    /// implementations may ignore it.
    fn evaluate(&self, args: &[&Column], label: Option<&str>) -> Result<Column>;
}
