//! JersfBuilder: collects named lookups and assembles a pipeline.

use std::sync::Arc;

use jetmet_core::{Result, ScaleFactorLookup};

use crate::jersf::JetResolutionScaleFactor;

/// Builder for [`JetResolutionScaleFactor`].
///
/// # Example
///
/// ```
/// use jetmet_tools::{BinnedScaleFactor, JersfBuilder, Variation};
///
/// let central = BinnedScaleFactor::new(
///     "JetEta",
///     vec![0.0, 1.3, 5.0],
///     vec![(1.12, 1.08, 1.16), (1.14, 1.09, 1.19)],
///     Variation::Central,
/// )
/// .unwrap();
///
/// let jersf = JersfBuilder::new()
///     .add("Summer19UL18_JRV2_MC_SF_AK4PFchs", central)
///     .build()
///     .unwrap();
/// assert_eq!(jersf.jet_type(), "AK4PFchs");
/// ```
#[derive(Default)]
pub struct JersfBuilder {
    correctors: Vec<(String, Arc<dyn ScaleFactorLookup>)>,
}

impl JersfBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lookup under `name`.
    pub fn add(
        mut self,
        name: impl Into<String>,
        lookup: impl ScaleFactorLookup + 'static,
    ) -> Self {
        self.correctors.push((name.into(), Arc::new(lookup)));
        self
    }

    /// Add an already shared lookup under `name`.
    pub fn add_shared(
        mut self,
        name: impl Into<String>,
        lookup: Arc<dyn ScaleFactorLookup>,
    ) -> Self {
        self.correctors.push((name.into(), lookup));
        self
    }

    /// Validate and build the pipeline.
    pub fn build(self) -> Result<JetResolutionScaleFactor> {
        JetResolutionScaleFactor::new(self.correctors)
    }
}
