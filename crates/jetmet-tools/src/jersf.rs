//! Columnar jet energy resolution scale factors.
//!
//! [`JetResolutionScaleFactor`] chains the per-level lookups of one
//! campaign/era/datatype/jet-type into a single correction and evaluates the
//! scale factor at the highest available level.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jetmet_core::{Column, Error, Result, ScaleFactorLookup};
use serde::{Deserialize, Serialize};

use crate::level::{self, LEVEL_ORDER};
use crate::naming::{CorrectorIdentifier, SharedMetadata};
use crate::signature::aggregate_signature;

/// One named lookup inside a pipeline.
#[derive(Clone)]
pub struct CorrectorEntry {
    identifier: CorrectorIdentifier,
    lookup: Arc<dyn ScaleFactorLookup>,
}

impl CorrectorEntry {
    /// Parsed identifier.
    pub fn identifier(&self) -> &CorrectorIdentifier {
        &self.identifier
    }

    /// The lookup evaluated for this level.
    pub fn lookup(&self) -> &Arc<dyn ScaleFactorLookup> {
        &self.lookup
    }
}

impl fmt::Debug for CorrectorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectorEntry")
            .field("identifier", &self.identifier)
            .field("signature", &self.lookup.signature())
            .finish()
    }
}

/// Serializable description of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Production campaign.
    pub campaign: String,
    /// Data era.
    pub data_era: String,
    /// Data type (`MC` or `DATA`).
    pub data_type: String,
    /// Jet collection.
    pub jet_type: String,
    /// Level fields in evaluation order.
    pub levels: Vec<String>,
    /// Aggregated input signature.
    pub signature: Vec<String>,
}

impl PipelineSummary {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Jet energy resolution scale factor built from named per-level lookups.
///
/// Names must be formatted as `<campaign>_<dataera>_<datatype>_<level>_<jettype>`.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use jetmet_core::{Column, EagerArray, ScaleFactorLookup};
/// use jetmet_tools::{BinnedScaleFactor, JetResolutionScaleFactor, Variation};
///
/// let sf = BinnedScaleFactor::new(
///     "JetEta",
///     vec![-5.0, 0.0, 5.0],
///     vec![(1.1, 1.0, 1.2), (1.2, 1.1, 1.3)],
///     Variation::Central,
/// )
/// .unwrap();
/// let jersf = JetResolutionScaleFactor::new(vec![(
///     "Summer19UL18_JRV2_MC_SF_AK4PFchs".to_string(),
///     Arc::new(sf) as Arc<dyn ScaleFactorLookup>,
/// )])
/// .unwrap();
/// assert_eq!(jersf.signature(), ["JetEta"]);
///
/// let inputs = HashMap::from([(
///     "JetEta".to_string(),
///     Column::from(EagerArray::new(vec![-1.0, 2.5])),
/// )]);
/// let out = jersf.get_scale_factor(&inputs).unwrap();
/// assert_eq!(out.flat_values(), Some(&[1.1, 1.2][..]));
/// ```
#[derive(Debug, Clone)]
pub struct JetResolutionScaleFactor {
    campaign: String,
    data_era: String,
    data_type: String,
    jet_type: String,
    entries: Vec<CorrectorEntry>,
    signature: Vec<String>,
}

impl JetResolutionScaleFactor {
    /// Build a pipeline from `(name, lookup)` pairs.
    ///
    /// Validation is eager: a pipeline is either fully consistent or not
    /// constructed at all.
    pub fn new<I>(correctors: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Arc<dyn ScaleFactorLookup>)>,
    {
        let mut meta = SharedMetadata::new();
        let mut entries = Vec::new();

        for (name, lookup) in correctors {
            check_contract(&name, lookup.as_ref())?;
            let identifier = CorrectorIdentifier::parse(&name)?;
            meta.check(&identifier)?;
            entries.push(CorrectorEntry { identifier, lookup });
        }

        if entries.is_empty() {
            return Err(Error::EmptyPipeline);
        }
        let agreed = meta.finish()?;

        level::reorder_by_level(&mut entries, |e| e.identifier.level_code.as_str())?;
        warn_on_shared_levels(&entries);

        let signature = aggregate_signature(entries.iter().map(|e| e.lookup.signature()));

        let out = Self {
            campaign: agreed.campaign,
            data_era: agreed.data_era,
            data_type: agreed.data_type,
            jet_type: agreed.jet_type,
            entries,
            signature,
        };
        log::debug!(
            "built JER scale factor {}-{}-{}-{}: levels [{}], signature ({})",
            out.campaign,
            out.data_era,
            out.data_type,
            out.jet_type,
            out.levels().join(","),
            out.signature.join(",")
        );
        Ok(out)
    }

    /// List the jet properties that must be input to this function.
    pub fn signature(&self) -> &[String] {
        &self.signature
    }

    /// Production campaign.
    pub fn campaign(&self) -> &str {
        &self.campaign
    }

    /// Data era.
    pub fn data_era(&self) -> &str {
        &self.data_era
    }

    /// Data type.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Jet collection.
    pub fn jet_type(&self) -> &str {
        &self.jet_type
    }

    /// Level fields in evaluation order.
    pub fn levels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.identifier.level_code.as_str()).collect()
    }

    /// Entries in evaluation order.
    pub fn entries(&self) -> &[CorrectorEntry] {
        &self.entries
    }

    /// Serializable description.
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            campaign: self.campaign.clone(),
            data_era: self.data_era.clone(),
            data_type: self.data_type.clone(),
            jet_type: self.jet_type.clone(),
            levels: self.levels().into_iter().map(String::from).collect(),
            signature: self.signature.clone(),
        }
    }

    /// Scale factors for all input jets at the highest available level.
    ///
    /// Every name in each lookup's own signature must be present in `inputs`.
    pub fn get_scale_factor(&self, inputs: &HashMap<String, Column>) -> Result<Column> {
        self.get_scale_factor_with(|name| inputs.get(name))
    }

    /// Like [`get_scale_factor`](Self::get_scale_factor), resolving inputs
    /// through `resolve` instead of a map.
    pub fn get_scale_factor_with<'a, F>(&self, resolve: F) -> Result<Column>
    where
        F: Fn(&str) -> Option<&'a Column>,
    {
        let mut last = None;
        for entry in &self.entries {
            let label = entry.identifier.label();
            let args = entry
                .lookup
                .signature()
                .iter()
                .map(|name| {
                    resolve(name.as_str()).ok_or_else(|| Error::MissingInput {
                        name: name.clone(),
                        label: label.clone(),
                    })
                })
                .collect::<Result<Vec<&Column>>>()?;

            let first = args.first().ok_or_else(|| Error::TypeMismatch {
                name: entry.identifier.to_string(),
                reason: "signature is empty".into(),
            })?;
            match first.backend() {
                Some(backend) => {
                    log::trace!("evaluating {label} on {backend} inputs");
                    last = Some(entry.lookup.evaluate(&args, Some(label.as_str()))?);
                }
                None => return Err(Error::UnsupportedArrayBackend(first.kind_name().to_string())),
            }
        }
        last.ok_or(Error::EmptyPipeline)
    }
}

impl fmt::Display for JetResolutionScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "campaign   : {}", self.campaign)?;
        writeln!(f, "data era   : {}", self.data_era)?;
        writeln!(f, "data type  : {}", self.data_type)?;
        writeln!(f, "jet type   : {}", self.jet_type)?;
        writeln!(f, "levels     : {}", self.levels().join(","))?;
        writeln!(f, "signature  : ({})", self.signature.join(","))
    }
}

fn check_contract(name: &str, lookup: &dyn ScaleFactorLookup) -> Result<()> {
    let sig = lookup.signature();
    if sig.is_empty() {
        return Err(Error::TypeMismatch {
            name: name.to_string(),
            reason: "signature is empty".into(),
        });
    }
    if sig.iter().any(|s| s.is_empty()) {
        return Err(Error::TypeMismatch {
            name: name.to_string(),
            reason: "signature contains an empty input name".into(),
        });
    }
    Ok(())
}

fn warn_on_shared_levels(entries: &[CorrectorEntry]) {
    let mut seen = vec![0usize; LEVEL_ORDER.len()];
    for e in entries {
        if let Ok(idx) = level::level_index(&e.identifier.level_code) {
            seen[idx] += 1;
        }
    }
    for (level, n) in LEVEL_ORDER.iter().zip(seen) {
        if n > 1 {
            log::warn!(
                "{n} correctors share JERSF level {level}; evaluation order follows swap order"
            );
        }
    }
}
