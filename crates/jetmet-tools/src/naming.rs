//! Corrector identifiers: `<campaign>_<dataera>_<datatype>_<level>_<jettype>`.

use std::fmt;

use jetmet_core::{Error, Result};

/// Metadata encoded in a corrector identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectorIdentifier {
    /// Production campaign, e.g. `Summer19UL18`.
    pub campaign: String,
    /// Data era, e.g. `JRV2`.
    pub data_era: String,
    /// `MC` or `DATA`.
    pub data_type: String,
    /// Raw level field; the canonical level is extracted by [`crate::level`].
    pub level_code: String,
    /// Jet collection, e.g. `AK4PFchs`.
    pub jet_type: String,
}

impl CorrectorIdentifier {
    /// Split `name` on `_` into exactly five non-empty fields.
    pub fn parse(name: &str) -> Result<Self> {
        let info: Vec<&str> = name.split('_').collect();
        if info.len() != 5 || info.iter().any(|f| f.is_empty()) {
            return Err(Error::Format(name.to_string()));
        }
        Ok(Self {
            campaign: info[0].to_string(),
            data_era: info[1].to_string(),
            data_type: info[2].to_string(),
            level_code: info[3].to_string(),
            jet_type: info[4].to_string(),
        })
    }

    /// Dash-joined label handed to lookups for task-graph introspection.
    pub fn label(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.campaign, self.data_era, self.data_type, self.level_code, self.jet_type
        )
    }
}

impl fmt::Display for CorrectorIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}",
            self.campaign, self.data_era, self.data_type, self.level_code, self.jet_type
        )
    }
}

/// Running agreement check for one shared metadata field.
#[derive(Debug)]
pub(crate) struct SharedField {
    field: &'static str,
    value: Option<String>,
}

impl SharedField {
    pub(crate) fn new(field: &'static str) -> Self {
        Self { field, value: None }
    }

    /// Adopt `value` if unset, otherwise require equality.
    pub(crate) fn check(&mut self, value: &str) -> Result<()> {
        match &self.value {
            None => {
                self.value = Some(value.to_string());
                Ok(())
            }
            Some(expected) if expected == value => Ok(()),
            Some(expected) => Err(Error::InconsistentMetadata {
                field: self.field,
                expected: expected.clone(),
                found: value.to_string(),
            }),
        }
    }

    pub(crate) fn into_value(self) -> Result<String> {
        self.value.ok_or(Error::MissingMetadata(self.field))
    }
}

/// The four fields every corrector in a pipeline must agree on.
#[derive(Debug)]
pub(crate) struct SharedMetadata {
    campaign: SharedField,
    data_era: SharedField,
    data_type: SharedField,
    jet_type: SharedField,
}

/// Values agreed on by all correctors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AgreedMetadata {
    pub(crate) campaign: String,
    pub(crate) data_era: String,
    pub(crate) data_type: String,
    pub(crate) jet_type: String,
}

impl SharedMetadata {
    pub(crate) fn new() -> Self {
        Self {
            campaign: SharedField::new("production campaign"),
            data_era: SharedField::new("data era"),
            data_type: SharedField::new("data type"),
            jet_type: SharedField::new("jet type"),
        }
    }

    pub(crate) fn check(&mut self, id: &CorrectorIdentifier) -> Result<()> {
        self.campaign.check(&id.campaign)?;
        self.data_era.check(&id.data_era)?;
        self.data_type.check(&id.data_type)?;
        self.jet_type.check(&id.jet_type)
    }

    pub(crate) fn finish(self) -> Result<AgreedMetadata> {
        Ok(AgreedMetadata {
            campaign: self.campaign.into_value()?,
            data_era: self.data_era.into_value()?,
            data_type: self.data_type.into_value()?,
            jet_type: self.jet_type.into_value()?,
        })
    }
}
