//! Error types for jetmet

use thiserror::Error;

/// jetmet error type
#[derive(Error, Debug)]
pub enum Error {
    /// Supplied capability does not satisfy the lookup contract
    #[error("{name} is not a usable scale-factor lookup: {reason}")]
    TypeMismatch {
        /// Identifier the capability was registered under.
        name: String,
        /// What the capability is missing.
        reason: String,
    },

    /// Corrector identifier is not `<campaign>_<era>_<datatype>_<level>_<jettype>`
    #[error("Corrector name {0:?} is not properly formatted!")]
    Format(String),

    /// Two correctors disagree on a shared metadata field
    #[error("Corrector for {found} is mixed with correctors for {expected} ({field})")]
    InconsistentMetadata {
        /// Field name (campaign, data era, data type, jet type).
        field: &'static str,
        /// Value established by earlier correctors.
        expected: String,
        /// Conflicting value.
        found: String,
    },

    /// A shared metadata field was never established
    #[error("Unable to determine {0} of JER scale factors!")]
    MissingMetadata(&'static str),

    /// No correctors supplied
    #[error("No levels provided?")]
    EmptyPipeline,

    /// Level name matches the level pattern more than once
    #[error("Malformed JERSF level name: {0}")]
    MalformedLevelName(String),

    /// Level name is not in the level catalog
    #[error("Unrecognized JERSF level: {0}")]
    UnrecognizedLevel(String),

    /// Input column is not one of the recognized array backends
    #[error("Unknown array library for inputs: {0}")]
    UnsupportedArrayBackend(String),

    /// Query did not supply a required input
    #[error("Missing input {name:?} required by {label}")]
    MissingInput {
        /// Input name from the lookup signature.
        name: String,
        /// Label of the corrector that needed it.
        label: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
