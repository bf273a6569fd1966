//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Every fatal condition of a metadata build maps to one variant; non-fatal
//! conditions (a malformed production timestamp) are logged and absorbed.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unable to extract attributes from {path}: {reason}")]
    Extraction { path: String, reason: String },

    #[error("No template configuration found for product `{product}`")]
    ConfigNotFound { product: String },

    #[error("Attribute `{attribute}` of product `{product}` has no entry in the attribute mapping")]
    MappingNotFound { product: String, attribute: String },

    #[error("Template for product `{product}` has no platform block `{platform}`")]
    PlatformNotFound { product: String, platform: String },

    #[error("Invalid granule file name `{name}`: {reason}")]
    InvalidFileName { name: String, reason: String },

    #[error("Unable to parse structured metadata: {0}")]
    SpatialParse(String),

    #[error("Reprojection failed: {0}")]
    Reprojection(String),

    #[error("Invalid sensing time `{value}`: {reason}")]
    InvalidTemporalData { value: String, reason: String },

    #[error("Storage write failed for {location}: {reason}")]
    StorageWrite { location: String, reason: String },
}

impl Error {
    pub fn extraction<E: std::fmt::Display>(path: &std::path::Path, e: E) -> Self {
        Error::Extraction {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    }
}
