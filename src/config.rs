use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Settings of a metadata run, suitable for a JSON config file.
/// Missing keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorConfig {
    /// Directory holding `<product>.json` and `<product>_attribute_mapping.json`
    pub template_dir: PathBuf,
    /// Archive bucket for uploads and online-resource URLs
    pub bucket: String,
    /// Platform block used when the file carries no spacecraft name
    pub default_platform: String,
    /// Suffix replacing the source extension in output names
    pub metadata_suffix: String,
    /// Populate OnlineAccessURLs/OnlineResources/AssociatedBrowseImageURLs
    pub online_resources: bool,
    /// Custom S3 endpoint (e.g. MinIO); AWS when unset
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
}

impl Default for CreatorConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("templates"),
            bucket: "hls-global".to_string(),
            default_platform: "LANDSAT-8".to_string(),
            metadata_suffix: "cmr.xml".to_string(),
            online_resources: false,
            s3_endpoint: None,
            s3_region: "us-west-2".to_string(),
        }
    }
}

impl CreatorConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
