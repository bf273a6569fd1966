use std::path::Path;

use crate::error::{Error, Result};

/// Identifiers derived from an HLS granule file name such as
/// `HLS.L30.T17SLU.2020117T160901.v1.5.hdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranuleName {
    pub file_name: String,
    /// Second `.`-delimited segment (`L30`).
    pub product: String,
    /// File name without its extension (`HLS.L30.T17SLU.2020117T160901.v1.5`).
    pub granule_ur: String,
    /// File name without the version and extension (`HLS.L30.T17SLU.2020117T160901`).
    pub producer_granule_id: String,
    /// Version without its `v` prefix (`1.5`).
    pub local_version_id: String,
    /// Extension (`hdf`).
    pub data_format: String,
}

impl GranuleName {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidFileName {
                name: path.display().to_string(),
                reason: "path has no UTF-8 file name".to_string(),
            })?;
        Self::parse(file_name)
    }

    pub fn parse(file_name: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidFileName {
            name: file_name.to_string(),
            reason: reason.to_string(),
        };

        let (stem, ext) = file_name
            .rsplit_once('.')
            .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
            .ok_or_else(|| invalid("missing extension"))?;

        let product = file_name
            .split('.')
            .nth(1)
            .filter(|p| !p.is_empty() && *p != ext)
            .ok_or_else(|| invalid("missing product segment"))?;

        let (producer_granule_id, version) = stem
            .rsplit_once(".v")
            .filter(|(id, version)| !id.is_empty() && !version.is_empty())
            .ok_or_else(|| invalid("missing `.v<version>` suffix"))?;

        Ok(GranuleName {
            file_name: file_name.to_string(),
            product: product.to_string(),
            granule_ur: stem.to_string(),
            producer_granule_id: producer_granule_id.to_string(),
            local_version_id: version.to_string(),
            data_format: ext.to_string(),
        })
    }

    /// Default output name: the extension swapped for `suffix` (e.g. `cmr.xml`).
    pub fn metadata_name(&self, suffix: &str) -> String {
        format!("{}.{}", self.granule_ur, suffix)
    }
}
