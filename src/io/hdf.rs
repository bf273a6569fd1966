use gdal::{Dataset, Metadata};
use std::path::Path;
use tracing::{debug, warn};

use crate::core::assembler::STRUCT_METADATA;
use crate::core::struct_metadata::GridCorners;
use crate::error::{Error, Result};
use crate::io::attributes::{AttributeSource, AttributeValue, RawAttributeSet};

const SUBDATASETS_DOMAIN: &str = "SUBDATASETS";
const FIRST_SUBDATASET: &str = "SUBDATASET_1_NAME";

/// Extracts global file attributes through GDAL's HDF4 driver.
///
/// GDAL exposes HDF4 global attributes as `KEY=VALUE` entries of the
/// default metadata domain. Values may themselves contain `=`, so only the
/// first one splits.
///
/// The HDF-EOS driver consumes `StructMetadata.N` itself and leaves it out
/// of that domain. When it is missing, the grid corners are read from the
/// first `HDF4_EOS:EOS_GRID` subdataset and stored under
/// `StructMetadata.0` as corner statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalAttributeSource;

impl AttributeSource for GdalAttributeSource {
    fn extract(&self, path: &Path) -> Result<RawAttributeSet> {
        if !path.is_file() {
            return Err(Error::extraction(path, "file does not exist"));
        }
        let dataset = Dataset::open(path).map_err(|e| Error::extraction(path, e))?;
        let entries = dataset
            .metadata_domain("")
            .ok_or_else(|| Error::extraction(path, "no global attributes found"))?;

        let mut attrs: RawAttributeSet = parse_metadata_entries(&entries).collect();
        if !attrs.contains(STRUCT_METADATA) {
            match grid_corners(&dataset) {
                Ok(Some(corners)) => attrs.insert(STRUCT_METADATA, corners.to_string()),
                Ok(None) => debug!("No grid subdataset in {:?}", path),
                Err(e) => warn!("Unable to read grid corners of {:?}: {}", path, e),
            }
        }
        debug!("Extracted {} attributes from {:?}", attrs.len(), path);
        Ok(attrs)
    }
}

/// Corners of the first subdataset, from its geotransform and raster size.
fn grid_corners(dataset: &Dataset) -> gdal::errors::Result<Option<GridCorners>> {
    let Some(name) = dataset.metadata_item(FIRST_SUBDATASET, SUBDATASETS_DOMAIN) else {
        return Ok(None);
    };
    let grid = Dataset::open(Path::new(&name))?;
    let gt = grid.geo_transform()?;
    Ok(Some(GridCorners::from_geo_transform(gt, grid.raster_size())))
}

fn parse_metadata_entries(entries: &[String]) -> impl Iterator<Item = (String, AttributeValue)> + '_ {
    entries.iter().filter_map(|entry| {
        entry
            .split_once('=')
            .map(|(key, val)| (key.to_string(), AttributeValue::Text(val.to_string())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals_only() {
        let entries = vec![
            "SENSING_TIME=2021-06-01T11:59:00Z".to_string(),
            "StructMetadata.0=GROUP=GridStructure\n\tEND_GROUP=GridStructure".to_string(),
            "garbage without separator".to_string(),
        ];
        let attrs: RawAttributeSet = parse_metadata_entries(&entries).collect();
        assert_eq!(attrs.len(), 2);
        assert_eq!(
            attrs.text("StructMetadata.0").as_deref(),
            Some("GROUP=GridStructure\n\tEND_GROUP=GridStructure")
        );
    }

    #[test]
    fn missing_file_is_extraction_error() {
        let err = GdalAttributeSource
            .extract(Path::new("/nonexistent/HLS.L30.T17SLU.2020117T160901.v1.5.hdf"))
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
