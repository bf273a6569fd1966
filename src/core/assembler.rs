//! Metadata assembler: turns one granule file into a finished
//! `MetadataDocument`.
//!
//! A build runs fixed phases in order (extract, template merge, attribute
//! resolution, granule info, temporal, spatial). Any failure aborts the
//! build; no partially populated document ever leaves this module.
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::core::granule_name::GranuleName;
use crate::core::online::OnlineLocations;
use crate::core::reproject::reproject_bounds;
use crate::core::struct_metadata::StructMetadata;
use crate::error::{Error, Result};
use crate::io::attributes::{AttributeSource, RawAttributeSet};
use crate::io::templates::{ProductConfig, TemplateRegistry};
use crate::types::{
    AdditionalAttribute, BoundingRectangle, Collection, DataGranule, MetadataDocument, Temporal,
    DAY_NIGHT_FLAG, NOT_AVAILABLE, TIMESTAMP_FORMAT,
};

/// File attribute naming the spacecraft (selects the template platform block).
pub const SPACECRAFT_NAME: &str = "SPACECRAFT_NAME";
/// File attribute holding the processing time.
pub const PROCESSING_TIME: &str = "HLS_PROCESSING_TIME";
/// File attribute holding one timestamp or a `;`-separated begin/end pair.
pub const SENSING_TIME: &str = "SENSING_TIME";
/// File attribute holding the HDF-EOS structured metadata block.
pub const STRUCT_METADATA: &str = "StructMetadata.0";

/// Format of `HLS_PROCESSING_TIME` as written by the producer.
const PROCESSING_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Extract,
    TemplateMerge,
    AttributeResolution,
    GranuleInfo,
    TemporalResolution,
    SpatialResolution,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Extract => "extract",
            Phase::TemplateMerge => "template merge",
            Phase::AttributeResolution => "attribute resolution",
            Phase::GranuleInfo => "granule info",
            Phase::TemporalResolution => "temporal resolution",
            Phase::SpatialResolution => "spatial resolution",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
struct OnlineSettings {
    bucket: String,
    metadata_suffix: String,
}

/// Builds documents from granule files. Holds no per-file state, so one
/// assembler may serve any number of files (or threads).
pub struct MetadataAssembler<'r, S> {
    source: S,
    registry: &'r TemplateRegistry,
    default_platform: String,
    online: Option<OnlineSettings>,
}

impl<'r, S: AttributeSource> MetadataAssembler<'r, S> {
    pub fn new(source: S, registry: &'r TemplateRegistry) -> Self {
        MetadataAssembler {
            source,
            registry,
            default_platform: "LANDSAT-8".to_string(),
            online: None,
        }
    }

    /// Platform block used when the file carries no `SPACECRAFT_NAME`.
    pub fn with_default_platform(mut self, platform: &str) -> Self {
        self.default_platform = platform.to_string();
        self
    }

    /// Populate online access/resource/browse descriptors under `bucket`.
    pub fn with_online_resources(mut self, bucket: &str, metadata_suffix: &str) -> Self {
        self.online = Some(OnlineSettings {
            bucket: bucket.to_string(),
            metadata_suffix: metadata_suffix.to_string(),
        });
        self
    }

    /// Run every phase for `path` and return the finished document.
    pub fn build(&self, path: &Path) -> Result<MetadataDocument> {
        info!("Building metadata for {:?}", path);

        debug!("Phase: {}", Phase::Extract);
        let attrs = self.source.extract(path)?;

        debug!("Phase: {}", Phase::TemplateMerge);
        let name = GranuleName::from_path(path)?;
        let config = self.registry.lookup(&name.product)?;
        let mut doc = MetadataDocument::default();
        self.merge_template(&mut doc, &name, &config, &attrs)?;

        debug!("Phase: {}", Phase::AttributeResolution);
        doc.additional_attributes = resolve_additional_attributes(&config, &attrs)?;

        debug!("Phase: {}", Phase::GranuleInfo);
        self.granule_info(&mut doc, path, &name, &attrs)?;

        debug!("Phase: {}", Phase::TemporalResolution);
        let sensing_time = attrs
            .text(SENSING_TIME)
            .ok_or_else(|| Error::InvalidTemporalData {
                value: String::new(),
                reason: format!("missing `{}` attribute", SENSING_TIME),
            })?;
        doc.temporal = Some(resolve_temporal(&sensing_time)?);

        debug!("Phase: {}", Phase::SpatialResolution);
        doc.spatial = Some(resolve_spatial(&attrs)?);

        info!("Built metadata for granule {}", doc.granule_ur);
        Ok(doc)
    }

    fn merge_template(
        &self,
        doc: &mut MetadataDocument,
        name: &GranuleName,
        config: &ProductConfig,
        attrs: &RawAttributeSet,
    ) -> Result<()> {
        let platform = attrs
            .text(SPACECRAFT_NAME)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.default_platform.clone());
        debug!("Using platform block {}", platform);

        doc.granule_ur = name.granule_ur.clone();
        doc.collection = Collection {
            data_set_id: config.template.data_set_id.clone(),
        };
        doc.platforms = config.platforms(&platform)?;
        doc.orderable = config.template.orderable;
        doc.visible = config.template.visible;
        doc.data_format = name.data_format.clone();
        Ok(())
    }

    fn granule_info(
        &self,
        doc: &mut MetadataDocument,
        path: &Path,
        name: &GranuleName,
        attrs: &RawAttributeSet,
    ) -> Result<()> {
        let file_meta = std::fs::metadata(path)?;

        let production_date_time = match attrs.text(PROCESSING_TIME) {
            Some(raw) => normalize_production_time(&raw),
            None => {
                warn!("Missing `{}` attribute in {:?}", PROCESSING_TIME, path);
                NOT_AVAILABLE.to_string()
            }
        };

        doc.data_granule = Some(DataGranule {
            size_kb: file_meta.len() as f64 / 1024.0,
            producer_granule_id: name.producer_granule_id.clone(),
            day_night_flag: DAY_NIGHT_FLAG.to_string(),
            production_date_time,
            local_version_id: name.local_version_id.clone(),
        });

        doc.insert_time = format_timestamp(Utc::now());
        doc.last_update = format_timestamp(DateTime::<Utc>::from(file_meta.modified()?));

        if let Some(online) = &self.online {
            let loc = OnlineLocations::for_granule(&online.bucket, name, &online.metadata_suffix);
            doc.online_access_urls = vec![loc.access];
            doc.online_resources = vec![loc.resource];
            doc.browse_urls = vec![loc.browse];
        }
        Ok(())
    }
}

fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Values for every additional attribute the template declares, in template
/// order; attributes missing from the file become `Not Available`.
pub fn resolve_additional_attributes(
    config: &ProductConfig,
    attrs: &RawAttributeSet,
) -> Result<Vec<AdditionalAttribute>> {
    config
        .template
        .additional_attributes
        .iter()
        .map(|name| -> Result<AdditionalAttribute> {
            let raw_name =
                config
                    .mapping
                    .raw_name(name)
                    .ok_or_else(|| Error::MappingNotFound {
                        product: config.product.clone(),
                        attribute: name.clone(),
                    })?;
            Ok(AdditionalAttribute {
                name: name.clone(),
                value: attrs.text_or(raw_name, NOT_AVAILABLE),
            })
        })
        .collect()
}

/// Reformat `YYYY-MM-DDTHH:MM:SSZ` into the document timestamp format.
/// Anything else is passed through unchanged.
pub fn normalize_production_time(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw.trim(), PROCESSING_TIME_FORMAT) {
        Ok(t) => t.format(TIMESTAMP_FORMAT).to_string(),
        Err(e) => {
            warn!("Keeping unparsable production time `{}` as is: {}", raw, e);
            raw.to_string()
        }
    }
}

/// One sensing time is a single instant, two (`begin;end`) a range.
pub fn resolve_temporal(sensing_time: &str) -> Result<Temporal> {
    let invalid = |reason: &str| Error::InvalidTemporalData {
        value: sensing_time.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = sensing_time.split(';').map(str::trim).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(invalid("empty timestamp"));
    }
    match parts.as_slice() {
        [single] => Ok(Temporal::Single(single.to_string())),
        [beginning, ending] => Ok(Temporal::Range {
            beginning: beginning.to_string(),
            ending: ending.to_string(),
        }),
        _ => Err(invalid("expected one or two `;`-separated timestamps")),
    }
}

/// Geographic bounding rectangle from the structured metadata attribute.
pub fn resolve_spatial(attrs: &RawAttributeSet) -> Result<BoundingRectangle> {
    let text = attrs
        .text(STRUCT_METADATA)
        .ok_or_else(|| Error::SpatialParse(format!("missing `{}` attribute", STRUCT_METADATA)))?;
    let corners = StructMetadata::parse(&text).grid_corners()?;
    reproject_bounds(corners.projected_bounds())
}
