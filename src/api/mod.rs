//! High-level, ergonomic library API: build a granule's metadata document,
//! encode it, and write it to a file, an object store, or a whole output
//! directory. Prefer these entrypoints over the low-level `core` modules.
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::CreatorConfig;
use crate::core::assembler::MetadataAssembler;
use crate::core::granule_name::GranuleName;
use crate::error::{Error, Result};
use crate::io::attributes::AttributeSource;
use crate::io::hdf::GdalAttributeSource;
use crate::io::templates::TemplateRegistry;
use crate::io::writers::{ObjectSink, encode, object_key, save_to_file};
use crate::types::MetadataDocument;

/// Extension of the granule files picked up in batch mode.
pub const GRANULE_EXTENSION: &str = "hdf";

/// Batch processing report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Produces CMR documents for granule files under one configuration.
pub struct Creator<'r, S> {
    assembler: MetadataAssembler<'r, S>,
    metadata_suffix: String,
}

impl<'r> Creator<'r, GdalAttributeSource> {
    /// Creator reading attributes through GDAL.
    pub fn new(config: &CreatorConfig, registry: &'r TemplateRegistry) -> Self {
        Self::with_source(GdalAttributeSource, config, registry)
    }
}

impl<'r, S: AttributeSource> Creator<'r, S> {
    pub fn with_source(source: S, config: &CreatorConfig, registry: &'r TemplateRegistry) -> Self {
        let mut assembler =
            MetadataAssembler::new(source, registry).with_default_platform(&config.default_platform);
        if config.online_resources {
            assembler = assembler.with_online_resources(&config.bucket, &config.metadata_suffix);
        }
        Creator {
            assembler,
            metadata_suffix: config.metadata_suffix.clone(),
        }
    }

    pub fn document(&self, input: &Path) -> Result<MetadataDocument> {
        self.assembler.build(input)
    }

    /// Build and encode the document for `input`.
    pub fn xml(&self, input: &Path) -> Result<String> {
        encode(&self.document(input)?)
    }

    /// `<dir of input>/<granule ur>.<suffix>`
    pub fn default_output_path(&self, input: &Path) -> Result<PathBuf> {
        let name = GranuleName::from_path(input)?;
        Ok(input.with_file_name(name.metadata_name(&self.metadata_suffix)))
    }

    /// Write the document for `input` to `output`, or next to the input when `None`.
    pub fn save_to_path(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let xml = self.xml(input)?;
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => self.default_output_path(input)?,
        };
        save_to_file(&xml, &output)?;
        Ok(output)
    }

    /// Upload the document for `input` under `<product>/metadata/<name>`; returns the key.
    pub fn save_to_object_store(&self, input: &Path, sink: &ObjectSink) -> Result<String> {
        let xml = self.xml(input)?;
        let name = GranuleName::from_path(input)?;
        let key = object_key(&name.product, &name.metadata_name(&self.metadata_suffix));
        sink.put(&key, &xml)?;
        Ok(key)
    }

    /// Process every granule file of `input_dir` into `output_dir`.
    /// A failing granule is logged and counted; the remaining files are
    /// still processed.
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        std::fs::create_dir_all(output_dir)?;

        let mut report = BatchReport::default();
        for path in iterate_granules(input_dir)? {
            if !is_granule_file(&path) {
                info!("Skipping non-granule file: {:?}", path);
                report.skipped += 1;
                continue;
            }

            let result = GranuleName::from_path(&path).and_then(|name| {
                let output = output_dir.join(name.metadata_name(&self.metadata_suffix));
                self.save_to_path(&path, Some(&output))
            });
            match result {
                Ok(output) => {
                    info!("Processed {:?} -> {:?}", path, output);
                    report.processed += 1;
                }
                Err(e) => {
                    warn!("Error processing {:?}: {}", path, e);
                    report.errors += 1;
                }
            }
        }
        Ok(report)
    }
}

/// Regular files directly inside `input_dir`, sorted by name.
pub fn iterate_granules(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir).map_err(Error::from)? {
        let path = entry.map_err(Error::from)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter())
}

fn is_granule_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(GRANULE_EXTENSION))
}

/// Build and encode the metadata of one granule with templates from
/// `config.template_dir`.
pub fn create_metadata(input: &Path, config: &CreatorConfig) -> Result<String> {
    let registry = TemplateRegistry::from_dir(&config.template_dir);
    Creator::new(config, &registry).xml(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assembler::{PROCESSING_TIME, SENSING_TIME, STRUCT_METADATA};
    use crate::io::attributes::{RawAttributeSet, StaticAttributes};
    use std::fs;

    const TEMPLATE: &str = r#"{"L30": {
        "DataSetId": "HLS L30",
        "LANDSAT-8": {"Platform": {"ShortName": "LANDSAT-8"}},
        "AdditionalAttributes": {"AdditionalAttribute": [{"Name": "CLOUD_COVERAGE"}]},
        "Orderable": "true",
        "Visible": "true"
    }}"#;

    fn setup() -> (tempfile::TempDir, TemplateRegistry, StaticAttributes) {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir(&templates).unwrap();
        fs::write(templates.join("L30.json"), TEMPLATE).unwrap();
        fs::write(
            templates.join("L30_attribute_mapping.json"),
            r#"{"CLOUD_COVERAGE": "cloud_coverage"}"#,
        )
        .unwrap();

        let attrs: RawAttributeSet = [
            (PROCESSING_TIME, "2021-06-01T12:00:00Z"),
            (SENSING_TIME, "2021-06-01T11:59:00Z"),
            (
                STRUCT_METADATA,
                "UpperLeftPointMtrs=(100000.0,200000.0)\nLowerRightMtrs=(200000.0,100000.0)",
            ),
        ]
        .into_iter()
        .collect();
        let registry = TemplateRegistry::from_dir(&templates);
        (dir, registry, StaticAttributes(attrs))
    }

    #[test]
    fn default_output_next_to_input() {
        let (dir, registry, source) = setup();
        let input = dir.path().join("HLS.L30.T17SLU.2020117T160901.v1.5.hdf");
        fs::write(&input, b"hdf").unwrap();

        let creator = Creator::with_source(source, &CreatorConfig::default(), &registry);
        let output = creator.save_to_path(&input, None).unwrap();
        assert_eq!(
            output,
            dir.path().join("HLS.L30.T17SLU.2020117T160901.v1.5.cmr.xml")
        );
        let xml = fs::read_to_string(output).unwrap();
        assert!(xml.starts_with("<Granule>"));
        assert!(xml.contains("<Value>Not Available</Value>"));
    }

    #[test]
    fn upload_uses_product_metadata_key() {
        let (dir, registry, source) = setup();
        let input = dir.path().join("HLS.L30.T17SLU.2020117T160901.v1.5.hdf");
        fs::write(&input, b"hdf").unwrap();

        let config = CreatorConfig {
            online_resources: true,
            ..CreatorConfig::default()
        };
        let creator = Creator::with_source(source, &config, &registry);
        let sink = ObjectSink::in_memory(&config.bucket).unwrap();
        let key = creator.save_to_object_store(&input, &sink).unwrap();
        assert_eq!(key, "L30/metadata/HLS.L30.T17SLU.2020117T160901.v1.5.cmr.xml");

        let stored = sink.get(&key).unwrap();
        assert!(stored.contains("<OnlineAccessURLs><OnlineAccessURL><URL>s3://hls-global/L30/data/"));
    }

    #[test]
    fn batch_counts_processed_skipped_and_errors() {
        let (dir, registry, source) = setup();
        let input_dir = dir.path().join("in");
        let output_dir = dir.path().join("out");
        fs::create_dir(&input_dir).unwrap();
        fs::write(input_dir.join("HLS.L30.T17SLU.2020117T160901.v1.5.hdf"), b"a").unwrap();
        fs::write(input_dir.join("HLS.L30.T17SLU.2020118T160901.v1.5.hdf"), b"b").unwrap();
        fs::write(input_dir.join("HLS.S30.T10SEG.2021152T183919.v2.0.hdf"), b"c").unwrap();
        fs::write(input_dir.join("README.txt"), b"notes").unwrap();

        let creator = Creator::with_source(source, &CreatorConfig::default(), &registry);
        let report = creator.process_directory(&input_dir, &output_dir).unwrap();
        assert_eq!(
            report,
            BatchReport {
                processed: 2,
                skipped: 1,
                errors: 1
            }
        );
        assert!(output_dir
            .join("HLS.L30.T17SLU.2020118T160901.v1.5.cmr.xml")
            .is_file());
    }

    #[test]
    fn batch_continues_after_first_failure() {
        let (dir, registry, source) = setup();
        let input_dir = dir.path().join("in");
        let output_dir = dir.path().join("out");
        fs::create_dir(&input_dir).unwrap();
        // sorts first and has no template
        fs::write(input_dir.join("HLS.A30.T17SLU.2020117T160901.v1.5.hdf"), b"bad").unwrap();
        fs::write(input_dir.join("HLS.L30.T17SLU.2020118T160901.v1.5.hdf"), b"good").unwrap();

        let creator = Creator::with_source(source, &CreatorConfig::default(), &registry);
        let report = creator.process_directory(&input_dir, &output_dir).unwrap();
        assert_eq!(report.errors, 1);
        assert_eq!(report.processed, 1);
        assert!(!output_dir
            .join("HLS.A30.T17SLU.2020117T160901.v1.5.cmr.xml")
            .exists());
        assert!(output_dir
            .join("HLS.L30.T17SLU.2020118T160901.v1.5.cmr.xml")
            .is_file());
    }
}
