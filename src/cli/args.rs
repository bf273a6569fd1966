use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "create_metadata", version, about = "Extract CMR metadata from an HLS HDF file")]
pub struct CliArgs {
    /// Input HDF granule (single file mode)
    pub data_file: Option<PathBuf>,

    /// Save metadata to this file instead of printing it
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Upload metadata to the archive bucket under <product>/metadata/
    #[arg(long, default_value_t = false)]
    pub s3: bool,

    /// Input directory containing HDF granules (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output directory for batch processing (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Batch mode: process every HDF file of --input-dir into --output-dir
    #[arg(long, default_value_t = false)]
    pub batch: bool,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding <product>.json and <product>_attribute_mapping.json
    #[arg(long)]
    pub template_dir: Option<PathBuf>,

    /// Archive bucket (uploads and online-resource URLs)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Custom S3 endpoint, e.g. http://localhost:9000
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// Populate OnlineAccessURLs, OnlineResources and AssociatedBrowseImageURLs
    #[arg(long, default_value_t = false)]
    pub online_resources: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
