use std::path::{Path, PathBuf};

use tracing::{info, warn};

use cmr_granule::io::writers::{ObjectSink, TemporaryCredentials};
use cmr_granule::{Creator, CreatorConfig, TemplateRegistry};

use super::args::CliArgs;
use super::errors::AppError;

fn load_config(args: &CliArgs) -> Result<CreatorConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => CreatorConfig::from_path(path)?,
        None => CreatorConfig::default(),
    };
    if let Some(dir) = &args.template_dir {
        config.template_dir = dir.clone();
    }
    if let Some(bucket) = &args.bucket {
        config.bucket = bucket.clone();
    }
    if let Some(endpoint) = &args.s3_endpoint {
        config.s3_endpoint = Some(endpoint.clone());
    }
    if args.online_resources {
        config.online_resources = true;
    }
    Ok(config)
}

fn process_single_file(
    creator: &Creator<'_, cmr_granule::GdalAttributeSource>,
    config: &CreatorConfig,
    input: &Path,
    save: Option<&PathBuf>,
    s3: bool,
) -> Result<(), AppError> {
    if save.is_some() && s3 {
        return Err(AppError::Conflict("--save and --s3".to_string()));
    }

    if let Some(output) = save {
        let written = creator.save_to_path(input, Some(output))?;
        info!("Successfully processed: {:?} -> {:?}", input, written);
    } else if s3 {
        let credentials = TemporaryCredentials::from_env().ok_or(AppError::MissingCredentials)?;
        let sink = ObjectSink::s3(
            &config.bucket,
            &config.s3_region,
            &credentials,
            config.s3_endpoint.as_deref(),
        )?;
        let key = creator.save_to_object_store(input, &sink)?;
        info!("Successfully uploaded: {:?} -> s3://{}/{}", input, config.bucket, key);
    } else {
        println!("{}", creator.xml(input)?);
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = load_config(&args)?;
    let registry = TemplateRegistry::from_dir(&config.template_dir);
    let creator = Creator::new(&config, &registry);

    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.as_ref().ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.as_ref().ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        info!("Starting batch processing from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report = creator.process_directory(input_dir, output_dir)?;

        info!("Batch processing complete!");
        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
        if report.errors > 0 {
            warn!("{} granule(s) failed", report.errors);
            return Err(AppError::BatchFailures {
                errors: report.errors,
            }
            .into());
        }
    } else {
        let input = args.data_file.as_ref().ok_or(AppError::MissingArgument {
            arg: "DATA_FILE".to_string(),
        })?;
        process_single_file(&creator, &config, input, args.save.as_ref(), args.s3)?;
    }

    Ok(())
}
