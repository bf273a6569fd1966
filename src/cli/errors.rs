use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Conflicting arguments: {0}")]
    Conflict(String),

    #[error("S3 upload requires AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY")]
    MissingCredentials,

    #[error("Batch finished with {errors} failed granule(s)")]
    BatchFailures { errors: usize },

    #[error(transparent)]
    Metadata(#[from] cmr_granule::Error),
}
