//! Online access, resource and browse descriptors pointing at the archive
//! bucket layout `s3://<bucket>/<product>/{data,metadata,thumbnail}/<file>`.
use crate::core::granule_name::GranuleName;
use crate::types::{OnlineAccessUrl, OnlineResource, ProviderBrowseUrl};

/// Descriptors for one granule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineLocations {
    pub access: OnlineAccessUrl,
    pub resource: OnlineResource,
    pub browse: ProviderBrowseUrl,
}

impl OnlineLocations {
    pub fn for_granule(bucket: &str, name: &GranuleName, metadata_suffix: &str) -> Self {
        let prefix = |folder: &str| format!("s3://{}/{}/{}", bucket, name.product, folder);

        OnlineLocations {
            access: OnlineAccessUrl {
                url: format!("{}/{}", prefix("data"), name.file_name),
                description: "This file may be downloaded directly from this link".to_string(),
                mime_type: format!("application/x-{}", name.data_format),
            },
            resource: OnlineResource {
                url: format!("{}/{}", prefix("metadata"), name.metadata_name(metadata_suffix)),
                resource_type: "EXTENDED METADATA".to_string(),
                mime_type: "text/xml".to_string(),
            },
            browse: ProviderBrowseUrl {
                url: format!("{}/{}.jpeg", prefix("thumbnail"), name.granule_ur),
                description: "This Browse file may be downloaded directly from this link"
                    .to_string(),
            },
        }
    }
}
