//! Output sinks for encoded documents: local files and object storage.
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, instrument};

use crate::error::{Error, Result};

/// Key of a metadata document inside the archive bucket.
pub fn object_key(product: &str, metadata_name: &str) -> String {
    format!("{}/metadata/{}", product, metadata_name)
}

/// Write `xml` to a local file, replacing any existing file.
pub fn save_to_file(xml: &str, path: &Path) -> Result<()> {
    std::fs::write(path, xml).map_err(|e| Error::StorageWrite {
        location: path.display().to_string(),
        reason: e.to_string(),
    })?;
    info!("Wrote metadata to {:?}", path);
    Ok(())
}

/// Short-lived credentials for the archive bucket.
#[derive(Debug, Clone)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl TemporaryCredentials {
    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and optional `AWS_SESSION_TOKEN`.
    pub fn from_env() -> Option<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        Some(TemporaryCredentials {
            access_key_id,
            secret_access_key,
            session_token: std::env::var("AWS_SESSION_TOKEN").ok(),
        })
    }
}

/// Blocking writer into an object store bucket, one `put` per document.
pub struct ObjectSink {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    runtime: Runtime,
}

impl ObjectSink {
    /// S3 bucket sink; `endpoint` selects an S3-compatible service instead of AWS.
    pub fn s3(
        bucket: &str,
        region: &str,
        credentials: &TemporaryCredentials,
        endpoint: Option<&str>,
    ) -> Result<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(region)
            .with_access_key_id(&credentials.access_key_id)
            .with_secret_access_key(&credentials.secret_access_key);
        if let Some(token) = &credentials.session_token {
            builder = builder.with_token(token);
        }
        if let Some(endpoint) = endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder.build().map_err(|e| Error::StorageWrite {
            location: format!("s3://{}", bucket),
            reason: format!("failed to create S3 client: {}", e),
        })?;
        Self::with_store(Arc::new(store), bucket)
    }

    /// Sink backed by process memory.
    pub fn in_memory(bucket: &str) -> Result<Self> {
        Self::with_store(Arc::new(InMemory::new()), bucket)
    }

    fn with_store(store: Arc<dyn ObjectStore>, bucket: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(ObjectSink {
            store,
            bucket: bucket.to_string(),
            runtime,
        })
    }

    /// Upload `xml` under `key`. No retries; a failure is returned to the caller.
    #[instrument(skip(self, xml), fields(bucket = %self.bucket, key = %key))]
    pub fn put(&self, key: &str, xml: &str) -> Result<()> {
        let location = ObjectPath::from(key);
        let data = Bytes::from(xml.to_string());
        debug!(size = data.len(), "Writing object");

        self.runtime
            .block_on(self.store.put(&location, data))
            .map_err(|e| {
                error!("Upload failed: {}", e);
                Error::StorageWrite {
                    location: format!("s3://{}/{}", self.bucket, key),
                    reason: e.to_string(),
                }
            })?;
        info!("Uploaded metadata to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    /// Read back an object as text.
    pub fn get(&self, key: &str) -> Result<String> {
        let location = ObjectPath::from(key);
        let bytes = self
            .runtime
            .block_on(async {
                let result = self.store.get(&location).await?;
                result.bytes().await
            })
            .map_err(|e| Error::StorageWrite {
                location: format!("s3://{}/{}", self.bucket, key),
                reason: e.to_string(),
            })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        assert_eq!(
            object_key("L30", "HLS.L30.T17SLU.2020117T160901.v1.5.cmr.xml"),
            "L30/metadata/HLS.L30.T17SLU.2020117T160901.v1.5.cmr.xml"
        );
    }

    #[test]
    fn in_memory_put_then_get() {
        let sink = ObjectSink::in_memory("hls-global").unwrap();
        sink.put("L30/metadata/a.cmr.xml", "<Granule></Granule>").unwrap();
        assert_eq!(
            sink.get("L30/metadata/a.cmr.xml").unwrap(),
            "<Granule></Granule>"
        );
        assert!(matches!(
            sink.get("L30/metadata/missing.cmr.xml"),
            Err(Error::StorageWrite { .. })
        ));
    }

    #[test]
    fn local_file_roundtrip_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cmr.xml");
        save_to_file("<Granule></Granule>", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<Granule></Granule>");

        let bad = dir.path().join("missing-dir").join("out.cmr.xml");
        assert!(matches!(
            save_to_file("<Granule></Granule>", &bad),
            Err(Error::StorageWrite { .. })
        ));
    }
}
