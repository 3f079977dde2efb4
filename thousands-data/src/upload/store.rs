use async_trait::async_trait;

use super::error::StoreError;

/// Result of probing an object key.
///
/// Only a definite "not found" allows an upload. Permission and transport
/// faults stay distinct so callers never mistake them for a missing object.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// An object already exists under the key.
    Exists,
    /// The store confirmed that no object exists under the key.
    NotFound,
    /// The probe itself failed.
    Failed(StoreError),
}

/// Minimal key/value blob store used by the uploader.
///
/// Implementations are shared read-only across concurrent transfers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether an object exists under `key`.
    async fn probe(&self, key: &str) -> ProbeOutcome;

    /// Store `body` under `key` with the given content type.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> ObjectStore for &S
where
    S: ObjectStore + ?Sized,
{
    async fn probe(&self, key: &str) -> ProbeOutcome {
        (**self).probe(key).await
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        (**self).put(key, body, content_type).await
    }
}

#[async_trait]
impl<S> ObjectStore for Box<S>
where
    S: ObjectStore + ?Sized,
{
    async fn probe(&self, key: &str) -> ProbeOutcome {
        (**self).probe(key).await
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        (**self).put(key, body, content_type).await
    }
}
