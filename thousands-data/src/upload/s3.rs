//! S3-compatible object store built on the AWS SDK.

use std::fmt;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;

use super::error::StoreError;
use super::store::{ObjectStore, ProbeOutcome};

/// Region used when none is configured.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

const CREDENTIALS_PROVIDER_NAME: &str = "thousands-config";

/// Connection settings for an S3-compatible endpoint.
///
/// Passed explicitly to [`S3ObjectStore::new`]; nothing is read from the
/// process environment by the store itself.
#[derive(Clone)]
pub struct S3Config {
    /// Endpoint URL; bare `host:port` values are treated as `http://`.
    pub endpoint: Option<String>,
    /// Bucket holding every uploaded object.
    pub bucket: String,
    /// Signing region.
    pub region: String,
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Address objects as `endpoint/bucket/key` rather than `bucket.endpoint/key`.
    pub force_path_style: bool,
}

impl S3Config {
    /// Build a configuration with the default region and path-style addressing.
    pub fn new(
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: None,
            bucket: bucket.into(),
            region: DEFAULT_S3_REGION.to_owned(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            force_path_style: true,
        }
    }

    /// Set the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the signing region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("force_path_style", &self.force_path_style)
            .finish_non_exhaustive()
    }
}

/// [`ObjectStore`] backed by an S3-compatible service.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl S3ObjectStore {
    /// Build a client for the configured endpoint and bucket.
    #[must_use]
    pub fn new(config: S3Config) -> Self {
        let S3Config {
            endpoint,
            bucket,
            region,
            access_key_id,
            secret_access_key,
            force_path_style,
        } = config;
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );
        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(force_path_style);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(normalise_endpoint(&endpoint));
        }
        Self {
            client: Client::from_conf(builder.build()),
            bucket,
        }
    }
}

fn normalise_endpoint(endpoint: &str) -> String {
    let lower = endpoint.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        endpoint.to_owned()
    } else {
        format!("http://{endpoint}")
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn probe(&self, key: &str) -> ProbeOutcome {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => ProbeOutcome::Exists,
            Err(err) => {
                if let SdkError::ServiceError(ref service_err) = err
                    && service_err.raw().status().as_u16() == 404
                {
                    return ProbeOutcome::NotFound;
                }
                ProbeOutcome::Failed(StoreError::service("head", key, err))
            }
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StoreError::service("put", key, err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("minio:9000", "http://minio:9000")]
    #[case("http://localhost:9000", "http://localhost:9000")]
    #[case("HTTPS://s3.example.org", "HTTPS://s3.example.org")]
    fn endpoints_gain_a_scheme(#[case] endpoint: &str, #[case] expected: &str) {
        assert_eq!(normalise_endpoint(endpoint), expected);
    }

    #[test]
    fn config_defaults_to_path_style() {
        let config = S3Config::new("thousands", "key", "secret");
        assert!(config.force_path_style);
        assert_eq!(config.region, DEFAULT_S3_REGION);
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let config = S3Config::new("thousands", "key", "very-secret");
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
