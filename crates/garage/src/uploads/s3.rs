use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{config::Credentials, primitives::ByteStream, Client};
use garage_core::{
    car::ImageDescriptor,
    upload::{ImageStore, StoreError, UploadFile},
};

/// Writes images to an S3 bucket.
pub struct S3ImageStore {
    client: Client,
    bucket: String,
    base_url: String,
}

impl S3ImageStore {
    /// Loads the AWS configuration for `region`.
    ///
    /// Static keys are used when both are given; otherwise the SDK's default
    /// credential chain applies. Object URLs start with `public_url` when set
    /// (a CDN or an S3-compatible store), else the virtual-hosted AWS URL.
    pub async fn connect(
        region: &str,
        bucket: &str,
        public_url: Option<String>,
        credentials: Option<(String, String)>,
    ) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some((access_key_id, secret_access_key)) = credentials {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "garage-env",
            ));
        }
        let config = loader.load().await;

        Self {
            client: Client::new(&config),
            bucket: bucket.to_string(),
            base_url: public_url.unwrap_or_else(|| default_base_url(bucket, region)),
        }
    }
}

fn default_base_url(bucket: &str, region: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com")
}

#[async_trait]
impl ImageStore for S3ImageStore {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn put(&self, key: &str, file: &UploadFile) -> Result<ImageDescriptor, StoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(file.data.to_vec()));
        if let Some(content_type) = &file.content_type {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(|err| {
            StoreError::Backend(format!("PutObject failed: {:?}", err.into_service_error()))
        })?;

        tracing::debug!(bucket = %self.bucket, key, size = file.size(), "Wrote image to S3");

        Ok(ImageDescriptor::new(format!("{}/{key}", self.base_url), key))
    }
}
