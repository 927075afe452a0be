//! Azure Blob Storage backend.
//!
//! Talks to the Blob REST API directly with Shared Key authorization: each
//! request is signed with HMAC-SHA256 over a canonical string built from the
//! verb, standard headers, `x-ms-*` headers and the resource path.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use garage_core::{
    car::ImageDescriptor,
    upload::{ImageStore, StoreError, UploadFile},
};
use hmac::{Hmac, Mac};
use reqwest::{Method, StatusCode};
use sha2::Sha256;
use tokio::sync::OnceCell;
use url::Url;

const API_VERSION: &str = "2021-08-06";

/// Writes images as block blobs into one container.
pub struct AzureBlobStore {
    client: reqwest::Client,
    account: String,
    key: Vec<u8>,
    endpoint: String,
    container: String,
    container_ready: OnceCell<()>,
}

impl AzureBlobStore {
    /// Parses a storage account connection string.
    ///
    /// `AccountName` and `AccountKey` are required. `BlobEndpoint` wins when
    /// present (Azurite, custom domains); otherwise the endpoint is derived
    /// from `DefaultEndpointsProtocol` and `EndpointSuffix`.
    pub fn from_connection_string(
        connection_string: &str,
        container: &str,
    ) -> Result<Self, anyhow::Error> {
        let setting = |name: &str| {
            connection_string
                .split(';')
                .filter_map(|part| part.split_once('='))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
                .map(|(_, v)| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let account = setting("AccountName")
            .ok_or_else(|| anyhow!("Azure connection string has no AccountName"))?;
        let key = setting("AccountKey")
            .ok_or_else(|| anyhow!("Azure connection string has no AccountKey"))?;
        let key = STANDARD
            .decode(key)
            .context("Azure AccountKey is not valid base64")?;

        let endpoint = match setting("BlobEndpoint") {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let protocol =
                    setting("DefaultEndpointsProtocol").unwrap_or_else(|| "https".to_string());
                let suffix =
                    setting("EndpointSuffix").unwrap_or_else(|| "core.windows.net".to_string());
                format!("{protocol}://{account}.blob.{suffix}")
            }
        };
        Url::parse(&endpoint).with_context(|| format!("Invalid Azure blob endpoint '{endpoint}'"))?;

        Ok(Self {
            client: reqwest::Client::new(),
            account,
            key,
            endpoint,
            container: container.to_string(),
            container_ready: OnceCell::new(),
        })
    }

    fn blob_url(&self, key: &str) -> String {
        format!("{}/{}/{key}", self.endpoint, self.container)
    }

    /// Creates the container with public read access to blobs. An existing
    /// container is fine.
    async fn ensure_container(&self) -> Result<(), StoreError> {
        self.container_ready
            .get_or_try_init(|| async {
                let url = format!("{}/{}?restype=container", self.endpoint, self.container);
                let response = self
                    .send_signed(
                        Method::PUT,
                        &url,
                        vec![("x-ms-blob-public-access", "blob".to_string())],
                        Vec::new(),
                    )
                    .await?;

                match response.status() {
                    StatusCode::CREATED => {
                        tracing::info!(container = %self.container, "Created Azure container");
                        Ok(())
                    }
                    StatusCode::CONFLICT => Ok(()),
                    status => Err(response_error("Create container", status, response).await),
                }
            })
            .await
            .map(|_| ())
    }

    async fn send_signed(
        &self,
        method: Method,
        url: &str,
        mut ms_headers: Vec<(&'static str, String)>,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, StoreError> {
        let parsed = Url::parse(url).map_err(|e| StoreError::Backend(e.to_string()))?;

        ms_headers.push(("x-ms-date", rfc1123_now()));
        ms_headers.push(("x-ms-version", API_VERSION.to_string()));
        ms_headers.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = string_to_sign(
            method.as_str(),
            body.len(),
            &ms_headers,
            &canonical_resource(&self.account, &parsed),
        );
        let authorization = format!("SharedKey {}:{}", self.account, sign(&self.key, &to_sign)?);

        let mut request = self
            .client
            .request(method, parsed)
            .header("Authorization", authorization);
        for (name, value) in &ms_headers {
            request = request.header(*name, value);
        }

        request
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Azure request failed: {e}")))
    }
}

#[async_trait]
impl ImageStore for AzureBlobStore {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn put(&self, key: &str, file: &UploadFile) -> Result<ImageDescriptor, StoreError> {
        self.ensure_container().await?;

        let mut headers = vec![("x-ms-blob-type", "BlockBlob".to_string())];
        if let Some(content_type) = &file.content_type {
            headers.push(("x-ms-blob-content-type", content_type.clone()));
        }

        let url = self.blob_url(key);
        let response = self
            .send_signed(Method::PUT, &url, headers, file.data.to_vec())
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(response_error("Put blob", status, response).await);
        }

        tracing::debug!(container = %self.container, key, size = file.size(), "Wrote image to Azure");

        Ok(ImageDescriptor::new(url, key))
    }
}

async fn response_error(operation: &str, status: StatusCode, response: reqwest::Response) -> StoreError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    StoreError::Backend(format!("{operation} failed with {status}: {body}"))
}

fn rfc1123_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// The Shared Key string-to-sign for a request without standard headers
/// other than `Content-Length`.
///
/// `ms_headers` must be sorted by name.
fn string_to_sign(
    method: &str,
    content_length: usize,
    ms_headers: &[(&str, String)],
    resource: &str,
) -> String {
    let content_length = if content_length == 0 {
        String::new()
    } else {
        content_length.to_string()
    };

    let mut out = format!("{method}\n\n\n{content_length}\n\n\n\n\n\n\n\n\n");
    for (name, value) in ms_headers {
        out.push_str(&format!("{}:{}\n", name.to_ascii_lowercase(), value.trim()));
    }
    out.push_str(resource);
    out
}

/// `/{account}{path}` followed by one `name:value` line per query parameter,
/// names lowercased and sorted.
fn canonical_resource(account: &str, url: &Url) -> String {
    let mut resource = format!("/{account}{}", url.path());

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.into_owned()))
        .collect();
    params.sort();
    for (name, value) in params {
        resource.push_str(&format!("\n{name}:{value}"));
    }
    resource
}

fn sign(key: &[u8], to_sign: &str) -> Result<String, StoreError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| StoreError::Backend(format!("Invalid signing key: {e}")))?;
    mac.update(to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
