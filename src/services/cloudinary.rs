//! Cloudinary implementation of [`AssetProvider`].
//!
//! Search goes through the Admin search endpoint with HTTP basic auth. Uploads
//! are signed: the sorted parameter string plus the API secret is digested
//! and sent as `signature`.

use super::provider::{
    AssetProvider, ProviderAsset, ProviderError, ProviderResult, SearchQuery, SearchResponse,
    UploadOptions, UploadedAsset,
};
use crate::config::{ProviderConfig, SignatureAlgorithm};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, multipart};
use serde::Deserialize;
use serde_json::{Map, json};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::{collections::BTreeMap, path::Path};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct CloudinaryClient {
    http: Client,
    config: ProviderConfig,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Deserialize)]
struct ApiErrorMessage {
    message: String,
}

impl CloudinaryClient {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: ProviderConfig, http: Client) -> Self {
        Self { http, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/v1_1/{}/{}",
            self.config.api_base_url, self.config.cloud_name, path
        )
    }

    fn sign(&self, params: &BTreeMap<&str, String>) -> String {
        sign_params(
            params,
            &self.config.api_secret,
            self.config.signature_algorithm,
        )
    }
}

#[async_trait]
impl AssetProvider for CloudinaryClient {
    async fn search(&self, query: &SearchQuery) -> ProviderResult<Vec<ProviderAsset>> {
        let mut sort = Map::new();
        sort.insert(query.sort_by.clone(), json!(query.direction()));
        let body = json!({
            "expression": query.expression(),
            "sort_by": [sort],
            "max_results": query.max_results,
            "with_field": ["context"],
        });

        let response = self
            .http
            .post(self.endpoint("resources/search"))
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .json(&body)
            .send()
            .await?;

        let bytes = ensure_success(response).await?.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&bytes)?;
        if let Some(cursor) = parsed.next_cursor.as_deref() {
            debug!(
                "search truncated at {} of {:?} results (next cursor {})",
                parsed.resources.len(),
                parsed.total_count,
                cursor
            );
        }
        Ok(parsed.resources)
    }

    async fn upload(&self, path: &Path, options: &UploadOptions) -> ProviderResult<UploadedAsset> {
        let mut params: BTreeMap<&'static str, String> = BTreeMap::new();
        params.insert("timestamp", Utc::now().timestamp().to_string());
        params.insert("folder", options.folder.clone());
        if !options.context.is_empty() {
            params.insert("context", encode_context(&options.context));
        }
        let signature = self.sign(&params);

        let file = File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = options
            .file_name
            .clone()
            .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "upload".into());
        let part = multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(ReaderStream::new(file)),
            length,
        )
        .file_name(file_name);

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        if self.config.signature_algorithm == SignatureAlgorithm::Sha256 {
            form = form.text("signature_algorithm", "sha256");
        }
        for (key, value) in params {
            form = form.text(key, value);
        }

        let url = self.endpoint(&format!("{}/upload", options.resource_type));
        debug!("uploading {} bytes to {}", length, url);
        let response = self.http.post(url).multipart(form).send().await?;

        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Turn a non-2xx response into [`ProviderError::Api`], preferring the
/// provider's own `{error: {message}}` text.
async fn ensure_success(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);
    warn!("provider responded {}: {}", status, message);
    Err(ProviderError::Api {
        status: status.as_u16(),
        message,
    })
}

/// `k1=v1&k2=v2` over the sorted, non-empty parameters, followed by the
/// secret, hex-digested.
pub fn sign_params(
    params: &BTreeMap<&str, String>,
    secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let payload = format!("{}{}", string_to_sign(params), secret);
    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}

fn string_to_sign(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Context metadata wire form: `key=value|key=value`, with `=` and `|`
/// backslash-escaped inside keys and values.
pub fn encode_context(context: &BTreeMap<String, String>) -> String {
    fn escape(raw: &str) -> String {
        raw.replace('=', "\\=").replace('|', "\\|")
    }

    context
        .iter()
        .map(|(key, value)| format!("{}={}", escape(key), escape(value)))
        .collect::<Vec<_>>()
        .join("|")
}
