//! Image Hosts
//!
//! [`CloudImageHost`] talks to a Cloudinary-compatible upload API using
//! signed requests. [`DisabledImageHost`] is installed when no cloud name
//! is configured and rejects every upload.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::application::images::{ImageError, ImageHost};
use crate::config::ImageSettings;
use crate::domain::ImageFolder;

/// Host used when uploads are not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledImageHost;

#[async_trait]
impl ImageHost for DisabledImageHost {
    async fn upload(&self, _source: &str, _folder: ImageFolder) -> Result<String, ImageError> {
        Err(ImageError::NotConfigured)
    }

    async fn destroy(&self, _url: &str) -> Result<(), ImageError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Signed client for a Cloudinary-style image API.
#[derive(Clone)]
pub struct CloudImageHost {
    client: Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudImageHost {
    pub fn new(
        base_url: impl Into<String>,
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Build the host described by `settings`, or `None` when uploads are off.
    pub fn from_settings(settings: &ImageSettings) -> Option<Self> {
        let cloud_name = settings.cloud_name.as_deref()?.trim();
        if cloud_name.is_empty() {
            return None;
        }
        Some(Self::new(
            &settings.api_base_url,
            cloud_name,
            &settings.api_key,
            &settings.api_secret,
        ))
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.base_url, self.cloud_name, action)
    }

    /// Sign the request parameters and add the credentials.
    fn signed(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = sign(&params, &self.api_secret);
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params.insert("api_key", self.api_key.clone());
        params
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        params: BTreeMap<&'static str, String>,
    ) -> Result<T, ImageError> {
        let response = self
            .client
            .post(self.endpoint(action))
            .json(&params)
            .send()
            .await
            .map_err(|e| ImageError::Upstream(format!("Network error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(ImageError::Upstream(format!("{status}: {body}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ImageError::Upstream(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl ImageHost for CloudImageHost {
    #[instrument(skip(self, source), fields(folder = %folder))]
    async fn upload(&self, source: &str, folder: ImageFolder) -> Result<String, ImageError> {
        let mut params = BTreeMap::new();
        params.insert("folder", folder.as_str().to_string());
        let mut params = self.signed(params);
        params.insert("file", source.to_string());

        let uploaded: UploadResponse = self.post("upload", params).await?;
        debug!(url = %uploaded.secure_url, "Image uploaded");
        Ok(uploaded.secure_url)
    }

    #[instrument(skip(self))]
    async fn destroy(&self, url: &str) -> Result<(), ImageError> {
        let public_id = public_id_from_url(url)
            .ok_or_else(|| ImageError::Upstream(format!("Not a hosted image: {url}")))?;

        let mut params = BTreeMap::new();
        params.insert("public_id", public_id);
        let destroyed: DestroyResponse = self.post("destroy", self.signed(params)).await?;

        match destroyed.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(ImageError::Upstream(format!("Destroy returned {other}"))),
        }
    }
}

/// SHA-256 over `k1=v1&k2=v2...` in key order, followed by the secret.
fn sign(params: &BTreeMap<&'static str, String>, secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{joined}{secret}").as_bytes()))
}

/// Recover the public id (`folder/name`) from a delivery URL such as
/// `https://res.example.com/demo/image/upload/v1712/posts/abc.jpg`.
fn public_id_from_url(url: &str) -> Option<String> {
    let (_, path) = url.split_once("/upload/")?;
    let path = path.split(['?', '#']).next()?;
    let path = match path.split_once('/') {
        Some((version, rest))
            if version.len() > 1
                && version.starts_with('v')
                && version[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            rest
        }
        _ => path,
    };
    let id = match path.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => path,
    };
    (!id.is_empty()).then(|| id.to_string())
}
