//! Image Hosting
//!
//! Contract of the third-party image host and the policy wrapped around it:
//! which sources may be uploaded and which hosted images may be destroyed.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{is_uploadable_source, ImageFolder};
use crate::shared::error::AppError;

/// Image hosting errors
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image uploads are not configured")]
    NotConfigured,

    #[error("Unsupported image source")]
    UnsupportedSource,

    #[error("Image host error: {0}")]
    Upstream(String),
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::NotConfigured | ImageError::UnsupportedSource => {
                AppError::BadRequest(err.to_string())
            }
            ImageError::Upstream(msg) => AppError::Upstream(msg),
        }
    }
}

/// Third-party image host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload a data URI or remote URL into `folder`; returns the hosted URL.
    async fn upload(&self, source: &str, folder: ImageFolder) -> Result<String, ImageError>;

    /// Remove a previously hosted image.
    async fn destroy(&self, url: &str) -> Result<(), ImageError>;
}

/// Upload/destroy policy on top of an [`ImageHost`].
#[derive(Clone)]
pub struct ImageStore {
    host: Arc<dyn ImageHost>,
    default_url: String,
}

impl ImageStore {
    pub fn new(host: Arc<dyn ImageHost>, default_url: impl Into<String>) -> Self {
        Self {
            host,
            default_url: default_url.into(),
        }
    }

    /// Placeholder used for users without a profile or cover image.
    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    /// Upload `source` after checking it is a data URI or URL.
    pub async fn upload(&self, source: &str, folder: ImageFolder) -> Result<String, ImageError> {
        if !is_uploadable_source(source) {
            return Err(ImageError::UnsupportedSource);
        }
        self.host.upload(source, folder).await
    }

    /// Destroy a hosted image, best effort. The placeholder and empty
    /// values are left alone.
    pub async fn discard(&self, url: &str) {
        if url.is_empty() || url == self.default_url {
            return;
        }
        if let Err(e) = self.host.destroy(url).await {
            tracing::warn!(error = %e, url, "Failed to destroy hosted image");
        }
    }
}
