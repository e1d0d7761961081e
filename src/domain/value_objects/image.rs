//! Image value objects: the tri-state image field of update requests and
//! the hosting folders images are uploaded to.

use serde::{Deserialize, Deserializer};

/// Requested change to an image field.
///
/// Deserialized with `#[serde(default)]` on the containing field:
/// an absent key is `Keep`, `null` is `Clear`, a string is `Set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageInput {
    /// Leave the current image untouched
    #[default]
    Keep,
    /// Revert to the default image (or none for posts)
    Clear,
    /// Replace with this source, uploaded to the image host
    Set(String),
}

impl ImageInput {
    /// The new source when the request replaces the image with something
    /// other than `current`.
    pub fn replacement_for(&self, current: Option<&str>) -> Option<&str> {
        match self {
            ImageInput::Set(source) if Some(source.as_str()) != current => Some(source.as_str()),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ImageInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<String>::deserialize(deserializer)? {
            None => ImageInput::Clear,
            Some(source) if source.trim().is_empty() => ImageInput::Keep,
            Some(source) => ImageInput::Set(source),
        })
    }
}

/// Folder on the image host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    Profile,
    Cover,
    Post,
}

impl ImageFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Cover => "cover",
            Self::Post => "post",
        }
    }
}

impl std::fmt::Display for ImageFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether `source` is something the image host can ingest:
/// a base64 image data URI or an http(s) URL.
pub fn is_uploadable_source(source: &str) -> bool {
    if let Some(rest) = source.strip_prefix("data:image/") {
        return rest
            .split_once(";base64,")
            .is_some_and(|(subtype, data)| !subtype.is_empty() && !data.is_empty());
    }
    source.starts_with("https://") || source.starts_with("http://")
}
