//! Accepted upload types.

use serde::{Deserialize, Serialize};

/// Raster types a slot accepts. Everything else is rejected before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
}

impl MediaType {
    /// Parse a declared MIME type. Case and parameters are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Parse the extension of `filename`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Resolve the type of an upload.
    ///
    /// The declared MIME type is authoritative; the filename is consulted
    /// only when nothing was declared.
    pub fn detect(declared: &str, filename: &str) -> Option<Self> {
        if declared.trim().is_empty() {
            Self::from_filename(filename)
        } else {
            Self::from_mime(declared)
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// Replace (or add) the extension of `filename`.
pub(crate) fn with_extension(filename: &str, ext: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ if filename.is_empty() => "image",
        _ => filename,
    };
    format!("{stem}.{ext}")
}
