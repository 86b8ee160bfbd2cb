//! Preview references handed to the surrounding form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use crate::guard::MediaType;

/// Encoded image bytes suitable for an `<img>` element.
///
/// Shares its buffer with the asset it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    media_type: MediaType,
    bytes: Bytes,
}

impl Preview {
    pub fn new(media_type: MediaType, bytes: Bytes) -> Self {
        Self { media_type, bytes }
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type.mime(),
            STANDARD.encode(&self.bytes)
        )
    }
}
