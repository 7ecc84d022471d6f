//! In-memory binary object holding the fetched media bytes

use base64::{engine::general_purpose, Engine as _};
use std::path::Path;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Vec<u8>,
    mime_type: String,
}

impl Blob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Builds a blob, taking the MIME type from `declared` when present,
    /// then from the image magic bytes, then from the path extension.
    pub fn detect(bytes: Vec<u8>, declared: Option<&str>, path: Option<&Path>) -> Self {
        let mime_type = declared
            .map(|m| m.split(';').next().unwrap_or(m).trim().to_string())
            .filter(|m| !m.is_empty() && m != FALLBACK_MIME_TYPE)
            .or_else(|| sniff_mime_type(&bytes).map(str::to_string))
            .or_else(|| path.and_then(mime_type_from_path).map(str::to_string))
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());
        Self { bytes, mime_type }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        let encoded = general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime_type, encoded)
    }

    /// Decodes a base64 `data:` URL, as handed back by browser picks
    pub fn from_data_url(url: &str) -> Option<Self> {
        let (scheme, rest) = url.trim().split_once(':')?;
        if !scheme.eq_ignore_ascii_case("data") {
            return None;
        }
        let (header, payload) = rest.split_once(',')?;
        let declared = header.strip_suffix(";base64")?;
        let bytes = general_purpose::STANDARD.decode(payload).ok()?;
        Some(Self::detect(bytes, Some(declared), None))
    }
}

fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

fn mime_type_from_path(path: &Path) -> Option<&'static str> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|f| f.to_mime_type())
}
