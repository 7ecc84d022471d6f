use serde::{Deserialize, Serialize};

/// Kind of media the library dialog offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MediaTypes {
    #[default]
    Images,
    Videos,
    All,
}

/// Options forwarded untouched to the native picker
///
/// There is no base64 switch. The picker only hands back a locator and
/// encoding happens after the bytes are fetched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagePickerOptions {
    pub media_types: MediaTypes,
    /// Show the platform crop/edit UI after picking
    pub allows_editing: bool,
    /// Crop aspect ratio `(width, height)`, only used with `allows_editing`
    pub aspect: Option<(u32, u32)>,
    /// Compression quality from 0.0 (smallest) to 1.0 (best)
    pub quality: Option<f32>,
    /// Include EXIF data in the picker result
    pub exif: bool,
}

impl ImagePickerOptions {
    /// Copy with the quality clamped into `0.0..=1.0`
    pub fn normalized(&self) -> Self {
        Self {
            quality: self.quality.map(|q| q.clamp(0.0, 1.0)),
            ..self.clone()
        }
    }

    /// JSON payload handed to the Android activity
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.normalized())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
