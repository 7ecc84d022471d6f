use crate::blob::Blob;
use crate::error::DEFAULT_PERMISSION_NOT_GRANTED_TEXT;
use media_picker::ImagePickerOptions;
use serde::{Deserialize, Serialize};

/// Encoding handed to the upload function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    #[default]
    Blob,
    Base64,
}

/// Options for one upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadOptions {
    pub mode: UploadMode,
    /// Clear the picked image once the upload function succeeded.
    /// Useful for disabling an upload button and cleaning a form's dirtiness.
    pub reset_on_success: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            mode: UploadMode::Blob,
            reset_on_success: true,
        }
    }
}

impl UploadOptions {
    pub fn base64() -> Self {
        Self {
            mode: UploadMode::Base64,
            ..Default::default()
        }
    }

    pub fn keep_picked(mut self) -> Self {
        self.reset_on_success = false;
        self
    }
}

/// Payload passed to the upload function
#[derive(Debug, Clone, PartialEq)]
pub enum UploadData {
    /// Raw fetched bytes (`UploadMode::Blob`)
    Binary(Blob),
    /// `data:<mime>;base64,...` string (`UploadMode::Base64`)
    Base64Text(String),
}

impl UploadData {
    pub fn mode(&self) -> UploadMode {
        match self {
            UploadData::Binary(_) => UploadMode::Blob,
            UploadData::Base64Text(_) => UploadMode::Base64,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            UploadData::Binary(blob) => Some(blob),
            UploadData::Base64Text(_) => None,
        }
    }

    pub fn as_data_url(&self) -> Option<&str> {
        match self {
            UploadData::Binary(_) => None,
            UploadData::Base64Text(s) => Some(s),
        }
    }
}

/// Chains a pick straight into an upload without storing the locator
pub struct UploadAfterPick<U> {
    pub upload_function: U,
    pub options: UploadOptions,
}

impl<U> UploadAfterPick<U> {
    pub fn new(upload_function: U) -> Self {
        Self {
            upload_function,
            options: UploadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: UploadOptions) -> Self {
        self.options = options;
        self
    }
}

/// Configuration of one image picker instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UseImagePickerProps {
    /// Forwarded to the platform picker
    #[serde(flatten)]
    pub picker_options: ImagePickerOptions,
    /// Error text used when the user doesn't grant media library access
    pub permission_not_granted_text: Option<String>,
}

impl UseImagePickerProps {
    pub fn permission_text(&self) -> &str {
        self.permission_not_granted_text
            .as_deref()
            .unwrap_or(DEFAULT_PERMISSION_NOT_GRANTED_TEXT)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
