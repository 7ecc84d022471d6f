use media_picker::PickerError;
use std::fmt;

/// Boxed error returned by a caller-supplied upload function
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Default text for [`ImagePickerError::PermissionDenied`]
pub const DEFAULT_PERMISSION_NOT_GRANTED_TEXT: &str =
    "We need access to your media library to pick an image!";

/// Central error type of the image picker hook
#[derive(Debug)]
pub enum ImagePickerError {
    /// Media library permission was not granted
    PermissionDenied(String),
    /// `upload` was called without a picked image
    NotSet,
    /// Fetching the picked resource failed
    Network(String),
    /// The platform picker itself failed (timeout, unsupported platform)
    Picker(PickerError),
    /// Error returned by the caller's upload function, untouched
    Upload(BoxError),
}

impl fmt::Display for ImagePickerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImagePickerError::PermissionDenied(msg) => write!(f, "{}", msg),
            ImagePickerError::NotSet => write!(f, "Image not set!"),
            ImagePickerError::Network(msg) => write!(f, "Network request failed: {}", msg),
            ImagePickerError::Picker(e) => write!(f, "Picker error: {}", e),
            ImagePickerError::Upload(e) => write!(f, "Upload failed: {}", e),
        }
    }
}

impl std::error::Error for ImagePickerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImagePickerError::Picker(e) => Some(e),
            ImagePickerError::Upload(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<PickerError> for ImagePickerError {
    fn from(e: PickerError) -> Self {
        ImagePickerError::Picker(e)
    }
}

/// User-friendly error messages for UI
impl ImagePickerError {
    pub fn user_message(&self) -> String {
        match self {
            ImagePickerError::PermissionDenied(msg) => msg.clone(),
            ImagePickerError::NotSet => "Please pick an image first.".to_string(),
            ImagePickerError::Network(_) => {
                "Could not read the selected image. Please try again.".to_string()
            }
            ImagePickerError::Picker(PickerError::PlatformNotSupported(_)) => {
                "Picking images is not supported on this device.".to_string()
            }
            ImagePickerError::Picker(_) => "The image picker failed. Please try again.".to_string(),
            ImagePickerError::Upload(e) => format!("Upload failed: {}", e),
        }
    }

    /// True for the error raised before the picker ever opened
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ImagePickerError::PermissionDenied(_))
    }
}
