// Platform-specific image picker implementation
//
// On Android the picker and the permission dialog live in the host activity and
// are driven over JNI. On desktop and in the browser a file dialog stands in
// for the media library when the `dialog` feature is enabled. Everything else
// reports `PlatformNotSupported`.

use crate::options::ImagePickerOptions;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum PickerError {
    Timeout(String),
    PlatformNotSupported(String),
    Other(String),
}

impl std::fmt::Display for PickerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickerError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            PickerError::PlatformNotSupported(msg) => write!(f, "Platform not supported: {}", msg),
            PickerError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for PickerError {}

/// Answer to a media library permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }

    /// Parses the status string reported by the host activity
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" => PermissionStatus::Granted,
            "denied" => PermissionStatus::Denied,
            _ => PermissionStatus::Undetermined,
        }
    }
}

/// Outcome of one picker dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerResult {
    pub cancelled: bool,
    pub uri: Option<String>,
}

impl PickerResult {
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            uri: None,
        }
    }

    pub fn picked(uri: impl Into<String>) -> Self {
        Self {
            cancelled: false,
            uri: Some(uri.into()),
        }
    }

    /// The picked locator, `None` when the dialog was dismissed
    pub fn into_uri(self) -> Option<String> {
        if self.cancelled {
            None
        } else {
            self.uri
        }
    }
}

/// Turns an absolute file path into a percent-encoded `file://` locator
#[cfg(not(target_arch = "wasm32"))]
pub fn path_to_uri(path: &Path) -> Result<String, PickerError> {
    url::Url::from_file_path(path)
        .map(String::from)
        .map_err(|()| PickerError::Other(format!("Not an absolute path: {}", path.display())))
}

/// Guesses the MIME type of a picked file from its name
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

#[cfg(all(feature = "dialog", target_arch = "wasm32"))]
fn inline_uri(name: &str, bytes: &[u8]) -> String {
    use base64::{engine::general_purpose, Engine as _};
    format!(
        "data:{};base64,{}",
        mime_from_name(name),
        general_purpose::STANDARD.encode(bytes)
    )
}

const DEFAULT_MAIN_ACTIVITY_CLASS: &str = "dev/dioxus/main/MainActivity";

/// Configuration for the picker on Android
///
/// This allows customization of the MainActivity class name for different apps.
#[derive(Debug, Clone)]
pub struct AndroidPickerConfig {
    /// Fully qualified class name in slash format (e.g., "com/example/myapp/MainActivity")
    pub main_activity_class: String,
    /// How long to wait for the user before giving up
    pub timeout: std::time::Duration,
}

impl Default for AndroidPickerConfig {
    fn default() -> Self {
        Self {
            main_activity_class: DEFAULT_MAIN_ACTIVITY_CLASS.to_string(),
            timeout: std::time::Duration::from_secs(60),
        }
    }
}

/// Permission and picker collaborator consumed by the image picker hook
#[allow(async_fn_in_trait)]
pub trait MediaLibrary {
    /// Ask the user for media library access
    async fn request_permission(&self) -> Result<PermissionStatus, PickerError>;

    /// Open the library dialog and wait for the user
    async fn launch(&self, options: &ImagePickerOptions) -> Result<PickerResult, PickerError>;
}

/// The media library of the device the app runs on
#[derive(Debug, Clone, Default)]
pub struct DeviceMediaLibrary {
    config: AndroidPickerConfig,
}

impl DeviceMediaLibrary {
    pub fn new(config: AndroidPickerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AndroidPickerConfig {
        &self.config
    }
}

#[cfg(target_os = "android")]
impl MediaLibrary for DeviceMediaLibrary {
    async fn request_permission(&self) -> Result<PermissionStatus, PickerError> {
        let config = self.config.clone();
        // JNI polling blocks, keep it off the UI thread
        tokio::task::spawn_blocking(move || crate::android::request_permission(&config))
            .await
            .map_err(|e| PickerError::Other(format!("Permission task failed: {}", e)))?
    }

    async fn launch(&self, options: &ImagePickerOptions) -> Result<PickerResult, PickerError> {
        let config = self.config.clone();
        let options_json = options
            .to_json()
            .map_err(|e| PickerError::Other(format!("Invalid picker options: {}", e)))?;
        tokio::task::spawn_blocking(move || crate::android::launch_picker(&config, &options_json))
            .await
            .map_err(|e| PickerError::Other(format!("Picker task failed: {}", e)))?
    }
}

#[cfg(all(feature = "dialog", not(target_os = "android")))]
impl MediaLibrary for DeviceMediaLibrary {
    async fn request_permission(&self) -> Result<PermissionStatus, PickerError> {
        // File dialogs need no media permission
        Ok(PermissionStatus::Granted)
    }

    async fn launch(&self, options: &ImagePickerOptions) -> Result<PickerResult, PickerError> {
        let extensions: &[&str] = match options.media_types {
            crate::options::MediaTypes::Images => &["png", "jpg", "jpeg", "webp", "gif", "heic"],
            crate::options::MediaTypes::Videos => &["mp4", "mov", "webm", "mkv"],
            crate::options::MediaTypes::All => &[
                "png", "jpg", "jpeg", "webp", "gif", "heic", "mp4", "mov", "webm", "mkv",
            ],
        };

        let picked = rfd::AsyncFileDialog::new()
            .add_filter("media", extensions)
            .set_title("Select Image")
            .pick_file()
            .await;

        match picked {
            #[cfg(not(target_arch = "wasm32"))]
            Some(handle) => {
                let uri = path_to_uri(handle.path())?;
                log::debug!("Dialog picked {}", uri);
                Ok(PickerResult::picked(uri))
            }
            #[cfg(target_arch = "wasm32")]
            Some(handle) => {
                let name = handle.file_name();
                let bytes = handle.read().await;
                log::debug!("Dialog picked {} ({} bytes)", name, bytes.len());
                Ok(PickerResult::picked(inline_uri(&name, &bytes)))
            }
            None => Ok(PickerResult::cancelled()),
        }
    }
}

#[cfg(not(any(target_os = "android", feature = "dialog")))]
impl MediaLibrary for DeviceMediaLibrary {
    async fn request_permission(&self) -> Result<PermissionStatus, PickerError> {
        Err(unsupported())
    }

    async fn launch(&self, _options: &ImagePickerOptions) -> Result<PickerResult, PickerError> {
        Err(unsupported())
    }
}

#[cfg(not(any(target_os = "android", feature = "dialog")))]
fn unsupported() -> PickerError {
    PickerError::PlatformNotSupported(format!(
        "Image picker not available on {}",
        crate::platform::Platform::current()
    ))
}
