//! # Media Picker
//!
//! Platform bridge for picking a single image from the device media library.
//!
//! This crate provides:
//! - Platform detection (`Platform::current()`)
//! - Media library permission requests
//! - The native picker dialog (Android via JNI, desktop and browser via a
//!   file dialog when the `dialog` feature is enabled; browser picks come
//!   back as `data:` URLs since there is no file path)
//! - Pass-through picker options (`ImagePickerOptions`)
//!
//! ## Separation of Concerns
//!
//! This crate only talks to the platform. It does **not**:
//! - Hold any picked state (handled by the hook crate)
//! - Fetch or upload image bytes
//!
//! ## Android Activity Contract
//!
//! The configured activity class (see [`AndroidPickerConfig`]) must expose:
//! - `requestMediaLibraryPermission()V` and static
//!   `getMediaPermissionStatus()Ljava/lang/String;` returning `"granted"`,
//!   `"denied"` or `null` while the dialog is open
//! - `launchImagePickerWithOptions(Ljava/lang/String;)V` receiving the
//!   options as JSON
//! - static `getLastPhotoPath()`, `getLastError()`, `clearLastError()` and
//!   `wasCancelled()Z`
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use media_picker::{DeviceMediaLibrary, ImagePickerOptions, MediaLibrary};
//!
//! let library = DeviceMediaLibrary::default();
//! let result = library.launch(&ImagePickerOptions::default()).await?;
//! if let Some(uri) = result.uri {
//!     log::info!("picked {}", uri);
//! }
//! ```

#[cfg(target_os = "android")]
mod android;

pub mod options;
pub mod picker;
pub mod platform;

pub use options::{ImagePickerOptions, MediaTypes};
pub use picker::{
    AndroidPickerConfig, DeviceMediaLibrary, MediaLibrary, PermissionStatus, PickerError,
    PickerResult,
};
pub use platform::Platform;
