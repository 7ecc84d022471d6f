//! # use-image-picker
//!
//! A Dioxus hook that picks an image from the device media library and
//! optionally uploads it through a function you supply.
//!
//! This crate provides:
//! - `use_image_picker`, returning a `Copy` handle with `uri()`, `is_picked()`,
//!   `pick()`, `pick_and_upload()`, `upload()` and `reset()`
//! - `ImagePicker`, the same state container without Dioxus, for other owners
//! - Blob and base64 data URL payloads for the upload function
//!
//! Platform access (permissions, the native picker) lives in the
//! `media-picker` crate.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use use_image_picker::{use_image_picker, UploadData, UploadOptions, UseImagePickerProps};
//!
//! #[component]
//! fn Avatar() -> Element {
//!     let picker = use_image_picker(UseImagePickerProps {
//!         permission_not_granted_text: Some("We need your photos!".to_string()),
//!         ..Default::default()
//!     });
//!
//!     rsx! {
//!         button { onclick: move |_| async move { let _ = picker.pick().await; }, "Pick" }
//!         button {
//!             disabled: !picker.is_picked(),
//!             onclick: move |_| async move {
//!                 let _ = picker
//!                     .upload(
//!                         |data: UploadData| async move { api::put_avatar(data).await },
//!                         UploadOptions::default(),
//!                     )
//!                     .await;
//!             },
//!             "Upload"
//!         }
//!     }
//! }
//! ```

pub mod blob;
pub mod error;
pub mod fetch;
pub mod hook;
pub mod image_picker;
pub mod logging;
pub mod models;
pub mod state;

pub use blob::Blob;
pub use error::{BoxError, ImagePickerError, DEFAULT_PERMISSION_NOT_GRANTED_TEXT};
pub use fetch::{HttpFetcher, ResourceFetcher};
pub use hook::{use_image_picker, UseImagePicker};
pub use image_picker::ImagePicker;
pub use logging::init_logging;
pub use models::{UploadAfterPick, UploadData, UploadMode, UploadOptions, UseImagePickerProps};
pub use state::{Liveness, PickedResource, UriStore};

pub use media_picker::{
    AndroidPickerConfig, DeviceMediaLibrary, ImagePickerOptions, MediaLibrary, MediaTypes,
    PermissionStatus, PickerError, PickerResult, Platform,
};
