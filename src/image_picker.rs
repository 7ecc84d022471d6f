//! Framework independent image picker state container
//!
//! Holds the picked locator and implements `pick`, `upload` and `reset` on top
//! of a [`MediaLibrary`] and a [`ResourceFetcher`]. The Dioxus hook in
//! [`crate::hook`] is a thin wrapper around this type.

use crate::error::{BoxError, ImagePickerError};
use crate::fetch::{HttpFetcher, ResourceFetcher};
use crate::models::{UploadAfterPick, UploadData, UploadMode, UploadOptions, UseImagePickerProps};
use crate::state::{Liveness, UriStore};
use media_picker::{DeviceMediaLibrary, MediaLibrary, Platform};
use std::future::Future;
use std::rc::Rc;

#[derive(Clone)]
pub struct ImagePicker<S, L = DeviceMediaLibrary, F = HttpFetcher> {
    state: S,
    library: L,
    fetcher: F,
    props: Rc<UseImagePickerProps>,
    liveness: Liveness,
    platform: Platform,
}

impl<S, L, F> ImagePicker<S, L, F>
where
    S: UriStore,
    L: MediaLibrary,
    F: ResourceFetcher,
{
    pub fn new(state: S, library: L, fetcher: F, props: UseImagePickerProps) -> Self {
        Self {
            state,
            library,
            fetcher,
            props: Rc::new(props),
            liveness: Liveness::new(),
            platform: Platform::current(),
        }
    }

    /// Shares the owner's liveness token instead of a private one
    pub fn with_liveness(mut self, liveness: Liveness) -> Self {
        self.liveness = liveness;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    pub fn props(&self) -> &UseImagePickerProps {
        &self.props
    }

    pub fn set_props(&mut self, props: UseImagePickerProps) {
        self.props = Rc::new(props);
    }

    /// The locator of the selected image
    pub fn uri(&self) -> Option<String> {
        self.state.get()
    }

    /// Same as `uri().is_some()`, but prettier
    pub fn is_picked(&self) -> bool {
        self.state.get().is_some()
    }

    /// Picks an image and stores its locator.
    ///
    /// Dismissing the dialog is not an error and leaves the state alone.
    pub async fn pick(&self) -> Result<(), ImagePickerError> {
        if let Some(uri) = self.pick_uri().await? {
            self.write_state(Some(uri));
        }
        Ok(())
    }

    /// Picks an image and immediately uploads it without storing the locator.
    ///
    /// Returns `None` when the dialog was dismissed, otherwise the value of
    /// the upload function.
    pub async fn pick_and_upload<U, Fut, T, E>(
        &self,
        after: UploadAfterPick<U>,
    ) -> Result<Option<T>, ImagePickerError>
    where
        U: FnOnce(UploadData) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        match self.pick_uri().await? {
            Some(uri) => {
                let value = self
                    .upload_uri(Some(uri), after.upload_function, after.options)
                    .await?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Uploads the picked image through `fun`.
    ///
    /// Errors returned by `fun` are passed through as
    /// [`ImagePickerError::Upload`] and leave the picked image in place.
    pub async fn upload<U, Fut, T, E>(
        &self,
        fun: U,
        options: UploadOptions,
    ) -> Result<T, ImagePickerError>
    where
        U: FnOnce(UploadData) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        self.upload_uri(self.state.get(), fun, options).await
    }

    /// Forgets the picked image
    pub fn reset(&self) {
        self.write_state(None);
    }

    async fn pick_uri(&self) -> Result<Option<String>, ImagePickerError> {
        if !self.platform.is_web() {
            let status = self.library.request_permission().await?;
            if !status.is_granted() {
                log::warn!("Media library permission not granted: {:?}", status);
                return Err(ImagePickerError::PermissionDenied(
                    self.props.permission_text().to_string(),
                ));
            }
        }

        let result = self.library.launch(&self.props.picker_options).await?;
        let uri = result.into_uri();
        match &uri {
            Some(uri) => log::info!("Picked image {}", uri),
            None => log::debug!("Image picker cancelled"),
        }
        Ok(uri)
    }

    async fn upload_uri<U, Fut, T, E>(
        &self,
        uri: Option<String>,
        fun: U,
        options: UploadOptions,
    ) -> Result<T, ImagePickerError>
    where
        U: FnOnce(UploadData) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        let uri = uri.ok_or(ImagePickerError::NotSet)?;
        let blob = self.fetcher.fetch(&uri).await?;
        log::debug!(
            "Uploading {} ({} bytes, {}) as {:?}",
            uri,
            blob.len(),
            blob.mime_type(),
            options.mode
        );

        // The blob is moved into the payload or dropped right after encoding,
        // so it is released however the upload function ends.
        let data = match options.mode {
            UploadMode::Blob => UploadData::Binary(blob),
            UploadMode::Base64 => UploadData::Base64Text(blob.to_data_url()),
        };

        let value = fun(data).await.map_err(|e| {
            let e: BoxError = e.into();
            log::warn!("Upload of {} failed: {}", uri, e);
            ImagePickerError::Upload(e)
        })?;

        log::info!("Uploaded {}", uri);
        if options.reset_on_success {
            self.write_state(None);
        }
        Ok(value)
    }

    fn write_state(&self, uri: Option<String>) {
        if !self.liveness.is_alive() {
            log::debug!("Image picker owner is gone, dropping state update");
            return;
        }
        self.state.set(uri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::Blob;
    use crate::state::PickedResource;
    use media_picker::{ImagePickerOptions, PermissionStatus, PickerError, PickerResult};
    use std::cell::{Cell, RefCell};

    const PICKED: &str = "file:///tmp/a.jpg";

    #[derive(Clone)]
    struct FakeLibrary {
        permission: PermissionStatus,
        result: PickerResult,
        permission_requests: Rc<Cell<u32>>,
        launches: Rc<Cell<u32>>,
        seen_options: Rc<RefCell<Option<ImagePickerOptions>>>,
    }

    impl FakeLibrary {
        fn picking(uri: &str) -> Self {
            Self {
                permission: PermissionStatus::Granted,
                result: PickerResult::picked(uri),
                permission_requests: Rc::new(Cell::new(0)),
                launches: Rc::new(Cell::new(0)),
                seen_options: Rc::new(RefCell::new(None)),
            }
        }

        fn cancelling() -> Self {
            Self {
                result: PickerResult::cancelled(),
                ..Self::picking(PICKED)
            }
        }

        fn denying() -> Self {
            Self {
                permission: PermissionStatus::Denied,
                ..Self::picking(PICKED)
            }
        }
    }

    impl MediaLibrary for FakeLibrary {
        async fn request_permission(&self) -> Result<PermissionStatus, PickerError> {
            self.permission_requests.set(self.permission_requests.get() + 1);
            Ok(self.permission)
        }

        async fn launch(&self, options: &ImagePickerOptions) -> Result<PickerResult, PickerError> {
            self.launches.set(self.launches.get() + 1);
            *self.seen_options.borrow_mut() = Some(options.clone());
            Ok(self.result.clone())
        }
    }

    #[derive(Clone)]
    struct FakeFetcher {
        fail: bool,
        fetched: Rc<RefCell<Vec<String>>>,
    }

    impl FakeFetcher {
        fn ok() -> Self {
            Self {
                fail: false,
                fetched: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }
    }

    impl ResourceFetcher for FakeFetcher {
        async fn fetch(&self, uri: &str) -> Result<Blob, ImagePickerError> {
            self.fetched.borrow_mut().push(uri.to_string());
            if self.fail {
                return Err(ImagePickerError::Network("connection reset".to_string()));
            }
            Ok(Blob::new(b"jpegbytes".to_vec(), "image/jpeg"))
        }
    }

    fn picker(
        library: FakeLibrary,
        fetcher: FakeFetcher,
    ) -> ImagePicker<PickedResource, FakeLibrary, FakeFetcher> {
        ImagePicker::new(
            PickedResource::new(),
            library,
            fetcher,
            UseImagePickerProps::default(),
        )
        .with_platform(Platform::Android)
    }

    fn assert_consistent<L: MediaLibrary, F: ResourceFetcher>(
        p: &ImagePicker<PickedResource, L, F>,
    ) {
        assert_eq!(p.is_picked(), p.uri().is_some());
    }

    #[tokio::test]
    async fn test_pick_then_upload_resets() {
        let p = picker(FakeLibrary::picking(PICKED), FakeFetcher::ok());
        assert!(!p.is_picked());

        p.pick().await.unwrap();
        assert!(p.is_picked());
        assert_eq!(p.uri(), Some(PICKED.to_string()));

        p.upload(
            |_data| async { Ok::<_, BoxError>(()) },
            UploadOptions::default(),
        )
        .await
        .unwrap();
        assert!(!p.is_picked());
        assert_consistent(&p);
    }

    #[tokio::test]
    async fn test_cancelled_pick_keeps_state() {
        let p = picker(FakeLibrary::cancelling(), FakeFetcher::ok());
        p.pick().await.unwrap();
        assert_eq!(p.uri(), None);

        // Previously picked image survives a cancelled dialog
        p.state.set(Some("file:///tmp/old.jpg".to_string()));
        p.pick().await.unwrap();
        assert_eq!(p.uri(), Some("file:///tmp/old.jpg".to_string()));
        assert_consistent(&p);
    }

    #[tokio::test]
    async fn test_permission_denied_uses_custom_text() {
        let library = FakeLibrary::denying();
        let mut p = picker(library.clone(), FakeFetcher::ok());
        p.set_props(UseImagePickerProps {
            permission_not_granted_text: Some("Nós precisamos da permissão!".to_string()),
            ..Default::default()
        });

        let err = p.pick().await.unwrap_err();
        match err {
            ImagePickerError::PermissionDenied(msg) => {
                assert_eq!(msg, "Nós precisamos da permissão!")
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(library.launches.get(), 0);
        assert!(!p.is_picked());
    }

    #[tokio::test]
    async fn test_web_skips_permission_request() {
        let library = FakeLibrary::denying();
        let p = picker(library.clone(), FakeFetcher::ok()).with_platform(Platform::Web);

        p.pick().await.unwrap();
        assert_eq!(library.permission_requests.get(), 0);
        assert_eq!(library.launches.get(), 1);
        assert!(p.is_picked());
    }

    #[tokio::test]
    async fn test_picker_options_are_forwarded() {
        let library = FakeLibrary::picking(PICKED);
        let mut p = picker(library.clone(), FakeFetcher::ok());
        p.set_props(UseImagePickerProps {
            picker_options: ImagePickerOptions {
                allows_editing: true,
                aspect: Some((1, 1)),
                ..Default::default()
            },
            permission_not_granted_text: Some("no".to_string()),
        });

        p.pick().await.unwrap();
        let seen = library.seen_options.borrow().clone().unwrap();
        assert!(seen.allows_editing);
        assert_eq!(seen.aspect, Some((1, 1)));
    }

    #[tokio::test]
    async fn test_upload_without_pick_is_not_set() {
        let fetcher = FakeFetcher::ok();
        let p = picker(FakeLibrary::picking(PICKED), fetcher.clone());
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();

        let err = p
            .upload(
                move |_data| {
                    flag.set(true);
                    async { Ok::<_, BoxError>(()) }
                },
                UploadOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ImagePickerError::NotSet));
        assert!(!called.get());
        assert!(fetcher.fetched.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_base64_mode_passes_data_url() {
        let p = picker(FakeLibrary::picking(PICKED), FakeFetcher::ok());
        p.pick().await.unwrap();

        let payload = p
            .upload(
                |data| async move {
                    match data {
                        UploadData::Base64Text(s) => Ok::<_, BoxError>(s),
                        UploadData::Binary(_) => Err("expected base64".into()),
                    }
                },
                UploadOptions::base64(),
            )
            .await
            .unwrap();

        assert!(payload.starts_with("data:image/jpeg;base64,"));
        assert_eq!(payload, "data:image/jpeg;base64,anBlZ2J5dGVz");
    }

    #[tokio::test]
    async fn test_blob_mode_passes_bytes() {
        let p = picker(FakeLibrary::picking(PICKED), FakeFetcher::ok());
        p.pick().await.unwrap();

        let len = p
            .upload(
                |data| async move {
                    let blob = data.as_blob().ok_or("expected blob")?;
                    Ok::<_, BoxError>(blob.len())
                },
                UploadOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(len, 9);
    }

    #[tokio::test]
    async fn test_keep_picked_after_upload() {
        let p = picker(FakeLibrary::picking(PICKED), FakeFetcher::ok());
        p.pick().await.unwrap();

        p.upload(
            |_data| async { Ok::<_, BoxError>(()) },
            UploadOptions::default().keep_picked(),
        )
        .await
        .unwrap();
        assert_eq!(p.uri(), Some(PICKED.to_string()));
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_state_and_propagates() {
        let p = picker(FakeLibrary::picking(PICKED), FakeFetcher::ok());
        p.pick().await.unwrap();

        let err = p
            .upload(
                |_data| async { Err::<(), _>("413 Payload Too Large") },
                UploadOptions::default(),
            )
            .await
            .unwrap_err();

        match err {
            ImagePickerError::Upload(e) => assert_eq!(e.to_string(), "413 Payload Too Large"),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(p.uri(), Some(PICKED.to_string()));
    }

    #[tokio::test]
    async fn test_network_error_skips_upload_function() {
        let p = picker(FakeLibrary::picking(PICKED), FakeFetcher::failing());
        p.pick().await.unwrap();
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();

        let err = p
            .upload(
                move |_data| {
                    flag.set(true);
                    async { Ok::<_, BoxError>(()) }
                },
                UploadOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ImagePickerError::Network(_)));
        assert!(!called.get());
        assert!(p.is_picked());
    }

    #[tokio::test]
    async fn test_pick_and_upload_never_stores_locator() {
        let fetcher = FakeFetcher::ok();
        let p = picker(FakeLibrary::picking(PICKED), fetcher.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        p.state.subscribe({
            let seen = seen.clone();
            move |uri| seen.borrow_mut().push(uri.map(str::to_string))
        });

        let value = p
            .pick_and_upload(
                UploadAfterPick::new(|_data| async { Ok::<_, BoxError>("stored") })
                    .with_options(UploadOptions::default().keep_picked()),
            )
            .await
            .unwrap();

        assert_eq!(value, Some("stored"));
        assert_eq!(*fetcher.fetched.borrow(), vec![PICKED.to_string()]);
        assert!(!p.is_picked());
        assert!(seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_pick_and_upload_cancelled() {
        let fetcher = FakeFetcher::ok();
        let p = picker(FakeLibrary::cancelling(), fetcher.clone());

        let value = p
            .pick_and_upload(UploadAfterPick::new(|_data| async { Ok::<_, BoxError>(()) }))
            .await
            .unwrap();

        assert_eq!(value, None);
        assert!(fetcher.fetched.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let p = picker(FakeLibrary::picking(PICKED), FakeFetcher::ok());
        p.reset();
        assert!(!p.is_picked());

        p.pick().await.unwrap();
        p.reset();
        p.reset();
        assert!(!p.is_picked());
        assert_consistent(&p);
    }

    #[tokio::test]
    async fn test_dead_owner_blocks_state_writes() {
        let p = picker(FakeLibrary::picking(PICKED), FakeFetcher::ok());
        p.liveness().kill();

        p.pick().await.unwrap();
        assert!(!p.is_picked());
    }

    #[tokio::test]
    async fn test_shared_liveness_token() {
        let token = Liveness::new();
        let p =
            picker(FakeLibrary::picking(PICKED), FakeFetcher::ok()).with_liveness(token.clone());
        p.pick().await.unwrap();
        assert!(p.is_picked());

        token.kill();
        p.upload(
            |_data| async { Ok::<_, BoxError>(()) },
            UploadOptions::default(),
        )
        .await
        .unwrap();
        // Upload ran but the reset was skipped
        assert!(p.is_picked());
    }
}
