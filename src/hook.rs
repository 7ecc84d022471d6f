use crate::error::{BoxError, ImagePickerError};
use crate::fetch::HttpFetcher;
use crate::image_picker::ImagePicker;
use crate::models::{UploadAfterPick, UploadData, UploadOptions, UseImagePickerProps};
use crate::state::{Liveness, UriStore};
use dioxus::prelude::*;
use media_picker::DeviceMediaLibrary;
use std::future::Future;

impl UriStore for Signal<Option<String>> {
    fn get(&self) -> Option<String> {
        // peek: async completion handlers must not subscribe the component
        (*self.peek()).clone()
    }

    fn set(&self, uri: Option<String>) {
        let mut signal = *self;
        *signal.write() = uri;
    }
}

type SignalPicker = ImagePicker<Signal<Option<String>>, DeviceMediaLibrary, HttpFetcher>;

/// Handle returned by [`use_image_picker`]
///
/// `Copy`, so it can be moved into event handlers and `spawn`ed futures freely.
#[derive(Clone, Copy)]
pub struct UseImagePicker {
    uri: Signal<Option<String>>,
    inner: CopyValue<SignalPicker>,
}

impl UseImagePicker {
    /// The locator of the selected image
    pub fn uri(&self) -> Option<String> {
        (*self.uri.read()).clone()
    }

    /// Same as `uri().is_some()`, but prettier
    pub fn is_picked(&self) -> bool {
        self.uri.read().is_some()
    }

    fn picker(&self) -> SignalPicker {
        (*self.inner.peek()).clone()
    }

    /// Picks an image.
    ///
    /// Fails if the user doesn't grant the media library permission.
    pub async fn pick(&self) -> Result<(), ImagePickerError> {
        self.picker().pick().await
    }

    /// Picks an image and uploads it right away.
    ///
    /// Prefer this over `pick()` followed by `upload()`: the locator is handed
    /// straight to the upload and never written to the component state.
    pub async fn pick_and_upload<U, Fut, T, E>(
        &self,
        after: UploadAfterPick<U>,
    ) -> Result<Option<T>, ImagePickerError>
    where
        U: FnOnce(UploadData) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        self.picker().pick_and_upload(after).await
    }

    /// Uploads the picked image
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
        self.picker().upload(fun, options).await
    }

    /// Resets the picked image. Automatically called after a successful
    /// upload unless `reset_on_success` is off.
    pub fn reset(&self) {
        self.picker().reset();
    }
}

/// Image picker hook
///
/// # Example
/// ```rust,ignore
/// let picker = use_image_picker(UseImagePickerProps::default());
///
/// rsx! {
///     button {
///         onclick: move |_| async move {
///             if let Err(e) = picker.pick().await {
///                 error.set(Some(e.user_message()));
///             }
///         },
///         "Pick"
///     }
///     button {
///         disabled: !picker.is_picked(),
///         onclick: move |_| async move {
///             let _ = picker
///                 .upload(|data| send_to_server(data), UploadOptions::base64())
///                 .await;
///         },
///         "Upload"
///     }
/// }
/// ```
pub fn use_image_picker(props: UseImagePickerProps) -> UseImagePicker {
    let uri = use_signal(|| None::<String>);
    let liveness = use_hook(Liveness::new);

    let mut inner = use_hook(|| {
        let fetcher = HttpFetcher::new().unwrap_or_else(|e| {
            log::warn!("Falling back to default HTTP client: {}", e);
            HttpFetcher::with_client(reqwest::Client::new())
        });
        CopyValue::new(
            ImagePicker::new(uri, DeviceMediaLibrary::default(), fetcher, props.clone())
                .with_liveness(liveness.clone()),
        )
    });

    // Props may change between renders, the picker always uses the latest
    if inner.peek().props() != &props {
        inner.write().set_props(props);
    }

    use_drop(move || liveness.kill());

    UseImagePicker { uri, inner }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    thread_local! {
        static OBSERVED: RefCell<Vec<(bool, Option<String>)>> = const { RefCell::new(Vec::new()) };
        static SHOW_CHILD: Cell<bool> = const { Cell::new(true) };
        static CHILD_LIVENESS: RefCell<Option<Liveness>> = const { RefCell::new(None) };
    }

    #[allow(non_snake_case)]
    fn PickerHarness() -> Element {
        let picker = use_image_picker(UseImagePickerProps {
            permission_not_granted_text: Some("Permission please".to_string()),
            ..Default::default()
        });
        OBSERVED.with(|o| o.borrow_mut().push((picker.is_picked(), picker.uri())));
        assert_eq!(picker.picker().props().permission_text(), "Permission please");
        rsx! { div {} }
    }

    #[allow(non_snake_case)]
    fn PickerChild() -> Element {
        let picker = use_image_picker(UseImagePickerProps::default());
        let liveness = picker.picker().liveness().clone();
        CHILD_LIVENESS.with(|l| *l.borrow_mut() = Some(liveness));
        rsx! { div {} }
    }

    #[allow(non_snake_case)]
    fn ToggleParent() -> Element {
        if SHOW_CHILD.with(Cell::get) {
            rsx! { PickerChild {} }
        } else {
            rsx! { div {} }
        }
    }

    #[test]
    fn test_hook_starts_unpicked() {
        let mut dom = VirtualDom::new(PickerHarness);
        dom.rebuild_in_place();

        OBSERVED.with(|o| {
            assert_eq!(*o.borrow(), vec![(false, None)]);
        });
    }

    #[test]
    fn test_hook_uri_store_round_trip() {
        let mut dom = VirtualDom::new(|| {
            let signal = use_signal(|| None::<String>);
            UriStore::set(&signal, Some("file:///tmp/a.jpg".to_string()));
            OBSERVED.with(|o| o.borrow_mut().push((true, UriStore::get(&signal))));
            rsx! { div {} }
        });
        dom.rebuild_in_place();

        OBSERVED.with(|o| {
            assert!(o.borrow().contains(&(true, Some("file:///tmp/a.jpg".to_string()))));
        });
    }

    #[test]
    fn test_unmount_kills_liveness() {
        SHOW_CHILD.with(|s| s.set(true));
        let mut dom = VirtualDom::new(ToggleParent);
        dom.rebuild_in_place();

        let liveness = CHILD_LIVENESS.with(|l| l.borrow().clone()).expect("child rendered");
        assert!(liveness.is_alive());

        SHOW_CHILD.with(|s| s.set(false));
        dom.mark_dirty(ScopeId::APP);
        dom.render_immediate_to_vec();

        // Late completion handlers of the removed child must not write state
        assert!(!liveness.is_alive());
    }

    #[test]
    fn test_dropping_the_dom_kills_liveness() {
        SHOW_CHILD.with(|s| s.set(true));
        let mut dom = VirtualDom::new(ToggleParent);
        dom.rebuild_in_place();

        let liveness = CHILD_LIVENESS.with(|l| l.borrow().clone()).expect("child rendered");
        assert!(liveness.is_alive());

        drop(dom);
        assert!(!liveness.is_alive());
    }
}
