//! Fetching the bytes behind a picked resource locator
//!
//! Native pickers hand back `file://` locators, browser picks arrive inline as
//! `data:` URLs and remote sources use `http(s)://`. All of them end up as a
//! [`Blob`].

use crate::blob::Blob;
use crate::error::ImagePickerError;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

/// Network collaborator consumed by the upload routine
#[allow(async_fn_in_trait)]
pub trait ResourceFetcher {
    async fn fetch(&self, uri: &str) -> Result<Blob, ImagePickerError>;
}

/// Fetches `http(s)` locators with reqwest, `file` locators from disk and
/// decodes `data` locators in place
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ImagePickerError> {
        let builder = reqwest::Client::builder();
        // Browsers own timeouts and the user agent
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent("UseImagePicker/0.1.0");
        let client = builder
            .build()
            .map_err(|e| ImagePickerError::Network(format!("Client build failed: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_http(&self, uri: &str) -> Result<Blob, ImagePickerError> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| ImagePickerError::Network(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ImagePickerError::Network(format!(
                "Server returned status: {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Grows with the data actually received, the Content-Length header is not trusted
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImagePickerError::Network(format!("Reading body failed: {}", e)))?;

        log::debug!("Fetched {} bytes from {}", bytes.len(), uri);
        Ok(Blob::detect(bytes.to_vec(), content_type.as_deref(), None))
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn fetch_file(&self, path: PathBuf) -> Result<Blob, ImagePickerError> {
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            ImagePickerError::Network(format!("Reading {} failed: {}", path.display(), e))
        })?;
        log::debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Blob::detect(bytes, None, Some(&path)))
    }
}

impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, uri: &str) -> Result<Blob, ImagePickerError> {
        match Locator::parse(uri)? {
            Locator::Remote(url) => self.fetch_http(url).await,
            #[cfg(not(target_arch = "wasm32"))]
            Locator::File(path) => self.fetch_file(path).await,
            Locator::Inline(url) => Blob::from_data_url(url).ok_or_else(|| {
                ImagePickerError::Network("Only base64 data URLs are supported".to_string())
            }),
        }
    }
}

/// Where the bytes of a resource live
#[derive(Debug, PartialEq)]
enum Locator<'a> {
    Remote(&'a str),
    #[cfg(not(target_arch = "wasm32"))]
    File(PathBuf),
    Inline(&'a str),
}

impl<'a> Locator<'a> {
    fn parse(uri: &'a str) -> Result<Self, ImagePickerError> {
        // Bare paths, including `C:\...` which would otherwise parse as scheme `c`
        #[cfg(not(target_arch = "wasm32"))]
        if Path::new(uri).is_absolute() {
            return Ok(Locator::File(PathBuf::from(uri)));
        }

        let url = reqwest::Url::parse(uri).map_err(|e| {
            ImagePickerError::Network(format!("Invalid resource locator {}: {}", uri, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Locator::Remote(uri)),
            "data" => Ok(Locator::Inline(uri)),
            #[cfg(not(target_arch = "wasm32"))]
            "file" => url.to_file_path().map(Locator::File).map_err(|()| {
                ImagePickerError::Network(format!("Not a local file: {}", uri))
            }),
            other => Err(ImagePickerError::Network(format!(
                "Unsupported resource locator scheme {}: {}",
                other, uri
            ))),
        }
    }
}
