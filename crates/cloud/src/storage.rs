//! Product image uploads.
//!
//! Images go to the object storage bucket when one is configured; if that
//! upload fails (or no bucket is configured) the bytes are written to the local
//! uploads directory and served under `/uploads/`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use oeiras_core::ValidationError;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use crate::config::ObjectStorageConfig;

/// Most files accepted in one upload.
pub const MAX_FILES: usize = 10;
/// Largest accepted file, in bytes.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
const MAX_FILE_NAME: usize = 255;
const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];
const BLOCKED_EXTENSIONS: &[&str] = &[
    "exe", "bat", "cmd", "com", "sh", "php", "js", "msi", "ps1", "vbs", "jar", "scr",
];

/// Errors storing or deleting an object.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("object storage error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One file from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lower-cased extension of the original file name.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Check name, size, extension and content type.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` describing the first problem.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.file_name.is_empty() || self.file_name.len() > MAX_FILE_NAME {
            return Err(ValidationError::invalid("imageFiles", "files with a name of at most 255 characters"));
        }
        if self.bytes.len() > MAX_FILE_BYTES {
            return Err(ValidationError::Other(format!(
                "{} is larger than 5MB",
                self.file_name
            )));
        }

        let lower = self.file_name.to_ascii_lowercase();
        if lower
            .split('.')
            .skip(1)
            .any(|part| BLOCKED_EXTENSIONS.contains(&part))
        {
            return Err(ValidationError::Other(format!(
                "{} has a forbidden file type",
                self.file_name
            )));
        }

        let extension_ok = self
            .extension()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
        let mime_ok = self
            .content_type
            .strip_prefix("image/")
            .is_some_and(|sub| ALLOWED_EXTENSIONS.contains(&sub));
        if !extension_ok || !mime_ok {
            return Err(ValidationError::Other(
                "Only image files (jpeg, jpg, png, gif, webp) are allowed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validate a whole upload batch.
///
/// # Errors
///
/// Returns `ValidationError` for too many files or any invalid file.
pub fn validate_batch(files: &[UploadedFile]) -> Result<(), ValidationError> {
    if files.len() > MAX_FILES {
        return Err(ValidationError::Other(format!(
            "At most {MAX_FILES} images can be uploaded at once"
        )));
    }
    files.iter().try_for_each(UploadedFile::validate)
}

/// `<millis>-<random>`, the unique part of every stored file name.
fn unique_stem() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("{millis}-{random}")
}

/// An object store holding public image files.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Store the bytes and return the public URL.
    async fn store(&self, file: &UploadedFile) -> Result<String, StorageError>;

    /// Whether `url` points into this store.
    fn owns(&self, url: &str) -> bool;

    /// Delete the object behind a URL from [`store`](Self::store).
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

/// Bucket reachable over plain HTTP `PUT`/`DELETE` with a bearer token.
#[derive(Clone)]
pub struct HttpObjectStorage {
    client: reqwest::Client,
    endpoint: String,
    token: SecretString,
    public_base_url: String,
}

impl HttpObjectStorage {
    /// Create a client for the configured bucket.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ObjectStorageConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            public_base_url: config.public_base_url.clone(),
        })
    }

    fn key_for(file: &UploadedFile) -> String {
        let ext = file.extension().unwrap_or_else(|| "jpg".to_string());
        format!("products/{}.{ext}", unique_stem())
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    fn backend_tag(&self) -> &'static str {
        "object-storage"
    }

    #[instrument(skip(self, file), fields(file = %file.file_name, size = file.bytes.len()))]
    async fn store(&self, file: &UploadedFile) -> Result<String, StorageError> {
        let key = Self::key_for(file);
        let response = self
            .client
            .put(format!("{}/{key}", self.endpoint))
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, &file.content_type)
            .body(file.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(format!("{}/{key}", self.public_base_url))
    }

    fn owns(&self, url: &str) -> bool {
        url.starts_with(&format!("{}/", self.public_base_url))
    }

    #[instrument(skip(self))]
    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let Some(key) = url.strip_prefix(&format!("{}/", self.public_base_url)) else {
            return Ok(());
        };
        let response = self
            .client
            .delete(format!("{}/{key}", self.endpoint))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Local uploads directory served at `url_prefix`.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalDiskStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: "/uploads".to_string(),
        }
    }

    fn file_name_for(file: &UploadedFile) -> String {
        let ext = file.extension().unwrap_or_else(|| "jpg".to_string());
        format!("imageFile-{}.{ext}", unique_stem())
    }
}

#[async_trait]
impl ObjectStorage for LocalDiskStorage {
    fn backend_tag(&self) -> &'static str {
        "local-disk"
    }

    async fn store(&self, file: &UploadedFile) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = Self::file_name_for(file);
        tokio::fs::write(self.dir.join(&name), &file.bytes).await?;
        Ok(format!("{}/{name}", self.url_prefix))
    }

    fn owns(&self, url: &str) -> bool {
        url.starts_with(&format!("{}/", self.url_prefix))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let Some(name) = url.strip_prefix(&format!("{}/", self.url_prefix)) else {
            return Ok(());
        };
        if name.contains('/') || name.contains("..") {
            return Ok(());
        }
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Upload/delete front end with local-disk fallback.
#[derive(Clone)]
pub struct ImageUploader {
    primary: Option<Arc<dyn ObjectStorage>>,
    local: Arc<dyn ObjectStorage>,
}

impl ImageUploader {
    pub fn new(primary: Option<Arc<dyn ObjectStorage>>, local: Arc<dyn ObjectStorage>) -> Self {
        Self { primary, local }
    }

    /// Bucket when configured, always backed by the local uploads directory.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(
        config: Option<&ObjectStorageConfig>,
        uploads_dir: impl Into<PathBuf>,
    ) -> Result<Self, StorageError> {
        let primary: Option<Arc<dyn ObjectStorage>> = match config {
            Some(config) => Some(Arc::new(HttpObjectStorage::new(config)?)),
            None => {
                tracing::warn!("OBJECT_STORAGE_ENDPOINT not set, images are stored locally");
                None
            }
        };
        Ok(Self::new(primary, Arc::new(LocalDiskStorage::new(uploads_dir))))
    }

    /// Local disk only.
    #[must_use]
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self::new(None, Arc::new(LocalDiskStorage::new(dir)))
    }

    /// Validate and store every file concurrently, returning URLs in upload order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Invalid` before storing anything if the batch
    /// is invalid, or the local-disk error when both targets fail.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_all(&self, files: &[UploadedFile]) -> Result<Vec<String>, StorageError> {
        validate_batch(files)?;
        try_join_all(files.iter().map(|file| self.upload_one(file))).await
    }

    async fn upload_one(&self, file: &UploadedFile) -> Result<String, StorageError> {
        if let Some(primary) = &self.primary {
            match primary.store(file).await {
                Ok(url) => return Ok(url),
                Err(e) => tracing::warn!(
                    file = %file.file_name,
                    error = %e,
                    "Object storage upload failed, writing to local disk"
                ),
            }
        }
        self.local.store(file).await
    }

    /// Delete images best-effort. Failures are logged, never returned.
    pub async fn delete_all(&self, urls: &[String]) {
        for url in urls {
            let target = self
                .primary
                .as_ref()
                .filter(|p| p.owns(url))
                .or_else(|| Some(&self.local).filter(|l| l.owns(url)));
            let Some(target) = target else {
                tracing::debug!(url, "Image not owned by any store, skipping delete");
                continue;
            };
            if let Err(e) = target.delete(url).await {
                tracing::warn!(url, backend = target.backend_tag(), error = %e, "Image delete failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn image(name: &str, content_type: &str, size: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0u8; size],
        }
    }

    struct FailingStorage;

    #[async_trait]
    impl ObjectStorage for FailingStorage {
        fn backend_tag(&self) -> &'static str {
            "failing"
        }
        async fn store(&self, _file: &UploadedFile) -> Result<String, StorageError> {
            Err(StorageError::Api {
                status: 503,
                message: "down".to_string(),
            })
        }
        fn owns(&self, url: &str) -> bool {
            url.starts_with("https://bucket/")
        }
        async fn delete(&self, _url: &str) -> Result<(), StorageError> {
            Err(StorageError::Api {
                status: 503,
                message: "down".to_string(),
            })
        }
    }

    #[test]
    fn test_validate_accepts_images() {
        assert!(image("bowl.JPG", "image/jpeg", 10).validate().is_ok());
        assert!(image("cup.webp", "image/webp", 10).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_files() {
        assert!(image("notes.txt", "text/plain", 10).validate().is_err());
        assert!(image("bowl.png", "application/octet-stream", 10).validate().is_err());
        assert!(image("evil.exe.png", "image/png", 10).validate().is_err());
        assert!(image("huge.png", "image/png", MAX_FILE_BYTES + 1).validate().is_err());
        assert!(image(&format!("{}.png", "a".repeat(300)), "image/png", 1).validate().is_err());
    }

    #[test]
    fn test_validate_batch_limit() {
        let files: Vec<_> = (0..11).map(|i| image(&format!("{i}.png"), "image/png", 1)).collect();
        assert!(validate_batch(&files).is_err());
        assert!(validate_batch(&files[..10]).is_ok());
    }

    #[tokio::test]
    async fn test_upload_falls_back_to_local_disk() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = ImageUploader::new(
            Some(Arc::new(FailingStorage)),
            Arc::new(LocalDiskStorage::new(dir.path())),
        );

        let urls = uploader
            .upload_all(&[image("a.png", "image/png", 4), image("b.jpg", "image/jpeg", 4)])
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        let first = urls.first().unwrap();
        assert!(first.starts_with("/uploads/imageFile-"));
        assert!(first.ends_with(".png"));
        let name = first.trim_start_matches("/uploads/");
        assert!(dir.path().join(name).exists());

        uploader.delete_all(&urls).await;
        assert!(!dir.path().join(name).exists());
    }

    #[tokio::test]
    async fn test_invalid_batch_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = ImageUploader::local(dir.path().join("uploads"));
        let result = uploader
            .upload_all(&[image("a.png", "image/png", 4), image("run.sh", "text/x-sh", 4)])
            .await;
        assert!(matches!(result, Err(StorageError::Invalid(_))));
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_delete_failures_are_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = ImageUploader::new(
            Some(Arc::new(FailingStorage)),
            Arc::new(LocalDiskStorage::new(dir.path())),
        );
        uploader
            .delete_all(&["https://bucket/products/1.png".to_string(), "/elsewhere/x.png".to_string()])
            .await;
    }
}
