//! Property image uploads.

use async_trait::async_trait;
use axum::body::Bytes;
use rand::Rng;
use serde::Serialize;

pub mod supabase;

pub use supabase::SupabaseStorage;

pub const UPLOAD_FAILED_BANNER: &str =
    "Sebagian / semua gambar gagal diupload. Cek log server & nama bucket.";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Object storage bucket holding property images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` at `path` and returns the stored path.
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError>;

    fn public_url(&self, path: &str) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Default, Serialize)]
pub struct UploadReport {
    pub urls: Vec<String>,
    pub failed: usize,
}

impl UploadReport {
    pub fn banner(&self) -> Option<&'static str> {
        (self.failed > 0).then_some(UPLOAD_FAILED_BANNER)
    }
}

/// Extension of the uploaded file name. Falls back to `jpg` when there is
/// none or when it holds anything but ASCII letters and digits.
fn extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext
        }
        _ => "jpg",
    }
}

fn random_suffix() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..10)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// `{slug}/{millis}-{suffix}.{ext}`
pub fn object_path(slug: &str, file_name: &str, millis: i64, suffix: &str) -> String {
    format!("{}/{}-{}.{}", slug, millis, suffix, extension(file_name))
}

/// Uploads `files` one after another under the slug's folder. A failed file
/// is logged and skipped; the rest still go through.
pub async fn upload_images(
    store: &dyn ObjectStore,
    slug: &str,
    files: Vec<ImageFile>,
) -> UploadReport {
    let mut report = UploadReport::default();

    for file in files {
        let path = object_path(
            slug,
            &file.file_name,
            chrono::Utc::now().timestamp_millis(),
            &random_suffix(),
        );
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let stored = match store.upload(&path, file.bytes, content_type).await {
            Ok(stored) => stored,
            Err(e) => {
                log::error!("Upload of {} failed: {}", file.file_name, e);
                report.failed += 1;
                continue;
            }
        };

        match store.public_url(&stored) {
            Some(url) => {
                log::info!("Uploaded {} to {}", file.file_name, url);
                report.urls.push(url);
            }
            None => log::warn!("No public URL for stored path {}", stored),
        }
    }

    report
}
