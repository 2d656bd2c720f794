use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Stores `data` under `folder` with a generated name and returns its path.
    async fn upload(&self, folder: &str, filename: &str, data: &[u8]) -> Result<String, StorageError>;
    /// Removes a stored object given its path or public URL.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
    fn public_url(&self, path: &str) -> String;
}

/// Lowercase alphanumeric extension of `filename`, `bin` if it has none.
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext.to_ascii_lowercase()
        }
        _ => "bin".to_string(),
    }
}

pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_normalised() {
        assert_eq!(file_extension("Menu.JPG"), "jpg");
        assert_eq!(file_extension("license.final.pdf"), "pdf");
        assert_eq!(file_extension("no-extension"), "bin");
        assert_eq!(file_extension("trailing."), "bin");
        assert_eq!(file_extension("evil.p/hp"), "bin");
    }

    #[test]
    fn known_extensions_map_to_content_types() {
        assert_eq!(content_type_for("jpeg"), "image/jpeg");
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for("exe"), "application/octet-stream");
    }
}
