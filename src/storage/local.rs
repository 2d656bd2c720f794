use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use super::{file_extension, StorageBackend, StorageError};

pub struct LocalStorage {
    upload_dir: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(upload_dir: &str, base_url: &str) -> Self {
        Self {
            upload_dir: PathBuf::from(upload_dir),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(&self, folder: &str, filename: &str, data: &[u8]) -> Result<String, StorageError> {
        let folder = folder.trim_matches('/');
        let dir = self.upload_dir.join(folder);
        fs::create_dir_all(&dir).await?;

        let unique_name = format!("{}.{}", Uuid::new_v4(), file_extension(filename));
        fs::write(dir.join(&unique_name), data).await?;

        Ok(format!("/uploads/{}/{}", folder, unique_name))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let path = path.strip_prefix(self.base_url.as_str()).unwrap_or(path);
        let relative = path.trim_start_matches("/uploads/");
        if relative.split('/').any(|part| part == "..") {
            return Err(StorageError::DeleteFailed(format!("Refusing to delete {}", path)));
        }

        let file_path = self.upload_dir.join(relative);
        if fs::try_exists(&file_path).await? {
            fs::remove_file(&file_path).await?;
        }

        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }
}
