use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use uuid::Uuid;

use super::{content_type_for, file_extension, StorageBackend, StorageError};
use crate::config::R2Config;

pub struct R2Storage {
    bucket: Box<Bucket>,
    public_url: String,
}

impl R2Storage {
    pub fn new(config: &R2Config) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint: format!("https://{}.r2.cloudflarestorage.com", config.account_id),
        };

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::NotConfigured(e.to_string()))?;

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::NotConfigured(e.to_string()))?
            .with_path_style();

        Ok(Self {
            bucket,
            public_url: config.public_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageBackend for R2Storage {
    async fn upload(&self, folder: &str, filename: &str, data: &[u8]) -> Result<String, StorageError> {
        let extension = file_extension(filename);
        let path = format!("uploads/{}/{}.{}", folder.trim_matches('/'), Uuid::new_v4(), extension);

        self.bucket
            .put_object_with_content_type(&path, data, content_type_for(&extension))
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        Ok(format!("/{}", path))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let path = path.strip_prefix(self.public_url.as_str()).unwrap_or(path);
        self.bucket
            .delete_object(path.trim_start_matches('/'))
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.public_url, path)
        }
    }
}
