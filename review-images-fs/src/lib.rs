//! Image storage on the local filesystem, below the directory the HTTP layer
//! serves static files from.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use log::debug;
use review_core::upload::{UPLOAD_DIR, stored_image_name};
use review_server_domain::{
    ServiceError, ServiceResult,
    image::{ImageStore, ImageUpload},
};
use tokio::fs;

pub struct LocalImageStore {
    static_root: PathBuf,
}

impl LocalImageStore {
    pub fn new(static_root: PathBuf) -> Self {
        Self { static_root }
    }

    /// Resolves a stored path below the static root. Anything that could
    /// escape the root is rejected.
    fn resolve(&self, path: &str) -> ServiceResult<PathBuf> {
        let relative = Path::new(path);
        let only_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !only_normal {
            return ServiceError::bad_request(format!("Invalid image path {}", path));
        }
        Ok(self.static_root.join(relative))
    }
}

fn io_error(context: &str, e: std::io::Error) -> ServiceError {
    ServiceError::Internal(format!("{}: {}", context, e))
}

#[async_trait::async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, upload: &ImageUpload) -> ServiceResult<String> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let Some(name) = stored_image_name(&upload.filename, Utc::now(), &nonce) else {
            return ServiceError::bad_request("Invalid file type");
        };

        let dir = self.static_root.join(UPLOAD_DIR);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error("Failed to create upload directory", e))?;
        fs::write(dir.join(&name), &upload.bytes)
            .await
            .map_err(|e| io_error("Failed to store image", e))?;

        let path = format!("{}/{}", UPLOAD_DIR, name);
        debug!("Stored image {} ({} bytes)", path, upload.bytes.len());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> ServiceResult<bool> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("Failed to delete image", e)),
        }
    }
}
