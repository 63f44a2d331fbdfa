use std::sync::Arc;

use log::{debug, warn};

use crate::ServiceResult;

#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub type ArcImageStore = Arc<Box<dyn ImageStore + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait ImageStore {
    /// Stores the upload under a fresh, collision free name and returns the
    /// path of the stored file relative to the static root.
    async fn save(&self, upload: &ImageUpload) -> ServiceResult<String>;

    /// Removes a stored image. Returns `false` if nothing was stored at `path`.
    async fn delete(&self, path: &str) -> ServiceResult<bool>;
}

/// Best-effort removal: failures are logged and swallowed.
pub async fn discard_image(image_store: &ArcImageStore, path: &str) {
    match image_store.delete(path).await {
        Ok(true) => debug!("Deleted image {}", path),
        Ok(false) => warn!("Image {} was already gone", path),
        Err(e) => warn!("Failed to delete image {}: {}", path, e),
    }
}
