use async_trait::async_trait;

use crate::utils::error::AppError;

pub mod http;
pub mod memory;

pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;

/// Object storage for uploaded assets (event banners). `put` returns the
/// public URL of the stored object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError>;
}
