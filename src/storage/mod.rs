pub mod keys;
pub mod minio;
#[cfg(test)]
pub mod mock;

pub use keys::{StorageFolder, generate_storage_key, qualify_key};
pub use minio::MinioStorage;

use crate::error::AppResult;

/// 对象存储抽象接口
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 上传文件，返回ETag
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> AppResult<String>;

    /// 删除文件
    async fn delete(&self, bucket: &str, key: &str) -> AppResult<()>;

    /// 检查文件是否存在
    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool>;

    /// 生成预签名下载URL
    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in_secs: u64,
    ) -> AppResult<String>;

    /// 健康检查
    async fn health_check(&self) -> AppResult<bool>;
}
