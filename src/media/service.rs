use super::{
    path_ref::PathReference,
    resolver::{Resolution, UrlResolver},
};
use crate::{
    config::MediaConfig,
    error::AppResult,
    storage::{Storage, StorageFolder, generate_storage_key},
};
use std::sync::Arc;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// 媒体文件服务：上传、删除与地址解析
#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn Storage>,
    bucket: String,
    resolver: Arc<UrlResolver>,
}

impl MediaService {
    pub fn new(storage: Arc<dyn Storage>, bucket: &str, config: &MediaConfig) -> AppResult<Self> {
        let resolver = UrlResolver::new(storage.clone(), bucket, config)?;
        Ok(Self::with_resolver(storage, bucket, Arc::new(resolver)))
    }

    pub fn with_resolver(storage: Arc<dyn Storage>, bucket: &str, resolver: Arc<UrlResolver>) -> Self {
        Self {
            storage,
            bucket: bucket.to_string(),
            resolver,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn resolver(&self) -> &UrlResolver {
        &self.resolver
    }

    pub async fn resolve(&self, raw: Option<&str>) -> Resolution {
        self.resolver.resolve(raw).await
    }

    pub async fn resolve_url(&self, raw: Option<&str>) -> String {
        self.resolver.resolve_url(raw).await
    }

    /// 上传文件到指定目录，返回新生成的存储key
    pub async fn store(
        &self,
        folder: StorageFolder,
        original_filename: &str,
        data: &[u8],
    ) -> AppResult<String> {
        let key = generate_storage_key(folder, original_filename);
        let content_type = infer::get(data)
            .map(|kind| kind.mime_type())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        self.storage
            .upload(&self.bucket, &key, data, Some(content_type))
            .await?;

        tracing::info!(key = %key, content_type, size = data.len(), "媒体文件已保存");
        Ok(key)
    }

    /// 删除不再被引用的对象并移除缓存
    ///
    /// 删除失败只记录警告，可能留下孤立对象，调用方的数据库操作照常进行。
    /// 返回是否确实删除了存储对象。
    pub async fn discard(&self, raw: Option<&str>) -> bool {
        let Some(key) = PathReference::parse(raw, self.resolver.markers()).storage_key() else {
            return false;
        };

        self.resolver.evict_key(key);

        match self.storage.delete(&self.bucket, key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "删除存储对象失败，保留孤立对象");
                false
            }
        }
    }

    /// 检查存储key对应的对象是否存在
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        self.storage.exists(&self.bucket, key).await
    }
}
