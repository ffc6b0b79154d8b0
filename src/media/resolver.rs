use super::{
    cache::UrlCache,
    clock::{Clock, SystemClock},
    path_ref::{PathMarkers, PathReference},
};
use crate::{
    config::MediaConfig,
    error::{AppError, AppResult},
    storage::Storage,
};
use chrono::TimeDelta;
use std::{num::NonZeroUsize, sync::Arc};

/// 路径解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 绝对URL或内置资源，原样返回
    Passthrough(String),
    /// 空路径，返回占位资源
    Placeholder(String),
    /// 签名URL
    Signed { url: String, cached: bool },
    /// 签名失败，降级返回原始key
    Fallback { key: String },
}

impl Resolution {
    pub fn url(&self) -> &str {
        match self {
            Resolution::Passthrough(url)
            | Resolution::Placeholder(url)
            | Resolution::Signed { url, .. } => url,
            Resolution::Fallback { key } => key,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            Resolution::Passthrough(url)
            | Resolution::Placeholder(url)
            | Resolution::Signed { url, .. } => url,
            Resolution::Fallback { key } => key,
        }
    }

    /// 是否为降级结果（客户端拿到的地址可能无法访问）
    pub fn is_degraded(&self) -> bool {
        matches!(self, Resolution::Fallback { .. })
    }
}

/// 存储路径到可访问URL的解析器
///
/// 进程启动时创建一次，通过 `Arc` 在所有请求处理器之间共享。
/// 并发解析同一个未缓存的key时可能重复签名，结果等价，后写入者覆盖缓存。
pub struct UrlResolver {
    storage: Arc<dyn Storage>,
    bucket: String,
    cache: UrlCache,
    markers: PathMarkers,
    placeholder_url: String,
    signed_url_ttl_secs: u64,
    cache_ttl: TimeDelta,
}

impl UrlResolver {
    pub fn new(storage: Arc<dyn Storage>, bucket: &str, config: &MediaConfig) -> AppResult<Self> {
        Self::with_clock(storage, bucket, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        storage: Arc<dyn Storage>,
        bucket: &str,
        config: &MediaConfig,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::config(format!("媒体配置无效: {}", e)))?;

        let capacity = NonZeroUsize::new(config.cache_capacity)
            .ok_or_else(|| AppError::config("缓存容量不能为0"))?;
        let cache_ttl = i64::try_from(config.cache_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| AppError::config("缓存有效期超出范围"))?;

        tracing::info!(
            bucket,
            cache_ttl_secs = config.cache_ttl_secs,
            signed_url_ttl_secs = config.signed_url_ttl_secs,
            cache_capacity = config.cache_capacity,
            "签名URL解析器已初始化"
        );

        Ok(Self {
            storage,
            bucket: bucket.to_string(),
            cache: UrlCache::with_clock(capacity, clock),
            markers: PathMarkers::from_config(config),
            placeholder_url: config.placeholder_url.clone(),
            signed_url_ttl_secs: config.signed_url_ttl_secs,
            cache_ttl,
        })
    }

    /// 解析路径为客户端可用的URL，不会返回错误
    pub async fn resolve(&self, raw: Option<&str>) -> Resolution {
        match PathReference::parse(raw, &self.markers) {
            PathReference::Empty => Resolution::Placeholder(self.placeholder_url.clone()),
            PathReference::AbsoluteUrl(url) | PathReference::BundledAsset(url) => {
                Resolution::Passthrough(url.to_string())
            }
            PathReference::StorageKey(key) => self.resolve_key(key).await,
        }
    }

    pub async fn resolve_url(&self, raw: Option<&str>) -> String {
        self.resolve(raw).await.into_url()
    }

    async fn resolve_key(&self, key: &str) -> Resolution {
        if let Some(url) = self.cache.get(key) {
            tracing::trace!(key, "签名URL缓存命中");
            return Resolution::Signed { url, cached: true };
        }

        match self
            .storage
            .presigned_url(&self.bucket, key, self.signed_url_ttl_secs)
            .await
        {
            Ok(url) => {
                self.cache.put(key, url.clone(), self.cache_ttl);
                tracing::debug!(key, "已生成新的签名URL");
                Resolution::Signed { url, cached: false }
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "生成签名URL失败，返回原始key");
                Resolution::Fallback {
                    key: key.to_string(),
                }
            }
        }
    }

    /// 对象被替换或删除时移除缓存，非存储key的路径直接忽略
    pub fn invalidate(&self, raw: Option<&str>) -> bool {
        match PathReference::parse(raw, &self.markers).storage_key() {
            Some(key) => self.evict_key(key),
            None => false,
        }
    }

    /// 按存储key移除缓存
    pub fn evict_key(&self, key: &str) -> bool {
        let removed = self.cache.invalidate(key);
        tracing::debug!(key, removed, "移除签名URL缓存");
        removed
    }

    pub fn markers(&self) -> &PathMarkers {
        &self.markers
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }
}
