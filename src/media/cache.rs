use super::clock::Clock;
use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// 缓存条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub signed_url: String,
    pub expires_at: DateTime<Utc>,
}

/// 签名URL缓存
///
/// 按存储key缓存签名URL，容量满时淘汰最久未使用的条目。
/// 读取时检查过期时间，过期条目不会被返回。
/// 锁只在同步代码中持有，不跨越await。
pub struct UrlCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl UrlCache {
    pub fn with_clock(capacity: NonZeroUsize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            clock,
        }
    }

    /// 查询未过期的签名URL
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.signed_url.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    /// 写入签名URL，覆盖已有条目
    pub fn put(&self, key: &str, signed_url: String, ttl: TimeDelta) {
        let expires_at = self.clock.now() + ttl;
        self.lock().put(
            key.to_string(),
            CacheEntry {
                signed_url,
                expires_at,
            },
        );
    }

    /// 移除条目，返回条目是否存在
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().pop(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        // 持锁期间不会panic，条目状态始终完整
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
