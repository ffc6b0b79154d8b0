//! 测试用的内存对象存储

use super::Storage;
use crate::error::{AppError, AppResult};
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

#[derive(Default)]
pub struct MockStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, Option<String>)>>,
    sign_calls: AtomicUsize,
    fail_signing: AtomicBool,
    fail_delete: AtomicBool,
    fail_upload_prefix: Mutex<Option<String>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, bucket: &str, key: &str) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{}/{}", bucket, key), (Vec::new(), None));
        self
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_signing(&self, fail: bool) {
        self.fail_signing.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// 以该前缀开头的key上传失败
    pub fn set_fail_upload(&self, prefix: Option<&str>) {
        *self.fail_upload_prefix.lock().unwrap() = prefix.map(str::to_string);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&format!("{}/{}", bucket, key))
    }

    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(&format!("{}/{}", bucket, key))
            .and_then(|(_, ct)| ct.clone())
    }
}

#[async_trait::async_trait]
impl Storage for MockStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> AppResult<String> {
        let fail = self
            .fail_upload_prefix
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|prefix| key.starts_with(prefix));
        if fail {
            return Err(AppError::storage("模拟上传失败"));
        }
        self.objects.lock().unwrap().insert(
            format!("{}/{}", bucket, key),
            (data.to_vec(), content_type.map(str::to_string)),
        );
        Ok(format!("etag-{}", data.len()))
    }

    async fn delete(&self, bucket: &str, key: &str) -> AppResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::storage("模拟删除失败"));
        }
        self.objects
            .lock()
            .unwrap()
            .remove(&format!("{}/{}", bucket, key));
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool> {
        Ok(self.contains(bucket, key))
    }

    async fn presigned_url(
        &self,
        _bucket: &str,
        key: &str,
        expires_in_secs: u64,
    ) -> AppResult<String> {
        let n = self.sign_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(AppError::storage("模拟签名失败"));
        }
        Ok(format!(
            "https://signed.example/{}?sig={}&expires={}",
            key, n, expires_in_secs
        ))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
