use super::Storage;
use crate::{
    config::MinioConfig,
    error::{AppError, AppResult},
};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{Client, config::Credentials, presigning::PresigningConfig, primitives::ByteStream};
use std::{sync::Arc, time::Duration};

/// MinIO存储实现
#[derive(Debug, Clone)]
pub struct MinioStorage {
    client: Arc<Client>,
}

impl MinioStorage {
    /// 创建新的MinIO存储实例
    pub fn new(config: &MinioConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "minio",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .region(Region::new("us-east-1")) // MinIO默认区域
            .force_path_style(true) // MinIO需要路径样式
            .behavior_version(BehaviorVersion::latest())
            .build();

        Self {
            client: Arc::new(Client::from_conf(s3_config)),
        }
    }

    /// 确保bucket存在
    pub async fn ensure_bucket(&self, bucket: &str) -> AppResult<()> {
        if self.client.head_bucket().bucket(bucket).send().await.is_ok() {
            tracing::debug!("Bucket '{}' 已存在", bucket);
            return Ok(());
        }

        tracing::info!("Bucket '{}' 不存在，正在创建", bucket);
        self.client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AppError::storage(format!("创建bucket失败: {}", e)))?;

        tracing::info!("成功创建bucket: {}", bucket);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Storage for MinioStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> AppResult<String> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        let result = request
            .send()
            .await
            .map_err(|e| AppError::storage(format!("上传文件失败: {}", e)))?;

        let etag = result.e_tag().unwrap_or("").to_string();
        tracing::info!(bucket, key, etag = %etag, size = data.len(), "文件上传成功");

        Ok(etag)
    }

    async fn delete(&self, bucket: &str, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::storage(format!("删除文件失败: {}", e)))?;

        tracing::info!(bucket, key, "文件删除成功");
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(AppError::storage(format!(
                        "检查文件是否存在失败: {}",
                        service_err
                    )))
                }
            }
        }
    }

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in_secs: u64,
    ) -> AppResult<String> {
        let presigning_config = PresigningConfig::expires_in(Duration::from_secs(expires_in_secs))
            .map_err(|e| AppError::storage(format!("预签名配置错误: {}", e)))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| AppError::storage(format!("生成预签名URL失败: {}", e)))?;

        Ok(presigned_request.uri().to_string())
    }

    async fn health_check(&self) -> AppResult<bool> {
        match self.client.list_buckets().send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::error!("MinIO健康检查失败: {}", e);
                Ok(false)
            }
        }
    }
}
