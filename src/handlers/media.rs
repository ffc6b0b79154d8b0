use super::AppState;
use crate::{
    error::AppError,
    media::Resolution,
    storage::{StorageFolder, qualify_key},
};
use axum::{
    extract::{Path, State},
    response::Redirect,
};

/// 视频播放入口，重定向到签名URL
#[utoipa::path(
    get,
    path = "/api/stream/{filename}",
    tag = "视频",
    params(("filename" = String, Path, description = "视频文件名")),
    responses(
        (status = 307, description = "重定向到可访问的视频地址"),
        (status = 404, description = "视频文件不存在"),
        (status = 503, description = "暂时无法生成播放地址")
    )
)]
pub async fn stream_video(
    State(app_state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Redirect, AppError> {
    let media = app_state.media()?;

    if filename.contains('/') || filename.starts_with('.') {
        return Err(AppError::bad_request("无效的文件名"));
    }

    let key = qualify_key(StorageFolder::Videos, &filename)
        .ok_or_else(|| AppError::not_found("视频文件"))?;
    if !media.exists(&key).await? {
        return Err(AppError::not_found(format!("视频文件 {}", filename)));
    }

    match media.resolve(Some(&key)).await {
        Resolution::Fallback { .. } => Err(AppError::service_unavailable("暂时无法生成播放地址")),
        resolution => Ok(Redirect::temporary(resolution.url())),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Config,
        handlers::AppState,
        media::MediaService,
        routes::create_api_routes,
        storage::mock::MockStorage,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::LOCATION},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(storage: Arc<MockStorage>) -> axum::Router {
        let config = Config::default();
        let media = MediaService::new(storage, &config.minio.bucket, &config.media).unwrap();
        let state = AppState {
            database: None,
            media: Some(media),
            config,
        };
        create_api_routes().with_state(state)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_stream_redirects_to_signed_url() {
        let storage = Arc::new(MockStorage::new().with_object("aitube", "videos/xyz.mp4"));
        let app = app(storage.clone());

        let response = app.clone().oneshot(get("/api/stream/xyz.mp4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers()[LOCATION].to_str().unwrap().to_string();
        assert!(location.starts_with("https://signed.example/videos/xyz.mp4"));

        // 第二次请求命中缓存
        let response = app.oneshot(get("/api/stream/xyz.mp4")).await.unwrap();
        assert_eq!(response.headers()[LOCATION].to_str().unwrap(), location);
        assert_eq!(storage.sign_calls(), 1);
    }

    #[tokio::test]
    async fn test_stream_missing_file() {
        let app = app(Arc::new(MockStorage::new()));
        let response = app.oneshot(get("/api/stream/missing.mp4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stream_blank_filename_not_signed() {
        let storage = Arc::new(MockStorage::new());
        let app = app(storage.clone());

        let response = app.oneshot(get("/api/stream/%20%20")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(storage.sign_calls(), 0);
    }

    #[tokio::test]
    async fn test_stream_signing_failure() {
        let storage = Arc::new(MockStorage::new().with_object("aitube", "videos/xyz.mp4"));
        storage.set_fail_signing(true);
        let app = app(storage);

        let response = app.oneshot(get("/api/stream/xyz.mp4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = app(Arc::new(MockStorage::new()));
        let response = app.oneshot(get("/api/auth/me")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_without_database() {
        let app = app(Arc::new(MockStorage::new()));
        let response = app.oneshot(get("/api/videos")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
