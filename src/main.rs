/*
 * AI-Tube - Video Sharing Platform Backend
 * Copyright (c) 2024 AI-Tube Project
 *
 * This work is licensed under CC BY-NC-SA 4.0
 * https://creativecommons.org/licenses/by-nc-sa/4.0/
 */

use aitube_backend::{
    config::Config,
    database::Database,
    docs::ApiDoc,
    error::AppResult,
    handlers::AppState,
    media::MediaService,
    response::ApiResponse,
    routes::create_api_routes,
    storage::{MinioStorage, Storage},
};
use axum::response::Html;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Query, State},
    http::Method,
    response::Json,
    routing::get,
};
use serde::Deserialize;
use std::{collections::HashMap, path::Path, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize)]
struct HealthQuery {
    #[serde(default)]
    detail: bool,
}

/// 健康检查处理器
async fn health_check(Query(params): Query<HealthQuery>) -> Json<ApiResponse<serde_json::Value>> {
    if params.detail {
        let timestamp = chrono::Utc::now().to_rfc3339();
        let mut details = HashMap::new();
        details.insert("status", "healthy");
        details.insert("version", env!("CARGO_PKG_VERSION"));
        details.insert("timestamp", timestamp.as_str());

        Json(ApiResponse::success(serde_json::json!(details)))
    } else {
        Json(ApiResponse::success(serde_json::json!({"status": "ok"})))
    }
}

/// 数据库健康检查处理器
async fn db_health_check(
    State(app_state): State<AppState>,
) -> Json<ApiResponse<serde_json::Value>> {
    match &app_state.database {
        Some(db) => match db.health_check().await {
            Ok(true) => {
                let timestamp = chrono::Utc::now().to_rfc3339();
                Json(ApiResponse::success(
                    serde_json::json!({"database": "healthy", "timestamp": timestamp}),
                ))
            }
            Ok(false) => Json(ApiResponse::error_with_data(
                503,
                "数据库连接异常".to_string(),
                serde_json::json!({"status": "unhealthy"}),
            )),
            Err(e) => {
                tracing::error!("数据库健康检查失败: {}", e);
                Json(ApiResponse::error_with_data(
                    503,
                    format!("数据库健康检查失败: {}", e),
                    serde_json::json!({"status": "error"}),
                ))
            }
        },
        None => Json(ApiResponse::error_with_data(
            503,
            "数据库未配置或连接失败".to_string(),
            serde_json::json!({"status": "unavailable"}),
        )),
    }
}

/// 存储健康检查处理器
async fn storage_health_check(
    State(app_state): State<AppState>,
) -> Json<ApiResponse<serde_json::Value>> {
    match &app_state.media {
        Some(media) => match media.storage().health_check().await {
            Ok(true) => {
                let timestamp = chrono::Utc::now().to_rfc3339();
                Json(ApiResponse::success(serde_json::json!({
                    "storage": "healthy",
                    "bucket": media.bucket(),
                    "cachedUrls": media.resolver().cached_entries(),
                    "timestamp": timestamp,
                })))
            }
            Ok(false) => Json(ApiResponse::error_with_data(
                503,
                "存储服务连接异常".to_string(),
                serde_json::json!({"status": "unhealthy"}),
            )),
            Err(e) => {
                tracing::error!("存储健康检查失败: {}", e);
                Json(ApiResponse::error_with_data(
                    503,
                    format!("存储健康检查失败: {}", e),
                    serde_json::json!({"status": "error"}),
                ))
            }
        },
        None => Json(ApiResponse::error_with_data(
            503,
            "存储服务未配置或连接失败".to_string(),
            serde_json::json!({"status": "unavailable"}),
        )),
    }
}

/// Swagger UI 页面，OpenAPI JSON 路径：/api-docs/openapi.json
async fn swagger_ui_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset=UTF-8>
  <title>AI-Tube API 文档</title>
  <link rel=stylesheet href=https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.11.0/swagger-ui.css>
  <style>
    body { margin: 0; font-family: Arial, sans-serif; }
  </style>
</head>
<body>
  <div id=swagger-ui></div>
  <script src=https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.11.0/swagger-ui-bundle.js></script>
  <script>
    window.onload = function() {
      window.ui = SwaggerUIBundle({
        url: '/api-docs/openapi.json',
        dom_id: '#swagger-ui',
        deepLinking: true,
        validatorUrl: null
      });
    };
  </script>
</body>
</html>"#,
    )
}

/// 加载配置，配置文件不存在时写入默认配置
fn load_config() -> AppResult<Config> {
    if !Path::new(CONFIG_FILE).exists() {
        tracing::warn!("未找到配置文件，使用默认配置");
        let default_config = Config::default();
        if let Err(e) = default_config.save_to_file(CONFIG_FILE) {
            tracing::warn!("保存默认配置失败: {}", e);
        }
        return Ok(default_config);
    }

    // 配置存在但无效时拒绝启动，避免签名URL缓存参数被静默替换
    let config = Config::from_file(CONFIG_FILE)?;
    tracing::info!("已加载配置文件: {}", CONFIG_FILE);
    Ok(config)
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aitube_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    tracing::info!("服务器配置: {}", config.server_addr());

    // 初始化数据库（如果连接失败则继续启动，但记录警告）
    let database = match Database::new(&config.database).await {
        Ok(db) => {
            match db.verify_schema().await {
                Ok(missing) if missing.is_empty() => tracing::info!("数据库表结构检查通过"),
                Ok(missing) => tracing::warn!("数据库缺少表: {}", missing.join(", ")),
                Err(e) => tracing::warn!("数据库验证失败: {}", e),
            }
            Some(db)
        }
        Err(e) => {
            tracing::warn!("数据库连接失败，服务将在无数据库模式下启动: {}", e);
            None
        }
    };

    // 初始化MinIO存储与媒体服务
    let minio = MinioStorage::new(&config.minio);
    if let Err(e) = minio.ensure_bucket(&config.minio.bucket).await {
        tracing::warn!("创建默认bucket失败: {}", e);
    }
    let storage: Arc<dyn Storage> = Arc::new(minio);
    let media = MediaService::new(storage, &config.minio.bucket, &config.media)?;

    let app_state = AppState {
        database,
        media: Some(media),
        config: config.clone(),
    };

    // 创建CORS中间件
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let app = Router::new()
        // 健康检查
        .route("/health", get(health_check))
        .route("/api/health/db", get(db_health_check))
        .route("/api/health/storage", get(storage_health_check))
        // OpenAPI JSON 路由
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route("/swagger-ui", get(swagger_ui_page))
        .route("/swagger-ui/", get(swagger_ui_page))
        // 内置静态资源（占位头像等）
        .nest_service("/assets", ServeDir::new(&config.server.assets_dir))
        // 业务API路由
        .merge(create_api_routes())
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(config.upload.body_limit()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // 启动服务器
    let listener = tokio::net::TcpListener::bind(&config.server_addr()).await?;
    tracing::info!("🚀 服务器启动成功，监听地址: {}", config.server_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
