use crate::{
    handlers::system::{CacheStats, SystemStatus},
    models::{Channel, Comment, User, VideoDetails, VideoListItem},
    response::ApiResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // 用户API
        crate::handlers::users::get_me,
        crate::handlers::users::update_my_avatar,
        // 频道API
        crate::handlers::channels::get_my_channel,
        crate::handlers::channels::get_channel,
        crate::handlers::channels::update_channel_avatar,
        crate::handlers::channels::list_subscriptions,
        // 视频API
        crate::handlers::videos::list_videos,
        crate::handlers::videos::upload_video,
        crate::handlers::videos::get_video_details,
        crate::handlers::videos::delete_video,
        crate::handlers::media::stream_video,
        // 系统监控
        crate::handlers::system::system_status,
    ),
    components(
        schemas(
            User,
            Channel,
            Comment,
            VideoListItem,
            VideoDetails,
            SystemStatus,
            CacheStats,
            // 通用响应模型
            ApiResponse<User>,
            ApiResponse<Channel>,
            ApiResponse<Vec<Channel>>,
            ApiResponse<Vec<VideoListItem>>,
            ApiResponse<VideoListItem>,
            ApiResponse<VideoDetails>,
            ApiResponse<SystemStatus>,
            ApiResponse<String>,
        )
    ),
    tags(
        (name = "用户", description = "当前用户信息与头像管理"),
        (name = "频道", description = "频道信息、频道头像与订阅列表"),
        (name = "视频", description = "视频上传、列表、详情、删除与播放入口"),
        (name = "系统监控", description = "系统健康状态和统计信息")
    ),
    info(
        title = "AI-Tube API",
        version = "1.0.0",
        description = "AI-Tube 视频平台 REST API 文档，所有媒体路径在返回前解析为可访问URL",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "开发环境")
    )
)]
pub struct ApiDoc;
