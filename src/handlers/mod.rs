pub mod auth;
pub mod channels;
pub mod media;
pub mod system;
pub mod upload;
pub mod users;
pub mod videos;

pub use auth::CurrentUser;
pub use channels::{get_channel, get_my_channel, list_subscriptions, update_channel_avatar};
pub use media::stream_video;
pub use system::system_status;
pub use users::{get_me, update_my_avatar};
pub use videos::{delete_video, get_video_details, list_videos, upload_video};

use crate::{config::Config, database::Database, error::AppError, media::MediaService};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub database: Option<Database>,
    pub media: Option<MediaService>,
    pub config: Config,
}

impl AppState {
    pub fn database(&self) -> Result<&Database, AppError> {
        self.database
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("数据库服务不可用"))
    }

    pub fn media(&self) -> Result<&MediaService, AppError> {
        self.media
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("存储服务不可用"))
    }
}
