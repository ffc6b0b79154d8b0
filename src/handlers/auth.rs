use super::AppState;
use crate::{error::AppError, repositories::UserRepository};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

/// 通过会话令牌认证的当前用户
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("缺少认证令牌"))?;
        let token = extract_token(header).ok_or_else(|| AppError::unauthorized("无效的令牌"))?;

        let database = state.database()?;
        let user_id = UserRepository::new(database.clone())
            .find_user_id_by_token(token)
            .await?
            .ok_or_else(|| AppError::unauthorized("无效的令牌"))?;

        Ok(CurrentUser(user_id))
    }
}

/// 支持 `Bearer <token>` 和直接传令牌两种格式
fn extract_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() { None } else { Some(token) }
}
