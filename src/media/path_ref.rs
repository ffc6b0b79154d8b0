use crate::config::MediaConfig;

/// 绝对URL的前缀（同时覆盖 http 与 https）
const URL_SCHEME_MARKER: &str = "http";

/// 数据库中保存的路径值的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathReference<'a> {
    /// 空值，使用占位资源
    Empty,
    /// 已经是完整的URL
    AbsoluteUrl(&'a str),
    /// 前端内置的静态资源
    BundledAsset(&'a str),
    /// 对象存储key（已去掉旧版上传前缀）
    StorageKey(&'a str),
}

/// 路径前缀规则
#[derive(Debug, Clone)]
pub struct PathMarkers {
    pub bundled_asset_prefix: String,
    pub legacy_upload_prefix: String,
}

impl PathMarkers {
    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            bundled_asset_prefix: config.bundled_asset_prefix.clone(),
            legacy_upload_prefix: config.legacy_upload_prefix.clone(),
        }
    }
}

impl Default for PathMarkers {
    fn default() -> Self {
        Self::from_config(&MediaConfig::default())
    }
}

impl<'a> PathReference<'a> {
    pub fn parse(raw: Option<&'a str>, markers: &PathMarkers) -> Self {
        let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return PathReference::Empty;
        };

        if value.starts_with(URL_SCHEME_MARKER) {
            return PathReference::AbsoluteUrl(value);
        }
        if value.starts_with(&markers.bundled_asset_prefix) {
            return PathReference::BundledAsset(value);
        }

        match value.strip_prefix(&markers.legacy_upload_prefix) {
            Some("") => PathReference::Empty,
            Some(key) => PathReference::StorageKey(key),
            None => PathReference::StorageKey(value),
        }
    }

    pub fn storage_key(&self) -> Option<&'a str> {
        match *self {
            PathReference::StorageKey(key) => Some(key),
            _ => None,
        }
    }
}
