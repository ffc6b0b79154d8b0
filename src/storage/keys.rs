//! 对象存储key的生成规则。
//!
//! key 格式为 `<folder>/<filename>`，文件名使用随机UUID，删除后不会被复用。

use std::{fmt, path::Path};
use uuid::Uuid;

/// 对象所在目录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageFolder {
    Avatars,
    Videos,
    Thumbnails,
}

impl StorageFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageFolder::Avatars => "avatars",
            StorageFolder::Videos => "videos",
            StorageFolder::Thumbnails => "thumbnails",
        }
    }

    /// 根据上传表单字段名确定目录
    pub fn from_field_name(field: &str) -> Option<Self> {
        match field {
            "avatar" => Some(StorageFolder::Avatars),
            "video" => Some(StorageFolder::Videos),
            "thumbnail" => Some(StorageFolder::Thumbnails),
            _ => None,
        }
    }
}

impl fmt::Display for StorageFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 为上传文件生成新的存储key，保留原文件扩展名
pub fn generate_storage_key(folder: StorageFolder, original_filename: &str) -> String {
    match sanitized_extension(original_filename) {
        Some(ext) => format!("{}/{}.{}", folder, Uuid::new_v4(), ext),
        None => format!("{}/{}", folder, Uuid::new_v4()),
    }
}

/// 旧记录只保存了文件名，补全目录前缀；空值没有对应的对象
pub fn qualify_key(folder: StorageFolder, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else if value.contains('/') {
        Some(value.to_string())
    } else {
        Some(format!("{}/{}", folder, value))
    }
}

fn sanitized_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_storage_key() {
        let key = generate_storage_key(StorageFolder::Avatars, "Me.PNG");
        assert!(key.starts_with("avatars/"));
        assert!(key.ends_with(".png"));

        let id = key
            .trim_start_matches("avatars/")
            .trim_end_matches(".png");
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_generated_keys_are_unique() {
        let a = generate_storage_key(StorageFolder::Videos, "clip.mp4");
        let b = generate_storage_key(StorageFolder::Videos, "clip.mp4");
        assert_ne!(a, b);
    }

    #[test]
    fn test_suspicious_extension_dropped() {
        let key = generate_storage_key(StorageFolder::Thumbnails, "x.p/ng");
        assert!(!key.contains('.'));

        let key = generate_storage_key(StorageFolder::Thumbnails, "noext");
        assert_eq!(key.matches('/').count(), 1);
        assert!(!key.contains('.'));
    }

    #[test]
    fn test_qualify_key() {
        assert_eq!(
            qualify_key(StorageFolder::Videos, "xyz.mp4").as_deref(),
            Some("videos/xyz.mp4")
        );
        assert_eq!(
            qualify_key(StorageFolder::Videos, "videos/xyz.mp4").as_deref(),
            Some("videos/xyz.mp4")
        );
        assert_eq!(
            qualify_key(StorageFolder::Thumbnails, "/uploads/thumbnails/t.jpg").as_deref(),
            Some("/uploads/thumbnails/t.jpg")
        );
    }

    #[test]
    fn test_qualify_blank_value() {
        assert_eq!(qualify_key(StorageFolder::Videos, ""), None);
        assert_eq!(qualify_key(StorageFolder::Thumbnails, "   "), None);
    }

    #[test]
    fn test_folder_from_field_name() {
        assert_eq!(
            StorageFolder::from_field_name("avatar"),
            Some(StorageFolder::Avatars)
        );
        assert_eq!(
            StorageFolder::from_field_name("thumbnail"),
            Some(StorageFolder::Thumbnails)
        );
        assert_eq!(
            StorageFolder::from_field_name("video"),
            Some(StorageFolder::Videos)
        );
        assert_eq!(StorageFolder::from_field_name("other"), None);
    }
}
