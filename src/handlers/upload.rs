use crate::{error::AppError, storage::StorageFolder};
use axum::extract::{Multipart, multipart::Field};
use std::collections::HashMap;

/// 从表单中读取到的文件
#[derive(Debug)]
pub struct UploadedFile {
    pub folder: StorageFolder,
    pub filename: String,
    pub data: Vec<u8>,
}

/// 同时包含文件与文本字段的表单
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<StorageFolder, UploadedFile>,
}

impl UploadForm {
    /// 去掉首尾空白后的文本字段，空值视为缺失
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, folder: StorageFolder) -> Option<UploadedFile> {
        self.files.remove(&folder)
    }
}

/// 读取multipart中指定字段的文件，其他字段忽略
pub async fn read_file_field(
    multipart: &mut Multipart,
    field: &str,
    max_size: u64,
) -> Result<UploadedFile, AppError> {
    let folder = StorageFolder::from_field_name(field)
        .ok_or_else(|| AppError::bad_request(format!("不支持的上传字段: {}", field)))?;

    while let Some(current) = multipart.next_field().await.map_err(map_multipart_error)? {
        if current.name() != Some(field) {
            continue;
        }
        return read_file(current, folder, max_size).await;
    }

    Err(AppError::bad_request(format!("缺少文件字段: {}", field)))
}

/// 读取整个表单：文件字段按目录归类，未知的文件字段忽略
pub async fn read_upload_form(
    multipart: &mut Multipart,
    max_size: u64,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(current) = multipart.next_field().await.map_err(map_multipart_error)? {
        let name = current.name().unwrap_or_default().to_string();

        match StorageFolder::from_field_name(&name) {
            Some(folder) => {
                let file = read_file(current, folder, max_size).await?;
                form.files.insert(folder, file);
            }
            None if current.file_name().is_some() => {
                tracing::debug!("忽略未知的文件字段: {}", name);
            }
            None => {
                let value = current.text().await.map_err(map_multipart_error)?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

async fn read_file(
    field: Field<'_>,
    folder: StorageFolder,
    max_size: u64,
) -> Result<UploadedFile, AppError> {
    let filename = field
        .file_name()
        .or(field.name())
        .unwrap_or(folder.as_str())
        .to_string();
    let data = field.bytes().await.map_err(map_multipart_error)?;
    if data.is_empty() {
        return Err(AppError::bad_request("上传文件为空"));
    }
    if data.len() as u64 > max_size {
        return Err(AppError::file_too_large(max_size));
    }

    Ok(UploadedFile {
        folder,
        filename,
        data: data.to_vec(),
    })
}

fn map_multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    let error_msg = e.to_string();
    if error_msg.contains("body longer than") || error_msg.contains("body is too large") {
        AppError::bad_request("上传文件过大")
    } else {
        AppError::bad_request(format!("文件上传失败: {}", error_msg))
    }
}
