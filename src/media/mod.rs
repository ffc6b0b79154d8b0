//! 存储路径到客户端URL的解析。
//!
//! 数据库中只保存存储key或标记路径，返回给客户端之前必须经过 [`ResolveMedia`]
//! 把路径字段替换成可访问的地址。签名URL在内存中缓存，缓存有效期短于签名有效期。

pub mod cache;
pub mod clock;
pub mod path_ref;
pub mod resolver;
pub mod service;

pub use cache::{CacheEntry, UrlCache};
pub use clock::{Clock, SystemClock};
pub use path_ref::{PathMarkers, PathReference};
pub use resolver::{Resolution, UrlResolver};
pub use service::MediaService;

/// 返回给客户端前解析记录中的路径字段
#[async_trait::async_trait]
pub trait ResolveMedia: Send {
    async fn resolve_media(&mut self, resolver: &UrlResolver);
}

#[async_trait::async_trait]
impl<T: ResolveMedia> ResolveMedia for Vec<T> {
    async fn resolve_media(&mut self, resolver: &UrlResolver) {
        for item in self.iter_mut() {
            item.resolve_media(resolver).await;
        }
    }
}

#[async_trait::async_trait]
impl<T: ResolveMedia> ResolveMedia for Option<T> {
    async fn resolve_media(&mut self, resolver: &UrlResolver) {
        if let Some(item) = self {
            item.resolve_media(resolver).await;
        }
    }
}

/// 把可选路径字段替换为解析后的URL
pub async fn resolve_field(field: &mut Option<String>, resolver: &UrlResolver) {
    let url = resolver.resolve_url(field.as_deref()).await;
    *field = Some(url);
}
