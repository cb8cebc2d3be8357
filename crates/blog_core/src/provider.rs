use async_trait::async_trait;

use crate::{
    content::article::{ArticleDetail, ArticleId, PageResult, PageToken},
    Result,
};

pub mod memory;

pub use memory::MemoryProvider;

/// Paginated source of articles, usually a headless CMS.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Returns the first page of the listing, used to seed it before rendering.
    async fn query_first_page(&self, page_size: usize) -> Result<PageResult>;

    /// Returns the page referenced by a token previously issued as `next_page_token`.
    async fn fetch_page(&self, token: &PageToken) -> Result<PageResult>;

    /// Fails with [`crate::Error::NotFound`] when no article has this id.
    async fn get_article_by_identifier(&self, id: &ArticleId) -> Result<ArticleDetail>;
}
