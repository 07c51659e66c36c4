pub mod client;
pub mod normalizer;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::ArticleQuery;

pub use client::CmsClient;
pub use normalizer::{normalize_article, normalize_category, parse_payload, Pagination, Payload};

/// A remote origin for blog content. Implementations return the raw
/// response body; recognizing its shape is the normalizer's job.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Articles matching `query`, either pre-paged by the server or as a
    /// plain list.
    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Value>;

    /// Zero or one article with the given slug.
    async fn fetch_article(&self, slug: &str) -> Result<Value>;

    async fn fetch_categories(&self) -> Result<Value>;
}
