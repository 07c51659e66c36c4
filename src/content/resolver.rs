use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::cms::{normalize_article, normalize_category, parse_payload, CmsClient, ContentSource, Payload};
use crate::config::Config;
use crate::error::Result;
use crate::fallback;
use crate::models::{merge_categories, Article, ArticlePage, ArticleQuery, Category, Locale};

use super::engine::{apply_query, published};

/// Advisory attached to results served from the bundled dataset.
pub const OFFLINE_ADVISORY: &str = "Using offline data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Remote,
    Fallback,
}

/// Lifecycle of a single retrieval. Every call starts over from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveState {
    #[default]
    Idle,
    Loading,
    Succeeded(Origin),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub data: T,
    pub origin: Origin,
    pub advisory: Option<String>,
}

impl<T> Resolved<T> {
    fn remote(data: T) -> Self {
        Self {
            data,
            origin: Origin::Remote,
            advisory: None,
        }
    }

    fn offline(data: T) -> Self {
        Self {
            data,
            origin: Origin::Fallback,
            advisory: Some(OFFLINE_ADVISORY.to_string()),
        }
    }

    /// True when the CMS could not be used and bundled data stands in.
    /// A bundled hit after a clean "not found" from the CMS has a
    /// `Fallback` origin but is not degraded.
    pub fn is_degraded(&self) -> bool {
        self.origin == Origin::Fallback && self.advisory.is_some()
    }
}

/// Tries the CMS once per call and substitutes the bundled dataset on any
/// failure, so callers always get a usable result.
pub struct ContentResolver {
    source: Arc<dyn ContentSource>,
    locale: Locale,
}

impl ContentResolver {
    pub fn new(source: Arc<dyn ContentSource>, locale: Locale) -> Self {
        Self { source, locale }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = CmsClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.locale))
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub async fn list_articles(&self, query: &ArticleQuery) -> Resolved<ArticlePage> {
        let now = Utc::now();
        match self.remote_page(query, now).await {
            Ok(page) => {
                tracing::info!(
                    "Loaded {} of {} articles from the CMS",
                    page.articles.len(),
                    page.total
                );
                Resolved::remote(page)
            }
            Err(e) => {
                tracing::warn!("CMS article list unavailable, using bundled articles: {}", e);
                self.offline_page(query)
            }
        }
    }

    /// The bundled answer to `query`, flagged with the offline advisory.
    pub fn offline_page(&self, query: &ArticleQuery) -> Resolved<ArticlePage> {
        let local = published(fallback::articles(self.locale), Utc::now());
        Resolved::offline(apply_query(local, query))
    }

    pub fn offline_categories(&self) -> Resolved<Vec<Category>> {
        Resolved::offline(fallback::categories(self.locale))
    }

    pub fn offline_article(&self, slug: &str) -> Resolved<Option<Article>> {
        let now = Utc::now();
        Resolved::offline(fallback::find_article(self.locale, slug).filter(|a| a.is_published_at(now)))
    }

    /// Built-in categories first, then any new keys the CMS knows about.
    pub async fn categories(&self) -> Resolved<Vec<Category>> {
        let builtin = fallback::categories(self.locale);
        match self.remote_categories().await {
            Ok(remote) => Resolved::remote(merge_categories(builtin, remote)),
            Err(e) => {
                tracing::warn!("CMS categories unavailable, using built-in set: {}", e);
                self.offline_categories()
            }
        }
    }

    /// Looks an article up by slug, in the CMS first and then locally.
    /// Not finding it is not an error; the advisory is only set when the
    /// CMS itself could not be reached.
    pub async fn get_article(&self, slug: &str) -> Resolved<Option<Article>> {
        let now = Utc::now();
        let advisory = match self.remote_article(slug, now).await {
            Ok(Some(article)) => return Resolved::remote(Some(article)),
            Ok(None) => {
                tracing::debug!("Article {} not in the CMS, checking bundled set", slug);
                None
            }
            Err(e) => {
                tracing::warn!("CMS lookup for {} failed, checking bundled set: {}", slug, e);
                Some(OFFLINE_ADVISORY.to_string())
            }
        };

        let local = fallback::find_article(self.locale, slug).filter(|a| a.is_published_at(now));
        let origin = if local.is_some() || advisory.is_some() {
            Origin::Fallback
        } else {
            Origin::Remote
        };

        Resolved {
            data: local,
            origin,
            advisory,
        }
    }

    async fn remote_page(&self, query: &ArticleQuery, now: DateTime<Utc>) -> Result<ArticlePage> {
        let body = self.source.fetch_articles(query).await?;

        match parse_payload(body)? {
            Payload::Envelope {
                records,
                pagination: Some(pagination),
            } => {
                let articles = published(normalize_records(&records), now);
                if query.featured {
                    // The CMS was asked for the featured set itself, so page
                    // through it here like the bundled path does.
                    return Ok(apply_query(articles, query));
                }
                let dropped = records.len() - articles.len();
                let total = pagination.total.saturating_sub(dropped);
                let page = if pagination.page == 0 { query.page() } else { pagination.page };
                let page_size = if pagination.page_size == 0 {
                    query.page_size()
                } else {
                    pagination.page_size
                };
                Ok(ArticlePage::new(articles, total, page, page_size))
            }
            payload => {
                tracing::debug!("CMS returned an unpaged list, paging locally");
                let articles = published(normalize_records(payload.records()), now);
                Ok(apply_query(articles, query))
            }
        }
    }

    async fn remote_categories(&self) -> Result<Vec<Category>> {
        let body = self.source.fetch_categories().await?;
        let categories = parse_payload(body)?
            .records()
            .iter()
            .filter_map(|raw| match normalize_category(raw) {
                Ok(category) => Some(category),
                Err(e) => {
                    tracing::warn!("Skipping malformed category: {}", e);
                    None
                }
            })
            .collect();
        Ok(categories)
    }

    async fn remote_article(&self, slug: &str, now: DateTime<Utc>) -> Result<Option<Article>> {
        let body = self.source.fetch_article(slug).await?;
        let payload = parse_payload(body)?;
        let server_filtered = matches!(payload, Payload::Envelope { .. });

        let mut articles = published(normalize_records(payload.records()), now);
        if let Some(pos) = articles.iter().position(|a| a.id == slug) {
            return Ok(Some(articles.swap_remove(pos)));
        }
        // An enveloped answer was already filtered by slug even if the
        // record only carries a numeric id.
        if server_filtered && !articles.is_empty() {
            return Ok(Some(articles.swap_remove(0)));
        }
        Ok(None)
    }
}

/// Normalizes every record, skipping malformed ones and repeated ids so one
/// bad entry never blanks the whole page.
fn normalize_records(records: &[Value]) -> Vec<Article> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|raw| match normalize_article(raw) {
            Ok(article) if seen.insert(article.id.clone()) => Some(article),
            Ok(article) => {
                tracing::warn!("Skipping duplicate article id {}", article.id);
                None
            }
            Err(e) => {
                tracing::warn!("Skipping malformed article: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::{Reply, StubSource};
    use serde_json::json;

    fn resolver(source: StubSource) -> ContentResolver {
        ContentResolver::new(Arc::new(source), Locale::En)
    }

    fn local_ids(locale: Locale) -> HashSet<String> {
        fallback::articles(locale).into_iter().map(|a| a.id).collect()
    }

    #[tokio::test]
    async fn offline_list_is_served_from_bundled_articles() {
        let resolved = resolver(StubSource::offline())
            .list_articles(&ArticleQuery::default())
            .await;

        assert_eq!(resolved.origin, Origin::Fallback);
        assert_eq!(resolved.advisory.as_deref(), Some(OFFLINE_ADVISORY));
        assert!(resolved.is_degraded());
        assert!(!resolved.data.articles.is_empty());
        let known = local_ids(Locale::En);
        assert!(resolved.data.articles.iter().all(|a| known.contains(&a.id)));
    }

    #[tokio::test]
    async fn every_query_shape_falls_back_without_failing() {
        let queries = [
            ArticleQuery::default(),
            ArticleQuery::default().with_search("whiplash"),
            ArticleQuery::default().with_category("recovery").with_page(2),
            ArticleQuery::default().featured(),
            ArticleQuery::default().with_page(0).with_page_size(0),
        ];
        let resolver = resolver(StubSource::offline());
        for query in queries {
            let resolved = resolver.list_articles(&query).await;
            let expected = apply_query(fallback::articles(Locale::En), &query);
            assert_eq!(resolved.data, expected);
            assert!(resolved.advisory.is_some());
        }
    }

    #[tokio::test]
    async fn unrecognized_body_is_treated_like_a_transport_failure() {
        let source = StubSource::offline().articles(Reply::Body(json!({ "error": "boom" })));
        let resolved = resolver(source).list_articles(&ArticleQuery::default()).await;
        assert_eq!(resolved.origin, Origin::Fallback);
        assert_eq!(resolved.data.total, 6);
    }

    #[tokio::test]
    async fn enveloped_page_is_taken_as_the_server_sent_it() {
        let body = json!({
            "data": [
                { "id": 1, "attributes": { "slug": "newer", "title": "Newer", "publishDate": "2024-05-01" } },
                { "id": 2, "attributes": { "slug": "older", "title": "Older", "publishDate": "2024-04-01" } }
            ],
            "meta": { "pagination": { "page": 2, "pageSize": 2, "pageCount": 3, "total": 6 } }
        });
        let source = StubSource::offline().articles(Reply::Body(body));
        let resolved = resolver(source)
            .list_articles(&ArticleQuery::default().with_page(2).with_page_size(2))
            .await;

        assert_eq!(resolved.origin, Origin::Remote);
        assert_eq!(resolved.advisory, None);
        let page = resolved.data;
        assert_eq!(page.total, 6);
        assert_eq!(page.page, 2);
        assert!(page.has_next_page);
        let ids: Vec<_> = page.articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn bare_array_is_filtered_and_paged_locally() {
        let body = json!([
            { "id": "a", "title": "Knee pain", "category": "Treatment", "publishDate": "2024-01-01" },
            { "id": "b", "title": "PIP deadlines", "category": "Legal", "publishDate": "2024-03-01" },
            { "id": "c", "title": "Claims", "category": { "name": "legal" }, "publishDate": "2024-02-01" }
        ]);
        let source = StubSource::offline().articles(Reply::Body(body));
        let resolved = resolver(source)
            .list_articles(&ArticleQuery::default().with_category("LEGAL").with_page_size(1))
            .await;

        assert_eq!(resolved.origin, Origin::Remote);
        assert_eq!(resolved.data.total, 2);
        assert!(resolved.data.has_next_page);
        assert_eq!(resolved.data.articles[0].id, "b");
    }

    #[tokio::test]
    async fn malformed_and_future_records_are_dropped_individually() {
        let body = json!({
            "data": [
                { "id": 1, "attributes": { "title": "Good", "publishDate": "2024-01-01" } },
                { "id": 2, "attributes": { "preview": "no title" } },
                { "id": 3, "attributes": { "title": "Scheduled", "publishDate": "2999-01-01" } },
                { "id": 1, "attributes": { "title": "Duplicate", "publishDate": "2024-01-02" } }
            ],
            "meta": { "pagination": { "page": 1, "pageSize": 5, "total": 4 } }
        });
        let source = StubSource::offline().articles(Reply::Body(body));
        let resolved = resolver(source).list_articles(&ArticleQuery::default()).await;

        assert_eq!(resolved.origin, Origin::Remote);
        assert_eq!(resolved.data.articles.len(), 1);
        assert_eq!(resolved.data.articles[0].title, "Good");
        assert_eq!(resolved.data.total, 1);
        assert!(!resolved.data.has_next_page);
    }

    #[tokio::test]
    async fn featured_remote_page_never_reports_more_than_three() {
        let body = json!({
            "data": [
                { "id": "a", "title": "A", "publishDate": "2024-03-01" },
                { "id": "b", "title": "B", "publishDate": "2024-02-01" },
                { "id": "c", "title": "C", "publishDate": "2024-01-01" }
            ],
            "meta": { "pagination": { "page": 1, "pageSize": 3, "total": 9 } }
        });
        let source = StubSource::offline().articles(Reply::Body(body));
        let resolved = resolver(source)
            .list_articles(&ArticleQuery::default().featured())
            .await;
        assert_eq!(resolved.data.total, 3);
        assert!(!resolved.data.has_next_page);
    }

    #[tokio::test]
    async fn featured_paging_matches_between_sources() {
        let body = json!({
            "data": [
                { "id": "a", "title": "A", "publishDate": "2024-03-01" },
                { "id": "b", "title": "B", "publishDate": "2024-02-01" },
                { "id": "c", "title": "C", "publishDate": "2024-01-01" }
            ],
            "meta": { "pagination": { "page": 1, "pageSize": 3, "total": 9 } }
        });
        let query = ArticleQuery::default().featured().with_page(2).with_page_size(2);

        let source = StubSource::offline().articles(Reply::Body(body));
        let remote = resolver(source).list_articles(&query).await;
        assert_eq!(remote.origin, Origin::Remote);
        assert_eq!(remote.data.page, 2);
        assert_eq!(remote.data.total, 3);
        let ids: Vec<_> = remote.data.articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);

        let past_end = query.clone().with_page(3);
        let remote = resolver(StubSource::offline().articles(Reply::Body(json!({
            "data": [{ "id": "a", "title": "A", "publishDate": "2024-03-01" }],
            "meta": { "pagination": { "page": 1, "pageSize": 3, "total": 1 } }
        }))))
        .list_articles(&past_end)
        .await;
        let local = resolver(StubSource::offline()).list_articles(&past_end).await;
        assert_eq!(remote.data.page, local.data.page);
        assert!(remote.data.articles.is_empty());
        assert!(local.data.articles.is_empty());
    }

    #[tokio::test]
    async fn remote_categories_extend_the_builtins_without_duplicates() {
        let body = json!({ "data": [
            { "id": 1, "attributes": { "slug": "legal", "name": "Legal (CMS)" } },
            { "id": 2, "attributes": { "slug": "nutrition", "name": "Nutrition" } }
        ] });
        let source = StubSource::offline().categories(Reply::Body(body));
        let resolved = resolver(source).categories().await;

        assert_eq!(resolved.origin, Origin::Remote);
        let keys: Vec<_> = resolved.data.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["all", "treatment", "legal", "recovery", "nutrition"]);
        assert_eq!(resolved.data[2].label, "Legal");
    }

    #[tokio::test]
    async fn categories_fall_back_to_builtins() {
        let resolved = resolver(StubSource::offline()).categories().await;
        assert_eq!(resolved.data, fallback::categories(Locale::En));
        assert_eq!(resolved.origin, Origin::Fallback);
    }

    #[tokio::test]
    async fn lookup_prefers_the_cms() {
        let body = json!({ "data": [
            { "id": 5, "attributes": { "title": "From CMS", "publishDate": "2024-01-01" } }
        ] });
        let source = StubSource::offline().article(Reply::Body(body));
        let resolved = resolver(source).get_article("from-cms").await;
        assert_eq!(resolved.origin, Origin::Remote);
        assert_eq!(resolved.data.unwrap().title, "From CMS");
        assert_eq!(resolved.advisory, None);
    }

    #[tokio::test]
    async fn lookup_not_found_in_cms_checks_bundled_set_without_advisory() {
        let source = StubSource::offline().article(Reply::Body(json!({ "data": [] })));
        let resolved = resolver(source).get_article("understanding-pip-coverage").await;
        assert_eq!(resolved.origin, Origin::Fallback);
        assert_eq!(resolved.advisory, None);
        assert!(!resolved.is_degraded());
        assert_eq!(resolved.data.unwrap().category, "Legal");
    }

    #[tokio::test]
    async fn lookup_with_cms_down_sets_advisory_even_when_found_locally() {
        let resolved = resolver(StubSource::offline())
            .get_article("sleep-and-recovery")
            .await;
        assert!(resolved.data.is_some());
        assert_eq!(resolved.advisory.as_deref(), Some(OFFLINE_ADVISORY));
    }

    #[tokio::test]
    async fn unknown_article_is_none_without_error() {
        let source = StubSource::offline().article(Reply::Body(json!([])));
        let resolved = resolver(source).get_article("no-such-article").await;
        assert_eq!(resolved.data, None);
        assert_eq!(resolved.advisory, None);
        assert_eq!(resolved.origin, Origin::Remote);
    }

    #[tokio::test]
    async fn bare_array_lookup_requires_an_exact_id() {
        let body = json!([{ "id": "other", "title": "Other", "publishDate": "2024-01-01" }]);
        let source = StubSource::offline().article(Reply::Body(body));
        let resolved = resolver(source).get_article("wanted").await;
        assert_eq!(resolved.data, None);
    }

    #[test]
    fn each_call_hits_the_cms_exactly_once() {
        let source = Arc::new(StubSource::offline());
        let resolver = ContentResolver::new(source.clone(), Locale::Es);

        tokio_test::block_on(resolver.list_articles(&ArticleQuery::default()));
        tokio_test::block_on(resolver.list_articles(&ArticleQuery::default()));
        assert_eq!(source.list_calls(), 2);
    }
}
