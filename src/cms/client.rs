use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ArticleQuery, Locale, FEATURED_LIMIT};

use super::ContentSource;

const USER_AGENT: &str = concat!("clinic-blog/", env!("CARGO_PKG_VERSION"));
const ARTICLE_RELATIONS: &[&str] = &["category", "author", "tags"];
const ARTICLE_SORT: &str = "publishDate:desc";

/// HTTP client for the CMS content API.
pub struct CmsClient {
    client: Client,
    base_url: Url,
    locale: Locale,
    api_token: Option<String>,
}

impl CmsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.cms_url()?,
            locale: config.locale,
            api_token: config.api_token.clone(),
        })
    }

    fn endpoint(&self, resource: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", resource]);
        Ok(url)
    }

    /// `/api/articles` URL for a list query.
    pub fn articles_url(&self, query: &ArticleQuery) -> Result<Url> {
        let mut url = self.endpoint("articles")?;
        let (page, page_size) = if query.featured {
            (1, FEATURED_LIMIT as u32)
        } else {
            (query.page(), query.page_size())
        };

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("locale", self.locale.code());
            pairs.append_pair("filters", &article_filters(query).to_string());
            for (i, relation) in ARTICLE_RELATIONS.iter().enumerate() {
                pairs.append_pair(&format!("populate[{i}]"), relation);
            }
            pairs.append_pair("sort", ARTICLE_SORT);
            pairs.append_pair("pagination[page]", &page.to_string());
            pairs.append_pair("pagination[pageSize]", &page_size.to_string());
        }
        Ok(url)
    }

    pub fn article_url(&self, slug: &str) -> Result<Url> {
        let mut url = self.endpoint("articles")?;
        let filters = json!({ "slug": { "$eq": slug } });
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("locale", self.locale.code());
            pairs.append_pair("filters", &filters.to_string());
            for (i, relation) in ARTICLE_RELATIONS.iter().enumerate() {
                pairs.append_pair(&format!("populate[{i}]"), relation);
            }
        }
        Ok(url)
    }

    pub fn categories_url(&self) -> Result<Url> {
        let mut url = self.endpoint("categories")?;
        url.query_pairs_mut()
            .append_pair("locale", self.locale.code());
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        tracing::debug!("GET {}", url);
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            tracing::debug!("CMS request {} failed: {}", url, response.status());
            return Err(AppError::CmsStatus(response.status().as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Structured filter object sent as the `filters` parameter. Unpublished
/// (future-dated) articles are excluded on the server as well.
fn article_filters(query: &ArticleQuery) -> Value {
    let mut filters = serde_json::Map::new();
    filters.insert(
        "publishDate".to_string(),
        json!({ "$lte": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true) }),
    );

    if let Some(term) = query.search_term() {
        filters.insert(
            "$or".to_string(),
            json!([
                { "title": { "$containsi": term } },
                { "content": { "$containsi": term } },
                { "preview": { "$containsi": term } },
            ]),
        );
    }

    if let Some(category) = query.category_filter() {
        filters.insert(
            "category".to_string(),
            json!({ "name": { "$eqi": category } }),
        );
    }

    Value::Object(filters)
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Value> {
        self.get_json(self.articles_url(query)?).await
    }

    async fn fetch_article(&self, slug: &str) -> Result<Value> {
        self.get_json(self.article_url(slug)?).await
    }

    async fn fetch_categories(&self) -> Result<Value> {
        self.get_json(self.categories_url()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client(base_url: &str) -> CmsClient {
        let config = Config {
            base_url: base_url.to_string(),
            locale: Locale::Es,
            ..Config::default()
        };
        CmsClient::new(&config).unwrap()
    }

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn list_url_carries_filters_population_sort_and_paging() {
        let query = ArticleQuery::default()
            .with_search("whiplash")
            .with_category("Treatment")
            .with_page(2)
            .with_page_size(4);
        let url = client("https://cms.example.org/").articles_url(&query).unwrap();

        assert_eq!(url.path(), "/api/articles");
        let params = params(&url);
        assert_eq!(params["locale"], "es");
        assert_eq!(params["sort"], "publishDate:desc");
        assert_eq!(params["populate[0]"], "category");
        assert_eq!(params["populate[2]"], "tags");
        assert_eq!(params["pagination[page]"], "2");
        assert_eq!(params["pagination[pageSize]"], "4");

        let filters: Value = serde_json::from_str(&params["filters"]).unwrap();
        assert_eq!(filters["$or"][0]["title"]["$containsi"], "whiplash");
        assert_eq!(filters["category"]["name"]["$eqi"], "Treatment");
        assert!(filters["publishDate"]["$lte"].is_string());
    }

    #[test]
    fn featured_queries_ask_for_the_first_three() {
        let url = client("https://cms.example.org")
            .articles_url(&ArticleQuery::default().with_page(4).featured())
            .unwrap();
        let params = params(&url);
        assert_eq!(params["pagination[page]"], "1");
        assert_eq!(params["pagination[pageSize]"], "3");

        let filters: Value = serde_json::from_str(&params["filters"]).unwrap();
        assert!(filters.get("category").is_none());
        assert!(filters.get("$or").is_none());
    }

    #[test]
    fn endpoints_respect_a_base_path() {
        let cms = client("https://example.org/cms");
        assert_eq!(cms.categories_url().unwrap().path(), "/cms/api/categories");

        let lookup = cms.article_url("sueno-y-recuperacion").unwrap();
        let filters: Value = serde_json::from_str(&params(&lookup)["filters"]).unwrap();
        assert_eq!(filters["slug"]["$eq"], "sueno-y-recuperacion");
    }

    #[tokio::test]
    async fn unreachable_cms_is_an_error() {
        let config = Config {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        let cms = CmsClient::new(&config).unwrap();
        assert!(cms.fetch_categories().await.is_err());
    }
}
