use serde::{Deserialize, Serialize};

use super::{Article, ALL_CATEGORIES};

pub const DEFAULT_PAGE_SIZE: u32 = 5;
/// Number of records a featured query keeps when the source has no native
/// featured marker.
pub const FEATURED_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub featured: bool,
}

fn default_category() -> String {
    ALL_CATEGORIES.to_string()
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: default_category(),
            page: default_page(),
            page_size: default_page_size(),
            featured: false,
        }
    }
}

impl ArticleQuery {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    /// Trimmed, non-empty search term.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Category filter, or `None` when every category is wanted.
    pub fn category_filter(&self) -> Option<&str> {
        let category = self.category.trim();
        if category.is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            None
        } else {
            Some(category)
        }
    }

    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub has_next_page: bool,
}

impl ArticlePage {
    pub fn new(articles: Vec<Article>, total: usize, page: u32, page_size: u32) -> Self {
        let has_next_page = (page as u64) * (page_size as u64) < total as u64;
        Self {
            articles,
            total,
            page,
            page_size,
            has_next_page,
        }
    }
}
