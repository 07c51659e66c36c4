mod article;
mod category;
mod locale;
mod query;

pub use article::{parse_datetime, Article, Seo};
pub use category::{merge_categories, Category, ALL_CATEGORIES};
pub use locale::Locale;
pub use query::{ArticlePage, ArticleQuery, DEFAULT_PAGE_SIZE, FEATURED_LIMIT};
