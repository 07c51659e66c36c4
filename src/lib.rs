//! Bilingual clinic blog content: a CMS client with an offline fallback,
//! a filter/sort/paginate engine and display-facing presenters.

pub mod cms;
pub mod config;
pub mod content;
pub mod error;
pub mod fallback;
pub mod models;

pub use config::Config;
pub use content::{ArticleDetail, ArticleList, ContentResolver};
pub use error::{AppError, Result};
