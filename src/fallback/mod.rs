pub mod dataset;

pub use dataset::{articles, categories, find_article};
