pub mod engine;
pub mod presenter;
pub mod resolver;

pub use engine::{apply_query, published};
pub use presenter::{ArticleDetail, ArticleDetailState, ArticleList, ArticleListState};
pub use resolver::{ContentResolver, Origin, ResolveState, Resolved, OFFLINE_ADVISORY};
