//! Display-facing state for article lists and single articles.
//!
//! Requests run on spawned tasks and report back over a channel. The owner
//! applies results with `poll` (non-blocking, for render loops) or `settle`
//! (awaits the current request). Each request is numbered and answers to
//! superseded requests are dropped, so the newest query always wins.
//!
//! A request task that dies without answering is treated like an
//! unreachable CMS: the bundled data is shown with the offline advisory
//! and the status is `Failed`.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::fallback;
use crate::models::{Article, ArticlePage, ArticleQuery, Category};

use super::resolver::{ContentResolver, ResolveState, Resolved};

enum Settled<T> {
    Done(T),
    Failed,
}

struct Inflight<T> {
    seq: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<(u64, T)>,
    rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T: Send + 'static> Inflight<T> {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            seq: 0,
            pending: None,
            tx,
            rx,
        }
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn start<F>(&mut self, request: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.seq += 1;
        let seq = self.seq;
        let tx = self.tx.clone();
        // A superseded task is left to finish; its answer is discarded.
        self.pending = Some(tokio::spawn(async move {
            let value = request.await;
            let _ = tx.send((seq, value));
        }));
    }

    fn try_settle(&mut self) -> Option<Settled<T>> {
        // Checked before draining: a task that finished has already sent.
        let finished = self
            .pending
            .as_ref()
            .is_some_and(|handle| handle.is_finished());

        if let Some(value) = self.drain() {
            self.pending = None;
            return Some(Settled::Done(value));
        }
        if finished {
            self.pending = None;
            return Some(Settled::Failed);
        }
        None
    }

    /// Waits for the answer to the newest request, or for its task to end.
    async fn settle(&mut self) -> Option<Settled<T>> {
        let mut handle = self.pending.take()?;
        let current = self.seq;

        loop {
            tokio::select! {
                message = self.rx.recv() => match message {
                    Some((seq, value)) if seq == current => return Some(Settled::Done(value)),
                    Some((seq, _)) => {
                        tracing::debug!("Discarding stale response #{} (current #{})", seq, current);
                    }
                    None => return Some(Settled::Failed),
                },
                joined = &mut handle => {
                    if let Err(e) = joined {
                        tracing::error!("Content request task failed: {}", e);
                    }
                    return Some(match self.drain() {
                        Some(value) => Settled::Done(value),
                        None => Settled::Failed,
                    });
                }
            }
        }
    }

    fn drain(&mut self) -> Option<T> {
        let mut latest = None;
        while let Ok((seq, value)) = self.rx.try_recv() {
            if seq == self.seq {
                latest = Some(value);
            } else {
                tracing::debug!("Discarding stale response #{} (current #{})", seq, self.seq);
            }
        }
        latest
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleListState {
    pub articles: Vec<Article>,
    pub categories: Vec<Category>,
    pub loading: bool,
    /// Non-fatal advisory, e.g. when the offline dataset is in use.
    pub error: Option<String>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub has_next_page: bool,
    pub status: ResolveState,
}

/// Paged article list bound to one query.
///
/// Articles and categories are fetched by separate tasks so a broken
/// category request never costs the page.
pub struct ArticleList {
    resolver: Arc<ContentResolver>,
    query: ArticleQuery,
    state: ArticleListState,
    articles: Inflight<Resolved<ArticlePage>>,
    categories: Inflight<Resolved<Vec<Category>>>,
}

impl ArticleList {
    pub fn new(resolver: Arc<ContentResolver>, query: ArticleQuery) -> Self {
        let state = ArticleListState {
            articles: Vec::new(),
            categories: fallback::categories(resolver.locale()),
            loading: false,
            error: None,
            total: 0,
            page: query.page(),
            page_size: query.page_size(),
            has_next_page: false,
            status: ResolveState::Idle,
        };

        Self {
            resolver,
            query,
            state,
            articles: Inflight::new(),
            categories: Inflight::new(),
        }
    }

    pub fn state(&self) -> &ArticleListState {
        &self.state
    }

    pub fn query(&self) -> &ArticleQuery {
        &self.query
    }

    /// Re-issues the current query.
    pub fn refresh(&mut self) {
        self.state.loading = true;
        self.state.status = ResolveState::Loading;

        let resolver = Arc::clone(&self.resolver);
        let query = self.query.clone();
        self.articles
            .start(async move { resolver.list_articles(&query).await });

        let resolver = Arc::clone(&self.resolver);
        self.categories
            .start(async move { resolver.categories().await });
    }

    pub fn set_query(&mut self, query: ArticleQuery) {
        self.query = query;
        self.refresh();
    }

    pub fn set_search(&mut self, term: &str) {
        let term = term.trim();
        self.query.search = (!term.is_empty()).then(|| term.to_string());
        self.query.page = 1;
        self.refresh();
    }

    pub fn set_category(&mut self, key: &str) {
        self.query.category = key.to_string();
        self.query.page = 1;
        self.refresh();
    }

    pub fn toggle_featured(&mut self) {
        self.query.featured = !self.query.featured;
        self.query.page = 1;
        self.refresh();
    }

    /// Moves to the next page if the last result said there is one.
    pub fn next_page(&mut self) -> bool {
        if !self.state.has_next_page {
            return false;
        }
        self.query.page = self.query.page() + 1;
        self.refresh();
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.query.page() <= 1 {
            return false;
        }
        self.query.page = self.query.page() - 1;
        self.refresh();
        true
    }

    /// Applies finished requests, if any. Returns whether state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        if let Some(settled) = self.categories.try_settle() {
            self.apply_categories(settled);
            changed = true;
        }
        if let Some(settled) = self.articles.try_settle() {
            self.apply_articles(settled);
            changed = true;
        }
        changed
    }

    /// Waits for the current requests and applies them.
    pub async fn settle(&mut self) -> &ArticleListState {
        let (articles, categories) =
            futures::join!(self.articles.settle(), self.categories.settle());
        if let Some(settled) = categories {
            self.apply_categories(settled);
        }
        if let Some(settled) = articles {
            self.apply_articles(settled);
        }
        &self.state
    }

    pub async fn load(&mut self) -> &ArticleListState {
        self.refresh();
        self.settle().await
    }

    fn apply_articles(&mut self, settled: Settled<Resolved<ArticlePage>>) {
        self.state.loading = self.articles.is_pending();
        let (page, status) = match settled {
            Settled::Done(page) => {
                let status = ResolveState::Succeeded(page.origin);
                (page, status)
            }
            Settled::Failed => (self.resolver.offline_page(&self.query), ResolveState::Failed),
        };

        self.state.status = status;
        self.state.error = page.advisory;
        self.state.total = page.data.total;
        self.state.page = page.data.page;
        self.state.page_size = page.data.page_size;
        self.state.has_next_page = page.data.has_next_page;
        self.state.articles = page.data.articles;
    }

    fn apply_categories(&mut self, settled: Settled<Resolved<Vec<Category>>>) {
        self.state.categories = match settled {
            Settled::Done(categories) => categories.data,
            Settled::Failed => self.resolver.offline_categories().data,
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDetailState {
    pub article: Option<Article>,
    pub loading: bool,
    pub error: Option<String>,
    pub status: ResolveState,
}

/// Single article looked up by slug.
pub struct ArticleDetail {
    resolver: Arc<ContentResolver>,
    slug: Option<String>,
    state: ArticleDetailState,
    inflight: Inflight<Resolved<Option<Article>>>,
}

impl ArticleDetail {
    pub fn new(resolver: Arc<ContentResolver>) -> Self {
        Self {
            resolver,
            slug: None,
            state: ArticleDetailState {
                article: None,
                loading: false,
                error: None,
                status: ResolveState::Idle,
            },
            inflight: Inflight::new(),
        }
    }

    pub fn state(&self) -> &ArticleDetailState {
        &self.state
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn open(&mut self, slug: &str) {
        let resolver = Arc::clone(&self.resolver);
        let owned = slug.to_string();

        self.slug = Some(owned.clone());
        self.state.loading = true;
        self.state.status = ResolveState::Loading;
        self.inflight
            .start(async move { resolver.get_article(&owned).await });
    }

    pub fn refresh(&mut self) {
        if let Some(slug) = self.slug.clone() {
            self.open(&slug);
        }
    }

    pub fn poll(&mut self) -> bool {
        match self.inflight.try_settle() {
            Some(settled) => {
                self.apply(settled);
                true
            }
            None => false,
        }
    }

    pub async fn settle(&mut self) -> &ArticleDetailState {
        if let Some(settled) = self.inflight.settle().await {
            self.apply(settled);
        }
        &self.state
    }

    pub async fn load(&mut self, slug: &str) -> &ArticleDetailState {
        self.open(slug);
        self.settle().await
    }

    fn apply(&mut self, settled: Settled<Resolved<Option<Article>>>) {
        self.state.loading = self.inflight.is_pending();
        let (resolved, status) = match settled {
            Settled::Done(resolved) => {
                let status = ResolveState::Succeeded(resolved.origin);
                (resolved, status)
            }
            Settled::Failed => {
                let slug = self.slug.as_deref().unwrap_or_default();
                (self.resolver.offline_article(slug), ResolveState::Failed)
            }
        };

        self.state.status = status;
        self.state.error = resolved.advisory;
        self.state.article = resolved.data;
    }
}
