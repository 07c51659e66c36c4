use std::sync::Arc;

use clinic_blog::models::{Article, ArticleQuery, Category};
use clinic_blog::{ArticleList, Config, ContentResolver};

use crate::tui::AppAction;

pub struct App {
    pub config: Config,
    pub list: ArticleList,

    // UI State
    pub selected_index: usize,
    pub show_help: bool,
    pub search_input_active: bool,
    pub search_input: String,
}

impl App {
    pub fn new(config: &Config, resolver: Arc<ContentResolver>) -> Self {
        let query = ArticleQuery::default().with_page_size(config.page_size);
        let mut list = ArticleList::new(resolver, query);
        list.refresh();

        Self {
            config: config.clone(),
            list,
            selected_index: 0,
            show_help: false,
            search_input_active: false,
            search_input: String::new(),
        }
    }

    pub fn articles(&self) -> &[Article] {
        &self.list.state().articles
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.articles().get(self.selected_index)
    }

    /// Descriptor for the active category filter. Falls back to a bare
    /// descriptor when the key is not among the known categories.
    pub fn current_category(&self) -> Category {
        let key = &self.list.query().category;
        self.list
            .state()
            .categories
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(key))
            .cloned()
            .unwrap_or_else(|| Category::new(key, key, "#64748b", "📄"))
    }

    /// Display label for an article's category in the current locale.
    pub fn category_label(&self, article: &Article) -> String {
        self.list
            .state()
            .categories
            .iter()
            .find(|c| article.in_category(&c.key))
            .map(|c| c.label.clone())
            .unwrap_or_else(|| article.category.clone())
    }

    /// Applies any finished request. Returns whether a redraw is useful.
    pub fn poll(&mut self) -> bool {
        if !self.list.poll() {
            return false;
        }
        let len = self.articles().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
        true
    }

    pub fn handle_action(&mut self, action: AppAction) -> bool {
        match action {
            AppAction::Quit => return true,

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                let len = self.articles().len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            AppAction::MoveToTop => {
                self.selected_index = 0;
            }

            AppAction::MoveToBottom => {
                self.selected_index = self.articles().len().saturating_sub(1);
            }

            AppAction::NextPage => {
                if self.list.next_page() {
                    self.selected_index = 0;
                }
            }

            AppAction::PrevPage => {
                if self.list.prev_page() {
                    self.selected_index = 0;
                }
            }

            AppAction::CycleCategory => {
                let next = self.next_category_key();
                self.list.set_category(&next);
                self.selected_index = 0;
            }

            AppAction::ToggleFeatured => {
                self.list.toggle_featured();
                self.selected_index = 0;
            }

            AppAction::Refresh => {
                self.list.refresh();
            }

            AppAction::OpenInBrowser => {
                if let Some(article) = self.selected_article() {
                    let url = self.config.article_url(&article.id);
                    if let Err(e) = open::that(&url) {
                        tracing::warn!("Failed to open {}: {}", url, e);
                    }
                }
            }

            AppAction::SearchStart => {
                self.search_input_active = true;
                self.search_input = self.list.query().search.clone().unwrap_or_default();
            }

            AppAction::SearchChar(c) => {
                self.search_input.push(c);
            }

            AppAction::SearchBackspace => {
                self.search_input.pop();
            }

            AppAction::SearchConfirm => {
                let term = std::mem::take(&mut self.search_input);
                self.list.set_search(&term);
                self.search_input_active = false;
                self.selected_index = 0;
            }

            AppAction::SearchCancel => {
                self.search_input_active = false;
                self.search_input.clear();
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }
        }

        false
    }

    fn next_category_key(&self) -> String {
        let categories = &self.list.state().categories;
        if categories.is_empty() {
            return clinic_blog::models::ALL_CATEGORIES.to_string();
        }
        let current = &self.list.query().category;
        let next = categories
            .iter()
            .position(|c| c.key.eq_ignore_ascii_case(current))
            .map(|i| (i + 1) % categories.len())
            .unwrap_or(0);
        categories[next].key.clone()
    }
}
