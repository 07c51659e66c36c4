use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Locale, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub locale: Locale,

    /// Root of the CMS; requests go to `<base_url>/api/...`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Public website, used to build links to articles.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    pub api_token: Option<String>,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:1337".to_string()
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            base_url: default_base_url(),
            site_url: default_site_url(),
            api_token: None,
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Loads the user config, writing the defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clinic-blog")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        self.cms_url()?;
        if self.page_size == 0 {
            return Err(AppError::Config("page_size must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cms_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Public URL of an article on the website.
    pub fn article_url(&self, id: &str) -> String {
        format!(
            "{}/{}/blog/{}",
            self.site_url.trim_end_matches('/'),
            self.locale,
            urlencoding::encode(id)
        )
    }
}
