use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Refresh interval in minutes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Articles per feed page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// CORS-bridging proxy; feeds and the trending page are fetched as
    /// `<proxy_url>?url=<target>` and unwrapped from its `contents` field.
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    #[serde(default = "default_hn_api_url")]
    pub hn_api_url: String,
    #[serde(default = "default_devto_api_url")]
    pub devto_api_url: String,
    #[serde(default = "default_trending_url")]
    pub trending_url: String,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub name: String,
    /// Short label shown on article cards, also part of the article id.
    pub badge: String,
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            model: default_ai_model(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            refresh_interval: default_refresh_interval(),
            page_size: default_page_size(),
            proxy_url: default_proxy_url(),
            hn_api_url: default_hn_api_url(),
            devto_api_url: default_devto_api_url(),
            trending_url: default_trending_url(),
            feeds: default_feeds(),
            ai: AiConfig::default(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_refresh_interval() -> u64 {
    10
}

fn default_page_size() -> usize {
    15
}

fn default_proxy_url() -> String {
    "https://api.allorigins.win/get".to_string()
}

fn default_hn_api_url() -> String {
    "https://hacker-news.firebaseio.com/v0".to_string()
}

fn default_devto_api_url() -> String {
    "https://dev.to/api/articles".to_string()
}

fn default_trending_url() -> String {
    "https://github.com/trending".to_string()
}

fn default_ai_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ai_model() -> String {
    "claude-sonnet-4-6".to_string()
}

fn default_feeds() -> Vec<FeedConfig> {
    vec![
        FeedConfig {
            name: "TechCrunch".to_string(),
            badge: "TC".to_string(),
            url: "https://techcrunch.com/feed/".to_string(),
        },
        FeedConfig {
            name: "Ars Technica".to_string(),
            badge: "ARS".to_string(),
            url: "https://feeds.arstechnica.com/arstechnica/technology-lab".to_string(),
        },
        FeedConfig {
            name: "The Verge".to_string(),
            badge: "VERGE".to_string(),
            url: "https://www.theverge.com/rss/index.xml".to_string(),
        },
    ]
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
