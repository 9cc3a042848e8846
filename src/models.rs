use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Which upstream an article came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Hn,
    Devto,
    Rss,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Hn => "hn",
            Source::Devto => "devto",
            Source::Rss => "rss",
        }
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hn" => Ok(Source::Hn),
            "devto" => Ok(Source::Devto),
            "rss" => Ok(Source::Rss),
            other => Err(format!("unknown source: {}", other)),
        }
    }
}

/// Publication time as delivered by the upstream: HN uses unix seconds,
/// Dev.to and RSS feeds deliver date strings. Kept verbatim on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleTime {
    Unix(i64),
    Text(String),
}

impl Default for ArticleTime {
    fn default() -> Self {
        ArticleTime::Text(String::new())
    }
}

/// One normalized article, regardless of which adapter produced it.
///
/// Immutable once fetched; a copy may be promoted into the bookmark store
/// where it persists independently of later aggregation cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub source: Source,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hn_url: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub time: ArticleTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_badge: Option<String>,
}

/// A user-submitted question with its nested answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub votes: i64,
    pub by: String,
    /// Epoch milliseconds.
    pub time: i64,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub ai_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub best: bool,
    pub by: String,
    /// Epoch milliseconds.
    pub time: i64,
}

/// A GitHub trending repository row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingRepo {
    pub name: String,
    pub desc: String,
    pub stars: String,
    pub lang: String,
    /// Language dot color, CSS hex.
    pub lc: String,
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
