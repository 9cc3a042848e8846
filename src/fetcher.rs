use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::{Config, FeedConfig};
use crate::models::{Article, ArticleTime, Source, TrendingRepo};
use crate::tags::extract_tags;

const HN_STORY_COUNT: usize = 30;
const RSS_ENTRY_COUNT: usize = 8;
const RSS_DESC_MAX: usize = 140;
const TRENDING_COUNT: usize = 5;
const TICKER_SIZE: usize = 20;

/// The current aggregation cycle's output, replaced wholesale on refresh.
pub struct NewsFeed {
    pub articles: Vec<Article>,
    pub ticker: Vec<Article>,
    pub repos: Vec<TrendingRepo>,
}

impl Default for NewsFeed {
    fn default() -> Self {
        Self {
            articles: Vec::new(),
            ticker: Vec::new(),
            // Trending shows the fallback list until the first cycle lands
            repos: fallback_repos(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RefreshStatus {
    pub loading: bool,
    /// 0..=100, monotonic within one cycle.
    pub progress: u8,
}

/// Adapter interface for the trending sidebar, so the HTML scrape can be
/// swapped out or disabled without touching the aggregator.
#[async_trait]
pub trait TrendingProvider: Send + Sync {
    async fn fetch_trending(&self) -> anyhow::Result<Vec<TrendingRepo>>;
}

/// Scrapes the GitHub trending page through the CORS proxy.
pub struct GithubTrending {
    client: Client,
    proxy_url: String,
    trending_url: String,
}

impl GithubTrending {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            proxy_url: config.proxy_url.clone(),
            trending_url: config.trending_url.clone(),
        }
    }
}

#[async_trait]
impl TrendingProvider for GithubTrending {
    async fn fetch_trending(&self) -> anyhow::Result<Vec<TrendingRepo>> {
        let html = fetch_proxied(&self.client, &self.proxy_url, &self.trending_url).await?;
        let repos = parse_trending_html(&html)?;
        if repos.is_empty() {
            anyhow::bail!("no repository rows found in trending page");
        }
        Ok(repos)
    }
}

/// Built-in trending list used whenever the scrape fails or comes back
/// empty. Not derived from network state.
pub fn fallback_repos() -> Vec<TrendingRepo> {
    let rows = [
        (
            "anthropics/claude-code",
            "Agentic coding tool",
            "42k+",
            "TypeScript",
            "#3178c6",
        ),
        (
            "vercel/next.js",
            "The React Framework for the Web",
            "120k",
            "JavaScript",
            "#f7df1e",
        ),
        (
            "microsoft/typescript",
            "TypeScript is JavaScript with syntax for types",
            "98k",
            "TypeScript",
            "#3178c6",
        ),
        (
            "rust-lang/rust",
            "Empowering everyone to build reliable and efficient software",
            "96k",
            "Rust",
            "#dea584",
        ),
        (
            "deepseek-ai/DeepSeek-V3",
            "DeepSeek-V3 technical report",
            "88k",
            "Python",
            "#3572a5",
        ),
    ];
    rows.iter()
        .map(|(name, desc, stars, lang, lc)| TrendingRepo {
            name: name.to_string(),
            desc: desc.to_string(),
            stars: stars.to_string(),
            lang: lang.to_string(),
            lc: lc.to_string(),
        })
        .collect()
}

/// Runs all source adapters and merges their output into a [`NewsFeed`].
pub struct Fetcher {
    client: Client,
    hn_api_url: String,
    devto_api_url: String,
    proxy_url: String,
    feeds: Vec<FeedConfig>,
    trending: Box<dyn TrendingProvider>,
    status: RwLock<RefreshStatus>,
    generation: AtomicU64,
}

fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("CodeWire/1.0 (News Aggregator)")
        .build()
        .expect("Failed to create HTTP client")
}

impl Fetcher {
    pub fn new(config: &Config) -> Self {
        let client = build_client();
        let trending = Box::new(GithubTrending::new(client.clone(), config));
        Self::with_trending(config, trending)
    }

    /// Build with a custom trending provider (used by tests and to disable
    /// the scrape entirely).
    pub fn with_trending(config: &Config, trending: Box<dyn TrendingProvider>) -> Self {
        Self {
            client: build_client(),
            hn_api_url: config.hn_api_url.clone(),
            devto_api_url: config.devto_api_url.clone(),
            proxy_url: config.proxy_url.clone(),
            feeds: config.feeds.clone(),
            trending,
            status: RwLock::new(RefreshStatus {
                loading: false,
                progress: 0,
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn status(&self) -> RefreshStatus {
        *self.status.read().await
    }

    pub async fn is_refreshing(&self) -> bool {
        self.status.read().await.loading
    }

    /// One aggregation cycle: launch all adapters together, wait for all of
    /// them to settle, then replace the shared feed state.
    ///
    /// Each cycle carries a generation number; if another refresh starts
    /// while this one is in flight, the older cycle's results are discarded
    /// instead of racing on the shared state.
    pub async fn refresh(&self, feed: &RwLock<NewsFeed>) -> anyhow::Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_status(generation, true, 5).await;
        info!("Starting aggregation cycle {}", generation);

        let (hn, devto, rss, trending) = tokio::join!(
            self.fetch_hn(),
            self.fetch_devto(),
            self.fetch_all_rss(),
            self.trending.fetch_trending(),
        );

        self.set_status(generation, true, 75).await;

        let hn = hn.unwrap_or_else(|e| {
            warn!("HN fetch failed: {}", e);
            Vec::new()
        });
        let devto = devto.unwrap_or_else(|e| {
            warn!("Dev.to fetch failed: {}", e);
            Vec::new()
        });
        let repos = match trending {
            Ok(repos) => repos,
            Err(e) => {
                warn!("GitHub trending fetch failed, using fallback list: {}", e);
                fallback_repos()
            }
        };

        let (articles, ticker) = merge_articles(hn, devto, rss);

        if self.generation.load(Ordering::SeqCst) != generation {
            info!("Discarding stale aggregation cycle {}", generation);
            return Ok(());
        }

        let count = articles.len();
        {
            let mut state = feed.write().await;
            state.articles = articles;
            state.ticker = ticker;
            state.repos = repos;
        }
        self.set_status(generation, false, 100).await;
        info!("Aggregation cycle {} complete: {} articles", generation, count);
        Ok(())
    }

    async fn set_status(&self, generation: u64, loading: bool, progress: u8) {
        // A stale cycle must not touch the progress indicator.
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        *self.status.write().await = RefreshStatus { loading, progress };
    }

    /// Top-story id list, then the first 30 items fetched concurrently.
    /// Items that fail or lack a title are dropped.
    async fn fetch_hn(&self) -> anyhow::Result<Vec<Article>> {
        let ids: Vec<u64> = self
            .client
            .get(format!("{}/topstories.json", self.hn_api_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let fetches = ids.into_iter().take(HN_STORY_COUNT).map(|id| {
            let client = self.client.clone();
            let url = format!("{}/item/{}.json", self.hn_api_url, id);
            async move {
                let item = client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<HnItem>()
                    .await?;
                anyhow::Ok(item)
            }
        });

        let results = join_all(fetches).await;
        Ok(results
            .into_iter()
            .filter_map(|r| r.ok().and_then(hn_article))
            .collect())
    }

    /// Fixed page of last week's top Dev.to articles.
    async fn fetch_devto(&self) -> anyhow::Result<Vec<Article>> {
        let list: Vec<DevtoArticle> = self
            .client
            .get(&self.devto_api_url)
            .query(&[("top", "7"), ("per_page", "20")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(list.into_iter().map(devto_article).collect())
    }

    /// All configured RSS feeds in parallel; a failing feed degrades to
    /// zero articles without affecting the others.
    async fn fetch_all_rss(&self) -> Vec<Article> {
        let results = join_all(self.feeds.iter().map(|feed| self.fetch_rss(feed))).await;
        results
            .into_iter()
            .zip(&self.feeds)
            .flat_map(|(result, feed)| match result {
                Ok(articles) => articles,
                Err(e) => {
                    warn!("RSS fetch failed for '{}': {}", feed.name, e);
                    Vec::new()
                }
            })
            .collect()
    }

    async fn fetch_rss(&self, feed: &FeedConfig) -> anyhow::Result<Vec<Article>> {
        let xml = fetch_proxied(&self.client, &self.proxy_url, &feed.url).await?;
        parse_rss_feed(&xml, feed)
    }
}

/// The CORS proxy wraps the target's body in a JSON envelope.
#[derive(Deserialize)]
struct ProxyEnvelope {
    contents: String,
}

async fn fetch_proxied(client: &Client, proxy_url: &str, target: &str) -> anyhow::Result<String> {
    let envelope: ProxyEnvelope = client
        .get(proxy_url)
        .query(&[("url", target)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(envelope.contents)
}

#[derive(Debug, Deserialize)]
struct HnItem {
    id: u64,
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    descendants: i64,
    #[serde(default)]
    time: i64,
    by: Option<String>,
}

fn hn_article(item: HnItem) -> Option<Article> {
    // Deleted items and job postings come back without a title.
    let title = item.title.filter(|t| !t.is_empty())?;
    let hn_url = format!("https://news.ycombinator.com/item?id={}", item.id);
    let tags = extract_tags(&title);
    Some(Article {
        id: format!("hn_{}", item.id),
        source: Source::Hn,
        title,
        url: item.url.unwrap_or_else(|| hn_url.clone()),
        hn_url: Some(hn_url),
        score: item.score,
        comments: item.descendants,
        time: ArticleTime::Unix(item.time),
        by: item.by,
        tags,
        description: None,
        source_name: None,
        source_badge: None,
    })
}

#[derive(Debug, Deserialize)]
struct DevtoArticle {
    id: u64,
    title: String,
    url: String,
    #[serde(default)]
    positive_reactions_count: i64,
    #[serde(default)]
    comments_count: i64,
    #[serde(default)]
    published_at: String,
    user: Option<DevtoUser>,
    #[serde(default)]
    tag_list: Vec<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DevtoUser {
    username: String,
}

fn devto_article(raw: DevtoArticle) -> Article {
    Article {
        id: format!("devto_{}", raw.id),
        source: Source::Devto,
        title: raw.title,
        url: raw.url,
        hn_url: None,
        score: raw.positive_reactions_count,
        comments: raw.comments_count,
        time: ArticleTime::Text(raw.published_at),
        by: raw.user.map(|u| u.username),
        // Dev.to ships its own tag list; the classifier is not applied
        tags: raw.tag_list,
        description: raw.description,
        source_name: None,
        source_badge: None,
    }
}

/// First 8 entries of a feed, titles and descriptions stripped of markup,
/// descriptions truncated for card display.
fn parse_rss_feed(xml: &str, feed: &FeedConfig) -> anyhow::Result<Vec<Article>> {
    let parsed = feed_rs::parser::parse(xml.as_bytes())?;

    Ok(parsed
        .entries
        .into_iter()
        .take(RSS_ENTRY_COUNT)
        .map(|entry| {
            let title = strip_html(
                &entry.title.map(|t| t.content).unwrap_or_default(),
            )
            .trim()
            .to_string();
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_else(|| "#".to_string());
            let date = entry
                .published
                .or(entry.updated)
                .map(|d| d.to_rfc3339())
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|s| truncate_chars(strip_html(&s.content).trim(), RSS_DESC_MAX));
            let tags = extract_tags(&title);

            Article {
                id: rss_article_id(&feed.badge, &feed.url, &link),
                source: Source::Rss,
                title,
                url: link,
                hn_url: None,
                score: 0,
                comments: 0,
                time: ArticleTime::Text(date),
                by: Some(feed.name.clone()),
                tags,
                description,
                source_name: Some(feed.name.clone()),
                source_badge: Some(feed.badge.clone()),
            }
        })
        .collect())
}

/// Stable article id from feed URL + entry link, so the same entry keeps
/// its identity across refreshes (bookmarks de-duplicate correctly).
fn rss_article_id(badge: &str, feed_url: &str, link: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(feed_url.as_bytes());
    hasher.update(link.as_bytes());
    let hex = hasher.finalize().to_hex();
    format!("rss_{}_{}", badge, &hex.as_str()[..12])
}

fn strip_html(s: &str) -> String {
    if !s.contains('<') {
        return s.to_string();
    }
    Html::parse_fragment(s).root_element().text().collect()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Fixed merge policy: HN sorted by score descending, then Dev.to sorted by
/// score descending, then RSS in fetch order. Never a global re-sort.
/// The ticker is the first 20 HN articles post-sort.
fn merge_articles(
    mut hn: Vec<Article>,
    mut devto: Vec<Article>,
    rss: Vec<Article>,
) -> (Vec<Article>, Vec<Article>) {
    hn.sort_by(|a, b| b.score.cmp(&a.score));
    devto.sort_by(|a, b| b.score.cmp(&a.score));

    let ticker: Vec<Article> = hn.iter().take(TICKER_SIZE).cloned().collect();

    let mut merged = hn;
    merged.extend(devto);
    merged.extend(rss);
    (merged, ticker)
}

fn parse_trending_html(html: &str) -> anyhow::Result<Vec<TrendingRepo>> {
    let row_sel = selector("article.Box-row")?;
    let name_sel = selector("h2 a")?;
    let desc_sel = selector("p")?;
    let stars_sel = selector(r#"a[href$="/stargazers"]"#)?;
    let lang_sel = selector(r#"[itemprop="programmingLanguage"]"#)?;
    let color_sel = selector(".repo-language-color")?;

    let document = Html::parse_document(html);
    let repos = document
        .select(&row_sel)
        .take(TRENDING_COUNT)
        .filter_map(|row| {
            let name = row
                .select(&name_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| href.trim_start_matches('/').to_string())?;
            if name.is_empty() {
                return None;
            }
            let desc = row
                .select(&desc_sel)
                .next()
                .map(|p| p.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let stars = row
                .select(&stars_sel)
                .next()
                .map(|a| a.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let lang = row
                .select(&lang_sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let lc = row
                .select(&color_sel)
                .next()
                .and_then(|el| el.value().attr("style"))
                .and_then(|style| style.rsplit(':').next())
                .map(|color| color.trim().trim_end_matches(';').to_string())
                .unwrap_or_else(|| "#63b3ed".to_string());

            Some(TrendingRepo {
                name,
                desc,
                stars,
                lang,
                lc,
            })
        })
        .collect();

    Ok(repos)
}

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector '{}': {}", css, e))
}

pub async fn start_background_refresh(
    fetcher: Arc<Fetcher>,
    feed: Arc<RwLock<NewsFeed>>,
    interval_minutes: u64,
) {
    let interval = Duration::from_secs(interval_minutes * 60);

    // Do initial fetch
    info!("Starting initial aggregation");
    if let Err(e) = fetcher.refresh(&feed).await {
        error!("Initial aggregation failed: {}", e);
    }

    // Then schedule periodic refreshes
    loop {
        tokio::time::sleep(interval).await;
        info!("Starting scheduled aggregation");
        if let Err(e) = fetcher.refresh(&feed).await {
            error!("Scheduled aggregation failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, source: Source, score: i64) -> Article {
        Article {
            id: id.to_string(),
            source,
            title: format!("Article {}", id),
            url: format!("https://example.com/{}", id),
            hn_url: None,
            score,
            comments: 0,
            time: ArticleTime::Unix(0),
            by: None,
            tags: vec![],
            description: None,
            source_name: None,
            source_badge: None,
        }
    }

    fn feed_config() -> FeedConfig {
        FeedConfig {
            name: "Tech News".to_string(),
            badge: "TN".to_string(),
            url: "https://technews.example.com/feed".to_string(),
        }
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn test_merge_order_is_grouped_not_global() {
            let hn = vec![
                article("hn_a", Source::Hn, 5),
                article("hn_b", Source::Hn, 20),
                article("hn_c", Source::Hn, 1),
            ];
            let devto = vec![
                article("devto_a", Source::Devto, 3),
                article("devto_b", Source::Devto, 9),
            ];
            let rss = vec![
                article("rss_1", Source::Rss, 0),
                article("rss_2", Source::Rss, 0),
            ];

            let (merged, _) = merge_articles(hn, devto, rss);

            let ids: Vec<&str> = merged.iter().map(|a| a.id.as_str()).collect();
            assert_eq!(
                ids,
                vec!["hn_b", "hn_a", "hn_c", "devto_b", "devto_a", "rss_1", "rss_2"]
            );
        }

        #[test]
        fn test_ticker_is_top_hn_only() {
            let hn: Vec<Article> = (0..25)
                .map(|i| article(&format!("hn_{}", i), Source::Hn, i))
                .collect();
            let devto = vec![article("devto_top", Source::Devto, 1000)];

            let (_, ticker) = merge_articles(hn, devto, vec![]);

            assert_eq!(ticker.len(), TICKER_SIZE);
            assert_eq!(ticker[0].id, "hn_24");
            assert!(ticker.iter().all(|a| a.source == Source::Hn));
        }

        #[test]
        fn test_empty_groups_merge_cleanly() {
            let (merged, ticker) =
                merge_articles(vec![], vec![], vec![article("rss_1", Source::Rss, 0)]);
            assert_eq!(merged.len(), 1);
            assert!(ticker.is_empty());
        }
    }

    mod hn_mapping_tests {
        use super::*;

        fn item(title: Option<&str>, url: Option<&str>) -> HnItem {
            HnItem {
                id: 42,
                title: title.map(|t| t.to_string()),
                url: url.map(|u| u.to_string()),
                score: 17,
                descendants: 3,
                time: 1700000000,
                by: Some("alice".to_string()),
            }
        }

        #[test]
        fn test_maps_fields() {
            let a = hn_article(item(Some("Rust is nice"), Some("https://blog.example.com"))).unwrap();
            assert_eq!(a.id, "hn_42");
            assert_eq!(a.source, Source::Hn);
            assert_eq!(a.score, 17);
            assert_eq!(a.comments, 3);
            assert_eq!(
                a.hn_url.as_deref(),
                Some("https://news.ycombinator.com/item?id=42")
            );
            assert_eq!(a.tags, vec!["rust"]);
        }

        #[test]
        fn test_discards_untitled_items() {
            assert!(hn_article(item(None, Some("https://x.example.com"))).is_none());
            assert!(hn_article(item(Some(""), None)).is_none());
        }

        #[test]
        fn test_url_falls_back_to_item_page() {
            // Ask HN posts carry no external URL
            let a = hn_article(item(Some("Ask HN: anything?"), None)).unwrap();
            assert_eq!(a.url, "https://news.ycombinator.com/item?id=42");
        }
    }

    mod rss_parsing_tests {
        use super::*;

        const RSS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
            <rss version="2.0">
                <channel>
                    <title>Tech News</title>
                    <item>
                        <title>&lt;b&gt;Big&lt;/b&gt; rust story</title>
                        <link>https://technews.example.com/article/1</link>
                        <description>&lt;p&gt;Some &lt;i&gt;markup&lt;/i&gt; here&lt;/p&gt;</description>
                        <pubDate>Mon, 09 Dec 2024 12:00:00 GMT</pubDate>
                    </item>
                    <item>
                        <title>Second story</title>
                        <link>https://technews.example.com/article/2</link>
                    </item>
                </channel>
            </rss>
        "#;

        #[test]
        fn test_parses_and_strips_markup() {
            let articles = parse_rss_feed(RSS_XML, &feed_config()).unwrap();
            assert_eq!(articles.len(), 2);

            let first = &articles[0];
            assert_eq!(first.title, "Big rust story");
            assert_eq!(first.description.as_deref(), Some("Some markup here"));
            assert_eq!(first.source, Source::Rss);
            assert_eq!(first.source_badge.as_deref(), Some("TN"));
            assert_eq!(first.by.as_deref(), Some("Tech News"));
            assert_eq!(first.tags, vec!["rust"]);
        }

        #[test]
        fn test_ids_are_stable_across_parses() {
            let first = parse_rss_feed(RSS_XML, &feed_config()).unwrap();
            let second = parse_rss_feed(RSS_XML, &feed_config()).unwrap();
            assert_eq!(first[0].id, second[0].id);
            assert!(first[0].id.starts_with("rss_TN_"));
        }

        #[test]
        fn test_ids_differ_per_entry() {
            let articles = parse_rss_feed(RSS_XML, &feed_config()).unwrap();
            assert_ne!(articles[0].id, articles[1].id);
        }

        #[test]
        fn test_takes_at_most_eight_entries() {
            let items: String = (0..12)
                .map(|i| {
                    format!(
                        "<item><title>Story {}</title><link>https://technews.example.com/{}</link></item>",
                        i, i
                    )
                })
                .collect();
            let xml = format!(
                r#"<?xml version="1.0"?><rss version="2.0"><channel><title>T</title>{}</channel></rss>"#,
                items
            );

            let articles = parse_rss_feed(&xml, &feed_config()).unwrap();
            assert_eq!(articles.len(), RSS_ENTRY_COUNT);
        }

        #[test]
        fn test_long_description_truncated() {
            let long = "x".repeat(500);
            let xml = format!(
                r#"<?xml version="1.0"?><rss version="2.0"><channel><title>T</title>
                <item><title>A</title><link>https://t.example.com/1</link>
                <description>{}</description></item></channel></rss>"#,
                long
            );

            let articles = parse_rss_feed(&xml, &feed_config()).unwrap();
            assert_eq!(
                articles[0].description.as_ref().unwrap().chars().count(),
                RSS_DESC_MAX
            );
        }

        #[test]
        fn test_malformed_xml_is_an_error() {
            assert!(parse_rss_feed("not xml at all", &feed_config()).is_err());
        }
    }

    mod trending_tests {
        use super::*;

        const TRENDING_HTML: &str = r#"
            <html><body>
            <article class="Box-row">
                <h2 class="h3"><a href="/rust-lang/rust">rust-lang / rust</a></h2>
                <p class="col-9">Empowering everyone to build reliable software</p>
                <span itemprop="programmingLanguage">Rust</span>
                <span class="repo-language-color" style="background-color: #dea584"></span>
                <a href="/rust-lang/rust/stargazers">98,123</a>
            </article>
            <article class="Box-row">
                <h2 class="h3"><a href="/vercel/next.js">vercel / next.js</a></h2>
                <p class="col-9">The React Framework</p>
                <span itemprop="programmingLanguage">JavaScript</span>
                <span class="repo-language-color" style="background-color: #f1e05a"></span>
                <a href="/vercel/next.js/stargazers">120,000</a>
            </article>
            </body></html>
        "#;

        #[test]
        fn test_parses_repo_rows() {
            let repos = parse_trending_html(TRENDING_HTML).unwrap();
            assert_eq!(repos.len(), 2);

            assert_eq!(repos[0].name, "rust-lang/rust");
            assert_eq!(repos[0].lang, "Rust");
            assert_eq!(repos[0].lc, "#dea584");
            assert_eq!(repos[0].stars, "98,123");
            assert!(repos[0].desc.contains("Empowering"));
        }

        #[test]
        fn test_rows_without_name_discarded() {
            let html = r#"<article class="Box-row"><p>orphan row</p></article>"#;
            let repos = parse_trending_html(html).unwrap();
            assert!(repos.is_empty());
        }

        #[test]
        fn test_takes_at_most_five_rows() {
            let rows: String = (0..9)
                .map(|i| {
                    format!(
                        r#"<article class="Box-row"><h2><a href="/org/repo{}">r</a></h2></article>"#,
                        i
                    )
                })
                .collect();
            let repos = parse_trending_html(&rows).unwrap();
            assert_eq!(repos.len(), TRENDING_COUNT);
        }

        #[test]
        fn test_fallback_list_shape() {
            let repos = fallback_repos();
            assert_eq!(repos.len(), 5);
            assert!(repos.iter().all(|r| !r.name.is_empty()));
        }
    }

    mod helper_tests {
        use super::*;

        #[test]
        fn test_strip_html() {
            assert_eq!(strip_html("plain text"), "plain text");
            assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
            assert_eq!(strip_html(""), "");
        }

        #[test]
        fn test_truncate_chars_is_boundary_safe() {
            assert_eq!(truncate_chars("abcdef", 3), "abc");
            assert_eq!(truncate_chars("短い日本語です", 3), "短い日");
            assert_eq!(truncate_chars("short", 140), "short");
        }

        #[test]
        fn test_rss_id_depends_on_feed_and_link() {
            let a = rss_article_id("TC", "https://feed.example.com", "https://a.example.com");
            let b = rss_article_id("TC", "https://feed.example.com", "https://b.example.com");
            let c = rss_article_id("TC", "https://other.example.com", "https://a.example.com");
            assert_ne!(a, b);
            assert_ne!(a, c);
            // And deterministic
            assert_eq!(
                a,
                rss_article_id("TC", "https://feed.example.com", "https://a.example.com")
            );
        }
    }
}
