use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codewire::ai::AiClient;
use codewire::config::Config;
use codewire::db::Database;
use codewire::fetcher::{start_background_refresh, Fetcher, NewsFeed};
use codewire::routes::{self, AppState};
use codewire::store::{BookmarkStore, QaFilter, QaStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codewire=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load_or_default("codewire.toml")?;
    info!("Loaded configuration with {} RSS feeds", config.feeds.len());

    // Initialize database
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:codewire.db?mode=rwc".to_string());
    let db = Database::new(&database_url).await?;
    db.initialize().await?;
    info!("Database initialized");

    let db = Arc::new(db);

    // Persistent stores
    let bookmarks = Arc::new(BookmarkStore::load(db.clone()).await?);
    let qa = Arc::new(QaStore::load(db.clone()).await?);
    info!(
        "Loaded {} bookmarks and {} questions",
        bookmarks.count().await,
        qa.list(QaFilter::All).await.len()
    );

    // AI client; features that need it fail with a configuration error
    // when the key is absent
    let api_key = std::env::var("ANTHROPIC_API_KEY").ok();
    let ai = Arc::new(AiClient::new(&config.ai, api_key));
    if !ai.has_api_key() {
        info!("ANTHROPIC_API_KEY not set; translation and AI answers are disabled");
    }

    // Aggregated feed state and fetcher
    let feed = Arc::new(RwLock::new(NewsFeed::default()));
    let fetcher = Arc::new(Fetcher::new(&config));

    // Start background refresh task
    let bg_fetcher = fetcher.clone();
    let bg_feed = feed.clone();
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        start_background_refresh(bg_fetcher, bg_feed, refresh_interval).await;
    });

    // Create app state and router
    let state = Arc::new(AppState {
        feed,
        fetcher,
        bookmarks,
        qa,
        ai,
        page_size: config.page_size,
    });
    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Server starting on http://{}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
