use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use tracing::warn;

use crate::models::{now_millis, Answer, Article, Question};

/// Key under which the serialized bookmark list is stored.
pub const BOOKMARKS_KEY: &str = "codewire_bookmarks";
/// Key under which the serialized question collection is stored.
pub const QA_KEY: &str = "codewire_qa";

/// SQLite-backed key-value store. Bookmarks and the Q&A collection are
/// persisted wholesale as two named JSON records.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn initialize(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn kv_get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn kv_put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load the persisted bookmark list. Absent or malformed records yield
    /// an empty set rather than an error.
    pub async fn load_bookmarks(&self) -> anyhow::Result<Vec<Article>> {
        match self.kv_get(BOOKMARKS_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(list) => Ok(list),
                Err(e) => {
                    warn!("Discarding malformed bookmark record: {}", e);
                    Ok(Vec::new())
                }
            },
        }
    }

    pub async fn save_bookmarks(&self, bookmarks: &[Article]) -> anyhow::Result<()> {
        self.kv_put(BOOKMARKS_KEY, &serde_json::to_string(bookmarks)?)
            .await
    }

    /// Load the persisted question collection. A missing or malformed
    /// record falls back to the seeded demo questions.
    pub async fn load_questions(&self) -> anyhow::Result<Vec<Question>> {
        match self.kv_get(QA_KEY).await? {
            None => Ok(default_questions()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(list) => Ok(list),
                Err(e) => {
                    warn!("Discarding malformed Q&A record: {}", e);
                    Ok(default_questions())
                }
            },
        }
    }

    pub async fn save_questions(&self, questions: &[Question]) -> anyhow::Result<()> {
        self.kv_put(QA_KEY, &serde_json::to_string(questions)?).await
    }
}

/// First-run Q&A content, shown until the user posts something.
pub fn default_questions() -> Vec<Question> {
    let now = now_millis();
    vec![
        Question {
            id: "q1".to_string(),
            title: "ReactとVue、2025年に新しくプロジェクトを始めるならどちらを選ぶべきですか？"
                .to_string(),
            body: "B2BのSaaSを個人で作ろうとしています。エコシステムや求人、学習コスト、将来性などの観点で意見を聞かせてください。"
                .to_string(),
            tags: vec!["javascript".to_string(), "react".to_string(), "vue".to_string()],
            votes: 12,
            by: "taro_dev".to_string(),
            time: now - 3_600_000 * 2,
            answers: vec![Answer {
                id: "a1".to_string(),
                text: "2025年時点ではReactの求人数がVueの約3倍。SaaSであればReact + Next.jsが無難です。"
                    .to_string(),
                votes: 8,
                best: true,
                by: "senior_eng".to_string(),
                time: now - 3_600_000,
            }],
            ai_answer: None,
        },
        Question {
            id: "q2".to_string(),
            title: "Go言語でHTTPサーバーを書くとき標準ライブラリだけで十分ですか？".to_string(),
            body: "net/httpだけで実装するのとGinやEchoを使う場合の違いを教えてください。".to_string(),
            tags: vec!["go".to_string(), "web".to_string(), "backend".to_string()],
            votes: 7,
            by: "go_beginner".to_string(),
            time: now - 86_400_000,
            answers: vec![],
            ai_answer: None,
        },
    ]
}
