use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::db::Database;
use crate::models::{now_millis, Answer, Article, Question};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("title is required")]
    EmptyTitle,

    #[error("answer text is required")]
    EmptyAnswer,

    #[error("question not found: {0}")]
    QuestionNotFound(String),

    #[error("answer not found: {0}")]
    AnswerNotFound(String),

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persisted set of saved articles, keyed by article id. The full list is
/// written back to the database on every mutation.
pub struct BookmarkStore {
    db: Arc<Database>,
    items: RwLock<Vec<Article>>,
}

impl BookmarkStore {
    pub async fn load(db: Arc<Database>) -> anyhow::Result<Self> {
        let items = db.load_bookmarks().await?;
        info!("Loaded {} bookmarks", items.len());
        Ok(Self {
            db,
            items: RwLock::new(items),
        })
    }

    /// Add the article if absent, remove it if present. Returns whether the
    /// article is bookmarked afterwards.
    pub async fn toggle(&self, article: Article) -> Result<bool> {
        let mut items = self.items.write().await;
        let bookmarked = match items.iter().position(|b| b.id == article.id) {
            Some(idx) => {
                items.remove(idx);
                false
            }
            None => {
                items.push(article);
                true
            }
        };
        self.db.save_bookmarks(&items).await?;
        Ok(bookmarked)
    }

    pub async fn list(&self) -> Vec<Article> {
        self.items.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn clear(&self) -> Result<()> {
        let mut items = self.items.write().await;
        items.clear();
        self.db.save_bookmarks(&items).await?;
        Ok(())
    }
}

/// How the question list is filtered and ordered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QaFilter {
    #[default]
    All,
    Unanswered,
    Hot,
}

impl std::str::FromStr for QaFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(QaFilter::All),
            "unanswered" => Ok(QaFilter::Unanswered),
            "hot" => Ok(QaFilter::Hot),
            other => Err(format!("unknown filter: {}", other)),
        }
    }
}

/// Persisted question collection. Questions are never deleted; votes are
/// unbounded in both directions and answers are append-only. Every mutation
/// writes the entire collection back.
pub struct QaStore {
    db: Arc<Database>,
    questions: RwLock<Vec<Question>>,
    // Disambiguates ids created within the same millisecond.
    seq: AtomicU64,
}

impl QaStore {
    pub async fn load(db: Arc<Database>) -> anyhow::Result<Self> {
        let questions = db.load_questions().await?;
        info!("Loaded {} questions", questions.len());
        Ok(Self {
            db,
            questions: RwLock::new(questions),
            seq: AtomicU64::new(0),
        })
    }

    fn next_id(&self, prefix: &str) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}_{}", prefix, now_millis(), seq)
    }

    /// Create a new question from raw form input. The raw tag string is
    /// split on whitespace, commas and `#`, discarding empty tokens.
    pub async fn create(&self, title: &str, body: &str, tags_raw: &str) -> Result<Question> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let tags: Vec<String> = tags_raw
            .split(|c: char| c.is_whitespace() || c == ',' || c == '#')
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();

        let question = Question {
            id: self.next_id("q"),
            title: title.to_string(),
            body: body.trim().to_string(),
            tags,
            votes: 0,
            by: "あなた".to_string(),
            time: now_millis(),
            answers: vec![],
            ai_answer: None,
        };

        let mut questions = self.questions.write().await;
        questions.insert(0, question.clone());
        self.db.save_questions(&questions).await?;
        Ok(question)
    }

    /// Adjust a question's votes by `delta`. No per-user dedup, no floor.
    pub async fn vote(&self, id: &str, delta: i64) -> Result<Question> {
        let mut questions = self.questions.write().await;
        let question = questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| StoreError::QuestionNotFound(id.to_string()))?;
        question.votes += delta;
        let updated = question.clone();
        self.db.save_questions(&questions).await?;
        Ok(updated)
    }

    /// Append an answer to a question.
    pub async fn answer(&self, question_id: &str, text: &str) -> Result<Question> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyAnswer);
        }

        let answer = Answer {
            id: self.next_id("a"),
            text: text.to_string(),
            votes: 0,
            best: false,
            by: "あなた".to_string(),
            time: now_millis(),
        };

        let mut questions = self.questions.write().await;
        let question = questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| StoreError::QuestionNotFound(question_id.to_string()))?;
        question.answers.push(answer);
        let updated = question.clone();
        self.db.save_questions(&questions).await?;
        Ok(updated)
    }

    /// Mark one answer as best, clearing the flag on all others.
    pub async fn mark_best(&self, question_id: &str, answer_id: &str) -> Result<Question> {
        let mut questions = self.questions.write().await;
        let question = questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| StoreError::QuestionNotFound(question_id.to_string()))?;

        if !question.answers.iter().any(|a| a.id == answer_id) {
            return Err(StoreError::AnswerNotFound(answer_id.to_string()));
        }
        for answer in &mut question.answers {
            answer.best = answer.id == answer_id;
        }

        let updated = question.clone();
        self.db.save_questions(&questions).await?;
        Ok(updated)
    }

    pub async fn get(&self, question_id: &str) -> Result<Question> {
        let questions = self.questions.read().await;
        questions
            .iter()
            .find(|q| q.id == question_id)
            .cloned()
            .ok_or_else(|| StoreError::QuestionNotFound(question_id.to_string()))
    }

    pub async fn ai_answer(&self, question_id: &str) -> Result<Option<String>> {
        let questions = self.questions.read().await;
        let question = questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| StoreError::QuestionNotFound(question_id.to_string()))?;
        Ok(question.ai_answer.clone())
    }

    /// Cache a generated answer on the question. Overwrites any prior one.
    pub async fn set_ai_answer(&self, question_id: &str, answer: &str) -> Result<Question> {
        let mut questions = self.questions.write().await;
        let question = questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| StoreError::QuestionNotFound(question_id.to_string()))?;
        question.ai_answer = Some(answer.to_string());
        let updated = question.clone();
        self.db.save_questions(&questions).await?;
        Ok(updated)
    }

    /// Filtered, sorted view of the collection: `hot` sorts by votes,
    /// everything else by recency; `unanswered` keeps questions with no
    /// answers yet.
    pub async fn list(&self, filter: QaFilter) -> Vec<Question> {
        let questions = self.questions.read().await;
        let mut view: Vec<Question> = questions
            .iter()
            .filter(|q| filter != QaFilter::Unanswered || q.answers.is_empty())
            .cloned()
            .collect();
        match filter {
            QaFilter::Hot => view.sort_by(|a, b| b.votes.cmp(&a.votes)),
            _ => view.sort_by(|a, b| b.time.cmp(&a.time)),
        }
        view
    }
}
