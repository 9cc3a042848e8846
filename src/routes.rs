use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::ai::{AiClient, AiError};
use crate::feed::{select_page, FeedPage, FeedQuery, SourceFilter};
use crate::fetcher::{Fetcher, NewsFeed, RefreshStatus};
use crate::models::{Article, Question, TrendingRepo};
use crate::store::{BookmarkStore, QaFilter, QaStore, StoreError};
use crate::tags::all_topics;

pub struct AppState {
    pub feed: Arc<RwLock<NewsFeed>>,
    pub fetcher: Arc<Fetcher>,
    pub bookmarks: Arc<BookmarkStore>,
    pub qa: Arc<QaStore>,
    pub ai: Arc<AiClient>,
    pub page_size: usize,
}

// Error type mapped onto the JSON error contract: 400 for bad input, 404
// for unknown ids, 500 for configuration and upstream failures.
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Config(String),
    Upstream(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("server configuration error: {}", msg),
            ),
            ApiError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Internal(e) => {
                error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyTitle | StoreError::EmptyAnswer => {
                ApiError::BadRequest(err.to_string())
            }
            StoreError::QuestionNotFound(_) | StoreError::AnswerNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            StoreError::Persistence(e) => ApiError::Internal(e),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/feed", get(feed_page))
        .route("/api/ticker", get(ticker))
        .route("/api/trending", get(trending))
        .route("/api/tags", get(topics))
        .route("/api/refresh", post(refresh))
        .route("/api/refresh/status", get(refresh_status))
        .route("/api/bookmarks", get(list_bookmarks).delete(clear_bookmarks))
        .route("/api/bookmarks/toggle", post(toggle_bookmark))
        .route("/api/questions", get(list_questions).post(create_question))
        .route("/api/questions/:id/vote", post(vote_question))
        .route("/api/questions/:id/answers", post(answer_question))
        .route("/api/questions/:id/answers/:answer_id/best", post(mark_best_answer))
        .route("/api/questions/:id/ai-answer", post(ai_answer))
        .route("/api/translate", post(translate))
        .route("/api/ask-ai", post(ask_ai))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    "OK"
}

#[derive(Deserialize)]
struct FeedParams {
    #[serde(default)]
    source: Option<String>,
    /// Comma-separated active tag filters
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

async fn feed_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>, ApiError> {
    let source = params
        .source
        .as_deref()
        .unwrap_or("all")
        .parse::<SourceFilter>()
        .map_err(ApiError::BadRequest)?;
    let tags: Vec<String> = params
        .tags
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    let query = FeedQuery {
        source,
        tags,
        limit: params.limit.unwrap_or(state.page_size),
    };

    let feed = state.feed.read().await;
    Ok(Json(select_page(&feed.articles, &query)))
}

async fn ticker(State(state): State<Arc<AppState>>) -> Json<Vec<Article>> {
    Json(state.feed.read().await.ticker.clone())
}

async fn trending(State(state): State<Arc<AppState>>) -> Json<Vec<TrendingRepo>> {
    Json(state.feed.read().await.repos.clone())
}

async fn topics() -> Json<Vec<&'static str>> {
    Json(all_topics())
}

async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshStatus> {
    // Fire and forget; progress is polled via /api/refresh/status
    let fetcher = state.fetcher.clone();
    let feed = state.feed.clone();
    tokio::spawn(async move {
        let _ = fetcher.refresh(&feed).await;
    });

    // Report the loading state immediately, without waiting for the
    // spawned cycle to update it
    Json(RefreshStatus {
        loading: true,
        progress: 5,
    })
}

async fn refresh_status(State(state): State<Arc<AppState>>) -> Json<RefreshStatus> {
    Json(state.fetcher.status().await)
}

async fn list_bookmarks(State(state): State<Arc<AppState>>) -> Json<Vec<Article>> {
    Json(state.bookmarks.list().await)
}

async fn toggle_bookmark(
    State(state): State<Arc<AppState>>,
    Json(article): Json<Article>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let bookmarked = state.bookmarks.toggle(article).await?;
    Ok(Json(json!({
        "bookmarked": bookmarked,
        "count": state.bookmarks.count().await,
    })))
}

async fn clear_bookmarks(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.bookmarks.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct QuestionListParams {
    #[serde(default)]
    filter: Option<String>,
}

async fn list_questions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QuestionListParams>,
) -> Result<Json<Vec<Question>>, ApiError> {
    let filter = params
        .filter
        .as_deref()
        .unwrap_or("all")
        .parse::<QaFilter>()
        .map_err(ApiError::BadRequest)?;
    Ok(Json(state.qa.list(filter).await))
}

#[derive(Deserialize)]
struct NewQuestion {
    title: String,
    #[serde(default)]
    body: String,
    /// Raw tag input, split on whitespace/comma/# server-side
    #[serde(default)]
    tags: String,
}

async fn create_question(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewQuestion>,
) -> Result<(StatusCode, Json<Question>), ApiError> {
    let question = state.qa.create(&input.title, &input.body, &input.tags).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[derive(Deserialize)]
struct VoteInput {
    delta: i64,
}

async fn vote_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<VoteInput>,
) -> Result<Json<Question>, ApiError> {
    Ok(Json(state.qa.vote(&id, input.delta).await?))
}

#[derive(Deserialize)]
struct AnswerInput {
    text: String,
}

async fn answer_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<AnswerInput>,
) -> Result<Json<Question>, ApiError> {
    Ok(Json(state.qa.answer(&id, &input.text).await?))
}

async fn mark_best_answer(
    State(state): State<Arc<AppState>>,
    Path((id, answer_id)): Path<(String, String)>,
) -> Result<Json<Question>, ApiError> {
    Ok(Json(state.qa.mark_best(&id, &answer_id).await?))
}

#[derive(Deserialize)]
struct AiAnswerParams {
    #[serde(default)]
    regenerate: bool,
}

async fn ai_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<AiAnswerParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let question = state.qa.get(&id).await?;

    // Cached per question until explicitly regenerated
    if !params.regenerate {
        if let Some(answer) = question.ai_answer {
            return Ok(Json(json!({ "answer": answer })));
        }
    }

    let body = (!question.body.is_empty()).then_some(question.body.as_str());
    match state.ai.ask(&question.title, body, &question.tags).await {
        Ok(answer) => {
            state.qa.set_ai_answer(&id, &answer).await?;
            Ok(Json(json!({ "answer": answer })))
        }
        Err(AiError::MissingApiKey) => {
            Err(ApiError::Config("ANTHROPIC_API_KEY is not set".to_string()))
        }
        Err(e) => {
            error!("AI answer error: {}", e);
            Err(ApiError::Upstream("AI answer failed".to_string()))
        }
    }
}

#[derive(Deserialize)]
struct TranslateInput {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Json(input): Json<TranslateInput>,
) -> Result<Json<crate::ai::Translation>, ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    match state
        .ai
        .translate(&input.title, input.description.as_deref())
        .await
    {
        Ok(translation) => Ok(Json(translation)),
        Err(AiError::MissingApiKey) => {
            Err(ApiError::Config("ANTHROPIC_API_KEY is not set".to_string()))
        }
        Err(e) => {
            error!("Translation error: {}", e);
            Err(ApiError::Upstream("Translation failed".to_string()))
        }
    }
}

#[derive(Deserialize)]
struct AskInput {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

async fn ask_ai(
    State(state): State<Arc<AppState>>,
    Json(input): Json<AskInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    match state
        .ai
        .ask(&input.title, input.body.as_deref(), &input.tags)
        .await
    {
        Ok(answer) => Ok(Json(json!({ "answer": answer }))),
        Err(AiError::MissingApiKey) => {
            Err(ApiError::Config("ANTHROPIC_API_KEY is not set".to_string()))
        }
        Err(e) => {
            error!("AI answer error: {}", e);
            Err(ApiError::Upstream("AI answer failed".to_string()))
        }
    }
}
