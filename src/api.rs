// src/api.rs
//! HTTP surface consumed by the UI collaborator.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::aggregate::NewsAggregator;
use crate::article::Article;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<NewsAggregator>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(combined_news))
        .route("/api/search", get(search_news))
        .route("/api/cache/clear", post(clear_cache))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn default_category() -> String {
    "general".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_page() -> u32 {
    1
}

#[derive(Deserialize)]
struct NewsQuery {
    #[serde(default = "default_category")]
    category: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(rename = "pageSize", default)]
    page_size: usize,
}

async fn combined_news(
    State(state): State<AppState>,
    Query(q): Query<NewsQuery>,
) -> Json<Vec<Article>> {
    let articles = state
        .aggregator
        .get_combined_news(&q.category, &q.language, q.page, q.page_size)
        .await;
    // An empty list is the "no articles found" state, never an error.
    Json(articles)
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    query: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(rename = "pageSize", default)]
    page_size: usize,
}

async fn search_news(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Article>>, (StatusCode, Json<Value>)> {
    let query = q.query.trim();
    if query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing query",
                "message": "search requires a non-empty ?query= parameter"
            })),
        ));
    }
    let articles = state
        .aggregator
        .search_news(query, &q.language, q.page, q.page_size)
        .await;
    Ok(Json(articles))
}

async fn clear_cache(State(state): State<AppState>) -> &'static str {
    state.aggregator.clear_cache();
    "cleared"
}
