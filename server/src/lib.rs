use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use qamatch::{
    rank, AnswerError, AnswerProvider, Assistant, CancelToken, DisabledProvider, EngineConfig, HttpAnswerProvider,
    Index, QaRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Startup settings for the HTTP host.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub corpus: PathBuf,
    pub threshold: f64,
    pub remote_url: Option<String>,
    pub remote_timeout: Duration,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_hits: usize,
    pub generation: u64,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub position: usize,
    pub score: f64,
    pub question: String,
    pub answer: String,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub query: String,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, msg: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": msg.to_string() })))
}

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub corpus_path: PathBuf,
    pub admin_token: Option<String>,
}

/// Build the router, choosing the remote provider from `config.remote_url`.
pub fn build_app(config: AppConfig) -> Result<Router> {
    let provider: Arc<dyn AnswerProvider> = match &config.remote_url {
        Some(url) => Arc::new(HttpAnswerProvider::new(url.clone(), config.remote_timeout)?),
        None => {
            tracing::warn!("no remote provider configured; low-confidence queries will fail");
            Arc::new(DisabledProvider)
        }
    };
    build_app_with_provider(config, provider)
}

pub fn build_app_with_provider(config: AppConfig, provider: Arc<dyn AnswerProvider>) -> Result<Router> {
    // Index the corpus at startup
    let index = Index::from_path(&config.corpus)?;
    let engine = EngineConfig { threshold: config.threshold, remote_timeout: config.remote_timeout };
    let assistant = Assistant::new(index, engine, provider)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { assistant: Arc::new(assistant), corpus_path: config.corpus, admin_token };
    Ok(router(app_state))
}

pub fn router(app_state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/answer", post(answer_handler))
        .route("/doc/:position", get(doc_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let snap = state.assistant.snapshot();
    let k = params.k.clamp(1, 100);

    let hits: Vec<_> = rank(&params.q, &snap.index, snap.index.len())
        .into_iter()
        .filter(|h| h.score > 0.0)
        .collect();
    let total_hits = hits.len();
    let results = hits
        .into_iter()
        .take(k)
        .filter_map(|h| {
            let qa = snap.index.record(h.position)?;
            Some(SearchHit { position: h.position, score: h.score, question: qa.question.clone(), answer: qa.answer.clone() })
        })
        .collect();

    let elapsed = start.elapsed();
    Json(SearchResponse {
        query: params.q,
        took_ms: elapsed.as_millis(),
        took_s: elapsed.as_secs_f64(),
        total_hits,
        generation: snap.generation,
        results,
    })
}

pub async fn answer_handler(State(state): State<AppState>, Json(req): Json<AnswerRequest>) -> Result<Json<qamatch::Answer>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "query must not be empty"));
    }
    let cancel = CancelToken::new();
    match state.assistant.answer(&req.query, &cancel).await {
        Ok(answer) => Ok(Json(answer)),
        Err(AnswerError::Remote(e)) => {
            let status = if e.is_timeout() {
                StatusCode::GATEWAY_TIMEOUT
            } else if matches!(e, qamatch::RemoteProviderError::NotConfigured) {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_GATEWAY
            };
            Err(api_error(status, e))
        }
    }
}

pub async fn doc_handler(State(state): State<AppState>, Path(position): Path<usize>) -> Result<Json<QaRecord>, ApiError> {
    let snap = state.assistant.snapshot();
    snap.index
        .record(position)
        .cloned()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "not found"))
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers)?;
    let assistant = state.assistant.clone();
    let path = state.corpus_path.clone();
    let result = tokio::task::spawn_blocking(move || assistant.reload(path))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    match result {
        Ok((generation, stats)) => Ok(Json(json!({
            "generation": generation,
            "documents": stats.documents,
            "vocabulary": stats.vocabulary,
        }))),
        Err(e) => Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, e)),
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(api_error(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set")),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(api_error(StatusCode::UNAUTHORIZED, "invalid admin token"))
    }
}
