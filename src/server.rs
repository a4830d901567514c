/// HTTP surface for the search resolver
///
/// The search contract is deliberately forgiving: `/search` always answers 200
/// with a results list, adding a generic error indicator only when the cascade
/// had no fallback left. Internal failure details never leak to callers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::SearchError;
use crate::nlp::SemanticBackend;
use crate::resolver::{SearchResolver, SearchResult};
use crate::store::{ProductRow, ProductStore};

/// Shared per-process state. Cloning is cheap; everything is behind an Arc.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<SearchResolver>,
    pub store: Arc<dyn ProductStore>,
    pub nlp: Option<Arc<dyn SemanticBackend>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/products/popular", get(popular))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub id: Option<String>,
    pub ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let outcome = state
        .resolver
        .resolve(
            params.q.as_deref().unwrap_or(""),
            params.id.as_deref(),
            params.ids.as_deref(),
        )
        .await;

    Json(SearchResponse {
        results: outcome.results,
        error: outcome.failed.then_some("search_unavailable"),
    })
}

async fn popular(State(state): State<AppState>) -> Result<Json<Vec<ProductRow>>, ApiError> {
    let rows = state.store.popular(5).await?;
    Ok(Json(rows))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: bool,
    nlp: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.store.ping().await.is_ok();
    let nlp = match &state.nlp {
        Some(client) => client.health().await,
        None => false,
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
        nlp,
    })
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        // Log the detail, answer with a generic message.
        tracing::error!(error = %err, "request failed");
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
