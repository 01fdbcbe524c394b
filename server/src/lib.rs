use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use engine::persist::{load_artifacts, ArtifactPaths};
use engine::{LookupError, QueryParseError, RankConfig, RawQuery, Recipe, Recommendation, Recommender};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Serialize)]
pub struct RecommendResponse {
    pub query: RawQuery,
    pub took_s: f64,
    pub total: usize,
    pub results: Vec<Recommendation>,
}

/// Shown in place of an empty instruction list.
pub const NO_STEPS: &str = "No steps provided.";

#[derive(Serialize)]
pub struct RecipeDetails {
    pub id: usize,
    pub name: String,
    pub total_time: Option<f64>,
    pub difficulty: Option<String>,
    pub rating: Option<f64>,
    pub steps: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl From<&Recipe> for RecipeDetails {
    fn from(r: &Recipe) -> Self {
        let mut steps = r.steps_list();
        if steps.is_empty() {
            steps.push(NO_STEPS.to_string());
        }
        Self {
            id: r.id,
            name: r.name.clone(),
            total_time: r.total_time,
            difficulty: r.difficulty.clone(),
            rating: r.rating,
            steps,
            extra: r.extra.clone(),
        }
    }
}

/// Request-level failures, rendered as `{"error": ...}`.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    BadQuery(#[from] QueryParseError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Lookup(LookupError::Ambiguous { .. }) => StatusCode::CONFLICT,
            ApiError::Lookup(_) => StatusCode::NOT_FOUND,
        };
        let mut body = serde_json::json!({ "error": self.to_string() });
        if let ApiError::Lookup(LookupError::Ambiguous { ids, .. }) = &self {
            body["ids"] = serde_json::json!(ids);
        }
        (status, Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
}

/// Load the artifact directory once and build the router around it.
pub fn build_app(artifacts_dir: &str, config: RankConfig) -> Result<Router> {
    let (catalog, index) = load_artifacts(&ArtifactPaths::new(artifacts_dir))?;
    let recommender = Recommender::new(Arc::new(catalog), Arc::new(index))?.with_config(config);
    Ok(router(recommender))
}

pub fn router(recommender: Recommender) -> Router {
    let state = AppState { recommender: Arc::new(recommender) };

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
        .route("/recommend", get(recommend_get).post(recommend_post))
        .route("/recipe/:name", get(recipe_by_name))
        .route("/recipes/:id", get(recipe_by_id))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn run_recommend(state: &AppState, query: RawQuery) -> Result<Json<RecommendResponse>, ApiError> {
    let start = std::time::Instant::now();
    let results = state.recommender.recommend_raw(&query).map_err(|e| {
        tracing::debug!(error = %e, "rejected query");
        e
    })?;
    Ok(Json(RecommendResponse {
        query,
        took_s: start.elapsed().as_secs_f64(),
        total: results.len(),
        results,
    }))
}

pub async fn recommend_get(
    State(state): State<AppState>,
    Query(query): Query<RawQuery>,
) -> Result<Json<RecommendResponse>, ApiError> {
    run_recommend(&state, query)
}

pub async fn recommend_post(
    State(state): State<AppState>,
    Json(query): Json<RawQuery>,
) -> Result<Json<RecommendResponse>, ApiError> {
    run_recommend(&state, query)
}

pub async fn recipe_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = state.recommender.catalog().find_by_name(&name)?;
    Ok(Json(recipe.into()))
}

pub async fn recipe_by_id(
    State(state): State<AppState>,
    Path(id): Path<usize>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = state.recommender.catalog().get(id)?;
    Ok(Json(recipe.into()))
}
