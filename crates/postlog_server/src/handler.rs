//! HTTP handlers and routing.

use crate::error::{ServerError, ServerResult};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use postlog_sync_engine::{
    BlogGateway, ClearRequest, Clock, CollectRequest, SyncEngine, SyncResult,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared state of the router.
pub struct AppState<G: BlogGateway, C: Clock> {
    engine: Arc<SyncEngine<G, C>>,
    collect: CollectRequest,
    clear: ClearRequest,
}

impl<G: BlogGateway, C: Clock> AppState<G, C> {
    /// Creates state that answers every call with the given requests.
    pub fn new(engine: Arc<SyncEngine<G, C>>, collect: CollectRequest, clear: ClearRequest) -> Self {
        Self {
            engine,
            collect,
            clear,
        }
    }

    /// Returns the engine.
    pub fn engine(&self) -> &SyncEngine<G, C> {
        &self.engine
    }
}

impl<G: BlogGateway, C: Clock> Clone for AppState<G, C> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            collect: self.collect.clone(),
            clear: self.clear.clone(),
        }
    }
}

/// Builds the router.
///
/// - `POST /collect` runs a collect and answers `OK`
/// - `POST /clear` resets the storage post and answers `OK`
/// - `GET /health` reports the engine state as JSON
///
/// Failed runs answer 500 with the error message as body.
pub fn router<G, C>(state: AppState<G, C>) -> Router
where
    G: BlogGateway + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/collect", post(collect::<G, C>))
        .route("/clear", post(clear::<G, C>))
        .route("/health", get(health::<G, C>))
        .with_state(state)
}

async fn collect<G, C>(State(state): State<AppState<G, C>>) -> ServerResult<&'static str>
where
    G: BlogGateway + 'static,
    C: Clock + 'static,
{
    let engine = Arc::clone(&state.engine);
    let request = state.collect.clone();
    let log = run_blocking(move || engine.collect(&request)).await?;
    info!(days = log.len(), posts = log.total_posts(), "collect finished");
    Ok("OK")
}

async fn clear<G, C>(State(state): State<AppState<G, C>>) -> ServerResult<&'static str>
where
    G: BlogGateway + 'static,
    C: Clock + 'static,
{
    let engine = Arc::clone(&state.engine);
    let request = state.clear.clone();
    run_blocking(move || engine.clear(&request)).await?;
    info!("clear finished");
    Ok("OK")
}

async fn health<G, C>(State(state): State<AppState<G, C>>) -> Json<Value>
where
    G: BlogGateway + 'static,
    C: Clock + 'static,
{
    let engine = state.engine();
    let stats = engine.stats();
    let response = json!({
        "status": "ok",
        "state": format!("{:?}", engine.state()).to_lowercase(),
        "runs_completed": stats.runs_completed,
        "last_run_at": stats.last_run_at.map(|at| at.to_string()),
        "last_error": stats.last_error,
    });
    debug!(?response, "health check");
    Json(response)
}

/// Runs an engine call on the blocking pool.
async fn run_blocking<T, F>(job: F) -> ServerResult<T>
where
    F: FnOnce() -> SyncResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ServerError::Worker(e.to_string()))?
        .map_err(ServerError::from)
}
