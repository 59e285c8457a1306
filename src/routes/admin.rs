use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{PipelinePhase, RunOutcome},
    routes::AppState,
    similarity::pipeline::LastRun,
};

/// Handler for the batch rebuild trigger
///
/// Runs one pipeline pass to completion and reports its outcome. A call
/// arriving while a run is active is rejected with 409 before any state
/// changes.
pub async fn rebuild(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<RunOutcome>> {
    tracing::info!(request_id = %request_id, "Batch rebuild requested");

    let outcome = state.runner.run().await?;

    tracing::info!(request_id = %request_id, outcome = ?outcome, "Batch rebuild finished");
    Ok(Json(outcome))
}

/// Handler for cooperative cancellation of the active run
pub async fn cancel(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    state.runner.request_cancel();
    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "cancellation_requested" })),
    )
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub phase: PipelinePhase,
    pub running: bool,
    pub last_run: Option<LastRun>,
}

/// Handler for pipeline status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        phase: state.runner.phase().await,
        running: state.runner.is_running(),
        last_run: state.runner.last_run().await,
    })
}
