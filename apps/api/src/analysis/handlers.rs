//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::analysis::analyzer::{analyze_job_description, AnalysisResult};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub job_description: Option<String>,
}

/// POST /api/analyze
///
/// Always 200 once the description is present; upstream failures surface only
/// as `isReal: false`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = payload?;
    // Trimmed only for the blank check; the model sees the text as pasted.
    let job_description = request
        .job_description
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Job description is required".to_string()))?;

    let result = analyze_job_description(&job_description, &state.llm).await;
    tracing::info!(
        "Analysis complete (is_real: {}, skills: {})",
        result.is_real,
        result.recommended_skills.len()
    );
    Ok(Json(result))
}
