//! Axum route handlers for the Job API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::job::{Job, JobPatch, JobStatus, NewJob};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/jobs`. Fields are optional here so a missing one is a
/// 400 from validation rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub application_link: Option<String>,
    pub status: Option<String>,
}

/// Body of `PUT /api/jobs/:id`. Unknown keys (including `id` and `createdAt`) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub application_link: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteJobResponse {
    pub message: String,
}

impl CreateJobRequest {
    pub fn validate(self) -> Result<NewJob, AppError> {
        let (Some(title), Some(company), Some(application_link), Some(status)) = (
            non_blank(self.title),
            non_blank(self.company),
            non_blank(self.application_link),
            non_blank(self.status),
        ) else {
            return Err(AppError::Validation(
                "Missing required fields: title, company, applicationLink and status are required"
                    .to_string(),
            ));
        };

        Ok(NewJob {
            title,
            company,
            application_link: parse_link(application_link)?,
            status: parse_status(&status)?,
        })
    }
}

impl UpdateJobRequest {
    pub fn validate(self) -> Result<JobPatch, AppError> {
        Ok(JobPatch {
            title: supplied("title", self.title)?,
            company: supplied("company", self.company)?,
            application_link: supplied("applicationLink", self.application_link)?
                .map(parse_link)
                .transpose()?,
            status: supplied("status", self.status)?
                .map(|s| parse_status(&s))
                .transpose()?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A field that was supplied in a patch must not be blank.
fn supplied(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => non_blank(Some(v))
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("{field} cannot be empty"))),
    }
}

/// Only absolute http(s) links are stored; the UI renders them as anchors.
fn parse_link(raw: String) -> Result<String, AppError> {
    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(raw),
        _ => Err(AppError::Validation(format!(
            "applicationLink must be an http or https URL (got '{raw}')"
        ))),
    }
}

fn parse_status(raw: &str) -> Result<JobStatus, AppError> {
    raw.parse::<JobStatus>().map_err(AppError::Validation)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.jobs.list().await?))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let Json(request) = payload?;
    let new_job = request.validate()?;
    let job = state.jobs.create(new_job).await?;
    tracing::info!("Job {} created ({})", job.id, job.status);
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/jobs/:id
///
/// Merges the supplied fields; everything else is left as it was.
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateJobRequest>, JsonRejection>,
) -> Result<Json<Job>, AppError> {
    let Json(request) = payload?;
    let patch = request.validate()?;
    let job = state
        .jobs
        .update(&id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteJobResponse>, AppError> {
    if !state.jobs.delete(&id).await? {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    tracing::info!("Job {id} deleted");
    Ok(Json(DeleteJobResponse {
        message: "Job deleted successfully".to_string(),
    }))
}
