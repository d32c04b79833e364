use std::path::Path;

use axum::{
    extract::{Path as UrlPath, Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::jobs::{Job, JobState, JobStore};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) jobs: JobStore,
    pub(crate) queue: mpsc::Sender<Job>,
}

/// Request id for the current request, echoed as `x-request-id`.
#[derive(Debug, Clone)]
pub(crate) struct RequestId(pub(crate) String);

#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T: Serialize> {
    pub(crate) data: T,
    pub(crate) meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseMeta {
    pub(crate) request_id: String,
    pub(crate) timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiError {
    pub(crate) error: ErrorBody,
    pub(crate) meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) code: String,
    pub(crate) message: String,
}

impl ApiError {
    pub(crate) fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "queue_full" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest {
    #[serde(default)]
    store_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeAccepted {
    job_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    job_id: String,
    store_id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub(crate) fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/scrape", post(submit_scrape))
        .route("/api/status/{job_id}", get(job_status))
        .route("/api/download/{job_id}", get(download))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

/// Reuses an incoming `x-request-id` or mints one, and echoes it back.
async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

async fn submit_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ScrapeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store_id = body.store_id.trim();
    if store_id.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "storeId is required",
        ));
    }

    let job = state.jobs.submit(store_id).await;
    let job_id = job.id.clone();
    if let Err(err) = state.queue.try_send(job) {
        let (code, message) = match err {
            TrySendError::Full(_) => ("queue_full", "too many queued jobs; try again later"),
            TrySendError::Closed(_) => ("internal_error", "job worker is not running"),
        };
        tracing::warn!(job_id = %job_id, code, "store job not queued");
        state.jobs.fail(&job_id, message.to_owned()).await;
        return Err(ApiError::new(req_id.0, code, message));
    }

    tracing::info!(job_id = %job_id, store_id, "store job queued");
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: ScrapeAccepted { job_id },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

async fn job_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    UrlPath(job_id): UrlPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(entry) = state.jobs.get(&job_id).await else {
        return Err(ApiError::new(req_id.0, "not_found", "unknown job"));
    };

    let (status, file_name, error) = match entry.state {
        JobState::Processing => ("processing", None, None),
        JobState::Complete { path } => ("complete", file_name(&path), None),
        JobState::Failed { message } => ("error", None, Some(message)),
    };

    Ok(Json(ApiResponse {
        data: JobStatus {
            job_id,
            store_id: entry.store_id,
            status,
            file_name,
            error,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

async fn download(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    UrlPath(job_id): UrlPath<String>,
) -> Result<Response, ApiError> {
    let path = match state.jobs.get(&job_id).await.map(|e| e.state) {
        Some(JobState::Complete { path }) => path,
        _ => return Err(ApiError::new(req_id.0, "not_found", "file not found")),
    };

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(job_id = %job_id, path = %path.display(), error = %e, "job output unreadable");
        ApiError::new(req_id.0.clone(), "internal_error", "job output unreadable")
    })?;

    let name = file_name(&path).unwrap_or_else(|| format!("{job_id}.out"));
    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => "text/csv",
        Some("xlsx") => XLSX_CONTENT_TYPE,
        _ => "application/octet-stream",
    };
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
}
