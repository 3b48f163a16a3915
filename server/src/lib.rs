//! HTTP API for the cidgen activation gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use cidgen_activation::Activator;
use cidgen_store::{ActivationRecord, NewActivationRequest, RecordId, RecordPatch, RecordStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub activator: Arc<Activator>,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(activator: Activator, store: impl RecordStore + 'static) -> Self {
        Self {
            activator: Arc::new(activator),
            store: Arc::new(store),
        }
    }
}

/// Body of `POST /api/generate-cid`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCidRequest {
    pub installation_id: Option<String>,
    pub product_version: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCidResponse {
    pub success: bool,
    pub confirmation_id: String,
    pub processing_time: String,
    pub request_id: String,
}

/// One rejected request field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RecordResponse {
    pub success: bool,
    pub request: ActivationRecord,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatusResponse {
    pub message: String,
}

/// Formats an elapsed time as seconds with millisecond precision (`"1.234s"`).
#[must_use]
pub fn format_processing_time(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}

fn required(value: Option<String>, field: &str, details: &mut Vec<FieldError>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        Some(_) => {
            details.push(FieldError {
                field: field.to_string(),
                message: "must not be empty".to_string(),
            });
            String::new()
        }
        None => {
            details.push(FieldError {
                field: field.to_string(),
                message: "is required".to_string(),
            });
            String::new()
        }
    }
}

/// Checks the request body shape before anything is stored.
pub fn validate_request(
    payload: Result<Json<GenerateCidRequest>, JsonRejection>,
) -> Result<NewActivationRequest, Vec<FieldError>> {
    let Json(body) = payload.map_err(|rejection| {
        vec![FieldError {
            field: "body".to_string(),
            message: rejection.body_text(),
        }]
    })?;

    let mut details = Vec::new();
    let installation_id = required(body.installation_id, "installationId", &mut details);
    let product_version = required(body.product_version, "productVersion", &mut details);
    if !details.is_empty() {
        return Err(details);
    }

    Ok(NewActivationRequest {
        installation_id,
        product_version,
    })
}

async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "API online".to_string(),
    })
}

async fn generate_cid_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateCidRequest>, JsonRejection>,
) -> Response {
    let request = match validate_request(payload) {
        Ok(request) => request,
        Err(details) => {
            let body = ErrorResponse {
                details: Some(details),
                ..ErrorResponse::new("Validation failed")
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let started = Instant::now();
    let record = state.store.create(request.clone()).await;
    info!("Activation request {} for {}", record.id, request.product_version);

    let outcome = state
        .activator
        .generate_confirmation_id(&request.installation_id, &request.product_version)
        .await;
    let processing_time = format_processing_time(started.elapsed());

    match outcome {
        Ok(confirmation_id) => {
            let patch = RecordPatch::success(&confirmation_id, &processing_time);
            if state.store.update(record.id, patch).await.is_none() {
                warn!("Activation request {} vanished before update", record.id);
            }
            let body = GenerateCidResponse {
                success: true,
                confirmation_id,
                processing_time,
                request_id: record.id.to_string(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            let message = err.to_string();
            let patch = RecordPatch::failure(&message, &processing_time);
            if state.store.update(record.id, patch).await.is_none() {
                warn!("Activation request {} vanished before update", record.id);
            }
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
        }
    }
}

async fn activation_request_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let record = match RecordId::parse(&id) {
        Ok(id) => state.store.get(id).await,
        Err(_) => None,
    };

    match record {
        Some(request) => Json(RecordResponse {
            success: true,
            request,
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Activation request not found")),
        )
            .into_response(),
    }
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/api/generate-cid", post(generate_cid_handler))
        .route("/api/activation-request/{id}", get(activation_request_handler))
        .with_state(state)
}
