//! HTTP front end.
//!
//! - `GET /` - liveness message
//! - `GET /dataset` - every transaction
//! - `POST /dataset` - append a transaction (JSON array of strings)
//! - `DELETE /dataset` - remove every transaction
//! - `PUT /dataset/{index}` - replace a transaction
//! - `DELETE /dataset/{index}` - remove a transaction
//! - `POST /rules` - mine association rules (`{min_support?, min_confidence?}`)
//!
//! Every route answers cross-origin requests so a browser dashboard on
//! another origin can call it.

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::error::{ErrorCode, RuleError, classify};
use crate::models::request::RulesRequest;
use crate::models::response::{ErrorResponse, MessageResponse};
use crate::models::rule::Rule;
use crate::models::transaction::Transaction;
use crate::service::AppService;

type SharedService = Arc<AppService>;

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/", get(home))
        .route(
            "/dataset",
            get(list_dataset).post(add_transaction).delete(clear_dataset),
        )
        .route(
            "/dataset/{index}",
            put(update_transaction).delete(delete_transaction),
        )
        .route("/rules", post(generate_rules))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Bind `listen` and serve until Ctrl-C.
pub async fn serve(service: SharedService, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    eprintln!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error answered as `{"error", "code"}`. Client mistakes map to 400 with
/// their message; storage and engine failures map to 500 with a generic one.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: String,
}

impl ApiError {
    fn bad_request(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        let (code, message) = classify(&e);
        if code.is_client_error() {
            warn!(code = %code, message = %message, "request rejected");
            return Self::bad_request(code, message);
        }
        error!(code = %code, error = %e, "request failed");
        let message = match code {
            ErrorCode::StorageError => "Failed to persist dataset",
            ErrorCode::EngineError => "Failed to generate rules",
            _ => "Internal server error",
        };
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn home() -> Json<MessageResponse> {
    Json(MessageResponse::new("cooccur API is running"))
}

async fn list_dataset(State(service): State<SharedService>) -> Json<Vec<Transaction>> {
    Json(service.list())
}

async fn add_transaction(
    State(service): State<SharedService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let raw = parse_items(payload)?;
    let stored = service.add(&raw)?;
    Ok(Json(MessageResponse::with_data("Transaction added", stored)))
}

async fn update_transaction(
    State(service): State<SharedService>,
    Path(index): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let raw = parse_items(payload)?;
    let index = parse_index(&index)?;
    let stored = service.update(index, &raw)?;
    Ok(Json(MessageResponse::with_data("Transaction updated", stored)))
}

async fn delete_transaction(
    State(service): State<SharedService>,
    Path(index): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let index = parse_index(&index)?;
    service.delete(index)?;
    Ok(Json(MessageResponse::new("Transaction deleted")))
}

async fn clear_dataset(
    State(service): State<SharedService>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.clear()?;
    Ok(Json(MessageResponse::new("Dataset cleared")))
}

async fn generate_rules(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<Json<Vec<Rule>>, ApiError> {
    let request: RulesRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RulesRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            ApiError::bad_request(ErrorCode::InvalidRequest, format!("Invalid JSON body: {e}"))
        })?
    };
    let params = request.resolve(service.defaults());

    let rules = tokio::task::spawn_blocking(move || service.generate_rules(&params))
        .await
        .map_err(|e| {
            ApiError::from(anyhow::Error::from(RuleError::engine(format!(
                "Mining task failed: {e}"
            ))))
        })??;
    Ok(Json(rules))
}

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

fn parse_items(payload: Result<Json<Value>, JsonRejection>) -> Result<Vec<String>, ApiError> {
    const NOT_A_LIST: &str = "Body must be a JSON array of strings";

    let Json(value) = payload.map_err(|e| {
        ApiError::bad_request(
            ErrorCode::InvalidRequest,
            format!("Invalid JSON body: {}", e.body_text()),
        )
    })?;
    let Value::Array(values) = value else {
        return Err(ApiError::bad_request(ErrorCode::InvalidRequest, NOT_A_LIST));
    };
    values
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s),
            _ => Err(ApiError::bad_request(ErrorCode::InvalidRequest, NOT_A_LIST)),
        })
        .collect()
}

fn parse_index(raw: &str) -> Result<usize, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::bad_request(ErrorCode::InvalidIndex, format!("Invalid index: {raw}"))
    })
}
