use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_core::LockError;
use marquee_domain::{Conflict, ConflictKind};
use marquee_order::settlement::SettlementError;
use marquee_order::OrderError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    /// Sold and held are externally distinct outcomes: a held seat may free
    /// up, a sold one never will.
    ConflictError {
        kind: ConflictKind,
        conflicts: Vec<Conflict>,
    },
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn from_lock(err: LockError) -> Self {
        match err {
            LockError::Validation(msg) => AppError::ValidationError(msg),
            LockError::Conflict { kind, conflicts } => AppError::ConflictError { kind, conflicts },
            LockError::Store(e) => AppError::InternalServerError(e.to_string()),
        }
    }

    pub fn from_repo(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        AppError::InternalServerError(err.to_string())
    }

    pub fn from_settlement(err: SettlementError) -> Self {
        match err {
            SettlementError::Order(OrderError::NotFound(id)) => {
                AppError::NotFoundError(format!("Order not found: {id}"))
            }
            SettlementError::Order(e) => AppError::ValidationError(e.to_string()),
            SettlementError::Lock(e) => Self::from_lock(e),
            SettlementError::Repository(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            AppError::NotFoundError(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::ConflictError { kind, conflicts } => {
                let (status, reason) = match kind {
                    ConflictKind::Sold => (StatusCode::GONE, "SOLD"),
                    ConflictKind::Held => (StatusCode::CONFLICT, "HELD"),
                };
                let body = Json(json!({
                    "error": "requested seats are unavailable",
                    "reason": reason,
                    "conflicts": conflicts,
                }));
                (status, body).into_response()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
