use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use marquee_domain::events::SeatHeldEvent;
use marquee_domain::SeatKey;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateHoldRequest {
    pub seats: Vec<SeatKey>,
    /// Defaults to the configured checkout TTL.
    pub ttl_seconds: Option<i64>,
    /// Pass the hold id from an earlier response to renew instead of
    /// conflicting with yourself.
    pub hold_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HoldResponse {
    pub hold_id: String,
    pub seats: Vec<SeatKey>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ActiveLocksResponse {
    pub event_id: Uuid,
    pub seats: Vec<SeatKey>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events/{event_id}/holds", post(create_hold))
        .route("/v1/events/{event_id}/locks", get(list_locks))
        .route("/v1/events/{event_id}/stream", get(stream_seat_events))
        .route("/v1/holds/{hold_id}", delete(release_hold))
}

async fn create_hold(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateHoldRequest>,
) -> Result<(StatusCode, Json<HoldResponse>), AppError> {
    let ttl = req.ttl_seconds.unwrap_or(state.default_hold_ttl_seconds);

    let receipt = state
        .engine
        .request_hold(event_id, &req.seats, ttl, req.hold_id)
        .await
        .map_err(AppError::from_lock)?;

    // Best effort: viewers who miss a broadcast still see the hold in the
    // next locks read.
    let _ = state.sse_tx.send(SeatHeldEvent {
        event_id,
        seats: receipt.seats.clone(),
        hold_id: receipt.hold_id.clone(),
        held_at: Utc::now().timestamp(),
    });

    Ok((
        StatusCode::CREATED,
        Json(HoldResponse {
            hold_id: receipt.hold_id,
            seats: receipt.seats,
            expires_at: receipt.expires_at,
        }),
    ))
}

async fn list_locks(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ActiveLocksResponse>, AppError> {
    let seats = state
        .engine
        .list_active(event_id)
        .await
        .map_err(AppError::from_lock)?;
    Ok(Json(ActiveLocksResponse { event_id, seats }))
}

async fn release_hold(
    State(state): State<AppState>,
    Path(hold_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .engine
        .release(&hold_id)
        .await
        .map_err(AppError::from_lock)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stream_seat_events(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(held) if held.event_id == event_id => {
                let data = serde_json::to_string(&held).unwrap_or_default();
                Some(Ok::<_, Infallible>(
                    Event::default().event("seat_held").data(data),
                ))
            }
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
