use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use seatlock_engine::{SeatCounts, SeatId, SeatStatus};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
struct HoldRequest {
    seat_id: u32,
    user_id: String,
    ttl_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ConfirmRequest {
    seat_id: u32,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseRequest {
    seat_id: u32,
}

#[derive(Debug, Serialize)]
struct SeatResponse {
    status: &'static str,
    seat_id: u32,
}

#[derive(Debug, Serialize)]
struct SeatEntry {
    seat_id: u32,
    status: SeatStatus,
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    counts: SeatCounts,
    backend: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hold", post(hold_seat))
        .route("/confirm", post(confirm_seat))
        .route("/release", post(release_seat))
        .route("/seats", get(list_seats))
        .route("/stats", get(seat_stats))
        .route("/health", get(health))
}

fn seat_in_range(state: &AppState, seat_id: u32) -> Result<SeatId, AppError> {
    let seat = SeatId(seat_id);
    match seat.index(state.engine.capacity()) {
        Some(_) => Ok(seat),
        None => Err(AppError::NotFoundError(format!("Unknown seat {}", seat_id))),
    }
}

fn require_user(user_id: &str) -> Result<(), AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::ValidationError("user_id must not be empty".to_string()));
    }
    Ok(())
}

async fn hold_seat(
    State(state): State<AppState>,
    Json(req): Json<HoldRequest>,
) -> Result<Json<SeatResponse>, AppError> {
    require_user(&req.user_id)?;
    let seat = seat_in_range(&state, req.seat_id)?;
    let ttl = match req.ttl_seconds {
        Some(0) => return Err(AppError::ValidationError("ttl_seconds must be positive".to_string())),
        Some(secs) => Duration::from_secs(secs),
        None => state.default_hold,
    };
    if ttl > state.engine.max_hold() {
        return Err(AppError::ValidationError(format!(
            "ttl_seconds must be at most {}",
            state.engine.max_hold().as_secs()
        )));
    }

    // New names are only registered once their hold succeeds.
    if !state.engine.hold_for(seat, &req.user_id, ttl)? {
        debug!(seat = req.seat_id, user = %req.user_id, "Hold refused");
        return Err(AppError::ConflictError("Seat taken".to_string()));
    }

    Ok(Json(SeatResponse { status: "held", seat_id: req.seat_id }))
}

async fn confirm_seat(
    State(state): State<AppState>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<SeatResponse>, AppError> {
    require_user(&req.user_id)?;
    let seat = seat_in_range(&state, req.seat_id)?;

    if !state.engine.confirm_for(seat, &req.user_id) {
        debug!(seat = req.seat_id, user = %req.user_id, "Confirm refused");
        return Err(AppError::ConflictError("Cannot confirm".to_string()));
    }

    Ok(Json(SeatResponse { status: "sold", seat_id: req.seat_id }))
}

async fn release_seat(
    State(state): State<AppState>,
    Json(req): Json<ReleaseRequest>,
) -> Result<Json<SeatResponse>, AppError> {
    let seat = seat_in_range(&state, req.seat_id)?;

    if !state.engine.release(seat) {
        return Err(AppError::ConflictError("Cannot release".to_string()));
    }

    Ok(Json(SeatResponse { status: "available", seat_id: req.seat_id }))
}

async fn list_seats(State(state): State<AppState>) -> Json<Vec<SeatEntry>> {
    let seats = state
        .engine
        .snapshot()
        .into_iter()
        .map(|view| SeatEntry {
            seat_id: view.id.0,
            status: view.status,
            user_id: view.owner.and_then(|owner| state.engine.caller_name(owner)),
        })
        .collect();

    Json(seats)
}

async fn seat_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        counts: state.engine.stats(),
        backend: state.engine.backend().as_str(),
    })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
