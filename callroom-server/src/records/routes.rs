use crate::records::{CallRecordStore, NewCall, ReviewRejected};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use callroom_core::{CallId, CallRecord, EndReport, Review};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedCall {
    id: CallId,
    #[serde(flatten)]
    record: CallRecord,
}

pub fn routes(store: CallRecordStore) -> Router {
    Router::new()
        .route("/calls", post(create_call))
        .route("/calls/{id}", get(get_call))
        .route("/calls/{id}/start", patch(start_call))
        .route("/calls/{id}/end", patch(end_call))
        .route("/calls/{id}/review", post(review_call))
        .with_state(store)
}

async fn create_call(
    State(store): State<CallRecordStore>,
    Json(new_call): Json<NewCall>,
) -> (StatusCode, Json<CreatedCall>) {
    let (id, record) = store.create(new_call);
    (StatusCode::CREATED, Json(CreatedCall { id, record }))
}

async fn get_call(
    State(store): State<CallRecordStore>,
    Path(id): Path<String>,
) -> Result<Json<CallRecord>, StatusCode> {
    store
        .get(&CallId(id))
        .map(|c| Json(c.record))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn start_call(
    State(store): State<CallRecordStore>,
    Path(id): Path<String>,
) -> Result<Json<CallRecord>, StatusCode> {
    let call_id = CallId(id);
    let record = store.mark_started(&call_id).ok_or(StatusCode::NOT_FOUND)?;
    info!("Call {} marked started", call_id);
    Ok(Json(record))
}

async fn end_call(
    State(store): State<CallRecordStore>,
    Path(id): Path<String>,
    Json(report): Json<EndReport>,
) -> Result<Json<EndReport>, StatusCode> {
    let call_id = CallId(id);
    let stored = store
        .mark_ended(&call_id, report)
        .ok_or(StatusCode::NOT_FOUND)?;
    info!(
        "Call {} ended: {}s, cost {}",
        call_id, stored.duration_secs, stored.cost
    );
    Ok(Json(stored))
}

async fn review_call(
    State(store): State<CallRecordStore>,
    Path(id): Path<String>,
    Json(review): Json<Review>,
) -> StatusCode {
    match store.add_review(&CallId(id), review) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(ReviewRejected::UnknownCall) => StatusCode::NOT_FOUND,
        Err(ReviewRejected::InvalidRating(rating)) => {
            warn!("Rejected review with rating {}", rating);
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}
