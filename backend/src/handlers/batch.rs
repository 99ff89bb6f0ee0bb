//! Batch ("cuvée") management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::batch::{AssignTankInput, BatchService, CreateBatchInput, UpdateBatchInput};
use crate::AppState;

/// List all batches for the current winery
pub async fn list_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.list_batches(current_user.0.user_id).await {
        Ok(batches) => {
            (StatusCode::OK, Json(serde_json::json!({ "batches": batches }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a specific batch
pub async fn get_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.get_batch(current_user.0.user_id, batch_id).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new batch
pub async fn create_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateBatchInput>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.create_batch(current_user.0.user_id, input).await {
        Ok(batch) => (StatusCode::CREATED, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a batch
pub async fn update_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<UpdateBatchInput>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.update_batch(current_user.0.user_id, batch_id, input).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a batch, releasing its tank allocations
pub async fn delete_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.delete_batch(current_user.0.user_id, batch_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Allocation summary for a batch
pub async fn get_batch_allocation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.get_allocation(current_user.0.user_id, batch_id).await {
        Ok(allocation) => (StatusCode::OK, Json(allocation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Greedy placement suggestion for a batch's remaining volume
pub async fn suggest_batch_allocation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.suggest_allocation(current_user.0.user_id, batch_id).await {
        Ok(suggestion) => (StatusCode::OK, Json(suggestion)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Assign (or top up) a tank allocation for a batch
pub async fn assign_tank_to_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<AssignTankInput>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service.assign_tank(current_user.0.user_id, batch_id, input).await {
        Ok(allocation) => (StatusCode::OK, Json(allocation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Release a batch's allocation in a tank
pub async fn release_tank_from_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((batch_id, tank_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = BatchService::new(state.db.clone());

    match service
        .release_tank(current_user.0.user_id, batch_id, tank_id)
        .await
    {
        Ok(allocation) => (StatusCode::OK, Json(allocation)).into_response(),
        Err(e) => e.into_response(),
    }
}
