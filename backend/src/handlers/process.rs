//! Process and production action HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::process::{CreateActionInput, CreateProcessInput, ProcessService};
use crate::AppState;

/// List all processes for the current winery
pub async fn list_processes(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service.list_processes(current_user.0.user_id).await {
        Ok(processes) => (
            StatusCode::OK,
            Json(serde_json::json!({ "processes": processes })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific process
pub async fn get_process(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(process_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service.get_process(current_user.0.user_id, process_id).await {
        Ok(process) => (StatusCode::OK, Json(process)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new process
pub async fn create_process(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProcessInput>,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service.create_process(current_user.0.user_id, input).await {
        Ok(process) => (StatusCode::CREATED, Json(process)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a process, unassigning its actions first
pub async fn delete_process(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(process_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service.delete_process(current_user.0.user_id, process_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create an action on a tank
pub async fn create_action(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateActionInput>,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service.create_action(current_user.0.user_id, input).await {
        Ok(action) => (StatusCode::CREATED, Json(action)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific action
pub async fn get_action(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(action_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service.get_action(current_user.0.user_id, action_id).await {
        Ok(action) => (StatusCode::OK, Json(action)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List actions recorded on a tank
pub async fn list_tank_actions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service
        .list_actions_for_tank(current_user.0.user_id, tank_id)
        .await
    {
        Ok(actions) => {
            (StatusCode::OK, Json(serde_json::json!({ "actions": actions }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// List an action's consumable lines
pub async fn list_action_consumables(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(action_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service.list_consumables(current_user.0.user_id, action_id).await {
        Ok(consumables) => (
            StatusCode::OK,
            Json(serde_json::json!({ "consumables": consumables })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Assign an action to a process, scaling its consumables to the tank
/// volume and booking stock consumption
pub async fn assign_action_to_process(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((action_id, process_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service
        .assign_action_to_process(current_user.0.user_id, action_id, process_id)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Unassign an action from its process, restoring original consumable
/// quantities
pub async fn unassign_action(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(action_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProcessService::new(state.db.clone());

    match service.unassign_action(current_user.0.user_id, action_id).await {
        Ok(action) => (StatusCode::OK, Json(action)).into_response(),
        Err(e) => e.into_response(),
    }
}
