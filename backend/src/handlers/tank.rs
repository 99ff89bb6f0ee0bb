//! Tank management HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::tank::{CreateTankInput, TankService, UpdateTankInput};
use crate::AppState;
use shared::allocation::TankFillPolicy;

/// Query parameters for the tank availability search
#[derive(Deserialize)]
pub struct AvailableTanksQuery {
    pub volume_hl: Decimal,
    pub policy: Option<TankFillPolicy>,
}

/// List all tanks for the current winery
pub async fn list_tanks(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = TankService::new(state.db.clone());

    match service.list_tanks(current_user.0.user_id).await {
        Ok(tanks) => (StatusCode::OK, Json(serde_json::json!({ "tanks": tanks }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific tank
pub async fn get_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = TankService::new(state.db.clone());

    match service.get_tank(current_user.0.user_id, tank_id).await {
        Ok(tank) => (StatusCode::OK, Json(tank)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new tank
pub async fn create_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTankInput>,
) -> impl IntoResponse {
    let service = TankService::new(state.db.clone());

    match service.create_tank(current_user.0.user_id, input).await {
        Ok(tank) => (StatusCode::CREATED, Json(tank)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a tank
pub async fn update_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
    Json(input): Json<UpdateTankInput>,
) -> impl IntoResponse {
    let service = TankService::new(state.db.clone());

    match service.update_tank(current_user.0.user_id, tank_id, input).await {
        Ok(tank) => (StatusCode::OK, Json(tank)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a tank
pub async fn delete_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = TankService::new(state.db.clone());

    match service.delete_tank(current_user.0.user_id, tank_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Find unclaimed tanks able to hold the requested volume
pub async fn find_available_tanks(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<AvailableTanksQuery>,
) -> impl IntoResponse {
    let service = TankService::new(state.db.clone());
    let policy = query.policy.unwrap_or(TankFillPolicy::BestFit);

    match service
        .find_available(current_user.0.user_id, query.volume_hl, policy)
        .await
    {
        Ok(tanks) => (StatusCode::OK, Json(serde_json::json!({ "tanks": tanks }))).into_response(),
        Err(e) => e.into_response(),
    }
}
