//! Plot-to-tank blending HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::blending::{AssignPlotInput, BlendingService, RemoveWineInput};
use crate::AppState;

/// Assign a plot's harvest volume into a tank
pub async fn assign_plot_to_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
    Json(input): Json<AssignPlotInput>,
) -> impl IntoResponse {
    let service = BlendingService::new(state.db.clone(), &state.config);

    match service
        .assign_plot_to_tank(current_user.0.user_id, tank_id, input)
        .await
    {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove wine from a tank, reducing its composition proportionally
pub async fn remove_wine_from_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
    Json(input): Json<RemoveWineInput>,
) -> impl IntoResponse {
    let service = BlendingService::new(state.db.clone(), &state.config);

    match service.remove_wine(current_user.0.user_id, tank_id, input).await {
        Ok(composition) => (
            StatusCode::OK,
            Json(serde_json::json!({ "composition": composition })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Current grape composition of a tank
pub async fn get_tank_composition(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BlendingService::new(state.db.clone(), &state.config);

    match service.get_composition(current_user.0.user_id, tank_id).await {
        Ok(composition) => (
            StatusCode::OK,
            Json(serde_json::json!({ "composition": composition })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
