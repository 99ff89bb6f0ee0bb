//! Vineyard plot management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::plot::{CreatePlotInput, PlotService, UpdatePlotInput};
use crate::AppState;

/// List all plots for the current winery
pub async fn list_plots(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.list_plots(current_user.0.user_id).await {
        Ok(plots) => (StatusCode::OK, Json(serde_json::json!({ "plots": plots }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific plot
pub async fn get_plot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plot_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.get_plot(current_user.0.user_id, plot_id).await {
        Ok(plot) => (StatusCode::OK, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new plot
pub async fn create_plot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePlotInput>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.create_plot(current_user.0.user_id, input).await {
        Ok(plot) => (StatusCode::CREATED, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a plot
pub async fn update_plot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plot_id): Path<Uuid>,
    Json(input): Json<UpdatePlotInput>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.update_plot(current_user.0.user_id, plot_id, input).await {
        Ok(plot) => (StatusCode::OK, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a plot
pub async fn delete_plot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plot_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.delete_plot(current_user.0.user_id, plot_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Transfer history for a plot
pub async fn get_plot_transfers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plot_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.get_transfers(current_user.0.user_id, plot_id).await {
        Ok(transfers) => (
            StatusCode::OK,
            Json(serde_json::json!({ "transfers": transfers })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
