//! Reporting HTTP handlers
//!
//! CSV exports are returned with a content-disposition so browsers download
//! them as files.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::middleware::CurrentUser;
use crate::services::ReportingService;
use crate::AppState;

fn csv_response(filename: &str, body: String) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
}

/// Export the winery's stock as CSV
pub async fn export_stock_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = ReportingService::new(state.db.clone());

    match service.export_stock_csv(current_user.0.user_id).await {
        Ok(csv) => csv_response("stock.csv", csv).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Export the winery's action history as CSV
pub async fn export_actions_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = ReportingService::new(state.db.clone());

    match service.export_actions_csv(current_user.0.user_id).await {
        Ok(csv) => csv_response("actions.csv", csv).into_response(),
        Err(e) => e.into_response(),
    }
}
