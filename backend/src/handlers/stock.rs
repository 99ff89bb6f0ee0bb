//! Stock management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::external::MailerClient;
use crate::middleware::CurrentUser;
use crate::services::stock::{CreateStockInput, StockService, UpdateStockInput};
use crate::AppState;

/// List all stock rows for the current winery
pub async fn list_stocks(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = StockService::new(state.db.clone());

    match service.list_stocks(current_user.0.user_id).await {
        Ok(stocks) => {
            (StatusCode::OK, Json(serde_json::json!({ "stocks": stocks }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// List stock rows currently flagged out of stock
pub async fn list_out_of_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = StockService::new(state.db.clone());

    match service.list_out_of_stock(current_user.0.user_id).await {
        Ok(stocks) => {
            (StatusCode::OK, Json(serde_json::json!({ "stocks": stocks }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a specific stock row
pub async fn get_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(stock_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = StockService::new(state.db.clone());

    match service.get_stock(current_user.0.user_id, stock_id).await {
        Ok(stock) => (StatusCode::OK, Json(stock)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new stock row
pub async fn create_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStockInput>,
) -> impl IntoResponse {
    let service = StockService::new(state.db.clone());

    match service.create_stock(current_user.0.user_id, input).await {
        Ok(stock) => (StatusCode::CREATED, Json(stock)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a stock row
pub async fn update_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(stock_id): Path<Uuid>,
    Json(input): Json<UpdateStockInput>,
) -> impl IntoResponse {
    let service = StockService::new(state.db.clone());

    match service.update_stock(current_user.0.user_id, stock_id, input).await {
        Ok(stock) => (StatusCode::OK, Json(stock)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a stock row
pub async fn delete_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(stock_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = StockService::new(state.db.clone());

    match service.delete_stock(current_user.0.user_id, stock_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Email a low-stock alert to the authenticated user
pub async fn send_low_stock_alert(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = StockService::new(state.db.clone());
    let mailer = MailerClient::new(&state.config.mailer);

    match service
        .send_low_stock_alert(current_user.0.user_id, &mailer, &current_user.0.email)
        .await
    {
        Ok(count) => (
            StatusCode::OK,
            Json(serde_json::json!({ "items_reported": count })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
