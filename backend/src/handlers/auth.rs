//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppError;
use crate::services::auth::{AuthTokens, LoginInput, RefreshInput, RegisterInput};
use crate::services::AuthService;
use crate::AppState;

/// Register a new winery account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthTokens>), AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.register(input).await?;

    Ok((StatusCode::CREATED, Json(tokens)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.login(input).await?;

    Ok(Json(tokens))
}

/// Refresh access token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshInput>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh(input).await?;

    Ok(Json(tokens))
}
