use axum::{
    Json,
    extract::{Path, State},
};

use crate::application::AppError;
use crate::domain::{UserBalance, UserId};

use super::{ApiResponse, AppState};

/// `GET /api/user-balance/{id}`
pub async fn get_user_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserBalance>>, AppError> {
    let user_id = parse_user_id(&id)?;
    let user = state.service.get_user_balance(user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// `PATCH /api/user-balance/{id}/disburse`
pub async fn disburse_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user_id = parse_user_id(&id)?;
    state.service.disburse_balance(user_id).await?;
    Ok(Json(ApiResponse::success()))
}

/// The path segment is taken as a string so a bad id gets the JSON error
/// envelope rather than axum's plain-text rejection.
fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidParameter(raw.to_string()))
}
