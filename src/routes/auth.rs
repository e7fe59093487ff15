use crate::{
    db::users as db_users,
    error::AppError,
    middleware::auth::{create_session_token, identity_secret_matches, AuthUser},
    models::user::*,
    routes::articles::AppState,
};
use axum::{extract::State, http::HeaderMap, Json};

pub const IDENTITY_SECRET_HEADER: &str = "x-identity-secret";

/// OAuth 게이트웨이가 로그인 직후 호출합니다.
/// 계정을 upsert하고 세션 토큰을 발급합니다. 역할 검사는 각 API에서 합니다.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let provided = headers
        .get(IDENTITY_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Identity secret is required".to_string()))?;
    if !identity_secret_matches(provided, &state.identity_secret) {
        tracing::warn!("session request with wrong identity secret");
        return Err(AppError::Unauthorized("Invalid identity secret".to_string()));
    }

    // Validate input
    if req.provider.trim().is_empty() || req.provider_account_id.trim().is_empty() {
        return Err(AppError::Validation(
            "provider and provider_account_id are required".to_string(),
        ));
    }

    let user = db_users::upsert_user(
        &state.pool,
        req.provider.trim(),
        req.provider_account_id.trim(),
        &req.profile,
    )
    .await?;

    let access_token =
        create_session_token(&user.id, user.role, &state.jwt_secret, state.session_max_age)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    tracing::info!(user_id = %user.id, provider = %user.provider, "session issued");
    Ok(Json(SessionResponse { user, access_token }))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user))
}
