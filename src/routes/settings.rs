//! # 사용자 설정 / 내보내기 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/users/{user_id}/settings` → 화면 설정 (없으면 기본값)
//! - `PUT /api/v1/users/{user_id}/settings` → 설정 변경 (생략한 필드는 유지)
//! - `GET /api/v1/users/{user_id}/export`   → 태그와 기사 전체를 JSON으로 내보내기
//! - `POST /api/v1/users/{user_id}/import`  → 내보낸 JSON을 다시 가져오기
//! - `DELETE /api/v1/users/{user_id}/data?confirm=true` → 기사와 태그 전체 삭제

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::{articles::AppState, tags::load_repository},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

pub async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserSettings>, AppError> {
    auth.require_owner(&user_id)?;
    Ok(Json(db::get_settings(&state.pool, &user_id).await?))
}

pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<UserSettings>, AppError> {
    auth.require_owner(&user_id)?;
    let current = db::get_settings(&state.pool, &user_id).await?;
    let updated = req.apply_to(current)?;
    Ok(Json(db::upsert_settings(&state.pool, &user_id, &updated).await?))
}

/// `{ "exported_at": "...", "tags": [...], "articles": [...] }`
pub async fn export_data(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    auth.require_owner(&user_id)?;
    let repository = load_repository(&state, &user_id).await?;
    tracing::info!(
        user_id = %user_id,
        articles = repository.articles().len(),
        "exporting user data"
    );
    Ok(Json(json!({
        "exported_at": Utc::now(),
        "tags": repository.with_counts(),
        "articles": repository.articles(),
    })))
}

/// 내보내기 응답을 그대로 받습니다. 결과는 `ImportSummary`입니다.
pub async fn import_data(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Json(data): Json<ImportData>,
) -> Result<Json<ImportSummary>, AppError> {
    auth.require_owner(&user_id)?;
    Ok(Json(db::import_data(&state.pool, &user_id, &data).await?))
}

/// `confirm=true`가 없으면 400으로 거절합니다.
pub async fn delete_all_data(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Query(query): Query<DeleteAllQuery>,
) -> Result<Json<DeleteSummary>, AppError> {
    auth.require_owner(&user_id)?;
    query.require_confirmation()?;
    Ok(Json(db::delete_all_data(&state.pool, &user_id).await?))
}
