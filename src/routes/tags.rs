//! # 태그 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/users/{user_id}/tags | `list_tags` | 태그 목록 (사용 기사 수 포함) |
//! | POST | /api/v1/users/{user_id}/tags | `create_tag` | 새 태그 생성 |
//! | PATCH | /api/v1/users/{user_id}/tags/{tag_id} | `update_tag` | 이름/설명 수정 |
//! | DELETE | /api/v1/users/{user_id}/tags/{tag_id} | `delete_tag` | 삭제 (사용 중이면 409) |

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::articles::AppState,
    services::tag_repository::TagRepository,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /users/{user_id}/tags` → `{ "tags": [{ ..., "article_count": 2 }] }`
pub async fn list_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    auth.require_owner(&user_id)?;
    let repository = load_repository(&state, &user_id).await?;
    Ok(Json(json!({ "tags": repository.with_counts() })))
}

/// `POST /users/{user_id}/tags` + `{ "name": "...", "description"?, "color"? }` → 201
pub async fn create_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    auth.require_owner(&user_id)?;
    let tag = db::create_tag(&state.pool, &user_id, &req).await?;
    tracing::info!(tag_id = %tag.id, "tag created");
    Ok((StatusCode::CREATED, Json(tag)))
}

/// `PATCH /users/{user_id}/tags/{tag_id}` + `{ "name": "...", "description"? }`
pub async fn update_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, tag_id)): Path<(String, String)>,
    Json(req): Json<UpdateTagRequest>,
) -> Result<Json<Tag>, AppError> {
    auth.require_owner(&user_id)?;
    let tag = db::update_tag(&state.pool, &user_id, &tag_id, &req).await?;
    Ok(Json(tag))
}

/// 성공 시 204 No Content. 기사에서 쓰는 태그면 409 `tag_in_use` + `count`.
pub async fn delete_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, tag_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    auth.require_owner(&user_id)?;
    db::delete_tag(&state.pool, &user_id, &tag_id).await?;
    tracing::info!(tag_id = %tag_id, "tag deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// 사용자의 태그와 기사를 읽어 사용 수 계산용 저장소를 만듭니다.
pub(crate) async fn load_repository(
    state: &AppState,
    user_id: &str,
) -> Result<TagRepository, AppError> {
    let tags = db::list_tags(&state.pool, user_id).await?;
    let articles = db::list_articles(&state.pool, user_id).await?;
    Ok(TagRepository::new(tags, articles))
}
