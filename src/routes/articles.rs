//! # 기사(Article) 라우트 핸들러
//!
//! 저장된 기사의 목록/상세/수정/삭제와 관련 기사 조회를 처리합니다.
//! 새 기사 등록은 위저드(`routes::registrations`)를 거칩니다.
//!
//! ## 엔드포인트
//! - `GET    /api/v1/users/{user_id}/articles`                      → 필터/정렬/페이지 목록
//! - `GET    /api/v1/users/{user_id}/articles/{article_id}`         → 기사 상세
//! - `PATCH  /api/v1/users/{user_id}/articles/{article_id}`         → 기사 수정 (url 제외)
//! - `DELETE /api/v1/users/{user_id}/articles/{article_id}`         → 기사 삭제
//! - `GET    /api/v1/users/{user_id}/articles/{article_id}/related` → 태그를 공유하는 기사
//!
//! 모든 핸들러는 `AuthUser::require_owner`로 경로의 사용자와 세션 사용자를 비교합니다.

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    services::{
        article_list::{self, ArticlePage, ListOptions, RELATED_LIMIT},
        drafts::DraftRegistry,
        headings::HeadingExtractor,
        summary::SummaryGenerator,
    },
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::{sync::Arc, time::Duration};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 외부 협력자는 트레이트 객체로 들고 있어 설정에 따라 구현을 바꿔 끼웁니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// 세션 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 게이트웨이와 공유하는 비밀키
    pub identity_secret: String,
    pub session_max_age: Duration,
    pub extractor: Arc<dyn HeadingExtractor>,
    pub summarizer: Arc<dyn SummaryGenerator>,
    pub drafts: Arc<DraftRegistry>,
    /// 견출 추출/요약 생성 호출의 시간 제한
    pub external_timeout: Duration,
}

/// `GET /users/{user_id}/articles?tags=a,b&sort=title&page=1&page_size=9`
///
/// `page_size`를 생략하면 사용자 설정의 `items_per_page`를 씁니다.
pub async fn list_articles(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<ArticlePage>, AppError> {
    auth.require_owner(&user_id)?;

    let page_size = match query.page_size {
        Some(size) => size,
        None => db::get_settings(&state.pool, &user_id).await?.items_per_page as usize,
    };
    if !(1..=MAX_ITEMS_PER_PAGE as usize).contains(&page_size) {
        return Err(AppError::Validation(format!(
            "page_size must be between 1 and {MAX_ITEMS_PER_PAGE}"
        )));
    }

    let options = ListOptions {
        selected_tag_ids: query.tag_ids(),
        sort: query.sort.unwrap_or_default(),
        page: query.page.unwrap_or(1),
        page_size,
    };

    let articles = db::list_articles(&state.pool, &user_id).await?;
    Ok(Json(article_list::list_articles(&articles, &options)))
}

pub async fn get_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, article_id)): Path<(String, String)>,
) -> Result<Json<Article>, AppError> {
    auth.require_owner(&user_id)?;
    let article = db::get_article(&state.pool, &user_id, &article_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(article))
}

/// `GET .../articles/{article_id}/related` → `{ "articles": [...] }` (최대 3건)
pub async fn related_articles(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, article_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    auth.require_owner(&user_id)?;

    let articles = db::list_articles(&state.pool, &user_id).await?;
    let article = articles
        .iter()
        .find(|a| a.id == article_id)
        .ok_or(AppError::NotFound)?;
    let related = article_list::related_articles(&articles, article, RELATED_LIMIT);
    Ok(Json(json!({ "articles": related })))
}

/// `PATCH .../articles/{article_id}` + `{ "title"?, "summary"?, "comment"?, "is_favorite"?, "tag_ids"? }`
pub async fn update_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, article_id)): Path<(String, String)>,
    Json(req): Json<UpdateArticleRequest>,
) -> Result<Json<Article>, AppError> {
    auth.require_owner(&user_id)?;
    let article = db::update_article(&state.pool, &user_id, &article_id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(article))
}

/// 삭제 후 목록은 첫 페이지로 돌아가도록 `"page": 1`을 함께 돌려줍니다.
pub async fn delete_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, article_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    auth.require_owner(&user_id)?;
    if !db::delete_article(&state.pool, &user_id, &article_id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(article_id = %article_id, "article deleted");
    Ok(Json(json!({ "deleted": article_id, "page": 1 })))
}
