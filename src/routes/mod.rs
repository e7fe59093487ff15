//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 전체 라우터 구성(`app`)을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `articles`: 기사 목록/상세/수정/삭제, 공유 상태 `AppState`
//! - `auth`: 게이트웨이 세션 발급, 내 정보
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `registrations`: 기사 등록 위저드
//! - `settings`: 사용자 설정, 데이터 내보내기/가져오기/전체 삭제
//! - `tags`: 태그 CRUD

pub mod articles;
pub mod auth;
pub mod health;
pub mod registrations;
pub mod settings;
pub mod tags;

#[cfg(test)]
mod tests;

use articles::AppState;
use axum::{
    http::{header, HeaderName, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

/// `/api/v1` 아래의 모든 라우트와 공통 미들웨어를 묶은 라우터를 만듭니다.
pub fn app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/session", post(auth::create_session))
        .route("/auth/me", get(auth::me));

    // 사용자 소유 리소스: 모든 핸들러가 경로의 {user_id}를 세션과 비교합니다.
    let user_routes = Router::new()
        .route("/articles", get(articles::list_articles))
        .route(
            "/articles/{article_id}",
            get(articles::get_article)
                .patch(articles::update_article)
                .delete(articles::delete_article),
        )
        .route("/articles/{article_id}/related", get(articles::related_articles))
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/tags/{tag_id}",
            axum::routing::patch(tags::update_tag).delete(tags::delete_tag),
        )
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/export", get(settings::export_data))
        .route("/import", post(settings::import_data))
        .route("/data", axum::routing::delete(settings::delete_all_data))
        .route("/registrations", post(registrations::start_registration))
        .route(
            "/registrations/{draft_id}",
            get(registrations::get_registration)
                .patch(registrations::update_registration)
                .delete(registrations::abandon_registration),
        )
        .route("/registrations/{draft_id}/next", post(registrations::next_step))
        .route("/registrations/{draft_id}/back", post(registrations::previous_step))
        .route(
            "/registrations/{draft_id}/headings/{heading_id}/toggle",
            post(registrations::toggle_heading),
        )
        .route(
            "/registrations/{draft_id}/tags/{tag_id}/toggle",
            post(registrations::toggle_tag),
        )
        .route(
            "/registrations/{draft_id}/regenerate",
            post(registrations::regenerate_summary),
        )
        .route("/registrations/{draft_id}/save", post(registrations::save_registration));

    let api_routes = Router::new()
        .merge(auth_routes)
        .nest("/users/{user_id}", user_routes)
        .route("/health", get(health::health_check))
        .with_state(state);

    // 개발 환경 기준으로 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("on"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=(), browsing-topics=()"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
