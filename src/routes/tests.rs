//! 라우터 전체를 `oneshot`으로 호출하는 통합 테스트.
//! 메모리 DB와 지연 없는 고정 협력자를 씁니다.

use super::{app, articles::AppState};
use crate::{
    db,
    middleware::auth::create_session_token,
    models::*,
    services::{
        drafts::DraftRegistry,
        headings::CannedHeadingExtractor,
        summary::{CannedSummaryGenerator, CANNED_SUMMARY},
    },
};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

const JWT_SECRET: &str = "router-test-secret";
const IDENTITY_SECRET: &str = "gateway-shared-secret";

struct TestApp {
    router: Router,
    pool: SqlitePool,
    user_id: String,
    token: String,
}

impl TestApp {
    async fn new() -> Self {
        let pool = db::test_pool().await;
        let user = db::test_user(&pool, "alice").await;
        db::users::set_role(&pool, &user.id, ACTIVE_ROLE).await.unwrap();

        let state = AppState {
            pool: pool.clone(),
            jwt_secret: JWT_SECRET.to_string(),
            identity_secret: IDENTITY_SECRET.to_string(),
            session_max_age: Duration::from_secs(86400),
            extractor: Arc::new(CannedHeadingExtractor::new(Duration::ZERO)),
            summarizer: Arc::new(CannedSummaryGenerator::new(Duration::ZERO)),
            drafts: Arc::new(DraftRegistry::new(Duration::from_secs(3600))),
            external_timeout: Duration::from_secs(5),
        };
        let token = create_session_token(
            &user.id,
            ACTIVE_ROLE,
            JWT_SECRET,
            Duration::from_secs(86400),
        )
        .unwrap();

        Self {
            router: app(state),
            pool,
            user_id: user.id,
            token,
        }
    }

    fn user_path(&self, rest: &str) -> String {
        format!("/api/v1/users/{}{}", self.user_id, rest)
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, body, _) = self.call_as(Some(self.token.as_str()), method, uri, body).await;
        (status, body)
    }

    async fn call_as(
        &self,
        token: Option<&str>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value, HeaderMap) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json, headers)
    }

    async fn create_tag(&self, name: &str) -> String {
        let (status, body) = self
            .call(Method::POST, &self.user_path("/tags"), Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn insert_article(&self, title: &str, tag_ids: Vec<String>) -> Article {
        let article = NewArticle {
            title: title.to_string(),
            url: format!("https://zenn.dev/articles/{title}"),
            summary: String::new(),
            comment: String::new(),
            tag_ids,
            source_platform: SourcePlatform::Zenn,
            published_at: Utc::now(),
        };
        db::create_article(&self.pool, &self.user_id, article).await.unwrap()
    }
}

#[tokio::test]
async fn health_reports_ok_with_security_headers() {
    let app = TestApp::new().await;
    let (status, body, headers) = app.call_as(None, Method::GET, "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-dns-prefetch-control"], "on");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert_eq!(
        headers["permissions-policy"],
        "camera=(), microphone=(), geolocation=(), browsing-topics=()"
    );
}

#[tokio::test]
async fn session_requires_the_gateway_secret() {
    let app = TestApp::new().await;
    let body = json!({ "provider": "github", "provider_account_id": "99", "name": "bob" });

    let (status, error, _) = app
        .call_as(None, Method::POST, "/api/v1/auth/session", Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error"]["code"], "unauthorized");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/session")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-identity-secret", IDENTITY_SECRET)
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let session: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(session["user"]["name"], "bob");
    assert_eq!(session["user"]["role"], 0);

    // 새 사용자는 역할이 없어 자기 리소스에도 접근할 수 없습니다.
    let token = session["access_token"].as_str().unwrap();
    let user_id = session["user"]["id"].as_str().unwrap();
    let (status, _, _) = app
        .call_as(Some(token), Method::GET, &format!("/api/v1/users/{user_id}/tags"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, me, _) = app.call_as(Some(token), Method::GET, "/api/v1/auth/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id);
}

#[tokio::test]
async fn missing_token_and_foreign_paths_are_rejected() {
    let app = TestApp::new().await;

    let (status, body, _) = app
        .call_as(None, Method::GET, &app.user_path("/articles"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "missing_token");

    let (status, body) = app
        .call(Method::GET, "/api/v1/users/someone-else/articles", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn tag_lifecycle_with_delete_guard() {
    let app = TestApp::new().await;
    let used = app.create_tag("Rust").await;
    let unused = app.create_tag("Go").await;
    app.insert_article("a", vec![used.clone()]).await;

    let (status, body) = app
        .call(Method::POST, &app.user_path("/tags"), Some(json!({ "name": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");

    let (_, body) = app.call(Method::GET, &app.user_path("/tags"), None).await;
    let mut counts: Vec<(String, i64)> = body["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| (t["name"].as_str().unwrap().to_string(), t["article_count"].as_i64().unwrap()))
        .collect();
    counts.sort();
    assert_eq!(counts, vec![("Go".to_string(), 0), ("Rust".to_string(), 1)]);

    let (status, body) = app
        .call(Method::DELETE, &app.user_path(&format!("/tags/{used}")), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "tag_in_use");
    assert_eq!(body["error"]["count"], 1);

    let (status, body) = app
        .call(
            Method::PATCH,
            &app.user_path(&format!("/tags/{unused}")),
            Some(json!({ "name": "Golang", "description": "言語" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Golang");

    let (status, _) = app
        .call(Method::DELETE, &app.user_path(&format!("/tags/{unused}")), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn article_list_uses_settings_page_size_and_filters() {
    let app = TestApp::new().await;
    let rust = app.create_tag("Rust").await;
    for title in ["one", "two", "three"] {
        app.insert_article(title, vec![rust.clone()]).await;
    }
    app.insert_article("untagged", vec![]).await;

    let (status, _) = app
        .call(Method::PUT, &app.user_path("/settings"), Some(json!({ "items_per_page": 2 })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::GET, &app.user_path(&format!("/articles?tags={rust}&sort=oldest")), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["page_size"], 2);
    let titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["one", "two"]);

    let (_, body) = app
        .call(Method::GET, &app.user_path("/articles?page=9"), None)
        .await;
    assert!(body["items"].as_array().unwrap().is_empty());

    let (status, _) = app
        .call(Method::GET, &app.user_path("/articles?page_size=0"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn article_edit_delete_and_related() {
    let app = TestApp::new().await;
    let rust = app.create_tag("Rust").await;
    let first = app.insert_article("first", vec![rust.clone()]).await;
    let second = app.insert_article("second", vec![rust.clone()]).await;
    app.insert_article("other", vec![]).await;

    let (_, body) = app
        .call(Method::GET, &app.user_path(&format!("/articles/{}/related", first.id)), None)
        .await;
    let related: Vec<&str> = body["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(related, vec![second.id.as_str()]);

    let (status, body) = app
        .call(
            Method::PATCH,
            &app.user_path(&format!("/articles/{}", first.id)),
            Some(json!({ "url": "https://example.com/moved" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");

    let (status, body) = app
        .call(
            Method::PATCH,
            &app.user_path(&format!("/articles/{}", first.id)),
            Some(json!({ "is_favorite": true, "comment": "再読" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_favorite"], true);
    assert_eq!(body["comment"], "再読");

    let (status, body) = app
        .call(Method::DELETE, &app.user_path(&format!("/articles/{}", first.id)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);

    let (status, _) = app
        .call(Method::GET, &app.user_path(&format!("/articles/{}", first.id)), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registration_wizard_end_to_end() {
    let app = TestApp::new().await;
    let rust = app.create_tag("Rust").await;
    let web = app.create_tag("Web").await;

    let (status, body) = app.call(Method::POST, &app.user_path("/registrations"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["draft"]["step"], "url");
    assert_eq!(body["draft"]["step_index"], 0);
    let draft = app.user_path(&format!(
        "/registrations/{}",
        body["draft"]["id"].as_str().unwrap()
    ));

    // 빈 URL은 url 단계에 머뭅니다.
    let (status, _) = app.call(Method::POST, &format!("{draft}/next"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.call(Method::PATCH, &draft, Some(json!({ "url": "https://zenn.dev/foo" })))
        .await;
    let (status, body) = app.call(Method::POST, &format!("{draft}/next"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draft"]["step"], "headings");
    assert_eq!(body["draft"]["headings"].as_array().unwrap().len(), 6);

    // 제안된 선택(1,3,5,6)에서 5,6을 빼고 2,4를 더해 네 개를 고릅니다.
    for id in ["5", "6", "2", "4"] {
        let (status, _) = app
            .call(Method::POST, &format!("{draft}/headings/{id}/toggle"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = app.call(Method::POST, &format!("{draft}/next"), None).await;
    assert_eq!(body["draft"]["step"], "tags-comment");
    assert!(body["advisory"].is_null());

    let (status, _) = app
        .call(Method::POST, &format!("{draft}/tags/not-a-tag/toggle"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    for tag in [&rust, &web] {
        app.call(Method::POST, &format!("{draft}/tags/{tag}/toggle"), None)
            .await;
    }
    app.call(Method::PATCH, &draft, Some(json!({ "comment": "あとで読む" })))
        .await;

    let (_, body) = app.call(Method::POST, &format!("{draft}/next"), None).await;
    assert_eq!(body["draft"]["step"], "summary");
    assert_eq!(body["draft"]["summary"], CANNED_SUMMARY);

    let (_, body) = app.call(Method::POST, &format!("{draft}/regenerate"), None).await;
    assert_eq!(body["draft"]["summary_retry_count"], 1);
    assert_eq!(body["draft"]["remaining_regenerations"], 2);

    let (_, body) = app.call(Method::POST, &format!("{draft}/next"), None).await;
    assert_eq!(body["draft"]["step"], "confirm");
    assert_eq!(body["draft"]["progress"], 100.0);

    let (status, article) = app.call(Method::POST, &format!("{draft}/save"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(article["url"], "https://zenn.dev/foo");
    assert_eq!(article["title"], "はじめに");
    assert_eq!(article["comment"], "あとで読む");
    assert_eq!(article["source_platform"], "zenn");
    assert_eq!(article["tags"].as_array().unwrap().len(), 2);

    let (status, _) = app.call(Method::GET, &draft, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.call(Method::GET, &app.user_path("/articles"), None).await;
    assert_eq!(body["total_count"], 1);
}

/// url만 채운 드래프트를 확인 단계까지 진행시키고 드래프트 경로를 돌려줍니다.
async fn draft_at_confirm(app: &TestApp) -> String {
    let (_, body) = app.call(Method::POST, &app.user_path("/registrations"), None).await;
    let draft = app.user_path(&format!(
        "/registrations/{}",
        body["draft"]["id"].as_str().unwrap()
    ));
    app.call(Method::PATCH, &draft, Some(json!({ "url": "https://zenn.dev/once" })))
        .await;
    for _ in 0..4 {
        let (status, _) = app.call(Method::POST, &format!("{draft}/next"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    draft
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_saves_store_a_single_article() {
    let app = TestApp::new().await;
    let save = format!("{}/save", draft_at_confirm(&app).await);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let router = app.router.clone();
            let request = Request::builder()
                .method(Method::POST)
                .uri(&save)
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .body(Body::empty())
                .unwrap();
            tokio::spawn(async move { router.oneshot(request).await.unwrap().status() })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1,
        "statuses: {statuses:?}"
    );
    assert!(statuses
        .iter()
        .all(|s| matches!(*s, StatusCode::CREATED | StatusCode::CONFLICT | StatusCode::NOT_FOUND)));

    let (_, body) = app.call(Method::GET, &app.user_path("/articles"), None).await;
    assert_eq!(body["total_count"], 1);
}

#[tokio::test]
async fn regeneration_limit_and_back_navigation() {
    let app = TestApp::new().await;
    let (_, body) = app.call(Method::POST, &app.user_path("/registrations"), None).await;
    let draft = app.user_path(&format!(
        "/registrations/{}",
        body["draft"]["id"].as_str().unwrap()
    ));

    let (status, _) = app.call(Method::POST, &format!("{draft}/back"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.call(Method::PATCH, &draft, Some(json!({ "url": "https://qiita.com/x/items/1" })))
        .await;
    for _ in 0..3 {
        app.call(Method::POST, &format!("{draft}/next"), None).await;
    }

    for _ in 0..3 {
        let (status, _) = app.call(Method::POST, &format!("{draft}/regenerate"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = app.call(Method::POST, &format!("{draft}/regenerate"), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "retry_limit_exceeded");

    let (_, body) = app.call(Method::POST, &format!("{draft}/back"), None).await;
    assert_eq!(body["draft"]["step"], "tags-comment");
    assert_eq!(body["draft"]["summary"], CANNED_SUMMARY);
    assert_eq!(body["draft"]["summary_retry_count"], 3);

    let (status, _) = app.call(Method::DELETE, &draft, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::POST, &format!("{draft}/next"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn auto_summary_setting_controls_generation() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(Method::PUT, &app.user_path("/settings"), Some(json!({ "auto_summary": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["auto_summary"], false);
    assert_eq!(body["notifications"], false);

    let (_, body) = app.call(Method::POST, &app.user_path("/registrations"), None).await;
    let draft = app.user_path(&format!(
        "/registrations/{}",
        body["draft"]["id"].as_str().unwrap()
    ));
    app.call(Method::PATCH, &draft, Some(json!({ "url": "https://zenn.dev/manual" })))
        .await;
    for _ in 0..2 {
        let (status, _) = app.call(Method::POST, &format!("{draft}/next"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = app.call(Method::POST, &format!("{draft}/next"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draft"]["step"], "summary");
    assert_eq!(body["draft"]["summary"], "");
}

#[tokio::test]
async fn export_contains_tags_and_articles() {
    let app = TestApp::new().await;
    let rust = app.create_tag("Rust").await;
    app.insert_article("exported", vec![rust]).await;

    let (status, body) = app.call(Method::GET, &app.user_path("/export"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"][0]["article_count"], 1);
    assert_eq!(body["articles"][0]["title"], "exported");
    assert!(body["exported_at"].is_string());
}

#[tokio::test]
async fn export_then_delete_all_then_import_restores_the_shelf() {
    let app = TestApp::new().await;
    let rust = app.create_tag("Rust").await;
    app.create_tag("Unused").await;
    app.insert_article("first", vec![rust.clone()]).await;
    app.insert_article("second", vec![]).await;

    let (_, exported) = app.call(Method::GET, &app.user_path("/export"), None).await;

    let (status, body) = app.call(Method::DELETE, &app.user_path("/data"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    let (_, body) = app.call(Method::GET, &app.user_path("/articles"), None).await;
    assert_eq!(body["total_count"], 2);

    let (status, body) = app
        .call(Method::DELETE, &app.user_path("/data?confirm=true"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_articles"], 2);
    assert_eq!(body["deleted_tags"], 2);
    let (_, body) = app.call(Method::GET, &app.user_path("/tags"), None).await;
    assert_eq!(body["tags"], json!([]));

    let (status, body) = app
        .call(Method::POST, &app.user_path("/import"), Some(exported.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported_tags"], 2);
    assert_eq!(body["imported_articles"], 2);
    assert_eq!(body["skipped_articles"], 0);

    // 같은 파일을 한 번 더 가져오면 모두 건너뜁니다.
    let (_, body) = app
        .call(Method::POST, &app.user_path("/import"), Some(exported))
        .await;
    assert_eq!(body["imported_tags"], 0);
    assert_eq!(body["imported_articles"], 0);
    assert_eq!(body["skipped_articles"], 2);

    let (_, body) = app.call(Method::GET, &app.user_path("/export"), None).await;
    let mut counts: Vec<(String, i64)> = body["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| {
            (
                t["name"].as_str().unwrap().to_string(),
                t["article_count"].as_i64().unwrap(),
            )
        })
        .collect();
    counts.sort();
    assert_eq!(counts, vec![("Rust".to_string(), 1), ("Unused".to_string(), 0)]);
}
