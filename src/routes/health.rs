//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "database": "ok", "drafts": 0 }`
//!
//! DB에 `SELECT 1`을 보내 연결 풀까지 살아 있는지 확인합니다.
//! `drafts`는 진행 중인 등록 위저드 수입니다.
//! DB가 응답하지 않으면 503과 `"database": "unavailable"`을 돌려줍니다.

use crate::routes::articles::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "ok",
                "drafts": state.drafts.len(),
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "database": "unavailable",
                })),
            )
        }
    }
}
