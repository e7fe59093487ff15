//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 검증 실패, 태그 사용 중, 재생성 한도 초과,
//!   외부 서비스 실패 등 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 도메인 에러(Validation, TagInUse, RetryLimitExceeded, ExternalService)는 모두
//! 복구 가능한 에러입니다. 상태를 바꾸지 않고 사용자에게 알림으로 표시됩니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 필수 입력 누락, 잘못된 URL, 현재 단계에서 허용되지 않는 조작 (HTTP 400)
    #[error("{0}")]
    Validation(String),

    /// 기사에서 사용 중인 태그 삭제 시도 (HTTP 409)
    /// count: 이 태그를 참조하는 기사 수
    #[error("This tag is used by {count} article(s)")]
    TagInUse { count: i64 },

    /// 요약 재생성 한도 초과 (HTTP 429)
    #[error("Summary can be regenerated at most {limit} times")]
    RetryLimitExceeded { limit: u32 },

    /// 견출 추출, 요약 생성 등 외부 서비스 호출 실패 (HTTP 502)
    #[error("External service error: {0}")]
    ExternalService(String),

    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    /// 다른 사용자의 리소스에 접근한 경우에도 404로 응답합니다.
    #[error("Resource not found")]
    NotFound,

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 권한(role) 부족 (HTTP 403)
    #[error("Forbidden")]
    Forbidden,

    /// 리소스 충돌 (HTTP 409): 진행 중인 위저드 조작, 중복 태그 이름 등
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx::Error에 `?`를 쓰면 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// 에러 응답 본문의 `code` 필드 값
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::TagInUse { .. } => "tag_in_use",
            AppError::RetryLimitExceeded { .. } => "retry_limit_exceeded",
            AppError::ExternalService(_) => "external_service_error",
            AppError::NotFound => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Database(_) => "database_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TagInUse { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RetryLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "A database error occurred".to_string()
            }
            AppError::ExternalService(msg) => {
                tracing::warn!("External service error: {}", msg);
                self.to_string()
            }
            other => other.to_string(),
        };

        // 결과: { "error": { "code": "tag_in_use", "message": "...", "count": 2 } }
        let mut error = json!({
            "code": self.code(),
            "message": message,
        });
        if let AppError::TagInUse { count } = self {
            error["count"] = json!(count);
        }

        (self.status(), Json(json!({ "error": error }))).into_response()
    }
}
