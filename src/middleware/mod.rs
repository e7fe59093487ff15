//! # 미들웨어 모듈
//!
//! - `auth`: 세션 토큰 발급/검증, `AuthUser` 추출기, 소유자/역할 검사

pub mod auth;
