//! # Article Shelf 라이브러리
//!
//! 기사 보관함 서버의 모든 구성 요소를 공개하는 라이브러리 루트입니다.
//! 바이너리(`main.rs`)는 이 크레이트를 가져와 설정, DB, 라우터를 조립만 합니다.
//!
//! ```text
//! src/
//! ├── config.rs      # 환경변수 기반 설정
//! ├── error.rs       # AppError와 HTTP 응답 변환
//! ├── db/            # SQLite 접근 계층
//! ├── middleware/    # JWT 인증 추출기
//! ├── models/        # 요청/응답/DB 행 타입
//! ├── routes/        # HTTP 핸들러와 라우터 구성
//! └── services/      # 위저드, 태그 저장소, 외부 협력자
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use error::AppError;
pub use routes::{app, articles::AppState};
