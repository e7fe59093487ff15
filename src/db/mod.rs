//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `articles`: 기사 CRUD와 태그 연결, `ArticleStore` 구현
//! - `settings`: 사용자별 화면 설정
//! - `tags`: 사용자별 태그 CRUD와 삭제 가드
//! - `transfer`: 내보낸 데이터 가져오기, 전체 삭제
//! - `users`: OAuth 계정 기반 사용자 upsert

pub mod articles;
pub mod settings;
pub mod tags;
pub mod transfer;
pub mod users;

// 하위 모듈의 모든 공개 함수를 재공개(re-export)하여
// `crate::db::list_articles`처럼 바로 접근할 수 있게 합니다.
pub use articles::*;
pub use settings::*;
pub use tags::*;
pub use transfer::*;

#[cfg(test)]
pub use testing::*;
