//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `article`: 기사(Article), 출처 플랫폼, 정렬 옵션
//! - `registration`: 등록 위저드의 단계와 드래프트
//! - `settings`: 사용자별 화면 설정
//! - `tag`: 태그 관련 구조체
//! - `transfer`: 데이터 가져오기와 전체 삭제
//! - `user`: 사용자(User)와 세션 발급 요청
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Article`처럼 짧게 접근합니다.

pub mod article;
pub mod registration;
pub mod settings;
pub mod tag;
pub mod transfer;
pub mod user;

pub use article::*;
pub use registration::*;
pub use settings::*;
pub use tag::*;
pub use transfer::*;
pub use user::*;
