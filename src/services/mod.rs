//! # 서비스 모듈
//!
//! HTTP나 DB에 직접 묶이지 않는 도메인 로직과 외부 협력자를 모아둔 모듈입니다.
//!
//! - `article_list`: 기사 필터/정렬/페이지 나누기 (순수 함수)
//! - `tag_repository`: 메모리 기반 태그 컬렉션과 삭제 가드
//! - `registration`: 기사 등록 위저드 상태 머신과 `ArticleStore` 트레이트
//! - `drafts`: 진행 중인 위저드 레지스트리와 단일 실행 가드
//! - `headings`: 견출 추출 협력자
//! - `summary`: 요약 생성 협력자

pub mod article_list;
pub mod drafts;
pub mod headings;
pub mod registration;
pub mod summary;
pub mod tag_repository;
