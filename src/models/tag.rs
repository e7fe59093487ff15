//! # 태그 모델 정의
//!
//! 태그(Tag)는 기사를 분류하기 위한 라벨입니다.
//! 한 기사는 여러 태그를, 한 태그는 여러 기사를 가질 수 있습니다 (다대다).
//!
//! ## 구조체 역할
//! - `Tag`: 저장된 태그 (응답용)
//! - `TagWithCount`: 태그 목록 화면용, 사용 중인 기사 수 포함
//! - `CreateTagRequest` / `UpdateTagRequest`: 클라이언트가 보내는 JSON 본문

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// 태그 엔티티: DB의 `tags` 테이블 한 행(row)에 대응합니다.
///
/// `owner_id`는 응답에 노출하지 않으므로 필드로 두지 않습니다.
/// 쿼리에서 항상 소유자 조건으로 걸러서 가져옵니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: String,
    /// 태그 이름 (예: "Rust", "設計")
    pub name: String,
    pub description: Option<String>,
    /// 태그 색상 코드 (예: "#FF5733")
    pub color: Option<String>,
}

/// 태그 + 이 태그를 사용하는 기사 수
#[derive(Debug, Clone, Serialize)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    pub article_count: i64,
}

/// 태그 생성 요청: `POST /api/v1/users/{user_id}/tags`
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// 태그 수정 요청: `PATCH /api/v1/users/{user_id}/tags/{tag_id}`
///
/// 이름과 설명을 통째로 교체합니다. 색상과 ID는 그대로 유지됩니다.
/// `description`을 생략하면 설명이 지워집니다.
#[derive(Debug, Deserialize)]
pub struct UpdateTagRequest {
    pub name: String,
    pub description: Option<String>,
}

/// 태그 이름을 검증하고 앞뒤 공백을 제거한 값을 돌려줍니다.
///
/// 빈 문자열이나 공백만 있는 이름은 `AppError::Validation`입니다.
pub fn validate_tag_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Tag name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// 빈 설명은 설명 없음(None)으로 취급합니다.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_names_are_rejected() {
        for name in ["", " ", "\t\n", "\u{3000}"] {
            assert!(
                matches!(validate_tag_name(name), Err(AppError::Validation(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_tag_name("  Rust ").unwrap(), "Rust");
    }

    #[test]
    fn blank_descriptions_become_none() {
        assert_eq!(normalize_description(Some("   ".into())), None);
        assert_eq!(normalize_description(Some(" memo ".into())), Some("memo".into()));
        assert_eq!(normalize_description(None), None);
    }
}
