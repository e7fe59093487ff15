//! # 데이터 가져오기 / 전체 삭제 모델
//!
//! 가져오기 본문은 내보내기(`GET /export`) 응답과 같은 모양입니다.
//! 태그의 `article_count`, 최상위 `exported_at` 같은 여분의 필드는 무시합니다.

use crate::{
    error::AppError,
    models::{validate_tag_name, Article, Tag},
};
use serde::{Deserialize, Serialize};
use url::Url;

/// 가져오기 요청: `POST /api/v1/users/{user_id}/import`
#[derive(Debug, Default, Deserialize)]
pub struct ImportData {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl ImportData {
    /// 하나라도 잘못되면 아무것도 쓰지 않도록 쓰기 전에 전부 검사합니다.
    pub fn validate(&self) -> Result<(), AppError> {
        let embedded = self.articles.iter().flat_map(|a| a.tags.iter());
        for tag in self.tags.iter().chain(embedded) {
            validate_tag_name(&tag.name)?;
        }

        for article in &self.articles {
            if article.title.trim().is_empty() {
                return Err(AppError::Validation("Title is required".to_string()));
            }
            match Url::parse(article.url.trim()) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                _ => {
                    return Err(AppError::Validation(format!(
                        "Article url {:?} is not an absolute http(s) URL",
                        article.url
                    )))
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// 새로 만든 태그 수 (이름이 같은 기존 태그는 재사용)
    pub imported_tags: usize,
    pub imported_articles: usize,
    /// 이미 같은 URL이 있어서 건너뛴 기사 수
    pub skipped_articles: usize,
}

/// 전체 삭제 쿼리: `DELETE /api/v1/users/{user_id}/data?confirm=true`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteAllQuery {
    pub confirm: Option<bool>,
}

impl DeleteAllQuery {
    pub fn require_confirmation(&self) -> Result<(), AppError> {
        if self.confirm != Some(true) {
            return Err(AppError::Validation(
                "Deleting all data requires confirm=true".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub deleted_articles: u64,
    pub deleted_tags: u64,
}
