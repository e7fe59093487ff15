//! # 기사 모델 정의
//!
//! 사용자가 저장한 외부 기사(Article)와 관련 타입들입니다.
//!
//! ## 불변 조건
//! - `url`은 생성 후 변경할 수 없습니다. 수정 요청에 `url`이 있으면 검증 에러입니다.
//! - `tags`의 모든 참조는 존재하는 태그여야 합니다. 태그 삭제 가드와
//!   저장 트랜잭션에서의 재확인으로 보장합니다.

use crate::{error::AppError, models::Tag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

/// 기사가 게시된 플랫폼. URL의 호스트로 판별합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePlatform {
    Zenn,
    Qiita,
    Note,
    Other,
}

impl SourcePlatform {
    /// `zenn.dev`, `qiita.com`, `note.com`과 그 서브도메인을 인식합니다.
    pub fn from_url(url: &Url) -> Self {
        let Some(host) = url.host_str() else {
            return Self::Other;
        };
        let host = host.to_ascii_lowercase();
        let matches = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));

        if matches("zenn.dev") {
            Self::Zenn
        } else if matches("qiita.com") {
            Self::Qiita
        } else if matches("note.com") {
            Self::Note
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zenn => "zenn",
            Self::Qiita => "qiita",
            Self::Note => "note",
            Self::Other => "other",
        }
    }
}

impl FromStr for SourcePlatform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zenn" => Ok(Self::Zenn),
            "qiita" => Ok(Self::Qiita),
            "note" => Ok(Self::Note),
            "other" => Ok(Self::Other),
            other => Err(AppError::Internal(format!("unknown source platform {other:?}"))),
        }
    }
}

/// 기사 엔티티 (태그 포함)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    pub summary: String,
    /// 사용자 코멘트 (마크다운). 없으면 빈 문자열
    pub comment: String,
    /// 순서가 있는 태그 집합 (중복 없음)
    pub tags: Vec<Tag>,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub source_platform: SourcePlatform,
    pub is_favorite: bool,
}

impl Article {
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    /// 주어진 태그 중 하나라도 가지고 있으면 true (OR 조건)
    pub fn has_any_tag(&self, tag_ids: &[String]) -> bool {
        tag_ids.iter().any(|id| self.has_tag(id))
    }
}

/// `articles` 테이블 한 행. 태그는 별도 쿼리로 채운 뒤 `into_article`로 합칩니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: String,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub comment: String,
    pub source_platform: String,
    pub is_favorite: bool,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ArticleRow {
    pub fn into_article(self, tags: Vec<Tag>) -> Result<Article, AppError> {
        Ok(Article {
            source_platform: self.source_platform.parse()?,
            id: self.id,
            title: self.title,
            url: self.url,
            summary: self.summary,
            comment: self.comment,
            tags,
            published_at: self.published_at,
            created_at: self.created_at,
            is_favorite: self.is_favorite,
        })
    }
}

/// 등록 위저드가 저장 계층에 넘기는 새 기사 데이터
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub comment: String,
    pub tag_ids: Vec<String>,
    pub source_platform: SourcePlatform,
    pub published_at: DateTime<Utc>,
}

/// 기사 수정 요청: `PATCH /api/v1/users/{user_id}/articles/{article_id}`
///
/// `url`은 받기만 하고 값이 들어오면 거부합니다 (생성 후 불변).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub comment: Option<String>,
    pub is_favorite: Option<bool>,
    /// 태그 집합 전체 교체
    pub tag_ids: Option<Vec<String>>,
    pub url: Option<String>,
}

impl UpdateArticleRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.url.is_some() {
            return Err(AppError::Validation(
                "The url of a saved article cannot be changed".to_string(),
            ));
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title is required".to_string()));
            }
        }
        Ok(())
    }
}

/// 목록 정렬 옵션
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// 등록일 내림차순
    #[default]
    Newest,
    /// 등록일 오름차순
    Oldest,
    /// 제목 오름차순 (일본어 콜레이션)
    Title,
}

/// 기사 목록 쿼리 파라미터: `?tags=a,b&sort=title&page=2&page_size=9`
#[derive(Debug, Default, Deserialize)]
pub struct ListArticlesQuery {
    /// 쉼표로 구분한 태그 ID 목록
    pub tags: Option<String>,
    pub sort: Option<SortOption>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListArticlesQuery {
    pub fn tag_ids(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// 순서를 유지하면서 중복 태그 ID를 제거합니다.
pub fn dedup_tag_ids(tag_ids: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(tag_ids.len());
    for id in tag_ids {
        if !seen.contains(id) {
            seen.push(id.clone());
        }
    }
    seen
}
