//! # 등록 위저드 모델
//!
//! 기사 등록은 다섯 단계를 순서대로 거칩니다:
//!
//! ```text
//! url → headings → tags-comment → summary → confirm → (저장)
//! ```
//!
//! 드래프트(`RegistrationDraft`)는 한 번의 등록 세션 동안만 존재하며,
//! 저장에 성공하면 `NewArticle`로 바뀌어 영속 계층에 넘어갑니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 요약 재생성 최대 횟수
pub const SUMMARY_RETRY_LIMIT: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationStep {
    #[default]
    Url,
    Headings,
    TagsComment,
    Summary,
    Confirm,
}

impl RegistrationStep {
    pub const ALL: [RegistrationStep; 5] = [
        RegistrationStep::Url,
        RegistrationStep::Headings,
        RegistrationStep::TagsComment,
        RegistrationStep::Summary,
        RegistrationStep::Confirm,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Url => 0,
            Self::Headings => 1,
            Self::TagsComment => 2,
            Self::Summary => 3,
            Self::Confirm => 4,
        }
    }

    /// 바로 앞 단계. 첫 단계(url)에는 없습니다.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Url => None,
            Self::Headings => Some(Self::Url),
            Self::TagsComment => Some(Self::Headings),
            Self::Summary => Some(Self::TagsComment),
            Self::Confirm => Some(Self::Summary),
        }
    }

    /// 진행률 (%). 화면의 프로그레스 바에 그대로 씁니다.
    pub fn progress(self) -> f64 {
        (self.index() + 1) as f64 * 100.0 / Self::ALL.len() as f64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Headings => "headings",
            Self::TagsComment => "tags-comment",
            Self::Summary => "summary",
            Self::Confirm => "confirm",
        }
    }
}

/// 기사에서 추출한 견출 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub id: String,
    /// 1..=6 (h1~h6)
    pub level: u8,
    pub text: String,
    /// 요약 문맥에 포함할지 여부
    pub selected: bool,
}

/// 견출 추출 서비스가 돌려주는 원시 견출
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedHeading {
    pub level: u8,
    pub text: String,
    /// 처음부터 선택된 상태로 보여줄지 여부
    #[serde(default)]
    pub suggested: bool,
}

/// 견출 추출 결과 (페이지 제목 포함)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub headings: Vec<ExtractedHeading>,
    pub published_at: Option<DateTime<Utc>>,
}

/// 등록 세션 하나의 진행 중인 상태
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrationDraft {
    pub step: RegistrationStep,
    pub url: String,
    /// 저장될 기사 제목. 견출 추출 후 채워지며 확인 단계 전까지 수정할 수 있습니다.
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub headings: Vec<Heading>,
    /// 선택 순서를 유지하는 태그 ID 집합
    pub selected_tags: Vec<String>,
    pub comment: String,
    pub summary: String,
    pub summary_retry_count: u32,
}

impl RegistrationDraft {
    pub fn selected_headings(&self) -> Vec<Heading> {
        self.headings.iter().filter(|h| h.selected).cloned().collect()
    }
}

/// 드래프트의 필드 편집 요청: `PATCH .../registrations/{draft_id}`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDraftRequest {
    pub url: Option<String>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub summary: Option<String>,
}

/// 위저드 API 응답의 드래프트 표현
#[derive(Debug, Serialize)]
pub struct DraftView {
    pub id: String,
    pub step_index: usize,
    pub progress: f64,
    pub remaining_regenerations: u32,
    #[serde(flatten)]
    pub draft: RegistrationDraft,
}

impl DraftView {
    pub fn new(id: &str, draft: &RegistrationDraft) -> Self {
        Self {
            id: id.to_string(),
            step_index: draft.step.index(),
            progress: draft.step.progress(),
            remaining_regenerations: SUMMARY_RETRY_LIMIT.saturating_sub(draft.summary_retry_count),
            draft: draft.clone(),
        }
    }
}

/// 위저드 조작의 응답: `{ "draft": ..., "advisory": "..." | null }`
#[derive(Debug, Serialize)]
pub struct WizardResponse {
    pub draft: DraftView,
    pub advisory: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_serialize_in_kebab_case() {
        let json = serde_json::to_string(&RegistrationStep::TagsComment).unwrap();
        assert_eq!(json, "\"tags-comment\"");
    }

    #[test]
    fn previous_walks_back_to_url_only() {
        let mut step = RegistrationStep::Confirm;
        let mut visited = vec![step];
        while let Some(prev) = step.previous() {
            visited.push(prev);
            step = prev;
        }
        let mut expected = RegistrationStep::ALL.to_vec();
        expected.reverse();
        assert_eq!(visited, expected);
    }

    #[test]
    fn progress_reaches_hundred_on_confirm() {
        assert_eq!(RegistrationStep::Url.progress(), 20.0);
        assert_eq!(RegistrationStep::Confirm.progress(), 100.0);
    }
}
