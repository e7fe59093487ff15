//! # 기사 등록 위저드
//!
//! `RegistrationWizard`는 드래프트 하나를 소유하고 단계 전이 규칙을 강제하는 상태 머신입니다.
//! 외부 협력자(견출 추출, 요약 생성, 저장소)는 모두 트레이트로 주입받습니다.
//!
//! ## 실패 규칙
//! - 검증 실패(빈 URL, 잘못된 단계 등)는 드래프트를 바꾸지 않습니다.
//! - 외부 호출이 실패하거나 시간 초과되면 호출 전 단계에 그대로 머뭅니다.
//!   `submit_tags_comment`는 요약을 먼저 받고 성공했을 때만 `summary`로 넘어갑니다.
//! - 요약은 비어 있을 때만 자동 생성합니다. 앞뒤로 오가도 편집한 요약은 그대로입니다.
//!   견출을 다시 추출하면 요약도 비워집니다.
//! - 요약 재생성은 호출 전에 횟수를 올립니다. 호출이 실패해도 올린 횟수는 유지됩니다.

use crate::{
    error::AppError,
    models::{
        dedup_tag_ids, Article, Heading, NewArticle, RegistrationDraft, RegistrationStep,
        SourcePlatform, UpdateDraftRequest, SUMMARY_RETRY_LIMIT,
    },
    services::{headings::HeadingExtractor, summary::SummaryGenerator},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{future::Future, time::Duration};
use url::Url;

pub const NO_HEADINGS_ADVISORY: &str = "見出しが選択されていませんが、このまま進みますか?";
pub const NO_TAGS_ADVISORY: &str = "タグが選択されていませんが、このまま進みますか?";

/// 위저드가 완성된 기사를 넘기는 저장소
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn create_article(&self, owner_id: &str, article: NewArticle) -> Result<Article, AppError>;
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationWizard {
    draft: RegistrationDraft,
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn step(&self) -> RegistrationStep {
        self.draft.step
    }

    fn expect_step(&self, allowed: &[RegistrationStep]) -> Result<(), AppError> {
        if allowed.contains(&self.draft.step) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Invalid step for this operation: {}",
                self.draft.step.as_str()
            )))
        }
    }

    pub fn set_url(&mut self, url: String) -> Result<(), AppError> {
        self.expect_step(&[RegistrationStep::Url])?;
        self.draft.url = url;
        Ok(())
    }

    pub fn set_title(&mut self, title: String) -> Result<(), AppError> {
        if self.draft.step == RegistrationStep::Url {
            return Err(AppError::Validation(
                "The title can be edited after headings are loaded".to_string(),
            ));
        }
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        self.draft.title = title.trim().to_string();
        Ok(())
    }

    pub fn set_comment(&mut self, comment: String) -> Result<(), AppError> {
        self.expect_step(&[
            RegistrationStep::TagsComment,
            RegistrationStep::Summary,
            RegistrationStep::Confirm,
        ])?;
        self.draft.comment = comment;
        Ok(())
    }

    pub fn set_summary(&mut self, summary: String) -> Result<(), AppError> {
        self.expect_step(&[RegistrationStep::Summary, RegistrationStep::Confirm])?;
        self.draft.summary = summary;
        Ok(())
    }

    /// 여러 필드를 한꺼번에 고칩니다. 하나라도 실패하면 아무것도 바뀌지 않습니다.
    pub fn apply_update(&mut self, req: UpdateDraftRequest) -> Result<(), AppError> {
        let mut staged = self.clone();
        if let Some(url) = req.url {
            staged.set_url(url)?;
        }
        if let Some(title) = req.title {
            staged.set_title(title)?;
        }
        if let Some(comment) = req.comment {
            staged.set_comment(comment)?;
        }
        if let Some(summary) = req.summary {
            staged.set_summary(summary)?;
        }
        *self = staged;
        Ok(())
    }

    /// `url → headings`
    pub async fn submit_url(
        &mut self,
        extractor: &dyn HeadingExtractor,
        timeout: Duration,
    ) -> Result<(), AppError> {
        self.expect_step(&[RegistrationStep::Url])?;

        let url = self.draft.url.trim().to_string();
        if url.is_empty() {
            return Err(AppError::Validation("URL is required".to_string()));
        }
        match Url::parse(&url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return Err(AppError::Validation(
                    "URL must be an absolute http(s) URL".to_string(),
                ))
            }
        }

        let page = call_external(timeout, "heading extraction", extractor.extract(&url)).await?;

        let headings: Vec<Heading> = page
            .headings
            .into_iter()
            .enumerate()
            .map(|(i, h)| Heading {
                id: (i + 1).to_string(),
                level: h.level,
                text: h.text,
                selected: h.suggested,
            })
            .collect();

        // 페이지 제목 → 첫 h1 → URL 순으로 제목을 정합니다.
        self.draft.title = page
            .title
            .or_else(|| {
                headings
                    .iter()
                    .find(|h| h.level == 1)
                    .map(|h| h.text.clone())
            })
            .unwrap_or_else(|| url.clone());
        self.draft.published_at = page.published_at;
        self.draft.headings = headings;
        self.draft.summary.clear();
        self.draft.url = url;
        self.draft.step = RegistrationStep::Headings;

        tracing::info!(
            url = %self.draft.url,
            headings = self.draft.headings.len(),
            "headings loaded"
        );
        Ok(())
    }

    pub fn toggle_heading(&mut self, heading_id: &str) -> Result<(), AppError> {
        self.expect_step(&[RegistrationStep::Headings])?;
        let heading = self
            .draft
            .headings
            .iter_mut()
            .find(|h| h.id == heading_id)
            .ok_or(AppError::NotFound)?;
        heading.selected = !heading.selected;
        Ok(())
    }

    /// `headings → tags-comment`. 선택한 견출이 없으면 안내 문구를 돌려줍니다.
    pub fn submit_headings(&mut self) -> Result<Option<String>, AppError> {
        self.expect_step(&[RegistrationStep::Headings])?;
        let advisory = (!self.draft.headings.iter().any(|h| h.selected))
            .then(|| NO_HEADINGS_ADVISORY.to_string());
        self.draft.step = RegistrationStep::TagsComment;
        Ok(advisory)
    }

    /// 선택 순서를 유지하며 태그를 켜고 끕니다. 태그 존재 여부는 호출 쪽에서 확인합니다.
    pub fn toggle_tag(&mut self, tag_id: &str) -> Result<(), AppError> {
        self.expect_step(&[RegistrationStep::TagsComment])?;
        let tags = &mut self.draft.selected_tags;
        match tags.iter().position(|t| t == tag_id) {
            Some(i) => {
                tags.remove(i);
            }
            None => tags.push(tag_id.to_string()),
        }
        Ok(())
    }

    /// `tags-comment → summary`.
    /// `auto_summary`가 켜져 있고 요약이 비어 있을 때만 생성기를 부릅니다.
    pub async fn submit_tags_comment(
        &mut self,
        generator: &dyn SummaryGenerator,
        timeout: Duration,
        auto_summary: bool,
    ) -> Result<Option<String>, AppError> {
        self.expect_step(&[RegistrationStep::TagsComment])?;
        let advisory = self
            .draft
            .selected_tags
            .is_empty()
            .then(|| NO_TAGS_ADVISORY.to_string());

        if auto_summary && self.draft.summary.trim().is_empty() {
            self.draft.summary = self.generate(generator, timeout).await?;
        }
        self.draft.step = RegistrationStep::Summary;
        Ok(advisory)
    }

    pub async fn regenerate_summary(
        &mut self,
        generator: &dyn SummaryGenerator,
        timeout: Duration,
    ) -> Result<(), AppError> {
        self.expect_step(&[RegistrationStep::Summary])?;
        if self.draft.summary_retry_count >= SUMMARY_RETRY_LIMIT {
            tracing::debug!("summary regeneration limit reached");
            return Err(AppError::RetryLimitExceeded {
                limit: SUMMARY_RETRY_LIMIT,
            });
        }

        self.draft.summary_retry_count += 1;
        self.draft.summary = self.generate(generator, timeout).await?;
        Ok(())
    }

    /// `summary → confirm`
    pub fn submit_summary(&mut self) -> Result<(), AppError> {
        self.expect_step(&[RegistrationStep::Summary])?;
        self.draft.step = RegistrationStep::Confirm;
        Ok(())
    }

    /// 한 단계 뒤로 갑니다. 입력한 값은 모두 유지됩니다.
    pub fn back(&mut self) -> Result<RegistrationStep, AppError> {
        let previous = self.draft.step.previous().ok_or_else(|| {
            AppError::Validation("Already at the first step".to_string())
        })?;
        self.draft.step = previous;
        Ok(previous)
    }

    /// 확인 단계의 드래프트를 저장소에 넘깁니다.
    /// 성공 후 드래프트를 버리는 것은 소유자(레지스트리)의 몫입니다.
    pub async fn save(&self, store: &dyn ArticleStore, owner_id: &str) -> Result<Article, AppError> {
        self.expect_step(&[RegistrationStep::Confirm])?;
        let article = store.create_article(owner_id, self.new_article()?).await?;
        tracing::info!(article_id = %article.id, "article registered");
        Ok(article)
    }

    fn new_article(&self) -> Result<NewArticle, AppError> {
        let url = Url::parse(&self.draft.url)
            .map_err(|e| AppError::Validation(format!("Invalid URL: {e}")))?;
        let title = self.draft.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        Ok(NewArticle {
            title: title.to_string(),
            url: self.draft.url.clone(),
            summary: self.draft.summary.clone(),
            comment: self.draft.comment.clone(),
            tag_ids: dedup_tag_ids(&self.draft.selected_tags),
            source_platform: SourcePlatform::from_url(&url),
            published_at: self.draft.published_at.unwrap_or_else(Utc::now),
        })
    }

    async fn generate(
        &self,
        generator: &dyn SummaryGenerator,
        timeout: Duration,
    ) -> Result<String, AppError> {
        let headings = self.draft.selected_headings();
        call_external(
            timeout,
            "summary generation",
            generator.generate_summary(&self.draft.url, &headings),
        )
        .await
    }
}

async fn call_external<T>(
    timeout: Duration,
    operation: &str,
    call: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::ExternalService(format!(
            "{operation} timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}
