//! # 견출 추출 서비스
//!
//! 기사 URL에서 페이지 제목과 견출(h1~h6) 목록을 가져옵니다.
//!
//! - `CannedHeadingExtractor`: 고정 지연 후 고정된 견출 6개를 돌려주는 데모/테스트용 구현
//! - `HttpHeadingExtractor`: 실제로 페이지를 내려받아 HTML에서 견출을 뽑는 구현
//!
//! 어느 쪽을 쓸지는 `COLLABORATOR_MODE` 설정으로 고릅니다 (main.rs).

use crate::{
    error::AppError,
    models::{ExtractedHeading, ExtractedPage},
};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;

/// 견출 추출 협력자. 느리고 실패할 수 있습니다.
#[async_trait]
pub trait HeadingExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ExtractedPage, AppError>;
}

pub struct CannedHeadingExtractor {
    latency: Duration,
}

impl CannedHeadingExtractor {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn headings() -> Vec<ExtractedHeading> {
        [
            (1, "はじめに", true),
            (2, "背景と課題", false),
            (2, "解決策の提案", true),
            (3, "技術選定", false),
            (3, "実装方法", true),
            (2, "まとめ", true),
        ]
        .into_iter()
        .map(|(level, text, suggested)| ExtractedHeading {
            level,
            text: text.to_string(),
            suggested,
        })
        .collect()
    }
}

#[async_trait]
impl HeadingExtractor for CannedHeadingExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedPage, AppError> {
        tracing::debug!(%url, "returning canned headings");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(ExtractedPage {
            title: None,
            headings: Self::headings(),
            published_at: None,
        })
    }
}

pub struct HttpHeadingExtractor {
    client: reqwest::Client,
    title_pattern: Regex,
    heading_pattern: Regex,
    tag_pattern: Regex,
}

impl HttpHeadingExtractor {
    pub fn new(client: reqwest::Client) -> Result<Self, AppError> {
        // regex 크레이트는 역참조(\1)를 지원하지 않으므로 닫는 태그 레벨은 따로 맞추지 않습니다.
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AppError::Internal(format!("invalid regex: {e}")))
        };
        Ok(Self {
            client,
            title_pattern: compile(r"(?is)<title[^>]*>(.*?)</title\s*>")?,
            heading_pattern: compile(r"(?is)<h([1-6])(?:\s[^>]*)?>(.*?)</h[1-6]\s*>")?,
            tag_pattern: compile(r"(?s)<[^>]*>")?,
        })
    }

    /// HTML 문서에서 제목과 견출을 뽑습니다. 텍스트가 빈 견출은 건너뜁니다.
    pub fn parse_page(&self, html: &str) -> ExtractedPage {
        let title = self
            .title_pattern
            .captures(html)
            .map(|c| self.clean_text(&c[1]))
            .filter(|t| !t.is_empty());

        let headings = self
            .heading_pattern
            .captures_iter(html)
            .filter_map(|c| {
                let level = c[1].parse::<u8>().ok()?;
                let text = self.clean_text(&c[2]);
                (!text.is_empty()).then_some(ExtractedHeading {
                    level,
                    text,
                    suggested: false,
                })
            })
            .collect();

        ExtractedPage {
            title,
            headings,
            published_at: None,
        }
    }

    fn clean_text(&self, fragment: &str) -> String {
        let stripped = self.tag_pattern.replace_all(fragment, "");
        let decoded = decode_entities(&stripped);
        decoded.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[async_trait]
impl HeadingExtractor for HttpHeadingExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedPage, AppError> {
        tracing::info!(%url, "fetching article page");
        let html = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::ExternalService(format!("failed to fetch {url}: {e}")))?
            .text()
            .await
            .map_err(|e| AppError::ExternalService(format!("failed to read {url}: {e}")))?;

        let page = self.parse_page(&html);
        tracing::debug!(%url, headings = page.headings.len(), "headings extracted");
        Ok(page)
    }
}

/// 자주 쓰이는 HTML 엔티티만 풉니다. `&amp;`는 이중 디코딩을 막으려고 마지막에 처리합니다.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
