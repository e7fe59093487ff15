//! # 요약 생성 서비스
//!
//! 기사 URL과 사용자가 고른 견출을 문맥으로 요약문을 만듭니다.
//! 느리고 실패할 수 있는 외부 협력자로 취급합니다.

use crate::{error::AppError, models::Heading};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn generate_summary(&self, url: &str, headings: &[Heading]) -> Result<String, AppError>;
}

pub const CANNED_SUMMARY: &str = "この記事では、最新のWebフレームワークを使用した開発手法について詳しく解説しています。特に、サーバーサイドレンダリングとクライアントサイドレンダリングの適切な使い分けや、パフォーマンス最適化のテクニックに焦点を当てています。実践的なコード例とともに、プロダクション環境での運用ノウハウも紹介されています。";

/// 지연 후 고정 요약문을 돌려줍니다.
pub struct CannedSummaryGenerator {
    latency: Duration,
}

impl CannedSummaryGenerator {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl SummaryGenerator for CannedSummaryGenerator {
    async fn generate_summary(&self, url: &str, headings: &[Heading]) -> Result<String, AppError> {
        tracing::debug!(%url, headings = headings.len(), "returning canned summary");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(CANNED_SUMMARY.to_string())
    }
}

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    url: &'a str,
    headings: Vec<HeadingContext<'a>>,
}

#[derive(Debug, Serialize)]
struct HeadingContext<'a> {
    level: u8,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

/// 외부 요약 API 클라이언트.
///
/// `POST {endpoint}` 에 `{ "url", "headings": [{ "level", "text" }] }`를 보내고
/// `{ "summary" }`를 받습니다. 2xx가 아니거나 요약이 비어 있으면 `ExternalService` 에러입니다.
pub struct RemoteSummaryGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteSummaryGenerator {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SummaryGenerator for RemoteSummaryGenerator {
    async fn generate_summary(&self, url: &str, headings: &[Heading]) -> Result<String, AppError> {
        let body = SummaryRequest {
            url,
            headings: headings
                .iter()
                .map(|h| HeadingContext {
                    level: h.level,
                    text: &h.text,
                })
                .collect(),
        };

        tracing::info!(%url, endpoint = %self.endpoint, "requesting summary");
        let response: SummaryResponse = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::ExternalService(format!("summary request failed: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("invalid summary response: {e}")))?;

        let summary = response.summary.trim().to_string();
        if summary.is_empty() {
            return Err(AppError::ExternalService(
                "summary service returned an empty summary".to_string(),
            ));
        }
        Ok(summary)
    }
}
