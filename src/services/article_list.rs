//! # 기사 목록 엔진
//!
//! 기사 컬렉션에 대한 필터 → 정렬 → 페이지 나누기를 수행하는 순수 함수 모음입니다.
//! 입력을 바꾸지 않고, 부수 효과도 없습니다.
//!
//! ## 규칙
//! - 필터: 선택한 태그 중 하나라도 가진 기사를 남깁니다 (OR). 선택이 비어 있으면 전체.
//! - 정렬: `newest`/`oldest`는 등록일, `title`은 일본어 콜레이션. 안정 정렬입니다.
//! - 페이지: 1부터 시작. 범위를 벗어난 페이지는 빈 목록을 돌려줍니다.
//!   페이지 범위 보정은 호출하는 쪽(클라이언트)의 책임입니다.

use crate::models::{Article, SortOption};
use icu::collator::{Collator, CollatorOptions};
use icu::locid::locale;
use serde::Serialize;
use std::cmp::Ordering;

/// 한 페이지에 보여줄 기본 기사 수
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// 상세 화면의 관련 기사 최대 수
pub const RELATED_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub selected_tag_ids: Vec<String>,
    pub sort: SortOption,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            selected_tag_ids: Vec::new(),
            sort: SortOption::Newest,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub items: Vec<Article>,
    /// 필터 적용 후 전체 건수
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
}

/// 선택한 태그 중 하나라도 가진 기사만 남깁니다.
pub fn filter_by_tags(articles: &[Article], selected_tag_ids: &[String]) -> Vec<Article> {
    if selected_tag_ids.is_empty() {
        return articles.to_vec();
    }
    articles
        .iter()
        .filter(|a| a.has_any_tag(selected_tag_ids))
        .cloned()
        .collect()
}

pub fn sort_articles(articles: &mut [Article], sort: SortOption) {
    match sort {
        SortOption::Newest => articles.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::Oldest => articles.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOption::Title => {
            let collator = japanese_collator();
            articles.sort_by(|a, b| compare_titles(collator.as_ref(), &a.title, &b.title));
        }
    }
}

pub fn list_articles(articles: &[Article], options: &ListOptions) -> ArticlePage {
    let mut filtered = filter_by_tags(articles, &options.selected_tag_ids);
    sort_articles(&mut filtered, options.sort);

    let page_size = options.page_size.max(1);
    let total_count = filtered.len();
    let total_pages = total_count.div_ceil(page_size);

    let items = match options.page.checked_sub(1) {
        Some(zero_based) => filtered
            .into_iter()
            .skip(zero_based.saturating_mul(page_size))
            .take(page_size)
            .collect(),
        None => Vec::new(),
    };

    ArticlePage {
        items,
        total_count,
        total_pages,
        page: options.page,
        page_size,
    }
}

/// `article`과 태그를 하나 이상 공유하는 다른 기사들 (컬렉션 순서, 최대 `limit`건)
pub fn related_articles(articles: &[Article], article: &Article, limit: usize) -> Vec<Article> {
    let tag_ids: Vec<String> = article.tags.iter().map(|t| t.id.clone()).collect();
    articles
        .iter()
        .filter(|other| other.id != article.id && other.has_any_tag(&tag_ids))
        .take(limit)
        .cloned()
        .collect()
}

fn japanese_collator() -> Option<Collator> {
    match Collator::try_new(&locale!("ja").into(), CollatorOptions::new()) {
        Ok(collator) => Some(collator),
        Err(e) => {
            tracing::warn!("Japanese collator unavailable, falling back to code point order: {}", e);
            None
        }
    }
}

fn compare_titles(collator: Option<&Collator>, a: &str, b: &str) -> Ordering {
    match collator {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    }
}
