//! # 메모리 기반 태그 저장소
//!
//! 세션 로컬 태그 컬렉션과, 사용 수를 세기 위한 기사 컬렉션을 함께 들고 있습니다.
//! DB 버전(`db::tags`)과 같은 규칙을 따릅니다:
//! - 이름이 비어 있으면 추가/수정 거부
//! - 한 건이라도 기사에서 쓰고 있는 태그는 삭제 거부 (연쇄 삭제 없음)
//!
//! ID는 "현재 최대 숫자 ID + 1"로 발급합니다. 한 세션 안에서만 쓰는 컬렉션이라
//! 동시 생성 충돌은 생기지 않습니다. 여러 세션이 공유하는 저장소는 UUIDv7을 씁니다.

use crate::{
    error::AppError,
    models::{normalize_description, validate_tag_name, Article, Tag, TagWithCount},
};

#[derive(Debug, Clone, Default)]
pub struct TagRepository {
    tags: Vec<Tag>,
    articles: Vec<Article>,
}

impl TagRepository {
    pub fn new(tags: Vec<Tag>, articles: Vec<Article>) -> Self {
        Self { tags, articles }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// 이 태그를 참조하는 기사 수
    pub fn article_count_for_tag(&self, id: &str) -> usize {
        self.articles.iter().filter(|a| a.has_tag(id)).count()
    }

    /// 태그 목록 화면용: 각 태그에 사용 기사 수를 붙입니다. 순서는 저장 순서 그대로입니다.
    pub fn with_counts(&self) -> Vec<TagWithCount> {
        self.tags
            .iter()
            .map(|tag| TagWithCount {
                tag: tag.clone(),
                article_count: self.article_count_for_tag(&tag.id) as i64,
            })
            .collect()
    }

    pub fn add_tag(&mut self, name: &str, description: Option<String>) -> Result<Tag, AppError> {
        let name = validate_tag_name(name)?;

        // 숫자가 아닌 ID는 0으로 취급
        let next_id = self
            .tags
            .iter()
            .map(|t| t.id.parse::<u64>().unwrap_or(0))
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| AppError::Internal("Tag id space exhausted".to_string()))?;

        let tag = Tag {
            id: next_id.to_string(),
            name,
            description: normalize_description(description),
            color: None,
        };
        self.tags.push(tag.clone());
        tracing::debug!(tag_id = %tag.id, "tag added");
        Ok(tag)
    }

    /// 이름과 설명을 교체합니다. ID와 색상은 그대로입니다.
    pub fn edit_tag(
        &mut self,
        id: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<Tag, AppError> {
        let name = validate_tag_name(name)?;
        let tag = self
            .tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(AppError::NotFound)?;

        tag.name = name;
        tag.description = normalize_description(description);
        Ok(tag.clone())
    }

    pub fn delete_tag(&mut self, id: &str) -> Result<Tag, AppError> {
        let position = self
            .tags
            .iter()
            .position(|t| t.id == id)
            .ok_or(AppError::NotFound)?;

        let count = self.article_count_for_tag(id);
        if count > 0 {
            return Err(AppError::TagInUse {
                count: count as i64,
            });
        }

        Ok(self.tags.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourcePlatform;
    use chrono::Utc;

    fn tag(id: &str, name: &str) -> Tag {
        Tag {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            color: Some("#3366ff".to_string()),
        }
    }

    fn article(id: &str, tags: Vec<Tag>) -> Article {
        Article {
            id: id.to_string(),
            title: format!("article {id}"),
            url: format!("https://example.com/{id}"),
            summary: String::new(),
            comment: String::new(),
            tags,
            published_at: Utc::now(),
            created_at: Utc::now(),
            source_platform: SourcePlatform::Other,
            is_favorite: false,
        }
    }

    fn tags_of(repo: &TagRepository) -> Vec<Tag> {
        repo.with_counts().into_iter().map(|c| c.tag).collect()
    }

    fn repository() -> TagRepository {
        let rust = tag("1", "Rust");
        let design = tag("2", "設計");
        let unused = tag("5", "未使用");
        TagRepository::new(
            vec![rust.clone(), design.clone(), unused],
            vec![
                article("a", vec![rust.clone()]),
                article("b", vec![rust, design.clone()]),
                article("c", vec![design]),
            ],
        )
    }

    #[test]
    fn add_assigns_one_past_the_max_numeric_id() {
        let mut repo = repository();
        let added = repo.add_tag("Async", Some("非同期".into())).unwrap();
        assert_eq!(added.id, "6");
        let tags = tags_of(&repo);
        assert_eq!(tags.len(), 4);
        assert_eq!(tags.last().unwrap().name, "Async");
    }

    #[test]
    fn add_on_empty_repository_starts_at_one() {
        let mut repo = TagRepository::default();
        assert_eq!(repo.add_tag("first", None).unwrap().id, "1");
    }

    #[test]
    fn max_numeric_id_is_an_internal_error_not_a_wrap() {
        let mut repo = TagRepository::new(vec![tag("18446744073709551615", "Max")], vec![]);
        assert!(matches!(repo.add_tag("next", None), Err(AppError::Internal(_))));
        assert_eq!(tags_of(&repo).len(), 1);
    }

    #[test]
    fn blank_names_leave_collection_unchanged() {
        let mut repo = repository();
        let before = tags_of(&repo);

        for name in ["", "   ", "\n\t"] {
            assert!(matches!(repo.add_tag(name, None), Err(AppError::Validation(_))));
            assert!(matches!(
                repo.edit_tag("1", name, None),
                Err(AppError::Validation(_))
            ));
        }
        assert_eq!(tags_of(&repo), before);
    }

    #[test]
    fn edit_preserves_id_and_color() {
        let mut repo = repository();
        let edited = repo.edit_tag("1", "Rust言語", Some("系統".into())).unwrap();
        assert_eq!(edited.id, "1");
        assert_eq!(edited.color.as_deref(), Some("#3366ff"));
        let stored = &tags_of(&repo)[0];
        assert_eq!(stored.name, "Rust言語");
        assert_eq!(stored.description.as_deref(), Some("系統"));
    }

    #[test]
    fn delete_in_use_reports_exact_count() {
        let mut repo = repository();
        match repo.delete_tag("1") {
            Err(AppError::TagInUse { count }) => assert_eq!(count, 2),
            other => panic!("expected TagInUse, got {other:?}"),
        }
        assert_eq!(tags_of(&repo).len(), 3);
    }

    #[test]
    fn delete_unused_removes_only_that_tag() {
        let mut repo = repository();
        let removed = repo.delete_tag("5").unwrap();
        assert_eq!(removed.name, "未使用");
        let ids: Vec<String> = tags_of(&repo).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn counts_follow_tag_order() {
        let counts: Vec<(String, i64)> = repository()
            .with_counts()
            .into_iter()
            .map(|c| (c.tag.id, c.article_count))
            .collect();
        assert_eq!(
            counts,
            vec![("1".into(), 2), ("2".into(), 2), ("5".into(), 0)]
        );
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut repo = repository();
        assert!(matches!(repo.delete_tag("99"), Err(AppError::NotFound)));
        assert!(matches!(repo.edit_tag("99", "x", None), Err(AppError::NotFound)));
    }

    #[test]
    fn article_count_matches_references() {
        let repo = repository();
        assert_eq!(repo.article_count_for_tag("1"), 2);
        assert_eq!(repo.article_count_for_tag("2"), 2);
        assert_eq!(repo.article_count_for_tag("5"), 0);
    }
}
