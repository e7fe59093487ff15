//! # 기사 데이터베이스 쿼리 모듈
//!
//! 기사 행(`articles`)과 태그 연결(`article_tags`)을 함께 다룹니다.
//! 태그 순서는 `article_tags.position`으로 보존합니다.
//!
//! 생성과 태그 집합 교체는 트랜잭션으로 묶어, 태그 확인과 쓰기 사이에
//! 태그가 지워지는 경우에도 반쯤 저장된 기사가 남지 않게 합니다.

use crate::error::AppError;
use crate::models::*;
use crate::services::registration::ArticleStore;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;

use super::tags::ensure_tags_exist;

const ARTICLE_COLUMNS: &str =
    "id, title, url, summary, comment, source_platform, is_favorite, published_at, created_at";

/// 태그 조인 결과 한 행: 어느 기사의 태그인지 + 태그 본체
#[derive(sqlx::FromRow)]
struct ArticleTagRow {
    article_id: String,
    #[sqlx(flatten)]
    tag: Tag,
}

/// 사용자의 모든 기사를 태그와 함께 등록순으로 가져옵니다.
/// 정렬/필터/페이지는 `services::article_list`에서 처리합니다.
pub async fn list_articles(pool: &SqlitePool, owner_id: &str) -> Result<Vec<Article>, AppError> {
    let rows = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles WHERE owner_id = ? ORDER BY created_at, id"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let tag_rows = sqlx::query_as::<_, ArticleTagRow>(
        r#"
        SELECT at.article_id, t.id, t.name, t.description, t.color
        FROM article_tags at
        JOIN tags t ON t.id = at.tag_id
        JOIN articles a ON a.id = at.article_id
        WHERE a.owner_id = ?
        ORDER BY at.article_id, at.position
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let mut tags_by_article: HashMap<String, Vec<Tag>> = HashMap::new();
    for row in tag_rows {
        tags_by_article.entry(row.article_id).or_default().push(row.tag);
    }

    rows.into_iter()
        .map(|row| {
            let tags = tags_by_article.remove(&row.id).unwrap_or_default();
            row.into_article(tags)
        })
        .collect()
}

pub async fn get_article(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
) -> Result<Option<Article>, AppError> {
    let mut conn = pool.acquire().await?;
    fetch_article(&mut *conn, owner_id, id).await
}

async fn fetch_article(
    conn: &mut SqliteConnection,
    owner_id: &str,
    id: &str,
) -> Result<Option<Article>, AppError> {
    let row = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ? AND owner_id = ?"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.description, t.color
        FROM tags t
        JOIN article_tags at ON at.tag_id = t.id
        WHERE at.article_id = ?
        ORDER BY at.position
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    row.into_article(tags).map(Some)
}

/// 기사와 태그 연결을 한 트랜잭션으로 저장합니다.
pub async fn create_article(
    pool: &SqlitePool,
    owner_id: &str,
    article: NewArticle,
) -> Result<Article, AppError> {
    let tag_ids = dedup_tag_ids(&article.tag_ids);
    let id = uuid::Uuid::now_v7().to_string();

    let mut tx = pool.begin().await?;
    ensure_tags_exist(&mut *tx, owner_id, &tag_ids).await?;

    sqlx::query(
        r#"
        INSERT INTO articles
            (id, owner_id, title, url, summary, comment, source_platform, published_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(owner_id)
    .bind(&article.title)
    .bind(&article.url)
    .bind(&article.summary)
    .bind(&article.comment)
    .bind(article.source_platform.as_str())
    .bind(article.published_at)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    replace_tags(&mut *tx, &id, &tag_ids).await?;

    let saved = fetch_article(&mut *tx, owner_id, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created article".to_string()))?;
    tx.commit().await?;

    tracing::debug!(article_id = %id, tags = tag_ids.len(), "article saved");
    Ok(saved)
}

/// 요청에 들어온 필드만 바꿉니다. `tag_ids`가 있으면 태그 집합 전체를 교체합니다.
pub async fn update_article(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    req: &UpdateArticleRequest,
) -> Result<Option<Article>, AppError> {
    req.validate()?;

    let mut tx = pool.begin().await?;

    // COALESCE(?, col): 바인딩 값이 NULL(None)이면 기존 값을 유지합니다.
    let result = sqlx::query(
        r#"
        UPDATE articles SET
            title = COALESCE(?, title),
            summary = COALESCE(?, summary),
            comment = COALESCE(?, comment),
            is_favorite = COALESCE(?, is_favorite)
        WHERE id = ? AND owner_id = ?
        "#,
    )
    .bind(req.title.as_deref().map(str::trim))
    .bind(&req.summary)
    .bind(&req.comment)
    .bind(req.is_favorite)
    .bind(id)
    .bind(owner_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    if let Some(tag_ids) = &req.tag_ids {
        let tag_ids = dedup_tag_ids(tag_ids);
        ensure_tags_exist(&mut *tx, owner_id, &tag_ids).await?;
        replace_tags(&mut *tx, id, &tag_ids).await?;
    }

    let updated = fetch_article(&mut *tx, owner_id, id).await?;
    tx.commit().await?;
    Ok(updated)
}

/// 기사를 지웁니다. 태그 연결은 `ON DELETE CASCADE`로 함께 사라집니다.
pub async fn delete_article(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM articles WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn replace_tags(
    conn: &mut SqliteConnection,
    article_id: &str,
    tag_ids: &[String],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM article_tags WHERE article_id = ?")
        .bind(article_id)
        .execute(&mut *conn)
        .await?;

    for (position, tag_id) in tag_ids.iter().enumerate() {
        sqlx::query("INSERT INTO article_tags (article_id, tag_id, position) VALUES (?, ?, ?)")
            .bind(article_id)
            .bind(tag_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl ArticleStore for SqlitePool {
    async fn create_article(&self, owner_id: &str, article: NewArticle) -> Result<Article, AppError> {
        create_article(self, owner_id, article).await
    }
}
