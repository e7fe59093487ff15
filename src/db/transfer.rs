//! # 가져오기 / 전체 삭제 쿼리
//!
//! 둘 다 한 트랜잭션입니다. 중간에 실패하면 아무것도 바뀌지 않습니다.
//!
//! 가져오기 규칙:
//! - 태그는 이름으로 합칩니다. 같은 이름이 있으면 기존 태그를 쓰고, 없으면 새로 만듭니다.
//! - 이미 같은 URL의 기사가 있으면 건너뜁니다. 파일 안의 중복 URL도 처음 것만 씁니다.
//! - 기사 ID는 새로 발급하고 등록일, 게시일, 즐겨찾기는 그대로 옮깁니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};

use super::articles::replace_tags;
use super::tags::duplicate_name_to_conflict;

pub async fn import_data(
    pool: &SqlitePool,
    owner_id: &str,
    data: &ImportData,
) -> Result<ImportSummary, AppError> {
    data.validate()?;
    let mut summary = ImportSummary::default();

    let mut tx = pool.begin().await?;

    let existing: Vec<(String, String)> =
        sqlx::query_as("SELECT name, id FROM tags WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_all(&mut *tx)
            .await?;
    let mut id_by_name: HashMap<String, String> = existing.into_iter().collect();

    // 파일 속 태그 ID → 이 사용자의 태그 ID
    let mut local_ids: HashMap<&str, String> = HashMap::new();
    let embedded = data.articles.iter().flat_map(|a| a.tags.iter());
    for tag in data.tags.iter().chain(embedded) {
        if local_ids.contains_key(tag.id.as_str()) {
            continue;
        }
        let name = validate_tag_name(&tag.name)?;
        let local_id = match id_by_name.get(&name) {
            Some(id) => id.clone(),
            None => {
                let id = insert_tag(&mut *tx, owner_id, &name, tag).await?;
                summary.imported_tags += 1;
                id_by_name.insert(name, id.clone());
                id
            }
        };
        local_ids.insert(tag.id.as_str(), local_id);
    }

    let urls: Vec<(String,)> = sqlx::query_as("SELECT url FROM articles WHERE owner_id = ?")
        .bind(owner_id)
        .fetch_all(&mut *tx)
        .await?;
    let mut known_urls: HashSet<String> = urls.into_iter().map(|(url,)| url).collect();

    for article in &data.articles {
        let url = article.url.trim();
        if !known_urls.insert(url.to_string()) {
            summary.skipped_articles += 1;
            continue;
        }

        let id = uuid::Uuid::now_v7().to_string();
        sqlx::query(
            r#"
            INSERT INTO articles
                (id, owner_id, title, url, summary, comment, source_platform,
                 is_favorite, published_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(article.title.trim())
        .bind(url)
        .bind(&article.summary)
        .bind(&article.comment)
        .bind(article.source_platform.as_str())
        .bind(article.is_favorite)
        .bind(article.published_at)
        .bind(article.created_at)
        .execute(&mut *tx)
        .await?;

        let tag_ids: Vec<String> = article
            .tags
            .iter()
            .filter_map(|t| local_ids.get(t.id.as_str()).cloned())
            .collect();
        replace_tags(&mut *tx, &id, &dedup_tag_ids(&tag_ids)).await?;
        summary.imported_articles += 1;
    }

    tx.commit().await?;
    tracing::info!(
        owner_id = %owner_id,
        tags = summary.imported_tags,
        articles = summary.imported_articles,
        skipped = summary.skipped_articles,
        "import finished"
    );
    Ok(summary)
}

async fn insert_tag(
    conn: &mut SqliteConnection,
    owner_id: &str,
    name: &str,
    tag: &Tag,
) -> Result<String, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO tags (id, owner_id, name, description, color) VALUES (?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(owner_id)
        .bind(name)
        .bind(normalize_description(tag.description.clone()))
        .bind(&tag.color)
        .execute(&mut *conn)
        .await
        .map_err(duplicate_name_to_conflict)?;
    Ok(id)
}

/// 사용자의 기사와 태그를 모두 지웁니다. 태그 연결 → 기사 → 태그 순서입니다.
pub async fn delete_all_data(pool: &SqlitePool, owner_id: &str) -> Result<DeleteSummary, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM article_tags WHERE article_id IN (SELECT id FROM articles WHERE owner_id = ?)",
    )
    .bind(owner_id)
    .execute(&mut *tx)
    .await?;

    let articles = sqlx::query("DELETE FROM articles WHERE owner_id = ?")
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;
    let tags = sqlx::query("DELETE FROM tags WHERE owner_id = ?")
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let summary = DeleteSummary {
        deleted_articles: articles.rows_affected(),
        deleted_tags: tags.rows_affected(),
    };
    tracing::info!(owner_id = %owner_id, ?summary, "all user data deleted");
    Ok(summary)
}
