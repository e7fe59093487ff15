//! # 태그 데이터베이스 쿼리 모듈
//!
//! 사용자별 태그 CRUD 쿼리입니다. 모든 쿼리는 `owner_id` 조건을 붙여
//! 다른 사용자의 태그가 보이지 않게 합니다.
//!
//! ## 테이블 구조
//! - `tags`: 태그 엔티티 (id, owner_id, name, description, color)
//! - `article_tags`: 기사와 태그의 다대다(N:M) 관계 테이블
//!
//! 삭제 가드는 트랜잭션 안에서 사용 수를 세고 지웁니다.
//! 스키마의 `ON DELETE RESTRICT`가 마지막 안전장치입니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::{SqliteConnection, SqlitePool};

/// 사용자의 태그를 만든 순서대로 조회합니다.
pub async fn list_tags(pool: &SqlitePool, owner_id: &str) -> Result<Vec<Tag>, AppError> {
    let tags = sqlx::query_as::<_, Tag>(
        "SELECT id, name, description, color FROM tags WHERE owner_id = ? ORDER BY created_at, id",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// `fetch_optional`: 0행이면 None, 1행이면 Some(Tag)
pub async fn get_tag(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<Option<Tag>, AppError> {
    let tag = sqlx::query_as::<_, Tag>(
        "SELECT id, name, description, color FROM tags WHERE id = ? AND owner_id = ?",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(tag)
}

/// 새 태그를 만듭니다. 같은 사용자에게 같은 이름이 있으면 `Conflict`입니다.
pub async fn create_tag(
    pool: &SqlitePool,
    owner_id: &str,
    req: &CreateTagRequest,
) -> Result<Tag, AppError> {
    let name = validate_tag_name(&req.name)?;
    // UUIDv7: 시간 기반 UUID로, 생성 순서대로 정렬됩니다
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query("INSERT INTO tags (id, owner_id, name, description, color) VALUES (?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(owner_id)
        .bind(&name)
        .bind(normalize_description(req.description.clone()))
        .bind(&req.color)
        .execute(pool)
        .await
        .map_err(duplicate_name_to_conflict)?;

    get_tag(pool, owner_id, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created tag".to_string()))
}

/// 이름과 설명을 교체합니다. ID와 색상은 그대로입니다.
pub async fn update_tag(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    req: &UpdateTagRequest,
) -> Result<Tag, AppError> {
    let name = validate_tag_name(&req.name)?;

    let result = sqlx::query("UPDATE tags SET name = ?, description = ? WHERE id = ? AND owner_id = ?")
        .bind(&name)
        .bind(normalize_description(req.description.clone()))
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await
        .map_err(duplicate_name_to_conflict)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    get_tag(pool, owner_id, id).await?.ok_or(AppError::NotFound)
}

/// 태그를 삭제합니다. 기사에서 쓰고 있으면 `TagInUse { count }`로 거절합니다.
pub async fn delete_tag(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound);
    }

    let count = count_articles_for_tag(&mut *tx, id).await?;
    if count > 0 {
        tracing::debug!(tag_id = %id, count, "tag delete blocked");
        return Err(AppError::TagInUse { count });
    }

    sqlx::query("DELETE FROM tags WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn count_articles_for_tag(conn: &mut SqliteConnection, tag_id: &str) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM article_tags WHERE tag_id = ?")
        .bind(tag_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// 모든 태그 ID가 이 사용자의 태그인지 확인합니다. 하나라도 없으면 `Validation` 에러입니다.
pub async fn ensure_tags_exist(
    conn: &mut SqliteConnection,
    owner_id: &str,
    tag_ids: &[String],
) -> Result<(), AppError> {
    for tag_id in tag_ids {
        let found: Option<(String,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ? AND owner_id = ?")
            .bind(tag_id)
            .bind(owner_id)
            .fetch_optional(&mut *conn)
            .await?;
        if found.is_none() {
            return Err(AppError::Validation(format!("Unknown tag: {tag_id}")));
        }
    }
    Ok(())
}

pub(super) fn duplicate_name_to_conflict(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A tag with this name already exists".to_string())
        }
        _ => AppError::Database(err),
    }
}
