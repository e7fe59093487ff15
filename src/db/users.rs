use crate::error::AppError;
use crate::models::user::{Profile, User, ACTIVE_ROLE};
use sqlx::SqlitePool;

const USER_COLUMNS: &str =
    "id, provider, provider_account_id, name, email, image, role, created_at, updated_at";

/// OAuth 계정으로 사용자를 찾고, 없으면 만듭니다. 있으면 프로필만 갱신합니다.
///
/// 새 사용자의 role은 0(비활성)입니다. 역할 부여는 `set_role`로 따로 합니다.
pub async fn upsert_user(
    pool: &SqlitePool,
    provider: &str,
    provider_account_id: &str,
    profile: &Profile,
) -> Result<User, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO users (id, provider, provider_account_id, name, email, image)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (provider, provider_account_id) DO UPDATE SET
            name = excluded.name,
            email = excluded.email,
            image = excluded.image,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(&id)
    .bind(provider)
    .bind(provider_account_id)
    .bind(&profile.name)
    .bind(&profile.email)
    .bind(&profile.image)
    .execute(pool)
    .await?;

    find_by_provider_account(pool, provider, provider_account_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve upserted user".to_string()))
}

pub async fn find_by_provider_account(
    pool: &SqlitePool,
    provider: &str,
    provider_account_id: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE provider = ? AND provider_account_id = ?"
    ))
    .bind(provider)
    .bind(provider_account_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn set_role(pool: &SqlitePool, id: &str, role: i64) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE users SET role = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
    )
    .bind(role)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// 시작 시 설정된 계정을 활성 사용자로 등록합니다. 여러 번 실행해도 결과는 같습니다.
pub async fn seed_active_user(
    pool: &SqlitePool,
    provider: &str,
    provider_account_id: &str,
) -> Result<User, AppError> {
    let user = match find_by_provider_account(pool, provider, provider_account_id).await? {
        Some(user) => user,
        None => upsert_user(pool, provider, provider_account_id, &Profile::default()).await?,
    };
    set_role(pool, &user.id, ACTIVE_ROLE).await?;

    find_by_id(pool, &user.id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve seeded user".to_string()))
}
