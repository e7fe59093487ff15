use crate::error::AppError;
use crate::models::{UserSettings, ViewMode};
use sqlx::SqlitePool;

/// 저장된 설정이 없으면 기본값을 돌려줍니다.
pub async fn get_settings(pool: &SqlitePool, user_id: &str) -> Result<UserSettings, AppError> {
    let row: Option<(i64, String, bool, bool)> = sqlx::query_as(
        r#"
        SELECT items_per_page, default_view, auto_summary, notifications
        FROM user_settings WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row
        .map(
            |(items_per_page, default_view, auto_summary, notifications)| UserSettings {
                items_per_page,
                default_view: ViewMode::from_db(&default_view),
                auto_summary,
                notifications,
            },
        )
        .unwrap_or_default())
}

pub async fn upsert_settings(
    pool: &SqlitePool,
    user_id: &str,
    settings: &UserSettings,
) -> Result<UserSettings, AppError> {
    sqlx::query(
        r#"
        INSERT INTO user_settings
            (user_id, items_per_page, default_view, auto_summary, notifications)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            items_per_page = excluded.items_per_page,
            default_view = excluded.default_view,
            auto_summary = excluded.auto_summary,
            notifications = excluded.notifications,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(user_id)
    .bind(settings.items_per_page)
    .bind(settings.default_view.as_str())
    .bind(settings.auto_summary)
    .bind(settings.notifications)
    .execute(pool)
    .await?;

    get_settings(pool, user_id).await
}
