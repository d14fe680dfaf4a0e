use sqlx::PgPool;

use crate::models::AlertRef;

/// True when a notification for the same (kind, related_id) pair was already
/// created on the current calendar day. Day granularity on the database
/// server's date, not a rolling 24h window. Read-only: there is no unique
/// constraint backing this, so a concurrent cycle racing the timer can still
/// write a benign same-day duplicate between this check and the insert.
pub async fn already_notified_today(db: &PgPool, alert: &AlertRef) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
          SELECT 1
          FROM notification
          WHERE kind = $1
            AND related_id = $2
            AND created_at::date = CURRENT_DATE
        )
        "#,
    )
    .bind(alert.kind())
    .bind(alert.related_id())
    .fetch_one(db)
    .await?;
    Ok(exists)
}
