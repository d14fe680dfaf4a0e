use sqlx::PgPool;

use crate::models::AlertRef;

/// A notification about to be written. `user_id = None` is a broadcast row
/// visible to every dashboard user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub alert: AlertRef,
    pub title: String,
    pub message: String,
    pub user_id: Option<i64>,
}

impl NewNotification {
    pub fn broadcast(
        alert: AlertRef,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            alert,
            title: title.into(),
            message: message.into(),
            user_id: None,
        }
    }

    pub fn for_user(
        alert: AlertRef,
        user_id: i64,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            alert,
            title: title.into(),
            message: message.into(),
            user_id: Some(user_id),
        }
    }
}

/// Append one row to the notification table. `is_read` and `created_at`
/// take their column defaults (false / now()).
pub async fn insert(db: &PgPool, n: &NewNotification) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO notification (user_id, kind, title, message, related_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(n.user_id)
    .bind(n.alert.kind())
    .bind(&n.title)
    .bind(&n.message)
    .bind(n.alert.related_id())
    .execute(db)
    .await?;
    Ok(())
}
