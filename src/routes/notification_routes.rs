// src/routes/notification_routes.rs

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::{AppState, NotificationKind, NotificationRow},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread_count", get(unread_count))
        .route("/notifications/{notification_id}/read", post(mark_read))
        .route("/notifications/read_all", post(mark_all_read))
}

/* ============================================================
   Response DTOs
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountDto {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdatedDto {
    pub updated: u64,
}

/* ============================================================
   Query params
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Targeted rows for this user plus broadcasts; omit for everything.
    pub user_id: Option<i64>,
    pub kind: Option<NotificationKind>,
    /// true = unread rows only, false = read rows only.
    pub unread: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RecipientQuery {
    pub user_id: Option<i64>,
}

/* ============================================================
   GET /notifications
   ============================================================ */

pub async fn list_notifications(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiOk<Vec<NotificationRow>>>, ApiError> {
    let limit = q.limit.unwrap_or(50);
    if !(1..=200).contains(&limit) {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "limit must be between 1 and 200".into(),
        ));
    }
    let offset = q.offset.unwrap_or(0);
    if offset < 0 {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "offset must be >= 0".into(),
        ));
    }

    let rows = sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT notification_id, user_id, kind, title, message, related_id, is_read, created_at
        FROM notification
        WHERE ($1::bigint   IS NULL OR user_id = $1 OR user_id IS NULL)
          AND ($2::smallint IS NULL OR kind = $2)
          AND ($3::boolean  IS NULL OR is_read = (NOT $3))
        ORDER BY created_at DESC, notification_id DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(q.user_id)
    .bind(q.kind)
    .bind(q.unread)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiOk { data: rows }))
}

/* ============================================================
   GET /notifications/unread_count
   ============================================================ */

pub async fn unread_count(
    State(state): State<AppState>,
    Query(q): Query<RecipientQuery>,
) -> Result<Json<ApiOk<UnreadCountDto>>, ApiError> {
    let unread: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM notification
        WHERE is_read = false
          AND ($1::bigint IS NULL OR user_id = $1 OR user_id IS NULL)
        "#,
    )
    .bind(q.user_id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiOk {
        data: UnreadCountDto { unread },
    }))
}

/* ============================================================
   POST /notifications/{id}/read
   ============================================================ */

pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> Result<Json<ApiOk<NotificationRow>>, ApiError> {
    let row = sqlx::query_as::<_, NotificationRow>(
        r#"
        UPDATE notification
        SET is_read = true
        WHERE notification_id = $1
        RETURNING notification_id, user_id, kind, title, message, related_id, is_read, created_at
        "#,
    )
    .bind(notification_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?;

    let Some(row) = row else {
        return Err(ApiError::NotFound(
            "NOT_FOUND",
            "notification not found".into(),
        ));
    };

    Ok(Json(ApiOk { data: row }))
}

/* ============================================================
   POST /notifications/read_all
   ============================================================ */

pub async fn mark_all_read(
    State(state): State<AppState>,
    Query(q): Query<RecipientQuery>,
) -> Result<Json<ApiOk<UpdatedDto>>, ApiError> {
    let result = sqlx::query(
        r#"
        UPDATE notification
        SET is_read = true
        WHERE is_read = false
          AND ($1::bigint IS NULL OR user_id = $1 OR user_id IS NULL)
        "#,
    )
    .bind(q.user_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiOk {
        data: UpdatedDto {
            updated: result.rows_affected(),
        },
    }))
}
