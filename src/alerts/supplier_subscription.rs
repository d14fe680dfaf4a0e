// src/alerts/supplier_subscription.rs

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use super::AlertError;
use super::store::NewNotification;
use crate::models::AlertRef;

#[derive(Debug, sqlx::FromRow)]
pub(super) struct SupplierRow {
    pub(super) supplier_id: i64,
    pub(super) name: String,
    pub(super) subscription_end_date: NaiveDate,
}

/// Scan suppliers whose subscription has expired or expires within 30 days.
/// One broadcast alert per supplier per day, whichever band applies.
pub(super) async fn run(db: &PgPool) -> Result<u32, AlertError> {
    let rows = sqlx::query_as::<_, SupplierRow>(
        r#"
        SELECT supplier_id, name, subscription_end_date
        FROM supplier
        WHERE subscription_end_date IS NOT NULL
        ORDER BY supplier_id ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    let today = Utc::now().date_naive();
    let mut created = 0u32;
    for s in rows {
        let Some(n) = build_alert(&s, today) else {
            continue;
        };
        match super::notify_once(db, &n).await {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!("supplier_subscription: supplier {}: {e}", s.supplier_id),
        }
    }
    Ok(created)
}

/// Bands: expired (end date on or before today), expiring soon (1-30 days
/// out), otherwise no alert.
pub(super) fn build_alert(s: &SupplierRow, today: NaiveDate) -> Option<NewNotification> {
    let days_until_expiry = (s.subscription_end_date - today).num_days();
    let message = if days_until_expiry <= 0 {
        format!("The subscription with supplier {} has expired", s.name)
    } else if days_until_expiry <= 30 {
        format!(
            "The subscription with supplier {} expires in {} day(s)",
            s.name, days_until_expiry
        )
    } else {
        return None;
    };
    Some(NewNotification::broadcast(
        AlertRef::Supplier(s.supplier_id),
        "Supplier subscription alert",
        message,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn supplier(end: NaiveDate) -> SupplierRow {
        SupplierRow {
            supplier_id: 3,
            name: "DentSupply".into(),
            subscription_end_date: end,
        }
    }

    #[test]
    fn ended_yesterday_is_expired() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let n = build_alert(&supplier(today - Duration::days(1)), today).unwrap();
        assert!(n.message.contains("has expired"));
        assert_eq!(n.alert, AlertRef::Supplier(3));
        assert_eq!(n.user_id, None);
    }

    #[test]
    fn ending_today_is_expired() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let n = build_alert(&supplier(today), today).unwrap();
        assert!(n.message.contains("has expired"));
    }

    #[test]
    fn fifteen_days_out_is_expiring_soon() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let n = build_alert(&supplier(today + Duration::days(15)), today).unwrap();
        assert!(n.message.contains("expires in 15 day(s)"));
    }

    #[test]
    fn thirty_days_is_the_last_alerting_day() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert!(build_alert(&supplier(today + Duration::days(30)), today).is_some());
        assert!(build_alert(&supplier(today + Duration::days(31)), today).is_none());
    }

    #[test]
    fn forty_five_days_out_is_quiet() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert!(build_alert(&supplier(today + Duration::days(45)), today).is_none());
    }
}
