// src/alerts/payment_due.rs

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;

use super::AlertError;
use super::store::NewNotification;
use crate::models::AlertRef;

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PendingPaymentRow {
    pub(super) payment_id: i64,
    pub(super) amount_cents: i64,
    pub(super) payment_date: NaiveDate,
    pub(super) p_first: Option<String>,
    pub(super) p_last: Option<String>,
}

/// Scan pending payments due within the next 7 days (or already past due).
/// One broadcast alert per payment per day.
pub(super) async fn run(db: &PgPool) -> Result<u32, AlertError> {
    let today = Utc::now().date_naive();

    let rows = sqlx::query_as::<_, PendingPaymentRow>(
        r#"
        SELECT
          pay.payment_id,
          pay.amount_cents,
          pay.payment_date,
          p.first_name AS p_first,
          p.last_name  AS p_last
        FROM payment pay
        LEFT JOIN patient p ON p.patient_id = pay.patient_id
        WHERE pay.status = 0 -- pending
          AND pay.payment_date <= $1
        ORDER BY pay.payment_date ASC, pay.payment_id ASC
        "#,
    )
    .bind(today + Duration::days(7))
    .fetch_all(db)
    .await?;

    let mut created = 0u32;
    for pay in rows {
        let n = build_alert(&pay, today);
        match super::notify_once(db, &n).await {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!("payment_due: payment {}: {e}", pay.payment_id),
        }
    }
    Ok(created)
}

pub(super) fn build_alert(pay: &PendingPaymentRow, today: NaiveDate) -> NewNotification {
    let patient = match (&pay.p_first, &pay.p_last) {
        (Some(f), Some(l)) => format!("{f} {l}"),
        _ => "an unknown patient".to_string(),
    };
    let amount = format_amount(pay.amount_cents);
    let days_until_due = (pay.payment_date - today).num_days();

    let message = if days_until_due <= 0 {
        format!("Payment of {amount} from {patient} is overdue")
    } else {
        format!("Payment of {amount} from {patient} is due in {days_until_due} day(s)")
    };
    NewNotification::broadcast(AlertRef::Payment(pay.payment_id), "Payment due", message)
}

fn format_amount(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}
