// src/alerts/appointment_reminder.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use super::AlertError;
use super::store::NewNotification;
use crate::models::AlertRef;

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ReminderRow {
    pub(super) appointment_id: i64,
    pub(super) start_at: DateTime<Utc>,
    pub(super) patient_user_id: Option<i64>,
    pub(super) d_first: String,
    pub(super) d_last: String,
}

/// Scan scheduled/confirmed appointments falling exactly one day ahead and
/// remind the patient. Unlike the other evaluators this one is targeted:
/// patients without a linked user account are skipped, never broadcast to.
pub(super) async fn run(db: &PgPool) -> Result<u32, AlertError> {
    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let start_ts =
        DateTime::<Utc>::from_naive_utc_and_offset(tomorrow.and_hms_opt(0, 0, 0).unwrap(), Utc);
    let end_ts = start_ts + Duration::days(1);

    let rows = sqlx::query_as::<_, ReminderRow>(
        r#"
        SELECT
          a.appointment_id,
          a.start_at,
          p.user_id AS patient_user_id,
          d.first_name AS d_first,
          d.last_name  AS d_last
        FROM appointment a
        JOIN patient p ON p.patient_id = a.patient_id
        JOIN employee d ON d.employee_id = a.doctor_employee_id
        WHERE a.status IN (0, 1) -- scheduled, confirmed
          AND a.start_at >= $1
          AND a.start_at <  $2
        ORDER BY a.start_at ASC
        "#,
    )
    .bind(start_ts)
    .bind(end_ts)
    .fetch_all(db)
    .await?;

    let mut created = 0u32;
    for a in rows {
        let Some(n) = build_alert(&a) else {
            continue;
        };
        match super::notify_once(db, &n).await {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!("appointment_reminder: appointment {}: {e}", a.appointment_id),
        }
    }
    Ok(created)
}

pub(super) fn build_alert(a: &ReminderRow) -> Option<NewNotification> {
    let user_id = a.patient_user_id?;
    Some(NewNotification::for_user(
        AlertRef::Appointment(a.appointment_id),
        user_id,
        "Appointment reminder",
        format!(
            "You have an appointment with Dr. {} {} on {}",
            a.d_first,
            a.d_last,
            a.start_at.format("%Y-%m-%d at %H:%M")
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn appointment(patient_user_id: Option<i64>) -> ReminderRow {
        ReminderRow {
            appointment_id: 4,
            start_at: Utc.with_ymd_and_hms(2026, 3, 11, 9, 30, 0).unwrap(),
            patient_user_id,
            d_first: "Sarnai".into(),
            d_last: "Ganbold".into(),
        }
    }

    #[test]
    fn patient_without_account_is_skipped() {
        assert!(build_alert(&appointment(None)).is_none());
    }

    #[test]
    fn patient_with_account_gets_a_targeted_reminder() {
        let n = build_alert(&appointment(Some(42))).unwrap();
        assert_eq!(n.user_id, Some(42));
        assert_eq!(n.alert, AlertRef::Appointment(4));
        assert!(n.message.contains("Dr. Sarnai Ganbold"));
        assert!(n.message.contains("2026-03-11 at 09:30"));
    }
}
