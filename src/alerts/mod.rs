//! Background alert engine: four rule evaluators driven by an hourly loop,
//! writing day-deduplicated rows into the notification table.

mod appointment_reminder;
mod dedup;
mod low_stock;
mod payment_due;
pub mod scheduler;
pub mod store;
mod supplier_subscription;

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;

use crate::alerts::scheduler::RepeatingTask;
use crate::alerts::store::NewNotification;

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

const CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Start the engine: one full pass immediately, then another one hour after
/// each pass completes, for the life of the process unless the returned
/// handle is stopped.
pub fn start(db: PgPool) -> RepeatingTask {
    RepeatingTask::spawn(CHECK_INTERVAL, move || {
        let db = db.clone();
        async move { run_all_checks(&db).await }
    })
}

/// One evaluation cycle. Evaluators run sequentially in fixed order; a
/// failing evaluator is logged and the cycle moves on to the next one, so a
/// cycle always completes and the loop always re-arms.
pub async fn run_all_checks(db: &PgPool) {
    tracing::debug!("alert cycle starting");
    run_one("low_stock", low_stock::run(db)).await;
    run_one("supplier_subscription", supplier_subscription::run(db)).await;
    run_one("payment_due", payment_due::run(db)).await;
    run_one("appointment_reminder", appointment_reminder::run(db)).await;
}

async fn run_one<F>(name: &str, pass: F)
where
    F: Future<Output = Result<u32, AlertError>>,
{
    match pass.await {
        Ok(0) => tracing::debug!("{name}: nothing to report"),
        Ok(n) => tracing::info!("{name}: created {n} notification(s)"),
        Err(e) => tracing::error!("{name}: pass abandoned: {e}"),
    }
}

/// Dedup-gated insert shared by the evaluators. Returns true when a row was
/// actually written, false when today's alert for this entity already exists.
async fn notify_once(db: &PgPool, n: &NewNotification) -> Result<bool, AlertError> {
    if dedup::already_notified_today(db, &n.alert).await? {
        return Ok(false);
    }
    store::insert(db, n).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::models::{AlertRef, NotificationKind};

    /// The decision half of one cycle over in-memory rows, with the dedup
    /// gate played by a (kind, related_id) set standing in for "already
    /// notified today".
    fn decide_cycle(
        meds: &[low_stock::MedicationRow],
        suppliers: &[supplier_subscription::SupplierRow],
        payments: &[payment_due::PendingPaymentRow],
        appointments: &[appointment_reminder::ReminderRow],
        today: NaiveDate,
        already_notified: &mut HashSet<AlertRef>,
    ) -> Vec<NewNotification> {
        let mut candidates: Vec<NewNotification> = Vec::new();
        candidates.extend(meds.iter().map(low_stock::build_alert));
        candidates.extend(
            suppliers
                .iter()
                .filter_map(|s| supplier_subscription::build_alert(s, today)),
        );
        candidates.extend(payments.iter().map(|p| payment_due::build_alert(p, today)));
        candidates.extend(
            appointments
                .iter()
                .filter_map(appointment_reminder::build_alert),
        );

        candidates
            .into_iter()
            .filter(|n| already_notified.insert(n.alert))
            .collect()
    }

    #[test]
    fn full_cycle_yields_four_alerts_then_none() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        let meds = vec![low_stock::MedicationRow {
            medication_id: 1,
            name: "Lidocaine".into(),
            unit: "vial".into(),
            quantity_in_stock: 5,
            minimum_quantity: 10,
        }];
        let suppliers = vec![supplier_subscription::SupplierRow {
            supplier_id: 2,
            name: "DentSupply".into(),
            subscription_end_date: today + Duration::days(10),
        }];
        let payments = vec![payment_due::PendingPaymentRow {
            payment_id: 3,
            amount_cents: 10_000,
            payment_date: today + Duration::days(2),
            p_first: Some("Bat".into()),
            p_last: Some("Erdene".into()),
        }];
        let appointments = vec![appointment_reminder::ReminderRow {
            appointment_id: 4,
            start_at: Utc.with_ymd_and_hms(2026, 3, 11, 9, 0, 0).unwrap(),
            patient_user_id: Some(42),
            d_first: "Sarnai".into(),
            d_last: "Ganbold".into(),
        }];

        let mut seen = HashSet::new();
        let first = decide_cycle(
            &meds,
            &suppliers,
            &payments,
            &appointments,
            today,
            &mut seen,
        );

        assert_eq!(first.len(), 4);
        let kinds: Vec<NotificationKind> = first.iter().map(|n| n.alert.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::LowStock,
                NotificationKind::SupplierSubscription,
                NotificationKind::PaymentDue,
                NotificationKind::AppointmentReminder,
            ]
        );
        // three broadcasts, one targeted reminder
        assert_eq!(first[0].user_id, None);
        assert_eq!(first[1].user_id, None);
        assert_eq!(first[2].user_id, None);
        assert_eq!(first[3].user_id, Some(42));

        // same day, same rows: everything dedups
        let second = decide_cycle(
            &meds,
            &suppliers,
            &payments,
            &appointments,
            today,
            &mut seen,
        );
        assert!(second.is_empty());
    }

    #[test]
    fn reminder_without_linked_account_never_falls_back_to_broadcast() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let appointments = vec![appointment_reminder::ReminderRow {
            appointment_id: 9,
            start_at: Utc.with_ymd_and_hms(2026, 3, 11, 14, 0, 0).unwrap(),
            patient_user_id: None,
            d_first: "Sarnai".into(),
            d_last: "Ganbold".into(),
        }];

        let mut seen = HashSet::new();
        let out = decide_cycle(&[], &[], &[], &appointments, today, &mut seen);
        assert!(out.is_empty());
        assert!(seen.is_empty(), "a skipped row must not consume its dedup slot");
    }
}
