use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
}

/* -------------------------
   Notification domain
--------------------------*/

/// Notification kind stored as smallint in DB:
/// 0 general, 1 low_stock, 2 supplier_subscription, 3 payment_due, 4 appointment_reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "smallint")]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum NotificationKind {
    General = 0,
    LowStock = 1,
    SupplierSubscription = 2,
    PaymentDue = 3,
    AppointmentReminder = 4,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::General => "general",
            NotificationKind::LowStock => "low_stock",
            NotificationKind::SupplierSubscription => "supplier_subscription",
            NotificationKind::PaymentDue => "payment_due",
            NotificationKind::AppointmentReminder => "appointment_reminder",
        }
    }
}

/// What an alert points back at. The notification row stores this as a bare
/// (kind, related_id) pair; the id column means a different table per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertRef {
    Medication(i64),
    Supplier(i64),
    Payment(i64),
    Appointment(i64),
}

impl AlertRef {
    pub fn kind(&self) -> NotificationKind {
        match self {
            AlertRef::Medication(_) => NotificationKind::LowStock,
            AlertRef::Supplier(_) => NotificationKind::SupplierSubscription,
            AlertRef::Payment(_) => NotificationKind::PaymentDue,
            AlertRef::Appointment(_) => NotificationKind::AppointmentReminder,
        }
    }

    pub fn related_id(&self) -> i64 {
        match self {
            AlertRef::Medication(id)
            | AlertRef::Supplier(id)
            | AlertRef::Payment(id)
            | AlertRef::Appointment(id) => *id,
        }
    }
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationRow {
    pub notification_id: i64,
    pub user_id: Option<i64>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
