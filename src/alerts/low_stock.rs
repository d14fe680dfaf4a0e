// src/alerts/low_stock.rs

use sqlx::PgPool;

use super::AlertError;
use super::store::NewNotification;
use crate::models::AlertRef;

#[derive(Debug, sqlx::FromRow)]
pub(super) struct MedicationRow {
    pub(super) medication_id: i64,
    pub(super) name: String,
    pub(super) unit: String,
    pub(super) quantity_in_stock: i32,
    pub(super) minimum_quantity: i32,
}

/// Scan medications at or below their minimum and raise one broadcast alert
/// per medication per day. Returns the number of notifications created.
pub(super) async fn run(db: &PgPool) -> Result<u32, AlertError> {
    let rows = sqlx::query_as::<_, MedicationRow>(
        r#"
        SELECT medication_id, name, unit, quantity_in_stock, minimum_quantity
        FROM medication
        WHERE quantity_in_stock <= minimum_quantity
        ORDER BY medication_id ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    let mut created = 0u32;
    for m in rows {
        let n = build_alert(&m);
        // one bad row must not stop the rest of the scan
        match super::notify_once(db, &n).await {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!("low_stock: medication {}: {e}", m.medication_id),
        }
    }
    Ok(created)
}

pub(super) fn build_alert(m: &MedicationRow) -> NewNotification {
    NewNotification::broadcast(
        AlertRef::Medication(m.medication_id),
        "Low stock alert",
        format!(
            "{} is low on stock: {} {} remaining (minimum {})",
            m.name, m.quantity_in_stock, m.unit, m.minimum_quantity
        ),
    )
}
