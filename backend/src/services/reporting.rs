//! Reporting service
//!
//! CSV exports of stock levels and tank action history.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Reporting service producing CSV exports
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct StockExportRow {
    name: String,
    unit: String,
    quantity: Decimal,
    minimum_qty: Decimal,
    is_out_of_stock: bool,
}

#[derive(Debug, FromRow)]
struct ActionExportRow {
    tank_name: String,
    action_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    process_name: Option<String>,
    notes: Option<String>,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Export the owner's stock as CSV
    pub async fn export_stock_csv(&self, owner_id: Uuid) -> AppResult<String> {
        let rows = sqlx::query_as::<_, StockExportRow>(
            r#"
            SELECT name, unit, quantity, minimum_qty, is_out_of_stock
            FROM stocks
            WHERE owner_id = $1
            ORDER BY name, unit
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["name", "unit", "quantity", "minimum_qty", "out_of_stock"])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;

        for row in rows {
            writer
                .write_record([
                    row.name,
                    row.unit,
                    row.quantity.to_string(),
                    row.minimum_qty.to_string(),
                    row.is_out_of_stock.to_string(),
                ])
                .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding: {}", e)))
    }

    /// Export the owner's action history as CSV, most recent first
    pub async fn export_actions_csv(&self, owner_id: Uuid) -> AppResult<String> {
        let rows = sqlx::query_as::<_, ActionExportRow>(
            r#"
            SELECT t.name AS tank_name, a.action_type, a.start_date, a.end_date,
                   p.name AS process_name, a.notes
            FROM actions a
            JOIN tanks t ON t.id = a.tank_id
            LEFT JOIN processes p ON p.id = a.process_id
            WHERE t.owner_id = $1
            ORDER BY a.start_date DESC, a.created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "tank",
                "action_type",
                "start_date",
                "end_date",
                "process",
                "notes",
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;

        for row in rows {
            writer
                .write_record([
                    row.tank_name,
                    row.action_type,
                    row.start_date.to_string(),
                    row.end_date.to_string(),
                    row.process_name.unwrap_or_default(),
                    row.notes.unwrap_or_default(),
                ])
                .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding: {}", e)))
    }
}
