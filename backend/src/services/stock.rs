//! Stock management service
//!
//! Stock rows track signed quantities per (name, unit); negative quantities
//! record shortfalls already incurred by process assignments. The
//! out-of-stock flag follows `quantity <= minimum_qty` on every write,
//! except on zero-stock rows created for never-seen consumables, where it is
//! forced true at creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::MailerClient;
use shared::models::Stock;

/// Stock service for managing consumable inventory
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Stock record as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub minimum_qty: Decimal,
    pub is_out_of_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockRow {
    fn into_model(self) -> Stock {
        Stock {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            unit: self.unit,
            quantity: self.quantity,
            minimum_qty: self.minimum_qty,
            is_out_of_stock: self.is_out_of_stock,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating a stock row
#[derive(Debug, Deserialize)]
pub struct CreateStockInput {
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub minimum_qty: Decimal,
}

/// Input for updating a stock row
#[derive(Debug, Deserialize)]
pub struct UpdateStockInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub minimum_qty: Option<Decimal>,
}

/// Load all of an owner's stock rows inside an open transaction
pub(crate) async fn load_stocks_tx(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
) -> AppResult<Vec<Stock>> {
    let rows = sqlx::query_as::<_, StockRow>(
        r#"
        SELECT id, owner_id, name, unit, quantity, minimum_qty, is_out_of_stock,
               created_at, updated_at
        FROM stocks
        WHERE owner_id = $1
        ORDER BY name, unit
        "#,
    )
    .bind(owner_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().map(StockRow::into_model).collect())
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a stock row. The (name, unit) pair is unique per owner,
    /// case-insensitively.
    pub async fn create_stock(&self, owner_id: Uuid, input: CreateStockInput) -> AppResult<StockRow> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
                message_fr: "Le nom est obligatoire".to_string(),
            });
        }

        let duplicate = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM stocks
                WHERE owner_id = $1 AND lower(name) = lower($2) AND lower(unit) = lower($3)
            )
            "#,
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(&input.unit)
        .fetch_one(&self.db)
        .await?;

        if duplicate {
            return Err(AppError::DuplicateEntry(format!(
                "Stock for {} ({}) already exists",
                input.name, input.unit
            )));
        }

        let stock = sqlx::query_as::<_, StockRow>(
            r#"
            INSERT INTO stocks (owner_id, name, unit, quantity, minimum_qty, is_out_of_stock)
            VALUES ($1, $2, $3, $4, $5, $4 <= $5)
            RETURNING id, owner_id, name, unit, quantity, minimum_qty, is_out_of_stock,
                      created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.quantity)
        .bind(input.minimum_qty)
        .fetch_one(&self.db)
        .await?;

        Ok(stock)
    }

    /// Get a stock row by id
    pub async fn get_stock(&self, owner_id: Uuid, stock_id: Uuid) -> AppResult<StockRow> {
        sqlx::query_as::<_, StockRow>(
            r#"
            SELECT id, owner_id, name, unit, quantity, minimum_qty, is_out_of_stock,
                   created_at, updated_at
            FROM stocks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(stock_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))
    }

    /// List stock rows for an owner
    pub async fn list_stocks(&self, owner_id: Uuid) -> AppResult<Vec<StockRow>> {
        let stocks = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT id, owner_id, name, unit, quantity, minimum_qty, is_out_of_stock,
                   created_at, updated_at
            FROM stocks
            WHERE owner_id = $1
            ORDER BY name, unit
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(stocks)
    }

    /// List stock rows currently flagged out of stock
    pub async fn list_out_of_stock(&self, owner_id: Uuid) -> AppResult<Vec<StockRow>> {
        let stocks = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT id, owner_id, name, unit, quantity, minimum_qty, is_out_of_stock,
                   created_at, updated_at
            FROM stocks
            WHERE owner_id = $1 AND is_out_of_stock = TRUE
            ORDER BY name, unit
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(stocks)
    }

    /// Update a stock row, recomputing the out-of-stock flag
    pub async fn update_stock(
        &self,
        owner_id: Uuid,
        stock_id: Uuid,
        input: UpdateStockInput,
    ) -> AppResult<StockRow> {
        let existing = self.get_stock(owner_id, stock_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let unit = input.unit.unwrap_or(existing.unit);
        let quantity = input.quantity.unwrap_or(existing.quantity);
        let minimum_qty = input.minimum_qty.unwrap_or(existing.minimum_qty);

        let stock = sqlx::query_as::<_, StockRow>(
            r#"
            UPDATE stocks
            SET name = $1, unit = $2, quantity = $3, minimum_qty = $4,
                is_out_of_stock = ($3 <= $4), updated_at = now()
            WHERE id = $5 AND owner_id = $6
            RETURNING id, owner_id, name, unit, quantity, minimum_qty, is_out_of_stock,
                      created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&unit)
        .bind(quantity)
        .bind(minimum_qty)
        .bind(stock_id)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;

        Ok(stock)
    }

    /// Delete a stock row
    pub async fn delete_stock(&self, owner_id: Uuid, stock_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM stocks WHERE id = $1 AND owner_id = $2")
            .bind(stock_id)
            .bind(owner_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock".to_string()));
        }

        Ok(())
    }

    /// Email a low-stock alert for every row currently flagged out of stock.
    /// Returns the number of lines reported; sends nothing when all is well.
    pub async fn send_low_stock_alert(
        &self,
        owner_id: Uuid,
        mailer: &MailerClient,
        recipient: &str,
    ) -> AppResult<usize> {
        let low = self.list_out_of_stock(owner_id).await?;
        if low.is_empty() {
            return Ok(0);
        }

        let lines: Vec<(String, String, Decimal)> = low
            .iter()
            .map(|s| (s.name.clone(), s.unit.clone(), s.quantity))
            .collect();

        mailer.send_low_stock_alert(recipient, &lines).await?;

        tracing::info!(owner_id = %owner_id, items = lines.len(), "Low stock alert sent");
        Ok(lines.len())
    }
}
