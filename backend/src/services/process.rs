//! Process and production action service
//!
//! Processes group actions and carry the reference volume their consumable
//! recipes were written for. Assigning an action to a process rescales its
//! consumables to the actual tank volume and books the stock consumption;
//! unassigning restores the original quantities exactly. Both run in one
//! transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{ActionType, CommodityType, Consumable};
use shared::scaling::{restore_consumables, scale_consumables, ScaledConsumable};
use shared::stock_check::{calculate_stock_consumption, MissingItem};
use shared::validation::validate_positive_volume;

use super::stock::load_stocks_tx;

/// Process service for managing processes, actions and their consumables
#[derive(Clone)]
pub struct ProcessService {
    db: PgPool,
}

/// Process record as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProcessRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub reference_volume_hl: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Action record as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActionRow {
    pub id: Uuid,
    pub tank_id: Uuid,
    pub process_id: Option<Uuid>,
    pub action_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Consumable record as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConsumableRow {
    pub id: Uuid,
    pub action_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub original_quantity: Option<Decimal>,
    pub commodity: String,
}

impl ConsumableRow {
    fn into_model(self) -> AppResult<Consumable> {
        Ok(Consumable {
            id: self.id,
            action_id: self.action_id,
            name: self.name,
            unit: self.unit,
            quantity: self.quantity,
            original_quantity: self.original_quantity,
            commodity: self
                .commodity
                .parse::<CommodityType>()
                .map_err(AppError::Internal)?,
        })
    }
}

/// Input for creating a process
#[derive(Debug, Deserialize)]
pub struct CreateProcessInput {
    pub name: String,
    pub reference_volume_hl: Decimal,
    pub description: Option<String>,
}

/// One consumable line in an action creation request
#[derive(Debug, Deserialize)]
pub struct ConsumableInput {
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub commodity: CommodityType,
}

/// Input for creating an action on a tank
#[derive(Debug, Deserialize)]
pub struct CreateActionInput {
    pub tank_id: Uuid,
    pub action_type: ActionType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
    #[serde(default)]
    pub consumables: Vec<ConsumableInput>,
}

/// Result of assigning an action to a process
#[derive(Debug, Serialize)]
pub struct AssignmentResult {
    pub action_id: Uuid,
    pub process_id: Uuid,
    /// Tank volume the recipe was scaled to, in hL
    pub target_volume_hl: Decimal,
    pub scaled_consumables: Vec<ScaledConsumable>,
    /// Requirements the stock could not fully cover
    pub out_of_stock: Vec<MissingItem>,
}

impl ProcessService {
    /// Create a new ProcessService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a process
    pub async fn create_process(
        &self,
        owner_id: Uuid,
        input: CreateProcessInput,
    ) -> AppResult<ProcessRow> {
        validate_positive_volume(input.reference_volume_hl).map_err(|msg| {
            AppError::Validation {
                field: "reference_volume_hl".to_string(),
                message: msg.to_string(),
                message_fr: "Le volume de référence doit être supérieur à 0".to_string(),
            }
        })?;

        let process = sqlx::query_as::<_, ProcessRow>(
            r#"
            INSERT INTO processes (owner_id, name, reference_volume_hl, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, reference_volume_hl, description, created_at
            "#,
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(input.reference_volume_hl)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(process)
    }

    /// Get a process by id
    pub async fn get_process(&self, owner_id: Uuid, process_id: Uuid) -> AppResult<ProcessRow> {
        sqlx::query_as::<_, ProcessRow>(
            r#"
            SELECT id, owner_id, name, reference_volume_hl, description, created_at
            FROM processes
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(process_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Process".to_string()))
    }

    /// List processes for an owner
    pub async fn list_processes(&self, owner_id: Uuid) -> AppResult<Vec<ProcessRow>> {
        let processes = sqlx::query_as::<_, ProcessRow>(
            r#"
            SELECT id, owner_id, name, reference_volume_hl, description, created_at
            FROM processes
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(processes)
    }

    /// Delete a process. Its actions are unassigned (originals restored)
    /// first.
    pub async fn delete_process(&self, owner_id: Uuid, process_id: Uuid) -> AppResult<()> {
        self.get_process(owner_id, process_id).await?;

        let mut tx = self.db.begin().await?;

        let action_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM actions WHERE process_id = $1",
        )
        .bind(process_id)
        .fetch_all(&mut *tx)
        .await?;

        for action_id in action_ids {
            self.restore_action_consumables(&mut tx, action_id).await?;
            sqlx::query("UPDATE actions SET process_id = NULL WHERE id = $1")
                .bind(action_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM processes WHERE id = $1 AND owner_id = $2")
            .bind(process_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Create an action on a tank, with its consumable lines
    pub async fn create_action(&self, owner_id: Uuid, input: CreateActionInput) -> AppResult<ActionRow> {
        if input.end_date < input.start_date {
            return Err(AppError::Validation {
                field: "end_date".to_string(),
                message: "End date cannot be before start date".to_string(),
                message_fr: "La date de fin ne peut pas précéder la date de début".to_string(),
            });
        }

        let tank_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tanks WHERE id = $1 AND owner_id = $2)",
        )
        .bind(input.tank_id)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;
        if !tank_exists {
            return Err(AppError::NotFound("Tank".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let action = sqlx::query_as::<_, ActionRow>(
            r#"
            INSERT INTO actions (tank_id, action_type, start_date, end_date, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, tank_id, process_id, action_type, start_date, end_date, notes, created_at
            "#,
        )
        .bind(input.tank_id)
        .bind(input.action_type.code())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for consumable in &input.consumables {
            if consumable.quantity <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "consumables".to_string(),
                    message: format!("Quantity for {} must be positive", consumable.name),
                    message_fr: format!(
                        "La quantité de {} doit être positive",
                        consumable.name
                    ),
                });
            }
            sqlx::query(
                r#"
                INSERT INTO consumables (action_id, name, unit, quantity, commodity)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(action.id)
            .bind(&consumable.name)
            .bind(&consumable.unit)
            .bind(consumable.quantity)
            .bind(consumable.commodity.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(action)
    }

    /// Get an action by id (ownership checked through its tank)
    pub async fn get_action(&self, owner_id: Uuid, action_id: Uuid) -> AppResult<ActionRow> {
        sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT a.id, a.tank_id, a.process_id, a.action_type, a.start_date, a.end_date,
                   a.notes, a.created_at
            FROM actions a
            JOIN tanks t ON t.id = a.tank_id
            WHERE a.id = $1 AND t.owner_id = $2
            "#,
        )
        .bind(action_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Action".to_string()))
    }

    /// List actions for a tank
    pub async fn list_actions_for_tank(
        &self,
        owner_id: Uuid,
        tank_id: Uuid,
    ) -> AppResult<Vec<ActionRow>> {
        let actions = sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT a.id, a.tank_id, a.process_id, a.action_type, a.start_date, a.end_date,
                   a.notes, a.created_at
            FROM actions a
            JOIN tanks t ON t.id = a.tank_id
            WHERE a.tank_id = $1 AND t.owner_id = $2
            ORDER BY a.start_date DESC, a.created_at DESC
            "#,
        )
        .bind(tank_id)
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(actions)
    }

    /// Consumable lines of an action
    pub async fn list_consumables(
        &self,
        owner_id: Uuid,
        action_id: Uuid,
    ) -> AppResult<Vec<ConsumableRow>> {
        self.get_action(owner_id, action_id).await?;

        let rows = sqlx::query_as::<_, ConsumableRow>(
            r#"
            SELECT id, action_id, name, unit, quantity, original_quantity, commodity
            FROM consumables
            WHERE action_id = $1
            ORDER BY name
            "#,
        )
        .bind(action_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Assign an action to a process.
    ///
    /// Scales the action's consumables from the process reference volume to
    /// the tank's composed volume, books the resulting stock consumption
    /// (creating zero-stock rows for never-seen consumables before
    /// decrementing), and links the action — all in one transaction. The
    /// consumption may leave stock negative; shortfalls are reported, not
    /// rejected.
    pub async fn assign_action_to_process(
        &self,
        owner_id: Uuid,
        action_id: Uuid,
        process_id: Uuid,
    ) -> AppResult<AssignmentResult> {
        let action = self.get_action(owner_id, action_id).await?;
        if action.process_id.is_some() {
            return Err(AppError::InvalidStateTransition(
                "Action is already assigned to a process".to_string(),
            ));
        }
        let process = self.get_process(owner_id, process_id).await?;

        let mut tx = self.db.begin().await?;

        // The recipe is scaled to the volume actually in the tank
        let target_volume_hl = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(volume_hl) FROM grape_compositions WHERE tank_id = $1",
        )
        .bind(action.tank_id)
        .fetch_one(&mut *tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        let consumables = self.load_consumables_tx(&mut tx, action_id).await?;
        let scaled = scale_consumables(&consumables, process.reference_volume_hl, target_volume_hl);

        for item in &scaled {
            sqlx::query(
                r#"
                UPDATE consumables
                SET quantity = $1, original_quantity = $2
                WHERE id = $3
                "#,
            )
            .bind(item.scaled_quantity)
            .bind(item.original_quantity)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
        }

        // Stock consumption is computed against the scaled requirements
        let requirements: Vec<Consumable> = consumables
            .iter()
            .zip(&scaled)
            .map(|(c, s)| Consumable {
                quantity: s.scaled_quantity,
                original_quantity: None,
                ..c.clone()
            })
            .collect();

        let stocks = load_stocks_tx(&mut tx, owner_id).await?;
        let proposal = calculate_stock_consumption(&requirements, &stocks);

        // Never-seen consumables get a zero-stock row first, flagged out of
        // stock, then the requirement is decremented from it.
        for unmatched in &proposal.unmatched {
            let stock_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO stocks (owner_id, name, unit, quantity, minimum_qty, is_out_of_stock)
                VALUES ($1, $2, $3, 0, 0, TRUE)
                RETURNING id
                "#,
            )
            .bind(owner_id)
            .bind(&unmatched.name)
            .bind(&unmatched.unit)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE stocks SET quantity = quantity - $1, updated_at = now() WHERE id = $2",
            )
            .bind(unmatched.required_quantity)
            .bind(stock_id)
            .execute(&mut *tx)
            .await?;
        }

        for update in &proposal.updates {
            sqlx::query(
                r#"
                UPDATE stocks
                SET quantity = $1, is_out_of_stock = ($1 <= minimum_qty), updated_at = now()
                WHERE id = $2
                "#,
            )
            .bind(update.new_quantity)
            .bind(update.stock_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE actions SET process_id = $1 WHERE id = $2")
            .bind(process_id)
            .bind(action_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if !proposal.out_of_stock.is_empty() {
            tracing::warn!(
                action_id = %action_id,
                shortfalls = proposal.out_of_stock.len(),
                "Action assigned with stock shortfalls"
            );
        }

        Ok(AssignmentResult {
            action_id,
            process_id,
            target_volume_hl,
            scaled_consumables: scaled,
            out_of_stock: proposal.out_of_stock,
        })
    }

    /// Unassign an action from its process, restoring original consumable
    /// quantities exactly
    pub async fn unassign_action(&self, owner_id: Uuid, action_id: Uuid) -> AppResult<ActionRow> {
        let action = self.get_action(owner_id, action_id).await?;
        if action.process_id.is_none() {
            return Err(AppError::InvalidStateTransition(
                "Action is not assigned to a process".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        self.restore_action_consumables(&mut tx, action_id).await?;

        sqlx::query("UPDATE actions SET process_id = NULL WHERE id = $1")
            .bind(action_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_action(owner_id, action_id).await
    }

    async fn restore_action_consumables(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        action_id: Uuid,
    ) -> AppResult<()> {
        let consumables = self.load_consumables_tx(tx, action_id).await?;

        for restored in restore_consumables(&consumables) {
            sqlx::query(
                r#"
                UPDATE consumables
                SET quantity = $1, original_quantity = NULL
                WHERE id = $2
                "#,
            )
            .bind(restored.quantity)
            .bind(restored.id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    async fn load_consumables_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        action_id: Uuid,
    ) -> AppResult<Vec<Consumable>> {
        let rows = sqlx::query_as::<_, ConsumableRow>(
            r#"
            SELECT id, action_id, name, unit, quantity, original_quantity, commodity
            FROM consumables
            WHERE action_id = $1
            ORDER BY name
            "#,
        )
        .bind(action_id)
        .fetch_all(&mut **tx)
        .await?;

        rows.into_iter().map(ConsumableRow::into_model).collect()
    }
}
