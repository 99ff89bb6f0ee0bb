//! Batch ("cuvée") management service
//!
//! Owns the `tank_batches` join table and exposes the allocation
//! calculations of the shared core over it. Every assign/release runs
//! inside one transaction so the read-compute-write sequence is atomic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::allocation::{
    calculate_allocation, suggest_optimal_allocation, AllocationSuggestion, BatchAllocation,
    TankAllocation,
};
use shared::error::DomainError;
use shared::models::Batch;
use shared::validation::validate_positive_volume;

use super::TankService;

/// Batch service for managing cuvées and their tank allocations
#[derive(Clone)]
pub struct BatchService {
    db: PgPool,
}

/// Batch record as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BatchRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub quantity_hl: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchRow {
    fn into_model(self) -> Batch {
        Batch {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            quantity_hl: self.quantity_hl,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating a batch
#[derive(Debug, Deserialize)]
pub struct CreateBatchInput {
    pub name: String,
    pub quantity_hl: Decimal,
    pub description: Option<String>,
}

/// Input for updating a batch
#[derive(Debug, Deserialize)]
pub struct UpdateBatchInput {
    pub name: Option<String>,
    pub quantity_hl: Option<Decimal>,
    pub description: Option<String>,
}

/// Input for assigning a tank allocation to a batch
#[derive(Debug, Deserialize)]
pub struct AssignTankInput {
    pub tank_id: Uuid,
    pub volume_hl: Decimal,
}

#[derive(Debug, FromRow)]
struct AllocationRow {
    tank_id: Uuid,
    tank_name: String,
    capacity_hl: Decimal,
    allocated_volume_hl: Decimal,
}

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a batch
    pub async fn create_batch(&self, owner_id: Uuid, input: CreateBatchInput) -> AppResult<BatchRow> {
        validate_positive_volume(input.quantity_hl).map_err(|msg| AppError::Validation {
            field: "quantity_hl".to_string(),
            message: msg.to_string(),
            message_fr: "Le volume de la cuvée doit être supérieur à 0".to_string(),
        })?;

        let batch = sqlx::query_as::<_, BatchRow>(
            r#"
            INSERT INTO batches (owner_id, name, quantity_hl, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, quantity_hl, description, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(input.quantity_hl)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(batch)
    }

    /// Get a batch by id
    pub async fn get_batch(&self, owner_id: Uuid, batch_id: Uuid) -> AppResult<BatchRow> {
        sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, owner_id, name, quantity_hl, description, created_at, updated_at
            FROM batches
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(batch_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))
    }

    /// List batches for an owner
    pub async fn list_batches(&self, owner_id: Uuid) -> AppResult<Vec<BatchRow>> {
        let batches = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, owner_id, name, quantity_hl, description, created_at, updated_at
            FROM batches
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(batches)
    }

    /// Update a batch
    pub async fn update_batch(
        &self,
        owner_id: Uuid,
        batch_id: Uuid,
        input: UpdateBatchInput,
    ) -> AppResult<BatchRow> {
        let existing = self.get_batch(owner_id, batch_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let quantity_hl = input.quantity_hl.unwrap_or(existing.quantity_hl);
        let description = input.description.or(existing.description);

        validate_positive_volume(quantity_hl).map_err(|msg| AppError::Validation {
            field: "quantity_hl".to_string(),
            message: msg.to_string(),
            message_fr: "Le volume de la cuvée doit être supérieur à 0".to_string(),
        })?;

        let batch = sqlx::query_as::<_, BatchRow>(
            r#"
            UPDATE batches
            SET name = $1, quantity_hl = $2, description = $3, updated_at = now()
            WHERE id = $4 AND owner_id = $5
            RETURNING id, owner_id, name, quantity_hl, description, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(quantity_hl)
        .bind(&description)
        .bind(batch_id)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;

        Ok(batch)
    }

    /// Delete a batch and release its tank allocations
    pub async fn delete_batch(&self, owner_id: Uuid, batch_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM tank_batches WHERE batch_id = $1")
            .bind(batch_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM batches WHERE id = $1 AND owner_id = $2")
            .bind(batch_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Batch".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Allocation summary for a batch: allocated, remaining, progress and
    /// per-tank utilization
    pub async fn get_allocation(&self, owner_id: Uuid, batch_id: Uuid) -> AppResult<BatchAllocation> {
        let batch = self.get_batch(owner_id, batch_id).await?.into_model();
        let allocations = self.load_allocations(batch_id).await?;
        Ok(calculate_allocation(&batch, &allocations))
    }

    /// Greedy placement suggestion for a batch's remaining volume
    pub async fn suggest_allocation(
        &self,
        owner_id: Uuid,
        batch_id: Uuid,
    ) -> AppResult<AllocationSuggestion> {
        let allocation = self.get_allocation(owner_id, batch_id).await?;
        let candidates = TankService::new(self.db.clone())
            .load_candidates(owner_id)
            .await?;
        Ok(suggest_optimal_allocation(
            allocation.remaining_volume_hl,
            &candidates,
        ))
    }

    /// Assign (or top up) a tank allocation for a batch.
    ///
    /// The read-compute-write sequence runs in one transaction: capacity and
    /// remaining-volume checks are made against rows read inside it.
    pub async fn assign_tank(
        &self,
        owner_id: Uuid,
        batch_id: Uuid,
        input: AssignTankInput,
    ) -> AppResult<BatchAllocation> {
        if input.volume_hl <= Decimal::ZERO {
            return Err(DomainError::NonPositiveVolume.into());
        }

        let batch = self.get_batch(owner_id, batch_id).await?.into_model();

        let mut tx = self.db.begin().await?;

        let capacity_hl = sqlx::query_scalar::<_, Decimal>(
            "SELECT capacity_hl FROM tanks WHERE id = $1 AND owner_id = $2",
        )
        .bind(input.tank_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Tank".to_string()))?;

        let tank_allocated = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(allocated_volume_hl) FROM tank_batches WHERE tank_id = $1",
        )
        .bind(input.tank_id)
        .fetch_one(&mut *tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        let available_hl = capacity_hl - tank_allocated;
        if input.volume_hl > available_hl {
            return Err(DomainError::ExceedsTankCapacity { available_hl }.into());
        }

        let batch_allocated = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(allocated_volume_hl) FROM tank_batches WHERE batch_id = $1",
        )
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        let remaining_hl = (batch.quantity_hl - batch_allocated).max(Decimal::ZERO);
        if input.volume_hl > remaining_hl {
            return Err(DomainError::ExceedsBatchRemaining { remaining_hl }.into());
        }

        sqlx::query(
            r#"
            INSERT INTO tank_batches (tank_id, batch_id, allocated_volume_hl)
            VALUES ($1, $2, $3)
            ON CONFLICT (tank_id, batch_id)
            DO UPDATE SET allocated_volume_hl = tank_batches.allocated_volume_hl + $3
            "#,
        )
        .bind(input.tank_id)
        .bind(batch_id)
        .bind(input.volume_hl)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE tanks SET status = 'in_use', updated_at = now() WHERE id = $1 AND status = 'empty'")
            .bind(input.tank_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_allocation(owner_id, batch_id).await
    }

    /// Release a batch's allocation in a tank
    pub async fn release_tank(
        &self,
        owner_id: Uuid,
        batch_id: Uuid,
        tank_id: Uuid,
    ) -> AppResult<BatchAllocation> {
        // Ownership check before touching the join table
        self.get_batch(owner_id, batch_id).await?;

        let mut tx = self.db.begin().await?;

        let result = sqlx::query("DELETE FROM tank_batches WHERE tank_id = $1 AND batch_id = $2")
            .bind(tank_id)
            .bind(batch_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tank allocation".to_string()));
        }

        // Tank reverts to empty when nothing is left in it
        sqlx::query(
            r#"
            UPDATE tanks SET status = 'empty', updated_at = now()
            WHERE id = $1 AND status = 'in_use'
              AND NOT EXISTS (SELECT 1 FROM tank_batches WHERE tank_id = $1)
              AND NOT EXISTS (SELECT 1 FROM grape_compositions WHERE tank_id = $1)
            "#,
        )
        .bind(tank_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_allocation(owner_id, batch_id).await
    }

    async fn load_allocations(&self, batch_id: Uuid) -> AppResult<Vec<TankAllocation>> {
        let rows = sqlx::query_as::<_, AllocationRow>(
            r#"
            SELECT tb.tank_id, t.name AS tank_name, t.capacity_hl, tb.allocated_volume_hl
            FROM tank_batches tb
            JOIN tanks t ON t.id = tb.tank_id
            WHERE tb.batch_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TankAllocation {
                tank_id: r.tank_id,
                tank_name: r.tank_name,
                capacity_hl: r.capacity_hl,
                allocated_volume_hl: r.allocated_volume_hl,
            })
            .collect())
    }
}
