//! Tank management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::allocation::{find_available_tanks, CandidateTank, TankFillPolicy};
use shared::models::{TankMaterial, TankStatus};
use shared::validation::validate_tank_capacity;

/// Tank service for managing vinification tanks
#[derive(Clone)]
pub struct TankService {
    db: PgPool,
}

/// Tank record as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TankRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub capacity_hl: Decimal,
    pub status: String,
    pub material: String,
    pub allocation_mode: String,
    pub batch_id: Option<Uuid>,
    pub allocated_volume_hl: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tank with derived allocation figures for list views
#[derive(Debug, Clone, Serialize)]
pub struct TankSummary {
    #[serde(flatten)]
    pub tank: TankRow,
    /// Sum of batch allocations currently claiming this tank, in hL
    pub allocated_hl: Decimal,
    pub available_capacity_hl: Decimal,
}

/// Input for creating a tank
#[derive(Debug, Deserialize)]
pub struct CreateTankInput {
    pub name: String,
    pub capacity_hl: Decimal,
    pub material: TankMaterial,
}

/// Input for updating a tank
#[derive(Debug, Deserialize)]
pub struct UpdateTankInput {
    pub name: Option<String>,
    pub capacity_hl: Option<Decimal>,
    pub material: Option<TankMaterial>,
    pub status: Option<TankStatus>,
}

#[derive(Debug, FromRow)]
struct CandidateRow {
    id: Uuid,
    name: String,
    capacity_hl: Decimal,
    allocated_hl: Decimal,
    batch_id: Option<Uuid>,
}

impl TankService {
    /// Create a new TankService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a tank
    pub async fn create_tank(&self, owner_id: Uuid, input: CreateTankInput) -> AppResult<TankRow> {
        validate_tank_capacity(input.capacity_hl).map_err(|msg| AppError::Validation {
            field: "capacity_hl".to_string(),
            message: msg.to_string(),
            message_fr: "La capacité de la cuve doit être supérieure à 0".to_string(),
        })?;

        let tank = sqlx::query_as::<_, TankRow>(
            r#"
            INSERT INTO tanks (owner_id, name, capacity_hl, status, material, allocation_mode)
            VALUES ($1, $2, $3, 'empty', $4, 'multi')
            RETURNING id, owner_id, name, capacity_hl, status, material, allocation_mode,
                      batch_id, allocated_volume_hl, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(input.capacity_hl)
        .bind(input.material.code())
        .fetch_one(&self.db)
        .await?;

        Ok(tank)
    }

    /// Get a tank by id
    pub async fn get_tank(&self, owner_id: Uuid, tank_id: Uuid) -> AppResult<TankRow> {
        sqlx::query_as::<_, TankRow>(
            r#"
            SELECT id, owner_id, name, capacity_hl, status, material, allocation_mode,
                   batch_id, allocated_volume_hl, created_at, updated_at
            FROM tanks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(tank_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tank".to_string()))
    }

    /// List tanks with derived allocation figures
    pub async fn list_tanks(&self, owner_id: Uuid) -> AppResult<Vec<TankSummary>> {
        let rows = sqlx::query_as::<_, TankRow>(
            r#"
            SELECT id, owner_id, name, capacity_hl, status, material, allocation_mode,
                   batch_id, allocated_volume_hl, created_at, updated_at
            FROM tanks
            WHERE owner_id = $1
            ORDER BY name
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for tank in rows {
            let allocated_hl = sqlx::query_scalar::<_, Option<Decimal>>(
                "SELECT SUM(allocated_volume_hl) FROM tank_batches WHERE tank_id = $1",
            )
            .bind(tank.id)
            .fetch_one(&self.db)
            .await?
            .unwrap_or(Decimal::ZERO);

            let available_capacity_hl = (tank.capacity_hl - allocated_hl).max(Decimal::ZERO);
            summaries.push(TankSummary {
                tank,
                allocated_hl,
                available_capacity_hl,
            });
        }

        Ok(summaries)
    }

    /// Update a tank
    pub async fn update_tank(
        &self,
        owner_id: Uuid,
        tank_id: Uuid,
        input: UpdateTankInput,
    ) -> AppResult<TankRow> {
        let existing = self.get_tank(owner_id, tank_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let capacity_hl = input.capacity_hl.unwrap_or(existing.capacity_hl);
        let material = input
            .material
            .map(|m| m.code())
            .unwrap_or(existing.material);
        let status = input
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(existing.status.clone());

        validate_tank_capacity(capacity_hl).map_err(|msg| AppError::Validation {
            field: "capacity_hl".to_string(),
            message: msg.to_string(),
            message_fr: "La capacité de la cuve doit être supérieure à 0".to_string(),
        })?;

        // A tank holding classified wine cannot be declared empty
        if status == TankStatus::Empty.as_str() && existing.status != status {
            let composed = sqlx::query_scalar::<_, Option<Decimal>>(
                "SELECT SUM(volume_hl) FROM grape_compositions WHERE tank_id = $1",
            )
            .bind(tank_id)
            .fetch_one(&self.db)
            .await?
            .unwrap_or(Decimal::ZERO);

            if composed > Decimal::ZERO {
                return Err(AppError::InvalidStateTransition(format!(
                    "Tank still holds {} hL of composed wine",
                    composed
                )));
            }
        }

        let tank = sqlx::query_as::<_, TankRow>(
            r#"
            UPDATE tanks
            SET name = $1, capacity_hl = $2, material = $3, status = $4, updated_at = now()
            WHERE id = $5 AND owner_id = $6
            RETURNING id, owner_id, name, capacity_hl, status, material, allocation_mode,
                      batch_id, allocated_volume_hl, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(capacity_hl)
        .bind(&material)
        .bind(&status)
        .bind(tank_id)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;

        Ok(tank)
    }

    /// Delete a tank. Tanks holding wine or batch allocations cannot be
    /// deleted.
    pub async fn delete_tank(&self, owner_id: Uuid, tank_id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM tank_batches WHERE tank_id = $1
                UNION
                SELECT 1 FROM grape_compositions WHERE tank_id = $1
            )
            "#,
        )
        .bind(tank_id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::InvalidStateTransition(
                "Tank has batch allocations or composed wine".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM tanks WHERE id = $1 AND owner_id = $2")
            .bind(tank_id)
            .bind(owner_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tank".to_string()));
        }

        Ok(())
    }

    /// Find unclaimed tanks able to hold `required_volume_hl`, sorted per
    /// the requested fill policy (best-fit by default)
    pub async fn find_available(
        &self,
        owner_id: Uuid,
        required_volume_hl: Decimal,
        policy: TankFillPolicy,
    ) -> AppResult<Vec<CandidateTank>> {
        let candidates = self.load_candidates(owner_id).await?;
        Ok(find_available_tanks(&candidates, required_volume_hl, policy))
    }

    /// Load all of an owner's tanks as allocation candidates
    pub(crate) async fn load_candidates(&self, owner_id: Uuid) -> AppResult<Vec<CandidateTank>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT t.id, t.name, t.capacity_hl,
                   COALESCE(SUM(tb.allocated_volume_hl), 0) AS allocated_hl,
                   MIN(tb.batch_id) AS batch_id
            FROM tanks t
            LEFT JOIN tank_batches tb ON tb.tank_id = t.id
            WHERE t.owner_id = $1 AND t.status <> 'maintenance'
            GROUP BY t.id, t.name, t.capacity_hl
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CandidateTank {
                tank_id: r.id,
                name: r.name,
                capacity_hl: r.capacity_hl,
                available_capacity_hl: (r.capacity_hl - r.allocated_hl).max(Decimal::ZERO),
                batch_id: r.batch_id,
            })
            .collect())
    }
}
