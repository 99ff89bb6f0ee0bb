//! Plot-to-tank blending service
//!
//! Loads the tank, its transfer ledger and its composition rows, hands them
//! to the pure blending engine, and persists the returned deltas. Each
//! operation runs its read-compute-write sequence inside one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::blending::{assign_plot_to_tank, remove_wine_from_tank, BlendingOutcome};
use shared::models::{
    AllocationMode, GrapeComposition, GrapeVariety, Plot, PlotTank, Tank, TankMaterial,
    TankStatus,
};

/// Blending service for plot-to-tank transfers and composition upkeep
#[derive(Clone)]
pub struct BlendingService {
    db: PgPool,
    default_yield_ratio: Decimal,
}

/// Input for assigning a plot's harvest to a tank
#[derive(Debug, Deserialize)]
pub struct AssignPlotInput {
    pub plot_id: Uuid,
    pub volume_hl: Decimal,
    pub harvest_date: Option<NaiveDate>,
    /// Yield cap in hL/ha; the configured default applies when absent
    pub yield_ratio_hl_per_ha: Option<Decimal>,
}

/// Input for removing wine from a tank
#[derive(Debug, Deserialize)]
pub struct RemoveWineInput {
    pub volume_hl: Decimal,
}

/// Composition row as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CompositionRow {
    pub id: Uuid,
    pub tank_id: Uuid,
    pub grape_variety: String,
    pub volume_hl: Decimal,
    pub percentage: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl CompositionRow {
    fn into_model(self) -> GrapeComposition {
        GrapeComposition {
            id: self.id,
            tank_id: self.tank_id,
            grape_variety: GrapeVariety::from_code(&self.grape_variety),
            volume_hl: self.volume_hl,
            percentage: self.percentage,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TankModelRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    capacity_hl: Decimal,
    status: String,
    material: String,
    allocation_mode: String,
    batch_id: Option<Uuid>,
    allocated_volume_hl: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TankModelRow {
    fn into_model(self) -> AppResult<Tank> {
        Ok(Tank {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            capacity_hl: self.capacity_hl,
            status: self
                .status
                .parse::<TankStatus>()
                .map_err(AppError::Internal)?,
            material: TankMaterial::from_code(&self.material),
            allocation_mode: self
                .allocation_mode
                .parse::<AllocationMode>()
                .map_err(AppError::Internal)?,
            batch_id: self.batch_id,
            allocated_volume_hl: self.allocated_volume_hl,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PlotModelRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    grape_variety: String,
    surface_ha: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlotModelRow {
    fn into_model(self) -> Plot {
        Plot {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            grape_variety: GrapeVariety::from_code(&self.grape_variety),
            surface_ha: self.surface_ha,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PlotTankRow {
    id: Uuid,
    plot_id: Uuid,
    tank_id: Uuid,
    volume_hl: Decimal,
    harvest_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl PlotTankRow {
    fn into_model(self) -> PlotTank {
        PlotTank {
            id: self.id,
            plot_id: self.plot_id,
            tank_id: self.tank_id,
            volume_hl: self.volume_hl,
            harvest_date: self.harvest_date,
            created_at: self.created_at,
        }
    }
}

impl BlendingService {
    /// Create a new BlendingService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        let default_yield_ratio =
            Decimal::try_from(config.vinification.default_yield_ratio_hl_per_ha)
                .unwrap_or_else(|_| Decimal::from(60));
        Self {
            db,
            default_yield_ratio,
        }
    }

    /// Assign a plot's harvest volume into a tank.
    ///
    /// Validates against available capacity and the plot yield cap, upserts
    /// the grape composition, transitions the tank out of Empty, and records
    /// a REMPLISSAGE traceability action — all in one transaction.
    pub async fn assign_plot_to_tank(
        &self,
        owner_id: Uuid,
        tank_id: Uuid,
        input: AssignPlotInput,
    ) -> AppResult<BlendingOutcome> {
        let mut tx = self.db.begin().await?;

        let tank = self.load_tank(&mut tx, owner_id, tank_id).await?;
        let plot = self.load_plot(&mut tx, owner_id, input.plot_id).await?;
        let transfers = self.load_transfers(&mut tx, tank_id).await?;
        let compositions = self.load_compositions_tx(&mut tx, tank_id).await?;

        let yield_ratio = input
            .yield_ratio_hl_per_ha
            .unwrap_or(self.default_yield_ratio);

        let outcome = assign_plot_to_tank(
            &tank,
            &plot,
            &transfers,
            &compositions,
            input.volume_hl,
            input.harvest_date,
            yield_ratio,
        )?;

        sqlx::query(
            r#"
            INSERT INTO plot_tanks (id, plot_id, tank_id, volume_hl, harvest_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(outcome.plot_tank.id)
        .bind(outcome.plot_tank.plot_id)
        .bind(outcome.plot_tank.tank_id)
        .bind(outcome.plot_tank.volume_hl)
        .bind(outcome.plot_tank.harvest_date)
        .execute(&mut *tx)
        .await?;

        if outcome.composition_is_new {
            sqlx::query(
                r#"
                INSERT INTO grape_compositions (id, tank_id, grape_variety, volume_hl, percentage)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(outcome.composition.id)
            .bind(outcome.composition.tank_id)
            .bind(outcome.composition.grape_variety.code())
            .bind(outcome.composition.volume_hl)
            .bind(outcome.composition.percentage)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r#"
                UPDATE grape_compositions
                SET volume_hl = $1, percentage = $2, updated_at = now()
                WHERE id = $3
                "#,
            )
            .bind(outcome.composition.volume_hl)
            .bind(outcome.composition.percentage)
            .bind(outcome.composition.id)
            .execute(&mut *tx)
            .await?;
        }

        if outcome.tank_status != tank.status {
            sqlx::query("UPDATE tanks SET status = $1, updated_at = now() WHERE id = $2")
                .bind(outcome.tank_status.as_str())
                .bind(tank_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO actions (id, tank_id, action_type, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(outcome.action.id)
        .bind(outcome.action.tank_id)
        .bind(outcome.action.action_type.code())
        .bind(outcome.action.start_date)
        .bind(outcome.action.end_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            tank_id = %tank_id,
            plot_id = %plot.id,
            volume_hl = %input.volume_hl,
            "Plot assigned to tank"
        );

        Ok(outcome)
    }

    /// Remove wine from a tank, reducing its composition proportionally
    pub async fn remove_wine(
        &self,
        owner_id: Uuid,
        tank_id: Uuid,
        input: RemoveWineInput,
    ) -> AppResult<Vec<CompositionRow>> {
        let mut tx = self.db.begin().await?;

        let tank = self.load_tank(&mut tx, owner_id, tank_id).await?;
        let compositions = self.load_compositions_tx(&mut tx, tank_id).await?;

        let outcome = remove_wine_from_tank(&tank, &compositions, input.volume_hl)?;

        for comp in &outcome.updated_compositions {
            sqlx::query(
                r#"
                UPDATE grape_compositions
                SET volume_hl = $1, percentage = $2, updated_at = now()
                WHERE id = $3
                "#,
            )
            .bind(comp.volume_hl)
            .bind(comp.percentage)
            .bind(comp.id)
            .execute(&mut *tx)
            .await?;
        }

        for comp_id in &outcome.removed_composition_ids {
            sqlx::query("DELETE FROM grape_compositions WHERE id = $1")
                .bind(comp_id)
                .execute(&mut *tx)
                .await?;
        }

        if outcome.tank_status != tank.status {
            sqlx::query("UPDATE tanks SET status = $1, updated_at = now() WHERE id = $2")
                .bind(outcome.tank_status.as_str())
                .bind(tank_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_composition(owner_id, tank_id).await
    }

    /// Current composition rows for a tank
    pub async fn get_composition(
        &self,
        owner_id: Uuid,
        tank_id: Uuid,
    ) -> AppResult<Vec<CompositionRow>> {
        // Ownership check
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tanks WHERE id = $1 AND owner_id = $2)",
        )
        .bind(tank_id)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Tank".to_string()));
        }

        let rows = sqlx::query_as::<_, CompositionRow>(
            r#"
            SELECT id, tank_id, grape_variety, volume_hl, percentage, updated_at
            FROM grape_compositions
            WHERE tank_id = $1
            ORDER BY volume_hl DESC
            "#,
        )
        .bind(tank_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn load_tank(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        tank_id: Uuid,
    ) -> AppResult<Tank> {
        sqlx::query_as::<_, TankModelRow>(
            r#"
            SELECT id, owner_id, name, capacity_hl, status, material, allocation_mode,
                   batch_id, allocated_volume_hl, created_at, updated_at
            FROM tanks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(tank_id)
        .bind(owner_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Tank".to_string()))?
        .into_model()
    }

    async fn load_plot(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        plot_id: Uuid,
    ) -> AppResult<Plot> {
        Ok(sqlx::query_as::<_, PlotModelRow>(
            r#"
            SELECT id, owner_id, name, grape_variety, surface_ha, created_at, updated_at
            FROM plots
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(plot_id)
        .bind(owner_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Plot".to_string()))?
        .into_model())
    }

    async fn load_transfers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tank_id: Uuid,
    ) -> AppResult<Vec<PlotTank>> {
        let rows = sqlx::query_as::<_, PlotTankRow>(
            r#"
            SELECT id, plot_id, tank_id, volume_hl, harvest_date, created_at
            FROM plot_tanks
            WHERE tank_id = $1
            "#,
        )
        .bind(tank_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(PlotTankRow::into_model).collect())
    }

    async fn load_compositions_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tank_id: Uuid,
    ) -> AppResult<Vec<GrapeComposition>> {
        let rows = sqlx::query_as::<_, CompositionRow>(
            r#"
            SELECT id, tank_id, grape_variety, volume_hl, percentage, updated_at
            FROM grape_compositions
            WHERE tank_id = $1
            "#,
        )
        .bind(tank_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(CompositionRow::into_model).collect())
    }
}
