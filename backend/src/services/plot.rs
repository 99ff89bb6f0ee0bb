//! Vineyard plot management service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::GrapeVariety;
use shared::validation::validate_plot_surface;

/// Plot service for managing vineyard plots
#[derive(Clone)]
pub struct PlotService {
    db: PgPool,
}

/// Plot record as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlotRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub grape_variety: String,
    pub surface_ha: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a plot
#[derive(Debug, Deserialize)]
pub struct CreatePlotInput {
    pub name: String,
    pub grape_variety: GrapeVariety,
    pub surface_ha: Decimal,
}

/// Input for updating a plot
#[derive(Debug, Deserialize)]
pub struct UpdatePlotInput {
    pub name: Option<String>,
    pub grape_variety: Option<GrapeVariety>,
    pub surface_ha: Option<Decimal>,
}

/// One transfer from this plot into a tank
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlotTransferRow {
    pub id: Uuid,
    pub tank_id: Uuid,
    pub tank_name: String,
    pub volume_hl: Decimal,
    pub harvest_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl PlotService {
    /// Create a new PlotService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a plot
    pub async fn create_plot(&self, owner_id: Uuid, input: CreatePlotInput) -> AppResult<PlotRow> {
        validate_plot_surface(input.surface_ha).map_err(|msg| AppError::Validation {
            field: "surface_ha".to_string(),
            message: msg.to_string(),
            message_fr: "La surface de la parcelle doit être supérieure à 0".to_string(),
        })?;

        let plot = sqlx::query_as::<_, PlotRow>(
            r#"
            INSERT INTO plots (owner_id, name, grape_variety, surface_ha)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, grape_variety, surface_ha, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(input.grape_variety.code())
        .bind(input.surface_ha)
        .fetch_one(&self.db)
        .await?;

        Ok(plot)
    }

    /// Get a plot by id
    pub async fn get_plot(&self, owner_id: Uuid, plot_id: Uuid) -> AppResult<PlotRow> {
        sqlx::query_as::<_, PlotRow>(
            r#"
            SELECT id, owner_id, name, grape_variety, surface_ha, created_at, updated_at
            FROM plots
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(plot_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plot".to_string()))
    }

    /// List plots for an owner
    pub async fn list_plots(&self, owner_id: Uuid) -> AppResult<Vec<PlotRow>> {
        let plots = sqlx::query_as::<_, PlotRow>(
            r#"
            SELECT id, owner_id, name, grape_variety, surface_ha, created_at, updated_at
            FROM plots
            WHERE owner_id = $1
            ORDER BY name
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(plots)
    }

    /// Update a plot
    pub async fn update_plot(
        &self,
        owner_id: Uuid,
        plot_id: Uuid,
        input: UpdatePlotInput,
    ) -> AppResult<PlotRow> {
        let existing = self.get_plot(owner_id, plot_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let grape_variety = input
            .grape_variety
            .map(|v| v.code())
            .unwrap_or(existing.grape_variety);
        let surface_ha = input.surface_ha.unwrap_or(existing.surface_ha);

        validate_plot_surface(surface_ha).map_err(|msg| AppError::Validation {
            field: "surface_ha".to_string(),
            message: msg.to_string(),
            message_fr: "La surface de la parcelle doit être supérieure à 0".to_string(),
        })?;

        let plot = sqlx::query_as::<_, PlotRow>(
            r#"
            UPDATE plots
            SET name = $1, grape_variety = $2, surface_ha = $3, updated_at = now()
            WHERE id = $4 AND owner_id = $5
            RETURNING id, owner_id, name, grape_variety, surface_ha, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&grape_variety)
        .bind(surface_ha)
        .bind(plot_id)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;

        Ok(plot)
    }

    /// Delete a plot. Plots with recorded transfers cannot be deleted.
    pub async fn delete_plot(&self, owner_id: Uuid, plot_id: Uuid) -> AppResult<()> {
        let has_transfers = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM plot_tanks WHERE plot_id = $1)",
        )
        .bind(plot_id)
        .fetch_one(&self.db)
        .await?;

        if has_transfers {
            return Err(AppError::InvalidStateTransition(
                "Plot has recorded transfers".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM plots WHERE id = $1 AND owner_id = $2")
            .bind(plot_id)
            .bind(owner_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Plot".to_string()));
        }

        Ok(())
    }

    /// Transfer history for a plot
    pub async fn get_transfers(
        &self,
        owner_id: Uuid,
        plot_id: Uuid,
    ) -> AppResult<Vec<PlotTransferRow>> {
        // Ownership check
        self.get_plot(owner_id, plot_id).await?;

        let transfers = sqlx::query_as::<_, PlotTransferRow>(
            r#"
            SELECT pt.id, pt.tank_id, t.name AS tank_name, pt.volume_hl, pt.harvest_date,
                   pt.created_at
            FROM plot_tanks pt
            JOIN tanks t ON t.id = pt.tank_id
            WHERE pt.plot_id = $1
            ORDER BY pt.harvest_date DESC, pt.created_at DESC
            "#,
        )
        .bind(plot_id)
        .fetch_all(&self.db)
        .await?;

        Ok(transfers)
    }
}
