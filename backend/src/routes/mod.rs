//! Route definitions for the Winery Vinification Management Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - tank management
        .nest("/tanks", tank_routes())
        // Protected routes - batch management
        .nest("/batches", batch_routes())
        // Protected routes - plot management
        .nest("/plots", plot_routes())
        // Protected routes - process and action management
        .nest("/processes", process_routes())
        .nest("/actions", action_routes())
        // Protected routes - stock management
        .nest("/stocks", stock_routes())
        // Protected routes - reporting
        .nest("/reports", reporting_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Tank management routes (protected)
fn tank_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tanks).post(handlers::create_tank))
        .route("/available", get(handlers::find_available_tanks))
        .route(
            "/:tank_id",
            get(handlers::get_tank)
                .put(handlers::update_tank)
                .delete(handlers::delete_tank),
        )
        // Blending: plot-to-tank transfers and composition
        .route(
            "/:tank_id/composition",
            get(handlers::get_tank_composition),
        )
        .route("/:tank_id/assign-plot", post(handlers::assign_plot_to_tank))
        .route("/:tank_id/remove-wine", post(handlers::remove_wine_from_tank))
        // Actions recorded on a tank
        .route("/:tank_id/actions", get(handlers::list_tank_actions))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Batch management routes (protected)
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::create_batch))
        .route(
            "/:batch_id",
            get(handlers::get_batch)
                .put(handlers::update_batch)
                .delete(handlers::delete_batch),
        )
        .route("/:batch_id/allocation", get(handlers::get_batch_allocation))
        .route(
            "/:batch_id/allocation/suggest",
            get(handlers::suggest_batch_allocation),
        )
        .route("/:batch_id/tanks", post(handlers::assign_tank_to_batch))
        .route(
            "/:batch_id/tanks/:tank_id",
            axum::routing::delete(handlers::release_tank_from_batch),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Plot management routes (protected)
fn plot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plots).post(handlers::create_plot))
        .route(
            "/:plot_id",
            get(handlers::get_plot)
                .put(handlers::update_plot)
                .delete(handlers::delete_plot),
        )
        .route("/:plot_id/transfers", get(handlers::get_plot_transfers))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Process management routes (protected)
fn process_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_processes).post(handlers::create_process),
        )
        .route(
            "/:process_id",
            get(handlers::get_process).delete(handlers::delete_process),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Action management routes (protected)
fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_action))
        .route("/:action_id", get(handlers::get_action))
        .route(
            "/:action_id/consumables",
            get(handlers::list_action_consumables),
        )
        .route(
            "/:action_id/process/:process_id",
            post(handlers::assign_action_to_process),
        )
        .route("/:action_id/unassign", post(handlers::unassign_action))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock management routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stocks).post(handlers::create_stock))
        .route("/out-of-stock", get(handlers::list_out_of_stock))
        .route("/alerts/low-stock", post(handlers::send_low_stock_alert))
        .route(
            "/:stock_id",
            get(handlers::get_stock)
                .put(handlers::update_stock)
                .delete(handlers::delete_stock),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn reporting_routes() -> Router<AppState> {
    Router::new()
        .route("/stock.csv", get(handlers::export_stock_csv))
        .route("/actions.csv", get(handlers::export_actions_csv))
        .route_layer(middleware::from_fn(auth_middleware))
}
