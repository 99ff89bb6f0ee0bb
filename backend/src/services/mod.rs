//! Business logic services for the Winery Vinification Management Platform

pub mod auth;
pub mod batch;
pub mod blending;
pub mod plot;
pub mod process;
pub mod reporting;
pub mod stock;
pub mod tank;

pub use auth::AuthService;
pub use batch::BatchService;
pub use blending::BlendingService;
pub use plot::PlotService;
pub use process::ProcessService;
pub use reporting::ReportingService;
pub use stock::StockService;
pub use tank::TankService;
