//! HTTP handlers for the Winery Vinification Management Platform

pub mod auth;
pub mod batch;
pub mod blending;
pub mod health;
pub mod plot;
pub mod process;
pub mod reporting;
pub mod stock;
pub mod tank;

pub use auth::*;
pub use batch::*;
pub use blending::*;
pub use health::*;
pub use plot::*;
pub use process::*;
pub use reporting::*;
pub use stock::*;
pub use tank::*;
