//! Shared types and domain logic for the Winery Vinification Management Platform
//!
//! This crate contains the record types and the pure calculation engines
//! shared between the backend, the frontend (via WASM), and other components
//! of the system. Nothing in here performs I/O: backend services load rows,
//! call into these functions with plain data, and persist the returned deltas
//! inside a database transaction.

pub mod allocation;
pub mod blending;
pub mod error;
pub mod models;
pub mod scaling;
pub mod stock_check;
pub mod types;
pub mod validation;

pub use allocation::*;
pub use blending::*;
pub use error::*;
pub use models::*;
pub use scaling::*;
pub use stock_check::*;
pub use types::*;
pub use validation::*;
