//! Domain models for the Winery Vinification Management Platform

pub mod action;
pub mod batch;
pub mod composition;
pub mod consumable;
pub mod plot;
pub mod stock;
pub mod tank;
pub mod user;

pub use action::*;
pub use batch::*;
pub use composition::*;
pub use consumable::*;
pub use plot::*;
pub use stock::*;
pub use tank::*;
pub use user::*;
