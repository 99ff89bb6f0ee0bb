//! Middleware for the Winery Vinification Management Platform

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
