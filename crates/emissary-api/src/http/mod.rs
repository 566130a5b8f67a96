//! HTTP layer: the VAC endpoints and a health check.

pub mod error;
pub mod handlers;
pub mod router;
