//! HTTP middleware for GameSoc Core
//!
//! - Admin bearer token enforcement
//! - Request ID propagation and HTTP metrics

pub mod metrics;
pub mod require_admin;

pub use metrics::ObservabilityLayer;
pub use require_admin::{require_admin_middleware, AdminAuthState};
