//! GameSoc Core - back office for the gaming society site
//!
//! Bulk email dispatch over SMTP or a transactional email API, recipient
//! import from shared spreadsheets, and an append-only dispatch log.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod email;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
