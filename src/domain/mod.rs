//! Domain models for GameSoc Core

pub mod dispatch;
pub mod dispatch_log;
pub mod email;
pub mod sheet;
pub mod system_settings;

pub use dispatch::*;
pub use dispatch_log::*;
pub use email::*;
pub use sheet::*;
pub use system_settings::*;
