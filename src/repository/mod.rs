//! Data access layer (Repository pattern)

pub mod dispatch_log;
pub mod system_settings;

pub use dispatch_log::DispatchLogRepository;
pub use system_settings::SystemSettingsRepository;
