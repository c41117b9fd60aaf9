//! Application state traits for dependency injection
//!
//! Handlers are generic over [`HasServices`], so the same router runs against
//! the production `AppState` and the in-memory state used by the HTTP tests.

use crate::config::Config;
use crate::repository::{DispatchLogRepository, SystemSettingsRepository};
use crate::service::{DispatchLogService, DispatchService, SheetImportService, SystemSettingsService};

/// Trait for application state that provides access to all services.
pub trait HasServices: Clone + Send + Sync + 'static {
    /// The system settings repository type
    type SettingsRepo: SystemSettingsRepository;
    /// The dispatch log repository type
    type LogRepo: DispatchLogRepository;

    /// Get the application configuration
    fn config(&self) -> &Config;

    fn dispatch_service(&self) -> &DispatchService<Self::SettingsRepo, Self::LogRepo>;

    fn dispatch_log_service(&self) -> &DispatchLogService<Self::LogRepo>;

    fn system_settings_service(&self) -> &SystemSettingsService<Self::SettingsRepo>;

    fn sheet_import_service(&self) -> &SheetImportService;

    /// Check if the backing store is reachable
    fn check_ready(&self) -> impl std::future::Future<Output = bool> + Send;
}
