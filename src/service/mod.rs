//! Business logic layer

pub mod dispatch;
pub mod dispatch_log;
pub mod sheet_import;
pub mod system_settings;

pub use dispatch::DispatchService;
pub use dispatch_log::{DispatchLogPage, DispatchLogService};
pub use sheet_import::SheetImportService;
pub use system_settings::SystemSettingsService;
