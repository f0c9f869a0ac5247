// ==========================================
// School Admin Dashboard - Configuration Layer
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

pub use config_manager::ConfigManager;
pub use import_config_trait::{
    ImportConfigReader, DEFAULT_ERROR_PREVIEW_LIMIT, DEFAULT_GUARDIAN_NAME,
    DEFAULT_GUARDIAN_PHONE, DEFAULT_UPSERT_BATCH_SIZE,
};
