// ==========================================
// School Admin Dashboard - Import Config Trait
// ==========================================
// Read-only configuration the import pipeline needs; no config writes,
// no business rules. Implemented by ConfigManager (config_kv table) and
// by mocks in tests.
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// Defaults applied when config_kv has no override.
pub const DEFAULT_UPSERT_BATCH_SIZE: usize = 100;
pub const DEFAULT_ERROR_PREVIEW_LIMIT: usize = 3;
pub const DEFAULT_GUARDIAN_NAME: &str = "N/A";
pub const DEFAULT_GUARDIAN_PHONE: &str = "0000000000";

#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// Max records per upsert call to the persistence layer.
    ///
    /// Default: 100
    async fn get_upsert_batch_size(&self) -> Result<usize, Box<dyn Error>>;

    /// How many row errors the summary message shows inline before
    /// collapsing to "and N more".
    ///
    /// Default: 3
    async fn get_error_preview_limit(&self) -> Result<usize, Box<dyn Error>>;

    /// Placeholder stored when a row has no father/guardian name.
    ///
    /// Default: "N/A"
    async fn get_guardian_name_placeholder(&self) -> Result<String, Box<dyn Error>>;

    /// Placeholder stored when a row has no guardian phone. SMS features
    /// recognize it and skip sending instead of failing.
    ///
    /// Default: "0000000000"
    async fn get_guardian_phone_placeholder(&self) -> Result<String, Box<dyn Error>>;
}
