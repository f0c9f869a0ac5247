// ==========================================
// School Admin Dashboard - Roster Import Core
// ==========================================
// Stack: Rust + SQLite (hosted deployments plug their own repositories)
// Role: bulk student roster import for the administration dashboard
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and value types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Import layer - uploaded roster files
pub mod importer;

// Configuration layer
pub mod config;

// Database infrastructure (connection setup / PRAGMA policy / schema)
pub mod db;

// Logging
pub mod logging;

// Roster template download
pub mod template;

// ==========================================
// Core re-exports
// ==========================================

// Domain types
pub use domain::types::{ImportStatus, StudentStatus, StudentType};

// Domain entities
pub use domain::{
    AuditEvent, AuditSink, ClassEntity, ImportBatch, ImportReport, RowRejection, StudentRecord,
    TracingAuditSink,
};

// Import pipeline
pub use importer::{
    ImportError, ImportScope, RosterImporter, RosterImporterImpl, UniversalFileParser,
};

// Configuration
pub use config::{ConfigManager, ImportConfigReader};

// ==========================================
// Crate constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "School Admin Dashboard - Roster Import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
