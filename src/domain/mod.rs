// ==========================================
// School Admin Dashboard - Domain Layer
// ==========================================
// Entities and value types shared by the import pipeline and repositories
// ==========================================

pub mod audit;
pub mod class;
pub mod student;
pub mod types;

pub use audit::{AuditEvent, AuditSink, TracingAuditSink};
pub use class::ClassEntity;
pub use student::{ImportBatch, ImportReport, RowRejection, StudentRecord};
pub use types::{ImportStatus, StudentStatus, StudentType};
