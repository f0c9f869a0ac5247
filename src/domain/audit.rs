// ==========================================
// School Admin Dashboard - Audit Trail Seam
// ==========================================
// The audit log is an injected collaborator, not a process-wide singleton,
// so tests can substitute a capturing stub.
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: String,             // e.g. "roster_import"
    pub actor: String,              // user identifier, "system" for CLI runs
    pub detail: serde_json::Value,  // structured payload (counts, file name)
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, actor: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            action: action.into(),
            actor: actor.into(),
            detail,
            at: Utc::now(),
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

// ==========================================
// TracingAuditSink - default sink
// ==========================================
// Emits audit entries as structured log lines. The hosted deployment
// substitutes a sink that writes to its audit table.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        info!(
            action = %event.action,
            actor = %event.actor,
            detail = %event.detail,
            at = %event.at.to_rfc3339(),
            "audit"
        );
    }
}
