// ==========================================
// School Admin Dashboard - Student Domain Model
// ==========================================
// StudentRecord is the normalized candidate produced by the import
// pipeline; one row of the students table after upsert.
// RowRejection / ImportReport / ImportBatch carry the per-run outcome.
// ==========================================

use crate::domain::types::{ImportStatus, StudentStatus, StudentType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// StudentRecord - normalized roster record
// ==========================================
// Unique within a file and within the roster on (class_id, admission_number);
// later rows with the same pair overwrite earlier ones before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    // ===== Identity =====
    pub class_id: String,
    pub admission_number: String,
    pub full_name: String,
    pub roll_number: Option<String>,

    // ===== Personal details =====
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub aadhaar: Option<String>,
    pub address: Option<String>,

    // ===== Guardian contacts =====
    // Defaulted to placeholders rather than rejected: SMS features degrade
    // gracefully instead of blocking import.
    pub father_name: String,
    pub father_phone: String,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub parent_email: Option<String>,

    // ===== Fee heads (additive, never null) =====
    pub term1_fee: f64,
    pub term2_fee: f64,
    pub term3_fee: f64,
    pub books_fee: f64,
    pub transport_fee: f64,
    pub old_dues: f64,

    // ===== Service flags =====
    pub has_books: bool,
    pub has_transport: bool,

    // ===== Lifecycle =====
    pub student_type: StudentType,
    pub joining_date: NaiveDate,
    pub is_active: bool,
    pub status: StudentStatus,

    // ===== Provenance (not persisted) =====
    pub admission_synthesized: bool, // admission number was generated, not read
    pub source_row: usize,           // 1-based row within the source sheet
}

impl StudentRecord {
    /// Dedup key within one import: same class + same admission number
    /// (case-insensitive) is the same logical student.
    pub fn dedup_key(&self) -> (String, String) {
        (
            self.class_id.clone(),
            self.admission_number.to_lowercase(),
        )
    }

    /// Total annual fee across all heads. Fee fields are plain numbers
    /// defaulting to zero, so this never needs null handling.
    pub fn total_fee(&self) -> f64 {
        self.term1_fee
            + self.term2_fee
            + self.term3_fee
            + self.books_fee
            + self.transport_fee
            + self.old_dues
    }
}

// ==========================================
// RowRejection - one row that failed validation
// ==========================================
// Accumulated, never thrown: a rejection never aborts the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRejection {
    pub sheet: String,
    pub row_number: usize, // 1-based within the sheet
    pub reason: String,
}

impl std::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sheet \"{}\", row {}: {}",
            self.sheet, self.row_number, self.reason
        )
    }
}

// ==========================================
// ImportReport - result returned to the caller
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub imported_count: usize,
    pub synthetic_admission_count: usize,
    pub skipped_count: usize,
    pub errors: Vec<String>,
    pub status: ImportStatus,
    pub elapsed_ms: u64,
}

impl ImportReport {
    /// Administrator-facing one-liner: counts plus the first few errors.
    /// The full error list stays on the report for the details view, so a
    /// large file cannot flood a single notification.
    pub fn summary_message(&self, error_preview_limit: usize) -> String {
        let mut msg = match self.status {
            ImportStatus::Failed => match self.errors.first() {
                Some(first) => format!("Import failed: {}", first),
                None => "Import failed".to_string(),
            },
            _ => {
                let mut m = format!("Imported {} student(s)", self.imported_count);
                if self.synthetic_admission_count > 0 {
                    m.push_str(&format!(
                        " ({} auto-generated admission number(s))",
                        self.synthetic_admission_count
                    ));
                }
                if self.skipped_count > 0 {
                    m.push_str(&format!(", {} row(s) skipped", self.skipped_count));
                }
                m
            }
        };

        if self.status != ImportStatus::Failed && !self.errors.is_empty() {
            let preview: Vec<&str> = self
                .errors
                .iter()
                .take(error_preview_limit)
                .map(|e| e.as_str())
                .collect();
            msg.push_str(&format!(". Errors: {}", preview.join("; ")));
            let remaining = self.errors.len().saturating_sub(error_preview_limit);
            if remaining > 0 {
                msg.push_str(&format!(" (and {} more)", remaining));
            }
        }

        msg
    }
}

// ==========================================
// ImportBatch - one row of the import ledger
// ==========================================
// The dashboard shows import history from this table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub total_rows: i32,
    pub imported_rows: i32,
    pub synthetic_rows: i32,
    pub skipped_rows: i32,
    pub error_rows: i32,
    pub status: ImportStatus,
    pub imported_at: Option<DateTime<Utc>>,
    pub imported_by: Option<String>,
    pub elapsed_ms: Option<i64>,
    pub errors_json: Option<String>,
}
