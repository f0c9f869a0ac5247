// ==========================================
// School Admin Dashboard - Roster Importer Implementation
// ==========================================
// Wires the whole import together, from uploaded file to roster rows.
// Flow: decode -> class prefetch -> headers -> assemble rows -> dedup ->
//       sequential upsert batches -> ledger + audit + report
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::audit::{AuditEvent, AuditSink};
use crate::domain::student::{ImportBatch, ImportReport, StudentRecord};
use crate::domain::types::ImportStatus;
use crate::importer::class_matcher::ClassMatcher;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::header_resolver::resolve_headers;
use crate::importer::roster_importer_trait::{ImportScope, RosterImporter};
use crate::importer::row_assembler::{RowAssembler, RowOutcome};
use crate::repository::{ClassRepository, StudentImportRepository};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// RosterImporterImpl
// ==========================================
pub struct RosterImporterImpl<R, S, C>
where
    R: ClassRepository,
    S: StudentImportRepository,
    C: ImportConfigReader,
{
    class_repo: R,
    student_repo: S,
    config: C,
    audit: Arc<dyn AuditSink>,
}

impl<R, S, C> RosterImporterImpl<R, S, C>
where
    R: ClassRepository,
    S: StudentImportRepository,
    C: ImportConfigReader,
{
    pub fn new(class_repo: R, student_repo: S, config: C, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            class_repo,
            student_repo,
            config,
            audit,
        }
    }

    /// Write the ledger row and audit entry for a finished run.
    /// Best-effort: a ledger failure is logged, it never masks the report.
    async fn record_run(&self, report: &ImportReport, file_name: &str, total_rows: usize) {
        let batch = ImportBatch {
            batch_id: report.batch_id.clone(),
            file_name: Some(file_name.to_string()),
            total_rows: total_rows as i32,
            imported_rows: report.imported_count as i32,
            synthetic_rows: report.synthetic_admission_count as i32,
            skipped_rows: report.skipped_count as i32,
            error_rows: report.errors.len() as i32,
            status: report.status,
            imported_at: Some(Utc::now()),
            imported_by: Some("system".to_string()),
            elapsed_ms: Some(report.elapsed_ms as i64),
            errors_json: serde_json::to_string(&report.errors).ok(),
        };

        if let Err(e) = self.student_repo.insert_batch(batch).await {
            warn!(batch_id = %report.batch_id, error = %e, "failed to record import batch");
        }

        self.audit.record(AuditEvent::new(
            "roster_import",
            "system",
            serde_json::json!({
                "batch_id": report.batch_id,
                "file": file_name,
                "status": report.status.as_str(),
                "imported": report.imported_count,
                "synthetic": report.synthetic_admission_count,
                "skipped": report.skipped_count,
                "errors": report.errors.len(),
            }),
        ));
    }
}

#[async_trait::async_trait]
impl<R, S, C> RosterImporter for RosterImporterImpl<R, S, C>
where
    R: ClassRepository + Send + Sync,
    S: StudentImportRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, file_path, scope), fields(batch_id))]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        scope: ImportScope,
    ) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let file_name = file_path
            .as_ref()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!(batch_id = %batch_id, file = %file_name, "starting roster import");

        // === Step 1: decode the file ===
        debug!("step 1: decode file");
        let sheets = UniversalFileParser.parse(file_path.as_ref())?;
        let total_rows: usize = sheets.iter().map(|s| s.rows.len()).sum();
        info!(sheets = sheets.len(), rows = total_rows, "file decoded");

        // === Step 2: prefetch the class list (immutable snapshot) ===
        debug!("step 2: prefetch classes");
        let classes = self
            .class_repo
            .list_classes()
            .await
            .map_err(|e| ImportError::DatabaseError(e.to_string()))?;
        info!(classes = classes.len(), "class list loaded");
        let matcher = ClassMatcher::new(classes);

        if let Some(scope_name) = scope.class_name() {
            if matcher.match_label(scope_name).is_none() {
                return Err(ImportError::ScopeClassNotFound(scope_name.to_string()));
            }
        }

        let batch_size = self
            .config
            .get_upsert_batch_size()
            .await
            .map_err(|e| ImportError::DatabaseError(e.to_string()))?;
        let guardian_name = self
            .config
            .get_guardian_name_placeholder()
            .await
            .map_err(|e| ImportError::DatabaseError(e.to_string()))?;
        let guardian_phone = self
            .config
            .get_guardian_phone_placeholder()
            .await
            .map_err(|e| ImportError::DatabaseError(e.to_string()))?;

        let import_date = chrono::Local::now().date_naive();

        // === Steps 3-5: headers, then one candidate per data row ===
        debug!("step 3: resolve headers and assemble rows");
        let mut records: Vec<StudentRecord> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        let mut skipped_count = 0usize;

        for sheet in &sheets {
            let Some((header_idx, headers)) = resolve_headers(sheet) else {
                errors.push(format!("sheet \"{}\": sheet is empty", sheet.name));
                continue;
            };

            let data_rows = &sheet.rows[header_idx + 1..];
            if data_rows.is_empty() {
                errors.push(format!(
                    "sheet \"{}\": header row found but no data rows",
                    sheet.name
                ));
                continue;
            }

            let assembler = RowAssembler::new(
                &headers,
                &matcher,
                &scope,
                import_date,
                &guardian_name,
                &guardian_phone,
            );

            for row in data_rows {
                match assembler.assemble(&sheet.name, row) {
                    RowOutcome::Assembled(record) => records.push(*record),
                    RowOutcome::Skipped => skipped_count += 1,
                    RowOutcome::Rejected(rejection) => {
                        warn!(
                            sheet = %rejection.sheet,
                            row = rejection.row_number,
                            reason = %rejection.reason,
                            "row rejected"
                        );
                        errors.push(rejection.to_string());
                    }
                }
            }
        }
        info!(
            candidates = records.len(),
            rejected = errors.len(),
            skipped = skipped_count,
            "row assembly finished"
        );

        // === Step 6: in-file dedup, last row wins ===
        debug!("step 6: dedup candidates");
        let deduped = dedup_last_wins(records);

        if deduped.is_empty() {
            // All-rejected and nothing-recognized are different failures:
            // the latter usually means the header aliases did not match.
            if errors.is_empty() {
                errors.push(
                    "no student data recognized in the file (check the column headers \
                     against the roster template)"
                        .to_string(),
                );
            }
            let report = ImportReport {
                batch_id: batch_id.clone(),
                imported_count: 0,
                synthetic_admission_count: 0,
                skipped_count,
                errors,
                status: ImportStatus::Failed,
                elapsed_ms: start.elapsed().as_millis() as u64,
            };
            self.record_run(&report, &file_name, total_rows).await;
            return Ok(report);
        }

        let synthetic_admission_count = deduped
            .iter()
            .filter(|r| r.admission_synthesized)
            .count();

        // === Step 7: sequential upsert batches ===
        // One batch at a time, in order: a failure on batch k leaves a
        // precise "first N rows succeeded" boundary. Sent batches are not
        // rolled back.
        debug!(batch_size, total = deduped.len(), "step 7: upsert batches");
        let mut imported_count = 0usize;
        let mut persistence_failed = false;

        let chunks: Vec<Vec<StudentRecord>> = deduped
            .chunks(batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();

        for (batch_index, chunk) in chunks.into_iter().enumerate() {
            match self.student_repo.batch_upsert_students(chunk).await {
                Ok(written) => {
                    imported_count += written;
                    debug!(batch = batch_index + 1, written, "batch upserted");
                }
                Err(e) => {
                    let failure = ImportError::PersistenceFailure {
                        batch_index: batch_index + 1,
                        rows_sent: imported_count,
                        message: e.to_string(),
                    };
                    error!(batch = batch_index + 1, error = %failure, "upsert failed");
                    errors.push(failure.to_string());
                    persistence_failed = true;
                    break;
                }
            }
        }

        let status = if persistence_failed {
            if imported_count > 0 {
                ImportStatus::Partial
            } else {
                ImportStatus::Failed
            }
        } else if errors.is_empty() {
            ImportStatus::Success
        } else {
            ImportStatus::Partial
        };

        let report = ImportReport {
            batch_id: batch_id.clone(),
            imported_count,
            synthetic_admission_count,
            skipped_count,
            errors,
            status,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        self.record_run(&report, &file_name, total_rows).await;

        info!(
            batch_id = %batch_id,
            status = %report.status.as_str(),
            imported = report.imported_count,
            synthetic = report.synthetic_admission_count,
            skipped = report.skipped_count,
            errors = report.errors.len(),
            elapsed_ms = report.elapsed_ms,
            "roster import finished"
        );

        Ok(report)
    }
}

/// Collapse in-file duplicates of (class_id, admission_number). The later
/// row wins; the first-seen position is kept so batch order stays
/// deterministic.
fn dedup_last_wins(records: Vec<StudentRecord>) -> Vec<StudentRecord> {
    let mut deduped: Vec<StudentRecord> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        let key = record.dedup_key();
        match index.get(&key) {
            Some(&pos) => deduped[pos] = record,
            None => {
                index.insert(key, deduped.len());
                deduped.push(record);
            }
        }
    }

    deduped
}
