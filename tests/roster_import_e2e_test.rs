// ==========================================
// Roster import - end-to-end tests
// ==========================================
// Drives the whole pipeline against real CSV files and a scratch SQLite
// database: decode -> headers -> assembly -> dedup -> upsert batches.
// ==========================================


use async_trait::async_trait;
use rusqlite::Connection;
use school_roster_import::config::ImportConfigReader;
use school_roster_import::domain::{AuditEvent, AuditSink};
use school_roster_import::importer::{
    resolve_admission_number, AdmissionSeed, ImportError, ImportScope, RosterImporter,
    RosterImporterImpl,
};
use school_roster_import::repository::{
    ClassRepositoryImpl, StudentImportRepository, StudentImportRepositoryImpl,
};
use school_roster_import::ImportStatus;
use std::error::Error;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::{Builder, NamedTempFile};

// ==========================================
// MockConfigReader - fixed import configuration
// ==========================================
struct MockConfigReader {
    batch_size: usize,
}

impl MockConfigReader {
    fn standard() -> Self {
        Self { batch_size: 100 }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfigReader {
    async fn get_upsert_batch_size(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.batch_size)
    }

    async fn get_error_preview_limit(&self) -> Result<usize, Box<dyn Error>> {
        Ok(3)
    }

    async fn get_guardian_name_placeholder(&self) -> Result<String, Box<dyn Error>> {
        Ok("N/A".to_string())
    }

    async fn get_guardian_phone_placeholder(&self) -> Result<String, Box<dyn Error>> {
        Ok("0000000000".to_string())
    }
}

// ==========================================
// CapturingAuditSink - audit assertions
// ==========================================
struct CapturingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl CapturingAuditSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }
}

impl AuditSink for CapturingAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}

type TestImporter =
    RosterImporterImpl<ClassRepositoryImpl, StudentImportRepositoryImpl, MockConfigReader>;

fn build_importer(db_path: &str, audit: Arc<dyn AuditSink>) -> TestImporter {
    build_importer_with_config(db_path, MockConfigReader::standard(), audit)
}

fn build_importer_with_config(
    db_path: &str,
    config: MockConfigReader,
    audit: Arc<dyn AuditSink>,
) -> TestImporter {
    let class_repo = ClassRepositoryImpl::new(db_path).expect("class repo");
    let student_repo = StudentImportRepositoryImpl::new(db_path).expect("student repo");
    RosterImporterImpl::new(class_repo, student_repo, config, audit)
}

fn student_repo(db_path: &str) -> StudentImportRepositoryImpl {
    StudentImportRepositoryImpl::new(db_path).expect("student repo")
}

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp csv");
    file.write_all(content.as_bytes()).expect("write csv");
    file
}

// ==========================================
// Scenario: minimal success
// ==========================================
#[tokio::test]
async fn minimal_row_imports_with_synthesized_admission_number() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv("admission_number,full_name,class\n,\"Jane Doe\",\"Class 3\"\n");
    let report = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    assert_eq!(report.status, ImportStatus::Success);
    assert_eq!(report.imported_count, 1);
    assert_eq!(report.synthetic_admission_count, 1);
    assert!(report.errors.is_empty());

    // The synthesized number is deterministic, so we can reconstruct it
    // and look the student up by the natural key.
    let (expected, synthesized) = resolve_admission_number(
        "",
        &AdmissionSeed {
            class_token: "3",
            full_name: "Jane Doe",
            father_phone: "",
            dob: "",
            sheet_name: "CSV",
            row_index: 2,
        },
    );
    assert!(synthesized);
    assert!(expected.starts_with("AUTO-3-"));
    assert_eq!(expected.len(), "AUTO-3-".len() + 7);

    let repo = student_repo(&db_path);
    let student = repo.find_student("c3", &expected).await.unwrap().unwrap();
    assert_eq!(student.full_name, "Jane Doe");
    assert_eq!(student.father_name, "N/A");
    assert_eq!(student.father_phone, "0000000000");
    assert_eq!(student.term1_fee, 0.0);
    assert!(student.is_active);
}

// ==========================================
// Scenario: unresolved class
// ==========================================
#[tokio::test]
async fn unresolved_class_rejects_row_with_position_and_label() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv("admission_number,full_name,class\n,\"Jane Doe\",\"Class 99\"\n");
    let report = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    assert_eq!(report.status, ImportStatus::Failed);
    assert_eq!(report.imported_count, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("row 2"));
    assert!(report.errors[0].contains("Class 99"));

    let repo = student_repo(&db_path);
    assert_eq!(repo.count_students().await.unwrap(), 0);
}

// ==========================================
// Idempotent re-import
// ==========================================
#[tokio::test]
async fn reimporting_the_same_file_updates_instead_of_duplicating() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv(
        "admission_number,full_name,class,father_phone\n\
         ,\"Jane Doe\",\"Class 3\",9876543210\n\
         A-7,\"Ravi Kumar\",\"Class 5\",9123456780\n",
    );

    let first = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();
    let second = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    assert_eq!(first.status, ImportStatus::Success);
    assert_eq!(second.status, ImportStatus::Success);
    assert_eq!(first.imported_count, 2);
    assert_eq!(second.imported_count, 2);

    // Same file, same synthesized numbers: still two students, not four.
    let repo = student_repo(&db_path);
    assert_eq!(repo.count_students().await.unwrap(), 2);
}

// ==========================================
// Header-alias invariance
// ==========================================
#[tokio::test]
async fn header_spelling_does_not_change_the_imported_records() {
    let row = "A-1,\"Jane Doe\",\"Class 3\",9876543210,15/05/2018,\"1,500\",yes\n";
    let file_a = write_csv(&format!(
        "admission_number,full_name,class,father_phone,dob,term1_fee,has_transport\n{}",
        row
    ));
    let file_b = write_csv(&format!(
        "Admission No.,Student Name,Standard,Father Phone,D.O.B,Term 1 Fee,Transport\n{}",
        row
    ));

    let mut students = Vec::new();
    for file in [&file_a, &file_b] {
        let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
        let importer = build_importer(&db_path, CapturingAuditSink::new());

        let report = importer
            .import_file(file.path(), ImportScope::AllClasses)
            .await
            .unwrap();
        assert_eq!(report.status, ImportStatus::Success);

        let repo = student_repo(&db_path);
        students.push(repo.find_student("c3", "A-1").await.unwrap().unwrap());
    }

    assert_eq!(students[0], students[1]);
    assert_eq!(students[0].term1_fee, 1500.0);
    assert!(students[0].has_transport);
    assert_eq!(
        students[0].dob,
        chrono::NaiveDate::from_ymd_opt(2018, 5, 15)
    );
}

// ==========================================
// In-file dedup: last row wins
// ==========================================
#[tokio::test]
async fn duplicate_admission_numbers_in_one_file_keep_the_last_row() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv(
        "admission_number,full_name,class\n\
         A-1,\"First Spelling\",\"Class 3\"\n\
         a-1,\"Corrected Spelling\",\"Class 3\"\n",
    );
    let report = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    assert_eq!(report.imported_count, 1);

    let repo = student_repo(&db_path);
    assert_eq!(repo.count_students().await.unwrap(), 1);
    let student = repo.find_student("c3", "a-1").await.unwrap().unwrap();
    assert_eq!(student.full_name, "Corrected Spelling");
}

// ==========================================
// Scoped import
// ==========================================
#[tokio::test]
async fn scoped_import_skips_other_classes_silently() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv(
        "admission_number,full_name,class\n\
         A-1,\"Jane Doe\",\"Class 3\"\n\
         A-2,\"Ravi Kumar\",\"Class 5\"\n",
    );
    let report = importer
        .import_file(csv.path(), ImportScope::Class("Class 3".to_string()))
        .await
        .unwrap();

    assert_eq!(report.status, ImportStatus::Success);
    assert_eq!(report.imported_count, 1);
    assert_eq!(report.skipped_count, 1);
    assert!(report.errors.is_empty());

    let repo = student_repo(&db_path);
    assert_eq!(repo.count_students().await.unwrap(), 1);
    assert!(repo.find_student("c3", "A-1").await.unwrap().is_some());
    assert!(repo.find_student("c5", "A-2").await.unwrap().is_none());
}

#[tokio::test]
async fn scoped_csv_without_class_column_uses_the_scope_class() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    // No class column at all; the CSV placeholder sheet falls back to
    // the page-selected class.
    let csv = write_csv("admission_number,full_name\nA-9,\"Jane Doe\"\n");
    let report = importer
        .import_file(csv.path(), ImportScope::Class("Class 3".to_string()))
        .await
        .unwrap();

    assert_eq!(report.status, ImportStatus::Success);
    assert_eq!(report.imported_count, 1);

    let repo = student_repo(&db_path);
    assert!(repo.find_student("c3", "A-9").await.unwrap().is_some());
}

#[tokio::test]
async fn unknown_scope_class_fails_fast() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv("admission_number,full_name,class\nA-1,\"Jane Doe\",\"Class 3\"\n");
    let result = importer
        .import_file(csv.path(), ImportScope::Class("Class 42".to_string()))
        .await;

    assert!(matches!(result, Err(ImportError::ScopeClassNotFound(_))));
}

// ==========================================
// Failure modes
// ==========================================
#[tokio::test]
async fn unsupported_extension_aborts_before_parsing() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let mut file = Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(b"not a roster").unwrap();

    let result = importer
        .import_file(file.path(), ImportScope::AllClasses)
        .await;
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn header_only_file_fails_without_panicking() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv("admission_number,full_name,class\n");
    let report = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    assert_eq!(report.status, ImportStatus::Failed);
    assert_eq!(report.imported_count, 0);
    assert!(report.errors[0].contains("no data rows"));
}

#[tokio::test]
async fn unrecognized_headers_report_no_recognized_data() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv("colA,colB\nfoo,bar\n");
    let report = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    assert_eq!(report.status, ImportStatus::Failed);
    assert!(report.errors[0].contains("no student data recognized"));
}

#[tokio::test]
async fn blank_rows_are_skipped_without_errors() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv(
        "admission_number,full_name,class\n\
         ,,\n\
         A-1,\"Jane Doe\",\"Class 3\"\n",
    );
    let report = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    assert_eq!(report.status, ImportStatus::Success);
    assert_eq!(report.imported_count, 1);
    assert!(report.errors.is_empty());
}

// ==========================================
// Partial success and bookkeeping
// ==========================================
#[tokio::test]
async fn partial_success_imports_good_rows_and_reports_bad_ones() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer(&db_path, CapturingAuditSink::new());

    let csv = write_csv(
        "admission_number,full_name,class\n\
         A-1,\"Jane Doe\",\"Class 3\"\n\
         A-2,\"Lost Student\",\"Class 99\"\n\
         A-3,\"Ravi Kumar\",\"Class 5\"\n",
    );
    let report = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    assert_eq!(report.status, ImportStatus::Partial);
    assert_eq!(report.imported_count, 2);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("row 3"));

    let summary = report.summary_message(3);
    assert!(summary.contains("Imported 2 student(s)"));
    assert!(summary.contains("Class 99"));
}

#[tokio::test]
async fn small_batch_size_still_imports_everything_in_order() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let importer = build_importer_with_config(
        &db_path,
        MockConfigReader { batch_size: 2 },
        CapturingAuditSink::new(),
    );

    let mut content = String::from("admission_number,full_name,class\n");
    for i in 1..=7 {
        content.push_str(&format!("A-{},\"Student {}\",\"Class 3\"\n", i, i));
    }
    let csv = write_csv(&content);

    let report = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    assert_eq!(report.status, ImportStatus::Success);
    assert_eq!(report.imported_count, 7);

    let repo = student_repo(&db_path);
    assert_eq!(repo.count_students().await.unwrap(), 7);
}

#[tokio::test]
async fn import_writes_ledger_row_and_audit_event() {
    let (_db_file, db_path) = test_helpers::create_test_db().unwrap();
    let audit = CapturingAuditSink::new();
    let importer = build_importer(&db_path, audit.clone());

    let csv = write_csv("admission_number,full_name,class\nA-1,\"Jane Doe\",\"Class 3\"\n");
    let report = importer
        .import_file(csv.path(), ImportScope::AllClasses)
        .await
        .unwrap();

    let conn = Connection::open(&db_path).unwrap();
    let (count, status): (i64, String) = conn
        .query_row(
            "SELECT COUNT(*), MAX(status) FROM import_batch WHERE batch_id = ?1",
            [&report.batch_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(status, "success");

    let events = audit.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, "roster_import");
    assert_eq!(events[0].detail["imported"], 1);
}
