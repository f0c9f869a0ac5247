// ==========================================
// School Admin Dashboard - Student Import Repository
// ==========================================
// Write access for the import pipeline: transactional batch upserts on
// (class_id, admission_number) plus the import ledger.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::student::{ImportBatch, StudentRecord};
use crate::domain::types::{StudentStatus, StudentType};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Transaction};
use std::error::Error;
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait StudentImportRepository: Send + Sync {
    /// Upsert one batch of students in a single transaction.
    ///
    /// Conflict key is (class_id, admission_number): an existing student
    /// is updated in place, `created_at` is preserved.
    ///
    /// Returns the number of records written; on error the whole batch
    /// rolls back (earlier batches of the same import are unaffected).
    async fn batch_upsert_students(
        &self,
        students: Vec<StudentRecord>,
    ) -> Result<usize, Box<dyn Error>>;

    /// Record one import run in the ledger.
    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error>>;

    /// Look up one student by its natural key.
    async fn find_student(
        &self,
        class_id: &str,
        admission_number: &str,
    ) -> Result<Option<StudentRecord>, Box<dyn Error>>;

    /// Total students in the roster.
    async fn count_students(&self) -> Result<usize, Box<dyn Error>>;
}

// ==========================================
// StudentImportRepositoryImpl (rusqlite)
// ==========================================
pub struct StudentImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl StudentImportRepositoryImpl {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn batch_upsert_students_tx(
        tx: &Transaction,
        students: &[StudentRecord],
    ) -> Result<usize, Box<dyn Error>> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO students (
                class_id, admission_number, full_name, roll_number, gender,
                dob, aadhaar, address, father_name, father_phone,
                mother_name, mother_phone, parent_email,
                term1_fee, term2_fee, term3_fee, books_fee, transport_fee, old_dues,
                has_books, has_transport, student_type, joining_date,
                is_active, status, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27
            )
            ON CONFLICT(class_id, admission_number) DO UPDATE SET
                full_name = excluded.full_name,
                roll_number = excluded.roll_number,
                gender = excluded.gender,
                dob = excluded.dob,
                aadhaar = excluded.aadhaar,
                address = excluded.address,
                father_name = excluded.father_name,
                father_phone = excluded.father_phone,
                mother_name = excluded.mother_name,
                mother_phone = excluded.mother_phone,
                parent_email = excluded.parent_email,
                term1_fee = excluded.term1_fee,
                term2_fee = excluded.term2_fee,
                term3_fee = excluded.term3_fee,
                books_fee = excluded.books_fee,
                transport_fee = excluded.transport_fee,
                old_dues = excluded.old_dues,
                has_books = excluded.has_books,
                has_transport = excluded.has_transport,
                student_type = excluded.student_type,
                joining_date = excluded.joining_date,
                is_active = excluded.is_active,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )?;

        let now = Utc::now().to_rfc3339();
        let mut count = 0;
        for student in students {
            stmt.execute(params![
                student.class_id,
                student.admission_number,
                student.full_name,
                student.roll_number,
                student.gender,
                student.dob.map(|d| d.format("%Y-%m-%d").to_string()),
                student.aadhaar,
                student.address,
                student.father_name,
                student.father_phone,
                student.mother_name,
                student.mother_phone,
                student.parent_email,
                student.term1_fee,
                student.term2_fee,
                student.term3_fee,
                student.books_fee,
                student.transport_fee,
                student.old_dues,
                student.has_books as i32,
                student.has_transport as i32,
                student.student_type.as_str(),
                student.joining_date.format("%Y-%m-%d").to_string(),
                student.is_active as i32,
                student.status.as_str(),
                now,
                now,
            ])?;
            count += 1;
        }

        Ok(count)
    }
}

#[async_trait]
impl StudentImportRepository for StudentImportRepositoryImpl {
    async fn batch_upsert_students(
        &self,
        students: Vec<StudentRecord>,
    ) -> Result<usize, Box<dyn Error>> {
        let mut conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let tx = conn.transaction()?;
        let count = Self::batch_upsert_students_tx(&tx, &students)?;
        tx.commit()?;

        Ok(count)
    }

    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, total_rows, imported_rows, synthetic_rows,
                skipped_rows, error_rows, status, imported_at, imported_by,
                elapsed_ms, errors_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.total_rows,
                batch.imported_rows,
                batch.synthetic_rows,
                batch.skipped_rows,
                batch.error_rows,
                batch.status.as_str(),
                batch.imported_at.map(|t| t.to_rfc3339()),
                batch.imported_by,
                batch.elapsed_ms,
                batch.errors_json,
            ],
        )?;

        Ok(())
    }

    async fn find_student(
        &self,
        class_id: &str,
        admission_number: &str,
    ) -> Result<Option<StudentRecord>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT class_id, admission_number, full_name, roll_number, gender,
                   dob, aadhaar, address, father_name, father_phone,
                   mother_name, mother_phone, parent_email,
                   term1_fee, term2_fee, term3_fee, books_fee, transport_fee, old_dues,
                   has_books, has_transport, student_type, joining_date, is_active
            FROM students
            WHERE class_id = ?1 AND admission_number = ?2
            "#,
        )?;

        let mut rows = stmt.query_map(params![class_id, admission_number], |row| {
            let dob: Option<String> = row.get(5)?;
            let student_type: String = row.get(21)?;
            let joining_date: Option<String> = row.get(22)?;

            Ok(StudentRecord {
                class_id: row.get(0)?,
                admission_number: row.get(1)?,
                full_name: row.get(2)?,
                roll_number: row.get(3)?,
                gender: row.get(4)?,
                dob: dob.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                aadhaar: row.get(6)?,
                address: row.get(7)?,
                father_name: row.get(8)?,
                father_phone: row.get(9)?,
                mother_name: row.get(10)?,
                mother_phone: row.get(11)?,
                parent_email: row.get(12)?,
                term1_fee: row.get(13)?,
                term2_fee: row.get(14)?,
                term3_fee: row.get(15)?,
                books_fee: row.get(16)?,
                transport_fee: row.get(17)?,
                old_dues: row.get(18)?,
                has_books: row.get::<_, i32>(19)? != 0,
                has_transport: row.get::<_, i32>(20)? != 0,
                student_type: StudentType::from_raw(&student_type),
                joining_date: joining_date
                    .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
                    .unwrap_or_default(),
                is_active: row.get::<_, i32>(23)? != 0,
                status: StudentStatus::Active,
                admission_synthesized: false,
                source_row: 0,
            })
        })?;

        match rows.next() {
            Some(record) => Ok(Some(record?)),
            None => Ok(None),
        }
    }

    async fn count_students(&self) -> Result<usize, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
