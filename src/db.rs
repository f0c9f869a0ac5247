// ==========================================
// School Admin Dashboard - SQLite Connection Setup
// ==========================================
// Goals:
// - one PRAGMA policy for every Connection::open in the crate
// - one busy_timeout so concurrent writers see fewer busy errors
// - schema bootstrap for fresh databases
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the uniform PRAGMAs to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings, so every
/// open path must go through here.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the uniform configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the roster tables if they do not exist yet.
///
/// `students` is keyed on (class_id, admission_number): the same pair on
/// a later import updates the row instead of inserting a duplicate.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS classes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            sort_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS students (
            class_id TEXT NOT NULL REFERENCES classes(id),
            admission_number TEXT NOT NULL,
            full_name TEXT NOT NULL,
            roll_number TEXT,
            gender TEXT,
            dob TEXT,
            aadhaar TEXT,
            address TEXT,
            father_name TEXT NOT NULL,
            father_phone TEXT NOT NULL,
            mother_name TEXT,
            mother_phone TEXT,
            parent_email TEXT,
            term1_fee REAL NOT NULL DEFAULT 0,
            term2_fee REAL NOT NULL DEFAULT 0,
            term3_fee REAL NOT NULL DEFAULT 0,
            books_fee REAL NOT NULL DEFAULT 0,
            transport_fee REAL NOT NULL DEFAULT 0,
            old_dues REAL NOT NULL DEFAULT 0,
            has_books INTEGER NOT NULL DEFAULT 0,
            has_transport INTEGER NOT NULL DEFAULT 0,
            student_type TEXT NOT NULL DEFAULT 'new',
            joining_date TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (class_id, admission_number)
        );

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            file_name TEXT,
            total_rows INTEGER NOT NULL,
            imported_rows INTEGER NOT NULL,
            synthetic_rows INTEGER NOT NULL,
            skipped_rows INTEGER NOT NULL,
            error_rows INTEGER NOT NULL,
            status TEXT NOT NULL,
            imported_at TEXT,
            imported_by TEXT,
            elapsed_ms INTEGER,
            errors_json TEXT
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}
