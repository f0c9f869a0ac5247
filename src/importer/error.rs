// ==========================================
// School Admin Dashboard - Import Error Types
// ==========================================
// thiserror derive; per-row problems are NOT errors here - they are
// accumulated as RowRejection values and never abort the batch.
// ==========================================

use thiserror::Error;

/// File-level and persistence-level failures of the roster import.
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .csv/.xls/.xlsx)")]
    UnsupportedFormat(String),

    #[error("failed to read file: {0}")]
    FileReadError(String),

    #[error("failed to parse Excel workbook: {0}")]
    ExcelParseError(String),

    #[error("failed to parse CSV: {0}")]
    CsvParseError(String),

    // ===== Scope errors =====
    #[error("scope class not found in class list: {0}")]
    ScopeClassNotFound(String),

    // ===== Database errors =====
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error(
        "database write failed on batch {batch_index}: {message} \
         (first {rows_sent} row(s) were imported and are not rolled back)"
    )]
    PersistenceFailure {
        batch_index: usize,
        rows_sent: usize,
        message: String,
    },

    // ===== Generic =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result alias for the import module.
pub type ImportResult<T> = Result<T, ImportError>;
