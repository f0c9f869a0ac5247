// ==========================================
// School Admin Dashboard - Roster Import Interfaces
// ==========================================
// Trait seams between the pipeline and its collaborators; no
// implementations here.
// ==========================================

use crate::domain::student::ImportReport;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawSheet;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// ImportScope - where the import was launched from
// ==========================================
// A global "all classes" import accepts rows for every known class; an
// import launched from one class's page only keeps that class's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportScope {
    AllClasses,
    Class(String),
}

impl ImportScope {
    pub fn class_name(&self) -> Option<&str> {
        match self {
            ImportScope::AllClasses => None,
            ImportScope::Class(name) => Some(name),
        }
    }
}

// ==========================================
// RosterImporter Trait
// ==========================================
// Main entry point: one uploaded file in, one report out. Implemented by
// RosterImporterImpl.
#[async_trait]
pub trait RosterImporter: Send + Sync {
    /// Import one roster file (.csv/.xls/.xlsx).
    ///
    /// Pipeline: decode -> header resolution -> per-row normalization,
    /// class matching and admission-number synthesis -> in-file dedup ->
    /// sequential upsert batches.
    ///
    /// Row-level problems are accumulated into the report, never thrown.
    /// `Err` is reserved for failures before rows are processed
    /// (unsupported format, unreadable file, class prefetch failure).
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        scope: ImportScope,
    ) -> ImportResult<ImportReport>;
}

// ==========================================
// FileParser Trait
// ==========================================
// Decodes one file into sheets of string cells.
// Implemented by CsvParser / ExcelParser.
pub trait FileParser: Send + Sync {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>>;
}
