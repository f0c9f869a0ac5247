// ==========================================
// School Admin Dashboard - Tabular Decoder
// ==========================================
// Turns an uploaded roster file into rectangular string cells, uniformly
// for CSV and Excel workbooks.
// Supports: Excel (.xlsx/.xls, all sheets) / CSV (.csv, one implicit sheet)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalize::excel_serial_to_date;
use crate::importer::roster_importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::Path;

/// Sheet name assigned to CSV input. Single-class imports use this
/// placeholder to fall back to the page-selected class.
pub const CSV_SHEET_NAME: &str = "CSV";

// ==========================================
// RawRow / RawSheet - decoder output
// ==========================================
// Fully-empty rows are dropped, but `number` keeps each row's original
// 1-based position so rejections point at the real line in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub number: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<RawRow>,
}

// ==========================================
// CsvParser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(
                file_path.display().to_string(),
            ));
        }

        let mut bytes = std::fs::read(file_path)?;

        // Strip a leading UTF-8 byte-order-mark before parsing.
        if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            bytes.drain(..3);
        }

        // Header detection happens downstream, so every line is a plain row.
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row = RawRow {
                number: idx + 1,
                cells: record.iter().map(|v| v.trim().to_string()).collect(),
            };
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(vec![RawSheet {
            name: CSV_SHEET_NAME.to_string(),
            rows,
        }])
    }
}

// ==========================================
// ExcelParser
// ==========================================
// Reads every sheet of the workbook; an "all classes" upload commonly
// carries one sheet per class.
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(
                file_path.display().to_string(),
            ));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError(
                "workbook has no sheets".to_string(),
            ));
        }

        let mut sheets = Vec::new();
        for name in &sheet_names {
            let range = workbook
                .worksheet_range(name)
                .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

            let mut rows = Vec::new();
            for (idx, data_row) in range.rows().enumerate() {
                let row = RawRow {
                    number: idx + 1,
                    cells: data_row.iter().map(cell_to_string).collect(),
                };
                if row.is_blank() {
                    continue;
                }
                rows.push(row);
            }

            sheets.push(RawSheet {
                name: name.clone(),
                rows,
            });
        }

        Ok(sheets)
    }
}

/// Render one workbook cell as text. Date-typed cells become ISO dates
/// rather than numeric serials; whole-number floats drop the ".0" so
/// admission numbers and phone columns survive Excel's number typing.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if *f == (*f as i64) as f64 && f.abs() < i64::MAX as f64 {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

// ==========================================
// UniversalFileParser - dispatch by extension
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// A file whose extension is not .csv/.xls/.xlsx is rejected before
    /// any bytes are parsed.
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawSheet>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_sheets(path),
            "xlsx" | "xls" => ExcelParser.parse_sheets(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_csv_parser_basic() {
        let file = write_csv("admission_number,full_name,class\nA-1,Jane Doe,Class 3\n");
        let sheets = CsvParser.parse_sheets(file.path()).unwrap();

        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "CSV");
        assert_eq!(sheets[0].rows.len(), 2);
        assert_eq!(sheets[0].rows[1].cells[1], "Jane Doe");
    }

    #[test]
    fn test_csv_parser_strips_bom() {
        let file = write_csv("\u{feff}full_name,class\nJane,Class 1\n");
        let sheets = CsvParser.parse_sheets(file.path()).unwrap();

        assert_eq!(sheets[0].rows[0].cells[0], "full_name");
    }

    #[test]
    fn test_csv_parser_quoted_fields() {
        let file = write_csv("full_name,address\n\"Doe, Jane\",\"12 \"\"A\"\" Street\"\n");
        let sheets = CsvParser.parse_sheets(file.path()).unwrap();

        assert_eq!(sheets[0].rows[1].cells[0], "Doe, Jane");
        assert_eq!(sheets[0].rows[1].cells[1], "12 \"A\" Street");
    }

    #[test]
    fn test_csv_parser_blank_rows_keep_numbering() {
        let file = write_csv("full_name,class\nJane,Class 1\n,\nRavi,Class 2\n");
        let sheets = CsvParser.parse_sheets(file.path()).unwrap();

        // Blank row 3 is dropped but Ravi stays at row 4.
        assert_eq!(sheets[0].rows.len(), 3);
        assert_eq!(sheets[0].rows[2].number, 4);
        assert_eq!(sheets[0].rows[2].cells[0], "Ravi");
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"data").unwrap();

        let result = UniversalFileParser.parse(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_sheets(Path::new("no_such_roster.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_cell_to_string_whole_float() {
        assert_eq!(cell_to_string(&Data::Float(9876543210.0)), "9876543210");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
    }

    #[test]
    fn test_cell_to_string_date_cell() {
        // Excel stores dates as serial numbers; 43236 renders as 2018-05-15.
        let dt = calamine::ExcelDateTime::new(
            43236.0,
            calamine::ExcelDateTimeType::DateTime,
            false,
        );
        assert_eq!(cell_to_string(&Data::DateTime(dt)), "2018-05-15");
    }
}
