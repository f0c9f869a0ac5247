// ==========================================
// School Admin Dashboard - Row Assembler & Validator
// ==========================================
// Combines the normalizers, class matcher and admission-number
// synthesizer into one candidate record per data row. Every row gets an
// explicit tagged outcome; nothing here ever aborts the batch.
// ==========================================

use crate::domain::student::{RowRejection, StudentRecord};
use crate::domain::types::{StudentStatus, StudentType};
use crate::importer::admission::{resolve_admission_number, AdmissionSeed};
use crate::importer::class_matcher::ClassMatcher;
use crate::importer::file_parser::RawRow;
use crate::importer::header_resolver::{field, HeaderMap};
use crate::importer::normalize::{
    class_token, normalize_date, normalize_fee, normalize_flag, normalize_text,
};
use crate::importer::roster_importer_trait::ImportScope;
use chrono::NaiveDate;

// ==========================================
// RowOutcome - per-row tagged result
// ==========================================
#[derive(Debug)]
pub enum RowOutcome {
    Assembled(Box<StudentRecord>),
    /// Blank separator row, or a row outside the import's class scope.
    Skipped,
    Rejected(RowRejection),
}

// ==========================================
// RowAssembler
// ==========================================
pub struct RowAssembler<'a> {
    headers: &'a HeaderMap,
    matcher: &'a ClassMatcher,
    scope: &'a ImportScope,
    scope_class_id: Option<String>,
    import_date: NaiveDate,
    guardian_name_placeholder: &'a str,
    guardian_phone_placeholder: &'a str,
}

impl<'a> RowAssembler<'a> {
    pub fn new(
        headers: &'a HeaderMap,
        matcher: &'a ClassMatcher,
        scope: &'a ImportScope,
        import_date: NaiveDate,
        guardian_name_placeholder: &'a str,
        guardian_phone_placeholder: &'a str,
    ) -> Self {
        let scope_class_id = scope
            .class_name()
            .and_then(|name| matcher.match_label(name))
            .map(|class| class.id.clone());

        Self {
            headers,
            matcher,
            scope,
            scope_class_id,
            import_date,
            guardian_name_placeholder,
            guardian_phone_placeholder,
        }
    }

    pub fn assemble(&self, sheet_name: &str, row: &RawRow) -> RowOutcome {
        let raw_admission = self.headers.cell(row, field::ADMISSION_NUMBER);
        let raw_name = self.headers.cell(row, field::FULL_NAME);

        // No admission number and no name: a blank separator row.
        if raw_admission.is_empty() && raw_name.is_empty() {
            return RowOutcome::Skipped;
        }

        if raw_name.is_empty() {
            return RowOutcome::Rejected(RowRejection {
                sheet: sheet_name.to_string(),
                row_number: row.number,
                reason: "student name is missing".to_string(),
            });
        }

        let raw_class = self.headers.cell(row, field::CLASS);
        let class = match self.matcher.resolve(raw_class, sheet_name, self.scope) {
            Some(class) => class,
            None => {
                let reason = if raw_class.is_empty() {
                    "no class given and none could be inferred".to_string()
                } else {
                    format!("class \"{}\" not recognized", raw_class)
                };
                return RowOutcome::Rejected(RowRejection {
                    sheet: sheet_name.to_string(),
                    row_number: row.number,
                    reason,
                });
            }
        };

        // Single-class import: rows belonging to other classes are
        // dropped silently so a multi-class file can be applied to one
        // class's page without error noise.
        if let Some(scope_id) = &self.scope_class_id {
            if class.id != *scope_id {
                return RowOutcome::Skipped;
            }
        }

        let dob = normalize_date(self.headers.cell(row, field::DOB));
        let raw_father_phone = self.headers.cell(row, field::FATHER_PHONE);

        let token = class_token(&class.name);
        let dob_text = dob.map(|d| d.to_string()).unwrap_or_default();
        let seed = AdmissionSeed {
            class_token: &token,
            full_name: raw_name,
            father_phone: raw_father_phone,
            dob: &dob_text,
            sheet_name,
            row_index: row.number,
        };
        let (admission_number, admission_synthesized) =
            resolve_admission_number(raw_admission, &seed);

        let joining_date = normalize_date(self.headers.cell(row, field::JOINING_DATE))
            .unwrap_or(self.import_date);

        let record = StudentRecord {
            class_id: class.id.clone(),
            admission_number,
            full_name: raw_name.to_string(),
            roll_number: normalize_text(self.headers.cell(row, field::ROLL_NUMBER)),
            gender: normalize_text(self.headers.cell(row, field::GENDER)),
            dob,
            aadhaar: normalize_text(self.headers.cell(row, field::AADHAAR)),
            address: normalize_text(self.headers.cell(row, field::ADDRESS)),
            father_name: normalize_text(self.headers.cell(row, field::FATHER_NAME))
                .unwrap_or_else(|| self.guardian_name_placeholder.to_string()),
            father_phone: normalize_text(raw_father_phone)
                .unwrap_or_else(|| self.guardian_phone_placeholder.to_string()),
            mother_name: normalize_text(self.headers.cell(row, field::MOTHER_NAME)),
            mother_phone: normalize_text(self.headers.cell(row, field::MOTHER_PHONE)),
            parent_email: normalize_text(self.headers.cell(row, field::PARENT_EMAIL)),
            term1_fee: normalize_fee(self.headers.cell(row, field::TERM1_FEE)),
            term2_fee: normalize_fee(self.headers.cell(row, field::TERM2_FEE)),
            term3_fee: normalize_fee(self.headers.cell(row, field::TERM3_FEE)),
            books_fee: normalize_fee(self.headers.cell(row, field::BOOKS_FEE)),
            transport_fee: normalize_fee(self.headers.cell(row, field::TRANSPORT_FEE)),
            old_dues: normalize_fee(self.headers.cell(row, field::OLD_DUES)),
            has_books: normalize_flag(self.headers.cell(row, field::HAS_BOOKS)),
            has_transport: normalize_flag(self.headers.cell(row, field::HAS_TRANSPORT)),
            student_type: StudentType::from_raw(self.headers.cell(row, field::STUDENT_TYPE)),
            joining_date,
            is_active: true,
            status: StudentStatus::Active,
            admission_synthesized,
            source_row: row.number,
        };

        RowOutcome::Assembled(Box::new(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::class::ClassEntity;
    use crate::importer::header_resolver::resolve_headers;
    use crate::importer::file_parser::RawSheet;

    const N_A: &str = "N/A";
    const NO_PHONE: &str = "0000000000";

    fn sheet(rows: &[&[&str]]) -> RawSheet {
        RawSheet {
            name: "CSV".to_string(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(idx, cells)| RawRow {
                    number: idx + 1,
                    cells: cells.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        }
    }

    fn matcher() -> ClassMatcher {
        ClassMatcher::new(vec![
            ClassEntity::new("c3", "Class 3", 1),
            ClassEntity::new("c5", "Class 5", 2),
        ])
    }

    fn import_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
    }

    #[test]
    fn test_minimal_row_synthesizes_admission_number() {
        let sheet = sheet(&[
            &["admission_number", "full_name", "class"],
            &["", "Jane Doe", "Class 3"],
        ]);
        let (_, headers) = resolve_headers(&sheet).unwrap();
        let m = matcher();
        let scope = ImportScope::AllClasses;
        let assembler = RowAssembler::new(&headers, &m, &scope, import_date(), N_A, NO_PHONE);

        match assembler.assemble("CSV", &sheet.rows[1]) {
            RowOutcome::Assembled(rec) => {
                assert_eq!(rec.class_id, "c3");
                assert_eq!(rec.full_name, "Jane Doe");
                assert!(rec.admission_synthesized);
                let suffix = rec.admission_number.strip_prefix("AUTO-3-").expect("prefix");
                assert_eq!(suffix.len(), 7);
                assert_eq!(rec.father_name, N_A);
                assert_eq!(rec.father_phone, NO_PHONE);
                assert_eq!(rec.term1_fee, 0.0);
                assert!(!rec.has_transport);
                assert_eq!(rec.student_type, StudentType::New);
                assert_eq!(rec.joining_date, import_date());
                assert!(rec.is_active);
            }
            other => panic!("expected Assembled, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_row_is_skipped_silently() {
        let sheet = sheet(&[
            &["admission_number", "full_name", "class"],
            &["", "", "Class 3"],
        ]);
        let (_, headers) = resolve_headers(&sheet).unwrap();
        let m = matcher();
        let scope = ImportScope::AllClasses;
        let assembler = RowAssembler::new(&headers, &m, &scope, import_date(), N_A, NO_PHONE);

        assert!(matches!(
            assembler.assemble("CSV", &sheet.rows[1]),
            RowOutcome::Skipped
        ));
    }

    #[test]
    fn test_unresolved_class_is_rejected_with_row_number() {
        let sheet = sheet(&[
            &["admission_number", "full_name", "class"],
            &["", "Jane Doe", "Class 99"],
        ]);
        let (_, headers) = resolve_headers(&sheet).unwrap();
        let m = matcher();
        let scope = ImportScope::AllClasses;
        let assembler = RowAssembler::new(&headers, &m, &scope, import_date(), N_A, NO_PHONE);

        match assembler.assemble("CSV", &sheet.rows[1]) {
            RowOutcome::Rejected(rejection) => {
                assert_eq!(rejection.row_number, 2);
                assert!(rejection.reason.contains("Class 99"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_row_with_admission_but_no_name_is_rejected() {
        let sheet = sheet(&[
            &["admission_number", "full_name", "class"],
            &["A-101", "", "Class 3"],
        ]);
        let (_, headers) = resolve_headers(&sheet).unwrap();
        let m = matcher();
        let scope = ImportScope::AllClasses;
        let assembler = RowAssembler::new(&headers, &m, &scope, import_date(), N_A, NO_PHONE);

        match assembler.assemble("CSV", &sheet.rows[1]) {
            RowOutcome::Rejected(rejection) => {
                assert!(rejection.reason.contains("name"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_scope_row_is_skipped_not_rejected() {
        let sheet = sheet(&[
            &["admission_number", "full_name", "class"],
            &["A-1", "Jane Doe", "Class 5"],
            &["A-2", "Ravi Kumar", "Class 3"],
        ]);
        let (_, headers) = resolve_headers(&sheet).unwrap();
        let m = matcher();
        let scope = ImportScope::Class("Class 3".to_string());
        let assembler = RowAssembler::new(&headers, &m, &scope, import_date(), N_A, NO_PHONE);

        assert!(matches!(
            assembler.assemble("CSV", &sheet.rows[1]),
            RowOutcome::Skipped
        ));
        assert!(matches!(
            assembler.assemble("CSV", &sheet.rows[2]),
            RowOutcome::Assembled(_)
        ));
    }

    #[test]
    fn test_full_row_normalization() {
        let sheet = sheet(&[
            &[
                "Admission No.", "Student Name", "Standard", "Roll No", "Gender",
                "Father Name", "Father Phone", "D.O.B", "Term 1 Fee", "Bus Fee",
                "Transport", "Student Type", "Date of Joining",
            ],
            &[
                "A-7", " Ravi Kumar ", "V", "12", "M",
                "Suresh Kumar", "9876543210", "15/05/2018", "1,500", "800",
                "Bus", "OLD", "01-04-24",
            ],
        ]);
        let (_, headers) = resolve_headers(&sheet).unwrap();
        let m = matcher();
        let scope = ImportScope::AllClasses;
        let assembler = RowAssembler::new(&headers, &m, &scope, import_date(), N_A, NO_PHONE);

        match assembler.assemble("Sheet1", &sheet.rows[1]) {
            RowOutcome::Assembled(rec) => {
                assert_eq!(rec.admission_number, "A-7");
                assert!(!rec.admission_synthesized);
                assert_eq!(rec.class_id, "c5");
                assert_eq!(rec.full_name, "Ravi Kumar");
                assert_eq!(rec.roll_number.as_deref(), Some("12"));
                assert_eq!(rec.father_phone, "9876543210");
                assert_eq!(rec.dob, NaiveDate::from_ymd_opt(2018, 5, 15));
                assert_eq!(rec.term1_fee, 1500.0);
                assert_eq!(rec.transport_fee, 800.0);
                assert!(rec.has_transport);
                assert_eq!(rec.student_type, StudentType::Old);
                assert_eq!(
                    rec.joining_date,
                    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
                );
            }
            other => panic!("expected Assembled, got {:?}", other),
        }
    }
}
