// ==========================================
// School Admin Dashboard - Header Resolver
// ==========================================
// Locates the header row and maps arbitrary column-name spellings to
// canonical student fields through a static alias table. The HeaderMap
// is built once per sheet; row processing reads through it instead of
// guessing key spellings per cell.
// ==========================================

use crate::importer::file_parser::{RawRow, RawSheet};
use std::collections::HashMap;

// ==========================================
// Canonical field names
// ==========================================
// These are also the exact headers of the downloadable roster template.
pub mod field {
    pub const ADMISSION_NUMBER: &str = "admission_number";
    pub const FULL_NAME: &str = "full_name";
    pub const CLASS: &str = "class";
    pub const ROLL_NUMBER: &str = "roll_number";
    pub const GENDER: &str = "gender";
    pub const FATHER_NAME: &str = "father_name";
    pub const FATHER_PHONE: &str = "father_phone";
    pub const MOTHER_NAME: &str = "mother_name";
    pub const MOTHER_PHONE: &str = "mother_phone";
    pub const DOB: &str = "dob";
    pub const AADHAAR: &str = "aadhaar";
    pub const ADDRESS: &str = "address";
    pub const PARENT_EMAIL: &str = "parent_email";
    pub const TERM1_FEE: &str = "term1_fee";
    pub const TERM2_FEE: &str = "term2_fee";
    pub const TERM3_FEE: &str = "term3_fee";
    pub const BOOKS_FEE: &str = "books_fee";
    pub const TRANSPORT_FEE: &str = "transport_fee";
    pub const OLD_DUES: &str = "old_dues";
    pub const HAS_BOOKS: &str = "has_books";
    pub const HAS_TRANSPORT: &str = "has_transport";
    pub const STUDENT_TYPE: &str = "student_type";
    pub const JOINING_DATE: &str = "joining_date";
}

/// Canonical fields in template column order.
pub const CANONICAL_FIELDS: [&str; 23] = [
    field::ADMISSION_NUMBER,
    field::FULL_NAME,
    field::CLASS,
    field::ROLL_NUMBER,
    field::GENDER,
    field::FATHER_NAME,
    field::FATHER_PHONE,
    field::MOTHER_NAME,
    field::MOTHER_PHONE,
    field::DOB,
    field::AADHAAR,
    field::ADDRESS,
    field::PARENT_EMAIL,
    field::TERM1_FEE,
    field::TERM2_FEE,
    field::TERM3_FEE,
    field::BOOKS_FEE,
    field::TRANSPORT_FEE,
    field::OLD_DUES,
    field::HAS_BOOKS,
    field::HAS_TRANSPORT,
    field::STUDENT_TYPE,
    field::JOINING_DATE,
];

// Alias tokens are pre-normalized (lowercase alphanumerics). Every
// canonical field lists its own normalized spelling first so the
// template round-trips through its own importer.
const ALIASES: [(&str, &[&str]); 23] = [
    (
        field::ADMISSION_NUMBER,
        &[
            "admissionnumber",
            "admissionno",
            "admno",
            "admissionid",
            "regno",
            "registrationno",
            "srno",
            "serialno",
            "enrollmentno",
            "enrolmentno",
        ],
    ),
    (
        field::FULL_NAME,
        &[
            "fullname",
            "studentname",
            "name",
            "stname",
            "nameofstudent",
            "childname",
            "studentsname",
        ],
    ),
    (
        field::CLASS,
        &["class", "classname", "standard", "std", "grade"],
    ),
    (field::ROLL_NUMBER, &["rollnumber", "rollno", "roll"]),
    (field::GENDER, &["gender", "sex"]),
    (
        field::FATHER_NAME,
        &["fathername", "fathersname", "father", "guardianname"],
    ),
    (
        field::FATHER_PHONE,
        &[
            "fatherphone",
            "fathersphone",
            "fathermobile",
            "fathercontact",
            "phone",
            "mobile",
            "mobileno",
            "phonenumber",
            "contactno",
            "contact",
            "parentphone",
            "whatsappno",
            "whatsappnumber",
        ],
    ),
    (
        field::MOTHER_NAME,
        &["mothername", "mothersname", "mother"],
    ),
    (
        field::MOTHER_PHONE,
        &["motherphone", "mothersphone", "mothermobile", "mothercontact"],
    ),
    (field::DOB, &["dob", "dateofbirth", "birthdate", "birthday"]),
    (
        field::AADHAAR,
        &[
            "aadhaar",
            "aadhar",
            "aadhaarno",
            "aadharno",
            "aadhaarnumber",
            "aadharnumber",
            "uid",
            "uidno",
        ],
    ),
    (
        field::ADDRESS,
        &["address", "residentialaddress", "homeaddress", "fulladdress"],
    ),
    (
        field::PARENT_EMAIL,
        &["parentemail", "email", "emailid", "mailid"],
    ),
    (
        field::TERM1_FEE,
        &["term1fee", "term1", "firstterm", "firsttermfee", "1stterm"],
    ),
    (
        field::TERM2_FEE,
        &["term2fee", "term2", "secondterm", "secondtermfee", "2ndterm"],
    ),
    (
        field::TERM3_FEE,
        &["term3fee", "term3", "thirdterm", "thirdtermfee", "3rdterm"],
    ),
    (
        field::BOOKS_FEE,
        &["booksfee", "bookfee", "bookamount", "booksamount"],
    ),
    (
        field::TRANSPORT_FEE,
        &[
            "transportfee",
            "busfee",
            "vanfee",
            "transportamount",
            "transportcharges",
        ],
    ),
    (
        field::OLD_DUES,
        &[
            "olddues",
            "dues",
            "previousdues",
            "oldbalance",
            "previousbalance",
            "pendingdues",
            "arrears",
        ],
    ),
    (
        field::HAS_BOOKS,
        &["hasbooks", "booksopted", "booksrequired", "optedbooks"],
    ),
    (
        field::HAS_TRANSPORT,
        &[
            "hastransport",
            "transport",
            "transportopted",
            "usestransport",
            "availingtransport",
            "transportrequired",
        ],
    ),
    (
        field::STUDENT_TYPE,
        &["studenttype", "type", "oldnew", "studentcategory"],
    ),
    (
        field::JOINING_DATE,
        &[
            "joiningdate",
            "dateofjoining",
            "doj",
            "admissiondate",
            "dateofadmission",
        ],
    ),
];

/// Lowercase and strip every character that is not a lowercase letter or
/// digit, so "Admission No." and "admission_number" meet in the middle.
pub fn normalize_header_token(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

// ==========================================
// HeaderMap - canonical field -> column index
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    columns: HashMap<&'static str, usize>,
}

impl HeaderMap {
    /// Build from one header row. First alias match wins; the first
    /// occurrence of a duplicated header column wins.
    pub fn from_header_row(row: &RawRow) -> Self {
        let mut alias_index: HashMap<&'static str, &'static str> = HashMap::new();
        for (canonical, aliases) in ALIASES {
            for &alias in aliases {
                alias_index.entry(alias).or_insert(canonical);
            }
        }

        let mut columns: HashMap<&'static str, usize> = HashMap::new();
        for (idx, cell) in row.cells.iter().enumerate() {
            let token = normalize_header_token(cell);
            if token.is_empty() {
                continue;
            }
            if let Some(canonical) = alias_index.get(token.as_str()).copied() {
                columns.entry(canonical).or_insert(idx);
            }
        }

        Self { columns }
    }

    pub fn column(&self, canonical: &str) -> Option<usize> {
        self.columns.get(canonical).copied()
    }

    /// Read the cell for a canonical field from a data row; unmapped
    /// fields and short rows read as empty.
    pub fn cell<'a>(&self, row: &'a RawRow, canonical: &str) -> &'a str {
        self.column(canonical)
            .and_then(|idx| row.cells.get(idx))
            .map(|c| c.trim())
            .unwrap_or("")
    }

    /// Number of canonical fields the sheet actually carries.
    pub fn recognized_count(&self) -> usize {
        self.columns.len()
    }
}

/// Find the header row (first row with at least one non-empty cell) and
/// build its map. `None` when the sheet has no usable row at all.
pub fn resolve_headers(sheet: &RawSheet) -> Option<(usize, HeaderMap)> {
    let (idx, header_row) = sheet
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| !row.is_blank())?;

    Some((idx, HeaderMap::from_header_row(header_row)))
}
