// ==========================================
// School Admin Dashboard - Roster Template
// ==========================================
// Generates the downloadable CSV template. Its header row is exactly the
// canonical field names the header resolver recognizes, so a filled-in
// template always round-trips through the importer.
// ==========================================

use crate::domain::class::ClassEntity;
use crate::importer::header_resolver::CANONICAL_FIELDS;

/// Build the template CSV: canonical headers plus one example row per
/// known class.
pub fn roster_template_csv(classes: &[ClassEntity]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(CANONICAL_FIELDS)?;

    for (idx, class) in classes.iter().enumerate() {
        let example_name = format!("Student {}", idx + 1);
        writer.write_record([
            "",                    // admission_number (blank = auto-generated)
            example_name.as_str(), // full_name
            class.name.as_str(),   // class
            "",                    // roll_number
            "",                    // gender
            "",                    // father_name
            "",                    // father_phone
            "",                    // mother_name
            "",                    // mother_phone
            "",                    // dob (D/M/YYYY or YYYY-MM-DD)
            "",                    // aadhaar
            "",                    // address
            "",                    // parent_email
            "0",                   // term1_fee
            "0",                   // term2_fee
            "0",                   // term3_fee
            "0",                   // books_fee
            "0",                   // transport_fee
            "0",                   // old_dues
            "no",                  // has_books
            "no",                  // has_transport
            "new",                 // student_type
            "",                    // joining_date
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
