// ==========================================
// School Admin Dashboard - Field Normalizers
// ==========================================
// Pure, stateless transforms from raw cell text to canonical typed
// values. Unparseable input degrades (None / false / 0), it never
// aborts a row.
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Truthy tokens for boolean-like columns. Transport columns often carry
/// the vehicle kind instead of yes/no, so those count as true too.
const TRUTHY_TOKENS: [&str; 9] = [
    "yes", "y", "true", "1", "auto", "bus", "van", "schoolbus", "transport",
];

/// Roman numerals as they appear in class labels ("Class V", "X-A").
const ROMAN_CLASSES: [(&str, &str); 10] = [
    ("i", "1"),
    ("ii", "2"),
    ("iii", "3"),
    ("iv", "4"),
    ("v", "5"),
    ("vi", "6"),
    ("vii", "7"),
    ("viii", "8"),
    ("ix", "9"),
    ("x", "10"),
];

/// Pre-primary class names that stay symbolic instead of numeric.
const PRE_PRIMARY: [&str; 3] = ["nursery", "lkg", "ukg"];

/// Date formats tried as a last resort, after the explicit rules.
const FALLBACK_DATE_FORMATS: [&str; 5] = [
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const FALLBACK_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

// ==========================================
// Date normalizer
// ==========================================

/// Convert an Excel serial day count to a calendar date.
///
/// Epoch is 1899-12-30; serials past the phantom 1900-02-29 (value 59)
/// are shifted down by one day, so the serial `43236` maps to 2018-05-15.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // 2958465 is 9999-12-31, Excel's own ceiling; larger values are not
    // dates (e.g. an 8-digit number that is really YYYYMMDD text).
    if !serial.is_finite() || serial <= 0.0 || serial > 2_958_465.0 {
        return None;
    }

    let mut days = serial.trunc() as i64;
    if days > 59 {
        days -= 1;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(days))
}

/// Normalize a raw date cell to a calendar date.
///
/// Accepted inputs, first match wins:
/// - ISO `YYYY-MM-DD` (passed through)
/// - a numeric string of 5+ digits, read as an Excel serial
/// - `D/M/YYYY`, `D-M-YYYY`, `D.M.YYYY`
/// - the 2-digit-year variant of the above (years >= 50 map to 19xx,
///   < 50 map to 20xx)
/// - a fixed list of fallback formats
///
/// Anything else yields `None`.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    // ISO passthrough; the 4-digit-year guard keeps "15-05-18" from being
    // read as year 15.
    if value.len() == 10 && value.as_bytes()[4] == b'-' {
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Some(date);
        }
    }

    if value.len() >= 5 && value.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(serial) = value.parse::<f64>() {
            if let Some(date) = excel_serial_to_date(serial) {
                return Some(date);
            }
        }
    }

    if let Some(date) = parse_day_first(value) {
        return Some(date);
    }

    for fmt in FALLBACK_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// `D/M/Y` with `/`, `-` or `.` separators; 2-digit years pivot at 50.
fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split(['/', '-', '.']).collect();
    if parts.len() != 3 {
        return None;
    }

    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year_part = parts[2].trim();
    let mut year: i32 = year_part.parse().ok()?;

    if year_part.len() <= 2 {
        year = if year >= 50 { 1900 + year } else { 2000 + year };
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

// ==========================================
// Boolean-like normalizer
// ==========================================

/// Case-insensitive membership test against the truthy token set.
/// Everything else (including empty) is false.
pub fn normalize_flag(raw: &str) -> bool {
    let token = raw.trim().to_lowercase();
    TRUTHY_TOKENS.contains(&token.as_str())
}

// ==========================================
// Numeric fee normalizer
// ==========================================

/// Parse a fee cell to a non-negative number. Empty or non-numeric input
/// normalizes to `0`, never NaN or null - fee fields are additive and
/// must support arithmetic unconditionally.
pub fn normalize_fee(raw: &str) -> f64 {
    let cleaned: String = raw.trim().replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

// ==========================================
// Class-token normalizer
// ==========================================

/// Reduce a class label to its join key: lowercase, alphanumerics only,
/// leading "class" stripped; pre-primary names pass through, Roman
/// numerals i..x become 1..10, otherwise the first digit run (or the
/// stripped token verbatim as a last resort).
pub fn class_token(raw: &str) -> String {
    let stripped: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let stripped = stripped.strip_prefix("class").unwrap_or(&stripped);

    if PRE_PRIMARY.contains(&stripped) {
        return stripped.to_string();
    }

    for (roman, digit) in ROMAN_CLASSES {
        if stripped == roman {
            return digit.to_string();
        }
    }

    let digits: String = stripped
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if !digits.is_empty() {
        return digits;
    }

    stripped.to_string()
}

// ==========================================
// Text normalizer
// ==========================================

/// Trim and map empty to None.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
