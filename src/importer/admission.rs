// ==========================================
// School Admin Dashboard - Admission-Number Synthesizer
// ==========================================
// Rows without an admission number get a stable generated one, so
// re-uploading the same file updates students instead of duplicating
// them. The number hashes the row's identifying fields: correcting a
// typo in any of them produces a DIFFERENT number on the next upload -
// admission numbers should be fixed explicitly, not re-synthesized.
// ==========================================

const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const HASH_LEN: usize = 7;

/// Distinguishing context for one row, hashed when the admission-number
/// cell is empty.
#[derive(Debug, Clone)]
pub struct AdmissionSeed<'a> {
    pub class_token: &'a str,
    pub full_name: &'a str,
    pub father_phone: &'a str,
    pub dob: &'a str,        // normalized ISO date, or empty
    pub sheet_name: &'a str,
    pub row_index: usize,
}

/// Use the raw cell verbatim when present, otherwise synthesize
/// `AUTO-<CLASSTOKEN>-<7 base-36 chars>` deterministically from the seed.
/// Returns the number and whether it was synthesized.
pub fn resolve_admission_number(raw: &str, seed: &AdmissionSeed) -> (String, bool) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        return (trimmed.to_string(), false);
    }

    (synthesize(seed), true)
}

fn synthesize(seed: &AdmissionSeed) -> String {
    let mut token = seed.class_token.trim().to_uppercase();
    if token.is_empty() {
        token = "GEN".to_string();
    }

    let material = format!(
        "{}|{}|{}|{}|{}|{}",
        token,
        seed.full_name.trim().to_lowercase(),
        seed.father_phone.trim(),
        seed.dob.trim(),
        seed.sheet_name.trim().to_lowercase(),
        seed.row_index,
    );

    format!("AUTO-{}-{}", token, base36_upper(fnv1a_32(material.as_bytes())))
}

/// 32-bit FNV-1a: xor each byte into the accumulator, then multiply by
/// the FNV prime.
fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Upper-case base-36, zero-padded and truncated to exactly 7 chars.
fn base36_upper(mut value: u32) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    while digits.len() < HASH_LEN {
        digits.push(b'0');
    }
    digits.reverse();
    digits.truncate(HASH_LEN);

    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(row_index: usize) -> AdmissionSeed<'static> {
        AdmissionSeed {
            class_token: "3",
            full_name: "Jane Doe",
            father_phone: "9876543210",
            dob: "2018-05-15",
            sheet_name: "CSV",
            row_index,
        }
    }

    #[test]
    fn test_raw_number_used_verbatim() {
        let (number, synthesized) = resolve_admission_number(" A-101 ", &seed(2));
        assert_eq!(number, "A-101");
        assert!(!synthesized);
    }

    #[test]
    fn test_synthesized_shape() {
        let (number, synthesized) = resolve_admission_number("", &seed(2));
        assert!(synthesized);

        let suffix = number.strip_prefix("AUTO-3-").expect("prefix");
        assert_eq!(suffix.len(), 7);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let (a, _) = resolve_admission_number("", &seed(2));
        let (b, _) = resolve_admission_number("", &seed(2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_seed_field_changes_the_number() {
        let (base, _) = resolve_admission_number("", &seed(2));

        let (other_row, _) = resolve_admission_number("", &seed(3));
        assert_ne!(base, other_row);

        let mut renamed = seed(2);
        renamed.full_name = "Jane Do";
        let (other_name, _) = resolve_admission_number("", &renamed);
        assert_ne!(base, other_name);
    }

    #[test]
    fn test_name_case_does_not_change_the_number() {
        let (a, _) = resolve_admission_number("", &seed(2));
        let mut upper = seed(2);
        upper.full_name = "JANE DOE";
        let (b, _) = resolve_admission_number("", &upper);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_class_token_defaults_gen() {
        let mut s = seed(2);
        s.class_token = "";
        let (number, _) = resolve_admission_number("", &s);
        assert!(number.starts_with("AUTO-GEN-"));
    }

    #[test]
    fn test_fnv1a_reference_values() {
        // Standard 32-bit FNV-1a test vectors.
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_base36_padding() {
        assert_eq!(base36_upper(0), "0000000");
        assert_eq!(base36_upper(35), "000000Z");
        assert_eq!(base36_upper(36), "0000010");
        assert_eq!(base36_upper(u32::MAX), "1Z141Z3");
    }
}
