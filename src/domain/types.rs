// ==========================================
// School Admin Dashboard - Domain Enums
// ==========================================
// Serialized as lowercase strings, matching the roster tables
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// StudentType - old vs newly admitted student
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentType {
    Old,
    New,
}

impl StudentType {
    /// Parse a raw cell value. Anything that is not `old`/`new`
    /// (case-insensitive) falls back to `New`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "old" => StudentType::Old,
            _ => StudentType::New,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentType::Old => "old",
            StudentType::New => "new",
        }
    }
}

impl Default for StudentType {
    fn default() -> Self {
        StudentType::New
    }
}

// ==========================================
// StudentStatus - roster lifecycle status
// ==========================================
// The import path only ever creates/updates active students; other
// lifecycle transitions happen elsewhere in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
        }
    }
}

impl Default for StudentStatus {
    fn default() -> Self {
        StudentStatus::Active
    }
}

// ==========================================
// ImportStatus - overall outcome of one import run
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Partial,
    Failed,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Success => "success",
            ImportStatus::Partial => "partial",
            ImportStatus::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_type_from_raw() {
        assert_eq!(StudentType::from_raw("old"), StudentType::Old);
        assert_eq!(StudentType::from_raw(" OLD "), StudentType::Old);
        assert_eq!(StudentType::from_raw("new"), StudentType::New);
        assert_eq!(StudentType::from_raw("returning"), StudentType::New);
        assert_eq!(StudentType::from_raw(""), StudentType::New);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(ImportStatus::Partial.as_str(), "partial");
        assert_eq!(StudentStatus::Active.as_str(), "active");
    }
}
