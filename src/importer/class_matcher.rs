// ==========================================
// School Admin Dashboard - Class Matcher
// ==========================================
// Resolves a free-text class label to a known class entity. The class
// list is an immutable snapshot; import never creates classes.
// ==========================================

use crate::domain::class::ClassEntity;
use crate::importer::file_parser::CSV_SHEET_NAME;
use crate::importer::normalize::class_token;
use crate::importer::roster_importer_trait::ImportScope;
use std::collections::HashMap;

fn normalized(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

// ==========================================
// ClassMatcher
// ==========================================
// Three lookup tiers per label, built once per import. Where two classes
// collapse to the same key the earlier one (by sort order) wins.
pub struct ClassMatcher {
    classes: Vec<ClassEntity>,
    by_exact: HashMap<String, usize>,
    by_normalized: HashMap<String, usize>,
    by_token: HashMap<String, usize>,
}

impl ClassMatcher {
    pub fn new(classes: Vec<ClassEntity>) -> Self {
        let mut by_exact = HashMap::new();
        let mut by_normalized = HashMap::new();
        let mut by_token = HashMap::new();

        for (idx, class) in classes.iter().enumerate() {
            by_exact
                .entry(class.name.trim().to_lowercase())
                .or_insert(idx);

            let norm = normalized(&class.name);
            if !norm.is_empty() {
                by_normalized.entry(norm).or_insert(idx);
            }

            let token = class_token(&class.name);
            if !token.is_empty() {
                by_token.entry(token).or_insert(idx);
            }
        }

        Self {
            classes,
            by_exact,
            by_normalized,
            by_token,
        }
    }

    pub fn classes(&self) -> &[ClassEntity] {
        &self.classes
    }

    /// Match one label through the tiers: case-insensitive exact name,
    /// then alphanumeric-only name, then class token.
    pub fn match_label(&self, label: &str) -> Option<&ClassEntity> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(&idx) = self.by_exact.get(&trimmed.to_lowercase()) {
            return Some(&self.classes[idx]);
        }

        let norm = normalized(trimmed);
        if !norm.is_empty() {
            if let Some(&idx) = self.by_normalized.get(&norm) {
                return Some(&self.classes[idx]);
            }
        }

        let token = class_token(trimmed);
        if !token.is_empty() {
            if let Some(&idx) = self.by_token.get(&token) {
                return Some(&self.classes[idx]);
            }
        }

        None
    }

    /// Resolve a row's class. The row's own label wins; the sheet name is
    /// tried only when the label is absent; a single-class import whose
    /// source is the "CSV" placeholder sheet falls back to the scoped
    /// class as a last resort.
    pub fn resolve(
        &self,
        raw_label: &str,
        sheet_name: &str,
        scope: &ImportScope,
    ) -> Option<&ClassEntity> {
        let label = raw_label.trim();

        if !label.is_empty() {
            if let Some(class) = self.match_label(label) {
                return Some(class);
            }
        } else if let Some(class) = self.match_label(sheet_name) {
            return Some(class);
        }

        if let ImportScope::Class(scope_name) = scope {
            if sheet_name == CSV_SHEET_NAME {
                return self.match_label(scope_name);
            }
        }

        None
    }
}
