// ==========================================
// School Admin Dashboard - Class Entity
// ==========================================
// Read-only during import: the class list is prefetched once and treated
// as an immutable snapshot. Import never creates classes implicitly.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub id: String,         // opaque identifier (UUID in the hosted schema)
    pub name: String,       // display name, e.g. "Class 5" or "LKG"
    pub sort_order: i32,    // roster display order
}

impl ClassEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sort_order: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sort_order,
        }
    }
}
