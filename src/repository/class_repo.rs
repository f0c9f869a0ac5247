// ==========================================
// School Admin Dashboard - Class Repository
// ==========================================
// Read access to the class list. Repositories do data access only,
// no business rules.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::class::ClassEntity;
use async_trait::async_trait;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait ClassRepository: Send + Sync {
    /// All classes in roster order. The import pipeline calls this once
    /// per run and treats the result as an immutable snapshot.
    async fn list_classes(&self) -> Result<Vec<ClassEntity>, Box<dyn Error>>;
}

// ==========================================
// ClassRepositoryImpl (rusqlite)
// ==========================================
pub struct ClassRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ClassRepositoryImpl {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }
}

#[async_trait]
impl ClassRepository for ClassRepositoryImpl {
    async fn list_classes(&self) -> Result<Vec<ClassEntity>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT id, name, sort_order FROM classes ORDER BY sort_order, name")?;

        let classes = stmt
            .query_map([], |row| {
                Ok(ClassEntity {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    sort_order: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    #[tokio::test]
    async fn test_list_classes_ordered() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO classes (id, name, sort_order) VALUES
                ('c5', 'Class 5', 7),
                ('c-lkg', 'LKG', 1),
                ('c1', 'Class 1', 3);
            "#,
        )
        .unwrap();

        let repo = ClassRepositoryImpl {
            conn: Arc::new(Mutex::new(conn)),
        };
        let classes = repo.list_classes().await.unwrap();

        let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["LKG", "Class 1", "Class 5"]);
    }
}
