//! Category vocabulary operations

use rusqlite::params;
use tracing::{debug, info};

use super::Database;
use crate::error::{Error, Result};
use crate::models::CategoryVocabulary;

impl Database {
    /// Store the initial vocabulary if none has been stored yet
    ///
    /// Returns true when the vocabulary was written.
    pub fn seed_categories(&self, vocab: &CategoryVocabulary) -> Result<bool> {
        let conn = self.conn()?;
        let existing: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if existing > 0 {
            debug!("Category vocabulary already stored ({} entries)", existing);
            return Ok(false);
        }

        for (position, name) in vocab.names().iter().enumerate() {
            conn.execute(
                "INSERT OR IGNORE INTO categories (name, position) VALUES (?, ?)",
                params![name, position as i64],
            )?;
        }
        info!("Seeded {} categories", vocab.len());
        Ok(true)
    }

    /// Stored category names in storage order
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name FROM categories ORDER BY position, name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// The stored vocabulary ("Other" is always included)
    pub fn load_vocabulary(&self) -> Result<CategoryVocabulary> {
        Ok(CategoryVocabulary::new(self.list_categories()?))
    }

    /// Append a category to the stored vocabulary and to `vocab`
    ///
    /// Returns false when the category already existed.
    pub fn add_category(&self, vocab: &mut CategoryVocabulary, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidCategory("category name is empty".into()));
        }
        if vocab.contains(name) {
            return Ok(false);
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT OR IGNORE INTO categories (name, position)
            VALUES (?, (SELECT COALESCE(MAX(position), -1) + 1 FROM categories))
            "#,
            params![name],
        )?;
        vocab.insert(name);
        info!("Added category '{}'", name);
        Ok(true)
    }
}
