use crate::error::{BazaarError, Result};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use serde::Serialize;

/// Lookups after a unique-constraint conflict before giving up.
const MAX_CONFLICT_RETRIES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    /// Stored as first seen; lookups ignore case.
    pub name: String,
}

/// Maps a category name to its row, creating the row on first use.
///
/// Check-then-create is not linearizable across connections. The
/// `UNIQUE COLLATE NOCASE` constraint on `categories.name` rejects the losing
/// insert, and the resolver answers that conflict by looking the row up again.
pub struct CategoryResolver<'conn> {
    conn: &'conn Connection,
}

impl<'conn> CategoryResolver<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn resolve_or_create(&self, name: &str) -> Result<Category> {
        if name.trim().is_empty() {
            return Err(BazaarError::Validation(
                "category name cannot be empty".to_string(),
            ));
        }

        if let Some(category) = self.find(name)? {
            return Ok(category);
        }

        self.create_or_recover(name)
    }

    pub fn find(&self, name: &str) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name FROM categories WHERE name = ?1 COLLATE NOCASE",
                [name],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(category)
    }

    /// Insert step of the resolver. A uniqueness conflict means another writer
    /// created the category first, so its row is returned instead.
    pub(crate) fn create_or_recover(&self, name: &str) -> Result<Category> {
        match self
            .conn
            .execute("INSERT INTO categories (name) VALUES (?1)", params![name])
        {
            Ok(_) => {
                let category = self.find(name)?.ok_or_else(|| {
                    BazaarError::CategoryResolution(format!(
                        "category '{}' not visible after insert",
                        name
                    ))
                })?;
                tracing::debug!("Created category {} ({})", category.name, category.id);
                Ok(category)
            }
            Err(error) if is_unique_violation(&error) => {
                tracing::warn!(
                    "Category '{}' was created concurrently, re-reading it",
                    name
                );
                self.recover_after_conflict(name)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn recover_after_conflict(&self, name: &str) -> Result<Category> {
        for attempt in 1..=MAX_CONFLICT_RETRIES {
            if let Some(category) = self.find(name)? {
                return Ok(category);
            }
            tracing::warn!(
                "Category '{}' still missing after conflict (attempt {})",
                name,
                attempt
            );
        }

        Err(BazaarError::CategoryResolution(format!(
            "insert of '{}' conflicted but no matching category exists",
            name
        )))
    }

    pub fn list(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }

        Ok(categories)
    }
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    match error {
        rusqlite::Error::SqliteFailure(err, _) => {
            err.code == ErrorCode::ConstraintViolation
                && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}
