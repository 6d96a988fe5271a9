use crate::error::{BazaarError, Result};
use crate::storage::category::{Category, CategoryResolver};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

const SELECT_ITEMS: &str = "SELECT items.id, items.name, categories.name, items.image_reference
     FROM items INNER JOIN categories ON items.category_id = categories.id";

/// Item as returned to callers, with the category name joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// Content-addressed image reference (`<sha256>.jpg`).
    #[serde(rename = "image")]
    pub image_reference: String,
}

impl Item {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            image_reference: row.get(3)?,
        })
    }
}

/// SQLite-backed catalog. Holds only the database path; every call opens its
/// own connection so concurrent requests rely on SQLite locking alone.
pub struct CatalogStore {
    db_path: PathBuf,
}

impl CatalogStore {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self { db_path };
        store.init_schema()?;
        Ok(store)
    }

    fn get_conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category_id INTEGER NOT NULL REFERENCES categories(id),
                image_reference TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_items_category_id ON items(category_id)",
            [],
        )?;

        Ok(())
    }

    /// Resolve the category and insert the item in one immediate transaction.
    /// Nothing is visible to other connections unless both steps succeed.
    pub fn create_item(
        &self,
        name: &str,
        category_name: &str,
        image_reference: &str,
    ) -> Result<Item> {
        if name.trim().is_empty() {
            return Err(BazaarError::Validation(
                "item name cannot be empty".to_string(),
            ));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let category = CategoryResolver::new(&tx).resolve_or_create(category_name)?;

        tx.execute(
            "INSERT INTO items (name, category_id, image_reference) VALUES (?1, ?2, ?3)",
            params![name, category.id, image_reference],
        )?;
        let item_id = tx.last_insert_rowid();

        let item = select_item(&tx, item_id)?.ok_or_else(|| {
            BazaarError::Internal(format!("item {} missing after insert", item_id))
        })?;

        tx.commit()?;

        tracing::debug!(
            "Created item {} '{}' in category {} with image {}",
            item.id,
            item.name,
            item.category,
            item.image_reference
        );
        Ok(item)
    }

    pub fn get_item(&self, id: i64) -> Result<Option<Item>> {
        let conn = self.get_conn()?;
        select_item(&conn, id)
    }

    /// All items in insertion order.
    pub fn list_items(&self) -> Result<Vec<Item>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY items.id", SELECT_ITEMS))?;

        let rows = stmt.query_map([], Item::from_row)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }

        Ok(items)
    }

    /// Case-insensitive substring match on item names. The keyword is bound as a
    /// parameter with LIKE wildcards escaped, so it only ever matches literally.
    pub fn search_items(&self, keyword: &str) -> Result<Vec<Item>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE items.name LIKE ?1 ESCAPE '\\' ORDER BY items.id",
            SELECT_ITEMS
        ))?;

        let pattern = format!("%{}%", escape_like(keyword));
        let rows = stmt.query_map([pattern], Item::from_row)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }

        Ok(items)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.get_conn()?;
        CategoryResolver::new(&conn).list()
    }
}

fn select_item(conn: &Connection, id: i64) -> Result<Option<Item>> {
    let item = conn
        .query_row(
            &format!("{} WHERE items.id = ?1", SELECT_ITEMS),
            [id],
            Item::from_row,
        )
        .optional()?;

    Ok(item)
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(temp_dir: &tempfile::TempDir) -> CatalogStore {
        CatalogStore::new(temp_dir.path().join("db").join("catalog.sqlite3")).unwrap()
    }

    #[test]
    fn test_create_and_get_item() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = test_store(&temp_dir);

        let created = store.create_item("shirt", "clothes", "abc123.jpg").unwrap();
        assert_eq!(created.name, "shirt");
        assert_eq!(created.category, "clothes");
        assert_eq!(created.image_reference, "abc123.jpg");

        let fetched = store.get_item(created.id).unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[test]
    fn test_get_missing_item() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = test_store(&temp_dir);

        assert_eq!(store.get_item(42).unwrap(), None);
    }

    #[test]
    fn test_category_reused_across_case() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = test_store(&temp_dir);

        let first = store.create_item("shirt", "clothes", "a.jpg").unwrap();
        let second = store.create_item("jacket", "Clothes", "b.jpg").unwrap();

        assert_eq!(first.category, "clothes");
        assert_eq!(second.category, "clothes");
        assert_eq!(store.list_categories().unwrap().len(), 1);
    }

    #[test]
    fn test_list_items_in_insertion_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = test_store(&temp_dir);

        store.create_item("b-item", "misc", "b.jpg").unwrap();
        store.create_item("a-item", "misc", "a.jpg").unwrap();

        let names: Vec<String> = store
            .list_items()
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["b-item", "a-item"]);
    }

    #[test]
    fn test_failed_create_leaves_nothing_behind() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = test_store(&temp_dir);

        let error = store.create_item("", "clothes", "a.jpg").unwrap_err();
        assert!(matches!(error, BazaarError::Validation(_)));

        let error = store.create_item("shirt", "", "a.jpg").unwrap_err();
        assert!(matches!(error, BazaarError::Validation(_)));

        assert!(store.list_items().unwrap().is_empty());
        assert!(store.list_categories().unwrap().is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = test_store(&temp_dir);

        store.create_item("Blue Shirt", "clothes", "a.jpg").unwrap();
        store.create_item("red shirt", "clothes", "b.jpg").unwrap();
        store.create_item("lamp", "shirts", "c.jpg").unwrap();

        let hits: Vec<String> = store
            .search_items("SHIRT")
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(hits, vec!["Blue Shirt", "red shirt"]);

        assert_eq!(store.search_items("").unwrap().len(), 3);
        assert!(store.search_items("zzz-no-match").unwrap().is_empty());
    }

    #[test]
    fn test_search_keyword_is_data() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = test_store(&temp_dir);

        store.create_item("100% cotton", "clothes", "a.jpg").unwrap();
        store.create_item("1000 pieces", "toys", "b.jpg").unwrap();
        store.create_item("snake_case", "books", "c.jpg").unwrap();

        let percent = store.search_items("0%").unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].name, "100% cotton");

        let underscore = store.search_items("e_c").unwrap();
        assert_eq!(underscore.len(), 1);

        assert!(store.search_items("' OR '1'='1").unwrap().is_empty());
        assert_eq!(store.list_items().unwrap().len(), 3);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
