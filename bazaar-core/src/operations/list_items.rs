use crate::{CatalogStore, Item, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct ListItemsOperation {
    catalog_store: Arc<CatalogStore>,
}

#[derive(Debug, Clone)]
pub struct ListItemsOperationResult {
    pub items: Vec<Item>,
}

impl ListItemsOperation {
    pub fn new(catalog_store: Arc<CatalogStore>) -> Self {
        Self { catalog_store }
    }

    pub async fn run(&self) -> Result<ListItemsOperationResult> {
        let items = self.catalog_store.list_items()?;
        Ok(ListItemsOperationResult { items })
    }
}
