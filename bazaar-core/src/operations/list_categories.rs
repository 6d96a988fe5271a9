use crate::{CatalogStore, Category, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct ListCategoriesOperation {
    catalog_store: Arc<CatalogStore>,
}

#[derive(Debug, Clone)]
pub struct ListCategoriesOperationResult {
    pub categories: Vec<Category>,
}

impl ListCategoriesOperation {
    pub fn new(catalog_store: Arc<CatalogStore>) -> Self {
        Self { catalog_store }
    }

    pub async fn run(&self) -> Result<ListCategoriesOperationResult> {
        let categories = self.catalog_store.list_categories()?;
        Ok(ListCategoriesOperationResult { categories })
    }
}
