use crate::{CatalogStore, Item, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct SearchItemsOperation {
    catalog_store: Arc<CatalogStore>,
}

#[derive(Debug, Clone)]
pub struct SearchItemsOperationRequest {
    pub keyword: String,
}

/// `items` is empty when nothing matched; query failures surface as errors.
#[derive(Debug, Clone)]
pub struct SearchItemsOperationResult {
    pub items: Vec<Item>,
}

impl SearchItemsOperation {
    pub fn new(catalog_store: Arc<CatalogStore>) -> Self {
        Self { catalog_store }
    }

    pub async fn run(
        &self,
        request: SearchItemsOperationRequest,
    ) -> Result<SearchItemsOperationResult> {
        let items = self.catalog_store.search_items(&request.keyword)?;

        tracing::debug!(
            "Search matched {} items for keyword '{}'",
            items.len(),
            request.keyword
        );

        Ok(SearchItemsOperationResult { items })
    }
}
