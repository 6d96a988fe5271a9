use crate::{CatalogStore, Item, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct GetItemOperation {
    catalog_store: Arc<CatalogStore>,
}

#[derive(Debug, Clone)]
pub struct GetItemOperationRequest {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetItemOperationOutcome {
    Found(Item),
    NotFound,
}

impl GetItemOperation {
    pub fn new(catalog_store: Arc<CatalogStore>) -> Self {
        Self { catalog_store }
    }

    pub async fn run(&self, request: GetItemOperationRequest) -> Result<GetItemOperationOutcome> {
        match self.catalog_store.get_item(request.id)? {
            Some(item) => Ok(GetItemOperationOutcome::Found(item)),
            None => Ok(GetItemOperationOutcome::NotFound),
        }
    }
}
