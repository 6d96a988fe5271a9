use crate::{BazaarError, CatalogStore, ImageStore, Item, Result};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct CreateItemOperation {
    catalog_store: Arc<CatalogStore>,
    image_store: Arc<ImageStore>,
}

#[derive(Debug, Clone)]
pub struct CreateItemOperationRequest {
    pub name: String,
    pub category: String,
    pub image: Bytes,
}

#[derive(Debug, Clone)]
pub struct CreateItemOperationResult {
    pub item: Item,
    pub image_reused: bool,
}

impl CreateItemOperation {
    pub fn new(catalog_store: Arc<CatalogStore>, image_store: Arc<ImageStore>) -> Self {
        Self {
            catalog_store,
            image_store,
        }
    }

    /// Store the image, then resolve the category and insert the item.
    ///
    /// An image written before a failed insert stays on disk unreferenced; it is
    /// content-addressed, so a retry reuses it.
    pub async fn run(
        &self,
        request: CreateItemOperationRequest,
    ) -> Result<CreateItemOperationResult> {
        let CreateItemOperationRequest {
            name,
            category,
            image,
        } = request;

        let name = name.trim();
        let category = category.trim();

        if name.is_empty() {
            return Err(BazaarError::Validation("name is required".to_string()));
        }
        if category.is_empty() {
            return Err(BazaarError::Validation("category is required".to_string()));
        }
        if image.is_empty() {
            return Err(BazaarError::Validation("image is required".to_string()));
        }

        let put_result = self.image_store.put_image(image).await?;

        let item = self
            .catalog_store
            .create_item(name, category, &put_result.reference)?;

        tracing::info!(
            "Item received. id={} name={} category={} image={} reused={}",
            item.id,
            item.name,
            item.category,
            item.image_reference,
            put_result.reused
        );

        Ok(CreateItemOperationResult {
            item,
            image_reused: put_result.reused,
        })
    }
}
