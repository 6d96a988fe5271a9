pub mod create_item;
pub mod get_item;
pub mod list_categories;
pub mod list_items;
pub mod resolve_image;
pub mod search_items;

pub use create_item::{CreateItemOperation, CreateItemOperationRequest, CreateItemOperationResult};
pub use get_item::{GetItemOperation, GetItemOperationOutcome, GetItemOperationRequest};
pub use list_categories::{ListCategoriesOperation, ListCategoriesOperationResult};
pub use list_items::{ListItemsOperation, ListItemsOperationResult};
pub use resolve_image::{
    PlaceholderReason, ResolveImageOperation, ResolveImageOperationOutcome,
    ResolveImageOperationRequest,
};
pub use search_items::{
    SearchItemsOperation, SearchItemsOperationRequest, SearchItemsOperationResult,
};
