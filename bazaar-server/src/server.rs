use crate::config::Config;
use bazaar_core::{
    BazaarError, CatalogStore, CreateItemOperation, CreateItemOperationRequest, GetItemOperation,
    GetItemOperationOutcome, GetItemOperationRequest, ImageStore, Item, ListCategoriesOperation,
    ListItemsOperation, ResolveImageOperation, ResolveImageOperationRequest, Result,
    SearchItemsOperation, SearchItemsOperationRequest,
};
use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct ServerState {
    pub create_item: CreateItemOperation,
    pub get_item: GetItemOperation,
    pub list_items: ListItemsOperation,
    pub search_items: SearchItemsOperation,
    pub resolve_image: ResolveImageOperation,
    pub list_categories: ListCategoriesOperation,
}

impl ServerState {
    /// Opens the catalog (creating its schema) and the image directory.
    pub fn new(config: &Config) -> Result<Self> {
        let catalog_store = Arc::new(CatalogStore::new(config.storage.db_path.clone())?);
        let image_store = Arc::new(ImageStore::new(config.storage.image_dir.clone())?);

        Ok(Self {
            create_item: CreateItemOperation::new(catalog_store.clone(), image_store.clone()),
            get_item: GetItemOperation::new(catalog_store.clone()),
            list_items: ListItemsOperation::new(catalog_store.clone()),
            search_items: SearchItemsOperation::new(catalog_store.clone()),
            resolve_image: ResolveImageOperation::new(image_store),
            list_categories: ListCategoriesOperation::new(catalog_store),
        })
    }
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct ItemsResponse {
    items: Vec<Item>,
}

#[derive(Debug, Serialize)]
struct CreateItemResponse {
    message: String,
    item: Item,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    keyword: String,
}

pub async fn run_server(config: Config) -> Result<()> {
    let state = Arc::new(ServerState::new(&config)?);
    let app = build_router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!("Server listening on {}", config.server.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: Arc<ServerState>, config: &Config) -> Result<Router> {
    let origin = config
        .server
        .front_url
        .parse::<HeaderValue>()
        .map_err(|e| BazaarError::Config(format!("invalid front_url: {}", e)))?;

    let cors = CorsLayer::new().allow_origin(origin).allow_methods([
        Method::GET,
        Method::PUT,
        Method::POST,
        Method::DELETE,
    ]);

    let app = Router::new()
        .route("/", get(root))
        .route("/items", get(list_items).post(add_item))
        .route("/items/:id", get(get_item))
        .route("/search", get(search_items))
        .route("/image/:image_filename", get(get_image))
        .route("/categories", get(list_categories))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn message(status: StatusCode, message: impl Into<String>) -> Response {
    let body = MessageResponse {
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

fn error_response(error: BazaarError) -> Response {
    let status = match &error {
        BazaarError::Validation(_) | BazaarError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        BazaarError::CategoryResolution(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    } else {
        tracing::debug!("Request rejected: {}", error);
    }

    message(status, error.to_string())
}

async fn root() -> Response {
    message(StatusCode::OK, "Hello, world!")
}

async fn add_item(State(state): State<Arc<ServerState>>, mut multipart: Multipart) -> Response {
    let mut name = String::new();
    let mut category = String::new();
    let mut image: Option<Bytes> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return message(StatusCode::BAD_REQUEST, e.body_text()),
        };

        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" | "category" => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(e) => return message(StatusCode::BAD_REQUEST, e.body_text()),
                };
                if field_name == "name" {
                    name = value;
                } else {
                    category = value;
                }
            }
            "image" => match field.bytes().await {
                Ok(bytes) => image = Some(bytes),
                Err(e) => {
                    let error = std::io::Error::new(std::io::ErrorKind::InvalidData, e.body_text());
                    return error_response(BazaarError::Io(error));
                }
            },
            _ => {}
        }
    }

    let Some(image) = image else {
        return message(StatusCode::BAD_REQUEST, "Image not found");
    };

    tracing::debug!("Received item. Name: {}, Category: {}", name, category);

    let request = CreateItemOperationRequest {
        name,
        category,
        image,
    };

    match state.create_item.run(request).await {
        Ok(result) => {
            let body = CreateItemResponse {
                message: format!(
                    "item received: {}, {}",
                    result.item.name, result.item.category
                ),
                item: result.item,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn list_items(State(state): State<Arc<ServerState>>) -> Response {
    match state.list_items.run().await {
        Ok(result) => (StatusCode::OK, Json(ItemsResponse { items: result.items })).into_response(),
        Err(error) => error_response(error),
    }
}

async fn get_item(State(state): State<Arc<ServerState>>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return message(StatusCode::BAD_REQUEST, format!("invalid item id: {}", id));
    };

    match state.get_item.run(GetItemOperationRequest { id }).await {
        Ok(GetItemOperationOutcome::Found(item)) => (StatusCode::OK, Json(item)).into_response(),
        Ok(GetItemOperationOutcome::NotFound) => {
            message(StatusCode::NOT_FOUND, "Item with that ID was not found")
        }
        Err(error) => error_response(error),
    }
}

async fn search_items(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let request = SearchItemsOperationRequest {
        keyword: query.keyword,
    };

    match state.search_items.run(request).await {
        Ok(result) => (StatusCode::OK, Json(ItemsResponse { items: result.items })).into_response(),
        Err(error) => error_response(error),
    }
}

async fn get_image(
    State(state): State<Arc<ServerState>>,
    Path(image_filename): Path<String>,
) -> Response {
    let path = state
        .resolve_image
        .run(ResolveImageOperationRequest {
            reference: image_filename,
        })
        .await
        .into_path();

    match tokio::fs::read(&path).await {
        Ok(data) => (StatusCode::OK, [(header::CONTENT_TYPE, "image/jpeg")], data).into_response(),
        Err(e) => {
            tracing::warn!("Failed to read image {}: {}", path.display(), e);
            message(StatusCode::NOT_FOUND, "Image not found")
        }
    }
}

async fn list_categories(State(state): State<Arc<ServerState>>) -> Response {
    match state.list_categories.run().await {
        Ok(result) => {
            let body = serde_json::json!({ "categories": result.categories });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}
