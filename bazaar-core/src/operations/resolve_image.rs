use crate::{BazaarError, ImageStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct ResolveImageOperation {
    image_store: Arc<ImageStore>,
}

#[derive(Debug, Clone)]
pub struct ResolveImageOperationRequest {
    pub reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderReason {
    Missing,
    InvalidReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveImageOperationOutcome {
    Stored(PathBuf),
    Placeholder {
        path: PathBuf,
        reason: PlaceholderReason,
    },
}

impl ResolveImageOperationOutcome {
    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Stored(path) => path,
            Self::Placeholder { path, .. } => path,
        }
    }
}

impl ResolveImageOperation {
    pub fn new(image_store: Arc<ImageStore>) -> Self {
        Self { image_store }
    }

    /// Never fails: anything that cannot be served resolves to the placeholder.
    pub async fn run(&self, request: ResolveImageOperationRequest) -> ResolveImageOperationOutcome {
        let reason = match self.image_store.resolve(&request.reference).await {
            Ok(Some(path)) => return ResolveImageOperationOutcome::Stored(path),
            Ok(None) => {
                tracing::debug!("Image not found: {}", request.reference);
                PlaceholderReason::Missing
            }
            Err(BazaarError::InvalidReference(reason)) => {
                tracing::debug!("Rejected image reference: {}", reason);
                PlaceholderReason::InvalidReference
            }
            Err(error) => {
                tracing::warn!(
                    "Failed to stat image {}, serving placeholder: {}",
                    request.reference,
                    error
                );
                PlaceholderReason::Missing
            }
        };

        ResolveImageOperationOutcome::Placeholder {
            path: self.image_store.default_image_path(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_resolve_falls_back_to_placeholder() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ImageStore::new(temp_dir.path().to_path_buf()).unwrap());
        let operation = ResolveImageOperation::new(store.clone());
        let placeholder = temp_dir.path().join("default.jpg");

        let stored = store.put_image(Bytes::from_static(b"pixels")).await.unwrap();
        let outcome = operation
            .run(ResolveImageOperationRequest {
                reference: stored.reference.clone(),
            })
            .await;
        assert_eq!(
            outcome,
            ResolveImageOperationOutcome::Stored(temp_dir.path().join(&stored.reference))
        );

        let outcome = operation
            .run(ResolveImageOperationRequest {
                reference: "0000.jpg".to_string(),
            })
            .await;
        assert_eq!(
            outcome,
            ResolveImageOperationOutcome::Placeholder {
                path: placeholder.clone(),
                reason: PlaceholderReason::Missing,
            }
        );

        let outcome = operation
            .run(ResolveImageOperationRequest {
                reference: "../../etc/passwd".to_string(),
            })
            .await;
        assert_eq!(
            outcome,
            ResolveImageOperationOutcome::Placeholder {
                path: placeholder,
                reason: PlaceholderReason::InvalidReference,
            }
        );
    }
}
