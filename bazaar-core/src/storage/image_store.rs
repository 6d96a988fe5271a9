use crate::error::{BazaarError, Result};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use ulid::Ulid;

/// Format tag appended to every image digest.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Placeholder served when a reference has no backing file.
pub const DEFAULT_IMAGE_NAME: &str = "default.jpg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutImageResult {
    /// `<sha256 hex>.jpg`
    pub reference: String,
    /// True when a file for this digest was already present.
    pub reused: bool,
}

/// ImageStore keeps uploaded images in a flat directory, one file per digest.
/// Files are only ever created, never rewritten or removed.
pub struct ImageStore {
    base_path: PathBuf,
}

impl ImageStore {
    pub fn new(base_path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_path)?;

        let default_path = base_path.join(DEFAULT_IMAGE_NAME);
        if !default_path.is_file() {
            tracing::warn!(
                "Placeholder image missing at {}, fallbacks will point at a missing file",
                default_path.display()
            );
        }

        Ok(Self { base_path })
    }

    /// Get the base path for the store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn default_image_path(&self) -> PathBuf {
        self.base_path.join(DEFAULT_IMAGE_NAME)
    }

    /// Store image bytes and return their content-addressed reference.
    ///
    /// Presence of `<digest>.jpg` is the only dedup check; existing files are
    /// never re-hashed or compared.
    pub async fn put_image(&self, data: Bytes) -> Result<PutImageResult> {
        let reference = reference_for(&compute_hash(&data));
        let image_path = self.base_path.join(&reference);

        if fs::try_exists(&image_path).await? {
            tracing::debug!("Image {} already stored, reusing", reference);
            return Ok(PutImageResult {
                reference,
                reused: true,
            });
        }

        // Unique temp name so concurrent uploads of the same bytes never share a file.
        let temp_path = self
            .base_path
            .join(format!("{}.{}.tmp", reference, Ulid::new()));

        if let Err(error) = write_file(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(error.into());
        }

        if let Err(error) = fs::rename(&temp_path, &image_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(error.into());
        }

        tracing::debug!("Stored image {} ({} bytes)", reference, data.len());
        Ok(PutImageResult {
            reference,
            reused: false,
        })
    }

    /// Resolve a reference to the path of its bytes.
    ///
    /// Returns `Ok(None)` when the reference is well formed but nothing is stored
    /// under it. Malformed references fail before touching the filesystem.
    pub async fn resolve(&self, reference: &str) -> Result<Option<PathBuf>> {
        validate_reference(reference)?;

        let image_path = self.base_path.join(reference);
        match fs::metadata(&image_path).await {
            Ok(meta) if meta.is_file() => Ok(Some(image_path)),
            Ok(_) => Ok(None),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Check if an image exists
    pub fn image_exists(&self, reference: &str) -> bool {
        validate_reference(reference).is_ok() && self.base_path.join(reference).is_file()
    }
}

async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

fn reference_for(digest: &str) -> String {
    format!("{}.{}", digest, IMAGE_EXTENSION)
}

/// Reject references that cannot name a file directly inside the image directory.
pub fn validate_reference(reference: &str) -> Result<()> {
    let suffix = format!(".{}", IMAGE_EXTENSION);
    let Some(stem) = reference.strip_suffix(suffix.as_str()) else {
        return Err(BazaarError::InvalidReference(format!(
            "{} does not end with {}",
            reference, suffix
        )));
    };

    if stem.is_empty()
        || reference.contains('/')
        || reference.contains('\\')
        || reference.contains("..")
    {
        return Err(BazaarError::InvalidReference(reference.to_string()));
    }

    Ok(())
}

/// Compute SHA256 hash of data as lowercase hex
pub fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
