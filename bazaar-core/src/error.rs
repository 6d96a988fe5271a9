use thiserror::Error;

pub type Result<T> = std::result::Result<T, BazaarError>;

#[derive(Debug, Error)]
pub enum BazaarError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid image reference: {0}")]
    InvalidReference(String),

    #[error("category resolution failed: {0}")]
    CategoryResolution(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BazaarError {
    /// Database and filesystem failures, as opposed to caller mistakes.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_))
    }
}

impl From<rusqlite::Error> for BazaarError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        let io = BazaarError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        assert!(io.is_storage());

        let sqlite = BazaarError::from(rusqlite::Error::InvalidQuery);
        assert!(matches!(sqlite, BazaarError::Storage(_)));
        assert!(sqlite.is_storage());

        assert!(!BazaarError::Validation("name is empty".to_string()).is_storage());
        assert!(!BazaarError::CategoryResolution("mismatch".to_string()).is_storage());
    }
}
