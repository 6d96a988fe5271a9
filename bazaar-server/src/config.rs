use bazaar_core::{BazaarError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9000";
const DEFAULT_FRONT_URL: &str = "http://localhost:3000";
const DEFAULT_DB_PATH: &str = "db/catalog.sqlite3";
const DEFAULT_IMAGE_DIR: &str = "images";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Only origin allowed by CORS.
    pub front_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    pub image_dir: PathBuf,
}

impl Config {
    /// Defaults, then the optional file, then `BAZAAR_*` environment variables
    /// (e.g. `BAZAAR_STORAGE__DB_PATH`). `FRONT_URL` is read as the default origin.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let front_url =
            std::env::var("FRONT_URL").unwrap_or_else(|_| DEFAULT_FRONT_URL.to_string());

        let mut builder = ::config::Config::builder()
            .set_default("server.bind_addr", DEFAULT_BIND_ADDR)
            .and_then(|b| b.set_default("server.front_url", front_url))
            .and_then(|b| b.set_default("storage.db_path", DEFAULT_DB_PATH))
            .and_then(|b| b.set_default("storage.image_dir", DEFAULT_IMAGE_DIR))
            .map_err(|e| BazaarError::Config(e.to_string()))?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path));
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix("BAZAAR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| BazaarError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| BazaarError::Config(e.to_string()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_overrides_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bazaar.toml");
        std::fs::write(
            &path,
            "[storage]\ndb_path = \"/var/lib/bazaar/catalog.sqlite3\"\n",
        )
        .unwrap();

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(
            config.storage.db_path,
            PathBuf::from("/var/lib/bazaar/catalog.sqlite3")
        );
        assert_eq!(config.storage.image_dir, PathBuf::from(DEFAULT_IMAGE_DIR));
        assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let error = Config::load(Some("/nonexistent/bazaar.toml")).unwrap_err();
        assert!(matches!(error, BazaarError::Config(_)));
    }
}
