//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the API credential.
pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding the model identifier.
pub const ENV_MODEL: &str = "ANTHROPIC_MODEL";
/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "ANTHROPIC_BASE_URL";
/// Environment variable holding the document store location.
pub const ENV_DATABASE_URI: &str = "DATABASE_URI";
/// Environment variable holding the database name.
pub const ENV_DATABASE_NAME: &str = "INVOICE_DATABASE";

/// Main configuration for pdfledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Extraction service configuration.
    pub api: ApiConfig,

    /// Invoice document store configuration.
    pub store: StoreConfig,

    /// CSV export configuration.
    pub export: ExportConfig,
}

/// Extraction service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Messages API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Maximum number of tokens in the response.
    pub max_tokens: u32,

    /// Value of the `anthropic-version` header.
    pub api_version: String,

    /// Request timeout in seconds (none = wait for the service).
    pub timeout_secs: Option<u64>,

    /// API credential. Never written back to disk.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-7-sonnet-20250219".to_string(),
            max_tokens: 4096,
            api_version: "2023-06-01".to_string(),
            timeout_secs: None,
            api_key: None,
        }
    }
}

/// Invoice document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the database, optionally prefixed with `sqlite://`.
    pub database_uri: String,

    /// Database name; the file is `<database_uri>/<database>.db`.
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_uri: ".".to_string(),
            database: "invoices".to_string(),
        }
    }
}

impl StoreConfig {
    /// Resolve the database file path.
    pub fn db_path(&self) -> PathBuf {
        let dir = self
            .database_uri
            .strip_prefix("sqlite://")
            .unwrap_or(&self.database_uri);
        let dir = if dir.is_empty() { "." } else { dir };

        let file = if self.database.ends_with(".db") {
            self.database.clone()
        } else {
            format!("{}.db", self.database)
        };

        PathBuf::from(dir).join(file)
    }
}

/// CSV export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for default output files (none = working directory).
    pub output_dir: Option<PathBuf>,

    /// Number of rows echoed after a statement export.
    pub sample_rows: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            sample_rows: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Overlay values from the environment.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`; empty values are
    /// ignored so a blank `.env` entry does not clobber the file config.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.api.model = model;
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(uri) = get(ENV_DATABASE_URI) {
            self.store.database_uri = uri;
        }
        if let Some(name) = get(ENV_DATABASE_NAME) {
            self.store.database = name;
        }

        self
    }

    /// Output path for a statement when none is given: `<stem>_transactions.csv`.
    pub fn default_statement_output(&self, input: &std::path::Path) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("statement");
        let name = format!("{}_transactions.csv", stem);

        match &self.export.output_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::Path;

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "sk-test"),
            (ENV_DATABASE_URI, "sqlite:///var/lib/pdfledger"),
            (ENV_DATABASE_NAME, "ads"),
            (ENV_MODEL, "  "),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::default().with_env_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.api.model, "claude-3-7-sonnet-20250219");
        assert_eq!(config.store.db_path(), PathBuf::from("/var/lib/pdfledger/ads.db"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = AppConfig::default();
        config.api.api_key = Some("secret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api": {"max_tokens": 8000}}"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.api.max_tokens, 8000);
        assert_eq!(config.api.api_version, "2023-06-01");
        assert_eq!(config.store.database, "invoices");
    }

    #[test]
    fn test_default_statement_output() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.default_statement_output(Path::new("statements/2025-02 Statement.pdf")),
            PathBuf::from("2025-02 Statement_transactions.csv")
        );

        config.export.output_dir = Some(PathBuf::from("out"));
        assert_eq!(
            config.default_statement_output(Path::new("feb.pdf")),
            PathBuf::from("out/feb_transactions.csv")
        );
    }
}
