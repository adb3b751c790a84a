//! Service configuration.
//!
//! Loaded from a TOML file. Every field has a default taken from the
//! `sources` registry, so an empty file (or no file at all) reproduces the
//! built-in source formats. Only `discover` consults the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ingest::amo::AmoFormat;
use crate::ingest::oni::OniFormat;
use crate::model::{IndexError, IndexKind};
use crate::sources;

/// Environment variable naming the config file read by `discover`.
pub const CONFIG_PATH_VAR: &str = "OCEAN_INDEX_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub http: HttpConfig,
    pub oni: OniConfig,
    pub amo: AmoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: 30,
            user_agent: format!("ocean_index_service/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OniConfig {
    pub url: String,
    pub table_index: usize,
    pub columns: usize,
}

impl Default for OniConfig {
    fn default() -> Self {
        OniConfig {
            url: sources::ONI_URL.to_string(),
            table_index: sources::ONI_TABLE_INDEX,
            columns: sources::ONI_COLUMNS,
        }
    }
}

impl OniConfig {
    pub fn format(&self) -> OniFormat {
        OniFormat {
            table_index: self.table_index,
            columns: self.columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmoConfig {
    pub url: String,
    pub header_rows: usize,
    pub footer_rows: usize,
    pub start_year: i32,
    pub sentinel: f64,
}

impl Default for AmoConfig {
    fn default() -> Self {
        AmoConfig {
            url: sources::AMO_URL.to_string(),
            header_rows: sources::AMO_HEADER_ROWS,
            footer_rows: sources::AMO_FOOTER_ROWS,
            start_year: sources::AMO_START_YEAR,
            sentinel: sources::AMO_SENTINEL,
        }
    }
}

impl AmoConfig {
    pub fn format(&self) -> AmoFormat {
        AmoFormat {
            header_rows: self.header_rows,
            footer_rows: self.footer_rows,
            start_year: self.start_year,
            sentinel: self.sentinel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Optional log file, appended to.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl ServiceConfig {
    /// Parses configuration from TOML text. Missing sections and fields
    /// fall back to their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, IndexError> {
        toml::from_str(text).map_err(|e| IndexError::Config(format!("invalid TOML: {}", e)))
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            IndexError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `.env` if present, then the file named by `OCEAN_INDEX_CONFIG`,
    /// or the defaults when the variable is unset.
    pub fn discover() -> Result<Self, IndexError> {
        dotenv::dotenv().ok();
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// URL configured for an index.
    pub fn url_for(&self, kind: IndexKind) -> &str {
        match kind {
            IndexKind::Oni => &self.oni.url,
            IndexKind::Amo => &self.amo.url,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_registry_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty TOML is valid");
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.oni.table_index, sources::ONI_TABLE_INDEX);
        assert_eq!(config.amo.start_year, sources::AMO_START_YEAR);
        assert_eq!(config.url_for(IndexKind::Amo), sources::AMO_URL);
    }

    #[test]
    fn test_partial_section_overrides_only_named_fields() {
        let config = ServiceConfig::from_toml_str(
            r#"
            [amo]
            footer_rows = 3
            start_year = 1948

            [http]
            timeout_secs = 5
            "#,
        )
        .expect("valid TOML");
        assert_eq!(config.amo.footer_rows, 3);
        assert_eq!(config.amo.start_year, 1948);
        assert_eq!(config.amo.header_rows, sources::AMO_HEADER_ROWS);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.oni, OniConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = ServiceConfig::from_toml_str("[oni]\ntable_index = \"eight\"");
        assert!(
            matches!(result, Err(IndexError::Config(_))),
            "expected Config error, got {:?}",
            result
        );
    }

    #[test]
    fn test_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[oni]\ntable_index = 3\n\n[logging]\nlevel = \"debug\"")
            .expect("write temp file");
        let config = ServiceConfig::load(file.path()).expect("load config");
        assert_eq!(config.oni.table_index, 3);
        assert_eq!(config.oni.format().table_index, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let result = ServiceConfig::load("/nonexistent/ocean_index.toml");
        assert!(matches!(result, Err(IndexError::Config(_))));
    }
}
