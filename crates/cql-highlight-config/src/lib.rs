use cql_highlight_engine::{CorpusSchema, Highlighter, Labels, QueryDialect, SchemaValidator};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read corpus schema at {schema_path}: {source}")]
    SchemaReadError {
        schema_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse corpus schema at {schema_path}: {source}")]
    SchemaParseError {
        schema_path: PathBuf,
        source: toml::de::Error,
    },
}

/// How queries are highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    pub dialect: QueryDialect,
    /// Break long queries into lines
    pub long_wrap: bool,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            dialect: QueryDialect::default(),
            long_wrap: true,
        }
    }
}

/// Contents of `config.toml`.
///
/// The corpus schema can be written inline as a `[corpus]` table or kept in
/// its own file named by `schema_path`. The inline table wins when both are
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
    pub highlight: HighlightSettings,
    pub labels: Labels,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus: Option<CorpusSchema>,
    /// Schema read from `schema_path` on load
    #[serde(skip)]
    loaded_schema: Option<CorpusSchema>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            log::debug!("no config file at {}", config_path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the schema path
        config.schema_path = config
            .schema_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        if config.corpus.is_none() {
            if let Some(schema_path) = &config.schema_path {
                config.loaded_schema = Some(Self::load_schema(schema_path)?);
            }
        }

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/cql-highlight");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Highlighter for the configured dialect, labels and wrapping.
    pub fn highlighter(&self) -> Highlighter {
        Highlighter::new(self.highlight.dialect)
            .with_labels(self.labels.clone())
            .with_long_wrap(self.highlight.long_wrap)
    }

    /// The corpus schema, or `None` when no corpus is configured.
    pub fn validator(&self) -> Option<&dyn SchemaValidator> {
        self.corpus
            .as_ref()
            .or(self.loaded_schema.as_ref())
            .map(|schema| schema as &dyn SchemaValidator)
    }

    fn load_schema(schema_path: &Path) -> Result<CorpusSchema, ConfigError> {
        let content = std::fs::read_to_string(schema_path).map_err(|source| {
            ConfigError::SchemaReadError {
                schema_path: schema_path.to_path_buf(),
                source,
            }
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::SchemaParseError {
            schema_path: schema_path.to_path_buf(),
            source,
        })
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
