//! Extractor configuration files.
//!
//! An extractor config describes the column layout and optional word filter
//! in one YAML (or JSON) document:
//!
//! ```yaml
//! schema:
//!   description: malt/conllx.xml
//! filter:
//!   mode: exclude
//!   words_file: stopwords.txt
//!   words: [rt, via]
//! ```
//!
//! The schema section takes exactly one of `columns` (an ordered list of
//! column names), `description` (path to a Malt XML / YAML / JSON column
//! description) or `indices` (six explicit positions). Relative paths are
//! resolved against the directory of the config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extractor::ConllExtractor;
use crate::normalize::{FilterMode, WordListFilter};
use crate::schema::{ColumnEntry, ColumnSchema};

/// Top-level extractor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub filter: Option<FilterConfig>,
    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Where the column layout comes from. Empty means the MaltParser default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default)]
    pub columns: Option<Vec<ColumnEntry>>,
    #[serde(default)]
    pub description: Option<PathBuf>,
    #[serde(default)]
    pub indices: Option<ColumnSchema>,
}

/// Word-list filter settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub words_file: Option<PathBuf>,
}

impl ExtractorConfig {
    /// Load a config file; `.json` files are read as JSON, anything else as
    /// YAML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let mut config = if is_json {
            serde_json::from_str::<Self>(&contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            })?
        } else {
            Self::from_yaml_str(&contents)?
        };

        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
            format: "YAML",
            message: e.to_string(),
        })
    }

    /// Resolve the configured column schema.
    pub fn resolve_schema(&self) -> Result<ColumnSchema, ConfigError> {
        let SchemaConfig {
            columns,
            description,
            indices,
        } = &self.schema;

        match (columns, description, indices) {
            (None, None, None) => Ok(ColumnSchema::default()),
            (Some(columns), None, None) => {
                Ok(ColumnSchema::from_columns(columns.iter().map(ColumnEntry::name)))
            }
            (None, Some(description), None) => {
                ColumnSchema::load_from_file(self.resolve_path(description))
            }
            (None, None, Some(indices)) => Ok(*indices),
            _ => Err(ConfigError::Invalid(
                "schema takes only one of 'columns', 'description' or 'indices'".to_string(),
            )),
        }
    }

    /// Build the word filter, if one is configured.
    pub fn resolve_filter(&self) -> Result<Option<WordListFilter>, ConfigError> {
        let Some(filter) = &self.filter else {
            return Ok(None);
        };

        let mut words = filter.words.clone();
        if let Some(words_file) = &filter.words_file {
            let listed = WordListFilter::load_from_file(self.resolve_path(words_file), filter.mode)?;
            words.extend(listed.words().map(str::to_string));
        }

        Ok(Some(WordListFilter::new(words, filter.mode)))
    }

    /// Build an extractor from this configuration.
    pub fn build(&self) -> Result<ConllExtractor, ConfigError> {
        let mut extractor = ConllExtractor::new().with_schema(self.resolve_schema()?);
        if let Some(filter) = self.resolve_filter()? {
            extractor = extractor.with_filter(Box::new(filter));
        }
        tracing::debug!(schema = %extractor.schema(), "built extractor from config");
        Ok(extractor)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::TokenFilter;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ExtractorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.resolve_schema().unwrap(), ColumnSchema::default());
        assert!(config.resolve_filter().unwrap().is_none());
    }

    #[test]
    fn test_inline_columns_and_words() {
        let yaml = r#"
schema:
  columns: [ID, FORM, POSTAG, HEAD, DEPREL, LEMMA]
filter:
  mode: include
  words: [Dog, cat]
"#;
        let config = ExtractorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.resolve_schema().unwrap(),
            ColumnSchema::new(0, 1, 5, 2, 3, 4)
        );

        let filter = config.resolve_filter().unwrap().unwrap();
        assert_eq!(filter.mode(), FilterMode::Include);
        assert!(filter.accept("dog"));
        assert!(!filter.accept("bird"));
    }

    #[test]
    fn test_explicit_indices() {
        let yaml = "schema:\n  indices: {id: 0, form: 1, lemma: 2, pos: 4, parent: 6, relation: 7}\n";
        let config = ExtractorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.resolve_schema().unwrap().pos, 4);
    }

    #[test]
    fn test_conflicting_schema_sources() {
        let yaml = "schema:\n  columns: [ID]\n  description: malt.xml\n";
        let config = ExtractorConfig::from_yaml_str(yaml).unwrap();
        assert!(matches!(config.resolve_schema(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = ExtractorConfig::from_yaml_str("schema:\n  colums: [ID]\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("layout.yaml"),
            "columns: [FORM, ID, LEMMA, POSTAG, HEAD, DEPREL]\n",
        )
        .unwrap();
        fs::write(dir.path().join("stop.txt"), "the\nof\n").unwrap();
        fs::write(
            dir.path().join("extractor.yaml"),
            "schema:\n  description: layout.yaml\nfilter:\n  words_file: stop.txt\n  words: [a]\n",
        )
        .unwrap();

        let config = ExtractorConfig::load_from_file(dir.path().join("extractor.yaml")).unwrap();
        let extractor = config.build().unwrap();
        assert_eq!(extractor.schema().id, 1);
        assert_eq!(extractor.schema().form, 0);

        let filter = config.resolve_filter().unwrap().unwrap();
        assert_eq!(filter.len(), 3);
        assert!(!filter.accept("of"));
        assert!(!filter.accept("a"));
    }

    #[test]
    fn test_missing_description_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractor.json");
        fs::write(&path, r#"{"schema": {"description": "missing.xml"}}"#).unwrap();

        let config = ExtractorConfig::load_from_file(&path).unwrap();
        assert!(matches!(config.build(), Err(ConfigError::Read { .. })));
    }
}
