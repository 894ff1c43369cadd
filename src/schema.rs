//! Column schema resolution.
//!
//! A [`ColumnSchema`] says which whitespace-separated column of a CoNLL line
//! holds each feature the extractor needs. Schemas come from three places:
//!
//! - the fixed MaltParser default ([`ColumnSchema::default`])
//! - six explicit indices ([`ColumnSchema::new`])
//! - an ordered column description, either a MaltParser `<dataformat>` XML
//!   file or a YAML/JSON `columns:` list ([`ColumnSchema::load_from_file`])
//!
//! # Example description (YAML)
//!
//! ```yaml
//! columns:
//!   - ID
//!   - FORM
//!   - LEMMA
//!   - CPOSTAG
//!   - POSTAG
//!   - FEATS
//!   - HEAD
//!   - DEPREL
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

static COLUMN_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<column\b([^>]*)>").expect("column element pattern"));

static NAME_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bname\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("name attribute pattern")
});

static XML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern"));

/// A feature the extractor reads from every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Id,
    Form,
    Lemma,
    PosTag,
    Head,
    DepRel,
}

impl Feature {
    /// Map a column name from a description to the feature it carries.
    ///
    /// Names are matched exactly; anything else (CPOSTAG, FEATS, PHEAD, ...)
    /// is not read by the extractor.
    pub fn from_column_name(name: &str) -> Option<Self> {
        match name {
            "ID" => Some(Feature::Id),
            "FORM" => Some(Feature::Form),
            "LEMMA" => Some(Feature::Lemma),
            "POSTAG" => Some(Feature::PosTag),
            "HEAD" => Some(Feature::Head),
            "DEPREL" => Some(Feature::DepRel),
            _ => None,
        }
    }

    /// The column name used for this feature in descriptions
    pub fn column_name(&self) -> &'static str {
        match self {
            Feature::Id => "ID",
            Feature::Form => "FORM",
            Feature::Lemma => "LEMMA",
            Feature::PosTag => "POSTAG",
            Feature::Head => "HEAD",
            Feature::DepRel => "DEPREL",
        }
    }
}

/// Column positions of the six features read from each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub id: usize,
    pub form: usize,
    pub lemma: usize,
    pub pos: usize,
    pub parent: usize,
    pub relation: usize,
}

impl Default for ColumnSchema {
    /// The column layout MaltParser writes by default (CoNLL-X).
    fn default() -> Self {
        Self {
            id: 0,
            form: 1,
            lemma: 2,
            pos: 3,
            parent: 6,
            relation: 7,
        }
    }
}

impl ColumnSchema {
    /// Create a schema from explicit indices. The indices are trusted as given.
    pub fn new(
        id: usize,
        form: usize,
        lemma: usize,
        pos: usize,
        parent: usize,
        relation: usize,
    ) -> Self {
        Self {
            id,
            form,
            lemma,
            pos,
            parent,
            relation,
        }
    }

    /// Parse six comma-separated indices in the order
    /// `id,form,lemma,pos,head,deprel`.
    pub fn parse_indices(list: &str) -> Result<Self, ConfigError> {
        let indices = list
            .split(',')
            .map(|s| s.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::InvalidIndices(list.to_string()))?;

        match indices.as_slice() {
            &[id, form, lemma, pos, parent, relation] => {
                Ok(Self::new(id, form, lemma, pos, parent, relation))
            }
            _ => Err(ConfigError::InvalidIndices(list.to_string())),
        }
    }

    /// Resolve a schema from an ordered list of column names.
    ///
    /// Each recognised name takes its 0-based position in the list; a later
    /// duplicate overrides an earlier one. Features that never appear keep
    /// the positions of the first six CoNLL columns with HEAD and DEPREL
    /// immediately after POSTAG.
    pub fn from_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Self::new(0, 1, 2, 3, 4, 5);

        for (position, name) in names.into_iter().enumerate() {
            match Feature::from_column_name(name.as_ref()) {
                Some(Feature::Id) => schema.id = position,
                Some(Feature::Form) => schema.form = position,
                Some(Feature::Lemma) => schema.lemma = position,
                Some(Feature::PosTag) => schema.pos = position,
                Some(Feature::Head) => schema.parent = position,
                Some(Feature::DepRel) => schema.relation = position,
                None => {}
            }
        }

        schema
    }

    /// Load a column description from disk, choosing the format from the
    /// file extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = DescriptionFormat::from_path(path)?;

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let schema = Self::from_description_str(&contents, format)?;
        tracing::debug!(path = %path.display(), %schema, "resolved column schema");
        Ok(schema)
    }

    /// Resolve a schema from the text of a column description.
    pub fn from_description_str(
        contents: &str,
        format: DescriptionFormat,
    ) -> Result<Self, ConfigError> {
        let names = match format {
            DescriptionFormat::MaltXml => malt_column_names(contents)?,
            DescriptionFormat::Yaml => serde_yaml::from_str::<SchemaDescription>(contents)
                .map_err(|e| ConfigError::Parse {
                    format: format.name(),
                    message: e.to_string(),
                })?
                .column_names(),
            DescriptionFormat::Json => serde_json::from_str::<SchemaDescription>(contents)
                .map_err(|e| ConfigError::Parse {
                    format: format.name(),
                    message: e.to_string(),
                })?
                .column_names(),
        };

        Ok(Self::from_columns(names))
    }

    /// The index of a single feature
    pub fn index_of(&self, feature: Feature) -> usize {
        match feature {
            Feature::Id => self.id,
            Feature::Form => self.form,
            Feature::Lemma => self.lemma,
            Feature::PosTag => self.pos,
            Feature::Head => self.parent,
            Feature::DepRel => self.relation,
        }
    }

    /// The highest column index any feature reads from.
    pub fn max_index(&self) -> usize {
        [
            self.id,
            self.form,
            self.lemma,
            self.pos,
            self.parent,
            self.relation,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Minimum number of columns a line must have to be decodable.
    pub fn min_columns(&self) -> usize {
        self.max_index() + 1
    }
}

impl fmt::Display for ColumnSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID={} FORM={} LEMMA={} POSTAG={} HEAD={} DEPREL={}",
            self.id, self.form, self.lemma, self.pos, self.parent, self.relation
        )
    }
}

/// Serialization format of a column description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionFormat {
    /// MaltParser `<dataformat>` XML with one `<column name="..."/>` per column
    MaltXml,
    Yaml,
    Json,
}

impl DescriptionFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xml") => Ok(DescriptionFormat::MaltXml),
            Some("yaml") | Some("yml") => Ok(DescriptionFormat::Yaml),
            Some("json") => Ok(DescriptionFormat::Json),
            _ => Err(ConfigError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DescriptionFormat::MaltXml => "XML",
            DescriptionFormat::Yaml => "YAML",
            DescriptionFormat::Json => "JSON",
        }
    }
}

/// Ordered column list as written in YAML or JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub columns: Vec<ColumnEntry>,
}

/// One column entry: either a bare name or a mapping with a `name` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnEntry {
    Name(String),
    Column {
        #[serde(default)]
        name: String,
    },
}

impl ColumnEntry {
    pub fn name(&self) -> &str {
        match self {
            ColumnEntry::Name(name) => name,
            ColumnEntry::Column { name } => name,
        }
    }
}

impl SchemaDescription {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }
}

/// Collect the `name` attribute of every `<column>` element in document
/// order. Elements without a name still occupy a position.
///
/// This is a pattern scan, not an XML parser: comments are stripped, but
/// entity references in attribute values (`&quot;`, `&#65;`) are kept
/// verbatim and `<column>` text inside CDATA sections is still matched.
/// MaltParser format files use neither.
fn malt_column_names(contents: &str) -> Result<Vec<String>, ConfigError> {
    let body = contents.trim_start_matches('\u{feff}').trim();
    if !body.starts_with('<') || !body.ends_with('>') {
        return Err(ConfigError::Parse {
            format: DescriptionFormat::MaltXml.name(),
            message: "document is not XML".to_string(),
        });
    }

    let body = XML_COMMENT.replace_all(body, "");
    let names: Vec<String> = COLUMN_ELEMENT
        .captures_iter(&body)
        .map(|element| {
            NAME_ATTRIBUTE
                .captures(&element[1])
                .and_then(|attr| attr.get(1).or_else(|| attr.get(2)))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
        .collect();

    if names.is_empty() {
        return Err(ConfigError::Parse {
            format: DescriptionFormat::MaltXml.name(),
            message: "no <column> elements found".to_string(),
        });
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MALT_CONLLX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dataformat name="conllx" reader="tab" writer="tab">
    <column name="ID" category="INPUT" type="INTEGER"/>
    <column name="FORM" category="INPUT" type="STRING"/>
    <column name="LEMMA" category="INPUT" type="STRING"/>
    <column name="CPOSTAG" category="INPUT" type="STRING"/>
    <column name="POSTAG" category="INPUT" type="STRING"/>
    <column name="FEATS" category="INPUT" type="SPLIT"/>
    <column name="HEAD" category="HEAD" type="INTEGER"/>
    <column name="DEPREL" category="DEPENDENCY_EDGE_LABEL" type="STRING"/>
    <column name="PHEAD" category="IGNORE" type="INTEGER"/>
    <column name="PDEPREL" category="IGNORE" type="STRING"/>
</dataformat>
"#;

    #[test]
    fn test_default_schema() {
        let schema = ColumnSchema::default();
        assert_eq!(schema, ColumnSchema::new(0, 1, 2, 3, 6, 7));
        assert_eq!(schema.max_index(), 7);
        assert_eq!(schema.min_columns(), 8);
    }

    #[test]
    fn test_from_columns_reorders() {
        let schema = ColumnSchema::from_columns(["FORM", "ID", "DEPREL", "HEAD", "POSTAG", "LEMMA"]);
        assert_eq!(schema, ColumnSchema::new(1, 0, 5, 4, 3, 2));
    }

    #[test]
    fn test_from_columns_keeps_fallback_for_missing_features() {
        let schema = ColumnSchema::from_columns(["ID", "FORM", "CPOSTAG"]);
        assert_eq!(schema, ColumnSchema::new(0, 1, 2, 3, 4, 5));
    }

    #[test]
    fn test_from_columns_last_duplicate_wins() {
        let schema = ColumnSchema::from_columns(["ID", "FORM", "LEMMA", "POSTAG", "HEAD", "DEPREL", "HEAD"]);
        assert_eq!(schema.parent, 6);
    }

    #[test]
    fn test_malt_xml_description() {
        let schema =
            ColumnSchema::from_description_str(MALT_CONLLX, DescriptionFormat::MaltXml).unwrap();
        assert_eq!(schema, ColumnSchema::new(0, 1, 2, 4, 6, 7));
    }

    #[test]
    fn test_malt_xml_ignores_comments_and_counts_unnamed_columns() {
        let xml = r#"<dataformat>
            <!-- <column name="HEAD"/> -->
            <column category="IGNORE"/>
            <column name='ID'/>
            <column name="FORM"/>
        </dataformat>"#;
        let schema = ColumnSchema::from_description_str(xml, DescriptionFormat::MaltXml).unwrap();
        assert_eq!(schema.id, 1);
        assert_eq!(schema.form, 2);
        assert_eq!(schema.parent, 4);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = ColumnSchema::from_description_str("ID FORM", DescriptionFormat::MaltXml);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));

        let result =
            ColumnSchema::from_description_str("<dataformat/>", DescriptionFormat::MaltXml);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_yaml_description_accepts_both_entry_shapes() {
        let yaml = "columns:\n  - ID\n  - name: FORM\n  - LEMMA\n  - POSTAG\n  - DEPREL\n  - HEAD\n";
        let schema = ColumnSchema::from_description_str(yaml, DescriptionFormat::Yaml).unwrap();
        assert_eq!(schema, ColumnSchema::new(0, 1, 2, 3, 5, 4));
    }

    #[test]
    fn test_json_description() {
        let json = r#"{"columns": [{"name": "ID"}, {"name": "FORM"}, {"name": "POSTAG"}, {"name": "HEAD"}, {"name": "DEPREL"}]}"#;
        let schema = ColumnSchema::from_description_str(json, DescriptionFormat::Json).unwrap();
        assert_eq!(schema.pos, 2);
        assert_eq!(schema.parent, 3);
        assert_eq!(schema.relation, 4);
        assert_eq!(schema.lemma, 2);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let result = ColumnSchema::from_description_str("columns: {", DescriptionFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::Parse { format: "YAML", .. })));
    }

    #[test]
    fn test_parse_indices() {
        let schema = ColumnSchema::parse_indices("0, 1, 2, 4, 6, 7").unwrap();
        assert_eq!(schema, ColumnSchema::new(0, 1, 2, 4, 6, 7));

        assert!(ColumnSchema::parse_indices("0,1,2").is_err());
        assert!(ColumnSchema::parse_indices("0,1,2,3,x,5").is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DescriptionFormat::from_path(Path::new("malt.XML")).unwrap(),
            DescriptionFormat::MaltXml
        );
        assert_eq!(
            DescriptionFormat::from_path(Path::new("schema.yml")).unwrap(),
            DescriptionFormat::Yaml
        );
        assert!(DescriptionFormat::from_path(Path::new("schema.txt")).is_err());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = ColumnSchema::load_from_file("/nonexistent/schema.yaml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
