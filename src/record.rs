//! Decoding of single CoNLL lines.

use crate::error::FormatError;
use crate::schema::ColumnSchema;

/// Placeholder a parser writes when it has no value for a column.
pub const PLACEHOLDER: &str = "_";

/// The features of one token line, borrowed from the line text.
///
/// Records are transient: the tree builder consumes each one immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    /// Position of the token in its sentence, as written by the parser
    pub id: i64,
    /// Id of the head token; `0` marks the sentence root
    pub parent: i64,
    pub form: &'a str,
    /// Lemma, or [`PLACEHOLDER`] when the parser did not lemmatize
    pub lemma: &'a str,
    pub pos: &'a str,
    pub relation: &'a str,
}

impl<'a> Record<'a> {
    /// Decode a trimmed, non-empty line according to `schema`.
    ///
    /// Columns are separated by runs of whitespace. Errors carry line number
    /// `0`; callers that track stream position attach it with
    /// [`FormatError::at_line`].
    pub fn decode(line: &'a str, schema: &ColumnSchema) -> Result<Self, FormatError> {
        let columns: Vec<&str> = line.split_whitespace().collect();

        let expected = schema.min_columns();
        if columns.len() < expected {
            return Err(FormatError::TooFewColumns {
                line: 0,
                expected,
                found: columns.len(),
            });
        }

        Ok(Self {
            id: parse_integer(columns[schema.id], "ID")?,
            parent: parse_integer(columns[schema.parent], "HEAD")?,
            form: columns[schema.form],
            lemma: columns[schema.lemma],
            pos: columns[schema.pos],
            relation: columns[schema.relation],
        })
    }
}

fn parse_integer(value: &str, column: &'static str) -> Result<i64, FormatError> {
    value.parse::<i64>().map_err(|_| FormatError::InvalidInteger {
        line: 0,
        column,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_default_schema() {
        let schema = ColumnSchema::default();
        let record = Record::decode("1\tDogs\tdog\tNN\t_\t_\t2\tnsubj", &schema).unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.parent, 2);
        assert_eq!(record.form, "Dogs");
        assert_eq!(record.lemma, "dog");
        assert_eq!(record.pos, "NN");
        assert_eq!(record.relation, "nsubj");
        assert_ne!(record.lemma, PLACEHOLDER);
    }

    #[test]
    fn test_decode_splits_on_whitespace_runs() {
        let schema = ColumnSchema::default();
        let record = Record::decode("2  bark \t bark  VB  _  _  0  root", &schema).unwrap();

        assert_eq!(record.form, "bark");
        assert_eq!(record.parent, 0);
        assert_eq!(record.relation, "root");
    }

    #[test]
    fn test_decode_custom_schema() {
        let schema = ColumnSchema::new(0, 1, 2, 3, 4, 5);
        let record = Record::decode("3 ran _ VBD 0 ROOT", &schema).unwrap();

        assert_eq!(record.id, 3);
        assert_eq!(record.parent, 0);
        assert_eq!(record.lemma, PLACEHOLDER);
        assert_eq!(record.relation, "ROOT");
    }

    #[test]
    fn test_too_few_columns() {
        let schema = ColumnSchema::default();
        let err = Record::decode("1 Dogs dog NN _ _ 2", &schema).unwrap_err();

        assert_eq!(
            err,
            FormatError::TooFewColumns {
                line: 0,
                expected: 8,
                found: 7
            }
        );
        assert_eq!(err.at_line(12).line(), 12);
    }

    #[test]
    fn test_non_numeric_id_and_head() {
        let schema = ColumnSchema::default();

        let err = Record::decode("x Dogs dog NN _ _ 2 nsubj", &schema).unwrap_err();
        assert!(matches!(err, FormatError::InvalidInteger { column: "ID", .. }));

        let err = Record::decode("1 Dogs dog NN _ _ two nsubj", &schema).unwrap_err();
        assert!(matches!(err, FormatError::InvalidInteger { column: "HEAD", ref value, .. } if value == "two"));
    }
}
