//! Writers for inspecting extracted trees.
//!
//! These back the `conll-extract parse` command. Trees are written either as
//! NDJSON (one object per tree) or as an aligned text table per sentence.

use std::io::Write;

use serde::Serialize;

use crate::tree::{DependencyTree, NodeId};

/// Error type for serialization operations
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat, per-token view of a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRecord<'a> {
    pub sentence: usize,
    pub tokens: Vec<TokenRecord<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRecord<'a> {
    pub index: usize,
    pub word: &'a str,
    pub lemma: &'a str,
    pub pos: &'a str,
    /// Position of the head, `None` for roots
    pub head: Option<usize>,
    pub relation: Option<&'a str>,
}

impl<'a> TreeRecord<'a> {
    pub fn new(sentence: usize, tree: &'a DependencyTree) -> Self {
        let tokens = tree
            .nodes()
            .iter()
            .map(|node| {
                let head = tree.head_of(NodeId(node.index()));
                TokenRecord {
                    index: node.index(),
                    word: node.word(),
                    lemma: node.lemma(),
                    pos: node.pos(),
                    head: head.map(|r| r.head().0),
                    relation: head.map(|r| r.label()),
                }
            })
            .collect();

        Self { sentence, tokens }
    }
}

/// NDJSON (Newline Delimited JSON) writer
///
/// Writes one JSON object per tree.
pub struct NdjsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one tree as an NDJSON line
    pub fn write(&mut self, sentence: usize, tree: &DependencyTree) -> Result<(), SerializationError> {
        let json = serde_json::to_string(&TreeRecord::new(sentence, tree))?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SerializationError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Human-readable writer: a header line per sentence, then one row per token.
///
/// ```text
/// # sentence 1
/// 0  dogs  dog   NN  <- 1 nsubj
/// 1  bark  bark  VB  root
/// ```
pub struct TextWriter<W: Write> {
    writer: W,
}

impl<W: Write> TextWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write(&mut self, sentence: usize, tree: &DependencyTree) -> Result<(), SerializationError> {
        let record = TreeRecord::new(sentence, tree);
        let word_width = column_width(record.tokens.iter().map(|t| t.word));
        let lemma_width = column_width(record.tokens.iter().map(|t| t.lemma));
        let pos_width = column_width(record.tokens.iter().map(|t| t.pos));

        writeln!(self.writer, "# sentence {}", record.sentence)?;
        for token in &record.tokens {
            let link = match (token.head, token.relation) {
                (Some(head), Some(relation)) => format!("<- {} {}", head, relation),
                _ => "root".to_string(),
            };
            writeln!(
                self.writer,
                "{:<4} {:<ww$}  {:<lw$}  {:<pw$}  {}",
                token.index,
                token.word,
                token.lemma,
                token.pos,
                link,
                ww = word_width,
                lw = lemma_width,
                pw = pos_width,
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SerializationError> {
        self.writer.flush()?;
        Ok(())
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values.map(|v| v.chars().count()).max().unwrap_or(0).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ConllExtractor, DependencyExtractor};
    use std::io::Cursor;

    fn sample_tree() -> DependencyTree {
        let extractor = ConllExtractor::new();
        let mut reader = Cursor::new("1 Dogs dog NN _ _ 2 nsubj\n2 bark bark VB _ _ 0 root\n");
        extractor.read_next_tree(&mut reader).unwrap().unwrap()
    }

    #[test]
    fn test_tree_record() {
        let tree = sample_tree();
        let record = TreeRecord::new(1, &tree);

        assert_eq!(record.tokens.len(), 2);
        assert_eq!(record.tokens[0].head, Some(1));
        assert_eq!(record.tokens[0].relation, Some("nsubj"));
        assert_eq!(record.tokens[1].head, None);
    }

    #[test]
    fn test_ndjson_writer() {
        let tree = sample_tree();
        let mut buf = Vec::new();
        let mut writer = NdjsonWriter::new(&mut buf);

        writer.write(1, &tree).unwrap();
        writer.write(2, &tree).unwrap();
        writer.flush().unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["sentence"], 1);
        assert_eq!(value["tokens"][0]["word"], "dogs");
        assert_eq!(value["tokens"][0]["head"], 1);
        assert!(value["tokens"][1]["head"].is_null());
    }

    #[test]
    fn test_text_writer() {
        let tree = sample_tree();
        let mut buf = Vec::new();
        TextWriter::new(&mut buf).write(1, &tree).unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "# sentence 1");
        assert!(lines[1].starts_with("0    dogs"));
        assert!(lines[1].ends_with("<- 1 nsubj"));
        assert!(lines[2].ends_with("root"));
    }
}
