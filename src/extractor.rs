//! The CoNLL dependency extractor.
//!
//! [`ConllExtractor`] bundles a resolved [`ColumnSchema`] with the word
//! normalization capabilities. It holds no per-tree state, so one extractor
//! can serve any number of streams, including from several threads.

use std::io::BufRead;
use std::path::Path;

use crate::builder::TreeBuilder;
use crate::error::{ConfigError, ExtractError};
use crate::normalize::{Stemmer, TokenFilter, WordNormalizer};
use crate::schema::ColumnSchema;
use crate::stream::TreeStream;
use crate::tree::DependencyTree;

/// Anything that can pull dependency trees out of a line-oriented reader.
pub trait DependencyExtractor {
    /// Read the next tree from `reader`.
    ///
    /// # Returns
    /// * `Ok(Some(tree))` - a sentence block was read
    /// * `Ok(None)` - the reader is exhausted
    /// * `Err(e)` - the block could not be decoded or linked
    ///
    /// After a decode error the reader is left inside the broken block.
    /// Use [`ConllExtractor::trees`] to keep reading past malformed blocks.
    fn read_next_tree(
        &self,
        reader: &mut dyn BufRead,
    ) -> Result<Option<DependencyTree>, ExtractError>;
}

/// Extractor for MaltParser / CoNLL-X style output.
///
/// # Example
///
/// ```ignore
/// use conll_extract::ConllExtractor;
///
/// let extractor = ConllExtractor::from_schema_file("malt/conllx.xml")?;
/// for tree in extractor.trees(std::io::stdin().lock()) {
///     let tree = tree?;
///     println!("{}", tree.words().collect::<Vec<_>>().join(" "));
/// }
/// ```
#[derive(Debug, Default)]
pub struct ConllExtractor {
    schema: ColumnSchema,
    normalizer: WordNormalizer,
}

impl ConllExtractor {
    /// Extractor using the default MaltParser column layout, no filter and no
    /// stemmer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor using the default column layout with the given capabilities.
    pub fn with_capabilities(filter: Box<dyn TokenFilter>, stemmer: Box<dyn Stemmer>) -> Self {
        Self {
            schema: ColumnSchema::default(),
            normalizer: WordNormalizer::new(filter, stemmer),
        }
    }

    /// Extractor whose column layout comes from a description file.
    ///
    /// Fails immediately if the description cannot be read or parsed.
    pub fn from_schema_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::new().with_schema(ColumnSchema::load_from_file(path)?))
    }

    pub fn with_schema(mut self, schema: ColumnSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.normalizer = self.normalizer.with_filter(filter);
        self
    }

    pub fn with_stemmer(mut self, stemmer: Box<dyn Stemmer>) -> Self {
        self.normalizer = self.normalizer.with_stemmer(stemmer);
        self
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn normalizer(&self) -> &WordNormalizer {
        &self.normalizer
    }

    /// A fresh builder bound to this extractor's schema and normalizer.
    pub fn builder(&self) -> TreeBuilder<'_> {
        TreeBuilder::new(&self.schema, &self.normalizer)
    }

    /// Iterate over every tree in `reader`.
    pub fn trees<R: BufRead>(&self, reader: R) -> TreeStream<'_, R> {
        TreeStream::new(self.builder(), reader)
    }
}

impl DependencyExtractor for ConllExtractor {
    fn read_next_tree(
        &self,
        reader: &mut dyn BufRead,
    ) -> Result<Option<DependencyTree>, ExtractError> {
        self.builder().read_tree(reader)
    }
}
