//! # conll-extract: dependency trees from CoNLL parser output
//!
//! Reads the column-formatted output of dependency parsers such as
//! MaltParser (one token per line, sentences separated by blank lines) and
//! rebuilds each sentence as a graph of word nodes linked by labelled
//! head -> dependent relations.
//!
//! ## Features
//!
//! - **Configurable columns**: default CoNLL-X layout, explicit indices, or a
//!   MaltParser XML / YAML / JSON column description
//! - **Forward references**: heads declared after their dependents are linked
//!   once the sentence block is complete
//! - **Embedded sentences**: token ids restarting mid-block are re-based so
//!   each sentence links within itself
//! - **Word filtering and stemming**: pluggable [`TokenFilter`] and
//!   [`Stemmer`] capabilities; filtered words keep their node and relations
//!
//! ## Example
//!
//! ```ignore
//! use std::io::Cursor;
//! use conll_extract::ConllExtractor;
//!
//! let input = "1 Dogs dog NN _ _ 2 nsubj\n2 bark bark VB _ _ 0 root\n";
//! let extractor = ConllExtractor::new();
//!
//! for tree in extractor.trees(Cursor::new(input)) {
//!     let tree = tree?;
//!     for relation in tree.relations() {
//!         println!("{} -> {}", relation.head().0, relation.dependent().0);
//!     }
//! }
//! ```

pub mod error;
pub mod schema;
pub mod record;
pub mod normalize;
pub mod tree;
pub mod builder;
pub mod extractor;
pub mod stream;
pub mod config;
pub mod serialization;

// Re-export key types
pub use error::{ConfigError, ExtractError, FormatError};
pub use schema::{ColumnSchema, DescriptionFormat, Feature};
pub use record::Record;
pub use normalize::{
    AcceptAll, FilterMode, IdentityStemmer, Stemmer, TokenFilter, WordListFilter,
    WordNormalizer, EMPTY_TOKEN,
};
pub use tree::{DependencyTree, NodeId, Relation, RelationId, TreeNode};
pub use builder::{BuilderState, TreeBuilder};
pub use extractor::{ConllExtractor, DependencyExtractor};
pub use stream::TreeStream;
pub use config::ExtractorConfig;
pub use serialization::{NdjsonWriter, TextWriter};
