//! Iteration over every tree in a CoNLL stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::builder::TreeBuilder;
use crate::error::ExtractError;
use crate::extractor::ConllExtractor;
use crate::tree::DependencyTree;

/// Pulls trees from a reader until the first empty read.
///
/// Each item is one sentence block. After an error the stream is still
/// usable: the next call resumes at the next sentence block, skipping what
/// is left of a malformed one, and whether to keep going is up to the
/// caller. Once the reader yields no
/// further tree the stream is finished and stays finished.
#[derive(Debug)]
pub struct TreeStream<'a, R> {
    builder: TreeBuilder<'a>,
    reader: R,
    trees_read: usize,
    finished: bool,
}

impl<'a, R: BufRead> TreeStream<'a, R> {
    pub fn new(builder: TreeBuilder<'a>, reader: R) -> Self {
        Self {
            builder,
            reader,
            trees_read: 0,
            finished: false,
        }
    }

    /// Trees yielded so far
    pub fn trees_read(&self) -> usize {
        self.trees_read
    }

    /// Lines consumed from the reader so far
    pub fn lines_read(&self) -> usize {
        self.builder.lines_read()
    }

    /// Release the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<'a> TreeStream<'a, BufReader<File>> {
    /// Open `path` and stream its trees through `extractor`.
    pub fn open<P: AsRef<Path>>(
        extractor: &'a ConllExtractor,
        path: P,
    ) -> Result<Self, ExtractError> {
        let file = File::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "opened CoNLL input");
        Ok(extractor.trees(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for TreeStream<'_, R> {
    type Item = Result<DependencyTree, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.builder.read_tree(&mut self.reader) {
            Ok(Some(tree)) => {
                self.trees_read += 1;
                Some(Ok(tree))
            }
            Ok(None) => {
                tracing::debug!(
                    trees = self.trees_read,
                    lines = self.builder.lines_read(),
                    "end of CoNLL stream"
                );
                self.finished = true;
                None
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for TreeStream<'_, R> {}
