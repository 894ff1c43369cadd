//! Stateful construction of dependency trees from CoNLL lines.
//!
//! A [`TreeBuilder`] reads lines until a blank line (or end of input) closes
//! the current sentence block. Within one block it handles two things a
//! single forward pass cannot resolve at decode time:
//!
//! - **Forward references.** A token may name a head whose line has not been
//!   read yet. Such links wait in a per-tree table keyed by dependent position
//!   and are attached once the whole block is known.
//! - **Embedded sentences.** Several sentences can follow each other without a
//!   blank separator. When a token id restarts at 0 or 1 in a way that cannot
//!   continue the previous numbering, the builder re-bases later head ids onto
//!   the running node count so every sentence links within itself.
//!
//! The builder is reusable: once a tree is returned all per-tree state is
//! cleared and only the stream line counter carries over. A format error
//! stops reading in the middle of a block; the builder then stays
//! [`BuilderState::Interrupted`] and drains the rest of that block before
//! it reads the next one.

use std::io::BufRead;

use indexmap::IndexMap;

use crate::error::{ExtractError, FormatError};
use crate::normalize::WordNormalizer;
use crate::record::Record;
use crate::schema::ColumnSchema;
use crate::tree::{DependencyTree, NodeId, TreeNode};

/// Where the builder is in the life of one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// No sentence in progress
    Idle,
    /// Accumulating nodes for the current block
    Building,
    /// Block closed, deferred links not yet attached
    Complete,
    /// An error stopped reading partway through a block
    Interrupted,
}

/// A head link waiting for its head node to be read.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeferredLink {
    head: usize,
    label: String,
}

/// Builds one [`DependencyTree`] per call to [`TreeBuilder::read_tree`].
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    schema: &'a ColumnSchema,
    normalizer: &'a WordNormalizer,
    state: BuilderState,
    tree: DependencyTree,
    /// dependent position -> link to a head not yet constructed
    deferred: IndexMap<usize, DeferredLink>,
    /// Node count at the start of the current embedded sentence
    offset: usize,
    lines_read: usize,
    buf: String,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(schema: &'a ColumnSchema, normalizer: &'a WordNormalizer) -> Self {
        Self {
            schema,
            normalizer,
            state: BuilderState::Idle,
            tree: DependencyTree::new(),
            deferred: IndexMap::new(),
            offset: 0,
            lines_read: 0,
            buf: String::new(),
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Number of lines consumed from the stream so far, across all trees.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Read the next tree from `reader`.
    ///
    /// Leading blank lines are skipped. Returns `Ok(None)` when the input
    /// ends before any token line, which is the normal end-of-stream signal.
    /// Any error discards the partial tree. If the previous call failed in
    /// the middle of a block, the rest of that block is skipped first.
    pub fn read_tree<R: BufRead + ?Sized>(
        &mut self,
        reader: &mut R,
    ) -> Result<Option<DependencyTree>, ExtractError> {
        self.skip_block(reader)?;

        let result = self.consume_block(reader).and_then(|()| self.finish());
        if let Err(e) = &result {
            self.reset();
            // an unresolved head is only found after the block was fully read
            if !matches!(e, ExtractError::UnresolvedHead { .. }) {
                self.state = BuilderState::Interrupted;
            }
        }
        result
    }

    /// Drain the rest of an interrupted block, up to and including the next
    /// blank line. Does nothing unless the builder is
    /// [`BuilderState::Interrupted`].
    ///
    /// Returns the number of token lines skipped.
    pub fn skip_block<R: BufRead + ?Sized>(&mut self, reader: &mut R) -> Result<usize, ExtractError> {
        if self.state != BuilderState::Interrupted {
            return Ok(0);
        }

        let mut skipped = 0;
        loop {
            self.buf.clear();
            if reader.read_line(&mut self.buf)? == 0 {
                break;
            }
            self.lines_read += 1;
            if self.buf.trim().is_empty() {
                break;
            }
            skipped += 1;
        }

        tracing::debug!(
            line = self.lines_read,
            skipped,
            "skipped rest of malformed sentence block"
        );
        self.state = BuilderState::Idle;
        Ok(skipped)
    }

    fn consume_block<R: BufRead + ?Sized>(&mut self, reader: &mut R) -> Result<(), ExtractError> {
        loop {
            self.buf.clear();
            if reader.read_line(&mut self.buf)? == 0 {
                break;
            }
            self.lines_read += 1;

            let line = std::mem::take(&mut self.buf);
            let outcome = self.feed_line(line.trim());
            self.buf = line;

            if outcome? == BuilderState::Complete {
                break;
            }
        }

        if self.state == BuilderState::Building {
            self.state = BuilderState::Complete;
        }
        Ok(())
    }

    /// Process one trimmed line and report the resulting state.
    fn feed_line(&mut self, line: &str) -> Result<BuilderState, ExtractError> {
        if line.is_empty() {
            if self.state == BuilderState::Building {
                self.state = BuilderState::Complete;
            }
            return Ok(self.state);
        }

        let record = Record::decode(line, self.schema).map_err(|e| e.at_line(self.lines_read))?;
        self.push_record(&record)?;
        self.state = BuilderState::Building;
        Ok(self.state)
    }

    fn push_record(&mut self, record: &Record<'_>) -> Result<(), FormatError> {
        let position = self.tree.len();

        if self.starts_embedded_sentence(record.id, position) {
            tracing::debug!(
                line = self.lines_read,
                position,
                previous_offset = self.offset,
                "token id restarted, re-basing head references"
            );
            self.offset = position;
        }

        let head = self.head_position(record.parent, position)?;
        let word = self.normalizer.resolve_word(record.form);
        let lemma = self.normalizer.resolve_lemma(record.lemma, &word);
        let node = self
            .tree
            .push_node(TreeNode::new(word, lemma, record.pos.to_string(), position));

        tracing::trace!(
            line = self.lines_read,
            position,
            id = record.id,
            parent = record.parent,
            relation = record.relation,
            "decoded token"
        );

        match head {
            None => {}
            Some(head) if head < position => {
                self.tree.link(NodeId(head), node, record.relation);
            }
            Some(head) => {
                self.deferred.insert(
                    position,
                    DeferredLink {
                        head,
                        label: record.relation.to_string(),
                    },
                );
            }
        }
        Ok(())
    }

    /// Whether a token id of 0 or 1 cannot continue the current sentence.
    ///
    /// An id of 0 is only a continuation as the very first token of the
    /// sentence; an id of 1 may also follow a leading 0.
    fn starts_embedded_sentence(&self, id: i64, position: usize) -> bool {
        match id {
            0 => position != self.offset,
            1 => position != self.offset && position != self.offset + 1,
            _ => false,
        }
    }

    /// Map a raw 1-based head id onto a node position in the tree.
    ///
    /// Returns `None` for a root: any head position not past the start of
    /// the current sentence (this includes head ids 0 and 1), or a token
    /// naming itself as its own head.
    fn head_position(&self, parent: i64, position: usize) -> Result<Option<usize>, FormatError> {
        let out_of_range = || FormatError::HeadOutOfRange {
            line: self.lines_read,
            value: parent,
        };

        let offset = i64::try_from(self.offset).map_err(|_| out_of_range())?;
        let head = parent
            .checked_sub(1)
            .and_then(|p| p.checked_add(offset))
            .ok_or_else(out_of_range)?;

        if head <= offset || head == position as i64 {
            return Ok(None);
        }
        usize::try_from(head).map(Some).map_err(|_| out_of_range())
    }

    /// Attach deferred links and hand out the finished tree.
    fn finish(&mut self) -> Result<Option<DependencyTree>, ExtractError> {
        if self.tree.is_empty() {
            self.reset();
            return Ok(None);
        }
        debug_assert_eq!(self.state, BuilderState::Complete);

        if !self.deferred.is_empty() {
            tracing::debug!(
                count = self.deferred.len(),
                nodes = self.tree.len(),
                "resolving forward head references"
            );
        }

        let len = self.tree.len();
        for (dependent, link) in std::mem::take(&mut self.deferred) {
            if link.head >= len {
                return Err(ExtractError::UnresolvedHead {
                    dependent,
                    head: link.head,
                    len,
                });
            }
            self.tree.link(NodeId(link.head), NodeId(dependent), &link.label);
        }

        let tree = std::mem::take(&mut self.tree);
        self.reset();
        Ok(Some(tree))
    }

    fn reset(&mut self) {
        self.state = BuilderState::Idle;
        self.tree = DependencyTree::new();
        self.deferred.clear();
        self.offset = 0;
    }
}
