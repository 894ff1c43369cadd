//! Arena representation of a dependency tree.
//!
//! Nodes and relations live in two vectors owned by the [`DependencyTree`].
//! A [`Relation`] stores the handles of its head and dependent, and each
//! [`TreeNode`] stores the handles of every relation touching it, so the graph
//! can be walked in both directions without reference cycles.

use serde::Serialize;

use crate::normalize::EMPTY_TOKEN;

/// Handle of a node; equal to the node's zero-based position in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Handle of a relation within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RelationId(pub usize);

/// One word of a parsed sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    word: String,
    lemma: String,
    pos: String,
    index: usize,
    relations: Vec<RelationId>,
}

impl TreeNode {
    pub(crate) fn new(word: String, lemma: String, pos: String, index: usize) -> Self {
        Self {
            word,
            lemma,
            pos,
            index,
            relations: Vec::new(),
        }
    }

    /// The lower-cased word, or [`EMPTY_TOKEN`] if it was filtered out
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn pos(&self) -> &str {
        &self.pos
    }

    /// Zero-based position in the tree
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> NodeId {
        NodeId(self.index)
    }

    /// Every relation this node takes part in, as head or as dependent
    pub fn relations(&self) -> &[RelationId] {
        &self.relations
    }

    pub fn is_filtered(&self) -> bool {
        self.word == EMPTY_TOKEN
    }
}

/// A labelled head to dependent edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    head: NodeId,
    dependent: NodeId,
    label: String,
}

impl Relation {
    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn dependent(&self) -> NodeId {
        self.dependent
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A completed dependency tree: nodes in sentence order plus their relations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyTree {
    nodes: Vec<TreeNode>,
    relations: Vec<Relation>,
}

impl DependencyTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a node; its index must be the next free position.
    pub(crate) fn push_node(&mut self, node: TreeNode) -> NodeId {
        debug_assert_eq!(node.index, self.nodes.len());
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Create a relation and register it on both endpoints.
    pub(crate) fn link(&mut self, head: NodeId, dependent: NodeId, label: &str) -> RelationId {
        debug_assert_ne!(head, dependent);
        let id = RelationId(self.relations.len());
        self.relations.push(Relation {
            head,
            dependent,
            label: label.to_string(),
        });
        self.nodes[head.0].relations.push(id);
        self.nodes[dependent.0].relations.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relation(&self, id: RelationId) -> Option<&Relation> {
        self.relations.get(id.0)
    }

    /// Relations touching `node`, in the order they were attached.
    pub fn incident(&self, node: NodeId) -> impl Iterator<Item = &Relation> + '_ {
        self.nodes
            .get(node.0)
            .map(|n| n.relations.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |r| &self.relations[r.0])
    }

    /// The relation attaching `node` to its head, if it has one.
    pub fn head_of(&self, node: NodeId) -> Option<&Relation> {
        self.incident(node).find(|r| r.dependent == node)
    }

    /// Relations where `node` is the head.
    pub fn dependents(&self, node: NodeId) -> impl Iterator<Item = &Relation> + '_ {
        self.incident(node).filter(move |r| r.head == node)
    }

    /// Nodes without a head.
    pub fn roots(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes
            .iter()
            .filter(move |n| self.head_of(n.id()).is_none())
    }

    /// Stored words in sentence order.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().map(|n| n.word())
    }
}
