//! Document model consumed by the document autolinker
//!
//! Any Markdown engine can be adapted behind [`MarkdownEngine`] and
//! [`DocumentTree`]. The autolinker only reads node kinds and text literals,
//! inserts siblings before existing nodes and unlinks nodes once the walk is
//! over.

use crate::error::AutolinkResult;

/// Opaque handle of a node in a [`DocumentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// The node kinds the autolinker distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Paragraph,
    Link,
    Other,
}

/// Read-only view of one node during a walk
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Literal content; only set for Text nodes
    pub literal: Option<&'a str>,
    pub parent: Option<NodeId>,
    pub parent_kind: Option<NodeKind>,
}

impl NodeView<'_> {
    /// Plain text directly inside a paragraph, the only text that is linked
    pub fn is_paragraph_text(&self) -> bool {
        self.kind == NodeKind::Text && self.parent_kind == Some(NodeKind::Paragraph)
    }
}

/// A parsed document that supports the edits autolinking needs
pub trait DocumentTree {
    /// Visit every node in document order
    fn for_each_node<'a>(&'a self, visitor: &mut dyn FnMut(NodeView<'a>));

    /// Insert a text node as the previous sibling of `anchor`
    fn insert_text_before(&mut self, anchor: NodeId, text: &str) -> NodeId;

    /// Insert a link node as the previous sibling of `anchor`
    fn insert_link_before(&mut self, anchor: NodeId, text: &str, url: &str) -> NodeId;

    /// Detach `node` from the tree
    fn unlink(&mut self, node: NodeId);

    /// Serialize the tree back to Markdown
    fn render(&self) -> String;
}

/// Parses Markdown into a [`DocumentTree`]
pub trait MarkdownEngine {
    type Tree: DocumentTree;

    fn parse(&self, markdown: &str) -> AutolinkResult<Self::Tree>;
}
