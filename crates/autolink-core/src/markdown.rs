//! pulldown-cmark document engine
//!
//! pulldown-cmark only offers an event stream, so [`PulldownEngine`] folds the
//! offset iterator into an arena tree that remembers the source range of every
//! node. Rendering splices edits into the original source: regions nobody
//! touched come back byte for byte, which a full Markdown re-renderer could
//! not promise.
//!
//! Tight list items carry their inline content without a paragraph event; the
//! tree wraps it in an implicit paragraph so list text is linked like any
//! other paragraph text.

use pulldown_cmark::{Event, Options, Parser as CmarkParser, Tag as CmarkTag};
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::trace;

use crate::document::{DocumentTree, MarkdownEngine, NodeId, NodeKind, NodeView};
use crate::error::{AutolinkError, AutolinkResult};

const ROOT: usize = 0;

/// Markdown engine backed by pulldown-cmark
#[derive(Debug, Clone)]
pub struct PulldownEngine {
    options: Options,
}

impl Default for PulldownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PulldownEngine {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_MATH);
        Self { options }
    }
}

impl MarkdownEngine for PulldownEngine {
    type Tree = SourceTree;

    fn parse(&self, markdown: &str) -> AutolinkResult<SourceTree> {
        let mut builder = TreeBuilder::new(markdown);
        for (event, range) in CmarkParser::new_ext(markdown, self.options).into_offset_iter() {
            builder.push(event, range)?;
        }
        builder.finish()
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Source range; `None` for nodes that were not in the source
    range: Option<Range<usize>>,
    literal: Option<String>,
    url: Option<String>,
    /// Original node a synthetic node was inserted in front of
    anchor: Option<usize>,
    unlinked: bool,
    implicit: bool,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<usize>, range: Option<Range<usize>>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            range,
            literal: None,
            url: None,
            anchor: None,
            unlinked: false,
            implicit: false,
        }
    }
}

/// Arena tree over a Markdown source
#[derive(Debug, Clone)]
pub struct SourceTree {
    source: String,
    nodes: Vec<Node>,
}

impl SourceTree {
    fn add_child(&mut self, parent: usize, node: Node) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    fn insert_before(&mut self, anchor: NodeId, mut node: Node) -> NodeId {
        let anchor = anchor.0;
        let parent = self.nodes[anchor].parent.unwrap_or(ROOT);
        // Synthetic siblings always point at the original node they replace
        node.anchor = Some(self.nodes[anchor].anchor.unwrap_or(anchor));
        node.parent = Some(parent);

        let id = self.nodes.len();
        self.nodes.push(node);
        let siblings = &mut self.nodes[parent].children;
        let position = siblings
            .iter()
            .position(|&child| child == anchor)
            .unwrap_or(siblings.len());
        siblings.insert(position, id);
        NodeId(id)
    }

    fn render_synthetic(&self, id: usize, out: &mut String) {
        let node = &self.nodes[id];
        let text = node.literal.as_deref().unwrap_or_default();
        match (node.kind, node.url.as_deref()) {
            (NodeKind::Link, Some(url)) => {
                escape_link_opener(out);
                out.push('[');
                out.push_str(&escape_link_text(text));
                out.push_str("](");
                out.push_str(&format_destination(url));
                out.push(')');
            }
            _ => out.push_str(text),
        }
    }

    /// Replacement for an original node that was edited
    fn splice_for(&self, anchor: usize) -> Option<(usize, usize, String)> {
        let node = &self.nodes[anchor];
        let range = node.range.clone()?;
        let parent = node.parent?;

        let mut replacement = String::new();
        for &sibling in &self.nodes[parent].children {
            let candidate = &self.nodes[sibling];
            if candidate.anchor == Some(anchor) && !candidate.unlinked {
                self.render_synthetic(sibling, &mut replacement);
            }
        }

        if node.unlinked {
            Some((range.start, range.end, replacement))
        } else {
            Some((range.start, range.start, replacement))
        }
    }

    fn is_detached(&self, mut id: usize) -> bool {
        loop {
            let node = &self.nodes[id];
            if node.unlinked {
                return true;
            }
            match node.parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }
}

impl DocumentTree for SourceTree {
    fn for_each_node<'a>(&'a self, visitor: &mut dyn FnMut(NodeView<'a>)) {
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.unlinked {
                continue;
            }
            let parent_kind = node.parent.map(|p| self.nodes[p].kind);
            visitor(NodeView {
                id: NodeId(id),
                kind: node.kind,
                literal: node.literal.as_deref(),
                parent: node.parent.map(NodeId),
                parent_kind,
            });
            stack.extend(node.children.iter().rev());
        }
    }

    fn insert_text_before(&mut self, anchor: NodeId, text: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Text, None, None);
        node.literal = Some(text.to_string());
        self.insert_before(anchor, node)
    }

    fn insert_link_before(&mut self, anchor: NodeId, text: &str, url: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Link, None, None);
        node.literal = Some(text.to_string());
        node.url = Some(url.to_string());
        self.insert_before(anchor, node)
    }

    fn unlink(&mut self, node: NodeId) {
        if node.0 != ROOT {
            if let Some(node) = self.nodes.get_mut(node.0) {
                node.unlinked = true;
            }
        }
    }

    fn render(&self) -> String {
        let mut edited: BTreeSet<usize> = BTreeSet::new();
        for (id, node) in self.nodes.iter().enumerate() {
            if node.range.is_some() && node.unlinked {
                edited.insert(id);
            }
            if let Some(anchor) = node.anchor {
                if !node.unlinked {
                    edited.insert(anchor);
                }
            }
        }
        if edited.is_empty() {
            return self.source.clone();
        }

        let mut splices: Vec<(usize, usize, String)> = edited
            .into_iter()
            .filter(|&id| {
                // Edits below a removed ancestor vanish with it
                self.nodes[id]
                    .parent
                    .map_or(true, |parent| !self.is_detached(parent))
            })
            .filter_map(|id| self.splice_for(id))
            .collect();
        splices.sort_by_key(|(start, end, _)| (*start, *end));

        let mut out = String::with_capacity(self.source.len() + 64);
        let mut cursor = 0;
        for (start, end, replacement) in splices {
            if start < cursor {
                continue;
            }
            out.push_str(&self.source[cursor..start]);
            out.push_str(&replacement);
            cursor = end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

/// Keep text emitted right before a new `[` from changing its meaning: a
/// bare `!` would open an image and a dangling backslash would escape the
/// bracket.
pub(crate) fn escape_link_opener(out: &mut String) {
    let trailing_backslashes = |s: &str| s.chars().rev().take_while(|&c| c == '\\').count();

    if let Some(before) = out.strip_suffix('!') {
        let bang = before.len();
        if trailing_backslashes(before) % 2 == 0 {
            out.insert(bang, '\\');
        }
    } else if trailing_backslashes(out) % 2 == 1 {
        out.push('\\');
    }
}

fn escape_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn format_destination(url: &str) -> String {
    if url.chars().any(|c| c.is_whitespace() || c == '(' || c == ')') {
        let mut wrapped = String::with_capacity(url.len() + 2);
        wrapped.push('<');
        for c in url.chars() {
            if matches!(c, '<' | '>') {
                wrapped.push('\\');
            }
            wrapped.push(c);
        }
        wrapped.push('>');
        wrapped
    } else {
        url.to_string()
    }
}

fn is_inline_tag(tag: &CmarkTag<'_>) -> bool {
    matches!(
        tag,
        CmarkTag::Emphasis
            | CmarkTag::Strong
            | CmarkTag::Strikethrough
            | CmarkTag::Link { .. }
            | CmarkTag::Image { .. }
    )
}

/// Folds the event stream into a [`SourceTree`]
struct TreeBuilder {
    tree: SourceTree,
    stack: Vec<usize>,
    item_tags: BTreeSet<usize>,
}

impl TreeBuilder {
    fn new(source: &str) -> Self {
        let root = Node::new(NodeKind::Other, None, Some(0..source.len()));
        Self {
            tree: SourceTree {
                source: source.to_string(),
                nodes: vec![root],
            },
            stack: vec![ROOT],
            item_tags: BTreeSet::new(),
        }
    }

    fn top(&self) -> usize {
        self.stack.last().copied().unwrap_or(ROOT)
    }

    fn open(&mut self, kind: NodeKind, range: Option<Range<usize>>, implicit: bool) -> usize {
        let parent = self.top();
        let mut node = Node::new(kind, Some(parent), range);
        node.implicit = implicit;
        let id = self.tree.add_child(parent, node);
        self.stack.push(id);
        id
    }

    fn leaf(&mut self, kind: NodeKind, range: Range<usize>) -> usize {
        let parent = self.top();
        self.tree.add_child(parent, Node::new(kind, Some(parent), Some(range)))
    }

    /// Inline content straight inside a list item opens an implicit paragraph
    fn ensure_inline_container(&mut self) {
        if self.item_tags.contains(&self.top()) {
            self.open(NodeKind::Paragraph, None, true);
        }
    }

    fn close_implicit(&mut self) {
        let top = self.top();
        if self.tree.nodes[top].implicit {
            self.stack.pop();
        }
    }

    fn push_text(&mut self, text: &str, range: Range<usize>) {
        self.ensure_inline_container();

        // Escapes and entities decode to text that differs from the source;
        // those runs are kept opaque so rendering never rewrites them
        if self.tree.source.get(range.clone()) != Some(text) {
            self.leaf(NodeKind::Other, range);
            return;
        }

        let parent = self.top();
        if let Some(&last) = self.tree.nodes[parent].children.last() {
            let previous = &mut self.tree.nodes[last];
            let contiguous = previous.range.as_ref().is_some_and(|r| r.end == range.start);
            if previous.kind == NodeKind::Text && contiguous {
                if let (Some(literal), Some(prev_range)) =
                    (previous.literal.as_mut(), previous.range.as_mut())
                {
                    literal.push_str(text);
                    prev_range.end = range.end;
                    return;
                }
            }
        }

        let id = self.leaf(NodeKind::Text, range);
        self.tree.nodes[id].literal = Some(text.to_string());
    }

    fn push(&mut self, event: Event<'_>, range: Range<usize>) -> AutolinkResult<()> {
        match event {
            Event::Start(tag) => {
                if is_inline_tag(&tag) {
                    self.ensure_inline_container();
                } else {
                    self.close_implicit();
                }
                let kind = match &tag {
                    CmarkTag::Paragraph => NodeKind::Paragraph,
                    CmarkTag::Link { .. } => NodeKind::Link,
                    _ => NodeKind::Other,
                };
                let is_item = matches!(&tag, CmarkTag::Item);
                let id = self.open(kind, Some(range), false);
                if is_item {
                    self.item_tags.insert(id);
                }
            }
            Event::End(_) => {
                self.close_implicit();
                if self.stack.len() <= 1 {
                    return Err(AutolinkError::parse(format!(
                        "unbalanced end tag at {}..{}",
                        range.start, range.end
                    )));
                }
                self.stack.pop();
            }
            Event::Text(text) => self.push_text(&text, range),
            Event::Code(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_)
            | Event::InlineHtml(_)
            | Event::FootnoteReference(_)
            | Event::SoftBreak
            | Event::HardBreak => {
                self.ensure_inline_container();
                self.leaf(NodeKind::Other, range);
            }
            _ => {
                self.leaf(NodeKind::Other, range);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> AutolinkResult<SourceTree> {
        self.close_implicit();
        if self.stack.len() != 1 {
            return Err(AutolinkError::parse(format!(
                "{} unclosed tags at end of document",
                self.stack.len() - 1
            )));
        }
        trace!("Built document tree with {} nodes", self.tree.nodes.len());
        Ok(self.tree)
    }
}
