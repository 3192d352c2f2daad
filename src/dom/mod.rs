//! Arena-based content tree.
//!
//! The preview document is parsed by html5ever into a flat vector of nodes
//! linked by index. Every export clones the whole arena and rewrites the
//! clone, so the preview tree handed to an exporter is never mutated.
//!
//! # Example
//!
//! ```
//! use wenyan::dom::ContentTree;
//!
//! let tree = ContentTree::parse(r#"<section id="wenyan"><p>Hello</p></section>"#);
//! let p = tree.elements_by_tag(tree.root(), "p")[0];
//! assert_eq!(tree.text_content(p), "Hello");
//! ```

use html5ever::{LocalName, Namespace, QualName, ns};

use crate::css::DeclarationBlock;

mod element_ref;
mod serialize;
mod tree_sink;

pub use element_ref::{ElementRef, WenyanSelectors, matches_any, parse_selector_list, select};
pub use serialize::{escape_attr, escape_text};

/// Id of the container element every preview renders into.
pub const ROOT_ID: &str = "wenyan";

/// Elements that start a new line in [`ContentTree::inner_text`].
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "blockquote", "pre", "ul", "ol", "li", "table", "tr", "h1", "h2",
    "h3", "h4", "h5", "h6",
];

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    fn option(self) -> Option<NodeId> {
        self.is_some().then_some(self)
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element { name: QualName, attrs: Vec<Attribute> },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    fn plain(name: &str, value: &str) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string(),
        }
    }
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Mutable document tree rooted at the `#wenyan` container.
///
/// Detached nodes stay allocated in the arena until the tree is dropped;
/// everything reachable from [`ContentTree::root`] is the live document.
#[derive(Debug, Clone)]
pub struct ContentTree {
    nodes: Vec<Node>,
    document: NodeId,
    root: NodeId,
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTree {
    /// Create a tree holding an empty `<section id="wenyan">`.
    pub fn new() -> Self {
        let mut tree = Self::empty();
        let root = tree.create_element("section", &[("id", ROOT_ID)]);
        tree.append(tree.document, root);
        tree.root = root;
        tree
    }

    /// A bare arena with only a document node. Used as the parse target.
    pub(crate) fn empty() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
            root: NodeId::NONE,
        };
        tree.document = tree.alloc(Node::new(NodeData::Document));
        tree
    }

    /// Parse rendered preview HTML.
    ///
    /// If the markup contains an element with `id="wenyan"` that element
    /// becomes the root. Otherwise the body content is wrapped in a fresh
    /// `<section id="wenyan" class="preview">`.
    pub fn parse(html: &str) -> Self {
        let parsed = tree_sink::parse_html(html);
        let mut tree = Self::empty();
        let document = tree.document;

        let existing = parsed.find_element(parsed.document, |t, id| {
            t.get_attr(id, "id") == Some(ROOT_ID)
        });

        match existing {
            Some(found) => {
                let root = tree.import(&parsed, found);
                tree.append(document, root);
                tree.root = root;
            }
            None => {
                let root =
                    tree.create_element("section", &[("id", ROOT_ID), ("class", "preview")]);
                tree.append(document, root);
                tree.root = root;
                if let Some(body) = parsed.find_by_tag("body") {
                    for child in parsed.children(body).collect::<Vec<_>>() {
                        let copy = tree.import(&parsed, child);
                        tree.append(root, copy);
                    }
                }
            }
        }

        tree
    }

    /// Allocate a new node in the arena.
    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// The document node.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// The `#wenyan` container element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of allocated nodes, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the root has no children.
    pub fn is_empty(&self) -> bool {
        self.first_child(self.root).is_none()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Allocate an element from a fully qualified name.
    pub fn alloc_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(Node::new(NodeData::Element { name, attrs }))
    }

    /// Create a detached HTML element with the given attributes.
    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(tag));
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute::plain(name, value))
            .collect();
        self.alloc_element(name, attrs)
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    /// Create a detached doctype node.
    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Deep-copy a subtree of another tree into this arena. The copy is
    /// returned detached.
    pub fn import(&mut self, other: &ContentTree, id: NodeId) -> NodeId {
        let Some(node) = other.get(id) else {
            return NodeId::NONE;
        };
        let copy = self.alloc(Node::new(node.data.clone()));
        for child in other.children(id).collect::<Vec<_>>() {
            let child_copy = self.import(other, child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Parse `markup` as HTML and append the resulting nodes to `parent`.
    pub fn append_html(&mut self, parent: NodeId, markup: &str) {
        let parsed = tree_sink::parse_html(markup);
        let Some(body) = parsed.find_by_tag("body") else {
            return;
        };
        for child in parsed.children(body).collect::<Vec<_>>() {
            let copy = self.import(&parsed, child);
            self.append(parent, copy);
        }
    }

    // ------------------------------------------------------------------
    // Linking
    // ------------------------------------------------------------------

    /// Append a child to a parent node, detaching it first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a child as the first child of `parent`.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        match self.first_child(parent) {
            Some(first) => self.insert_before(first, child),
            None => self.append(parent, child),
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        if sibling == new_node {
            return;
        }
        self.detach(new_node);

        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert a node right after a sibling.
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        match self.next_sibling(sibling) {
            Some(next) => self.insert_before(next, new_node),
            None => {
                if let Some(parent) = self.parent(sibling) {
                    self.append(parent, new_node);
                }
            }
        }
    }

    /// Unlink a node from its parent and siblings. Its own children stay.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Put `replacement` where `old` is and detach `old`.
    pub fn replace(&mut self, old: NodeId, replacement: NodeId) {
        self.insert_before(old, replacement);
        self.detach(old);
    }

    /// Replace an element by its children.
    pub fn unwrap(&mut self, id: NodeId) {
        for child in self.children(id).collect::<Vec<_>>() {
            self.insert_before(id, child);
        }
        self.detach(id);
    }

    /// Move every child of `from` to the end of `to`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.children(from).collect::<Vec<_>>() {
            self.append(to, child);
        }
    }

    /// Detach all children of a node.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).collect::<Vec<_>>() {
            self.detach(child);
        }
    }

    /// Replace the children of `id` by a single text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.clear_children(id);
        let text = text.into();
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append(id, node);
        }
    }

    /// Append text to the last child if it is a text node, or create one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    /// Join runs of adjacent text children of `id` into single nodes.
    pub fn merge_adjacent_text(&mut self, id: NodeId) {
        let children: Vec<_> = self.children(id).collect();
        let mut current: Option<NodeId> = None;
        for child in children {
            let Some(text) = self.text(child).map(str::to_string) else {
                current = None;
                continue;
            };
            match current {
                Some(target) => {
                    if let Some(existing) = self.text_mut(target) {
                        existing.push_str(&text);
                    }
                    self.detach(child);
                }
                None => current = Some(child),
            }
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.option())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.option())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling.option())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling.option())
    }

    /// Next sibling that is an element, skipping text and comments.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        ChildrenIter {
            tree: self,
            current: first,
        }
    }

    /// Element children of a node, in order.
    pub fn element_children(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent)
            .filter(|&child| self.is_element(child))
            .collect()
    }

    /// All nodes below `scope` in document (pre-)order, excluding `scope`.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Elements below `scope` with the given local name, in document order.
    pub fn elements_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| self.is_tag(id, tag))
            .collect()
    }

    /// Whether `id` sits somewhere below `ancestor`.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Whether the node is still reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.is_descendant_of(id, self.root)
    }

    /// Find the first element below `scope` matching a predicate (DFS).
    pub fn find_element<F>(&self, scope: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Self, NodeId) -> bool,
    {
        self.descendants(scope)
            .into_iter()
            .find(|&id| self.is_element(id) && predicate(self, id))
    }

    /// Find element by tag name anywhere in the document (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find_element(self.document, |t, id| t.is_tag(id, tag))
    }

    // ------------------------------------------------------------------
    // Node accessors
    // ------------------------------------------------------------------

    /// Get element's local name (tag).
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Whether the node is an element with the given local name.
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Mutable content of a text node.
    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        self.get_mut(id).and_then(|n| match &mut n.data {
            NodeData::Text(s) => Some(s),
            _ => None,
        })
    }

    /// Concatenated text of every text node at or below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.text(d))
            .collect()
    }

    /// Rendered text of `id`: like [`text_content`](Self::text_content), but
    /// `<br>` becomes a newline and block children sit on their own lines.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.push_inner_text(id, &mut out);
        out
    }

    fn push_inner_text(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            if let Some(text) = self.text(child) {
                out.push_str(text);
            } else if self.is_tag(child, "br") {
                out.push('\n');
            } else if BLOCK_TAGS.iter().any(|tag| self.is_tag(child, tag)) {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                self.push_inner_text(child, out);
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            } else {
                self.push_inner_text(child, out);
            }
        }
    }

    /// Text nodes at or below `id`, in document order.
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        if self.is_text(id) {
            return vec![id];
        }
        self.descendants(id)
            .into_iter()
            .filter(|&d| self.is_text(d))
            .collect()
    }

    /// Attributes of an element.
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { attrs, .. } => Some(attrs.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name.local.as_ref() == attr_name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, id: NodeId, attr_name: &str) -> bool {
        self.get_attr(id, attr_name).is_some()
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, id: NodeId, attr_name: &str, value: &str) {
        if let Some(Node {
            data: NodeData::Element { attrs, .. },
            ..
        }) = self.get_mut(id)
        {
            match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
                Some(existing) => existing.value = value.to_string(),
                None => attrs.push(Attribute::plain(attr_name, value)),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, attr_name: &str) {
        if let Some(Node {
            data: NodeData::Element { attrs, .. },
            ..
        }) = self.get_mut(id)
        {
            attrs.retain(|a| a.name.local.as_ref() != attr_name);
        }
    }

    /// Class tokens of an element.
    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.get_attr(id, "class")
            .into_iter()
            .flat_map(str::split_whitespace)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    /// Add a class token unless present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let value = match self.get_attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &value);
    }

    /// Remove a class token; an emptied `class` attribute is dropped.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let remaining: Vec<String> = self
            .classes(id)
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        if remaining.is_empty() {
            self.remove_attr(id, "class");
        } else {
            self.set_attr(id, "class", &remaining.join(" "));
        }
    }

    /// Parsed inline `style` attribute.
    pub fn style(&self, id: NodeId) -> DeclarationBlock {
        self.get_attr(id, "style")
            .map(DeclarationBlock::parse_inline)
            .unwrap_or_default()
    }

    /// Write back an inline style; an empty block removes the attribute.
    pub fn set_style(&mut self, id: NodeId, style: &DeclarationBlock) {
        if style.is_empty() {
            self.remove_attr(id, "style");
        } else {
            self.set_attr(id, "style", &style.to_css_text());
        }
    }

    /// Edit the inline style of an element in place.
    pub fn update_style<F>(&mut self, id: NodeId, edit: F)
    where
        F: FnOnce(&mut DeclarationBlock),
    {
        if !self.is_element(id) {
            return;
        }
        let mut style = self.style(id);
        edit(&mut style);
        self.set_style(id, &style);
    }

    /// Set one inline style property.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        self.update_style(id, |style| style.set(property, value));
    }

    // ------------------------------------------------------------------
    // Comparison and output
    // ------------------------------------------------------------------

    /// Compare the live documents of two trees: tags, attributes (in any
    /// order), text and child order.
    pub fn structurally_eq(&self, other: &ContentTree) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }

    fn subtree_eq(&self, a: NodeId, other: &ContentTree, b: NodeId) -> bool {
        let (Some(left), Some(right)) = (self.get(a), other.get(b)) else {
            return false;
        };
        let same_node = match (&left.data, &right.data) {
            (NodeData::Document, NodeData::Document) => true,
            (NodeData::Text(x), NodeData::Text(y)) | (NodeData::Comment(x), NodeData::Comment(y)) => {
                x == y
            }
            (
                NodeData::Element { name: n1, attrs: a1 },
                NodeData::Element { name: n2, attrs: a2 },
            ) => n1 == n2 && a1.len() == a2.len() && a1.iter().all(|attr| a2.contains(attr)),
            (NodeData::Doctype { name: x, .. }, NodeData::Doctype { name: y, .. }) => x == y,
            _ => false,
        };
        if !same_node {
            return false;
        }
        let left_children: Vec<_> = self.children(a).collect();
        let right_children: Vec<_> = other.children(b).collect();
        left_children.len() == right_children.len()
            && left_children
                .iter()
                .zip(&right_children)
                .all(|(&x, &y)| self.subtree_eq(x, other, y))
    }

    /// Serialize the root element, like `outerHTML`.
    pub fn to_html(&self) -> String {
        self.outer_html(self.root)
    }

    /// Serialize a node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize::write_node(self, id, &mut out);
        out
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            serialize::write_node(self, child, &mut out);
        }
        out
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    tree: &'a ContentTree,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .tree
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finds_existing_root() {
        let tree = ContentTree::parse(
            r#"<html><body><nav>x</nav><section id="wenyan" class="preview"><p>Hi</p></section></body></html>"#,
        );
        assert!(tree.is_tag(tree.root(), "section"));
        assert_eq!(tree.get_attr(tree.root(), "class"), Some("preview"));
        assert_eq!(tree.text_content(tree.root()), "Hi");
        assert!(tree.elements_by_tag(tree.root(), "nav").is_empty());
    }

    #[test]
    fn test_parse_wraps_fragment() {
        let tree = ContentTree::parse("<h1>Title</h1><p>Body</p>");
        assert_eq!(tree.get_attr(tree.root(), "id"), Some(ROOT_ID));
        let children = tree.element_children(tree.root());
        assert_eq!(children.len(), 2);
        assert!(tree.is_tag(children[0], "h1"));
        assert!(tree.is_tag(children[1], "p"));
    }

    #[test]
    fn test_append_and_insert() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let a = tree.create_element("p", &[]);
        let b = tree.create_element("p", &[]);
        let c = tree.create_element("p", &[]);
        tree.append(root, b);
        tree.prepend(root, a);
        tree.insert_after(b, c);

        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.next_sibling(b), Some(c));
    }

    #[test]
    fn test_detach_relinks_siblings() {
        let mut tree = ContentTree::parse("<p>a</p><p>b</p><p>c</p>");
        let ps = tree.elements_by_tag(tree.root(), "p");
        tree.detach(ps[1]);

        assert_eq!(tree.element_children(tree.root()), vec![ps[0], ps[2]]);
        assert_eq!(tree.next_sibling(ps[0]), Some(ps[2]));
        assert!(!tree.is_attached(ps[1]));
    }

    #[test]
    fn test_unwrap_keeps_children_in_place() {
        let mut tree = ContentTree::parse("<p>a<span>b<em>c</em></span>d</p>");
        let span = tree.elements_by_tag(tree.root(), "span")[0];
        tree.unwrap(span);
        assert_eq!(tree.to_html(), r#"<section id="wenyan" class="preview"><p>ab<em>c</em>d</p></section>"#);
    }

    #[test]
    fn test_class_helpers() {
        let mut tree = ContentTree::parse(r#"<a href="x" class="ext">x</a>"#);
        let a = tree.elements_by_tag(tree.root(), "a")[0];
        tree.add_class(a, "footnote-link");
        assert_eq!(tree.get_attr(a, "class"), Some("ext footnote-link"));
        tree.remove_class(a, "footnote-link");
        assert_eq!(tree.get_attr(a, "class"), Some("ext"));
        tree.remove_class(a, "ext");
        assert!(!tree.has_attr(a, "class"));
    }

    #[test]
    fn test_style_round_trip() {
        let mut tree = ContentTree::parse(r#"<p style="color: red">x</p>"#);
        let p = tree.elements_by_tag(tree.root(), "p")[0];
        tree.set_style_property(p, "font-size", "14px");
        tree.set_style_property(p, "color", "blue");
        assert_eq!(tree.get_attr(p, "style"), Some("color: blue; font-size: 14px;"));
    }

    #[test]
    fn test_inner_text_breaks_lines() {
        let tree = ContentTree::parse("<p>one<br>two <em>three</em></p><div><p>a</p>b</div>");
        let p = tree.elements_by_tag(tree.root(), "p")[0];
        assert_eq!(tree.inner_text(p), "one\ntwo three");
        let div = tree.elements_by_tag(tree.root(), "div")[0];
        assert_eq!(tree.inner_text(div), "a\nb");
        assert_eq!(tree.text_content(p), "onetwo three");
    }

    #[test]
    fn test_merge_adjacent_text() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let a = tree.create_text("foo");
        let b = tree.create_text("bar");
        tree.append(root, a);
        tree.append(root, b);
        tree.merge_adjacent_text(root);
        assert_eq!(tree.children(root).count(), 1);
        assert_eq!(tree.text(a), Some("foobar"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = ContentTree::parse("<p>one</p>");
        let mut copy = original.clone();
        let p = copy.elements_by_tag(copy.root(), "p")[0];
        copy.set_text(p, "two");
        assert_eq!(original.text_content(original.root()), "one");
        assert!(!original.structurally_eq(&copy));
    }

    #[test]
    fn test_append_html_parses_svg() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        tree.append_html(root, r#"<svg viewBox="0 0 10 10"><path d="M0 0"></path></svg>"#);
        let svg = tree.elements_by_tag(root, "svg")[0];
        assert_eq!(tree.element_namespace(svg), Some(&ns!(svg)));
        assert_eq!(tree.elements_by_tag(svg, "path").len(), 1);
    }
}
