//! MemoryTarget - Headless render target backed by an in-memory tree.
//!
//! Every operation is applied to a node arena and appended to a mutation
//! log, which makes the target useful both for headless hosts and for
//! asserting exactly what a commit did.
//!
//! ```ignore
//! let mut target = MemoryTarget::new();
//! let root = target.create_container();
//! let mut session = RenderSession::new(target);
//! session.render(app, root);
//! session.flush()?;
//! assert_eq!(session.target().to_markup(root), "<div id=\"foo\"><p>bar</p><b></b></div>");
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use super::adapter::{HostKind, MutationKinds, RenderTarget};
use crate::node::{Event, Listener, Value};

// =============================================================================
// Types
// =============================================================================

/// Index of a node in a [`MemoryTarget`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

/// Kind of an in-memory node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryKind {
    /// Host-owned mount point, created with [`MemoryTarget::create_container`].
    Container,
    Element(Rc<str>),
    Text,
}

/// One recorded target operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    Create { handle: NodeHandle, kind: MemoryKind },
    SetProperty { handle: NodeHandle, name: String, value: Value },
    ClearProperty { handle: NodeHandle, name: String },
    AddListener { handle: NodeHandle, event: String },
    RemoveListener { handle: NodeHandle, event: String },
    AppendChild { parent: NodeHandle, child: NodeHandle },
    RemoveChild { parent: NodeHandle, child: NodeHandle },
}

impl Mutation {
    pub fn kind(&self) -> MutationKinds {
        match self {
            Mutation::Create { .. } => MutationKinds::CREATE,
            Mutation::SetProperty { .. } => MutationKinds::SET,
            Mutation::ClearProperty { .. } => MutationKinds::CLEAR,
            Mutation::AddListener { .. } => MutationKinds::LISTEN,
            Mutation::RemoveListener { .. } => MutationKinds::UNLISTEN,
            Mutation::AppendChild { .. } => MutationKinds::APPEND,
            Mutation::RemoveChild { .. } => MutationKinds::REMOVE,
        }
    }
}

#[derive(Debug)]
struct MemoryNode {
    kind: MemoryKind,
    properties: BTreeMap<String, Value>,
    listeners: Vec<(String, Listener)>,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

impl MemoryNode {
    fn new(kind: MemoryKind) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
            listeners: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

// =============================================================================
// MemoryTarget
// =============================================================================

/// In-memory render target with a mutation log.
///
/// Nodes are never freed. A removed subtree stays allocated and
/// queryable, which keeps every handle in the log valid, as do handles
/// created by renders that were abandoned before commit. Memory therefore
/// grows with the number of nodes ever created; a long-running host should
/// recreate the target (or use its own) rather than keep one forever.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    nodes: Vec<MemoryNode>,
    log: Vec<Mutation>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a mount point to pass to `render`. Not logged.
    pub fn create_container(&mut self) -> NodeHandle {
        self.alloc(MemoryKind::Container)
    }

    fn alloc(&mut self, kind: MemoryKind) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(MemoryNode::new(kind));
        handle
    }

    /// Nodes ever allocated, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, handle: NodeHandle) -> Option<&MemoryNode> {
        self.nodes.get(handle.0)
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut MemoryNode> {
        self.nodes.get_mut(handle.0)
    }

    // -------------------------------------------------------------------------
    // Log
    // -------------------------------------------------------------------------

    /// Every operation since creation or the last clear.
    pub fn log(&self) -> &[Mutation] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Union of the kinds of all logged operations.
    pub fn logged_kinds(&self) -> MutationKinds {
        self.log
            .iter()
            .fold(MutationKinds::empty(), |acc, m| acc | m.kind())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn kind(&self, handle: NodeHandle) -> Option<&MemoryKind> {
        self.node(handle).map(|n| &n.kind)
    }

    pub fn children_of(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.node(handle)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn parent_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.node(handle).and_then(|n| n.parent)
    }

    pub fn property(&self, handle: NodeHandle, name: &str) -> Option<&Value> {
        self.node(handle).and_then(|n| n.properties.get(name))
    }

    pub fn listener_count(&self, handle: NodeHandle, event: &str) -> usize {
        self.node(handle)
            .map_or(0, |n| n.listeners.iter().filter(|(e, _)| e == event).count())
    }

    /// First element with tag `tag` below `root`, depth-first.
    pub fn find_element(&self, root: NodeHandle, tag: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let node = self.node(handle)?;
            if matches!(&node.kind, MemoryKind::Element(t) if &**t == tag) {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Concatenated text of every text node below `handle`.
    pub fn text_content(&self, handle: NodeHandle) -> String {
        let mut out = String::new();
        self.collect_text(handle, &mut out);
        out
    }

    fn collect_text(&self, handle: NodeHandle, out: &mut String) {
        let Some(node) = self.node(handle) else { return };
        if node.kind == MemoryKind::Text {
            if let Some(value) = node.properties.get(crate::node::NODE_VALUE) {
                out.push_str(&value.to_string());
            }
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Serialize the subtree as markup. Containers render only their children;
    /// listeners are omitted.
    pub fn to_markup(&self, handle: NodeHandle) -> String {
        let mut out = String::new();
        self.write_markup(handle, &mut out);
        out
    }

    fn write_markup(&self, handle: NodeHandle, out: &mut String) {
        let Some(node) = self.node(handle) else { return };
        match &node.kind {
            MemoryKind::Text => {
                if let Some(value) = node.properties.get(crate::node::NODE_VALUE) {
                    out.push_str(&value.to_string());
                }
            }
            MemoryKind::Container => {
                for &child in &node.children {
                    self.write_markup(child, out);
                }
            }
            MemoryKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &node.properties {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&value.to_string());
                    out.push('"');
                }
                out.push('>');
                for &child in &node.children {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Invoke every listener on `handle` registered for `event.name`.
    ///
    /// Returns how many listeners ran. Listeners are snapshotted first, so
    /// they may freely trigger state updates.
    pub fn dispatch(&self, handle: NodeHandle, event: &Event) -> usize {
        let listeners: Vec<Listener> = self
            .node(handle)
            .map(|n| {
                n.listeners
                    .iter()
                    .filter(|(e, _)| **e == *event.name)
                    .map(|(_, l)| l.clone())
                    .collect()
            })
            .unwrap_or_default();
        for listener in &listeners {
            listener.call(event);
        }
        listeners.len()
    }

    fn detach(&mut self, child: NodeHandle) {
        let Some(parent) = self.node(child).and_then(|n| n.parent) else { return };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }
}

impl RenderTarget for MemoryTarget {
    type Handle = NodeHandle;

    fn create_handle(&mut self, kind: HostKind<'_>) -> NodeHandle {
        let kind = match kind {
            HostKind::Element(tag) => MemoryKind::Element(tag.into()),
            HostKind::Text => MemoryKind::Text,
        };
        let handle = self.alloc(kind.clone());
        self.log.push(Mutation::Create { handle, kind });
        handle
    }

    fn set_property(&mut self, handle: &NodeHandle, name: &str, value: &Value) {
        if let Some(node) = self.node_mut(*handle) {
            node.properties.insert(name.to_string(), value.clone());
        }
        self.log.push(Mutation::SetProperty {
            handle: *handle,
            name: name.to_string(),
            value: value.clone(),
        });
    }

    fn clear_property(&mut self, handle: &NodeHandle, name: &str) {
        if let Some(node) = self.node_mut(*handle) {
            node.properties.remove(name);
        }
        self.log.push(Mutation::ClearProperty {
            handle: *handle,
            name: name.to_string(),
        });
    }

    fn add_listener(&mut self, handle: &NodeHandle, event: &str, listener: &Listener) {
        if let Some(node) = self.node_mut(*handle) {
            node.listeners.push((event.to_string(), listener.clone()));
        }
        self.log.push(Mutation::AddListener {
            handle: *handle,
            event: event.to_string(),
        });
    }

    fn remove_listener(&mut self, handle: &NodeHandle, event: &str, listener: &Listener) {
        if let Some(node) = self.node_mut(*handle) {
            if let Some(pos) = node
                .listeners
                .iter()
                .position(|(e, l)| e == event && l == listener)
            {
                node.listeners.remove(pos);
            }
        }
        self.log.push(Mutation::RemoveListener {
            handle: *handle,
            event: event.to_string(),
        });
    }

    fn append_child(&mut self, parent: &NodeHandle, child: &NodeHandle) {
        self.detach(*child);
        if let Some(node) = self.node_mut(*parent) {
            node.children.push(*child);
        }
        if let Some(node) = self.node_mut(*child) {
            node.parent = Some(*parent);
        }
        self.log.push(Mutation::AppendChild {
            parent: *parent,
            child: *child,
        });
    }

    fn remove_child(&mut self, parent: &NodeHandle, child: &NodeHandle) {
        if self.parent_of(*child) == Some(*parent) {
            self.detach(*child);
        } else {
            tracing::warn!(?parent, ?child, "remove_child: node is not a child of parent");
        }
        self.log.push(Mutation::RemoveChild {
            parent: *parent,
            child: *child,
        });
    }
}
