//! Fiber Tree - Arena of units of work.
//!
//! Fibers are NOT linked by references. They live in a generational arena
//! and point at each other through [`FiberId`] keys:
//!
//! ```text
//!            root
//!             │ child
//!             ▼
//!            div ──sibling──▶ (none)
//!             │ child
//!             ▼
//!             p ──sibling──▶ b
//! ```
//!
//! parent/child/sibling/alternate are plain keys, so there are no ownership
//! cycles and a key into a released tree simply fails to resolve.

mod arena;

pub use arena::*;

use std::rc::Rc;

use crate::hooks::HookSlot;
use crate::node::{Node, Props, Tag};

slotmap::new_key_type! {
    /// Generational handle to a fiber in a [`FiberArena`].
    pub struct FiberId;
}

/// Pending mutation recorded during reconciliation, consumed by commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EffectTag {
    #[default]
    None,
    Update,
    Placement,
    Deletion,
}

/// What a fiber stands for.
#[derive(Clone, Debug, PartialEq)]
pub enum FiberType {
    /// The container fiber created by `render`; owns the caller's handle.
    Root,
    /// A fiber mirroring one node.
    Node(Tag),
}

impl FiberType {
    pub fn tag(&self) -> Option<&Tag> {
        match self {
            FiberType::Root => None,
            FiberType::Node(tag) => Some(tag),
        }
    }

    /// Whether this fiber matches `tag` for reuse during the diff.
    pub fn matches(&self, tag: &Tag) -> bool {
        self.tag() == Some(tag)
    }
}

/// One unit of work.
#[derive(Debug)]
pub struct Fiber<H> {
    pub ty: FiberType,
    pub props: Rc<Props>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    /// Corresponding fiber of the last committed tree.
    pub alternate: Option<FiberId>,
    /// Render-target handle; never set on component fibers.
    pub handle: Option<H>,
    pub effect: EffectTag,
    pub(crate) hooks: Vec<HookSlot>,
}

impl<H> Fiber<H> {
    pub(crate) fn root(props: Rc<Props>, handle: H, alternate: Option<FiberId>) -> Self {
        Self {
            ty: FiberType::Root,
            props,
            parent: None,
            child: None,
            sibling: None,
            alternate,
            handle: Some(handle),
            effect: EffectTag::None,
            hooks: Vec::new(),
        }
    }

    pub(crate) fn from_node(node: &Node, parent: FiberId) -> Self {
        Self {
            ty: FiberType::Node(node.tag().clone()),
            props: node.props().clone(),
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            handle: None,
            effect: EffectTag::None,
            hooks: Vec::new(),
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(&self.ty, FiberType::Node(tag) if tag.is_component())
    }

    /// Number of hook slots recorded by the last render of this fiber.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}
