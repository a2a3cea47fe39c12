//! Node Model - Immutable descriptions of UI elements.
//!
//! A [`Node`] is a type tag plus a property bag. Children live in the
//! reserved `children` slot of [`Props`], so a node and its props travel
//! together and can be cloned cheaply (everything is behind `Rc`).
//!
//! ```text
//! create_element("div", Props::new().with("id", "foo"), [
//!     create_element("p", Props::new(), ["bar".into()]).into(),
//!     create_element("b", Props::new(), []).into(),
//! ])
//! ```

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::value::Value;
use crate::hooks::Hooks;

/// Name of the reserved property holding a node's children.
pub const CHILDREN: &str = "children";

/// Name of the single property carried by text nodes.
pub const NODE_VALUE: &str = "nodeValue";

// =============================================================================
// Component
// =============================================================================

/// Signature of a function component's render function.
pub type RenderFn = dyn Fn(&Props, &mut Hooks<'_>) -> Node;

/// Render function passed as a plain function pointer.
type RenderFnPtr = fn(&Props, &mut Hooks<'_>) -> Node;

/// What makes two components the same component to the diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Identity {
    Type(TypeId),
    Address(usize),
}

impl Identity {
    fn of<F: Any>(render: &F) -> Self {
        match (render as &dyn Any).downcast_ref::<RenderFnPtr>() {
            Some(&ptr) => Identity::Address(ptr as usize),
            None => Identity::Type(TypeId::of::<F>()),
        }
    }
}

/// A function component.
///
/// Identity is the Rust type of the render function, so building
/// `Component::new(counter)` again on every render still yields the same
/// component as far as the diff is concerned. Function pointers all share
/// one type, so for them the function address is used instead.
///
/// Closures returned by one generic factory also share a type: every
/// component built that way is the same component and positional diffing
/// will hand one's hook state to another. Give distinct components
/// distinct functions.
#[derive(Clone)]
pub struct Component {
    id: Identity,
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&Props, &mut Hooks<'_>) -> Node + 'static,
    {
        Self::named(short_type_name::<F>(), render)
    }

    /// Create a component with an explicit display name (used in errors and logs).
    pub fn named<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&Props, &mut Hooks<'_>) -> Node + 'static,
    {
        Self {
            id: Identity::of(&render),
            name,
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn render(&self, props: &Props, hooks: &mut Hooks<'_>) -> Node {
        (self.render)(props, hooks)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

fn short_type_name<F>() -> &'static str {
    let full = std::any::type_name::<F>();
    if full.contains("fn(") {
        return "fn";
    }
    full.rsplit("::")
        .find(|segment| !segment.starts_with('{'))
        .unwrap_or(full)
}

// =============================================================================
// Tag
// =============================================================================

/// What kind of element a node describes.
#[derive(Clone, Debug, PartialEq)]
pub enum Tag {
    /// A primitive element known to the render target (`"div"`).
    Element(Rc<str>),
    /// A text leaf; its content is the `nodeValue` property.
    Text,
    /// A function component.
    Component(Component),
}

impl Tag {
    pub fn is_component(&self) -> bool {
        matches!(self, Tag::Component(_))
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::Element(value.into())
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::Element(value.into())
    }
}

impl From<Component> for Tag {
    fn from(value: Component) -> Self {
        Tag::Component(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Property bag of a node.
///
/// Attributes are kept in name order so property diffs are deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    attrs: BTreeMap<String, Value>,
    children: Vec<Node>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert an attribute. The reserved `children` name is ignored;
    /// children are passed to [`create_element`] instead.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        if name == CHILDREN {
            tracing::warn!("ignoring attribute named `children`; pass children to create_element");
            return;
        }
        self.attrs.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Attributes in name order (children excluded).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }
}

// =============================================================================
// Node
// =============================================================================

/// Immutable description of one UI element.
#[derive(Clone, PartialEq)]
pub struct Node {
    tag: Tag,
    props: Rc<Props>,
}

impl Node {
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn props(&self) -> &Rc<Props> {
        &self.props
    }

    pub fn children(&self) -> &[Node] {
        self.props.children()
    }

    /// Text content, if this is a text node.
    pub fn text(&self) -> Option<&Value> {
        match self.tag {
            Tag::Text => self.props.get(NODE_VALUE),
            _ => None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Tag::Text => write!(f, "Text({:?})", self.text().unwrap_or(&Value::Null)),
            tag => f
                .debug_struct("Node")
                .field("tag", tag)
                .field("attrs", &self.props.attrs)
                .field("children", &self.props.children)
                .finish(),
        }
    }
}

// =============================================================================
// Child coercion
// =============================================================================

/// A child entry passed to [`create_element`].
///
/// Anything that is not already a [`Node`] becomes a text node.
#[derive(Clone, Debug)]
pub enum Child {
    Node(Node),
    Text(Value),
}

impl Child {
    fn into_node(self) -> Node {
        match self {
            Child::Node(node) => node,
            Child::Text(value) => create_text_element(value),
        }
    }
}

impl From<Node> for Child {
    fn from(value: Node) -> Self {
        Child::Node(value)
    }
}

macro_rules! text_child_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Text(value.into())
                }
            }
        )*
    };
}

text_child_from!(Value, &str, String, Rc<str>, bool, i32, u32, i64, f32, f64);

// =============================================================================
// Factories
// =============================================================================

/// Build a node from a tag, props and children.
pub fn create_element(
    tag: impl Into<Tag>,
    props: Props,
    children: impl IntoIterator<Item = Child>,
) -> Node {
    let children = children.into_iter().map(Child::into_node).collect();
    Node {
        tag: tag.into(),
        props: Rc::new(props.with_children(children)),
    }
}

/// Build a text leaf.
///
/// Strings, numbers and booleans keep their value; anything else is
/// coerced to its text form, with `Null` becoming empty text.
pub fn create_text_element(value: impl Into<Value>) -> Node {
    let value = match value.into() {
        Value::Null => Value::from(""),
        listener @ Value::Listener(_) => Value::from(listener.to_string()),
        value => value,
    };
    let mut props = Props::new();
    props.attrs.insert(NODE_VALUE.to_string(), value);
    Node {
        tag: Tag::Text,
        props: Rc::new(props),
    }
}
