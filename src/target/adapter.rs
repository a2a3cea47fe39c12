//! Render target trait and the property diff that drives it.

use std::fmt::Debug;

use crate::node::{Listener, Props, Value};

// =============================================================================
// Host Kinds
// =============================================================================

/// What the target is asked to allocate. Component fibers never get a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind<'a> {
    Element(&'a str),
    Text,
}

// =============================================================================
// Render Target
// =============================================================================

/// Primitive mutations against a concrete render target.
///
/// Operations are infallible: an adapter that talks to fallible I/O is
/// expected to buffer or log its own failures, so a commit is never cut
/// short halfway through.
pub trait RenderTarget {
    /// Target-side node reference.
    type Handle: Clone + PartialEq + Debug;

    /// Allocate a detached node.
    fn create_handle(&mut self, kind: HostKind<'_>) -> Self::Handle;

    fn set_property(&mut self, handle: &Self::Handle, name: &str, value: &Value);

    fn clear_property(&mut self, handle: &Self::Handle, name: &str);

    fn add_listener(&mut self, handle: &Self::Handle, event: &str, listener: &Listener);

    fn remove_listener(&mut self, handle: &Self::Handle, event: &str, listener: &Listener);

    /// Insert `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Handle, child: &Self::Handle);

    fn remove_child(&mut self, parent: &Self::Handle, child: &Self::Handle);
}

// =============================================================================
// Mutation Kinds (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Classes of target operations, combinable with `|`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MutationKinds: u8 {
        const CREATE = 1 << 0;
        const SET = 1 << 1;
        const CLEAR = 1 << 2;
        const LISTEN = 1 << 3;
        const UNLISTEN = 1 << 4;
        const APPEND = 1 << 5;
        const REMOVE = 1 << 6;

        /// Operations that change tree shape.
        const STRUCTURAL = Self::APPEND.bits() | Self::REMOVE.bits();
        /// Operations that touch a single node's properties or listeners.
        const PROPERTY = Self::SET.bits() | Self::CLEAR.bits()
            | Self::LISTEN.bits() | Self::UNLISTEN.bits();
    }
}

// =============================================================================
// Property Diff
// =============================================================================

/// Whether `name` is a listener under `prefix`.
pub fn is_listener_name(name: &str, prefix: &str) -> bool {
    !prefix.is_empty() && name.len() > prefix.len() && name.starts_with(prefix)
}

/// Event name for a listener property: prefix stripped, lower-cased.
///
/// `onClick` → `click`
pub fn event_name(name: &str, prefix: &str) -> String {
    name.get(prefix.len()..).unwrap_or_default().to_lowercase()
}

/// Apply the delta between `prev` and `next` to `handle`.
///
/// Only names whose values differ are touched, in this order:
/// 1. remove listeners that are gone or changed
/// 2. clear plain properties that are gone
/// 3. set plain properties that are new or changed
/// 4. add listeners that are new or changed
///
/// A listener-named property whose value is not a [`Listener`] is ignored.
pub fn update_props<T: RenderTarget + ?Sized>(
    target: &mut T,
    handle: &T::Handle,
    prev: &Props,
    next: &Props,
    prefix: &str,
) {
    let changed = |name: &str, from: &Props, to: &Props| to.get(name) != from.get(name);

    for (name, value) in prev.iter().filter(|(n, _)| is_listener_name(n, prefix)) {
        if changed(name, prev, next) {
            if let Value::Listener(listener) = value {
                target.remove_listener(handle, &event_name(name, prefix), listener);
            }
        }
    }

    for (name, _) in prev.iter().filter(|(n, _)| !is_listener_name(n, prefix)) {
        if !next.contains(name) {
            target.clear_property(handle, name);
        }
    }

    for (name, value) in next.iter().filter(|(n, _)| !is_listener_name(n, prefix)) {
        if changed(name, prev, next) {
            target.set_property(handle, name, value);
        }
    }

    for (name, value) in next.iter().filter(|(n, _)| is_listener_name(n, prefix)) {
        if changed(name, prev, next) {
            if let Value::Listener(listener) = value {
                target.add_listener(handle, &event_name(name, prefix), listener);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{MemoryTarget, Mutation};

    #[test]
    fn test_listener_names() {
        assert!(is_listener_name("onClick", "on"));
        assert!(!is_listener_name("on", "on"));
        assert!(!is_listener_name("id", "on"));
        assert!(!is_listener_name("onClick", ""));
        assert_eq!(event_name("onClick", "on"), "click");
        assert_eq!(event_name("onMouseDown", "on"), "mousedown");
    }

    #[test]
    fn test_mutation_kind_groups() {
        assert!(MutationKinds::STRUCTURAL.contains(MutationKinds::APPEND));
        assert!(MutationKinds::PROPERTY.contains(MutationKinds::UNLISTEN));
        assert!(!MutationKinds::PROPERTY.intersects(MutationKinds::STRUCTURAL | MutationKinds::CREATE));
    }

    #[test]
    fn test_update_props_touches_only_deltas() {
        let mut target = MemoryTarget::new();
        let h = target.create_handle(HostKind::Element("div"));
        target.clear_log();

        let keep = Value::listener(|_| {});
        let old_click = Value::listener(|_| {});
        let new_click = Value::listener(|_| {});

        let prev = Props::new()
            .with("id", "a")
            .with("title", "same")
            .with("gone", 1)
            .with("onKeep", keep.clone())
            .with("onClick", old_click.clone())
            .with("onHover", Value::listener(|_| {}));
        let next = Props::new()
            .with("id", "b")
            .with("title", "same")
            .with("onKeep", keep)
            .with("onClick", new_click);

        update_props(&mut target, &h, &prev, &next, "on");

        assert_eq!(
            target.log(),
            &[
                Mutation::RemoveListener { handle: h, event: "click".into() },
                Mutation::RemoveListener { handle: h, event: "hover".into() },
                Mutation::ClearProperty { handle: h, name: "gone".into() },
                Mutation::SetProperty { handle: h, name: "id".into(), value: Value::from("b") },
                Mutation::AddListener { handle: h, event: "click".into() },
            ]
        );
    }

    #[test]
    fn test_update_props_identical_is_silent() {
        let mut target = MemoryTarget::new();
        let h = target.create_handle(HostKind::Text);
        target.clear_log();

        let props = Props::new().with("nodeValue", "x").with("onClick", Value::listener(|_| {}));
        update_props(&mut target, &h, &props, &props.clone(), "on");
        assert!(target.log().is_empty());
    }
}
