//! Render phase - Units of work and the child diff.
//!
//! The walk is a loop over a cursor, not recursion, so it can stop after
//! any unit and resume later:
//!
//! ```text
//! perform(fiber):
//!     component → call render fn with hooks, diff its single child
//!     element   → create handle if missing, diff props.children
//! next:
//!     child, else first sibling found walking up from fiber, else done
//! ```

use tracing::{trace, warn};

use super::session::RenderSession;
use crate::error::Result;
use crate::fiber::{EffectTag, Fiber, FiberId, FiberType};
use crate::hooks::Hooks;
use crate::node::{Component, Node, Tag};
use crate::target::{HostKind, RenderTarget};

impl<T: RenderTarget> RenderSession<T> {
    /// Process one fiber and return the next one to visit.
    pub(super) fn perform_unit_of_work(&mut self, id: FiberId) -> Result<Option<FiberId>> {
        let Some(fiber) = self.arena.get(id) else {
            warn!(?id, "unit of work refers to a released fiber");
            return Ok(None);
        };
        trace!(?id, ty = ?fiber.ty, "unit of work");

        match fiber.ty.clone() {
            FiberType::Node(Tag::Component(component)) => {
                self.update_function_component(id, &component)?;
            }
            _ => self.update_host_component(id),
        }

        Ok(self.next_fiber(id))
    }

    fn update_function_component(&mut self, id: FiberId, component: &Component) -> Result<()> {
        let Some(fiber) = self.arena.get(id) else { return Ok(()) };
        let props = fiber.props.clone();
        let previous = fiber
            .alternate
            .and_then(|alt| self.arena.get(alt))
            .map(|alt| alt.hooks.clone());

        let mut hooks = Hooks::new(component.name(), previous.as_deref(), &self.request);
        let child = component.render(&props, &mut hooks);
        let slots = hooks.finish()?;

        if let Some(fiber) = self.arena.get_mut(id) {
            fiber.hooks = slots;
        }
        self.reconcile_children(id, std::slice::from_ref(&child));
        Ok(())
    }

    fn update_host_component(&mut self, id: FiberId) {
        let Some(fiber) = self.arena.get(id) else { return };
        let props = fiber.props.clone();

        if fiber.handle.is_none() {
            let handle = match &fiber.ty {
                FiberType::Node(Tag::Element(name)) => {
                    Some(self.target.create_handle(HostKind::Element(name)))
                }
                FiberType::Node(Tag::Text) => Some(self.target.create_handle(HostKind::Text)),
                _ => None,
            };
            if let Some(fiber) = self.arena.get_mut(id) {
                fiber.handle = handle;
            }
        }

        self.reconcile_children(id, props.children());
    }

    /// Depth-first successor: child, else the nearest sibling walking up.
    fn next_fiber(&self, id: FiberId) -> Option<FiberId> {
        let fiber = self.arena.get(id)?;
        if fiber.child.is_some() {
            return fiber.child;
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let fiber = self.arena.get(current)?;
            if fiber.sibling.is_some() {
                return fiber.sibling;
            }
            cursor = fiber.parent;
        }
        None
    }

    /// Positional diff of `elements` against the alternate's children.
    ///
    /// Old and new are matched by index only:
    /// - same tag: new fiber reuses the old handle, tagged `Update`
    /// - new node, no match: fresh fiber, tagged `Placement`
    /// - old fiber, no match: old fiber tagged `Deletion` and queued
    pub(super) fn reconcile_children(&mut self, wip: FiberId, elements: &[Node]) {
        let mut old = self
            .arena
            .get(wip)
            .and_then(|f| f.alternate)
            .and_then(|alt| self.arena.get(alt))
            .and_then(|alt| alt.child);
        let mut prev: Option<FiberId> = None;
        let mut index = 0;

        while index < elements.len() || old.is_some() {
            let element = elements.get(index);
            let old_fiber = old.and_then(|o| self.arena.get(o).map(|f| (o, f)));

            let same_type = match (old_fiber, element) {
                (Some((_, f)), Some(el)) => f.ty.matches(el.tag()),
                _ => false,
            };

            let mut new_fiber = None;
            match (old_fiber, element) {
                (Some((old_id, f)), Some(el)) if same_type => {
                    let mut fiber = Fiber::from_node(el, wip);
                    fiber.handle = f.handle.clone();
                    fiber.alternate = Some(old_id);
                    fiber.effect = EffectTag::Update;
                    new_fiber = Some(fiber);
                }
                _ => {
                    if let Some(el) = element {
                        let mut fiber = Fiber::from_node(el, wip);
                        fiber.effect = EffectTag::Placement;
                        new_fiber = Some(fiber);
                    }
                }
            }

            let next_old = old_fiber.and_then(|(_, f)| f.sibling);

            if !same_type {
                if let Some((old_id, _)) = old_fiber {
                    if let Some(f) = self.arena.get_mut(old_id) {
                        f.effect = EffectTag::Deletion;
                    }
                    self.deletions.push(old_id);
                }
            }

            if let Some(fiber) = new_fiber {
                let new_id = self.arena.insert(fiber);
                let link = match prev {
                    None => self.arena.get_mut(wip).map(|f| &mut f.child),
                    Some(prev_id) => self.arena.get_mut(prev_id).map(|f| &mut f.sibling),
                };
                if let Some(link) = link {
                    *link = Some(new_id);
                }
                prev = Some(new_id);
            }

            old = next_old;
            index += 1;
        }
    }
}
