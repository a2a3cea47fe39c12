//! Hook Store - Positional state cells for function components.
//!
//! Every function component fiber owns an ordered list of hook slots.
//! The list is rebuilt on every render: the n-th `use_state` call reads
//! the n-th slot of the previous render (the alternate fiber) and pushes a
//! fresh slot onto the current fiber.
//!
//! # Pattern: Identity by Call Order
//!
//! ```text
//! render #1:  use_state(0) -> slot 0    use_state("") -> slot 1
//! render #2:  use_state(0) -> slot 0    use_state("") -> slot 1
//! ```
//!
//! Nothing but the call position ties a slot to a `use_state` call, so a
//! component must call its hooks in the same order on every render.
//! Violations that can be detected (a slot changing type, the number of
//! hooks changing) abort the render with a [`ReconcileError`].
//!
//! # Pattern: Pending Updates
//!
//! A setter never mutates state directly. It appends a reducer to its
//! slot's queue and requests a re-render from the root. The next render
//! folds the queue (FIFO) over the slot's baseline state. The queue of a
//! committed slot is read, never drained, so a render that gets abandoned
//! and restarted folds the same updates again.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::ReconcileError;

// =============================================================================
// Render Requests
// =============================================================================

/// Shared flag raised by setters to ask the session for a root re-render.
#[derive(Clone, Default)]
pub(crate) struct RenderRequest(Rc<Cell<bool>>);

impl RenderRequest {
    pub(crate) fn raise(&self) {
        self.0.set(true);
    }

    pub(crate) fn is_raised(&self) -> bool {
        self.0.get()
    }

    /// Lower the flag, returning whether it was raised.
    pub(crate) fn take(&self) -> bool {
        self.0.replace(false)
    }
}

// =============================================================================
// Slots
// =============================================================================

type Reducer<T> = Box<dyn Fn(&T) -> T>;

struct UpdateQueue<T> {
    pending: RefCell<Vec<Reducer<T>>>,
}

impl<T> Default for UpdateQueue<T> {
    fn default() -> Self {
        Self {
            pending: RefCell::new(Vec::new()),
        }
    }
}

/// One state cell: baseline state plus the updates queued against it.
#[derive(Clone)]
pub(crate) struct HookSlot {
    state: Rc<dyn Any>,
    queue: Rc<dyn Any>,
}

impl HookSlot {
    fn state<T: 'static>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }

    fn queue<T: 'static>(&self) -> Option<&UpdateQueue<T>> {
        self.queue.downcast_ref::<UpdateQueue<T>>()
    }

    #[cfg(test)]
    pub(crate) fn pending_len<T: 'static>(&self) -> usize {
        self.queue::<T>().map_or(0, |q| q.pending.borrow().len())
    }
}

impl fmt::Debug for HookSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HookSlot")
    }
}

// =============================================================================
// Setter
// =============================================================================

/// Setter returned by [`Hooks::use_state`].
///
/// Cheap to clone; safe to move into listeners.
pub struct SetState<T> {
    queue: Rc<UpdateQueue<T>>,
    request: RenderRequest,
}

impl<T: 'static> SetState<T> {
    /// Queue a replacement value.
    pub fn set(&self, value: T)
    where
        T: Clone,
    {
        self.update(move |_| value.clone());
    }

    /// Queue an update function applied to the latest state.
    ///
    /// Queued updates are applied in the order they were queued.
    pub fn update(&self, reducer: impl Fn(&T) -> T + 'static) {
        self.queue.pending.borrow_mut().push(Box::new(reducer));
        self.request.raise();
    }
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            request: self.request.clone(),
        }
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("pending", &self.queue.pending.borrow().len())
            .finish()
    }
}

// =============================================================================
// Hooks Context
// =============================================================================

/// Hook context handed to a function component while it renders.
///
/// Only the reconciler creates one, so hooks cannot be called outside a
/// component invocation.
pub struct Hooks<'a> {
    component: &'static str,
    previous: Option<&'a [HookSlot]>,
    current: Vec<HookSlot>,
    cursor: usize,
    request: &'a RenderRequest,
    violation: Option<ReconcileError>,
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(
        component: &'static str,
        previous: Option<&'a [HookSlot]>,
        request: &'a RenderRequest,
    ) -> Self {
        Self {
            component,
            previous,
            current: Vec::with_capacity(previous.map_or(0, <[HookSlot]>::len)),
            cursor: 0,
            request,
            violation: None,
        }
    }

    /// Declare a state cell.
    ///
    /// Returns the current value (the previous render's state with all
    /// queued updates folded in, or `initial` on first render) and a setter.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, SetState<T>) {
        let index = self.cursor;
        self.cursor += 1;

        let old = self.previous.and_then(|slots| slots.get(index));
        let mut state = match old {
            Some(slot) => match slot.state::<T>() {
                Some(state) => state.clone(),
                None => {
                    self.record(ReconcileError::HookTypeMismatch {
                        component: self.component,
                        index,
                    });
                    initial
                }
            },
            None => initial,
        };

        if let Some(queue) = old.and_then(HookSlot::queue::<T>) {
            for reducer in queue.pending.borrow().iter() {
                state = reducer(&state);
            }
        }

        let queue = Rc::new(UpdateQueue::<T>::default());
        self.current.push(HookSlot {
            state: Rc::new(state.clone()),
            queue: queue.clone(),
        });

        let setter = SetState {
            queue,
            request: self.request.clone(),
        };
        (state, setter)
    }

    /// Number of hooks called so far in this render.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    fn record(&mut self, error: ReconcileError) {
        if self.violation.is_none() {
            self.violation = Some(error);
        }
    }

    /// Close the render, yielding the rebuilt slot list.
    pub(crate) fn finish(mut self) -> Result<Vec<HookSlot>, ReconcileError> {
        if let Some(previous) = self.previous {
            if previous.len() != self.cursor {
                self.record(ReconcileError::HookCountMismatch {
                    component: self.component,
                    previous: previous.len(),
                    current: self.cursor,
                });
            }
        }
        match self.violation {
            Some(error) => Err(error),
            None => Ok(self.current),
        }
    }
}
