//! Errors surfaced by the reconciler.
//!
//! The core works on well-formed trees and has no runtime failure modes of
//! its own. What remains are precondition violations by component code,
//! which are reported instead of silently corrupting hook state.

use thiserror::Error;

/// A broken precondition detected while rendering a function component.
///
/// When one of these is returned, the in-flight work-in-progress tree has
/// already been discarded. The committed tree is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// A hook slot holds a different state type than the one requested.
    ///
    /// Hooks are identified purely by call position, so this means the
    /// component called its hooks in a different order than last render.
    #[error("hook #{index} in component `{component}` changed state type between renders; hooks must be called in the same order on every render")]
    HookTypeMismatch {
        component: &'static str,
        index: usize,
    },

    /// A component called a different number of hooks than last render.
    #[error("component `{component}` called {current} hooks but its previous render called {previous}")]
    HookCountMismatch {
        component: &'static str,
        previous: usize,
        current: usize,
    },
}

/// Result alias for reconciler operations.
pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_component() {
        let err = ReconcileError::HookCountMismatch {
            component: "Counter",
            previous: 2,
            current: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("Counter"));
        assert!(msg.contains("2"));

        let err = ReconcileError::HookTypeMismatch { component: "List", index: 3 };
        assert!(err.to_string().contains("#3"));
    }
}
