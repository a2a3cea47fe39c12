//! Render-Target Adapter - The primitive operations commit needs.
//!
//! - [`RenderTarget`] - Trait implemented per host platform
//! - [`MutationKinds`] - Bitflags classifying target operations
//! - [`update_props`] - Property/listener diff applied to one handle
//! - [`MemoryTarget`] - Headless in-memory target with a mutation log

mod adapter;
mod memory;

pub use adapter::*;
pub use memory::*;
