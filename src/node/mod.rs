//! Node Model - Declarative UI descriptions.
//!
//! - [`Node`] / [`Tag`] / [`Props`] - Immutable element descriptions
//! - [`Value`] / [`Listener`] / [`Event`] - Property values and callbacks
//! - [`create_element`] / [`create_text_element`] - Factories

mod element;
mod value;

pub use element::*;
pub use value::*;
