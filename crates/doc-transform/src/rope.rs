//! Rope re-exports.
//!
//! Document content is stored as a [`ropey::Rope`]. The history subsystem
//! never mutates a rope in place; it only ever clones an existing one into a
//! snapshot or builds a new one from a [`Transform`](crate::Transform).

pub use ropey::{Rope, RopeSlice};
