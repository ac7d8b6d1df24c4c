//! Document, step, and position-mapping contracts.
//!
//! This crate stands in for the document model, transform engine, and
//! selection layer that a real editor would own. The history subsystem in
//! `doc-history` depends only on the types defined here: a [`Rope`] backed
//! document, [`Step`]/[`StepMap`] edits, a composable [`Mapping`], a
//! [`Transform`] that accumulates steps against a document, and a JSON
//! serializable [`Selection`].

/// Char-indexed position range types shared by steps and mappings.
pub mod range;
/// Text storage, re-exported from `ropey`.
pub mod rope;
/// JSON-serializable anchor/head selections.
pub mod selection;
/// Single document edits and their position maps.
pub mod step;
/// Composable sequences of position maps.
pub mod mapping;
/// Accumulates steps applied to a document.
pub mod transform;

pub use mapping::{Mapping, StepMap};
pub use range::{Bias, CharIdx};
pub use rope::{Rope, RopeSlice};
pub use selection::Selection;
pub use step::Step;
pub use transform::Transform;
