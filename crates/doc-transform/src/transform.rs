//! Accumulates a sequence of steps applied to a document.

use crate::rope::Rope;
use crate::step::Step;
use crate::mapping::Mapping;

/// A document plus the steps that produced it from some starting point.
///
/// `docs` holds every intermediate document state (one entry per step,
/// excluding the final `doc`), mirroring how an editor's transform engine
/// keeps enough history to invert any step it recorded.
#[derive(Debug, Clone)]
pub struct Transform {
	pub doc: Rope,
	pub docs: Vec<Rope>,
	pub steps: Vec<Step>,
	pub mapping: Mapping,
}

impl Transform {
	pub fn new(doc: Rope) -> Self {
		Self { doc, docs: Vec::new(), steps: Vec::new(), mapping: Mapping::new() }
	}

	/// Applies `step`, recording it and its induced map.
	pub fn step(&mut self, step: Step) {
		self.docs.push(self.doc.clone());
		self.doc = step.apply(&self.doc);
		self.mapping.append_map(step.get_map(), None);
		self.steps.push(step);
	}

	/// The document before this transform's first step.
	pub fn before(&self) -> &Rope {
		self.docs.first().unwrap_or(&self.doc)
	}

	/// Applies `step` if its range still falls within the current document,
	/// returning whether it applied.
	///
	/// Mirrors the contract's `maybeStep(step) → {doc?}`: a step recorded
	/// against a document that has since changed out from under it (through
	/// an unrelated deletion, say) is simply skipped rather than panicking.
	pub fn maybe_step(&mut self, step: &Step) -> bool {
		if step.to > self.doc.len_chars() {
			return false;
		}
		self.step(step.clone());
		true
	}
}
