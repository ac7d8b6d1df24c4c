//! Single document edits.
//!
//! A [`Step`] replaces the char range `[from, to)` with `insert`. It is the
//! only edit shape this crate models; a real transform engine would have a
//! family of step types, but the history subsystem only ever needs to apply,
//! invert, and remap replace-range edits.

use crate::mapping::{Mapping, StepMap};
use crate::range::{Bias, CharIdx};
use crate::rope::Rope;

/// Replaces `[from, to)` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
	pub from: CharIdx,
	pub to: CharIdx,
	pub insert: String,
}

impl Step {
	pub fn new(from: CharIdx, to: CharIdx, insert: impl Into<String>) -> Self {
		debug_assert!(from <= to);
		Self { from, to, insert: insert.into() }
	}

	/// Applies this step to `doc`, returning the resulting document.
	pub fn apply(&self, doc: &Rope) -> Rope {
		let mut next = doc.clone();
		if self.to > self.from {
			next.remove(self.from..self.to);
		}
		if !self.insert.is_empty() {
			next.insert(self.from, &self.insert);
		}
		next
	}

	/// Builds the step that undoes this one, given the document it applies to.
	pub fn invert(&self, doc: &Rope) -> Step {
		let replaced = doc.slice(self.from..self.to).to_string();
		let inserted_len = self.insert.chars().count();
		Step {
			from: self.from,
			to: self.from + inserted_len,
			insert: replaced,
		}
	}

	/// The position map this step induces.
	pub fn get_map(&self) -> StepMap {
		let inserted_len = self.insert.chars().count();
		StepMap::new(self.from, self.to, self.from + inserted_len)
	}

	/// Remaps this step's range through `mapping`, producing an equivalent
	/// step against the document `mapping` maps into.
	///
	/// `from` rounds right and `to` rounds left: an insertion landing
	/// exactly at this step's start shifts the range forward rather than
	/// being swallowed by it, and an insertion landing exactly at its end
	/// is left outside the range rather than absorbed into it.
	///
	/// Returns `None` when the step's range has been fully consumed by later
	/// deletions and no longer identifies a meaningful edit.
	pub fn map(&self, mapping: &Mapping) -> Option<Step> {
		let from = mapping.map_pos(self.from, Bias::Right);
		let to = mapping.map_pos(self.to, Bias::Left).max(from);
		if to == from && self.to > self.from && self.insert.is_empty() {
			return None;
		}
		Some(Step { from, to, insert: self.insert.clone() })
	}

	/// Merges this step with an immediately following one, when the pair
	/// amounts to a single contiguous edit.
	///
	/// Two shapes are recognized: a pure insertion immediately followed by
	/// another pure insertion at the point the first one left off (typing
	/// another character), and two pure deletions where the second's range
	/// starts where the first's ends (the inverse of that same typing,
	/// which is what gets merged in practice since undo items store
	/// inverted steps). Anything else returns `None` rather than risk
	/// producing a step that doesn't round-trip through `invert`.
	pub fn merge(&self, other: &Step) -> Option<Step> {
		if self.to == self.from && other.to == other.from {
			let self_insert_end = self.from + self.insert.chars().count();
			if other.from == self_insert_end {
				let mut insert = self.insert.clone();
				insert.push_str(&other.insert);
				return Some(Step { from: self.from, to: self.to, insert });
			}
			return None;
		}
		if self.insert.is_empty() && other.insert.is_empty() && other.from == self.to {
			return Some(Step { from: self.from, to: other.to, insert: String::new() });
		}
		None
	}
}
