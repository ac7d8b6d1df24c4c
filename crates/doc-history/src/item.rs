//! Log entries held by a [`Branch`](crate::branch::Branch).

use doc_transform::mapping::StepMap;
use doc_transform::step::Step;
use serde_json::Value;

/// One entry in a branch's log.
///
/// A `StepItem` (has `step`) records a change that can be undone; a
/// `MapItem` (no `step`) only records the position shift of a change this
/// branch isn't tracking (a remote edit, or an edit below history depth).
#[derive(Debug, Clone)]
pub struct Item {
	pub map: StepMap,
	pub step: Option<Step>,
	pub selection: Option<Value>,
	/// Distance back to the item whose map this one mirrors (cancels under
	/// composition). Only ever set on items produced during `pop_event` with
	/// `preserve_items` on.
	pub mirror_offset: Option<usize>,
}

impl Item {
	pub fn step_item(map: StepMap, step: Step, selection: Option<Value>) -> Self {
		Self { map, step: Some(step), selection, mirror_offset: None }
	}

	pub fn map_item(map: StepMap) -> Self {
		Self { map, step: None, selection: None, mirror_offset: None }
	}

	pub fn with_mirror_offset(mut self, offset: usize) -> Self {
		self.mirror_offset = Some(offset);
		self
	}

	pub fn is_step_item(&self) -> bool {
		self.step.is_some()
	}

	pub fn is_map_item(&self) -> bool {
		self.step.is_none()
	}

	pub fn is_event_boundary(&self) -> bool {
		self.step.is_some() && self.selection.is_some()
	}

	/// Combines this item with an immediately following one belonging to the
	/// same open event.
	///
	/// Only defined when both items carry a step and `other` carries no
	/// selection of its own (meaning it continues, rather than starts, an
	/// event). Returns `None` when the underlying steps don't merge, in
	/// which case the caller should append `other` as its own item.
	pub fn merge(&self, other: &Item) -> Option<Item> {
		let (self_step, other_step) = (self.step.as_ref()?, other.step.as_ref()?);
		if other.selection.is_some() {
			return None;
		}
		// `self_step`/`other_step` are already the *inverted* steps this item
		// stores, so the merged item's map is the merged step's own induced
		// map (consistent with `Step::invert`/`Step::get_map` being mutual
		// inverses: `step.invert(doc).get_map() == step.get_map().invert()`).
		let merged_step = self_step.merge(other_step)?;
		Some(Item {
			map: merged_step.get_map(),
			step: Some(merged_step),
			selection: self.selection.clone(),
			mirror_offset: None,
		})
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn step_map(from: usize, to: usize, new_to: usize) -> StepMap {
		StepMap::new(from, to, new_to)
	}

	#[test]
	fn merge_combines_adjacent_inserts() {
		let a = Item::step_item(step_map(5, 5, 6), Step::new(5, 5, "a"), Some(Value::Bool(true)));
		let b = Item::step_item(step_map(6, 6, 7), Step::new(6, 6, "b"), None);
		let merged = a.merge(&b).expect("adjacent inserts merge");
		assert!(merged.is_step_item());
		assert_eq!(merged.selection, Some(Value::Bool(true)));
	}

	#[test]
	fn merge_rejects_when_other_has_selection() {
		let a = Item::step_item(step_map(5, 5, 6), Step::new(5, 5, "a"), None);
		let b = Item::step_item(step_map(6, 6, 7), Step::new(6, 6, "b"), Some(Value::Bool(true)));
		assert!(a.merge(&b).is_none());
	}

	#[test]
	fn merge_rejects_map_items() {
		let a = Item::map_item(step_map(0, 0, 1));
		let b = Item::step_item(step_map(6, 6, 7), Step::new(6, 6, "b"), None);
		assert!(a.merge(&b).is_none());
	}
}
