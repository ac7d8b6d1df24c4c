//! The undo/redo pair an editor session carries between dispatches.

use doc_transform::mapping::StepMap;

use crate::branch::Branch;

/// Two branches (`done`, `undone`) plus the grouping metadata the recorder
/// needs to decide whether the next tracked edit continues the open event.
///
/// Carries no logic of its own; [`crate::recorder`] and [`crate::shifter`]
/// are the only things that ever produce a new value.
#[derive(Debug, Clone)]
pub struct HistoryState {
	pub done: Branch,
	pub undone: Branch,
	/// The map of the most recent tracked transform committed to `done`, or
	/// `None`. Consulted by the adjacency rule to decide event grouping.
	pub prev_map: Option<StepMap>,
	/// The timestamp of the last tracked transform, or `0`.
	pub prev_time: u64,
}

impl HistoryState {
	pub fn fresh() -> Self {
		Self { done: Branch::empty(), undone: Branch::empty(), prev_map: None, prev_time: 0 }
	}
}

impl Default for HistoryState {
	fn default() -> Self {
		Self::fresh()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn fresh_state_has_empty_branches_and_no_grouping_metadata() {
		let state = HistoryState::fresh();
		assert!(state.done.is_empty());
		assert!(state.undone.is_empty());
		assert_eq!(state.prev_map, None);
		assert_eq!(state.prev_time, 0);
	}

	#[test]
	fn default_matches_fresh() {
		assert_eq!(HistoryState::default().prev_time, HistoryState::fresh().prev_time);
	}
}
