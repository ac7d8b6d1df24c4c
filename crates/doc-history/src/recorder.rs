//! Folds an incoming transform into the next [`HistoryState`].

use doc_transform::mapping::StepMap;
use doc_transform::range::Bias;
use doc_transform::transform::Transform;
use serde_json::Value;
use tracing::{trace, trace_span};

use crate::branch::Branch;
use crate::config::HistoryConfig;
use crate::history_state::HistoryState;

/// A host-dispatched action carrying a transform and the flags the recorder
/// needs to route it.
pub struct HistoryAction<'a> {
	pub transform: &'a Transform,
	/// Caller-supplied timestamp; a host with no reliable clock passes `0`.
	pub time: u64,
	/// `None` and `Some(true)` both mean "track this transform normally";
	/// `Some(false)` means the tracked path is skipped.
	pub add_to_history: Option<bool>,
	/// Set by the collaboration layer when this action replaces the
	/// trailing `N` local items with a rebased sequence.
	pub rebased: Option<usize>,
	/// Lets a caller (the shifter) install a HistoryState it already
	/// computed, bypassing the rest of the decision table.
	pub history_state: Option<HistoryState>,
}

/// Produces the next [`HistoryState`] for an incoming [`HistoryAction`].
///
/// `selection_before` is the editor's selection immediately before
/// `action.transform` was applied; it is only consulted when the action
/// opens a new event.
pub fn record(state: &HistoryState, action: &HistoryAction, selection_before: &Value, config: &HistoryConfig) -> HistoryState {
	let span = trace_span!(target: "doc_history", "recorder.record", time = action.time);
	let _guard = span.enter();

	if let Some(installed) = &action.history_state {
		trace!(target: "doc_history", "recorder.record.installed");
		return installed.clone();
	}

	if action.transform.steps.is_empty() {
		trace!(target: "doc_history", "recorder.record.no_steps");
		return state.clone();
	}

	if action.add_to_history != Some(false) {
		return group_or_append(state, action, selection_before, config);
	}

	if let Some(rebased_count) = action.rebased {
		trace!(target: "doc_history", rebased_count, "recorder.record.rebased");
		let done = state.done.rebased(action.transform, rebased_count, config).unwrap_or_else(|_| state.done.clone());
		let undone = state.undone.rebased(action.transform, rebased_count, config).unwrap_or_else(|_| state.undone.clone());
		return HistoryState { done, undone, prev_map: state.prev_map, prev_time: state.prev_time };
	}

	trace!(target: "doc_history", "recorder.record.non_tracked");
	let maps = &action.transform.mapping.maps;
	HistoryState {
		done: state.done.add_maps(maps),
		undone: state.undone.add_maps(maps),
		prev_map: state.prev_map,
		prev_time: state.prev_time,
	}
}

fn group_or_append(state: &HistoryState, action: &HistoryAction, selection_before: &Value, config: &HistoryConfig) -> HistoryState {
	let timed_out = state.prev_time < action.time.saturating_sub(config.new_group_delay);
	let new_event = timed_out || !is_adjacent(action.transform, state.prev_map, &state.done);

	trace!(target: "doc_history", new_event, timed_out, "recorder.record.tracked");

	let selection = if new_event { Some(selection_before.clone()) } else { None };
	let done = state.done.add_transform(action.transform, selection, config);
	let prev_map = action.transform.mapping.maps.last().copied();

	HistoryState { done, undone: Branch::empty(), prev_map, prev_time: action.time }
}

/// Whether `transform`'s first step continues the event `prev_map` last
/// touched, given `done`'s trailing map-only items since then.
fn is_adjacent(transform: &Transform, prev_map: Option<StepMap>, done: &Branch) -> bool {
	let Some(first_map) = transform.mapping.maps.first() else {
		return true;
	};
	if first_map.is_identity() {
		return true;
	}
	let Some(prev_map) = prev_map else {
		return false;
	};

	let (mut from, mut to) = (first_map.from, first_map.old_to);
	for item in done.items.to_vec().iter().rev() {
		if !item.is_map_item() {
			break;
		}
		let inverted = item.map.invert();
		from = inverted.map_pos(from, Bias::Left);
		to = inverted.map_pos(to, Bias::Right);
	}

	ranges_overlap((from, to), (prev_map.from, prev_map.new_to))
}

/// Whether `a` and `b` share any position, touching endpoints included —
/// an insertion landing exactly where the previous one ended still counts
/// as continuing it.
fn ranges_overlap(a: (usize, usize), b: (usize, usize)) -> bool {
	a.0 <= b.1 && b.0 <= a.1
}

/// Resets grouping metadata so the next tracked edit always opens a new
/// event, without touching either branch.
pub fn close_history(state: &HistoryState) -> HistoryState {
	HistoryState { done: state.done.clone(), undone: state.undone.clone(), prev_map: None, prev_time: 0 }
}
