//! Performs a single undo or redo against a [`HistoryState`].

use doc_transform::rope::Rope;
use doc_transform::transform::Transform;
use serde_json::Value;
use tracing::debug;

use crate::branch::Branch;
use crate::config::HistoryConfig;
use crate::history_state::HistoryState;
use crate::recorder::{self, HistoryAction};

/// The action a shifted undo/redo wants re-dispatched to the editor.
///
/// `sealed` tells other plugins they may not append further changes to this
/// transaction; `history_state` is meant to be installed verbatim by the
/// next call into [`recorder::record`] (via [`HistoryAction::history_state`]),
/// skipping the rest of its decision table.
pub struct Emitted {
	pub transform: Transform,
	pub selection: Option<Value>,
	pub history_state: HistoryState,
	pub scroll_into_view: bool,
	pub sealed: bool,
}

/// Pops an event from `source`, replaying it onto `doc`, and records the
/// inverse of that pop as a new event on `other` (so an undo always leaves
/// behind a matching redo entry, and vice versa).
fn shift(source: &Branch, other: &Branch, doc: &Rope, before_selection: &Value, config: &HistoryConfig) -> Option<(Transform, Option<Value>, Branch, Branch)> {
	let popped = source.pop_event(doc, config.preserve_items)?;
	let other_added = other.add_transform(&popped.transform, Some(before_selection.clone()), config);
	Some((popped.transform, popped.selection, popped.remaining, other_added))
}

/// Undoes the most recent event in `state.done`.
///
/// Returns `None` when there is nothing to undo, matching the contract's
/// `undo(...) -> bool` returning `false`.
pub fn undo(state: &HistoryState, doc: &Rope, before_selection: &Value, config: &HistoryConfig) -> Option<Emitted> {
	let Some((transform, selection, remaining_done, added_undone)) = shift(&state.done, &state.undone, doc, before_selection, config) else {
		debug!(target: "doc_history", "shifter.undo.nothing_to_undo");
		return None;
	};
	let history_state = HistoryState { done: remaining_done, undone: added_undone, prev_map: None, prev_time: 0 };
	Some(Emitted { transform, selection, history_state, scroll_into_view: true, sealed: true })
}

/// Redoes the most recent event in `state.undone`.
pub fn redo(state: &HistoryState, doc: &Rope, before_selection: &Value, config: &HistoryConfig) -> Option<Emitted> {
	let Some((transform, selection, remaining_undone, added_done)) = shift(&state.undone, &state.done, doc, before_selection, config) else {
		debug!(target: "doc_history", "shifter.redo.nothing_to_redo");
		return None;
	};
	let history_state = HistoryState { done: added_done, undone: remaining_undone, prev_map: None, prev_time: 0 };
	Some(Emitted { transform, selection, history_state, scroll_into_view: true, sealed: true })
}

pub fn undo_depth(state: &HistoryState) -> usize {
	state.done.event_count
}

pub fn redo_depth(state: &HistoryState) -> usize {
	state.undone.event_count
}

pub fn close_history(state: &HistoryState) -> HistoryState {
	recorder::close_history(state)
}

/// Owns a [`HistoryConfig`] and the current [`HistoryState`] across a host's
/// dispatch loop.
pub struct HistoryPlugin {
	pub config: HistoryConfig,
	state: HistoryState,
}

impl HistoryPlugin {
	pub fn new(config: HistoryConfig) -> Self {
		Self { config, state: HistoryState::fresh() }
	}

	pub fn state(&self) -> &HistoryState {
		&self.state
	}

	/// Folds a host-dispatched [`HistoryAction`] into the current state.
	///
	/// This is the recorder entry point (§4.E); it never itself produces an
	/// [`Emitted`] to re-dispatch. Undo/redo commands go through
	/// [`Self::undo`]/[`Self::redo`] instead, whose result a host installs by
	/// dispatching a follow-up action with `history_state` set to
	/// `Emitted::history_state` (handled here as the explicit-override row
	/// of the decision table).
	pub fn apply_transform(&mut self, action: &HistoryAction, before_selection: &Value) -> Option<Emitted> {
		self.state = recorder::record(&self.state, action, before_selection, &self.config);
		None
	}

	pub fn undo(&mut self, doc: &Rope, before_selection: &Value) -> Option<Emitted> {
		let emitted = undo(&self.state, doc, before_selection, &self.config)?;
		self.state = clone_state(&emitted.history_state);
		Some(emitted)
	}

	pub fn redo(&mut self, doc: &Rope, before_selection: &Value) -> Option<Emitted> {
		let emitted = redo(&self.state, doc, before_selection, &self.config)?;
		self.state = clone_state(&emitted.history_state);
		Some(emitted)
	}

	pub fn undo_depth(&self) -> usize {
		undo_depth(&self.state)
	}

	pub fn redo_depth(&self) -> usize {
		redo_depth(&self.state)
	}

	pub fn close_history(&mut self) {
		self.state = close_history(&self.state);
	}
}

fn clone_state(state: &HistoryState) -> HistoryState {
	HistoryState { done: state.done.clone(), undone: state.undone.clone(), prev_map: state.prev_map, prev_time: state.prev_time }
}

#[cfg(test)]
mod tests;
