use doc_transform::rope::Rope;
use doc_transform::selection::Selection;
use doc_transform::step::Step;
use doc_transform::transform::Transform;
use pretty_assertions::assert_eq;

use super::*;
use crate::recorder::{record, HistoryAction};

fn typed_transform(doc: &Rope, at: usize, text: &str) -> Transform {
	let mut transform = Transform::new(doc.clone());
	transform.step(Step::new(at, at, text));
	transform
}

fn tracked(state: &HistoryState, doc: &Rope, at: usize, text: &str, time: u64, config: &HistoryConfig) -> (HistoryState, Rope) {
	let transform = typed_transform(doc, at, text);
	let next_doc = transform.doc.clone();
	let action = HistoryAction { transform: &transform, time, add_to_history: None, rebased: None, history_state: None };
	let next_state = record(state, &action, &Selection::point(at).to_json(), config);
	(next_state, next_doc)
}

#[test]
fn undo_on_empty_history_returns_none() {
	let state = HistoryState::fresh();
	let doc = Rope::from_str("hello");
	let config = HistoryConfig::default();
	assert!(undo(&state, &doc, &Selection::point(0).to_json(), &config).is_none());
}

#[test]
fn undo_then_redo_round_trips_document_and_depth() {
	let config = HistoryConfig::default();
	let doc = Rope::from_str("");
	let (state, doc) = tracked(&HistoryState::fresh(), &doc, 0, "a", 0, &config);
	let (state, doc) = tracked(&state, &doc, 1, "b", 100, &config);

	assert_eq!(undo_depth(&state), 1);

	let undone = undo(&state, &doc, &Selection::point(2).to_json(), &config).expect("an event to undo");
	assert_eq!(undone.transform.doc.to_string(), "");
	assert_eq!(undo_depth(&undone.history_state), 0);
	assert_eq!(redo_depth(&undone.history_state), 1);

	let redone = redo(&undone.history_state, &undone.transform.doc, &Selection::point(0).to_json(), &config).expect("an event to redo");
	assert_eq!(redone.transform.doc.to_string(), "ab");
	assert_eq!(undo_depth(&redone.history_state), 1);
	assert_eq!(redo_depth(&redone.history_state), 0);
}

#[test]
fn undo_leaves_a_matching_redo_entry() {
	let config = HistoryConfig::default();
	let doc = Rope::from_str("");
	let (state, doc) = tracked(&HistoryState::fresh(), &doc, 0, "hi", 0, &config);

	let emitted = undo(&state, &doc, &Selection::point(0).to_json(), &config).expect("an event to undo");
	assert_eq!(emitted.history_state.undone.event_count, 1);
	assert_eq!(emitted.history_state.prev_map, None);
	assert_eq!(emitted.history_state.prev_time, 0);
}

#[test]
fn history_plugin_tracks_depth_across_undo_redo() {
	let mut plugin = HistoryPlugin::new(HistoryConfig::default());
	let doc = Rope::from_str("");
	let transform = typed_transform(&doc, 0, "hi");
	let doc = transform.doc.clone();
	let action = HistoryAction { transform: &transform, time: 0, add_to_history: None, rebased: None, history_state: None };
	plugin.apply_transform(&action, &Selection::point(0).to_json());

	assert_eq!(plugin.undo_depth(), 1);
	let emitted = plugin.undo(&doc, &Selection::point(2).to_json()).expect("an event to undo");
	assert_eq!(emitted.transform.doc.to_string(), "");
	assert_eq!(plugin.undo_depth(), 0);
	assert_eq!(plugin.redo_depth(), 1);
}

#[test]
fn close_history_resets_grouping_metadata_without_touching_branches() {
	let config = HistoryConfig::default();
	let doc = Rope::from_str("");
	let (state, _doc) = tracked(&HistoryState::fresh(), &doc, 0, "a", 0, &config);

	let closed = close_history(&state);
	assert_eq!(closed.prev_map, None);
	assert_eq!(closed.prev_time, 0);
	assert_eq!(closed.done.event_count, state.done.event_count);
}
