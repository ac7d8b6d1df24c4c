//! One direction's undo log.
//!
//! A [`Branch`] is an append-only sequence of [`Item`]s plus a running
//! `event_count`. `HistoryState` holds two of these — `done` and `undone` —
//! and every transition produces a new `Branch` rather than mutating the old
//! one, the same append-only discipline an editor's undo manager applies one
//! level up at the undo-group granularity.

use doc_transform::mapping::Mapping;
use doc_transform::selection::Selection;
use doc_transform::transform::Transform;
use serde_json::Value;
use tracing::{debug, trace, trace_span};

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::item::Item;
use crate::rope_seq::ItemSeq;

/// Events beyond `depth` are tolerated up to this much slack before the
/// oldest ones are evicted, so a single edit past the cap doesn't trigger a
/// full prefix slice on every subsequent keystroke.
const COALESCE_THRESHOLD: usize = 20;

/// Once a branch accumulates this many map-only items (beyond what a fresh
/// rebase tail needs), `rebased` compresses it.
const REBASE_COMPRESS_THRESHOLD: usize = 500;

/// One direction's log: a persistent sequence of items plus the count of
/// selection-bearing (event-boundary) items within it.
#[derive(Debug, Clone)]
pub struct Branch {
	pub items: ItemSeq<Item>,
	pub event_count: usize,
}

/// The result of popping the most recent event off a [`Branch`].
pub struct PopResult {
	/// The branch with that event removed.
	pub remaining: Branch,
	/// The inverse transform reconstructed for that event, seeded from the
	/// document passed to [`Branch::pop_event`].
	pub transform: Transform,
	/// The selection marker to restore, already remapped to `transform`'s
	/// final document.
	pub selection: Option<Value>,
}

impl Branch {
	pub fn empty() -> Self {
		Self { items: ItemSeq::empty(), event_count: 0 }
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Records a transform's steps as new (inverted) items.
	///
	/// The first new item carries `selection` iff it is `Some`; later items
	/// in the same call never do. When `config.preserve_items` is false the
	/// first new item is offered to the branch's current last item for
	/// merging (continuing an open event rather than opening a new log
	/// entry). Once the branch's `event_count` overflows `config.depth` by
	/// more than [`COALESCE_THRESHOLD`], the oldest whole events are
	/// dropped.
	pub fn add_transform(&self, transform: &Transform, selection: Option<Value>, config: &HistoryConfig) -> Branch {
		let span = trace_span!(target: "doc_history", "branch.add_transform", steps = transform.steps.len());
		let _guard = span.enter();

		let mut new_items: Vec<Item> = Vec::with_capacity(transform.steps.len());
		for (i, step) in transform.steps.iter().enumerate() {
			let doc_before = transform.docs.get(i).unwrap_or(&transform.doc);
			let inverted = step.invert(doc_before);
			let map = inverted.get_map();
			let item_selection = if i == 0 { selection.clone() } else { None };
			new_items.push(Item::step_item(map, inverted, item_selection));
		}

		let mut items = self.items.clone();
		if !config.preserve_items {
			if let (Some(last), Some(first_new)) = (items.last(), new_items.first()) {
				if let Some(merged) = last.merge(first_new) {
					items = items.with_last_replaced(merged);
					new_items.remove(0);
				}
			}
		}
		let appended = new_items.len();
		items = items.append_all(new_items);

		let mut event_count = self.event_count;
		if selection.is_some() {
			event_count += 1;
		}
		trace!(target: "doc_history", appended, event_count, "branch.add_transform.appended");

		if event_count > config.depth && event_count - config.depth > COALESCE_THRESHOLD {
			let overflow = event_count - config.depth;
			let all = items.to_vec();
			let mut seen_events = 0usize;
			let mut cut = all.len();
			for (idx, item) in all.iter().enumerate() {
				if item.selection.is_some() {
					seen_events += 1;
					if seen_events == overflow {
						cut = idx + 1;
						break;
					}
				}
			}
			debug!(target: "doc_history", overflow, cut, "branch.add_transform.evicted");
			items = items.slice(cut, items.len());
			event_count -= overflow;
		}

		Branch { items, event_count }
	}

	/// Appends one `MapItem` per map, recording a position-only change this
	/// branch isn't tracking. A no-op on an empty branch: there are no held
	/// inverted steps that would need these maps.
	pub fn add_maps(&self, maps: &[doc_transform::mapping::StepMap]) -> Branch {
		if self.items.is_empty() {
			return self.clone();
		}
		let items = self.items.append_all(maps.iter().copied().map(Item::map_item));
		Branch { items, event_count: self.event_count }
	}

	/// Builds a [`Mapping`] over items `[from, to)`, registering mirror
	/// pairs for any item in the window whose `mirror_offset` also lands
	/// inside it.
	pub fn remapping(&self, from: usize, to: usize) -> Mapping {
		let items = self.items.to_vec();
		let to = to.min(items.len());
		let mut mapping = Mapping::new();
		for i in from..to {
			let item = &items[i];
			let mirror = item
				.mirror_offset
				.and_then(|offset| i.checked_sub(offset))
				.filter(|&m| m >= from && m < to)
				.map(|m| m - from);
			mapping.append_map(item.map, mirror);
		}
		mapping
	}

	/// Count of items lacking a step (pure position markers).
	pub fn empty_item_count(&self) -> usize {
		self.items.to_vec().iter().filter(|item| item.is_map_item()).count()
	}

	/// Reconstructs the inverse of the most recently closed event.
	///
	/// Walks the event's items from newest to oldest — the selection marker
	/// lives on the oldest item in the event, so reaching it ends the walk;
	/// the remaining branch reassembles as
	/// `items[0..event_start) + reverse(preserved items) + new outgoing maps`,
	/// both held in chronological order (matching the branch-wide invariant
	/// that maps appear in the order their changes happened).
	///
	/// A step's stored inverse applies directly to the running `transform`
	/// until something forces a real remapping: `preserve_items`, or a
	/// MapItem inside the window. Once that happens, an item already applied
	/// directly gets marked as its own mirror so an earlier sibling's tail
	/// doesn't remap through an effect that's already baked into the
	/// document — without that, a tracked event with two or more
	/// non-merging steps would have one of them silently dropped.
	pub fn pop_event(&self, doc: &doc_transform::rope::Rope, preserve_items: bool) -> Option<PopResult> {
		let span = trace_span!(target: "doc_history", "branch.pop_event", event_count = self.event_count);
		let _guard = span.enter();

		if self.event_count == 0 {
			trace!(target: "doc_history", "branch.pop_event.empty");
			return None;
		}

		let items = self.items.to_vec();
		let length = items.len();
		let event_start = (0..length).rev().find(|&i| items[i].selection.is_some())?;

		let mut transform = Transform::new(doc.clone());
		let mut add_before: Vec<Item> = Vec::new();
		let mut add_after: Vec<Item> = Vec::new();
		let mut selection_out: Option<Value> = None;
		let mut steps_seen = 0usize;
		let mut steps_applied = 0usize;

		// Stays `None` until `preserve_items` forces it on up front or the
		// walk hits the first `MapItem`. While `None`, a step's stored
		// inverse is already valid against the running `transform` as-is:
		// nothing encountered so far needs remapping through a position
		// shift the direct application doesn't already reflect.
		let mut remap: Option<Mapping> = if preserve_items { Some(self.remapping(event_start, length)) } else { None };
		// rel-indices of StepItems already applied directly while `remap`
		// was still `None`, so they can be marked cancelled retroactively if
		// `remap` ends up built partway through the walk.
		let mut applied_directly: Vec<usize> = Vec::new();
		// (add_after index, add_before index) pairs awaiting a persisted
		// `mirror_offset`, resolved once both vectors reach their final
		// (pre-reversal) length.
		let mut pending_mirrors: Vec<(usize, usize)> = Vec::new();

		for i in (event_start..length).rev() {
			let item = &items[i];
			let rel = i - event_start;

			if let Some(step) = &item.step {
				steps_seen += 1;
				let mapped = match &remap {
					Some(map) => step.map(&map.slice(rel + 1, map.len())),
					None => Some(step.clone()),
				};
				let applied = mapped.as_ref().is_some_and(|mapped| transform.maybe_step(mapped));
				if applied {
					steps_applied += 1;
					let outgoing = *transform.mapping.maps.last().expect("maybe_step just pushed a map");
					if preserve_items {
						let b_index = add_before.len();
						add_before.push(Item::map_item(item.map));
						let a_index = add_after.len();
						add_after.push(Item::map_item(outgoing));
						pending_mirrors.push((a_index, b_index));
					} else {
						add_after.push(Item::map_item(outgoing));
					}
					match &mut remap {
						Some(map) => map.mirrors.push((rel, rel)),
						None => applied_directly.push(rel),
					}
				} else if preserve_items {
					add_before.push(Item::map_item(item.map));
				}
			} else {
				if remap.is_none() {
					let mut built = self.remapping(event_start, length);
					for &r in &applied_directly {
						built.mirrors.push((r, r));
					}
					remap = Some(built);
				}
				if preserve_items {
					add_before.push(item.clone());
				}
			}

			if let Some(sel_json) = &item.selection {
				selection_out = Some(match Selection::from_json(sel_json) {
					Ok(sel) => sel.map(&transform.mapping).to_json(),
					Err(_) => sel_json.clone(),
				});
				break;
			}
		}

		debug!(target: "doc_history", steps_seen, steps_applied, "branch.pop_event.reconstructed");
		if steps_applied < steps_seen {
			debug!(target: "doc_history", dropped = steps_seen - steps_applied, "branch.pop_event.partial");
		}

		let a_total = add_after.len();
		for (a, b) in pending_mirrors {
			let offset = a_total - a + b;
			add_after[a] = add_after[a].clone().with_mirror_offset(offset);
		}

		add_before.reverse();
		add_after.reverse();
		let mut remaining_items = items[..event_start].to_vec();
		remaining_items.extend(add_before);
		remaining_items.extend(add_after);

		Some(PopResult {
			remaining: Branch { items: ItemSeq::from_vec(remaining_items), event_count: self.event_count - 1 },
			transform,
			selection: selection_out,
		})
	}

	/// Reconciles this branch with a rebase: the trailing `rebased_count`
	/// local items are replaced by whatever `rebased_transform` recorded in
	/// their place (remote steps prefixed, local steps reapplied on top).
	pub fn rebased(&self, rebased_transform: &Transform, rebased_count: usize, config: &HistoryConfig) -> Result<Branch, HistoryError> {
		let span = trace_span!(target: "doc_history", "branch.rebased", rebased_count);
		let _guard = span.enter();

		if self.items.is_empty() {
			trace!(target: "doc_history", "branch.rebased.empty");
			return Ok(self.clone());
		}

		let items = self.items.to_vec();
		let total = items.len();
		if rebased_count > total {
			return Err(HistoryError::InconsistentRebase { rebased_count, branch_len: total });
		}

		let kept_len = total - rebased_count;
		let kept = &items[..kept_len];
		let window = &items[kept_len..];

		let mut rebuilt: Vec<Item> = Vec::new();
		let mut min_mirror = rebased_transform.mapping.len();

		for (offset, item) in window.iter().enumerate() {
			let Some(mirror) = rebased_transform.mapping.get_mirror(offset) else {
				continue;
			};
			min_mirror = min_mirror.min(mirror);
			let Some(&rebased_map) = rebased_transform.mapping.maps.get(mirror) else {
				continue;
			};

			if item.step.is_some() {
				if let Some(rebased_step) = rebased_transform.steps.get(mirror) {
					let doc_before = rebased_transform.docs.get(mirror).unwrap_or(&rebased_transform.doc);
					let inverted = rebased_step.invert(doc_before);
					let selection = item.selection.as_ref().map(|json| {
						match Selection::from_json(json) {
							Ok(sel) => sel.map(&rebased_transform.mapping.slice(0, mirror)).to_json(),
							Err(_) => json.clone(),
						}
					});
					rebuilt.push(Item::step_item(rebased_map, inverted, selection));
				} else {
					rebuilt.push(Item::map_item(rebased_map));
				}
			} else {
				rebuilt.push(Item::map_item(rebased_map));
			}
		}

		let new_until = min_mirror.min(rebased_transform.mapping.len());
		let mut prefix: Vec<Item> = Vec::new();
		for i in rebased_count..new_until {
			if let Some(&map) = rebased_transform.mapping.maps.get(i) {
				prefix.push(Item::map_item(map));
			}
		}

		let mut new_items: Vec<Item> = kept.to_vec();
		new_items.extend(prefix);
		new_items.extend(rebuilt);
		let event_count = new_items.iter().filter(|item| item.selection.is_some()).count();
		let mut branch = Branch { items: ItemSeq::from_vec(new_items), event_count };

		debug!(target: "doc_history", items = branch.items.len(), event_count, "branch.rebased.rebuilt");

		if branch.empty_item_count() > REBASE_COMPRESS_THRESHOLD {
			let tail_len = branch.items.len().saturating_sub(rebased_count);
			branch = branch.compress(tail_len);
		}

		Ok(branch)
	}

	/// Squeezes out map-only items in `[0, upto)` that no surviving step
	/// still needs, while keeping every item from `upto` onward verbatim.
	pub fn compress(&self, upto: usize) -> Branch {
		let span = trace_span!(target: "doc_history", "branch.compress", upto);
		let _guard = span.enter();
		let before = self.items.len();

		let items = self.items.to_vec();
		let upto = upto.min(items.len());
		let mut remapping = Mapping::new();
		let mut emitted: Vec<Item> = Vec::new();

		for (idx, item) in items[..upto].iter().enumerate() {
			if let Some(step) = &item.step {
				if let Some(mapped_step) = step.map(&remapping) {
					let candidate = Item::step_item(mapped_step.get_map(), mapped_step, item.selection.clone());
					let merged = emitted.last().and_then(|last| last.merge(&candidate));
					if let Some(merged) = merged {
						let last = emitted.len() - 1;
						emitted[last] = merged;
					} else {
						emitted.push(candidate);
					}
				}
			}
			let mirror = item.mirror_offset.and_then(|offset| idx.checked_sub(offset));
			remapping.append_map(item.map, mirror);
		}

		let mut result_items = emitted;
		result_items.extend_from_slice(&items[upto..]);
		let event_count = result_items.iter().filter(|item| item.selection.is_some()).count();
		let after = result_items.len();
		debug!(target: "doc_history", before, after, "branch.compress.done");

		Branch { items: ItemSeq::from_vec(result_items), event_count }
	}
}
