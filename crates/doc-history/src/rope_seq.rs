//! A persistent, append-friendly sequence of items.
//!
//! Backs [`Branch`](crate::branch::Branch) so that snapshotting a
//! `HistoryState` never copies the whole log. Items are stored in immutable
//! chunks shared via [`Arc`]; appending or slicing reuses every chunk that
//! falls wholly outside the changed region instead of cloning element by
//! element, the same trade a rope makes for text.
//!
//! This is a chunked-vector rope rather than a fully self-balancing tree
//! (compare a tree-sitter-backed rope, or a B-tree rope engine): indexing
//! and slicing scan the chunk list, which is `O(chunk count)` rather than
//! `O(log n)` over individual items. That bound is not met (see DESIGN.md);
//! a branch's item count stays small in practice (bounded by `depth` plus a
//! small coalescing slack), which keeps the gap from mattering operationally,
//! but a caller relying on the `O(log n)` contract literally should not.

use std::sync::Arc;

const CHUNK_CAP: usize = 32;

/// A persistent sequence of `T`, structured as a list of immutable chunks.
#[derive(Debug, Clone)]
pub struct ItemSeq<T> {
	chunks: Arc<Vec<Arc<Vec<T>>>>,
	len: usize,
}

impl<T: Clone> ItemSeq<T> {
	pub fn empty() -> Self {
		Self { chunks: Arc::new(Vec::new()), len: 0 }
	}

	pub fn from_vec(items: Vec<T>) -> Self {
		if items.is_empty() {
			return Self::empty();
		}
		let len = items.len();
		let chunks = items
			.chunks(CHUNK_CAP)
			.map(|c| Arc::new(c.to_vec()))
			.collect();
		Self { chunks: Arc::new(chunks), len }
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Appends a single item, reusing every existing chunk but the last.
	pub fn append_one(&self, item: T) -> Self {
		let mut chunks = (*self.chunks).clone();
		match chunks.last() {
			Some(last) if last.len() < CHUNK_CAP => {
				let mut grown = (**last).clone();
				grown.push(item);
				*chunks.last_mut().unwrap() = Arc::new(grown);
			}
			_ => chunks.push(Arc::new(vec![item])),
		}
		Self { chunks: Arc::new(chunks), len: self.len + 1 }
	}

	/// Appends every item in `items`, in order.
	pub fn append_all(&self, items: impl IntoIterator<Item = T>) -> Self {
		let mut seq = self.clone();
		for item in items {
			seq = seq.append_one(item);
		}
		seq
	}

	pub fn last(&self) -> Option<&T> {
		if self.len == 0 { None } else { self.get(self.len - 1) }
	}

	/// Replaces the last item in place, reusing every chunk but the one it
	/// lives in. Used by `addTransform`'s merge-with-previous-item path.
	pub fn with_last_replaced(&self, item: T) -> Self {
		assert!(!self.is_empty(), "with_last_replaced on an empty sequence");
		let mut chunks = (*self.chunks).clone();
		let last_chunk = chunks.last().expect("non-empty seq has a last chunk");
		let mut grown = (**last_chunk).clone();
		*grown.last_mut().expect("chunk backing last() is non-empty") = item;
		*chunks.last_mut().unwrap() = Arc::new(grown);
		Self { chunks: Arc::new(chunks), len: self.len }
	}

	pub fn get(&self, index: usize) -> Option<&T> {
		if index >= self.len {
			return None;
		}
		let mut offset = index;
		for chunk in self.chunks.iter() {
			if offset < chunk.len() {
				return chunk.get(offset);
			}
			offset -= chunk.len();
		}
		None
	}

	/// A sub-sequence covering `[from, to)`, reusing whole chunks untouched.
	pub fn slice(&self, from: usize, to: usize) -> Self {
		assert!(from <= to && to <= self.len);
		if from == to {
			return Self::empty();
		}
		let mut chunks = Vec::new();
		let mut offset = 0usize;
		for chunk in self.chunks.iter() {
			let chunk_start = offset;
			let chunk_end = offset + chunk.len();
			offset = chunk_end;
			if chunk_end <= from || chunk_start >= to {
				continue;
			}
			if chunk_start >= from && chunk_end <= to {
				chunks.push(chunk.clone());
			} else {
				let local_from = from.saturating_sub(chunk_start).min(chunk.len());
				let local_to = to.saturating_sub(chunk_start).min(chunk.len());
				chunks.push(Arc::new(chunk[local_from..local_to].to_vec()));
			}
		}
		Self { chunks: Arc::new(chunks), len: to - from }
	}

	/// Concatenates two sequences.
	pub fn concat(&self, other: &Self) -> Self {
		if self.is_empty() {
			return other.clone();
		}
		if other.is_empty() {
			return self.clone();
		}
		let mut chunks = (*self.chunks).clone();
		chunks.extend(other.chunks.iter().cloned());
		Self { chunks: Arc::new(chunks), len: self.len + other.len }
	}

	/// Materializes the whole sequence. Algorithms that must inspect every
	/// item in a popped window (`pop_event`, `compress`, `rebased`) build on
	/// top of this rather than re-deriving chunk-aware traversal each time.
	pub fn to_vec(&self) -> Vec<T> {
		let mut out = Vec::with_capacity(self.len);
		for chunk in self.chunks.iter() {
			out.extend(chunk.iter().cloned());
		}
		out
	}

	/// Windowed iteration matching the contract's `forEach`: forward when
	/// `from <= to`, reverse when `from > to`. `f` returning `false` stops
	/// the walk early.
	pub fn for_each_windowed(&self, from: usize, to: usize, mut f: impl FnMut(&T, usize) -> bool) {
		if from <= to {
			for i in from..to.min(self.len) {
				let Some(item) = self.get(i) else { break };
				if !f(item, i) {
					return;
				}
			}
		} else {
			let start = from.min(self.len);
			let mut i = start;
			while i > to {
				i -= 1;
				let Some(item) = self.get(i) else { continue };
				if !f(item, i) {
					return;
				}
			}
		}
	}
}

impl<T: Clone> Default for ItemSeq<T> {
	fn default() -> Self {
		Self::empty()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn append_and_get_round_trip() {
		let mut seq = ItemSeq::empty();
		for i in 0..100 {
			seq = seq.append_one(i);
		}
		assert_eq!(seq.len(), 100);
		for i in 0..100 {
			assert_eq!(seq.get(i), Some(&i));
		}
	}

	#[test]
	fn slice_preserves_order() {
		let seq = ItemSeq::from_vec((0..50).collect());
		let sliced = seq.slice(10, 40);
		assert_eq!(sliced.len(), 30);
		assert_eq!(sliced.to_vec(), (10..40).collect::<Vec<_>>());
	}

	#[test]
	fn appending_does_not_mutate_earlier_snapshot() {
		let base = ItemSeq::from_vec(vec![1, 2, 3]);
		let extended = base.append_one(4);
		assert_eq!(base.to_vec(), vec![1, 2, 3]);
		assert_eq!(extended.to_vec(), vec![1, 2, 3, 4]);
	}

	#[test]
	fn concat_joins_sequences() {
		let a = ItemSeq::from_vec(vec![1, 2]);
		let b = ItemSeq::from_vec(vec![3, 4]);
		assert_eq!(a.concat(&b).to_vec(), vec![1, 2, 3, 4]);
	}

	#[test]
	fn for_each_windowed_forward_and_reverse() {
		let seq = ItemSeq::from_vec(vec![10, 20, 30, 40]);
		let mut forward = Vec::new();
		seq.for_each_windowed(0, 4, |v, _| {
			forward.push(*v);
			true
		});
		assert_eq!(forward, vec![10, 20, 30, 40]);

		let mut reverse = Vec::new();
		seq.for_each_windowed(4, 0, |v, _| {
			reverse.push(*v);
			true
		});
		assert_eq!(reverse, vec![40, 30, 20, 10]);
	}

	#[test]
	fn for_each_windowed_can_break_early() {
		let seq = ItemSeq::from_vec(vec![1, 2, 3, 4]);
		let mut seen = Vec::new();
		seq.for_each_windowed(0, 4, |v, _| {
			seen.push(*v);
			*v < 2
		});
		assert_eq!(seen, vec![1, 2]);
	}
}
