//! The two host-facing seams that can actually fail.
//!
//! Everything else in this crate degrades rather than errors: `pop_event`
//! on an empty branch returns `None`, a stored step that no longer maps
//! cleanly is dropped from the reconstructed transform, `rebased`/`add_maps`
//! on an empty branch hand the branch back unchanged. Wrapping those in
//! `Result` would misrepresent ordinary control flow as exceptional.

use doc_transform::selection::SelectionDecodeError;

/// Failures from the handful of operations that can't just degrade.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
	/// A selection marker produced by `pop_event`/`rebased` failed to decode.
	/// Should not happen with a conforming `Selection` implementation, but
	/// the contract makes no such guarantee.
	#[error("selection marker failed to decode: {0}")]
	SelectionDecode(#[from] SelectionDecodeError),

	/// `rebased` was called with a `rebased_count` larger than the branch
	/// can support: there is no well-defined prefix left to keep.
	#[error("rebased_count {rebased_count} exceeds branch length {branch_len}")]
	InconsistentRebase { rebased_count: usize, branch_len: usize },
}
