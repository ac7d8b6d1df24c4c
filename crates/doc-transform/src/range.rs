//! Char-indexed positions and rounding bias.

/// A char offset into a document.
pub type CharIdx = usize;

/// Which side of a replaced range a position should round to when the
/// position falls inside deleted text.
///
/// `Left` rounds to the start of the replacement, `Right` rounds to the end.
/// Mirrors the bias argument threaded through `map_pos` on
/// [`StepMap`](crate::StepMap) and [`Mapping`](crate::Mapping).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bias {
	Left,
	Right,
}
