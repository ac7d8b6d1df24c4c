//! A minimal, JSON-marshalled selection.
//!
//! Real selection types (text selections, node selections, gap cursors) stay
//! outside this crate's scope; the history subsystem only ever stores and
//! remaps a selection's serialized form, the same way an editor's history
//! plugin never imports a concrete selection class.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mapping::Mapping;
use crate::range::{Bias, CharIdx};

/// An anchor/head pair, serializable to the JSON form the history subsystem
/// stores alongside undo items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
	pub anchor: CharIdx,
	pub head: CharIdx,
}

/// Failure decoding a selection from its stored JSON form.
#[derive(Debug, thiserror::Error)]
#[error("malformed selection json: {0}")]
pub struct SelectionDecodeError(String);

impl Selection {
	pub fn new(anchor: CharIdx, head: CharIdx) -> Self {
		Self { anchor, head }
	}

	pub fn point(pos: CharIdx) -> Self {
		Self::new(pos, pos)
	}

	/// Serializes this selection the way it is stored in an undo [`Item`](../../doc_history/item/struct.Item.html).
	pub fn to_json(&self) -> Value {
		serde_json::to_value(self).expect("Selection always serializes")
	}

	/// Decodes a selection previously produced by [`Self::to_json`].
	pub fn from_json(value: &Value) -> Result<Self, SelectionDecodeError> {
		serde_json::from_value(value.clone()).map_err(|err| SelectionDecodeError(err.to_string()))
	}

	/// Maps this selection's anchor and head through `mapping`.
	///
	/// The anchor rounds left and the head rounds right, matching how a
	/// text selection grows to cover inserted text typed at either end.
	pub fn map(&self, mapping: &Mapping) -> Self {
		Self {
			anchor: mapping.map_pos(self.anchor, Bias::Left),
			head: mapping.map_pos(self.head, Bias::Right),
		}
	}
}
