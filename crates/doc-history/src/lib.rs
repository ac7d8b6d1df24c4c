//! Undo/redo history for a transform-based document editor.
//!
//! Built on top of the [`doc_transform`] contracts crate (a minimal, concrete
//! stand-in for a real editor's document/step/transform/selection layer),
//! this crate owns the history-specific pieces: [`Item`](item::Item) and
//! [`Branch`](branch::Branch) (the append-only undo log), [`HistoryState`]
//! (the `done`/`undone` pair an editor session carries), the
//! [`recorder`] that folds incoming transforms into a new state, and the
//! [`shifter`] that performs a single undo or redo.

pub mod branch;
pub mod config;
pub mod error;
pub mod history_state;
pub mod item;
pub mod recorder;
pub mod rope_seq;
pub mod shifter;

pub use config::HistoryConfig;
pub use error::HistoryError;
pub use history_state::HistoryState;
pub use item::Item;
pub use recorder::{close_history, record, HistoryAction};
pub use shifter::{redo, redo_depth, undo, undo_depth, Emitted, HistoryPlugin};
