//! Caption mutation engine.
//!
//! Every operation takes the current document by reference and returns a
//! new one, so earlier versions stay valid for undo. Validation failures
//! come back as [`EditError`] and the caller keeps its previous value.
//! References to tracks or cues that do not exist are logged and treated
//! as no-ops.

mod action;
mod history;
mod ops;
mod session;

pub use action::{EditAction, EditBatch, EditOutput, apply_batch};
pub use history::{DEFAULT_UNDO_LIMIT, History};
pub use ops::*;
pub use session::{CommitFilter, Editor, commit_batches};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Interval too short")]
    IntervalTooShort,
    #[error("Invalid target track")]
    InvalidTargetTrack,
    #[error("At least 1 track needs to be present")]
    LastTrack,
    #[error("No room to insert a caption here")]
    NoRoom,
    #[error("Invalid time: {0}")]
    InvalidTime(String),
}
