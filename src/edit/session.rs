use crate::model::CaptionDataContainer;

use super::{EditBatch, EditError, History, apply_batch};

/// Decides whether an applied batch becomes an undo step.
pub type CommitFilter = fn(&EditBatch) -> bool;

/// Default filter: everything except previews.
pub fn commit_batches(batch: &EditBatch) -> bool {
    !batch.preview
}

/// Editing session over one document.
#[derive(Debug, Clone)]
pub struct Editor {
    history: History<CaptionDataContainer>,
    commit_filter: CommitFilter,
}

impl Editor {
    pub fn new(document: CaptionDataContainer, undo_limit: usize) -> Self {
        Self {
            history: History::new(document, undo_limit),
            commit_filter: commit_batches,
        }
    }

    pub fn with_commit_filter(mut self, filter: CommitFilter) -> Self {
        self.commit_filter = filter;
        self
    }

    pub fn document(&self) -> &CaptionDataContainer {
        self.history.present()
    }

    pub fn history(&self) -> &History<CaptionDataContainer> {
        &self.history
    }

    /// Applies a batch. On error the document is left as it was.
    /// Returns the index of a newly inserted cue, if any.
    pub fn apply(&mut self, batch: &EditBatch) -> Result<Option<usize>, EditError> {
        let out = apply_batch(self.history.present(), &batch.actions)?;
        let commit = (self.commit_filter)(batch);
        tracing::debug!(
            actions = batch.actions.len(),
            commit,
            cues = out.caption.cue_count(),
            "applied edit batch"
        );
        self.history.record(out.caption, commit);
        Ok(out.selected)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn into_document(self) -> CaptionDataContainer {
        self.history.present().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{edit::EditAction, model::Cue};

    fn editor() -> Editor {
        Editor::new(
            CaptionDataContainer::single_track(vec![Cue::new(0, 999, "a")]),
            40,
        )
    }

    fn drag_end(end_ms: i64, preview: bool) -> EditBatch {
        EditBatch {
            actions: vec![EditAction::ModifyCaptionEndTimeMs {
                track_id: 0,
                caption_id: 0,
                end_ms,
            }],
            preview,
        }
    }

    #[test]
    fn drag_frames_collapse_into_one_step() {
        let mut ed = editor();
        ed.apply(&drag_end(1_100, true)).unwrap();
        ed.apply(&drag_end(1_200, true)).unwrap();
        ed.apply(&drag_end(1_300, false)).unwrap();
        assert_eq!(ed.document().tracks[0].cues[0].end_ms, 1_300);
        assert_eq!(ed.history().undo_count(), 1);
        assert!(ed.undo());
        assert_eq!(ed.document().tracks[0].cues[0].end_ms, 999);
        assert!(ed.redo());
        assert_eq!(ed.document().tracks[0].cues[0].end_ms, 1_300);
    }

    #[test]
    fn failed_batch_keeps_document() {
        let mut ed = editor();
        let before = ed.document().clone();
        let err = ed
            .apply(&EditBatch::commit(vec![EditAction::RemoveTrack { track_id: 0 }]))
            .unwrap_err();
        assert_eq!(err.to_string(), "At least 1 track needs to be present");
        assert_eq!(ed.document(), &before);
        assert!(!ed.history().can_undo());
    }

    #[test]
    fn custom_filter() {
        let mut ed = editor().with_commit_filter(|_| false);
        ed.apply(&drag_end(2_000, false)).unwrap();
        assert!(!ed.undo());
        assert_eq!(ed.into_document().tracks[0].cues[0].end_ms, 2_000);
    }
}
