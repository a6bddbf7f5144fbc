use serde::{Deserialize, Serialize};

use crate::model::{CaptionDataContainer, Cue, Settings};

use super::{EditError, ops};

/// One edit, as issued by the editing UI or read from a batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditAction {
    ModifyCaption {
        track_id: usize,
        caption_id: usize,
        caption: Cue,
    },
    ModifyCaptionStartTime {
        track_id: usize,
        caption_id: usize,
        time: String,
    },
    ModifyCaptionStartTimeMs {
        track_id: usize,
        caption_id: usize,
        start_ms: i64,
    },
    ModifyCaptionEndTime {
        track_id: usize,
        caption_id: usize,
        time: String,
    },
    ModifyCaptionEndTimeMs {
        track_id: usize,
        caption_id: usize,
        end_ms: i64,
    },
    ModifyCaptionText {
        track_id: usize,
        caption_id: usize,
        text: String,
    },
    ModifyCaptionTime {
        track_id: usize,
        caption_id: usize,
        start_ms: i64,
        end_ms: i64,
    },
    ChangeCaptionTrackId {
        track_id: usize,
        caption_id: usize,
        start_ms: i64,
        end_ms: i64,
        target_track_id: usize,
    },
    DeleteCaption {
        track_id: usize,
        caption_id: usize,
    },
    AddCaptionToTrackRelative {
        track_id: usize,
        caption_id: usize,
    },
    AddCaptionToTrackTime {
        track_id: usize,
        time_ms: i64,
        #[serde(default)]
        caption: Option<Cue>,
        #[serde(default)]
        skip_validity_checks: bool,
    },
    AddTrack,
    RemoveTrack {
        track_id: usize,
    },
    ModifyCaptionGlobalSettings {
        #[serde(default)]
        settings: Option<Settings>,
    },
    ModifyCaptionTrackSettings {
        track_id: usize,
        #[serde(default)]
        settings: Option<Settings>,
    },
}

/// Uniform result of every action. `selected` is the index of a newly
/// inserted cue, for callers that move the selection to it.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutput {
    pub caption: CaptionDataContainer,
    pub selected: Option<usize>,
}

impl From<CaptionDataContainer> for EditOutput {
    fn from(caption: CaptionDataContainer) -> Self {
        Self {
            caption,
            selected: None,
        }
    }
}

impl From<ops::Inserted> for EditOutput {
    fn from(inserted: ops::Inserted) -> Self {
        Self {
            caption: inserted.caption,
            selected: inserted.index,
        }
    }
}

impl EditAction {
    pub fn name(&self) -> &'static str {
        match self {
            EditAction::ModifyCaption { .. } => "modifyCaption",
            EditAction::ModifyCaptionStartTime { .. } => "modifyCaptionStartTime",
            EditAction::ModifyCaptionStartTimeMs { .. } => "modifyCaptionStartTimeMs",
            EditAction::ModifyCaptionEndTime { .. } => "modifyCaptionEndTime",
            EditAction::ModifyCaptionEndTimeMs { .. } => "modifyCaptionEndTimeMs",
            EditAction::ModifyCaptionText { .. } => "modifyCaptionText",
            EditAction::ModifyCaptionTime { .. } => "modifyCaptionTime",
            EditAction::ChangeCaptionTrackId { .. } => "changeCaptionTrackId",
            EditAction::DeleteCaption { .. } => "deleteCaption",
            EditAction::AddCaptionToTrackRelative { .. } => "addCaptionToTrackRelative",
            EditAction::AddCaptionToTrackTime { .. } => "addCaptionToTrackTime",
            EditAction::AddTrack => "addTrack",
            EditAction::RemoveTrack { .. } => "removeTrack",
            EditAction::ModifyCaptionGlobalSettings { .. } => "modifyCaptionGlobalSettings",
            EditAction::ModifyCaptionTrackSettings { .. } => "modifyCaptionTrackSettings",
        }
    }

    pub fn apply(&self, c: &CaptionDataContainer) -> Result<EditOutput, EditError> {
        let out: EditOutput = match self {
            EditAction::ModifyCaption {
                track_id,
                caption_id,
                caption,
            } => ops::modify_caption(c, *track_id, *caption_id, caption.clone())?.into(),
            EditAction::ModifyCaptionStartTime {
                track_id,
                caption_id,
                time,
            } => ops::modify_caption_start_time(c, *track_id, *caption_id, time)?.into(),
            EditAction::ModifyCaptionStartTimeMs {
                track_id,
                caption_id,
                start_ms,
            } => ops::modify_caption_start_time_ms(c, *track_id, *caption_id, *start_ms)?.into(),
            EditAction::ModifyCaptionEndTime {
                track_id,
                caption_id,
                time,
            } => ops::modify_caption_end_time(c, *track_id, *caption_id, time)?.into(),
            EditAction::ModifyCaptionEndTimeMs {
                track_id,
                caption_id,
                end_ms,
            } => ops::modify_caption_end_time_ms(c, *track_id, *caption_id, *end_ms)?.into(),
            EditAction::ModifyCaptionText {
                track_id,
                caption_id,
                text,
            } => ops::modify_caption_text(c, *track_id, *caption_id, text)?.into(),
            EditAction::ModifyCaptionTime {
                track_id,
                caption_id,
                start_ms,
                end_ms,
            } => ops::modify_caption_time(c, *track_id, *caption_id, *start_ms, *end_ms)?.into(),
            EditAction::ChangeCaptionTrackId {
                track_id,
                caption_id,
                start_ms,
                end_ms,
                target_track_id,
            } => ops::change_caption_track_id(
                c,
                *track_id,
                *caption_id,
                *start_ms,
                *end_ms,
                *target_track_id,
            )?
            .into(),
            EditAction::DeleteCaption {
                track_id,
                caption_id,
            } => ops::delete_caption(c, *track_id, *caption_id)?.into(),
            EditAction::AddCaptionToTrackRelative {
                track_id,
                caption_id,
            } => ops::add_caption_to_track_relative(c, *track_id, *caption_id)?.into(),
            EditAction::AddCaptionToTrackTime {
                track_id,
                time_ms,
                caption,
                skip_validity_checks,
            } => ops::add_caption_to_track_time(
                c,
                *track_id,
                *time_ms,
                caption.clone(),
                *skip_validity_checks,
            )?
            .into(),
            EditAction::AddTrack => ops::add_track(c)?.into(),
            EditAction::RemoveTrack { track_id } => ops::remove_track(c, *track_id)?.into(),
            EditAction::ModifyCaptionGlobalSettings { settings } => {
                ops::modify_caption_global_settings(c, settings.clone())?.into()
            }
            EditAction::ModifyCaptionTrackSettings { track_id, settings } => {
                ops::modify_caption_track_settings(c, *track_id, settings.clone())?.into()
            }
        };
        Ok(out)
    }
}

/// Edits that make up one user gesture, applied together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditBatch {
    pub actions: Vec<EditAction>,
    /// Intermediate state of an ongoing gesture (e.g. a drag frame).
    #[serde(default)]
    pub preview: bool,
}

impl EditBatch {
    pub fn commit(actions: Vec<EditAction>) -> Self {
        Self {
            actions,
            preview: false,
        }
    }

    pub fn preview(actions: Vec<EditAction>) -> Self {
        Self {
            actions,
            preview: true,
        }
    }
}

/// Applies `actions` in order, each against the previous result. The
/// first error aborts the batch and nothing of it is kept.
pub fn apply_batch(
    container: &CaptionDataContainer,
    actions: &[EditAction],
) -> Result<EditOutput, EditError> {
    let mut out = EditOutput::from(container.clone());
    for (i, action) in actions.iter().enumerate() {
        let step = action.apply(&out.caption).map_err(|err| {
            tracing::debug!(step = i, action = action.name(), error = %err, "batch aborted");
            err
        })?;
        out = EditOutput {
            caption: step.caption,
            selected: step.selected.or(out.selected),
        };
    }
    Ok(out)
}
