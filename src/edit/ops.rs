use crate::{
    formats::time::parse_editor_time,
    model::{CaptionDataContainer, Cue, Settings, Track},
};

use super::EditError;

/// Length of a cue inserted next to an existing one.
pub const DEFAULT_RELATIVE_CUE_MS: i64 = 1000;
/// Smallest gap between two cues that still fits a new one.
pub const MIN_RELATIVE_GAP_MS: i64 = 500;
/// Length of a cue synthesized at a point in time.
pub const DEFAULT_TIME_CUE_MS: i64 = 500;

pub type EditResult = Result<CaptionDataContainer, EditError>;

/// Result of an insertion. `index` is where the new cue landed in its
/// track, or `None` when nothing was inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct Inserted {
    pub caption: CaptionDataContainer,
    pub index: Option<usize>,
}

impl Inserted {
    fn unchanged(container: &CaptionDataContainer) -> Self {
        Self {
            caption: container.clone(),
            index: None,
        }
    }
}

fn missing(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: Option<usize>,
) -> CaptionDataContainer {
    tracing::warn!(
        track_id,
        caption_id = ?caption_id,
        tracks = container.tracks.len(),
        "edit references a missing track or caption; ignoring"
    );
    container.clone()
}

fn needs_resort(cues: &[Cue], caption_id: usize, cue: &Cue) -> bool {
    let after_next = cues
        .get(caption_id + 1)
        .is_some_and(|next| cue.start_ms > next.start_ms);
    let before_prev = caption_id
        .checked_sub(1)
        .and_then(|i| cues.get(i))
        .is_some_and(|prev| cue.end_ms < prev.end_ms || cue.start_ms < prev.start_ms);
    after_next || before_prev
}

/// Inserts `cue` at `index`, re-sorting only if that broke the order.
/// Returns where the cue ended up.
fn insert_at(track: &mut Track, index: usize, cue: Cue) -> usize {
    let start = cue.start_ms;
    let after_prev = index
        .checked_sub(1)
        .and_then(|i| track.cues.get(i))
        .map_or(true, |prev| prev.start_ms <= start);
    let before_next = track
        .cues
        .get(index)
        .map_or(true, |next| start <= next.start_ms);
    track.cues.insert(index, cue);
    if after_prev && before_next {
        return index;
    }
    track.sort_by_start();
    track.cues.partition_point(|c| c.start_ms <= start) - 1
}

/// Replaces the cue at `caption_id`. When the new times cross a
/// neighbor the track is re-sorted, so the cue may end up at another
/// index.
pub fn modify_caption(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
    new_cue: Cue,
) -> EditResult {
    if container.cue(track_id, caption_id).is_none() {
        return Ok(missing(container, track_id, Some(caption_id)));
    }

    let mut next = container.clone();
    let track = &mut next.tracks[track_id];
    let reorder = needs_resort(&track.cues, caption_id, &new_cue);
    track.cues[caption_id] = new_cue;
    if reorder {
        track.sort_by_start();
    }
    Ok(next)
}

fn modify_with(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
    f: impl FnOnce(&Cue) -> Cue,
) -> EditResult {
    match container.cue(track_id, caption_id) {
        Some(cue) => modify_caption(container, track_id, caption_id, f(cue)),
        None => Ok(missing(container, track_id, Some(caption_id))),
    }
}

fn parse_time_input(formatted: &str) -> Result<i64, EditError> {
    parse_editor_time(formatted).ok_or_else(|| EditError::InvalidTime(formatted.to_string()))
}

pub fn modify_caption_start_time_ms(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
    start_ms: i64,
) -> EditResult {
    modify_with(container, track_id, caption_id, |c| Cue {
        start_ms,
        ..c.clone()
    })
}

/// `formatted` is editor input such as `00:01:02.5__`.
pub fn modify_caption_start_time(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
    formatted: &str,
) -> EditResult {
    let start_ms = parse_time_input(formatted)?;
    modify_caption_start_time_ms(container, track_id, caption_id, start_ms)
}

pub fn modify_caption_end_time_ms(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
    end_ms: i64,
) -> EditResult {
    modify_with(container, track_id, caption_id, |c| Cue {
        end_ms,
        ..c.clone()
    })
}

pub fn modify_caption_end_time(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
    formatted: &str,
) -> EditResult {
    let end_ms = parse_time_input(formatted)?;
    modify_caption_end_time_ms(container, track_id, caption_id, end_ms)
}

pub fn modify_caption_text(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
    text: &str,
) -> EditResult {
    modify_with(container, track_id, caption_id, |c| Cue {
        text: text.to_string(),
        ..c.clone()
    })
}

pub fn modify_caption_time(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
    start_ms: i64,
    end_ms: i64,
) -> EditResult {
    modify_with(container, track_id, caption_id, |c| Cue {
        start_ms,
        end_ms,
        ..c.clone()
    })
}

/// Moves a cue to another track with new times. Either both the removal
/// and the insertion apply, or neither does.
pub fn change_caption_track_id(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
    start_ms: i64,
    end_ms: i64,
    target_track_id: usize,
) -> Result<Inserted, EditError> {
    if target_track_id >= container.tracks.len() {
        return Err(EditError::InvalidTargetTrack);
    }
    let Some(cue) = container.cue(track_id, caption_id) else {
        return Ok(Inserted {
            caption: missing(container, track_id, Some(caption_id)),
            index: None,
        });
    };

    let moved = Cue {
        start_ms,
        end_ms,
        ..cue.clone()
    };
    let removed = delete_caption(container, track_id, caption_id)?;
    add_caption_to_track_time(&removed, target_track_id, start_ms, Some(moved), true)
}

pub fn delete_caption(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
) -> EditResult {
    if container.cue(track_id, caption_id).is_none() {
        return Ok(missing(container, track_id, Some(caption_id)));
    }
    let mut next = container.clone();
    next.tracks[track_id].cues.remove(caption_id);
    Ok(next)
}

/// Inserts a default-length cue right before the cue at `caption_id`
/// (`caption_id == cues.len()` appends after the last one).
///
/// Inserting ahead of a first cue that already starts at 0 is refused
/// without an error. Between two cues the gap must be at least
/// [`MIN_RELATIVE_GAP_MS`]; a smaller gap than the default length
/// shortens the new cue to fit.
pub fn add_caption_to_track_relative(
    container: &CaptionDataContainer,
    track_id: usize,
    caption_id: usize,
) -> Result<Inserted, EditError> {
    let Some(track) = container.tracks.get(track_id) else {
        return Ok(Inserted {
            caption: missing(container, track_id, Some(caption_id)),
            index: None,
        });
    };
    let cues = &track.cues;
    if caption_id > cues.len() {
        return Ok(Inserted {
            caption: missing(container, track_id, Some(caption_id)),
            index: None,
        });
    }

    let prev_end = caption_id.checked_sub(1).map(|i| cues[i].end_ms);
    let next_start = cues.get(caption_id).map(|c| c.start_ms);

    let (start_ms, end_ms) = match (prev_end, next_start) {
        (None, None) => (0, DEFAULT_RELATIVE_CUE_MS),
        (None, Some(next)) => {
            if next <= 0 {
                tracing::debug!(track_id, "no space before the first caption");
                return Ok(Inserted::unchanged(container));
            }
            ((next - DEFAULT_RELATIVE_CUE_MS).max(0), next - 1)
        }
        (Some(prev), Some(next)) => {
            if next - prev < MIN_RELATIVE_GAP_MS {
                return Err(EditError::IntervalTooShort);
            }
            let start = prev + 1;
            (start, (start + DEFAULT_RELATIVE_CUE_MS).min(next - 1))
        }
        (Some(prev), None) => {
            let start = prev + 1;
            (start, start + DEFAULT_RELATIVE_CUE_MS)
        }
    };

    let mut next = container.clone();
    let index = insert_at(&mut next.tracks[track_id], caption_id, Cue::new(start_ms, end_ms, ""));
    Ok(Inserted {
        caption: next,
        index: Some(index),
    })
}

/// Inserts `cue` (or a [`DEFAULT_TIME_CUE_MS`] blank cue at `time_ms`) at
/// its start-sorted position, found by binary search.
///
/// Unless `skip_validity_checks` is set, a cue that would run into the
/// following one is cut short to end just before it, and a cue with no
/// room left at all is rejected.
pub fn add_caption_to_track_time(
    container: &CaptionDataContainer,
    track_id: usize,
    time_ms: i64,
    cue: Option<Cue>,
    skip_validity_checks: bool,
) -> Result<Inserted, EditError> {
    let Some(track) = container.tracks.get(track_id) else {
        return Ok(Inserted {
            caption: missing(container, track_id, None),
            index: None,
        });
    };

    let mut cue = cue.unwrap_or_else(|| Cue::new(time_ms, time_ms + DEFAULT_TIME_CUE_MS, ""));
    let index = track.cues.partition_point(|c| c.start_ms <= cue.start_ms);

    if !skip_validity_checks {
        if cue.start_ms < 0 {
            return Err(EditError::NoRoom);
        }
        if let Some(following) = track.cues.get(index) {
            if cue.end_ms >= following.start_ms {
                cue.end_ms = following.start_ms - 1;
            }
        }
        if cue.end_ms < cue.start_ms {
            return Err(EditError::NoRoom);
        }
    }

    let mut next = container.clone();
    let index = insert_at(&mut next.tracks[track_id], index, cue);
    Ok(Inserted {
        caption: next,
        index: Some(index),
    })
}

pub fn add_track(container: &CaptionDataContainer) -> EditResult {
    let mut next = container.clone();
    next.tracks.push(Track::default());
    Ok(next)
}

pub fn remove_track(container: &CaptionDataContainer, track_id: usize) -> EditResult {
    if container.tracks.len() <= 1 {
        return Err(EditError::LastTrack);
    }
    if track_id >= container.tracks.len() {
        return Ok(missing(container, track_id, None));
    }
    let mut next = container.clone();
    next.tracks.remove(track_id);
    Ok(next)
}

pub fn modify_caption_global_settings(
    container: &CaptionDataContainer,
    settings: Option<Settings>,
) -> EditResult {
    let mut next = container.clone();
    next.settings = settings;
    Ok(next)
}

pub fn modify_caption_track_settings(
    container: &CaptionDataContainer,
    track_id: usize,
    settings: Option<Settings>,
) -> EditResult {
    if track_id >= container.tracks.len() {
        return Ok(missing(container, track_id, None));
    }
    let mut next = container.clone();
    next.tracks[track_id].settings = settings;
    Ok(next)
}
