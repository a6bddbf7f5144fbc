use crate::{
    locator::find_closest_caption,
    model::CaptionDataContainer,
    processor::VideoProcessor,
};

use super::{
    clock::TimeSource,
    layout::{Dimensions, FontSizing, Placement, place},
};

/// Display containers are allocated up front for this many tracks...
pub const MAX_TRACKS: usize = 5;
/// ...and this many simultaneous cues per track.
pub const MAX_CONCURRENT_CAPTIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub max_tracks: usize,
    pub max_concurrent_captions: usize,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            max_tracks: MAX_TRACKS,
            max_concurrent_captions: MAX_CONCURRENT_CAPTIONS,
        }
    }
}

/// The element the overlay is laid out in.
pub trait ContainerElement {
    fn dimensions(&self) -> Dimensions;
}

/// A container whose size the host reports explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedContainer(pub Dimensions);

impl ContainerElement for FixedContainer {
    fn dimensions(&self) -> Dimensions {
        self.0
    }
}

/// Everything the renderer needs from the page it runs on.
pub struct SessionContext<T: TimeSource> {
    pub time_source: T,
    pub container: Box<dyn ContainerElement>,
    pub processor: Box<dyn VideoProcessor>,
}

impl<T: TimeSource> SessionContext<T> {
    pub fn new(
        time_source: T,
        container: Box<dyn ContainerElement>,
        processor: Box<dyn VideoProcessor>,
    ) -> Self {
        Self {
            time_source,
            container,
            processor,
        }
    }

    pub fn video_dimensions(&self) -> Dimensions {
        self.processor
            .retrieve_video_dimensions(self.container.dimensions())
    }
}

/// One display container. Empty text means hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySlot {
    pub text: String,
    pub placement: Option<Placement>,
}

impl DisplaySlot {
    pub fn is_visible(&self) -> bool {
        !self.text.is_empty()
    }

    fn clear(&mut self) {
        self.text.clear();
        self.placement = None;
    }
}

/// Keeps the display slots in step with playback time.
///
/// Each track has a cursor at the first cue not yet known to be over.
/// Ordinary playback scans forward from the cursor; play and seek events
/// reposition every cursor through [`find_closest_caption`].
pub struct Synchronizer<T: TimeSource> {
    ctx: SessionContext<T>,
    capacity: Capacity,
    fonts: FontSizing,
    dimensions: Dimensions,
    cursors: Vec<usize>,
    slots: Vec<Vec<DisplaySlot>>,
    last_time: Option<i64>,
}

impl<T: TimeSource> Synchronizer<T> {
    pub fn new(ctx: SessionContext<T>, capacity: Capacity, fonts: FontSizing) -> Self {
        let dimensions = ctx.video_dimensions();
        Self {
            ctx,
            capacity,
            fonts,
            dimensions,
            cursors: vec![0; capacity.max_tracks],
            slots: vec![
                vec![DisplaySlot::default(); capacity.max_concurrent_captions];
                capacity.max_tracks
            ],
            last_time: None,
        }
    }

    pub fn time_source(&self) -> &T {
        &self.ctx.time_source
    }

    pub fn time_source_mut(&mut self) -> &mut T {
        &mut self.ctx.time_source
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn slots(&self) -> &[Vec<DisplaySlot>] {
        &self.slots
    }

    pub fn cursor(&self, track: usize) -> Option<usize> {
        self.cursors.get(track).copied()
    }

    /// Visible slots as `(track, slot, display)`.
    pub fn visible(&self) -> impl Iterator<Item = (usize, usize, &DisplaySlot)> + '_ {
        self.slots.iter().enumerate().flat_map(|(t, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, s)| s.is_visible())
                .map(move |(i, s)| (t, i, s))
        })
    }

    pub fn set_font_multiplier(&mut self, multiplier: f64) {
        self.fonts.multiplier = multiplier;
        self.last_time = None;
    }

    /// Drains pending playback events, then updates. Returns whether the
    /// slots were rewritten.
    pub fn tick(&mut self, data: &CaptionDataContainer) -> bool {
        let mut jumped = false;
        while let Some(event) = self.ctx.time_source.poll_event() {
            tracing::trace!(?event, "playback event");
            jumped |= event.is_discontinuity();
        }
        if jumped {
            self.resync(data);
        }
        self.update(data, jumped)
    }

    /// Re-reads container size; percentage layouts depend on it.
    pub fn on_resize(&mut self, data: &CaptionDataContainer) -> bool {
        self.dimensions = self.ctx.video_dimensions();
        tracing::debug!(
            width = self.dimensions.width,
            height = self.dimensions.height,
            "container resized"
        );
        self.resync(data);
        self.update(data, true)
    }

    /// Starts over with a different document.
    pub fn load(&mut self, data: &CaptionDataContainer) -> bool {
        self.resync(data);
        self.update(data, true)
    }

    /// Places every cursor at the first cue relevant to the current time.
    pub fn resync(&mut self, data: &CaptionDataContainer) {
        let time = self.ctx.time_source.current_time_ms();
        for (t, cursor) in self.cursors.iter_mut().enumerate() {
            *cursor = data
                .tracks
                .get(t)
                .map_or(0, |track| find_closest_caption(&track.cues, time));
        }
        tracing::debug!(time_ms = time, cursors = ?self.cursors, "cursors resynced");
    }

    /// Writes the cues active at the current time into the slots. Does
    /// nothing when the time has not changed since the last write, unless
    /// `force` is set.
    pub fn update(&mut self, data: &CaptionDataContainer, force: bool) -> bool {
        let time = self.ctx.time_source.current_time_ms();
        if !force && self.last_time == Some(time) {
            return false;
        }
        self.last_time = Some(time);

        for t in 0..self.capacity.max_tracks {
            let filled = match data.tracks.get(t) {
                Some(_) => self.fill_track(data, t, time),
                None => 0,
            };
            for slot in &mut self.slots[t][filled..] {
                slot.clear();
            }
        }
        true
    }

    fn fill_track(&mut self, data: &CaptionDataContainer, t: usize, time: i64) -> usize {
        let cues = &data.tracks[t].cues;
        let mut cursor = self.cursors[t];
        if cursor >= cues.len() {
            return 0;
        }

        let mut filled = 0;
        // The cursor may only move past cues that are all over; an earlier
        // cue still on screen pins it.
        let mut all_past = true;
        for (i, cue) in cues.iter().enumerate().skip(cursor) {
            if !cue.is_well_formed() {
                continue;
            }
            if time < cue.start_ms {
                break;
            }
            if time > cue.end_ms {
                if all_past {
                    cursor = i + 1;
                }
                continue;
            }

            all_past = false;
            if filled < self.capacity.max_concurrent_captions {
                let layout = data.resolve_layout(t, cue);
                let slot = &mut self.slots[t][filled];
                slot.text.clone_from(&cue.text);
                slot.placement = Some(place(&layout, self.dimensions, &self.fonts));
                filled += 1;
            }
        }

        self.cursors[t] = cursor;
        filled
    }
}
