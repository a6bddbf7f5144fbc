use serde::{Deserialize, Serialize};

use crate::formats::CaptionFormat;

/// Anchor of a caption box, laid out like a numeric keypad
/// (1 = bottom-left, 5 = middle-center, 9 = top-right).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    TopLeft,
    TopCenter,
    TopRight,
}

/// Horizontal component of an [`Alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Center,
    Right,
}

/// Vertical component of an [`Alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Top,
    Middle,
    Bottom,
}

impl Alignment {
    /// Maps an ASS style `\an` number (1..=9) to an anchor.
    pub fn from_numpad(n: u8) -> Option<Self> {
        Some(match n {
            1 => Alignment::BottomLeft,
            2 => Alignment::BottomCenter,
            3 => Alignment::BottomRight,
            4 => Alignment::MiddleLeft,
            5 => Alignment::MiddleCenter,
            6 => Alignment::MiddleRight,
            7 => Alignment::TopLeft,
            8 => Alignment::TopCenter,
            9 => Alignment::TopRight,
            _ => return None,
        })
    }

    pub fn numpad(self) -> u8 {
        match self {
            Alignment::BottomLeft => 1,
            Alignment::BottomCenter => 2,
            Alignment::BottomRight => 3,
            Alignment::MiddleLeft => 4,
            Alignment::MiddleCenter => 5,
            Alignment::MiddleRight => 6,
            Alignment::TopLeft => 7,
            Alignment::TopCenter => 8,
            Alignment::TopRight => 9,
        }
    }

    pub fn column(self) -> Column {
        match self.numpad() % 3 {
            1 => Column::Left,
            2 => Column::Center,
            _ => Column::Right,
        }
    }

    pub fn row(self) -> Row {
        match self.numpad() {
            1..=3 => Row::Bottom,
            4..=6 => Row::Middle,
            _ => Row::Top,
        }
    }
}

/// Normalized point, both axes as fractions of the video size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub alignment: Alignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Settings shared by the track and container scopes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    #[serde(rename = "start")]
    pub start_ms: i64,
    #[serde(rename = "end")]
    pub end_ms: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl Cue {
    pub fn new(start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
            layout: None,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn duration_ms(&self) -> i64 {
        (self.end_ms - self.start_ms).max(0)
    }

    /// Malformed imports can produce cues that end before they start.
    pub fn is_well_formed(&self) -> bool {
        self.end_ms >= self.start_ms
    }

    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms <= self.end_ms
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub cues: Vec<Cue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl Track {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self {
            cues,
            settings: None,
        }
    }

    pub fn sort_by_start(&mut self) {
        // Stable, so cues sharing a start keep their relative order.
        self.cues.sort_by_key(|c| c.start_ms);
    }

    pub fn is_sorted(&self) -> bool {
        self.cues.windows(2).all(|w| w[0].start_ms <= w[1].start_ms)
    }
}

/// The full caption document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionDataContainer {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl CaptionDataContainer {
    /// A fresh authoring document: one track, zero cues.
    pub fn new_empty() -> Self {
        Self {
            tracks: vec![Track::default()],
            settings: None,
        }
    }

    pub fn single_track(cues: Vec<Cue>) -> Self {
        Self {
            tracks: vec![Track::new(cues)],
            settings: None,
        }
    }

    pub fn cue_count(&self) -> usize {
        self.tracks.iter().map(|t| t.cues.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cue_count() == 0
    }

    pub fn duration_ms(&self) -> i64 {
        self.tracks
            .iter()
            .flat_map(|t| t.cues.iter())
            .map(|c| c.end_ms)
            .max()
            .unwrap_or(0)
            .max(0)
    }

    pub fn cue(&self, track_id: usize, caption_id: usize) -> Option<&Cue> {
        self.tracks.get(track_id)?.cues.get(caption_id)
    }

    /// Layout precedence: cue, then track settings, then container
    /// settings, then bottom-center.
    pub fn resolve_layout(&self, track_id: usize, cue: &Cue) -> Layout {
        cue.layout
            .or_else(|| {
                self.tracks
                    .get(track_id)
                    .and_then(|t| t.settings.as_ref())
                    .and_then(|s| s.layout)
            })
            .or_else(|| self.settings.as_ref().and_then(|s| s.layout))
            .unwrap_or_default()
    }
}

/// The original unparsed source text of a caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCaptionData {
    #[serde(rename = "type")]
    pub format: CaptionFormat,
    pub data: String,
}

/// Runtime wrapper around a document as shown on a video page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionContainer {
    pub data: CaptionDataContainer,
    pub video_id: String,
    pub video_source: String,
    #[serde(default)]
    pub loaded_by_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub dislikes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawCaptionData>,
}

impl CaptionContainer {
    pub fn is_editable(&self) -> bool {
        self.loaded_by_user
    }
}
