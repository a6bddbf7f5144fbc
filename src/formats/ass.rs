//! Advanced SubStation Alpha / SubStation Alpha import.
//!
//! Script syntax is handled by an [`AssCompiler`], which turns raw text
//! into dialogue events. The importer then maps each event's layer onto a
//! track and normalizes `\pos` overrides against the script resolution.

use regex::Regex;
use std::{collections::HashMap, sync::OnceLock};

use aspasia::{AssSubtitle, Subtitle};

use crate::{
    formats::srt::moment_to_ms,
    model::{Alignment, CaptionDataContainer, Cue, Layout, Position, Track},
};

/// Resolution assumed by renderers when a script declares none.
pub const DEFAULT_PLAY_RES_X: f64 = 384.0;
pub const DEFAULT_PLAY_RES_Y: f64 = 288.0;

/// Layers above this are treated as corrupt input.
pub const MAX_LAYER: usize = 63;

#[derive(Debug, thiserror::Error)]
pub enum AssError {
    #[error("not a SubStation Alpha script: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptInfo {
    pub play_res_x: f64,
    pub play_res_y: f64,
}

impl Default for ScriptInfo {
    fn default() -> Self {
        Self {
            play_res_x: DEFAULT_PLAY_RES_X,
            play_res_y: DEFAULT_PLAY_RES_Y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
}

/// Run of text sharing one set of override tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dialogue {
    pub layer: i64,
    /// Seconds.
    pub start: f64,
    /// Seconds.
    pub end: f64,
    pub slices: Vec<Slice>,
    /// Absolute script pixels from a `\pos` override.
    pub pos: Option<(f64, f64)>,
    /// Numpad alignment, 1..=9.
    pub alignment: u8,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledScript {
    pub info: ScriptInfo,
    pub dialogues: Vec<Dialogue>,
}

pub trait AssCompiler {
    fn compile(&self, raw: &str) -> Result<CompiledScript, AssError>;
}

/// Compiler backed by aspasia's script parser. Override tags inside
/// the dialogue text are read here; drawing commands and animated tags
/// are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptCompiler;

fn override_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]*)\}").expect("valid regex"))
}

fn pos_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\pos\(\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*\)").expect("valid regex")
    })
}

fn align_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\(an?)(\d+)").expect("valid regex"))
}

/// SSA v4 numbers alignments 1-3 bottom, 5-7 top, 9-11 middle.
fn legacy_to_numpad(a: u8) -> u8 {
    match a {
        1..=3 => a,
        5..=7 => a + 2,
        9..=11 => a - 5,
        _ => 2,
    }
}

impl AssCompiler for ScriptCompiler {
    fn compile(&self, raw: &str) -> Result<CompiledScript, AssError> {
        let ass = raw
            .parse::<AssSubtitle>()
            .map_err(|err| AssError::Parse(err.to_string()))?;
        tracing::info!("parsed as ASS via aspasia");

        let script_info = ass.script_info();
        let mut info = ScriptInfo::default();
        if let Some(x) = script_info.play_res_x {
            info.play_res_x = x as f64;
        }
        if let Some(y) = script_info.play_res_y {
            info.play_res_y = y as f64;
        }

        let style_alignment: HashMap<&str, u8> = ass
            .styles()
            .iter()
            .filter_map(|style| {
                let align = u8::try_from(style.alignment).ok()?;
                Some((style.name.as_str(), align))
            })
            .collect();

        let dialogues = ass
            .events()
            .iter()
            .map(|event| {
                let alignment = style_alignment
                    .get(event.style.trim().trim_start_matches('*'))
                    .copied()
                    .unwrap_or(2);
                let (slices, pos, alignment) = read_overrides(&event.text, alignment);
                Dialogue {
                    layer: i64::try_from(event.layer).unwrap_or(0),
                    start: moment_to_ms(&event.start) as f64 / 1000.0,
                    end: moment_to_ms(&event.end) as f64 / 1000.0,
                    slices,
                    pos,
                    alignment,
                }
            })
            .collect();

        Ok(CompiledScript { info, dialogues })
    }
}

/// Splits dialogue text at override blocks, picking up `\pos` and the
/// last `\an`/`\a` tag on the way.
fn read_overrides(text: &str, mut alignment: u8) -> (Vec<Slice>, Option<(f64, f64)>, u8) {
    let mut pos = None;
    let mut slices = Vec::new();
    let mut last = 0;
    for caps in override_block_re().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_slice(&mut slices, &text[last..whole.start()]);
        last = whole.end();

        let tags = caps.get(1).map_or("", |m| m.as_str());
        if let Some(p) = pos_tag_re().captures(tags) {
            let x = p.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
            let y = p.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
            if let (Some(x), Some(y)) = (x, y) {
                pos = Some((x, y));
            }
        }
        for a in align_tag_re().captures_iter(tags) {
            let n = a.get(2).and_then(|m| m.as_str().parse::<u8>().ok());
            match (a.get(1).map(|m| m.as_str()), n) {
                (Some("an"), Some(n)) if (1..=9).contains(&n) => alignment = n,
                (Some("a"), Some(n)) => alignment = legacy_to_numpad(n),
                _ => {}
            }
        }
    }
    push_slice(&mut slices, &text[last..]);
    (slices, pos, alignment)
}

fn push_slice(slices: &mut Vec<Slice>, text: &str) {
    if text.is_empty() {
        return;
    }
    slices.push(Slice {
        fragments: vec![Fragment {
            text: text.to_string(),
        }],
    });
}

fn dialogue_text(d: &Dialogue) -> String {
    d.slices
        .iter()
        .flat_map(|s| s.fragments.iter())
        .map(|f| f.text.as_str())
        .collect::<String>()
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", "\u{a0}")
}

/// Maps compiled events onto tracks, one per layer.
pub fn script_to_container(script: &CompiledScript) -> CaptionDataContainer {
    let mut tracks: Vec<Track> = Vec::new();
    let res_x = if script.info.play_res_x > 0.0 {
        script.info.play_res_x
    } else {
        DEFAULT_PLAY_RES_X
    };
    let res_y = if script.info.play_res_y > 0.0 {
        script.info.play_res_y
    } else {
        DEFAULT_PLAY_RES_Y
    };

    for d in &script.dialogues {
        let layer = usize::try_from(d.layer.max(0)).unwrap_or(usize::MAX);
        if layer > MAX_LAYER {
            tracing::warn!(layer = d.layer, "ASS layer out of range; skipping dialogue");
            continue;
        }
        if tracks.len() <= layer {
            tracks.resize_with(layer + 1, Track::default);
        }

        let alignment = Alignment::from_numpad(d.alignment).unwrap_or_default();
        let layout = match d.pos {
            Some((x, y)) => Some(Layout {
                alignment,
                position: Some(Position {
                    x: x / res_x,
                    y: y / res_y,
                }),
            }),
            None if alignment != Alignment::default() => Some(Layout {
                alignment,
                position: None,
            }),
            None => None,
        };

        let mut cue = Cue::new(
            (d.start * 1000.0).round() as i64,
            (d.end * 1000.0).round() as i64,
            dialogue_text(d),
        );
        cue.layout = layout;
        tracks[layer].cues.push(cue);
    }

    for track in &mut tracks {
        track.sort_by_start();
    }

    CaptionDataContainer {
        tracks,
        settings: None,
    }
}

pub fn parse_ass(raw: &str, compiler: &dyn AssCompiler) -> CaptionDataContainer {
    match compiler.compile(raw) {
        Ok(script) => {
            tracing::info!(dialogues = script.dialogues.len(), "compiled ASS script");
            script_to_container(&script)
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to compile ASS script");
            CaptionDataContainer::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "[Script Info]
ScriptType: v4.00+
PlayResX: 1280
PlayResY: 720

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1
Style: Sign,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,8,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:05.00,0:00:06.00,Default,,0,0,0,,Later line
Dialogue: 0,0:00:01.00,0:00:02.50,Default,,0,0,0,,First, with comma\\Nsecond row
Dialogue: 2,0:00:03.00,0:00:04.00,Sign,,0,0,0,,{\\pos(640,360)\\an5}Centered {\\i1}sign
Dialogue: 1,0:00:03.00,0:00:04.00,Sign,,0,0,0,,Top sign
";

    #[test]
    fn compiles_events_and_resolution() {
        let script = ScriptCompiler.compile(SCRIPT).expect("compile");
        assert_eq!(script.info.play_res_x, 1280.0);
        assert_eq!(script.info.play_res_y, 720.0);
        assert_eq!(script.dialogues.len(), 4);
        let sign = &script.dialogues[2];
        assert_eq!(sign.layer, 2);
        assert_eq!(sign.pos, Some((640.0, 360.0)));
        assert_eq!(sign.alignment, 5);
        assert_eq!(sign.slices.len(), 2);
    }

    #[test]
    fn layers_become_tracks_sorted_by_start() {
        let doc = parse_ass(SCRIPT, &ScriptCompiler);
        assert_eq!(doc.tracks.len(), 3);

        let base = &doc.tracks[0].cues;
        assert_eq!(base.len(), 2);
        assert_eq!(base[0].start_ms, 1_000);
        assert_eq!(base[0].end_ms, 2_500);
        assert_eq!(base[0].text, "First, with comma\nsecond row");
        assert_eq!(base[1].start_ms, 5_000);

        let top = &doc.tracks[1].cues[0];
        assert_eq!(
            top.layout,
            Some(Layout {
                alignment: Alignment::TopCenter,
                position: None
            })
        );

        let sign = &doc.tracks[2].cues[0];
        assert_eq!(sign.text, "Centered sign");
        let layout = sign.layout.expect("layout");
        assert_eq!(layout.alignment, Alignment::MiddleCenter);
        assert_eq!(layout.position, Some(Position { x: 0.5, y: 0.5 }));
    }

    #[test]
    fn missing_events_yields_empty_container() {
        let doc = parse_ass("[Script Info]\nTitle: nothing\n", &ScriptCompiler);
        assert!(doc.tracks.is_empty());
    }

    #[test]
    fn oversized_layer_is_skipped() {
        let dialogue = |layer: i64, text: &str| Dialogue {
            layer,
            start: 1.0,
            end: 2.0,
            slices: vec![Slice {
                fragments: vec![Fragment { text: text.into() }],
            }],
            pos: None,
            alignment: 2,
        };
        let script = CompiledScript {
            info: ScriptInfo::default(),
            dialogues: vec![dialogue(4_000_000_000, "bogus"), dialogue(1, "kept")],
        };

        let doc = script_to_container(&script);
        assert_eq!(doc.tracks.len(), 2);
        assert!(doc.tracks[0].cues.is_empty());
        assert_eq!(doc.tracks[1].cues[0].text, "kept");
    }

    #[test]
    fn override_tags_split_slices() {
        let (slices, pos, alignment) = read_overrides(r"{\a6}Legacy {\pos(10,20)}top", 2);
        assert_eq!(alignment, 8);
        assert_eq!(pos, Some((10.0, 20.0)));
        assert_eq!(slices.len(), 2);
    }

    #[test]
    fn legacy_alignment_mapping() {
        assert_eq!(legacy_to_numpad(2), 2);
        assert_eq!(legacy_to_numpad(6), 8);
        assert_eq!(legacy_to_numpad(10), 5);
    }
}
