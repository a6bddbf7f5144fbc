use aspasia::{Moment, PlainSubtitle, SubRipSubtitle, Subtitle, WebVttSubtitle};

use crate::{
    formats::{bidi::wrap_rtl, time::format_srt_timestamp},
    model::{CaptionDataContainer, Cue, Track},
};

/// SubRip and WebVTT share one cue-list parser; the other syntax is
/// tried as a fallback before giving up.
pub fn parse_srt_or_vtt(raw: &str, prefer_vtt: bool) -> Option<CaptionDataContainer> {
    if prefer_vtt {
        parse_vtt(raw).or_else(|| parse_srt(raw))
    } else {
        parse_srt(raw).or_else(|| parse_vtt(raw))
    }
}

fn parse_srt(raw: &str) -> Option<CaptionDataContainer> {
    let srt = raw.parse::<SubRipSubtitle>().ok()?;
    tracing::info!("parsed as SRT via aspasia");
    Some(plain_to_container(&PlainSubtitle::from(&srt)))
}

fn parse_vtt(raw: &str) -> Option<CaptionDataContainer> {
    let vtt = raw.parse::<WebVttSubtitle>().ok()?;
    tracing::info!("parsed as VTT via aspasia");
    Some(plain_to_container(&PlainSubtitle::from(&vtt)))
}

fn plain_to_container(plain: &PlainSubtitle) -> CaptionDataContainer {
    let cues: Vec<Cue> = plain
        .events()
        .iter()
        .map(|e| {
            Cue::new(
                moment_to_ms(&e.start),
                moment_to_ms(&e.end),
                e.text.replace("\r\n", "\n"),
            )
        })
        .collect();

    CaptionDataContainer::single_track(cues)
}

pub(crate) fn moment_to_ms(m: &Moment) -> i64 {
    let h = m.hours();
    let min = m.minutes();
    let s = m.seconds();
    let ms = m.ms();
    (((h * 60 + min) * 60 + s) * 1000 + ms) as i64
}

/// Collapses every track into one, keeping the first track's settings.
pub fn flatten(container: &CaptionDataContainer) -> Track {
    let mut cues: Vec<Cue> = container
        .tracks
        .iter()
        .flat_map(|t| t.cues.iter().cloned())
        .collect();
    cues.sort_by_key(|c| c.start_ms);

    Track {
        cues,
        settings: container.tracks.first().and_then(|t| t.settings.clone()),
    }
}

pub fn write_srt(container: &CaptionDataContainer) -> String {
    let track = flatten(container);
    let mut out = String::new();

    for (i, cue) in track.cues.iter().enumerate() {
        out.push_str(&(i + 1).to_string());
        out.push('\n');

        out.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(cue.start_ms),
            format_srt_timestamp(cue.end_ms)
        ));

        out.push_str(&wrap_rtl(&cue.text));
        out.push('\n');
        out.push('\n');
    }

    out
}
