use crate::model::CaptionDataContainer;

use super::FormatError;

/// Native document format: the container as serde sees it, so layouts
/// and multiple tracks survive a round trip.
pub fn write_json(container: &CaptionDataContainer) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(container)?)
}

pub fn parse_json(input: &str) -> Result<CaptionDataContainer, FormatError> {
    let mut container: CaptionDataContainer = serde_json::from_str(input)?;
    for track in &mut container.tracks {
        if !track.is_sorted() {
            track.sort_by_start();
        }
    }
    Ok(container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alignment, Cue, Layout, Position, Settings, Track};

    #[test]
    fn keeps_layouts_and_tracks() {
        let mut doc = CaptionDataContainer::single_track(vec![Cue::new(0, 500, "a").with_layout(
            Layout {
                alignment: Alignment::TopRight,
                position: Some(Position { x: 0.25, y: 0.75 }),
            },
        )]);
        doc.tracks.push(Track::default());
        doc.settings = Some(Settings {
            layout: Some(Layout::default()),
        });

        let out = write_json(&doc).expect("write");
        assert!(out.contains("\"start\": 0"));
        assert!(out.contains("\"top-right\""));
        assert_eq!(parse_json(&out).expect("parse"), doc);
    }

    #[test]
    fn unsorted_input_is_sorted_on_load() {
        let raw = r#"{"tracks":[{"cues":[{"start":500,"end":600,"text":"b"},{"start":0,"end":100,"text":"a"}]}]}"#;
        let doc = parse_json(raw).expect("parse");
        assert_eq!(doc.tracks[0].cues[0].text, "a");
    }
}
