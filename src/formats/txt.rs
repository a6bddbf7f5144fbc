use crate::model::{CaptionDataContainer, Cue};

pub const TXT_CUE_DURATION_MS: i64 = 1000;

/// Every line becomes a fixed-length cue, placed back to back with a
/// 1ms gap: line `i` covers `[i*1000, (i+1)*1000 - 1]`.
pub fn parse_txt(input: &str) -> CaptionDataContainer {
    let cues: Vec<Cue> = input
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let i = i as i64;
            Cue::new(
                i * TXT_CUE_DURATION_MS,
                (i + 1) * TXT_CUE_DURATION_MS - 1,
                line,
            )
        })
        .collect();

    CaptionDataContainer::single_track(cues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_lines() {
        let doc = parse_txt("line one\nline two");
        assert_eq!(
            doc.tracks[0].cues,
            vec![Cue::new(0, 999, "line one"), Cue::new(1_000, 1_999, "line two")]
        );
    }

    #[test]
    fn content_does_not_affect_timing() {
        let doc = parse_txt("A very long sentence. With punctuation!\nx\n");
        assert_eq!(doc.tracks[0].cues.len(), 2);
        assert_eq!(doc.tracks[0].cues[1].start_ms, 1_000);
        assert_eq!(doc.tracks[0].cues[1].end_ms, 1_999);
    }
}
