use regex::Regex;
use std::sync::OnceLock;

use crate::{
    formats::time::parse_clock_to_ms,
    model::{CaptionDataContainer, Cue},
};

fn sbv_time_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+:\d{2}:\d{2}\.\d{3}),(\d+:\d{2}:\d{2}\.\d{3})$").expect("valid regex")
    })
}

/// Parses YouTube SBV. A block with a bad timing line is logged and
/// dropped; the rest of the file still loads.
pub fn parse_sbv(input: &str) -> CaptionDataContainer {
    let normalized = input.replace("\r\n", "\n");
    let mut cues: Vec<Cue> = Vec::new();

    for (block_no, block) in split_blocks(&normalized).into_iter().enumerate() {
        let mut lines = block.into_iter();
        let Some(time_line) = lines.next() else {
            continue;
        };

        match parse_time_line(time_line.trim()) {
            Some((start_ms, end_ms)) => {
                let text = lines.collect::<Vec<_>>().join("\n");
                cues.push(Cue::new(start_ms, end_ms, text));
            }
            None => {
                tracing::warn!(
                    block = block_no + 1,
                    line = time_line,
                    "malformed SBV timing line; dropping cue"
                );
            }
        }
    }

    cues.retain(|c| c.start_ms >= 0 && c.end_ms >= 0);
    CaptionDataContainer::single_track(cues)
}

/// Groups lines into blocks; any whitespace-only line separates them.
fn split_blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_time_line(line: &str) -> Option<(i64, i64)> {
    let caps = sbv_time_line_re().captures(line)?;
    let start = parse_clock_to_ms(caps.get(1)?.as_str())?;
    let end = parse_clock_to_ms(caps.get(2)?.as_str())?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cue() {
        let doc = parse_sbv("0:00:01.000,0:00:02.500\nHello");
        assert_eq!(doc.tracks.len(), 1);
        assert_eq!(doc.tracks[0].cues, vec![Cue::new(1_000, 2_500, "Hello")]);
    }

    #[test]
    fn multi_line_text_and_crlf() {
        let doc = parse_sbv(
            "0:00:00.000,0:00:01.000\r\nline a\r\nline b\r\n\r\n0:00:02.000,0:00:03.000\r\nnext\r\n",
        );
        let cues = &doc.tracks[0].cues;
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "line a\nline b");
        assert_eq!(cues[1], Cue::new(2_000, 3_000, "next"));
    }

    #[test]
    fn whitespace_only_line_separates_blocks() {
        let doc = parse_sbv(
            "0:00:01.000,0:00:02.000\nfirst\n \t\n0:00:03.000,0:00:04.000\nsecond\n",
        );
        let cues = &doc.tracks[0].cues;
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0], Cue::new(1_000, 2_000, "first"));
        assert_eq!(cues[1], Cue::new(3_000, 4_000, "second"));
    }

    #[test]
    fn malformed_block_is_dropped_not_fatal() {
        let doc = parse_sbv(
            "0:00:01.000,0:00:02.000\nfirst\n\nnot a time\nbroken\n\n0:00:05.000,0:00:06.000\nlast\n",
        );
        let texts: Vec<&str> = doc.tracks[0].cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "last"]);
    }
}
