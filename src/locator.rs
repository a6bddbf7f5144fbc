use crate::model::Cue;

/// Index of the cue that covers `time_ms`, or of the closest upcoming one.
///
/// `cues` must be sorted by start. Cues of one track may overlap, so after
/// the binary search the index moves back to the earliest earlier cue that
/// has not ended yet, even when shorter cues in between are already over.
/// The result is the earliest cue a forward scan must consider.
/// Out-of-range times clamp to the last index, and an empty slice gives 0.
pub fn find_closest_caption(cues: &[Cue], time_ms: i64) -> usize {
    if cues.is_empty() {
        return 0;
    }

    let mut lo = 0;
    let mut hi = cues.len();
    let mut found = None;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let cue = &cues[mid];
        if time_ms < cue.start_ms {
            hi = mid;
        } else if time_ms > cue.end_ms {
            lo = mid + 1;
        } else {
            found = Some(mid);
            break;
        }
    }

    let index = found.unwrap_or(lo).min(cues.len() - 1);
    cues[..index]
        .iter()
        .position(|c| c.end_ms >= time_ms)
        .unwrap_or(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cues(ranges: &[(i64, i64)]) -> Vec<Cue> {
        ranges.iter().map(|&(s, e)| Cue::new(s, e, "")).collect()
    }

    #[test]
    fn finds_containing_cue() {
        let track = cues(&[(0, 999), (1_000, 1_999), (2_000, 2_999)]);
        assert_eq!(find_closest_caption(&track, 1_500), 1);
        assert_eq!(find_closest_caption(&track, 0), 0);
        assert_eq!(find_closest_caption(&track, 2_999), 2);
    }

    #[test]
    fn past_the_end_clamps_to_last() {
        let track = cues(&[(0, 999), (1_000, 1_999), (2_000, 2_999)]);
        assert_eq!(find_closest_caption(&track, 50_000), 2);
    }

    #[test]
    fn gap_selects_upcoming_cue() {
        let track = cues(&[(0, 999), (3_000, 3_999), (5_000, 5_999)]);
        assert_eq!(find_closest_caption(&track, 1_500), 1);
        assert_eq!(find_closest_caption(&track, 4_500), 2);
    }

    #[test]
    fn overlap_walks_back_to_earliest() {
        let track = cues(&[(0, 2_000), (1_000, 1_500)]);
        assert_eq!(find_closest_caption(&track, 1_200), 0);

        let chain = cues(&[(0, 3_000), (1_000, 2_500), (2_000, 2_200)]);
        assert_eq!(find_closest_caption(&chain, 2_100), 0);
    }

    #[test]
    fn long_cue_behind_finished_short_one() {
        let track = cues(&[(0, 5_000), (1_000, 1_100), (2_000, 2_500)]);
        assert_eq!(find_closest_caption(&track, 2_200), 0);
        assert_eq!(find_closest_caption(&track, 1_050), 0);
    }

    #[test]
    fn empty_track() {
        assert_eq!(find_closest_caption(&[], 100), 0);
    }
}
