use regex::Regex;
use std::sync::OnceLock;

pub fn format_srt_timestamp(ms: i64) -> String {
    format_timestamp(ms, ',')
}

/// `HH:MM:SS.mmm`, the format the editor fields display.
pub fn format_editor_timestamp(ms: i64) -> String {
    format_timestamp(ms, '.')
}

fn format_timestamp(ms_in: i64, ms_sep: char) -> String {
    let ms = ms_in.max(0);

    let total_seconds = ms / 1000;
    let milli = ms % 1000;

    let sec = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let min = total_minutes % 60;
    let hour = total_minutes / 60;

    format!("{hour:02}:{min:02}:{sec:02}{ms_sep}{milli:03}")
}

/// Parses an `H:MM:SS.mmm` clock (also accepts `,` before the
/// milliseconds). Fractions shorter than three digits are right-padded.
pub fn parse_clock_to_ms(s: &str) -> Option<i64> {
    let t = s.trim();

    let (hms, milli) = match t.split_once([',', '.']) {
        Some((a, b)) => (a, Some(b)),
        None => (t, None),
    };

    let mut parts = hms.split(':');
    let h: i64 = parts.next()?.parse().ok()?;
    let m: i64 = parts.next()?.parse().ok()?;
    let s2: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || m >= 60 || s2 >= 60 {
        return None;
    }

    let mut ms = ((h * 60 + m) * 60 + s2) * 1000;

    if let Some(frac) = milli {
        let mut frac_s = frac.trim().to_string();
        if frac_s.is_empty() || !frac_s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        frac_s.truncate(3);
        while frac_s.len() < 3 {
            frac_s.push('0');
        }
        ms += frac_s.parse::<i64>().ok()?;
    }

    Some(ms)
}

fn editor_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})(?:[.,](\d{1,3}))?$").expect("valid regex")
    })
}

/// Parses the masked editor input (`HH:mm:ss.SSS`). Unfilled mask
/// positions arrive as `_` and count as `0`.
pub fn parse_editor_time(input: &str) -> Option<i64> {
    let filled = input.trim().replace('_', "0");
    if !editor_time_re().is_match(&filled) {
        return None;
    }
    parse_clock_to_ms(&filled)
}
