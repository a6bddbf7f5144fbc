use regex::Regex;
use std::sync::OnceLock;

const RTL_EMBEDDING: char = '\u{202B}';
const POP_DIRECTIONAL: char = '\u{202C}';

// Strong left-to-right and right-to-left script ranges of the BMP.
const LTR_CHARS: &str = r"A-Za-z\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{02B8}\x{0300}-\x{0590}\x{0800}-\x{1FFF}\x{2C00}-\x{FB1C}\x{FDFE}-\x{FE6F}\x{FEFD}-\x{FFFF}";
const RTL_CHARS: &str = r"\x{0591}-\x{07FF}\x{FB1D}-\x{FDFD}\x{FE70}-\x{FEFC}";

fn rtl_dir_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("^[^{LTR_CHARS}]*[{RTL_CHARS}]")).expect("valid regex")
    })
}

/// True when the first strongly-directional character is right-to-left.
pub fn is_rtl(text: &str) -> bool {
    rtl_dir_re().is_match(text)
}

/// Wraps right-to-left text in an explicit embedding so players that
/// ignore bidi detection still order it correctly.
pub fn wrap_rtl(text: &str) -> String {
    if is_rtl(text) {
        format!("{RTL_EMBEDDING}{text}{POP_DIRECTIONAL}")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_hebrew_and_arabic() {
        assert!(is_rtl("שלום עולם"));
        assert!(is_rtl("مرحبا"));
        assert!(is_rtl("  - 123 שלום"));
        assert!(!is_rtl("Hello world"));
        assert!(!is_rtl("Hello שלום"));
        assert!(!is_rtl(""));
    }

    #[test]
    fn wraps_only_rtl() {
        assert_eq!(wrap_rtl("שלום"), "\u{202B}שלום\u{202C}");
        assert_eq!(wrap_rtl("Hello"), "Hello");
    }
}
