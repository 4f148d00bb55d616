use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// A `#rgb` or `#rrggbb` color, stored lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor(String);

fn strict_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("valid regex"))
}

fn embedded_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#([a-f0-9]{6}|[a-f0-9]{3})").expect("valid regex"))
}

fn bare_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([a-f0-9]{6}|[a-f0-9]{3})$").expect("valid regex"))
}

impl HexColor {
    pub const FALLBACK: &'static str = "#000000";

    /// Strict parse: a `#` followed by exactly 3 or 6 hex digits
    pub fn parse(input: &str) -> Option<Self> {
        if strict_pattern().is_match(input) {
            Some(Self(input.to_lowercase()))
        } else {
            None
        }
    }

    pub fn fallback() -> Self {
        Self(Self::FALLBACK.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green, blue components, expanding the short form
    pub fn rgb(&self) -> (u8, u8, u8) {
        let digits = &self.0[1..];
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        if digits.len() == 3 {
            let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
            (expand(0), expand(1), expand(2))
        } else {
            (channel(&digits[0..2]), channel(&digits[2..4]), channel(&digits[4..6]))
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pull a hex color out of a free-form model response.
///
/// The first `#`-prefixed 6 or 3 digit token anywhere in the text wins. A
/// response made of nothing but 3 or 6 hex digits gets a `#` added.
pub fn sanitize_color_response(response: &str) -> Option<HexColor> {
    let cleaned = response.trim().to_lowercase();

    if let Some(m) = embedded_pattern().find(&cleaned) {
        return Some(HexColor(m.as_str().to_string()));
    }

    if bare_pattern().is_match(&cleaned) {
        return Some(HexColor(format!("#{}", cleaned)));
    }

    None
}

/// What the user typed into a color field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorInput {
    /// A literal hex value, applied without asking the model
    Literal(HexColor),
    /// A description to be interpreted by the color model
    Describe(String),
}

impl ColorInput {
    pub fn classify(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match HexColor::parse(trimmed) {
            Some(color) => ColorInput::Literal(color),
            None => ColorInput::Describe(trimmed.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse_accepts() {
        assert_eq!(HexColor::parse("#abc").unwrap().as_str(), "#abc");
        assert_eq!(HexColor::parse("#ABCDEF").unwrap().as_str(), "#abcdef");
    }

    #[test]
    fn test_strict_parse_rejects() {
        assert!(HexColor::parse("abc123").is_none());
        assert!(HexColor::parse("#ggg").is_none());
        assert!(HexColor::parse("#12").is_none());
        assert!(HexColor::parse("#abcd").is_none());
        assert!(HexColor::parse(" #abc").is_none());
    }

    #[test]
    fn test_sanitize_embedded_token() {
        let color = sanitize_color_response("I'd say #1a2b3c works").unwrap();
        assert_eq!(color.as_str(), "#1a2b3c");
    }

    #[test]
    fn test_sanitize_bare_digits_gets_hash() {
        let color = sanitize_color_response("1A2B3C").unwrap();
        assert_eq!(color.as_str(), "#1a2b3c");
        assert_eq!(sanitize_color_response(" fff\n").unwrap().as_str(), "#fff");
    }

    #[test]
    fn test_sanitize_nothing_found() {
        assert!(sanitize_color_response("a deep ocean blue").is_none());
        assert!(sanitize_color_response("").is_none());
        assert_eq!(HexColor::fallback().as_str(), "#000000");
    }

    #[test]
    fn test_rgb_components() {
        assert_eq!(HexColor::parse("#ff3b5b").unwrap().rgb(), (255, 59, 91));
        assert_eq!(HexColor::parse("#fa0").unwrap().rgb(), (255, 170, 0));
    }

    #[test]
    fn test_classify_input() {
        assert_eq!(ColorInput::classify("  "), None);
        assert_eq!(
            ColorInput::classify("#FFF"),
            Some(ColorInput::Literal(HexColor::parse("#fff").unwrap()))
        );
        assert_eq!(
            ColorInput::classify(" sunset orange "),
            Some(ColorInput::Describe("sunset orange".to_string()))
        );
    }
}
