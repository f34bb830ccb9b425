//! Positioned text tokens and the lines they are grouped into.

use serde::{Deserialize, Serialize};

/// A text fragment with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Decoded text of the fragment.
    #[serde(alias = "str")]
    pub text: String,

    /// Horizontal position of the left edge.
    pub x: f64,

    /// Vertical position of the baseline.
    pub y: f64,

    /// Rendered width, zero when the extractor does not report it.
    #[serde(default)]
    pub width: f64,
}

impl Token {
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
        }
    }

    /// Whether the token carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether both coordinates are usable numbers.
    pub fn has_finite_position(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Tokens sharing a vertical band, ordered left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    /// Vertical position of the first token of the line.
    pub y: f64,

    /// Tokens ordered by `x`.
    pub tokens: Vec<Token>,
}

impl Line {
    pub fn new(tokens: Vec<Token>) -> Self {
        let y = tokens.first().map(|t| t.y).unwrap_or_default();
        let mut line = Self { y, tokens };
        line.sort_by_x();
        line
    }

    /// Stable sort of the tokens by horizontal position.
    pub fn sort_by_x(&mut self) {
        self.tokens.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    /// Tokens with visible text.
    pub fn words(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.is_blank())
    }

    /// Number of tokens with visible text.
    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    pub fn is_empty(&self) -> bool {
        self.word_count() == 0
    }

    /// Space-joined text of the line.
    pub fn text(&self) -> String {
        self.text_where(|_| true)
    }

    /// Text of the line joined without separators.
    ///
    /// Some extractors emit every glyph run as its own token and drop the
    /// spaces in between; this form lets the row patterns see them anyway.
    pub fn compact_text(&self) -> String {
        self.words().map(|t| t.text.trim()).collect()
    }

    /// Space-joined text of the tokens accepted by `keep`.
    pub fn text_where(&self, keep: impl Fn(&Token) -> bool) -> String {
        self.words()
            .filter(|t| keep(t))
            .map(|t| t.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Case-insensitive containment test on the line text.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.text().to_lowercase().contains(&needle.to_lowercase())
    }

    /// First token whose text contains `needle`, ignoring case.
    pub fn find_token(&self, needle: &str) -> Option<&Token> {
        let needle = needle.to_lowercase();
        self.words().find(|t| t.text.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_orders_tokens_by_x() {
        let line = Line::new(vec![
            Token::new("B", 200.0, 10.0, 5.0),
            Token::new("A", 50.0, 11.0, 5.0),
        ]);

        assert_eq!(line.text(), "A B");
        assert_eq!(line.y, 10.0);
    }

    #[test]
    fn test_blank_tokens_are_ignored_in_text() {
        let line = Line::new(vec![
            Token::new("5023", 10.0, 0.0, 20.0),
            Token::new("  ", 30.0, 0.0, 2.0),
            Token::new("3/06/25", 40.0, 0.0, 30.0),
        ]);

        assert_eq!(line.word_count(), 2);
        assert_eq!(line.text(), "5023 3/06/25");
        assert_eq!(line.compact_text(), "50233/06/25");
    }

    #[test]
    fn test_token_accepts_str_field_name() {
        let token: Token = serde_json::from_str(r#"{"str": "VIA ROMA", "x": 1.5, "y": 2.0}"#).unwrap();

        assert_eq!(token.text, "VIA ROMA");
        assert_eq!(token.width, 0.0);
    }

    #[test]
    fn test_find_token_ignores_case() {
        let line = Line::new(vec![
            Token::new("Cliente", 20.0, 0.0, 30.0),
            Token::new("Luogo di consegna", 300.0, 0.0, 80.0),
        ]);

        let token = line.find_token("LUOGO").unwrap();
        assert_eq!(token.x, 300.0);
        assert!(line.contains_ignore_case("luogo di CONSEGNA"));
    }
}
