//! Glyph metrics for the two standard faces the report uses, and word wrapping.

use serde::{Deserialize, Serialize};

const MM_PER_PT: f64 = 25.4 / 72.0;

/// Advance widths (1/1000 em) for ASCII 32..=126, Helvetica.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // a-z
    334, 260, 334, 584, // {..~
];

/// Same range, Helvetica-Bold.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Size in points.
    pub size: f64,
    pub bold: bool,
}

impl Font {
    pub const fn regular(size: f64) -> Self {
        Self { size, bold: false }
    }

    pub const fn bold(size: f64) -> Self {
        Self { size, bold: true }
    }

    fn glyph_units(&self, c: char) -> u16 {
        let table = if self.bold { &HELVETICA_BOLD } else { &HELVETICA };
        match c as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            // '?' is what the serializer emits for anything else
            _ => table[('?' as u32 - 32) as usize],
        }
    }

    /// Rendered width of `text` in millimetres.
    pub fn text_width(&self, text: &str) -> f64 {
        let units: u32 = text.chars().map(|c| self.glyph_units(c) as u32).sum();
        units as f64 / 1000.0 * self.size * MM_PER_PT
    }
}

fn split_long_word(word: &str, font: &Font, max_width: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if font.text_width(&current) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy word wrap. Explicit newlines are kept; a word wider than the line is cut.
/// Always returns at least one (possibly empty) line.
pub fn wrap_text(text: &str, font: &Font, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };

            if font.text_width(&candidate) <= max_width {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }

            if font.text_width(word) <= max_width {
                line = word.to_string();
            } else {
                let mut pieces = split_long_word(word, font, max_width);
                if let Some(last) = pieces.pop() {
                    lines.extend(pieces);
                    line = last;
                }
            }
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_scales_with_size() {
        let small = Font::regular(10.0).text_width("Hello");
        let large = Font::regular(20.0).text_width("Hello");
        assert!((large - 2.0 * small).abs() < 1e-9);
    }

    #[test]
    fn test_bold_is_wider() {
        let text = "Structure du projet";
        assert!(Font::bold(12.0).text_width(text) > Font::regular(12.0).text_width(text));
    }

    #[test]
    fn test_known_width() {
        // "A" = 667 units at 72pt is 0.667in
        let w = Font::regular(72.0).text_width("A");
        assert!((w - 0.667 * 25.4).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_respects_width() {
        let font = Font::regular(11.0);
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";
        let lines = wrap_text(text, &font, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(font.text_width(line) <= 60.0, "too wide: {}", line);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_cuts_long_words() {
        let font = Font::regular(11.0);
        let word = "x".repeat(200);
        let lines = wrap_text(&word, &font, 30.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_keeps_newlines_and_empty() {
        let font = Font::regular(11.0);
        assert_eq!(wrap_text("a\nb", &font, 100.0), vec!["a", "b"]);
        assert_eq!(wrap_text("", &font, 100.0), vec![""]);
    }
}
