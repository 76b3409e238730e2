use pdf_writer::{Content, Name, Str};
use strum_macros::EnumIter;

/// A4 portrait, in millimetres
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;

/// Courier glyphs all advance 600/1000 of the font size
const COURIER_ADVANCE: f32 = 0.6;

pub fn pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

fn mm(pt: f32) -> f32 {
    pt * 25.4 / 72.0
}

/// The standard fonts the invoice is set in. None of them are embedded.
#[derive(EnumIter, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Font {
    Heading,
    Regular,
    Bold,
    Italic,
}

impl Font {
    /// Name of the font in page resources
    pub fn resource(self) -> Name<'static> {
        match self {
            Font::Heading => Name(b"F0"),
            Font::Regular => Name(b"F1"),
            Font::Bold => Name(b"F2"),
            Font::Italic => Name(b"F3"),
        }
    }

    pub fn base_font(self) -> Name<'static> {
        match self {
            Font::Heading => Name(b"Helvetica-Bold"),
            Font::Regular => Name(b"Courier"),
            Font::Bold => Name(b"Courier-Bold"),
            Font::Italic => Name(b"Courier-Oblique"),
        }
    }
}

/// Width in mm of text set in one of the Courier faces
pub fn text_width(text: &str, size: f32) -> f32 {
    mm(text.chars().count() as f32 * COURIER_ADVANCE * size)
}

/// Break text into lines no wider than `width` mm, splitting on spaces and
/// hard splitting words that would not fit on a line of their own
pub fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let per_line = ((width / mm(COURIER_ADVANCE * size)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        let line_len = line.chars().count();

        if line_len > 0 && line_len + 1 + word.len() <= per_line {
            line.push(' ');
            line.extend(word);
            continue;
        }
        if line_len > 0 {
            lines.push(std::mem::take(&mut line));
        }
        while word.len() > per_line {
            let rest = word.split_off(per_line);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        line.extend(word);
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Encode text for the WinAnsi encoded standard fonts. Characters outside
/// the encoding become '?'.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Content of one page, drawn with millimetre coordinates measured from
/// the top left corner
pub struct Canvas {
    content: Content,
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            content: Content::new(),
        }
    }

    /// `y` is the baseline
    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, text: &str) {
        self.content
            .begin_text()
            .set_font(font.resource(), size)
            .next_line(pt(x), pt(PAGE_HEIGHT - y))
            .show(Str(&win_ansi(text)))
            .end_text();
    }

    /// Text ending at `right`. Only measures the Courier faces.
    pub fn text_right(&mut self, right: f32, y: f32, font: Font, size: f32, text: &str) {
        debug_assert!(font != Font::Heading);
        self.text(right - text_width(text, size), y, font, size, text);
    }

    pub fn fill_grey(&mut self, grey: f32) {
        self.content.set_fill_gray(grey);
    }

    pub fn line_width(&mut self, width: f32) {
        self.content.set_line_width(pt(width));
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.content
            .rect(pt(x), pt(PAGE_HEIGHT - y - height), pt(width), pt(height))
            .stroke();
    }

    /// Place an image XObject with its top left corner at `x`, `y`
    pub fn image(&mut self, name: Name, x: f32, y: f32, width: f32, height: f32) {
        self.content
            .save_state()
            .transform([
                pt(width),
                0.0,
                0.0,
                pt(height),
                pt(x),
                pt(PAGE_HEIGHT - y - height),
            ])
            .x_object(name)
            .restore_state();
    }

    pub fn finish(self) -> Vec<u8> {
        self.content.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_width() {
        // 10 characters at 10pt is 60pt
        assert!((text_width("0123456789", 10.0) - mm(60.0)).abs() < 1e-4);
        assert_eq!(text_width("", 10.0), 0.0);
    }

    #[test]
    fn wraps_on_spaces() {
        // 10pt Courier fits 10 characters in 21.2mm
        let lines = wrap("alpha beta gamma delta", 21.2, 10.0);
        assert_eq!(lines, ["alpha beta", "gamma", "delta"]);
    }

    #[test]
    fn splits_long_words() {
        let lines = wrap("abcdefghijklmnopqrstuvwxy z", 21.2, 10.0);
        assert_eq!(lines, ["abcdefghij", "klmnopqrst", "uvwxy z"]);
    }

    #[test]
    fn empty_text_is_one_line() {
        assert_eq!(wrap("", 50.0, 10.0), [""]);
        assert_eq!(wrap("   ", 50.0, 10.0), [""]);
    }

    #[test]
    fn encodes_win_ansi() {
        assert_eq!(win_ansi("a \u{2022} b"), b"a \x95 b");
        assert_eq!(win_ansi("caf\u{e9}"), b"caf\xe9");
        assert_eq!(win_ansi("\u{4e2d}"), b"?");
    }

    #[test]
    fn places_text() {
        let mut canvas = Canvas::new();
        canvas.text(10.0, 20.0, Font::Bold, 12.0, "Total (due)");
        let content = String::from_utf8_lossy(&canvas.finish()).to_string();
        assert!(content.contains("/F2 12 Tf"));
        assert!(content.contains("(Total (due)) Tj"));
    }

    #[test]
    fn escapes_unbalanced_parentheses() {
        let mut canvas = Canvas::new();
        canvas.text(10.0, 20.0, Font::Regular, 10.0, "Rate (draft");
        canvas.text(10.0, 30.0, Font::Regular, 10.0, "draft) rate");
        let content = String::from_utf8_lossy(&canvas.finish()).to_string();
        assert!(content.contains("(Rate \\(draft) Tj"));
        assert!(content.contains("(draft\\) rate) Tj"));
    }
}
