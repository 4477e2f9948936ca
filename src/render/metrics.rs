//! Font metrics and text encoding for the standard Helvetica faces.
//!
//! The PDF uses the base-14 Type1 fonts with `WinAnsiEncoding`, so no font
//! program is embedded. Wrapping needs advance widths, which are taken from
//! the Adobe AFM files (units per 1000 em). Characters that `WinAnsiEncoding`
//! cannot represent are dropped on encode and measure as zero width, so what
//! is measured is exactly what is drawn.

/// One of the two faces the renderer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// PostScript name for the font dictionary.
    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Name under which the font is registered in page resources.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    fn ascii_widths(self) -> &'static [u16; 95] {
        match self {
            Font::Helvetica => &HELVETICA,
            Font::HelveticaBold => &HELVETICA_BOLD,
        }
    }
}

/// Advance widths for `' '..='~'`.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Byte for `c` in `WinAnsiEncoding`, if it has one.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{A0}'..='\u{FF}' => Some(c as u32 as u8),
        '€' => Some(0x80),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        _ => None,
    }
}

/// Encode `text` for a `Tj` operand, dropping unrepresentable characters.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().filter_map(win_ansi_byte).collect()
}

fn char_units(font: Font, c: char) -> u32 {
    let bold = font == Font::HelveticaBold;
    match c {
        ' '..='~' => u32::from(font.ascii_widths()[(c as usize) - 0x20]),
        '•' => 350,
        '–' => 556,
        '—' | '…' => 1000,
        '‘' | '’' => {
            if bold {
                278
            } else {
                222
            }
        }
        '“' | '”' => {
            if bold {
                500
            } else {
                333
            }
        }
        // Latin-1 letters and symbols: close to the average lowercase advance.
        _ if win_ansi_byte(c).is_some() => 556,
        _ => 0,
    }
}

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Width of `text` in millimetres at `size` points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_units(font, c)).sum();
    units as f32 / 1000.0 * size * MM_PER_PT
}

/// Greedy word wrap to `max_width` millimetres.
///
/// Explicit `\n` always starts a new line (an empty input line stays an
/// empty output line). Words wider than a whole line are split by character.
/// Always returns at least one line.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let space = text_width(" ", font, size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0.0f32;

        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let word_width = text_width(word, font, size);

            if !line.is_empty() && line_width + space + word_width <= max_width {
                line.push(' ');
                line.push_str(word);
                line_width += space + word_width;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            if word_width <= max_width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }

            // Over-long word: hard-break by character.
            for c in word.chars() {
                let w = text_width(c.encode_utf8(&mut [0; 4]), font, size);
                if !line.is_empty() && line_width + w > max_width {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0.0;
                }
                line.push(c);
                line_width += w;
            }
        }
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_size() {
        let a = text_width("Hello", Font::Helvetica, 10.0);
        let b = text_width("Hello", Font::Helvetica, 20.0);
        assert!((b - 2.0 * a).abs() < 1e-4);
    }

    #[test]
    fn bold_is_wider() {
        assert!(
            text_width("summary", Font::HelveticaBold, 11.0)
                > text_width("summary", Font::Helvetica, 11.0)
        );
    }

    #[test]
    fn known_width() {
        // "Hi" = H(722) + i(222) = 944 units; at 72pt 1000 units = 25.4mm.
        let w = text_width("Hi", Font::Helvetica, 72.0);
        assert!((w - 0.944 * 25.4).abs() < 1e-3);
    }

    #[test]
    fn wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(10);
        let lines = wrap_text(&text, Font::Helvetica, 11.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Helvetica, 11.0) <= 60.0 + 1e-3, "{line}");
        }
        assert_eq!(lines.join(" ").split_whitespace().count(), 90);
    }

    #[test]
    fn wrap_keeps_explicit_newlines() {
        let lines = wrap_text("a\n\nb", Font::Helvetica, 11.0, 100.0);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn wrap_breaks_long_words() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, Font::Helvetica, 11.0, 30.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("", Font::Helvetica, 11.0, 100.0), vec![String::new()]);
    }

    #[test]
    fn win_ansi_drops_unencodable() {
        assert_eq!(encode_win_ansi("a•b✓é"), vec![b'a', 0x95, b'b', 0xE9]);
        assert_eq!(text_width("✓", Font::Helvetica, 11.0), 0.0);
    }
}
