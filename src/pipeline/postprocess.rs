//! Post-processing: strip Markdown markup from a summary before it is laid
//! out as plain PDF text.
//!
//! The summary body arrives as loosely structured Markdown. The PDF renderer
//! draws plain text only, so emphasis markers, code fences, inline-code
//! backticks and link syntax have to go while the visible words stay.
//!
//! ## Rules
//!
//! [`strip_markup`] applies, in one left-to-right scan:
//!
//! 1. `**bold**` → `bold` (closing marker must be on the same line; an
//!    unmatched `**` is dropped)
//! 2. `*italic*` → `italic` (same line; an unmatched `*` is kept)
//! 3. fenced ```` ``` ```` blocks are removed entirely, across lines
//! 4. `` `code` `` → `code`
//! 5. `[text](url)` → `text`
//! 6. characters outside the Basic Multilingual Plane (emoji) are dropped
//! 7. three or more consecutive newlines collapse to one blank line
//!
//! Headings and list markers are left alone: section detection in the layout
//! stage needs them. [`clean_for_pdf`] is the stricter variant that also
//! flattens headings and drops everything outside ASCII.

use once_cell::sync::Lazy;
use regex::Regex;

/// Remove inline Markdown markup, keeping the visible text.
///
/// Text without `*`, `` ` ``, `[`, astral-plane characters or runs of three
/// newlines is returned unchanged.
pub fn strip_markup(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut scanner = Scanner {
        chars: &chars,
        out: String::with_capacity(input.len()),
        newlines: 0,
    };
    scanner.scan(0, chars.len());
    scanner.out
}

struct Scanner<'a> {
    chars: &'a [char],
    out: String,
    /// Newlines at the end of `out`, for collapsing blank runs.
    newlines: usize,
}

impl Scanner<'_> {
    fn scan(&mut self, start: usize, end: usize) {
        let mut i = start;
        while i < end {
            let c = self.chars[i];
            match c {
                '`' if self.starts_with(i, end, "```") => {
                    match self.find_seq(i + 3, end, "```", false) {
                        Some(close) => i = close + 3,
                        None => {
                            self.emit('`');
                            i += 1;
                        }
                    }
                }
                '`' => match self.find_char(i + 1, end, '`') {
                    Some(close) => {
                        self.scan(i + 1, close);
                        i = close + 1;
                    }
                    None => {
                        self.emit('`');
                        i += 1;
                    }
                },
                '*' if self.starts_with(i, end, "**") => {
                    match self.find_seq(i + 2, end, "**", true) {
                        Some(close) => {
                            self.scan(i + 2, close);
                            i = close + 2;
                        }
                        // An unmatched `**` is an empty italic span.
                        None => i += 2,
                    }
                }
                '*' => match self.find_italic_close(i + 1, end) {
                    Some(close) => {
                        self.scan(i + 1, close);
                        i = close + 1;
                    }
                    None => {
                        self.emit('*');
                        i += 1;
                    }
                },
                '[' => match self.find_link(i + 1, end) {
                    Some((text_end, link_end)) => {
                        self.scan(i + 1, text_end);
                        i = link_end + 1;
                    }
                    None => {
                        self.emit('[');
                        i += 1;
                    }
                },
                _ => {
                    self.emit(c);
                    i += 1;
                }
            }
        }
    }

    fn emit(&mut self, c: char) {
        if u32::from(c) > 0xFFFF {
            return;
        }
        if c == '\n' {
            self.newlines += 1;
            if self.newlines > 2 {
                return;
            }
        } else {
            self.newlines = 0;
        }
        self.out.push(c);
    }

    fn starts_with(&self, at: usize, end: usize, pat: &str) -> bool {
        let n = pat.chars().count();
        at + n <= end && pat.chars().zip(&self.chars[at..at + n]).all(|(a, &b)| a == b)
    }

    /// First occurrence of `pat` at or after `from`; stops at a newline when
    /// `same_line` is set.
    fn find_seq(&self, from: usize, end: usize, pat: &str, same_line: bool) -> Option<usize> {
        (from..end)
            .take_while(|&j| !(same_line && self.chars[j] == '\n'))
            .find(|&j| self.starts_with(j, end, pat))
    }

    fn find_char(&self, from: usize, end: usize, target: char) -> Option<usize> {
        self.chars[from..end]
            .iter()
            .take_while(|&&c| c != '\n')
            .position(|&c| c == target)
            .map(|p| from + p)
    }

    /// Closing `*` of an italic span, stepping over complete `**bold**` pairs.
    fn find_italic_close(&self, from: usize, end: usize) -> Option<usize> {
        let mut j = from;
        while j < end && self.chars[j] != '\n' {
            if self.chars[j] == '*' {
                if self.starts_with(j, end, "**") {
                    if let Some(close) = self.find_seq(j + 2, end, "**", true) {
                        j = close + 2;
                        continue;
                    }
                }
                return Some(j);
            }
            j += 1;
        }
        None
    }

    /// `text](url)` after an opening `[`: returns the index of `]` and `)`.
    fn find_link(&self, from: usize, end: usize) -> Option<(usize, usize)> {
        let mut j = from;
        while j < end && self.chars[j] != '\n' {
            if self.starts_with(j, end, "](") {
                if let Some(close) = self.find_char(j + 2, end, ')') {
                    return Some((j, close));
                }
            }
            j += 1;
        }
        None
    }
}

static RE_HEADING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+[ \t]+(.*)$").unwrap());
static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Stricter plain-text cleaning.
///
/// Headings become plain lines surrounded by blank space, markup is
/// stripped, pictographs (`U+2600..=U+27BF`) and every other non-ASCII
/// character are removed, blank runs collapse and the result is trimmed.
pub fn clean_for_pdf(input: &str) -> String {
    let s = RE_HEADING_LINE.replace_all(input, "\n\n$1\n");
    let s = strip_markup(&s);
    let s: String = s
        .chars()
        .filter(|c| c.is_ascii() && !('\u{2600}'..='\u{27BF}').contains(c))
        .collect();
    RE_BLANK_RUN.replace_all(&s, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_and_italic() {
        assert_eq!(strip_markup("a **bold** and *it* b"), "a bold and it b");
    }

    #[test]
    fn bold_does_not_span_lines() {
        assert_eq!(strip_markup("**open\nclose**"), "open\nclose");
    }

    #[test]
    fn unmatched_single_star_is_kept() {
        assert_eq!(strip_markup("5 * 3 = 15"), "5 * 3 = 15");
    }

    #[test]
    fn italic_around_bold() {
        assert_eq!(strip_markup("*a **b** c*"), "a b c");
    }

    #[test]
    fn fenced_block_removed_across_lines() {
        let input = "before\n```rust\nfn main() {}\n```\nafter";
        assert_eq!(strip_markup(input), "before\n\nafter");
    }

    #[test]
    fn inline_code_keeps_text() {
        assert_eq!(strip_markup("run `cargo doc` now"), "run cargo doc now");
    }

    #[test]
    fn link_keeps_visible_text() {
        assert_eq!(
            strip_markup("see [the docs](https://example.org/x) and [x] (y)"),
            "see the docs and [x] (y)"
        );
    }

    #[test]
    fn astral_characters_dropped() {
        assert_eq!(strip_markup("Great 🎉 video"), "Great  video");
        // BMP symbols survive this pass.
        assert_eq!(strip_markup("• ✓ é"), "• ✓ é");
    }

    #[test]
    fn blank_runs_collapse() {
        assert_eq!(strip_markup("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn plain_text_is_unchanged() {
        let text = "## Overview\n\nThe video covers 3 topics.\n\n• first\n- second\n1. third\n\nThanks!";
        assert_eq!(strip_markup(text), text);
    }

    #[test]
    fn clean_for_pdf_flattens_headings_and_drops_non_ascii() {
        let input = "# Title\nIntro ☀ text é\n\n\n\n## **Key** points\n- a";
        assert_eq!(
            clean_for_pdf(input),
            "Title\n\nIntro  text \n\nKey points\n\n- a"
        );
    }

    #[test]
    fn clean_for_pdf_trims() {
        assert_eq!(clean_for_pdf("\n\n  hello  \n\n"), "hello");
    }
}
