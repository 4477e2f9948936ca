//! Pagination: place a summary's title, metadata line and body sections on
//! fixed-size pages.
//!
//! Layout produces a [`LayoutDocument`], a list of positioned text lines and
//! rules per page. Nothing here knows about PDF syntax; [`super::pdf`]
//! serialises the result. Keeping the two apart lets pagination be tested by
//! inspecting elements instead of parsing PDF bytes.
//!
//! All coordinates are millimetres from the top-left corner. Text `y` is the
//! baseline.

use crate::config::{PdfLayout, SummaryMode};
use crate::event::{source_description, SummaryDocument, SummarySource};
use crate::pipeline::postprocess::strip_markup;
use crate::render::metrics::{text_width, wrap_text, Font};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

// ── Typography ───────────────────────────────────────────────────────────

const TITLE: TextStyle = TextStyle::new(Font::HelveticaBold, 20.0, 40);
const METADATA: TextStyle = TextStyle::new(Font::Helvetica, 10.0, 100);
const HEADING: TextStyle = TextStyle::new(Font::HelveticaBold, 14.0, 50);
const BODY: TextStyle = TextStyle::new(Font::Helvetica, 11.0, 50);
const FOOTER: TextStyle = TextStyle::new(Font::Helvetica, 9.0, 150);

const TITLE_RULE_GRAY: u8 = 200;
const DIVIDER_GRAY: u8 = 220;
const TITLE_RULE_OFFSET: f32 = 2.0;
const TITLE_GAP: f32 = 12.0;
const HEADING_GAP: f32 = 4.0;
const ITEM_GAP: f32 = 2.0;
const LIST_GAP: f32 = 2.0;

/// Font, size (pt) and gray level (0 = black, 255 = white) of a text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub gray: u8,
}

impl TextStyle {
    pub const fn new(font: Font, size: f32, gray: u8) -> Self {
        Self { font, size, gray }
    }
}

/// One positioned drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A single line of text with its baseline at `y`.
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
    /// A horizontal hairline from `x1` to `x2`.
    Rule { x1: f32, x2: f32, y: f32, gray: u8 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPage {
    pub elements: Vec<Element>,
}

impl LayoutPage {
    /// Text of every line on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            Element::Rule { .. } => None,
        })
    }
}

/// Paginated document, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<LayoutPage>,
}

/// Context printed in the metadata line.
#[derive(Debug, Clone)]
pub struct RenderMeta {
    /// Display name of the summary language, e.g. `"English"`.
    pub language_name: String,
    pub source: Option<SummarySource>,
    /// Decides the fallback title when the document has none.
    pub mode: SummaryMode,
    pub generated_at: DateTime<Local>,
}

impl RenderMeta {
    /// `Language: … • Source: … • Generated: …`
    pub fn line(&self) -> String {
        format!(
            "Language: {} • Source: {} • Generated: {}",
            self.language_name,
            source_description(self.source),
            self.generated_at.format("%b %-d, %Y, %I:%M %p")
        )
    }
}

/// What a body section renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// `## ` heading, markers stripped.
    Heading(String),
    /// List items with markers normalised to `•`.
    List(Vec<String>),
    Paragraph(String),
}

static RE_SECTION_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static RE_HEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s*").unwrap());
static RE_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());
static RE_BULLET_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-]\s+").unwrap());

/// Split an already-cleaned body into sections at blank lines.
///
/// Whitespace-only sections are dropped. Heading detection runs before list
/// detection.
pub fn split_sections(body: &str) -> Vec<Section> {
    RE_SECTION_BREAK
        .split(body)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(classify)
        .collect()
}

fn classify(section: &str) -> Section {
    if section.starts_with("## ") {
        return Section::Heading(RE_HEADING_MARKER.replace(section, "").into_owned());
    }
    if section.starts_with("• ") || section.starts_with("- ") || RE_NUMBERED.is_match(section) {
        let items = section
            .split('\n')
            .map(|item| {
                let item = RE_BULLET_MARKER.replace(item, "• ");
                let item = RE_NUMBERED.replace(&item, "•").into_owned();
                item
            })
            .collect();
        return Section::List(items);
    }
    Section::Paragraph(section.to_string())
}

/// Vertical write position, owned by one layout call.
struct Cursor<'a> {
    layout: &'a PdfLayout,
    pages: Vec<LayoutPage>,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn new(layout: &'a PdfLayout) -> Self {
        Self {
            layout,
            pages: vec![LayoutPage::default()],
            y: layout.margin,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(LayoutPage::default());
        self.y = self.layout.margin;
        debug!("page break → page {}", self.pages.len());
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.layout.margin
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    /// Draw `lines` at `x` starting on the cursor line and advance past them.
    ///
    /// The whole block moves to a fresh page when it does not fit below the
    /// cursor. A block taller than an empty page is continued line by line.
    fn block(&mut self, lines: Vec<String>, x: f32, style: TextStyle) {
        let lh = self.layout.line_height;
        let bottom = self.layout.bottom_limit();
        let height = lines.len() as f32 * lh;

        if self.y + height > bottom && !self.at_page_top() {
            self.new_page();
        }
        let split = self.y + height > bottom;

        for text in lines {
            if split && self.y + lh > bottom && !self.at_page_top() {
                self.new_page();
            }
            let y = self.y;
            self.push(Element::Text { x, y, text, style });
            self.y += lh;
        }
    }

    fn advance(&mut self, by: f32) {
        self.y += by;
    }
}

/// Title drawn at the top of the PDF and used for its file name: the
/// document's own title, or the mode's default when it is blank.
pub fn display_title<'a>(document: &'a SummaryDocument, mode: SummaryMode) -> &'a str {
    if document.title.trim().is_empty() {
        mode.default_title()
    } else {
        document.title.as_str()
    }
}

/// Lay out a summary document.
///
/// The body is cleaned with [`strip_markup`] first; callers pass the raw
/// summary text.
pub fn layout_document(
    document: &SummaryDocument,
    meta: &RenderMeta,
    layout: &PdfLayout,
) -> LayoutDocument {
    let margin = layout.margin;
    let width = layout.content_width();
    let mut cursor = Cursor::new(layout);

    // ── Title ────────────────────────────────────────────────────────────
    let title = display_title(document, meta.mode);
    let title_lines = wrap_text(title, TITLE.font, TITLE.size, width);
    let title_width = text_width(&title_lines.join(" "), TITLE.font, TITLE.size).min(width);
    let title_top = cursor.y;
    let title_count = title_lines.len();
    cursor.block(title_lines, margin, TITLE);
    cursor.push(Element::Rule {
        x1: margin,
        x2: margin + title_width,
        y: title_top + TITLE_RULE_OFFSET,
        gray: TITLE_RULE_GRAY,
    });
    cursor.y = title_top + title_count as f32 * layout.line_height + TITLE_GAP;

    // ── Metadata ─────────────────────────────────────────────────────────
    cursor.block(vec![meta.line()], margin, METADATA);
    cursor.advance(layout.line_height);
    cursor.push(Element::Rule {
        x1: margin,
        x2: layout.page_width - margin,
        y: cursor.y,
        gray: DIVIDER_GRAY,
    });
    cursor.advance(2.0 * layout.line_height);

    // ── Body ─────────────────────────────────────────────────────────────
    let body = strip_markup(&document.content);
    for section in split_sections(&body) {
        match section {
            Section::Heading(text) => {
                let lines = wrap_text(&text, HEADING.font, HEADING.size, width);
                cursor.block(lines, margin, HEADING);
                cursor.advance(HEADING_GAP);
            }
            Section::List(items) => {
                let indent = layout.bullet_indent;
                for item in items {
                    let lines = wrap_text(&item, BODY.font, BODY.size, width - indent);
                    cursor.block(lines, margin + indent, BODY);
                    cursor.advance(ITEM_GAP);
                }
                cursor.advance(LIST_GAP);
            }
            Section::Paragraph(text) => {
                let lines = wrap_text(&text, BODY.font, BODY.size, width);
                cursor.block(lines, margin, BODY);
                cursor.advance(layout.paragraph_spacing);
            }
        }
    }

    let mut pages = cursor.pages;
    stamp_footers(&mut pages, layout);

    LayoutDocument {
        page_width: layout.page_width,
        page_height: layout.page_height,
        pages,
    }
}

/// Add `<attribution> • Page N of M` to every page.
fn stamp_footers(pages: &mut [LayoutPage], layout: &PdfLayout) {
    let total = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        page.elements.push(Element::Text {
            x: layout.margin,
            y: layout.page_height - layout.footer_offset,
            text: format!("{} • Page {} of {}", layout.attribution, i + 1, total),
            style: FOOTER,
        });
    }
}
