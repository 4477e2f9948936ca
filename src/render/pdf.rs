//! PDF serialisation of a [`LayoutDocument`] with `lopdf`.
//!
//! Each page gets one content stream. Text is drawn with the base-14
//! Helvetica faces (`WinAnsiEncoding`, nothing embedded), rules as 0.2 mm
//! stroked lines. Layout coordinates are millimetres from the top edge; PDF
//! user space is points from the bottom edge, so every y is flipped.

use crate::error::DigestError;
use crate::render::layout::{Element, LayoutDocument, LayoutPage};
use crate::render::metrics::{encode_win_ansi, Font};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

const PT_PER_MM: f32 = 72.0 / 25.4;
const RULE_WIDTH_MM: f32 = 0.2;

fn pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

fn gray(level: u8) -> Object {
    (f32::from(level) / 255.0).into()
}

fn page_operations(page: &LayoutPage, page_height: f32) -> Vec<Operation> {
    let mut ops = Vec::new();
    for element in &page.elements {
        match element {
            Element::Text { x, y, text, style } => {
                let bytes = encode_win_ansi(text);
                if bytes.is_empty() {
                    continue;
                }
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![style.font.resource_name().into(), style.size.into()],
                ));
                ops.push(Operation::new("g", vec![gray(style.gray)]));
                ops.push(Operation::new(
                    "Td",
                    vec![pt(*x).into(), pt(page_height - y).into()],
                ));
                ops.push(Operation::new("Tj", vec![Object::string_literal(bytes)]));
                ops.push(Operation::new("ET", vec![]));
            }
            Element::Rule { x1, x2, y, gray: level } => {
                let y = pt(page_height - y);
                ops.push(Operation::new("G", vec![gray(*level)]));
                ops.push(Operation::new("w", vec![pt(RULE_WIDTH_MM).into()]));
                ops.push(Operation::new("m", vec![pt(*x1).into(), y.into()]));
                ops.push(Operation::new("l", vec![pt(*x2).into(), y.into()]));
                ops.push(Operation::new("S", vec![]));
            }
        }
    }
    ops
}

fn font_object(font: Font) -> Object {
    Object::Dictionary(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Serialise `layout` to PDF bytes.
///
/// `compress` flate-compresses the content streams.
pub fn write_pdf(layout: &LayoutDocument, compress: bool) -> Result<Vec<u8>, DigestError> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let regular_id = doc.add_object(font_object(Font::Helvetica));
    let bold_id = doc.add_object(font_object(Font::HelveticaBold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Helvetica.resource_name() => regular_id,
            Font::HelveticaBold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page_operations(page, layout.page_height),
        };
        let encoded = content
            .encode()
            .map_err(|e| DigestError::PdfGenerationFailed(format!("content stream: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::from(pt(layout.page_width)),
                Object::from(pt(layout.page_height)),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if compress {
        doc.compress();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| DigestError::PdfGenerationFailed(format!("serialise: {e}")))?;
    debug!("wrote {} pages, {} bytes", page_count, bytes.len());
    Ok(bytes)
}
