//! Report to PDF rendering.
//!
//! The report is laid out as one flowing block of wrapped lines on A4 pages.
//! A TrueType font is embedded when it can be loaded; otherwise the built-in
//! Helvetica is used and the text is reduced to ASCII first.

use std::path::Path;

use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, ObjectId, Stream,
};
use unicode_normalization::UnicodeNormalization;

mod fonts;

use fonts::{Helvetica, TextFont, UnicodeFont};

pub const DEFAULT_FONT_PATH: &str = "DejaVuSans.ttf";

const MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 10.0 * MM;
const BREAK_MARGIN: f32 = 15.0 * MM;
const CELL_PADDING: f32 = 1.0 * MM;
const LINE_HEIGHT: f32 = 10.0 * MM;
const FONT_SIZE: f32 = 12.0;
const TAB: &str = "    ";

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("No report content provided.")]
    EmptyReport,
    #[error("font could not be parsed: {0}")]
    Font(#[from] ttf_parser::FaceParsingError),
    #[error("PDF assembly failed: {0}")]
    Lopdf(#[from] lopdf::Error),
    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders `report` to PDF bytes, embedding the font at `font_path` if possible.
pub fn render_pdf(report: &str, font_path: &Path) -> Result<Vec<u8>, PdfError> {
    if report.trim().is_empty() {
        return Err(PdfError::EmptyReport);
    }

    match std::fs::read(font_path) {
        Ok(data) => match UnicodeFont::parse(&data) {
            Ok(mut font) => return render_with(&mut font, report),
            Err(err) => {
                tracing::warn!(font = %font_path.display(), error = %err, "falling back to ASCII PDF");
            }
        },
        Err(err) => {
            tracing::warn!(font = %font_path.display(), error = %err, "falling back to ASCII PDF");
        }
    }
    render_with(&mut Helvetica, &to_ascii(report))
}

/// NFKD-decomposes `text` and drops everything outside ASCII.
pub fn to_ascii(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

fn render_with(font: &mut dyn TextFont, text: &str) -> Result<Vec<u8>, PdfError> {
    let max_width = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_PADDING;
    let lines = layout(text, max_width * 1000.0 / FONT_SIZE, &*font);
    let pages = paginate(&lines);
    tracing::debug!(lines = lines.len(), pages = pages.len(), "laid out report");

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut page_contents = Vec::with_capacity(pages.len());
    for page in &pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        ];
        for (row, line) in page.iter().enumerate() {
            let top = MARGIN + row as f32 * LINE_HEIGHT;
            let baseline = PAGE_HEIGHT - (top + LINE_HEIGHT / 2.0 + 0.3 * FONT_SIZE);
            operations.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    (MARGIN + CELL_PADDING).into(),
                    baseline.into(),
                ],
            ));
            operations.push(Operation::new("Tj", vec![font.encode(line)]));
        }
        operations.push(Operation::new("ET", vec![]));
        page_contents.push(Content { operations }.encode()?);
    }

    let font_id = font.install(&mut doc)?;
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = page_contents
        .into_iter()
        .map(|content| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_id.into()
        })
        .collect();
    let count = kids.len() as i64;

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Splits `text` into lines no wider than `max_width` (thousandths of the
/// font size). Explicit newlines always break; blank lines are kept.
fn layout(text: &str, max_width: f32, font: &dyn TextFont) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(|paragraph| {
            paragraph
                .replace('\t', TAB)
                .chars()
                .filter(|ch| !ch.is_control())
                .collect::<String>()
        })
        .flat_map(|paragraph| wrap_paragraph(&paragraph, max_width, font))
        .collect()
}

fn wrap_paragraph(paragraph: &str, max_width: f32, font: &dyn TextFont) -> Vec<String> {
    let space = font.advance(' ');
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0.0;

    for word in paragraph.split(' ') {
        let word_width = font.measure(word);

        if word_width > max_width {
            // no break opportunity inside the word: split it by characters
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            for ch in word.chars() {
                let advance = font.advance(ch);
                if !line.is_empty() && width + advance > max_width {
                    lines.push(std::mem::take(&mut line));
                    width = 0.0;
                }
                line.push(ch);
                width += advance;
            }
            continue;
        }

        if !line.is_empty() && width + space + word_width > max_width {
            lines.push(std::mem::take(&mut line));
            width = 0.0;
        } else if !line.is_empty() {
            line.push(' ');
            width += space;
        }
        line.push_str(word);
        width += word_width;
    }

    lines.push(line);
    lines
}

fn paginate(lines: &[String]) -> Vec<&[String]> {
    let usable = PAGE_HEIGHT - MARGIN - BREAK_MARGIN;
    let per_page = ((usable / LINE_HEIGHT).floor() as usize).max(1);
    if lines.is_empty() {
        return vec![lines];
    }
    lines.chunks(per_page).collect()
}
