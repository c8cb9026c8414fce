//! Word-processing document export

use std::borrow::Cow;
use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run, Style, StyleType};

use crate::error::ExportError;

const DOCUMENT_TITLE: &str = "Kleinanzeigen Listing Links";

const HEADING_STYLE: &str = "Heading1";
const BODY_STYLE: &str = "BodyText";

/// Write a document with a level-1 heading and one body paragraph per link
pub(super) fn write_document(links: &[String]) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .add_style(
            Style::new(HEADING_STYLE, StyleType::Paragraph)
                .name("Heading 1")
                .bold()
                .size(32),
        )
        .add_style(Style::new(BODY_STYLE, StyleType::Paragraph).name("Body Text"))
        .add_paragraph(paragraph(HEADING_STYLE, DOCUMENT_TITLE));

    for link in links {
        docx = docx.add_paragraph(paragraph(BODY_STYLE, link));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Document(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn paragraph(style: &str, text: &str) -> Paragraph {
    Paragraph::new()
        .add_run(Run::new().add_text(xml_text(text)))
        .style(style)
}

/// XML 1.0 forbids most C0 control characters even when escaped
fn xml_text(text: &str) -> Cow<'_, str> {
    let forbidden = |c: char| c < ' ' && !matches!(c, '\t' | '\n' | '\r');
    if text.contains(forbidden) {
        Cow::Owned(text.replace(forbidden, "\u{FFFD}"))
    } else {
        Cow::Borrowed(text)
    }
}
