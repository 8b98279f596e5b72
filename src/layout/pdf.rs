//! Minimal PDF 1.4 writer for `ReportDocument`.
//!
//! Uses the built-in Helvetica faces (WinAnsi) and embeds charts as DCT images.
//! Content streams are left uncompressed.

use std::io::Write;

use crate::error::{BriefAnalyzerError, Result};
use crate::layout::document::{DrawCommand, ReportDocument, Rgb};

const PT_PER_MM: f64 = 72.0 / 25.4;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_DYNAMIC_ID: usize = 6;

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &str) -> Result<()> {
        self.offsets.push((id, self.buf.len()));
        write!(self.buf, "{} 0 obj\n{}\nendobj\n", id, body)?;
        Ok(())
    }

    fn stream(&mut self, id: usize, dict: &str, data: &[u8]) -> Result<()> {
        self.offsets.push((id, self.buf.len()));
        write!(
            self.buf,
            "{} 0 obj\n<< {} /Length {} >>\nstream\n",
            id,
            dict,
            data.len()
        )?;
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        self.offsets.sort_by_key(|(id, _)| *id);
        let size = self.offsets.last().map(|(id, _)| id + 1).unwrap_or(1);
        for (expected, (id, _)) in (1..).zip(&self.offsets) {
            if expected != *id {
                return Err(BriefAnalyzerError::ExportFailure(format!(
                    "object {} missing from document",
                    expected
                )));
            }
        }

        let xref_at = self.buf.len();
        write!(self.buf, "xref\n0 {}\n0000000000 65535 f \n", size)?;
        for (_, offset) in &self.offsets {
            write!(self.buf, "{:010} 00000 n \n", offset)?;
        }
        write!(
            self.buf,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, CATALOG_ID, INFO_ID, xref_at
        )?;
        Ok(self.buf)
    }
}

/// Escape a string literal. Input is expected to be ASCII already.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn color(c: Rgb) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        c.0 as f64 / 255.0,
        c.1 as f64 / 255.0,
        c.2 as f64 / 255.0
    )
}

fn content_stream(doc: &ReportDocument, commands: &[DrawCommand]) -> String {
    let page_h = doc.page_height * PT_PER_MM;
    let mut out = String::new();

    for cmd in commands {
        match cmd {
            DrawCommand::Text {
                x,
                y,
                text,
                font,
                color: c,
            } => {
                let face = if font.bold { "F2" } else { "F1" };
                out.push_str(&format!(
                    "BT /{} {:.2} Tf {} rg {:.2} {:.2} Td ({}) Tj ET\n",
                    face,
                    font.size,
                    color(*c),
                    x * PT_PER_MM,
                    page_h - y * PT_PER_MM,
                    escape(text)
                ));
            }
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                color: c,
            } => {
                out.push_str(&format!(
                    "{} rg {:.2} {:.2} {:.2} {:.2} re f\n",
                    color(*c),
                    x * PT_PER_MM,
                    page_h - (y + height) * PT_PER_MM,
                    width * PT_PER_MM,
                    height * PT_PER_MM
                ));
            }
            DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color: c,
            } => {
                out.push_str(&format!(
                    "{} RG {:.2} w {:.2} {:.2} m {:.2} {:.2} l S\n",
                    color(*c),
                    width * PT_PER_MM,
                    x1 * PT_PER_MM,
                    page_h - y1 * PT_PER_MM,
                    x2 * PT_PER_MM,
                    page_h - y2 * PT_PER_MM
                ));
            }
            DrawCommand::Image {
                x,
                y,
                width,
                height,
                image,
            } => {
                out.push_str(&format!(
                    "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q\n",
                    width * PT_PER_MM,
                    height * PT_PER_MM,
                    x * PT_PER_MM,
                    page_h - (y + height) * PT_PER_MM,
                    image
                ));
            }
        }
    }
    out
}

/// Serialize the whole document. Either the complete file is produced or an error.
pub fn serialize(doc: &ReportDocument) -> Result<Vec<u8>> {
    let mut w = PdfWriter::new();
    let page_w = doc.page_width * PT_PER_MM;
    let page_h = doc.page_height * PT_PER_MM;

    let image_ids: Vec<usize> = (0..doc.images.len()).map(|i| FIRST_DYNAMIC_ID + i).collect();
    let first_page_id = FIRST_DYNAMIC_ID + doc.images.len();
    let page_ids: Vec<usize> = (0..doc.pages.len())
        .map(|i| first_page_id + 2 * i)
        .collect();

    w.object(
        CATALOG_ID,
        &format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID),
    )?;
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
    w.object(
        PAGES_ID,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_ids.len()
        ),
    )?;
    w.object(
        FONT_REGULAR_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    )?;
    w.object(
        FONT_BOLD_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    )?;
    w.object(
        INFO_ID,
        &format!(
            "<< /Title ({}) /Producer (brief-analyzer {}) >>",
            escape(&doc.title),
            env!("CARGO_PKG_VERSION")
        ),
    )?;

    for (image, id) in doc.images.iter().zip(&image_ids) {
        w.stream(
            *id,
            &format!(
                "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
                image.width_px, image.height_px
            ),
            &image.jpeg,
        )?;
    }

    let xobjects: Vec<String> = image_ids
        .iter()
        .enumerate()
        .map(|(i, id)| format!("/Im{} {} 0 R", i, id))
        .collect();

    for (page, page_id) in doc.pages.iter().zip(&page_ids) {
        for cmd in &page.commands {
            if let DrawCommand::Image { image, .. } = cmd {
                if *image >= doc.images.len() {
                    return Err(BriefAnalyzerError::ExportFailure(format!(
                        "page references missing image {}",
                        image
                    )));
                }
            }
        }

        let content_id = page_id + 1;
        w.object(
            *page_id,
            &format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> /XObject << {} >> >> /Contents {} 0 R >>",
                PAGES_ID,
                page_w,
                page_h,
                FONT_REGULAR_ID,
                FONT_BOLD_ID,
                xobjects.join(" "),
                content_id
            ),
        )?;
        let content = content_stream(doc, &page.commands);
        w.stream(content_id, "", content.as_bytes())?;
    }

    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::document::{Page, RasterImage};
    use crate::layout::metrics::Font;

    fn doc_with(pages: Vec<Page>, images: Vec<RasterImage>) -> ReportDocument {
        ReportDocument {
            title: "Analyse (test)".to_string(),
            file_name: "brief-analysis".to_string(),
            page_width: 210.0,
            page_height: 297.0,
            pages,
            images,
        }
    }

    fn text_page(text: &str) -> Page {
        Page {
            commands: vec![DrawCommand::Text {
                x: 10.0,
                y: 20.0,
                text: text.to_string(),
                font: Font::regular(11.0),
                color: Rgb::INK,
            }],
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape("é"), "?");
    }

    #[test]
    fn test_structure() {
        let doc = doc_with(vec![text_page("one"), text_page("two (2)")], vec![]);
        let bytes = serialize(&doc).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("(two \\(2\\)) Tj"));
        assert!(text.contains("/Title (Analyse \\(test\\))"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let doc = doc_with(vec![text_page("one")], vec![]);
        let bytes = serialize(&doc).unwrap();
        let xref = bytes
            .windows(6)
            .position(|w| w == b"\nxref\n")
            .unwrap()
            + 1;
        let tail = String::from_utf8(bytes[xref..].to_vec()).unwrap();
        let entries: Vec<&str> = tail
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .collect();
        // catalog, pages, two fonts, info, one page + its content stream
        assert_eq!(entries.len(), 7);
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(bytes[offset..].starts_with(format!("{} 0 obj", i + 1).as_bytes()));
        }
    }

    #[test]
    fn test_text_baseline_is_flipped() {
        let doc = doc_with(vec![text_page("x")], vec![]);
        let content = content_stream(&doc, &doc.pages[0].commands);
        // 297mm - 20mm = 277mm = 785.20pt
        assert!(content.contains("28.35 785.20 Td"));
    }

    #[test]
    fn test_image_embedding() {
        let page = Page {
            commands: vec![DrawCommand::Image {
                x: 10.0,
                y: 30.0,
                width: 80.0,
                height: 80.0,
                image: 0,
            }],
        };
        let image = RasterImage {
            width_px: 4,
            height_px: 4,
            jpeg: vec![0xFF, 0xD8, 0xFF, 0xD9],
        };
        let bytes = serialize(&doc_with(vec![page], vec![image])).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Filter /DCTDecode"));
        assert!(text.contains("/Im0 6 0 R"));
        assert!(text.contains("/Im0 Do"));
    }

    #[test]
    fn test_dangling_image_reference_fails() {
        let page = Page {
            commands: vec![DrawCommand::Image {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
                image: 3,
            }],
        };
        let err = serialize(&doc_with(vec![page], vec![])).unwrap_err();
        assert!(matches!(err, BriefAnalyzerError::ExportFailure(_)));
    }
}
