use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::layout::metrics::Font;
use crate::layout::pdf;

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const INK: Rgb = Rgb(44, 62, 80);
    pub const GREY: Rgb = Rgb(100, 100, 100);
    pub const BLUE: Rgb = Rgb(41, 128, 185);
    pub const GREEN: Rgb = Rgb(46, 204, 113);
    pub const RED: Rgb = Rgb(231, 76, 60);
    pub const ORANGE: Rgb = Rgb(243, 156, 18);

    pub fn from_tuple((r, g, b): (u8, u8, u8)) -> Self {
        Rgb(r, g, b)
    }
}

/// A positioned drawing operation. Coordinates are millimetres from the top-left
/// corner; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        x: f64,
        y: f64,
        text: String,
        font: Font,
        color: Rgb,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Rgb,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub commands: Vec<DrawCommand>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A JPEG-encoded raster ready to embed.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width_px: u32,
    pub height_px: u32,
    pub jpeg: Vec<u8>,
}

/// Finished, paginated report. Built once and serialized; never edited afterwards.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub file_name: String,
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<Page>,
    pub images: Vec<RasterImage>,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every text run, page by page.
    pub fn page_texts(&self) -> Vec<Vec<String>> {
        self.pages
            .iter()
            .map(|p| p.texts().map(str::to_string).collect())
            .collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages.iter().any(|p| p.texts().any(|t| t.contains(needle)))
    }

    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>> {
        pdf::serialize(self)
    }

    /// Write `<file_name>.pdf` into `dir` and return the path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let bytes = self.to_pdf_bytes()?;
        let path = dir.join(format!("{}.pdf", self.file_name));
        std::fs::write(&path, &bytes)?;
        info!(
            "Wrote {} ({} pages, {} bytes)",
            path.display(),
            self.page_count(),
            bytes.len()
        );
        Ok(path)
    }
}
