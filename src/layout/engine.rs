//! Cursor-based page filling.
//!
//! Content is pushed as atomic units (a bullet, a wrapped paragraph, a heading, an
//! image). Each unit is transliterated and wrapped first, then measured; if it would
//! cross the overflow threshold the current page is closed, a new one is opened with
//! the running header, and the unit is drawn at the top margin. A unit is never split
//! across pages unless it is taller than a whole page on its own.

use log::debug;

use crate::layout::document::{
    DrawCommand, Page, RasterImage, ReportDocument, Rgb, A4_HEIGHT_MM, A4_WIDTH_MM,
};
use crate::layout::metrics::{wrap_text, Font};
use crate::transliterate::to_ascii;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Cursor position on a fresh page.
    pub top_margin: f64,
    /// Content must not extend below this line.
    pub overflow_threshold: f64,
    /// Baseline of the running header on continuation pages.
    pub header_y: f64,
    /// Baseline of the page-number footer.
    pub footer_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH_MM,
            page_height: A4_HEIGHT_MM,
            margin_left: 10.0,
            margin_right: 10.0,
            top_margin: 20.0,
            overflow_threshold: 270.0,
            header_y: 11.0,
            footer_y: 287.0,
        }
    }
}

impl LayoutConfig {
    pub fn usable_height(&self) -> f64 {
        self.overflow_threshold - self.top_margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub color: Rgb,
    /// Offset from the left margin.
    pub indent: f64,
    pub line_height: f64,
}

impl TextStyle {
    pub const fn new(font: Font, color: Rgb, indent: f64, line_height: f64) -> Self {
        Self {
            font,
            color,
            indent,
            line_height,
        }
    }
}

const BULLET_GAP: f64 = 4.0;
const BULLET_SIZE: f64 = 1.4;

pub struct LayoutEngine {
    config: LayoutConfig,
    pages: Vec<Page>,
    images: Vec<RasterImage>,
    y: f64,
    running_title: Option<String>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            pages: vec![Page::default()],
            images: Vec::new(),
            y: config.top_margin,
            running_title: None,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn cursor(&self) -> f64 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Title drawn at the top of every page opened from now on.
    pub fn set_running_title(&mut self, title: impl Into<String>) {
        self.running_title = Some(to_ascii(&title.into()));
    }

    pub fn clear_running_title(&mut self) {
        self.running_title = None;
    }

    /// Width available for text starting `indent` mm right of the left margin.
    pub fn content_width(&self, indent: f64) -> f64 {
        self.config.page_width - self.config.margin_left - self.config.margin_right - indent
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.config.top_margin + EPSILON
    }

    fn page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.config.top_margin;

        if let Some(title) = self.running_title.clone() {
            let font = Font::regular(9.0);
            let x = self.config.margin_left;
            let header_y = self.config.header_y;
            let rule_y = header_y + 2.5;
            let rule_end = self.config.page_width - self.config.margin_right;
            let page = self.page();
            page.commands.push(DrawCommand::Text {
                x,
                y: header_y,
                text: title,
                font,
                color: Rgb::GREY,
            });
            page.commands.push(DrawCommand::Line {
                x1: x,
                y1: rule_y,
                x2: rule_end,
                y2: rule_y,
                width: 0.2,
                color: Rgb(200, 200, 200),
            });
        }
        debug!("Opened page {}", self.pages.len());
    }

    /// Break the page if a unit of `height` would cross the threshold.
    /// Returns whether a new page was opened.
    pub fn ensure_space(&mut self, height: f64) -> bool {
        if self.y + height > self.config.overflow_threshold + EPSILON && !self.at_page_top() {
            self.new_page();
            return true;
        }
        false
    }

    /// Move the cursor down without drawing. Gaps never trigger a page break.
    pub fn advance(&mut self, dy: f64) {
        self.y += dy;
    }

    fn draw_text(&mut self, x: f64, text: String, style: &TextStyle) {
        let y = self.y;
        self.page().commands.push(DrawCommand::Text {
            x,
            y,
            text,
            font: style.font,
            color: style.color,
        });
    }

    /// Place pre-wrapped lines as one unit, prefixed by an optional square marker.
    fn place_lines(&mut self, lines: Vec<String>, style: &TextStyle, marker: Option<Rgb>) {
        let x0 = self.config.margin_left + style.indent;
        let text_x = if marker.is_some() { x0 + BULLET_GAP } else { x0 };
        let height = lines.len() as f64 * style.line_height;
        let oversized = height > self.config.usable_height() + EPSILON;

        if oversized {
            if !self.at_page_top() {
                self.new_page();
            }
        } else {
            self.ensure_space(height);
        }

        for (i, line) in lines.into_iter().enumerate() {
            if oversized {
                self.ensure_space(style.line_height);
            }
            if i == 0 {
                if let Some(color) = marker {
                    let size = BULLET_SIZE;
                    let y = self.y - style.font.size * 0.35 * 25.4 / 72.0 - size / 2.0;
                    self.page().commands.push(DrawCommand::Rect {
                        x: x0,
                        y,
                        width: size,
                        height: size,
                        color,
                    });
                }
            }
            self.draw_text(text_x, line, style);
            self.y += style.line_height;
        }
    }

    fn wrap(&self, text: &str, style: &TextStyle, reserved: f64) -> Vec<String> {
        let ascii = to_ascii(text);
        let width = self.content_width(style.indent + reserved);
        wrap_text(&ascii, &style.font, width)
    }

    /// Height a paragraph (or, with `bulleted`, a bullet) would take once wrapped.
    pub fn measure(&self, text: &str, style: &TextStyle, bulleted: bool) -> f64 {
        let reserved = if bulleted { BULLET_GAP } else { 0.0 };
        self.wrap(text, style, reserved).len() as f64 * style.line_height
    }

    /// A wrapped block of text kept together on one page.
    pub fn paragraph(&mut self, text: &str, style: TextStyle) {
        let lines = self.wrap(text, &style, 0.0);
        self.place_lines(lines, &style, None);
    }

    /// A list item: square marker plus text with a hanging indent.
    pub fn bullet(&mut self, text: &str, style: TextStyle, marker: Rgb) {
        let lines = self.wrap(text, &style, BULLET_GAP);
        self.place_lines(lines, &style, Some(marker));
    }

    /// A heading that will not be left alone at the bottom of a page: the space
    /// for `keep_with` mm of following content is reserved along with it.
    pub fn heading(&mut self, text: &str, style: TextStyle, keep_with: f64) {
        let lines = self.wrap(text, &style, 0.0);
        let height = lines.len() as f64 * style.line_height;
        if height + keep_with <= self.config.usable_height() {
            self.ensure_space(height + keep_with);
        }
        self.place_lines(lines, &style, None);
    }

    /// Single centred line (title block).
    pub fn centered(&mut self, text: &str, style: TextStyle) {
        let ascii = to_ascii(text);
        let width = style.font.text_width(&ascii);
        let x = ((self.config.page_width - width) / 2.0).max(self.config.margin_left);
        self.ensure_space(style.line_height);
        self.draw_text(x, ascii, &style);
        self.y += style.line_height;
    }

    /// Embed a raster at a fixed size. `y` is the cursor; the image sits below it.
    pub fn image(&mut self, image: RasterImage, width: f64, height: f64, indent: f64) {
        self.ensure_space(height);
        self.images.push(image);
        let index = self.images.len() - 1;
        let x = self.config.margin_left + indent;
        let y = self.y;
        self.page().commands.push(DrawCommand::Image {
            x,
            y,
            width,
            height,
            image: index,
        });
        self.y += height;
    }

    /// Close the document, stamping "Page n / N" on every page.
    pub fn finish(mut self, title: impl Into<String>, file_name: impl Into<String>) -> ReportDocument {
        let total = self.pages.len();
        let font = Font::regular(8.0);
        for (i, page) in self.pages.iter_mut().enumerate() {
            let label = format!("Page {} / {}", i + 1, total);
            let x = (self.config.page_width - font.text_width(&label)) / 2.0;
            page.commands.push(DrawCommand::Text {
                x,
                y: self.config.footer_y,
                text: label,
                font,
                color: Rgb::GREY,
            });
        }

        ReportDocument {
            title: to_ascii(&title.into()),
            file_name: file_name.into(),
            page_width: self.config.page_width,
            page_height: self.config.page_height,
            pages: self.pages,
            images: self.images,
        }
    }
}
