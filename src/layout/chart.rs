//! Offscreen chart rendering.
//!
//! Charts are drawn into an in-memory RGB canvas, captured as JPEG and embedded as
//! images. `Canvas::capture` consumes the canvas, so nothing outlives the capture.

use std::f64::consts::PI;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgb as Pixel, RgbImage};
use log::debug;

use crate::error::{BriefAnalyzerError, Result};
use crate::layout::document::{RasterImage, Rgb};

const JPEG_QUALITY: u8 = 90;
const GRID: Rgb = Rgb(215, 219, 223);
const AXIS: Rgb = Rgb(120, 120, 120);

pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, to_pixel(background)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb, alpha: f64) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        let src = [color.0, color.1, color.2];
        for (channel, s) in px.0.iter_mut().zip(src) {
            *channel = (*channel as f64 * (1.0 - alpha) + s as f64 * alpha).round() as u8;
        }
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        let (x0, y0) = (x.round() as i64, y.round() as i64);
        let (x1, y1) = ((x + w).round() as i64, (y + h).round() as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, color, 1.0);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgb) {
        let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
        let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        for py in y0..=y1 {
            for px in x0..=x1 {
                let (dx, dy) = (px as f64 - cx, py as f64 - cy);
                if dx * dx + dy * dy <= r * r {
                    self.put(px, py, color, 1.0);
                }
            }
        }
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64, color: Rgb) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = (dx.abs().max(dy.abs()) * 2.0).ceil().max(1.0) as usize;
        let radius = (thickness / 2.0).max(0.5);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.fill_circle(from.0 + dx * t, from.1 + dy * t, radius, color);
        }
    }

    pub fn stroke_polygon(&mut self, points: &[(f64, f64)], thickness: f64, color: Rgb) {
        if points.len() < 2 {
            return;
        }
        for i in 0..points.len() {
            let next = (i + 1) % points.len();
            self.line(points[i], points[next], thickness, color);
        }
    }

    /// Even-odd scanline fill with constant opacity.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb, alpha: f64) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor() as i64;
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;

        for py in min_y..=max_y {
            let scan = py as f64 + 0.5;
            let mut crossings: Vec<f64> = Vec::new();
            for i in 0..points.len() {
                let (a, b) = (points[i], points[(i + 1) % points.len()]);
                if (a.1 <= scan && b.1 > scan) || (b.1 <= scan && a.1 > scan) {
                    crossings.push(a.0 + (scan - a.1) / (b.1 - a.1) * (b.0 - a.0));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks(2) {
                if let [start, end] = pair {
                    for px in start.round() as i64..end.round() as i64 {
                        self.put(px, py, color, alpha);
                    }
                }
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let p = self.image.get_pixel(x, y);
        Rgb(p.0[0], p.0[1], p.0[2])
    }

    /// Encode the canvas as JPEG and drop it.
    pub fn capture(self) -> Result<RasterImage> {
        let (width, height) = (self.image.width(), self.image.height());
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode(self.image.as_raw(), width, height, ColorType::Rgb8)
            .map_err(|e| BriefAnalyzerError::ExportFailure(format!("chart capture failed: {}", e)))?;
        debug!("Captured {}x{} chart ({} bytes)", width, height, jpeg.len());
        Ok(RasterImage {
            width_px: width,
            height_px: height,
            jpeg,
        })
    }
}

fn to_pixel(c: Rgb) -> Pixel<u8> {
    Pixel([c.0, c.1, c.2])
}

/// Radar of unit-interval values, one axis per value, first axis pointing up.
pub fn radar_canvas(values: &[f64], size: u32, color: Rgb) -> Canvas {
    let mut canvas = Canvas::new(size, size, Rgb::WHITE);
    let n = values.len().max(1);
    let center = size as f64 / 2.0;
    let radius = size as f64 * 0.4;

    let vertex = |i: usize, r: f64| -> (f64, f64) {
        let angle = -PI / 2.0 + 2.0 * PI * i as f64 / n as f64;
        (center + r * angle.cos(), center + r * angle.sin())
    };

    for ring in 1..=5 {
        let r = radius * ring as f64 / 5.0;
        if n >= 3 {
            let ring_points: Vec<_> = (0..n).map(|i| vertex(i, r)).collect();
            canvas.stroke_polygon(&ring_points, 1.0, GRID);
        } else {
            let circle: Vec<_> = (0..72)
                .map(|k| {
                    let a = 2.0 * PI * k as f64 / 72.0;
                    (center + r * a.cos(), center + r * a.sin())
                })
                .collect();
            canvas.stroke_polygon(&circle, 1.0, GRID);
        }
    }

    for i in 0..n {
        canvas.line((center, center), vertex(i, radius), 1.0, AXIS);
    }

    let data: Vec<_> = values
        .iter()
        .enumerate()
        .map(|(i, v)| vertex(i, radius * v.clamp(0.0, 1.0)))
        .collect();
    canvas.fill_polygon(&data, color, 0.25);
    canvas.stroke_polygon(&data, 3.0, color);
    for point in &data {
        canvas.fill_circle(point.0, point.1, 5.0, color);
    }
    canvas
}

/// Vertical bars, scaled to the largest value, with light horizontal gridlines.
pub fn bar_canvas(values: &[f64], width: u32, height: u32, color: Rgb) -> Canvas {
    let mut canvas = Canvas::new(width, height, Rgb::WHITE);
    let (left, right, top, bottom) = (30.0, 15.0, 15.0, 25.0);
    let plot_w = width as f64 - left - right;
    let plot_h = height as f64 - top - bottom;
    let base_y = top + plot_h;

    for k in 1..=4 {
        let y = base_y - plot_h * k as f64 / 4.0;
        canvas.line((left, y), (left + plot_w, y), 1.0, GRID);
    }

    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    if !values.is_empty() && max > 0.0 {
        let slot = plot_w / values.len() as f64;
        let bar_w = slot * 0.6;
        for (i, v) in values.iter().enumerate() {
            let h = plot_h * v.max(0.0) / max;
            let x = left + slot * i as f64 + (slot - bar_w) / 2.0;
            canvas.fill_rect(x, base_y - h, bar_w, h, color);
        }
    }

    canvas.line((left, top), (left, base_y), 2.0, AXIS);
    canvas.line((left, base_y), (left + plot_w, base_y), 2.0, AXIS);
    canvas
}

/// Render and capture the score radar.
pub fn render_score_radar(scores: &[f64]) -> Result<RasterImage> {
    radar_canvas(scores, 400, Rgb::BLUE).capture()
}

/// Render and capture the per-phase hours bar chart.
pub fn render_phase_hours(hours: &[f64]) -> Result<RasterImage> {
    bar_canvas(hours, 600, 300, Rgb::BLUE).capture()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_heights_scale_to_max() {
        let canvas = bar_canvas(&[10.0, 5.0], 200, 125, Rgb::BLUE);
        // plot spans y 15..100; second bar is half as tall
        let first_slot_center = 30.0 + (200.0 - 45.0) / 4.0;
        let second_slot_center = first_slot_center + (200.0 - 45.0) / 2.0;
        assert_eq!(canvas.pixel(first_slot_center as u32, 30), Rgb::BLUE);
        assert_eq!(canvas.pixel(second_slot_center as u32, 30), Rgb::WHITE);
        assert_eq!(canvas.pixel(second_slot_center as u32, 80), Rgb::BLUE);
    }

    #[test]
    fn test_empty_bars_do_not_panic() {
        let canvas = bar_canvas(&[], 100, 80, Rgb::BLUE);
        assert_eq!(canvas.width(), 100);
        let zeros = bar_canvas(&[0.0, 0.0], 100, 80, Rgb::BLUE);
        assert_eq!(zeros.height(), 80);
    }

    #[test]
    fn test_radar_marks_score_points() {
        let canvas = radar_canvas(&[1.0, 0.5], 400, Rgb::BLUE);
        // first axis points up: full score sits at radius 160 above the centre
        assert_eq!(canvas.pixel(200, 40), Rgb::BLUE);
        // second axis points down: half score at radius 80
        assert_eq!(canvas.pixel(200, 280), Rgb::BLUE);
    }

    #[test]
    fn test_polygon_fill_covers_interior() {
        let mut canvas = Canvas::new(50, 50, Rgb::WHITE);
        canvas.fill_polygon(&[(10.0, 10.0), (40.0, 10.0), (40.0, 40.0), (10.0, 40.0)], Rgb::RED, 1.0);
        assert_eq!(canvas.pixel(25, 25), Rgb::RED);
        assert_eq!(canvas.pixel(5, 5), Rgb::WHITE);
    }

    #[test]
    fn test_capture_produces_jpeg() {
        let image = render_score_radar(&[0.8, 0.6]).unwrap();
        assert_eq!((image.width_px, image.height_px), (400, 400));
        assert_eq!(&image.jpeg[..2], &[0xFF, 0xD8]);
    }
}
