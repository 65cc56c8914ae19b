//! Rasterises a [`ReportView`] into a comparison image.
//!
//! The [`Compositor`] trait is the seam the export pipeline depends on;
//! [`RasterCompositor`] is the built-in implementation drawing with `image`
//! and an 8x8 bitmap font.

use crate::error::{ReportError, Result};
use crate::ingest::decode_data_uri;
use crate::models::{MarkerBox, Surface};
use crate::preview::{PanelView, ReportView};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::imageops::FilterType;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

const PAGE_WIDTH: f32 = 1000.0;
const PADDING: f32 = 48.0;
const GAP: f32 = 32.0;
const TITLE_HEIGHT: f32 = 40.0;
const PLACEHOLDER_HEIGHT: f32 = 320.0;
const MAX_IMAGE_HEIGHT: f32 = 1400.0;
const LINE_HEIGHT: f32 = 28.0;
const GLYPH_SCALE: f32 = 2.0;
const MARKER_STROKE: f32 = 3.0;

/// Largest accepted pixel density. A 2x page is already 2000px wide.
pub const MAX_RENDER_SCALE: f32 = 4.0;

const TEXT: Rgba<u8> = Rgba([15, 23, 42, 255]);
const MUTED: Rgba<u8> = Rgba([148, 163, 184, 255]);
const PANEL_FILL: Rgba<u8> = Rgba([241, 245, 249, 255]);
const MARKER: Rgba<u8> = Rgba([239, 68, 68, 255]);
const MARKER_FILL: Rgba<u8> = Rgba([239, 68, 68, 40]);
const CHIP_FILL: Rgba<u8> = Rgba([237, 233, 254, 255]);
const CHIP_TEXT: Rgba<u8> = Rgba([109, 40, 217, 255]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Pixel density multiplier.
    pub scale: f32,
    pub background: Rgba<u8>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Rgba([255, 255, 255, 255]),
        }
    }
}

/// A rendered report.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.pixels.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    pub fn to_data_uri(&self) -> Result<String> {
        Ok(crate::ingest::encode_data_uri("image/png", &self.to_png()?))
    }
}

/// Capability that turns the rendered report into pixels.
pub trait Compositor: Send + Sync {
    fn render(&self, view: &ReportView, options: &RenderOptions) -> Result<RasterImage>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCompositor;

struct Canvas {
    img: RgbaImage,
    scale: f32,
}

impl Canvas {
    fn px(&self, v: f32) -> i64 {
        (v * self.scale).round() as i64
    }

    fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgba<u8>) {
        let (img_w, img_h) = (self.img.width() as i64, self.img.height() as i64);
        let x0 = x.clamp(0, img_w);
        let y0 = y.clamp(0, img_h);
        let x1 = (x + w).clamp(0, img_w);
        let y1 = (y + h).clamp(0, img_h);
        for py in y0..y1 {
            for px in x0..x1 {
                let dst = *self.img.get_pixel(px as u32, py as u32);
                self.img.put_pixel(px as u32, py as u32, blend_pixel(dst, color));
            }
        }
    }

    fn outline_rect(&mut self, x: i64, y: i64, w: i64, h: i64, thickness: i64, color: Rgba<u8>) {
        if w <= 0 || h <= 0 {
            return;
        }
        let t = thickness.max(1).min(w).min(h);
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, y + h - t, w, t, color);
        self.fill_rect(x, y + t, t, h - 2 * t, color);
        self.fill_rect(x + w - t, y + t, t, h - 2 * t, color);
    }

    /// Draws one line of text; returns the advance in pixels.
    fn text(&mut self, x: i64, y: i64, text: &str, color: Rgba<u8>) -> i64 {
        let glyph_px = self.px(GLYPH_SCALE).max(1);
        let mut cursor_x = x;
        for ch in text.chars() {
            let glyph = BASIC_FONTS
                .get(ch)
                .or_else(|| LATIN_FONTS.get(ch))
                .or_else(|| BASIC_FONTS.get('?'));
            if let Some(glyph) = glyph {
                for (row_idx, row) in glyph.iter().enumerate() {
                    for col_idx in 0..8 {
                        if (row >> col_idx) & 1 == 0 {
                            continue;
                        }
                        self.fill_rect(
                            cursor_x + col_idx * glyph_px,
                            y + row_idx as i64 * glyph_px,
                            glyph_px,
                            glyph_px,
                            color,
                        );
                    }
                }
            }
            cursor_x += 8 * glyph_px;
        }
        cursor_x - x
    }

    fn char_width(&self) -> i64 {
        8 * self.px(GLYPH_SCALE).max(1)
    }
}

fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let a = f32::from(src[3]) / 255.0;
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;
    let mix = |d: u8, s: u8| (f32::from(d) * inv + f32::from(s) * a).round().clamp(0.0, 255.0) as u8;
    let out_a = (f32::from(dst[3]) + f32::from(src[3]) * inv).round().clamp(0.0, 255.0) as u8;
    Rgba([mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), out_a])
}

/// Places chips of the given widths left to right, starting a new row when
/// the next chip would pass `max_w`. Returns `(x offset, row)` per chip and
/// the row count. A chip wider than `max_w` gets a row of its own.
fn flow_chips(widths: &[i64], max_w: i64, spacing: i64) -> (Vec<(i64, i64)>, i64) {
    let mut placed = Vec::with_capacity(widths.len());
    let mut x = 0;
    let mut row = 0;
    for &w in widths {
        if x > 0 && x + w > max_w {
            x = 0;
            row += 1;
        }
        placed.push((x, row));
        x += w + spacing;
    }
    let rows = if widths.is_empty() { 0 } else { row + 1 };
    (placed, rows)
}

/// Greedy word wrap on character counts. Overlong words are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = line.chars().count() + usize::from(!line.is_empty()) + word.len();
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.extend(word);
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Decodes and fits a panel image into `max_w` x `max_h` pixels.
fn fit_panel_image(panel: &PanelView, max_w: u32, max_h: u32) -> Result<Option<RgbaImage>> {
    let Some(uri) = panel.image.as_deref() else {
        return Ok(None);
    };

    let (_, bytes) = decode_data_uri(uri).map_err(|e| ReportError::ExportFailure(e.to_string()))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| ReportError::ExportFailure(format!("{} image: {}", panel.title, e)))?
        .to_rgba8();

    let (w, h) = decoded.dimensions();
    if w == 0 || h == 0 {
        return Err(ReportError::ExportFailure(format!("{} image is empty", panel.title)));
    }

    let ratio = (max_w as f32 / w as f32).min(max_h as f32 / h as f32);
    let target_w = ((w as f32 * ratio).round() as u32).max(1);
    let target_h = ((h as f32 * ratio).round() as u32).max(1);
    Ok(Some(image::imageops::resize(&decoded, target_w, target_h, FilterType::Triangle)))
}

fn draw_markers(canvas: &mut Canvas, x: i64, y: i64, w: i64, h: i64, boxes: &[MarkerBox]) {
    let stroke = canvas.px(MARKER_STROKE);
    for b in boxes {
        let bx = x + (b.x / 100.0 * w as f64).round() as i64;
        let by = y + (b.y / 100.0 * h as f64).round() as i64;
        let bw = (b.width / 100.0 * w as f64).round() as i64;
        let bh = (b.height / 100.0 * h as f64).round() as i64;
        canvas.fill_rect(bx, by, bw, bh, MARKER_FILL);
        canvas.outline_rect(bx, by, bw, bh, stroke, MARKER);
    }
}

/// Whether `scale` is a usable pixel density for [`RasterCompositor`].
pub fn is_valid_scale(scale: f32) -> bool {
    scale.is_finite() && scale > 0.0 && scale <= MAX_RENDER_SCALE
}

impl Compositor for RasterCompositor {
    fn render(&self, view: &ReportView, options: &RenderOptions) -> Result<RasterImage> {
        if !is_valid_scale(options.scale) {
            return Err(ReportError::ExportFailure(format!(
                "invalid render scale {}",
                options.scale
            )));
        }

        let mut canvas = Canvas {
            img: RgbaImage::new(1, 1),
            scale: options.scale,
        };

        let page_w = canvas.px(PAGE_WIDTH);
        let pad = canvas.px(PADDING);
        let gap = canvas.px(GAP);
        let col_w = (page_w - 2 * pad - gap) / 2;
        let max_img_h = canvas.px(MAX_IMAGE_HEIGHT);

        let mut panels = Vec::with_capacity(2);
        for surface in [Surface::Actual, Surface::Expected] {
            let panel = view.panel(surface);
            let img = fit_panel_image(panel, col_w as u32, max_img_h as u32)?;
            panels.push((panel, img));
        }

        let body_h = panels
            .iter()
            .map(|(_, img)| match img {
                Some(img) => img.height() as i64,
                None => canvas.px(PLACEHOLDER_HEIGHT),
            })
            .max()
            .unwrap_or(0);

        let line_h = canvas.px(LINE_HEIGHT);
        let footer_chars = ((page_w - 2 * pad) / canvas.char_width()).max(1) as usize;
        let description = wrap(&view.problem_description, footer_chars);
        let chip_pad = canvas.px(6.0);
        let chip_row_h = line_h + canvas.px(8.0);
        let chip_widths: Vec<i64> = view
            .tags
            .iter()
            .map(|tag| tag.chars().count() as i64 * canvas.char_width() + 2 * chip_pad)
            .collect();
        let (chip_slots, chip_rows) = flow_chips(&chip_widths, page_w - 2 * pad, chip_pad);
        let chips_h = chip_rows * chip_row_h;
        let footer_h = line_h * (2 + 1 + description.len() as i64) + chips_h;

        let title_h = canvas.px(TITLE_HEIGHT);
        let total_h = pad + title_h + body_h + gap + footer_h + pad;

        canvas.img = RgbaImage::from_pixel(page_w as u32, total_h.max(1) as u32, options.background);

        // Column titles and panels
        let body_y = pad + title_h;
        for (idx, (panel, img)) in panels.iter().enumerate() {
            let col_x = pad + idx as i64 * (col_w + gap);
            canvas.text(col_x, pad, panel.title, TEXT);

            match img {
                Some(img) => {
                    let img_x = col_x + (col_w - img.width() as i64) / 2;
                    image::imageops::overlay(&mut canvas.img, img, img_x, body_y);
                    draw_markers(
                        &mut canvas,
                        img_x,
                        body_y,
                        img.width() as i64,
                        img.height() as i64,
                        &panel.boxes,
                    );
                }
                None => {
                    let placeholder_h = canvas.px(PLACEHOLDER_HEIGHT);
                    canvas.fill_rect(col_x, body_y, col_w, placeholder_h, PANEL_FILL);
                    let text = panel.placeholder.as_deref().unwrap_or_default();
                    let max_chars = ((col_w - 2 * canvas.px(16.0)) / canvas.char_width()).max(1) as usize;
                    let mut y = body_y + canvas.px(16.0);
                    for line in wrap(text, max_chars) {
                        canvas.text(col_x + canvas.px(16.0), y, &line, MUTED);
                        y += line_h;
                    }
                }
            }
        }

        // Footer
        let mut y = body_y + body_h + gap;
        canvas.text(pad, y, &format!("Device: {}", view.environment), TEXT);
        y += line_h;
        canvas.text(pad, y, &format!("Date: {}", view.test_date), TEXT);
        y += line_h;
        canvas.text(pad, y, "Issue:", TEXT);
        y += line_h;

        for ((tag, &w), &(dx, row)) in view.tags.iter().zip(&chip_widths).zip(&chip_slots) {
            let (x, chip_y) = (pad + dx, y + row * chip_row_h);
            canvas.fill_rect(x, chip_y - chip_pad / 2, w, line_h, CHIP_FILL);
            canvas.text(x + chip_pad, chip_y + chip_pad / 2, tag, CHIP_TEXT);
        }
        y += chips_h;

        for line in &description {
            canvas.text(pad, y, line, TEXT);
            y += line_h;
        }

        log::debug!(
            "composited report {}x{} at {}x",
            canvas.img.width(),
            canvas.img.height(),
            options.scale
        );
        Ok(RasterImage::new(canvas.img))
    }
}
