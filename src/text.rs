//! Text rasterization into the working buffer.
//!
//! Glyphs come from the built-in bitmap faces of `embedded-graphics`, so no
//! font files are needed. A requested font size is met with the closest face
//! not taller than the target, drawn at an integer pixel scale.

use crate::config::{DrawType, Settings, TextAlign, TextBaseline};
use crate::surface::Surface;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{Dimensions, OriginDimensions, Point, Size};
use embedded_graphics::mono_font::{ascii, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_graphics::{Drawable, Pixel};
use image::Rgba;
use std::convert::Infallible;

// Sorted by glyph height, ascending.
const REGULAR_FACES: &[&MonoFont<'static>] = &[
    &ascii::FONT_4X6,
    &ascii::FONT_5X8,
    &ascii::FONT_6X10,
    &ascii::FONT_7X13,
    &ascii::FONT_9X15,
    &ascii::FONT_9X18,
    &ascii::FONT_10X20,
];

const BOLD_FACES: &[&MonoFont<'static>] = &[
    &ascii::FONT_6X13_BOLD,
    &ascii::FONT_7X14_BOLD,
    &ascii::FONT_9X15_BOLD,
    &ascii::FONT_9X18_BOLD,
];

const ITALIC_FACES: &[&MonoFont<'static>] = &[
    &ascii::FONT_6X13_ITALIC,
    &ascii::FONT_7X13_ITALIC,
    &ascii::FONT_8X13_ITALIC,
];

/// Resolved font, scale, and anchoring for drawing a message.
#[derive(Clone, Copy)]
pub struct GlyphStyle {
    font: &'static MonoFont<'static>,
    scale: u32,
    alignment: Alignment,
    baseline: Baseline,
}

impl std::fmt::Debug for GlyphStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphStyle")
            .field("face", &self.font.character_size)
            .field("scale", &self.scale)
            .field("alignment", &self.alignment)
            .field("baseline", &self.baseline)
            .finish()
    }
}

impl GlyphStyle {
    /// Pick a face and scale for the configured family and size.
    pub fn from_settings(settings: &Settings) -> Self {
        let (font, scale) = select_face(&settings.font_family, settings.font_size);
        Self {
            font,
            scale,
            alignment: alignment(settings.text_align),
            baseline: baseline(settings.text_baseline),
        }
    }

    /// Integer pixel scale applied to every glyph pixel.
    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Rendered glyph cell size, after scaling.
    pub fn cell_size(&self) -> (u32, u32) {
        let size = self.font.character_size;
        (size.width * self.scale, size.height * self.scale)
    }
}

fn faces_for(family: &str) -> &'static [&'static MonoFont<'static>] {
    let family = family.to_ascii_lowercase();
    if family.contains("bold") {
        BOLD_FACES
    } else if family.contains("italic") || family.contains("oblique") {
        ITALIC_FACES
    } else {
        REGULAR_FACES
    }
}

fn select_face(family: &str, size: f32) -> (&'static MonoFont<'static>, u32) {
    let faces = faces_for(family);
    let tallest = faces[faces.len() - 1].character_size.height as f32;
    let size = size.max(1.0);

    let scale = (size / tallest).ceil().max(1.0) as u32;
    let target = size / scale as f32;
    let font = *faces
        .iter()
        .rev()
        .find(|f| f.character_size.height as f32 <= target)
        .unwrap_or(&faces[0]);

    (font, scale)
}

fn alignment(align: TextAlign) -> Alignment {
    match align {
        TextAlign::Start | TextAlign::Left => Alignment::Left,
        TextAlign::Center => Alignment::Center,
        TextAlign::End | TextAlign::Right => Alignment::Right,
    }
}

fn baseline(baseline: TextBaseline) -> Baseline {
    match baseline {
        TextBaseline::Top | TextBaseline::Hanging => Baseline::Top,
        TextBaseline::Middle => Baseline::Middle,
        TextBaseline::Alphabetic => Baseline::Alphabetic,
        TextBaseline::Ideographic | TextBaseline::Bottom => Baseline::Bottom,
    }
}

/// One-bit glyph coverage for the message's bounding box, unscaled.
struct GlyphMask {
    origin: Point,
    size: Size,
    bits: Vec<bool>,
}

impl GlyphMask {
    fn new(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size,
            bits: vec![false; (size.width * size.height) as usize],
        }
    }

    #[inline]
    fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.size.width as i64 || y >= self.size.height as i64 {
            return false;
        }
        self.bits[(y as usize) * self.size.width as usize + x as usize]
    }
}

impl OriginDimensions for GlyphMask {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for GlyphMask {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if !color.is_on() {
                continue;
            }
            let p = point - self.origin;
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < self.size.width && (p.y as u32) < self.size.height {
                let idx = p.y as usize * self.size.width as usize + p.x as usize;
                self.bits[idx] = true;
            }
        }
        Ok(())
    }
}

/// Draw `message` anchored at `anchor` into `buffer` with color `ink`.
///
/// `Fill` paints every covered pixel; `Stroke` paints only covered pixels with
/// at least one uncovered 4-neighbour. Returns the number of pixels painted
/// inside the buffer.
pub fn draw_message(
    buffer: &mut Surface,
    style: &GlyphStyle,
    message: &str,
    anchor: (i64, i64),
    mode: DrawType,
    ink: Rgba<u8>,
) -> usize {
    if message.is_empty() {
        return 0;
    }

    let character_style = MonoTextStyle::new(style.font, BinaryColor::On);
    let text_style = TextStyleBuilder::new()
        .alignment(style.alignment)
        .baseline(style.baseline)
        .build();
    let text = Text::with_text_style(message, Point::zero(), character_style, text_style);

    let bounds = text.bounding_box();
    if bounds.size.width == 0 || bounds.size.height == 0 {
        return 0;
    }

    let mut mask = GlyphMask::new(bounds.top_left, bounds.size);
    match text.draw(&mut mask) {
        Ok(_) => {}
        Err(never) => match never {},
    }

    let scale = style.scale as i64;
    let lit = |sx: i64, sy: i64| {
        sx >= 0 && sy >= 0 && mask.get(sx.div_euclid(scale), sy.div_euclid(scale))
    };

    let scaled_w = bounds.size.width as i64 * scale;
    let scaled_h = bounds.size.height as i64 * scale;
    let left = anchor.0 + bounds.top_left.x as i64 * scale;
    let top = anchor.1 + bounds.top_left.y as i64 * scale;

    // Only visit the part of the scaled box that lands on the buffer.
    let cols = (-left).max(0)..scaled_w.min(buffer.width() as i64 - left);
    let rows = (-top).max(0)..scaled_h.min(buffer.height() as i64 - top);

    let mut painted = 0;
    for sy in rows {
        for sx in cols.clone() {
            if !lit(sx, sy) {
                continue;
            }
            if mode == DrawType::Stroke
                && lit(sx - 1, sy)
                && lit(sx + 1, sy)
                && lit(sx, sy - 1)
                && lit(sx, sy + 1)
            {
                continue;
            }

            buffer.put_pixel((left + sx) as u32, (top + sy) as u32, ink);
            painted += 1;
        }
    }
    painted
}
