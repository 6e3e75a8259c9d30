//! Pixel surfaces and draw state.
//!
//! A [`Surface`] is an RGBA image with a canvas-like draw state: an optional
//! [`Filter`] and a [`CompositeMode`], saved and restored as a stack. The
//! engine owns one as its working buffer; the display it composites onto is
//! anything implementing [`DisplaySurface`], with `Surface` itself as the
//! built-in implementation.

use crate::error::RenderError;
use image::{imageops, Rgba, RgbaImage};

/// Blend mode used when drawing one surface onto another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Standard alpha blending (default).
    #[default]
    SourceOver,
    /// Additive blending. Overlaps get brighter.
    Lighter,
}

/// Image filter applied to the source of a draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filter {
    /// Gaussian blur standard deviation, in pixels. Zero disables the blur.
    pub blur: f32,
    /// Multiplier applied to the color channels after blurring.
    pub brightness: f32,
}

impl Filter {
    /// `blur(8px) brightness(200%)`, the neon halo.
    pub const GLOW: Filter = Filter {
        blur: 8.0,
        brightness: 2.0,
    };

    /// Produce a filtered copy of `src`.
    pub fn apply(&self, src: &RgbaImage) -> RgbaImage {
        // The blur kernel can't handle an empty image.
        if src.width() == 0 || src.height() == 0 {
            return src.clone();
        }

        let mut out = if self.blur > 0.0 {
            // Blur premultiplied color so transparent pixels don't darken the edges.
            let blurred = imageops::blur(&premultiplied(src), self.blur);
            unpremultiplied(&blurred)
        } else {
            src.clone()
        };

        if self.brightness != 1.0 {
            for px in out.pixels_mut() {
                for c in &mut px.0[..3] {
                    *c = (*c as f32 * self.brightness).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        out
    }
}

fn premultiplied(src: &RgbaImage) -> RgbaImage {
    let mut out = src.clone();
    for px in out.pixels_mut() {
        let a = px.0[3] as u32;
        for c in &mut px.0[..3] {
            *c = ((*c as u32 * a + 127) / 255) as u8;
        }
    }
    out
}

fn unpremultiplied(src: &RgbaImage) -> RgbaImage {
    let mut out = src.clone();
    for px in out.pixels_mut() {
        let a = px.0[3] as u32;
        if a == 0 {
            px.0 = [0, 0, 0, 0];
            continue;
        }
        for c in &mut px.0[..3] {
            *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

/// Draw state that filters and blend modes are scoped by.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawState {
    pub filter: Option<Filter>,
    pub composite: CompositeMode,
}

/// The output side of the compositor.
///
/// Hosts that own their graphical surface implement this; the engine takes
/// ownership of one at startup and draws every frame into it.
pub trait DisplaySurface {
    /// Current `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Reallocate to a new size, keeping the overlapping region.
    fn resize(&mut self, width: u32, height: u32);

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Fill every pixel with `color` under the current composite mode.
    fn fill(&mut self, color: Rgba<u8>);

    /// Push the current draw state.
    fn save(&mut self);

    /// Pop the last saved draw state. A restore without a save resets to default.
    fn restore(&mut self);

    /// Filter applied to subsequent draws.
    fn set_filter(&mut self, filter: Option<Filter>);

    /// Blend mode for subsequent draws.
    fn set_composite(&mut self, mode: CompositeMode);

    /// Draw `source` at the origin using the current filter and composite mode.
    fn draw_surface(&mut self, source: &Surface) -> Result<(), RenderError>;
}

/// An RGBA pixel surface with a canvas-style draw state.
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
    state: DrawState,
    saved: Vec<DrawState>,
}

impl Surface {
    /// Transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            state: DrawState::default(),
            saved: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the backing image.
    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the surface, returning its image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Raw interleaved RGBA bytes, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Current draw state.
    #[inline]
    pub fn state(&self) -> DrawState {
        self.state
    }

    /// Depth of the save stack.
    #[inline]
    pub fn saved_depth(&self) -> usize {
        self.saved.len()
    }

    /// Overwrite a pixel. Out-of-bounds coordinates are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.width() && y < self.height() {
            self.image.put_pixel(x, y, color);
        }
    }

    /// Blend `color` into one pixel with the current composite mode.
    /// Out-of-bounds coordinates are ignored.
    #[inline]
    pub fn fill_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.width() && y < self.height() {
            let mode = self.state.composite;
            let dst = self.image.get_pixel_mut(x, y);
            *dst = blend(mode, color, *dst);
        }
    }
}

impl DisplaySurface for Surface {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() == (width, height) {
            return;
        }
        let mut next = RgbaImage::new(width, height);
        let copy_w = width.min(self.width());
        let copy_h = height.min(self.height());
        for y in 0..copy_h {
            for x in 0..copy_w {
                next.put_pixel(x, y, *self.image.get_pixel(x, y));
            }
        }
        self.image = next;
    }

    fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            px.0 = [0, 0, 0, 0];
        }
    }

    fn fill(&mut self, color: Rgba<u8>) {
        let mode = self.state.composite;
        for px in self.image.pixels_mut() {
            *px = blend(mode, color, *px);
        }
    }

    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        self.state = self.saved.pop().unwrap_or_default();
    }

    fn set_filter(&mut self, filter: Option<Filter>) {
        self.state.filter = filter;
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.state.composite = mode;
    }

    fn draw_surface(&mut self, source: &Surface) -> Result<(), RenderError> {
        if source.image.dimensions() != self.image.dimensions() {
            return Err(RenderError::SizeMismatch {
                src_width: source.width(),
                src_height: source.height(),
                dst_width: self.width(),
                dst_height: self.height(),
            });
        }

        if self.width() == 0 || self.height() == 0 {
            return Ok(());
        }

        let filtered = self.state.filter.map(|f| f.apply(&source.image));
        let src = filtered.as_ref().unwrap_or(&source.image);
        let mode = self.state.composite;

        for (dst, s) in self.image.pixels_mut().zip(src.pixels()) {
            *dst = blend(mode, *s, *dst);
        }
        Ok(())
    }
}

/// Blend one straight-alpha source pixel over a destination pixel.
fn blend(mode: CompositeMode, src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    if src.0[3] == 0 {
        return dst;
    }

    let sa = src.0[3] as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;

    let (out_a, premul): (f32, fn(f32, f32, f32, f32) -> f32) = match mode {
        CompositeMode::SourceOver => {
            let out_a = sa + da * (1.0 - sa);
            (out_a, |s: f32, d: f32, sa: f32, da: f32| s * sa + d * da * (1.0 - sa))
        }
        CompositeMode::Lighter => {
            let out_a = (sa + da).min(1.0);
            (out_a, |s: f32, d: f32, sa: f32, da: f32| (s * sa + d * da).min(1.0))
        }
    };

    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let s = src.0[c] as f32 / 255.0;
        let d = dst.0[c] as f32 / 255.0;
        let value = premul(s, d, sa, da) / out_a;
        out[c] = (value * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}
