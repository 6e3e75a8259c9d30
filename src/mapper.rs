//! Text → particle mapping.
//!
//! The message is drawn into the working buffer, the buffer is read back, and
//! every lit pixel that falls on the density stride becomes one particle at
//! rest on that pixel. Scan order is row-major, so the result is deterministic
//! for a given surface size, font, and message.

use crate::config::Settings;
use crate::store::ParticleStore;
use crate::surface::{DisplaySurface, Surface};
use crate::text::{self, GlyphStyle};
use glam::Vec2;

/// Derive a fresh particle population from `settings.message`.
///
/// Clears `buffer` and leaves the rasterized message in it.
pub fn map_particles(buffer: &mut Surface, settings: &Settings) -> ParticleStore {
    buffer.clear();

    let style = GlyphStyle::from_settings(settings);
    let center = settings.center();
    let anchor = (center.x.floor() as i64, center.y.floor() as i64);
    text::draw_message(buffer, &style, &settings.message, anchor, settings.draw_type, settings.font_color);

    let origins = sample_origins(buffer.pixels(), buffer.width(), settings.pixel_density());
    ParticleStore::from_origins(&origins)
}

/// Pick particle origins out of interleaved RGBA bytes.
///
/// `i` walks the channel index one pixel (4 bytes) at a time; a pixel is kept
/// when its alpha is nonzero and `i % pixel_density == 0`. A `pixel_density`
/// of zero keeps every lit pixel.
pub fn sample_origins(pixels: &[u8], width: u32, pixel_density: usize) -> Vec<Vec2> {
    if width == 0 {
        return Vec::new();
    }
    let width = width as usize;

    let mut origins = Vec::new();
    for i in (0..pixels.len().saturating_sub(3)).step_by(4) {
        if pixels[i + 3] == 0 || (pixel_density != 0 && i % pixel_density != 0) {
            continue;
        }
        let pixel = i / 4;
        origins.push(Vec2::new((pixel % width) as f32, (pixel / width) as f32));
    }
    origins
}
