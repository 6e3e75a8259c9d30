//! Frame compositing.
//!
//! Particles are painted as single pixels into the working buffer, then the
//! buffer is drawn onto the display over the background. With glow on the
//! buffer is drawn twice: once through [`Filter::GLOW`] for the halo, then
//! again sharp with additive blending.

use crate::error::RenderError;
use crate::store::ParticleStore;
use crate::surface::{CompositeMode, DisplaySurface, Filter, Surface};
use image::Rgba;

/// Paint every in-bounds particle into `buffer` at its floored position.
///
/// Returns the number of particles painted.
pub fn paint_particles(buffer: &mut Surface, particles: &ParticleStore, color: Rgba<u8>) -> usize {
    let (w, h) = (buffer.width() as f32, buffer.height() as f32);
    let mut painted = 0;
    for p in particles.iter() {
        let (x, y) = (p.position.x, p.position.y);
        // NaN fails both comparisons.
        if !(x >= 0.0 && x < w && y >= 0.0 && y < h) {
            continue;
        }
        buffer.put_pixel(x.floor() as u32, y.floor() as u32, color);
        painted += 1;
    }
    painted
}

/// Fill `display` with `background` and draw `buffer` over it.
///
/// Filter and composite changes are scoped by a save/restore pair that is
/// unwound even when a draw fails.
pub fn composite<D>(display: &mut D, buffer: &Surface, background: Rgba<u8>, glow: bool) -> Result<(), RenderError>
where
    D: DisplaySurface + ?Sized,
{
    display.fill(background);

    display.save();
    let result = draw_layers(display, buffer, glow);
    display.restore();
    result
}

fn draw_layers<D>(display: &mut D, buffer: &Surface, glow: bool) -> Result<(), RenderError>
where
    D: DisplaySurface + ?Sized,
{
    if glow {
        display.set_filter(Some(Filter::GLOW));
        display.draw_surface(buffer)?;
        display.set_filter(None);
        display.set_composite(CompositeMode::Lighter);
    }
    display.draw_surface(buffer)
}

/// Render one complete frame.
pub fn render_frame<D>(
    display: &mut D,
    buffer: &mut Surface,
    particles: &ParticleStore,
    color: Rgba<u8>,
    background: Rgba<u8>,
    glow: bool,
) -> Result<(), RenderError>
where
    D: DisplaySurface + ?Sized,
{
    buffer.clear();
    display.clear();
    paint_particles(buffer, particles, color);
    composite(display, buffer, background, glow)
}
