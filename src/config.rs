//! Engine configuration.
//!
//! [`Config`] mirrors the wire shape a host sends at startup: camelCase keys,
//! loosely typed values, every field optional. [`Config::resolve`] turns it into
//! [`Settings`], where every value is typed and clamped to its documented range.
//! The engine only ever reads `Settings`.
//!
//! # Example
//!
//! ```ignore
//! let config = Config::from_json(r#"{"message": "HELLO", "density": 4}"#)?;
//! let settings = config.resolve();
//! assert_eq!(settings.density, 4);
//! ```

use crate::error::ConfigError;
use glam::Vec2;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Largest accepted surface edge, in pixels.
pub const MAX_SURFACE_DIM: u32 = 8192;

/// Range shared by the three smoothing coefficients.
pub const LERP_RANGE: (f32, f32) = (0.05, 1.0);

/// Accepted repulsion threshold radius.
pub const REPEL_THRESHOLD_RANGE: (f32, f32) = (20.0, 200.0);

/// Accepted density levels.
pub const DENSITY_RANGE: (u8, u8) = (1, 4);

/// Accepted font sizes, in pixels.
pub const FONT_SIZE_RANGE: (f32, f32) = (1.0, 512.0);

const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([5, 15, 20, 255]);
const DEFAULT_FONT_COLOR: Rgba<u8> = Rgba([60, 200, 255, 255]);

/// Configuration as received from the host.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub width: f64,
    pub height: f64,
    pub message: String,
    /// `stroke` or `fill`.
    pub draw_type: String,
    pub background_color: String,
    pub font_color: String,
    pub font_family: String,
    pub font_size: f64,
    pub text_align: String,
    pub text_baseline: String,
    /// 1 (sparse) to 4 (every lit pixel).
    pub density: f64,
    pub glow: bool,
    /// Position smoothing.
    pub p_lerp_amt: f64,
    /// Velocity smoothing.
    pub v_lerp_amt: f64,
    /// Pointer (repulsion target) smoothing.
    pub m_lerp_amt: f64,
    pub repel_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 150.0,
            message: "NO MESSAGE".into(),
            draw_type: "stroke".into(),
            background_color: "rgb(5, 15, 20)".into(),
            font_color: "rgb(60, 200, 255)".into(),
            font_family: "monospace".into(),
            font_size: 40.0,
            text_align: "center".into(),
            text_baseline: "middle".into(),
            density: 3.0,
            glow: true,
            p_lerp_amt: 0.25,
            v_lerp_amt: 0.1,
            m_lerp_amt: 0.5,
            repel_threshold: 50.0,
        }
    }
}

impl Config {
    /// Parse a configuration document. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Type and clamp every option.
    ///
    /// Never fails: unparseable strings and non-finite numbers fall back to the
    /// field's default with a warning.
    pub fn resolve(&self) -> Settings {
        let defaults = Config::default();

        Settings {
            width: clamp_dimension(self.width),
            height: clamp_dimension(self.height),
            message: self.message.clone(),
            draw_type: parse_or(&self.draw_type, DrawType::Stroke, "drawType"),
            background_color: parse_color_or(&self.background_color, DEFAULT_BACKGROUND, "backgroundColor"),
            font_color: parse_color_or(&self.font_color, DEFAULT_FONT_COLOR, "fontColor"),
            font_family: self.font_family.clone(),
            font_size: clamp_or(self.font_size, FONT_SIZE_RANGE, defaults.font_size),
            text_align: parse_or(&self.text_align, TextAlign::Center, "textAlign"),
            text_baseline: parse_or(&self.text_baseline, TextBaseline::Middle, "textBaseline"),
            density: density_level(self.density, defaults.density),
            glow: self.glow,
            position_lerp: clamp_or(self.p_lerp_amt, LERP_RANGE, defaults.p_lerp_amt),
            velocity_lerp: clamp_or(self.v_lerp_amt, LERP_RANGE, defaults.v_lerp_amt),
            pointer_lerp: clamp_or(self.m_lerp_amt, LERP_RANGE, defaults.m_lerp_amt),
            repel_threshold: clamp_or(self.repel_threshold, REPEL_THRESHOLD_RANGE, defaults.repel_threshold),
        }
    }
}

/// Truncate and clamp a requested surface edge to `[0, MAX_SURFACE_DIM]`.
/// Non-finite values become zero.
pub fn clamp_dimension(value: f64) -> u32 {
    if value.is_finite() {
        value.clamp(0.0, MAX_SURFACE_DIM as f64) as u32
    } else {
        0
    }
}

fn clamp_or(value: f64, (min, max): (f32, f32), default: f64) -> f32 {
    let value = if value.is_finite() { value } else { default };
    (value as f32).clamp(min, max)
}

fn density_level(value: f64, default: f64) -> u8 {
    let value = if value.is_finite() { value } else { default };
    (value.trunc() as i64).clamp(DENSITY_RANGE.0 as i64, DENSITY_RANGE.1 as i64) as u8
}

fn parse_or<T: FromStr<Err = ConfigError>>(raw: &str, default: T, field: &str) -> T {
    raw.parse().unwrap_or_else(|e| {
        log::warn!("{field}: {e}; using default");
        default
    })
}

fn parse_color_or(raw: &str, default: Rgba<u8>, field: &str) -> Rgba<u8> {
    parse_color(raw).unwrap_or_else(|e| {
        log::warn!("{field}: {e}; using default");
        default
    })
}

/// Fully resolved, clamped configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub message: String,
    pub draw_type: DrawType,
    pub background_color: Rgba<u8>,
    pub font_color: Rgba<u8>,
    pub font_family: String,
    pub font_size: f32,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
    /// Always within [`DENSITY_RANGE`].
    pub density: u8,
    pub glow: bool,
    pub position_lerp: f32,
    pub velocity_lerp: f32,
    pub pointer_lerp: f32,
    pub repel_threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().resolve()
    }
}

impl Settings {
    /// Sampling stride over the flat RGBA channel index. Zero keeps every lit pixel.
    #[inline]
    pub fn pixel_density(&self) -> usize {
        (4 - self.density as usize) * 4
    }

    /// Geometric center of the surface.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(0.5 * self.width as f32, 0.5 * self.height as f32)
    }

    /// Canvas-style font shorthand, e.g. `40px monospace`.
    pub fn font_style(&self) -> String {
        format!("{}px {}", self.font_size, self.font_family)
    }

    /// Same settings on a surface of a different size.
    pub fn with_dimensions(&self, width: u32, height: u32) -> Self {
        Self {
            width: width.min(MAX_SURFACE_DIM),
            height: height.min(MAX_SURFACE_DIM),
            ..self.clone()
        }
    }
}

/// How glyphs are sampled into particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawType {
    /// Outline of each glyph (default).
    #[default]
    Stroke,
    /// Every pixel of each glyph.
    Fill,
}

impl FromStr for DrawType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stroke" => Ok(DrawType::Stroke),
            "fill" => Ok(DrawType::Fill),
            _ => Err(ConfigError::UnknownDrawType(s.to_string())),
        }
    }
}

/// Horizontal anchoring of the message around the surface center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Start,
    End,
    Left,
    Right,
    #[default]
    Center,
}

impl FromStr for TextAlign {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(TextAlign::Start),
            "end" => Ok(TextAlign::End),
            "left" => Ok(TextAlign::Left),
            "right" => Ok(TextAlign::Right),
            "center" => Ok(TextAlign::Center),
            _ => Err(ConfigError::UnknownTextAlign(s.to_string())),
        }
    }
}

/// Vertical anchoring of the message around the surface center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    Hanging,
    #[default]
    Middle,
    Alphabetic,
    Ideographic,
    Bottom,
}

impl FromStr for TextBaseline {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(TextBaseline::Top),
            "hanging" => Ok(TextBaseline::Hanging),
            "middle" => Ok(TextBaseline::Middle),
            "alphabetic" => Ok(TextBaseline::Alphabetic),
            "ideographic" => Ok(TextBaseline::Ideographic),
            "bottom" => Ok(TextBaseline::Bottom),
            _ => Err(ConfigError::UnknownTextBaseline(s.to_string())),
        }
    }
}

// ========== Colors ==========

/// Parse a CSS-style color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
/// `rgb(r, g, b)`, `rgba(r, g, b, a)` or a handful of named colors.
pub fn parse_color(raw: &str) -> Result<Rgba<u8>, ConfigError> {
    let s = raw.trim().to_ascii_lowercase();
    let invalid = || ConfigError::InvalidColor(raw.to_string());

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }

    if let Some(body) = s.strip_prefix("rgba(").or_else(|| s.strip_prefix("rgb(")) {
        let body = body.strip_suffix(')').ok_or_else(invalid)?;
        return parse_functional(body).ok_or_else(invalid);
    }

    named_color(&s).ok_or_else(invalid)
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

fn parse_functional(body: &str) -> Option<Rgba<u8>> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |p: &str| p.parse::<f32>().ok().filter(|v| v.is_finite()).map(|v| v.round().clamp(0.0, 255.0) as u8);
    let alpha = match parts.get(3) {
        Some(a) => {
            let a = a.parse::<f32>().ok().filter(|v| v.is_finite())?;
            (a.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };

    Some(Rgba([channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha]))
}

fn named_color(name: &str) -> Option<Rgba<u8>> {
    let rgb = match name {
        "transparent" => return Some(Rgba([0, 0, 0, 0])),
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "lime" => [0, 255, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    };
    Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}
