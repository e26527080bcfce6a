//! Rendering options and configuration.

use crate::archive::EntryPatterns;
use crate::error::{Error, Result};

/// Options for rendering notebooks to PDF.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Stroke coordinate space of one page
    pub canvas: CanvasSize,

    /// Output page width in PDF points; height follows the canvas aspect ratio
    pub page_width_pt: f32,

    /// Ink colour for strokes
    pub ink: Rgb,

    /// Pressure to line-width mapping
    pub pressure: PressureCurve,

    /// Page caption settings
    pub caption: CaptionOptions,

    /// What to do when a page has no paired background image
    pub background_policy: BackgroundPolicy,

    /// Entry name patterns for pages and backgrounds
    pub patterns: EntryPatterns,

    /// Compress content streams in the output
    pub compress: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas size.
    pub fn with_canvas(mut self, canvas: CanvasSize) -> Self {
        self.canvas = canvas;
        self
    }

    /// Set the output page width in points.
    pub fn with_page_width(mut self, points: f32) -> Self {
        self.page_width_pt = points;
        self
    }

    /// Set the ink colour.
    pub fn with_ink(mut self, ink: Rgb) -> Self {
        self.ink = ink;
        self
    }

    /// Set the pressure curve.
    pub fn with_pressure_curve(mut self, curve: PressureCurve) -> Self {
        self.pressure = curve;
        self
    }

    /// Set caption options.
    pub fn with_caption(mut self, caption: CaptionOptions) -> Self {
        self.caption = caption;
        self
    }

    /// Enable or disable page captions.
    pub fn with_captions(mut self, enabled: bool) -> Self {
        self.caption.enabled = enabled;
        self
    }

    /// Set the missing background policy.
    pub fn with_background_policy(mut self, policy: BackgroundPolicy) -> Self {
        self.background_policy = policy;
        self
    }

    /// Set entry name patterns.
    pub fn with_patterns(mut self, patterns: EntryPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Points per canvas unit.
    pub fn scale(&self) -> f32 {
        self.page_width_pt / self.canvas.width
    }

    /// Output page size in points.
    pub fn page_size_pt(&self) -> (f32, f32) {
        let scale = self.scale();
        (self.canvas.width * scale, self.canvas.height * scale)
    }

    /// Check that sizes and curve parameters are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.canvas.width > 0.0 && self.canvas.height > 0.0) {
            return Err(Error::InvalidOption(format!(
                "canvas must be positive, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if !(self.page_width_pt > 0.0) {
            return Err(Error::InvalidOption(format!(
                "page width must be positive, got {}",
                self.page_width_pt
            )));
        }
        self.pressure.validate()
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            page_width_pt: 612.0,
            ink: Rgb::INK_BLUE,
            pressure: PressureCurve::default(),
            caption: CaptionOptions::default(),
            background_policy: BackgroundPolicy::default(),
            patterns: EntryPatterns::default(),
            compress: true,
        }
    }
}

/// Page size in stroke coordinate units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    /// Nominal page width
    pub width: f32,
    /// Nominal page height
    pub height: f32,
}

impl CanvasSize {
    /// Create a canvas size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(4963.0, 6278.0)
    }
}

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    /// Dark blue ink.
    pub const INK_BLUE: Rgb = Rgb(0.0, 0.0, 0.45);

    /// Black.
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn parse_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::InvalidOption(format!("invalid colour: {}", s)));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| Error::InvalidOption(format!("invalid colour: {}", s)))
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Sub-linear mapping from pen pressure to line width:
/// `width = scale * pressure ^ exponent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureCurve {
    /// Width multiplier in canvas units
    pub scale: f32,
    /// Power applied to pressure, in `(0, 1)`
    pub exponent: f32,
}

impl PressureCurve {
    /// Create a curve.
    pub fn new(scale: f32, exponent: f32) -> Self {
        Self { scale, exponent }
    }

    /// Line width for a pressure value.
    pub fn width(&self, pressure: u32) -> f32 {
        self.scale * (pressure as f32).powf(self.exponent)
    }

    /// Check that the curve is monotonic and sub-linear.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0) {
            return Err(Error::InvalidOption(format!(
                "pressure scale must be positive, got {}",
                self.scale
            )));
        }
        if !(self.exponent > 0.0 && self.exponent < 1.0) {
            return Err(Error::InvalidOption(format!(
                "pressure exponent must be in (0, 1), got {}",
                self.exponent
            )));
        }
        Ok(())
    }
}

impl Default for PressureCurve {
    fn default() -> Self {
        Self::new(1.5, 0.5)
    }
}

/// Page caption settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionOptions {
    /// Draw captions at all
    pub enabled: bool,
    /// Font size in points
    pub font_size_pt: f32,
    /// Distance of the baseline from the top-left corner, in points
    pub margin_pt: f32,
    /// Time zone used for the time range
    pub timezone: CaptionTimezone,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            font_size_pt: 8.0,
            margin_pt: 18.0,
            timezone: CaptionTimezone::Local,
        }
    }
}

/// Time zone for caption timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptionTimezone {
    /// The machine's local time zone
    #[default]
    Local,
    /// UTC
    Utc,
}

/// Handling of pages without a paired background image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundPolicy {
    /// Render the page on a blank background
    #[default]
    Blank,
    /// Fail the notebook
    Fail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_page_width(595.0)
            .with_captions(false)
            .with_background_policy(BackgroundPolicy::Fail)
            .with_compression(false);

        assert_eq!(options.page_width_pt, 595.0);
        assert!(!options.caption.enabled);
        assert_eq!(options.background_policy, BackgroundPolicy::Fail);
        assert!(!options.compress);
    }

    #[test]
    fn test_page_size_follows_canvas_aspect() {
        let options = RenderOptions::new().with_canvas(CanvasSize::new(1000.0, 2000.0));
        let (w, h) = options.page_size_pt();
        assert!((w - 612.0).abs() < 1e-3);
        assert!((h - 1224.0).abs() < 1e-3);
    }

    #[test]
    fn test_pressure_curve_monotonic_and_sublinear() {
        let curve = PressureCurve::default();
        let mut previous = curve.width(0);
        assert_eq!(previous, 0.0);
        for p in 1..1024 {
            let w = curve.width(p);
            assert!(w >= previous, "width decreased at pressure {}", p);
            previous = w;
        }
        // Doubling pressure less than doubles the width.
        assert!(curve.width(200) < 2.0 * curve.width(100));
    }

    #[test]
    fn test_pressure_curve_validation() {
        assert!(PressureCurve::new(1.0, 0.5).validate().is_ok());
        assert!(PressureCurve::new(1.0, 1.0).validate().is_err());
        assert!(PressureCurve::new(0.0, 0.5).validate().is_err());
        assert!(RenderOptions::new()
            .with_canvas(CanvasSize::new(0.0, 10.0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_parse_hex_colour() {
        assert_eq!(Rgb::parse_hex("#000000").unwrap(), Rgb::BLACK);
        let c = Rgb::parse_hex("ff8000").unwrap();
        assert_eq!(c.0, 1.0);
        assert!((c.1 - 128.0 / 255.0).abs() < 1e-6);
        assert!(Rgb::parse_hex("#abc").is_err());
        assert!(Rgb::parse_hex("zzzzzz").is_err());
    }
}
