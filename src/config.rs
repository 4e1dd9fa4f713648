//! Ripple configuration.
//!
//! # Example
//! ```ignore
//! let config = RippleConfig::new()
//!     .ripple_color(Argb(0x80FF_4081))
//!     .ripple_duration(Duration::from_millis(300))
//!     .shape_type(ShapeType::Heart)
//!     .spin(true);
//! ```

use std::time::Duration;

use crate::bounds::ScalePolicy;
use crate::color::{derive_background_color, Argb, PaletteMode};
use crate::image_source::Background;
use crate::shape::ShapeType;
use crate::timing::TimingFunction;

/// Default expansion and fade duration.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(400);
/// Default radius the ripple grows to, in device-independent units.
pub const DEFAULT_MAX_RADIUS: f32 = 200.0;
pub const DEFAULT_RIPPLE_COLOR: Argb = Argb(0x7000_FF00);

/// Everything a surface needs to know about how its ripple looks and moves.
///
/// Builder methods consume and return the config; `set_*` methods mutate in
/// place and follow the same rules. Both return the same instance so calls
/// chain.
#[derive(Clone, Debug)]
pub struct RippleConfig {
    ripple_color: Argb,
    ripple_duration: Duration,
    /// `None` until set explicitly; then it stops tracking `ripple_duration`.
    fade_duration: Option<Duration>,
    max_ripple_radius: f32,
    interpolation: TimingFunction,
    shape_type: ShapeType,
    scale_policy: ScalePolicy,
    palette_mode: PaletteMode,
    enable_palette: bool,
    full: bool,
    spin: bool,
    background: Option<Background>,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            ripple_color: DEFAULT_RIPPLE_COLOR,
            ripple_duration: DEFAULT_DURATION,
            fade_duration: None,
            max_ripple_radius: DEFAULT_MAX_RADIUS,
            interpolation: TimingFunction::EaseIn,
            shape_type: ShapeType::Circle,
            scale_policy: ScalePolicy::FitCenter,
            palette_mode: PaletteMode::Vibrant,
            enable_palette: false,
            full: false,
            spin: false,
            background: None,
        }
    }
}

impl RippleConfig {
    /// Create a new ripple config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ripple config with a custom color.
    pub fn with_color(color: Argb) -> Self {
        Self::new().ripple_color(color)
    }

    pub fn ripple_color(mut self, color: Argb) -> Self {
        self.set_ripple_color(color);
        self
    }

    pub fn ripple_duration(mut self, duration: Duration) -> Self {
        self.set_ripple_duration(duration);
        self
    }

    pub fn fade_duration(mut self, duration: Duration) -> Self {
        self.set_fade_duration(duration);
        self
    }

    /// Ignored while full mode is on.
    pub fn max_ripple_radius(mut self, radius: f32) -> Self {
        self.set_max_ripple_radius(radius);
        self
    }

    pub fn interpolation(mut self, curve: TimingFunction) -> Self {
        self.set_interpolation(curve);
        self
    }

    pub fn shape_type(mut self, shape_type: ShapeType) -> Self {
        self.set_shape_type(shape_type);
        self
    }

    pub fn scale_policy(mut self, policy: ScalePolicy) -> Self {
        self.set_scale_policy(policy);
        self
    }

    /// Ignored unless palette sampling is enabled.
    pub fn palette_mode(mut self, mode: PaletteMode) -> Self {
        self.set_palette_mode(mode);
        self
    }

    pub fn enable_palette(mut self, enable: bool) -> Self {
        self.set_enable_palette(enable);
        self
    }

    /// Grow the ripple to cover the whole element instead of the max radius.
    pub fn full(mut self, full: bool) -> Self {
        self.set_full(full);
        self
    }

    pub fn spin(mut self, spin: bool) -> Self {
        self.set_spin(spin);
        self
    }

    pub fn background(mut self, background: impl Into<Background>) -> Self {
        self.set_background(Some(background.into()));
        self
    }

    pub fn set_ripple_color(&mut self, color: Argb) -> &mut Self {
        self.ripple_color = color;
        self
    }

    pub fn set_ripple_duration(&mut self, duration: Duration) -> &mut Self {
        self.ripple_duration = duration;
        self
    }

    pub fn set_fade_duration(&mut self, duration: Duration) -> &mut Self {
        self.fade_duration = Some(duration);
        self
    }

    pub fn set_max_ripple_radius(&mut self, radius: f32) -> &mut Self {
        if !self.full {
            self.max_ripple_radius = radius;
        }
        self
    }

    pub fn set_interpolation(&mut self, curve: TimingFunction) -> &mut Self {
        self.interpolation = curve;
        self
    }

    pub fn set_shape_type(&mut self, shape_type: ShapeType) -> &mut Self {
        self.shape_type = shape_type;
        self
    }

    pub fn set_scale_policy(&mut self, policy: ScalePolicy) -> &mut Self {
        self.scale_policy = policy;
        self
    }

    pub fn set_palette_mode(&mut self, mode: PaletteMode) -> &mut Self {
        if self.enable_palette {
            self.palette_mode = mode;
        }
        self
    }

    pub fn set_enable_palette(&mut self, enable: bool) -> &mut Self {
        self.enable_palette = enable;
        self
    }

    pub fn set_full(&mut self, full: bool) -> &mut Self {
        self.full = full;
        self
    }

    pub fn set_spin(&mut self, spin: bool) -> &mut Self {
        self.spin = spin;
        self
    }

    pub fn set_background(&mut self, background: Option<Background>) -> &mut Self {
        self.background = background;
        self
    }

    pub fn get_ripple_color(&self) -> Argb {
        self.ripple_color
    }

    /// Wash color, always derived from the ripple color.
    pub fn background_color(&self) -> Argb {
        derive_background_color(self.ripple_color)
    }

    pub fn get_ripple_duration(&self) -> Duration {
        self.ripple_duration
    }

    /// The explicitly set fade duration, or the ripple duration.
    pub fn get_fade_duration(&self) -> Duration {
        self.fade_duration.unwrap_or(self.ripple_duration)
    }

    pub fn get_max_ripple_radius(&self) -> f32 {
        self.max_ripple_radius
    }

    pub fn get_interpolation(&self) -> &TimingFunction {
        &self.interpolation
    }

    pub fn get_shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn get_scale_policy(&self) -> ScalePolicy {
        self.scale_policy
    }

    /// `Disabled` whenever palette sampling is off, whatever was stored.
    pub fn get_palette_mode(&self) -> PaletteMode {
        if self.enable_palette {
            self.palette_mode
        } else {
            PaletteMode::Disabled
        }
    }

    pub fn is_palette_enabled(&self) -> bool {
        self.enable_palette
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn is_spin(&self) -> bool {
        self.spin
    }

    pub fn get_background(&self) -> Option<&Background> {
        self.background.as_ref()
    }
}
