//! Progress curves.
//!
//! Expansion runs its progress through the configured curve before scaling
//! the shape; the fade always uses [`TimingFunction::EaseInOut`].

use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Maps linear progress in `0.0..=1.0` to eased progress.
#[derive(Clone, Default)]
pub enum TimingFunction {
    Linear,
    /// Quadratic acceleration. The shape leaves the finger slowly and
    /// speeds up towards its full size.
    #[default]
    EaseIn,
    /// Half a cosine period: slow at both ends.
    EaseInOut,
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl TimingFunction {
    pub fn custom(curve: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        TimingFunction::Custom(Arc::new(curve))
    }

    pub fn evaluate(&self, progress: f32) -> f32 {
        match self {
            TimingFunction::Linear => progress,
            TimingFunction::EaseIn => progress * progress,
            TimingFunction::EaseInOut => 0.5 - 0.5 * (progress * PI).cos(),
            TimingFunction::Custom(curve) => curve(progress),
        }
    }
}

impl fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimingFunction::Linear => "Linear",
            TimingFunction::EaseIn => "EaseIn",
            TimingFunction::EaseInOut => "EaseInOut",
            TimingFunction::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}
