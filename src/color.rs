//! Color helpers for the ripple and its background wash.
//!
//! Colors are packed ARGB32 values. Everything here is a pure function over
//! [`Argb`], so the surface can derive its wash color and palette tint
//! without holding any state.

use crate::palette::Palette;

/// Offset applied to each channel when deriving the background wash color.
pub const BACKGROUND_OFFSET: u8 = 56;

/// Color used when a palette sample has no swatch for the requested mode.
pub const PALETTE_FALLBACK: Argb = Argb(0xA000_FF00);

/// Alpha applied to a palette color before it replaces the ripple color.
pub const PALETTE_ALPHA: u8 = 128;

/// A packed `0xAARRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Argb(pub u32);

impl Argb {
    pub const TRANSPARENT: Argb = Argb(0);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Opaque color from red, green and blue channels.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl From<u32> for Argb {
    fn from(value: u32) -> Self {
        Argb(value)
    }
}

impl From<Argb> for u32 {
    fn from(color: Argb) -> Self {
        color.0
    }
}

/// Which swatch of a background image's palette tints the ripple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaletteMode {
    Disabled,
    #[default]
    Vibrant,
    VibrantLight,
    VibrantDark,
    Muted,
    MutedLight,
    MutedDark,
}

/// Replace the alpha channel of `color`, keeping its RGB bits.
pub const fn alpha_color(color: Argb, alpha: u8) -> Argb {
    Argb((alpha as u32) << 24 | (color.0 & 0x00FF_FFFF))
}

/// Derive the translucent background wash color from the ripple color.
///
/// Each RGB channel is pushed [`BACKGROUND_OFFSET`] away from mid-gray: dark
/// channels get brighter, bright channels get darker. Alpha is copied.
pub fn derive_background_color(ripple_color: Argb) -> Argb {
    Argb::from_argb(
        ripple_color.alpha(),
        offset_channel(ripple_color.red()),
        offset_channel(ripple_color.green()),
        offset_channel(ripple_color.blue()),
    )
}

fn offset_channel(value: u8) -> u8 {
    let value = i32::from(value);
    let offset = i32::from(BACKGROUND_OFFSET);
    let shifted = if value < 128 {
        value + offset
    } else {
        value - offset
    };
    shifted.clamp(0, 255) as u8
}

/// Pick the swatch of `palette` selected by `mode`.
///
/// Missing swatches resolve to [`PALETTE_FALLBACK`]. `Disabled` resolves to
/// a fully transparent black and must never be applied to a live ripple.
pub fn resolve_palette_color(palette: &Palette, mode: PaletteMode) -> Argb {
    let swatch = match mode {
        PaletteMode::Disabled => return Argb::TRANSPARENT,
        PaletteMode::Vibrant => palette.vibrant(),
        PaletteMode::VibrantLight => palette.light_vibrant(),
        PaletteMode::VibrantDark => palette.dark_vibrant(),
        PaletteMode::Muted => palette.muted(),
        PaletteMode::MutedLight => palette.light_muted(),
        PaletteMode::MutedDark => palette.dark_muted(),
    };
    swatch.map(|s| s.rgb()).unwrap_or(PALETTE_FALLBACK)
}

/// Convert an RGB color to `[hue (0..360), saturation (0..1), lightness (0..1)]`.
pub fn rgb_to_hsl(color: Argb) -> [f32; 3] {
    let r = f32::from(color.red()) / 255.0;
    let g = f32::from(color.green()) / 255.0;
    let b = f32::from(color.blue()) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    if delta == 0.0 {
        return [0.0, 0.0, l];
    }

    let h = if max == r {
        ((g - b) / delta) % 6.0
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let s = delta / (1.0 - (2.0 * l - 1.0).abs());

    [(h * 60.0).rem_euclid(360.0), s, l]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_color_replaces_alpha_only() {
        let color = alpha_color(Argb(0x12_34_56_78), 0xAB);
        assert_eq!(color, Argb(0xAB_34_56_78));
    }

    #[test]
    fn test_background_color_from_black() {
        let bg = derive_background_color(Argb(0x70_00_00_00));
        assert_eq!(bg.alpha(), 0x70);
        assert_eq!((bg.red(), bg.green(), bg.blue()), (56, 56, 56));
    }

    #[test]
    fn test_background_color_pushes_away_from_gray() {
        let bg = derive_background_color(Argb::from_argb(0xFF, 127, 128, 255));
        assert_eq!(bg.red(), 183);
        assert_eq!(bg.green(), 72);
        assert_eq!(bg.blue(), 199);
    }

    #[test]
    fn test_background_channels_stay_in_range() {
        for value in 0..=255u8 {
            let shifted = offset_channel(value);
            let distance = (i32::from(shifted) - i32::from(value)).abs();
            assert_eq!(distance, 56, "channel {} moved by {}", value, distance);
        }
    }

    #[test]
    fn test_background_is_not_an_inverse() {
        let once = derive_background_color(Argb(0xFF_10_20_30));
        let twice = derive_background_color(once);
        assert_ne!(twice, Argb(0xFF_10_20_30));
    }

    #[test]
    fn test_disabled_palette_resolves_to_zero() {
        let palette = Palette::default();
        assert_eq!(
            resolve_palette_color(&palette, PaletteMode::Disabled),
            Argb(0)
        );
    }

    #[test]
    fn test_missing_swatch_uses_fallback() {
        let palette = Palette::default();
        assert_eq!(
            resolve_palette_color(&palette, PaletteMode::MutedDark),
            PALETTE_FALLBACK
        );
    }

    #[test]
    fn test_hsl_primaries() {
        let [h, s, l] = rgb_to_hsl(Argb::from_rgb(255, 0, 0));
        assert_eq!((h, s, l), (0.0, 1.0, 0.5));

        let [h, _, _] = rgb_to_hsl(Argb::from_rgb(0, 0, 255));
        assert!((h - 240.0).abs() < 1e-3, "blue hue was {}", h);

        let [_, s, l] = rgb_to_hsl(Argb::from_rgb(128, 128, 128));
        assert_eq!(s, 0.0);
        assert!((l - 0.502).abs() < 1e-2);
    }
}
