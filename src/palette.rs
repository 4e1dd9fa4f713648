//! Dominant-color sampling of background images.
//!
//! A [`Palette`] is built by quantizing an image down to a handful of
//! representative colors and then picking, for each of six targets (light,
//! normal and dark variants of vibrant and muted), the color that scores best
//! against that target's saturation and lightness.
//!
//! Sampling is the only potentially slow operation in the crate, so
//! [`extract_dominant_color`] runs it on a worker thread and hands back a
//! [`PaletteJob`] the surface polls on later frames.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use image::imageops::FilterType;
use image::RgbaImage;

use crate::color::{alpha_color, resolve_palette_color, rgb_to_hsl, Argb, PaletteMode, PALETTE_ALPHA};
use crate::image_source::BackgroundImage;

/// Images larger than this many pixels are downsampled before quantizing.
const RESIZE_AREA: u64 = 112 * 112;
/// Upper bound on the number of colors kept after quantization.
const MAX_COLORS: usize = 16;

const WEIGHT_SATURATION: f32 = 0.24;
const WEIGHT_LIGHTNESS: f32 = 0.52;
const WEIGHT_POPULATION: f32 = 0.24;

/// A representative color of an image and how many pixels it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    rgb: Argb,
    population: u32,
    hsl: [f32; 3],
}

impl Swatch {
    pub fn new(rgb: Argb, population: u32) -> Self {
        let rgb = alpha_color(rgb, 0xFF);
        Self {
            rgb,
            population,
            hsl: rgb_to_hsl(rgb),
        }
    }

    /// Opaque color of this swatch.
    pub fn rgb(&self) -> Argb {
        self.rgb
    }

    pub fn population(&self) -> u32 {
        self.population
    }

    /// `[hue, saturation, lightness]`
    pub fn hsl(&self) -> [f32; 3] {
        self.hsl
    }
}

/// Saturation and lightness windows a swatch must fall into for a target.
struct Target {
    /// (min, target, max)
    saturation: (f32, f32, f32),
    lightness: (f32, f32, f32),
}

impl Target {
    const LIGHT_VIBRANT: Target = Target {
        saturation: (0.35, 1.0, 1.0),
        lightness: (0.55, 0.74, 1.0),
    };
    const VIBRANT: Target = Target {
        saturation: (0.35, 1.0, 1.0),
        lightness: (0.3, 0.5, 0.7),
    };
    const DARK_VIBRANT: Target = Target {
        saturation: (0.35, 1.0, 1.0),
        lightness: (0.0, 0.26, 0.45),
    };
    const LIGHT_MUTED: Target = Target {
        saturation: (0.0, 0.3, 0.4),
        lightness: (0.55, 0.74, 1.0),
    };
    const MUTED: Target = Target {
        saturation: (0.0, 0.3, 0.4),
        lightness: (0.3, 0.5, 0.7),
    };
    const DARK_MUTED: Target = Target {
        saturation: (0.0, 0.3, 0.4),
        lightness: (0.0, 0.26, 0.45),
    };

    fn accepts(&self, swatch: &Swatch) -> bool {
        let [_, s, l] = swatch.hsl;
        (self.saturation.0..=self.saturation.2).contains(&s)
            && (self.lightness.0..=self.lightness.2).contains(&l)
    }

    fn score(&self, swatch: &Swatch, max_population: u32) -> f32 {
        let [_, s, l] = swatch.hsl;
        let population = swatch.population as f32 / max_population.max(1) as f32;
        WEIGHT_SATURATION * (1.0 - (s - self.saturation.1).abs())
            + WEIGHT_LIGHTNESS * (1.0 - (l - self.lightness.1).abs())
            + WEIGHT_POPULATION * population
    }
}

/// Selection order matters: a swatch picked for one target is not offered to
/// the following ones.
const TARGETS: [Target; 6] = [
    Target::LIGHT_VIBRANT,
    Target::VIBRANT,
    Target::DARK_VIBRANT,
    Target::LIGHT_MUTED,
    Target::MUTED,
    Target::DARK_MUTED,
];

/// Dominant-color sample of an image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
    /// Indexed like [`TARGETS`].
    selected: [Option<Swatch>; 6],
}

impl Palette {
    /// Sample `image`. Empty or fully filtered images yield an empty palette.
    pub fn generate(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Self::default();
        }

        let area = u64::from(width) * u64::from(height);
        let scaled;
        let pixels = if area > RESIZE_AREA {
            let ratio = (RESIZE_AREA as f64 / area as f64).sqrt();
            let scaled_width = ((f64::from(width) * ratio).ceil() as u32).max(1);
            let scaled_height = ((f64::from(height) * ratio).ceil() as u32).max(1);
            scaled = image::imageops::resize(image, scaled_width, scaled_height, FilterType::Triangle);
            &scaled
        } else {
            image
        };

        Self::from_swatches(quantize(pixels, MAX_COLORS))
    }

    /// Build a palette from already quantized swatches.
    pub fn from_swatches(swatches: Vec<Swatch>) -> Self {
        let max_population = swatches.iter().map(Swatch::population).max().unwrap_or(1);
        let mut selected = [None; 6];
        let mut used: Vec<Argb> = Vec::new();

        for (slot, target) in selected.iter_mut().zip(TARGETS.iter()) {
            let best = swatches
                .iter()
                .filter(|s| !used.contains(&s.rgb) && target.accepts(s))
                .max_by(|a, b| {
                    target
                        .score(a, max_population)
                        .partial_cmp(&target.score(b, max_population))
                        .unwrap_or(Ordering::Equal)
                });
            if let Some(swatch) = best {
                used.push(swatch.rgb);
                *slot = Some(*swatch);
            }
        }

        Self { swatches, selected }
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn light_vibrant(&self) -> Option<Swatch> {
        self.selected[0]
    }

    pub fn vibrant(&self) -> Option<Swatch> {
        self.selected[1]
    }

    pub fn dark_vibrant(&self) -> Option<Swatch> {
        self.selected[2]
    }

    pub fn light_muted(&self) -> Option<Swatch> {
        self.selected[3]
    }

    pub fn muted(&self) -> Option<Swatch> {
        self.selected[4]
    }

    pub fn dark_muted(&self) -> Option<Swatch> {
        self.selected[5]
    }
}

#[derive(Debug, Clone, Copy)]
struct ColorCount {
    rgb: [u8; 3],
    count: u32,
}

/// Reduce `image` to at most `max_colors` swatches.
fn quantize(image: &RgbaImage, max_colors: usize) -> Vec<Swatch> {
    let mut histogram: HashMap<u16, u32> = HashMap::new();
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < 128 {
            continue;
        }
        let key = (u16::from(r >> 3) << 10) | (u16::from(g >> 3) << 5) | u16::from(b >> 3);
        *histogram.entry(key).or_insert(0) += 1;
    }

    let colors: Vec<ColorCount> = histogram
        .into_iter()
        .map(|(key, count)| ColorCount {
            rgb: [
                widen((key >> 10) as u8 & 0x1F),
                widen((key >> 5) as u8 & 0x1F),
                widen(key as u8 & 0x1F),
            ],
            count,
        })
        .filter(|c| !is_blocked(c.rgb))
        .collect();

    if colors.len() <= max_colors {
        return colors
            .into_iter()
            .map(|c| Swatch::new(Argb::from_rgb(c.rgb[0], c.rgb[1], c.rgb[2]), c.count))
            .collect();
    }

    median_cut(colors, max_colors)
}

/// Expand a 5-bit channel back to 8 bits.
fn widen(value: u8) -> u8 {
    (value << 3) | (value >> 2)
}

/// Near-black and near-white colors never make useful tints.
fn is_blocked(rgb: [u8; 3]) -> bool {
    let [_, _, l] = rgb_to_hsl(Argb::from_rgb(rgb[0], rgb[1], rgb[2]));
    l <= 0.05 || l >= 0.95
}

struct ColorBox {
    colors: Vec<ColorCount>,
}

impl ColorBox {
    fn range(&self, channel: usize) -> u32 {
        let min = self.colors.iter().map(|c| c.rgb[channel]).min().unwrap_or(0);
        let max = self.colors.iter().map(|c| c.rgb[channel]).max().unwrap_or(0);
        u32::from(max - min) + 1
    }

    fn volume(&self) -> u32 {
        self.range(0) * self.range(1) * self.range(2)
    }

    fn can_split(&self) -> bool {
        self.colors.len() > 1
    }

    fn longest_channel(&self) -> usize {
        let ranges = [self.range(0), self.range(1), self.range(2)];
        if ranges[0] >= ranges[1] && ranges[0] >= ranges[2] {
            0
        } else if ranges[1] >= ranges[2] {
            1
        } else {
            2
        }
    }

    /// Split at the population median along the longest channel.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let channel = self.longest_channel();
        self.colors
            .sort_by_key(|c| (c.rgb[channel], c.rgb[(channel + 1) % 3], c.rgb[(channel + 2) % 3]));

        let total: u32 = self.colors.iter().map(|c| c.count).sum();
        let mut running = 0;
        let mut split_at = self.colors.len() - 1;
        for (i, color) in self.colors.iter().enumerate() {
            running += color.count;
            if running >= total / 2 {
                split_at = i + 1;
                break;
            }
        }
        let split_at = split_at.clamp(1, self.colors.len() - 1);

        let upper = self.colors.split_off(split_at);
        (self, ColorBox { colors: upper })
    }

    fn average(&self) -> Swatch {
        let total: u64 = self.colors.iter().map(|c| u64::from(c.count)).sum();
        let total = total.max(1);
        let channel = |i: usize| -> u8 {
            let sum: u64 = self
                .colors
                .iter()
                .map(|c| u64::from(c.rgb[i]) * u64::from(c.count))
                .sum();
            (sum / total) as u8
        };
        Swatch::new(Argb::from_rgb(channel(0), channel(1), channel(2)), total as u32)
    }
}

fn median_cut(colors: Vec<ColorCount>, max_colors: usize) -> Vec<Swatch> {
    let mut boxes = vec![ColorBox { colors }];
    while boxes.len() < max_colors {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.can_split())
            .max_by_key(|(_, b)| b.volume())
            .map(|(i, _)| i);
        let Some(index) = candidate else {
            break;
        };
        let (lower, upper) = boxes.swap_remove(index).split();
        boxes.push(lower);
        boxes.push(upper);
    }
    boxes.iter().map(ColorBox::average).collect()
}

/// Outcome of polling a [`PaletteJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteStatus {
    Pending,
    /// Ripple color to apply, already carrying [`PALETTE_ALPHA`].
    Ready(Argb),
    /// The worker went away without a result.
    Failed,
}

/// Handle to a dominant-color extraction running off the render path.
#[derive(Debug)]
pub struct PaletteJob {
    receiver: Receiver<Argb>,
}

impl PaletteJob {
    /// Non-blocking check for the extracted color.
    pub fn poll(&self) -> PaletteStatus {
        match self.receiver.try_recv() {
            Ok(color) => PaletteStatus::Ready(color),
            Err(TryRecvError::Empty) => PaletteStatus::Pending,
            Err(TryRecvError::Disconnected) => PaletteStatus::Failed,
        }
    }

    /// Block until the worker finishes.
    pub fn wait(self) -> Option<Argb> {
        self.receiver.recv().ok()
    }
}

/// Start sampling `image` for the swatch selected by `mode`.
///
/// Returns `None` without doing any work when `mode` is disabled or the image
/// has no pixels. The resulting color carries [`PALETTE_ALPHA`].
pub fn extract_dominant_color(image: &BackgroundImage, mode: PaletteMode) -> Option<PaletteJob> {
    let (width, height) = image.dimensions();
    if mode == PaletteMode::Disabled || width == 0 || height == 0 {
        return None;
    }

    let pixels: Arc<RgbaImage> = image.pixels().clone();
    let (sender, receiver) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("ripple-palette".into())
        .spawn(move || {
            let palette = Palette::generate(&pixels);
            let color = resolve_palette_color(&palette, mode);
            log::debug!("Palette {:?} resolved to {:#010x}", mode, color.0);
            let _ = sender.send(alpha_color(color, PALETTE_ALPHA));
        });

    if let Err(err) = spawned {
        log::warn!("Could not start palette extraction: {}", err);
        return None;
    }

    Some(PaletteJob { receiver })
}
