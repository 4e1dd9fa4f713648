//! Background images for ripple surfaces.
//!
//! Supports PNG, JPEG, GIF, WebP raster formats and SVG vector graphics. An
//! image is decoded (or rasterized, for SVG) exactly once when loaded; the
//! resulting pixels are shared between the surface and palette workers.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::color::Argb;

/// Source for an image - can be a file path or in-memory bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Raster image from a file path (PNG, JPEG, GIF, WebP)
    Path(PathBuf),
    /// Raster image from in-memory bytes
    Bytes(Arc<[u8]>),
    /// SVG from a file path
    SvgPath(PathBuf),
    /// SVG from in-memory bytes
    SvgBytes(Arc<[u8]>),
}

impl ImageSource {
    /// Check if this is an SVG source
    pub fn is_svg(&self) -> bool {
        matches!(self, ImageSource::SvgPath(_) | ImageSource::SvgBytes(_))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
        {
            ImageSource::SvgPath(path)
        } else {
            ImageSource::Path(path)
        }
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::from(PathBuf::from(path))
    }
}

impl From<String> for ImageSource {
    fn from(path: String) -> Self {
        ImageSource::from(PathBuf::from(path))
    }
}

/// Errors raised while loading a background image.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to parse svg: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("svg has an empty canvas")]
    EmptySvg,
}

/// Decoded background image pixels.
///
/// Cloning is cheap; clones share the same pixel buffer.
#[derive(Clone)]
pub struct BackgroundImage {
    pixels: Arc<RgbaImage>,
}

impl BackgroundImage {
    /// Decode or rasterize `source`.
    pub fn load(source: &ImageSource) -> Result<Self, ImageError> {
        let pixels = match source {
            ImageSource::Path(path) => image::open(path)?.to_rgba8(),
            ImageSource::Bytes(bytes) => image::load_from_memory(bytes)?.to_rgba8(),
            ImageSource::SvgPath(path) => {
                let data = std::fs::read(path).map_err(|source| ImageError::Io {
                    path: path.clone(),
                    source,
                })?;
                rasterize_svg(&data)?
            }
            ImageSource::SvgBytes(bytes) => rasterize_svg(bytes)?,
        };
        Ok(Self::from_rgba(pixels))
    }

    /// Wrap pixels the host already has in memory.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Intrinsic `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &Arc<RgbaImage> {
        &self.pixels
    }

    /// Whether both handles refer to the same decoded pixels.
    pub fn same_pixels(&self, other: &BackgroundImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl fmt::Debug for BackgroundImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        f.debug_struct("BackgroundImage")
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

/// What a surface paints underneath the ripple.
#[derive(Debug, Clone)]
pub enum Background {
    /// Solid color filling the clip rect.
    Color(Argb),
    /// Image placed by the surface's scale policy.
    Image(BackgroundImage),
}

impl Background {
    pub fn image(&self) -> Option<&BackgroundImage> {
        match self {
            Background::Image(image) => Some(image),
            Background::Color(_) => None,
        }
    }
}

impl From<Argb> for Background {
    fn from(color: Argb) -> Self {
        Background::Color(color)
    }
}

impl From<BackgroundImage> for Background {
    fn from(image: BackgroundImage) -> Self {
        Background::Image(image)
    }
}

/// Rasterize SVG data at its intrinsic size.
fn rasterize_svg(bytes: &[u8]) -> Result<RgbaImage, ImageError> {
    let tree = resvg::usvg::Tree::from_data(bytes, &resvg::usvg::Options::default())?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        resvg::tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(ImageError::EmptySvg)?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    let mut image = RgbaImage::new(size.width(), size.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    Ok(image)
}
