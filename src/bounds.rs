//! Destination-rect computation for background images.
//!
//! Given the rect a surface paints into and an image's intrinsic size,
//! [`compute_dest_rect`] returns where the image lands under a [`ScalePolicy`].
//! Every decision about which axis constrains the fit compares aspect ratios
//! by cross-multiplication so extreme ratios don't pick up division error.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect from its edges.
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Edge-inclusive point test.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Insets between an element's edges and its ripple clip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    pub const ZERO: Padding = Padding {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// The part of a `width x height` box left inside the insets.
    pub fn inset(&self, width: f32, height: f32) -> Rect {
        Rect::from_ltrb(self.left, self.top, width - self.right, height - self.bottom)
    }
}

/// `[top, right, bottom, left]`
impl From<[f32; 4]> for Padding {
    fn from(v: [f32; 4]) -> Self {
        Padding {
            top: v[0],
            right: v[1],
            bottom: v[2],
            left: v[3],
        }
    }
}

impl From<f32> for Padding {
    fn from(v: f32) -> Self {
        Padding::all(v)
    }
}

/// How a background image is fit into its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalePolicy {
    /// Stretch both axes independently to the container.
    FitXY,
    /// Scale to fit, centered on the free axis.
    #[default]
    FitCenter,
    /// Scale to fit, flush with the leading edge of the free axis.
    FitStart,
    /// Scale to fit, flush with the trailing edge of the free axis.
    FitEnd,
    /// Native size, centered. May overflow.
    Center,
    /// Scale to cover the container, centered. Overflows on one axis.
    CenterCrop,
    /// Native size if it fits, otherwise scaled down to fit. Centered.
    CenterInside,
    /// Native size at the container's top-left corner.
    Identity,
}

/// Where content sits along the axis it does not fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Start,
    Center,
    End,
}

/// Compute where content of `content_width x content_height` is drawn inside
/// `container` under `policy`.
///
/// Content with a non-positive size cannot be placed and yields the container.
pub fn compute_dest_rect(
    policy: ScalePolicy,
    container: Rect,
    content_width: f32,
    content_height: f32,
) -> Rect {
    if container.width == content_width && container.height == content_height {
        return container;
    }
    if content_width <= 0.0 || content_height <= 0.0 {
        return container;
    }

    // Greater: the container is relatively wider than the content, so height
    // constrains a fit.
    let wider = compare_aspect(container, content_width, content_height) != Ordering::Less;
    let native = (content_width, content_height);

    match policy {
        ScalePolicy::FitXY => container,
        ScalePolicy::Identity => Rect::new(container.x, container.y, content_width, content_height),
        ScalePolicy::Center => place(container, native, Anchor::Center),
        ScalePolicy::CenterCrop => {
            let scale = if wider {
                container.width / content_width
            } else {
                container.height / content_height
            };
            let size = (content_width * scale, content_height * scale);
            place(container, size, Anchor::Center)
        }
        ScalePolicy::CenterInside => {
            if container.width >= content_width && container.height >= content_height {
                place(container, native, Anchor::Center)
            } else {
                place(container, fit(container, native, wider), Anchor::Center)
            }
        }
        ScalePolicy::FitCenter => place(container, fit(container, native, wider), Anchor::Center),
        ScalePolicy::FitStart => place(container, fit(container, native, wider), Anchor::Start),
        ScalePolicy::FitEnd => place(container, fit(container, native, wider), Anchor::End),
    }
}

/// Largest size with the content's aspect that fits in `container`.
///
/// The constraining axis takes the container's extent as is; the other axis
/// is scaled and clamped so rounding never pushes it past the container.
fn fit(container: Rect, (width, height): (f32, f32), wider: bool) -> (f32, f32) {
    if wider {
        let scaled = width * (container.height / height);
        (scaled.min(container.width), container.height)
    } else {
        let scaled = height * (container.width / width);
        (container.width, scaled.min(container.height))
    }
}

/// Compare `container.width / container.height` with `width / height` without
/// dividing.
fn compare_aspect(container: Rect, width: f32, height: f32) -> Ordering {
    let lhs = f64::from(container.width) * f64::from(height);
    let rhs = f64::from(width) * f64::from(container.height);
    lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal)
}

/// Position content of `size` in `container`, centered on both axes unless
/// `anchor` pins it to one edge.
fn place(container: Rect, (width, height): (f32, f32), anchor: Anchor) -> Rect {
    let centered_x = container.x + (container.width - width) / 2.0;
    let centered_y = container.y + (container.height - height) / 2.0;

    let (x, y) = match anchor {
        Anchor::Center => (centered_x, centered_y),
        Anchor::Start => (
            free_axis(container.width, width, container.x, centered_x),
            free_axis(container.height, height, container.y, centered_y),
        ),
        Anchor::End => (
            free_axis(container.width, width, container.right() - width, centered_x),
            free_axis(container.height, height, container.bottom() - height, centered_y),
        ),
    };

    Rect::new(x, y, width, height)
}

/// Anchored position on an axis the content does not fill, centered otherwise.
fn free_axis(container_extent: f32, extent: f32, anchored: f32, centered: f32) -> f32 {
    if extent < container_extent {
        anchored
    } else {
        centered
    }
}
