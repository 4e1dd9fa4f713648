//! Touch ripple feedback for interactive elements.
//!
//! A ripple is a shape that grows from the touch point, optionally spinning,
//! over an optional background image or color, and fades out after release.
//! Its color can be sampled from the background image's palette.
//!
//! The crate does not paint anything itself. A host forwards pointer events,
//! layout sizes and frame ticks to a [`surface::RippleEffectSurface`] (or to
//! the per-element [`compat::RippleCompat`] registry) and paints the
//! [`surface::DrawCommand`] it reads back. Frame ticks come from a
//! [`scheduler::FrameScheduler`]: [`driver::LoopScheduler`] runs them on a
//! calloop event loop, [`scheduler::ManualScheduler`] lets the host or a test
//! drive the clock.
//!
//! ```ignore
//! use ripple::prelude::*;
//!
//! let scheduler = Rc::new(ManualScheduler::new());
//! let config = RippleConfig::new().shape_type(ShapeType::Heart).spin(true);
//! let mut surface = RippleEffectSurface::new(config, scheduler.clone());
//! surface.on_measured(200.0, 80.0);
//! surface.on_pointer_down(40.0, 40.0);
//! scheduler.run_for(Duration::from_millis(200), || surface.on_frame());
//! let command = surface.draw_command();
//! ```

pub mod bounds;
pub mod color;
pub mod compat;
pub mod config;
pub mod driver;
pub mod image_source;
pub mod listeners;
pub mod palette;
pub mod scheduler;
pub mod shape;
pub mod surface;
pub mod timing;
pub mod transform;

pub mod prelude {
    pub use crate::bounds::{compute_dest_rect, Padding, Rect, ScalePolicy};
    pub use crate::color::{alpha_color, derive_background_color, Argb, PaletteMode};
    pub use crate::compat::{Element, ElementId, ElementKind, FocusHelper, RippleCompat};
    pub use crate::config::RippleConfig;
    pub use crate::driver::LoopScheduler;
    pub use crate::image_source::{Background, BackgroundImage, ImageError, ImageSource};
    pub use crate::listeners::{CompletionListeners, ListenerId};
    pub use crate::scheduler::{FrameScheduler, ManualScheduler, FRAME_INTERVAL};
    pub use crate::shape::{produce_shape, ShapeType};
    pub use crate::surface::{DrawCommand, Phase, RippleEffectSurface};
    pub use crate::timing::TimingFunction;
    pub use crate::transform::Transform;
}
