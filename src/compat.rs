//! Binding ripples to host elements.
//!
//! [`RippleCompat`] keeps one [`RippleEffectSurface`] per element, keyed by
//! the element's [`ElementId`]. The host forwards that element's events
//! through it. Once a ripple finishes, the element's deferred action runs:
//! text fields take focus and show the soft keyboard, then the element
//! performs its click.
//!
//! # Example
//!
//! ```ignore
//! let mut ripples = RippleCompat::new(None);
//! ripples.apply_with_color(button.clone(), Argb(0x80FF_4081));
//! ripples.measured(button.id(), 120.0, 48.0);
//!
//! if ripples.pointer_down(button.id(), 30.0, 20.0) {
//!     // inside the clip; keep forwarding move/up
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::bounds::{Padding, ScalePolicy};
use crate::color::{Argb, PaletteMode};
use crate::config::RippleConfig;
use crate::image_source::{Background, BackgroundImage, ImageSource};
use crate::listeners::{CompletionListeners, ListenerId};
use crate::scheduler::FrameScheduler;
use crate::surface::{DrawCommand, RippleEffectSurface};

/// Button clip inset on the left and right.
pub const BUTTON_INSET_HORIZONTAL: f32 = 4.0;
pub const BUTTON_INSET_VERTICAL: f32 = 5.0;
pub const BUTTON_INSET_VERTICAL_APPCOMPAT: f32 = 6.0;
/// Text field clip inset on every side.
pub const TEXT_FIELD_INSET: f32 = 4.0;
pub const TEXT_FIELD_INSET_HORIZONTAL_APPCOMPAT: f32 = 4.0;
pub const TEXT_FIELD_INSET_TOP_APPCOMPAT: f32 = 10.0;
pub const TEXT_FIELD_INSET_BOTTOM_APPCOMPAT: f32 = 6.0;

/// Host-assigned identifier of an element.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ElementId(pub u64);

/// What kind of widget a ripple is attached to.
#[derive(Debug, Clone)]
pub enum ElementKind {
    Button {
        appcompat: bool,
    },
    TextField {
        appcompat: bool,
    },
    /// An image view. Its image and scale policy move into the ripple
    /// background, and its own padding becomes the clip inset.
    Image {
        image: Option<BackgroundImage>,
        scale_policy: ScalePolicy,
        padding: Padding,
    },
    Generic,
}

impl ElementKind {
    /// Clip insets for this kind of element.
    pub fn insets(&self) -> Padding {
        match self {
            ElementKind::Button { appcompat } => {
                let vertical = if *appcompat {
                    BUTTON_INSET_VERTICAL_APPCOMPAT
                } else {
                    BUTTON_INSET_VERTICAL
                };
                Padding::symmetric(BUTTON_INSET_HORIZONTAL, vertical)
            }
            ElementKind::TextField { appcompat: false } => Padding::all(TEXT_FIELD_INSET),
            ElementKind::TextField { appcompat: true } => Padding {
                top: TEXT_FIELD_INSET_TOP_APPCOMPAT,
                right: TEXT_FIELD_INSET_HORIZONTAL_APPCOMPAT,
                bottom: TEXT_FIELD_INSET_BOTTOM_APPCOMPAT,
                left: TEXT_FIELD_INSET_HORIZONTAL_APPCOMPAT,
            },
            ElementKind::Image { padding, .. } => *padding,
            ElementKind::Generic => Padding::ZERO,
        }
    }

    pub fn is_text_field(&self) -> bool {
        matches!(self, ElementKind::TextField { .. })
    }
}

/// An interactive element a ripple can be bound to.
pub trait Element {
    fn id(&self) -> ElementId;

    fn kind(&self) -> ElementKind;

    /// Scheduler serving this element's frame ticks and repaints.
    fn scheduler(&self) -> Rc<dyn FrameScheduler>;

    /// Fire the element's logical click.
    fn perform_click(&self);

    fn request_focus(&self) {}
}

/// Soft keyboard access, handed to [`RippleCompat::new`] by the host.
pub trait FocusHelper {
    fn show_soft_input(&self, element: ElementId);
}

struct Binding {
    element: Rc<dyn Element>,
    surface: RippleEffectSurface,
    finish_listener: ListenerId,
}

/// Registry of ripples, one per element.
pub struct RippleCompat {
    bindings: HashMap<ElementId, Binding>,
    focus_helper: Option<Box<dyn FocusHelper>>,
    /// Elements whose cycle finished during the current call.
    finished: Rc<RefCell<Vec<ElementId>>>,
}

impl RippleCompat {
    pub fn new(focus_helper: Option<Box<dyn FocusHelper>>) -> Self {
        Self {
            bindings: HashMap::new(),
            focus_helper,
            finished: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Bind a default ripple to `element`.
    pub fn apply(&mut self, element: Rc<dyn Element>) {
        self.apply_with_config(element, RippleConfig::default());
    }

    pub fn apply_with_color(&mut self, element: Rc<dyn Element>, ripple_color: Argb) {
        self.apply_with_config(element, RippleConfig::with_color(ripple_color));
    }

    /// Bind a ripple over an image loaded from `source`.
    ///
    /// A source that fails to load is logged and the ripple is bound without
    /// a background.
    pub fn apply_with_image_source(
        &mut self,
        element: Rc<dyn Element>,
        ripple_color: Argb,
        source: &ImageSource,
        scale_policy: ScalePolicy,
    ) {
        let mut config = RippleConfig::with_color(ripple_color);
        match BackgroundImage::load(source) {
            Ok(image) => {
                config.set_background(Some(image.into())).set_scale_policy(scale_policy);
            }
            Err(err) => log::warn!("Ripple background for {:?} not loaded: {}", element.id(), err),
        }
        self.apply_with_config(element, config);
    }

    /// Bind a ripple built from `config` to `element`.
    ///
    /// Applying again to the same element replaces its ripple; the old one is
    /// detached first. The replacement keeps the element's last measured size
    /// and the completion listeners the host subscribed.
    pub fn apply_with_config(&mut self, element: Rc<dyn Element>, config: RippleConfig) {
        let id = element.id();
        let mut carried = None;
        if let Some(mut old) = self.bindings.remove(&id) {
            log::debug!("Replacing ripple on {:?}", id);
            old.surface.remove_finish_listener(old.finish_listener);
            old.surface.on_detached();
            carried = Some((old.surface.listeners(), old.surface.measured_size()));
        }

        let kind = element.kind();
        let mut surface = RippleEffectSurface::new(config, element.scheduler());
        surface.set_padding(kind.insets());
        if let ElementKind::Image {
            image, scale_policy, ..
        } = kind
        {
            surface.set_background(image.map(Background::Image));
            surface.set_scale_policy(scale_policy);
        }
        if let Some((listeners, size)) = carried {
            surface.adopt_listeners(listeners);
            if let Some((width, height)) = size {
                surface.on_measured(width, height);
            }
        }

        let finished = self.finished.clone();
        let finish_listener = surface.add_finish_listener(move || finished.borrow_mut().push(id));

        log::debug!("Ripple applied to {:?}", id);
        self.bindings.insert(
            id,
            Binding {
                element,
                surface,
                finish_listener,
            },
        );
    }

    pub fn is_applied(&self, id: ElementId) -> bool {
        self.bindings.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn set_palette_mode(&mut self, id: ElementId, mode: PaletteMode) {
        if let Some(surface) = self.surface_mut(id) {
            surface.set_palette_mode(mode);
        }
    }

    pub fn set_scale_type(&mut self, id: ElementId, policy: ScalePolicy) {
        if let Some(surface) = self.surface_mut(id) {
            surface.set_scale_policy(policy);
        }
    }

    /// Start a ripple if `(x, y)` lands on the element's ripple area.
    ///
    /// Returns whether the touch was taken.
    pub fn pointer_down(&mut self, id: ElementId, x: f32, y: f32) -> bool {
        let Some(surface) = self.surface_mut(id) else {
            return false;
        };
        if !surface.contains(x, y) {
            log::trace!("Touch at ({}, {}) outside the ripple of {:?}", x, y, id);
            return false;
        }
        surface.on_pointer_down(x, y);
        true
    }

    pub fn pointer_move(&mut self, id: ElementId, x: f32, y: f32) {
        if let Some(surface) = self.surface_mut(id) {
            surface.on_pointer_move(x, y);
        }
    }

    pub fn pointer_up(&mut self, id: ElementId, x: f32, y: f32) {
        if let Some(surface) = self.surface_mut(id) {
            surface.on_pointer_up(x, y);
        }
    }

    pub fn pointer_cancel(&mut self, id: ElementId) {
        if let Some(surface) = self.surface_mut(id) {
            surface.on_pointer_cancel();
        }
    }

    pub fn measured(&mut self, id: ElementId, width: f32, height: f32) {
        if let Some(surface) = self.surface_mut(id) {
            surface.on_measured(width, height);
        }
    }

    /// Drop the element's ripple. No callback fires for it afterwards.
    pub fn detached(&mut self, id: ElementId) {
        if let Some(mut binding) = self.bindings.remove(&id) {
            binding.surface.on_detached();
            self.finished.borrow_mut().retain(|finished| *finished != id);
        }
    }

    /// Advance the element's ripple, then run deferred actions for any cycle
    /// that finished.
    pub fn frame(&mut self, id: ElementId) {
        if let Some(surface) = self.surface_mut(id) {
            surface.on_frame();
        }
        self.run_finished();
    }

    pub fn draw_command(&self, id: ElementId) -> Option<DrawCommand> {
        self.bindings.get(&id).map(|binding| binding.surface.draw_command())
    }

    /// Completion listeners of the element's ripple.
    pub fn listeners(&self, id: ElementId) -> Option<CompletionListeners> {
        self.bindings.get(&id).map(|binding| binding.surface.listeners())
    }

    pub fn surface(&self, id: ElementId) -> Option<&RippleEffectSurface> {
        self.bindings.get(&id).map(|binding| &binding.surface)
    }

    pub fn surface_mut(&mut self, id: ElementId) -> Option<&mut RippleEffectSurface> {
        self.bindings.get_mut(&id).map(|binding| &mut binding.surface)
    }

    fn run_finished(&mut self) {
        let finished: Vec<ElementId> = self.finished.borrow_mut().drain(..).collect();
        for id in finished {
            let Some(element) = self.bindings.get(&id).map(|binding| binding.element.clone()) else {
                continue;
            };
            if element.kind().is_text_field() {
                element.request_focus();
                if let Some(helper) = &self.focus_helper {
                    helper.show_soft_input(id);
                }
            }
            log::debug!("Ripple finished on {:?}, performing click", id);
            element.perform_click();
        }
    }
}

impl Default for RippleCompat {
    fn default() -> Self {
        Self::new(None)
    }
}
