//! The ripple state machine and per-frame geometry.
//!
//! A [`RippleEffectSurface`] is bound to one interactive element. The host
//! forwards pointer events, layout sizes and frame ticks; the surface answers
//! with redraw requests, a [`DrawCommand`] to paint, and completion
//! notifications once a ripple has fully faded.
//!
//! Timing has two regimes. While the pointer is down the expansion runs five
//! times faster than real time so a held touch saturates quickly. The virtual
//! time skipped that way is remembered as an offset, and after release the
//! expansion continues from the same point at real speed.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bitflags::bitflags;
use kurbo::BezPath;

use crate::bounds::{compute_dest_rect, Padding, Rect, ScalePolicy};
use crate::color::{alpha_color, Argb, PaletteMode};
use crate::config::RippleConfig;
use crate::image_source::Background;
use crate::listeners::{CompletionListeners, ListenerId};
use crate::palette::{extract_dominant_color, PaletteJob, PaletteStatus};
use crate::scheduler::{FrameScheduler, FRAME_INTERVAL};
use crate::shape::{produce_shape, BASE_RADIUS};
use crate::timing::TimingFunction;
use crate::transform::Transform;

/// Pressed-regime speedup.
const PRESSED_SPEEDUP: u32 = 5;
/// Progress above which the expansion counts as saturated.
const WAVING_THRESHOLD: f32 = 0.99;
/// Share of the cycle over which the background wash ramps in.
const WASH_RAMP: f32 = 0.125;
/// Rotation reached at full progress when spinning.
const SPIN_DEGREES: f32 = 480.0;
/// Curve of the alpha fade after release.
const FADE_CURVE: TimingFunction = TimingFunction::EaseInOut;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Growing, or holding at full size while the pointer stays down.
    Expanding,
    /// Alpha decaying after release. The shape may still be growing.
    Fading,
}

/// How real elapsed time maps to expansion progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingRegime {
    #[default]
    Pressed,
    Released,
}

bitflags! {
    /// Per-cycle conditions that outlive a single event
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct SurfaceFlags: u8 {
        /// The pointer that started the cycle is still down
        const PRESSED  = 0b001;
        /// Expansion progress has not saturated yet
        const WAVING   = 0b010;
        /// The host element is gone; every handler is a no-op
        const DETACHED = 0b100;
    }
}

/// Mutable animation state of one surface.
#[derive(Debug, Clone, Default)]
pub struct RippleState {
    pub phase: Phase,
    pub regime: TimingRegime,
    /// Last pointer position in element coordinates.
    pub x: f32,
    pub y: f32,
    /// Expansion progress in `0.0..=1.0`.
    pub progress: f32,
    pub scale: f32,
    pub rotation_degrees: f32,
    /// Alpha of the ripple shape.
    pub alpha: u8,
    /// Alpha of the background wash.
    pub background_alpha: u8,
    pub start_time: Option<Instant>,
    /// Virtual time skipped by the pressed regime.
    pub elapsed_offset: Duration,
    pub fade_start: Option<Instant>,
    /// Alpha the running fade started from.
    pub fade_from: u8,
    /// `(x, y, scale)` at the last redraw request.
    pub last_painted: Option<(f32, f32, f32)>,
}

impl RippleState {
    fn reset_cycle(&mut self) {
        self.start_time = None;
        self.fade_start = None;
        self.elapsed_offset = Duration::ZERO;
        self.last_painted = None;
    }
}

/// Everything the host needs to paint one frame.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    /// Clip for everything below. The destination rect when an image
    /// background is set, otherwise the padded element bounds.
    pub clip_rect: Rect,
    /// Where the background image is drawn, if there is one.
    pub dest_rect: Option<Rect>,
    pub background: Option<Background>,
    /// Color filling the clip above the background.
    pub background_wash: Argb,
    pub shape_color: Argb,
    /// Origin-centered shape, placed by `transform`.
    pub shape_path: Arc<BezPath>,
    pub transform: Transform,
}

/// Ripple animation bound to one element.
pub struct RippleEffectSurface {
    config: RippleConfig,
    state: RippleState,
    flags: SurfaceFlags,
    scheduler: Rc<dyn FrameScheduler>,
    listeners: CompletionListeners,
    shape_path: Arc<BezPath>,
    max_radius: f32,
    palette_mode: PaletteMode,
    palette_job: Option<PaletteJob>,
    padding: Padding,
    width: f32,
    height: f32,
    measured: bool,
    clip_rect: Rect,
    /// Destination rect of the image background, until invalidated.
    dest_rect: Cell<Option<Rect>>,
}

impl RippleEffectSurface {
    pub fn new(config: RippleConfig, scheduler: Rc<dyn FrameScheduler>) -> Self {
        let mut surface = Self {
            shape_path: Arc::new(produce_shape(config.get_shape_type())),
            max_radius: config.get_max_ripple_radius(),
            palette_mode: config.get_palette_mode(),
            state: RippleState {
                scale: 1.0,
                ..RippleState::default()
            },
            flags: SurfaceFlags::empty(),
            scheduler,
            listeners: CompletionListeners::new(),
            palette_job: None,
            padding: Padding::ZERO,
            width: 0.0,
            height: 0.0,
            measured: false,
            clip_rect: Rect::default(),
            dest_rect: Cell::new(None),
            config,
        };
        surface.restart_palette();
        surface
    }

    pub fn config(&self) -> &RippleConfig {
        &self.config
    }

    pub fn state(&self) -> &RippleState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_detached(&self) -> bool {
        self.flags.contains(SurfaceFlags::DETACHED)
    }

    pub fn is_pressed(&self) -> bool {
        self.flags.contains(SurfaceFlags::PRESSED)
    }

    pub fn max_ripple_radius(&self) -> f32 {
        self.max_radius
    }

    pub fn palette_mode(&self) -> PaletteMode {
        self.palette_mode
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Last size passed to [`Self::on_measured`], if any.
    pub fn measured_size(&self) -> Option<(f32, f32)> {
        self.measured.then_some((self.width, self.height))
    }

    /// Shared handle to the completion listeners.
    pub fn listeners(&self) -> CompletionListeners {
        self.listeners.clone()
    }

    /// Take over `listeners` from a surface this one replaces. Subscribers
    /// keep their ids and the handles they hold stay live.
    pub(crate) fn adopt_listeners(&mut self, listeners: CompletionListeners) {
        self.listeners = listeners;
    }

    pub fn add_finish_listener(&self, callback: impl Fn() + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn remove_finish_listener(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Start a new cycle at `(x, y)`.
    ///
    /// Works from any phase: a running fade is cancelled without notifying
    /// listeners and the cycle starts over.
    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        if self.is_detached() {
            return;
        }
        if self.stop_fade() {
            log::debug!("Fade interrupted by a new touch at ({}, {})", x, y);
        }

        let now = self.scheduler.now();
        let base_alpha = self.config.get_ripple_color().alpha();
        self.state = RippleState {
            phase: Phase::Expanding,
            regime: TimingRegime::Pressed,
            x,
            y,
            progress: 0.0,
            scale: 1.0,
            rotation_degrees: 0.0,
            alpha: base_alpha,
            background_alpha: 0,
            start_time: Some(now),
            ..RippleState::default()
        };
        self.flags.insert(SurfaceFlags::PRESSED | SurfaceFlags::WAVING);
        self.scheduler.schedule_frame(FRAME_INTERVAL);
        log::debug!("Ripple started at ({}, {})", x, y);
    }

    /// Follow the pointer while the ripple expands.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.is_detached() || self.state.phase != Phase::Expanding {
            return;
        }
        self.state.x = x;
        self.state.y = y;
    }

    pub fn on_pointer_up(&mut self, _x: f32, _y: f32) {
        if self.is_detached() {
            return;
        }
        self.start_fade();
    }

    pub fn on_pointer_cancel(&mut self) {
        if self.is_detached() {
            return;
        }
        self.start_fade();
    }

    /// Release the ripple and begin fading it out.
    ///
    /// Switches to the released regime; expansion keeps going from where it
    /// is. Does nothing unless the ripple is expanding.
    pub fn start_fade(&mut self) {
        if self.is_detached() || self.state.phase != Phase::Expanding {
            return;
        }
        let now = self.scheduler.now();
        if let Some(start) = self.state.start_time {
            let real = now.saturating_duration_since(start);
            self.state.elapsed_offset = real / PRESSED_SPEEDUP * (PRESSED_SPEEDUP - 1);
        }
        self.state.regime = TimingRegime::Released;
        self.flags.remove(SurfaceFlags::PRESSED);

        self.state.phase = Phase::Fading;
        self.state.fade_start = Some(now);
        self.state.fade_from = self.config.get_ripple_color().alpha();
        self.scheduler.schedule_frame(FRAME_INTERVAL);
        log::debug!(
            "Ripple released at progress {:.3}, fading over {:?}",
            self.state.progress,
            self.config.get_fade_duration()
        );
    }

    /// Stop a running fade and clear the ripple. Listeners are not notified.
    pub fn cancel_fade(&mut self) {
        if !self.stop_fade() {
            return;
        }
        self.state.phase = Phase::Idle;
        self.state.alpha = 0;
        self.state.background_alpha = 0;
        self.state.reset_cycle();
        self.flags.remove(SurfaceFlags::WAVING);
        if self.palette_job.is_none() {
            self.scheduler.cancel_frame();
        }
        self.scheduler.request_redraw();
        log::debug!("Fade cancelled");
    }

    fn stop_fade(&mut self) -> bool {
        if self.state.phase != Phase::Fading {
            return false;
        }
        self.state.fade_start = None;
        true
    }

    /// Advance the animation to the scheduler's current time.
    pub fn on_frame(&mut self) {
        if self.is_detached() {
            return;
        }
        let now = self.scheduler.now();
        self.poll_palette();

        let next = match self.state.phase {
            Phase::Idle => None,
            Phase::Expanding => {
                self.update_ripple(now);
                if self.flags.intersects(SurfaceFlags::WAVING | SurfaceFlags::PRESSED) {
                    Some(FRAME_INTERVAL)
                } else {
                    None
                }
            }
            Phase::Fading => {
                self.update_ripple(now);
                match self.update_fade(now) {
                    Some(remaining) => Some(remaining.min(FRAME_INTERVAL)),
                    None => {
                        self.finish_cycle();
                        None
                    }
                }
            }
        };

        match next {
            Some(delay) => self.scheduler.schedule_frame(delay),
            None if self.palette_job.is_some() => self.scheduler.schedule_frame(FRAME_INTERVAL),
            None => {}
        }
    }

    fn perceived_elapsed(&mut self, now: Instant) -> Duration {
        let Some(start) = self.state.start_time else {
            return Duration::ZERO;
        };
        let real = now.saturating_duration_since(start);
        match self.state.regime {
            TimingRegime::Pressed => {
                let perceived = real / PRESSED_SPEEDUP;
                self.state.elapsed_offset = perceived * (PRESSED_SPEEDUP - 1);
                perceived
            }
            TimingRegime::Released => real.saturating_sub(self.state.elapsed_offset),
        }
    }

    fn update_ripple(&mut self, now: Instant) {
        let base_wash = self.config.background_color().alpha();
        let progress = if self.flags.contains(SurfaceFlags::WAVING) {
            let elapsed = self.perceived_elapsed(now);
            let progress = expansion_progress(elapsed, self.config.get_ripple_duration());
            self.flags.set(SurfaceFlags::WAVING, progress <= WAVING_THRESHOLD);
            self.state.background_alpha =
                (f32::from(base_wash) * (progress / WASH_RAMP).min(1.0)) as u8;
            progress
        } else {
            self.state.background_alpha = base_wash;
            1.0
        };

        self.state.progress = progress;
        self.state.scale = self.scale_at(progress);
        self.state.rotation_degrees = progress * SPIN_DEGREES;
        if self.state.phase == Phase::Fading {
            self.state.background_alpha = self.state.background_alpha.min(self.state.alpha);
        }

        let snapshot = (self.state.x, self.state.y, self.state.scale);
        if self.state.last_painted != Some(snapshot) {
            self.state.last_painted = Some(snapshot);
            self.scheduler.request_redraw();
        }
    }

    /// Shape scale at `progress`: 1 at the base radius, growing to the max
    /// radius.
    pub fn scale_at(&self, progress: f32) -> f32 {
        let base = BASE_RADIUS as f32;
        let curve = self.config.get_interpolation().evaluate(progress);
        (self.max_radius - base) / base * curve + 1.0
    }

    /// Returns the time left, or `None` once the fade is complete.
    fn update_fade(&mut self, now: Instant) -> Option<Duration> {
        let start = self.state.fade_start?;
        let duration = self.config.get_fade_duration();
        let elapsed = now.saturating_duration_since(start);

        if elapsed >= duration {
            self.state.alpha = 0;
        } else {
            let t = elapsed.as_secs_f32() / duration.as_secs_f32();
            let eased = FADE_CURVE.evaluate(t);
            self.state.alpha = (f32::from(self.state.fade_from) * (1.0 - eased)) as u8;
        }
        if self.state.alpha <= self.state.background_alpha {
            self.state.background_alpha = self.state.alpha;
        }
        self.scheduler.request_redraw();
        log::trace!("Fade alpha {} after {:?}", self.state.alpha, elapsed);

        duration.checked_sub(elapsed).filter(|left| !left.is_zero())
    }

    fn finish_cycle(&mut self) {
        self.state.phase = Phase::Idle;
        self.state.alpha = 0;
        self.state.background_alpha = 0;
        self.state.reset_cycle();
        self.flags.remove(SurfaceFlags::WAVING | SurfaceFlags::PRESSED);
        log::debug!("Ripple cycle complete");
        self.listeners.notify();
    }

    /// Record the element's laid-out size.
    ///
    /// Recomputes the clip and, in full mode, grows the max radius to the
    /// larger side.
    pub fn on_measured(&mut self, width: f32, height: f32) {
        if self.is_detached() {
            return;
        }
        self.width = width;
        self.height = height;
        self.measured = true;
        self.clip_rect = self.padding.inset(width, height);
        self.dest_rect.set(None);
        if self.config.is_full() {
            self.max_radius = width.max(height);
        }
    }

    /// Synchronously stop everything. Nothing fires after this returns.
    pub fn on_detached(&mut self) {
        if self.is_detached() {
            return;
        }
        self.stop_fade();
        self.scheduler.cancel_frame();
        self.palette_job = None;
        self.state.phase = Phase::Idle;
        self.state.reset_cycle();
        self.flags = SurfaceFlags::DETACHED;
        log::debug!("Ripple surface detached");
    }

    pub fn set_padding(&mut self, padding: impl Into<Padding>) {
        self.padding = padding.into();
        self.clip_rect = self.padding.inset(self.width, self.height);
    }

    /// Replace the ripple color. The wash color follows it.
    pub fn set_ripple_color(&mut self, color: Argb) {
        self.config.set_ripple_color(color);
    }

    /// Ignored in full mode, where the element size decides the radius.
    pub fn set_max_ripple_radius(&mut self, radius: f32) {
        if !self.config.is_full() {
            self.max_radius = radius;
        }
    }

    /// Swap the background and re-sample its palette.
    pub fn set_background(&mut self, background: Option<Background>) {
        self.config.set_background(background);
        self.dest_rect.set(None);
        self.restart_palette();
    }

    pub fn set_palette_mode(&mut self, mode: PaletteMode) {
        self.palette_mode = mode;
        self.dest_rect.set(None);
        self.restart_palette();
    }

    pub fn set_scale_policy(&mut self, policy: ScalePolicy) {
        self.config.set_scale_policy(policy);
        self.dest_rect.set(None);
        if !self.is_detached() {
            self.scheduler.request_redraw();
        }
    }

    fn restart_palette(&mut self) {
        self.palette_job = None;
        if self.is_detached() {
            return;
        }
        let Some(image) = self.config.get_background().and_then(Background::image) else {
            return;
        };
        self.palette_job = extract_dominant_color(image, self.palette_mode);
        if self.palette_job.is_some() && self.state.phase == Phase::Idle {
            self.scheduler.schedule_frame(FRAME_INTERVAL);
        }
    }

    pub fn is_palette_pending(&self) -> bool {
        self.palette_job.is_some()
    }

    /// Apply the extracted palette color if it has arrived.
    pub fn poll_palette(&mut self) -> Option<Argb> {
        let status = self.palette_job.as_ref()?.poll();
        match status {
            PaletteStatus::Pending => None,
            PaletteStatus::Ready(color) => {
                self.palette_job = None;
                self.apply_palette_color(color);
                Some(color)
            }
            PaletteStatus::Failed => {
                log::warn!("Palette extraction ended without a color");
                self.palette_job = None;
                None
            }
        }
    }

    /// Block until a pending extraction finishes and apply its color.
    pub fn wait_for_palette(&mut self) -> Option<Argb> {
        let color = self.palette_job.take()?.wait()?;
        self.apply_palette_color(color);
        Some(color)
    }

    fn apply_palette_color(&mut self, color: Argb) {
        log::debug!("Applying palette color {:#010x}", color.0);
        self.config.set_ripple_color(color);
        if !self.is_detached() {
            self.scheduler.request_redraw();
        }
    }

    /// Where the background image lands, computed on first use after each
    /// invalidation.
    pub fn dest_rect(&self) -> Option<Rect> {
        let image = self.config.get_background()?.image()?;
        if let Some(rect) = self.dest_rect.get() {
            return Some(rect);
        }
        let (width, height) = image.dimensions();
        let rect = compute_dest_rect(
            self.config.get_scale_policy(),
            Rect::new(0.0, 0.0, self.width, self.height),
            width as f32,
            height as f32,
        );
        self.dest_rect.set(Some(rect));
        Some(rect)
    }

    pub fn clip_rect(&self) -> Rect {
        self.clip_rect
    }

    /// Whether `(x, y)` lands on the painted area.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.dest_rect().unwrap_or(self.clip_rect).contains(x, y)
    }

    pub fn draw_command(&self) -> DrawCommand {
        let dest_rect = self.dest_rect();
        let rotation = self.config.is_spin().then_some(self.state.rotation_degrees);
        DrawCommand {
            clip_rect: dest_rect.unwrap_or(self.clip_rect),
            dest_rect,
            background: self.config.get_background().cloned(),
            background_wash: alpha_color(self.config.background_color(), self.state.background_alpha),
            shape_color: alpha_color(self.config.get_ripple_color(), self.state.alpha),
            shape_path: self.shape_path.clone(),
            transform: Transform::ripple(self.state.x, self.state.y, self.state.scale, rotation),
        }
    }
}

impl std::fmt::Debug for RippleEffectSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RippleEffectSurface")
            .field("state", &self.state)
            .field("flags", &self.flags)
            .field("max_radius", &self.max_radius)
            .field("clip_rect", &self.clip_rect)
            .finish_non_exhaustive()
    }
}

/// Expansion progress for `elapsed` perceived time.
pub fn expansion_progress(elapsed: Duration, ripple_duration: Duration) -> f32 {
    if ripple_duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / ripple_duration.as_secs_f64()).min(1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_source::BackgroundImage;
    use crate::scheduler::ManualScheduler;
    use image::{Rgba, RgbaImage};
    use std::cell::RefCell;

    fn surface_with(config: RippleConfig) -> (Rc<ManualScheduler>, RippleEffectSurface) {
        let scheduler = Rc::new(ManualScheduler::new());
        let surface = RippleEffectSurface::new(config, scheduler.clone());
        (scheduler, surface)
    }

    fn surface() -> (Rc<ManualScheduler>, RippleEffectSurface) {
        surface_with(RippleConfig::new())
    }

    fn counter(surface: &RippleEffectSurface) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        surface.add_finish_listener(move || inner.set(inner.get() + 1));
        count
    }

    #[test]
    fn test_pointer_down_schedules_first_frame() {
        let (scheduler, mut surface) = surface();
        surface.on_pointer_down(10.0, 20.0);

        assert_eq!(surface.phase(), Phase::Expanding);
        assert_eq!(surface.state().alpha, 0x70);
        assert_eq!(surface.state().elapsed_offset, Duration::ZERO);
        assert_eq!(
            scheduler.pending_frame(),
            Some(scheduler.now() + FRAME_INTERVAL)
        );
    }

    #[test]
    fn test_pressed_regime_is_five_times_faster() {
        let (scheduler, mut surface) = surface();
        surface.on_pointer_down(10.0, 10.0);
        scheduler.advance(Duration::from_millis(1000));
        surface.on_frame();

        let state = surface.state();
        assert!((state.progress - 0.5).abs() < 1e-4, "{}", state.progress);
        assert_eq!(state.elapsed_offset, Duration::from_millis(800));
    }

    #[test]
    fn test_hold_keeps_ticking_at_full_scale() {
        let (scheduler, mut surface) = surface_with(RippleConfig::new().spin(true));
        surface.on_pointer_down(10.0, 10.0);
        scheduler.run_for(Duration::from_secs(5), || surface.on_frame());

        let state = surface.state();
        assert_eq!(state.phase, Phase::Expanding);
        assert_eq!(state.progress, 1.0);
        assert!((state.scale - (200.0 - 30.0) / 30.0 - 1.0).abs() < 1e-4);
        assert_eq!(state.rotation_degrees, 480.0);
        assert_eq!(state.background_alpha, 0x70);
        assert!(scheduler.pending_frame().is_some());
    }

    #[test]
    fn test_stationary_hold_stops_redrawing() {
        let (scheduler, mut surface) = surface();
        surface.on_pointer_down(10.0, 10.0);
        scheduler.run_for(Duration::from_secs(3), || surface.on_frame());
        scheduler.take_redraws();

        scheduler.run_for(Duration::from_millis(500), || surface.on_frame());
        assert_eq!(scheduler.take_redraws(), 0);

        surface.on_pointer_move(40.0, 40.0);
        scheduler.run_for(FRAME_INTERVAL, || surface.on_frame());
        assert_eq!(scheduler.take_redraws(), 1);
    }

    #[test]
    fn test_release_continues_from_pressed_progress() {
        let (scheduler, mut surface) = surface_with(
            RippleConfig::new()
                .interpolation(TimingFunction::Linear)
                .fade_duration(Duration::from_secs(10)),
        );
        surface.on_pointer_down(0.0, 0.0);
        scheduler.advance(Duration::from_millis(500));
        surface.on_frame();
        let pressed = surface.state().progress;

        surface.on_pointer_up(0.0, 0.0);
        assert_eq!(surface.phase(), Phase::Fading);
        assert_eq!(surface.state().regime, TimingRegime::Released);
        surface.on_frame();
        assert!((surface.state().progress - pressed).abs() < 1e-4);

        scheduler.advance(Duration::from_millis(100));
        surface.on_frame();
        assert!((surface.state().progress - (pressed + 0.25)).abs() < 1e-4);
    }

    #[test]
    fn test_fade_completes_once() {
        let (scheduler, mut surface) = surface();
        let finished = counter(&surface);
        surface.on_pointer_down(5.0, 5.0);
        scheduler.run_for(Duration::from_millis(100), || surface.on_frame());
        surface.on_pointer_up(5.0, 5.0);

        scheduler.run_for(Duration::from_millis(399), || surface.on_frame());
        assert_eq!(finished.get(), 0);
        assert_eq!(surface.phase(), Phase::Fading);

        scheduler.run_for(Duration::from_millis(1), || surface.on_frame());
        assert_eq!(finished.get(), 1);
        assert_eq!(surface.phase(), Phase::Idle);
        assert_eq!(surface.state().alpha, 0);
        assert_eq!(scheduler.pending_frame(), None);

        scheduler.run_for(Duration::from_secs(2), || surface.on_frame());
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn test_wash_never_outlives_shape() {
        let (scheduler, mut surface) = surface();
        surface.on_pointer_down(5.0, 5.0);
        scheduler.run_for(Duration::from_secs(3), || surface.on_frame());
        surface.on_pointer_up(5.0, 5.0);

        let mut frames = 0;
        scheduler.run_for(Duration::from_millis(400), || {
            surface.on_frame();
            let state = surface.state();
            assert!(state.background_alpha <= state.alpha || state.phase == Phase::Idle);
            frames += 1;
        });
        assert!(frames > 20);
    }

    #[test]
    fn test_cancel_acts_like_release() {
        let (_scheduler, mut surface) = surface();
        surface.on_pointer_down(5.0, 5.0);
        surface.on_pointer_cancel();
        assert_eq!(surface.phase(), Phase::Fading);
        assert!(!surface.is_pressed());
    }

    #[test]
    fn test_cancel_fade_skips_listeners() {
        let (scheduler, mut surface) = surface();
        let finished = counter(&surface);
        surface.on_pointer_down(5.0, 5.0);
        surface.on_pointer_up(5.0, 5.0);
        surface.cancel_fade();

        assert_eq!(surface.phase(), Phase::Idle);
        assert_eq!(scheduler.pending_frame(), None);
        scheduler.run_for(Duration::from_secs(1), || surface.on_frame());
        assert_eq!(finished.get(), 0);
    }

    #[test]
    fn test_move_ignored_when_not_expanding() {
        let (_scheduler, mut surface) = surface();
        surface.on_pointer_move(50.0, 50.0);
        assert_eq!((surface.state().x, surface.state().y), (0.0, 0.0));

        surface.on_pointer_down(1.0, 2.0);
        surface.on_pointer_up(1.0, 2.0);
        surface.on_pointer_move(50.0, 50.0);
        assert_eq!((surface.state().x, surface.state().y), (1.0, 2.0));
    }

    #[test]
    fn test_detach_is_final() {
        let (scheduler, mut surface) = surface();
        let finished = counter(&surface);
        surface.on_pointer_down(5.0, 5.0);
        surface.on_detached();

        assert_eq!(scheduler.pending_frame(), None);
        surface.on_pointer_down(5.0, 5.0);
        surface.on_pointer_up(5.0, 5.0);
        surface.on_frame();
        assert_eq!(surface.phase(), Phase::Idle);
        assert_eq!(scheduler.pending_frame(), None);
        assert_eq!(finished.get(), 0);
    }

    #[test]
    fn test_listener_detaching_surface_stops_ticks() {
        let (scheduler, surface) = surface();
        let surface = Rc::new(RefCell::new(surface));
        let detach_requested = Rc::new(Cell::new(false));
        let flag = detach_requested.clone();
        surface
            .borrow()
            .add_finish_listener(move || flag.set(true));

        surface.borrow_mut().on_pointer_down(0.0, 0.0);
        surface.borrow_mut().on_pointer_up(0.0, 0.0);
        scheduler.run_for(Duration::from_secs(1), || {
            surface.borrow_mut().on_frame();
            if detach_requested.get() {
                surface.borrow_mut().on_detached();
            }
        });
        assert!(surface.borrow().is_detached());
        assert_eq!(scheduler.pending_frame(), None);
    }

    #[test]
    fn test_full_mode_sizes_radius_on_measure() {
        let (_scheduler, mut surface) = surface_with(RippleConfig::new().full(true));
        surface.on_measured(320.0, 90.0);
        assert_eq!(surface.max_ripple_radius(), 320.0);

        surface.set_max_ripple_radius(10.0);
        assert_eq!(surface.max_ripple_radius(), 320.0);
    }

    #[test]
    fn test_clip_follows_padding() {
        let (_scheduler, mut surface) = surface();
        surface.set_padding(Padding::symmetric(4.0, 5.0));
        surface.on_measured(100.0, 40.0);

        assert_eq!(surface.clip_rect(), Rect::new(4.0, 5.0, 92.0, 30.0));
        assert!(surface.contains(4.0, 5.0));
        assert!(!surface.contains(2.0, 20.0));

        let command = surface.draw_command();
        assert_eq!(command.clip_rect, Rect::new(4.0, 5.0, 92.0, 30.0));
        assert!(command.dest_rect.is_none());
    }

    #[test]
    fn test_image_background_drives_clip_and_hit_test() {
        let image = BackgroundImage::from_rgba(RgbaImage::from_pixel(10, 10, Rgba([9, 9, 9, 255])));
        let (_scheduler, mut surface) =
            surface_with(RippleConfig::new().background(image).scale_policy(ScalePolicy::FitCenter));
        surface.on_measured(200.0, 100.0);

        let dest = Rect::new(50.0, 0.0, 100.0, 100.0);
        assert_eq!(surface.dest_rect(), Some(dest));
        assert!(!surface.contains(20.0, 50.0));
        assert!(surface.contains(60.0, 50.0));

        surface.set_scale_policy(ScalePolicy::FitXY);
        assert_eq!(surface.dest_rect(), Some(Rect::new(0.0, 0.0, 200.0, 100.0)));
        assert_eq!(surface.draw_command().clip_rect, Rect::new(0.0, 0.0, 200.0, 100.0));

        surface.set_background(Some(Background::Color(Argb(0xFF00_0000))));
        assert_eq!(surface.dest_rect(), None);
    }

    #[test]
    fn test_palette_mode_drops_cached_dest_rect() {
        let image = BackgroundImage::from_rgba(RgbaImage::from_pixel(10, 20, Rgba([9, 9, 9, 255])));
        let (_scheduler, mut surface) =
            surface_with(RippleConfig::new().background(image).scale_policy(ScalePolicy::FitCenter));
        surface.on_measured(100.0, 100.0);
        let dest = surface.dest_rect();
        assert!(surface.dest_rect.get().is_some());

        surface.set_palette_mode(PaletteMode::Muted);
        assert_eq!(surface.dest_rect.get(), None);
        assert_eq!(surface.dest_rect(), dest);
    }

    #[test]
    fn test_palette_updates_ripple_color() {
        let image = BackgroundImage::from_rgba(RgbaImage::from_pixel(24, 24, Rgba([230, 30, 40, 255])));
        let (_scheduler, mut surface) = surface_with(
            RippleConfig::new()
                .enable_palette(true)
                .palette_mode(PaletteMode::Vibrant)
                .background(image),
        );
        assert!(surface.is_palette_pending());

        let color = surface.wait_for_palette();
        assert_eq!(color.map(Argb::alpha), Some(128));
        assert_eq!(surface.config().get_ripple_color().alpha(), 128);
        assert!(!surface.is_palette_pending());
    }

    #[test]
    fn test_disabled_palette_keeps_color() {
        let image = BackgroundImage::from_rgba(RgbaImage::from_pixel(24, 24, Rgba([230, 30, 40, 255])));
        let (_scheduler, mut surface) = surface_with(RippleConfig::new().background(image));
        assert!(!surface.is_palette_pending());

        surface.set_palette_mode(PaletteMode::Disabled);
        assert!(!surface.is_palette_pending());
        assert_eq!(surface.config().get_ripple_color(), Argb(0x7000_FF00));
    }

    #[test]
    fn test_draw_command_places_shape() {
        let (scheduler, mut surface) = surface_with(RippleConfig::new().spin(true));
        surface.on_pointer_down(30.0, 40.0);
        scheduler.run_for(Duration::from_secs(3), || surface.on_frame());

        let command = surface.draw_command();
        assert_eq!(command.shape_color, Argb(0x7000_FF00));
        assert_eq!(command.background_wash.alpha(), 0x70);
        let (x, y) = command.transform.transform_point(0.0, 0.0);
        assert!((x - 30.0).abs() < 1e-3 && (y - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_expansion_progress_clamps() {
        let duration = Duration::from_millis(400);
        assert_eq!(expansion_progress(Duration::from_millis(800), duration), 1.0);
        assert_eq!(expansion_progress(Duration::ZERO, duration), 0.0);
        assert_eq!(expansion_progress(Duration::from_millis(5), Duration::ZERO), 1.0);
    }
}
