//! Headless ripple run on a calloop event loop.
//!
//! Scripts a touch on a button (press, drag, release) and logs every frame
//! the ripple asks to repaint, then the click that follows the fade.
//!
//! ```text
//! RUST_LOG=info cargo run --bin ripple-trace [background-image]
//! ```
//!
//! With a background image the ripple samples its vibrant swatch.

use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle};

use ripple::prelude::*;

const BUTTON: ElementId = ElementId(1);
const GIVE_UP_AFTER: Duration = Duration::from_secs(5);

struct Trace {
    ripples: RippleCompat,
}

struct Button {
    scheduler: Rc<LoopScheduler<Trace>>,
    clicked: Rc<Cell<bool>>,
}

impl Element for Button {
    fn id(&self) -> ElementId {
        BUTTON
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Button { appcompat: false }
    }

    fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        self.scheduler.clone()
    }

    fn perform_click(&self) {
        log::info!("Button clicked");
        self.clicked.set(true);
    }
}

/// Run `action` on the loop after `delay`.
fn at(
    handle: &LoopHandle<'static, Trace>,
    delay: Duration,
    action: impl Fn(&mut RippleCompat) + 'static,
) -> Result<(), calloop::Error> {
    handle
        .insert_source(Timer::from_duration(delay), move |_, _, trace| {
            action(&mut trace.ripples);
            TimeoutAction::Drop
        })
        .map_err(|err| err.error)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut event_loop: EventLoop<'static, Trace> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    let scheduler = Rc::new(LoopScheduler::new(handle.clone(), |trace: &mut Trace| {
        trace.ripples.frame(BUTTON);
    }));
    let clicked = Rc::new(Cell::new(false));
    let button = Rc::new(Button {
        scheduler: scheduler.clone(),
        clicked: clicked.clone(),
    });

    let mut config = RippleConfig::new()
        .ripple_color(Argb(0x80FF_4081))
        .shape_type(ShapeType::Heart)
        .spin(true);
    if let Some(path) = std::env::args().nth(1) {
        match BackgroundImage::load(&ImageSource::from(path.as_str())) {
            Ok(image) => {
                config = config
                    .background(image)
                    .scale_policy(ScalePolicy::CenterCrop)
                    .enable_palette(true)
                    .palette_mode(PaletteMode::Vibrant);
            }
            Err(err) => log::warn!("Ignoring background {}: {}", path, err),
        }
    }

    let mut trace = Trace {
        ripples: RippleCompat::default(),
    };
    trace.ripples.apply_with_config(button, config);
    trace.ripples.measured(BUTTON, 160.0, 48.0);

    at(&handle, Duration::from_millis(10), |ripples| {
        let taken = ripples.pointer_down(BUTTON, 40.0, 24.0);
        log::info!("Pointer down, taken: {}", taken);
    })?;
    at(&handle, Duration::from_millis(120), |ripples| {
        ripples.pointer_move(BUTTON, 60.0, 26.0);
    })?;
    at(&handle, Duration::from_millis(260), |ripples| {
        log::info!("Pointer up");
        ripples.pointer_up(BUTTON, 60.0, 26.0);
    })?;

    let started = Instant::now();
    while !clicked.get() && started.elapsed() < GIVE_UP_AFTER {
        event_loop.dispatch(Some(FRAME_INTERVAL), &mut trace)?;

        if !scheduler.take_redraw() {
            continue;
        }
        let (Some(surface), Some(command)) = (
            trace.ripples.surface(BUTTON),
            trace.ripples.draw_command(BUTTON),
        ) else {
            continue;
        };
        let state = surface.state();
        log::info!(
            "{:>4}ms {:?} progress {:.3} scale {:.2} rotation {:.0} shape {:#010x} wash {:#010x}",
            started.elapsed().as_millis(),
            state.phase,
            state.progress,
            state.scale,
            state.rotation_degrees,
            command.shape_color.0,
            command.background_wash.0,
        );
    }

    if !clicked.get() {
        log::warn!("Ripple did not finish within {:?}", GIVE_UP_AFTER);
    }
    trace.ripples.detached(BUTTON);
    Ok(())
}
