use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use ripple::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup(config: RippleConfig) -> (Rc<ManualScheduler>, RippleEffectSurface, Rc<Cell<u32>>) {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let surface = RippleEffectSurface::new(config, scheduler.clone());
    let finished = Rc::new(Cell::new(0));
    let counter = finished.clone();
    surface.add_finish_listener(move || counter.set(counter.get() + 1));
    (scheduler, surface, finished)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn test_hold_then_release_completes_once() {
    let (scheduler, mut surface, finished) = setup(RippleConfig::new());
    surface.on_measured(200.0, 200.0);

    surface.on_pointer_down(10.0, 10.0);
    scheduler.run_for(ms(200), || surface.on_frame());
    surface.on_frame();

    // 200ms pressed is 40ms perceived out of 400ms.
    let state = surface.state();
    assert!((state.progress - 0.1).abs() < 1e-4, "progress {}", state.progress);
    let expected_scale = (200.0 - 30.0) / 30.0 * 0.01 + 1.0;
    assert!((state.scale - expected_scale).abs() < 1e-4, "scale {}", state.scale);
    assert_eq!(state.background_alpha, (112.0_f32 * 0.8) as u8);
    assert_eq!(finished.get(), 0);

    surface.on_pointer_up(10.0, 10.0);
    scheduler.run_for(ms(400), || surface.on_frame());

    assert_eq!(finished.get(), 1);
    assert_eq!(surface.phase(), Phase::Idle);
    assert_eq!(surface.draw_command().shape_color.alpha(), 0);
    assert_eq!(surface.draw_command().background_wash.alpha(), 0);
    assert_eq!(scheduler.pending_frame(), None);

    scheduler.run_for(ms(1000), || surface.on_frame());
    assert_eq!(finished.get(), 1);
}

#[test]
fn test_touch_during_fade_restarts_cycle() {
    let (scheduler, mut surface, finished) = setup(RippleConfig::new());

    surface.on_pointer_down(10.0, 10.0);
    scheduler.run_for(ms(300), || surface.on_frame());
    surface.on_pointer_up(10.0, 10.0);
    scheduler.run_for(ms(150), || surface.on_frame());
    assert_eq!(surface.phase(), Phase::Fading);
    assert!(surface.state().alpha < 0x70);

    surface.on_pointer_down(50.0, 60.0);
    let state = surface.state();
    assert_eq!(state.phase, Phase::Expanding);
    assert_eq!(state.elapsed_offset, Duration::ZERO);
    assert_eq!(state.alpha, 0x70);
    assert_eq!(state.background_alpha, 0);
    assert_eq!((state.x, state.y), (50.0, 60.0));

    scheduler.run_for(ms(1000), || surface.on_frame());
    assert_eq!(finished.get(), 0, "the interrupted cycle must not notify");
    assert_eq!(surface.phase(), Phase::Expanding);

    surface.on_pointer_up(50.0, 60.0);
    scheduler.run_for(ms(500), || surface.on_frame());
    assert_eq!(finished.get(), 1);
}

#[test]
fn test_detach_mid_expansion_goes_silent() {
    let (scheduler, mut surface, finished) = setup(RippleConfig::new());

    surface.on_pointer_down(10.0, 10.0);
    scheduler.run_for(ms(50), || surface.on_frame());
    assert!(scheduler.take_redraws() > 0);

    surface.on_detached();
    assert_eq!(scheduler.pending_frame(), None);

    surface.on_pointer_move(20.0, 20.0);
    surface.on_pointer_up(20.0, 20.0);
    surface.set_scale_policy(ScalePolicy::Center);
    scheduler.run_for(ms(1000), || surface.on_frame());
    surface.on_frame();

    assert_eq!(scheduler.take_redraws(), 0);
    assert_eq!(finished.get(), 0);
    assert_eq!(scheduler.pending_frame(), None);
}

#[test]
fn test_scale_grows_monotonically_over_a_cycle() {
    for curve in [TimingFunction::Linear, TimingFunction::EaseIn] {
        let (scheduler, mut surface, _) = setup(RippleConfig::new().interpolation(curve));
        surface.on_pointer_down(0.0, 0.0);

        let mut last = 0.0_f32;
        scheduler.run_for(ms(1500), || {
            surface.on_frame();
            let scale = surface.state().scale;
            assert!(scale >= last, "scale went from {} to {}", last, scale);
            last = scale;
        });
        surface.on_pointer_up(0.0, 0.0);
        scheduler.run_for(ms(400), || {
            surface.on_frame();
            if surface.phase() != Phase::Idle {
                assert!(surface.state().scale >= last);
            }
        });
    }
}

#[test]
fn test_scale_curve_is_monotonic() {
    let (_scheduler, surface, _) = setup(RippleConfig::new());
    let mut last = surface.scale_at(0.0);
    assert_eq!(last, 1.0);
    for step in 1..=100 {
        let scale = surface.scale_at(step as f32 / 100.0);
        assert!(scale >= last);
        last = scale;
    }
    assert!((last - 200.0 / 30.0).abs() < 1e-4);
}

#[test]
fn test_quick_tap_finishes_expansion_while_fading() {
    let (scheduler, mut surface, finished) = setup(
        RippleConfig::new()
            .interpolation(TimingFunction::Linear)
            .fade_duration(ms(800)),
    );
    surface.on_pointer_down(5.0, 5.0);
    surface.on_pointer_up(5.0, 5.0);

    scheduler.run_for(ms(200), || surface.on_frame());
    let state = surface.state();
    assert_eq!(state.phase, Phase::Fading);
    assert!((state.progress - 0.5).abs() < 0.05, "progress {}", state.progress);

    scheduler.run_for(ms(600), || surface.on_frame());
    assert_eq!(finished.get(), 1);
}

#[test]
fn test_listeners_can_unsubscribe_while_notified() {
    let (scheduler, mut surface, finished) = setup(RippleConfig::new());
    let listeners = surface.listeners();
    let once = Rc::new(Cell::new(0));

    let handle = listeners.clone();
    let counter = once.clone();
    let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
    let own = slot.clone();
    slot.set(Some(listeners.subscribe(move || {
        counter.set(counter.get() + 1);
        if let Some(id) = own.get() {
            handle.unsubscribe(id);
        }
    })));

    for _ in 0..2 {
        surface.on_pointer_down(5.0, 5.0);
        surface.on_pointer_up(5.0, 5.0);
        scheduler.run_for(ms(500), || surface.on_frame());
    }
    assert_eq!(finished.get(), 2);
    assert_eq!(once.get(), 1);
}

#[test]
fn test_spin_rotates_shape() {
    let (scheduler, mut surface, _) = setup(RippleConfig::new().spin(true));
    surface.on_pointer_down(0.0, 0.0);
    scheduler.advance(ms(1000));
    surface.on_frame();

    // Half way through: 240 degrees.
    let command = surface.draw_command();
    let scale = surface.state().scale;
    let (x, y) = command.transform.transform_point(30.0, 0.0);
    let angle = 240_f32.to_radians();
    assert!((x - 30.0 * scale * angle.cos()).abs() < 1e-2);
    assert!((y - 30.0 * scale * angle.sin()).abs() < 1e-2);
}

#[test]
fn test_fade_duration_defaults_to_ripple_duration() {
    let config = RippleConfig::new().full(true).ripple_duration(ms(250));
    assert_eq!(config.get_fade_duration(), ms(250));
    let config = config.max_ripple_radius(12.0);
    assert_eq!(config.get_max_ripple_radius(), 200.0);
}

#[test]
fn test_pure_helpers() {
    assert_eq!(derive_background_color(Argb(0x7000_0000)), Argb(0x7038_3838));

    let container = Rect::new(0.0, 0.0, 300.0, 120.0);
    assert_eq!(compute_dest_rect(ScalePolicy::FitXY, container, 17.0, 999.0), container);
    let inside = compute_dest_rect(ScalePolicy::CenterInside, container, 600.0, 60.0);
    assert!(inside.width <= container.width && inside.height <= container.height);
}
