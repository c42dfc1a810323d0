use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use rmk_trackball::accumulator::Accumulator;
use rmk_trackball::config::{Orientation, StepSize, TrackballConfig};
use rmk_trackball::keycode::{Chord, KeyAction};
use rmk_trackball::quantizer::{ZoomBurst, ZoomDirection};
use rmk_trackball::{
    ControlEvent, Mode, ModeControl, MotionData, MotionQuantizer, MotionReport, ResolutionSink, SensorError,
    TrackballProcessor,
};
use usbd_hid::descriptor::MouseReport;

// Init logger for tests
#[ctor::ctor]
fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

struct NoSensor;

impl ResolutionSink for NoSensor {
    async fn set_cpi(&mut self, _cpi: u16) -> Result<(), SensorError> {
        Ok(())
    }
}

fn motion(dx: i16, dy: i16) -> MotionData {
    MotionData { dx, dy }
}

/// Deterministic walk over deltas of both signs and mixed magnitudes
fn deltas(len: usize) -> impl Iterator<Item = i16> {
    let mut seed: u32 = 0x2545_F491;
    (0..len).map(move |_| {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        (seed % 81) as i16 - 40
    })
}

#[test]
fn test_scroll_residual_stays_below_step() {
    let mut q = MotionQuantizer::new(&TrackballConfig::default());
    q.set_mode(ModeControl::Scroll, true);
    for (dx, dy) in deltas(1000).zip(deltas(1000).skip(7)) {
        q.quantize(motion(dx, dy));
        let (rx, ry) = q.scroll_residual();
        assert!(rx.abs() < 8 && ry.abs() < 8);
    }
}

#[test]
fn test_scroll_total_matches_total_motion() {
    let mut q = MotionQuantizer::new(&TrackballConfig::default());
    q.set_mode(ModeControl::Scroll, true);
    let mut total_motion = 0i32;
    let mut total_wheel = 0i32;
    for dy in deltas(5000) {
        total_motion += dy as i32;
        // Vertical wheel is inverted by default
        total_wheel -= q.quantize(motion(0, dy)).report.wheel as i32;
    }
    let (_, residual) = q.scroll_residual();
    assert_eq!(total_wheel * 8 + residual, total_motion);
}

#[test]
fn test_no_drift_between_split_and_whole_motion() {
    let step = StepSize::new(12);
    for d in [1i16, 5, 11, 12, 13, -4, -25] {
        for n in [1i16, 10, 99] {
            let mut split = Accumulator::new();
            let split_total: i32 = (0..n).map(|_| split.quantize(d, step) as i32).sum();
            let mut whole = Accumulator::new();
            let whole_total = whole.quantize(d * n, step) as i32;
            assert!((split_total - whole_total).abs() <= 1);
        }
    }
}

#[test]
fn test_scenario_from_zero() {
    let mut acc = Accumulator::new();
    let emitted: Vec<i16> = [5, 5, 5].iter().map(|&d| acc.quantize(d, StepSize::new(8))).collect();
    assert_eq!(emitted, [0, 1, 0]);
    assert_eq!(acc.residual(), 7);
}

#[test]
fn test_entering_scroll_resets_zoom_residual() {
    let mut q = MotionQuantizer::new(&TrackballConfig::default());
    q.set_mode(ModeControl::Zoom, true);
    q.quantize(motion(0, 10));
    assert_ne!(q.zoom_residual(), 0);
    q.set_mode(ModeControl::Zoom, false);

    q.set_mode(ModeControl::Scroll, true);
    assert_eq!(q.zoom_residual(), 0);
    assert_eq!(q.scroll_residual(), (0, 0));
    // 7 alone isn't a step; with the stale 10 it would have been
    assert_eq!(q.quantize(motion(0, 7)).report, MotionReport::default());
}

#[test]
fn test_scroll_interval_reports_no_pointer_motion() {
    let mut q = MotionQuantizer::new(&TrackballConfig::default());
    assert_eq!(q.mode(), Mode::Normal);
    q.set_mode(ModeControl::Scroll, true);
    let (mut x, mut y) = (0i32, 0i32);
    for (dx, dy) in deltas(200).zip(deltas(200).skip(3)) {
        let report = q.quantize(motion(dx, dy)).report;
        x += report.x as i32;
        y += report.y as i32;
    }
    q.set_mode(ModeControl::Scroll, false);
    assert_eq!((x, y), (0, 0));
    assert_eq!(q.mode(), Mode::Normal);
    assert_eq!(q.quantize(motion(4, 4)).report, MotionReport::pointer(4, 4));
}

#[test]
fn test_zoom_burst_of_three_zoom_outs() {
    let mut q = MotionQuantizer::new(&TrackballConfig::default());
    q.set_mode(ModeControl::Zoom, true);
    q.quantize(motion(0, 5));
    // 5 + 31 = 36, three steps of 12, inverted to -3
    let result = q.quantize(motion(0, 31));
    assert_eq!(
        result.zoom,
        Some(ZoomBurst {
            direction: ZoomDirection::Out,
            count: 3
        })
    );

    let reports: Channel<NoopRawMutex, MouseReport, 16> = Channel::new();
    let keys: Channel<NoopRawMutex, KeyAction, 16> = Channel::new();
    let config = TrackballConfig {
        orientation: Orientation::default(),
        ..Default::default()
    };
    let mut processor = TrackballProcessor::new(&config, reports.sender(), keys.sender());
    block_on(processor.on_control(
        ControlEvent::Mode {
            control: ModeControl::Zoom,
            pressed: true,
        },
        &mut NoSensor,
    ));
    block_on(processor.on_motion(motion(0, 36)));

    let (mut zoom_in, mut zoom_out) = (0, 0);
    while let Ok(action) = keys.try_receive() {
        match action {
            KeyAction::Tap(chord) if chord == Chord::ZOOM_IN => zoom_in += 1,
            KeyAction::Tap(chord) if chord == Chord::ZOOM_OUT => zoom_out += 1,
            other => panic!("Unexpected key action {:?}", other),
        }
    }
    assert_eq!((zoom_in, zoom_out), (0, 3));
    assert!(reports.try_receive().is_err());
}

#[test]
fn test_full_session_through_processor() {
    let reports: Channel<NoopRawMutex, MouseReport, 16> = Channel::new();
    let keys: Channel<NoopRawMutex, KeyAction, 16> = Channel::new();
    let config = TrackballConfig {
        orientation: Orientation::default(),
        ..Default::default()
    };
    let mut processor = TrackballProcessor::new(&config, reports.sender(), keys.sender());
    let mut sensor = NoSensor;

    block_on(processor.on_motion(motion(6, -2)));
    block_on(processor.on_control(
        ControlEvent::Mode {
            control: ModeControl::Scroll,
            pressed: true,
        },
        &mut sensor,
    ));
    block_on(processor.on_motion(motion(3, 3)));
    block_on(processor.on_motion(motion(6, 6)));
    block_on(processor.on_control(
        ControlEvent::Mode {
            control: ModeControl::Scroll,
            pressed: false,
        },
        &mut sensor,
    ));
    block_on(processor.on_motion(motion(-1, 1)));

    let mut sent = Vec::new();
    while let Ok(r) = reports.try_receive() {
        sent.push((r.x, r.y, r.wheel, r.pan));
    }
    assert_eq!(sent, [(6, -2, 0, 0), (0, 0, -1, -1), (-1, 1, 0, 0)]);
    assert!(keys.try_receive().is_err());
}
