//! Integration tests for the gesture engine against the mock device

use pretty_assertions::assert_eq;
use std::fs;

use monkey_runner::device::DeviceGesture;
use monkey_runner::{
    Engine, EngineConfig, EngineError, Gesture, GestureKind, MockDevice, Point, Session,
    StepResult, SwipeDirection, SwipePath, run_gestures,
};

fn new_engine(
    device: MockDevice,
    config: EngineConfig,
) -> (Engine<MockDevice>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let session = Session::for_task(tmp.path(), 1);
    let engine = Engine::new(device, session, config).expect("Failed to build engine");
    (engine, tmp)
}

#[test]
fn test_history_keeps_last_capacity_steps() {
    let (mut engine, _tmp) = new_engine(
        MockDevice::new(1080, 1920),
        EngineConfig::defaults().history_capacity(10),
    );

    for i in 0..25u32 {
        let direction = SwipeDirection::ALL[(i % 4) as usize];
        engine.swipe(direction).unwrap();
        assert_eq!(engine.history().len(), (i as usize + 1).min(10));
    }

    let sequences: Vec<u64> = engine.snapshot().iter().map(|s| s.sequence).collect();
    assert_eq!(sequences, (16..=25).collect::<Vec<u64>>());
}

#[test]
fn test_screenshots_rotate_on_disk() {
    let (mut engine, _tmp) = new_engine(
        MockDevice::new(1080, 1920),
        EngineConfig::defaults().max_screenshots(3).history_capacity(10),
    );

    let names: Vec<Option<String>> = (0..7)
        .map(|_| engine.tap(10, 10).unwrap().screenshot_name)
        .collect();
    assert_eq!(names[0].as_deref(), Some("monkey_screenShot1.png"));
    assert_eq!(names[3], names[0]);
    assert_eq!(names[6].as_deref(), Some("monkey_screenShot1.png"));

    let files = engine.session().list_screenshots().unwrap();
    let file_names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        file_names,
        vec![
            "monkey_screenShot1.png",
            "monkey_screenShot2.png",
            "monkey_screenShot3.png"
        ]
    );

    let png = fs::read(&files[0]).unwrap();
    assert_eq!(&png[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    assert!(engine.session().dir.join(".session.json").exists());
}

#[test]
fn test_rotation_and_history_are_independent() {
    let (mut engine, _tmp) = new_engine(
        MockDevice::new(1080, 1920),
        EngineConfig::defaults().max_screenshots(2).history_capacity(5),
    );
    for _ in 0..5 {
        engine.swipe(SwipeDirection::Up).unwrap();
    }
    let names: Vec<String> = engine
        .snapshot()
        .into_iter()
        .filter_map(|s| s.screenshot_name)
        .collect();
    assert_eq!(names.len(), 5);
    assert_eq!(engine.session().list_screenshots().unwrap().len(), 2);
}

#[test]
fn test_failures_are_recorded_and_run_continues() {
    let (mut engine, _tmp) = new_engine(
        MockDevice::new(1080, 1920),
        EngineConfig::defaults(),
    );

    engine.swipe(SwipeDirection::Up).unwrap();
    engine.driver_mut().set_fail_gestures(true);
    engine.swipe(SwipeDirection::Down).unwrap();
    engine.tap(1, 1).unwrap();
    engine.driver_mut().set_fail_gestures(false);
    engine.swipe(SwipeDirection::Left).unwrap();

    let results: Vec<&'static str> = engine.snapshot().iter().map(|s| s.result.as_str()).collect();
    assert_eq!(results, vec!["pass", "fail", "fail", "pass"]);

    for step in engine.snapshot().iter().filter(|s| !s.result.is_pass()) {
        assert!(!step.result.reason().unwrap().is_empty());
        assert!(step.screenshot_name.is_some());
    }
    assert_eq!(engine.driver().journal().len(), 2);
}

#[test]
fn test_swipe_coordinates_reach_driver() {
    let (mut engine, _tmp) = new_engine(MockDevice::new(1080, 1920), EngineConfig::defaults());
    engine.swipe(SwipeDirection::Up).unwrap();
    engine.swipe_with_percent(SwipeDirection::Right, 3).unwrap();

    let paths: Vec<SwipePath> = engine
        .driver()
        .journal()
        .iter()
        .filter_map(|g| match g {
            DeviceGesture::Swipe { path, .. } => Some(*path),
            _ => None,
        })
        .collect();
    assert_eq!(
        paths,
        vec![
            SwipePath {
                start: Point::new(540, 1536),
                end: Point::new(540, 384)
            },
            SwipePath {
                start: Point::new(360, 960),
                end: Point::new(720, 960)
            },
        ]
    );
}

#[test]
fn test_out_of_bounds_tap_is_not_recorded() {
    let (mut engine, _tmp) = new_engine(MockDevice::new(1080, 1920), EngineConfig::defaults());
    let err = engine.tap(5000, 5000).unwrap_err();
    assert!(matches!(
        err,
        EngineError::TapOutOfBounds {
            width: 1080,
            height: 1920,
            ..
        }
    ));
    assert!(engine.snapshot().is_empty());

    // Rotation was not advanced by the rejected call
    let step = engine.tap(5, 5).unwrap();
    assert_eq!(step.screenshot_name.as_deref(), Some("monkey_screenShot1.png"));
}

#[test]
fn test_home_and_back_on_mock() {
    let (mut engine, _tmp) = new_engine(MockDevice::new(1080, 1920), EngineConfig::defaults());
    let report = run_gestures(&mut engine, &[Gesture::Home, Gesture::Back], 1).unwrap();
    let actions: Vec<GestureKind> = report.steps.iter().map(|s| s.action).collect();
    assert_eq!(actions, vec![GestureKind::Home, GestureKind::Back]);
    assert!(report.steps.iter().all(|s| s.result == StepResult::Pass));
}

#[test]
fn test_report_serializes() {
    let (mut engine, _tmp) = new_engine(MockDevice::new(1080, 1920), EngineConfig::defaults());
    let gestures: Vec<Gesture> = ["up", "tap:10:20"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let report = run_gestures(&mut engine, &gestures, 1).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["executed"], 2);
    assert_eq!(json["steps"][0]["action"], "swipe-up");
    assert_eq!(json["steps"][1]["action"], "click");
    assert_eq!(json["steps"][1]["x"], 10);
    assert_eq!(json["steps"][1]["result"]["status"], "pass");
    assert_eq!(json["steps"][0]["element_name"], "Page");
}

#[test]
fn test_independent_engines_do_not_share_counters() {
    let (mut a, _tmp_a) = new_engine(MockDevice::new(1080, 1920), EngineConfig::defaults());
    let (mut b, _tmp_b) = new_engine(MockDevice::new(720, 1280), EngineConfig::defaults());

    a.swipe(SwipeDirection::Up).unwrap();
    a.swipe(SwipeDirection::Up).unwrap();
    let step = b.swipe(SwipeDirection::Up).unwrap();

    assert_eq!(step.sequence, 1);
    assert_eq!(step.screenshot_name.as_deref(), Some("monkey_screenShot1.png"));
    assert_eq!(a.history().len(), 2);
    assert_eq!(b.history().len(), 1);
}

#[test]
fn test_gesture_kinds_are_matched_with_fallback() {
    fn family(kind: GestureKind) -> &'static str {
        match kind {
            GestureKind::SwipeUp
            | GestureKind::SwipeDown
            | GestureKind::SwipeLeft
            | GestureKind::SwipeRight => "swipe",
            GestureKind::Click => "tap",
            GestureKind::Home | GestureKind::Back => "key",
            _ => "other",
        }
    }

    let (mut engine, _tmp) = new_engine(MockDevice::new(1080, 1920), EngineConfig::defaults());
    let gestures: Vec<Gesture> = ["left", "tap:3:4", "back"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let report = run_gestures(&mut engine, &gestures, 1).unwrap();
    let families: Vec<&str> = report.steps.iter().map(|s| family(s.action)).collect();
    assert_eq!(families, vec!["swipe", "tap", "key"]);
}
