//! Gesture orchestration.
//!
//! Every gesture call runs the same sequence:
//!
//! 1. validate the request (precondition violations return `Err` before
//!    anything touches the device)
//! 2. capture a screenshot under the next rotated name; a failed capture is
//!    logged and the step records no screenshot
//! 3. perform the gesture; a device fault becomes a `fail` result
//! 4. append exactly one `Step` to the history buffer
//!
//! Steps 2-4 never return an error, so one bad gesture cannot abort a run.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config;
use crate::device::{DeviceDriver, DeviceError, DeviceKey};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{self, Point, SwipeDirection, SwipePath, SwipePercent};
use crate::history::HistoryBuffer;
use crate::rotation::ScreenshotRotation;
use crate::session::Session;
use crate::step::{Gesture, Step, StepResult};

/// Configuration for a gesture engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of steps kept in the history buffer
    pub history_capacity: usize,
    /// Number of distinct screenshot names before wrapping
    pub max_screenshots: usize,
    /// Percent used by `swipe` (2..=10)
    pub swipe_percent: u32,
    /// Pause between press and move in a swipe
    pub swipe_pause: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            history_capacity: cfg.engine.history_capacity,
            max_screenshots: cfg.engine.max_screenshots,
            swipe_percent: cfg.engine.swipe_percent,
            swipe_pause: Duration::from_millis(cfg.engine.swipe_pause_ms),
        }
    }
}

impl EngineConfig {
    /// Configuration with built-in defaults, ignoring the environment
    pub fn defaults() -> Self {
        Self {
            history_capacity: config::DEFAULT_HISTORY_CAPACITY,
            max_screenshots: config::DEFAULT_MAX_SCREENSHOTS,
            swipe_percent: config::DEFAULT_SWIPE_PERCENT,
            swipe_pause: Duration::from_millis(config::DEFAULT_SWIPE_PAUSE_MS),
        }
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn max_screenshots(mut self, max: usize) -> Self {
        self.max_screenshots = max;
        self
    }

    pub fn swipe_percent(mut self, percent: u32) -> Self {
        self.swipe_percent = percent;
        self
    }

    pub fn swipe_pause(mut self, pause: Duration) -> Self {
        self.swipe_pause = pause;
        self
    }
}

/// Device primitive resolved from a validated gesture
#[derive(Debug, Clone, Copy)]
enum PlannedAction {
    Swipe(SwipePath),
    Tap(Point),
    Key(DeviceKey),
}

/// Drives gestures against one device and records their outcome
pub struct Engine<D: DeviceDriver> {
    driver: D,
    session: Session,
    device_id: String,
    width: u32,
    height: u32,
    default_percent: SwipePercent,
    swipe_pause: Duration,
    rotation: ScreenshotRotation,
    history: HistoryBuffer,
    next_sequence: u64,
}

impl<D: DeviceDriver> std::fmt::Debug for Engine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("device_id", &self.device_id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("task_id", &self.session.task_id)
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl<D: DeviceDriver> Engine<D> {
    /// Set up an engine: validate configuration, read session geometry from the
    /// driver and create the screenshot directory.
    ///
    /// Fails without returning a partially usable engine.
    pub fn new(mut driver: D, session: Session, config: EngineConfig) -> EngineResult<Self> {
        let history = HistoryBuffer::new(config.history_capacity)?;
        let rotation = ScreenshotRotation::new(config.max_screenshots)?;
        let default_percent = SwipePercent::new(config.swipe_percent)?;

        let (width, height) = driver
            .screen_dimensions()
            .map_err(EngineError::ScreenDimensions)?;
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidScreen { width, height });
        }
        let device_id = driver
            .device_identifier()
            .map_err(EngineError::DeviceIdentifier)?;

        session
            .init(&device_id, (width, height))
            .map_err(|source| EngineError::StorageSetup {
                path: session.dir.clone(),
                source,
            })?;

        info!(device = %device_id, width, height, "Connected to device");
        info!(task_id = session.task_id, dir = %session.dir.display(), "Saving screenshots");

        Ok(Self {
            driver,
            session,
            device_id,
            width,
            height,
            default_percent,
            swipe_pause: config.swipe_pause,
            rotation,
            history,
            next_sequence: 1,
        })
    }

    /// Swipe in a direction using the configured percent
    pub fn swipe(&mut self, direction: SwipeDirection) -> EngineResult<Step> {
        self.perform(Gesture::Swipe(direction))
    }

    /// Swipe in a direction with an explicit percent (2..=10)
    pub fn swipe_with_percent(
        &mut self,
        direction: SwipeDirection,
        percent: u32,
    ) -> EngineResult<Step> {
        let percent = SwipePercent::new(percent)?;
        let path = geometry::swipe_path(direction, self.width, self.height, percent);
        Ok(self.execute(Gesture::Swipe(direction), PlannedAction::Swipe(path)))
    }

    /// Tap at a pixel coordinate inside the screen
    pub fn tap(&mut self, x: u32, y: u32) -> EngineResult<Step> {
        self.perform(Gesture::Tap(Point::new(x, y)))
    }

    pub fn home(&mut self) -> EngineResult<Step> {
        self.perform(Gesture::Home)
    }

    pub fn back(&mut self) -> EngineResult<Step> {
        self.perform(Gesture::Back)
    }

    /// Perform any gesture, returning the recorded step.
    ///
    /// `Err` is returned only for precondition violations, in which case
    /// nothing is captured, performed or recorded.
    pub fn perform(&mut self, gesture: Gesture) -> EngineResult<Step> {
        let action = self.plan(&gesture)?;
        Ok(self.execute(gesture, action))
    }

    fn plan(&self, gesture: &Gesture) -> EngineResult<PlannedAction> {
        match *gesture {
            Gesture::Swipe(direction) => Ok(PlannedAction::Swipe(geometry::swipe_path(
                direction,
                self.width,
                self.height,
                self.default_percent,
            ))),
            Gesture::Tap(point) => {
                if point.x >= self.width || point.y >= self.height {
                    return Err(EngineError::TapOutOfBounds {
                        x: point.x,
                        y: point.y,
                        width: self.width,
                        height: self.height,
                    });
                }
                Ok(PlannedAction::Tap(point))
            }
            Gesture::Home => Ok(PlannedAction::Key(DeviceKey::Home)),
            Gesture::Back => Ok(PlannedAction::Key(DeviceKey::Back)),
        }
    }

    fn execute(&mut self, gesture: Gesture, action: PlannedAction) -> Step {
        info!(event = %gesture.kind(), "Event");

        let screenshot_name = self.take_screenshot();
        let outcome = self.dispatch(action);

        let result = match outcome {
            Ok(()) => StepResult::Pass,
            Err(err) => {
                error!(event = %gesture.kind(), error = %err, "Event failed");
                StepResult::Fail {
                    reason: err.to_string(),
                }
            }
        };

        self.record(gesture, screenshot_name, result)
    }

    /// Capture a screenshot under the next rotated name.
    ///
    /// The name is consumed even when the capture fails.
    fn take_screenshot(&mut self) -> Option<String> {
        let name = self.rotation.next_name();
        let saved = self
            .driver
            .capture_screenshot()
            .and_then(|png| {
                self.session
                    .save_screenshot(&name, &png)
                    .map_err(DeviceError::from)
            });

        match saved {
            Ok(path) => {
                debug!(screenshot = %path.display(), "Screenshot saved");
                Some(name)
            }
            Err(err) => {
                warn!(screenshot = %name, error = %err, "Screenshot failed");
                None
            }
        }
    }

    fn dispatch(&mut self, action: PlannedAction) -> Result<(), DeviceError> {
        match action {
            PlannedAction::Swipe(path) => {
                debug!(start = %path.start, end = %path.end, "Swipe");
                self.driver.perform_swipe(path, self.swipe_pause)
            }
            PlannedAction::Tap(point) => {
                debug!(x = point.x, y = point.y, "Tap");
                self.driver.perform_tap(point)
            }
            PlannedAction::Key(key) => {
                debug!(key = key.as_str(), "Key press");
                self.driver.press_key(key)
            }
        }
    }

    fn record(
        &mut self,
        gesture: Gesture,
        screenshot_name: Option<String>,
        result: StepResult,
    ) -> Step {
        let step = Step::new(self.next_sequence, &gesture, screenshot_name, result);
        self.next_sequence += 1;

        if let Some(evicted) = self.history.append(step.clone()) {
            debug!(sequence = evicted.sequence, action = %evicted.action, "Evicted step from history");
        }
        step
    }

    /// Recent steps, oldest first
    pub fn snapshot(&self) -> Vec<Step> {
        self.history.snapshot()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Total number of gestures recorded, including evicted ones
    pub fn executed(&self) -> u64 {
        self.next_sequence - 1
    }

    pub fn screen_width(&self) -> u32 {
        self.width
    }

    pub fn screen_height(&self) -> u32 {
        self.height
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

/// Cloneable handle that serializes whole gesture invocations on one engine
pub struct SharedEngine<D: DeviceDriver> {
    inner: Arc<Mutex<Engine<D>>>,
}

impl<D: DeviceDriver> Clone for SharedEngine<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: DeviceDriver> SharedEngine<D> {
    pub fn new(engine: Engine<D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Lock the engine for a sequence of calls
    pub fn lock(&self) -> MutexGuard<'_, Engine<D>> {
        // A panic mid-gesture leaves the engine consistent: steps are appended
        // in one call at the very end.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn perform(&self, gesture: Gesture) -> EngineResult<Step> {
        self.lock().perform(gesture)
    }

    pub fn snapshot(&self) -> Vec<Step> {
        self.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceGesture, MockDevice};
    use crate::step::GestureKind;

    fn engine_with(device: MockDevice, config: EngineConfig) -> (Engine<MockDevice>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let session = Session::in_dir(tmp.path().join("shots"), 1);
        let engine = Engine::new(device, session, config).unwrap();
        (engine, tmp)
    }

    fn engine() -> (Engine<MockDevice>, tempfile::TempDir) {
        engine_with(MockDevice::new(1080, 1920), EngineConfig::defaults())
    }

    #[test]
    fn test_swipe_up_uses_default_percent() {
        let (mut engine, _tmp) = engine();
        let step = engine.swipe(SwipeDirection::Up).unwrap();

        assert_eq!(step.action, GestureKind::SwipeUp);
        assert_eq!(step.result, StepResult::Pass);
        assert_eq!(step.screenshot_name.as_deref(), Some("monkey_screenShot1.png"));
        assert_eq!(
            engine.driver().journal(),
            &[DeviceGesture::Swipe {
                path: SwipePath {
                    start: Point::new(540, 1536),
                    end: Point::new(540, 384),
                },
                pause: Duration::from_millis(100),
            }]
        );
    }

    #[test]
    fn test_swipe_with_percent_rejects_out_of_range() {
        let (mut engine, _tmp) = engine();
        assert!(matches!(
            engine.swipe_with_percent(SwipeDirection::Left, 1),
            Err(EngineError::InvalidPercent { percent: 1 })
        ));
        assert!(engine.history().is_empty());
        assert_eq!(engine.driver().screenshots_taken(), 0);

        let step = engine.swipe_with_percent(SwipeDirection::Left, 2).unwrap();
        assert!(step.result.is_pass());
    }

    #[test]
    fn test_tap_out_of_bounds_is_rejected_before_capture() {
        let (mut engine, _tmp) = engine();
        let err = engine.tap(5000, 5000).unwrap_err();
        assert!(err.is_precondition());
        assert!(matches!(err, EngineError::TapOutOfBounds { x: 5000, y: 5000, .. }));
        assert!(engine.driver().journal().is_empty());
        assert_eq!(engine.driver().screenshots_taken(), 0);
        assert!(engine.history().is_empty());

        // The edge itself is outside the half-open screen range
        assert!(engine.tap(1080, 0).is_err());
        assert!(engine.tap(1079, 1919).is_ok());
    }

    #[test]
    fn test_tap_records_coordinates() {
        let (mut engine, _tmp) = engine();
        let step = engine.tap(100, 200).unwrap();
        assert_eq!(step.action, GestureKind::Click);
        assert_eq!((step.x, step.y), (Some(100), Some(200)));
        assert_eq!(engine.driver().journal(), &[DeviceGesture::Tap(Point::new(100, 200))]);
    }

    #[test]
    fn test_gesture_fault_becomes_fail_step() {
        let (mut engine, _tmp) = engine_with(
            MockDevice::new(1080, 1920).fail_gestures(true),
            EngineConfig::defaults(),
        );
        let step = engine.swipe(SwipeDirection::Down).unwrap();
        assert_eq!(step.result.as_str(), "fail");
        assert!(!step.result.reason().unwrap_or_default().is_empty());
        assert!(step.screenshot_name.is_some());
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_screenshot_fault_does_not_block_gesture() {
        let (mut engine, _tmp) = engine_with(
            MockDevice::new(1080, 1920).fail_screenshots(true),
            EngineConfig::defaults(),
        );
        let step = engine.swipe(SwipeDirection::Right).unwrap();
        assert!(step.screenshot_name.is_none());
        assert!(step.result.is_pass());
        assert_eq!(engine.driver().journal().len(), 1);
        assert_eq!(engine.history().len(), 1);

        // A failed capture still consumes its rotated name
        engine.driver_mut().set_fail_screenshots(false);
        let step = engine.swipe(SwipeDirection::Right).unwrap();
        assert_eq!(step.screenshot_name.as_deref(), Some("monkey_screenShot2.png"));
    }

    #[test]
    fn test_storage_fault_does_not_block_gesture() {
        let (mut engine, _tmp) = engine();
        std::fs::remove_dir_all(&engine.session().dir).unwrap();

        let step = engine.swipe(SwipeDirection::Up).unwrap();
        assert!(step.screenshot_name.is_none());
        assert_eq!(step.result, StepResult::Pass);
        assert_eq!(engine.driver().screenshots_taken(), 1);
        assert_eq!(engine.driver().journal().len(), 1);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_unsupported_key_is_recorded_as_fail() {
        let (mut engine, _tmp) = engine_with(
            MockDevice::new(1080, 1920).without_keys(),
            EngineConfig::defaults(),
        );
        let step = engine.home().unwrap();
        assert_eq!(step.action, GestureKind::Home);
        assert_eq!(
            step.result.reason(),
            Some("gesture 'home' is not supported by this driver")
        );

        let step = engine.back().unwrap();
        assert!(!step.result.is_pass());
    }

    #[test]
    fn test_history_capacity_scenario() {
        let (mut engine, _tmp) = engine_with(
            MockDevice::new(1080, 1920),
            EngineConfig::defaults().history_capacity(3),
        );
        for direction in SwipeDirection::ALL {
            engine.swipe(direction).unwrap();
        }
        let actions: Vec<GestureKind> = engine.snapshot().iter().map(|s| s.action).collect();
        assert_eq!(
            actions,
            vec![GestureKind::SwipeDown, GestureKind::SwipeLeft, GestureKind::SwipeRight]
        );
        assert_eq!(engine.executed(), 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let session = Session::in_dir(tmp.path(), 1);
        let err = Engine::new(
            MockDevice::new(10, 10),
            session.clone(),
            EngineConfig::defaults().history_capacity(0),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCapacity { component: "history buffer", .. }));

        let err = Engine::new(
            MockDevice::new(10, 10),
            session.clone(),
            EngineConfig::defaults().max_screenshots(0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidCapacity { component: "screenshot rotation", .. }
        ));

        let err = Engine::new(
            MockDevice::new(10, 10),
            session,
            EngineConfig::defaults().swipe_percent(11),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPercent { percent: 11 }));
    }

    #[test]
    fn test_setup_faults() {
        let tmp = tempfile::tempdir().unwrap();
        let session = Session::in_dir(tmp.path().join("a"), 1);

        let err = Engine::new(
            MockDevice::new(1080, 1920).fail_dimensions(true),
            session.clone(),
            EngineConfig::defaults(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::ScreenDimensions(_)));

        let err = Engine::new(MockDevice::new(0, 1920), session, EngineConfig::defaults())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidScreen { width: 0, .. }));

        // A file where the directory should go
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let err = Engine::new(
            MockDevice::new(1080, 1920),
            Session::in_dir(blocker.join("shots"), 1),
            EngineConfig::defaults(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::StorageSetup { .. }));
    }

    #[test]
    fn test_shared_engine_serializes_callers() {
        let (engine, _tmp) = engine_with(
            MockDevice::new(1080, 1920),
            EngineConfig::defaults().history_capacity(100),
        );
        let shared = SharedEngine::new(engine);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        shared.perform(Gesture::Swipe(SwipeDirection::Up)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sequences: Vec<u64> = shared.snapshot().iter().map(|s| s.sequence).collect();
        assert_eq!(sequences, (1..=20).collect::<Vec<u64>>());
        assert_eq!(shared.lock().driver().journal().len(), 20);
    }
}
