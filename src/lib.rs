//! Monkey Runner - pseudo-random UI exploration for mobile devices.
//!
//! This crate provides:
//! - A gesture engine that screenshots, performs and records each gesture
//! - A fixed-capacity rolling history of the most recent steps
//! - Deterministic swipe coordinate derivation
//! - Cyclical screenshot naming so storage stays bounded
//! - Device drivers for `adb` and an in-memory mock
//!
//! # Example
//!
//! ```rust,no_run
//! use monkey_runner::{Engine, EngineConfig, MockDevice, Session, SwipeDirection};
//!
//! let session = Session::new(1);
//! let mut engine = Engine::new(MockDevice::new(1080, 1920), session, EngineConfig::default()).unwrap();
//! engine.swipe(SwipeDirection::Up).unwrap();
//! engine.tap(540, 960).unwrap();
//! for step in engine.snapshot() {
//!     println!("{} {}", step.action, step.result.as_str());
//! }
//! ```

pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod history;
pub mod rotation;
pub mod runner;
pub mod session;
pub mod step;

// Re-export engine types
pub use engine::{Engine, EngineConfig, SharedEngine};
pub use error::{EngineError, EngineResult};

// Re-export the step model
pub use history::HistoryBuffer;
pub use rotation::ScreenshotRotation;
pub use step::{Gesture, GestureKind, ParseGestureError, Step, StepResult};

// Re-export geometry
pub use geometry::{Point, SwipeDirection, SwipePath, SwipePercent};

// Re-export device drivers
pub use device::{AdbDevice, AdbDeviceConfig, DeviceDriver, DeviceError, DeviceKey, MockDevice};

pub use runner::{RunReport, run_gestures};
pub use session::Session;
