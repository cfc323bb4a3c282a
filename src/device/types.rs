// Device driver contract used by the gesture engine

use std::time::Duration;

use crate::geometry::{Point, SwipePath};

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Faults raised by a device driver
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device or automation session is not reachable
    #[error("device disconnected: {0}")]
    Disconnected(String),

    /// The device accepted the request but the command failed
    #[error("command failed: {0}")]
    Command(String),

    /// The driver does not implement this gesture
    #[error("gesture '{0}' is not supported by this driver")]
    Unsupported(&'static str),

    /// Output from the device could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Hardware keys a driver may be asked to press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKey {
    Home,
    Back,
}

impl DeviceKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKey::Home => "home",
            DeviceKey::Back => "back",
        }
    }
}

/// Trait for device automation drivers
///
/// Implementations provide the raw primitives the engine sequences:
/// - `AdbDevice` for Android devices reachable through `adb`
/// - `MockDevice` for testing with an in-memory screen
pub trait DeviceDriver: Send {
    /// Screen size in pixels as `(width, height)`
    fn screen_dimensions(&mut self) -> DeviceResult<(u32, u32)>;

    /// Opaque identifier of the device behind this session
    fn device_identifier(&mut self) -> DeviceResult<String>;

    /// Capture the current screen as PNG bytes
    fn capture_screenshot(&mut self) -> DeviceResult<Vec<u8>>;

    /// Press at `path.start`, hold for `pause`, move to `path.end` and release
    fn perform_swipe(&mut self, path: SwipePath, pause: Duration) -> DeviceResult<()>;

    /// Tap once at a point
    fn perform_tap(&mut self, point: Point) -> DeviceResult<()>;

    /// Press a hardware key
    fn press_key(&mut self, key: DeviceKey) -> DeviceResult<()> {
        Err(DeviceError::Unsupported(key.as_str()))
    }
}

impl<D: DeviceDriver + ?Sized> DeviceDriver for Box<D> {
    fn screen_dimensions(&mut self) -> DeviceResult<(u32, u32)> {
        (**self).screen_dimensions()
    }

    fn device_identifier(&mut self) -> DeviceResult<String> {
        (**self).device_identifier()
    }

    fn capture_screenshot(&mut self) -> DeviceResult<Vec<u8>> {
        (**self).capture_screenshot()
    }

    fn perform_swipe(&mut self, path: SwipePath, pause: Duration) -> DeviceResult<()> {
        (**self).perform_swipe(path, pause)
    }

    fn perform_tap(&mut self, point: Point) -> DeviceResult<()> {
        (**self).perform_tap(point)
    }

    fn press_key(&mut self, key: DeviceKey) -> DeviceResult<()> {
        (**self).press_key(key)
    }
}
