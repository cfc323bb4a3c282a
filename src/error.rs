//! Errors raised to the caller of the engine.
//!
//! Device faults during a gesture are never returned here; they are recorded as
//! failed steps. What does surface is either a caller bug (a precondition
//! violation) or a session that could not be set up.

use std::path::PathBuf;

use crate::device::DeviceError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Swipe percent outside `2..=10`
    #[error("geometry: swipe percent {percent} is outside the accepted range 2..=10")]
    InvalidPercent { percent: u32 },

    /// Tap coordinate outside the screen
    #[error("orchestrator: tap ({x}, {y}) is outside the {width}x{height} screen")]
    TapOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// A capacity-like setting was zero
    #[error("{component}: capacity must be positive, got {value}")]
    InvalidCapacity {
        component: &'static str,
        value: usize,
    },

    /// The driver could not report the screen size
    #[error("session setup: cannot read screen dimensions: {0}")]
    ScreenDimensions(#[source] DeviceError),

    /// The driver reported an unusable screen size
    #[error("session setup: device reported an unusable screen size {width}x{height}")]
    InvalidScreen { width: u32, height: u32 },

    /// The driver could not identify the device
    #[error("session setup: cannot read device identifier: {0}")]
    DeviceIdentifier(#[source] DeviceError),

    /// The screenshot directory could not be created
    #[error("session setup: cannot create screenshot directory {}: {source}", .path.display())]
    StorageSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Whether this error reflects a caller bug rather than a setup fault
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidPercent { .. }
                | EngineError::TapOutOfBounds { .. }
                | EngineError::InvalidCapacity { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_component_and_argument() {
        let err = EngineError::TapOutOfBounds {
            x: 5000,
            y: 5000,
            width: 1080,
            height: 1920,
        };
        assert_eq!(
            err.to_string(),
            "orchestrator: tap (5000, 5000) is outside the 1080x1920 screen"
        );

        let err = EngineError::InvalidCapacity {
            component: "history buffer",
            value: 0,
        };
        assert_eq!(err.to_string(), "history buffer: capacity must be positive, got 0");
    }

    #[test]
    fn test_precondition_classification() {
        assert!(EngineError::InvalidPercent { percent: 1 }.is_precondition());
        assert!(!EngineError::InvalidScreen { width: 0, height: 0 }.is_precondition());
        assert!(
            !EngineError::ScreenDimensions(DeviceError::Disconnected("usb".into()))
                .is_precondition()
        );
    }
}
