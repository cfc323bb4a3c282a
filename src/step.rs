//! Types for recorded gesture steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geometry::{Point, SwipeDirection};

/// Element label used while no element targeting exists.
pub const PAGE_ELEMENT: &str = "Page";

/// Identifier of an executed gesture, as it appears in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum GestureKind {
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
    Click,
    Home,
    Back,
}

impl GestureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwipeUp => "swipe-up",
            Self::SwipeDown => "swipe-down",
            Self::SwipeLeft => "swipe-left",
            Self::SwipeRight => "swipe-right",
            Self::Click => "click",
            Self::Home => "home",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gesture request issued by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Swipe across the screen using the configured percent
    Swipe(SwipeDirection),
    /// Tap at an absolute pixel coordinate
    Tap(Point),
    /// Press the home key
    Home,
    /// Press the back key
    Back,
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::Swipe(SwipeDirection::Up) => GestureKind::SwipeUp,
            Gesture::Swipe(SwipeDirection::Down) => GestureKind::SwipeDown,
            Gesture::Swipe(SwipeDirection::Left) => GestureKind::SwipeLeft,
            Gesture::Swipe(SwipeDirection::Right) => GestureKind::SwipeRight,
            Gesture::Tap(_) => GestureKind::Click,
            Gesture::Home => GestureKind::Home,
            Gesture::Back => GestureKind::Back,
        }
    }
}

/// Error returned when a gesture string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid gesture '{input}': {reason}")]
pub struct ParseGestureError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for Gesture {
    type Err = ParseGestureError;

    /// Accepts `swipe-up`/`up` (and the other directions), `tap:X:Y` or
    /// `click:X:Y`, `home` and `back`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let err = |reason| ParseGestureError {
            input: s.to_string(),
            reason,
        };

        match normalized.as_str() {
            "swipe-up" | "up" => return Ok(Gesture::Swipe(SwipeDirection::Up)),
            "swipe-down" | "down" => return Ok(Gesture::Swipe(SwipeDirection::Down)),
            "swipe-left" | "left" => return Ok(Gesture::Swipe(SwipeDirection::Left)),
            "swipe-right" | "right" => return Ok(Gesture::Swipe(SwipeDirection::Right)),
            "home" => return Ok(Gesture::Home),
            "back" => return Ok(Gesture::Back),
            _ => {}
        }

        let parts: Vec<&str> = normalized.split(':').collect();
        match parts.as_slice() {
            ["tap" | "click", x, y] => {
                let x = x.parse().map_err(|_| err("x is not a pixel coordinate"))?;
                let y = y.parse().map_err(|_| err("y is not a pixel coordinate"))?;
                Ok(Gesture::Tap(Point::new(x, y)))
            }
            ["tap" | "click", ..] => Err(err("expected tap:X:Y")),
            _ => Err(err("unknown gesture")),
        }
    }
}

/// Outcome of one executed gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepResult {
    Pass,
    Fail { reason: String },
}

impl StepResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, StepResult::Pass)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepResult::Pass => "pass",
            StepResult::Fail { .. } => "fail",
        }
    }

    /// Failure description, if the step failed
    pub fn reason(&self) -> Option<&str> {
        match self {
            StepResult::Pass => None,
            StepResult::Fail { reason } => Some(reason),
        }
    }
}

/// Record of one executed gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Position of this step within its engine's run (starts at 1)
    pub sequence: u64,

    /// Label of the logical target acted upon
    pub element_name: String,

    /// Gesture that was executed
    pub action: GestureKind,

    /// Tap coordinates (None for non-tap gestures)
    pub x: Option<u32>,
    pub y: Option<u32>,

    /// Screenshot taken right before the gesture (None if capture failed)
    pub screenshot_name: Option<String>,

    pub result: StepResult,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Step {
    pub fn new(
        sequence: u64,
        gesture: &Gesture,
        screenshot_name: Option<String>,
        result: StepResult,
    ) -> Self {
        let (x, y) = match gesture {
            Gesture::Tap(point) => (Some(point.x), Some(point.y)),
            _ => (None, None),
        };

        Self {
            sequence,
            element_name: PAGE_ELEMENT.to_string(),
            action: gesture.kind(),
            x,
            y,
            screenshot_name,
            result,
            timestamp: Utc::now(),
        }
    }
}
