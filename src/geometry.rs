//! Swipe coordinate derivation.
//!
//! All functions are pure: the same screen size and percent always produce the
//! same path. Arithmetic truncates, matching pixel-coordinate semantics, so
//! `swipe_up(1080, 1920, 5)` runs from `(540, 1536)` to `(540, 384)`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, EngineResult};

/// Smallest accepted swipe percent
pub const MIN_SWIPE_PERCENT: u32 = 2;

/// Largest accepted swipe percent
pub const MAX_SWIPE_PERCENT: u32 = 10;

/// A pixel coordinate on the device screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Start and end point of a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipePath {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    pub const ALL: [SwipeDirection; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Fractional divisor controlling how far from the screen edge a swipe starts.
///
/// A percent of `p` swipes between `1/p` and `(p-1)/p` of the screen extent,
/// so 3 swipes from two thirds to one third. Only `2..=10` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SwipePercent(u32);

impl SwipePercent {
    pub fn new(percent: u32) -> EngineResult<Self> {
        if (MIN_SWIPE_PERCENT..=MAX_SWIPE_PERCENT).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(EngineError::InvalidPercent { percent })
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for SwipePercent {
    fn default() -> Self {
        Self(crate::config::DEFAULT_SWIPE_PERCENT)
    }
}

impl TryFrom<u32> for SwipePercent {
    type Error = EngineError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// `extent * (p - 1) / p`, computed wide to avoid overflow on large screens
fn far(extent: u32, percent: SwipePercent) -> u32 {
    let p = u64::from(percent.get());
    (u64::from(extent) * (p - 1) / p) as u32
}

/// `extent / p`
fn near(extent: u32, percent: SwipePercent) -> u32 {
    extent / percent.get()
}

pub fn swipe_up(width: u32, height: u32, percent: SwipePercent) -> SwipePath {
    SwipePath {
        start: Point::new(width / 2, far(height, percent)),
        end: Point::new(width / 2, near(height, percent)),
    }
}

pub fn swipe_down(width: u32, height: u32, percent: SwipePercent) -> SwipePath {
    SwipePath {
        start: Point::new(width / 2, near(height, percent)),
        end: Point::new(width / 2, far(height, percent)),
    }
}

pub fn swipe_left(width: u32, height: u32, percent: SwipePercent) -> SwipePath {
    SwipePath {
        start: Point::new(far(width, percent), height / 2),
        end: Point::new(near(width, percent), height / 2),
    }
}

pub fn swipe_right(width: u32, height: u32, percent: SwipePercent) -> SwipePath {
    SwipePath {
        start: Point::new(near(width, percent), height / 2),
        end: Point::new(far(width, percent), height / 2),
    }
}

/// Derive the swipe path for a direction
pub fn swipe_path(
    direction: SwipeDirection,
    width: u32,
    height: u32,
    percent: SwipePercent,
) -> SwipePath {
    match direction {
        SwipeDirection::Up => swipe_up(width, height, percent),
        SwipeDirection::Down => swipe_down(width, height, percent),
        SwipeDirection::Left => swipe_left(width, height, percent),
        SwipeDirection::Right => swipe_right(width, height, percent),
    }
}
