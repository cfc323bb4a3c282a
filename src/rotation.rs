//! Cyclical screenshot file naming.

use crate::error::{EngineError, EngineResult};

/// Generate the screenshot filename for a rotation index
pub fn screenshot_filename(index: usize) -> String {
    format!("monkey_screenShot{}.png", index)
}

/// Hands out `monkey_screenShot1.png` .. `monkey_screenShotN.png`, then wraps.
///
/// Storage overwrites a file when its name comes around again, so the set of
/// files on disk stays bounded however long a run lasts.
#[derive(Debug, Clone)]
pub struct ScreenshotRotation {
    index: usize,
    max_screenshots: usize,
}

impl ScreenshotRotation {
    pub fn new(max_screenshots: usize) -> EngineResult<Self> {
        if max_screenshots == 0 {
            return Err(EngineError::InvalidCapacity {
                component: "screenshot rotation",
                value: max_screenshots,
            });
        }
        Ok(Self {
            index: 1,
            max_screenshots,
        })
    }

    /// Return the current name and advance the counter
    pub fn next_name(&mut self) -> String {
        let name = screenshot_filename(self.index);
        self.index += 1;
        if self.index > self.max_screenshots {
            self.index = 1;
        }
        name
    }

    /// Index the next call to `next_name` will use
    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn max_screenshots(&self) -> usize {
        self.max_screenshots
    }
}
