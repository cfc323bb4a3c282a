//! In-memory device for tests and dry runs.
//!
//! `MockDevice` keeps a journal of every gesture it receives and renders its
//! screenshots from a small framebuffer, so screenshot files written during a
//! dry run are real PNGs showing the last gesture. Faults can be injected per
//! primitive to exercise the engine's failure paths.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageBuffer, RgbImage};
use std::io::Cursor;
use std::time::Duration;

use super::types::{DeviceDriver, DeviceError, DeviceKey, DeviceResult};
use crate::geometry::{Point, SwipePath};

/// Device pixels per framebuffer pixel
const PREVIEW_SCALE: u32 = 4;

/// Longest framebuffer side; larger screens use a coarser scale
const MAX_PREVIEW_SIDE: u32 = 1024;

const BACKGROUND: [u8; 3] = [32, 32, 40];
const FOREGROUND: [u8; 3] = [230, 230, 230];
const SWIPE_START: [u8; 3] = [13, 188, 121];
const SWIPE_END: [u8; 3] = [205, 49, 49];
const TAP: [u8; 3] = [36, 114, 200];

/// A virtual framebuffer with a minimal drawing API
#[derive(Debug, Clone)]
pub struct MockFramebuffer {
    width: u32,
    height: u32,
    /// RGB pixel buffer (row-major, 3 bytes per pixel)
    buffer: Vec<u8>,
}

impl MockFramebuffer {
    /// Create a new framebuffer initialized to a color
    pub fn with_color(width: u32, height: u32, color: [u8; 3]) -> Self {
        let mut fb = Self {
            width,
            height,
            buffer: vec![0u8; width as usize * height as usize * 3],
        };
        fb.fill(color);
        fb
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fill(&mut self, color: [u8; 3]) {
        for chunk in self.buffer.chunks_exact_mut(3) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Draw a filled rectangle, clipped to the buffer
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        for py in y..y.saturating_add(h).min(self.height) {
            for px in x..x.saturating_add(w).min(self.width) {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Draw text using 8x8 glyphs. Text does not wrap.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, fg: [u8; 3]) {
        let mut cursor_x = x;
        for ch in text.chars() {
            if cursor_x >= self.width {
                break;
            }
            let glyph = BASIC_FONTS.get(ch).unwrap_or([0u8; 8]);
            for (row_idx, row) in glyph.iter().enumerate() {
                for bit in 0..8 {
                    // font8x8 stores LSB as leftmost pixel
                    if (row >> bit) & 1 == 1 {
                        self.set_pixel(
                            cursor_x.saturating_add(bit),
                            y.saturating_add(row_idx as u32),
                            fg,
                        );
                    }
                }
            }
            cursor_x = cursor_x.saturating_add(8);
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let idx = self.index(x, y);
        [self.buffer[idx], self.buffer[idx + 1], self.buffer[idx + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.buffer[idx..idx + 3].copy_from_slice(&color);
    }

    /// Encode the framebuffer as PNG bytes
    pub fn to_png(&self) -> DeviceResult<Vec<u8>> {
        let img: RgbImage = ImageBuffer::from_raw(self.width, self.height, self.buffer.clone())
            .ok_or_else(|| DeviceError::Command("framebuffer size mismatch".to_string()))?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| DeviceError::Command(format!("Failed to encode PNG: {}", e)))?;
        Ok(bytes)
    }
}

/// A primitive received by the mock device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceGesture {
    Swipe { path: SwipePath, pause: Duration },
    Tap(Point),
    Key(DeviceKey),
}

/// Simulated device with a gesture journal and fault injection
#[derive(Debug, Clone)]
pub struct MockDevice {
    identifier: String,
    width: u32,
    height: u32,
    scale: u32,
    screen: MockFramebuffer,
    journal: Vec<DeviceGesture>,
    screenshots_taken: usize,
    fail_dimensions: bool,
    fail_screenshots: bool,
    fail_gestures: bool,
    keys_supported: bool,
}

impl MockDevice {
    pub fn new(width: u32, height: u32) -> Self {
        let scale = PREVIEW_SCALE.max(width.max(height).div_ceil(MAX_PREVIEW_SIDE));
        let screen = MockFramebuffer::with_color(
            (width / scale).max(1),
            (height / scale).max(1),
            BACKGROUND,
        );
        Self {
            identifier: "mock-device".to_string(),
            width,
            height,
            scale,
            screen,
            journal: Vec::new(),
            screenshots_taken: 0,
            fail_dimensions: false,
            fail_screenshots: false,
            fail_gestures: false,
            keys_supported: true,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Make `screen_dimensions` fail
    pub fn fail_dimensions(mut self, fail: bool) -> Self {
        self.fail_dimensions = fail;
        self
    }

    /// Make `capture_screenshot` fail
    pub fn fail_screenshots(mut self, fail: bool) -> Self {
        self.fail_screenshots = fail;
        self
    }

    /// Make swipes, taps and key presses fail
    pub fn fail_gestures(mut self, fail: bool) -> Self {
        self.fail_gestures = fail;
        self
    }

    /// Report key presses as unsupported, like a driver without key events
    pub fn without_keys(mut self) -> Self {
        self.keys_supported = false;
        self
    }

    /// Toggle gesture faults on an existing device
    pub fn set_fail_gestures(&mut self, fail: bool) {
        self.fail_gestures = fail;
    }

    /// Toggle screenshot faults on an existing device
    pub fn set_fail_screenshots(&mut self, fail: bool) {
        self.fail_screenshots = fail;
    }

    /// Every primitive successfully performed, in order
    pub fn journal(&self) -> &[DeviceGesture] {
        &self.journal
    }

    pub fn screenshots_taken(&self) -> usize {
        self.screenshots_taken
    }

    pub fn screen(&self) -> &MockFramebuffer {
        &self.screen
    }

    fn check_gesture(&self, what: &str) -> DeviceResult<()> {
        if self.fail_gestures {
            return Err(DeviceError::Disconnected(format!(
                "{} rejected by {}",
                what, self.identifier
            )));
        }
        Ok(())
    }

    fn to_preview(&self, point: Point) -> (u32, u32) {
        (point.x / self.scale, point.y / self.scale)
    }

    /// Redraw the screen to show the last gesture
    fn render(&mut self, label: &str, markers: &[(Point, [u8; 3])]) {
        self.screen.fill(BACKGROUND);
        self.screen.draw_text(4, 4, label, FOREGROUND);
        for (point, color) in markers {
            let (x, y) = self.to_preview(*point);
            self.screen
                .draw_rect(x.saturating_sub(2), y.saturating_sub(2), 5, 5, *color);
        }
    }
}

impl DeviceDriver for MockDevice {
    fn screen_dimensions(&mut self) -> DeviceResult<(u32, u32)> {
        if self.fail_dimensions {
            return Err(DeviceError::Disconnected(format!(
                "{} did not report a window size",
                self.identifier
            )));
        }
        Ok((self.width, self.height))
    }

    fn device_identifier(&mut self) -> DeviceResult<String> {
        Ok(self.identifier.clone())
    }

    fn capture_screenshot(&mut self) -> DeviceResult<Vec<u8>> {
        if self.fail_screenshots {
            return Err(DeviceError::Command("screencap failed".to_string()));
        }
        let png = self.screen.to_png()?;
        self.screenshots_taken += 1;
        Ok(png)
    }

    fn perform_swipe(&mut self, path: SwipePath, pause: Duration) -> DeviceResult<()> {
        self.check_gesture("swipe")?;
        self.render(
            &format!("swipe {} -> {}", path.start, path.end),
            &[(path.start, SWIPE_START), (path.end, SWIPE_END)],
        );
        self.journal.push(DeviceGesture::Swipe { path, pause });
        Ok(())
    }

    fn perform_tap(&mut self, point: Point) -> DeviceResult<()> {
        self.check_gesture("tap")?;
        self.render(&format!("tap {}", point), &[(point, TAP)]);
        self.journal.push(DeviceGesture::Tap(point));
        Ok(())
    }

    fn press_key(&mut self, key: DeviceKey) -> DeviceResult<()> {
        if !self.keys_supported {
            return Err(DeviceError::Unsupported(key.as_str()));
        }
        self.check_gesture(key.as_str())?;
        self.render(&format!("key {}", key.as_str()), &[]);
        self.journal.push(DeviceGesture::Key(key));
        Ok(())
    }
}
