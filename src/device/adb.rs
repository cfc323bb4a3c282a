//! Android driver backed by the `adb` command line tool.
//!
//! Every primitive is a single `adb` invocation:
//!
//! | Primitive | Command |
//! |-----------|---------|
//! | screen size | `adb shell wm size` |
//! | identifier | `adb get-serialno` |
//! | screenshot | `adb exec-out screencap -p` |
//! | swipe | `adb shell input swipe X1 Y1 X2 Y2 MS` |
//! | tap | `adb shell input tap X Y` |
//! | home / back | `adb shell input keyevent 3` / `4` |

use std::process::{Command, Output};
use std::time::Duration;
use tracing::debug;

use super::types::{DeviceDriver, DeviceError, DeviceKey, DeviceResult};
use crate::config;
use crate::geometry::{Point, SwipePath};

const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

/// Configuration for the adb driver
#[derive(Debug, Clone)]
pub struct AdbDeviceConfig {
    /// Path to the adb executable
    pub adb_path: String,
    /// Serial passed as `adb -s` (None uses the only attached device)
    pub serial: Option<String>,
}

impl Default for AdbDeviceConfig {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            adb_path: cfg.device.adb_path.clone(),
            serial: cfg.device.serial.clone(),
        }
    }
}

impl AdbDeviceConfig {
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn adb_path(mut self, path: impl Into<String>) -> Self {
        self.adb_path = path.into();
        self
    }
}

pub struct AdbDevice {
    config: AdbDeviceConfig,
}

impl AdbDevice {
    pub fn new(config: AdbDeviceConfig) -> Self {
        Self { config }
    }

    fn run(&self, args: &[&str]) -> DeviceResult<Output> {
        let mut cmd = Command::new(&self.config.adb_path);
        if let Some(serial) = &self.config.serial {
            cmd.args(["-s", serial]);
        }
        cmd.args(args);
        debug!(adb = %self.config.adb_path, ?args, "adb");

        let output = cmd.output().map_err(|e| {
            DeviceError::Disconnected(format!("cannot run '{}': {}", self.config.adb_path, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeviceError::Command(format!(
                "adb {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(output)
    }

    fn shell(&self, args: &[&str]) -> DeviceResult<String> {
        let mut full = vec!["shell"];
        full.extend_from_slice(args);
        let output = self.run(&full)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl DeviceDriver for AdbDevice {
    fn screen_dimensions(&mut self) -> DeviceResult<(u32, u32)> {
        let output = self.shell(&["wm", "size"])?;
        parse_wm_size(&output)
    }

    fn device_identifier(&mut self) -> DeviceResult<String> {
        if let Some(serial) = &self.config.serial {
            return Ok(serial.clone());
        }
        let output = self.run(&["get-serialno"])?;
        let serial = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if serial.is_empty() || serial == "unknown" {
            return Err(DeviceError::InvalidResponse(
                "get-serialno returned no serial".to_string(),
            ));
        }
        Ok(serial)
    }

    fn capture_screenshot(&mut self) -> DeviceResult<Vec<u8>> {
        let output = self.run(&["exec-out", "screencap", "-p"])?;
        if !output.stdout.starts_with(&PNG_MAGIC) {
            return Err(DeviceError::InvalidResponse(format!(
                "screencap returned {} bytes without a PNG header",
                output.stdout.len()
            )));
        }
        Ok(output.stdout)
    }

    fn perform_swipe(&mut self, path: SwipePath, pause: Duration) -> DeviceResult<()> {
        // `input swipe` holds for the whole duration, so the pause keeps it from
        // registering as a tap.
        let args = [
            path.start.x.to_string(),
            path.start.y.to_string(),
            path.end.x.to_string(),
            path.end.y.to_string(),
            pause.as_millis().to_string(),
        ];
        let mut full = vec!["input", "swipe"];
        full.extend(args.iter().map(String::as_str));
        self.shell(&full)?;
        Ok(())
    }

    fn perform_tap(&mut self, point: Point) -> DeviceResult<()> {
        let (x, y) = (point.x.to_string(), point.y.to_string());
        self.shell(&["input", "tap", &x, &y])?;
        Ok(())
    }

    fn press_key(&mut self, key: DeviceKey) -> DeviceResult<()> {
        let keycode = match key {
            DeviceKey::Home => "3",
            DeviceKey::Back => "4",
        };
        self.shell(&["input", "keyevent", keycode])?;
        Ok(())
    }
}

/// Parse `wm size` output. An override size takes precedence over the physical one.
///
/// ```text
/// Physical size: 1080x1920
/// Override size: 720x1280
/// ```
pub fn parse_wm_size(output: &str) -> DeviceResult<(u32, u32)> {
    let mut physical = None;
    let mut overridden = None;

    for line in output.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let Some((w, h)) = value.trim().split_once('x') else {
            continue;
        };
        let (Ok(w), Ok(h)) = (w.trim().parse::<u32>(), h.trim().parse::<u32>()) else {
            continue;
        };
        match label.trim() {
            "Physical size" => physical = Some((w, h)),
            "Override size" => overridden = Some((w, h)),
            _ => {}
        }
    }

    overridden.or(physical).ok_or_else(|| {
        DeviceError::InvalidResponse(format!("cannot parse screen size from '{}'", output.trim()))
    })
}
