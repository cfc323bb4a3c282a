//! Screenshot storage for one exploration task.
//!
//! Resolves rotated screenshot names into paths under a per-task directory:
//!
//! ```text
//! <result_dir>/<YYYYMMDD>/screenshots/<task_id>/monkey_screenShot1.png
//! ```
//!
//! The engine only ever hands this module names; path construction and
//! directory creation live here.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config;

/// Storage location for one task's screenshots
#[derive(Debug, Clone)]
pub struct Session {
    /// Task identifier, unique per engine instance within a run directory
    pub task_id: u32,
    /// Directory holding this task's screenshots
    pub dir: PathBuf,
}

impl Session {
    /// Create a session for a task under the configured result directory
    pub fn new(task_id: u32) -> Self {
        Self::for_task(config::result_dir(), task_id)
    }

    /// Create a session for a task under a specific result directory
    pub fn for_task(result_dir: impl AsRef<Path>, task_id: u32) -> Self {
        let dir = result_dir
            .as_ref()
            .join(generate_date_stamp())
            .join("screenshots")
            .join(task_id.to_string());
        Self { task_id, dir }
    }

    /// Create a session writing directly into a directory
    pub fn in_dir(dir: impl Into<PathBuf>, task_id: u32) -> Self {
        Self {
            task_id,
            dir: dir.into(),
        }
    }

    /// Create the session directory and write session metadata
    pub fn init(&self, device: &str, screen: (u32, u32)) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let metadata = serde_json::json!({
            "task_id": self.task_id,
            "device": device,
            "screen_width": screen.0,
            "screen_height": screen.1,
            "created": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_path = self.dir.join(".session.json");
        fs::write(metadata_path, serde_json::to_string_pretty(&metadata)?)?;

        Ok(())
    }

    /// Get path for a screenshot name
    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.dir.join(sanitize_name(name))
    }

    /// Write screenshot bytes under a name, replacing any older file with that name
    pub fn save_screenshot(&self, name: &str, data: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.screenshot_path(name);
        fs::write(&path, data)?;
        Ok(path)
    }

    /// List all PNG files in the session
    pub fn list_screenshots(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut screenshots = Vec::new();
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.extension().map(|e| e == "png").unwrap_or(false) {
                    screenshots.push(path);
                }
            }
        }
        screenshots.sort();
        Ok(screenshots)
    }
}

/// Generate the dated directory component
fn generate_date_stamp() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

/// Sanitize a name for use in filenames
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect()
}
