//! Plays a caller-supplied gesture list and summarizes the run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::device::DeviceDriver;
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::step::{Gesture, Step};

/// Result of a complete exploration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub task_id: u32,

    /// Device identifier reported by the driver
    pub device: String,

    pub screen_width: u32,
    pub screen_height: u32,

    /// Directory the screenshots were written to
    pub screenshot_dir: PathBuf,

    /// Gestures executed, including those no longer in `steps`
    pub executed: u64,

    /// Pass/fail counts over the whole run
    pub passed: u64,
    pub failed: u64,

    /// Most recent steps (N executed gestures → min(N, capacity) steps)
    pub steps: Vec<Step>,
}

/// Perform `gestures` in order, `rounds` times.
///
/// Device faults are recorded in the history and counted in the report; only
/// a precondition violation stops the run early.
pub fn run_gestures<D: DeviceDriver>(
    engine: &mut Engine<D>,
    gestures: &[Gesture],
    rounds: usize,
) -> EngineResult<RunReport> {
    let mut passed = 0;
    let mut failed = 0;

    for round in 1..=rounds {
        info!(round, rounds, "Starting round");
        for gesture in gestures {
            let step = engine.perform(*gesture)?;
            if step.result.is_pass() {
                passed += 1;
            } else {
                failed += 1;
            }
        }
    }

    Ok(RunReport {
        task_id: engine.session().task_id,
        device: engine.device_id().to_string(),
        screen_width: engine.screen_width(),
        screen_height: engine.screen_height(),
        screenshot_dir: engine.session().dir.clone(),
        executed: engine.executed(),
        passed,
        failed,
        steps: engine.snapshot(),
    })
}
