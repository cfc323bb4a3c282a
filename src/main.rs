use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use monkey_runner::config;
use monkey_runner::{
    AdbDevice, AdbDeviceConfig, DeviceDriver, Engine, EngineConfig, Gesture, MockDevice,
    RunReport, Session, run_gestures,
};

/// Monkey Runner - gesture-driven UI exploration for mobile devices
#[derive(Parser, Debug)]
#[command(
    name = "monkey-runner",
    about = "Drive swipe/tap exploration against a device and report the recent steps",
    after_help = "ENVIRONMENT VARIABLES:\n\
        MONKEY_RESULT_DIR         Base directory for run results\n\
        MONKEY_HISTORY_CAPACITY   Number of steps kept in memory\n\
        MONKEY_MAX_SCREENSHOTS    Number of rotated screenshot names\n\
        MONKEY_SWIPE_PERCENT      Default swipe percent (2-10)\n\
        MONKEY_SWIPE_PAUSE_MS     Pause between press and move (ms)\n\
        MONKEY_ADB_PATH           adb executable\n\
        MONKEY_DEVICE_SERIAL      Device serial for adb -s"
)]
struct Args {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceKind {
    /// Android device through adb
    Adb,
    /// In-memory device (dry run)
    Mock,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Perform a list of gestures, capturing a screenshot before each
    Run {
        /// Comma-separated gestures (e.g., "up,down,left,right,tap:100:200,home,back")
        #[arg(short, long)]
        actions: String,

        /// Number of times to play the gesture list
        #[arg(short, long, default_value = "1")]
        rounds: usize,

        /// Device driver to use
        #[arg(long, value_enum, default_value = "adb")]
        device: DeviceKind,

        /// Device serial (adb only)
        #[arg(long, env = "MONKEY_DEVICE_SERIAL")]
        serial: Option<String>,

        /// Screen width for the mock device
        #[arg(long, default_value = "1080")]
        width: u32,

        /// Screen height for the mock device
        #[arg(long, default_value = "1920")]
        height: u32,

        /// Task identifier used in the screenshot directory
        #[arg(long, default_value = "1")]
        task_id: u32,

        /// Write screenshots directly into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Engine overrides. Unset flags keep the values from `config::get()`,
/// where unparseable environment values have already fallen back to defaults.
#[derive(ClapArgs, Debug)]
struct EngineArgs {
    /// Steps kept in the history
    #[arg(long)]
    capacity: Option<usize>,

    /// Number of rotated screenshot names
    #[arg(long)]
    max_screenshots: Option<usize>,

    /// Swipe percent (2-10)
    #[arg(long)]
    percent: Option<u32>,

    /// Pause between press and move in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,
}

impl EngineArgs {
    fn apply(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(capacity) = self.capacity {
            config = config.history_capacity(capacity);
        }
        if let Some(max) = self.max_screenshots {
            config = config.max_screenshots(max);
        }
        if let Some(percent) = self.percent {
            config = config.swipe_percent(percent);
        }
        if let Some(ms) = self.pause_ms {
            config = config.swipe_pause(Duration::from_millis(ms));
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Some(Commands::Run {
            actions,
            rounds,
            device,
            serial,
            width,
            height,
            task_id,
            output,
            engine,
            json,
        }) => {
            let gestures = parse_actions(&actions)?;
            let engine_config = engine.apply(EngineConfig::default());

            let session = match output {
                Some(dir) => Session::in_dir(dir, task_id),
                None => Session::for_task(config::result_dir(), task_id),
            };

            let driver: Box<dyn DeviceDriver> = match device {
                DeviceKind::Adb => {
                    let mut adb_config = AdbDeviceConfig::default();
                    if let Some(serial) = serial {
                        adb_config = adb_config.serial(serial);
                    }
                    Box::new(AdbDevice::new(adb_config))
                }
                DeviceKind::Mock => Box::new(MockDevice::new(width, height)),
            };

            let mut engine = Engine::new(driver, session, engine_config)
                .context("Failed to start exploration session")?;
            let report = run_gestures(&mut engine, &gestures, rounds)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        None => {
            println!("Monkey Runner - gesture-driven UI exploration for mobile devices");
            println!();
            println!("Usage: monkey-runner run --actions <GESTURES>");
            println!();
            println!("Gestures: up, down, left, right, tap:X:Y, home, back");
            println!();
            println!("Run with --help for more information.");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_actions(actions: &str) -> Result<Vec<Gesture>> {
    let gestures = actions
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Gesture>())
        .collect::<Result<Vec<_>, _>>()?;
    anyhow::ensure!(!gestures.is_empty(), "No gestures given in --actions");
    Ok(gestures)
}

fn print_report(report: &RunReport) {
    println!(
        "Run completed on {} ({}x{}): {} gestures, {} passed, {} failed",
        report.device,
        report.screen_width,
        report.screen_height,
        report.executed,
        report.passed,
        report.failed
    );
    println!("Last {} steps:", report.steps.len());
    for step in &report.steps {
        let coords = match (step.x, step.y) {
            (Some(x), Some(y)) => format!(" at ({}, {})", x, y),
            _ => String::new(),
        };
        let screenshot = step.screenshot_name.as_deref().unwrap_or("-");
        match step.result.reason() {
            Some(reason) => println!(
                "  #{} {}{} [{}] fail: {}",
                step.sequence, step.action, coords, screenshot, reason
            ),
            None => println!(
                "  #{} {}{} [{}] pass",
                step.sequence, step.action, coords, screenshot
            ),
        }
    }
    println!("\nScreenshots: {}", report.screenshot_dir.display());
}
