/// Heartbeat Terminal Demo - Rotating, Beating Heart
///
/// Renders the procedural heart as shaded ASCII and makes it beat when clicked.
/// Controls:
///   - Left click on the heart: Beat
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use heartbeat_core::{FrameScheduler, HeartApp, HeartConfig};
use heartbeat_terminal::TerminalScheduler;
use nalgebra::Point3;
use std::fs::File;
use std::path::PathBuf;

/// Spin a low-poly heart in the terminal and click it to make it beat
#[derive(Parser, Debug)]
#[command(name = "heartbeat-terminal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Peak scale of a beat (must be greater than 1.0)
    #[arg(long, default_value_t = 1.05)]
    target_scale: f32,

    /// Rotation per frame in radians
    #[arg(long, default_value_t = 0.005, allow_negative_numbers = true)]
    rotation_step: f32,

    /// Target frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Distance from the camera to the heart
    #[arg(long, default_value_t = 30.0)]
    distance: f32,

    /// Hide the wireframe overlay
    #[arg(long)]
    no_wireframe: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> HeartConfig {
        let defaults = HeartConfig::default();
        HeartConfig {
            target_scale: self.target_scale,
            rotation_step: self.rotation_step,
            wireframe: !self.no_wireframe,
            camera_position: Point3::new(
                defaults.camera_position.x,
                defaults.camera_position.y,
                self.distance,
            ),
            far: defaults.far.max(self.distance * 2.0),
            ..defaults
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.verbose { "debug" } else { "warn" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter));
    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    println!("Heartbeat Terminal - Loading...");

    let app = HeartApp::new(cli.config()).context("failed to build the heart")?;
    let mut scheduler = TerminalScheduler::new(cli.fps).context("failed to query the terminal")?;
    scheduler.register_frame_callback(Box::new(app));

    println!("Starting terminal renderer (click the heart, press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    scheduler.run()?;

    println!("Thank you for watching the heart beat!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_heart_config() {
        let cli = Cli::parse_from(["heartbeat-terminal"]);
        let config = cli.config();
        assert_eq!(config.target_scale, 1.05);
        assert_eq!(config.rotation_step, 0.005);
        assert!(config.wireframe);
        assert_eq!(config.camera_position.z, 30.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "heartbeat-terminal",
            "--target-scale",
            "1.2",
            "--rotation-step",
            "-0.01",
            "--distance",
            "150",
            "--no-wireframe",
        ]);
        let config = cli.config();
        assert_eq!(config.target_scale, 1.2);
        assert_eq!(config.rotation_step, -0.01);
        assert!(!config.wireframe);
        assert_eq!(config.far, 300.0);
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        let cli = Cli::parse_from(["heartbeat-terminal", "--target-scale", "0.9"]);
        assert!(HeartApp::new(cli.config()).is_err());
    }
}
