use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cornerscan::{image_dimensions, CornerDetector, DetectError, DetectOptions, DetectorConfig};
use dotenv::dotenv;
use log::{error, info, warn};

/// Print the corners of the largest quadrilateral in an image as JSON.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Image to analyse
    path: PathBuf,

    /// Analyse a downscaled copy and scale the corners back up
    #[arg(long)]
    resize: bool,

    /// Show the detected quadrilateral and wait for a key press
    #[arg(long)]
    view: bool,

    /// Allow --view without --resize
    #[arg(long)]
    view_unscaled: bool,

    /// Print the corners keyed by position instead of in vertex order
    #[arg(long)]
    corners: bool,
}

fn run(args: &Args) -> Result<String, DetectError> {
    let detector = CornerDetector::new(DetectorConfig::from_env()?)?;

    match image_dimensions(&args.path) {
        Ok((width, height)) => info!("Processing {} ({}x{})", args.path.display(), width, height),
        Err(e) => warn!("Could not probe {}: {}", args.path.display(), e),
    }

    let options = DetectOptions::new(args.resize, args.view).with_view_unscaled(args.view_unscaled);
    if !args.corners {
        return detector.detect(&args.path, options);
    }

    let points = detector.detect_points(&args.path, options)?;
    let corners = points.corners().ok_or(DetectError::NoQuadrilateral)?;
    Ok(serde_json::to_string(&corners)?)
}

fn main() -> ExitCode {
    // Initialize the logger
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}: {}", args.path.display(), e);
            ExitCode::FAILURE
        }
    }
}
