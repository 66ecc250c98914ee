//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "visionpulse")]
#[command(about = "VisionPulse - durable review sessions for object detection")]
#[command(version)]
pub struct Cli {
    /// Base URL of the VisionPulse inference API
    #[arg(
        long,
        env = "VISIONPULSE_API_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    pub api_url: String,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload images, run detection, and add them to the cached session
    Upload {
        /// Image files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the cached session and its review progress
    Show,

    /// Mark a detected box as correct (or incorrect with --incorrect)
    Verify {
        /// Image id, or its position in the session (0-based)
        image: String,

        /// Index of the box within the image
        #[arg(long = "box")]
        box_index: usize,

        /// Mark the box as a wrong detection instead
        #[arg(long)]
        incorrect: bool,
    },

    /// Submit reviewed boxes to the backend and print its true metrics
    Validate,

    /// Clear the cached session from every storage tier
    Reset,
}
