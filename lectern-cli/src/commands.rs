use std::path::PathBuf;

use clap::Subcommand;
use lectern_client::readiness::DEFAULT_POLL_INTERVAL;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize text, waiting out "accepted" answers.
    Summarize {
        #[command(flatten)]
        input: TextInputArgs,
    },
    /// Generate a quiz from text.
    Quiz {
        #[command(flatten)]
        input: TextInputArgs,
    },
    /// Fetch the transcript of a video.
    Transcript {
        url: String,
        /// Write a normalized copy of the transcript into this directory.
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    /// Store a lecture with its transcript and summary.
    SaveLecture {
        #[arg(long)]
        title: String,
        #[arg(long)]
        video_url: String,
        #[arg(long)]
        transcript_file: Option<PathBuf>,
        #[arg(long, default_value = "")]
        summary: String,
    },
    /// List saved lectures.
    Lectures,
    /// Show model loading status.
    Status {
        /// Keep polling until the models are ready.
        #[arg(long, short)]
        watch: bool,
        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
        interval: u64,
        /// Give up watching after this many seconds.
        #[arg(long)]
        wait_timeout: Option<u64>,
    },
    /// Check connectivity to the backend.
    Doctor,
}
