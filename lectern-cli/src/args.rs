use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventsMode {
    None,
    Stderr,
}

#[derive(Debug, Args, Clone)]
pub struct ClientArgs {
    /// Backend base URL. Falls back to LECTERN_BASE_URL, then http://localhost:5000.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Per-attempt timeout in milliseconds.
    #[arg(long, default_value_t = 30000, global = true)]
    pub timeout: u64,
    #[arg(long, default_value_t = 4_194_304, global = true)]
    pub max_response_bytes: usize,
    #[arg(long, value_enum, default_value_t = EventsMode::None, global = true)]
    pub events: EventsMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JitterArg {
    None,
    Full,
}

#[derive(Debug, Args, Clone)]
pub struct RetryArgs {
    #[arg(long, global = true)]
    pub retry_max_attempts: Option<u32>,
    /// Milliseconds before the first retry when the server gives no hint.
    #[arg(long, global = true)]
    pub retry_base_delay: Option<u64>,
    /// Ceiling in milliseconds for any single wait.
    #[arg(long, global = true)]
    pub retry_max_delay: Option<u64>,
    #[arg(long, value_enum, default_value_t = JitterArg::None, global = true)]
    pub retry_jitter: JitterArg,
}

#[derive(Debug, Args, Clone)]
pub struct TextInputArgs {
    /// Text to send. Use --file to read it from disk instead.
    pub text: Option<String>,
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
    /// Ask the backend for mock output instead of running the model.
    #[arg(long)]
    pub mock: bool,
}
