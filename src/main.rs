use clap::Parser;
use linewatch_core::LineSegment;
use linewatch_cv::VideoInput;
use std::path::PathBuf;

mod app;
mod config;
mod logging;

use app::RunOptions;
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(
    name = "linewatch",
    about = "Report whether vehicles are crossing a line drawn on a video"
)]
struct Args {
    /// Video file, stream URL or camera index
    source: VideoInput,
    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// ONNX detection model, overriding the configuration
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,
    /// Line of interest in frame pixels, skipping interactive selection
    #[arg(long, value_name = "X1,Y1,X2,Y2", allow_hyphen_values = true)]
    line: Option<LineSegment>,
    /// Run without any window; requires a line
    #[arg(long)]
    headless: bool,
    /// Status polling interval in milliseconds
    #[arg(long, value_name = "MS")]
    poll_ms: Option<u64>,
    /// Write the session summary as JSON when tracking ends
    #[arg(long, value_name = "PATH")]
    summary_json: Option<PathBuf>,
    /// Directory of the log file, overriding the configuration
    #[arg(long, value_name = "DIR", conflicts_with = "no_log_file")]
    log_dir: Option<PathBuf>,
    /// Log to the console only
    #[arg(long)]
    no_log_file: bool,
}

impl Args {
    fn app_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(model) = &self.model {
            config.detector.model_path = model.clone();
        }
        if let Some(line) = self.line {
            config.line = Some(line);
        }
        if let Some(poll_ms) = self.poll_ms {
            config.status_poll_interval_ms = poll_ms;
        }
        if let Some(dir) = &self.log_dir {
            config.log.dir = Some(dir.clone());
        }
        if self.no_log_file {
            config.log.dir = None;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.app_config()?;
    let _log_guard = logging::init(&config.log)?;

    app::run(RunOptions {
        source: args.source,
        config,
        headless: args.headless,
        summary_json: args.summary_json,
    })
}
