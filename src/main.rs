//! Пакетный CLI генерации плана комментария

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::{info, LevelFilter};

use sportcast::config::SportcastConfig;
use sportcast::pipeline;
use sportcast::progress::{DefaultProgressReporter, ProgressInfo, ProgressObserver, ProgressReporter};
use sportcast::Sportcast;

/// Generate a synchronized, emotion-tagged commentary plan for sports match segments
#[derive(Parser, Debug)]
#[command(name = "sportcast", version, about)]
struct Args {
    /// Directory with segment videos (<name>.mp4)
    #[arg(long)]
    videos: PathBuf,

    /// Directory with event documents (<name>_event.json)
    #[arg(long)]
    events: PathBuf,

    /// Output directory for per-segment commentary JSON
    #[arg(long)]
    output: PathBuf,

    /// API key for text generation (falls back to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Match background forwarded to generation when a document carries none
    #[arg(long)]
    intro: Option<String>,
}

fn init_logger() {
    // Установка базового фильтра и переопределение через переменные окружения
    let env = Env::default().filter_or("RUST_LOG", "warn,sportcast=info");

    let mut builder = Builder::from_env(env);
    builder
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        // Форматирование логов
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}

/// Наблюдатель прогресса, пишущий обновления в лог
struct LogProgressObserver;

impl ProgressObserver for LogProgressObserver {
    fn on_progress_update(&self, progress: ProgressInfo) {
        match progress.details {
            Some(details) => info!(
                "[{:>3.0}%] {}: {}",
                progress.total_progress, progress.step, details
            ),
            None => info!("[{:>3.0}%] {}", progress.total_progress, progress.step),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let mut config = SportcastConfig::default();
    config.generation.api_key = args
        .api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_default();

    if config.generation.api_key.trim().is_empty() {
        bail!("an API key is required: pass --api-key or set OPENAI_API_KEY");
    }

    if let Some(intro) = args.intro {
        config.default_intro = intro;
    }

    let mut sportcast = Sportcast::new(config);
    let mut reporter = DefaultProgressReporter::new();
    reporter.add_observer(Box::new(LogProgressObserver));
    sportcast.set_progress_reporter(Box::new(reporter));

    let report = pipeline::run_batch(&sportcast, &args.videos, &args.events, &args.output).await?;

    info!(
        "done: {} commentary files, {} silent segments, {} failures",
        report.written.len(),
        report.empty,
        report.failed
    );

    Ok(())
}
