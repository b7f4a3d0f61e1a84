use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

use screenshot_renamer::settings::RenamerConfig;
use screenshot_renamer::utils::logger::init_logger;

/// Suggest a descriptive name for the newest screenshot and compress it
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Directory to search for screenshots (`~` is expanded)
    #[clap(short, long)]
    dir: Option<String>,

    /// Model identifier to ask for suggestions
    #[clap(short, long)]
    model: Option<String>,

    /// Chat-completion endpoint
    #[clap(long)]
    endpoint: Option<String>,

    /// Compressor executable
    #[clap(long)]
    compressor: Option<String>,

    /// Compression quality, 0-100
    #[clap(short, long)]
    quality: Option<u8>,

    /// Write logs to a timestamped file in this directory
    #[clap(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut RenamerConfig) {
        if let Some(dir) = self.dir {
            config.search_dir = dir;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(compressor) = self.compressor {
            config.compressor = compressor;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(log_dir) = self.log_dir {
            config.log_dir = Some(log_dir);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RenamerConfig::load()?;
    cli.apply(&mut config);
    config.validate()?;

    init_logger(config.log_dir.as_deref())?;
    debug!("Configuration: {:?}", config);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    screenshot_renamer::run(&config, &mut input, &mut output).await?;

    Ok(())
}
