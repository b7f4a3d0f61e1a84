use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::compressor::{CompressionOutcome, Compressor};
use crate::encoder::DataUrl;
use crate::locator::{find_latest_screenshot, ScreenshotPattern};
use crate::parser::extract_candidates;
use crate::selector::prompt_selection;
use crate::settings::RenamerConfig;
use crate::suggestion::SuggestionClient;

/// What one run of the pipeline did
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Screenshot sent to the model, if one was found
    pub screenshot: Option<PathBuf>,
    /// Candidates the model suggested
    pub candidates: Option<Vec<String>>,
    /// Filename the user settled on
    pub selected: Option<String>,
    pub compression: CompressionOutcome,
}

/// Runs locate, suggest, select and compress once, reading the choice from `input`
/// and printing to `output`.
pub async fn run<R, W>(config: &RenamerConfig, input: &mut R, output: &mut W) -> Result<PipelineOutcome>
where
    R: BufRead,
    W: Write,
{
    let search_dir = config.search_path();
    let pattern = ScreenshotPattern::new(&config.file_prefix, &config.file_extension);

    // Find the newest screenshot
    let screenshot = find_latest_screenshot(&search_dir, &pattern)?;
    if screenshot.is_none() {
        warn!("No screenshot found in {}", search_dir.display());
        writeln!(
            output,
            "No screenshot matching {}*.{} found in {}",
            pattern.prefix,
            pattern.extension,
            search_dir.display()
        )?;
    }

    // Encode it and ask the model for names
    let image = screenshot
        .as_deref()
        .map(|path| DataUrl::from_file(path, &config.media_type))
        .transpose()?;

    let client = SuggestionClient::from_config(config);
    let response = client.request_suggestions(image.as_ref()).await?;

    let candidates = extract_candidates(response.as_ref());
    if response.is_some() && candidates.is_none() {
        writeln!(output, "Could not read filename suggestions from the model reply.")?;
    }

    // Let the user pick or type a name
    let selected = prompt_selection(candidates.as_deref(), input, output)?.map(|s| s.into_filename());
    writeln!(output, "Selected filename: {}", selected.as_deref().unwrap_or("none"))?;

    // The directory is scanned again right before compressing
    let source = find_latest_screenshot(&search_dir, &pattern)?;
    if source != screenshot {
        info!("Latest screenshot changed while choosing a name");
    }

    let compressor = Compressor::from_config(config);
    let compression = compressor
        .compress(source.as_deref(), selected.as_deref(), output)
        .await?;

    Ok(PipelineOutcome {
        screenshot,
        candidates,
        selected,
        compression,
    })
}
