use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, trace, warn};

use crate::utils::absolutize;

/// Filename convention a screenshot has to follow: `<prefix>*.<extension>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotPattern {
    pub prefix: String,
    pub extension: String,
}

impl ScreenshotPattern {
    pub fn new(prefix: &str, extension: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Case-sensitive match on the file name alone
    pub fn matches(&self, file_name: &str) -> bool {
        let suffix = format!(".{}", self.extension);
        file_name.len() >= self.prefix.len() + suffix.len()
            && file_name.starts_with(&self.prefix)
            && file_name.ends_with(&suffix)
    }
}

impl Default for ScreenshotPattern {
    fn default() -> Self {
        Self::new("SCR-", "png")
    }
}

/// Returns the absolute path of the most recently modified file in `dir` matching
/// `pattern`, or `None` when nothing matches or the directory cannot be listed.
///
/// Equal modification times resolve to whichever entry the directory listing
/// yields last.
pub fn find_latest_screenshot(dir: &Path, pattern: &ScreenshotPattern) -> Result<Option<PathBuf>> {
    debug!("Scanning {} for {}*.{}", dir.display(), pattern.prefix, pattern.extension);

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("Search directory {} does not exist", dir.display());
            return Ok(None);
        }
        // Unreadable or not a directory: nothing to find there
        Err(e) => {
            warn!("Cannot list {}: {}", dir.display(), e);
            return Ok(None);
        }
    };

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if !pattern.matches(file_name) {
            continue;
        }

        let path = entry.path();
        let modified = fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("Failed to read modification time of {}", path.display()))?;
        trace!("Candidate {} modified at {:?}", path.display(), modified);

        let is_newer = newest.as_ref().map_or(true, |(best, _)| modified >= *best);
        if is_newer {
            newest = Some((modified, path));
        }
    }

    match newest {
        Some((_, path)) => {
            let path = absolutize(&path)
                .with_context(|| format!("Failed to resolve absolute path for {}", path.display()))?;
            info!("Latest screenshot: {}", path.display());
            Ok(Some(path))
        }
        None => {
            info!("No screenshot matching {}*.{} in {}", pattern.prefix, pattern.extension, dir.display());
            Ok(None)
        }
    }
}
