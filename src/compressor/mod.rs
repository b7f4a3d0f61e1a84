use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::settings::RenamerConfig;
use crate::utils::group_thousands;

/// Sizes before and after compression
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionReport {
    pub output_path: PathBuf,
    pub input_size: u64,
    pub output_size: u64,
}

impl CompressionReport {
    /// Percentage reduction, `(1 - output/input) * 100`. Zero for an empty input.
    pub fn ratio(&self) -> f64 {
        if self.input_size == 0 {
            return 0.0;
        }
        (1.0 - self.output_size as f64 / self.input_size as f64) * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompressionOutcome {
    /// Source or target name missing
    Skipped,
    /// Compressor could not be started or exited non-zero
    Failed(String),
    Compressed(CompressionReport),
}

/// Runs an external image compressor as `<tool> -q <quality> <input> -o <output>`
#[derive(Debug, Clone)]
pub struct Compressor {
    pub tool: String,
    pub quality: u8,
    pub extension: String,
}

impl Compressor {
    pub fn new(tool: &str, quality: u8, extension: &str) -> Self {
        Self {
            tool: tool.to_string(),
            quality,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn from_config(config: &RenamerConfig) -> Self {
        Self::new(&config.compressor, config.quality, &config.output_extension)
    }

    /// `<source dir>/<name>.<extension>`
    pub fn output_path(&self, source: &Path, name: &str) -> PathBuf {
        let dir = source.parent().unwrap_or_else(|| Path::new(""));
        dir.join(format!("{}.{}", name, self.extension))
    }

    /// Compresses `source` into a sibling file called `name` and prints the statistics.
    ///
    /// Compressor failures are printed and reported as [`CompressionOutcome::Failed`];
    /// only errors reading file sizes or writing to `out` are returned as `Err`.
    pub async fn compress<W: Write>(
        &self,
        source: Option<&Path>,
        name: Option<&str>,
        out: &mut W,
    ) -> Result<CompressionOutcome> {
        let (Some(source), Some(name)) = (source, name) else {
            debug!("Nothing to compress");
            return Ok(CompressionOutcome::Skipped);
        };

        // Output lands next to the source
        let output_path = self.output_path(source, name);
        let input_size = fs::metadata(source)
            .with_context(|| format!("Failed to read size of {}", source.display()))?
            .len();

        info!(
            "Running {} -q {} {} -o {}",
            self.tool,
            self.quality,
            source.display(),
            output_path.display()
        );
        // Arguments are passed as-is, no shell involved
        let result = Command::new(&self.tool)
            .arg("-q")
            .arg(self.quality.to_string())
            .arg(source)
            .arg("-o")
            .arg(&output_path)
            .output()
            .await;

        // Non-zero exit or a missing binary both count as a failed conversion
        let failure = match result {
            Ok(output) if output.status.success() => None,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Some(format!("{} exited with {}: {}", self.tool, output.status, stderr.trim()))
            }
            Err(e) => Some(format!("failed to run {}: {}", self.tool, e)),
        };
        if let Some(message) = failure {
            error!("Image conversion failed: {}", message);
            writeln!(out, "Error converting image: {}", message)?;
            return Ok(CompressionOutcome::Failed(message));
        }

        // Read output size and report the ratio
        let output_size = fs::metadata(&output_path)
            .with_context(|| format!("Failed to read size of {}", output_path.display()))?
            .len();
        let report = CompressionReport {
            output_path,
            input_size,
            output_size,
        };

        writeln!(out, "Successfully converted to: {}", report.output_path.display())?;
        writeln!(out, "Input size: {} bytes", group_thousands(report.input_size))?;
        writeln!(out, "Output size: {} bytes", group_thousands(report.output_size))?;
        writeln!(out, "Compression ratio: {:.1}%", report.ratio())?;
        info!("Compressed {} to {} ({:.1}%)", source.display(), report.output_path.display(), report.ratio());

        Ok(CompressionOutcome::Compressed(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_output_path() {
        let compressor = Compressor::new("cwebp", 80, "webp");
        assert_eq!(
            compressor.output_path(Path::new("/home/me/Downloads/SCR-1.png"), "login-page"),
            PathBuf::from("/home/me/Downloads/login-page.webp")
        );
    }

    #[test]
    fn test_ratio() {
        let report = CompressionReport {
            output_path: PathBuf::from("x.webp"),
            input_size: 2000,
            output_size: 500,
        };
        assert!((report.ratio() - 75.0).abs() < 1e-9);

        let empty = CompressionReport { input_size: 0, ..report };
        assert_eq!(empty.ratio(), 0.0);
    }

    #[tokio::test]
    async fn test_skips_without_inputs() {
        let compressor = Compressor::new("cwebp", 80, "webp");
        let mut out = Vec::new();
        let outcome = compressor.compress(None, Some("name"), &mut out).await.unwrap();
        assert_eq!(outcome, CompressionOutcome::Skipped);
        let outcome = compressor
            .compress(Some(Path::new("/tmp/SCR-1.png")), None, &mut out)
            .await
            .unwrap();
        assert_eq!(outcome, CompressionOutcome::Skipped);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_missing_tool_fails_gracefully() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("SCR-1.png");
        fs::write(&source, b"png").unwrap();

        let compressor = Compressor::new("definitely-not-a-real-compressor-binary", 80, "webp");
        let mut out = Vec::new();
        let outcome = compressor.compress(Some(&source), Some("name"), &mut out).await.unwrap();
        assert!(matches!(outcome, CompressionOutcome::Failed(_)));
        assert!(String::from_utf8(out).unwrap().starts_with("Error converting image:"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_fails_gracefully() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("SCR-1.png");
        fs::write(&source, b"png").unwrap();

        let compressor = Compressor::new("false", 80, "webp");
        let mut out = Vec::new();
        let outcome = compressor.compress(Some(&source), Some("name"), &mut out).await.unwrap();
        assert!(matches!(outcome, CompressionOutcome::Failed(_)));
        assert!(!dir.path().join("name.webp").exists());
    }
}
