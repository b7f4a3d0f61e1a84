use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Image bytes inlined as `data:<media type>;base64,<payload>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl(String);

impl DataUrl {
    /// Builds a data URL from raw bytes
    pub fn from_bytes(media_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", media_type, BASE64.encode(bytes)))
    }

    /// Reads the whole file and encodes it. Read failures are returned to the caller.
    pub fn from_file(path: &Path, media_type: &str) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        debug!("Encoding {} ({} bytes) as {}", path.display(), bytes.len(), media_type);
        Ok(Self::from_bytes(media_type, &bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
