//! Names the newest screenshot in a folder with help from a multimodal model and
//! compresses it under the chosen name.

pub mod compressor;
pub mod encoder;
pub mod locator;
pub mod parser;
pub mod pipeline;
pub mod selector;
pub mod settings;
pub mod suggestion;
pub mod utils;

pub use pipeline::{run, PipelineOutcome};
pub use settings::RenamerConfig;
