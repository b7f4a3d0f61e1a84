pub mod client;
pub mod models;

pub use client::SuggestionClient;
pub use models::{ChatRequest, ChatResponse};
