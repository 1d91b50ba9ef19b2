//! Flash Gemini - Gemini generation provider
//!
//! Implements [`flash_core::GenerationProvider`] over the Gemini
//! `generateContent` and `streamGenerateContent` endpoints. Streamed responses
//! arrive as server-sent events; each frame's candidate text becomes one
//! fragment.

#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod payload;
pub mod sse;

pub use client::{text_fragments, GeminiProvider};
pub use config::{GeminiConfig, API_KEY_VARS, DEFAULT_BASE_URL};
pub use sse::SseDecoder;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
