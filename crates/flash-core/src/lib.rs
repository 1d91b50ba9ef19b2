//! Flash Core - Streaming Generation Orchestrator
//!
//! Turns one prompt into several independently generated UI components:
//! - Creates a session of N placeholder artifacts
//! - Names a design direction for each slot in one call
//! - Streams every slot concurrently, each write keyed by artifact id
//! - Regenerates a focused artifact or explores variations of it
//!
//! # Example
//!
//! ```rust,ignore
//! use flash_core::{FlashConfig, Orchestrator};
//! use std::sync::Arc;
//!
//! # async fn example(provider: Arc<dyn flash_core::GenerationProvider>)
//! #     -> Result<(), flash_core::FlashError> {
//! let orchestrator = Orchestrator::new(FlashConfig::new(), provider)?;
//! let report = orchestrator.submit("a login form").await?;
//! println!("{} of {} artifacts complete", report.completed(), report.tasks.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod busy;
pub mod config;
pub mod error;
pub mod exploration;
pub mod export;
pub mod generation;
pub mod labels;
pub mod logging;
pub mod navigation;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
pub mod provider;
pub mod report;

pub use busy::{BusyFlag, BusyGuard};
pub use config::FlashConfig;
pub use error::FlashError;
pub use exploration::Exploration;
pub use export::{export_file_name, export_session, sanitize_label};
pub use generation::GenerationTask;
pub use labels::{fallback_labels, resolve_style_labels, StyleLabels};
pub use logging::{init_tracing, LogFormat};
pub use navigation::Cursor;
pub use normalize::normalize_markup;
pub use orchestrator::Orchestrator;
pub use provider::{GenerationProvider, GenerationRequest, ProviderError, TextStream};
pub use report::{ExplorationReport, SubmitReport, TaskOutcome, TaskReport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the orchestrator
    pub use crate::{
        FlashConfig, FlashError, GenerationProvider, GenerationRequest, Orchestrator,
        ProviderError, SubmitReport, TaskOutcome, TextStream,
    };
    pub use flash_artifact::{Artifact, ArtifactId, ArtifactStatus, Session, SessionId};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
