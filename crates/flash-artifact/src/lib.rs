//! Flash Artifact
//!
//! The records a submission produces and the rules for changing them.
//!
//! # Core Concepts
//!
//! - [`Session`]: one prompt and its fixed, ordered set of artifacts
//! - [`Artifact`]: one generated component and its [`ArtifactStatus`]
//! - [`Transition`]: the only ways an artifact's status may change
//! - [`ComponentVariation`]: an ephemeral alternate design
//!
//! Every mutation on [`Artifact`] goes through the state machine in
//! [`state_machine`]; there is no way to set a status directly.

#![warn(unreachable_pub)]

mod artifact;
mod ids;
mod session;
pub mod state_machine;

pub use artifact::{Artifact, WriteOutcome};
pub use ids::{ArtifactId, SessionId};
pub use session::{ComponentVariation, Session};
pub use state_machine::{ArtifactStatus, Transition, TransitionError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
