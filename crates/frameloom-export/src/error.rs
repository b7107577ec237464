// crates/frameloom-export/src/error.rs
//
// Export-domain error taxonomy.
//
// Two tiers:
//   Domain errors   — Capability, Concurrency, SourceFetch, SeekTimeout, and
//                     Phase itself. These cross phase boundaries unchanged.
//   Carrier errors  — Invalid, Render, Decode, Container. Plain payloads for
//                     failures that have no export-level meaning on their own;
//                     the session wraps them in Phase with the phase name
//                     before they reach the caller.
//
// Every error path runs the session's restoration routine before surfacing;
// no artifact exists on failure.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use frameloom_core::Phase;

#[derive(Debug, Error)]
pub enum ExportError {
    /// The host is missing a required encoding primitive. Raised before any
    /// editor state is touched.
    #[error("missing encoder capabilities: {}", missing.join(", "))]
    Capability { missing: Vec<String> },

    /// Another export session is already active for this editor. Raised
    /// before any editor state is touched; the running export is unaffected.
    #[error("an export session is already active")]
    Concurrency,

    /// A failure inside a named phase.
    #[error("{phase} phase failed: {source}")]
    Phase {
        phase: Phase,
        #[source]
        source: Box<ExportError>,
    },

    /// Network/filesystem failure retrieving a media asset.
    #[error("could not fetch media for source {source_id}: {reason}")]
    SourceFetch { source_id: Uuid, reason: String },

    /// A video source's frame-ready signal never arrived within the bound.
    #[error("video source {source_id} not ready after {waited:?}")]
    SeekTimeout { source_id: Uuid, waited: Duration },

    /// Invalid session input (empty timeline, bad dimensions).
    #[error("invalid export request: {0}")]
    Invalid(String),

    /// Renderer draw or pixel-extraction failure.
    #[error("render failed: {0}")]
    Render(String),

    /// Media decode failure (audio bytes → samples).
    #[error("decode failed: {0}")]
    Decode(String),

    /// Container writer / encoder failure.
    #[error("container error: {0}")]
    Container(String),
}

impl ExportError {
    /// True for errors the phase ladder propagates unchanged.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            ExportError::Capability { .. }
                | ExportError::Concurrency
                | ExportError::Phase { .. }
                | ExportError::SourceFetch { .. }
                | ExportError::SeekTimeout { .. }
        )
    }

    /// Domain errors pass through; carrier errors get tagged with the phase
    /// they escaped from.
    pub fn into_phase(self, phase: Phase) -> ExportError {
        if self.is_domain() {
            self
        } else {
            ExportError::Phase { phase, source: Box::new(self) }
        }
    }
}
