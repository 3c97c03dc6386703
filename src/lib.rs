//! Portfolio Core - Content Validation & Submission Engine
//!
//! # The Contract (Non-Negotiable)
//! 1. Content Is Validated Before It Renders
//! 2. Validation Failure Is Total
//! 3. The Store Is Immutable
//! 4. One Submission In Flight At A Time
//! 5. Failed Submissions Keep The Draft

pub mod content;
pub mod fingerprint;
pub mod store;
pub mod submission;
pub mod validation;

pub use content::{ContentManifest, Project, ProjectId, RawProject, SiteContent};
pub use fingerprint::{canonical_json, content_fingerprint, sha256_hex};
pub use store::{ContentError, ContentStore};
pub use submission::{
    ContactMessage, Draft, MessageSink, SubmissionController, SubmissionError, SubmissionState,
};
pub use validation::{Severity, ValidationReport, Validator, Violation};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Content schema the engine understands. Manifests declaring a newer
/// major are refused at store construction.
pub const SCHEMA_VERSION: &str = "1.0.0";
