//! Content Store - Single Validated Source of Records
//!
//! CRITICAL: build MUST run the validator. No bypass.
//! A manifest that fails validation produces no store at all.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::content::{ContentManifest, Project, ProjectId, SiteContent};
use crate::fingerprint::content_fingerprint;
use crate::validation::{ValidationReport, Validator};
use crate::SCHEMA_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("manifest schema {manifest} is newer than supported schema {supported}")]
    SchemaVersionMismatch { manifest: String, supported: String },

    #[error("invalid schema version: {0}")]
    InvalidSchemaVersion(String),

    #[error("content validation failed: {0}")]
    ValidationFailed(ValidationReport),

    #[error("content conversion error: {0}")]
    Conversion(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The validated, immutable record collection. Built once at
/// initialization, read-only for the rest of the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStore {
    site: SiteContent,
    projects: Vec<Project>,
    schema_version: String,
    fingerprint: String,
    built_at: DateTime<Utc>,
}

impl ContentStore {
    /// Build the store from an authored manifest.
    ///
    /// ALWAYS validates. There is deliberately no empty-store fallback:
    /// silently rendering nothing would mask an authoring bug.
    pub fn build(manifest: &ContentManifest) -> Result<Self, ContentError> {
        check_schema_version(&manifest.schema_version)?;

        let report = Self::validate(manifest);
        if report.has_errors() {
            tracing::error!(%report, "content validation failed");
            return Err(ContentError::ValidationFailed(report));
        }
        for warning in report.warnings() {
            tracing::warn!(rule = %warning.rule, message = %warning.message, "content warning");
        }

        let projects = manifest
            .projects
            .iter()
            .map(Project::from_raw)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ContentError::Conversion)?;

        let fingerprint = content_fingerprint(&manifest.site, &projects)?;
        tracing::info!(records = projects.len(), %fingerprint, "content store built");

        Ok(Self {
            site: manifest.site.clone(),
            projects,
            schema_version: manifest.schema_version.clone(),
            fingerprint,
            built_at: Utc::now(),
        })
    }

    /// Read, parse, and build from a manifest file.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let json = fs::read_to_string(path)?;
        let manifest = ContentManifest::from_json(&json)?;
        Self::build(&manifest)
    }

    /// Validate without building.
    ///
    /// This is the ONLY validation entry point; `build` goes through it too.
    pub fn validate(manifest: &ContentManifest) -> ValidationReport {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        Validator::new().validate_manifest(manifest)
    }

    pub fn site(&self) -> &SiteContent {
        &self.site
    }

    /// Records in authored order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn featured(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| p.featured)
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Engine 1.x reads 0.x and 1.x manifests; a newer declared major means
/// the content was authored for an engine we are not.
fn check_schema_version(declared: &str) -> Result<(), ContentError> {
    let declared_version = semver::Version::parse(declared)
        .map_err(|e| ContentError::InvalidSchemaVersion(format!("{}: {}", declared, e)))?;
    let supported = semver::Version::parse(SCHEMA_VERSION)
        .map_err(|e| ContentError::InvalidSchemaVersion(format!("{}: {}", SCHEMA_VERSION, e)))?;

    if declared_version.major > supported.major {
        return Err(ContentError::SchemaVersionMismatch {
            manifest: declared.to_string(),
            supported: SCHEMA_VERSION.to_string(),
        });
    }

    Ok(())
}
