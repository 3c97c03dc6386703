//! Content Model - Records, Site Copy, Manifest
//!
//! The manifest is the authored input: site copy plus raw project records.
//! Nothing here is trusted until the validator has passed it.

use serde::{Deserialize, Serialize};
use url::Url;

pub type ProjectId = u32;

/// File extensions accepted for record image paths.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Site-wide copy, injected through the manifest rather than read from
/// ambient globals so initialization failures stay testable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub name: String,
    pub title: String,
    pub description: String,
    pub contact_email: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A project record as authored. Shape-checked by serde, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProject {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub demo: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// A validated project record. Links arrive parsed; the id fits the
/// collection's positive-integer contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub image: String,
    pub tags: Vec<String>,
    #[serde(default)]
    pub github: Option<Url>,
    #[serde(default)]
    pub demo: Option<Url>,
    pub featured: bool,
}

impl Project {
    /// Convert a raw record. Callers must have run the validator first;
    /// a raw record that fails conversion here is a validator gap.
    pub(crate) fn from_raw(raw: &RawProject) -> Result<Self, String> {
        let id = ProjectId::try_from(raw.id)
            .map_err(|_| format!("id {} does not fit a record id", raw.id))?;

        Ok(Self {
            id,
            title: raw.title.clone(),
            description: raw.description.clone(),
            image: raw.image.clone(),
            tags: raw.tags.clone(),
            github: parse_link(raw.github.as_deref(), "github")?,
            demo: parse_link(raw.demo.as_deref(), "demo")?,
            featured: raw.featured,
        })
    }
}

fn parse_link(link: Option<&str>, field: &str) -> Result<Option<Url>, String> {
    match link {
        Some(raw) => Url::parse(raw)
            .map(Some)
            .map_err(|e| format!("{}: {}", field, e)),
        None => Ok(None),
    }
}

/// The authored content manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub site: SiteContent,
    #[serde(default)]
    pub projects: Vec<RawProject>,
}

fn default_schema_version() -> String {
    crate::SCHEMA_VERSION.to_string()
}

impl ContentManifest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
