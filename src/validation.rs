//! Validation System - Rule/Report Separation
//!
//! Rules produce structured violations. The report decides pass/fail:
//! any error-severity violation fails the whole manifest, so a broken
//! record can never reach the rendering layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

use crate::content::{ContentManifest, RawProject, IMAGE_EXTENSIONS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub rule: String,
    pub severity: Severity,
    /// Which record produced this, e.g. "projects[2] (id 3)".
    /// None for collection-level violations.
    pub record: Option<String>,
    pub field: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub record_count: usize,
    pub schema_version: String,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return write!(f, "{} record(s) valid", self.record_count);
        }
        let summary: Vec<String> = self
            .errors()
            .map(|v| match &v.record {
                Some(record) => format!("{}: {}: {}", record, v.field, v.message),
                None => format!("{}: {}", v.field, v.message),
            })
            .collect();
        write!(f, "{}", summary.join("; "))
    }
}

/// Per-field rule - checks one concern on one record.
/// Adding a record field means adding exactly one rule here.
pub trait FieldRule {
    fn name(&self) -> &'static str;
    fn check(&self, raw: &RawProject) -> Vec<Violation>;
}

/// Cross-record rule - checks an invariant over the whole collection.
pub trait CollectionRule {
    fn name(&self) -> &'static str;
    fn check(&self, records: &[RawProject]) -> Vec<Violation>;
}

// --- Field rules ---

pub struct IdRule;

impl FieldRule for IdRule {
    fn name(&self) -> &'static str {
        "id_positive"
    }

    fn check(&self, raw: &RawProject) -> Vec<Violation> {
        if raw.id >= 1 && raw.id <= i64::from(u32::MAX) {
            return vec![];
        }
        vec![Violation {
            rule: self.name().to_string(),
            severity: Severity::Error,
            record: None,
            field: "id".to_string(),
            message: "id must be a positive integer".to_string(),
            expected: Some("1 or greater".to_string()),
            actual: Some(raw.id.to_string()),
            remediation: vec!["Assign a unique positive integer id".to_string()],
        }]
    }
}

pub struct TitleRule;

impl FieldRule for TitleRule {
    fn name(&self) -> &'static str {
        "title_bounds"
    }

    fn check(&self, raw: &RawProject) -> Vec<Violation> {
        let length = raw.title.chars().count();
        if length == 0 {
            return vec![Violation {
                rule: self.name().to_string(),
                severity: Severity::Error,
                record: None,
                field: "title".to_string(),
                message: "title must not be empty".to_string(),
                expected: Some("1-100 characters".to_string()),
                actual: Some("empty".to_string()),
                remediation: vec!["Give the project a title".to_string()],
            }];
        }
        if length > 100 {
            return vec![Violation {
                rule: self.name().to_string(),
                severity: Severity::Error,
                record: None,
                field: "title".to_string(),
                message: "title must be 100 characters or less".to_string(),
                expected: Some("1-100 characters".to_string()),
                actual: Some(format!("{} characters", length)),
                remediation: vec!["Shorten the title".to_string()],
            }];
        }
        vec![]
    }
}

pub struct DescriptionRule;

impl FieldRule for DescriptionRule {
    fn name(&self) -> &'static str {
        "description_length"
    }

    fn check(&self, raw: &RawProject) -> Vec<Violation> {
        let length = raw.description.chars().count();
        if length >= 10 {
            return vec![];
        }
        vec![Violation {
            rule: self.name().to_string(),
            severity: Severity::Error,
            record: None,
            field: "description".to_string(),
            message: "description must be at least 10 characters".to_string(),
            expected: Some("10 characters minimum".to_string()),
            actual: Some(format!("{} characters", length)),
            remediation: vec!["Describe what the project does".to_string()],
        }]
    }
}

pub struct ImagePathRule;

impl FieldRule for ImagePathRule {
    fn name(&self) -> &'static str {
        "image_path"
    }

    fn check(&self, raw: &RawProject) -> Vec<Violation> {
        let mut violations = vec![];

        if !raw.image.starts_with('/') {
            violations.push(Violation {
                rule: self.name().to_string(),
                severity: Severity::Error,
                record: None,
                field: "image".to_string(),
                message: "image path must be absolute".to_string(),
                expected: Some("path starting with /".to_string()),
                actual: Some(raw.image.clone()),
                remediation: vec!["Use a path rooted at the public directory".to_string()],
            });
        }

        let extension = raw
            .image
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let recognized = extension
            .as_deref()
            .map_or(false, |ext| IMAGE_EXTENSIONS.contains(&ext));
        if !recognized {
            violations.push(Violation {
                rule: self.name().to_string(),
                severity: Severity::Error,
                record: None,
                field: "image".to_string(),
                message: "image must have a recognized extension".to_string(),
                expected: Some(format!(".{}", IMAGE_EXTENSIONS.join(", ."))),
                actual: Some(raw.image.clone()),
                remediation: vec!["Export the image as jpg, jpeg, png, or webp".to_string()],
            });
        }

        violations
    }
}

pub struct TagsRule;

impl FieldRule for TagsRule {
    fn name(&self) -> &'static str {
        "tag_bounds"
    }

    fn check(&self, raw: &RawProject) -> Vec<Violation> {
        let mut violations = vec![];

        if raw.tags.is_empty() {
            violations.push(Violation {
                rule: self.name().to_string(),
                severity: Severity::Error,
                record: None,
                field: "tags".to_string(),
                message: "at least one tag is required".to_string(),
                expected: Some("1-10 tags".to_string()),
                actual: Some("0 tags".to_string()),
                remediation: vec!["Tag the project with its stack".to_string()],
            });
        }
        if raw.tags.len() > 10 {
            violations.push(Violation {
                rule: self.name().to_string(),
                severity: Severity::Error,
                record: None,
                field: "tags".to_string(),
                message: "maximum 10 tags allowed".to_string(),
                expected: Some("1-10 tags".to_string()),
                actual: Some(format!("{} tags", raw.tags.len())),
                remediation: vec!["Keep the most relevant tags".to_string()],
            });
        }
        for (index, tag) in raw.tags.iter().enumerate() {
            if tag.is_empty() {
                violations.push(Violation {
                    rule: self.name().to_string(),
                    severity: Severity::Error,
                    record: None,
                    field: format!("tags[{}]", index),
                    message: "tag must not be empty".to_string(),
                    expected: Some("non-empty string".to_string()),
                    actual: Some("empty".to_string()),
                    remediation: vec!["Remove or fill the empty tag".to_string()],
                });
            }
        }

        violations
    }
}

pub struct LinkRule;

impl FieldRule for LinkRule {
    fn name(&self) -> &'static str {
        "link_format"
    }

    fn check(&self, raw: &RawProject) -> Vec<Violation> {
        let mut violations = vec![];
        for (field, link) in [("github", &raw.github), ("demo", &raw.demo)] {
            let Some(link) = link else { continue };
            if let Err(e) = Url::parse(link) {
                violations.push(Violation {
                    rule: self.name().to_string(),
                    severity: Severity::Error,
                    record: None,
                    field: field.to_string(),
                    message: format!("{} must be a well-formed URL", field),
                    expected: Some("absolute URL".to_string()),
                    actual: Some(format!("{} ({})", link, e)),
                    remediation: vec!["Use a full URL including the scheme".to_string()],
                });
            }
        }
        violations
    }
}

// --- Collection rules ---

pub struct NonEmptyCollectionRule;

impl CollectionRule for NonEmptyCollectionRule {
    fn name(&self) -> &'static str {
        "collection_non_empty"
    }

    fn check(&self, records: &[RawProject]) -> Vec<Violation> {
        if !records.is_empty() {
            return vec![];
        }
        vec![Violation {
            rule: self.name().to_string(),
            severity: Severity::Error,
            record: None,
            field: "projects".to_string(),
            message: "at least one project is required".to_string(),
            expected: Some("1 or more records".to_string()),
            actual: Some("0 records".to_string()),
            remediation: vec!["Author at least one project record".to_string()],
        }]
    }
}

pub struct UniqueIdRule;

impl CollectionRule for UniqueIdRule {
    fn name(&self) -> &'static str {
        "unique_ids"
    }

    fn check(&self, records: &[RawProject]) -> Vec<Violation> {
        let mut seen: BTreeMap<i64, usize> = BTreeMap::new();
        for record in records {
            *seen.entry(record.id).or_default() += 1;
        }
        seen.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, count)| Violation {
                rule: self.name().to_string(),
                severity: Severity::Error,
                record: None,
                field: "id".to_string(),
                message: format!("duplicate id {}", id),
                expected: Some("unique id per record".to_string()),
                actual: Some(format!("id {} used {} times", id, count)),
                remediation: vec!["Renumber the colliding records".to_string()],
            })
            .collect()
    }
}

/// Advisory only: a collection with nothing featured renders an empty
/// showcase section, which is almost always an authoring slip.
pub struct FeaturedCountRule;

impl CollectionRule for FeaturedCountRule {
    fn name(&self) -> &'static str {
        "featured_count"
    }

    fn check(&self, records: &[RawProject]) -> Vec<Violation> {
        if records.is_empty() || records.iter().any(|r| r.featured) {
            return vec![];
        }
        vec![Violation {
            rule: self.name().to_string(),
            severity: Severity::Warning,
            record: None,
            field: "featured".to_string(),
            message: "no project is marked featured".to_string(),
            expected: Some("at least one featured record".to_string()),
            actual: Some("0 featured".to_string()),
            remediation: vec!["Mark the projects to showcase as featured".to_string()],
        }]
    }
}

/// Validator orchestrates field and collection rules
pub struct Validator {
    field_rules: Vec<Box<dyn FieldRule>>,
    collection_rules: Vec<Box<dyn CollectionRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            field_rules: vec![
                Box::new(IdRule),
                Box::new(TitleRule),
                Box::new(DescriptionRule),
                Box::new(ImagePathRule),
                Box::new(TagsRule),
                Box::new(LinkRule),
            ],
            collection_rules: vec![
                Box::new(NonEmptyCollectionRule),
                Box::new(UniqueIdRule),
                Box::new(FeaturedCountRule),
            ],
        }
    }

    /// All violations for a single record, not just the first.
    pub fn validate_record(&self, raw: &RawProject) -> Vec<Violation> {
        self.field_rules
            .iter()
            .flat_map(|rule| rule.check(raw))
            .collect()
    }

    /// Record violations (labeled with their position) plus the
    /// cross-record invariants.
    pub fn validate_collection(&self, records: &[RawProject]) -> Vec<Violation> {
        let mut violations = vec![];

        for (index, raw) in records.iter().enumerate() {
            let label = format!("projects[{}] (id {})", index, raw.id);
            for mut violation in self.validate_record(raw) {
                violation.record = Some(label.clone());
                violations.push(violation);
            }
        }

        for rule in &self.collection_rules {
            violations.extend(rule.check(records));
        }

        violations
    }

    pub fn validate_manifest(&self, manifest: &ContentManifest) -> ValidationReport {
        let violations = self.validate_collection(&manifest.projects);
        let valid = !violations.iter().any(|v| v.severity == Severity::Error);
        ValidationReport {
            valid,
            violations,
            record_count: manifest.projects.len(),
            schema_version: manifest.schema_version.clone(),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
