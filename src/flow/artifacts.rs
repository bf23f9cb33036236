//! Records produced by stages and carried in [`FlowState`](super::FlowState).

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::collaborators::ScanType;

/// One API found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiscoveredItem {
    /// Display name (e.g., "Auth API").
    pub name: String,

    /// Version string as advertised (e.g., "2.0").
    pub version: String,

    /// API style (e.g., "REST", "GraphQL").
    pub kind: String,

    /// Where the API answered, when it was found by probing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl DiscoveredItem {
    /// Create an item without a base URL.
    pub fn new(name: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            kind: kind.into(),
            base_url: None,
        }
    }

    /// Attach the URL the item was reached at.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Severity of a security finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        };
        write!(f, "{}", s)
    }
}

/// A single issue raised by the security scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable identifier within one assessment (e.g., "APIF-001").
    pub id: String,
    /// Short title.
    pub title: String,
    /// What was observed.
    pub description: String,
    pub severity: Severity,
    /// OWASP Top 10 category, if the rule maps to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owasp_category: Option<String>,
    /// Name of the discovered item the finding applies to.
    pub item: String,
}

/// Remediation advice attached to an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// "IMMEDIATE" or "LOW".
    pub priority: String,
    pub description: String,
    pub action: String,
}

/// Outcome of the security stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAssessment {
    pub target: String,
    pub scan_type: ScanType,
    pub total_findings: u32,
    pub critical_findings: u32,
    pub high_findings: u32,
    pub medium_findings: u32,
    pub low_findings: u32,
    /// True when no critical findings were raised.
    pub passed: bool,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
}

impl SecurityAssessment {
    /// Number of findings at the given severity.
    pub fn count(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical_findings,
            Severity::High => self.high_findings,
            Severity::Medium => self.medium_findings,
            Severity::Low => self.low_findings,
        }
    }
}

/// Which documentation stage produced a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentationVariant {
    /// Regular API reference documentation.
    Standard,
    /// Security report emitted when critical issues were found.
    SecurityReport,
}

/// Rendered documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationBundle {
    pub variant: DocumentationVariant,
    pub title: String,
    /// Specification format (e.g., "OpenAPI 3.0.3").
    pub format: String,
    pub pages: usize,
    pub endpoints_documented: usize,
    /// Markdown body.
    pub content: String,
}

/// A generated client library for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkBundle {
    pub language: String,
    pub package_name: String,
    pub version: String,
    /// Suggested file name for `code`.
    pub file_name: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovered_item_omits_missing_base_url() {
        let item = DiscoveredItem::new("Auth API", "2.0", "REST");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["name"], "Auth API");
        assert!(value.get("base_url").is_none());
    }

    #[test]
    fn discovered_item_keeps_base_url() {
        let item = DiscoveredItem::new("Orders", "1.0", "REST").with_base_url("http://10.0.0.4:8080");
        assert_eq!(item.base_url.as_deref(), Some("http://10.0.0.4:8080"));
    }

    #[test]
    fn severity_serializes_uppercase() {
        assert_eq!(
            serde_json::to_value(Severity::Critical).unwrap(),
            serde_json::json!("CRITICAL")
        );
        assert_eq!(Severity::Low.to_string(), "LOW");
    }

    #[test]
    fn severity_orders_most_severe_first() {
        let mut severities = vec![Severity::Low, Severity::Critical, Severity::Medium];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::Medium, Severity::Low]
        );
    }

    #[test]
    fn documentation_variant_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(DocumentationVariant::SecurityReport).unwrap(),
            serde_json::json!("security_report")
        );
    }
}
