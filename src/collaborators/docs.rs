//! Documentation and security report rendering.

use std::fmt::Write;

use super::CollaboratorError;
use crate::flow::artifacts::{
    DiscoveredItem, DocumentationBundle, DocumentationVariant, SecurityAssessment,
};

pub const OPENAPI_FORMAT: &str = "OpenAPI 3.0.3";
pub const REPORT_FORMAT: &str = "Markdown";

/// Standard resource operations documented for every API.
const RESOURCE_OPERATIONS: [(&str, &str, &str); 5] = [
    ("GET", "", "List resources"),
    ("POST", "", "Create a resource"),
    ("GET", "/{id}", "Fetch a resource"),
    ("PUT", "/{id}", "Replace a resource"),
    ("DELETE", "/{id}", "Delete a resource"),
];

const DEFAULT_TITLE: &str = "Enterprise API";
const DEFAULT_REPORT_TITLE: &str = "Security Assessment Report";

#[derive(Debug, Clone, Default)]
pub struct DocumentationRequest {
    pub title: Option<String>,
    pub items: Vec<DiscoveredItem>,
    /// Required for the security report.
    pub assessment: Option<SecurityAssessment>,
}

/// Renders documentation bundles.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentationBuilder;

impl DocumentationBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Render API reference documentation for the discovered items.
    pub fn build(&self, request: &DocumentationRequest) -> Result<DocumentationBundle, CollaboratorError> {
        let title = resolve_title(request.title.as_deref(), DEFAULT_TITLE)?;

        let mut content = String::new();
        let _ = writeln!(content, "# {}\n", title);
        let _ = writeln!(content, "Specification format: {}\n", OPENAPI_FORMAT);

        if request.items.is_empty() {
            content.push_str("No APIs were discovered.\n");
        }

        for item in &request.items {
            let _ = writeln!(content, "## {} (v{})\n", item.name, item.version);
            let _ = writeln!(content, "- Kind: {}", item.kind);
            if let Some(url) = &item.base_url {
                let _ = writeln!(content, "- Base URL: {}", url);
            }
            content.push_str("\n| Method | Path | Summary |\n|---|---|---|\n");
            let base = format!("/{}", slug(&item.name));
            for (method, suffix, summary) in RESOURCE_OPERATIONS {
                let _ = writeln!(content, "| {} | {}{} | {} |", method, base, suffix, summary);
            }
            content.push('\n');
        }

        Ok(DocumentationBundle {
            variant: DocumentationVariant::Standard,
            title,
            format: OPENAPI_FORMAT.to_string(),
            pages: request.items.len() + 1,
            endpoints_documented: request.items.len() * RESOURCE_OPERATIONS.len(),
            content,
        })
    }

    /// Render the security report used in place of the reference docs.
    pub fn build_security_report(
        &self,
        request: &DocumentationRequest,
    ) -> Result<DocumentationBundle, CollaboratorError> {
        let title = resolve_title(request.title.as_deref(), DEFAULT_REPORT_TITLE)?;
        let assessment = request.assessment.as_ref().ok_or_else(|| {
            CollaboratorError::validation("security report requires a security assessment")
        })?;

        let mut content = String::new();
        let _ = writeln!(content, "# {}\n", title);
        let _ = writeln!(
            content,
            "Target: {} ({} scan)\n",
            assessment.target, assessment.scan_type
        );
        content.push_str("## Summary\n\n| Severity | Findings |\n|---|---|\n");
        let _ = writeln!(content, "| CRITICAL | {} |", assessment.critical_findings);
        let _ = writeln!(content, "| HIGH | {} |", assessment.high_findings);
        let _ = writeln!(content, "| MEDIUM | {} |", assessment.medium_findings);
        let _ = writeln!(content, "| LOW | {} |", assessment.low_findings);

        let mut findings: Vec<_> = assessment.findings.iter().collect();
        findings.sort_by_key(|f| f.severity);

        content.push_str("\n## Findings\n\n");
        if findings.is_empty() {
            content.push_str("No findings.\n");
        }
        for finding in findings {
            let _ = writeln!(
                content,
                "### {} [{}] {}\n",
                finding.id, finding.severity, finding.title
            );
            let _ = writeln!(content, "- API: {}", finding.item);
            if let Some(category) = &finding.owasp_category {
                let _ = writeln!(content, "- OWASP: {}", category);
            }
            let _ = writeln!(content, "\n{}\n", finding.description);
        }

        content.push_str("## Recommendations\n\n");
        for rec in &assessment.recommendations {
            let _ = writeln!(content, "- **{}**: {} ({})", rec.priority, rec.description, rec.action);
        }

        Ok(DocumentationBundle {
            variant: DocumentationVariant::SecurityReport,
            title,
            format: REPORT_FORMAT.to_string(),
            pages: 1,
            endpoints_documented: 0,
            content,
        })
    }
}

fn resolve_title(title: Option<&str>, default: &str) -> Result<String, CollaboratorError> {
    match title {
        Some(t) if t.trim().is_empty() => {
            Err(CollaboratorError::validation("title must not be empty"))
        }
        Some(t) => Ok(t.to_string()),
        None => Ok(default.to_string()),
    }
}

/// URL path segment for an API name: "Auth API" becomes "auth".
fn slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let trimmed = lowered.strip_suffix(" api").unwrap_or(&lowered);
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_matches('-').to_string();
    if out.is_empty() {
        "api".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{CollaboratorErrorKind, ScanType, SecurityScanRequest, SecurityScanner};

    fn items() -> Vec<DiscoveredItem> {
        vec![
            DiscoveredItem::new("Enterprise API", "1.0", "REST"),
            DiscoveredItem::new("Auth API", "2.0", "REST"),
        ]
    }

    #[test]
    fn standard_docs_document_five_endpoints_per_item() {
        let bundle = DocumentationBuilder::new()
            .build(&DocumentationRequest {
                items: items(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(bundle.variant, DocumentationVariant::Standard);
        assert_eq!(bundle.format, "OpenAPI 3.0.3");
        assert_eq!(bundle.endpoints_documented, 10);
        assert_eq!(bundle.pages, 3);
        assert!(bundle.content.contains("| DELETE | /auth/{id} |"));
        assert!(bundle.content.contains("## Enterprise API (v1.0)"));
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = DocumentationBuilder::new()
            .build(&DocumentationRequest {
                title: Some("   ".to_string()),
                items: items(),
                assessment: None,
            })
            .unwrap_err();
        assert_eq!(err.kind, CollaboratorErrorKind::Validation);
        assert_eq!(err.message, "title must not be empty");
    }

    #[test]
    fn security_report_lists_findings_by_severity() {
        let assessment = SecurityScanner::new()
            .scan(&SecurityScanRequest {
                target: None,
                scan_type: Some(ScanType::Comprehensive),
                items: vec![
                    DiscoveredItem::new("Beta", "0.1", "REST"),
                    DiscoveredItem::new("Admin API", "1.0", "REST"),
                ],
            })
            .unwrap();

        let bundle = DocumentationBuilder::new()
            .build_security_report(&DocumentationRequest {
                title: None,
                items: Vec::new(),
                assessment: Some(assessment),
            })
            .unwrap();

        assert_eq!(bundle.variant, DocumentationVariant::SecurityReport);
        assert_eq!(bundle.title, "Security Assessment Report");
        let critical = bundle.content.find("[CRITICAL]").unwrap();
        let medium = bundle.content.find("[MEDIUM]").unwrap();
        assert!(critical < medium);
        assert!(bundle.content.contains("**IMMEDIATE**"));
    }

    #[test]
    fn security_report_requires_assessment() {
        let err = DocumentationBuilder::new()
            .build_security_report(&DocumentationRequest::default())
            .unwrap_err();
        assert_eq!(err.kind, CollaboratorErrorKind::Validation);
    }

    #[test]
    fn slugs() {
        assert_eq!(slug("Auth API"), "auth");
        assert_eq!(slug("Order Service v2"), "order-service-v2");
        assert_eq!(slug("API"), "api");
        assert_eq!(slug("!!"), "api");
    }
}
