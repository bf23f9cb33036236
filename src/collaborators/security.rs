//! Rule-based security scanning of discovered APIs.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::CollaboratorError;
use crate::flow::artifacts::{
    DiscoveredItem, Finding, Recommendation, SecurityAssessment, Severity,
};

/// Names or URLs that expose privileged surfaces.
static PRIVILEGED_SURFACE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(admin|debug|internal)\b").expect("PRIVILEGED_SURFACE_REGEX must compile")
});

/// Plain HTTP base URL, capturing the host.
static PLAINTEXT_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^http://(\[[^\]]+\]|[^:/\s]+)").expect("PLAINTEXT_URL_REGEX must compile")
});

/// Versions below 1.0 (`0.x`, `v0.x`).
static PRE_RELEASE_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[vV]?0(\.|$)").expect("PRE_RELEASE_VERSION_REGEX must compile")
});

const DEFAULT_TARGET: &str = "discovered inventory";

/// Depth of a security scan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// Every rule.
    #[default]
    Comprehensive,
    /// Rules that map to an OWASP Top 10 category.
    Owasp,
    /// Rules relevant to access and transport compliance.
    Compliance,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Comprehensive => "comprehensive",
            ScanType::Owasp => "owasp",
            ScanType::Compliance => "compliance",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comprehensive" => Ok(Self::Comprehensive),
            "owasp" => Ok(Self::Owasp),
            "compliance" => Ok(Self::Compliance),
            _ => Err(format!("unknown scan type: {}", s)),
        }
    }
}

/// Input for a scan.
#[derive(Debug, Clone, Default)]
pub struct SecurityScanRequest {
    /// Label recorded in the assessment.
    pub target: Option<String>,
    pub scan_type: Option<ScanType>,
    pub items: Vec<DiscoveredItem>,
}

struct Rule {
    title: &'static str,
    severity: Severity,
    owasp_category: Option<&'static str>,
    compliance: bool,
    check: fn(&DiscoveredItem) -> Option<String>,
}

impl Rule {
    fn applies_to(&self, scan_type: ScanType) -> bool {
        match scan_type {
            ScanType::Comprehensive => true,
            ScanType::Owasp => self.owasp_category.is_some(),
            ScanType::Compliance => self.compliance,
        }
    }
}

static RULES: [Rule; 4] = [
    Rule {
        title: "Privileged surface exposed",
        severity: Severity::Critical,
        owasp_category: Some("A01:2021 Broken Access Control"),
        compliance: true,
        check: privileged_surface,
    },
    Rule {
        title: "Unencrypted transport",
        severity: Severity::High,
        owasp_category: Some("A02:2021 Cryptographic Failures"),
        compliance: true,
        check: plaintext_transport,
    },
    Rule {
        title: "Pre-release API version",
        severity: Severity::Medium,
        owasp_category: None,
        compliance: true,
        check: pre_release_version,
    },
    Rule {
        title: "GraphQL introspection surface",
        severity: Severity::Low,
        owasp_category: Some("A05:2021 Security Misconfiguration"),
        compliance: false,
        check: graphql_surface,
    },
];

fn privileged_surface(item: &DiscoveredItem) -> Option<String> {
    let haystacks = std::iter::once(item.name.as_str()).chain(item.base_url.as_deref());
    for haystack in haystacks {
        if let Some(m) = PRIVILEGED_SURFACE_REGEX.find(haystack) {
            return Some(format!(
                "'{}' exposes a '{}' surface that should not be publicly reachable",
                item.name,
                m.as_str().to_lowercase()
            ));
        }
    }
    None
}

fn plaintext_transport(item: &DiscoveredItem) -> Option<String> {
    let url = item.base_url.as_deref()?;
    let host = PLAINTEXT_URL_REGEX.captures(url)?.get(1)?.as_str();
    if is_loopback(host) {
        return None;
    }
    Some(format!("'{}' is served over plain HTTP at {}", item.name, url))
}

fn pre_release_version(item: &DiscoveredItem) -> Option<String> {
    PRE_RELEASE_VERSION_REGEX
        .is_match(item.version.trim())
        .then(|| format!("'{}' is at pre-release version {}", item.name, item.version))
}

fn graphql_surface(item: &DiscoveredItem) -> Option<String> {
    item.kind.eq_ignore_ascii_case("graphql").then(|| {
        format!(
            "'{}' is a GraphQL API; confirm introspection is disabled in production",
            item.name
        )
    })
}

fn is_loopback(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost") || host == "::1" || host.starts_with("127.")
}

/// Deterministic scanner over a discovered inventory.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecurityScanner;

impl SecurityScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan the request's items and build an assessment.
    pub fn scan(&self, request: &SecurityScanRequest) -> Result<SecurityAssessment, CollaboratorError> {
        let scan_type = request.scan_type.unwrap_or_default();
        let target = match request.target.as_deref() {
            Some(t) if t.trim().is_empty() => {
                return Err(CollaboratorError::validation("scan target must not be empty"))
            }
            Some(t) => t.to_string(),
            None => DEFAULT_TARGET.to_string(),
        };

        let mut findings = Vec::new();
        for item in &request.items {
            for rule in RULES.iter().filter(|r| r.applies_to(scan_type)) {
                if let Some(description) = (rule.check)(item) {
                    findings.push(Finding {
                        id: format!("APIF-{:03}", findings.len() + 1),
                        title: rule.title.to_string(),
                        description,
                        severity: rule.severity,
                        owasp_category: rule.owasp_category.map(str::to_string),
                        item: item.name.clone(),
                    });
                }
            }
        }

        let count = |severity: Severity| {
            findings.iter().filter(|f| f.severity == severity).count() as u32
        };
        let critical_findings = count(Severity::Critical);
        let high_findings = count(Severity::High);
        let medium_findings = count(Severity::Medium);
        let low_findings = count(Severity::Low);

        let recommendations = vec![recommend(critical_findings + high_findings)];

        Ok(SecurityAssessment {
            target,
            scan_type,
            total_findings: findings.len() as u32,
            critical_findings,
            high_findings,
            medium_findings,
            low_findings,
            passed: critical_findings == 0,
            findings,
            recommendations,
        })
    }
}

fn recommend(urgent: u32) -> Recommendation {
    if urgent > 0 {
        Recommendation {
            priority: "IMMEDIATE".to_string(),
            description: format!(
                "Address {} critical/high severity findings immediately",
                urgent
            ),
            action: "Restrict privileged endpoints, enforce TLS, and review access controls"
                .to_string(),
        }
    } else {
        Recommendation {
            priority: "LOW".to_string(),
            description: "No critical security issues found".to_string(),
            action: "Continue regular security monitoring and assessments".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(items: Vec<DiscoveredItem>, scan_type: ScanType) -> SecurityAssessment {
        SecurityScanner::new()
            .scan(&SecurityScanRequest {
                target: None,
                scan_type: Some(scan_type),
                items,
            })
            .unwrap()
    }

    #[test]
    fn clean_inventory_passes() {
        let assessment = scan(
            vec![
                DiscoveredItem::new("Enterprise API", "1.0", "REST"),
                DiscoveredItem::new("Auth API", "2.0", "REST")
                    .with_base_url("https://auth.example.com"),
            ],
            ScanType::Comprehensive,
        );
        assert!(assessment.passed);
        assert_eq!(assessment.total_findings, 0);
        assert_eq!(assessment.target, "discovered inventory");
        assert_eq!(assessment.recommendations[0].priority, "LOW");
    }

    #[test]
    fn admin_surface_is_critical() {
        let assessment = scan(
            vec![DiscoveredItem::new("Admin API", "1.0", "REST")],
            ScanType::Comprehensive,
        );
        assert!(!assessment.passed);
        assert_eq!(assessment.critical_findings, 1);
        assert_eq!(assessment.findings[0].id, "APIF-001");
        assert_eq!(assessment.findings[0].item, "Admin API");
        assert_eq!(assessment.recommendations[0].priority, "IMMEDIATE");
    }

    #[test]
    fn plaintext_only_flagged_off_loopback() {
        let assessment = scan(
            vec![
                DiscoveredItem::new("Orders", "1.0", "REST").with_base_url("http://10.0.0.4:8080"),
                DiscoveredItem::new("Local", "1.0", "REST").with_base_url("http://127.0.0.1:3000"),
                DiscoveredItem::new("Dev", "1.0", "REST").with_base_url("http://localhost:5000"),
            ],
            ScanType::Comprehensive,
        );
        assert_eq!(assessment.high_findings, 1);
        assert_eq!(assessment.findings[0].item, "Orders");
        assert!(assessment.passed);
        assert_eq!(assessment.recommendations[0].priority, "IMMEDIATE");
    }

    #[test]
    fn pre_release_and_graphql_rules() {
        let assessment = scan(
            vec![
                DiscoveredItem::new("Beta", "0.9", "REST"),
                DiscoveredItem::new("Graph", "1.2", "GraphQL"),
            ],
            ScanType::Comprehensive,
        );
        assert_eq!(assessment.medium_findings, 1);
        assert_eq!(assessment.low_findings, 1);
        assert_eq!(assessment.total_findings, 2);
    }

    #[test]
    fn scan_type_selects_rules() {
        let items = vec![
            DiscoveredItem::new("Beta", "v0.3", "REST"),
            DiscoveredItem::new("Graph", "1.0", "graphql"),
        ];
        let owasp = scan(items.clone(), ScanType::Owasp);
        assert_eq!(owasp.total_findings, 1);
        assert_eq!(owasp.findings[0].severity, Severity::Low);

        let compliance = scan(items, ScanType::Compliance);
        assert_eq!(compliance.total_findings, 1);
        assert_eq!(compliance.findings[0].severity, Severity::Medium);
        assert_eq!(compliance.scan_type, ScanType::Compliance);
    }

    #[test]
    fn empty_target_is_rejected() {
        let err = SecurityScanner::new()
            .scan(&SecurityScanRequest {
                target: Some(String::new()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind, crate::collaborators::CollaboratorErrorKind::Validation);
    }

    #[test]
    fn scan_type_parses_case_insensitively() {
        assert_eq!("OWASP".parse::<ScanType>(), Ok(ScanType::Owasp));
        assert!("quick".parse::<ScanType>().is_err());
        assert_eq!(ScanType::default(), ScanType::Comprehensive);
    }

    #[test]
    fn word_boundaries_limit_privileged_match() {
        let assessment = scan(
            vec![DiscoveredItem::new("Administration Portal", "1.0", "REST")],
            ScanType::Comprehensive,
        );
        assert_eq!(assessment.critical_findings, 0);
    }
}
