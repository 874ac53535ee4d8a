//! Validation finding types.

use serde::{Deserialize, Serialize};

use crate::suggest::Suggestion;

/// Severity level of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

/// Aggregate counts over the validated workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub node_count: usize,
    pub connection_count: usize,
    /// Connections whose endpoints exist and whose branch index fits the
    /// source type's declared outputs.
    pub valid_connections: usize,
}

/// Result of one validation run. Warnings do not affect `valid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub findings: Vec<Finding>,
    pub statistics: Statistics,
}

impl ValidationReport {
    pub fn new(findings: Vec<Finding>, statistics: Statistics) -> Self {
        let valid = findings.iter().all(|f| f.severity != Severity::Error);
        Self {
            valid,
            findings,
            statistics,
        }
    }

    /// Return only the error-level findings.
    pub fn errors(&self) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .collect()
    }

    /// Return only the warning-level findings.
    pub fn warnings(&self) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_finding(severity: Severity, code: &str) -> Finding {
        Finding {
            severity,
            code: code.to_string(),
            message: format!("test {}", code),
            node: None,
            suggestion: None,
        }
    }

    #[test]
    fn test_report_valid_without_errors() {
        let report = ValidationReport::new(
            vec![make_finding(Severity::Warning, "W101")],
            Statistics::default(),
        );
        assert!(report.valid);
        assert_eq!(report.errors().len(), 0);
        assert_eq!(report.warnings().len(), 1);
    }

    #[test]
    fn test_report_invalid_with_errors() {
        let report = ValidationReport::new(
            vec![
                make_finding(Severity::Error, "E101"),
                make_finding(Severity::Warning, "W101"),
            ],
            Statistics::default(),
        );
        assert!(!report.valid);
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.warnings().len(), 1);
    }

    #[test]
    fn test_finding_serde_roundtrip() {
        let finding = Finding {
            severity: Severity::Error,
            code: "E304".into(),
            message: "Invalid resource".into(),
            node: Some("Slack".into()),
            suggestion: Some(Suggestion {
                value: "message".into(),
                confidence: 0.9,
                reason: "similar spelling to 'mesage'".into(),
            }),
        };
        let json = serde_json::to_string(&finding).unwrap();
        let back: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, finding);
    }

    #[test]
    fn test_statistics_wire_names() {
        let stats = Statistics {
            node_count: 2,
            connection_count: 1,
            valid_connections: 1,
        };
        let v = serde_json::to_value(stats).unwrap();
        assert_eq!(v["nodeCount"], 2);
        assert_eq!(v["connectionCount"], 1);
        assert_eq!(v["validConnections"], 1);
    }
}
