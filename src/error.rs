//! Error types for `netscen`
//!
//! Every load failure falls into one of three classes: a structural
//! problem with the document (schema), a name or address that does not
//! resolve (reference), or a numeric value outside its domain (range).
//! Validation collects every issue it finds, and the error variant
//! reports the most fundamental class present.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Scenario Errors
// ============================================================================

/// Scenario loading and validation errors.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// YAML syntax error, or a value of the wrong shape for its key
    #[error("parse error in {path}{}: {message}", line.map_or_else(String::new, |l| format!(" (line {l})")))]
    Parse {
        /// Path to the scenario file (or `<inline>` for string sources)
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Scenario file could not be read
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Scenario path exists but could not be read
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path to the scenario file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Scenario file exceeds the configured size limit
    #[error("scenario too large: {size} bytes (limit: {limit})")]
    TooLarge {
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Required keys missing, malformed, or duplicated
    #[error("schema error in {source_name}: {}", describe(.issues))]
    Schema {
        /// Name of the scenario source
        source_name: String,
        /// Every issue collected during validation
        issues: Vec<ValidationIssue>,
    },

    /// A service, OS, subnet index, or host address does not resolve
    #[error("reference error in {source_name}: {}", describe(.issues))]
    Reference {
        /// Name of the scenario source
        source_name: String,
        /// Every issue collected during validation
        issues: Vec<ValidationIssue>,
    },

    /// A probability, cost, reward, or count is outside its valid domain
    #[error("range error in {source_name}: {}", describe(.issues))]
    Range {
        /// Name of the scenario source
        source_name: String,
        /// Every issue collected during validation
        issues: Vec<ValidationIssue>,
    },

    /// Requested built-in scenario does not exist
    #[error("unknown built-in scenario '{name}'{}", suggestion.as_ref().map_or_else(String::new, |s| format!(" (did you mean '{s}'?)")))]
    UnknownBuiltin {
        /// Name that was requested
        name: String,
        /// Closest known name, if any
        suggestion: Option<String>,
    },
}

impl ScenarioError {
    /// Builds the error for a set of validation issues.
    ///
    /// The variant follows the most fundamental kind present: schema
    /// beats reference, which beats range. All issues are kept.
    #[must_use]
    pub fn from_issues(source_name: impl Into<String>, issues: Vec<ValidationIssue>) -> Self {
        let source_name = source_name.into();
        let kind = issues
            .iter()
            .map(|i| i.kind)
            .min()
            .unwrap_or(IssueKind::Schema);
        match kind {
            IssueKind::Schema => Self::Schema {
                source_name,
                issues,
            },
            IssueKind::Reference => Self::Reference {
                source_name,
                issues,
            },
            IssueKind::Range => Self::Range {
                source_name,
                issues,
            },
        }
    }

    /// Returns the taxonomy class of this error.
    ///
    /// Failures to locate or read a source (missing file, I/O error,
    /// unknown built-in) sit outside the taxonomy and return `None`.
    #[must_use]
    pub const fn kind(&self) -> Option<IssueKind> {
        match self {
            Self::Parse { .. } | Self::Schema { .. } => Some(IssueKind::Schema),
            Self::Reference { .. } => Some(IssueKind::Reference),
            Self::TooLarge { .. } | Self::Range { .. } => Some(IssueKind::Range),
            Self::MissingFile { .. } | Self::Io { .. } | Self::UnknownBuiltin { .. } => None,
        }
    }

    /// Returns the validation issues carried by this error.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Schema { issues, .. }
            | Self::Reference { issues, .. }
            | Self::Range { issues, .. } => issues,
            _ => &[],
        }
    }
}

fn describe(issues: &[ValidationIssue]) -> String {
    match issues {
        [] => "no issues recorded".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

// ============================================================================
// Validation Types
// ============================================================================

/// Taxonomy class of a validation issue.
///
/// Ordered from most to least fundamental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Structural: missing, malformed, or duplicated content
    Schema,
    /// Dangling cross-reference to a catalog entry, subnet, or host
    Reference,
    /// Numeric value outside its valid domain
    Range,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema => write!(f, "schema"),
            Self::Reference => write!(f, "reference"),
            Self::Range => write!(f, "range"),
        }
    }
}

/// A single validation issue found in a scenario document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "exploits.e_ssh.service")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
    /// Taxonomy class of the issue
    pub kind: IssueKind,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}]: {} at {}", prefix, self.kind, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Error - prevents the scenario from loading
    Error,
    /// Warning - suspicious but loadable (an error in strict mode)
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(kind: IssueKind, path: &str) -> ValidationIssue {
        ValidationIssue {
            path: path.to_string(),
            message: "bad".to_string(),
            severity: Severity::Error,
            kind,
        }
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "exploits.e_telnet.service".to_string(),
            message: "unknown service 'telnet'".to_string(),
            severity: Severity::Error,
            kind: IssueKind::Reference,
        };
        assert_eq!(
            issue.to_string(),
            "error[reference]: unknown service 'telnet' at exploits.e_telnet.service"
        );
    }

    #[test]
    fn test_validation_issue_warning_display() {
        let issue = ValidationIssue {
            path: "topology[0][1]".to_string(),
            message: "asymmetric".to_string(),
            severity: Severity::Warning,
            kind: IssueKind::Schema,
        };
        assert_eq!(
            issue.to_string(),
            "warning[schema]: asymmetric at topology[0][1]"
        );
    }

    #[test]
    fn test_from_issues_prefers_schema() {
        let err = ScenarioError::from_issues(
            "x.yaml",
            vec![
                issue(IssueKind::Range, "a"),
                issue(IssueKind::Schema, "b"),
                issue(IssueKind::Reference, "c"),
            ],
        );
        assert!(matches!(err, ScenarioError::Schema { .. }));
        assert_eq!(err.issues().len(), 3);
    }

    #[test]
    fn test_from_issues_reference_over_range() {
        let err = ScenarioError::from_issues(
            "x.yaml",
            vec![issue(IssueKind::Range, "a"), issue(IssueKind::Reference, "b")],
        );
        assert_eq!(err.kind(), Some(IssueKind::Reference));
    }

    #[test]
    fn test_from_issues_range_only() {
        let err = ScenarioError::from_issues("x.yaml", vec![issue(IssueKind::Range, "a")]);
        assert!(matches!(err, ScenarioError::Range { .. }));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ScenarioError::Parse {
            path: PathBuf::from("scenario.yaml"),
            line: Some(42),
            message: "unexpected token".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("scenario.yaml"));
        assert!(text.contains("line 42"));
        assert!(text.contains("unexpected token"));
    }

    #[test]
    fn test_error_display_counts_extra_issues() {
        let err = ScenarioError::from_issues(
            "x.yaml",
            vec![issue(IssueKind::Range, "a"), issue(IssueKind::Range, "b")],
        );
        assert!(err.to_string().contains("(and 1 more)"), "{err}");
    }

    #[test]
    fn test_unknown_builtin_display() {
        let err = ScenarioError::UnknownBuiltin {
            name: "single-sit".to_string(),
            suggestion: Some("single-site".to_string()),
        };
        assert!(err.to_string().contains("did you mean 'single-site'"));
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn test_io_error_display_keeps_cause() {
        let err = ScenarioError::Io {
            path: PathBuf::from("/etc/scenarios"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let text = err.to_string();
        assert!(text.contains("/etc/scenarios"), "{text}");
        assert!(text.contains("permission denied"), "{text}");
        assert!(!text.contains("not found"), "{text}");
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn test_missing_file_has_no_kind() {
        let err = ScenarioError::MissingFile {
            path: PathBuf::from("/nope.yaml"),
        };
        assert_eq!(err.kind(), None);
        assert!(err.issues().is_empty());
    }
}
