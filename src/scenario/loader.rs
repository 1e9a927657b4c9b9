//! Scenario loader
//!
//! Loading runs as a fixed pipeline:
//! 1. Size check
//! 2. Read, strip UTF-8 BOM
//! 3. YAML parsing (empty documents rejected)
//! 4. Deserialization to `ScenarioDocument`
//! 5. Validation (all issues collected)
//! 6. Model construction, frozen with `Arc`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Value;

use crate::error::{ScenarioError, Severity, ValidationIssue};
use crate::scenario::model::Scenario;
use crate::scenario::schema::ScenarioDocument;
use crate::scenario::validation::Validator;

/// Path reported for scenarios loaded from a string.
const INLINE_SOURCE: &str = "<inline>";

// ============================================================================
// Options
// ============================================================================

/// Options for the scenario loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Limits on scenario size.
    pub limits: ScenarioLimits,

    /// Treat validation warnings as errors.
    pub strict: bool,
}

/// Limits on scenario size to prevent resource exhaustion.
#[derive(Debug, Clone)]
pub struct ScenarioLimits {
    /// Maximum scenario file size in bytes.
    pub max_scenario_size: usize,

    /// Maximum total number of hosts.
    pub max_hosts: usize,

    /// Maximum number of subnets.
    pub max_subnets: usize,

    /// Maximum number of exploits.
    pub max_exploits: usize,
}

impl Default for ScenarioLimits {
    fn default() -> Self {
        Self {
            max_scenario_size: env_or("NETSCEN_MAX_SCENARIO_SIZE", 10 * 1024 * 1024),
            max_hosts: env_or("NETSCEN_MAX_HOSTS", 100_000),
            max_subnets: env_or("NETSCEN_MAX_SUBNETS", 1024),
            max_exploits: env_or("NETSCEN_MAX_EXPLOITS", 10_000),
        }
    }
}

/// Reads a `usize` from the environment, falling back to `default` when
/// unset or unparseable.
fn env_or(var: &str, default: usize) -> usize {
    std::env::var(var)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Load Result
// ============================================================================

/// Result of loading a scenario.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// The validated, immutable scenario.
    pub scenario: Arc<Scenario>,

    /// Warnings raised during validation.
    pub warnings: Vec<ValidationIssue>,
}

// ============================================================================
// Loader
// ============================================================================

/// Scenario loader.
///
/// Stateless apart from its options; one loader can load any number of
/// scenarios.
#[derive(Debug, Clone, Default)]
pub struct ScenarioLoader {
    options: LoaderOptions,
}

impl ScenarioLoader {
    /// Creates a new loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads and validates a scenario file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist, is not a regular file, or cannot be read
    /// - The file exceeds the size limit
    /// - YAML parsing or deserialization fails
    /// - Validation finds any error
    pub fn load(&self, path: &Path) -> Result<LoadResult, ScenarioError> {
        let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;
        if !metadata.is_file() {
            return Err(ScenarioError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "scenario path is not a regular file",
                ),
            });
        }

        let limit = self.options.limits.max_scenario_size;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > limit {
            return Err(ScenarioError::TooLarge { size, limit });
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                ScenarioError::Parse {
                    path: path.to_path_buf(),
                    line: None,
                    message: "Scenario file is not valid UTF-8".to_string(),
                }
            } else {
                io_error(path, e)
            }
        })?;

        tracing::debug!(path = %path.display(), bytes = raw.len(), "read scenario file");
        self.load_source(&raw, path)
    }

    /// Loads and validates a scenario from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text exceeds the size limit, fails to parse,
    /// or fails validation.
    pub fn load_from_str(&self, yaml: &str) -> Result<LoadResult, ScenarioError> {
        let limit = self.options.limits.max_scenario_size;
        if yaml.len() > limit {
            return Err(ScenarioError::TooLarge {
                size: yaml.len(),
                limit,
            });
        }
        self.load_source(yaml, Path::new(INLINE_SOURCE))
    }

    fn load_source(&self, raw: &str, path: &Path) -> Result<LoadResult, ScenarioError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let document = parse_document(raw, path)?;
        tracing::debug!(
            subnets = document.subnets.len(),
            exploits = document.exploits.len(),
            "parsed scenario document"
        );

        let result = Validator::new().validate(&document, &self.options.limits);
        let source_name = path.display().to_string();

        let mut errors = result.errors;
        let mut warnings = result.warnings;
        if self.options.strict {
            errors.extend(warnings.drain(..).map(|issue| ValidationIssue {
                severity: Severity::Error,
                ..issue
            }));
        }

        if !errors.is_empty() {
            tracing::debug!(
                source = %source_name,
                errors = errors.len(),
                "scenario failed validation"
            );
            return Err(ScenarioError::from_issues(source_name, errors));
        }

        for warning in &warnings {
            tracing::warn!(source = %source_name, path = %warning.path, "{}", warning.message);
        }

        let scenario = Scenario::from_document(&document);
        tracing::info!(
            source = %source_name,
            subnets = scenario.num_subnets(),
            hosts = scenario.num_hosts(),
            exploits = scenario.exploits().len(),
            "scenario loaded"
        );

        Ok(LoadResult {
            scenario: Arc::new(scenario),
            warnings,
        })
    }
}

/// Parses YAML text into a `ScenarioDocument`.
///
/// Syntax errors carry the line number; shape errors (missing keys, wrong
/// types, unknown keys) are reported with the deserializer's message.
fn parse_document(raw: &str, path: &Path) -> Result<ScenarioDocument, ScenarioError> {
    let root: Value = serde_yaml::from_str(raw).map_err(|e| parse_error(path, &e))?;

    if root.is_null() {
        return Err(ScenarioError::Parse {
            path: path.to_path_buf(),
            line: None,
            message: "Scenario file is empty".to_string(),
        });
    }

    if !root.is_mapping() {
        return Err(ScenarioError::Parse {
            path: path.to_path_buf(),
            line: None,
            message: "Scenario document must be a mapping of keys to values".to_string(),
        });
    }

    // Deserialize from text again so shape errors keep their location
    serde_yaml::from_str(raw).map_err(|e| parse_error(path, &e))
}

/// Maps a filesystem failure: only a missing path is `MissingFile`.
fn io_error(path: &Path, err: std::io::Error) -> ScenarioError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ScenarioError::MissingFile {
            path: path.to_path_buf(),
        }
    } else {
        ScenarioError::Io {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

fn parse_error(path: &Path, err: &serde_yaml::Error) -> ScenarioError {
    ScenarioError::Parse {
        path: PathBuf::from(path),
        line: err.location().map(|l| l.line()),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;

    const MINIMAL: &str = r"
subnets: [1]
topology: [[1, 1], [1, 1]]
sensitive_hosts:
  (1, 0): 10
services: [ssh]
os: [linux]
exploits:
  e_ssh:
    service: ssh
    os: linux
    prob: 0.5
    cost: 1
service_scan_cost: 1
os_scan_cost: 1
subnet_scan_cost: 1
host_configurations:
  (1, 0):
    services: [ssh]
    os: linux
firewall:
  (0, 1): [ssh]
  (1, 0): []
step_limit: 100
";

    #[test]
    fn loads_minimal_scenario() {
        let result = ScenarioLoader::with_defaults().load_from_str(MINIMAL).unwrap();
        assert_eq!(result.scenario.num_hosts(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn strips_bom() {
        let text = format!("\u{feff}{MINIMAL}");
        assert!(ScenarioLoader::with_defaults().load_from_str(&text).is_ok());
    }

    #[test]
    fn empty_document_rejected() {
        let err = ScenarioLoader::with_defaults()
            .load_from_str("")
            .unwrap_err();
        assert!(err.to_string().contains("empty"), "{err}");
        assert_eq!(err.kind(), Some(IssueKind::Schema));
    }

    #[test]
    fn non_mapping_document_rejected() {
        let err = ScenarioLoader::with_defaults()
            .load_from_str("- 1\n- 2\n")
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Parse { .. }));
    }

    #[test]
    fn missing_key_is_schema_error() {
        let text = MINIMAL.replace("step_limit: 100\n", "");
        let err = ScenarioLoader::with_defaults()
            .load_from_str(&text)
            .unwrap_err();
        assert_eq!(err.kind(), Some(IssueKind::Schema));
        assert!(err.to_string().contains("step_limit"), "{err}");
    }

    #[test]
    fn unknown_key_is_schema_error() {
        let text = format!("{MINIMAL}extra_key: 1\n");
        let err = ScenarioLoader::with_defaults()
            .load_from_str(&text)
            .unwrap_err();
        assert_eq!(err.kind(), Some(IssueKind::Schema));
    }

    #[test]
    fn negative_step_limit_is_range_error() {
        let text = MINIMAL.replace("step_limit: 100", "step_limit: -5");
        let err = ScenarioLoader::with_defaults()
            .load_from_str(&text)
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Range { .. }), "{err}");
    }

    #[test]
    fn size_limit_enforced() {
        let loader = ScenarioLoader::new(LoaderOptions {
            limits: ScenarioLimits {
                max_scenario_size: 16,
                ..ScenarioLimits::default()
            },
            strict: false,
        });
        let err = loader.load_from_str(MINIMAL).unwrap_err();
        assert!(matches!(err, ScenarioError::TooLarge { limit: 16, .. }));
    }

    #[test]
    fn strict_promotes_warnings() {
        let text = MINIMAL.replace("topology: [[1, 1], [1, 1]]", "topology: [[1, 1], [1, 0]]");
        let lenient = ScenarioLoader::with_defaults().load_from_str(&text).unwrap();
        assert_eq!(lenient.warnings.len(), 1);

        let strict = ScenarioLoader::new(LoaderOptions {
            strict: true,
            ..LoaderOptions::default()
        });
        let err = strict.load_from_str(&text).unwrap_err();
        assert!(matches!(err, ScenarioError::Schema { .. }), "{err}");
        assert!(err.issues().iter().all(|i| i.severity == Severity::Error));
    }

    #[test]
    fn missing_path_is_missing_file() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let err = ScenarioLoader::with_defaults()
            .load(&dir.path().join("absent.yaml"))
            .unwrap_err();
        assert!(matches!(err, ScenarioError::MissingFile { .. }), "{err}");
    }

    #[test]
    fn directory_path_is_io_error() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let err = ScenarioLoader::with_defaults().load(dir.path()).unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }), "{err}");
        assert!(!err.to_string().contains("not found"), "{err}");
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn io_error_keeps_non_missing_causes() {
        let path = Path::new("scenario.yaml");
        let err = io_error(
            path,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert!(matches!(err, ScenarioError::Io { .. }), "{err}");
        assert!(err.to_string().contains("permission denied"), "{err}");

        let err = io_error(path, std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(err, ScenarioError::MissingFile { .. }), "{err}");
    }

    #[test]
    fn env_or_falls_back_on_garbage() {
        assert_eq!(env_or("NETSCEN_TEST_UNSET_VARIABLE_XYZ", 7), 7);
    }
}
