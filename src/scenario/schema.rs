//! Scenario document schema
//!
//! These types mirror the on-disk YAML layout one-to-one. Address and link
//! keys stay as their raw `(a, b)` text so the validator can report
//! malformed or duplicated spellings; [`parse_pair`] turns them into
//! numbers.

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// OS name that marks an exploit (or host) as OS-independent.
pub const ANY_OS: &str = "None";

static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)$").expect("valid regex")
});

// ============================================================================
// Top-Level Document
// ============================================================================

/// Root of a scenario document.
///
/// Every key is required and unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioDocument {
    /// Host count per subnet; subnet ids start at 1
    pub subnets: Vec<i64>,

    /// Reachability matrix over subnets, row/column 0 is the attacker origin
    pub topology: Vec<Vec<i64>>,

    /// Goal hosts and their rewards, keyed by `(subnet, host)`
    pub sensitive_hosts: IndexMap<String, f64>,

    /// Service catalog
    pub services: Vec<String>,

    /// Operating system catalog
    pub os: Vec<String>,

    /// Exploit catalog, keyed by exploit name
    pub exploits: IndexMap<String, ExploitSpec>,

    /// Cost of a service scan
    pub service_scan_cost: f64,

    /// Cost of an OS scan
    pub os_scan_cost: f64,

    /// Cost of a subnet scan
    pub subnet_scan_cost: f64,

    /// Per-host configuration, keyed by `(subnet, host)`
    pub host_configurations: IndexMap<String, HostSpec>,

    /// Allowed services per directed `(src, dst)` subnet link
    pub firewall: IndexMap<String, Vec<String>>,

    /// Episode horizon
    pub step_limit: i64,
}

/// A single exploit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExploitSpec {
    /// Target service
    pub service: String,

    /// Target operating system, or `None` for any
    pub os: OsTarget,

    /// Success probability
    pub prob: f64,

    /// Cost of attempting the exploit
    pub cost: f64,
}

/// A single host configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSpec {
    /// Services running on the host
    pub services: Vec<String>,

    /// Host operating system
    pub os: OsTarget,
}

// ============================================================================
// OS Target
// ============================================================================

/// Operating system reference used by exploits and hosts.
///
/// Serialized as a plain string, with `"None"` standing for [`OsTarget::Any`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OsTarget {
    /// OS-independent
    Any,
    /// A specific catalog entry
    Named(String),
}

impl OsTarget {
    /// Returns `true` when two OS references can match each other.
    ///
    /// `Any` on either side matches everything.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, _) | (_, Self::Any) => true,
            (Self::Named(a), Self::Named(b)) => a == b,
        }
    }

    /// Returns the catalog name, or `None` for [`OsTarget::Any`].
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl From<String> for OsTarget {
    fn from(value: String) -> Self {
        if value == ANY_OS {
            Self::Any
        } else {
            Self::Named(value)
        }
    }
}

impl From<&str> for OsTarget {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<OsTarget> for String {
    fn from(value: OsTarget) -> Self {
        match value {
            OsTarget::Any => ANY_OS.to_string(),
            OsTarget::Named(name) => name,
        }
    }
}

impl fmt::Display for OsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(ANY_OS),
            Self::Named(name) => f.write_str(name),
        }
    }
}

// ============================================================================
// Key Parsing
// ============================================================================

/// Parses a `(a, b)` key into its two integers.
///
/// Whitespace inside the parentheses is optional. Returns `None` for any
/// other shape, including integers that overflow `i64`.
#[must_use]
pub fn parse_pair(key: &str) -> Option<(i64, i64)> {
    let caps = PAIR_RE.captures(key.trim())?;
    let a = caps.get(1)?.as_str().parse().ok()?;
    let b = caps.get(2)?.as_str().parse().ok()?;
    Some((a, b))
}

/// Formats a pair in canonical `(a, b)` form.
#[must_use]
pub fn format_pair(a: usize, b: usize) -> String {
    format!("({a}, {b})")
}
