//! Built-in scenarios
//!
//! Benchmark scenario documents embedded in the library at compile time,
//! so an engine can start from a known network without shipping files.

use std::sync::LazyLock;

use crate::error::ScenarioError;
use crate::scenario::loader::{LoadResult, ScenarioLoader};

/// Largest edit distance for which a name suggestion is offered.
const MAX_SUGGESTION_DISTANCE: usize = 3;

// ============================================================================
// Types
// ============================================================================

/// A built-in scenario embedded in the library.
#[derive(Debug)]
pub struct BuiltinScenario {
    /// Unique identifier (kebab-case, e.g., "single-site").
    pub name: &'static str,

    /// Short human-readable description.
    pub description: &'static str,

    /// Raw YAML content (embedded at compile time).
    pub yaml: &'static str,
}

// ============================================================================
// Registry
// ============================================================================

static BUILTIN_SCENARIOS: LazyLock<Vec<BuiltinScenario>> = LazyLock::new(|| {
    vec![
        BuiltinScenario {
            name: "single-site",
            description: "One 16-host subnet behind a perimeter firewall, two sensitive hosts",
            yaml: include_str!("../../scenarios/single-site.yaml"),
        },
        BuiltinScenario {
            name: "tiny",
            description: "Three single-host subnets: a DMZ in front of two internal subnets",
            yaml: include_str!("../../scenarios/tiny.yaml"),
        },
    ]
});

// ============================================================================
// Public API
// ============================================================================

/// Look up a built-in scenario by exact name.
#[must_use]
pub fn find_builtin(name: &str) -> Option<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS.iter().find(|s| s.name == name)
}

/// All built-in scenarios in registry order.
#[must_use]
pub fn list_builtin() -> Vec<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS.iter().collect()
}

/// Suggest a similar built-in name for typo correction.
///
/// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
#[must_use]
pub fn suggest_builtin(input: &str) -> Option<String> {
    BUILTIN_SCENARIOS
        .iter()
        .map(|s| (s.name, strsim::damerau_levenshtein(input, s.name)))
        .filter(|(_, dist)| *dist <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}

/// Loads a built-in scenario with the given loader.
///
/// # Errors
///
/// Returns [`ScenarioError::UnknownBuiltin`] (with a suggestion when one
/// is close) if no scenario has that name, or the loader's error if the
/// embedded document fails to load.
pub fn load_builtin(name: &str, loader: &ScenarioLoader) -> Result<LoadResult, ScenarioError> {
    let Some(builtin) = find_builtin(name) else {
        return Err(ScenarioError::UnknownBuiltin {
            name: name.to_string(),
            suggestion: suggest_builtin(name),
        });
    };
    tracing::debug!(name = builtin.name, "loading built-in scenario");
    loader.load_from_str(builtin.yaml)
}

// ============================================================================
// Tests
// ============================================================================
