//! Shared helpers for scenario loader integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tracing::Level;

use netscen::observability::{ColorChoice, LogFormat, init_logging};
use netscen::{LoadResult, LoaderOptions, ScenarioError, ScenarioLoader};

/// Returns the path to a test fixture.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Returns the path to a bundled scenario file.
#[must_use]
pub fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

/// Loads a fixture with default options.
pub fn load_fixture(name: &str) -> Result<LoadResult, ScenarioError> {
    init_test_logging();
    ScenarioLoader::with_defaults().load(&fixture_path(name))
}

/// Loads a fixture in strict mode.
pub fn load_fixture_strict(name: &str) -> Result<LoadResult, ScenarioError> {
    init_test_logging();
    let loader = ScenarioLoader::new(LoaderOptions {
        strict: true,
        ..LoaderOptions::default()
    });
    loader.load(&fixture_path(name))
}

/// Installs a quiet subscriber so `NETSCEN_LOG_LEVEL` works in tests.
pub fn init_test_logging() {
    init_logging(LogFormat::Human, Level::WARN, ColorChoice::Never);
}
