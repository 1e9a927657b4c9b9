//! Scenario module
//!
//! Schema, validation, loading, and the validated in-memory model of a
//! network-attack scenario.

pub mod loader;
pub mod model;
pub mod schema;
pub mod validation;

pub use loader::{LoadResult, LoaderOptions, ScenarioLimits, ScenarioLoader};
pub use model::{Address, Exploit, Host, ScanCosts, Scenario, ScenarioSummary};
pub use schema::{ExploitSpec, HostSpec, OsTarget, ScenarioDocument};
pub use validation::{ValidationResult, Validator};
