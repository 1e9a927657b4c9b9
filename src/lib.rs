//! `netscen` - Network-attack simulation scenarios
//!
//! Loads declarative scenario documents (subnets, topology, hosts, exploits,
//! firewall rules, sensitive-host rewards) and turns them into a validated,
//! immutable [`Scenario`] that a simulation engine can share freely.

pub mod builtin;
pub mod error;
pub mod observability;
pub mod scenario;

pub use error::{IssueKind, ScenarioError, Severity, ValidationIssue};
pub use scenario::{
    Address, Exploit, Host, LoadResult, LoaderOptions, OsTarget, ScanCosts, Scenario,
    ScenarioLimits, ScenarioLoader,
};
