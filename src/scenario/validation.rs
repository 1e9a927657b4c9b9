//! Scenario validation
//!
//! Structural, cross-reference, and range checks on a deserialized
//! [`ScenarioDocument`]. Validation collects ALL issues rather than
//! stopping at the first one, so a broken scenario can be fixed in a
//! single pass.

use std::collections::HashSet;

use crate::error::{IssueKind, Severity, ValidationIssue};
use crate::scenario::loader::ScenarioLimits;
use crate::scenario::schema::{ANY_OS, OsTarget, ScenarioDocument, parse_pair};

/// Largest edit distance for which a did-you-mean hint is offered.
const MAX_HINT_DISTANCE: usize = 2;

// ============================================================================
// Public API
// ============================================================================

/// Result of scenario validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational unless strict).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Scenario validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a scenario document and returns every issue found.
    pub fn validate(
        &mut self,
        doc: &ScenarioDocument,
        limits: &ScenarioLimits,
    ) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        let layout = Layout::new(&doc.subnets);

        self.validate_subnets(doc, &layout, limits);
        self.validate_topology(doc);
        self.validate_catalogs(doc);
        self.validate_sensitive_hosts(doc, &layout);
        self.validate_exploits(doc, limits);
        self.validate_scan_costs(doc);
        self.validate_host_configurations(doc, &layout, limits);
        self.validate_firewall(doc);
        self.validate_step_limit(doc);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Network Layout
    // ========================================================================

    fn validate_subnets(&mut self, doc: &ScenarioDocument, layout: &Layout, limits: &ScenarioLimits) {
        if doc.subnets.is_empty() {
            self.add_error(IssueKind::Schema, "subnets", "At least one subnet is required");
            return;
        }

        for (idx, &size) in doc.subnets.iter().enumerate() {
            if size <= 0 {
                self.add_error(
                    IssueKind::Range,
                    &format!("subnets[{idx}]"),
                    &format!("Subnet size must be a positive integer, got {size}"),
                );
            }
        }

        if doc.subnets.len() > limits.max_subnets {
            self.add_error(
                IssueKind::Range,
                "subnets",
                &format!(
                    "Too many subnets: {} (limit: {})",
                    doc.subnets.len(),
                    limits.max_subnets
                ),
            );
        }

        if layout.total_hosts > limits.max_hosts {
            self.add_error(
                IssueKind::Range,
                "subnets",
                &format!(
                    "Too many hosts: {} (limit: {})",
                    layout.total_hosts, limits.max_hosts
                ),
            );
        }
    }

    fn validate_topology(&mut self, doc: &ScenarioDocument) {
        let expected = doc.subnets.len() + 1;
        let topology = &doc.topology;

        if topology.len() != expected {
            self.add_error(
                IssueKind::Schema,
                "topology",
                &format!(
                    "Topology must have one row per subnet plus the attacker origin: \
                     {} rows != {expected}",
                    topology.len()
                ),
            );
        }

        for (i, row) in topology.iter().enumerate() {
            if row.len() != expected {
                self.add_error(
                    IssueKind::Schema,
                    &format!("topology[{i}]"),
                    &format!(
                        "Topology row must have one column per subnet plus the attacker \
                         origin: {} columns != {expected}",
                        row.len()
                    ),
                );
            }
            for (j, &cell) in row.iter().enumerate() {
                if cell != 0 && cell != 1 {
                    self.add_error(
                        IssueKind::Range,
                        &format!("topology[{i}][{j}]"),
                        &format!("Topology entries must be 0 or 1, got {cell}"),
                    );
                }
            }
        }

        for i in 0..topology.len() {
            // Diagonal entry for a real subnet
            if i > 0 && topology[i].get(i) == Some(&0) {
                self.add_warning(
                    IssueKind::Schema,
                    &format!("topology[{i}][{i}]"),
                    &format!("Subnet {i} is not marked as reachable from itself"),
                );
            }
            for j in (i + 1)..topology.len() {
                let (Some(a), Some(b)) = (topology[i].get(j), topology[j].get(i)) else {
                    continue;
                };
                if a != b {
                    self.add_warning(
                        IssueKind::Schema,
                        &format!("topology[{i}][{j}]"),
                        &format!(
                            "Topology is not symmetric: [{i}][{j}] = {a} but [{j}][{i}] = {b}"
                        ),
                    );
                }
            }
        }
    }

    // ========================================================================
    // Catalogs
    // ========================================================================

    fn validate_catalogs(&mut self, doc: &ScenarioDocument) {
        for (field, label, catalog) in [
            ("services", "service", &doc.services),
            ("os", "OS", &doc.os),
        ] {
            if catalog.is_empty() {
                self.add_error(
                    IssueKind::Schema,
                    field,
                    &format!("At least one {label} must be declared"),
                );
            }

            let mut seen = HashSet::new();
            for (idx, name) in catalog.iter().enumerate() {
                if !seen.insert(name) {
                    self.add_error(
                        IssueKind::Schema,
                        &format!("{field}[{idx}]"),
                        &format!("Duplicate {label} '{name}'"),
                    );
                }
            }
        }

        for (idx, name) in doc.os.iter().enumerate() {
            if name == ANY_OS {
                self.add_error(
                    IssueKind::Schema,
                    &format!("os[{idx}]"),
                    &format!("'{ANY_OS}' is reserved for OS-independent entries"),
                );
            }
        }
    }

    // ========================================================================
    // Hosts
    // ========================================================================

    fn validate_sensitive_hosts(&mut self, doc: &ScenarioDocument, layout: &Layout) {
        let sensitive = &doc.sensitive_hosts;

        if sensitive.is_empty() {
            self.add_error(
                IssueKind::Schema,
                "sensitive_hosts",
                "At least one sensitive host is required",
            );
        }

        if sensitive.len() > layout.total_hosts {
            self.add_error(
                IssueKind::Range,
                "sensitive_hosts",
                &format!(
                    "More sensitive hosts than hosts in the network: {} > {}",
                    sensitive.len(),
                    layout.total_hosts
                ),
            );
        }

        let mut seen = HashSet::new();
        for (key, &value) in sensitive {
            let path = format!("sensitive_hosts.{key}");

            if let Some(pair) = self.resolve_address(key, &path, layout) {
                if !seen.insert(pair) {
                    self.add_error(
                        IssueKind::Schema,
                        &path,
                        &format!("Duplicate sensitive host address {key}"),
                    );
                }
            }

            if !value.is_finite() || value <= 0.0 {
                self.add_error(
                    IssueKind::Range,
                    &path,
                    &format!("Sensitive host reward must be a positive number, got {value}"),
                );
            }
        }
    }

    fn validate_host_configurations(
        &mut self,
        doc: &ScenarioDocument,
        layout: &Layout,
        limits: &ScenarioLimits,
    ) {
        let mut seen = HashSet::new();

        for (key, host) in &doc.host_configurations {
            let path = format!("host_configurations.{key}");

            if let Some(pair) = self.resolve_address(key, &path, layout) {
                if !seen.insert(pair) {
                    self.add_error(
                        IssueKind::Schema,
                        &path,
                        &format!("Duplicate host configuration for address {key}"),
                    );
                }
            }

            if host.services.is_empty() {
                self.add_error(
                    IssueKind::Schema,
                    &format!("{path}.services"),
                    "Host must run at least one service",
                );
            }

            self.check_service_list(&host.services, &doc.services, &format!("{path}.services"));
            self.check_os(&host.os, &doc.os, &format!("{path}.os"));
        }

        // Enumerating the address space is only safe once its size is bounded
        if layout.is_enumerable(limits) {
            for (subnet, host) in layout.addresses() {
                if !seen.contains(&(subnet, host)) {
                    self.add_error(
                        IssueKind::Reference,
                        "host_configurations",
                        &format!("Missing configuration for host ({subnet}, {host})"),
                    );
                }
            }
        }
    }

    /// Parses an address key and checks it resolves to a declared host.
    ///
    /// Returns the parsed pair whenever the key is well-formed, so callers
    /// can still detect duplicates among unresolved addresses.
    fn resolve_address(&mut self, key: &str, path: &str, layout: &Layout) -> Option<(i64, i64)> {
        let Some((subnet, host)) = parse_pair(key) else {
            self.add_error(
                IssueKind::Schema,
                path,
                &format!("Malformed host address '{key}', expected '(subnet, host)'"),
            );
            return None;
        };

        match layout.subnet_size(subnet) {
            None => self.add_error(
                IssueKind::Reference,
                path,
                &format!(
                    "Subnet {subnet} does not exist (valid subnets: 1..={})",
                    layout.sizes.len()
                ),
            ),
            Some(size) if host < 0 || host >= size => self.add_error(
                IssueKind::Reference,
                path,
                &format!("Host {host} does not exist in subnet {subnet} (size {size})"),
            ),
            Some(_) => {}
        }

        Some((subnet, host))
    }

    // ========================================================================
    // Exploits and Costs
    // ========================================================================

    fn validate_exploits(&mut self, doc: &ScenarioDocument, limits: &ScenarioLimits) {
        if doc.exploits.is_empty() {
            self.add_error(IssueKind::Schema, "exploits", "At least one exploit is required");
        }

        if doc.exploits.len() > limits.max_exploits {
            self.add_error(
                IssueKind::Range,
                "exploits",
                &format!(
                    "Too many exploits: {} (limit: {})",
                    doc.exploits.len(),
                    limits.max_exploits
                ),
            );
        }

        for (name, exploit) in &doc.exploits {
            let path = format!("exploits.{name}");

            if !doc.services.contains(&exploit.service) {
                self.add_error(
                    IssueKind::Reference,
                    &format!("{path}.service"),
                    &unknown_entry("service", &exploit.service, &doc.services),
                );
            }

            self.check_os(&exploit.os, &doc.os, &format!("{path}.os"));

            if !(exploit.prob > 0.0 && exploit.prob <= 1.0) {
                self.add_error(
                    IssueKind::Range,
                    &format!("{path}.prob"),
                    &format!(
                        "Exploit probability must be in (0, 1], got {}",
                        exploit.prob
                    ),
                );
            }

            self.check_positive(exploit.cost, &format!("{path}.cost"), "Exploit cost");
        }
    }

    fn validate_scan_costs(&mut self, doc: &ScenarioDocument) {
        self.check_positive(doc.service_scan_cost, "service_scan_cost", "Service scan cost");
        self.check_positive(doc.os_scan_cost, "os_scan_cost", "OS scan cost");
        self.check_positive(doc.subnet_scan_cost, "subnet_scan_cost", "Subnet scan cost");
    }

    fn validate_step_limit(&mut self, doc: &ScenarioDocument) {
        if doc.step_limit <= 0 {
            self.add_error(
                IssueKind::Range,
                "step_limit",
                &format!("Step limit must be a positive integer, got {}", doc.step_limit),
            );
        }
    }

    // ========================================================================
    // Firewall
    // ========================================================================

    fn validate_firewall(&mut self, doc: &ScenarioDocument) {
        let max_subnet = doc.subnets.len();
        let mut links = HashSet::new();

        for (key, allowed) in &doc.firewall {
            let path = format!("firewall.{key}");

            match parse_pair(key) {
                None => self.add_error(
                    IssueKind::Schema,
                    &path,
                    &format!("Malformed firewall link '{key}', expected '(subnet, subnet)'"),
                ),
                Some((src, dst)) => {
                    let in_range = |s: i64| usize::try_from(s).is_ok_and(|s| s <= max_subnet);
                    if !in_range(src) || !in_range(dst) {
                        self.add_error(
                            IssueKind::Reference,
                            &path,
                            &format!(
                                "Firewall link references unknown subnet (valid: 0..={max_subnet})"
                            ),
                        );
                    } else if src == dst || !topology_connects(&doc.topology, src, dst) {
                        self.add_warning(
                            IssueKind::Reference,
                            &path,
                            "Firewall entry for a link the topology does not connect has no effect",
                        );
                    }

                    if !links.insert((src, dst)) {
                        self.add_error(
                            IssueKind::Schema,
                            &path,
                            &format!("Duplicate firewall entry for link {key}"),
                        );
                    }
                }
            }

            self.check_service_list(allowed, &doc.services, &path);
        }

        // Both directions of every connected link need an explicit rule
        let mut reported = HashSet::new();
        for (src, row) in doc.topology.iter().enumerate() {
            for (dst, &cell) in row.iter().enumerate() {
                if src == dst || cell != 1 {
                    continue;
                }
                for (a, b) in [(src, dst), (dst, src)] {
                    let (Ok(a64), Ok(b64)) = (i64::try_from(a), i64::try_from(b)) else {
                        continue;
                    };
                    if !links.contains(&(a64, b64)) && reported.insert((a, b)) {
                        self.add_error(
                            IssueKind::Reference,
                            "firewall",
                            &format!("Missing firewall entry for connected link ({a}, {b})"),
                        );
                    }
                }
            }
        }
    }

    // ========================================================================
    // Shared Checks
    // ========================================================================

    /// Checks a list of services against the catalog and for duplicates.
    fn check_service_list(&mut self, services: &[String], catalog: &[String], path: &str) {
        let mut seen = HashSet::new();
        for (idx, service) in services.iter().enumerate() {
            let item_path = format!("{path}[{idx}]");
            if !catalog.contains(service) {
                self.add_error(
                    IssueKind::Reference,
                    &item_path,
                    &unknown_entry("service", service, catalog),
                );
            }
            if !seen.insert(service) {
                self.add_error(
                    IssueKind::Schema,
                    &item_path,
                    &format!("Duplicate service '{service}'"),
                );
            }
        }
    }

    fn check_os(&mut self, os: &OsTarget, catalog: &[String], path: &str) {
        if let OsTarget::Named(name) = os {
            if !catalog.contains(name) {
                self.add_error(IssueKind::Reference, path, &unknown_entry("OS", name, catalog));
            }
        }
    }

    fn check_positive(&mut self, value: f64, path: &str, label: &str) {
        if !value.is_finite() || value <= 0.0 {
            self.add_error(
                IssueKind::Range,
                path,
                &format!("{label} must be a positive number, got {value}"),
            );
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, kind: IssueKind, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
            kind,
        });
    }

    fn add_warning(&mut self, kind: IssueKind, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
            kind,
        });
    }
}

// ============================================================================
// Helper Types
// ============================================================================

/// Subnet sizes as declared, with totals that ignore invalid entries.
struct Layout {
    sizes: Vec<i64>,
    total_hosts: usize,
}

impl Layout {
    fn new(subnets: &[i64]) -> Self {
        let total_hosts = subnets
            .iter()
            .filter_map(|&s| usize::try_from(s).ok())
            .fold(0usize, usize::saturating_add);
        Self {
            sizes: subnets.to_vec(),
            total_hosts,
        }
    }

    /// Size of a declared subnet (1-based), or `None` if it does not exist.
    fn subnet_size(&self, subnet: i64) -> Option<i64> {
        let idx = usize::try_from(subnet).ok()?.checked_sub(1)?;
        self.sizes.get(idx).copied()
    }

    fn is_enumerable(&self, limits: &ScenarioLimits) -> bool {
        self.total_hosts <= limits.max_hosts
    }

    /// Every declared `(subnet, host)` pair, in order.
    fn addresses(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        (1_i64..)
            .zip(&self.sizes)
            .flat_map(|(subnet, &size)| (0..size.max(0)).map(move |host| (subnet, host)))
    }
}

fn topology_connects(topology: &[Vec<i64>], src: i64, dst: i64) -> bool {
    let (Ok(src), Ok(dst)) = (usize::try_from(src), usize::try_from(dst)) else {
        return false;
    };
    topology.get(src).and_then(|row| row.get(dst)) == Some(&1)
}

/// Builds an "unknown entry" message with a did-you-mean hint when a
/// catalog entry is close enough.
fn unknown_entry(label: &str, value: &str, catalog: &[String]) -> String {
    let hint = catalog
        .iter()
        .map(|c| (c, strsim::damerau_levenshtein(value, c)))
        .filter(|(_, dist)| *dist <= MAX_HINT_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(c, _)| format!(" (did you mean '{c}'?)"))
        .unwrap_or_default();
    format!("Unknown {label} '{value}'{hint}")
}

// ============================================================================
// Tests
// ============================================================================
