//! Validated scenario model
//!
//! A [`Scenario`] is built only from a document that passed validation,
//! and nothing on it can be mutated afterwards. Simulation instances
//! share it behind an `Arc`.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::scenario::schema::{
    ExploitSpec, HostSpec, OsTarget, ScenarioDocument, format_pair, parse_pair,
};

// ============================================================================
// Addresses
// ============================================================================

/// A host address: `(subnet, host)`.
///
/// Subnet ids start at 1 (subnet 0 is the attacker origin); host ids start
/// at 0 within their subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Address {
    /// Subnet id
    pub subnet: usize,
    /// Host id within the subnet
    pub host: usize,
}

impl Address {
    /// Creates an address.
    #[must_use]
    pub const fn new(subnet: usize, host: usize) -> Self {
        Self { subnet, host }
    }

    /// Parses a `(subnet, host)` key. Negative components yield `None`.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        let (subnet, host) = parse_pair(key)?;
        Some(Self::new(
            usize::try_from(subnet).ok()?,
            usize::try_from(host).ok()?,
        ))
    }
}

impl From<(usize, usize)> for Address {
    fn from((subnet, host): (usize, usize)) -> Self {
        Self::new(subnet, host)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_pair(self.subnet, self.host))
    }
}

// ============================================================================
// Entities
// ============================================================================

/// An attacker action against a service/OS combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Exploit {
    /// Exploit name
    pub name: String,
    /// Target service
    pub service: String,
    /// Target OS
    pub os: OsTarget,
    /// Success probability, in `(0, 1]`
    pub prob: f64,
    /// Cost of an attempt, positive
    pub cost: f64,
}

impl Exploit {
    /// Returns `true` when the host runs the target service on a
    /// compatible OS.
    #[must_use]
    pub fn applies_to(&self, host: &Host) -> bool {
        host.runs(&self.service) && self.os.is_compatible_with(&host.os)
    }
}

/// A host and its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    /// Host address
    pub address: Address,
    /// Running services, in declaration order
    pub services: Vec<String>,
    /// Operating system
    pub os: OsTarget,
    /// Reward for compromising the host; `0.0` unless sensitive
    pub value: f64,
}

impl Host {
    /// Returns `true` when the host runs `service`.
    #[must_use]
    pub fn runs(&self, service: &str) -> bool {
        self.services.iter().any(|s| s == service)
    }

    /// Returns `true` for goal hosts.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.value > 0.0
    }
}

/// Costs of the three reconnaissance actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScanCosts {
    /// Service scan
    pub service: f64,
    /// OS scan
    pub os: f64,
    /// Subnet scan
    pub subnet: f64,
}

/// Short machine-readable description of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    /// Host count per subnet
    pub subnets: Vec<usize>,
    /// Total host count
    pub hosts: usize,
    /// Number of exploits
    pub exploits: usize,
    /// Number of services in the catalog
    pub services: usize,
    /// Sensitive host addresses
    pub sensitive_hosts: Vec<Address>,
    /// Episode horizon
    pub step_limit: u64,
}

// ============================================================================
// Scenario
// ============================================================================

/// A validated, immutable network-attack scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    subnets: Vec<usize>,
    topology: Vec<Vec<bool>>,
    services: Vec<String>,
    os: Vec<String>,
    exploits: IndexMap<String, Exploit>,
    hosts: BTreeMap<Address, Host>,
    sensitive_hosts: BTreeMap<Address, f64>,
    firewall: BTreeMap<(usize, usize), Vec<String>>,
    scan_costs: ScanCosts,
    step_limit: u64,
}

impl Scenario {
    /// Builds the model from a document that has already passed validation.
    pub(crate) fn from_document(doc: &ScenarioDocument) -> Self {
        let subnets: Vec<usize> = doc
            .subnets
            .iter()
            .map(|&size| usize::try_from(size).unwrap_or(0))
            .collect();

        let topology = doc
            .topology
            .iter()
            .map(|row| row.iter().map(|&cell| cell == 1).collect())
            .collect();

        let sensitive_hosts: BTreeMap<Address, f64> = doc
            .sensitive_hosts
            .iter()
            .filter_map(|(key, &value)| Some((Address::parse(key)?, value)))
            .collect();

        let hosts = doc
            .host_configurations
            .iter()
            .filter_map(|(key, HostSpec { services, os })| {
                let address = Address::parse(key)?;
                let host = Host {
                    address,
                    services: services.clone(),
                    os: os.clone(),
                    value: sensitive_hosts.get(&address).copied().unwrap_or(0.0),
                };
                Some((address, host))
            })
            .collect();

        let exploits = doc
            .exploits
            .iter()
            .map(|(name, spec)| {
                let exploit = Exploit {
                    name: name.clone(),
                    service: spec.service.clone(),
                    os: spec.os.clone(),
                    prob: spec.prob,
                    cost: spec.cost,
                };
                (name.clone(), exploit)
            })
            .collect();

        let firewall = doc
            .firewall
            .iter()
            .filter_map(|(key, allowed)| {
                let (src, dst) = parse_pair(key)?;
                let link = (usize::try_from(src).ok()?, usize::try_from(dst).ok()?);
                Some((link, allowed.clone()))
            })
            .collect();

        Self {
            subnets,
            topology,
            services: doc.services.clone(),
            os: doc.os.clone(),
            exploits,
            hosts,
            sensitive_hosts,
            firewall,
            scan_costs: ScanCosts {
                service: doc.service_scan_cost,
                os: doc.os_scan_cost,
                subnet: doc.subnet_scan_cost,
            },
            step_limit: u64::try_from(doc.step_limit).unwrap_or(0),
        }
    }

    // ------------------------------------------------------------------------
    // Network layout
    // ------------------------------------------------------------------------

    /// Host count per declared subnet (subnet 1 first).
    #[must_use]
    pub fn subnets(&self) -> &[usize] {
        &self.subnets
    }

    /// Number of declared subnets, excluding the attacker origin.
    #[must_use]
    pub fn num_subnets(&self) -> usize {
        self.subnets.len()
    }

    /// Host count of a subnet. Subnet 0 holds only the attacker.
    #[must_use]
    pub fn subnet_size(&self, subnet: usize) -> Option<usize> {
        match subnet {
            0 => Some(1),
            id => self.subnets.get(id - 1).copied(),
        }
    }

    /// Total number of hosts across all declared subnets.
    #[must_use]
    pub fn num_hosts(&self) -> usize {
        self.subnets.iter().sum()
    }

    /// Reachability matrix, including row/column 0 for the attacker origin.
    #[must_use]
    pub fn topology(&self) -> &[Vec<bool>] {
        &self.topology
    }

    /// Returns `true` when the topology connects `src` to `dst`.
    #[must_use]
    pub fn subnets_connected(&self, src: usize, dst: usize) -> bool {
        self.topology
            .get(src)
            .and_then(|row| row.get(dst))
            .copied()
            .unwrap_or(false)
    }

    /// Every declared host address, in subnet/host order.
    #[must_use]
    pub fn address_space(&self) -> Vec<Address> {
        self.subnets
            .iter()
            .enumerate()
            .flat_map(|(idx, &size)| (0..size).map(move |host| Address::new(idx + 1, host)))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Catalogs and hosts
    // ------------------------------------------------------------------------

    /// Service catalog, in declaration order.
    #[must_use]
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// OS catalog, in declaration order.
    #[must_use]
    pub fn os(&self) -> &[String] {
        &self.os
    }

    /// Exploit catalog, in declaration order.
    #[must_use]
    pub const fn exploits(&self) -> &IndexMap<String, Exploit> {
        &self.exploits
    }

    /// Looks up an exploit by name.
    #[must_use]
    pub fn exploit(&self, name: &str) -> Option<&Exploit> {
        self.exploits.get(name)
    }

    /// Exploits that can be launched against `host`.
    pub fn applicable_exploits<'a>(&'a self, host: &'a Host) -> impl Iterator<Item = &'a Exploit> {
        self.exploits.values().filter(move |e| e.applies_to(host))
    }

    /// All hosts, keyed by address.
    #[must_use]
    pub const fn hosts(&self) -> &BTreeMap<Address, Host> {
        &self.hosts
    }

    /// Looks up a host by address.
    #[must_use]
    pub fn host(&self, address: Address) -> Option<&Host> {
        self.hosts.get(&address)
    }

    /// Goal hosts and their rewards.
    #[must_use]
    pub const fn sensitive_hosts(&self) -> &BTreeMap<Address, f64> {
        &self.sensitive_hosts
    }

    // ------------------------------------------------------------------------
    // Firewall
    // ------------------------------------------------------------------------

    /// Firewall allow-lists keyed by directed `(src, dst)` link.
    #[must_use]
    pub const fn firewall(&self) -> &BTreeMap<(usize, usize), Vec<String>> {
        &self.firewall
    }

    /// Services allowed from `src` to `dst`. Links without an entry allow
    /// nothing.
    #[must_use]
    pub fn allowed_services(&self, src: usize, dst: usize) -> &[String] {
        self.firewall
            .get(&(src, dst))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns `true` when traffic for `service` may cross `src -> dst`.
    #[must_use]
    pub fn firewall_allows(&self, src: usize, dst: usize, service: &str) -> bool {
        self.allowed_services(src, dst).iter().any(|s| s == service)
    }

    // ------------------------------------------------------------------------
    // Costs and limits
    // ------------------------------------------------------------------------

    /// Reconnaissance costs.
    #[must_use]
    pub const fn scan_costs(&self) -> ScanCosts {
        self.scan_costs
    }

    /// Episode horizon.
    #[must_use]
    pub const fn step_limit(&self) -> u64 {
        self.step_limit
    }

    /// Summarises the scenario for logs and reports.
    #[must_use]
    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            subnets: self.subnets.clone(),
            hosts: self.num_hosts(),
            exploits: self.exploits.len(),
            services: self.services.len(),
            sensitive_hosts: self.sensitive_hosts.keys().copied().collect(),
            step_limit: self.step_limit,
        }
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Converts back to the document schema in canonical form.
    ///
    /// Catalogs and exploits keep declaration order; host-keyed maps and
    /// firewall links are emitted in address order.
    #[must_use]
    pub fn to_document(&self) -> ScenarioDocument {
        let to_i64 = |v: usize| i64::try_from(v).unwrap_or(i64::MAX);

        ScenarioDocument {
            subnets: self.subnets.iter().map(|&s| to_i64(s)).collect(),
            topology: self
                .topology
                .iter()
                .map(|row| row.iter().map(|&c| i64::from(c)).collect())
                .collect(),
            sensitive_hosts: self
                .sensitive_hosts
                .iter()
                .map(|(addr, &value)| (addr.to_string(), value))
                .collect(),
            services: self.services.clone(),
            os: self.os.clone(),
            exploits: self
                .exploits
                .iter()
                .map(|(name, e)| {
                    let spec = ExploitSpec {
                        service: e.service.clone(),
                        os: e.os.clone(),
                        prob: e.prob,
                        cost: e.cost,
                    };
                    (name.clone(), spec)
                })
                .collect(),
            service_scan_cost: self.scan_costs.service,
            os_scan_cost: self.scan_costs.os,
            subnet_scan_cost: self.scan_costs.subnet,
            host_configurations: self
                .hosts
                .iter()
                .map(|(addr, host)| {
                    let spec = HostSpec {
                        services: host.services.clone(),
                        os: host.os.clone(),
                    };
                    (addr.to_string(), spec)
                })
                .collect(),
            firewall: self
                .firewall
                .iter()
                .map(|(&(src, dst), allowed)| (format_pair(src, dst), allowed.clone()))
                .collect(),
            step_limit: i64::try_from(self.step_limit).unwrap_or(i64::MAX),
        }
    }

    /// Renders the canonical document as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_document())
    }
}
