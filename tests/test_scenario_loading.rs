mod common;

use std::collections::BTreeMap;

use common::{fixture_path, load_fixture, load_fixture_strict, scenario_path};
use netscen::builtin::load_builtin;
use netscen::{Address, IssueKind, OsTarget, ScenarioError, ScenarioLoader, Severity};

// ============================================================================
// Bundled benchmark scenario
// ============================================================================

#[test]
fn single_site_matches_benchmark_shape() {
    let result = ScenarioLoader::with_defaults()
        .load(&scenario_path("single-site.yaml"))
        .expect("single-site should load");
    let scenario = &result.scenario;

    assert_eq!(scenario.subnets(), &[16]);
    assert_eq!(scenario.subnet_size(1), Some(16));
    assert_eq!(scenario.num_hosts(), 16);
    assert_eq!(scenario.exploits().len(), 5);
    assert_eq!(scenario.step_limit(), 2000);

    let expected: BTreeMap<Address, f64> = [
        (Address::new(1, 3), 100.0),
        (Address::new(1, 8), 100.0),
    ]
    .into_iter()
    .collect();
    assert_eq!(scenario.sensitive_hosts(), &expected);
}

#[test]
fn single_site_builtin_equals_file() {
    let loader = ScenarioLoader::with_defaults();
    let from_file = loader.load(&scenario_path("single-site.yaml")).unwrap();
    let builtin = load_builtin("single-site", &loader).unwrap();
    assert_eq!(*from_file.scenario, *builtin.scenario);
}

#[test]
fn hosts_reference_declared_catalogs() {
    let loader = ScenarioLoader::with_defaults();
    for name in ["single-site", "tiny"] {
        let scenario = load_builtin(name, &loader).unwrap().scenario;
        for host in scenario.hosts().values() {
            if let OsTarget::Named(os) = &host.os {
                assert!(scenario.os().contains(os), "{name}: host {} os {os}", host.address);
            }
            for service in &host.services {
                assert!(
                    scenario.services().contains(service),
                    "{name}: host {} service {service}",
                    host.address
                );
            }
        }
    }
}

#[test]
fn exploits_within_domain() {
    let loader = ScenarioLoader::with_defaults();
    for name in ["single-site", "tiny"] {
        let scenario = load_builtin(name, &loader).unwrap().scenario;
        for exploit in scenario.exploits().values() {
            assert!(exploit.prob > 0.0 && exploit.prob <= 1.0, "{}", exploit.name);
            assert!(exploit.cost > 0.0, "{}", exploit.name);
        }
    }
}

#[test]
fn sensitive_hosts_resolve_to_hosts() {
    let loader = ScenarioLoader::with_defaults();
    for name in ["single-site", "tiny"] {
        let scenario = load_builtin(name, &loader).unwrap().scenario;
        for (address, &reward) in scenario.sensitive_hosts() {
            let host = scenario.host(*address).expect("sensitive host must exist");
            assert!(host.is_sensitive());
            assert!((host.value - reward).abs() < f64::EPSILON);
        }
    }
}

#[test]
fn address_space_matches_hosts() {
    let scenario = load_builtin("tiny", &ScenarioLoader::with_defaults())
        .unwrap()
        .scenario;
    let declared: Vec<Address> = scenario.hosts().keys().copied().collect();
    assert_eq!(scenario.address_space(), declared);
    assert_eq!(
        declared,
        vec![Address::new(1, 0), Address::new(2, 0), Address::new(3, 0)]
    );
}

#[test]
fn tiny_topology_and_firewall() {
    let scenario = load_builtin("tiny", &ScenarioLoader::with_defaults())
        .unwrap()
        .scenario;

    assert_eq!(scenario.subnet_size(0), Some(1));
    assert_eq!(scenario.subnet_size(4), None);
    assert!(scenario.subnets_connected(0, 1));
    assert!(!scenario.subnets_connected(0, 2));
    assert!(scenario.subnets_connected(2, 3));

    assert!(scenario.firewall_allows(0, 1, "http"));
    assert!(!scenario.firewall_allows(0, 1, "ssh"));
    assert!(!scenario.firewall_allows(1, 0, "http"));
    assert!(scenario.firewall_allows(1, 2, "ftp"));
    assert!(!scenario.firewall_allows(2, 1, "ftp"));
    // No entry: nothing allowed
    assert!(scenario.allowed_services(0, 3).is_empty());
}

#[test]
fn applicable_exploits_respect_os() {
    let scenario = load_builtin("tiny", &ScenarioLoader::with_defaults())
        .unwrap()
        .scenario;

    // (2, 0) runs ssh + ftp on windows: only the windows ftp exploit fits
    let host = scenario.host(Address::new(2, 0)).unwrap();
    let names: Vec<&str> = scenario
        .applicable_exploits(host)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["e_ftp"]);

    // (1, 0) runs http; e_http targets any OS
    let host = scenario.host(Address::new(1, 0)).unwrap();
    let names: Vec<&str> = scenario
        .applicable_exploits(host)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["e_http"]);
}

#[test]
fn scenario_is_shareable_across_threads() {
    let scenario = load_builtin("single-site", &ScenarioLoader::with_defaults())
        .unwrap()
        .scenario;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let scenario = std::sync::Arc::clone(&scenario);
            std::thread::spawn(move || scenario.num_hosts())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 16);
    }
}

#[test]
fn summary_serializes_to_json() {
    let scenario = load_builtin("single-site", &ScenarioLoader::with_defaults())
        .unwrap()
        .scenario;
    let json = serde_json::to_value(scenario.summary()).unwrap();
    assert_eq!(json["hosts"], 16);
    assert_eq!(json["exploits"], 5);
    assert_eq!(json["step_limit"], 2000);
    assert_eq!(json["sensitive_hosts"][0]["subnet"], 1);
    assert_eq!(json["sensitive_hosts"][0]["host"], 3);
}

// ============================================================================
// Failure taxonomy
// ============================================================================

#[test]
fn undeclared_exploit_service_is_reference_error() {
    let err = load_fixture("telnet_exploit.yaml").unwrap_err();
    assert!(matches!(err, ScenarioError::Reference { .. }), "{err}");
    let issue = err
        .issues()
        .iter()
        .find(|i| i.path == "exploits.e_telnet.service")
        .expect("telnet issue reported");
    assert_eq!(issue.kind, IssueKind::Reference);
    assert!(issue.message.contains("telnet"));
}

#[test]
fn missing_key_is_schema_error() {
    let err = load_fixture("missing_step_limit.yaml").unwrap_err();
    assert_eq!(err.kind(), Some(IssueKind::Schema));
    assert!(err.to_string().contains("step_limit"), "{err}");
}

#[test]
fn out_of_domain_numbers_are_range_errors() {
    let err = load_fixture("bad_probability.yaml").unwrap_err();
    assert!(matches!(err, ScenarioError::Range { .. }), "{err}");
    let paths: Vec<&str> = err.issues().iter().map(|i| i.path.as_str()).collect();
    assert!(paths.contains(&"exploits.e_ssh.prob"), "{paths:?}");
    assert!(paths.contains(&"exploits.e_ssh.cost"), "{paths:?}");
}

#[test]
fn dangling_sensitive_host_is_reference_error() {
    let err = load_fixture("dangling_sensitive_host.yaml").unwrap_err();
    assert!(matches!(err, ScenarioError::Reference { .. }), "{err}");
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].path, "sensitive_hosts.(1, 5)");
}

#[test]
fn yaml_syntax_error_reports_line() {
    let err = load_fixture("bad_yaml.yaml").unwrap_err();
    match err {
        ScenarioError::Parse { line, .. } => assert!(line.is_some()),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn empty_file_rejected() {
    let err = load_fixture("empty.yaml").unwrap_err();
    assert!(err.to_string().contains("empty"), "{err}");
}

#[test]
fn missing_file_reported() {
    let err = ScenarioLoader::with_defaults()
        .load(&fixture_path("does_not_exist.yaml"))
        .unwrap_err();
    assert!(matches!(err, ScenarioError::MissingFile { .. }));
    assert_eq!(err.kind(), None);
}

#[test]
fn binary_content_rejected() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("binary.yaml");
    std::fs::write(&path, b"\x00\x01\x02\x03\xff\xfe\xfd\xfc").unwrap();

    let err = ScenarioLoader::with_defaults().load(&path).unwrap_err();
    assert!(matches!(err, ScenarioError::Parse { .. }), "{err}");
}

// ============================================================================
// Warnings and strict mode
// ============================================================================

#[test]
fn asymmetric_topology_loads_with_warning() {
    let result = load_fixture("asymmetric_topology.yaml").unwrap();
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.path == "topology[0][2]" && w.severity == Severity::Warning),
        "{:?}",
        result.warnings
    );
    assert!(result.scenario.subnets_connected(2, 0));
    assert!(!result.scenario.subnets_connected(0, 2));
}

#[test]
fn strict_mode_rejects_asymmetric_topology() {
    let err = load_fixture_strict("asymmetric_topology.yaml").unwrap_err();
    assert!(matches!(err, ScenarioError::Schema { .. }), "{err}");
    assert!(err.issues().iter().any(|i| i.path == "topology[0][2]"));
}
