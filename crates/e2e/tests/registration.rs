//! Suite registration self-checks
//!
//! The orchestrator trusts declaration order, so a misordered or misspelled
//! dependency would only surface at run time against a live backend. These
//! checks catch that class of mistake without a browser.

use std::collections::HashSet;

use editor_e2e::build_suite;
use editor_e2e_harness::RunConfig;

#[test]
fn suite_builds_with_unique_names() {
    // register() rejects duplicates, so a successful build is the check.
    let suite = build_suite(&RunConfig::default()).unwrap();
    assert!(suite.cases().len() >= 15, "suite lost test cases");
}

#[test]
fn every_dependency_is_declared_earlier() {
    let suite = build_suite(&RunConfig::default()).unwrap();
    let mut seen: HashSet<&str> = HashSet::new();

    for case in suite.cases() {
        for dependency in &case.dependencies {
            assert!(
                seen.contains(dependency.as_str()),
                "`{}` depends on `{}`, which is not declared earlier",
                case.name,
                dependency
            );
        }
        seen.insert(&case.name);
    }
}

#[test]
fn login_runs_first_and_gates_everything_else() {
    let suite = build_suite(&RunConfig::default()).unwrap();
    let cases = suite.cases();

    assert_eq!(cases[0].name, "login");
    assert!(cases[0].dependencies.is_empty());

    for case in &cases[1..] {
        assert!(
            case.dependencies.iter().any(|dep| dep == "login"),
            "`{}` does not depend on login",
            case.name
        );
    }
}

#[test]
fn job_bound_workflows_get_job_headroom() {
    let config = RunConfig::default();
    let suite = build_suite(&config).unwrap();

    for name in ["upload-gtfs", "open-editor", "create-deployment"] {
        let case = suite
            .cases()
            .iter()
            .find(|case| case.name == name)
            .unwrap_or_else(|| panic!("`{name}` missing from suite"));
        assert!(
            case.timeout > config.timeouts.job,
            "`{name}` timeout does not cover the job timeout"
        );
    }
}
