//! Test cases, shared run state, and dependency-set builders

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::context::RunContext;
use crate::error::{HarnessError, HarnessResult};

/// A registered test body. Plain function pointers keep registration free
/// of captured state; everything a workflow needs comes in through the
/// run context.
pub type WorkflowFn = for<'a> fn(&'a mut RunContext) -> BoxFuture<'a, HarnessResult<()>>;

/// One named test case. Immutable after registration.
pub struct TestCase {
    pub name: String,
    pub body: WorkflowFn,
    pub timeout: Duration,
    pub dependencies: Vec<String>,
}

impl TestCase {
    pub fn new(name: &str, body: WorkflowFn) -> Self {
        Self {
            name: name.to_string(),
            body,
            timeout: Duration::from_secs(120),
            dependencies: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn depends_on(mut self, dependencies: &DependencySet) -> Self {
        self.dependencies = dependencies.names().to_vec();
        self
    }
}

/// Shared pass/fail state for one run.
///
/// The result map is append-only and records only passes; a test that
/// failed (or never ran) simply has no entry. Dependency gating reads the
/// map, fail-fast short-circuits everything once armed.
#[derive(Debug, Default)]
pub struct RunState {
    results: BTreeMap<String, bool>,
    failing_fast: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate a test before its body runs: fail-fast first, then every
    /// declared dependency must have recorded a pass.
    pub fn check_ready(&self, test: &str, dependencies: &[String]) -> HarnessResult<()> {
        if self.failing_fast {
            return Err(HarnessError::FailingFast);
        }
        for dependency in dependencies {
            if self.results.get(dependency) != Some(&true) {
                return Err(HarnessError::DependencyNotMet {
                    test: test.to_string(),
                    dependency: dependency.clone(),
                });
            }
        }
        Ok(())
    }

    /// Record a passing result. Written once per test, never removed.
    pub fn record_pass(&mut self, name: &str) {
        self.results.insert(name.to_string(), true);
    }

    pub fn passed(&self, name: &str) -> bool {
        self.results.get(name) == Some(&true)
    }

    /// Short-circuit every remaining test
    pub fn arm_fail_fast(&mut self) {
        self.failing_fast = true;
    }

    pub fn failing_fast(&self) -> bool {
        self.failing_fast
    }
}

/// Composable dependency list for a test family.
///
/// Families extend one another ("all post-login tests depend on login";
/// "all editor tests additionally depend on the snapshot") by building a
/// merged, order-preserving, deduplicated name list.
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    names: Vec<String>,
}

impl DependencySet {
    /// The empty root family
    pub fn root() -> Self {
        Self::default()
    }

    /// A new family: this family's dependencies plus `extra`, preserving
    /// declaration order and dropping duplicates.
    pub fn with(&self, extra: &[&str]) -> Self {
        let mut names = self.names.clone();
        for name in extra {
            if !names.iter().any(|existing| existing == name) {
                names.push((*name).to_string());
            }
        }
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gating_requires_recorded_pass() {
        let mut state = RunState::new();
        let deps = vec!["login".to_string()];

        let err = state.check_ready("create-project", &deps).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::DependencyNotMet { ref dependency, .. } if dependency == "login"
        ));

        state.record_pass("login");
        state.check_ready("create-project", &deps).unwrap();
    }

    #[test]
    fn fail_fast_takes_precedence_over_dependencies() {
        let mut state = RunState::new();
        state.record_pass("login");
        state.arm_fail_fast();

        // Even with all dependencies satisfied, an armed cascade wins.
        let err = state
            .check_ready("create-project", &["login".to_string()])
            .unwrap_err();
        assert!(matches!(err, HarnessError::FailingFast));
    }

    #[test]
    fn results_record_only_passes() {
        let mut state = RunState::new();
        assert!(!state.passed("upload-gtfs"));
        state.record_pass("upload-gtfs");
        assert!(state.passed("upload-gtfs"));
    }

    #[test]
    fn dependency_sets_merge_in_declaration_order() {
        let root = DependencySet::root();
        let post_login = root.with(&["login"]);
        let editor = post_login.with(&["create-project", "open-editor"]);

        assert_eq!(editor.names(), &["login", "create-project", "open-editor"]);
        // The base family is unchanged by extension.
        assert_eq!(post_login.names(), &["login"]);
    }

    #[test]
    fn dependency_sets_deduplicate() {
        let family = DependencySet::root()
            .with(&["login", "create-project"])
            .with(&["login", "upload-gtfs"]);
        assert_eq!(
            family.names(),
            &["login", "create-project", "upload-gtfs"]
        );
    }
}
