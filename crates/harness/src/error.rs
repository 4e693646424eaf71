//! Error types for the e2e harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("failing fast due to an earlier test failure")]
    FailingFast,

    #[error("dependent test `{dependency}` not completed before `{test}`")]
    DependencyNotMet { test: String, dependency: String },

    #[error("duplicate test name: {0}")]
    DuplicateTest(String),

    #[error("no elements matched selector `{0}`")]
    ElementNotFound(String),

    #[error("attribute `{attribute}` missing on `{selector}`")]
    AttributeMissing { selector: String, attribute: String },

    #[error("entity `{0}` not found among rendered links")]
    EntityNotFound(String),

    #[error("fixture `{0}` has not been discovered yet")]
    FixtureMissing(&'static str),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("no browser session attached to this run")]
    NoSession,

    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

impl HarnessError {
    /// True for failures raised before a test body runs. These skip the
    /// failure screenshot (there is nothing on screen worth capturing).
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            HarnessError::FailingFast | HarnessError::DependencyNotMet { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_classification() {
        assert!(HarnessError::FailingFast.is_precondition());
        assert!(HarnessError::DependencyNotMet {
            test: "b".into(),
            dependency: "a".into()
        }
        .is_precondition());
        assert!(!HarnessError::Timeout("jobs".into()).is_precondition());
        assert!(!HarnessError::ElementNotFound("#x".into()).is_precondition());
    }

    #[test]
    fn dependency_error_names_both_tests() {
        let err = HarnessError::DependencyNotMet {
            test: "create-feed-source".into(),
            dependency: "create-project".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("create-project"));
        assert!(msg.contains("create-feed-source"));
        assert!(msg.contains("not completed"));
    }

    #[test]
    fn element_error_names_selector() {
        let err = HarnessError::ElementNotFound("[data-test-id=\"save\"]".into());
        assert!(err.to_string().contains("[data-test-id=\"save\"]"));
    }
}
