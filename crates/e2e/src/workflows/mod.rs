//! Workflow scripts, one module per application area
//!
//! Every public function here has the `WorkflowFn` shape: it takes the run
//! context and returns a boxed future, so it can be registered directly as
//! a test case body.

pub mod auth;
pub mod deployment;
pub mod editor;
pub mod feeds;
pub mod patterns;
pub mod projects;

/// Confirmation dialog used by every destructive action in the app
pub(crate) const MODAL_CONFIRM: &str = "[data-test-id=\"modal-confirm-ok-button\"]";
