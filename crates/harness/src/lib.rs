//! GTFS Editor E2E Harness
//!
//! This crate provides the core of a browser-driven end-to-end test suite
//! for the GTFS editor web application:
//! - Owns a single headless Chromium session for the whole run
//! - Registers named test cases with explicit dependency lists
//! - Executes them strictly sequentially with fail-fast cascading
//! - Polls the app's job monitor for asynchronous backend jobs
//! - Forwards in-page coverage counters to a local collector
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     E2E Suite Runner                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Suite (orchestrator)                                       │
//! │    ├── register(TestCase { name, body, timeout, deps })     │
//! │    ├── run(ctx) -> SuiteReport                              │
//! │    │     ├── gate: failing-fast / dependency results        │
//! │    │     ├── body(ctx) under timeout                        │
//! │    │     └── failure: screenshot → coverage → fail-fast     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RunContext                                                 │
//! │    ├── Session (Chromium, one page, event log)              │
//! │    ├── JobPoller (job-monitor UI polling)                   │
//! │    ├── CoverageReporter (POST counters to collector)        │
//! │    ├── RunState (result map + fail-fast flag)               │
//! │    └── Fixtures (ids discovered from rendered links)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifacts;
pub mod config;
pub mod context;
pub mod coverage;
pub mod discover;
pub mod error;
pub mod jobs;
pub mod runner;
pub mod session;
pub mod state;

pub use artifacts::RunArtifacts;
pub use config::{Credentials, RunConfig, Timeouts};
pub use context::{Fixtures, RunContext};
pub use coverage::CoverageReporter;
pub use error::{HarnessError, HarnessResult};
pub use jobs::JobPoller;
pub use runner::{CaseReport, Suite, SuiteReport};
pub use session::Session;
pub use state::{DependencySet, RunState, TestCase, WorkflowFn};
