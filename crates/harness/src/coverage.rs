//! In-page coverage forwarding
//!
//! The instrumented UI bundle accumulates coverage counters on `window`.
//! When coverage mode is enabled, the reporter extracts them and POSTs
//! them to the local collector after each navigation and after each test
//! outcome. The report is awaited; a collector error surfaces through the
//! enclosing test or navigation rather than being isolated.

use chromiumoxide::page::Page;
use tracing::debug;

use crate::error::HarnessResult;

/// Expression extracting the in-page counter object, or null when the
/// bundle is not instrumented.
const COVERAGE_EXPR: &str = "window.__coverage__ ? window.__coverage__ : null";

#[derive(Debug, Clone)]
pub struct CoverageReporter {
    enabled: bool,
    endpoint: String,
    client: reqwest::Client,
}

impl CoverageReporter {
    pub fn new(enabled: bool, endpoint: &str) -> Self {
        Self {
            enabled,
            endpoint: endpoint.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// A reporter that never touches the page or the network
    pub fn disabled() -> Self {
        Self::new(false, "")
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Extract the page's coverage counters and forward them to the
    /// collector. No-op when coverage mode is off or the page carries no
    /// counters.
    pub async fn report(&self, page: &Page) -> HarnessResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let counters: serde_json::Value = page.evaluate(COVERAGE_EXPR).await?.into_value()?;
        if counters.is_null() {
            debug!("no coverage counters on page");
            return Ok(());
        }

        self.client
            .post(&self.endpoint)
            .json(&counters)
            .send()
            .await?
            .error_for_status()?;
        debug!(endpoint = %self.endpoint, "coverage reported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_reporter_is_flagged_off() {
        assert!(!CoverageReporter::disabled().is_enabled());
        assert!(CoverageReporter::new(true, "http://localhost:9999/coverage/client").is_enabled());
    }
}
