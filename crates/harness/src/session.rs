//! Remote browser session driver
//!
//! One Chromium process and one page, exclusively owned by the run. Every
//! workflow step goes through this wrapper; workflow scripts never touch
//! the CDP connection directly. Each operation logs its intent and
//! duration, and in-page console output is mirrored to the browser-event
//! log as JSON lines.

use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use regex::Regex;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::coverage::CoverageReporter;
use crate::error::{HarnessError, HarnessResult};

/// Interval between element-appearance polls
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A rendered link, as seen by entity discovery
#[derive(Debug, Clone, Deserialize)]
pub struct PageLink {
    pub text: String,
    pub href: String,
}

/// Stateful driver for the run's single browser session
pub struct Session {
    browser: Browser,
    page: Page,
    coverage: CoverageReporter,
    base_url: String,
    element_timeout: Duration,
    settle_delay: Duration,
    handler_task: JoinHandle<()>,
    events_task: Option<JoinHandle<()>>,
}

impl Session {
    /// Launch Chromium, open the run's page, and start mirroring console
    /// events to `browser_log`.
    pub async fn launch(
        config: &RunConfig,
        coverage: CoverageReporter,
        browser_log: &Path,
    ) -> HarnessResult<Self> {
        let mut builder = BrowserConfig::builder().window_size(1280, 800).no_sandbox();
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(HarnessError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        let events_task = Self::spawn_event_logger(&page, browser_log).await?;

        Ok(Self {
            browser,
            page,
            coverage,
            base_url: config.base_url.clone(),
            element_timeout: config.timeouts.element,
            settle_delay: config.timeouts.settle,
            handler_task,
            events_task: Some(events_task),
        })
    }

    /// Mirror in-page console calls to the browser-event log
    async fn spawn_event_logger(page: &Page, path: &Path) -> HarnessResult<JoinHandle<()>> {
        let mut events = page.event_listener::<EventConsoleApiCalled>().await?;
        let mut log = std::fs::File::create(path)?;

        Ok(tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let args: Vec<serde_json::Value> = event
                    .args
                    .iter()
                    .map(|arg| {
                        arg.value.clone().unwrap_or_else(|| {
                            serde_json::Value::String(
                                arg.description.clone().unwrap_or_default(),
                            )
                        })
                    })
                    .collect();
                let entry = serde_json::json!({
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                    "kind": format!("{:?}", event.r#type),
                    "args": args,
                });
                if writeln!(log, "{entry}").is_err() {
                    break;
                }
            }
        }))
    }

    /// The run's page, for coverage extraction
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate to a path under the app origin (or an absolute URL).
    ///
    /// Coverage for the page being left is reported before navigating; a
    /// fixed settle delay runs after arrival so the SPA can mount.
    pub async fn goto(&self, path: &str) -> HarnessResult<()> {
        let started = Instant::now();
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        };
        debug!(%url, "navigate");

        self.coverage.report(&self.page).await?;
        self.page.goto(url.clone()).await?;
        self.page.wait_for_navigation().await?;
        sleep(self.settle_delay).await;

        debug!(%url, elapsed_ms = elapsed_ms(started), "navigate done");
        Ok(())
    }

    /// Reload the current page. Same contract as `goto`: coverage for the
    /// outgoing page is reported first, and the settle delay runs after
    /// arrival.
    pub async fn reload(&self) -> HarnessResult<()> {
        let started = Instant::now();
        debug!("reload");

        self.coverage.report(&self.page).await?;
        self.page.reload().await?;
        sleep(self.settle_delay).await;

        debug!(elapsed_ms = elapsed_ms(started), "reload done");
        Ok(())
    }

    /// Wait for `selector` to be present and visible, under the default
    /// element timeout.
    pub async fn wait_for_selector(&self, selector: &str) -> HarnessResult<()> {
        self.wait_for_selector_with(selector, self.element_timeout, true)
            .await
    }

    /// Wait for `selector`, with explicit timeout and visibility
    /// requirement. Attached-but-hidden elements satisfy the wait only
    /// when `visible` is false.
    pub async fn wait_for_selector_with(
        &self,
        selector: &str,
        timeout: Duration,
        visible: bool,
    ) -> HarnessResult<()> {
        let started = Instant::now();
        debug!(%selector, ?timeout, visible, "wait for selector");

        let expr = if visible {
            format!(
                "(() => {{ const el = document.querySelector({sel}); if (!el) return false; \
                 const style = window.getComputedStyle(el); \
                 return style.display !== 'none' && style.visibility !== 'hidden'; }})()",
                sel = js_string(selector)
            )
        } else {
            format!("!!document.querySelector({})", js_string(selector))
        };

        loop {
            let found: bool = self.evaluate(&expr).await?;
            if found {
                debug!(%selector, elapsed_ms = elapsed_ms(started), "selector appeared");
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(HarnessError::Timeout(format!(
                    "selector `{selector}` after {timeout:?}"
                )));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Click the first element matching `selector`
    pub async fn click(&self, selector: &str) -> HarnessResult<()> {
        let started = Instant::now();
        debug!(%selector, "click");

        self.wait_for_selector(selector).await?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| HarnessError::ElementNotFound(selector.to_string()))?;
        element.click().await?;

        debug!(%selector, elapsed_ms = elapsed_ms(started), "click done");
        Ok(())
    }

    /// Type `text` into the element matching `selector`, clearing any
    /// existing value first when `clear` is set.
    pub async fn type_text(&self, selector: &str, text: &str, clear: bool) -> HarnessResult<()> {
        let started = Instant::now();
        debug!(%selector, clear, "type text");

        self.wait_for_selector(selector).await?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| HarnessError::ElementNotFound(selector.to_string()))?;
        element.click().await?;

        if clear {
            let expr = format!(
                "(() => {{ const el = document.querySelector({sel}); if (!el) return false; \
                 el.value = ''; el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 return true; }})()",
                sel = js_string(selector)
            );
            let cleared: bool = self.evaluate(&expr).await?;
            if !cleared {
                return Err(HarnessError::ElementNotFound(selector.to_string()));
            }
        }

        element.type_str(text).await?;

        debug!(%selector, elapsed_ms = elapsed_ms(started), "type done");
        Ok(())
    }

    /// Send a named key (Tab, Enter, Escape, ...) to the element matching
    /// `selector`.
    pub async fn press_key(&self, selector: &str, key: &str) -> HarnessResult<()> {
        let started = Instant::now();
        debug!(%selector, %key, "press key");

        self.wait_for_selector(selector).await?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| HarnessError::ElementNotFound(selector.to_string()))?;
        element.click().await?;
        element.press_key(key).await?;

        debug!(%selector, %key, elapsed_ms = elapsed_ms(started), "press done");
        Ok(())
    }

    /// Read the inner markup of the first element matching `selector`,
    /// stripped of framework-injected comment markers so content
    /// assertions are comment-agnostic.
    pub async fn inner_html(&self, selector: &str) -> HarnessResult<String> {
        let started = Instant::now();
        debug!(%selector, "read inner html");

        self.wait_for_selector(selector).await?;
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return el ? el.innerHTML : null; }})()",
            sel = js_string(selector)
        );
        let html: Option<String> = self.evaluate(&expr).await?;
        let html = html.ok_or_else(|| HarnessError::ElementNotFound(selector.to_string()))?;

        debug!(%selector, elapsed_ms = elapsed_ms(started), "read done");
        Ok(strip_comment_markers(&html))
    }

    /// Read the current value of the form control matching `selector`
    pub async fn input_value(&self, selector: &str) -> HarnessResult<String> {
        self.wait_for_selector(selector).await?;
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return el ? String(el.value) : null; }})()",
            sel = js_string(selector)
        );
        let value: Option<String> = self.evaluate(&expr).await?;
        value.ok_or_else(|| HarnessError::ElementNotFound(selector.to_string()))
    }

    /// Whether the checkbox matching `selector` is checked
    pub async fn is_checked(&self, selector: &str) -> HarnessResult<bool> {
        self.wait_for_selector(selector).await?;
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return el ? !!el.checked : null; }})()",
            sel = js_string(selector)
        );
        let checked: Option<bool> = self.evaluate(&expr).await?;
        checked.ok_or_else(|| HarnessError::ElementNotFound(selector.to_string()))
    }

    /// Enumerate the rendered text of every element matching `selector`.
    /// Zero matches is an error, never an empty result.
    pub async fn all_text(&self, selector: &str) -> HarnessResult<Vec<String>> {
        let started = Instant::now();
        debug!(%selector, "enumerate elements");

        let expr = format!(
            "Array.from(document.querySelectorAll({sel})).map(el => el.innerText || '')",
            sel = js_string(selector)
        );
        let texts: Vec<String> = self.evaluate(&expr).await?;
        if texts.is_empty() {
            return Err(HarnessError::ElementNotFound(selector.to_string()));
        }

        debug!(%selector, count = texts.len(), elapsed_ms = elapsed_ms(started), "enumerated");
        Ok(texts)
    }

    /// Enumerate every rendered link matching `selector` as {text, href}
    /// pairs. Zero matches is an error.
    pub async fn links(&self, selector: &str) -> HarnessResult<Vec<PageLink>> {
        let started = Instant::now();
        debug!(%selector, "enumerate links");

        let expr = format!(
            "Array.from(document.querySelectorAll({sel})).map(a => \
             ({{ text: a.innerText || '', href: a.getAttribute('href') || '' }}))",
            sel = js_string(selector)
        );
        let links: Vec<PageLink> = self.evaluate(&expr).await?;
        if links.is_empty() {
            return Err(HarnessError::ElementNotFound(selector.to_string()));
        }

        debug!(%selector, count = links.len(), elapsed_ms = elapsed_ms(started), "enumerated");
        Ok(links)
    }

    /// Read the href attribute of the first element matching `selector`
    pub async fn href(&self, selector: &str) -> HarnessResult<String> {
        self.wait_for_selector(selector).await?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| HarnessError::ElementNotFound(selector.to_string()))?;
        element
            .attribute("href")
            .await?
            .ok_or_else(|| HarnessError::AttributeMissing {
                selector: selector.to_string(),
                attribute: "href".to_string(),
            })
    }

    /// Evaluate a JavaScript expression in the page and deserialize its
    /// result
    pub async fn evaluate<T: serde::de::DeserializeOwned>(&self, expr: &str) -> HarnessResult<T> {
        Ok(self.page.evaluate(expr).await?.into_value::<T>()?)
    }

    /// Capture a full-page screenshot to `path`
    pub async fn screenshot(&self, path: &Path) -> HarnessResult<()> {
        let started = Instant::now();
        debug!(path = %path.display(), "screenshot");

        self.page
            .save_screenshot(
                ScreenshotParams::builder().full_page(true).build(),
                path,
            )
            .await?;

        debug!(path = %path.display(), elapsed_ms = elapsed_ms(started), "screenshot done");
        Ok(())
    }

    /// Attach a local file to the file input matching `selector`
    pub async fn upload_file(&self, selector: &str, file: &Path) -> HarnessResult<()> {
        let started = Instant::now();
        debug!(%selector, file = %file.display(), "upload file");

        self.wait_for_selector_with(selector, self.element_timeout, false)
            .await?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| HarnessError::ElementNotFound(selector.to_string()))?;
        let params = SetFileInputFilesParams::builder()
            .file(file.display().to_string())
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(HarnessError::Config)?;
        self.page.execute(params).await?;

        debug!(%selector, elapsed_ms = elapsed_ms(started), "upload done");
        Ok(())
    }

    /// Assert that the normalized inner markup of `selector` contains
    /// `needle`
    pub async fn expect_text(&self, selector: &str, needle: &str) -> HarnessResult<()> {
        let html = self.inner_html(selector).await?;
        if html.contains(needle) {
            Ok(())
        } else {
            Err(HarnessError::Assertion(format!(
                "expected `{selector}` to contain `{needle}`, got `{html}`"
            )))
        }
    }

    /// Close the browser and stop the event tasks. Best-effort; called
    /// once at run teardown.
    pub async fn close(mut self) {
        if let Some(task) = self.events_task.take() {
            task.abort();
        }
        if let Err(err) = self.browser.close().await {
            warn!(%err, "browser close failed");
        }
        if let Err(err) = self.browser.wait().await {
            warn!(%err, "browser did not exit cleanly");
        }
        self.handler_task.abort();
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Quote a string as a JavaScript string literal
fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Strip framework-injected comment markers (`<!-- ... -->`) from rendered
/// markup so content assertions do not depend on them.
pub fn strip_comment_markers(html: &str) -> String {
    static MARKERS: OnceLock<Regex> = OnceLock::new();
    let markers = MARKERS.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"));
    markers.replace_all(html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_reactish_comment_markers() {
        let html = "<span><!-- react-text: 14 -->5:00<!-- /react-text --> AM</span>";
        assert_eq!(strip_comment_markers(html), "<span>5:00 AM</span>");
    }

    #[test]
    fn strips_multiline_comments() {
        let html = "before<!-- a\nmultiline\ncomment -->after";
        assert_eq!(strip_comment_markers(html), "beforeafter");
    }

    #[test]
    fn leaves_plain_markup_alone() {
        let html = "<div class=\"feed-name\">test feed</div>";
        assert_eq!(strip_comment_markers(html), html);
    }

    #[test]
    fn js_string_escapes_quotes_and_backslashes() {
        assert_eq!(js_string("a'b"), r"'a\'b'");
        assert_eq!(js_string(r"a\b"), r"'a\\b'");
        assert_eq!(
            js_string("[data-test-id=\"save-button\"]"),
            "'[data-test-id=\"save-button\"]'"
        );
    }
}
