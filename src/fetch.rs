//! Loading history pages in a real browser.
//!
//! The table on the history site is rendered client side, so a plain HTTP
//! GET only returns an empty shell. [`ChromeFetcher`] drives Chrome through
//! the DevTools protocol and hands back the page source once the
//! observation table exists.

use std::{sync::Arc, time::Duration};

use headless_chrome::{util::Wait, Browser, LaunchOptions, Tab};
use miette::Diagnostic;
use thiserror::Error;
use time::Date;

use crate::{config::BrowserConfig, dates, extract::TABLE_SELECTOR};

/// Source of rendered history pages, one per date.
pub trait PageFetcher {
    /// Load the page for `date` and return its HTML once the observation
    /// table is present.
    fn fetch(&mut self, date: Date) -> Result<String, FetchError>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &mut F {
    fn fetch(&mut self, date: Date) -> Result<String, FetchError> {
        (**self).fetch(date)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("Could not start the browser: {reason}")]
    #[diagnostic(
        code(weather_history::fetch::launch),
        help("point --chrome (or CHROME_PATH) at a Chrome or Chromium executable")
    )]
    Launch { reason: String },
    #[error("Could not load `{url}`: {reason}")]
    #[diagnostic(code(weather_history::fetch::navigation))]
    Navigation { url: String, reason: String },
    #[error("Observation table for {date} did not appear within {timeout:?}")]
    #[diagnostic(code(weather_history::fetch::page_not_ready))]
    PageNotReady { date: Date, timeout: Duration },
    #[error("Could not read the page source of `{url}`: {reason}")]
    #[diagnostic(code(weather_history::fetch::content))]
    Content { url: String, reason: String },
    #[error("Lost the browser session: {reason}")]
    #[diagnostic(
        code(weather_history::fetch::session_lost),
        help("the browser exited or stopped answering; output already written is left untouched")
    )]
    SessionLost { reason: String },
}

impl FetchError {
    /// Whether the whole run has to stop, as opposed to a single date.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FetchError::Launch { .. } | FetchError::SessionLost { .. }
        )
    }

    /// The page could not be transferred at all, as opposed to loading
    /// without the table.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Navigation { .. } | FetchError::Content { .. }
        )
    }
}

/// `<base_url>/<YYYY-MM-DD>`
pub fn history_url(base_url: &str, date: Date) -> Result<String, time::error::Format> {
    Ok(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        dates::iso(date)?
    ))
}

/// A table hidden with `display: none` still has a box model, but an empty one.
fn has_area(width: f64, height: f64) -> bool {
    width > 0.0 && height > 0.0
}

/// A single Chrome session with one tab, reused for every date.
///
/// The browser process is killed when the fetcher is dropped.
pub struct ChromeFetcher {
    base_url: String,
    ready_timeout: Duration,
    // Dropped before the browser it belongs to.
    tab: Arc<Tab>,
    browser: Browser,
}

impl ChromeFetcher {
    pub fn launch(base_url: &str, config: &BrowserConfig) -> Result<Self, FetchError> {
        let launch_error = |reason: String| FetchError::Launch { reason };

        let options = LaunchOptions::default_builder()
            .path(config.chrome_path.clone())
            .headless(config.headless)
            .window_size(Some(config.window_size))
            .idle_browser_timeout(config.ready_timeout.max(Duration::from_secs(60)))
            .build()
            .map_err(|e| launch_error(e.to_string()))?;
        let browser = Browser::new(options).map_err(|e| launch_error(e.to_string()))?;
        let tab = browser.new_tab().map_err(|e| launch_error(e.to_string()))?;

        log::info!(
            "browser session started ({})",
            if config.headless { "headless" } else { "windowed" }
        );

        Ok(Self {
            base_url: base_url.to_string(),
            ready_timeout: config.ready_timeout,
            tab,
            browser,
        })
    }
}

impl ChromeFetcher {
    /// Turn a failed DevTools call into `SessionLost` when the browser itself
    /// no longer answers, otherwise into the per-page error `other` builds.
    fn page_error(
        &self,
        reason: String,
        other: impl FnOnce(String) -> FetchError,
    ) -> FetchError {
        match self.browser.get_version() {
            Ok(_) => other(reason),
            Err(e) => FetchError::SessionLost {
                reason: format!("{reason} ({e})"),
            },
        }
    }

    /// Wait until the table is in the DOM and laid out with a non-empty box.
    fn wait_for_visible_table(&self) -> bool {
        let tab = &self.tab;
        Wait::with_timeout(self.ready_timeout)
            .until(|| {
                tab.find_element(TABLE_SELECTOR)
                    .ok()
                    .and_then(|table| table.get_box_model().ok())
                    .filter(|model| has_area(model.width, model.height))
            })
            .is_ok()
    }
}

impl PageFetcher for ChromeFetcher {
    fn fetch(&mut self, date: Date) -> Result<String, FetchError> {
        let url = history_url(&self.base_url, date).map_err(|e| FetchError::Navigation {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        log::debug!("loading {url}");

        if let Err(e) = self
            .tab
            .navigate_to(&url)
            .and_then(|tab| tab.wait_until_navigated())
        {
            return Err(self.page_error(e.to_string(), |reason| FetchError::Navigation {
                url: url.clone(),
                reason,
            }));
        }

        if !self.wait_for_visible_table() {
            log::debug!("no visible {TABLE_SELECTOR} on {url}");
            return Err(FetchError::PageNotReady {
                date,
                timeout: self.ready_timeout,
            });
        }

        match self.tab.get_content() {
            Ok(source) => Ok(source),
            Err(e) => Err(self.page_error(e.to_string(), |reason| FetchError::Content {
                url,
                reason,
            })),
        }
    }
}

impl Drop for ChromeFetcher {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(true) {
            log::debug!("closing tab: {e}");
        }
        log::info!("browser session closed");
    }
}
