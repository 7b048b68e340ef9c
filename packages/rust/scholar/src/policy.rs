//! Navigation policy for the Scholar origin.
//!
//! The desktop original let its webviews navigate within
//! `scholar.google.com` and handed every other URL to the system browser.
//! The same host rule decides what belongs to the result pane here.

use url::Url;

/// The one host result pages come from.
pub const SCHOLAR_HOST: &str = "scholar.google.com";

/// Where a URL should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Scholar itself: ours to load.
    Stay,
    /// Anything else: external, opened elsewhere.
    External,
}

/// Classify a URL against the Scholar host.
pub fn classify(url: &Url) -> Navigation {
    classify_against(url, SCHOLAR_HOST)
}

/// Classify a URL against a specific host (the configured Scholar origin).
pub fn classify_against(url: &Url, host: &str) -> Navigation {
    match url.host_str() {
        Some(h) if h == host => Navigation::Stay,
        _ => Navigation::External,
    }
}
