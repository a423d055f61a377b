//! Repository preview images.
//!
//! GitHub serves social preview cards for any repository or commit page at
//! `https://opengraph.githubassets.com/<token>/<owner>/<repo>[/...]`. The
//! token segment is arbitrary; chat platforms cache images by URL, so a
//! fresh token forces them to fetch a current card.

use std::sync::LazyLock;
use std::time::SystemTime;

use regex::Regex;
use sha2::{Digest, Sha256};

use super::MediaReference;

/// Host serving the preview cards, including the trailing slash.
pub const PREVIEW_HOST: &str = "https://opengraph.githubassets.com/";

/// Length of the cache-busting token in hex characters.
pub const TOKEN_LEN: usize = 8;

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com(/.*)?$").expect("GitHub URL pattern is valid")
});

/// Source of the current time for time-seeded tokens.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// Clock reading [`SystemTime::now()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

/// Returns the page path following `https://github.com` in `url`.
///
/// `https://github.com/a/b` yields `/a/b`. Returns `None` when the URL is not
/// on github.com itself (a GitHub Enterprise host, or a host that merely
/// starts with `github.com`).
#[must_use]
pub fn github_path(url: &str) -> Option<&str> {
    GITHUB_URL
        .captures(url)
        .map(|c| c.get(1).map_or("", |m| m.as_str()))
}

/// Derives the cache-busting token: the first [`TOKEN_LEN`] hex characters
/// of the SHA-256 digest of `seed`.
#[must_use]
pub fn cache_token(seed: &str) -> String {
    let mut token = hex::encode(Sha256::digest(seed.as_bytes()));
    token.truncate(TOKEN_LEN);
    token
}

/// Builds the preview image for a GitHub page, seeded with `seed`.
#[must_use]
pub fn preview_image(page_url: &str, seed: &str) -> Option<MediaReference> {
    let path = github_path(page_url)?;
    Some(MediaReference::image(format!(
        "{PREVIEW_HOST}{}{path}",
        cache_token(seed)
    )))
}

/// Renders `clock`'s current time as a seed string.
#[must_use]
pub fn time_seed(clock: &dyn Clock) -> String {
    // Pre-epoch clocks collapse to 0; the token only needs to vary.
    clock
        .now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos())
        .to_string()
}
