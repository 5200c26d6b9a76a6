#![warn(missing_docs)]
//! # safe-harbor-privacy
//!
//! ## Purpose
//! Implements the quick-exit path and the advisory privacy mode for
//! `safe-harbor` sessions.
//!
//! ## Responsibilities
//! - Bind the Escape key to an unconditional quick exit.
//! - Navigate to the decoy route, then collapse client-side history.
//! - Redirect the decoy page to an external neutral site after a short delay.
//! - Hold the session-wide incognito flag.
//!
//! ## Data flow
//! Key press or exit button -> [`EscapeController::trigger_exit`] ->
//! [`BrowsingContext::navigate`] to the decoy route -> best-effort
//! [`EscapeController::clear_history`]. The shell then mounts a [`DecoyPage`]
//! whose [`DecoyPage::on_tick`] performs the external redirect.
//!
//! ## Ownership and lifetimes
//! The controller owns only its configuration. The browsing context is borrowed
//! for the duration of one call, so the controller never retains navigation
//! state between events.
//!
//! ## Error model
//! History manipulation and top-level redirects report [`HistoryError`], but
//! [`EscapeController::trigger_exit`] and [`DecoyPage::on_tick`] swallow and log
//! those failures: the navigation to the decoy route is the safety guarantee,
//! the scrub is defense-in-depth. Configuration problems surface as
//! [`PrivacyError`].
//!
//! ## Security and privacy notes
//! Nothing here touches application data. Logs carry route names only, never
//! the user's full location history.
//!
//! ## Example
//! ```rust
//! use safe_harbor_privacy::{
//!     BrowsingContext, EscapeController, InMemoryBrowsingContext, Key, KeyEvent,
//! };
//!
//! let mut browser = InMemoryBrowsingContext::new("/");
//! browser.navigate("/report");
//! let controller = EscapeController::new();
//! controller.handle_key(KeyEvent::plain(Key::Escape), &mut browser);
//! assert_eq!(browser.location(), "/exit");
//! ```

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Route of the neutral decoy page.
pub const DECOY_ROUTE: &str = "/exit";

/// External site the decoy page hands the browsing context to.
pub const DEFAULT_DECOY_URL: &str = "https://weather.gov";

/// Delay between reaching the decoy page and the external redirect.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(100);

/// Upper bound for the decoy redirect delay (exclusive).
pub const MAX_REDIRECT_DELAY: Duration = Duration::from_millis(1_000);

/// Keyboard keys the shell forwards to the privacy provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Escape key, bound to quick exit.
    Escape,
    /// Enter/Return.
    Enter,
    /// Tab.
    Tab,
    /// Any printable character.
    Char(char),
    /// Any other named key.
    Other(String),
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift held.
    pub shift: bool,
    /// Control held.
    pub ctrl: bool,
    /// Alt/Option held.
    pub alt: bool,
    /// Meta/Command held.
    pub meta: bool,
}

/// One key press delivered by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Pressed key.
    pub key: Key,
    /// Modifiers held during the press.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Builds an event without modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }
}

/// What the privacy provider did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The key was bound to quick exit and the exit ran.
    ExitTriggered,
    /// The key is not bound; the view may handle it.
    Ignored,
}

/// Navigation surface the escape path drives.
///
/// Implementations wrap the host's router and session history. `navigate` is
/// infallible: moving to an in-app route must always succeed. History and
/// top-level operations may be refused by the environment.
pub trait BrowsingContext {
    /// Performs an in-app navigation, pushing a history entry for `route`.
    fn navigate(&mut self, route: &str);

    /// Returns the current location.
    fn location(&self) -> &str;

    /// Returns the zero-based position of the current history entry.
    fn position(&self) -> usize;

    /// Returns the number of session history entries.
    fn len(&self) -> usize;

    /// Returns `true` when the history holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves `delta` entries through history.
    ///
    /// # Errors
    /// Returns [`HistoryError`] when the move is refused or out of range.
    fn go(&mut self, delta: isize) -> Result<(), HistoryError>;

    /// Overwrites the current history entry.
    ///
    /// # Errors
    /// Returns [`HistoryError::Denied`] when the environment refuses.
    fn replace_state(&mut self, location: &str) -> Result<(), HistoryError>;

    /// Pushes a new entry after the current one, discarding forward entries.
    ///
    /// # Errors
    /// Returns [`HistoryError::Denied`] when the environment refuses.
    fn push_state(&mut self, location: &str) -> Result<(), HistoryError>;

    /// Hands the top-level browsing context to an external URL.
    ///
    /// # Errors
    /// Returns [`HistoryError::Denied`] when the environment refuses.
    fn assign_top_level(&mut self, url: &Url) -> Result<(), HistoryError>;
}

/// Session history simulation used by the terminal shell and tests.
#[derive(Debug, Clone)]
pub struct InMemoryBrowsingContext {
    entries: Vec<String>,
    index: usize,
    deny_history: bool,
    external: Option<Url>,
}

impl InMemoryBrowsingContext {
    /// Creates a history with one entry at `start`.
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            entries: vec![start.into()],
            index: 0,
            deny_history: false,
            external: None,
        }
    }

    /// Creates a context whose history API and top-level redirects always
    /// refuse, like a locked-down embedded browser.
    pub fn locked_down(start: impl Into<String>) -> Self {
        Self {
            deny_history: true,
            ..Self::new(start)
        }
    }

    /// Returns all history entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Returns the external URL the context was handed to, if any.
    pub fn external_location(&self) -> Option<&Url> {
        self.external.as_ref()
    }

    /// Returns `true` when any reachable entry other than the current one
    /// differs from `route`.
    pub fn can_reach_other_than(&self, route: &str) -> bool {
        self.entries
            .iter()
            .enumerate()
            .any(|(index, entry)| index != self.index && entry != route)
    }

    fn guard(&self) -> Result<(), HistoryError> {
        if self.deny_history {
            return Err(HistoryError::Denied(
                "history manipulation is disabled in this context".to_string(),
            ));
        }
        Ok(())
    }
}

impl BrowsingContext for InMemoryBrowsingContext {
    fn navigate(&mut self, route: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(route.to_string());
        self.index = self.entries.len() - 1;
    }

    fn location(&self) -> &str {
        &self.entries[self.index]
    }

    fn position(&self) -> usize {
        self.index
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn go(&mut self, delta: isize) -> Result<(), HistoryError> {
        self.guard()?;
        let target = self
            .index
            .checked_add_signed(delta)
            .filter(|target| *target < self.entries.len())
            .ok_or(HistoryError::OutOfRange {
                delta,
                len: self.entries.len(),
            })?;
        self.index = target;
        Ok(())
    }

    fn replace_state(&mut self, location: &str) -> Result<(), HistoryError> {
        self.guard()?;
        self.entries[self.index] = location.to_string();
        Ok(())
    }

    fn push_state(&mut self, location: &str) -> Result<(), HistoryError> {
        self.guard()?;
        self.navigate(location);
        Ok(())
    }

    fn assign_top_level(&mut self, url: &Url) -> Result<(), HistoryError> {
        self.guard()?;
        self.external = Some(url.clone());
        Ok(())
    }
}

/// Quick-exit controller bound for the lifetime of the privacy provider.
#[derive(Debug, Clone)]
pub struct EscapeController {
    decoy_route: String,
}

impl EscapeController {
    /// Creates a controller targeting [`DECOY_ROUTE`].
    pub fn new() -> Self {
        Self {
            decoy_route: DECOY_ROUTE.to_string(),
        }
    }

    /// Creates a controller targeting a custom in-app decoy route.
    ///
    /// # Errors
    /// Returns [`PrivacyError::InvalidDecoyRoute`] unless `route` is an
    /// absolute in-app path.
    pub fn with_decoy_route(route: impl Into<String>) -> Result<Self, PrivacyError> {
        let route = route.into();
        if !route.starts_with('/') || route.starts_with("//") {
            return Err(PrivacyError::InvalidDecoyRoute(route));
        }
        Ok(Self { decoy_route: route })
    }

    /// Returns the decoy route this controller navigates to.
    pub fn decoy_route(&self) -> &str {
        &self.decoy_route
    }

    /// Dispatches one key press.
    ///
    /// Escape triggers the exit regardless of modifiers; no confirmation.
    pub fn handle_key(
        &self,
        event: KeyEvent,
        context: &mut dyn BrowsingContext,
    ) -> KeyDisposition {
        if event.key != Key::Escape {
            return KeyDisposition::Ignored;
        }
        self.trigger_exit(context);
        KeyDisposition::ExitTriggered
    }

    /// Leaves the application for the decoy route, then scrubs history.
    ///
    /// Never fails to the caller. A refused scrub is logged and ignored since
    /// the navigation has already happened.
    pub fn trigger_exit(&self, context: &mut dyn BrowsingContext) {
        context.navigate(&self.decoy_route);
        debug!(route = %self.decoy_route, "quick exit navigated to decoy route");

        if let Err(error) = self.clear_history(context) {
            warn!(%error, "could not clear history after quick exit");
        }
    }

    /// Collapses session history onto the current entry.
    ///
    /// Walks back to the oldest reachable entry, overwrites it with the current
    /// location, then pushes the current location again so every forward entry
    /// is discarded. Afterwards "back" lands on the same neutral location.
    ///
    /// # Errors
    /// Returns the first [`HistoryError`] the environment reports. Partial
    /// progress is not rolled back.
    pub fn clear_history(&self, context: &mut dyn BrowsingContext) -> Result<(), HistoryError> {
        let location = context.location().to_string();
        let depth = context.position();

        if depth > 0 {
            let delta = isize::try_from(depth).map_err(|_| HistoryError::OutOfRange {
                delta: isize::MIN,
                len: context.len(),
            })?;
            context.go(-delta)?;
        }
        context.replace_state(&location)?;
        context.push_state(&location)?;

        debug!(collapsed_entries = depth, "session history collapsed");
        Ok(())
    }
}

impl Default for EscapeController {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoy page state: waits briefly, then hands off to the external site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoyPage {
    target: Url,
    redirect_at_ms: u64,
    redirected: bool,
}

impl DecoyPage {
    /// Text shown while the redirect is pending.
    pub const MESSAGE: &'static str = "Redirecting...";

    /// Enters the decoy page at `now_ms`.
    pub fn enter(target: Url, delay: Duration, now_ms: u64) -> Self {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Self {
            target,
            redirect_at_ms: now_ms.saturating_add(delay_ms),
            redirected: false,
        }
    }

    /// Returns the external redirect target.
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Returns `true` once the redirect has been attempted.
    pub fn redirected(&self) -> bool {
        self.redirected
    }

    /// Fires the external redirect once the delay has elapsed.
    ///
    /// The redirect is attempted once. A refusal is logged and the page keeps
    /// showing [`DecoyPage::MESSAGE`].
    pub fn on_tick(&mut self, now_ms: u64, context: &mut dyn BrowsingContext) {
        if self.redirected || now_ms < self.redirect_at_ms {
            return;
        }
        self.redirected = true;

        if let Err(error) = context.assign_top_level(&self.target) {
            warn!(%error, "decoy page could not hand off to external site");
        }
    }
}

/// Session-wide advisory incognito flag.
///
/// Drives presentation only; it does not disable logging or tracking by
/// itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrivacyMode {
    incognito: bool,
}

impl PrivacyMode {
    /// Creates the flag in its default (inactive) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the flag.
    pub fn toggle(&mut self) {
        self.incognito = !self.incognito;
    }

    /// Returns `true` when incognito presentation is active.
    pub fn is_active(&self) -> bool {
        self.incognito
    }
}

/// Validates the external decoy target.
///
/// # Errors
/// Returns [`PrivacyError::InvalidDecoyUrl`] when the URL does not parse, is
/// not HTTPS, or has no host.
pub fn validate_decoy_url(raw: &str) -> Result<Url, PrivacyError> {
    let parsed = Url::parse(raw)
        .map_err(|error| PrivacyError::InvalidDecoyUrl(format!("invalid decoy url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(PrivacyError::InvalidDecoyUrl(
            "decoy url must use https".to_string(),
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(PrivacyError::InvalidDecoyUrl(
            "decoy url must name a host".to_string(),
        ));
    }

    Ok(parsed)
}

/// Validates the decoy redirect delay.
///
/// # Errors
/// Returns [`PrivacyError::RedirectDelayTooLong`] at or above
/// [`MAX_REDIRECT_DELAY`].
pub fn validate_redirect_delay(delay: Duration) -> Result<Duration, PrivacyError> {
    if delay >= MAX_REDIRECT_DELAY {
        return Err(PrivacyError::RedirectDelayTooLong(delay));
    }
    Ok(delay)
}

/// History/navigation refusals reported by a [`BrowsingContext`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Environment refused the history operation.
    #[error("history operation denied: {0}")]
    Denied(String),
    /// Requested history move leaves the session history.
    #[error("history move {delta} out of range for {len} entries")]
    OutOfRange {
        /// Requested move.
        delta: isize,
        /// History length at the time of the move.
        len: usize,
    },
}

/// Configuration errors for the escape path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrivacyError {
    /// External decoy target violates policy.
    #[error("{0}")]
    InvalidDecoyUrl(String),
    /// In-app decoy route is not an absolute path.
    #[error("invalid decoy route: {0}")]
    InvalidDecoyRoute(String),
    /// Redirect delay would leave the decoy page visible too long.
    #[error("redirect delay {0:?} must stay below one second")]
    RedirectDelayTooLong(Duration),
}
