#![warn(missing_docs)]
//! # safe-harbor-app
//!
//! ## Purpose
//! Orchestrates the privacy provider, route-scoped views, and artifact sinks
//! for one `safe-harbor` session.
//!
//! ## Responsibilities
//! - Mount the escape controller and privacy mode once per session.
//! - Map browsing-context locations to routes and mount one view per route.
//! - Own each form's draft for exactly as long as its route is active.
//! - Drive the decoy page redirect from the shell clock.
//! - Load runtime configuration and initialize logging.
//!
//! ## Data flow
//! Key press / view action -> [`AppShell`] -> privacy provider or mounted form
//! -> [`BrowsingContext`] / [`ExportSink`] -> view re-sync from the new
//! location -> [`ShellChrome`] and step indicators for rendering.
//!
//! ## Ownership and lifetimes
//! The shell owns the browsing context, the export sink, and the active view.
//! A form draft lives inside [`ActiveView`] and is dropped the moment another
//! route mounts, so abandoning a page discards its draft.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. The escape path never
//! returns an error; export and clipboard failures are also recorded in the
//! shell's [`ActionStatus`] so views can show them next to the action.
//!
//! ## Security and privacy notes
//! - Logs go to stderr only and never include field values.
//! - Quick exit runs before any view sees the key press.
//! - Configuration cannot disable the escape path: invalid values fall back to
//!   defaults in the binary.

use std::path::PathBuf;
use std::time::Duration;

use safe_harbor_artifact::{ArtifactError, Clipboard, ExportSink, ExportedDocument};
use safe_harbor_core::{CoreError, FieldKind, FieldValue, Fields, ReferenceId};
use safe_harbor_privacy::{
    BrowsingContext, DECOY_ROUTE, DEFAULT_DECOY_URL, DEFAULT_REDIRECT_DELAY, DecoyPage,
    EscapeController, HistoryError, KeyDisposition, KeyEvent, PrivacyError, PrivacyMode,
    validate_decoy_url, validate_redirect_delay,
};
use safe_harbor_ui::{ActionStatus, CopyIndicator, ShellChrome};
use safe_harbor_wizard::WizardError;
use safe_harbor_wizard::report::ReportForm;
use safe_harbor_wizard::safety_plan::SafetyPlanForm;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use url::Url;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("SAFE_HARBOR_VERSION");

/// Env var overriding the external decoy site.
pub const DECOY_URL_ENV: &str = "SAFE_HARBOR_DECOY_URL";

/// Env var overriding the decoy redirect delay in milliseconds.
pub const REDIRECT_DELAY_ENV: &str = "SAFE_HARBOR_REDIRECT_DELAY_MS";

/// Env var naming the directory that receives exported documents.
pub const EXPORT_DIR_ENV: &str = "SAFE_HARBOR_EXPORT_DIR";

/// Env var holding project-specific log directives.
pub const LOG_ENV: &str = "SAFE_HARBOR_LOG";

/// Log level used when no directive is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// External neutral site the decoy page redirects to.
    pub decoy_url: String,
    /// Delay between reaching the decoy page and the redirect.
    pub redirect_delay: Duration,
    /// Directory receiving exported documents.
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            decoy_url: DEFAULT_DECOY_URL.to_string(),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Loads configuration from process environment.
    ///
    /// # Errors
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`; unset or blank values keep their
    /// defaults.
    ///
    /// # Errors
    /// - [`ConfigError::Privacy`] for a non-HTTPS decoy URL or a delay of one
    ///   second or more.
    /// - [`ConfigError::Invalid`] for a delay that is not a whole number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = read(DECOY_URL_ENV) {
            validate_decoy_url(&raw)?;
            config.decoy_url = raw;
        }

        if let Some(raw) = read(REDIRECT_DELAY_ENV) {
            let millis = raw.parse::<u64>().map_err(|error| ConfigError::Invalid {
                name: REDIRECT_DELAY_ENV,
                reason: error.to_string(),
            })?;
            config.redirect_delay = validate_redirect_delay(Duration::from_millis(millis))?;
        }

        if let Some(raw) = read(EXPORT_DIR_ENV) {
            config.export_dir = PathBuf::from(raw);
        }

        Ok(config)
    }
}

/// Top-level routes of the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Landing page.
    Home,
    /// Incident report form.
    Report,
    /// Resource directory.
    Resources,
    /// Safety plan builder.
    SafetyPlan,
    /// Live support panel.
    LiveSupport,
    /// Neutral decoy page.
    Exit,
    /// Anything else.
    NotFound(String),
}

impl Route {
    /// Maps a location to a route; query strings and fragments are ignored.
    pub fn parse(location: &str) -> Self {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        match path {
            "/" | "" => Self::Home,
            "/report" => Self::Report,
            "/resources" => Self::Resources,
            "/safety-plan" => Self::SafetyPlan,
            "/live-support" => Self::LiveSupport,
            DECOY_ROUTE => Self::Exit,
            other => Self::NotFound(other.to_string()),
        }
    }

    /// Returns the canonical path of this route.
    pub fn path(&self) -> &str {
        match self {
            Self::Home => "/",
            Self::Report => "/report",
            Self::Resources => "/resources",
            Self::SafetyPlan => "/safety-plan",
            Self::LiveSupport => "/live-support",
            Self::Exit => DECOY_ROUTE,
            Self::NotFound(path) => path.as_str(),
        }
    }
}

/// Privacy provider mounted once per session.
#[derive(Debug, Clone, Default)]
pub struct SafetyProvider {
    privacy: PrivacyMode,
    escape: EscapeController,
}

impl SafetyProvider {
    /// Creates the provider with incognito off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the privacy mode for rendering.
    pub fn privacy(&self) -> &PrivacyMode {
        &self.privacy
    }

    /// Returns the bound escape controller.
    pub fn escape(&self) -> &EscapeController {
        &self.escape
    }

    /// Flips incognito mode and returns the new state.
    pub fn toggle_incognito(&mut self) -> bool {
        self.privacy.toggle();
        self.privacy.is_active()
    }

    /// Routes a key press through the escape binding.
    pub fn handle_key(
        &self,
        event: KeyEvent,
        context: &mut dyn BrowsingContext,
    ) -> KeyDisposition {
        self.escape.handle_key(event, context)
    }

    /// Runs the quick exit from the visible control.
    pub fn quick_exit(&self, context: &mut dyn BrowsingContext) {
        self.escape.trigger_exit(context);
    }
}

/// View mounted for the current route.
#[derive(Debug, Clone)]
pub enum ActiveView {
    /// Page without session state (home, resources, live support).
    Static(Route),
    /// Incident report with its draft.
    Report(ReportForm),
    /// Safety plan with its draft.
    SafetyPlan(SafetyPlanForm),
    /// Decoy page counting down to the external redirect.
    Exit(DecoyPage),
    /// Unknown location.
    NotFound(String),
}

impl ActiveView {
    /// Returns the route this view is mounted for.
    pub fn route(&self) -> Route {
        match self {
            Self::Static(route) => route.clone(),
            Self::Report(_) => Route::Report,
            Self::SafetyPlan(_) => Route::SafetyPlan,
            Self::Exit(_) => Route::Exit,
            Self::NotFound(path) => Route::NotFound(path.clone()),
        }
    }

    /// Returns `true` when the view holds a draft.
    pub fn holds_draft(&self) -> bool {
        matches!(self, Self::Report(_) | Self::SafetyPlan(_))
    }
}

/// Session shell owning navigation, the active view, and artifact sinks.
#[derive(Debug)]
pub struct AppShell<C, S> {
    provider: SafetyProvider,
    context: C,
    sink: S,
    decoy_url: Url,
    redirect_delay: Duration,
    view: ActiveView,
    copy_indicator: CopyIndicator,
    status: ActionStatus,
}

impl<C: BrowsingContext, S: ExportSink> AppShell<C, S> {
    /// Mounts the provider and the view for the context's current location.
    ///
    /// # Errors
    /// Returns [`AppError::Privacy`] when the decoy settings violate policy.
    pub fn new(config: &AppConfig, context: C, sink: S, now_ms: u64) -> Result<Self, AppError> {
        let decoy_url = validate_decoy_url(&config.decoy_url)?;
        let redirect_delay = validate_redirect_delay(config.redirect_delay)?;

        let mut shell = Self {
            provider: SafetyProvider::new(),
            context,
            sink,
            decoy_url,
            redirect_delay,
            view: ActiveView::NotFound(String::new()),
            copy_indicator: CopyIndicator::new(),
            status: ActionStatus::Idle,
        };
        let route = Route::parse(shell.context.location());
        shell.mount(route, now_ms);
        Ok(shell)
    }

    /// Navigates to `location` and mounts its view.
    pub fn navigate(&mut self, location: &str, now_ms: u64) {
        self.context.navigate(location);
        self.sync_view(now_ms);
    }

    /// Goes back one history entry.
    ///
    /// # Errors
    /// Returns [`AppError::History`] when there is no earlier entry or the
    /// environment refuses.
    pub fn back(&mut self, now_ms: u64) -> Result<(), AppError> {
        self.context.go(-1)?;
        self.sync_view(now_ms);
        Ok(())
    }

    /// Delivers a key press; Escape leaves the session before any view sees it.
    pub fn handle_key(&mut self, event: KeyEvent, now_ms: u64) -> KeyDisposition {
        let disposition = self.provider.handle_key(event, &mut self.context);
        if disposition == KeyDisposition::ExitTriggered {
            self.sync_view(now_ms);
        }
        disposition
    }

    /// Runs the quick exit from the visible control.
    pub fn quick_exit(&mut self, now_ms: u64) {
        self.provider.quick_exit(&mut self.context);
        self.sync_view(now_ms);
    }

    /// Advances time-driven state: decoy redirect and copy indicator expiry.
    pub fn tick(&mut self, now_ms: u64) {
        if let ActiveView::Exit(page) = &mut self.view {
            page.on_tick(now_ms, &mut self.context);
        }
        self.copy_indicator.on_tick(now_ms);
    }

    /// Flips incognito mode and returns the new state.
    pub fn toggle_incognito(&mut self) -> bool {
        let active = self.provider.toggle_incognito();
        debug!(active, "incognito toggled");
        active
    }

    /// Projects the chrome for rendering.
    pub fn chrome(&self) -> ShellChrome {
        ShellChrome::project(app_version(), self.provider.privacy())
    }

    /// Returns the privacy provider.
    pub fn provider(&self) -> &SafetyProvider {
        &self.provider
    }

    /// Returns the mounted view.
    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    /// Returns the browsing context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Returns the export sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the sink for reconfiguration between attempts.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Returns the outcome of the last submit/export/copy action.
    pub fn status(&self) -> &ActionStatus {
        &self.status
    }

    /// Returns the copy confirmation state.
    pub fn copy_indicator(&self) -> &CopyIndicator {
        &self.copy_indicator
    }

    /// Returns the mounted report, if the report route is active.
    pub fn report_mut(&mut self) -> Option<&mut ReportForm> {
        match &mut self.view {
            ActiveView::Report(form) => Some(form),
            _ => None,
        }
    }

    /// Returns the mounted safety plan, if the plan route is active.
    pub fn safety_plan_mut(&mut self) -> Option<&mut SafetyPlanForm> {
        match &mut self.view {
            ActiveView::SafetyPlan(form) => Some(form),
            _ => None,
        }
    }

    /// Submits the mounted report.
    ///
    /// # Errors
    /// - [`AppError::NoActiveForm`] outside the report route.
    /// - [`AppError::Wizard`] when the report is not ready.
    pub fn submit_report(&mut self) -> Result<ReferenceId, AppError> {
        let ActiveView::Report(form) = &mut self.view else {
            return Err(AppError::NoActiveForm("report"));
        };

        match form.submit() {
            Ok(receipt) => {
                let reference_id = receipt.reference_id;
                self.status = ActionStatus::Succeeded(format!(
                    "Report submitted. Reference number: {reference_id}"
                ));
                Ok(reference_id)
            }
            Err(error) => {
                self.status = ActionStatus::Failed(error.to_string());
                Err(error.into())
            }
        }
    }

    /// Exports the mounted safety plan through the shell's sink.
    ///
    /// # Errors
    /// - [`AppError::NoActiveForm`] outside the safety plan route.
    /// - [`AppError::Wizard`] for an empty plan or a refused download; the
    ///   draft stays intact.
    pub fn export_safety_plan(&mut self) -> Result<ExportedDocument, AppError> {
        let ActiveView::SafetyPlan(form) = &mut self.view else {
            return Err(AppError::NoActiveForm("safety plan"));
        };

        match form.export(&mut self.sink) {
            Ok(document) => {
                let document = document.clone();
                self.status =
                    ActionStatus::Succeeded(format!("Downloaded {}", document.filename));
                Ok(document)
            }
            Err(error) => {
                warn!(%error, "safety plan export failed");
                self.status = ActionStatus::Failed(error.to_string());
                Err(error.into())
            }
        }
    }

    /// Copies one answered safety plan field and shows the confirmation.
    ///
    /// # Errors
    /// - [`AppError::NoActiveForm`] outside the safety plan route.
    /// - [`AppError::Artifact`] when nothing can be copied or the clipboard
    ///   refuses.
    pub fn copy_plan_field(
        &mut self,
        name: &str,
        clipboard: &mut dyn Clipboard,
        now_ms: u64,
    ) -> Result<(), AppError> {
        let ActiveView::SafetyPlan(form) = &self.view else {
            return Err(AppError::NoActiveForm("safety plan"));
        };

        match form.copy(name, clipboard) {
            Ok(()) => {
                self.copy_indicator.show(name, now_ms);
                Ok(())
            }
            Err(error) => {
                self.status = ActionStatus::Failed(error.to_string());
                Err(error.into())
            }
        }
    }

    fn sync_view(&mut self, now_ms: u64) {
        let route = Route::parse(self.context.location());
        if route != self.view.route() {
            self.mount(route, now_ms);
        }
    }

    fn mount(&mut self, route: Route, now_ms: u64) {
        if self.view.holds_draft() {
            let previous = self.view.route();
            debug!(route = previous.path(), "unmounting view, draft discarded");
        }

        self.view = match route {
            Route::Report => ActiveView::Report(ReportForm::new()),
            Route::SafetyPlan => ActiveView::SafetyPlan(SafetyPlanForm::new()),
            Route::Exit => ActiveView::Exit(DecoyPage::enter(
                self.decoy_url.clone(),
                self.redirect_delay,
                now_ms,
            )),
            Route::NotFound(path) => ActiveView::NotFound(path),
            other => ActiveView::Static(other),
        };
        self.status = ActionStatus::Idle;
        self.copy_indicator = CopyIndicator::new();
        debug!(route = self.view.route().path(), "view mounted");
    }
}

/// Converts typed user input into a value of the field's kind.
///
/// Flags accept `yes`/`no`, `true`/`false`, `on`/`off`, `1`/`0`.
///
/// # Errors
/// Returns [`AppError::Input`] for unknown fields or unrecognized flag text.
pub fn field_value_from_input(fields: &Fields, name: &str, raw: &str) -> Result<FieldValue, AppError> {
    let def = fields
        .def(name)
        .ok_or_else(|| AppError::Input(CoreError::UnknownField(name.to_string()).to_string()))?;

    match def.kind {
        FieldKind::Text => Ok(FieldValue::text(raw)),
        FieldKind::Choice(_) => Ok(FieldValue::choice(raw.trim())),
        FieldKind::Flag => match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" | "1" => Ok(FieldValue::Flag(true)),
            "no" | "false" | "off" | "0" => Ok(FieldValue::Flag(false)),
            other => Err(AppError::Input(format!(
                "{name} expects yes or no, got '{other}'"
            ))),
        },
    }
}

/// Chooses log directives with priority `SAFE_HARBOR_LOG` > `RUST_LOG` >
/// [`DEFAULT_LOG_LEVEL`]; unparseable values fall through.
pub fn log_filter_directives<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .filter_map(|name| lookup(name))
        .map(|directives| directives.trim().to_string())
        .find(|directives| !directives.is_empty() && EnvFilter::try_new(directives).is_ok())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Installs the global stderr subscriber.
///
/// Nothing is written to disk so a session leaves no log file behind.
///
/// # Errors
/// Returns [`AppError::Logging`] when a global subscriber is already set.
pub fn init_logging() -> Result<(), AppError> {
    let directives = log_filter_directives(|name| std::env::var(name).ok());
    let filter =
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .with_target(true)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))?;

    info!(version = app_version(), "logging initialized");
    Ok(())
}

/// Runtime configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Value could not be parsed.
    #[error("{name} is invalid: {reason}")]
    Invalid {
        /// Env var name.
        name: &'static str,
        /// Parse failure.
        reason: String,
    },
    /// Decoy settings violate the escape policy.
    #[error("escape policy: {0}")]
    Privacy(#[from] PrivacyError),
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Escape policy error.
    #[error("privacy error: {0}")]
    Privacy(#[from] PrivacyError),
    /// Navigation refused.
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    /// Wizard misuse or finalization failure.
    #[error("wizard error: {0}")]
    Wizard(#[from] WizardError),
    /// Export or clipboard failure.
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    /// Action needs a form that is not mounted.
    #[error("no {0} is open")]
    NoActiveForm(&'static str),
    /// User input could not be converted.
    #[error("invalid input: {0}")]
    Input(String),
    /// Logging could not be initialized.
    #[error("logging error: {0}")]
    Logging(String),
}
