#![warn(missing_docs)]
//! # safe-harbor-app binary
//!
//! Terminal entry point: a line-oriented session shell over an in-memory
//! browsing context. Type `esc` (or `exit`) at any prompt to leave.

use std::io::{self, BufRead, Write};
use std::process;
use std::thread;
use std::time::Instant;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use safe_harbor_app::{
    ActiveView, AppConfig, AppError, AppShell, app_version, field_value_from_input, init_logging,
};
use safe_harbor_artifact::{ArtifactError, Clipboard, FileExportSink};
use safe_harbor_core::field_label;
use safe_harbor_privacy::{
    BrowsingContext, DecoyPage, InMemoryBrowsingContext, Key, KeyDisposition, KeyEvent,
};
use safe_harbor_ui::{StepStatus, step_indicators};
use safe_harbor_wizard::report::incident_type_label;
use safe_harbor_wizard::safety_plan::{EMPTY_PLAN_MESSAGE, PlanReview};
use safe_harbor_wizard::{Advance, FieldUpdate, Wizard};
use tracing::warn;

type Shell = AppShell<InMemoryBrowsingContext, FileExportSink>;

const HELP: &str = "\
commands:
  go <path>          open /, /report, /resources, /safety-plan, /live-support
  back               previous page
  esc | exit         quick exit
  incognito          toggle incognito mode
  set <field> <text> fill a field (flags take yes/no)
  next | prev        move between steps
  step <n>           jump back to step n
  submit             submit the report
  export             download the safety plan
  copy <field>       copy a safety plan answer
  show               redraw
  quit               close the shell";

/// CLI entry point.
fn main() {
    if let Err(error) = init_logging() {
        eprintln!("safe-harbor: {error}");
    }

    let config = AppConfig::from_env().unwrap_or_else(|error| {
        warn!(%error, "invalid configuration, using defaults");
        AppConfig::default()
    });

    if let Err(error) = run(&config) {
        eprintln!("safe-harbor: {error}");
        process::exit(1);
    }
}

/// One parsed shell line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Go(String),
    Back,
    Escape,
    Incognito,
    Set(String, String),
    Next,
    Prev,
    Step(usize),
    Submit,
    Export,
    Copy(String),
    Show,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match (word, rest.is_empty()) {
            ("go", false) => Ok(Self::Go(rest.to_string())),
            ("back", true) => Ok(Self::Back),
            ("esc" | "exit", _) => Ok(Self::Escape),
            ("incognito", true) => Ok(Self::Incognito),
            ("set", false) => {
                let (name, value) = rest.split_once(' ').unwrap_or((rest, ""));
                Ok(Self::Set(name.to_string(), value.to_string()))
            }
            ("next", true) => Ok(Self::Next),
            ("prev", true) => Ok(Self::Prev),
            ("step", false) => rest
                .parse()
                .map(Self::Step)
                .map_err(|_| format!("not a step number: {rest}")),
            ("submit", true) => Ok(Self::Submit),
            ("export", true) => Ok(Self::Export),
            ("copy", false) => Ok(Self::Copy(rest.to_string())),
            ("show" | "", true) => Ok(Self::Show),
            ("help", _) => Ok(Self::Help),
            ("quit", true) => Ok(Self::Quit),
            _ => Err(format!("unknown command: {line} (type help)")),
        }
    }
}

/// Clipboard writing through the OSC 52 terminal escape sequence.
struct TerminalClipboard<W> {
    out: W,
}

impl<W: Write> Clipboard for TerminalClipboard<W> {
    fn write_text(&mut self, text: &str) -> Result<(), ArtifactError> {
        let encoded = STANDARD.encode(text.as_bytes());
        write!(self.out, "\x1b]52;c;{encoded}\x07")
            .and_then(|()| self.out.flush())
            .map_err(|error| ArtifactError::Clipboard(error.to_string()))
    }
}

fn run(config: &AppConfig) -> Result<(), AppError> {
    let clock = Instant::now();
    let now_ms = || u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut shell: Shell = AppShell::new(
        config,
        InMemoryBrowsingContext::new("/"),
        FileExportSink::new(&config.export_dir),
        now_ms(),
    )?;
    let mut clipboard = TerminalClipboard { out: io::stdout() };

    println!("safe-harbor {}", app_version());
    println!("{HELP}");
    render(&shell, now_ms());

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|error| AppError::Input(error.to_string()))?;
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("! {message}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            command => {
                if let Err(error) = dispatch(&mut shell, command, &mut clipboard, now_ms()) {
                    println!("! {error}");
                }
            }
        }

        if let ActiveView::Exit(_) = shell.view() {
            println!("{}", DecoyPage::MESSAGE);
            thread::sleep(config.redirect_delay);
            shell.tick(now_ms());
            if let Some(url) = shell.context().external_location() {
                println!("-> {url}");
            }
            break;
        }

        shell.tick(now_ms());
        render(&shell, now_ms());
    }

    Ok(())
}

fn dispatch(
    shell: &mut Shell,
    command: Command,
    clipboard: &mut dyn Clipboard,
    now_ms: u64,
) -> Result<(), AppError> {
    match command {
        Command::Go(path) => shell.navigate(&path, now_ms),
        Command::Back => shell.back(now_ms)?,
        Command::Escape => {
            let disposition = shell.handle_key(KeyEvent::plain(Key::Escape), now_ms);
            debug_assert_eq!(disposition, KeyDisposition::ExitTriggered);
        }
        Command::Incognito => {
            shell.toggle_incognito();
        }
        Command::Set(name, raw) => {
            if set_field(shell, &name, &raw)? == FieldUpdate::IgnoredCompleted {
                println!("(already finished, nothing changed)");
            }
        }
        Command::Next => {
            let outcome = if let Some(form) = shell.report_mut() {
                form.advance()
            } else if let Some(form) = shell.safety_plan_mut() {
                form.advance()
            } else {
                return Err(AppError::NoActiveForm("form"));
            };
            if let Advance::Blocked { missing } = outcome {
                let labels: Vec<_> = missing.iter().map(|name| field_label(name)).collect();
                println!("! please fill in: {}", labels.join(", "));
            }
        }
        Command::Prev => {
            if let Some(form) = shell.report_mut() {
                form.retreat();
            } else if let Some(form) = shell.safety_plan_mut() {
                form.retreat();
            }
        }
        Command::Step(step) => {
            if let Some(form) = shell.report_mut() {
                form.jump_back(step)?;
            } else if let Some(form) = shell.safety_plan_mut() {
                form.jump_back(step)?;
            }
        }
        Command::Submit => {
            shell.submit_report()?;
        }
        Command::Export => {
            let document = shell.export_safety_plan()?;
            println!(
                "saved {} ({} bytes)",
                shell.sink().dir().join(&document.filename).display(),
                document.bytes.len()
            );
        }
        Command::Copy(name) => shell.copy_plan_field(&name, clipboard, now_ms)?,
        Command::Show | Command::Help | Command::Quit => {}
    }
    Ok(())
}

fn set_field(shell: &mut Shell, name: &str, raw: &str) -> Result<FieldUpdate, AppError> {
    if let Some(form) = shell.report_mut() {
        let value = field_value_from_input(form.wizard().fields(), name, raw)?;
        return Ok(form.set_field(name, value)?);
    }
    if let Some(form) = shell.safety_plan_mut() {
        let value = field_value_from_input(form.wizard().fields(), name, raw)?;
        return Ok(form.set_field(name, value)?);
    }
    Err(AppError::NoActiveForm("form"))
}

fn render(shell: &Shell, now_ms: u64) {
    let chrome = shell.chrome();
    println!();
    if let Some(banner) = chrome.incognito_banner {
        println!("** {banner}");
    }
    println!(
        "[{}] [{}]  {}",
        chrome.quick_exit_label,
        chrome.privacy_toggle_label,
        shell.context().location()
    );

    match shell.view() {
        ActiveView::Static(route) => println!("{} (nothing to fill in here)", route.path()),
        ActiveView::NotFound(path) => println!("page not found: {path}"),
        ActiveView::Exit(_) => println!("{}", DecoyPage::MESSAGE),
        ActiveView::Report(form) => {
            render_wizard(form.wizard());
            if form.wizard().is_last_step() {
                for line in form.review() {
                    let value = match line.field.as_str() {
                        "incidentType" => incident_type_label(&line.value)
                            .map_or(line.value.clone(), str::to_string),
                        _ => line.value.clone(),
                    };
                    println!("  {}: {value}", line.label);
                }
                let sharing = form.sharing();
                for recipient in sharing.recipients {
                    println!("  - {recipient}");
                }
                if let Some(contact) = sharing.contact {
                    println!("  contact: {contact}");
                }
            }
        }
        ActiveView::SafetyPlan(form) => {
            render_wizard(form.wizard());
            if form.wizard().is_last_step() {
                match form.review() {
                    PlanReview::Empty => println!("  {EMPTY_PLAN_MESSAGE}"),
                    PlanReview::Entries(entries) => {
                        for line in entries {
                            let copied = shell
                                .copy_indicator()
                                .label_for(&line.field, now_ms)
                                .map(|label| format!(" ({label})"))
                                .unwrap_or_default();
                            println!("  {}: {}{copied}", line.label, line.value);
                        }
                    }
                }
            }
        }
    }

    if let Some(message) = shell.status().message() {
        println!("{message}");
    }
}

fn render_wizard<A>(wizard: &Wizard<A>) {
    let indicators: Vec<_> = step_indicators(wizard)
        .into_iter()
        .map(|step| {
            let mark = match step.status {
                StepStatus::Complete => "x",
                StepStatus::Current => ">",
                StepStatus::Upcoming => " ",
            };
            format!("[{mark}] {} {}", step.number, step.title)
        })
        .collect();
    println!("{}", indicators.join("  "));

    let Some(step) = wizard.steps().get(wizard.current_step() - 1) else {
        return;
    };
    for name in step.fields {
        let value = wizard
            .fields()
            .get(name)
            .map(|value| value.display_or_placeholder())
            .unwrap_or_default();
        println!("  {name} ({}): {value}", field_label(name));
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for command parsing.

    use super::*;

    #[test]
    fn parses_set_with_multi_word_value() {
        assert_eq!(
            Command::parse("set safeLocations my aunt's house"),
            Ok(Command::Set(
                "safeLocations".to_string(),
                "my aunt's house".to_string()
            ))
        );
    }

    #[test]
    fn escape_aliases_always_parse() {
        assert_eq!(Command::parse("esc"), Ok(Command::Escape));
        assert_eq!(Command::parse("exit now"), Ok(Command::Escape));
        assert!(Command::parse("go").is_err());
        assert_eq!(Command::parse("step 2"), Ok(Command::Step(2)));
    }
}
