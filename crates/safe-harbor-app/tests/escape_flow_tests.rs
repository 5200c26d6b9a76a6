//! Integration tests for the quick-exit path through the shell.

use safe_harbor_app::{ActiveView, AppConfig, AppShell};
use safe_harbor_privacy::{
    BrowsingContext, DECOY_ROUTE, InMemoryBrowsingContext, Key, KeyDisposition, KeyEvent,
    Modifiers,
};

mod common;

#[test]
fn escape_flow_tests_escape_from_report_reaches_decoy_and_redirects() {
    let mut shell = common::shell_at("/");
    shell.navigate("/safety-plan", 1);
    shell.navigate("/report", 2);
    common::fill_required_report(&mut shell);

    let disposition = shell.handle_key(KeyEvent::plain(Key::Escape), 1_000);
    assert_eq!(disposition, KeyDisposition::ExitTriggered);
    assert_eq!(shell.context().location(), DECOY_ROUTE);
    assert!(matches!(shell.view(), ActiveView::Exit(_)));
    assert!(shell.report_mut().is_none());
    assert!(!shell.context().can_reach_other_than(DECOY_ROUTE));

    shell.tick(1_050);
    assert!(shell.context().external_location().is_none());

    shell.tick(1_100);
    assert_eq!(
        shell
            .context()
            .external_location()
            .map(|url| url.host_str()),
        Some(Some("weather.gov"))
    );
}

#[test]
fn escape_flow_tests_back_after_exit_stays_on_decoy() {
    let mut shell = common::shell_at("/");
    shell.navigate("/report", 1);
    shell.quick_exit(2);

    shell.back(3).expect("one decoy entry remains behind the current one");
    assert_eq!(shell.context().location(), DECOY_ROUTE);
    assert!(matches!(shell.view(), ActiveView::Exit(_)));
}

#[test]
fn escape_flow_tests_modifiers_do_not_matter() {
    let mut shell = common::shell_at("/report");
    let event = KeyEvent {
        key: Key::Escape,
        modifiers: Modifiers {
            ctrl: true,
            meta: true,
            ..Modifiers::default()
        },
    };
    assert_eq!(shell.handle_key(event, 0), KeyDisposition::ExitTriggered);
    assert_eq!(shell.context().location(), DECOY_ROUTE);
}

#[test]
fn escape_flow_tests_other_keys_reach_the_view() {
    let mut shell = common::shell_at("/report");
    common::fill_required_report(&mut shell);

    assert_eq!(
        shell.handle_key(KeyEvent::plain(Key::Char('q')), 0),
        KeyDisposition::Ignored
    );
    assert_eq!(shell.context().location(), "/report");
    assert!(shell.report_mut().is_some());
}

#[test]
fn escape_flow_tests_locked_down_context_never_fails_the_exit() {
    let mut context = InMemoryBrowsingContext::locked_down("/");
    context.navigate("/report");
    let mut shell = AppShell::new(
        &AppConfig::default(),
        context,
        common::RecordingSink::default(),
        0,
    )
    .expect("default config should mount");

    shell.quick_exit(10);
    assert_eq!(shell.context().location(), DECOY_ROUTE);
    assert!(matches!(shell.view(), ActiveView::Exit(_)));

    shell.tick(10_000);
    assert!(shell.context().external_location().is_none());
    let ActiveView::Exit(page) = shell.view() else {
        panic!("decoy page should stay mounted");
    };
    assert!(page.redirected());
}
