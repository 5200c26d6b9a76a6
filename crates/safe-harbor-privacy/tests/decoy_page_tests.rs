//! Integration tests for the delayed decoy redirect.

use std::time::Duration;

use safe_harbor_privacy::{
    DEFAULT_DECOY_URL, DEFAULT_REDIRECT_DELAY, DecoyPage, InMemoryBrowsingContext,
    validate_decoy_url,
};

#[test]
fn decoy_page_tests_redirects_once_after_delay() {
    let target = validate_decoy_url(DEFAULT_DECOY_URL).expect("default decoy should be valid");
    let mut browser = InMemoryBrowsingContext::new("/exit");
    let mut page = DecoyPage::enter(target.clone(), DEFAULT_REDIRECT_DELAY, 1_000);

    page.on_tick(1_050, &mut browser);
    assert!(!page.redirected());
    assert!(browser.external_location().is_none());

    page.on_tick(1_100, &mut browser);
    assert!(page.redirected());
    assert_eq!(browser.external_location(), Some(&target));
}

#[test]
fn decoy_page_tests_refused_redirect_is_swallowed() {
    let target = validate_decoy_url("https://example.org/news").expect("decoy should be valid");
    let mut browser = InMemoryBrowsingContext::locked_down("/exit");
    let mut page = DecoyPage::enter(target, Duration::from_millis(0), 0);

    page.on_tick(0, &mut browser);
    assert!(page.redirected());
    assert!(browser.external_location().is_none());
}
