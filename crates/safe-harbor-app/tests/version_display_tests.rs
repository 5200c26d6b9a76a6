//! Integration tests for VERSION propagation into the shell chrome.

use std::fs;

use safe_harbor_app::app_version;

mod common;

#[test]
fn version_display_tests_matches_root_version_file() {
    let root_version_path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../VERSION");
    let root_version = fs::read_to_string(root_version_path).expect("VERSION should be readable");
    assert_eq!(app_version(), root_version.trim());
}

#[test]
fn version_display_tests_chrome_carries_version() {
    let shell = common::shell_at("/");
    assert_eq!(shell.chrome().version, app_version());
}
