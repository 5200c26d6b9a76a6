//! Embeds the root `VERSION` file as `SAFE_HARBOR_VERSION`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn version_file() -> PathBuf {
    let manifest_dir = env::var_os("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    Path::new(&manifest_dir)
        .ancestors()
        .nth(2)
        .expect("crate lives two levels below the workspace root")
        .join("VERSION")
}

fn main() {
    let path = version_file();
    println!("cargo:rerun-if-changed={}", path.display());

    let contents = fs::read_to_string(&path)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", path.display()));
    let version = contents.trim();
    assert!(
        !version.is_empty() && !version.contains(char::is_whitespace),
        "VERSION must hold a single non-empty token, found {contents:?}"
    );

    println!("cargo:rustc-env=SAFE_HARBOR_VERSION={version}");
}
