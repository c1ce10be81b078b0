//! Ensures the parsing and configuration crates are reachable through
//! `sigcli` re-exports.

use sigcli::{clap, figment};

#[test]
fn reexports_are_public() {
    let _command = clap::Command::new("demo");
    let _figment = figment::Figment::new();
}
