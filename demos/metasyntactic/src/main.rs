//! Demo entry-point: install the registry, build the command, print a report.

use std::io::{self, Write};

use color_eyre::eyre::eyre;
use metasyntactic::{MainArgs, registry, report};
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    sigcli::registry::install(registry()).map_err(|_| eyre!("registry already installed"))?;
    let cmd = sigcli::command(|args: MainArgs| report(&args)).build()?;
    let out = cmd.main();
    io::stdout().lock().write_all(out.as_bytes())?;
    Ok(())
}
