//! Print the permission decision for the running process.
//!
//! `atgate-check --config` also prints the compiled-in configuration.

use anyhow::Context;
use atgate::AccessConfig;
use tracing::Level;

fn main() -> anyhow::Result<()> {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    if std::env::args().skip(1).any(|arg| arg == "--config") {
        let config = serde_json::to_string_pretty(&AccessConfig::default())
            .context("serialize configuration")?;
        println!("{config}");
    }

    println!("check_permission() ==> {}", u8::from(atgate::check_permission()));
    Ok(())
}
