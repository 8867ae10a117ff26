//! Shared setup for the `compendium` binaries.

use std::sync::Arc;

use anyhow::Context;
use compendium_core::config::Config;
use compendium_core::types::SearchHit;
use compendium_fetch::HttpCatalog;
use compendium_session::LookupSession;
use tracing_subscriber::EnvFilter;

pub type Session = LookupSession<HttpCatalog>;

/// Level used when neither `-v` nor `RUST_LOG` says otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Directive forced by `-v` counts; `None` defers to `RUST_LOG`.
pub fn verbosity_directive(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Logs go to stderr so results on stdout stay pipeable.
pub fn init_tracing(verbosity: u8) {
    let filter = match verbosity_directive(verbosity) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn open_session() -> anyhow::Result<Session> {
    let config = Config::load().context("Error loading config")?;
    let settings = config.settings()?;
    let catalog = HttpCatalog::from_settings(&settings).context("Error building HTTP client")?;
    tracing::debug!("Catalog at {}", catalog.base_url());
    Ok(LookupSession::new(Arc::new(catalog), &settings))
}

pub fn print_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("No results.");
        return;
    }
    for (i, hit) in hits.iter().enumerate() {
        println!("{:>4}. {} ({})", i + 1, hit.display_name, hit.id);
    }
    println!("{} result(s)", hits.len());
}
