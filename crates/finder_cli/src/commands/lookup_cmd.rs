//! One-shot profile lookup.

use std::io::{self, Write};
use std::sync::Arc;

use colored::Colorize;
use finder_core::SearchOrchestrator;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::{
    config::AppConfig, errors::Error, notifier::ConsoleNotifier, render::format_profile,
    setup::build_orchestrator,
};

#[cfg(test)]
#[path = "lookup_cmd_tests.rs"]
mod tests;

/// Submits `username` as if it had been typed into the search box and
/// writes the resulting profile card.
pub async fn lookup(
    orchestrator: &mut SearchOrchestrator,
    username: &str,
    out: &mut dyn Write,
) -> Result<(), Error> {
    orchestrator.input_changed(username, Instant::now());
    orchestrator.submit_and_load().await;

    if orchestrator.submitted_username().is_none() {
        debug!("Blank username, nothing to look up");
        writeln!(out, "{}", "Nothing to look up.".dimmed())?;
        return Ok(());
    }

    write!(
        out,
        "{}",
        format_profile(
            &orchestrator.profile(),
            orchestrator.follow_status(),
            orchestrator.can_toggle_follow(),
        )
    )?;
    Ok(())
}

/// Looks up `username` and prints the profile.
#[instrument(skip(config))]
pub async fn execute(config: &AppConfig, username: &str) -> Result<(), Error> {
    let mut orchestrator = build_orchestrator(config, Arc::new(ConsoleNotifier::new()))?;
    let mut stdout = io::stdout();

    lookup(&mut orchestrator, username, &mut stdout).await?;
    stdout.flush().map_err(|_| Error::StdOutFlushFailed)
}
