//! Listing and clearing recent searches.

use std::io::{self, Write};
use std::sync::Arc;

use finder_core::{PersistentRecents, RecentsStorage};
use tracing::{info, instrument};

use crate::{config::AppConfig, errors::Error, render::format_recents, setup::build_storage};

#[cfg(test)]
#[path = "recents_cmd_tests.rs"]
mod tests;

/// Prints the recent searches held by `storage`, or clears them.
pub fn show_recents(
    storage: Arc<dyn RecentsStorage>,
    clear: bool,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let mut recents = PersistentRecents::load(storage);

    if clear {
        recents.clear();
        info!("Cleared recent searches");
        writeln!(out, "Recent searches cleared.")?;
        return Ok(());
    }

    write!(out, "{}", format_recents(recents.list()))?;
    Ok(())
}

#[instrument(skip(config))]
pub fn execute(config: &AppConfig, clear: bool) -> Result<(), Error> {
    let mut stdout = io::stdout();
    show_recents(build_storage(config), clear, &mut stdout)?;
    stdout.flush().map_err(|_| Error::StdOutFlushFailed)
}
