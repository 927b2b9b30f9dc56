//! Interactive search session.
//!
//! Every line typed at the prompt is treated as the new content of the search
//! box, so suggestions follow the typing after the debounce window. Lines
//! starting with `:` are commands; an empty line submits the search.

use std::io::{self, Write};
use std::sync::Arc;

use colored::Colorize;
use finder_core::{SearchOrchestrator, ToggleOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, instrument};

use crate::{
    config::AppConfig,
    errors::Error,
    notifier::ConsoleNotifier,
    render::{format_profile, format_recents, format_session, format_suggestions, HELP_TEXT},
    setup::build_orchestrator,
};

#[cfg(test)]
#[path = "search_cmd_tests.rs"]
mod tests;

/// A parsed line of session input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// New content of the search box.
    Input(String),
    Submit,
    /// Open the suggestion at this 1-based position.
    Pick(usize),
    /// Open the recent search at this 1-based position.
    Recent(usize),
    Follow,
    Blur,
    Focus,
    Show,
    Help,
    Quit,
    /// A command that could not be understood, with the reason.
    Invalid(String),
}

/// Whether the session keeps running after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parses one line of session input.
pub fn parse_line(line: &str) -> SessionCommand {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() {
        return SessionCommand::Submit;
    }

    let Some(command) = line.trim().strip_prefix(':') else {
        return SessionCommand::Input(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let argument = parts.next();

    match name {
        "submit" => SessionCommand::Submit,
        "pick" => parse_position(argument, "pick")
            .map_or_else(SessionCommand::Invalid, SessionCommand::Pick),
        "recent" => parse_position(argument, "recent")
            .map_or_else(SessionCommand::Invalid, SessionCommand::Recent),
        "follow" => SessionCommand::Follow,
        "blur" => SessionCommand::Blur,
        "focus" => SessionCommand::Focus,
        "show" => SessionCommand::Show,
        "help" => SessionCommand::Help,
        "quit" | "q" => SessionCommand::Quit,
        other => SessionCommand::Invalid(format!("Unknown command ':{}', try :help", other)),
    }
}

fn parse_position(argument: Option<&str>, command: &str) -> Result<usize, String> {
    let usage = format!("Usage: :{} <n> with n starting at 1", command);
    match argument.map(str::parse::<usize>) {
        Some(Ok(n)) if n > 0 => Ok(n),
        _ => Err(usage),
    }
}

/// Applies one command to the session, writing what changed to `out`.
pub async fn handle_command(
    orchestrator: &mut SearchOrchestrator,
    command: SessionCommand,
    out: &mut dyn Write,
) -> Result<Flow, Error> {
    debug!(command = ?command, "Handling session command");

    match command {
        SessionCommand::Input(text) => {
            orchestrator.input_changed(&text, Instant::now());
        }
        SessionCommand::Submit => {
            if orchestrator.input().trim().is_empty() {
                writeln!(out, "{}", "Type a username first.".dimmed())?;
            } else {
                orchestrator.submit_and_load().await;
                write_profile(orchestrator, out)?;
            }
        }
        SessionCommand::Pick(n) => {
            let login = n
                .checked_sub(1)
                .and_then(|index| orchestrator.visible_suggestions().get(index))
                .map(|user| user.login.clone());
            match login {
                Some(login) => {
                    let tickets = orchestrator.select_suggestion(&login);
                    orchestrator.execute(tickets).await;
                    write_profile(orchestrator, out)?;
                }
                None => writeln!(out, "{}", format!("No suggestion {}.", n).yellow())?,
            }
        }
        SessionCommand::Recent(n) => {
            let login = n
                .checked_sub(1)
                .and_then(|index| orchestrator.recents().get(index))
                .map(str::to_string);
            match login {
                Some(login) => {
                    let tickets = orchestrator.select_recent(&login);
                    orchestrator.execute(tickets).await;
                    write_profile(orchestrator, out)?;
                }
                None => writeln!(out, "{}", format!("No recent search {}.", n).yellow())?,
            }
        }
        SessionCommand::Follow => {
            if orchestrator.toggle_follow().await == ToggleOutcome::Ignored {
                writeln!(out, "{}", "No profile to follow.".dimmed())?;
            } else {
                write_profile(orchestrator, out)?;
            }
        }
        SessionCommand::Blur => orchestrator.blur(Instant::now()),
        SessionCommand::Focus => orchestrator.focus(),
        SessionCommand::Show => write!(out, "{}", format_session(orchestrator))?,
        SessionCommand::Help => writeln!(out, "{}", HELP_TEXT)?,
        SessionCommand::Quit => return Ok(Flow::Quit),
        SessionCommand::Invalid(reason) => writeln!(out, "{}", reason.yellow())?,
    }

    Ok(Flow::Continue)
}

/// Advances the session timers to `now` and redraws the dropdown when its
/// content changed.
pub async fn handle_timers(
    orchestrator: &mut SearchOrchestrator,
    now: Instant,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let before = orchestrator.visible_suggestions().to_vec();
    orchestrator.tick(now).await;

    if let Some(error) = orchestrator.suggestions().error() {
        if orchestrator.suggestions().is_visible() {
            writeln!(out, "{}", error.message().red())?;
        }
        return Ok(());
    }

    let after = orchestrator.visible_suggestions();
    if after != before.as_slice() && !after.is_empty() {
        write!(out, "{}", format_suggestions(after))?;
    }

    Ok(())
}

fn write_profile(orchestrator: &SearchOrchestrator, out: &mut dyn Write) -> Result<(), Error> {
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

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Runs the interactive session until `:quit` or end of input.
#[instrument(skip(config))]
pub async fn execute(config: &AppConfig) -> Result<(), Error> {
    let mut orchestrator = build_orchestrator(config, Arc::new(ConsoleNotifier::new()))?;
    let mut stdout = io::stdout();

    writeln!(stdout, "{}", HELP_TEXT)?;
    write!(stdout, "{}", format_recents(orchestrator.recents()))?;
    stdout.flush().map_err(|_| Error::StdOutFlushFailed)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let deadline = orchestrator.next_deadline();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("End of input, leaving the session");
                    break;
                };

                let flow = handle_command(&mut orchestrator, parse_line(&line), &mut stdout).await?;
                stdout.flush().map_err(|_| Error::StdOutFlushFailed)?;
                if flow == Flow::Quit {
                    break;
                }
            }
            _ = wait_until(deadline) => {
                handle_timers(&mut orchestrator, Instant::now(), &mut stdout).await?;
                stdout.flush().map_err(|_| Error::StdOutFlushFailed)?;
            }
        }
    }

    Ok(())
}
