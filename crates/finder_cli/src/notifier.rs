use colored::Colorize;
use finder_core::Notifier;
use tracing::{error, info};

/// Prints notifications to the terminal, next to the session output.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        info!(notification = message, "Success");
        println!("{} {}", "✓".green(), message);
    }

    fn notify_error(&self, message: &str) {
        error!(notification = message, "Failure");
        println!("{} {}", "✗".red(), message.red());
    }
}
