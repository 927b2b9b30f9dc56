//! Text rendering of the session: profile card, suggestion dropdown and
//! recent searches.

use colored::Colorize;
use finder_core::{FollowStatus, ProfileView, RecentSearchList, SearchOrchestrator};
use github_client::GitHubUser;

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;

/// Commands understood by the interactive session.
pub const HELP_TEXT: &str = "\
Type text to search. Commands:
  :submit (or an empty line)  search for the typed username
  :pick <n>                   open suggestion n
  :recent <n>                 open recent search n
  :follow                     follow or unfollow the displayed user
  :blur / :focus              leave or return to the search box
  :show                       redraw the profile, suggestions and recents
  :help                       show this help
  :quit                       leave the session";

/// Format the profile area.
pub fn format_profile(view: &ProfileView<'_>, status: FollowStatus, can_toggle: bool) -> String {
    match view {
        ProfileView::Empty => format!("{}\n", "No user searched yet.".dimmed()),
        ProfileView::Loading => format!("{}\n", "Loading...".dimmed()),
        ProfileView::NotFound(message) => format!("{}\n", message.yellow()),
        ProfileView::Failed(message) => format!("{}\n", message.red()),
        ProfileView::Loaded(user) => format_card(user, status, can_toggle),
    }
}

fn format_card(user: &GitHubUser, status: FollowStatus, can_toggle: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} ({})\n",
        user.display_name().bold().bright_cyan(),
        user.login
    ));

    if let Some(bio) = user.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        output.push_str(&format!("{}\n", bio));
    }

    let counters: Vec<String> = [
        ("repos", user.public_repos),
        ("followers", user.followers),
        ("following", user.following),
    ]
    .into_iter()
    .filter_map(|(label, count)| count.map(|c| format!("{} {}", c, label)))
    .collect();
    if !counters.is_empty() {
        output.push_str(&format!("{}\n", counters.join(" · ")));
    }

    if !user.avatar_url.is_empty() {
        output.push_str(&format!("{}: {}\n", "Avatar".bold(), user.avatar_url));
    }
    if !user.html_url.is_empty() {
        output.push_str(&format!("{}: {}\n", "Profile".bold(), user.html_url));
    }

    let label = match status {
        FollowStatus::Following => status.toggle_label().green().to_string(),
        _ => status.toggle_label().to_string(),
    };
    if can_toggle {
        output.push_str(&format!("[{}]\n", label));
    } else {
        output.push_str(&format!("[{}] {}\n", label, "(pending)".dimmed()));
    }

    output
}

/// Format the suggestion dropdown, numbered from 1. Empty when there is
/// nothing to show.
pub fn format_suggestions(users: &[GitHubUser]) -> String {
    let mut output = String::new();
    for (index, user) in users.iter().enumerate() {
        output.push_str(&format!("  {} {}\n", format!("{}.", index + 1).dimmed(), user.login));
    }
    output
}

/// Format the recent searches, numbered from 1.
pub fn format_recents(recents: &RecentSearchList) -> String {
    if recents.is_empty() {
        return format!("{}\n", "No recent searches.".dimmed());
    }

    let mut output = format!("{}\n", "Recent searches:".bold());
    for (index, login) in recents.iter().enumerate() {
        output.push_str(&format!("  {} {}\n", format!("{}.", index + 1).dimmed(), login));
    }
    output
}

/// Format the whole session view.
pub fn format_session(orchestrator: &SearchOrchestrator) -> String {
    let mut output = format_profile(
        &orchestrator.profile(),
        orchestrator.follow_status(),
        orchestrator.can_toggle_follow(),
    );

    let suggestions = orchestrator.visible_suggestions();
    if !suggestions.is_empty() {
        output.push_str(&format!("{}\n", "Suggestions:".bold()));
        output.push_str(&format_suggestions(suggestions));
    }

    output.push_str(&format_recents(orchestrator.recents()));
    output
}
