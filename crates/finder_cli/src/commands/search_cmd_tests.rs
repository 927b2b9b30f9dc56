use super::*;
use async_trait::async_trait;
use finder_core::{MemoryStorage, RecordingNotifier, SuggestionSettings};
use github_client::{GitHubUser, UserDirectory};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Stub directory
// ============================================================================

struct StubDirectory {
    users: Vec<GitHubUser>,
    followed: Mutex<Vec<String>>,
}

impl StubDirectory {
    fn new(logins: &[&str]) -> Self {
        Self {
            users: logins
                .iter()
                .map(|login| GitHubUser {
                    login: login.to_string(),
                    html_url: format!("https://github.com/{}", login),
                    ..Default::default()
                })
                .collect(),
            followed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserDirectory for StubDirectory {
    async fn fetch_profile(&self, username: &str) -> Result<GitHubUser, github_client::Error> {
        self.users
            .iter()
            .find(|u| u.login == username)
            .cloned()
            .ok_or_else(|| github_client::Error::NotFound(username.to_string()))
    }

    async fn search_users(&self, query: &str) -> Result<Vec<GitHubUser>, github_client::Error> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.login.contains(query))
            .cloned()
            .collect())
    }

    async fn check_following(&self, username: &str) -> Result<bool, github_client::Error> {
        Ok(self
            .followed
            .lock()
            .unwrap()
            .iter()
            .any(|login| login == username))
    }

    async fn follow(&self, username: &str) -> Result<(), github_client::Error> {
        self.followed.lock().unwrap().push(username.to_string());
        Ok(())
    }

    async fn unfollow(&self, username: &str) -> Result<(), github_client::Error> {
        self.followed.lock().unwrap().retain(|login| login != username);
        Ok(())
    }
}

fn session(logins: &[&str]) -> (SearchOrchestrator, Arc<RecordingNotifier>) {
    colored::control::set_override(false);
    let notifier = Arc::new(RecordingNotifier::new());
    let orchestrator = SearchOrchestrator::new(
        Arc::new(StubDirectory::new(logins)),
        notifier.clone(),
        Arc::new(MemoryStorage::new()),
        SuggestionSettings::default(),
    );
    (orchestrator, notifier)
}

async fn run(orchestrator: &mut SearchOrchestrator, line: &str) -> (Flow, String) {
    let mut out: Vec<u8> = Vec::new();
    let flow = handle_command(orchestrator, parse_line(line), &mut out)
        .await
        .expect("Command should succeed");
    (flow, String::from_utf8(out).expect("Output should be UTF-8"))
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_plain_text_is_input() {
    assert_eq!(parse_line("octo\n"), SessionCommand::Input("octo".to_string()));
    assert_eq!(parse_line(" oc "), SessionCommand::Input(" oc ".to_string()));
}

#[test]
fn test_parse_empty_line_submits() {
    assert_eq!(parse_line(""), SessionCommand::Submit);
    assert_eq!(parse_line("   \r\n"), SessionCommand::Submit);
    assert_eq!(parse_line(":submit"), SessionCommand::Submit);
}

#[test]
fn test_parse_commands() {
    assert_eq!(parse_line(":pick 2"), SessionCommand::Pick(2));
    assert_eq!(parse_line(":recent 1"), SessionCommand::Recent(1));
    assert_eq!(parse_line(":follow"), SessionCommand::Follow);
    assert_eq!(parse_line(":blur"), SessionCommand::Blur);
    assert_eq!(parse_line(":focus"), SessionCommand::Focus);
    assert_eq!(parse_line(":show"), SessionCommand::Show);
    assert_eq!(parse_line(":help"), SessionCommand::Help);
    assert_eq!(parse_line(":quit"), SessionCommand::Quit);
}

#[test]
fn test_parse_rejects_bad_positions() {
    for line in [":pick", ":pick 0", ":pick two", ":recent -1"] {
        assert!(
            matches!(parse_line(line), SessionCommand::Invalid(_)),
            "'{line}' should be invalid"
        );
    }
}

#[test]
fn test_parse_unknown_command() {
    assert_eq!(
        parse_line(":frobnicate"),
        SessionCommand::Invalid("Unknown command ':frobnicate', try :help".to_string())
    );
}

// ============================================================================
// Handling
// ============================================================================

#[tokio::test]
async fn test_typed_text_then_empty_line_shows_profile() {
    let (mut orchestrator, _) = session(&["octocat"]);

    let (_, typed) = run(&mut orchestrator, "octocat").await;
    let (flow, output) = run(&mut orchestrator, "").await;

    assert!(typed.is_empty());
    assert_eq!(flow, Flow::Continue);
    assert!(output.contains("octocat (octocat)"));
    assert!(output.contains("[Follow User]"));
    assert_eq!(orchestrator.recents().entries(), ["octocat".to_string()]);
}

#[tokio::test]
async fn test_submit_without_text_prints_hint() {
    let (mut orchestrator, _) = session(&["octocat"]);

    let (_, output) = run(&mut orchestrator, ":submit").await;

    assert_eq!(output, "Type a username first.\n");
    assert!(orchestrator.recents().is_empty());
}

#[tokio::test]
async fn test_unknown_user_is_reported_inline() {
    let (mut orchestrator, _) = session(&[]);

    run(&mut orchestrator, "ghost").await;
    let (_, output) = run(&mut orchestrator, "").await;

    assert_eq!(output, "User not found: ghost\n");
}

#[tokio::test]
async fn test_timers_show_suggestions_and_pick_opens_profile() {
    let (mut orchestrator, _) = session(&["octocat", "hubot"]);

    run(&mut orchestrator, "octo").await;
    let mut out: Vec<u8> = Vec::new();
    handle_timers(&mut orchestrator, Instant::now() + Duration::from_millis(500), &mut out)
        .await
        .expect("Timers should run");
    assert_eq!(String::from_utf8(out).unwrap(), "  1. octocat\n");

    let (_, output) = run(&mut orchestrator, ":pick 1").await;

    assert!(output.contains("octocat (octocat)"));
    assert_eq!(orchestrator.input(), "octocat");
}

#[tokio::test]
async fn test_pick_without_suggestions() {
    let (mut orchestrator, _) = session(&["octocat"]);

    let (_, output) = run(&mut orchestrator, ":pick 1").await;

    assert_eq!(output, "No suggestion 1.\n");
}

#[tokio::test]
async fn test_recent_opens_profile_and_reports_missing_entry() {
    let (mut orchestrator, _) = session(&["octocat"]);
    run(&mut orchestrator, "octocat").await;
    run(&mut orchestrator, "").await;

    let (_, output) = run(&mut orchestrator, ":recent 1").await;
    assert!(output.contains("octocat (octocat)"));

    let (_, output) = run(&mut orchestrator, ":recent 3").await;
    assert_eq!(output, "No recent search 3.\n");
}

#[tokio::test]
async fn test_follow_toggles_displayed_user() {
    let (mut orchestrator, notifier) = session(&["octocat"]);
    run(&mut orchestrator, "octocat").await;
    run(&mut orchestrator, "").await;

    let (_, output) = run(&mut orchestrator, ":follow").await;

    assert!(output.contains("[Following]"));
    assert_eq!(
        notifier.successes(),
        vec!["you are now following octocat".to_string()]
    );
}

#[tokio::test]
async fn test_follow_without_profile() {
    let (mut orchestrator, notifier) = session(&[]);

    let (_, output) = run(&mut orchestrator, ":follow").await;

    assert_eq!(output, "No profile to follow.\n");
    assert!(notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_show_renders_whole_session() {
    let (mut orchestrator, _) = session(&[]);

    let (_, output) = run(&mut orchestrator, ":show").await;

    assert_eq!(output, "No user searched yet.\nNo recent searches.\n");
}

#[tokio::test]
async fn test_quit_ends_session() {
    let (mut orchestrator, _) = session(&[]);

    let (flow, output) = run(&mut orchestrator, ":quit").await;

    assert_eq!(flow, Flow::Quit);
    assert!(output.is_empty());
}
