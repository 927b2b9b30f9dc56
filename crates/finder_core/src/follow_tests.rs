use super::*;
use crate::notifier::RecordingNotifier;

// --- Helpers ---

fn coordinator_with_status(login: &str, following: bool) -> FollowCoordinator {
    let mut coordinator = FollowCoordinator::new();
    coordinator.set_displayed(Some(login));
    let ticket = coordinator.begin_check(login).expect("First check should be issued");
    coordinator.complete_check(&ticket, Ok(following));
    coordinator
}

fn settle(coordinator: &mut FollowCoordinator, login: &str, following: bool) {
    let ticket = coordinator.begin_check(login).expect("Check should be issued");
    coordinator.complete_check(&ticket, Ok(following));
}

// --- Tests ---

#[test]
fn test_status_is_unknown_until_checked() {
    let mut coordinator = FollowCoordinator::new();
    coordinator.set_displayed(Some("octocat"));

    let ticket = coordinator.begin_check("octocat");

    assert!(ticket.is_some());
    assert_eq!(coordinator.status("octocat"), FollowStatus::Unknown);
    assert_eq!(coordinator.displayed_status(), FollowStatus::Unknown);
}

#[test]
fn test_check_is_lazy_and_cached() {
    let mut coordinator = coordinator_with_status("octocat", true);

    assert_eq!(coordinator.status("octocat"), FollowStatus::Following);
    assert!(coordinator.begin_check("octocat").is_none());
}

#[test]
fn test_failed_check_can_be_retried() {
    let mut coordinator = FollowCoordinator::new();
    let ticket = coordinator.begin_check("octocat").expect("Check should be issued");
    coordinator.complete_check(
        &ticket,
        Err(QueryError::from(github_client::Error::Network("blip".to_string()))),
    );
    assert!(coordinator.begin_check("octocat").is_none());

    assert!(coordinator.retry_failed_check("octocat"));
    let retry = coordinator.begin_check("octocat").expect("Retry should be issued");
    coordinator.complete_check(&retry, Ok(true));

    assert_eq!(coordinator.status("octocat"), FollowStatus::Following);
    assert!(!coordinator.retry_failed_check("octocat"));
}

#[test]
fn test_check_requires_login() {
    let mut coordinator = FollowCoordinator::new();

    assert!(coordinator.begin_check("").is_none());
    assert!(!coordinator.can_toggle(""));
}

#[test]
fn test_toggle_label() {
    assert_eq!(FollowStatus::Following.toggle_label(), "Following");
    assert_eq!(FollowStatus::NotFollowing.toggle_label(), "Follow User");
    assert_eq!(FollowStatus::Unknown.toggle_label(), "Follow User");
}

#[test]
fn test_toggle_picks_unfollow_when_following() {
    let mut coordinator = coordinator_with_status("octocat", true);

    let ticket = coordinator
        .begin_toggle("octocat")
        .expect("Toggle should start");

    assert_eq!(ticket.action(), FollowAction::Unfollow);
    assert!(coordinator.is_pending("octocat"));
}

#[test]
fn test_toggle_picks_follow_when_not_following_or_unknown() {
    let mut coordinator = coordinator_with_status("octocat", false);
    let ticket = coordinator.begin_toggle("octocat").expect("Toggle should start");
    assert_eq!(ticket.action(), FollowAction::Follow);

    let mut coordinator = FollowCoordinator::new();
    let ticket = coordinator.begin_toggle("hubot").expect("Toggle should start");
    assert_eq!(ticket.action(), FollowAction::Follow);
}

#[test]
fn test_second_toggle_while_pending_is_ignored() {
    let mut coordinator = coordinator_with_status("octocat", false);

    let first = coordinator.begin_toggle("octocat");
    let second = coordinator.begin_toggle("octocat");

    assert!(first.is_some());
    assert!(second.is_none());
    assert!(!coordinator.can_toggle("octocat"));
}

#[test]
fn test_pending_is_scoped_per_login() {
    let mut coordinator = FollowCoordinator::new();

    let _octocat = coordinator.begin_toggle("octocat").expect("Toggle should start");

    assert!(coordinator.can_toggle("hubot"));
    assert!(coordinator.begin_toggle("hubot").is_some());
}

#[test]
fn test_successful_follow_refreshes_only_that_user() {
    let mut coordinator = coordinator_with_status("octocat", false);
    settle(&mut coordinator, "hubot", true);
    let notifier = RecordingNotifier::new();

    let ticket = coordinator.begin_toggle("octocat").expect("Toggle should start");
    let resolution = coordinator.finish_toggle(ticket, Ok(()), &notifier);

    assert_eq!(resolution.outcome, ToggleOutcome::Followed);
    let refresh = resolution.refresh.expect("Follow should refresh the user");
    assert_eq!(refresh.key(), &QueryKey::follow_status("octocat"));
    assert!(!coordinator.needs_check("hubot"));
    assert!(!coordinator.is_pending("octocat"));
    assert_eq!(
        notifier.successes(),
        vec!["you are now following octocat".to_string()]
    );

    coordinator.complete_check(&refresh, Ok(true));
    assert_eq!(coordinator.status("octocat"), FollowStatus::Following);
}

#[test]
fn test_successful_unfollow_invalidates_every_status() {
    let mut coordinator = coordinator_with_status("octocat", true);
    settle(&mut coordinator, "hubot", true);
    settle(&mut coordinator, "mona", false);
    let notifier = RecordingNotifier::new();

    let ticket = coordinator.begin_toggle("octocat").expect("Toggle should start");
    let resolution = coordinator.finish_toggle(ticket, Ok(()), &notifier);

    assert_eq!(resolution.outcome, ToggleOutcome::Unfollowed);
    assert_eq!(
        notifier.successes(),
        vec!["you are no longer following octocat".to_string()]
    );

    // The displayed user is re-checked right away, the others on next use.
    let refresh = resolution.refresh.expect("Displayed user should be re-checked");
    assert_eq!(refresh.key(), &QueryKey::follow_status("octocat"));
    assert!(coordinator.needs_check("hubot"));
    assert!(coordinator.needs_check("mona"));
    assert!(coordinator.begin_check("hubot").is_some());

    // Cached values stay readable until the refresh lands.
    assert_eq!(coordinator.status("mona"), FollowStatus::NotFollowing);
}

#[test]
fn test_failed_toggle_keeps_status_and_reports_error() {
    let mut coordinator = coordinator_with_status("octocat", true);
    let notifier = RecordingNotifier::new();

    let ticket = coordinator.begin_toggle("octocat").expect("Toggle should start");
    let resolution = coordinator.finish_toggle(
        ticket,
        Err(github_client::Error::AuthError("Bad credentials".to_string())),
        &notifier,
    );

    assert_eq!(
        resolution.outcome,
        ToggleOutcome::Failed("Failed to authenticate with GitHub: Bad credentials".to_string())
    );
    assert!(resolution.refresh.is_none());
    assert_eq!(coordinator.status("octocat"), FollowStatus::Following);
    assert!(coordinator.can_toggle("octocat"));
    assert_eq!(
        notifier.errors(),
        vec!["Failed to authenticate with GitHub: Bad credentials".to_string()]
    );
    assert!(notifier.successes().is_empty());
}

#[test]
fn test_failed_check_leaves_status_unknown() {
    let mut coordinator = FollowCoordinator::new();

    let ticket = coordinator.begin_check("octocat").expect("Check should start");
    coordinator.complete_check(
        &ticket,
        Err(QueryError::from(github_client::Error::Network(
            "connection reset".to_string(),
        ))),
    );

    assert_eq!(coordinator.status("octocat"), FollowStatus::Unknown);
}

#[test]
fn test_set_displayed_ignores_empty_login() {
    let mut coordinator = FollowCoordinator::new();

    coordinator.set_displayed(Some(""));

    assert_eq!(coordinator.displayed(), None);
}
