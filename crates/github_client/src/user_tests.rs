use super::*;
use serde_json::from_str;

#[test]
fn test_profile_deserialization() {
    let json_str = r#"{
        "login": "octocat",
        "id": 583231,
        "name": "The Octocat",
        "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
        "bio": null,
        "html_url": "https://github.com/octocat",
        "public_repos": 8,
        "followers": 20000,
        "following": 9
    }"#;

    let user: GitHubUser = from_str(json_str).expect("Failed to deserialize GitHubUser");

    assert_eq!(user.login, "octocat");
    assert_eq!(user.name.as_deref(), Some("The Octocat"));
    assert_eq!(user.bio, None);
    assert_eq!(user.html_url, "https://github.com/octocat");
    assert_eq!(user.public_repos, Some(8));
    assert_eq!(user.followers, Some(20000));
    assert_eq!(user.following, Some(9));
}

#[test]
fn test_search_item_deserialization_without_profile_fields() {
    let json_str = r#"{
        "login": "hubot",
        "id": 480938,
        "avatar_url": "https://avatars.githubusercontent.com/u/480938?v=4",
        "html_url": "https://github.com/hubot",
        "score": 1.0
    }"#;

    let user: GitHubUser = from_str(json_str).expect("Failed to deserialize search item");

    assert_eq!(user.login, "hubot");
    assert!(user.name.is_none());
    assert!(user.followers.is_none());
}

#[test]
fn test_display_name_falls_back_to_login() {
    let mut user = GitHubUser {
        login: "octocat".to_string(),
        ..Default::default()
    };
    assert_eq!(user.display_name(), "octocat");

    user.name = Some("   ".to_string());
    assert_eq!(user.display_name(), "octocat");

    user.name = Some("Mona".to_string());
    assert_eq!(user.display_name(), "Mona");
}

#[test]
fn test_search_response_deserialization() {
    let json_str = r#"{
        "total_count": 2,
        "incomplete_results": false,
        "items": [
            { "login": "octocat", "avatar_url": "a", "html_url": "b" },
            { "login": "octo-org", "avatar_url": "c", "html_url": "d" }
        ]
    }"#;

    let response: SearchUsersResponse = from_str(json_str).expect("Failed to deserialize");

    assert_eq!(response.total_count, 2);
    assert_eq!(response.items.len(), 2);
    assert_eq!(response.items[1].login, "octo-org");
}
