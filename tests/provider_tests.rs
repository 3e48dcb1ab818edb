//! Integration tests for the hosting provider over the in-memory client.

#[cfg(test)]
mod provider_tests {
    use integrations_hosting::mocks::{fixtures, MockHostingClient};
    use integrations_hosting::{
        GitHubHostingProvider, HostingClient, HostingErrorKind, HostingProvider, PullRequestFilter,
        PullRequestOptions, PullRequestState, RepoOptions, RepoSearch, RepoUpdate, TeamOptions,
        TeamRole, TeamUpdate, UserSearch,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use test_case::test_case;

    fn setup() -> (Arc<MockHostingClient>, GitHubHostingProvider) {
        let client = Arc::new(MockHostingClient::new().with_current_user("octocat"));
        let provider = GitHubHostingProvider::new(client.clone(), Some("acme".to_string()));
        (client, provider)
    }

    fn setup_with_team(name: &str) -> (Arc<MockHostingClient>, GitHubHostingProvider, u64) {
        let (client, provider) = setup();
        let id = client.add_team("acme", fixtures::team(10, name));
        (client, provider, id)
    }

    // Repositories

    #[tokio::test]
    async fn test_unqualified_names_resolve_to_organization() {
        let (client, provider) = setup();
        client.add_repo(fixtures::repo("acme/widgets"));

        let repo = provider.read_repo("widgets").await.unwrap().unwrap();

        assert_eq!(repo.full_name, "acme/widgets");
        assert!(client.verify_request("GET", "/repos/acme/widgets"));
    }

    #[tokio::test]
    async fn test_read_missing_repo_is_none() {
        let (_, provider) = setup();
        assert!(provider.read_repo("acme/ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_name_makes_no_request() {
        let (client, provider) = setup();

        let err = provider.read_repo("a/b/c").await.unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::InvalidName);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_create_repo_in_organization() {
        let (client, provider) = setup();

        let repo = provider
            .create_repo("acme/widgets", &RepoOptions::default())
            .await
            .unwrap();

        assert_eq!(repo.full_name, "acme/widgets");
        assert!(client.verify_request("POST", "/orgs/acme/repos"));
    }

    #[tokio::test]
    async fn test_create_repo_for_authenticated_user() {
        let (client, provider) = setup();

        let repo = provider
            .create_repo(
                "octocat/dotfiles",
                &RepoOptions {
                    private: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(repo.full_name, "octocat/dotfiles");
        assert!(repo.is_private);
        assert!(client.verify_request("POST", "/user/repos"));
        assert!(!client.verify_request("POST", "/orgs/octocat/repos"));
    }

    #[tokio::test]
    async fn test_empty_update_is_a_noop() {
        let (client, provider) = setup();
        client.add_repo(fixtures::repo("acme/widgets"));

        let result = provider
            .update_repo("widgets", &RepoUpdate::default())
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_repo() {
        let (client, provider) = setup();
        client.add_repo(fixtures::repo("acme/widgets"));

        let repo = provider
            .update_repo(
                "widgets",
                &RepoUpdate {
                    description: Some("Widgets and gadgets".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(repo.description.as_deref(), Some("Widgets and gadgets"));
    }

    #[tokio::test]
    async fn test_delete_repo() {
        let (client, provider) = setup();
        client.add_repo(fixtures::repo("acme/widgets"));

        provider.delete_repo("widgets").await.unwrap();

        assert!(client.repo("acme/widgets").is_none());
    }

    #[tokio::test]
    async fn test_search_repos_scoped_to_organization() {
        let (client, provider) = setup();
        client.add_repo(fixtures::repo("acme/widgets"));
        client.add_repo(fixtures::repo("acme/gadgets"));
        client.add_repo(fixtures::repo("other/widgets"));

        let repos = provider
            .search_repos("widg", &RepoSearch::default())
            .await
            .unwrap();

        let names: Vec<_> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["acme/widgets"]);
    }

    #[tokio::test]
    async fn test_search_repos_passes_order() {
        let (client, provider) = setup();
        client.add_repo(fixtures::repo("acme/gadgets"));
        client.add_repo(fixtures::repo("acme/widgets"));

        let repos = provider
            .search_repos(
                "",
                &RepoSearch {
                    order: Some("desc".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["widgets", "gadgets"]);
    }

    // Permissions

    #[test_case(Some("read"), Some("pull") ; "read")]
    #[test_case(Some("PULL"), Some("pull") ; "pull uppercase")]
    #[test_case(Some("Write"), Some("push") ; "write")]
    #[test_case(Some("push"), Some("push") ; "push")]
    #[test_case(Some("admin"), Some("admin") ; "admin")]
    #[test_case(None, None ; "revoke")]
    #[tokio::test]
    async fn test_user_permission_vocabulary(input: Option<&str>, expected: Option<&str>) {
        let (client, provider) = setup();
        client
            .add_collaborator("acme/widgets", "hubot", "pull")
            .await
            .unwrap();

        provider
            .set_user_permission("hubot", "widgets", input)
            .await
            .unwrap();

        assert_eq!(
            client.collaborator("acme/widgets", "hubot").as_deref(),
            expected
        );
    }

    #[tokio::test]
    async fn test_invalid_permission_makes_no_request() {
        let (client, provider) = setup();

        let err = provider
            .set_user_permission("hubot", "widgets", Some("owner"))
            .await
            .unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::InvalidPermission);
        assert!(err.message().contains("owner"));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_team_permission_grant_and_revoke() {
        let (client, provider, id) = setup_with_team("Core");

        provider
            .set_team_permission("Core", "widgets", Some("write"))
            .await
            .unwrap();
        assert_eq!(
            client.team_repo_permission(id, "acme/widgets").as_deref(),
            Some("push")
        );

        provider
            .set_team_permission("Core", "widgets", None)
            .await
            .unwrap();
        assert!(client.team_repo_permission(id, "acme/widgets").is_none());
    }

    #[tokio::test]
    async fn test_team_permission_unknown_team() {
        let (_, provider) = setup();

        let err = provider
            .set_team_permission("Ghosts", "widgets", Some("read"))
            .await
            .unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::TeamNotFound);
        assert!(err.to_string().contains("Ghosts"));
    }

    // Teams

    #[tokio::test]
    async fn test_team_lookup_is_cached() {
        let (client, provider, _) = setup_with_team("Core");

        let first = provider.read_team("Core").await.unwrap().unwrap();
        let second = provider.read_team("Core").await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(client.list_teams_calls(), 1);
    }

    #[tokio::test]
    async fn test_created_team_is_cached() {
        let (client, provider) = setup();

        let team = provider
            .create_team("Platform", &TeamOptions::default())
            .await
            .unwrap();
        let read = provider.read_team("Platform").await.unwrap().unwrap();

        assert_eq!(team.id, read.id);
        assert_eq!(client.list_teams_calls(), 0);
    }

    #[tokio::test]
    async fn test_deleted_team_refreshes_once_then_absent() {
        let (client, provider, _) = setup_with_team("Core");
        provider.read_team("Core").await.unwrap();

        provider.delete_team("Core").await.unwrap();
        let after = provider.read_team("Core").await.unwrap();

        assert!(after.is_none());
        assert_eq!(client.list_teams_calls(), 2);
    }

    #[tokio::test]
    async fn test_rename_team_moves_cache_entry() {
        let (client, provider, id) = setup_with_team("Core");

        let team = provider
            .update_team(
                "Core",
                &TeamUpdate {
                    name: Some("Platform".to_string()),
                    permission: Some("write".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(team.id, id);
        assert_eq!(team.name, "Platform");
        assert!(provider.team_cache().cached("Core").await.is_none());
        assert!(provider.team_cache().cached("Platform").await.is_some());
        assert_eq!(client.list_teams_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_team_rejects_none_permission() {
        let (client, provider, _) = setup_with_team("Core");

        let err = provider
            .update_team(
                "Core",
                &TeamUpdate {
                    permission: Some("none".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::InvalidPermission);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_team_operations_require_organization() {
        let client = Arc::new(MockHostingClient::new());
        let provider = GitHubHostingProvider::new(client, None);

        let err = provider
            .create_team("Core", &TeamOptions::default())
            .await
            .unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::InvalidConfiguration);
    }

    #[tokio::test]
    async fn test_search_teams() {
        let (client, provider) = setup();
        client.add_team("acme", fixtures::team(1, "Core Devs"));
        client.add_team("acme", fixtures::team(2, "Docs"));
        client.add_team("acme", fixtures::team(3, "core-ops"));

        let teams = provider.search_teams("CORE").await.unwrap();

        let names: Vec<_> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Core Devs", "core-ops"]);
    }

    // Membership

    #[tokio::test]
    async fn test_membership_defaults_to_member() {
        let (client, provider, id) = setup_with_team("Core");

        let membership = provider
            .create_team_membership("Core", "hubot", None)
            .await
            .unwrap();

        assert_eq!(membership.role, TeamRole::Member);
        assert_eq!(client.membership_role(id, "hubot").as_deref(), Some("member"));
    }

    #[test_case("maintainer", TeamRole::Maintainer)]
    #[test_case("admin", TeamRole::Maintainer)]
    #[test_case("owner", TeamRole::Member)]
    #[test_case("member", TeamRole::Member)]
    #[tokio::test]
    async fn test_membership_role_mapping(role: &str, expected: TeamRole) {
        let (_, provider, _) = setup_with_team("Core");

        let membership = provider
            .update_team_membership("Core", "hubot", Some(role))
            .await
            .unwrap();

        assert_eq!(membership.role, expected);
    }

    #[tokio::test]
    async fn test_membership_update_requires_role() {
        let (client, provider, _) = setup_with_team("Core");

        let err = provider
            .update_team_membership("Core", "hubot", None)
            .await
            .unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::MissingRole);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_read_membership() {
        let (client, provider, id) = setup_with_team("Core");
        client.add_member(id, "hubot", "maintainer");

        let membership = provider
            .read_team_membership("Core", "hubot")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(membership.role, TeamRole::Maintainer);
        assert_eq!(membership.state.as_deref(), Some("active"));

        assert!(provider
            .read_team_membership("Core", "nobody")
            .await
            .unwrap()
            .is_none());
        assert!(provider
            .read_team_membership("Ghosts", "hubot")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_membership_carries_account_fields() {
        let (_, provider, _) = setup_with_team("Core");

        let created = provider
            .create_team_membership("Core", "hubot", Some("member"))
            .await
            .unwrap();
        let users = provider.search_users(&UserSearch::team("Core")).await.unwrap();

        assert_eq!(created.login, "hubot");
        assert_eq!(created.id, Some(users[0].id));
        assert_eq!(created.user_type.as_deref(), Some("User"));

        let read = provider
            .read_team_membership("Core", "hubot")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_delete_membership() {
        let (client, provider, id) = setup_with_team("Core");
        client.add_member(id, "hubot", "member");

        provider.delete_team_membership("Core", "hubot").await.unwrap();

        assert!(client.membership_role(id, "hubot").is_none());
    }

    #[tokio::test]
    async fn test_search_users_requires_team_name() {
        let (client, provider) = setup();

        let err = provider
            .search_users(&UserSearch::default())
            .await
            .unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::MissingOption);
        assert!(err.message().contains("team_name"));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_users_fetches_every_member() {
        let (client, provider, id) = setup_with_team("Core");
        for n in 0..45 {
            client.add_member(id, &format!("user-{:02}", n), "member");
        }

        let users = provider.search_users(&UserSearch::team("Core")).await.unwrap();

        assert_eq!(users.len(), 45);
        let path = format!("/teams/{}/members", id);
        assert_eq!(client.bulk_mode_seen("GET", &path), vec![true]);
        assert!(!client.auto_paginate());
    }

    #[tokio::test]
    async fn test_search_users_restores_mode_on_failure() {
        let (client, provider, id) = setup_with_team("Core");
        client.fail_next("GET", &format!("/teams/{}/members", id), 500);

        assert!(provider.search_users(&UserSearch::team("Core")).await.is_err());
        assert!(!client.auto_paginate());
    }

    // Pull requests

    #[tokio::test]
    async fn test_pull_request_same_namespace_uses_bare_branch() {
        let (client, provider) = setup();

        let pr = provider
            .create_pull_request(
                "acme/widgets:feature",
                "acme/widgets:main",
                &PullRequestOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(pr.repo_full_name, "acme/widgets");
        assert_eq!(pr.source_ref, "feature");
        assert_eq!(pr.target_ref, "main");
        assert_eq!(pr.state, PullRequestState::Open);
        assert_eq!(pr.title, "New Pull Request");

        let requests = client.requests_matching("POST", "/repos/acme/widgets/pulls");
        let body = requests[0].body.clone().unwrap_or_default();
        assert!(body.contains(r#""head":"feature""#));
    }

    #[tokio::test]
    async fn test_pull_request_from_fork_prefixes_namespace() {
        let (client, provider) = setup();

        provider
            .create_pull_request(
                "fork/widgets:feature",
                "acme/widgets:main",
                &PullRequestOptions {
                    title: Some("Add login".to_string()),
                    body: None,
                },
            )
            .await
            .unwrap();

        let requests = client.requests_matching("POST", "/repos/acme/widgets/pulls");
        let body = requests[0].body.clone().unwrap_or_default();
        assert!(body.contains(r#""head":"fork:feature""#));
        assert!(body.contains(r#""title":"Add login""#));
    }

    #[tokio::test]
    async fn test_pull_request_across_repositories_is_rejected() {
        let (client, provider) = setup();

        let err = provider
            .create_pull_request(
                "acme/gadgets:feature",
                "acme/widgets:main",
                &PullRequestOptions::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::CrossRepoMismatch);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_pull_request_bad_reference() {
        let (_, provider) = setup();

        let err = provider
            .create_pull_request("widgets", "acme/widgets:main", &PullRequestOptions::default())
            .await
            .unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::InvalidReference);
    }

    #[tokio::test]
    async fn test_pull_request_lifecycle() {
        let (_, provider) = setup();
        let pr = provider
            .create_pull_request(
                "acme/widgets:feature",
                "acme/widgets:main",
                &PullRequestOptions::default(),
            )
            .await
            .unwrap();

        let closed = provider.close_pull_request("widgets", pr.id).await.unwrap();
        assert_eq!(closed.state, PullRequestState::Closed);

        let reopened = provider.open_pull_request("widgets", pr.id).await.unwrap();
        assert_eq!(reopened.state, PullRequestState::Open);

        let outcome = provider
            .merge_pull_request("widgets", pr.id, Some("Ship it"))
            .await
            .unwrap();
        assert!(outcome.merged);
        assert!(outcome.sha.is_some());

        let merged = provider.read_pull_request("widgets", pr.id).await.unwrap().unwrap();
        assert_eq!(merged.state, PullRequestState::Merged);
    }

    #[tokio::test]
    async fn test_read_pull_requests() {
        let (client, provider) = setup();
        client.add_pull_request("acme/widgets", fixtures::pull_request("acme/widgets", 1, "a", "main"));
        client.add_pull_request("acme/widgets", fixtures::pull_request("acme/widgets", 2, "b", "main"));
        provider.close_pull_request("widgets", 2).await.unwrap();

        let open = provider
            .read_pull_requests("widgets", PullRequestFilter::Open)
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, 1);

        let all = provider
            .read_pull_requests("widgets", PullRequestFilter::All)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let missing = provider
            .read_pull_requests("ghost", PullRequestFilter::All)
            .await
            .unwrap();
        assert!(missing.is_empty());

        assert!(provider.read_pull_request("widgets", 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_label_and_unlabel_pull_request() {
        let (client, provider) = setup();

        let labels = provider
            .label_pull_request("widgets", 4, &["bug".to_string(), "ui".to_string()])
            .await
            .unwrap();
        assert_eq!(labels, vec!["bug", "ui"]);

        provider
            .unlabel_pull_request("widgets", 4, &["bug".to_string()])
            .await
            .unwrap();
        assert_eq!(client.issue_labels("acme/widgets", 4), vec!["ui"]);
    }

    #[tokio::test]
    async fn test_upstream_errors_pass_through() {
        let (client, provider) = setup();
        client.fail_next("GET", "/repos/acme/widgets", 500);

        let err = provider.read_repo("widgets").await.unwrap_err();

        assert_eq!(*err.kind(), HostingErrorKind::InternalError);
    }
}
