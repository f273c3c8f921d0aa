//! Authorization pipeline tests against a mock Bitbucket API

use bitbucket_gate::auth::{IdentityProvider, SessionState, create_provider};
use bitbucket_gate::bitbucket::BitbucketClient;
use bitbucket_gate::config::ProviderSettings;
use bitbucket_gate::error::{BitbucketError, Stage};
use bitbucket_gate::provider::{
    BitbucketProvider, BitbucketProviderBuilder, Denial, GateOutcome, ProviderData,
    ProviderOverrides, Resolution,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "bb-test-token";

fn settings_for(mock_server: &MockServer) -> ProviderSettings {
    ProviderSettings {
        validate_url: Some(format!("{}/2.0/user/emails", mock_server.uri())),
        timeout_secs: 5,
        ..Default::default()
    }
}

/// Builder pointing every endpoint at the mock server
fn provider_for(mock_server: &MockServer) -> BitbucketProviderBuilder {
    let settings = settings_for(mock_server);
    let data = ProviderData::with_defaults(ProviderOverrides::from_settings(&settings).unwrap());
    BitbucketProvider::builder(data, BitbucketClient::new(&settings).unwrap())
}

fn session() -> SessionState {
    SessionState::new(TOKEN).unwrap()
}

async fn mount_emails(mock_server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/2.0/user/emails"))
        .and(query_param("access_token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

fn primary_emails() -> serde_json::Value {
    json!({
        "values": [
            {"email": "a@x.com", "is_primary": false},
            {"email": "b@x.com", "is_primary": true}
        ]
    })
}

async fn mount_teams(mock_server: &MockServer, teams: &[&str], expected_calls: u64) {
    let values: Vec<_> = teams.iter().map(|t| json!({"username": t})).collect();
    Mock::given(method("GET"))
        .and(path("/2.0/teams"))
        .and(query_param("role", "member"))
        .and(query_param("access_token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"values": values})))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

async fn mount_repositories(
    mock_server: &MockServer,
    namespace: &str,
    full_names: &[&str],
    expected_calls: u64,
) {
    let values: Vec<_> = full_names
        .iter()
        .map(|n| json!({"full_name": n}))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/2.0/repositories/{namespace}")))
        .and(query_param("role", "contributor"))
        .and(query_param("access_token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"values": values})))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_unconstrained_returns_primary_email() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;

    let provider = provider_for(&mock_server).build().unwrap();
    let resolution = provider.resolve(&session()).await.unwrap();

    assert_eq!(resolution, Resolution::Resolved("b@x.com".to_string()));
}

#[tokio::test]
async fn test_unconstrained_without_primary_is_not_an_error() {
    let mock_server = MockServer::start().await;
    mount_emails(
        &mock_server,
        json!({"values": [{"email": "a@x.com", "is_primary": false}]}),
    )
    .await;

    let provider = provider_for(&mock_server).build().unwrap();
    assert_eq!(
        provider.resolve(&session()).await.unwrap(),
        Resolution::NoPrimaryEmail
    );
    assert_eq!(provider.email_address(&session()).await.unwrap(), "");
}

#[tokio::test]
async fn test_email_failure_aborts_before_gates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2.0/user/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;
    mount_teams(&mock_server, &["qa"], 0).await;
    mount_repositories(&mock_server, "org", &["org/repo"], 0).await;

    let provider = provider_for(&mock_server)
        .team("qa")
        .repository("org/repo")
        .build()
        .unwrap();
    let err = provider.resolve(&session()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Email);
    assert!(matches!(
        err.source,
        BitbucketError::Api { status: 500, .. }
    ));
    assert!(provider.email_address(&session()).await.is_err());
}

#[tokio::test]
async fn test_email_decode_failure_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2.0/user/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).build().unwrap();
    let err = provider.resolve(&session()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Email);
    assert!(matches!(err.source, BitbucketError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_team_mismatch_denies_even_with_primary_email() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;
    mount_teams(&mock_server, &["devs", "QA", "qa-leads"], 1).await;
    // Repository access would pass, but must never be consulted
    mount_repositories(&mock_server, "org", &["org/repo"], 0).await;

    let provider = provider_for(&mock_server)
        .team("qa")
        .repository("org/repo")
        .build()
        .unwrap();
    let resolution = provider.resolve(&session()).await.unwrap();

    assert_eq!(
        resolution,
        Resolution::Denied(Denial::NotTeamMember {
            team: "qa".to_string()
        })
    );
    assert!(!resolution.is_granted());
}

#[tokio::test]
async fn test_team_member_resolves() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;
    mount_teams(&mock_server, &["devs", "qa"], 1).await;

    let provider = provider_for(&mock_server).team("qa").build().unwrap();

    assert_eq!(
        provider.email_address(&session()).await.unwrap(),
        "b@x.com"
    );
}

#[tokio::test]
async fn test_team_lookup_failure_is_an_error() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;

    Mock::given(method("GET"))
        .and(path("/2.0/teams"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"message": "Access token expired."}
        })))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).team("qa").build().unwrap();
    let err = provider.resolve(&session()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Team);
    assert!(matches!(err.source, BitbucketError::Unauthorized));
}

#[tokio::test]
async fn test_repository_query_targets_namespace_and_full_name() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;

    Mock::given(method("GET"))
        .and(path("/2.0/repositories/org"))
        .and(query_param("role", "contributor"))
        .and(query_param("q", "full_name=\"org/repo\""))
        .and(query_param("access_token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{"full_name": "org/repo"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).repository("org/repo").build().unwrap();
    let resolution = provider.resolve(&session()).await.unwrap();

    assert_eq!(resolution.email(), Some("b@x.com"));
}

#[tokio::test]
async fn test_repository_requires_exact_full_name() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;
    mount_repositories(
        &mock_server,
        "org",
        &["org/repo-old", "org/repository", "org"],
        1,
    )
    .await;

    let provider = provider_for(&mock_server).repository("org/repo").build().unwrap();
    let resolution = provider.resolve(&session()).await.unwrap();

    assert_eq!(
        resolution,
        Resolution::Denied(Denial::NoRepositoryAccess {
            repository: "org/repo".to_string()
        })
    );
    assert_eq!(resolution.into_email(), "");
}

#[tokio::test]
async fn test_repository_denial_after_team_pass() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;
    mount_teams(&mock_server, &["qa"], 1).await;
    mount_repositories(&mock_server, "org", &[], 1).await;

    let provider = provider_for(&mock_server)
        .team("qa")
        .repository("org/repo")
        .build()
        .unwrap();

    assert!(matches!(
        provider.resolve(&session()).await.unwrap(),
        Resolution::Denied(Denial::NoRepositoryAccess { .. })
    ));
}

#[tokio::test]
async fn test_repository_lookup_failure_is_an_error() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;
    mount_teams(&mock_server, &["qa"], 1).await;

    Mock::given(method("GET"))
        .and(path("/2.0/repositories/org"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server)
        .team("qa")
        .repository("org/repo")
        .build()
        .unwrap();
    let err = provider.resolve(&session()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Repository);
    assert!(matches!(err.source, BitbucketError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_all_gates_pass() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;
    mount_teams(&mock_server, &["qa"], 1).await;
    mount_repositories(&mock_server, "org", &["org/other", "org/repo"], 1).await;

    let provider = provider_for(&mock_server)
        .team("qa")
        .repository("org/repo")
        .build()
        .unwrap();

    assert_eq!(
        provider.resolve(&session()).await.unwrap(),
        Resolution::Resolved("b@x.com".to_string())
    );
}

#[tokio::test]
async fn test_gates_skip_when_unconfigured() {
    let mock_server = MockServer::start().await;
    mount_teams(&mock_server, &["qa"], 0).await;

    let provider = provider_for(&mock_server).build().unwrap();

    assert_eq!(
        provider.check_team(&session()).await.unwrap(),
        GateOutcome::Skipped
    );
    assert_eq!(
        provider.check_repository(&session()).await.unwrap(),
        GateOutcome::Skipped
    );
}

#[tokio::test]
async fn test_team_gate_runs_independently() {
    let mock_server = MockServer::start().await;
    mount_teams(&mock_server, &["qa"], 2).await;

    let passing = provider_for(&mock_server).team("qa").build().unwrap();
    assert_eq!(
        passing.check_team(&session()).await.unwrap(),
        GateOutcome::Passed
    );

    let failing = provider_for(&mock_server).team("ops").build().unwrap();
    assert!(matches!(
        failing.check_team(&session()).await.unwrap(),
        GateOutcome::Denied(Denial::NotTeamMember { .. })
    ));
}

#[tokio::test]
async fn test_boxed_provider_from_settings() {
    let mock_server = MockServer::start().await;
    mount_emails(&mock_server, primary_emails()).await;
    mount_teams(&mock_server, &["qa"], 1).await;

    let settings = ProviderSettings {
        team: Some("qa".to_string()),
        ..settings_for(&mock_server)
    };
    let provider = create_provider(&settings).unwrap();

    assert_eq!(provider.name(), "Bitbucket");
    assert_eq!(provider.data().scope.to_string(), "email team");
    assert_eq!(
        provider.email_address(&session()).await.unwrap(),
        "b@x.com"
    );
}
