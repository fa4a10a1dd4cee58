use std::sync::Arc;

use chrono::{Duration, Utc};
use cohabit_api::app::{ApiConfig, AppServices, build_app, build_services};
use cohabit_auth::SessionIssuer;
use cohabit_core::{AccountId, AccountStatus, Role, SubjectId};
use cohabit_directory::AccountChange;
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let config = ApiConfig {
            session_secret: "test-secret".to_string(),
            session_ttl: Duration::minutes(15),
        };
        let services = Arc::new(build_services(&config));
        let app = build_app(services.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            handle,
        }
    }

    /// Grants a provider assertion for `subject` and registers an account
    /// through the real endpoint. Returns the session token and the account body.
    async fn register(
        &self,
        client: &reqwest::Client,
        subject: &str,
    ) -> (String, serde_json::Value) {
        self.services
            .verifier
            .grant(assertion_for(subject), SubjectId::new(subject));

        let res = client
            .post(format!("{}/auth/register", self.base_url))
            .json(&json!({
                "assertion": assertion_for(subject),
                "display_name": subject,
                "email": format!("{subject}@example.com"),
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: serde_json::Value = res.json().await.unwrap();
        let token = body["token"].as_str().unwrap().to_string();
        (token, body["account"].clone())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn assertion_for(subject: &str) -> String {
    format!("assertion-{subject}")
}

fn account_id(account: &serde_json::Value) -> AccountId {
    account["id"].as_str().unwrap().parse().unwrap()
}

async fn get_me(client: &reqwest::Client, srv: &TestServer, token: &str) -> reqwest::Response {
    client
        .get(format!("{}/accounts/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_public_but_protected_routes_are_not() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/accounts/me", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = get_me(&client, &srv, "not-a-token").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_then_me_round_trip() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (token, account) = srv.register(&client, "alice").await;
    assert_eq!(account["display_name"], "alice");
    assert_eq!(account["email"], "alice@example.com");
    assert_eq!(account["role"], "user");
    assert_eq!(account["status"], "active");
    assert!(account["community_id"].is_null());
    assert_eq!(account["is_owner"], false);

    let res = get_me(&client, &srv, &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"], account["id"]);
    assert_eq!(body["display_name"], "alice");
}

#[tokio::test]
async fn login_requires_a_registered_account() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Valid assertion but no account: login never provisions one.
    srv.services
        .verifier
        .grant(assertion_for("ghost"), SubjectId::new("ghost"));
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "assertion": assertion_for("ghost") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let (_, account) = srv.register(&client, "alice").await;
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "assertion": assertion_for("alice") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["account"]["id"], account["id"]);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn identity_provider_failures_map_distinctly() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.services.verifier.grant_until(
        "stale-assertion",
        SubjectId::new("stale"),
        Utc::now() - Duration::minutes(5),
    );
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "assertion": "stale-assertion" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "assertion_expired");

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "assertion": "never-granted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "assertion_invalid");

    // A provider outage is retryable, not a credential failure.
    srv.services.verifier.set_outage(true);
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "assertion": "never-granted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "identity_provider_unavailable");
}

#[tokio::test]
async fn refresh_exchanges_an_expired_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, account) = srv.register(&client, "alice").await;
    let expired = srv
        .services
        .sessions
        .issue_at(account_id(&account), Role::User, Utc::now() - Duration::hours(2))
        .unwrap();

    let res = get_me(&client, &srv, &expired).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "token_expired");

    let res = client
        .post(format!("{}/auth/refresh", srv.base_url))
        .json(&json!({ "token": expired }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let fresh = body["token"].as_str().unwrap();

    let res = get_me(&client, &srv, fresh).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_rejects_a_forged_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, account) = srv.register(&client, "alice").await;
    let forged = SessionIssuer::new(b"not-the-server-secret", Duration::minutes(15))
        .issue(account_id(&account), Role::User)
        .unwrap();

    let res = client
        .post(format!("{}/auth/refresh", srv.base_url))
        .json(&json!({ "token": forged }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.register(&client, "dave").await;
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "assertion": assertion_for("dave"),
            "display_name": "dave again",
            "email": "dave2@example.com",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn community_lifecycle_walk() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Alice founds a community and becomes its owner.
    let (alice_token, alice) = srv.register(&client, "alice").await;
    let res = client
        .post(format!("{}/communities", srv.base_url))
        .bearer_auth(&alice_token)
        .json(&json!({ "name": "Casa Verde" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let community_id = created["community"]["id"].as_str().unwrap().to_string();
    let code = created["community"]["join_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 8);
    assert_eq!(created["community"]["owner_id"], alice["id"]);
    assert_eq!(created["account"]["is_owner"], true);
    let alice_token = created["token"].as_str().unwrap().to_string();

    // Bob joins by code as a plain member.
    let (bob_token, _) = srv.register(&client, "bob").await;
    let res = client
        .post(format!("{}/communities/join", srv.base_url))
        .bearer_auth(&bob_token)
        .json(&json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let joined: serde_json::Value = res.json().await.unwrap();
    assert_eq!(joined["account"]["community_id"], community_id.as_str());
    assert_eq!(joined["account"]["is_owner"], false);
    let bob_token = joined["token"].as_str().unwrap().to_string();

    // Joining the community he is already in changes nothing.
    let res = client
        .post(format!("{}/communities/join", srv.base_url))
        .bearer_auth(&bob_token)
        .json(&json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // A plain member cannot dissolve the community.
    let res = client
        .delete(format!("{}/communities/{}", srv.base_url, community_id))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The owner can; both memberships are detached.
    let res = client
        .delete(format!("{}/communities/{}", srv.base_url, community_id))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["members_detached"], 2);

    for token in [&alice_token, &bob_token] {
        let res = get_me(&client, &srv, token).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert!(body["community_id"].is_null());
        assert_eq!(body["is_owner"], false);
    }

    // The join code died with the community.
    let res = client
        .post(format!("{}/communities/join", srv.base_url))
        .bearer_auth(&bob_token)
        .json(&json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn join_code_shape_and_existence_fail_separately() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (token, _) = srv.register(&client, "alice").await;

    let res = client
        .post(format!("{}/communities/join", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "code": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/communities/join", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "code": "AAAA0000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn founding_again_moves_the_founder() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (token, _) = srv.register(&client, "erin").await;
    let res = client
        .post(format!("{}/communities", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "First House" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let first: serde_json::Value = res.json().await.unwrap();
    let first_code = first["community"]["join_code"].as_str().unwrap().to_string();
    let token = first["token"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/communities", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Second House" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let second: serde_json::Value = res.json().await.unwrap();
    let token = second["token"].as_str().unwrap().to_string();

    let res = get_me(&client, &srv, &token).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["community_id"], second["community"]["id"]);

    // The first community survives without its founder.
    let (frank_token, _) = srv.register(&client, "frank").await;
    let res = client
        .post(format!("{}/communities/join", srv.base_url))
        .bearer_auth(&frank_token)
        .json(&json!({ "code": first_code }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn account_updates_enforce_self_and_admin_rules() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (alice_token, alice) = srv.register(&client, "alice").await;
    let (bob_token, bob) = srv.register(&client, "bob").await;
    let alice_id = account_id(&alice);

    // Self-edit normalizes fields and hands back a fresh token.
    let res = client
        .patch(format!("{}/accounts/{}", srv.base_url, alice_id))
        .bearer_auth(&alice_token)
        .json(&json!({ "display_name": "  Alice Smith  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["account"]["display_name"], "Alice Smith");
    assert!(body["token"].as_str().is_some());

    // The pre-edit token is not revoked.
    let res = get_me(&client, &srv, &alice_token).await;
    assert_eq!(res.status(), StatusCode::OK);

    // Bob cannot edit Alice.
    let res = client
        .patch(format!("{}/accounts/{}", srv.base_url, alice_id))
        .bearer_auth(&bob_token)
        .json(&json!({ "display_name": "Mallory" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Nobody self-promotes.
    let res = client
        .patch(format!("{}/accounts/{}", srv.base_url, account_id(&bob)))
        .bearer_auth(&bob_token)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Privileged state is not reachable through the request body.
    let res = client
        .patch(format!("{}/accounts/{}", srv.base_url, alice_id))
        .bearer_auth(&alice_token)
        .json(&json!({ "status": "banned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .patch(format!("{}/accounts/not-a-uuid", srv.base_url))
        .bearer_auth(&alice_token)
        .json(&json!({ "display_name": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .patch(format!("{}/accounts/{}", srv.base_url, AccountId::new()))
        .bearer_auth(&alice_token)
        .json(&json!({ "display_name": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_edits_take_effect_without_revoking_tokens() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (alice_token, alice) = srv.register(&client, "alice").await;
    let (bob_token, bob) = srv.register(&client, "bob").await;

    // Promote Alice out of band. Her existing token picks the role up
    // because authorization reads the stored account, not the claim.
    srv.services
        .accounts
        .update(
            account_id(&alice),
            AccountChange {
                role: Some(Role::Admin),
                ..AccountChange::default()
            },
        )
        .await
        .unwrap();

    let res = client
        .patch(format!("{}/accounts/{}", srv.base_url, account_id(&bob)))
        .bearer_auth(&alice_token)
        .json(&json!({ "role": "resident" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["account"]["role"], "resident");
    assert!(body["token"].is_null());

    // Bob's old token still authenticates and sees the new role.
    let res = get_me(&client, &srv, &bob_token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "resident");
}

#[tokio::test]
async fn banned_accounts_are_locked_out_everywhere() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (token, carol) = srv.register(&client, "carol").await;
    srv.services
        .accounts
        .update(
            account_id(&carol),
            AccountChange {
                status: Some(AccountStatus::Banned),
                ..AccountChange::default()
            },
        )
        .await
        .unwrap();

    let res = get_me(&client, &srv, &token).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "account_disabled");

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "assertion": assertion_for("carol") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
