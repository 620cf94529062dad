//! Integration tests for the fratapp API and routing gate.
//!
//! Each test spins up a real server on an ephemeral port backed by the
//! in-memory store and drives it over HTTP with reqwest. Redirects are
//! never followed automatically so the gate's 3xx behavior is observable.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fratapp::{
    auth::middleware::{AppState, RateLimiter},
    config::Config,
    email::Mailer,
    gate::routing_gate,
    models::Role,
    routes,
    session::TokenCodec,
    storage::MemoryStore,
};

const TEST_SECRET: &str = "integration-test-secret-0123456789ab";

/// Mailer that records the last reset URL instead of sending anything.
#[derive(Default)]
struct CapturingMailer {
    last_reset_url: Mutex<Option<String>>,
}

impl CapturingMailer {
    fn take_reset_url(&self) -> Option<String> {
        self.last_reset_url.lock().unwrap().take()
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send_password_reset(&self, _to: &str, reset_url: &str) -> bool {
        *self.last_reset_url.lock().unwrap() = Some(reset_url.to_string());
        true
    }
}

fn test_config() -> Config {
    Config {
        session_secret: TEST_SECRET.to_string(),
        session_max_age_secs: 7_776_000,
        session_renew_threshold_secs: 1_209_600,
        cookie_name: "fratapp_session".to_string(),
        cookie_secure: false,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        base_url: "http://localhost:3000".to_string(),
        reset_token_ttl_secs: 3600,
        reset_rate_limit_max: 3,
        reset_rate_limit_window_secs: 3600,
        rate_limit_auth_per_min: 1000,
    }
}

/// Spin up a test server and return its base URL plus handles the tests
/// need to poke at (mailer capture, codec for crafting tokens).
async fn spawn_test_server() -> (String, Arc<CapturingMailer>, Arc<TokenCodec>) {
    let config = Arc::new(test_config());
    let codec = Arc::new(TokenCodec::new(&config));
    let mailer = Arc::new(CapturingMailer::default());

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        mailer: mailer.clone(),
        codec: codec.clone(),
        config,
        rate_limiter: Arc::new(RateLimiter::new()),
    };

    let app = routes::router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            routing_gate,
        ))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (format!("http://{}", addr), mailer, codec)
}

/// Client with a cookie jar and redirects disabled.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Jarless client for tests that set the cookie header by hand.
fn bare_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Helper: create a chapter and return its bootstrap admin invite code.
async fn create_chapter(client: &reqwest::Client, base_url: &str, name: &str) -> String {
    let resp = client
        .post(format!("{}/api/chapters", base_url))
        .json(&serde_json::json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    body["inviteCode"].as_str().unwrap().to_string()
}

/// Helper: sign up a user with the given invite code. The client's cookie
/// jar ends up holding the new session.
async fn signup(
    client: &reqwest::Client,
    base_url: &str,
    code: &str,
    email: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/api/auth/signup", base_url))
        .json(&serde_json::json!({
            "code": code,
            "firstName": "Test",
            "lastName": "User",
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to send request")
}

/// Helper: sign up a fresh admin via chapter bootstrap and return the
/// admin's client plus a member invite code for that org.
async fn setup_org_with_member_code(base_url: &str) -> (reqwest::Client, String) {
    let admin = client();
    let ch_code = create_chapter(&admin, base_url, "Test Chapter").await;
    let resp = signup(&admin, base_url, &ch_code, "admin@example.com", "hunter2secret").await;
    assert_eq!(resp.status(), 200);

    let resp = admin
        .post(format!("{}/api/org/invite-codes", base_url))
        .json(&serde_json::json!({ "role": "member", "maxUses": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let code = body["code"].as_str().unwrap().to_string();
    (admin, code)
}

// ============================================================================
// Signup / Login Tests
// ============================================================================

#[tokio::test]
async fn test_chapter_bootstrap_and_admin_signup() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let client = client();

    let code = create_chapter(&client, &base_url, "Alpha Beta").await;
    assert!(code.starts_with("CH-"));

    let resp = signup(&client, &base_url, &code, "founder@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["redirectUrl"].as_str().unwrap(), "/app");

    // Session cookie from signup grants access to the app
    let resp = client.get(format!("{}/app", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["role"].as_str().unwrap(), "admin");
    assert!(body["userId"].as_str().is_some());
    assert!(body["orgId"].as_str().is_some());
}

#[tokio::test]
async fn test_signup_rejects_bad_invite_code() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let client = client();

    let resp = signup(&client, &base_url, "INV-NOSUCH1", "a@example.com", "longpassword").await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "Invite code is invalid.");
}

#[tokio::test]
async fn test_signup_rejects_duplicate_email() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;

    let first = client();
    let resp = signup(&first, &base_url, &code, "same@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);

    let second = client();
    let resp = signup(&second, &base_url, &code, "same@example.com", "longpassword").await;
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn test_invite_code_exhaustion() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (admin, _code) = setup_org_with_member_code(&base_url).await;

    // A single-use code admits exactly one signup
    let resp = admin
        .post(format!("{}/api/org/invite-codes", base_url))
        .json(&serde_json::json!({ "role": "member", "maxUses": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let code = body["code"].as_str().unwrap().to_string();

    let resp = signup(&client(), &base_url, &code, "one@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);

    let resp = signup(&client(), &base_url, &code, "two@example.com", "longpassword").await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"].as_str().unwrap(),
        "Invite code has no remaining uses."
    );
}

#[tokio::test]
async fn test_login_and_uniform_failure() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;

    let resp = signup(&client(), &base_url, &code, "m@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);

    // Wrong password and unknown email return the identical answer
    let fresh = client();
    for (email, password) in [
        ("m@example.com", "wrongpassword"),
        ("nosuch@example.com", "longpassword"),
    ] {
        let resp = fresh
            .post(format!("{}/api/auth/login", base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"].as_str().unwrap(), "Invalid credentials.");
    }

    // Correct credentials set a session
    let resp = fresh
        .post(format!("{}/api/auth/login", base_url))
        .json(&serde_json::json!({ "email": "m@example.com", "password": "longpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fresh.get(format!("{}/app", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;

    let resp = signup(&client(), &base_url, &code, "Case@Example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);

    let fresh = client();
    let resp = fresh
        .post(format!("{}/api/auth/login", base_url))
        .json(&serde_json::json!({ "email": "case@example.com", "password": "longpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (admin, _code) = setup_org_with_member_code(&base_url).await;

    let resp = admin
        .post(format!("{}/api/auth/logout", base_url))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get("location").unwrap(), "/login");

    // Cleared cookie means the gate no longer recognizes the caller
    let resp = admin.get(format!("{}/app", base_url)).send().await.unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "/login?next=%2Fapp"
    );
}

// ============================================================================
// Routing Gate Tests
// ============================================================================

#[tokio::test]
async fn test_protected_path_redirects_anonymous_to_login() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let client = client();

    let resp = client
        .get(format!("{}/app/receipts", base_url))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "/login?next=%2Fapp%2Freceipts"
    );
}

#[tokio::test]
async fn test_public_path_redirects_authenticated_home() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (admin, _code) = setup_org_with_member_code(&base_url).await;

    for path in ["/login", "/signup", "/"] {
        let resp = admin
            .get(format!("{}{}", base_url, path))
            .send()
            .await
            .unwrap();
        assert!(
            resp.status().is_redirection(),
            "{} should redirect a logged-in user",
            path
        );
        assert_eq!(resp.headers().get("location").unwrap(), "/app");
    }
}

#[tokio::test]
async fn test_public_path_passes_anonymous_through() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let client = client();

    for path in ["/", "/login", "/signup", "/invite", "/setup-chapter"] {
        let resp = client
            .get(format!("{}{}", base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "{} should be reachable anonymously", path);
    }
}

#[tokio::test]
async fn test_admin_area_denied_for_member() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;

    let member = client();
    let resp = signup(&member, &base_url, &code, "member@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);

    // Denial is a redirect to the app home, not an error
    let resp = member
        .get(format!("{}/app/admin", base_url))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get("location").unwrap(), "/app");

    // The regular app area stays reachable
    let resp = member.get(format!("{}/app", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_admin_area_allows_admin() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (admin, _code) = setup_org_with_member_code(&base_url).await;

    let resp = admin
        .get(format!("{}/app/admin/org", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["admin"].as_bool().unwrap());
    assert_eq!(body["role"].as_str().unwrap(), "admin");
}

#[tokio::test]
async fn test_admin_area_allows_treasurer() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (admin, _code) = setup_org_with_member_code(&base_url).await;

    // Treasurers clear the admin-area bar even though they cannot manage
    // org settings
    let resp = admin
        .post(format!("{}/api/org/invite-codes", base_url))
        .json(&serde_json::json!({ "role": "treasurer", "maxUses": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let code = body["code"].as_str().unwrap().to_string();

    let treasurer = client();
    let resp = signup(&treasurer, &base_url, &code, "t@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);

    let resp = treasurer
        .get(format!("{}/app/admin", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["role"].as_str().unwrap(), "treasurer");

    // But invite-code management is still exec-gated
    let resp = treasurer
        .get(format!("{}/api/org/invite-codes", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_expired_token_treated_as_anonymous() {
    let (base_url, _mailer, codec) = spawn_test_server().await;

    // Token issued far enough in the past that it is already expired,
    // signed with the live key
    let expired = codec
        .encode_at("user-x", Role::Admin, "org-x", 1_000_000)
        .unwrap();

    let client = bare_client();
    let resp = client
        .get(format!("{}/app", base_url))
        .header("cookie", format!("fratapp_session={}", expired))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get("location").unwrap(), "/login?next=%2Fapp");
}

#[tokio::test]
async fn test_tampered_cookie_treated_as_anonymous() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;

    let client = bare_client();
    let resp = client
        .get(format!("{}/app", base_url))
        .header("cookie", "fratapp_session=not.a.token")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get("location").unwrap(), "/login?next=%2Fapp");
}

#[tokio::test]
async fn test_gate_strips_spoofed_identity_headers() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;

    let member = client();
    let resp = signup(&member, &base_url, &code, "honest@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);

    // Client-supplied identity headers must be replaced with the verified
    // values from the token
    let resp = member
        .get(format!("{}/app", base_url))
        .header("x-user-id", "forged")
        .header("x-role", "admin")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_ne!(body["userId"].as_str().unwrap(), "forged");
    assert_eq!(body["role"].as_str().unwrap(), "member");
}

#[tokio::test]
async fn test_near_expiry_session_is_renewed() {
    let (base_url, _mailer, codec) = spawn_test_server().await;

    // Valid token with less than the renewal threshold remaining
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let aging = codec
        .encode_at("user-r", Role::Member, "org-r", now - 7_776_000 + 60)
        .unwrap();

    let client = bare_client();
    let resp = client
        .get(format!("{}/app", base_url))
        .header("cookie", format!("fratapp_session={}", aging))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // A fresh cookie rides along with the forwarded response
    let set_cookie = resp
        .headers()
        .get("set-cookie")
        .expect("renewal should set a cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("fratapp_session="));
    let renewed_token = set_cookie
        .trim_start_matches("fratapp_session=")
        .split(';')
        .next()
        .unwrap();
    assert_ne!(renewed_token, aging);

    // Renewed token carries the same identity
    let claims = codec.decode(renewed_token).unwrap();
    assert_eq!(claims.sub, "user-r");
    assert_eq!(claims.role, Role::Member);
    assert_eq!(claims.org_id, "org-r");
}

#[tokio::test]
async fn test_fresh_session_is_not_renewed() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (admin, _code) = setup_org_with_member_code(&base_url).await;

    let resp = admin.get(format!("{}/app", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("set-cookie").is_none());
}

// ============================================================================
// Invite Validation Tests
// ============================================================================

#[tokio::test]
async fn test_validate_invite_shapes() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;
    let client = client();

    // Missing code
    let resp = client
        .get(format!("{}/api/auth/invite", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Unknown code
    let resp = client
        .get(format!("{}/api/auth/invite?code=INV-NOSUCH1", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(!body["valid"].as_bool().unwrap());

    // Valid code reveals the org and role being joined
    let resp = client
        .get(format!("{}/api/auth/invite?code={}", base_url, code))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["valid"].as_bool().unwrap());
    assert_eq!(body["orgName"].as_str().unwrap(), "Test Chapter");
    assert_eq!(body["role"].as_str().unwrap(), "member");
}

// ============================================================================
// Org Management Tests
// ============================================================================

#[tokio::test]
async fn test_invite_code_management_requires_exec() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;

    // Anonymous caller
    let resp = client()
        .get(format!("{}/api/org/invite-codes", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Member lacks exec privileges
    let member = client();
    let resp = signup(&member, &base_url, &code, "plain@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);

    let resp = member
        .get(format!("{}/api/org/invite-codes", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = member
        .post(format!("{}/api/org/invite-codes", base_url))
        .json(&serde_json::json!({ "role": "member" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_list_and_revoke_invite_codes() {
    let (base_url, _mailer, _codec) = spawn_test_server().await;
    let (admin, code) = setup_org_with_member_code(&base_url).await;

    // Bootstrap CH- code plus the member code created in setup
    let resp = admin
        .get(format!("{}/api/org/invite-codes", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["inviteCodes"].as_array().unwrap().len(), 2);

    // Revoke the member code
    let resp = admin
        .delete(format!(
            "{}/api/org/invite-codes/revoke?code={}",
            base_url, code
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Revoked code no longer admits signups
    let resp = signup(&client(), &base_url, &code, "late@example.com", "longpassword").await;
    assert_eq!(resp.status(), 400);

    // Revoking a code from another org is a 404, not a cross-org delete
    let other = client();
    let other_code = create_chapter(&other, &base_url, "Other Chapter").await;
    let resp = signup(&other, &base_url, &other_code, "rival@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);

    let remaining: serde_json::Value = admin
        .get(format!("{}/api/org/invite-codes", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ch_code = remaining["inviteCodes"][0]["code"].as_str().unwrap();

    let resp = other
        .delete(format!(
            "{}/api/org/invite-codes/revoke?code={}",
            base_url, ch_code
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

// ============================================================================
// Password Reset Tests
// ============================================================================

fn token_from_reset_url(url: &str) -> String {
    url.split("token=").nth(1).unwrap().to_string()
}

#[tokio::test]
async fn test_password_reset_round_trip() {
    let (base_url, mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;

    let resp = signup(&client(), &base_url, &code, "reset@example.com", "oldpassword1").await;
    assert_eq!(resp.status(), 200);

    let resetter = client();
    let resp = resetter
        .post(format!("{}/api/auth/forgot-password", base_url))
        .json(&serde_json::json!({ "email": "reset@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let reset_url = mailer.take_reset_url().expect("reset email should be sent");
    let token = token_from_reset_url(&reset_url);

    // Spend the token
    let resp = resetter
        .post(format!("{}/api/auth/reset-password", base_url))
        .json(&serde_json::json!({ "token": token, "password": "newpassword1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Reset logs the user straight in
    let resp = resetter.get(format!("{}/app", base_url)).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    // Old password is dead, new one works
    let fresh = client();
    let resp = fresh
        .post(format!("{}/api/auth/login", base_url))
        .json(&serde_json::json!({ "email": "reset@example.com", "password": "oldpassword1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fresh
        .post(format!("{}/api/auth/login", base_url))
        .json(&serde_json::json!({ "email": "reset@example.com", "password": "newpassword1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The token is single-use
    let resp = fresh
        .post(format!("{}/api/auth/reset-password", base_url))
        .json(&serde_json::json!({ "token": token, "password": "thirdpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_forgot_password_does_not_disclose_accounts() {
    let (base_url, mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;

    let resp = signup(&client(), &base_url, &code, "exists@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);
    let client = client();

    let mut bodies = Vec::new();
    for email in ["exists@example.com", "ghost@example.com"] {
        let resp = client
            .post(format!("{}/api/auth/forgot-password", base_url))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        bodies.push(resp.text().await.unwrap());
    }
    assert_eq!(bodies[0], bodies[1]);

    // Only the real account produced an email
    assert!(mailer.take_reset_url().is_some());
}

#[tokio::test]
async fn test_forgot_password_per_account_cap() {
    let (base_url, mailer, _codec) = spawn_test_server().await;
    let (_admin, code) = setup_org_with_member_code(&base_url).await;

    let resp = signup(&client(), &base_url, &code, "capped@example.com", "longpassword").await;
    assert_eq!(resp.status(), 200);
    let client = client();

    // Cap is 3 per window; every answer stays neutral
    for _ in 0..4 {
        let resp = client
            .post(format!("{}/api/auth/forgot-password", base_url))
            .json(&serde_json::json!({ "email": "capped@example.com" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        mailer.take_reset_url();
    }

    // The capped request produced no email
    let resp = client
        .post(format!("{}/api/auth/forgot-password", base_url))
        .json(&serde_json::json!({ "email": "capped@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(mailer.take_reset_url().is_none());
}
