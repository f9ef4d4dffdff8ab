//! API request context against a mock backend

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clubadmin_e2e::api::{ApiContext, REGISTER_PATH};
use clubadmin_e2e::fixtures::SuiteFixtures;
use clubadmin_e2e::model::RegisterUser;
use clubadmin_e2e::suite::CategoryTypesSuite;
use clubadmin_e2e::{E2eError, SuiteConfig};

fn config_for(server: &MockServer) -> SuiteConfig {
    SuiteConfig {
        api_base_url: server.uri(),
        base_url: server.uri(),
        ..SuiteConfig::default()
    }
}

#[tokio::test]
async fn register_posts_generated_admin_user() {
    let server = MockServer::start().await;
    let fixtures = SuiteFixtures::from_suffix("ab12cd34", "playwrite.com");

    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .and(body_json(json!({
            "email": "email+ab12cd34@playwrite.com",
            "password": "password+ab12cd34",
            "roles": ["ROLE_ADMIN"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let api = ApiContext::new(&config).unwrap();
    let status = api
        .register_user(&RegisterUser::new(&fixtures.credentials, &config.user_roles))
        .await
        .unwrap();

    assert!(status.is_success());
    api.dispose();
}

#[tokio::test]
async fn register_rejection_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_string("email already registered"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let api = ApiContext::new(&config).unwrap();
    let fixtures = SuiteFixtures::generate(&config.email_domain);

    let err = api
        .register_user(&RegisterUser::new(&fixtures.credentials, &config.user_roles))
        .await
        .unwrap_err();

    match err {
        E2eError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 409);
            assert_eq!(body, "email already registered");
        }
        other => panic!("expected unexpected-status error, got {other}"),
    }
}

#[tokio::test]
async fn preflight_accepts_client_errors_but_not_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = ApiContext::new(&config_for(&server)).unwrap();

    api.wait_until_reachable(&format!("{}/up", server.uri()), Duration::from_secs(2))
        .await
        .unwrap();

    let err = api
        .wait_until_reachable(&format!("{}/down", server.uri()), Duration::from_millis(600))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::Unreachable(_, attempts) if attempts >= 1));
}

#[tokio::test]
async fn before_all_checks_the_api_before_registering() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1..)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // The console is down; only the API has to answer before setup.
    let mut config = config_for(&server);
    config.base_url = "http://127.0.0.1:1".to_string();
    config.timeouts.navigation_ms = 1_000;

    let suite = CategoryTypesSuite::before_all(&config, true).await.unwrap();
    suite.after_all();
}
