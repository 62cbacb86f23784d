//! End-to-end pipeline runs against mock servers

use lead_pulse::config::{Config, Credentials, Settings};
use lead_pulse::{LeadField, Pipeline, PipelineState};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/oauth/v2/token";
const COQL_PATH: &str = "/crm/v8/coql";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Creates a configuration whose endpoints all point at `server`
pub fn create_test_config(server: &MockServer) -> Config {
    let mut settings = Settings::default();
    settings.endpoints.token_url = format!("{}{}", server.uri(), TOKEN_PATH);
    settings.endpoints.coql_url = format!("{}{}", server.uri(), COQL_PATH);
    settings.endpoints.llm_base_url = format!("{}/v1", server.uri());

    Config::from_parts(
        Credentials::new("sk-test", "1000.CLIENT", "client-secret", "1000.refresh"),
        settings,
    )
}

async fn mount_token_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1000.refresh"))
        .and(body_string_contains("client_id=1000.CLIENT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "1000.access",
            "api_domain": "https://www.zohoapis.com",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_coql(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(COQL_PATH))
        .and(header("authorization", "Bearer 1000.access"))
        .and(body_string_contains("FROM Contacts WHERE Created_Time >= "))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_llm(server: &MockServer, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

async fn run(server: &MockServer) -> PipelineState {
    let pipeline = Pipeline::new(create_test_config(server)).expect("Failed to create pipeline");
    pipeline.run().await
}

#[tokio::test]
async fn test_full_run_produces_report() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    mount_coql(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "1", "Full_Name": "Asha Rao", "Lead_Source": "Facebook", "Lead_Status": "New", "Campaign": "Diwali"},
                {"id": "2", "Full_Name": "Ben Cole", "Lead_Source": "Facebook", "Lead_Status": "Converted", "Campaign": "Diwali"},
                {"id": "3", "Full_Name": "Chidi Obi", "Lead_Source": "Google", "Lead_Status": null}
            ],
            "info": {"count": 3, "more_records": false}
        })),
    )
    .await;

    // The prompt must carry the per-channel summary
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_string_contains("gpt-4o-mini"))
        .and(body_string_contains("\\\"Facebook\\\": {"))
        .and(body_string_contains("\\\"None\\\": 1"))
        .respond_with(completion("# Lead Report\n\nFacebook leads the day."))
        .expect(1)
        .mount(&server)
        .await;

    let state = run(&server).await;

    assert_eq!(state.error, None);
    assert_eq!(state.access_token.as_deref(), Some("1000.access"));
    assert_eq!(state.raw_records.len(), 3);
    assert_eq!(
        state.classified.keys().collect::<Vec<_>>(),
        vec!["Facebook", "Google"]
    );
    assert_eq!(state.classified["Facebook"].len(), 2);
    assert_eq!(
        state.classified["Google"][0].get(LeadField::FullName).as_deref(),
        Some("Chidi Obi")
    );
    assert_eq!(state.report, "# Lead Report\n\nFacebook leads the day.");
}

#[tokio::test]
async fn test_token_refresh_failure_short_circuits() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(COQL_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_llm(&server, completion("unused"), 0).await;

    let state = run(&server).await;

    let error = state.error.expect("error should be set");
    assert!(error.starts_with("Token refresh failed: HTTP 401"), "{error}");
    assert!(state.access_token.is_none());
    assert!(state.raw_records.is_empty());
    assert!(state.classified.is_empty());
    assert!(state.report.is_empty());
}

#[tokio::test]
async fn test_token_response_without_token_is_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_code"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_llm(&server, completion("unused"), 0).await;

    let state = run(&server).await;

    assert_eq!(
        state.error.as_deref(),
        Some("Token refresh failed: no access token received (invalid_code)")
    );
    assert!(state.access_token.is_none());
    assert!(state.report.is_empty());
}

#[tokio::test]
async fn test_fetch_failure_short_circuits() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    mount_coql(
        &server,
        ResponseTemplate::new(500).set_body_json(json!({"code": "INTERNAL_ERROR"})),
    )
    .await;
    mount_llm(&server, completion("unused"), 0).await;

    let state = run(&server).await;

    let error = state.error.expect("error should be set");
    assert!(error.starts_with("Data fetch failed: HTTP 500"), "{error}");
    assert!(error.contains("INTERNAL_ERROR"));
    assert!(state.raw_records.is_empty());
    assert!(state.classified.is_empty());
    assert!(state.report.is_empty());
}

#[tokio::test]
async fn test_fetch_with_undecodable_body_fails() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    mount_coql(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;
    mount_llm(&server, completion("unused"), 0).await;

    let state = run(&server).await;

    let error = state.error.expect("error should be set");
    assert!(error.starts_with("Data fetch failed: invalid response body"), "{error}");
    assert!(state.classified.is_empty());
}

#[tokio::test]
async fn test_no_content_is_an_empty_run() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    mount_coql(&server, ResponseTemplate::new(204)).await;

    // The report stage still runs, with an empty summary
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_string_contains("as follows:\\n\\n{}\\n\\n"))
        .respond_with(completion("No leads were created in this window."))
        .expect(1)
        .mount(&server)
        .await;

    let state = run(&server).await;

    assert_eq!(state.error, None);
    assert!(state.raw_records.is_empty());
    assert!(state.classified.is_empty());
    assert_eq!(state.report, "No leads were created in this window.");
}

#[tokio::test]
async fn test_empty_data_list_is_an_empty_run() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    mount_coql(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"data": [], "info": {"count": 0}})),
    )
    .await;
    mount_llm(&server, completion("Nothing new today."), 1).await;

    let state = run(&server).await;

    assert_eq!(state.error, None);
    assert!(state.classified.is_empty());
    assert_eq!(state.report, "Nothing new today.");
}

#[tokio::test]
async fn test_inference_failure_is_recorded() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    mount_coql(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"Lead_Source": "Referral", "Lead_Status": "New"}]
        })),
    )
    .await;
    mount_llm(
        &server,
        ResponseTemplate::new(503).set_body_string("upstream overloaded"),
        1,
    )
    .await;

    let state = run(&server).await;

    assert_eq!(
        state.error.as_deref(),
        Some("Report generation failed: HTTP 503: upstream overloaded")
    );
    assert!(state.report.is_empty());
}

#[tokio::test]
async fn test_inference_without_content_is_failure() {
    let server = MockServer::start().await;
    mount_token_ok(&server).await;
    mount_coql(&server, ResponseTemplate::new(204)).await;
    mount_llm(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"choices": []})),
        1,
    )
    .await;

    let state = run(&server).await;

    assert_eq!(
        state.error.as_deref(),
        Some("Report generation failed: model returned no content")
    );
    assert!(state.report.is_empty());
}

#[tokio::test]
async fn test_unreachable_token_endpoint() {
    // Nothing listens on the discard port
    let mut settings = Settings::default();
    settings.endpoints.token_url = "http://127.0.0.1:9/oauth/v2/token".to_string();
    let config = Config::from_parts(Credentials::new("sk", "id", "secret", "refresh"), settings);

    let state = Pipeline::new(config).unwrap().run().await;

    let error = state.error.expect("error should be set");
    assert!(error.starts_with("Token refresh failed: "), "{error}");
    assert!(state.raw_records.is_empty());
    assert!(state.report.is_empty());
}

#[tokio::test]
async fn test_each_run_starts_fresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "1000.access"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(COQL_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;
    mount_llm(&server, completion("ok"), 2).await;

    let pipeline = Pipeline::new(create_test_config(&server)).unwrap();
    let first = pipeline.run().await;
    let second = pipeline.run().await;

    assert_eq!(first, second);
    assert_eq!(second.report, "ok");
}

#[tokio::test]
async fn test_slow_endpoints_are_not_cut_off() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "1000.access"}))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_coql(
        &server,
        ResponseTemplate::new(204).set_delay(std::time::Duration::from_secs(2)),
    )
    .await;
    mount_llm(&server, completion("late but fine"), 1).await;

    let state = run(&server).await;

    assert_eq!(state.error, None);
    assert_eq!(state.report, "late but fine");
}
