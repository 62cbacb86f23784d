//! Markdown and JSON outputs of a finished run

use lead_pulse::config::{Config, Credentials, Settings};
use lead_pulse::output::{write_export, write_run_summary};
use lead_pulse::Pipeline;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn completed_run(server: &MockServer) -> lead_pulse::PipelineState {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "1000.secret-access"})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/coql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"Full_Name": "Asha Rao", "Lead_Source": "Facebook", "Lead_Status": "Converted", "Campaign": "Diwali"},
                {"Full_Name": "Ben Cole", "Lead_Source": "Facebook", "Lead_Status": "New", "Campaign": "Diwali"},
                {"Full_Name": "Chidi Obi", "Lead_Source": "", "Disposition": "Callback"}
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "## Insights\n\nFacebook drives volume."}}]
        })))
        .mount(server)
        .await;

    let mut settings = Settings::default();
    settings.endpoints.token_url = format!("{}/token", server.uri());
    settings.endpoints.coql_url = format!("{}/coql", server.uri());
    settings.endpoints.llm_base_url = server.uri();
    let config = Config::from_parts(Credentials::new("sk", "id", "secret", "refresh"), settings);

    Pipeline::new(config).unwrap().run().await
}

#[tokio::test]
async fn test_run_summary_written_after_success() {
    let server = MockServer::start().await;
    let state = completed_run(&server).await;
    assert_eq!(state.error, None);

    let temp_dir = TempDir::new().unwrap();
    let report_path = temp_dir.path().join("report.md");
    write_run_summary(&state, "2026-10-17 09:00:00 +05:30", &report_path).unwrap();

    let markdown = std::fs::read_to_string(&report_path).unwrap();
    assert!(markdown.contains("- **Total Leads**: 3"));
    assert!(markdown.contains("- **Lead Sources**: 2"));
    assert!(markdown.contains("| Facebook | 2 |"));
    assert!(markdown.contains("| Unknown | 1 | Unknown | Callback |"));
    assert!(markdown.contains("| Facebook | Diwali | 2 |"));
    assert!(markdown.ends_with("## AI Insights\n\n## Insights\n\nFacebook drives volume.\n"));
}

#[tokio::test]
async fn test_export_written_after_success() {
    let server = MockServer::start().await;
    let state = completed_run(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let export_path = temp_dir.path().join("run.json");
    write_export(&state, "2026-10-17 09:00:00 +05:30", &export_path).unwrap();

    let text = std::fs::read_to_string(&export_path).unwrap();
    assert!(!text.contains("1000.secret-access"));

    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["metrics"]["total_leads"], 3);
    assert_eq!(value["classified"]["Facebook"].as_array().unwrap().len(), 2);
    assert_eq!(value["classified"]["Unknown"][0]["Full_Name"], "Chidi Obi");
    assert_eq!(value["summaries"]["Facebook"]["campaigns"], json!(["Diwali"]));
    assert_eq!(value["report"], "## Insights\n\nFacebook drives volume.");
}
