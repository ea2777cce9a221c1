use httpmock::prelude::*;
use http_stress::core::Outcome;
use http_stress::{run_plan, HttpMethod, HttpSender, RunOptions, StressEngine, StressPlan};
use std::time::Duration;
use tempfile::TempDir;

fn plan(url: String, total_requests: usize, concurrency: usize) -> StressPlan {
    StressPlan {
        url,
        method: HttpMethod::Get,
        total_requests,
        concurrency,
        interval: Duration::ZERO,
        body: String::new(),
        headers: vec![("User-Agent".to_string(), "http-stress-tests".to_string())],
        timeout: Some(Duration::from_secs(5)),
    }
}

#[tokio::test]
async fn test_end_to_end_against_mock_server() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/products")
            .header("User-Agent", "http-stress-tests");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([{"id": 1}]));
    });

    let options = RunOptions {
        quiet: true,
        output_dir: output_dir.clone(),
        json_report: Some("summary.json".to_string()),
        csv_report: Some("requests.csv".to_string()),
        ..Default::default()
    };

    let report = run_plan(plan(server.url("/products"), 25, 5), &options)
        .await
        .unwrap();

    api_mock.assert_hits(25);
    assert_eq!(report.total_requests, 25);
    assert_eq!(report.status_counts.get(&200), Some(&25));
    assert_eq!(report.failed_requests, 0);
    assert!(report.p50_response_ms.is_some());

    let summary: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp_dir.path().join("summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["total_requests"], 25);
    assert_eq!(summary["status_counts"]["200"], 25);

    let csv = std::fs::read_to_string(temp_dir.path().join("requests.csv")).unwrap();
    assert_eq!(csv.lines().count(), 26);
    assert!(csv.starts_with("request_number,status,duration_ms,error"));
}

#[tokio::test]
async fn test_post_body_reaches_every_request() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/events").body(r#"{"kind":"click"}"#);
        then.status(202);
    });

    let mut plan = plan(server.url("/events"), 6, 3);
    plan.method = HttpMethod::Post;
    plan.body = r#"{"kind":"click"}"#.to_string();

    let report = StressEngine::new(HttpSender::new(), plan)
        .quiet(true)
        .run()
        .await
        .unwrap();

    api_mock.assert_hits(6);
    assert_eq!(report.status_counts.get(&202), Some(&6));
}

#[tokio::test]
async fn test_mixed_statuses_are_counted_separately() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ok");
        then.status(200);
    });
    let missing = server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404);
    });

    let ok_report = StressEngine::new(HttpSender::new(), plan(server.url("/ok"), 3, 1))
        .quiet(true)
        .run()
        .await
        .unwrap();
    let missing_report = StressEngine::new(HttpSender::new(), plan(server.url("/missing"), 4, 2))
        .quiet(true)
        .run()
        .await
        .unwrap();

    missing.assert_hits(4);
    assert_eq!(ok_report.successful_requests(), 3);
    assert_eq!(missing_report.status_counts.get(&404), Some(&4));
    assert_eq!(missing_report.successful_requests(), 0);
    assert!(missing_report
        .render_summary()
        .contains("Status: 404, Counter:4"));
}

#[tokio::test]
async fn test_unreachable_target_records_failures_without_aborting() {
    let report = StressEngine::new(
        HttpSender::new(),
        plan("http://127.0.0.1:1/".to_string(), 3, 2),
    )
    .quiet(true)
    .run()
    .await
    .unwrap();

    assert_eq!(report.failed_requests, 3);
    assert!(report.status_counts.is_empty());
    assert_eq!(report.average_response_ms, 0);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.outcome, Outcome::Failed(_)) && o.duration.is_zero()));
    assert!(report.render_summary().contains("Status: failed, Counter:3"));
}

#[tokio::test]
async fn test_timeouts_count_as_failures() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200).delay(Duration::from_millis(1500));
    });

    let mut plan = plan(server.url("/slow"), 2, 2);
    plan.timeout = Some(Duration::from_millis(100));

    let report = StressEngine::new(HttpSender::new(), plan)
        .quiet(true)
        .run()
        .await
        .unwrap();

    assert_eq!(report.failed_requests, 2);
}
