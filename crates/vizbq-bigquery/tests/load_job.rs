//! Integration tests for `BigQueryClient::load_records` using wiremock HTTP
//! mocks and a temporary staging directory.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use vizbq_auth::Authenticator;
use vizbq_bigquery::{BigQueryClient, BigQueryError, LoadSettings, LoadTarget};
use vizbq_core::{WriteDisposition, ANNOTATIONS_TABLE};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INSERT_PATH: &str = "/upload/bigquery/v2/projects/proj/jobs";

fn test_client(base_url: &str, staging_dir: &Path, load_timeout: Duration) -> BigQueryClient {
    let auth = Arc::new(Authenticator::with_static_token("test-token"));
    let settings = LoadSettings {
        staging_dir: staging_dir.to_path_buf(),
        poll_interval: Duration::from_millis(10),
        load_timeout,
    };
    BigQueryClient::with_base_url(auth, 30, "vizbq-test", settings, base_url)
        .expect("client construction should not fail")
}

fn target(autodetect: bool) -> LoadTarget {
    LoadTarget {
        project_id: "proj".to_string(),
        dataset_id: "creative_insights".to_string(),
        table_id: ANNOTATIONS_TABLE.to_string(),
        write_disposition: WriteDisposition::WriteTruncate,
        schema_autodetect: autodetect,
    }
}

fn rows() -> Vec<serde_json::Value> {
    vec![
        json!({ "creative_id": "gs://b/a.png", "creative_uri": "gs://b/a.png" }),
        json!({ "creative_id": "gs://b/b.png", "creative_uri": "gs://b/b.png" }),
    ]
}

fn job_body(state: &str) -> serde_json::Value {
    json!({
        "jobReference": { "projectId": "proj", "jobId": "job-1", "location": "EU" },
        "status": { "state": state }
    })
}

#[tokio::test]
async fn load_records_submits_and_polls_until_done() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(INSERT_PATH))
        .and(query_param("uploadType", "multipart"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_string_contains("\"writeDisposition\":\"WRITE_TRUNCATE\""))
        .and(body_string_contains("\"createDisposition\":\"CREATE_IF_NEEDED\""))
        .and(body_string_contains("\"sourceFormat\":\"NEWLINE_DELIMITED_JSON\""))
        .and(body_string_contains("\"tableId\":\"gcp_vision_api_annotations\""))
        .and(body_string_contains("\"schema\":{\"fields\""))
        .and(body_string_contains("{\"creative_id\":\"gs://b/b.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("RUNNING")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bigquery/v2/projects/proj/jobs/job-1"))
        .and(query_param("location", "EU"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobReference": { "projectId": "proj", "jobId": "job-1", "location": "EU" },
            "status": { "state": "DONE" },
            "statistics": { "load": { "outputRows": "2" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), dir.path(), Duration::from_secs(5));
    let summary = client
        .load_records(&target(false), &rows())
        .await
        .expect("load should succeed");

    assert_eq!(summary.table, ANNOTATIONS_TABLE);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.job_id.as_deref(), Some("job-1"));
    assert_eq!(
        summary.staging_path,
        dir.path().join("gcp_vision_api_annotations.json")
    );
    let staged = std::fs::read_to_string(&summary.staging_path).unwrap();
    assert_eq!(staged.lines().count(), 2);
}

#[tokio::test]
async fn load_records_autodetect_sends_no_schema() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(INSERT_PATH))
        .and(body_string_contains("\"autodetect\":true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("DONE")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), dir.path(), Duration::from_secs(5));
    let summary = client
        .load_records(&target(true), &rows())
        .await
        .expect("load should succeed");
    assert_eq!(summary.job_id.as_deref(), Some("job-1"));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("\"schema\""), "schema should be omitted: {body}");
}

#[tokio::test]
async fn load_records_empty_batch_skips_job() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("DONE")))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), dir.path(), Duration::from_secs(5));
    let empty: Vec<serde_json::Value> = Vec::new();
    let summary = client
        .load_records(&target(false), &empty)
        .await
        .expect("empty batch should not fail");

    assert_eq!(summary.rows, 0);
    assert!(summary.job_id.is_none());
    assert_eq!(std::fs::read_to_string(&summary.staging_path).unwrap(), "");
}

#[tokio::test]
async fn load_records_reports_job_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(INSERT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobReference": { "projectId": "proj", "jobId": "job-9" },
            "status": {
                "state": "DONE",
                "errorResult": { "reason": "invalid", "message": "Error while reading data" },
                "errors": [ { "reason": "invalid", "location": "line 2", "message": "No such field: extra" } ]
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), dir.path(), Duration::from_secs(5));
    let err = client
        .load_records(&target(false), &rows())
        .await
        .expect_err("job error should fail");

    match err {
        BigQueryError::LoadFailed {
            job_id,
            reason,
            details,
            ..
        } => {
            assert_eq!(job_id, "job-9");
            assert_eq!(reason, "invalid");
            assert_eq!(details, vec!["line 2: No such field: extra".to_string()]);
        }
        other => panic!("expected LoadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn load_records_rejected_insert() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(INSERT_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found: Dataset proj:creative_insights"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), dir.path(), Duration::from_secs(5));
    let err = client
        .load_records(&target(false), &rows())
        .await
        .expect_err("404 should fail");
    assert!(
        matches!(err, BigQueryError::UnexpectedStatus { status: 404, .. }),
        "got {err:?}"
    );
    // The staging file is written before submission and kept.
    assert!(dir.path().join("gcp_vision_api_annotations.json").exists());
}

#[tokio::test]
async fn load_records_times_out() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(INSERT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("PENDING")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bigquery/v2/projects/proj/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body("RUNNING")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), dir.path(), Duration::from_millis(50));
    let err = client
        .load_records(&target(false), &rows())
        .await
        .expect_err("a job that never finishes should time out");
    assert!(
        matches!(err, BigQueryError::LoadTimeout { ref job_id, ref state, .. } if job_id == "job-1" && state == "RUNNING"),
        "got {err:?}"
    );
}
