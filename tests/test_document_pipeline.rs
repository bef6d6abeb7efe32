use khaload::config::{DocumentStoreConfig, KhaloadConfig};
use khaload::error::PipelineError;
use khaload::load::batch::BatchReport;
use khaload::load::document::DocumentClient;
use khaload::pipeline::{DocumentPipeline, LoaderOutcome};
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[fixture]
fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

fn config(server: &Server, temp_dir: &TempDir) -> DocumentStoreConfig {
    DocumentStoreConfig {
        data_dir: temp_dir.path().to_path_buf(),
        host: server.url(),
        ..KhaloadConfig::default().document
    }
}

fn loaded(submitted: usize, committed: usize, succeeded: usize, failed: usize) -> LoaderOutcome {
    LoaderOutcome::Loaded(BatchReport {
        submitted,
        committed,
        succeeded_batches: succeeded,
        failed_batches: failed,
    })
}

#[rstest]
fn test_tags_and_vendors_end_to_end(temp_dir: TempDir) {
    fs::write(temp_dir.path().join("Tag.csv"), "id|title\n1|Rust\n2|Go\n").unwrap();
    fs::write(
        temp_dir.path().join("Vendor.csv"),
        "id,country,industry\nv1,Spain,Retail\n",
    )
    .unwrap();

    let mut server = Server::new();
    let counts = server
        .mock("GET", Matcher::Regex(r"^/_db/KhaBench/_api/collection/\w+/count$".to_string()))
        .with_status(200)
        .with_body(r#"{"count": 3}"#)
        .expect(23)
        .create();
    let truncates = server
        .mock("PUT", Matcher::Regex(r"^/_db/KhaBench/_api/collection/\w+/truncate$".to_string()))
        .with_status(200)
        .with_body("{}")
        .expect(23)
        .create();
    let tags = server
        .mock("POST", "/_db/KhaBench/_api/document/Tag")
        .match_query(Matcher::UrlEncoded("overwrite".into(), "false".into()))
        .match_body(Matcher::Json(json!([
            {"_key": "1", "title": "Rust"},
            {"_key": "2", "title": "Go"}
        ])))
        .with_status(202)
        .with_body(r#"[{"_key": "1"}, {"_key": "2"}]"#)
        .create();
    let vendors = server
        .mock("POST", "/_db/KhaBench/_api/document/Vendor")
        .match_query(Matcher::Any)
        .match_body(Matcher::Json(json!([
            {"_key": "v1", "country": "Spain", "industry": "Retail"}
        ])))
        .with_status(202)
        .with_body(r#"[{"_key": "v1"}]"#)
        .create();

    let client = DocumentClient::from_config(&config(&server, &temp_dir)).unwrap();
    let summary = DocumentPipeline::new(&client, &config(&server, &temp_dir)).run();

    counts.assert();
    truncates.assert();
    tags.assert();
    vendors.assert();
    assert!(summary.is_clean(), "{:?}", summary.failures);
    assert_eq!(summary.outcome("Tag"), Some(&loaded(2, 2, 1, 0)));
    assert_eq!(summary.outcome("Vendor"), Some(&loaded(1, 1, 1, 0)));
    assert!(matches!(
        summary.outcome("Order"),
        Some(LoaderOutcome::Skipped(_))
    ));
}

#[rstest]
fn test_rejected_batch_does_not_stop_the_run(temp_dir: TempDir) {
    fs::write(temp_dir.path().join("Tag.csv"), "id|title\n1|Rust\n").unwrap();
    fs::write(temp_dir.path().join("Vendor.csv"), "id|country\nv1|Spain\n").unwrap();

    let mut server = Server::new();
    server
        .mock("POST", "/_db/KhaBench/_api/document/Tag")
        .match_query(Matcher::Any)
        .with_status(409)
        .with_body(r#"{"error": true, "errorMessage": "conflict"}"#)
        .create();

    let config = DocumentStoreConfig {
        truncate_on_start: false,
        ..config(&server, &temp_dir)
    };
    let client = DocumentClient::from_config(&config).unwrap();
    let summary = DocumentPipeline::new(&client, &config).run();

    assert!(!summary.is_clean());
    assert_eq!(summary.outcome("Tag"), Some(&loaded(1, 0, 0, 1)));
    assert!(matches!(
        summary.failure("Vendor"),
        Some(PipelineError::Transform(_))
    ));
    assert_eq!(summary.outcomes.len() + summary.failures.len(), 13);
}
