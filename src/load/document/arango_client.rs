use crate::config::DocumentStoreConfig;
use crate::load::error::LoadError;
use crate::load::traits::{DocumentStore, InsertSummary};
use crate::transform::records::Record;
use log::debug;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Blocking client for the collection and document endpoints of an ArangoDB server.
pub struct DocumentClient {
    client: Client,
    host: String,
    database: String,
    username: String,
    password: String,
}

impl fmt::Debug for DocumentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentClient")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"********")
            .field("client", &"reqwest::blocking::Client")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

impl DocumentClient {
    pub fn new(
        host: &str,
        database: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, LoadError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            host: host.trim_end_matches('/').to_string(),
            database: database.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn from_config(config: &DocumentStoreConfig) -> Result<Self, LoadError> {
        Self::new(
            &config.host,
            &config.database,
            &config.username,
            &config.password,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn collection_url(&self, collection: &str, action: &str) -> String {
        format!(
            "{}/_db/{}/_api/collection/{collection}/{action}",
            self.host, self.database
        )
    }

    fn document_url(&self, collection: &str) -> String {
        format!("{}/_db/{}/_api/document/{collection}", self.host, self.database)
    }

    fn check(response: Response) -> Result<Response, LoadError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        Err(LoadError::Status {
            url,
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        })
    }
}

impl DocumentStore for DocumentClient {
    fn truncate(&self, collection: &str) -> Result<(), LoadError> {
        let response = self
            .client
            .put(self.collection_url(collection, "truncate"))
            .basic_auth(&self.username, Some(&self.password))
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    fn count(&self, collection: &str) -> Result<u64, LoadError> {
        let response = self
            .client
            .get(self.collection_url(collection, "count"))
            .basic_auth(&self.username, Some(&self.password))
            .send()?;
        let count: CountResponse = Self::check(response)?.json()?;
        Ok(count.count)
    }

    fn insert_many(
        &self,
        collection: &str,
        documents: &[Record],
        overwrite: bool,
    ) -> Result<InsertSummary, LoadError> {
        let response = self
            .client
            .post(self.document_url(collection))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("overwrite", overwrite)])
            .json(documents)
            .send()?;
        let body: Value = Self::check(response)?.json()?;

        let Value::Array(results) = body else {
            return Err(LoadError::MalformedResponse(format!(
                "expected one result per document from '{collection}', got {body}"
            )));
        };

        let mut summary = InsertSummary::default();
        for result in results {
            if result.get("error").and_then(Value::as_bool).unwrap_or(false) {
                let message = result
                    .get("errorMessage")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                summary.errors.push(message.to_string());
            } else {
                summary.created += 1;
            }
        }
        debug!(
            "Insert into '{collection}': {} created, {} refused.",
            summary.created,
            summary.errors.len()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn client(server: &Server) -> DocumentClient {
        DocumentClient::new(
            &server.url(),
            "KhaBench",
            "root",
            "secret",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn docs() -> Vec<Record> {
        vec![
            json!({"_key": "t1", "title": "Rust"}).as_object().cloned().unwrap(),
            json!({"_key": "t2", "title": "Go"}).as_object().cloned().unwrap(),
        ]
    }

    #[rstest]
    fn test_count_and_truncate() {
        let mut server = Server::new();
        let count = server
            .mock("GET", "/_db/KhaBench/_api/collection/Tag/count")
            .match_header("authorization", "Basic cm9vdDpzZWNyZXQ=")
            .with_status(200)
            .with_body(r#"{"count": 12, "name": "Tag"}"#)
            .create();
        let truncate = server
            .mock("PUT", "/_db/KhaBench/_api/collection/Tag/truncate")
            .with_status(200)
            .with_body("{}")
            .create();

        let client = client(&server);
        assert_eq!(client.count("Tag").unwrap(), 12);
        client.truncate("Tag").unwrap();

        count.assert();
        truncate.assert();
    }

    #[rstest]
    fn test_insert_many_reports_refused_documents() {
        let mut server = Server::new();
        let insert = server
            .mock("POST", "/_db/KhaBench/_api/document/Tag")
            .match_query(Matcher::UrlEncoded("overwrite".into(), "true".into()))
            .match_body(Matcher::Json(json!([
                {"_key": "t1", "title": "Rust"},
                {"_key": "t2", "title": "Go"}
            ])))
            .with_status(202)
            .with_body(
                r#"[{"_id": "Tag/t1", "_key": "t1", "_rev": "_a"},
                    {"error": true, "errorNum": 1210, "errorMessage": "unique constraint violated"}]"#,
            )
            .create();

        let summary = client(&server).insert_many("Tag", &docs(), true).unwrap();

        insert.assert();
        assert_eq!(
            summary,
            InsertSummary {
                created: 1,
                errors: vec!["unique constraint violated".to_string()],
            }
        );
    }

    #[rstest]
    fn test_http_failure_is_an_error() {
        let mut server = Server::new();
        server
            .mock("POST", "/_db/KhaBench/_api/document/Tag")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error": true, "errorMessage": "collection not found"}"#)
            .create();

        let err = client(&server).insert_many("Tag", &docs(), false).unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
    }
}
