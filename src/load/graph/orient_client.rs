use crate::config::GraphStoreConfig;
use crate::load::error::LoadError;
use crate::load::traits::CommandExecutor;
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;

/// Blocking client for the `/batch/{database}` endpoint of an OrientDB server.
pub struct GraphClient {
    client: Client,
    host: String,
    database: String,
    username: String,
    password: String,
}

impl fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphClient")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"********")
            .field("client", &"reqwest::blocking::Client")
            .finish()
    }
}

impl GraphClient {
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

    pub fn from_config(config: &GraphStoreConfig) -> Result<Self, LoadError> {
        Self::new(
            &config.host,
            &config.database,
            &config.username,
            &config.password,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn batch_url(&self) -> String {
        format!("{}/batch/{}", self.host, self.database)
    }
}

impl CommandExecutor for GraphClient {
    fn execute(&self, command: &str, transaction: bool) -> Result<Value, LoadError> {
        let url = self.batch_url();
        let body = json!({
            "transaction": transaction,
            "operations": [{"type": "cmd", "language": "sql", "command": command}],
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(LoadError::Status {
                url,
                status: status.as_u16(),
                body: text,
            });
        }

        let value: Value = serde_json::from_str(&text)?;
        if let Some(errors) = value.get("errors") {
            return Err(LoadError::BatchRejected {
                target: self.database.clone(),
                reason: errors.to_string(),
            });
        }
        debug!("Executed {} bytes of SQL against {url}", command.len());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn client(server: &Server) -> GraphClient {
        GraphClient::new(
            &server.url(),
            "KhaBench",
            "root",
            "rootpwd",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[rstest]
    fn test_execute_posts_a_batch_operation() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/batch/KhaBench")
            .match_header("authorization", "Basic cm9vdDpyb290cHdk")
            .match_header("accept", "application/json")
            .match_body(Matcher::Json(json!({
                "transaction": false,
                "operations": [{
                    "type": "cmd",
                    "language": "sql",
                    "command": "SELECT VENDOR_ID, @rid FROM Vendor"
                }]
            })))
            .with_status(200)
            .with_body(r##"{"result": [{"VENDOR_ID": "7", "@rid": "#20:1"}]}"##)
            .create();

        let value = client(&server)
            .execute("SELECT VENDOR_ID, @rid FROM Vendor", false)
            .unwrap();

        mock.assert();
        assert_eq!(value["result"][0]["@rid"], "#20:1");
    }

    #[rstest]
    fn test_errors_key_is_a_rejection() {
        let mut server = Server::new();
        server
            .mock("POST", "/batch/KhaBench")
            .with_status(200)
            .with_body(r#"{"errors": [{"code": 500, "content": "duplicated key"}]}"#)
            .create();

        let err = client(&server).execute("BEGIN;\nCOMMIT", true).unwrap_err();
        assert!(matches!(err, LoadError::BatchRejected { .. }));
    }

    #[rstest]
    fn test_non_success_status() {
        let mut server = Server::new();
        server
            .mock("POST", "/batch/KhaBench")
            .with_status(401)
            .with_body("unauthorized")
            .create();

        let err = client(&server).execute("SELECT 1", false).unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 401, .. }));
    }
}
