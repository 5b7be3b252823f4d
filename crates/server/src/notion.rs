//! Notion-backed record store.
//!
//! Each waitlist entry becomes a page in the configured Notion database:
//! - `Name` (title) ← full name
//! - `Phone` (phone_number) ← phone number
//! - `Age` (number) ← age
//! - `City` (rich_text) ← city

use std::time::Duration;

use async_trait::async_trait;
use cove_core::config::NotionConfig;
use cove_core::{RecordFields, RecordStore, RecordStoreError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

pub const NAME_PROPERTY: &str = "Name";
pub const PHONE_PROPERTY: &str = "Phone";
pub const AGE_PROPERTY: &str = "Age";
pub const CITY_PROPERTY: &str = "City";

pub struct NotionClient {
    client: Client,
    base_url: String,
    api_version: String,
    api_key: SecretString,
}

/// Error body returned by the Notion API.
#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl NotionClient {
    pub fn new(api_key: SecretString, config: &NotionConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            api_key,
        })
    }

    fn pages_url(&self) -> String {
        format!("{}/v1/pages", self.base_url)
    }
}

pub fn page_properties(fields: &RecordFields) -> Value {
    json!({
        NAME_PROPERTY: { "title": [{ "text": { "content": fields.name } }] },
        PHONE_PROPERTY: { "phone_number": fields.phone },
        AGE_PROPERTY: { "number": fields.age },
        CITY_PROPERTY: { "rich_text": [{ "text": { "content": fields.city } }] },
    })
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn create_record(
        &self,
        table_id: &str,
        fields: &RecordFields,
    ) -> Result<Value, RecordStoreError> {
        let body = json!({
            "parent": { "database_id": table_id },
            "properties": page_properties(fields),
        });

        let response = self
            .client
            .post(self.pages_url())
            .bearer_auth(self.api_key.expose_secret())
            .header("Notion-Version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|error| RecordStoreError::Transport { message: error.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<NotionErrorBody>(&raw).ok();
            let (code, message) = match parsed {
                Some(NotionErrorBody { code, message }) => (code, message),
                None => (None, None),
            };
            return Err(RecordStoreError::Api {
                status: status.as_u16(),
                code: code.unwrap_or_else(|| "unknown".to_string()),
                message: message.unwrap_or_else(|| format!("notion API returned {status}")),
            });
        }

        let page: Value = response
            .json()
            .await
            .map_err(|error| RecordStoreError::Decode { message: error.to_string() })?;
        let page_id = page.get("id").and_then(Value::as_str).unwrap_or("unknown");
        debug!(event_name = "notion.page_created", page_id, "notion page created");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use cove_core::config::AppConfig;
    use cove_core::{RecordFields, RecordStore, RecordStoreError};
    use httpmock::prelude::*;
    use serde_json::json;

    use super::{page_properties, NotionClient};

    fn fields() -> RecordFields {
        RecordFields {
            name: "Jane Doe".to_string(),
            phone: "555-123-4567".to_string(),
            city: "Austin".to_string(),
            age: 29,
        }
    }

    fn client(base_url: String) -> NotionClient {
        let mut config = AppConfig::default().notion;
        config.base_url = base_url;
        NotionClient::new("secret_test".to_string().into(), &config).expect("client builds")
    }

    #[test]
    fn properties_follow_database_schema() {
        let properties = page_properties(&fields());

        assert_eq!(properties["Name"]["title"][0]["text"]["content"], "Jane Doe");
        assert_eq!(properties["Phone"]["phone_number"], "555-123-4567");
        assert_eq!(properties["Age"]["number"], 29);
        assert_eq!(properties["City"]["rich_text"][0]["text"]["content"], "Austin");
    }

    #[tokio::test]
    async fn create_record_posts_page_under_database() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/pages")
                    .header("authorization", "Bearer secret_test")
                    .header("notion-version", "2022-06-28")
                    .json_body_partial(
                        r#"{"parent":{"database_id":"db-1"},"properties":{"Age":{"number":29}}}"#,
                    );
                then.status(200).json_body(json!({"object": "page", "id": "page-123"}));
            })
            .await;

        let page = client(server.base_url())
            .create_record("db-1", &fields())
            .await
            .expect("page is created");

        mock.assert_async().await;
        assert_eq!(page["id"], "page-123");
    }

    #[tokio::test]
    async fn api_errors_carry_notion_code_and_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/pages");
                then.status(404).json_body(json!({
                    "object": "error",
                    "status": 404,
                    "code": "object_not_found",
                    "message": "Could not find database with ID: db-1."
                }));
            })
            .await;

        let error = client(server.base_url())
            .create_record("db-1", &fields())
            .await
            .expect_err("notion rejects the request");

        assert_eq!(
            error,
            RecordStoreError::Api {
                status: 404,
                code: "object_not_found".to_string(),
                message: "Could not find database with ID: db-1.".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn non_json_error_bodies_still_report_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/pages");
                then.status(502).body("bad gateway");
            })
            .await;

        let error = client(server.base_url())
            .create_record("db-1", &fields())
            .await
            .expect_err("gateway failure");

        assert!(matches!(error, RecordStoreError::Api { status: 502, ref code, .. } if code == "unknown"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let error = client("http://127.0.0.1:9".to_string())
            .create_record("db-1", &fields())
            .await
            .expect_err("nothing listens on the discard port");

        assert!(matches!(error, RecordStoreError::Transport { .. }));
    }
}
