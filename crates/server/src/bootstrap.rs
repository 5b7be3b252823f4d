use std::sync::Arc;

use axum::Router;
use cove_core::config::{AppConfig, ConfigError, LoadOptions};
use cove_core::RecordStore;
use thiserror::Error;
use tracing::{info, warn};

use crate::health::{self, HealthState};
use crate::notion::NotionClient;
use crate::submission::{self, SubmissionState};

pub struct Application {
    pub config: AppConfig,
    pub record_store: Arc<dyn RecordStore>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("notion http client could not be built: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let api_key = config.notion.require_api_key()?.clone();
    if config.notion.database_id.is_none() {
        warn!(
            event_name = "system.bootstrap.database_id_missing",
            correlation_id = "bootstrap",
            "notion.database_id is not set; submissions will be answered with a configuration error"
        );
    }

    let client = NotionClient::new(api_key, &config.notion).map_err(BootstrapError::HttpClient)?;
    info!(
        event_name = "system.bootstrap.record_store_ready",
        correlation_id = "bootstrap",
        base_url = %config.notion.base_url,
        api_version = %config.notion.api_version,
        "notion client constructed"
    );

    Ok(Application { config, record_store: Arc::new(client) })
}

impl Application {
    pub fn router(&self) -> Router {
        let database_id = self.config.notion.database_id.clone();
        let health = HealthState::new(database_id.as_deref());
        let submission = SubmissionState::new(
            Arc::clone(&self.record_store),
            database_id,
            self.config.server.expose_error_details,
        );

        submission::router(submission).merge(health::router(health))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.config.server.bind_address, self.config.server.port)
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use cove_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use tower::ServiceExt;

    use crate::bootstrap::{bootstrap, bootstrap_with_config, BootstrapError};

    #[test]
    fn bootstrap_fails_fast_without_notion_api_key() {
        let result = bootstrap_with_config(AppConfig::default());

        let error = match result {
            Ok(_) => panic!("bootstrap should require an api key"),
            Err(error) => error,
        };
        assert!(matches!(error, BootstrapError::Config(_)));
        assert!(error.to_string().contains("notion.api_key"));
    }

    #[tokio::test]
    async fn bootstrapped_router_serves_health_and_submissions() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                notion_api_key: Some("secret_test".to_string()),
                notion_database_id: Some("db-1".to_string()),
                port: Some(3100),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("bootstrap should succeed with valid overrides");
        assert_eq!(app.bind_address(), "127.0.0.1:3100");

        let health = app
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("health responds");
        assert_eq!(health.status(), StatusCode::OK);

        let missing = app
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/notion")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .expect("request"),
            )
            .await
            .expect("submission responds");
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    }
}
