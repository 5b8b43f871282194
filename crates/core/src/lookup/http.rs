//! HTTP lookup client.
//!
//! Posts the barcode → supplied code map as a JSON object and expects a JSON
//! object of barcode → canonical code back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{CodeMap, LookupClient, LookupError};
use crate::config::LookupConfig;

/// Lookup client backed by the reconciliation HTTP endpoint.
pub struct HttpLookupClient {
    client: Client,
    url: String,
}

impl HttpLookupClient {
    /// Create a new client. The timeout bounds every request.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.endpoint_path
        );

        Ok(Self { client, url })
    }

    /// Full endpoint URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LookupClient for HttpLookupClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn reconcile(&self, pairs: &CodeMap) -> Result<CodeMap, LookupError> {
        if pairs.is_empty() {
            return Err(LookupError::EmptyRequest);
        }

        debug!(url = %self.url, barcodes = pairs.len(), "Sending reconciliation request");

        let response = self.client.post(&self.url).json(pairs).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let reconciled: CodeMap = response.json().await.map_err(|e| {
            LookupError::ParseError(format!("Failed to parse reconciliation response: {}", e))
        })?;

        debug!(
            requested = pairs.len(),
            reconciled = reconciled.len(),
            "Reconciliation response received"
        );

        Ok(reconciled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{http::StatusCode, routing::post, Json, Router};
    use tokio::net::TcpListener;

    /// Serves `router` on an ephemeral port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config_for(base_url: String) -> LookupConfig {
        let mut config = LookupConfig::new(base_url);
        config.endpoint_path = "/reconcile".to_string();
        config.timeout_secs = 2;
        config
    }

    fn pairs(entries: &[(&str, &str)]) -> CodeMap {
        entries
            .iter()
            .map(|(b, c)| (b.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn test_url_joins_base_and_endpoint() {
        let mut config = LookupConfig::new("http://solr:9090/");
        config.endpoint_path = "/reconcile".to_string();
        let client = HttpLookupClient::new(&config).unwrap();
        assert_eq!(client.url(), "http://solr:9090/reconcile");
    }

    #[tokio::test]
    async fn test_reconcile_returns_only_recognized_barcodes() {
        let router = Router::new().route(
            "/reconcile",
            post(|Json(body): Json<CodeMap>| async move {
                let recognized: CodeMap = body
                    .into_keys()
                    .filter(|barcode| barcode != "B002")
                    .map(|barcode| {
                        let canonical = format!("C-{}", barcode);
                        (barcode, canonical)
                    })
                    .collect();
                Json(recognized)
            }),
        );
        let client = HttpLookupClient::new(&config_for(serve(router).await)).unwrap();

        let result = client
            .reconcile(&pairs(&[("B001", "X"), ("B002", "Y")]))
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("B001").map(String::as_str), Some("C-B001"));
        assert!(!result.contains_key("B002"));
    }

    #[tokio::test]
    async fn test_reconcile_non_success_status() {
        let router = Router::new().route(
            "/reconcile",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "solr down") }),
        );
        let client = HttpLookupClient::new(&config_for(serve(router).await)).unwrap();

        let err = client
            .reconcile(&pairs(&[("B001", "X")]))
            .await
            .unwrap_err();

        match err {
            LookupError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "solr down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reconcile_malformed_body() {
        let router = Router::new().route("/reconcile", post(|| async { "not json" }));
        let client = HttpLookupClient::new(&config_for(serve(router).await)).unwrap();

        let err = client
            .reconcile(&pairs(&[("B001", "X")]))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_reconcile_times_out() {
        let router = Router::new().route(
            "/reconcile",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(CodeMap::new())
            }),
        );
        let mut config = config_for(serve(router).await);
        config.timeout_secs = 1;
        let client = HttpLookupClient::new(&config).unwrap();

        let err = client
            .reconcile(&pairs(&[("B001", "X")]))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::HttpError(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_reconcile_empty_request() {
        let client = HttpLookupClient::new(&LookupConfig::new("http://127.0.0.1:1")).unwrap();
        let err = client.reconcile(&CodeMap::new()).await.unwrap_err();
        assert!(matches!(err, LookupError::EmptyRequest));
    }
}
