//! Webhook relay - forwards `{content}` posts to a Discord webhook

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;

use crate::application::errors::BotError;

#[derive(Debug, Clone)]
pub struct RelayState {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl RelayState {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelayRequest {
    #[serde(default)]
    content: Option<String>,
}

/// Router serving `POST /`; other methods get 405.
pub fn router(state: RelayState) -> Router {
    Router::new().route("/", post(forward)).with_state(state)
}

async fn forward(State(state): State<RelayState>, body: Bytes) -> (StatusCode, String) {
    let request: RelayRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "relay body is not valid JSON");
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e));
        }
    };

    let content = match request.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => return (StatusCode::BAD_REQUEST, "Content cannot be empty".to_string()),
    };
    let Some(webhook_url) = state.webhook_url.as_deref() else {
        tracing::error!("relay called without a webhook URL");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Webhook not configured".to_string());
    };

    let response = state
        .client
        .post(webhook_url)
        .json(&serde_json::json!({ "content": content }))
        .send()
        .await;

    match response {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!(chars = content.chars().count(), "relayed message to Discord");
            (StatusCode::OK, "Message sent to Discord!".to_string())
        }
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Discord rejected relayed message");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Discord error: {}", body))
        }
        Err(e) => {
            tracing::error!(error = %e, "relay request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        }
    }
}

/// Serve the relay on `listen` until the process stops.
pub async fn serve(listen: &str, state: RelayState) -> Result<(), BotError> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| BotError::Internal(format!("invalid relay listen address {}: {}", listen, e)))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BotError::Internal(format!("binding {}: {}", addr, e)))?;

    tracing::info!(%addr, "webhook relay listening");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| BotError::Internal(format!("relay server: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::Json;
    use serde_json::{json, Value};

    use crate::testing;

    /// Fake webhook that records bodies and fails for content "reject".
    async fn webhook(seen: Arc<Mutex<Vec<Value>>>) -> String {
        let app = Router::new().route(
            "/hook",
            post(move |Json(body): Json<Value>| {
                let seen = seen.clone();
                async move {
                    let reject = body["content"] == "reject";
                    seen.lock().unwrap().push(body);
                    if reject {
                        (StatusCode::BAD_REQUEST, r#"{"message": "Cannot send an empty message"}"#.to_string())
                    } else {
                        (StatusCode::NO_CONTENT, String::new())
                    }
                }
            }),
        );
        format!("{}/hook", testing::serve(app).await)
    }

    async fn relay(webhook_url: Option<String>) -> String {
        testing::serve(router(RelayState::new(webhook_url))).await
    }

    async fn post_raw(base: &str, body: &str) -> (u16, String) {
        let resp = reqwest::Client::new()
            .post(format!("{base}/"))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.text().await.unwrap())
    }

    #[tokio::test]
    async fn forwards_content_to_webhook() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = relay(Some(webhook(seen.clone()).await)).await;

        let (status, text) = post_raw(&base, r#"{"content": "GG everyone"}"#).await;
        assert_eq!((status, text.as_str()), (200, "Message sent to Discord!"));
        assert_eq!(*seen.lock().unwrap(), vec![json!({"content": "GG everyone"})]);
    }

    #[tokio::test]
    async fn blank_content_is_rejected_before_forwarding() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = relay(Some(webhook(seen.clone()).await)).await;

        for body in [r#"{"content": "   "}"#, r#"{"content": ""}"#, r#"{"content": null}"#, "{}"] {
            let (status, text) = post_raw(&base, body).await;
            assert_eq!((status, text.as_str()), (400, "Content cannot be empty"));
        }
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_discord_body() {
        let base = relay(Some(webhook(Arc::default()).await)).await;

        let (status, text) = post_raw(&base, r#"{"content": "reject"}"#).await;
        assert_eq!(status, 500);
        assert!(text.starts_with("Discord error: "));
        assert!(text.contains("Cannot send an empty message"));
    }

    #[tokio::test]
    async fn missing_webhook_bad_json_and_wrong_method() {
        let base = relay(None).await;

        let (status, text) = post_raw(&base, r#"{"content": "hi"}"#).await;
        assert_eq!((status, text.as_str()), (500, "Webhook not configured"));

        let (status, text) = post_raw(&base, "not json").await;
        assert_eq!(status, 500);
        assert!(text.starts_with("Error: "));

        let resp = reqwest::get(format!("{base}/")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 405);
    }

    #[tokio::test]
    async fn unreachable_webhook_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed = listener.local_addr().unwrap();
        drop(listener);
        let base = relay(Some(format!("http://{closed}/hook"))).await;

        let (status, text) = post_raw(&base, r#"{"content": "hi"}"#).await;
        assert_eq!(status, 500);
        assert!(text.starts_with("Error: "));
    }

    #[tokio::test]
    async fn serve_rejects_bad_listen_address() {
        let err = serve("not-an-address", RelayState::new(None)).await.unwrap_err();
        assert!(matches!(err, BotError::Internal(_)));
    }
}
