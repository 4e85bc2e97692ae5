//! Anthropic Messages API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{CompletionClient, Result};
use crate::error::ExtractionError;
use crate::models::config::ApiConfig;
use crate::pdf::EncodedDocument;

/// Client for `POST /v1/messages` with a base64 document block.
pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: [ContentBlock<'a>; 2],
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Document { source: DocumentSource<'a> },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct DocumentSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl AnthropicClient {
    /// Build a client from configuration.
    ///
    /// Fails with [`ExtractionError::MissingCredential`] when no API key is
    /// configured, before any request is made.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ExtractionError::MissingCredential)?
            .to_string();

        let mut builder = reqwest::Client::builder().default_headers(default_headers(
            &api_key,
            &config.api_version,
        )?);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Model identifier requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

fn default_headers(api_key: &str, api_version: &str) -> Result<HeaderMap> {
    let mut key = HeaderValue::from_str(api_key)
        .map_err(|_| ExtractionError::Config("API key is not a valid header value".to_string()))?;
    key.set_sensitive(true);

    let version = HeaderValue::from_str(api_version)
        .map_err(|_| ExtractionError::Config(format!("invalid api_version: {:?}", api_version)))?;

    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", key);
    headers.insert("anthropic-version", version);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, document: &EncodedDocument, instruction: &str) -> Result<String> {
        if document.is_empty() {
            return Err(ExtractionError::NoInput);
        }

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: [
                    ContentBlock::Document {
                        source: DocumentSource {
                            kind: "base64",
                            media_type: document.media_type,
                            data: &document.data,
                        },
                    },
                    ContentBlock::Text { text: instruction },
                ],
            }],
        };

        debug!(
            "Sending {} ({} bytes) to {} using {}",
            document.path.display(),
            document.byte_len,
            self.endpoint,
            self.model
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => envelope.error.message,
                Err(_) if !text.trim().is_empty() => text.trim().to_string(),
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let out: MessagesResponse = resp.json().await?;
        if out.stop_reason.as_deref() == Some("max_tokens") {
            warn!(
                "Response hit the {} token limit and may be truncated",
                self.max_tokens
            );
        }

        let text: String = out
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyResponse);
        }

        info!("Received {} characters from {}", text.len(), self.model);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::encode_bytes;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            api_key: Some("sk-test".to_string()),
            ..ApiConfig::default()
        }
    }

    fn document() -> EncodedDocument {
        EncodedDocument {
            path: PathBuf::from("statement.pdf"),
            media_type: "application/pdf",
            data: encode_bytes(b"%PDF-1.4"),
            byte_len: 8,
            page_count: None,
        }
    }

    #[test]
    fn test_missing_credential() {
        let mut cfg = config("http://localhost");
        cfg.api_key = None;
        assert!(matches!(AnthropicClient::new(&cfg), Err(ExtractionError::MissingCredential)));

        cfg.api_key = Some("   ".to_string());
        assert!(matches!(AnthropicClient::new(&cfg), Err(ExtractionError::MissingCredential)));
    }

    #[test]
    fn test_request_shape() {
        let doc = document();
        let body = MessagesRequest {
            model: "m",
            max_tokens: 10,
            messages: [Message {
                role: "user",
                content: [
                    ContentBlock::Document {
                        source: DocumentSource {
                            kind: "base64",
                            media_type: doc.media_type,
                            data: &doc.data,
                        },
                    },
                    ContentBlock::Text { text: "extract" },
                ],
            }],
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "m",
                "max_tokens": 10,
                "messages": [{
                    "role": "user",
                    "content": [
                        {
                            "type": "document",
                            "source": {
                                "type": "base64",
                                "media_type": "application/pdf",
                                "data": "JVBERi0xLjQ="
                            }
                        },
                        {"type": "text", "text": "extract"}
                    ]
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_complete_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-test")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(json!({"max_tokens": 4096})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "content": [
                        {"type": "text", "text": "[{\"date\": "},
                        {"type": "text", "text": "\"01/02/25\"}]"}
                    ],
                    "stop_reason": "end_turn"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = AnthropicClient::new(&config(&server.url())).unwrap();
        let text = client.complete(&document(), "extract").await.unwrap();

        assert_eq!(text, "[{\"date\": \"01/02/25\"}]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body(r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#)
            .create_async()
            .await;

        let client = AnthropicClient::new(&config(&server.url())).unwrap();
        match client.complete(&document(), "extract").await {
            Err(ExtractionError::Api { status, message }) => {
                assert_eq!(status, 529);
                assert_eq!(message, "Overloaded");
            }
            other => panic!("expected Api error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(r#"{"content": [], "stop_reason": "end_turn"}"#)
            .create_async()
            .await;

        let client = AnthropicClient::new(&config(&server.url())).unwrap();
        assert!(matches!(
            client.complete(&document(), "extract").await,
            Err(ExtractionError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_no_input() {
        let client = AnthropicClient::new(&config("http://127.0.0.1:9")).unwrap();
        let mut doc = document();
        doc.data.clear();

        assert!(matches!(
            client.complete(&doc, "extract").await,
            Err(ExtractionError::NoInput)
        ));
    }
}
