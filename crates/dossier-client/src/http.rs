//! HTTP implementation of the remote service contract.
//!
//! Talks JSON to the assistant service and multipart to its upload
//! endpoint. Timeouts live here, at the transport layer; the orchestration
//! layer only ever sees success or failure.

use crate::config::ClientConfig;
use async_trait::async_trait;
use dossier_core::api::{ChatApi, ChatReply, ConversationPayload, UploadAck, UploadFile};
use dossier_core::document::DocumentRecord;
use dossier_core::error::{DossierError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout for answer generation and report rendering, which sit on an
/// LLM round trip.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for bookkeeping calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Detail substituted when an error body cannot be parsed at all.
const UNPARSABLE_ERROR_DETAIL: &str = "Unknown error";

/// HTTP client for the assistant service.
#[derive(Clone)]
pub struct HttpChatApi {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct DocumentsResponse {
    #[serde(default)]
    documents: Vec<DocumentRecord>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

impl HttpChatApi {
    /// Creates a client for the configured service.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Normalizes a non-success response into `Remote { status, detail }`.
    ///
    /// The service reports errors as `{ "detail": ... }`; when the body is
    /// something else entirely a generic detail is substituted, and when
    /// it parses but carries no detail the status line stands in.
    async fn error_from_response(response: Response) -> DossierError {
        let status = response.status().as_u16();
        let detail = match response.json::<ErrorBody>().await {
            Ok(ErrorBody {
                detail: Some(detail),
            }) if !detail.is_empty() => detail,
            Ok(_) => format!("HTTP {status}"),
            Err(_) => UNPARSABLE_ERROR_DETAIL.to_string(),
        };
        DossierError::remote(status, detail)
    }

    async fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }
}

fn transport_error(error: reqwest::Error) -> DossierError {
    DossierError::transport(error.to_string())
}

fn parse_error(what: &str, error: reqwest::Error) -> DossierError {
    DossierError::internal(format!("failed to parse {what} response: {error}"))
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply> {
        let body = ChatRequest {
            message,
            conversation_id,
        };
        tracing::debug!(
            "POST /chat ({} chars, conversation: {})",
            message.chars().count(),
            conversation_id.unwrap_or("new")
        );
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&body)
            .timeout(GENERATION_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::check(response).await?;
        response
            .json::<ChatReply>()
            .await
            .map_err(|e| parse_error("chat", e))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let response = self
            .client
            .get(self.url("/documents"))
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::check(response).await?;
        response
            .json::<DocumentsResponse>()
            .await
            .map(|body| body.documents)
            .map_err(|e| parse_error("documents", e))
    }

    async fn upload_documents(&self, files: Vec<UploadFile>) -> Result<UploadAck> {
        tracing::debug!("POST /upload-documents ({} files)", files.len());
        let mut form = Form::new();
        for file in files {
            let mut part = Part::bytes(file.bytes).file_name(file.filename.clone());
            if let Some(media_type) = &file.media_type {
                part = part.mime_str(media_type).map_err(|e| {
                    DossierError::internal(format!(
                        "invalid media type '{media_type}' for {}: {e}",
                        file.filename
                    ))
                })?;
            }
            form = form.part("files", part);
        }

        let response = self
            .client
            .post(self.url("/upload-documents"))
            .multipart(form)
            .timeout(GENERATION_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::check(response).await?;
        response
            .json::<UploadAck>()
            .await
            .map_err(|e| parse_error("upload", e))
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/documents/{document_id}")))
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_conversation(&self, conversation_id: &str) -> Result<ConversationPayload> {
        let response = self
            .client
            .get(self.url(&format!("/conversations/{conversation_id}")))
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::check(response).await?;
        response
            .json::<ConversationPayload>()
            .await
            .map_err(|e| parse_error("conversation", e))
    }

    async fn generate_report(&self, conversation_id: &str) -> Result<Vec<u8>> {
        let body = ChatRequest {
            message: "",
            conversation_id: Some(conversation_id),
        };
        let response = self
            .client
            .post(self.url("/generate-report"))
            .json(&body)
            .timeout(GENERATION_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::check(response).await?;
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| parse_error("report", e))
    }
}
