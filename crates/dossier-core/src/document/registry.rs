//! In-memory mirror of ingested-document status.

use super::filter::is_supported_document;
use super::model::DocumentRecord;
use crate::api::{ChatApi, UploadAck, UploadFile};
use crate::error::{DossierError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::{Instant, sleep};

/// How often ingestion status is polled after an upload.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long an upload waits for ingestion to reach a terminal status
/// before giving up on polling. The mirror keeps the last observed
/// snapshot either way; ingestion is weakly consistent by contract.
const PROCESSING_DEADLINE: Duration = Duration::from_secs(15);

/// In-memory mirror of the documents known to the service.
///
/// The mirror is a point-in-time snapshot, replaced wholesale on every
/// refresh; there is no diffing and no live subscription. It is
/// independent of the conversation store.
pub struct DocumentRegistry {
    api: Arc<dyn ChatApi>,
    records: RwLock<Vec<DocumentRecord>>,
}

impl DocumentRegistry {
    /// Creates an empty registry backed by the given service client.
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Returns the current snapshot of document records.
    pub async fn records(&self) -> Vec<DocumentRecord> {
        self.records.read().await.clone()
    }

    /// Replaces the entire mirror from the service.
    pub async fn refresh(&self) -> Result<Vec<DocumentRecord>> {
        let records = self.api.list_documents().await?;
        *self.records.write().await = records.clone();
        Ok(records)
    }

    /// Uploads a batch of reference documents.
    ///
    /// Files failing the client-side type filter are dropped before any
    /// request is built; when nothing survives, the batch is rejected with
    /// `Validation` and zero network calls are made. After a successful
    /// upload, ingestion status is polled until every record reaches a
    /// terminal status or the deadline expires, updating the mirror with
    /// each observed snapshot.
    pub async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadAck> {
        let (accepted, rejected): (Vec<UploadFile>, Vec<UploadFile>) = files
            .into_iter()
            .partition(|f| is_supported_document(&f.filename, f.media_type.as_deref()));

        for file in &rejected {
            tracing::warn!("rejected unsupported upload: {}", file.filename);
        }
        if accepted.is_empty() {
            return Err(DossierError::validation(
                "no supported documents to upload (accepted: PDF, DOC/DOCX, PPT/PPTX)",
            ));
        }

        let ack = self.api.upload_documents(accepted).await?;
        self.await_processing().await;
        Ok(ack)
    }

    /// Deletes a document on the service, then refreshes the mirror.
    pub async fn delete(&self, document_id: &str) -> Result<()> {
        self.api.delete_document(document_id).await?;
        self.refresh().await?;
        Ok(())
    }

    /// Polls the document list until every record is terminal or the
    /// deadline expires. A failed poll ends the wait; it is one failure
    /// event, not retried.
    async fn await_processing(&self) {
        let deadline = Instant::now() + PROCESSING_DEADLINE;
        loop {
            match self.api.list_documents().await {
                Ok(records) => {
                    let settled = records.iter().all(|r| r.status.is_terminal());
                    *self.records.write().await = records;
                    if settled {
                        return;
                    }
                }
                Err(error) => {
                    tracing::warn!("document status poll failed: {error}");
                    return;
                }
            }
            if Instant::now() >= deadline {
                tracing::warn!("documents still processing after {PROCESSING_DEADLINE:?}");
                return;
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatApi, ChatReply, ConversationPayload, UploadedFileAck};
    use crate::document::DocumentStatus;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn record(filename: &str, status: DocumentStatus) -> DocumentRecord {
        DocumentRecord {
            filename: filename.to_string(),
            upload_date: "2025-06-01T12:00:00".to_string(),
            status,
            chunks_count: None,
        }
    }

    /// Scripted service double: counts calls and replays canned listings.
    struct ScriptedApi {
        upload_calls: Mutex<usize>,
        list_calls: Mutex<usize>,
        listings: Mutex<VecDeque<Vec<DocumentRecord>>>,
    }

    impl ScriptedApi {
        fn new(listings: Vec<Vec<DocumentRecord>>) -> Self {
            Self {
                upload_calls: Mutex::new(0),
                list_calls: Mutex::new(0),
                listings: Mutex::new(listings.into()),
            }
        }

        fn upload_calls(&self) -> usize {
            *self.upload_calls.lock().unwrap()
        }

        fn list_calls(&self) -> usize {
            *self.list_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ChatApi for ScriptedApi {
        async fn send_message(&self, _: &str, _: Option<&str>) -> Result<ChatReply> {
            unimplemented!("not used by registry tests")
        }

        async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
            *self.list_calls.lock().unwrap() += 1;
            let mut listings = self.listings.lock().unwrap();
            let front = listings.pop_front().unwrap_or_default();
            // Keep replaying the last listing once the script runs out.
            if listings.is_empty() {
                listings.push_back(front.clone());
            }
            Ok(front)
        }

        async fn upload_documents(&self, files: Vec<UploadFile>) -> Result<UploadAck> {
            *self.upload_calls.lock().unwrap() += 1;
            Ok(UploadAck {
                message: "Documents processed".to_string(),
                files: files
                    .iter()
                    .map(|f| UploadedFileAck {
                        file_id: "f-1".to_string(),
                        filename: f.filename.clone(),
                        chunks: Some(3),
                        error: None,
                    })
                    .collect(),
            })
        }

        async fn delete_document(&self, _: &str) -> Result<()> {
            Ok(())
        }

        async fn fetch_conversation(&self, _: &str) -> Result<ConversationPayload> {
            unimplemented!("not used by registry tests")
        }

        async fn generate_report(&self, _: &str) -> Result<Vec<u8>> {
            unimplemented!("not used by registry tests")
        }
    }

    #[tokio::test]
    async fn unsupported_file_is_rejected_without_network_calls() {
        let api = Arc::new(ScriptedApi::new(vec![]));
        let registry = DocumentRegistry::new(api.clone());

        let err = registry
            .upload(vec![UploadFile::new("report.exe", vec![0u8; 4])])
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(api.upload_calls(), 0);
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn supported_file_uploads_and_refreshes_registry() {
        let api = Arc::new(ScriptedApi::new(vec![vec![record(
            "notes.pdf",
            DocumentStatus::Processed,
        )]]));
        let registry = DocumentRegistry::new(api.clone());

        let ack = registry
            .upload(vec![UploadFile::new("notes.pdf", b"%PDF-".to_vec())])
            .await
            .unwrap();

        assert_eq!(ack.files.len(), 1);
        assert_eq!(api.upload_calls(), 1);
        // Terminal on the first poll, so exactly one list call.
        assert_eq!(api.list_calls(), 1);
        let records = registry.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "notes.pdf");
    }

    #[tokio::test]
    async fn upload_polls_until_processing_settles() {
        let api = Arc::new(ScriptedApi::new(vec![
            vec![record("notes.pdf", DocumentStatus::Processing)],
            vec![record("notes.pdf", DocumentStatus::Processed)],
        ]));
        let registry = DocumentRegistry::new(api.clone());

        registry
            .upload(vec![UploadFile::new("notes.pdf", b"%PDF-".to_vec())])
            .await
            .unwrap();

        assert_eq!(api.list_calls(), 2);
        assert_eq!(
            registry.records().await[0].status,
            DocumentStatus::Processed
        );
    }

    #[tokio::test]
    async fn mixed_batch_drops_only_unsupported_files() {
        let api = Arc::new(ScriptedApi::new(vec![vec![record(
            "notes.pdf",
            DocumentStatus::Processed,
        )]]));
        let registry = DocumentRegistry::new(api.clone());

        let ack = registry
            .upload(vec![
                UploadFile::new("notes.pdf", b"%PDF-".to_vec()),
                UploadFile::new("report.exe", vec![0u8; 4]),
            ])
            .await
            .unwrap();

        assert_eq!(ack.files.len(), 1);
        assert_eq!(ack.files[0].filename, "notes.pdf");
    }

    #[tokio::test]
    async fn refresh_replaces_mirror_wholesale() {
        let api = Arc::new(ScriptedApi::new(vec![
            vec![
                record("a.pdf", DocumentStatus::Processed),
                record("b.pdf", DocumentStatus::Processed),
            ],
            vec![record("a.pdf", DocumentStatus::Processed)],
        ]));
        let registry = DocumentRegistry::new(api.clone());

        registry.refresh().await.unwrap();
        assert_eq!(registry.records().await.len(), 2);

        registry.refresh().await.unwrap();
        assert_eq!(registry.records().await.len(), 1);
    }
}
