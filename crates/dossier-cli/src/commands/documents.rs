//! Document registry commands.

use anyhow::{Context, Result, anyhow};
use dossier_core::api::{ChatApi, UploadFile};
use dossier_core::document::DocumentRegistry;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn list(api: Arc<dyn ChatApi>) -> Result<()> {
    let registry = DocumentRegistry::new(api);
    let records = registry.refresh().await?;
    if records.is_empty() {
        println!("no documents ingested yet");
        return Ok(());
    }
    for record in records {
        let chunks = record
            .chunks_count
            .map(|n| format!("{n} chunks"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} {:<12} {:<22} {chunks}",
            record.filename, record.status, record.upload_date
        );
    }
    Ok(())
}

pub async fn upload(api: Arc<dyn ChatApi>, paths: Vec<PathBuf>) -> Result<()> {
    let registry = DocumentRegistry::new(api);

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("invalid filename: {}", path.display()))?;
        files.push(UploadFile::new(filename, bytes));
    }

    let ack = registry.upload(files).await?;
    for file in &ack.files {
        match (&file.chunks, &file.error) {
            (_, Some(error)) => println!("{}: failed ({error})", file.filename),
            (Some(chunks), None) => println!("{}: {chunks} chunks indexed", file.filename),
            (None, None) => println!("{}: accepted", file.filename),
        }
    }
    Ok(())
}

pub async fn delete(api: Arc<dyn ChatApi>, document_id: &str) -> Result<()> {
    let registry = DocumentRegistry::new(api);
    registry.delete(document_id).await?;
    println!("deleted {document_id}");
    Ok(())
}
