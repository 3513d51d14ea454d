//! Report export command.

use anyhow::{Context, Result};
use dossier_core::api::ChatApi;
use dossier_core::session::SessionController;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(
    api: Arc<dyn ChatApi>,
    conversation_id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let controller = SessionController::new(api);
    let bytes = controller.export_report(conversation_id).await?;

    let output = output.unwrap_or_else(|| PathBuf::from(format!("report_{conversation_id}.pdf")));
    tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!("wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}
