use anyhow::Result;
use clap::{Parser, Subcommand};
use dossier_client::{ClientConfig, HttpChatApi};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dossier")]
#[command(about = "Dossier - chat with your documents", long_about = None)]
struct Cli {
    /// Base URL of the assistant service (overrides DOSSIER_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Manage ingested reference documents
    Docs {
        #[command(subcommand)]
        action: DocsAction,
    },
    /// Export a conversation as a PDF report
    Report {
        /// Conversation id on the service
        conversation_id: String,
        /// Output file (defaults to report_<conversation_id>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DocsAction {
    /// List ingested documents and their status
    List,
    /// Upload documents (PDF, DOC/DOCX, PPT/PPTX)
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete an ingested document
    Delete { document_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match cli.api_url {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env(),
    };
    let api = Arc::new(HttpChatApi::new(config));

    match cli.command {
        Commands::Chat => commands::chat::run(api).await,
        Commands::Docs { action } => match action {
            DocsAction::List => commands::documents::list(api).await,
            DocsAction::Upload { paths } => commands::documents::upload(api, paths).await,
            DocsAction::Delete { document_id } => {
                commands::documents::delete(api, &document_id).await
            }
        },
        Commands::Report {
            conversation_id,
            output,
        } => commands::report::run(api, &conversation_id, output).await,
    }
}
