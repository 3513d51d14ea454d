//! Interactive chat session.

use anyhow::Result;
use dossier_core::DossierError;
use dossier_core::api::ChatApi;
use dossier_core::session::SessionController;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::sync::Arc;

const HELP: &str = "commands: /new, /list, /switch <n>, /delete <n>, /open <id>, /help, /quit";

pub async fn run(api: Arc<dyn ChatApi>) -> Result<()> {
    let controller = SessionController::new(api);
    let mut editor = DefaultEditor::new()?;

    println!("dossier chat. {HELP}");
    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        if let Some(command) = line.strip_prefix('/') {
            if !handle_command(&controller, command).await {
                break;
            }
            continue;
        }

        send(&controller, &line).await;
    }
    Ok(())
}

async fn send(controller: &SessionController, text: &str) {
    println!("thinking...");
    match controller.send_message(text).await {
        Ok(Some(message)) => {
            println!("{}", message.content);
            if let Some(sources) = &message.sources {
                for source in sources {
                    println!("  [{} {:.2}] {}", source.source, source.score, source.content);
                }
            }
        }
        // The target conversation went away while the send was in
        // flight; there is nothing left to show.
        Ok(None) => {}
        Err(error @ DossierError::Validation(_)) | Err(error @ DossierError::Busy { .. }) => {
            eprintln!("{error}");
        }
        Err(error) => eprintln!("request failed: {error}"),
    }
}

/// Handles a slash command; returns false when the session should end.
async fn handle_command(controller: &SessionController, command: &str) -> bool {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("q") => return false,
        Some("help") => println!("{HELP}"),
        Some("new") => {
            controller.start_new_chat().await;
            println!("started a new chat");
        }
        Some("list") => {
            let active = controller.active_conversation_id().await;
            let conversations = controller.conversations().await;
            if conversations.is_empty() {
                println!("no conversations yet");
            }
            for (index, conversation) in conversations.iter().enumerate() {
                let marker = if active.as_deref() == Some(conversation.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {index}: {} ({} messages)",
                    conversation.title,
                    conversation.messages.len()
                );
            }
        }
        Some("switch") => match indexed_conversation(controller, parts.next()).await {
            Some(id) => {
                controller.select_conversation(&id).await;
            }
            None => eprintln!("usage: /switch <n> (see /list)"),
        },
        Some("delete") => match indexed_conversation(controller, parts.next()).await {
            Some(id) => {
                if let Err(error) = controller.delete_conversation(&id).await {
                    eprintln!("{error}");
                }
            }
            None => eprintln!("usage: /delete <n> (see /list)"),
        },
        Some("open") => match parts.next() {
            Some(conversation_id) => match controller.restore_conversation(conversation_id).await {
                Ok(conversation) => {
                    controller.select_conversation(&conversation.id).await;
                    println!(
                        "opened '{}' ({} messages)",
                        conversation.title,
                        conversation.messages.len()
                    );
                }
                Err(error) => eprintln!("{error}"),
            },
            None => eprintln!("usage: /open <conversation-id>"),
        },
        _ => eprintln!("unknown command: /{command}. {HELP}"),
    }
    true
}

async fn indexed_conversation(
    controller: &SessionController,
    index: Option<&str>,
) -> Option<String> {
    let index: usize = index?.parse().ok()?;
    controller
        .conversations()
        .await
        .get(index)
        .map(|c| c.id.clone())
}
