use colored::Colorize;

use crate::cli::open_store;
use crate::conversation::ConversationStore;
use crate::error::{CaixaError, Result};
use crate::fmt::timestamp;
use crate::models::Sender;
use crate::settings::load_settings;

pub fn run(conversation_id: &str) -> Result<()> {
    let conn = open_store(&load_settings())?;
    let store = ConversationStore::new(&conn);

    let conversation = store
        .find(conversation_id)?
        .ok_or_else(|| CaixaError::ConversationNotFound(conversation_id.to_string()))?;
    let messages = store.history(&conversation)?;

    println!("Conversa {} ({})", conversation.conversation_id, timestamp(&conversation.created_at));
    if let Some(user) = &conversation.user_id {
        println!("Usuário: {user}");
    }
    if messages.is_empty() {
        println!("(sem mensagens)");
        return Ok(());
    }
    for msg in &messages {
        let who = match msg.sender {
            Sender::User => "Você".cyan().bold(),
            Sender::Agent => "Assistente".green().bold(),
        };
        println!();
        println!("{who} {}", timestamp(&msg.timestamp).dimmed());
        println!("{}", msg.text);
    }
    Ok(())
}
