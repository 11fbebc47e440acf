use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{CaixaError, Result};
use crate::models::{Conversation, Message, Sender};

/// Conversation lifecycle and the message log behind it.
pub struct ConversationStore<'a> {
    conn: &'a Connection,
}

impl<'a> ConversationStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Reuse the conversation with this id, creating it if it doesn't exist.
    /// Without an id a fresh one is generated.
    pub fn get_or_create(&self, conversation_id: Option<&str>, user_id: Option<&str>) -> Result<Conversation> {
        let conversation_id = match conversation_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        if let Some(existing) = self.find(&conversation_id)? {
            return Ok(existing);
        }
        if self.insert_if_absent(&conversation_id, user_id)? {
            tracing::debug!(conversation_id = %conversation_id, "conversation created");
        }
        self.find(&conversation_id)?
            .ok_or(CaixaError::ConversationNotFound(conversation_id))
    }

    /// Another connection may create the same id between `find` and the insert;
    /// the loser keeps the existing row. Returns whether a row was written.
    fn insert_if_absent(&self, conversation_id: &str, user_id: Option<&str>) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO conversations (conversation_id, user_id) VALUES (?1, ?2)",
            rusqlite::params![conversation_id, user_id],
        )?;
        Ok(inserted > 0)
    }

    pub fn find(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        let conv = self
            .conn
            .query_row(
                "SELECT id, conversation_id, user_id, created_at FROM conversations WHERE conversation_id = ?1",
                [conversation_id],
                |row| {
                    Ok(Conversation {
                        id: row.get(0)?,
                        conversation_id: row.get(1)?,
                        user_id: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(conv)
    }

    pub fn add_message(&self, conversation: &Conversation, sender: Sender, text: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO messages (conversation_id, sender, text) VALUES (?1, ?2, ?3)",
            rusqlite::params![conversation.id, sender.as_str(), text],
        )?;
        Ok(())
    }

    /// Messages oldest first.
    pub fn history(&self, conversation: &Conversation) -> Result<Vec<Message>> {
        let mut stmt = self.conn.prepare(
            "SELECT sender, text, timestamp FROM messages \
             WHERE conversation_id = ?1 ORDER BY timestamp, id",
        )?;
        let messages = stmt
            .query_map([conversation.id], |row| {
                let sender: String = row.get(0)?;
                Ok(Message {
                    sender: Sender::from_db(&sender),
                    text: row.get(1)?,
                    timestamp: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(messages)
    }

    pub fn count(&self) -> Result<(i64, i64)> {
        let conversations: i64 =
            self.conn.query_row("SELECT count(*) FROM conversations", [], |r| r.get(0))?;
        let messages: i64 = self.conn.query_row("SELECT count(*) FROM messages", [], |r| r.get(0))?;
        Ok((conversations, messages))
    }
}
