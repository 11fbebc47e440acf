pub mod llm;
pub mod prompt;
pub mod retrieval;

use std::sync::Arc;

use rusqlite::Connection;

use crate::conversation::ConversationStore;
use crate::error::{CaixaError, Result};
use crate::models::{Message, Sender};
use crate::settings::Settings;

use llm::{LlmClient, OpenAiClient};
use retrieval::{RecordRetriever, Retriever};

pub const FALLBACK_ANSWER: &str =
    "Desculpe, não consegui consultar o assistente financeiro agora. Tente novamente em instantes.";

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub conversation_id: String,
    /// True when the collaborators failed and `text` is the fixed apology.
    pub fallback: bool,
}

/// Financial question answering backed by an LLM and optional retrieval.
#[derive(Clone)]
pub struct Assistant {
    llm: Arc<dyn LlmClient>,
    retriever: Arc<dyn Retriever>,
    k: usize,
}

impl Assistant {
    pub fn new(llm: Arc<dyn LlmClient>, retriever: Arc<dyn Retriever>, k: usize) -> Self {
        Self { llm, retriever, k }
    }

    /// OpenAI-compatible client with lexical retrieval over the record store.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(OpenAiClient::from_settings(settings)),
            Arc::new(RecordRetriever),
            settings.retrieval_k,
        )
    }

    pub fn ask(
        &self,
        conn: &Connection,
        question: &str,
        conversation_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(CaixaError::EmptyQuestion);
        }

        let store = ConversationStore::new(conn);
        let conversation = store.get_or_create(conversation_id, user_id)?;
        let history = store.history(&conversation)?;

        let (text, fallback) = match self.consult(conn, &conversation.conversation_id, question, &history) {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation.conversation_id,
                    error = %e,
                    "assistant unavailable, answering with fallback"
                );
                (FALLBACK_ANSWER.to_string(), true)
            }
        };

        store.add_message(&conversation, Sender::User, question)?;
        store.add_message(&conversation, Sender::Agent, &text)?;

        Ok(Answer {
            text,
            conversation_id: conversation.conversation_id,
            fallback,
        })
    }

    fn consult(
        &self,
        conn: &Connection,
        conversation_id: &str,
        question: &str,
        history: &[Message],
    ) -> Result<String> {
        let snippets = match self.retriever.index_for(conn, conversation_id)? {
            Some(index) => index.search(question, self.k)?,
            None => Vec::new(),
        };
        tracing::debug!(conversation_id, snippets = snippets.len(), history = history.len(), "prompt built");
        let prompt = prompt::build_prompt(question, history, &snippets);
        self.llm.complete(&prompt)
    }
}
