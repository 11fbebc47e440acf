use crate::models::{Message, Sender};

pub const PERSONA: &str = "Você é um especialista financeiro e em planejamento de pequenos negócios. \
Responda de forma clara, objetiva e prática.";

/// Assemble the single prompt handed to the LLM: persona, optional financial
/// context, optional history, then the question.
pub fn build_prompt(question: &str, history: &[Message], snippets: &[String]) -> String {
    let mut prompt = String::from(PERSONA);

    if !snippets.is_empty() {
        prompt.push_str("\n\nContexto financeiro:\n");
        for snippet in snippets {
            prompt.push_str(snippet);
            prompt.push('\n');
        }
    }

    if !history.is_empty() {
        prompt.push_str("\n\nHistórico da conversa:\n");
        for msg in history {
            let who = match msg.sender {
                Sender::User => "Usuário",
                Sender::Agent => "Assistente",
            };
            prompt.push_str(&format!("{who}: {}\n", msg.text));
        }
    }

    prompt.push_str(&format!("\n\nPergunta: {question}"));
    prompt
}
