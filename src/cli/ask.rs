use colored::Colorize;

use crate::assistant::Assistant;
use crate::cli::open_store;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(question: &str, conversation: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let conn = open_store(&settings)?;
    let assistant = Assistant::from_settings(&settings);

    let answer = assistant.ask(&conn, question, conversation, None)?;

    if answer.fallback {
        println!("{}", answer.text.yellow());
    } else {
        println!("{}", answer.text);
    }
    println!();
    println!("{} {}", "Conversa:".dimmed(), answer.conversation_id);
    Ok(())
}
