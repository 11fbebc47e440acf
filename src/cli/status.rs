use crate::conversation::ConversationStore;
use crate::db::{count_records, get_connection, recent_imports};
use crate::error::Result;
use crate::fmt::{format_bytes, timestamp};
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = settings.data_path();
    let db_path = settings.db_path();

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!("LLM:        {} ({})", settings.llm_model, settings.llm_base_url);
    println!(
        "API key:    {}",
        if settings.api_key().is_some() { "set" } else { "(not set)" }
    );

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let records = count_records(&conn)?;
        let (conversations, messages) = ConversationStore::new(&conn).count()?;

        println!();
        println!("Records:        {records}");
        println!("Conversations:  {conversations}");
        println!("Messages:       {messages}");

        let imports = recent_imports(&conn, 5)?;
        if !imports.is_empty() {
            println!();
            println!("Recent imports:");
            for imp in &imports {
                println!(
                    "  #{}  {}  {}  {} records ({}, delimiter {:?}, sha256 {})",
                    imp.id.unwrap_or_default(),
                    timestamp(imp.imported_at.as_deref().unwrap_or("")),
                    imp.filename,
                    imp.record_count,
                    imp.encoding,
                    imp.delimiter,
                    &imp.checksum[..imp.checksum.len().min(12)],
                );
            }
        }
    } else {
        println!();
        println!("Database not found. Run `caixa init` to set up.");
    }

    Ok(())
}
