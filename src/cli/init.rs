use std::path::PathBuf;

use crate::cli::open_store;
use crate::db::count_records;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, DATA_DIR_ENV};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        let expanded = PathBuf::from(shellexpand_path(&dir));
        std::fs::create_dir_all(&expanded)?;
        settings.data_dir = shellexpand_path(&expanded.to_string_lossy());
    }
    save_settings(&settings)?;

    let conn = open_store(&settings)?;
    let records = count_records(&conn)?;

    if std::env::var(DATA_DIR_ENV).is_ok() {
        println!("Note: {DATA_DIR_ENV} is set and overrides the configured data directory.");
    }
    println!("Data dir:  {}", settings.data_path().display());
    println!("Database:  {}", settings.db_path().display());
    println!("Records:   {records}");
    tracing::info!(db = %settings.db_path().display(), "initialized");
    Ok(())
}
