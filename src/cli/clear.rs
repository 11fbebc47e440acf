use crate::cli::open_store;
use crate::db::delete_all_records;
use crate::error::{CaixaError, Result};
use crate::settings::load_settings;

pub fn run(yes: bool) -> Result<()> {
    if !yes {
        return Err(CaixaError::Other(
            "this deletes every stored record; re-run with --yes to confirm".to_string(),
        ));
    }
    let conn = open_store(&load_settings())?;
    let removed = delete_all_records(&conn)?;
    tracing::info!(records = removed, "records deleted");
    println!("{removed} records deleted.");
    Ok(())
}
