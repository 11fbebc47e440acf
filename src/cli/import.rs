use std::path::PathBuf;

use crate::cli::open_store;
use crate::error::Result;
use crate::importer::import_file;
use crate::settings::load_settings;

pub fn run(file: &str) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = open_store(&load_settings())?;

    let result = import_file(&conn, &file_path)?;

    let delimiter = match result.delimiter {
        '\t' => "tab".to_string(),
        d => format!("'{d}'"),
    };
    println!(
        "{} records imported (delimiter {delimiter}, encoding {})",
        result.imported,
        result.encoding.as_str()
    );
    Ok(())
}
