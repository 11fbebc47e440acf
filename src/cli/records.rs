use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::open_store;
use crate::columns::{CanonicalField, CANONICAL_FIELDS};
use crate::db::all_records;
use crate::error::Result;
use crate::fmt::{money, timestamp};
use crate::parsing::check_amount;
use crate::settings::load_settings;

pub fn run(limit: Option<usize>) -> Result<()> {
    let conn = open_store(&load_settings())?;
    let records = all_records(&conn)?;

    if records.is_empty() {
        println!("No records. Import a spreadsheet with `caixa import <file>`.");
        return Ok(());
    }

    let mut header: Vec<&str> = CANONICAL_FIELDS.iter().map(CanonicalField::label).collect();
    header.push("Enviado em");

    let mut table = Table::new();
    table.set_header(header);

    let shown = limit.unwrap_or(records.len()).min(records.len());
    for stored in records.iter().take(shown) {
        let r = &stored.record;
        // Unparseable amounts are shown as typed.
        let amount = check_amount(Some(r.amount.as_str()));
        let amount = if amount.defaulted && !r.amount.trim().is_empty() {
            r.amount.clone()
        } else {
            money(amount.value)
        };
        table.add_row(vec![
            Cell::new(&r.date),
            Cell::new(&r.counterparty),
            Cell::new(&r.description),
            Cell::new(&r.category),
            Cell::new(amount).set_alignment(CellAlignment::Right),
            Cell::new(&r.kind),
            Cell::new(&r.payment_method),
            Cell::new(&r.status),
            Cell::new(timestamp(&stored.uploaded_at)),
        ]);
    }

    println!("{table}");
    if shown < records.len() {
        println!("Showing {shown} of {} records.", records.len());
    }
    Ok(())
}
