use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{FinancialRecord, ImportRecord, StoredRecord};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS financial_records (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL DEFAULT '',
    counterparty TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    amount TEXT NOT NULL DEFAULT '',
    kind TEXT NOT NULL DEFAULT '',
    payment_method TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT '',
    uploaded_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    record_count INTEGER NOT NULL,
    delimiter TEXT NOT NULL,
    encoding TEXT NOT NULL,
    checksum TEXT NOT NULL,
    imported_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY,
    conversation_id TEXT NOT NULL UNIQUE,
    user_id TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY,
    conversation_id INTEGER NOT NULL,
    sender TEXT NOT NULL CHECK (sender IN ('user', 'agent')),
    text TEXT NOT NULL,
    timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id, timestamp);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Open and migrate in one step; every request handler starts here.
pub fn open(db_path: &Path) -> Result<Connection> {
    let conn = get_connection(db_path)?;
    init_db(&conn)?;
    Ok(conn)
}

// ---------------------------------------------------------------------------
// Financial records
// ---------------------------------------------------------------------------

pub fn insert_record(conn: &Connection, record: &FinancialRecord) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO financial_records \
         (date, counterparty, description, category, amount, kind, payment_method, status) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    stmt.execute(rusqlite::params![
        record.date,
        record.counterparty,
        record.description,
        record.category,
        record.amount,
        record.kind,
        record.payment_method,
        record.status,
    ])?;
    Ok(conn.last_insert_rowid())
}

/// Every stored record, newest upload first.
pub fn all_records(conn: &Connection) -> Result<Vec<StoredRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, counterparty, description, category, amount, kind, \
         payment_method, status, uploaded_at \
         FROM financial_records ORDER BY uploaded_at DESC, id DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StoredRecord {
                id: row.get(0)?,
                record: FinancialRecord {
                    date: row.get(1)?,
                    counterparty: row.get(2)?,
                    description: row.get(3)?,
                    category: row.get(4)?,
                    amount: row.get(5)?,
                    kind: row.get(6)?,
                    payment_method: row.get(7)?,
                    status: row.get(8)?,
                },
                uploaded_at: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Plain records for aggregation, in insertion order.
pub fn load_records(conn: &Connection) -> Result<Vec<FinancialRecord>> {
    let mut records: Vec<FinancialRecord> =
        all_records(conn)?.into_iter().map(|r| r.record).collect();
    records.reverse();
    Ok(records)
}

pub fn delete_all_records(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM financial_records", [])?)
}

pub fn count_records(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM financial_records", [], |r| r.get(0))?)
}

// ---------------------------------------------------------------------------
// Import log
// ---------------------------------------------------------------------------

pub fn record_import(conn: &Connection, import: &ImportRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO imports (filename, record_count, delimiter, encoding, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            import.filename,
            import.record_count,
            import.delimiter,
            import.encoding,
            import.checksum,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn recent_imports(conn: &Connection, limit: usize) -> Result<Vec<ImportRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, filename, record_count, delimiter, encoding, checksum, imported_at \
         FROM imports ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(ImportRecord {
                id: row.get(0)?,
                filename: row.get(1)?,
                record_count: row.get(2)?,
                delimiter: row.get(3)?,
                encoding: row.get(4)?,
                checksum: row.get(5)?,
                imported_at: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = open(&dir.path().join("test.db")).unwrap();
    (dir, conn)
}
