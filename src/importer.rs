use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::columns::ColumnMap;
use crate::db;
use crate::error::{CaixaError, Result};
use crate::models::{FinancialRecord, ImportRecord};
use crate::parsing::check_amount;

const SNIFF_WINDOW: usize = 1024;
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
        }
    }
}

/// Decode upload bytes as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to a char, so the only thing rejected is binary
/// content (NUL bytes), which neither encoding can represent as CSV text.
pub fn decode(bytes: &[u8]) -> Result<(String, Encoding)> {
    if bytes.contains(&0) {
        return Err(CaixaError::Decode("file contains binary data".to_string()));
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => {
            let text = text.strip_prefix('\u{feff}').unwrap_or(text);
            Ok((text.to_string(), Encoding::Utf8))
        }
        Err(_) => Ok((bytes.iter().map(|&b| b as char).collect(), Encoding::Latin1)),
    }
}

// ---------------------------------------------------------------------------
// Sniffing
// ---------------------------------------------------------------------------

fn sample(text: &str) -> &str {
    match text.char_indices().nth(SNIFF_WINDOW) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().find(|l| !l.trim().is_empty())
}

fn most_frequent_delimiter(line: &str) -> char {
    CANDIDATE_DELIMITERS
        .iter()
        .map(|d| (*d, line.matches(*d).count()))
        .fold((',', 0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}

/// A header is plausible when the first line has letters in it and none of
/// its cells reads as a number.
pub fn looks_like_header(sample: &str) -> bool {
    let Some(line) = first_line(sample) else {
        return false;
    };
    if !line.chars().any(char::is_alphabetic) {
        return false;
    }
    let delimiter = most_frequent_delimiter(line);
    line.split(delimiter).all(|cell| {
        let cell = cell.trim().trim_matches('"');
        cell.is_empty() || check_amount(Some(cell)).defaulted
    })
}

/// Pick the delimiter that splits every complete sample line into the same
/// number of fields. Ties go to the most frequent candidate.
pub fn sniff_delimiter(sample: &str) -> char {
    let mut lines: Vec<&str> = sample.lines().filter(|l| !l.trim().is_empty()).collect();
    // The window may cut the last line short.
    if lines.len() > 1 && !sample.ends_with('\n') {
        lines.pop();
    }
    if lines.is_empty() {
        return ',';
    }

    let mut best: Option<(char, bool, usize)> = None;
    for delim in CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines.iter().map(|l| l.matches(delim).count()).collect();
        let total: usize = counts.iter().sum();
        if total == 0 {
            continue;
        }
        let consistent = counts.iter().all(|c| *c == counts[0]);
        let better = match best {
            None => true,
            Some((_, best_consistent, best_total)) => {
                (consistent, total) > (best_consistent, best_total)
            }
        };
        if better {
            best = Some((delim, consistent, total));
        }
    }
    best.map(|(d, _, _)| d).unwrap_or(',')
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Records parsed from one upload, before anything is stored.
#[derive(Debug)]
pub struct ParsedUpload {
    pub records: Vec<FinancialRecord>,
    pub delimiter: char,
    pub encoding: Encoding,
    pub columns: ColumnMap,
}

/// Decode, sniff, tabulate and normalize an uploaded CSV.
pub fn parse_upload(bytes: &[u8]) -> Result<ParsedUpload> {
    let (text, encoding) = decode(bytes)?;
    if text.trim().is_empty() {
        return Err(CaixaError::Parse("file is empty".to_string()));
    }

    let head = sample(&text);
    let delimiter = if looks_like_header(head) {
        sniff_delimiter(head)
    } else {
        ','
    };
    tracing::debug!(?delimiter, encoding = encoding.as_str(), "sniffed upload");

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| CaixaError::Parse(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CaixaError::Parse("no header row found".to_string()));
    }

    let columns = ColumnMap::from_headers(&headers);
    if columns.matched() == 0 {
        tracing::warn!(?headers, "no header matched a known column; all fields will be empty");
    }

    let mut records = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(line = line + 2, error = %e, "unreadable row stored blank");
                records.push(FinancialRecord::default());
                continue;
            }
        };
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cells: Vec<&str> = row.iter().collect();
        records.push(columns.extract(&cells));
    }

    Ok(ParsedUpload {
        records,
        delimiter,
        encoding,
        columns,
    })
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub struct ImportResult {
    pub imported: usize,
    pub delimiter: char,
    pub encoding: Encoding,
}

/// Parse an upload and store each record as it goes.
///
/// Records are inserted one at a time; if a later insert fails the earlier
/// ones stay stored.
pub fn import_bytes(conn: &Connection, filename: &str, bytes: &[u8]) -> Result<ImportResult> {
    let parsed = parse_upload(bytes)?;
    let missing = parsed.columns.missing();
    if !missing.is_empty() {
        tracing::debug!(filename, ?missing, "columns absent from upload stored empty");
    }

    let mut imported = 0usize;
    for record in &parsed.records {
        db::insert_record(conn, record)?;
        imported += 1;
    }

    db::record_import(
        conn,
        &ImportRecord {
            id: None,
            filename: filename.to_string(),
            record_count: imported as i64,
            delimiter: parsed.delimiter.to_string(),
            encoding: parsed.encoding.as_str().to_string(),
            checksum: checksum(bytes),
            imported_at: None,
        },
    )?;
    tracing::info!(filename, records = imported, "import complete");

    Ok(ImportResult {
        imported,
        delimiter: parsed.delimiter,
        encoding: parsed.encoding,
    })
}

pub fn import_file(conn: &Connection, file_path: &Path) -> Result<ImportResult> {
    let bytes = std::fs::read(file_path)?;
    let filename = file_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    import_bytes(conn, filename, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_records, load_records, recent_imports, test_db};

    const HEADER: &str = "Data,Cliente/Fornecedor,Descrição,Categoria,Valor (R$),Tipo,Forma de Pagamento,Status";

    #[test]
    fn test_decode_utf8_and_bom() {
        let (text, enc) = decode("\u{feff}Data\n".as_bytes()).unwrap();
        assert_eq!(text, "Data\n");
        assert_eq!(enc, Encoding::Utf8);
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "Descrição" in ISO-8859-1
        let bytes = b"Descri\xe7\xe3o\n";
        let (text, enc) = decode(bytes).unwrap();
        assert_eq!(text, "Descrição\n");
        assert_eq!(enc, Encoding::Latin1);
    }

    #[test]
    fn test_decode_rejects_binary() {
        let err = decode(b"PK\x03\x04\x00\x00").unwrap_err();
        assert!(matches!(err, CaixaError::Decode(_)));
    }

    #[test]
    fn test_sniff_semicolon() {
        let s = "Data;Valor (R$);Tipo\n01/01/2024;1.000,00;Receita\n";
        assert_eq!(sniff_delimiter(s), ';');
    }

    #[test]
    fn test_sniff_prefers_consistent_delimiter() {
        // Commas appear inside amounts but only semicolons split every line evenly.
        let s = "Data;Valor;Tipo\n01/01/2024;1,5;Receita\n02/01/2024;2,5,1;Despesa\n";
        assert_eq!(sniff_delimiter(s), ';');
    }

    #[test]
    fn test_sniff_tab_and_default() {
        assert_eq!(sniff_delimiter("Data\tTipo\n2024-01-01\tReceita\n"), '\t');
        assert_eq!(sniff_delimiter("Data\n2024-01-01\n"), ',');
    }

    #[test]
    fn test_looks_like_header() {
        assert!(looks_like_header("Data;Valor (R$);Tipo\n"));
        assert!(!looks_like_header("01/01/2024;1.000,00;500\n"));
        assert!(!looks_like_header("1;2;3\n"));
        assert!(!looks_like_header(""));
    }

    #[test]
    fn test_parse_upload_without_header_defaults_to_comma() {
        let csv = "10;20\n30;40\n";
        let parsed = parse_upload(csv.as_bytes()).unwrap();
        assert_eq!(parsed.delimiter, ',');
        assert_eq!(parsed.columns.matched(), 0);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0], FinancialRecord::default());
    }

    #[test]
    fn test_parse_upload_canonical_order_and_verbatim_cells() {
        let csv = "Tipo;VALOR(R$);data;Descricao\nReceita;1.000,00;01/01/2024;Venda à vista\n";
        let parsed = parse_upload(csv.as_bytes()).unwrap();
        assert_eq!(parsed.delimiter, ';');
        assert_eq!(parsed.records.len(), 1);
        let r = &parsed.records[0];
        assert_eq!(r.date, "01/01/2024");
        assert_eq!(r.amount, "1.000,00");
        assert_eq!(r.kind, "Receita");
        assert_eq!(r.description, "Venda à vista");
        assert_eq!(r.counterparty, "");
        assert_eq!(r.category, "");
    }

    #[test]
    fn test_parse_upload_quoted_amounts_with_commas() {
        let csv = format!(
            "{HEADER}\n01/01/2024,Loja A,Venda,,\"1.000,00\",Receita,,\n05/01/2024,Fornecedor B,Compra,Material,\"500,00\",Despesa,,\n"
        );
        let parsed = parse_upload(csv.as_bytes()).unwrap();
        assert_eq!(parsed.delimiter, ',');
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].amount, "1.000,00");
        assert_eq!(parsed.records[1].category, "Material");
    }

    #[test]
    fn test_parse_upload_latin1_headers_match() {
        let mut bytes = b"Data;Descri\xe7\xe3o;Valor (R$);Tipo\n".to_vec();
        bytes.extend_from_slice(b"02/02/2024;Aluguel;1.500,00;Despesa\n");
        let parsed = parse_upload(&bytes).unwrap();
        assert_eq!(parsed.encoding, Encoding::Latin1);
        assert_eq!(parsed.records[0].description, "Aluguel");
        assert_eq!(parsed.records[0].amount, "1.500,00");
    }

    #[test]
    fn test_parse_upload_short_rows_and_blank_lines() {
        let csv = "Data;Valor (R$);Tipo\n01/01/2024;10,00\n\n02/01/2024;20,00;Despesa;extra\n";
        let parsed = parse_upload(csv.as_bytes()).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].kind, "");
        assert_eq!(parsed.records[1].kind, "Despesa");
    }

    #[test]
    fn test_parse_upload_skips_whitespace_only_lines() {
        let csv = "Data;Valor (R$);Tipo\r\n01/01/2024;10,00;Receita\r\n   \r\n02/01/2024;5,00;Despesa\r\n \r\n";
        let parsed = parse_upload(csv.as_bytes()).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].date, "01/01/2024");
        assert_eq!(parsed.records[1].date, "02/01/2024");
    }

    #[test]
    fn test_parse_upload_empty_is_parse_error() {
        assert!(matches!(parse_upload(b"").unwrap_err(), CaixaError::Parse(_)));
        assert!(matches!(parse_upload(b"  \n\n").unwrap_err(), CaixaError::Parse(_)));
    }

    #[test]
    fn test_header_only_imports_nothing() {
        let parsed = parse_upload(HEADER.as_bytes()).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.columns.matched(), 8);
    }

    #[test]
    fn test_import_bytes_persists_every_row() {
        let (_dir, conn) = test_db();
        let mut csv = format!("{HEADER}\n");
        for i in 1..=5 {
            csv.push_str(&format!("0{i}/02/2024,Cliente {i},Serviço,Consultoria,\"{i}00,00\",Receita,Pix,Pago\n"));
        }
        let result = import_bytes(&conn, "fev.csv", csv.as_bytes()).unwrap();
        assert_eq!(result.imported, 5);
        assert_eq!(count_records(&conn).unwrap(), 5);
        let records = load_records(&conn).unwrap();
        assert_eq!(records[0].counterparty, "Cliente 1");
        assert_eq!(records[4].amount, "500,00");
        assert_eq!(records[4].payment_method, "Pix");

        let imports = recent_imports(&conn, 1).unwrap();
        assert_eq!(imports[0].record_count, 5);
        assert_eq!(imports[0].checksum.len(), 64);
    }

    #[test]
    fn test_reimport_same_file_appends() {
        let (_dir, conn) = test_db();
        let csv = format!("{HEADER}\n01/01/2024,Loja A,Venda,,\"1.000,00\",Receita,,\n");
        import_bytes(&conn, "a.csv", csv.as_bytes()).unwrap();
        import_bytes(&conn, "a.csv", csv.as_bytes()).unwrap();
        assert_eq!(count_records(&conn).unwrap(), 2);
    }

    #[test]
    fn test_import_file_from_disk() {
        let (dir, conn) = test_db();
        let path = dir.path().join("jan.csv");
        std::fs::write(&path, "Data;Valor (R$);Tipo\n2024-01-10;99,90;Despesa\n").unwrap();
        let result = import_file(&conn, &path).unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.delimiter, ';');
        assert_eq!(recent_imports(&conn, 1).unwrap()[0].filename, "jan.csv");
    }
}
