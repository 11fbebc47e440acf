use std::collections::HashSet;

use regex::Regex;
use rusqlite::Connection;

use crate::db;
use crate::error::{CaixaError, Result};
use crate::models::FinancialRecord;

/// Searchable context for one conversation.
pub trait SnippetIndex {
    fn search(&self, query: &str, k: usize) -> Result<Vec<String>>;
}

/// Hands out a per-conversation index, or nothing when no index exists.
pub trait Retriever: Send + Sync {
    fn index_for(&self, conn: &Connection, conversation_id: &str) -> Result<Option<Box<dyn SnippetIndex>>>;
}

/// Retriever that never has context.
pub struct NoRetrieval;

impl Retriever for NoRetrieval {
    fn index_for(&self, _conn: &Connection, _conversation_id: &str) -> Result<Option<Box<dyn SnippetIndex>>> {
        Ok(None)
    }
}

/// Lexical search over the stored financial records.
pub struct RecordRetriever;

impl Retriever for RecordRetriever {
    fn index_for(&self, conn: &Connection, conversation_id: &str) -> Result<Option<Box<dyn SnippetIndex>>> {
        let records = db::load_records(conn)?;
        if records.is_empty() {
            tracing::debug!(conversation_id, "no records to index");
            return Ok(None);
        }
        Ok(Some(Box::new(RecordIndex::new(&records)?)))
    }
}

pub fn render_record(r: &FinancialRecord) -> String {
    [
        r.date.as_str(),
        r.counterparty.as_str(),
        r.description.as_str(),
        r.category.as_str(),
        r.amount.as_str(),
        r.kind.as_str(),
    ]
    .join(" | ")
}

fn tokens(re: &Regex, text: &str) -> HashSet<String> {
    re.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

pub struct RecordIndex {
    word: Regex,
    lines: Vec<(String, HashSet<String>)>,
}

impl RecordIndex {
    pub fn new(records: &[FinancialRecord]) -> Result<Self> {
        let word = Regex::new(r"\w+").map_err(|e| CaixaError::Other(e.to_string()))?;
        let lines = records
            .iter()
            .map(|r| {
                let line = render_record(r);
                let toks = tokens(&word, &line);
                (line, toks)
            })
            .collect();
        Ok(Self { word, lines })
    }
}

impl SnippetIndex for RecordIndex {
    /// Top `k` records by number of query words they share, ties in store order.
    fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let query = tokens(&self.word, query);
        let mut scored: Vec<(usize, usize)> = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, (_, toks))| (toks.intersection(&query).count(), i))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, i)| self.lines[i].0.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_record, test_db};

    fn rec(counterparty: &str, description: &str, category: &str) -> FinancialRecord {
        FinancialRecord {
            date: "01/01/2024".into(),
            counterparty: counterparty.into(),
            description: description.into(),
            category: category.into(),
            amount: "100,00".into(),
            kind: "Despesa".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_record() {
        assert_eq!(
            render_record(&rec("Loja A", "Compra", "Material")),
            "01/01/2024 | Loja A | Compra | Material | 100,00 | Despesa"
        );
    }

    #[test]
    fn test_search_ranks_by_shared_words() {
        let index = RecordIndex::new(&[
            rec("Posto Shell", "Combustível", "Transporte"),
            rec("Google", "Anúncios de marketing", "Marketing"),
            rec("Gráfica", "Panfletos de marketing", "Marketing"),
        ])
        .unwrap();
        let hits = index.search("Quanto gastei com marketing e anúncios?", 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].contains("Google"));
        assert!(hits[1].contains("Gráfica"));
    }

    #[test]
    fn test_search_without_overlap_is_empty() {
        let index = RecordIndex::new(&[rec("Loja", "Compra", "Material")]).unwrap();
        assert!(index.search("aluguel", 3).unwrap().is_empty());
    }

    #[test]
    fn test_record_retriever_needs_records() {
        let (_dir, conn) = test_db();
        assert!(RecordRetriever.index_for(&conn, "c1").unwrap().is_none());
        insert_record(&conn, &rec("Loja", "Compra", "Material")).unwrap();
        let index = RecordRetriever.index_for(&conn, "c1").unwrap().unwrap();
        assert_eq!(index.search("material", 4).unwrap().len(), 1);
    }

    #[test]
    fn test_no_retrieval() {
        let (_dir, conn) = test_db();
        assert!(NoRetrieval.index_for(&conn, "c1").unwrap().is_none());
    }
}
