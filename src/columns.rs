use unicode_normalization::UnicodeNormalization;

use crate::models::FinancialRecord;

/// The eight fields every stored record carries, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Date,
    Counterparty,
    Description,
    Category,
    Amount,
    Kind,
    PaymentMethod,
    Status,
}

pub const CANONICAL_FIELDS: [CanonicalField; 8] = [
    CanonicalField::Date,
    CanonicalField::Counterparty,
    CanonicalField::Description,
    CanonicalField::Category,
    CanonicalField::Amount,
    CanonicalField::Kind,
    CanonicalField::PaymentMethod,
    CanonicalField::Status,
];

impl CanonicalField {
    /// Header spelling after `normalize_header`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Date => "data",
            Self::Counterparty => "clientefornecedor",
            Self::Description => "descricao",
            Self::Category => "categoria",
            Self::Amount => "valorr$",
            Self::Kind => "tipo",
            Self::PaymentMethod => "formadepagamento",
            Self::Status => "status",
        }
    }

    /// Header as it appears in the reference spreadsheet export.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "Data",
            Self::Counterparty => "Cliente/Fornecedor",
            Self::Description => "Descrição",
            Self::Category => "Categoria",
            Self::Amount => "Valor (R$)",
            Self::Kind => "Tipo",
            Self::PaymentMethod => "Forma de Pagamento",
            Self::Status => "Status",
        }
    }
}

/// Fold a spreadsheet header to its comparison key: strip accents, lowercase,
/// trim, then drop `/`, spaces, parentheses and dashes.
pub fn normalize_header(header: &str) -> String {
    let ascii: String = header.nfkd().filter(char::is_ascii).collect();
    ascii
        .to_lowercase()
        .trim()
        .chars()
        .filter(|c| !matches!(c, '/' | ' ' | '(' | ')' | '-'))
        .collect()
}

/// Where each canonical field lives in the uploaded header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [Option<usize>; 8],
}

impl ColumnMap {
    /// Match headers to canonical fields. When two headers fold to the same
    /// key the first one wins.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();
        let mut indices = [None; 8];
        for (slot, field) in indices.iter_mut().zip(CANONICAL_FIELDS.iter()) {
            *slot = normalized.iter().position(|n| n == field.key());
        }
        Self { indices }
    }

    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        let pos = CANONICAL_FIELDS.iter().position(|f| *f == field)?;
        self.indices[pos]
    }

    pub fn matched(&self) -> usize {
        self.indices.iter().filter(|i| i.is_some()).count()
    }

    /// Canonical fields with no source column; these are stored as empty text.
    pub fn missing(&self) -> Vec<CanonicalField> {
        CANONICAL_FIELDS
            .iter()
            .zip(self.indices.iter())
            .filter(|(_, idx)| idx.is_none())
            .map(|(f, _)| *f)
            .collect()
    }

    /// Build a canonical record from one data row, taking cells verbatim.
    pub fn extract<S: AsRef<str>>(&self, row: &[S]) -> FinancialRecord {
        let cell = |field: CanonicalField| -> String {
            self.index_of(field)
                .and_then(|i| row.get(i))
                .map(|s| s.as_ref().to_string())
                .unwrap_or_default()
        };
        FinancialRecord {
            date: cell(CanonicalField::Date),
            counterparty: cell(CanonicalField::Counterparty),
            description: cell(CanonicalField::Description),
            category: cell(CanonicalField::Category),
            amount: cell(CanonicalField::Amount),
            kind: cell(CanonicalField::Kind),
            payment_method: cell(CanonicalField::PaymentMethod),
            status: cell(CanonicalField::Status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_amount_header_variants() {
        assert_eq!(normalize_header("Valor (R$)"), "valorr$");
        assert_eq!(normalize_header("VALOR(R$)"), "valorr$");
        assert_eq!(normalize_header("  valor - (r$) "), "valorr$");
    }

    #[test]
    fn test_normalize_strips_accents_and_punctuation() {
        assert_eq!(normalize_header("Descrição"), "descricao");
        assert_eq!(normalize_header("DESCRIÇÃO"), "descricao");
        assert_eq!(normalize_header("Cliente/Fornecedor"), "clientefornecedor");
        assert_eq!(normalize_header("Forma de Pagamento"), "formadepagamento");
        assert_eq!(normalize_header("Forma-de-Pagamento"), "formadepagamento");
    }

    #[test]
    fn test_canonical_labels_fold_to_their_keys() {
        for field in CANONICAL_FIELDS {
            assert_eq!(normalize_header(field.label()), field.key());
        }
    }

    #[test]
    fn test_column_map_ignores_input_order() {
        let headers = ["VALOR(R$)", "tipo", "DATA", "Descricao"];
        let map = ColumnMap::from_headers(&headers);
        assert_eq!(map.index_of(CanonicalField::Amount), Some(0));
        assert_eq!(map.index_of(CanonicalField::Kind), Some(1));
        assert_eq!(map.index_of(CanonicalField::Date), Some(2));
        assert_eq!(map.index_of(CanonicalField::Description), Some(3));
        assert_eq!(map.matched(), 4);

        let rec = map.extract(&["1.000,00", "Receita", "01/01/2024", "Venda"]);
        assert_eq!(rec.date, "01/01/2024");
        assert_eq!(rec.amount, "1.000,00");
        assert_eq!(rec.kind, "Receita");
        assert_eq!(rec.description, "Venda");
    }

    #[test]
    fn test_unmatched_fields_are_empty() {
        let map = ColumnMap::from_headers(&["Data", "Observação"]);
        assert_eq!(
            map.missing(),
            vec![
                CanonicalField::Counterparty,
                CanonicalField::Description,
                CanonicalField::Category,
                CanonicalField::Amount,
                CanonicalField::Kind,
                CanonicalField::PaymentMethod,
                CanonicalField::Status,
            ]
        );
        let rec = map.extract(&["2024-01-05", "nota"]);
        assert_eq!(rec.date, "2024-01-05");
        assert_eq!(rec.counterparty, "");
        assert_eq!(rec.amount, "");
        assert_eq!(rec.status, "");
    }

    #[test]
    fn test_short_row_yields_empty_cells() {
        let map = ColumnMap::from_headers(&["Data", "Valor (R$)", "Tipo"]);
        let rec = map.extract(&["2024-01-05"]);
        assert_eq!(rec.date, "2024-01-05");
        assert_eq!(rec.amount, "");
        assert_eq!(rec.kind, "");
    }

    #[test]
    fn test_first_duplicate_header_wins() {
        let map = ColumnMap::from_headers(&["Tipo", "TIPO"]);
        assert_eq!(map.index_of(CanonicalField::Kind), Some(0));
    }
}
