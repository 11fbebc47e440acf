use std::collections::{BTreeMap, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::models::FinancialRecord;
use crate::parsing::{bucket_date, parse_amount, round2};

const INCOME_KIND: &str = "receita";
const UNCATEGORIZED_TOTALS: &str = "Outros";
const UNCATEGORIZED_COUNTS: &str = "Outro";

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Income,
    Expense,
}

impl Flow {
    /// "Receita" in any casing is income; every other kind is an expense.
    pub fn classify(kind: &str) -> Self {
        if kind.to_lowercase() == INCOME_KIND {
            Self::Income
        } else {
            Self::Expense
        }
    }
}

fn expenses(records: &[FinancialRecord]) -> impl Iterator<Item = &FinancialRecord> {
    records.iter().filter(|r| Flow::classify(&r.kind) == Flow::Expense)
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Indicators {
    #[serde(rename = "receita")]
    pub income: f64,
    #[serde(rename = "gastos")]
    pub expenses: f64,
    #[serde(rename = "lucro_liquido")]
    pub net: f64,
    #[serde(rename = "margem_lucro")]
    pub margin: f64,
}

pub fn indicators(records: &[FinancialRecord]) -> Indicators {
    let mut income = 0.0f64;
    let mut expense = 0.0f64;
    for r in records {
        match Flow::classify(&r.kind) {
            Flow::Income => income += parse_amount(&r.amount),
            Flow::Expense => expense += parse_amount(&r.amount),
        }
    }
    let net = income - expense;
    let margin = if income != 0.0 { net / income * 100.0 } else { 0.0 };

    Indicators {
        income: round2(income),
        expenses: round2(expense),
        net: round2(net),
        margin: round2(margin),
    }
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

/// Income and expense totals per `YYYY-MM` key. The BTreeMap keeps keys in
/// string order, which is chronological because years are four characters
/// and months are zero-padded.
fn monthly_totals(records: &[FinancialRecord]) -> BTreeMap<String, (f64, f64)> {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for r in records {
        let Some(bucket) = bucket_date(&r.date) else {
            continue;
        };
        let entry = months.entry(bucket.key()).or_default();
        match Flow::classify(&r.kind) {
            Flow::Income => entry.0 += parse_amount(&r.amount),
            Flow::Expense => entry.1 += parse_amount(&r.amount),
        }
    }
    months
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MonthlyTrends {
    pub labels: Vec<String>,
    #[serde(rename = "receitas")]
    pub income: Vec<f64>,
    #[serde(rename = "despesas")]
    pub expenses: Vec<f64>,
}

pub fn monthly_trends(records: &[FinancialRecord]) -> MonthlyTrends {
    let months = monthly_totals(records);
    let mut trends = MonthlyTrends {
        labels: Vec::with_capacity(months.len()),
        income: Vec::with_capacity(months.len()),
        expenses: Vec::with_capacity(months.len()),
    };
    for (label, (inc, exp)) in months {
        trends.labels.push(label);
        trends.income.push(round2(inc));
        trends.expenses.push(round2(exp));
    }
    trends
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CashFlow {
    pub labels: Vec<String>,
    #[serde(rename = "fluxo")]
    pub net: Vec<f64>,
}

pub fn cash_flow(records: &[FinancialRecord]) -> CashFlow {
    let (labels, net) = monthly_totals(records)
        .into_iter()
        .map(|(label, (inc, exp))| (label, round2(inc - exp)))
        .unzip();
    CashFlow { labels, net }
}

// ---------------------------------------------------------------------------
// Expense breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExpenseDistribution {
    pub labels: Vec<String>,
    #[serde(rename = "valores")]
    pub values: Vec<f64>,
}

/// Expense totals per category, in the order categories first appear.
pub fn expense_distribution(records: &[FinancialRecord]) -> ExpenseDistribution {
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut labels: Vec<String> = Vec::new();
    let mut totals: Vec<f64> = Vec::new();

    for r in expenses(records) {
        let category = if r.category.is_empty() {
            UNCATEGORIZED_TOTALS
        } else {
            r.category.as_str()
        };
        let idx = *order.entry(category).or_insert_with(|| {
            labels.push(category.to_string());
            totals.push(0.0);
            labels.len() - 1
        });
        totals[idx] += parse_amount(&r.amount);
    }

    ExpenseDistribution {
        labels,
        values: totals.into_iter().map(round2).collect(),
    }
}

/// Share of expense records per category, as percentages of the record count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseTypeShare {
    pub shares: Vec<(String, f64)>,
}

impl ExpenseTypeShare {
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

impl Serialize for ExpenseTypeShare {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.shares.len()))?;
        for (category, pct) in &self.shares {
            map.serialize_entry(category, pct)?;
        }
        map.end()
    }
}

pub fn expense_type_percentage(records: &[FinancialRecord]) -> ExpenseTypeShare {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut total = 0usize;
    for r in expenses(records) {
        let category = if r.category.is_empty() {
            UNCATEGORIZED_COUNTS
        } else {
            r.category.as_str()
        };
        match counts.iter_mut().find(|(c, _)| c == category) {
            Some((_, n)) => *n += 1,
            None => counts.push((category.to_string(), 1)),
        }
        total += 1;
    }
    if total == 0 {
        return ExpenseTypeShare::default();
    }

    ExpenseTypeShare {
        shares: counts
            .into_iter()
            .map(|(c, n)| (c, round2(n as f64 / total as f64 * 100.0)))
            .collect(),
    }
}
