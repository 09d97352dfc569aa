//! Financial entries and dashboard summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use retail_notion::{DatabaseKind, Page, Properties};

use crate::record::NotionRecord;

/// Direction of money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    #[default]
    Expense,
}

impl EntryKind {
    pub fn parse(value: &str) -> Option<EntryKind> {
        match value.trim().to_lowercase().as_str() {
            "income" => Some(EntryKind::Income),
            "expense" => Some(EntryKind::Expense),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

/// One line in a store's books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialEntry {
    pub id: String,
    pub store_id: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub category: String,
    pub kind: EntryKind,
    /// Always positive; `kind` carries the sign.
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl FinancialEntry {
    pub fn new(
        store_id: &str,
        description: impl Into<String>,
        kind: EntryKind,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: String::new(),
            store_id: Some(store_id.to_string()),
            description: description.into(),
            date: Some(date),
            category: String::new(),
            kind,
            amount,
            created_at: Utc::now(),
        }
    }

    /// Amount with sign applied: income positive, expense negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }

    /// Day the entry counts toward; falls back to creation day.
    pub fn effective_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| self.created_at.date_naive())
    }
}

impl NotionRecord for FinancialEntry {
    const DATABASE: DatabaseKind = DatabaseKind::Finance;

    fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            store_id: page.relation("Store"),
            description: page.title("Description"),
            date: page.date("Date"),
            category: page.select("Category").unwrap_or_default(),
            kind: page
                .select("Kind")
                .and_then(|k| EntryKind::parse(&k))
                .unwrap_or_default(),
            amount: page.number("Amount"),
            created_at: page.created_time,
        }
    }

    fn to_properties(&self) -> Properties {
        Properties::new()
            .title("Description", &self.description)
            .relation("Store", self.store_id.as_deref())
            .date("Date", self.date)
            .select("Category", &self.category)
            .select("Kind", self.kind.as_str())
            .number("Amount", self.amount)
    }
}

/// Income and expense for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub income: f64,
    pub expense: f64,
}

/// Aggregates over a set of entries, shaped for dashboard charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub entries: usize,
    /// Keyed by category; uncategorized entries fall under `"uncategorized"`.
    pub by_category: BTreeMap<String, CategoryTotal>,
    /// Net per `YYYY-MM`, chronological.
    pub by_month: BTreeMap<String, f64>,
}

impl FinanceSummary {
    pub fn from_entries(entries: &[FinancialEntry]) -> Self {
        let mut summary = FinanceSummary {
            entries: entries.len(),
            ..Default::default()
        };

        for entry in entries {
            let category = if entry.category.trim().is_empty() {
                "uncategorized".to_string()
            } else {
                entry.category.clone()
            };
            let bucket = summary.by_category.entry(category).or_default();
            match entry.kind {
                EntryKind::Income => {
                    summary.income += entry.amount;
                    bucket.income += entry.amount;
                }
                EntryKind::Expense => {
                    summary.expense += entry.amount;
                    bucket.expense += entry.amount;
                }
            }

            let month = entry.effective_date().format("%Y-%m").to_string();
            *summary.by_month.entry(month).or_insert(0.0) += entry.signed_amount();
        }

        summary.net = summary.income - summary.expense;
        summary.round_to_cents();
        summary
    }

    /// Float sums drift; values are reported to the cent.
    fn round_to_cents(&mut self) {
        self.income = cents(self.income);
        self.expense = cents(self.expense);
        self.net = cents(self.net);
        for total in self.by_category.values_mut() {
            total.income = cents(total.income);
            total.expense = cents(total.expense);
        }
        for net in self.by_month.values_mut() {
            *net = cents(*net);
        }
    }
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, amount: f64, category: &str, month: u32, day: u32) -> FinancialEntry {
        let mut e = FinancialEntry::new(
            "s-1",
            "line",
            kind,
            amount,
            NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
        );
        e.category = category.to_string();
        e
    }

    #[test]
    fn test_summary_totals() {
        let entries = vec![
            entry(EntryKind::Income, 1000.10, "sales", 1, 5),
            entry(EntryKind::Income, 500.20, "sales", 2, 1),
            entry(EntryKind::Expense, 300.0, "rent", 1, 1),
            entry(EntryKind::Expense, 0.1, "", 2, 3),
        ];
        let summary = FinanceSummary::from_entries(&entries);

        assert_eq!(summary.entries, 4);
        assert_eq!(summary.income, 1500.3);
        assert_eq!(summary.expense, 300.1);
        assert_eq!(summary.net, 1200.2);
        assert_eq!(summary.by_category["sales"].income, 1500.3);
        assert_eq!(summary.by_category["rent"].expense, 300.0);
        assert_eq!(summary.by_category["uncategorized"].expense, 0.1);

        let months: Vec<(&String, &f64)> = summary.by_month.iter().collect();
        assert_eq!(months[0].0, "2024-01");
        assert_eq!(*months[0].1, 700.1);
        assert_eq!(months[1].0, "2024-02");
        assert_eq!(*months[1].1, 500.1);
    }

    #[test]
    fn test_empty_summary() {
        let summary = FinanceSummary::from_entries(&[]);
        assert_eq!(summary, FinanceSummary::default());
    }

    #[test]
    fn test_signed_amount_and_kind_parse() {
        assert_eq!(entry(EntryKind::Expense, 5.0, "", 1, 1).signed_amount(), -5.0);
        assert_eq!(EntryKind::parse("Income"), Some(EntryKind::Income));
        assert_eq!(EntryKind::parse("refund"), None);
    }

    #[test]
    fn test_effective_date_falls_back_to_created() {
        let mut e = entry(EntryKind::Income, 1.0, "", 3, 3);
        e.date = None;
        assert_eq!(e.effective_date(), e.created_at.date_naive());
    }
}
