//! Descriptive statistics over transaction amounts

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Category, Transaction};

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for an empty slice
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Standard deviation over mean; 0 when the mean is 0
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        return 0.0;
    }
    std_dev(values) / m
}

/// Amount statistics for one category's debits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStatistics {
    pub category: Category,
    pub mean: f64,
    pub standard_deviation: f64,
    /// Debit amounts in input order
    pub sample_amounts: Vec<f64>,
}

impl CategoryStatistics {
    pub fn from_amounts(category: Category, amounts: Vec<f64>) -> Self {
        Self {
            category,
            mean: mean(&amounts),
            standard_deviation: std_dev(&amounts),
            sample_amounts: amounts,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.sample_amounts.len()
    }

    /// Distance from the mean in standard deviations; `None` when sd is 0
    pub fn z_score(&self, amount: f64) -> Option<f64> {
        if self.standard_deviation == 0.0 {
            return None;
        }
        Some((amount - self.mean).abs() / self.standard_deviation)
    }
}

/// Debit amounts grouped by category, in category order
pub fn debit_amounts_by_category(transactions: &[Transaction]) -> BTreeMap<Category, Vec<f64>> {
    let mut groups: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.is_debit()) {
        groups.entry(tx.category).or_default().push(tx.amount);
    }
    groups
}

/// Per-category statistics for every category with at least one debit
pub fn category_statistics(transactions: &[Transaction]) -> Vec<CategoryStatistics> {
    debit_amounts_by_category(transactions)
        .into_iter()
        .map(|(category, amounts)| CategoryStatistics::from_amounts(category, amounts))
        .collect()
}

/// Whether a transaction's text mentions one of the subscription keywords
pub fn is_subscription_charge(tx: &Transaction, keywords: &[String]) -> bool {
    let description = tx.description.to_lowercase();
    let merchant = tx.merchant.as_deref().unwrap_or("").to_lowercase();
    keywords.iter().any(|k| {
        let k = k.to_lowercase();
        description.contains(&k) || merchant.contains(&k)
    })
}

/// Income, spending and per-category totals for a set of transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CashFlowSummary {
    pub transaction_count: usize,
    pub total_income: f64,
    pub total_spending: f64,
    /// `(income - spending) / income`; `None` without income
    pub savings_rate: Option<f64>,
    pub category_totals: BTreeMap<Category, f64>,
    pub category_counts: BTreeMap<Category, usize>,
    /// Debits that look like subscription charges
    pub subscription_charges: usize,
}

impl CashFlowSummary {
    pub fn compute(transactions: &[Transaction], subscription_keywords: &[String]) -> Self {
        let mut summary = CashFlowSummary {
            transaction_count: transactions.len(),
            ..Default::default()
        };

        for tx in transactions {
            if tx.is_credit() {
                summary.total_income += tx.amount;
                continue;
            }
            summary.total_spending += tx.amount;
            *summary.category_totals.entry(tx.category).or_insert(0.0) += tx.amount;
            *summary.category_counts.entry(tx.category).or_insert(0) += 1;
            if is_subscription_charge(tx, subscription_keywords) {
                summary.subscription_charges += 1;
            }
        }

        if summary.total_income > 0.0 {
            summary.savings_rate =
                Some((summary.total_income - summary.total_spending) / summary.total_income);
        }

        summary
    }

    /// Spending as a fraction of income; `None` without income
    pub fn spending_ratio(&self) -> Option<f64> {
        if self.total_income > 0.0 {
            Some(self.total_spending / self.total_income)
        } else {
            None
        }
    }

    pub fn category_total(&self, category: Category) -> f64 {
        self.category_totals.get(&category).copied().unwrap_or(0.0)
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    /// A category's share of total spending as a percentage
    pub fn category_percent(&self, category: Category) -> f64 {
        if self.total_spending <= 0.0 {
            return 0.0;
        }
        self.category_total(category) / self.total_spending * 100.0
    }
}
