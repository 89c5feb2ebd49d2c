//! Budget planning
//!
//! Suggests a monthly budget per category from spending history, using the
//! 50/30/20 split of income as a ceiling for needs and wants, and checks
//! spending against budgets.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Category, Transaction};
use crate::patterns::{SpendingAnalysis, Trend};
use crate::stats::{mean, std_dev};

/// Budget planner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Assumed monthly income when there are no credits
    pub default_monthly_income: f64,
    /// Share of income for needs (food, transport, bills)
    pub needs_share: f64,
    /// Share of income for wants (shopping, entertainment)
    pub wants_share: f64,
    /// Categories spending less than this per month get no budget
    pub min_monthly_spend: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            default_monthly_income: 50_000.0,
            needs_share: 0.5,
            wants_share: 0.3,
            min_monthly_spend: 100.0,
        }
    }
}

/// Suggested monthly budget for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSuggestion {
    pub category: Category,
    pub suggested_budget: f64,
    pub current_monthly_spending: f64,
    pub confidence: f64,
    /// Percent of the budget at which to warn
    pub alert_threshold: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetAlertLevel {
    /// Within 10 points of the alert threshold
    Approaching,
    /// At or past the alert threshold
    Warning,
    /// At or past the budget
    Exceeded,
}

impl BudgetAlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetAlertLevel::Approaching => "approaching",
            BudgetAlertLevel::Warning => "warning",
            BudgetAlertLevel::Exceeded => "exceeded",
        }
    }
}

impl std::fmt::Display for BudgetAlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub category: Category,
    pub level: BudgetAlertLevel,
    pub percent: f64,
    pub spent: f64,
    pub limit: f64,
    pub message: String,
}

/// Where spending sits against a budget, if it warrants an alert
pub fn budget_status(spent: f64, limit: f64, alert_threshold: f64) -> Option<(BudgetAlertLevel, f64)> {
    if limit <= 0.0 {
        return (spent > 0.0).then_some((BudgetAlertLevel::Exceeded, 100.0));
    }
    let percent = spent / limit * 100.0;
    let level = if percent >= 100.0 {
        BudgetAlertLevel::Exceeded
    } else if percent >= alert_threshold {
        BudgetAlertLevel::Warning
    } else if percent >= alert_threshold - 10.0 {
        BudgetAlertLevel::Approaching
    } else {
        return None;
    };
    Some((level, percent))
}

/// Debit totals per category for the latest calendar month in the input
pub fn latest_month_spending(transactions: &[Transaction]) -> BTreeMap<Category, f64> {
    let Some(latest) = transactions.iter().map(|t| t.date).max() else {
        return BTreeMap::new();
    };

    let mut totals = BTreeMap::new();
    for tx in transactions.iter().filter(|t| {
        t.is_debit() && t.date.year() == latest.year() && t.date.month() == latest.month()
    }) {
        *totals.entry(tx.category).or_insert(0.0) += tx.amount;
    }
    totals
}

#[derive(Debug, Clone, Default)]
pub struct BudgetPlanner {
    config: BudgetConfig,
}

impl BudgetPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BudgetConfig) -> Self {
        Self { config }
    }

    /// Suggest budgets, highest confidence first
    ///
    /// `transactions` should be the same window `analysis` was built from;
    /// the analysis supplies each category's trend.
    pub fn suggest(
        &self,
        transactions: &[Transaction],
        analysis: &SpendingAnalysis,
    ) -> Vec<BudgetSuggestion> {
        let months: BTreeSet<(i32, u32)> = transactions
            .iter()
            .map(|t| (t.date.year(), t.date.month()))
            .collect();
        if months.is_empty() {
            return Vec::new();
        }
        let month_count = months.len() as f64;

        let income: f64 = transactions
            .iter()
            .filter(|t| t.is_credit())
            .map(|t| t.amount)
            .sum();
        let monthly_income = if income > 0.0 {
            income / month_count
        } else {
            self.config.default_monthly_income
        };
        let needs = monthly_income * self.config.needs_share;
        let wants = monthly_income * self.config.wants_share;

        // Per category, per month debit totals
        let mut monthly: BTreeMap<Category, BTreeMap<(i32, u32), f64>> = BTreeMap::new();
        for tx in transactions.iter().filter(|t| t.is_debit()) {
            *monthly
                .entry(tx.category)
                .or_default()
                .entry((tx.date.year(), tx.date.month()))
                .or_insert(0.0) += tx.amount;
        }

        let mut suggestions = Vec::new();
        for (category, by_month) in monthly {
            // Months without spending count as zero
            let mut totals: Vec<f64> = by_month.values().copied().collect();
            totals.resize(months.len(), 0.0);

            let average = mean(&totals);
            if average < self.config.min_monthly_spend {
                debug!(category = %category, average, "Skipping budget: low spending");
                continue;
            }
            let variability = std_dev(&totals);

            let (mut budget, confidence, mut reasoning) = match category {
                Category::Food => (
                    (average * 1.1).min(needs * 0.4),
                    if variability <= average * 0.3 { 0.9 } else { 0.7 },
                    "Based on your spending pattern with 10% buffer for essentials".to_string(),
                ),
                Category::Transport => (
                    (average * 1.15).min(needs * 0.25),
                    0.8,
                    "Includes buffer for unexpected trips and fuel price changes".to_string(),
                ),
                Category::Bills => (
                    average * 1.05,
                    0.95,
                    "Based on historical bills with minimal buffer".to_string(),
                ),
                Category::Shopping => (
                    (average * 0.9).min(wants * 0.6),
                    0.6,
                    "Reduced from current spending to encourage savings".to_string(),
                ),
                Category::Entertainment => (
                    (average * 0.95).min(wants * 0.4),
                    0.7,
                    "Entertainment budget with room for occasional splurges".to_string(),
                ),
                Category::Transfer | Category::Other => (
                    average,
                    0.5,
                    "Maintain current spending level".to_string(),
                ),
            };

            match analysis.trend_for(category) {
                Some(Trend::Increasing) => {
                    budget *= 0.9;
                    reasoning.push_str(". Reduced due to increasing trend");
                }
                Some(Trend::Decreasing) => {
                    budget *= 1.05;
                    reasoning.push_str(". Slight increase as spending is decreasing");
                }
                _ => {}
            }

            let alert_threshold = if variability > average * 0.5 {
                70.0
            } else if variability > average * 0.3 {
                75.0
            } else {
                80.0
            };

            suggestions.push(BudgetSuggestion {
                category,
                suggested_budget: budget.round(),
                current_monthly_spending: average.round(),
                confidence,
                alert_threshold,
                reasoning,
            });
        }

        suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        suggestions
    }

    /// Alerts for categories whose spending is close to or over budget
    pub fn check(
        &self,
        suggestions: &[BudgetSuggestion],
        spending: &BTreeMap<Category, f64>,
    ) -> Vec<BudgetAlert> {
        suggestions
            .iter()
            .filter_map(|s| {
                let spent = spending.get(&s.category).copied().unwrap_or(0.0);
                let (level, percent) = budget_status(spent, s.suggested_budget, s.alert_threshold)?;
                let message = match level {
                    BudgetAlertLevel::Exceeded => format!(
                        "Budget exceeded! You've spent ₹{:.0} out of ₹{:.0} for {}",
                        spent, s.suggested_budget, s.category
                    ),
                    BudgetAlertLevel::Warning => format!(
                        "You've spent {:.0}% of your {} budget (₹{:.0}/₹{:.0})",
                        percent, s.category, spent, s.suggested_budget
                    ),
                    BudgetAlertLevel::Approaching => format!(
                        "Approaching budget limit: {:.0}% spent on {}",
                        percent, s.category
                    ),
                };
                Some(BudgetAlert {
                    category: s.category,
                    level,
                    percent,
                    spent,
                    limit: s.suggested_budget,
                    message,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, PaymentMethod};
    use crate::patterns::SpendingAnalyzer;
    use chrono::{TimeZone, Utc};

    fn tx(category: Category, direction: Direction, amount: f64, month: u32, day: u32) -> Transaction {
        Transaction {
            id: format!("{}-{}-{}", category.slug(), month, day),
            amount,
            description: "test".to_string(),
            category,
            date: Utc.with_ymd_and_hms(2024, month, day, 10, 0, 0).unwrap(),
            direction,
            merchant: None,
            method: PaymentMethod::Upi,
            raw_text: None,
        }
    }

    #[test]
    fn test_budget_status_levels() {
        assert_eq!(
            budget_status(1000.0, 1000.0, 80.0),
            Some((BudgetAlertLevel::Exceeded, 100.0))
        );
        assert_eq!(
            budget_status(850.0, 1000.0, 80.0),
            Some((BudgetAlertLevel::Warning, 85.0))
        );
        assert_eq!(
            budget_status(700.0, 1000.0, 80.0),
            Some((BudgetAlertLevel::Approaching, 70.0))
        );
        assert_eq!(budget_status(500.0, 1000.0, 80.0), None);
        assert_eq!(budget_status(0.0, 0.0, 80.0), None);
    }

    #[test]
    fn test_suggestions_follow_category_rules() {
        // Two months, steady spending, 60000 income per month
        let txs = vec![
            tx(Category::Transfer, Direction::Credit, 60000.0, 1, 1),
            tx(Category::Transfer, Direction::Credit, 60000.0, 2, 1),
            tx(Category::Bills, Direction::Debit, 2000.0, 1, 5),
            tx(Category::Bills, Direction::Debit, 2000.0, 2, 5),
            tx(Category::Food, Direction::Debit, 5000.0, 1, 10),
            tx(Category::Food, Direction::Debit, 5000.0, 2, 10),
            tx(Category::Shopping, Direction::Debit, 40000.0, 1, 15),
            tx(Category::Shopping, Direction::Debit, 40000.0, 2, 15),
        ];
        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        let suggestions = BudgetPlanner::new().suggest(&txs, &analysis);

        assert_eq!(suggestions.len(), 3);
        // Highest confidence first
        assert_eq!(suggestions[0].category, Category::Bills);
        assert_eq!(suggestions[0].suggested_budget, 2100.0);
        assert_eq!(suggestions[0].confidence, 0.95);
        assert_eq!(suggestions[0].alert_threshold, 80.0);

        assert_eq!(suggestions[1].category, Category::Food);
        assert_eq!(suggestions[1].suggested_budget, 5500.0);

        // Shopping capped at 60% of wants: 60000 * 0.3 * 0.6
        assert_eq!(suggestions[2].category, Category::Shopping);
        assert_eq!(suggestions[2].suggested_budget, 10800.0);
        assert_eq!(suggestions[2].current_monthly_spending, 40000.0);
    }

    #[test]
    fn test_low_spending_and_variability() {
        let txs = vec![
            tx(Category::Other, Direction::Debit, 50.0, 1, 3),
            tx(Category::Entertainment, Direction::Debit, 1000.0, 1, 3),
            // No entertainment in February
            tx(Category::Food, Direction::Debit, 300.0, 2, 3),
        ];
        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        let suggestions = BudgetPlanner::new().suggest(&txs, &analysis);

        // Other averages 25/month: skipped
        assert!(suggestions.iter().all(|s| s.category != Category::Other));

        let ent = suggestions
            .iter()
            .find(|s| s.category == Category::Entertainment)
            .unwrap();
        // Monthly totals [1000, 0] are highly variable
        assert_eq!(ent.current_monthly_spending, 500.0);
        assert_eq!(ent.alert_threshold, 70.0);
    }

    #[test]
    fn test_check_reports_alerts() {
        let suggestions = vec![BudgetSuggestion {
            category: Category::Food,
            suggested_budget: 5000.0,
            current_monthly_spending: 4500.0,
            confidence: 0.9,
            alert_threshold: 80.0,
            reasoning: String::new(),
        }];
        let mut spending = BTreeMap::new();
        spending.insert(Category::Food, 5200.0);

        let alerts = BudgetPlanner::new().check(&suggestions, &spending);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, BudgetAlertLevel::Exceeded);
        assert!((alerts[0].percent - 104.0).abs() < 1e-9);

        spending.insert(Category::Food, 100.0);
        assert!(BudgetPlanner::new().check(&suggestions, &spending).is_empty());
    }

    #[test]
    fn test_latest_month_spending() {
        let txs = vec![
            tx(Category::Food, Direction::Debit, 100.0, 1, 3),
            tx(Category::Food, Direction::Debit, 200.0, 2, 3),
            tx(Category::Food, Direction::Debit, 50.0, 2, 9),
            tx(Category::Food, Direction::Credit, 999.0, 2, 9),
        ];
        let totals = latest_month_spending(&txs);
        assert_eq!(totals.get(&Category::Food), Some(&250.0));
        assert!(latest_month_spending(&[]).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let analysis = SpendingAnalysis::default();
        assert!(BudgetPlanner::new().suggest(&[], &analysis).is_empty());
    }
}
