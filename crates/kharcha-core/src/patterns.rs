//! Spending pattern analysis
//!
//! Pure reductions over a window of transactions: per-category trend,
//! concentration, weekend skew, merchant activity, next-amount predictions,
//! month-over-month change and spending habits. Only debits count as spending.
//!
//! The window is anchored on the latest transaction date, not the wall clock,
//! so the same input always gives the same analysis.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Category, Transaction};
use crate::stats::{coefficient_of_variation, is_subscription_charge, mean};

/// Variance of the latest amounts above which spending is called variable
const HIGH_VARIABILITY_VARIANCE: f64 = 10_000.0;
/// Amounts considered when describing recent variability
const VARIABILITY_SAMPLE: usize = 5;

/// Pattern analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Most recent debits compared against the category mean
    pub recent_window: usize,
    pub increasing_ratio: f64,
    pub decreasing_ratio: f64,
    /// Weekend spend above weekday spend * weekend_ratio is flagged
    pub weekend_ratio: f64,
    /// Debits (exclusive) before a merchant counts as frequent
    pub frequent_merchant_min: usize,
    pub frequent_merchant_limit: usize,
    pub dominant_category_percent: f64,
    pub min_prediction_samples: usize,
    pub increasing_prediction_factor: f64,
    pub decreasing_prediction_factor: f64,
    /// Month-over-month change (absolute percent) worth reporting
    pub monthly_change_percent: f64,
    pub subscription_keywords: Vec<String>,
    /// Merchant substrings that mark a transport debit as a ride-share trip
    pub ride_share_merchants: Vec<String>,
    /// Daily spending variation (coefficient of variation) above which
    /// spending is sporadic
    pub sporadic_variation: f64,
    /// ... and above which it comes in binges
    pub binge_variation: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            recent_window: 10,
            increasing_ratio: 1.1,
            decreasing_ratio: 0.9,
            weekend_ratio: 0.4,
            frequent_merchant_min: 5,
            frequent_merchant_limit: 5,
            dominant_category_percent: 40.0,
            min_prediction_samples: 3,
            increasing_prediction_factor: 1.15,
            decreasing_prediction_factor: 0.85,
            monthly_change_percent: 15.0,
            subscription_keywords: ["netflix", "prime", "spotify", "hotstar", "zee5"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ride_share_merchants: ["uber", "ola", "rapido"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sporadic_variation: 0.8,
            binge_variation: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTrend {
    pub category: Category,
    pub trend: Trend,
    /// Mean of the most recent debits
    pub recent_mean: f64,
    pub overall_mean: f64,
    /// recent_mean / overall_mean
    pub ratio: f64,
    pub samples: usize,
}

/// A category's share of total spending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Concentration {
    pub category: Category,
    pub total: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeekendSkew {
    pub weekend_total: f64,
    pub weekday_total: f64,
    /// weekend / weekday; `None` without weekday spending
    pub ratio: Option<f64>,
    pub high: bool,
}

/// Debit activity for one merchant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantActivity {
    /// Normalized merchant key
    pub merchant: String,
    pub count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingPrediction {
    pub category: Category,
    pub predicted_amount: f64,
    pub confidence: f64,
    pub trend: Trend,
    pub factors: Vec<String>,
}

/// Total debit spending in the two most recent calendar months
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyChange {
    /// `YYYY-MM`
    pub current_month: String,
    pub previous_month: String,
    pub current_total: f64,
    pub previous_total: f64,
    pub change_percent: f64,
    /// |change_percent| above the configured threshold
    pub significant: bool,
}

/// How evenly spending is spread across active days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingConsistency {
    Consistent,
    Sporadic,
    Binge,
}

impl SpendingConsistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingConsistency::Consistent => "consistent",
            SpendingConsistency::Sporadic => "sporadic",
            SpendingConsistency::Binge => "binge",
        }
    }
}

impl std::fmt::Display for SpendingConsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// When and how money is spent
///
/// Hours and weekdays are taken in UTC. Ties go to the earliest hour, the
/// earliest weekday (Monday first) and the first category in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingHabits {
    /// Hour of day (0-23) with the highest debit total
    pub peak_hour: u32,
    /// Weekday name with the highest debit total
    pub peak_day: String,
    pub average_transaction: f64,
    /// Category with the most debits
    pub most_frequent_category: Category,
    pub consistency: SpendingConsistency,
    /// Coefficient of variation of daily debit totals
    pub daily_variation: f64,
}

/// Everything the analyzer derives from one window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendingAnalysis {
    pub window_days: u32,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub transaction_count: usize,
    pub debit_count: usize,
    pub total_spending: f64,
    pub trends: Vec<CategoryTrend>,
    /// Sorted by descending percent
    pub concentration: Vec<Concentration>,
    pub weekend_skew: WeekendSkew,
    pub top_merchant: Option<MerchantActivity>,
    pub frequent_merchants: Vec<MerchantActivity>,
    pub dominant_categories: Vec<Category>,
    pub predictions: Vec<SpendingPrediction>,
    pub monthly_change: Option<MonthlyChange>,
    pub subscription_charges: usize,
    /// Ride-share transport debits in the latest month of the window
    pub ride_share_trips: usize,
    /// `None` without debits
    pub habits: Option<SpendingHabits>,
}

impl SpendingAnalysis {
    pub fn trend_for(&self, category: Category) -> Option<Trend> {
        self.trends
            .iter()
            .find(|t| t.category == category)
            .map(|t| t.trend)
    }

    /// Percent of spending for a category (0 if absent)
    pub fn percent_for(&self, category: Category) -> f64 {
        self.concentration
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.percent)
            .unwrap_or(0.0)
    }

    pub fn debit_count_for(&self, category: Category) -> usize {
        self.trends
            .iter()
            .find(|t| t.category == category)
            .map(|t| t.samples)
            .unwrap_or(0)
    }
}

/// Restrict transactions to `[latest - window_days, latest]`
///
/// A zero-day window, or one reaching past the earliest representable date,
/// keeps everything.
pub fn window_transactions(transactions: &[Transaction], window_days: u32) -> Vec<Transaction> {
    let Some(latest) = transactions.iter().map(|t| t.date).max() else {
        return Vec::new();
    };
    if window_days == 0 {
        return transactions.to_vec();
    }
    let Some(start) = latest.checked_sub_signed(Duration::days(i64::from(window_days))) else {
        return transactions.to_vec();
    };
    transactions
        .iter()
        .filter(|t| t.date >= start)
        .cloned()
        .collect()
}

pub fn is_weekend(date: &DateTime<Utc>) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Spending pattern analyzer
#[derive(Debug, Clone, Default)]
pub struct SpendingAnalyzer {
    config: PatternConfig,
}

impl SpendingAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Analyze the last `window_days` of transactions
    pub fn analyze(&self, transactions: &[Transaction], window_days: u32) -> SpendingAnalysis {
        let window = window_transactions(transactions, window_days);
        let debits: Vec<&Transaction> = window.iter().filter(|t| t.is_debit()).collect();

        let trends = self.trends(&debits);
        let concentration = concentration(&debits);
        let dominant_categories = concentration
            .iter()
            .filter(|c| c.percent > self.config.dominant_category_percent)
            .map(|c| c.category)
            .collect();

        let merchants = merchant_activity(&debits);
        let top_merchant = merchants.first().cloned();
        let frequent_merchants = merchants
            .into_iter()
            .filter(|m| m.count > self.config.frequent_merchant_min)
            .take(self.config.frequent_merchant_limit)
            .collect();

        let analysis = SpendingAnalysis {
            window_days,
            window_start: window.iter().map(|t| t.date).min(),
            window_end: window.iter().map(|t| t.date).max(),
            transaction_count: window.len(),
            debit_count: debits.len(),
            total_spending: debits.iter().map(|t| t.amount).sum(),
            predictions: self.predictions(&debits, &trends),
            trends,
            concentration,
            weekend_skew: self.weekend_skew(&debits),
            top_merchant,
            frequent_merchants,
            dominant_categories,
            monthly_change: self.monthly_change(&debits),
            subscription_charges: debits
                .iter()
                .filter(|t| is_subscription_charge(t, &self.config.subscription_keywords))
                .count(),
            ride_share_trips: self.ride_share_trips(&debits),
            habits: self.habits(&debits),
        };

        debug!(
            window_days,
            transactions = analysis.transaction_count,
            debits = analysis.debit_count,
            categories = analysis.trends.len(),
            "Analyzed spending patterns"
        );
        analysis
    }

    fn classify_ratio(&self, ratio: f64) -> Trend {
        if ratio > self.config.increasing_ratio {
            Trend::Increasing
        } else if ratio < self.config.decreasing_ratio {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    fn trends(&self, debits: &[&Transaction]) -> Vec<CategoryTrend> {
        let mut by_category: BTreeMap<Category, Vec<&Transaction>> = BTreeMap::new();
        for tx in debits {
            by_category.entry(tx.category).or_default().push(tx);
        }

        by_category
            .into_iter()
            .map(|(category, mut txs)| {
                txs.sort_by_key(|t| t.date);
                let amounts: Vec<f64> = txs.iter().map(|t| t.amount).collect();
                let recent_start = amounts.len().saturating_sub(self.config.recent_window);

                let overall_mean = mean(&amounts);
                let recent_mean = mean(&amounts[recent_start..]);
                let ratio = if overall_mean > 0.0 {
                    recent_mean / overall_mean
                } else {
                    1.0
                };

                CategoryTrend {
                    category,
                    trend: self.classify_ratio(ratio),
                    recent_mean,
                    overall_mean,
                    ratio,
                    samples: amounts.len(),
                }
            })
            .collect()
    }

    fn weekend_skew(&self, debits: &[&Transaction]) -> WeekendSkew {
        let (weekend_total, weekday_total) =
            debits.iter().fold((0.0, 0.0), |(weekend, weekday), tx| {
                if is_weekend(&tx.date) {
                    (weekend + tx.amount, weekday)
                } else {
                    (weekend, weekday + tx.amount)
                }
            });

        WeekendSkew {
            weekend_total,
            weekday_total,
            ratio: (weekday_total > 0.0).then(|| weekend_total / weekday_total),
            high: weekend_total > weekday_total * self.config.weekend_ratio,
        }
    }

    fn predictions(&self, debits: &[&Transaction], trends: &[CategoryTrend]) -> Vec<SpendingPrediction> {
        let mut amounts_by_category: BTreeMap<Category, Vec<(DateTime<Utc>, f64)>> = BTreeMap::new();
        for tx in debits {
            amounts_by_category
                .entry(tx.category)
                .or_default()
                .push((tx.date, tx.amount));
        }

        let mut predictions: Vec<SpendingPrediction> = trends
            .iter()
            .filter(|t| t.samples >= self.config.min_prediction_samples)
            .filter_map(|t| {
                let mut dated = amounts_by_category.remove(&t.category)?;
                dated.sort_by_key(|(date, _)| *date);
                let amounts: Vec<f64> = dated.into_iter().map(|(_, amount)| amount).collect();

                let predicted_amount = match t.trend {
                    Trend::Increasing => t.overall_mean * self.config.increasing_prediction_factor,
                    Trend::Decreasing => t.overall_mean * self.config.decreasing_prediction_factor,
                    Trend::Stable => t.overall_mean,
                };
                let confidence = (1.0 - coefficient_of_variation(&amounts)).clamp(0.3, 0.95);

                Some(SpendingPrediction {
                    category: t.category,
                    predicted_amount,
                    confidence,
                    trend: t.trend,
                    factors: prediction_factors(t.category, t.trend, &amounts),
                })
            })
            .collect();

        predictions.sort_by(|a, b| b.predicted_amount.total_cmp(&a.predicted_amount));
        predictions
    }

    fn monthly_change(&self, debits: &[&Transaction]) -> Option<MonthlyChange> {
        let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for tx in debits {
            *totals.entry((tx.date.year(), tx.date.month())).or_insert(0.0) += tx.amount;
        }

        let mut recent = totals.iter().rev();
        let (&(cur_year, cur_month), &current_total) = recent.next()?;
        let (&(prev_year, prev_month), &previous_total) = recent.next()?;
        if previous_total <= 0.0 {
            return None;
        }

        let change_percent = (current_total - previous_total) / previous_total * 100.0;
        Some(MonthlyChange {
            current_month: format!("{:04}-{:02}", cur_year, cur_month),
            previous_month: format!("{:04}-{:02}", prev_year, prev_month),
            current_total,
            previous_total,
            change_percent,
            significant: change_percent.abs() > self.config.monthly_change_percent,
        })
    }

    fn is_ride_share(&self, tx: &Transaction) -> bool {
        tx.category == Category::Transport
            && tx.merchant_key().is_some_and(|key| {
                self.config
                    .ride_share_merchants
                    .iter()
                    .any(|m| key.contains(m.as_str()))
            })
    }

    fn ride_share_trips(&self, debits: &[&Transaction]) -> usize {
        let Some(latest) = debits.iter().map(|t| t.date).max() else {
            return 0;
        };
        debits
            .iter()
            .filter(|t| t.date.year() == latest.year() && t.date.month() == latest.month())
            .filter(|t| self.is_ride_share(t))
            .count()
    }

    fn habits(&self, debits: &[&Transaction]) -> Option<SpendingHabits> {
        if debits.is_empty() {
            return None;
        }

        let mut by_hour: BTreeMap<u32, f64> = BTreeMap::new();
        let mut by_day: BTreeMap<u32, (Weekday, f64)> = BTreeMap::new();
        let mut by_category: BTreeMap<Category, usize> = BTreeMap::new();
        let mut by_date: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
        for tx in debits {
            *by_hour.entry(tx.date.hour()).or_insert(0.0) += tx.amount;
            let weekday = tx.date.weekday();
            by_day
                .entry(weekday.num_days_from_monday())
                .or_insert((weekday, 0.0))
                .1 += tx.amount;
            *by_category.entry(tx.category).or_insert(0) += 1;
            *by_date.entry(tx.date.date_naive()).or_insert(0.0) += tx.amount;
        }

        let peak_hour = first_max(by_hour.iter().map(|(hour, total)| (*hour, *total)))?;
        let peak_day = first_max(by_day.values().copied())?;
        let most_frequent_category =
            first_max(by_category.iter().map(|(c, n)| (*c, *n as f64)))?;

        let daily: Vec<f64> = by_date.into_values().collect();
        let daily_variation = coefficient_of_variation(&daily);
        let consistency = if daily_variation > self.config.binge_variation {
            SpendingConsistency::Binge
        } else if daily_variation > self.config.sporadic_variation {
            SpendingConsistency::Sporadic
        } else {
            SpendingConsistency::Consistent
        };

        let total: f64 = debits.iter().map(|t| t.amount).sum();
        Some(SpendingHabits {
            peak_hour,
            peak_day: weekday_name(peak_day).to_string(),
            average_transaction: total / debits.len() as f64,
            most_frequent_category,
            consistency,
            daily_variation,
        })
    }
}

/// Key with the largest value; the first one wins ties
fn first_max<K: Copy>(items: impl Iterator<Item = (K, f64)>) -> Option<K> {
    let mut best: Option<(K, f64)> = None;
    for (key, value) in items {
        if best.map_or(true, |(_, top)| value > top) {
            best = Some((key, value));
        }
    }
    best.map(|(key, _)| key)
}

/// Category shares of debit spending, sorted by descending percent
fn concentration(debits: &[&Transaction]) -> Vec<Concentration> {
    let grand_total: f64 = debits.iter().map(|t| t.amount).sum();
    if grand_total <= 0.0 {
        return Vec::new();
    }

    let mut totals: BTreeMap<Category, f64> = BTreeMap::new();
    for tx in debits {
        *totals.entry(tx.category).or_insert(0.0) += tx.amount;
    }

    let mut shares: Vec<Concentration> = totals
        .into_iter()
        .map(|(category, total)| Concentration {
            category,
            total,
            percent: total / grand_total * 100.0,
        })
        .collect();
    shares.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    shares
}

/// Debit activity per merchant, busiest first
///
/// Ties on count go to the larger total, then the merchant key.
fn merchant_activity(debits: &[&Transaction]) -> Vec<MerchantActivity> {
    let mut by_merchant: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for tx in debits {
        if let Some(key) = tx.merchant_key() {
            let entry = by_merchant.entry(key).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += tx.amount;
        }
    }

    let mut activity: Vec<MerchantActivity> = by_merchant
        .into_iter()
        .map(|(merchant, (count, total))| MerchantActivity {
            merchant,
            count,
            total,
        })
        .collect();
    activity.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.total.total_cmp(&a.total))
            .then_with(|| a.merchant.cmp(&b.merchant))
    });
    activity
}

fn prediction_factors(category: Category, trend: Trend, amounts: &[f64]) -> Vec<String> {
    let mut factors = Vec::new();

    match trend {
        Trend::Increasing => {
            factors.push("Recent spending trend is upward".to_string());
            match category {
                Category::Food => {
                    factors.push("Possible increase in dining out or food delivery".to_string())
                }
                Category::Transport => {
                    factors.push("May indicate more travel or higher fuel costs".to_string())
                }
                _ => {}
            }
        }
        Trend::Decreasing => {
            factors.push("Recent spending trend is downward".to_string());
            factors.push("Good cost control in this category".to_string());
        }
        Trend::Stable => {}
    }

    let latest = &amounts[amounts.len().saturating_sub(VARIABILITY_SAMPLE)..];
    let latest_mean = mean(latest);
    let variance = if latest.is_empty() {
        0.0
    } else {
        latest.iter().map(|a| (a - latest_mean).powi(2)).sum::<f64>() / latest.len() as f64
    };
    if variance > HIGH_VARIABILITY_VARIANCE {
        factors.push("High spending variability in recent transactions".to_string());
    } else {
        factors.push("Consistent spending pattern".to_string());
    }

    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, PaymentMethod};
    use chrono::TimeZone;

    fn debit(category: Category, amount: f64, date: DateTime<Utc>, merchant: Option<&str>) -> Transaction {
        Transaction {
            id: format!("{}-{}-{}", category.slug(), amount, date.timestamp()),
            amount,
            description: format!("{} payment", category),
            category,
            date,
            direction: Direction::Debit,
            merchant: merchant.map(String::from),
            method: PaymentMethod::Upi,
            raw_text: None,
        }
    }

    // 2024-01-01 is a Monday
    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_empty_input_gives_default_analysis() {
        let analysis = SpendingAnalyzer::new().analyze(&[], 90);
        assert_eq!(analysis.debit_count, 0);
        assert!(analysis.trends.is_empty());
        assert!(analysis.concentration.is_empty());
        assert!(!analysis.weekend_skew.high);
        assert_eq!(analysis.top_merchant, None);
        assert_eq!(analysis.monthly_change, None);
    }

    #[test]
    fn test_increasing_trend() {
        // 10 old debits of 100, then 10 recent debits of 200
        let mut txs: Vec<Transaction> = (0..10)
            .map(|i| debit(Category::Food, 100.0, day(i), None))
            .collect();
        txs.extend((10..20).map(|i| debit(Category::Food, 200.0, day(i), None)));

        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        let trend = &analysis.trends[0];
        assert_eq!(trend.trend, Trend::Increasing);
        assert!((trend.ratio - 200.0 / 150.0).abs() < 1e-9);
        assert_eq!(trend.samples, 20);
    }

    #[test]
    fn test_decreasing_and_stable_trends() {
        let mut txs: Vec<Transaction> = (0..10)
            .map(|i| debit(Category::Shopping, 1000.0, day(i), None))
            .collect();
        txs.extend((10..20).map(|i| debit(Category::Shopping, 500.0, day(i), None)));
        txs.extend((0..5).map(|i| debit(Category::Bills, 800.0, day(i), None)));

        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        assert_eq!(analysis.trend_for(Category::Shopping), Some(Trend::Decreasing));
        // Fewer than 10 debits: recent mean equals overall mean
        assert_eq!(analysis.trend_for(Category::Bills), Some(Trend::Stable));
        assert_eq!(analysis.trend_for(Category::Food), None);
    }

    #[test]
    fn test_concentration_sums_to_100() {
        let txs = vec![
            debit(Category::Food, 333.33, day(0), None),
            debit(Category::Transport, 123.45, day(1), None),
            debit(Category::Bills, 999.99, day(2), None),
            debit(Category::Other, 0.01, day(3), None),
        ];

        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        let sum: f64 = analysis.concentration.iter().map(|c| c.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);

        // Sorted descending
        assert_eq!(analysis.concentration[0].category, Category::Bills);
        assert!(analysis
            .concentration
            .windows(2)
            .all(|w| w[0].percent >= w[1].percent));
        assert_eq!(analysis.dominant_categories, vec![Category::Bills]);
    }

    #[test]
    fn test_credits_are_not_spending() {
        let mut salary = debit(Category::Transfer, 50000.0, day(0), None);
        salary.direction = Direction::Credit;
        let txs = vec![salary, debit(Category::Food, 200.0, day(1), None)];

        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        assert_eq!(analysis.total_spending, 200.0);
        assert_eq!(analysis.concentration.len(), 1);
        assert_eq!(analysis.transaction_count, 2);
    }

    #[test]
    fn test_weekend_skew() {
        // day(5) is Saturday, day(6) Sunday
        let txs = vec![
            debit(Category::Food, 1000.0, day(0), None),
            debit(Category::Food, 300.0, day(5), None),
            debit(Category::Food, 200.0, day(6), None),
        ];

        let skew = SpendingAnalyzer::new().analyze(&txs, 0).weekend_skew;
        assert_eq!(skew.weekend_total, 500.0);
        assert_eq!(skew.weekday_total, 1000.0);
        assert_eq!(skew.ratio, Some(0.5));
        assert!(skew.high);

        let weekday_only = vec![debit(Category::Food, 1000.0, day(1), None)];
        let skew = SpendingAnalyzer::new().analyze(&weekday_only, 0).weekend_skew;
        assert!(!skew.high);

        let weekend_only = vec![debit(Category::Food, 10.0, day(5), None)];
        let skew = SpendingAnalyzer::new().analyze(&weekend_only, 0).weekend_skew;
        assert_eq!(skew.ratio, None);
        assert!(skew.high);
    }

    #[test]
    fn test_top_and_frequent_merchants() {
        let mut txs: Vec<Transaction> = (0..7)
            .map(|i| debit(Category::Food, 150.0, day(i), Some("Swiggy")))
            .collect();
        txs.extend((0..6).map(|i| debit(Category::Transport, 90.0, day(i), Some("Uber"))));
        txs.extend((0..2).map(|i| debit(Category::Shopping, 900.0, day(i), Some("Amazon"))));

        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        let top = analysis.top_merchant.unwrap();
        assert_eq!(top.merchant, "swiggy");
        assert_eq!(top.count, 7);

        let frequent: Vec<&str> = analysis
            .frequent_merchants
            .iter()
            .map(|m| m.merchant.as_str())
            .collect();
        assert_eq!(frequent, vec!["swiggy", "uber"]);
    }

    #[test]
    fn test_top_merchant_tie_breaks_on_total() {
        let txs = vec![
            debit(Category::Food, 100.0, day(0), Some("Zomato")),
            debit(Category::Food, 300.0, day(1), Some("Swiggy")),
        ];
        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        assert_eq!(analysis.top_merchant.unwrap().merchant, "swiggy");
    }

    #[test]
    fn test_window_anchored_on_latest_transaction() {
        let txs = vec![
            debit(Category::Food, 100.0, day(0), None),
            debit(Category::Food, 200.0, day(100), None),
            debit(Category::Food, 300.0, day(120), None),
        ];

        let analysis = SpendingAnalyzer::new().analyze(&txs, 30);
        assert_eq!(analysis.debit_count, 2);
        assert_eq!(analysis.total_spending, 500.0);
        assert_eq!(analysis.window_end, Some(day(120)));
        assert_eq!(analysis.window_start, Some(day(100)));
    }

    #[test]
    fn test_huge_window_keeps_everything() {
        let txs = vec![
            debit(Category::Food, 100.0, day(0), None),
            debit(Category::Food, 200.0, day(400), None),
        ];

        let analysis = SpendingAnalyzer::new().analyze(&txs, u32::MAX);
        assert_eq!(analysis.debit_count, 2);
        assert_eq!(analysis.window_start, Some(day(0)));
        assert_eq!(window_transactions(&txs, 100_000_000).len(), 2);
    }

    #[test]
    fn test_spending_habits() {
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap();
        let txs = vec![
            debit(Category::Food, 100.0, at(1, 9), None),
            debit(Category::Food, 150.0, at(1, 20), None),
            debit(Category::Transport, 50.0, at(2, 9), None),
            // Saturday
            debit(Category::Shopping, 2000.0, at(6, 20), None),
        ];

        let habits = SpendingAnalyzer::new().analyze(&txs, 0).habits.unwrap();
        assert_eq!(habits.peak_hour, 20);
        assert_eq!(habits.peak_day, "Saturday");
        assert_eq!(habits.average_transaction, 575.0);
        assert_eq!(habits.most_frequent_category, Category::Food);
        // Daily totals 250, 50, 2000
        assert!((habits.daily_variation - 1.1425).abs() < 1e-3);
        assert_eq!(habits.consistency, SpendingConsistency::Sporadic);
    }

    #[test]
    fn test_spending_consistency() {
        let steady: Vec<Transaction> = (0..4)
            .map(|i| debit(Category::Food, 200.0, day(i), None))
            .collect();
        let habits = SpendingAnalyzer::new().analyze(&steady, 0).habits.unwrap();
        assert_eq!(habits.consistency, SpendingConsistency::Consistent);

        let binge = vec![
            debit(Category::Food, 10.0, day(0), None),
            debit(Category::Food, 10.0, day(1), None),
            debit(Category::Food, 10.0, day(2), None),
            debit(Category::Shopping, 1000.0, day(3), None),
        ];
        let habits = SpendingAnalyzer::new().analyze(&binge, 0).habits.unwrap();
        assert_eq!(habits.consistency, SpendingConsistency::Binge);

        assert_eq!(SpendingAnalyzer::new().analyze(&[], 0).habits, None);
    }

    #[test]
    fn test_habit_ties_go_to_earliest() {
        // Monday 08:00 and Tuesday 18:00, same amount and category count
        let txs = vec![
            debit(Category::Transport, 300.0, day(0) - Duration::hours(4), None),
            debit(Category::Food, 300.0, day(1) + Duration::hours(6), None),
        ];

        let habits = SpendingAnalyzer::new().analyze(&txs, 0).habits.unwrap();
        assert_eq!(habits.peak_hour, 8);
        assert_eq!(habits.peak_day, "Monday");
        assert_eq!(habits.most_frequent_category, Category::Food);
    }

    #[test]
    fn test_ride_share_trips_in_latest_month() {
        let dec = Utc.with_ymd_and_hms(2023, 12, 28, 9, 0, 0).unwrap();
        let txs = vec![
            debit(Category::Transport, 200.0, dec, Some("Ola Cabs")),
            debit(Category::Transport, 150.0, day(1), Some("Uber")),
            debit(Category::Transport, 180.0, day(2), Some("UBER INDIA")),
            debit(Category::Transport, 60.0, day(3), Some("Rapido")),
            debit(Category::Transport, 40.0, day(4), Some("Metro Card")),
            debit(Category::Food, 300.0, day(5), Some("Uber Eats")),
        ];

        assert_eq!(SpendingAnalyzer::new().analyze(&txs, 0).ride_share_trips, 3);
    }

    #[test]
    fn test_predictions() {
        let txs = vec![
            debit(Category::Bills, 1000.0, day(0), None),
            debit(Category::Bills, 1000.0, day(30), None),
            debit(Category::Bills, 1000.0, day(60), None),
            // Two samples: no prediction
            debit(Category::Food, 100.0, day(1), None),
            debit(Category::Food, 100.0, day(2), None),
        ];

        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        assert_eq!(analysis.predictions.len(), 1);
        let p = &analysis.predictions[0];
        assert_eq!(p.category, Category::Bills);
        assert_eq!(p.predicted_amount, 1000.0);
        assert_eq!(p.trend, Trend::Stable);
        // No variation: capped at 0.95
        assert_eq!(p.confidence, 0.95);
        assert_eq!(p.factors, vec!["Consistent spending pattern".to_string()]);
    }

    #[test]
    fn test_prediction_follows_increasing_trend() {
        let mut txs: Vec<Transaction> = (0..10)
            .map(|i| debit(Category::Food, 100.0, day(i), None))
            .collect();
        txs.extend((10..20).map(|i| debit(Category::Food, 200.0, day(i), None)));

        let analysis = SpendingAnalyzer::new().analyze(&txs, 0);
        let p = &analysis.predictions[0];
        assert!((p.predicted_amount - 150.0 * 1.15).abs() < 1e-9);
        // cv = 50 / 150
        assert!((p.confidence - (1.0 - 1.0 / 3.0)).abs() < 1e-9);
        assert_eq!(p.factors[0], "Recent spending trend is upward");
        assert_eq!(p.factors[1], "Possible increase in dining out or food delivery");
    }

    #[test]
    fn test_monthly_change() {
        let feb = Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap();
        let mar = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let txs = vec![
            debit(Category::Food, 1000.0, feb, None),
            debit(Category::Food, 1300.0, mar, None),
        ];

        let change = SpendingAnalyzer::new().analyze(&txs, 0).monthly_change.unwrap();
        assert_eq!(change.current_month, "2024-03");
        assert_eq!(change.previous_month, "2024-02");
        assert!((change.change_percent - 30.0).abs() < 1e-9);
        assert!(change.significant);

        // Single month: nothing to compare
        let single = vec![debit(Category::Food, 10.0, feb, None)];
        assert_eq!(SpendingAnalyzer::new().analyze(&single, 0).monthly_change, None);
    }

    #[test]
    fn test_subscription_charges_counted() {
        let mut netflix = debit(Category::Entertainment, 649.0, day(0), Some("Netflix"));
        netflix.description = "Monthly plan".to_string();
        let txs = vec![netflix, debit(Category::Food, 100.0, day(1), None)];

        assert_eq!(SpendingAnalyzer::new().analyze(&txs, 0).subscription_charges, 1);
    }
}
