//! Anomaly detection
//!
//! Detects:
//! - Unusual spending: a debit far above its category's typical amount
//! - Merchant frequency: a merchant seen unusually often in the window
//!
//! Detection is deterministic. Identical input yields identical anomalies in
//! the same order, and every id is a digest of the anomaly's type and subject.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::models::{Category, Transaction};
use crate::stats::{debit_amounts_by_category, CategoryStatistics};

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Fewest debits a category needs before it is scored
    pub min_samples: usize,
    /// z-score a debit must exceed
    pub z_threshold: f64,
    /// A flagged debit must also exceed mean * amount_multiplier
    pub amount_multiplier: f64,
    pub medium_z: f64,
    pub high_z: f64,
    pub confidence_divisor: f64,
    pub max_confidence: f64,
    /// Transactions per merchant before it is reported
    pub merchant_frequency_threshold: usize,
    pub merchant_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_samples: 5,
            z_threshold: 2.0,
            amount_multiplier: 1.5,
            medium_z: 2.5,
            high_z: 3.0,
            confidence_divisor: 4.0,
            max_confidence: 0.95,
            merchant_frequency_threshold: 20,
            merchant_confidence: 0.7,
        }
    }
}

/// Kind of anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    UnusualSpending,
    MerchantFrequency,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::UnusualSpending => "unusual_spending",
            AnomalyType::MerchantFrequency => "merchant_frequency",
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// A flagged transaction or merchant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    /// Hex SHA-256 of type + subject
    pub id: String,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    /// Set for unusual spending
    pub category: Option<Category>,
    pub amount: Option<f64>,
    pub z_score: Option<f64>,
    pub confidence: f64,
    /// Transaction id or merchant key the anomaly is about
    pub subject: String,
    pub description: String,
    pub recommendation: String,
}

/// Content-derived anomaly id
pub fn anomaly_id(anomaly_type: AnomalyType, subject: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(anomaly_type.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(subject.as_bytes());
    hex::encode(hasher.finalize())
}

/// Statistical anomaly detector
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: DetectionConfig,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run every detector, sorted by descending confidence
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<Anomaly> {
        let mut anomalies = self.detect_unusual_spending(transactions);
        anomalies.extend(self.detect_merchant_frequency(transactions));

        // Stable: ties keep detector order, then input order
        anomalies.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        anomalies
    }

    /// Debits far above their category's mean
    pub fn detect_unusual_spending(&self, transactions: &[Transaction]) -> Vec<Anomaly> {
        let groups = debit_amounts_by_category(transactions);
        let mut stats_by_category: BTreeMap<Category, CategoryStatistics> = BTreeMap::new();

        for (category, amounts) in groups {
            if amounts.len() < self.config.min_samples {
                debug!(
                    category = %category,
                    samples = amounts.len(),
                    "Skipping category: insufficient data"
                );
                continue;
            }
            let stats = CategoryStatistics::from_amounts(category, amounts);
            if stats.standard_deviation == 0.0 {
                debug!(category = %category, "Skipping category: zero variance");
                continue;
            }
            stats_by_category.insert(category, stats);
        }

        let mut anomalies = Vec::new();
        for tx in transactions.iter().filter(|t| t.is_debit()) {
            let Some(stats) = stats_by_category.get(&tx.category) else {
                continue;
            };
            let Some(z) = stats.z_score(tx.amount) else {
                continue;
            };
            if z <= self.config.z_threshold
                || tx.amount <= self.config.amount_multiplier * stats.mean
            {
                continue;
            }

            let severity = if z > self.config.high_z {
                Severity::High
            } else if z > self.config.medium_z {
                Severity::Medium
            } else {
                Severity::Low
            };
            let confidence = (z / self.config.confidence_divisor).min(self.config.max_confidence);

            anomalies.push(Anomaly {
                id: anomaly_id(AnomalyType::UnusualSpending, &tx.id),
                anomaly_type: AnomalyType::UnusualSpending,
                severity,
                category: Some(tx.category),
                amount: Some(tx.amount),
                z_score: Some(z),
                confidence,
                subject: tx.id.clone(),
                description: format!(
                    "₹{:.0} on {} is {:.1}x your usual {} spend of ₹{:.0}",
                    tx.amount,
                    tx.description,
                    tx.amount / stats.mean,
                    tx.category,
                    stats.mean
                ),
                recommendation: "Review this transaction to confirm it was expected."
                    .to_string(),
            });
        }

        debug!(
            detector = AnomalyType::UnusualSpending.as_str(),
            count = anomalies.len(),
            "Detector complete"
        );
        anomalies
    }

    /// Merchants with more transactions than the frequency threshold
    pub fn detect_merchant_frequency(&self, transactions: &[Transaction]) -> Vec<Anomaly> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for tx in transactions {
            if let Some(key) = tx.merchant_key() {
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        let anomalies: Vec<Anomaly> = counts
            .into_iter()
            .filter(|(_, count)| *count > self.config.merchant_frequency_threshold)
            .map(|(merchant, count)| Anomaly {
                id: anomaly_id(AnomalyType::MerchantFrequency, &merchant),
                anomaly_type: AnomalyType::MerchantFrequency,
                severity: Severity::Medium,
                category: None,
                amount: None,
                z_score: None,
                confidence: self.config.merchant_confidence,
                description: format!("{} transactions with {}", count, merchant),
                recommendation: "Frequent charges from one merchant can add up. Check they are all intended."
                    .to_string(),
                subject: merchant,
            })
            .collect();

        debug!(
            detector = AnomalyType::MerchantFrequency.as_str(),
            count = anomalies.len(),
            "Detector complete"
        );
        anomalies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, PaymentMethod};
    use chrono::{Duration, TimeZone, Utc};

    fn debits(category: Category, amounts: &[f64]) -> Vec<Transaction> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| Transaction {
                id: format!("{}-{}", category.slug(), i),
                amount: *amount,
                description: format!("purchase {}", i),
                category,
                date: start + Duration::days(i as i64),
                direction: Direction::Debit,
                merchant: None,
                method: PaymentMethod::Card,
                raw_text: None,
            })
            .collect()
    }

    #[test]
    fn test_flags_clear_outlier() {
        let txs = debits(Category::Food, &[100.0, 100.0, 100.0, 100.0, 100.0, 500.0]);
        let anomalies = AnomalyDetector::new().detect(&txs);

        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        assert_eq!(a.subject, "food-5");
        assert_eq!(a.amount, Some(500.0));
        assert_eq!(a.category, Some(Category::Food));
        // z = 333.3 / 149.07
        assert!((a.z_score.unwrap() - 2.236).abs() < 1e-3);
        assert_eq!(a.severity, Severity::Low);
        assert!((a.confidence - 2.236 / 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_amount_guard_blocks_small_outliers() {
        // z = 3 but 1100 < 1.5 * 1010
        let mut amounts = vec![1000.0; 9];
        amounts.push(1100.0);
        let txs = debits(Category::Bills, &amounts);

        let anomalies = AnomalyDetector::new().detect(&txs);
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_minimum_sample_guard() {
        // Lower z threshold so only the sample guard decides
        let detector = AnomalyDetector::with_config(DetectionConfig {
            z_threshold: 1.5,
            ..Default::default()
        });

        // z = sqrt(3) would pass, but four samples are too few
        let four = debits(Category::Food, &[100.0, 100.0, 100.0, 900.0]);
        assert!(detector.detect(&four).is_empty());

        // z = 2
        let five = debits(Category::Food, &[100.0, 100.0, 100.0, 100.0, 900.0]);
        assert_eq!(detector.detect(&five).len(), 1);
    }

    #[test]
    fn test_zero_variance_skipped() {
        let txs = debits(Category::Transport, &[50.0; 8]);
        assert!(AnomalyDetector::new().detect(&txs).is_empty());
    }

    #[test]
    fn test_severity_levels() {
        // 19 x 100 and one 2000: z = sqrt(19) ~ 4.36
        let mut amounts = vec![100.0; 19];
        amounts.push(2000.0);
        let txs = debits(Category::Shopping, &amounts);

        let anomalies = AnomalyDetector::new().detect(&txs);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert_eq!(anomalies[0].confidence, 0.95);
    }

    #[test]
    fn test_credits_are_ignored() {
        let mut txs = debits(Category::Food, &[100.0, 100.0, 100.0, 100.0, 100.0]);
        let mut refund = txs[0].clone();
        refund.id = "refund".to_string();
        refund.amount = 5000.0;
        refund.direction = Direction::Credit;
        txs.push(refund);

        assert!(AnomalyDetector::new().detect_unusual_spending(&txs).is_empty());
    }

    #[test]
    fn test_merchant_frequency() {
        let mut txs = debits(Category::Food, &[150.0; 21]);
        for tx in &mut txs {
            tx.merchant = Some("Swiggy".to_string());
        }
        // 20 of another merchant is not enough
        let mut others = debits(Category::Transport, &[80.0; 20]);
        for tx in &mut others {
            tx.merchant = Some("Ola".to_string());
        }
        txs.extend(others);

        let anomalies = AnomalyDetector::new().detect(&txs);
        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        assert_eq!(a.anomaly_type, AnomalyType::MerchantFrequency);
        assert_eq!(a.subject, "swiggy");
        assert_eq!(a.severity, Severity::Medium);
        assert_eq!(a.confidence, 0.7);
        assert_eq!(a.id, anomaly_id(AnomalyType::MerchantFrequency, "swiggy"));
    }

    #[test]
    fn test_sorted_by_confidence() {
        let mut txs = debits(Category::Food, &[100.0, 100.0, 100.0, 100.0, 100.0, 500.0]);
        let mut amounts = vec![100.0; 19];
        amounts.push(2000.0);
        txs.extend(debits(Category::Shopping, &amounts));

        let anomalies = AnomalyDetector::new().detect(&txs);
        assert_eq!(anomalies.len(), 2);
        assert!(anomalies[0].confidence >= anomalies[1].confidence);
        assert_eq!(anomalies[0].category, Some(Category::Shopping));
    }

    #[test]
    fn test_detect_is_deterministic() {
        let mut txs = debits(Category::Food, &[100.0, 120.0, 110.0, 90.0, 105.0, 600.0]);
        txs.extend(debits(Category::Bills, &[900.0, 950.0, 1000.0, 980.0, 5000.0]));

        let detector = AnomalyDetector::new();
        let first = detector.detect(&txs);
        let second = detector.detect(&txs);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_anomaly_id_is_content_derived() {
        let a = anomaly_id(AnomalyType::UnusualSpending, "tx-1");
        assert_eq!(a.len(), 64);
        assert_eq!(a, anomaly_id(AnomalyType::UnusualSpending, "tx-1"));
        assert_ne!(a, anomaly_id(AnomalyType::MerchantFrequency, "tx-1"));
    }

    #[test]
    fn test_empty_input() {
        assert!(AnomalyDetector::new().detect(&[]).is_empty());
    }
}
