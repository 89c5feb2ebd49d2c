//! Analysis report
//!
//! Bundles one run of every analysis over a window of transactions: anomalies,
//! spending patterns, the cash-flow summary and recommendations, plus a
//! 0-100 risk score and the total savings opportunity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::detect::{Anomaly, AnomalyDetector, Severity};
use crate::insights::{Recommendation, RecommendationContext, RecommendationEngine};
use crate::models::Transaction;
use crate::patterns::{window_transactions, SpendingAnalysis, SpendingAnalyzer};
use crate::stats::CashFlowSummary;

pub const MAX_RISK_SCORE: u32 = 100;

/// Full analysis of one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub window_days: u32,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub anomalies: Vec<Anomaly>,
    pub analysis: SpendingAnalysis,
    pub cash_flow: CashFlowSummary,
    pub recommendations: Vec<Recommendation>,
    /// 0-100, higher is riskier
    pub risk_score: u32,
    /// Sum of the recommendations' potential savings
    pub savings_opportunity: f64,
}

/// Risk points for a set of anomalies and the window's cash flow
///
/// 15/8/3 points per high/medium/low anomaly; 20 points when spending
/// exceeds 90% of income, 10 above 80%. Without income the spending ratio
/// adds nothing.
pub fn risk_score(anomalies: &[Anomaly], cash_flow: &CashFlowSummary) -> u32 {
    let anomaly_points: u32 = anomalies
        .iter()
        .map(|a| match a.severity {
            Severity::High => 15,
            Severity::Medium => 8,
            Severity::Low => 3,
        })
        .sum();

    let cash_flow_points = match cash_flow.spending_ratio() {
        Some(ratio) if ratio > 0.9 => 20,
        Some(ratio) if ratio > 0.8 => 10,
        _ => 0,
    };

    (anomaly_points + cash_flow_points).min(MAX_RISK_SCORE)
}

pub fn savings_opportunity(recommendations: &[Recommendation]) -> f64 {
    recommendations
        .iter()
        .filter_map(|r| r.potential_savings)
        .sum()
}

/// Runs the detector, analyzer and recommendation engine with one config
pub struct ReportBuilder {
    config: AnalysisConfig,
    detector: AnomalyDetector,
    analyzer: SpendingAnalyzer,
    engine: RecommendationEngine,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl ReportBuilder {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            detector: AnomalyDetector::with_config(config.detection.clone()),
            analyzer: SpendingAnalyzer::with_config(config.patterns.clone()),
            engine: RecommendationEngine::new(),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Build a report over the last `window_days` (0 = everything)
    ///
    /// `limit` caps recommendations; `None` uses the configured limit.
    pub fn build(
        &self,
        transactions: &[Transaction],
        window_days: u32,
        limit: Option<usize>,
    ) -> AnalysisReport {
        let window = window_transactions(transactions, window_days);

        let anomalies = self.detector.detect(&window);
        let analysis = self.analyzer.analyze(&window, window_days);
        let cash_flow =
            CashFlowSummary::compute(&window, &self.config.patterns.subscription_keywords);

        let ctx = RecommendationContext::new(&analysis, &cash_flow, &self.config.recommendations);
        let recommendations = self
            .engine
            .generate(&ctx, limit.unwrap_or(self.config.recommendations.limit));

        let risk_score = risk_score(&anomalies, &cash_flow);
        let savings_opportunity = savings_opportunity(&recommendations);

        debug!(
            transactions = window.len(),
            anomalies = anomalies.len(),
            recommendations = recommendations.len(),
            risk_score,
            "Built analysis report"
        );

        AnalysisReport {
            window_days,
            window_start: window.iter().map(|t| t.date).min(),
            window_end: window.iter().map(|t| t.date).max(),
            anomalies,
            analysis,
            cash_flow,
            recommendations,
            risk_score,
            savings_opportunity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{anomaly_id, AnomalyType};
    use crate::insights::{Priority, RecommendationKind};
    use crate::models::{Category, Direction, PaymentMethod};
    use chrono::{Duration, TimeZone};

    fn anomaly(severity: Severity) -> Anomaly {
        Anomaly {
            id: anomaly_id(AnomalyType::UnusualSpending, "x"),
            anomaly_type: AnomalyType::UnusualSpending,
            severity,
            category: None,
            amount: None,
            z_score: None,
            confidence: 0.5,
            subject: "x".to_string(),
            description: String::new(),
            recommendation: String::new(),
        }
    }

    fn cash_flow(income: f64, spending: f64) -> CashFlowSummary {
        CashFlowSummary {
            total_income: income,
            total_spending: spending,
            savings_rate: (income > 0.0).then(|| (income - spending) / income),
            ..Default::default()
        }
    }

    fn tx(id: &str, amount: f64, direction: Direction, days_ago: i64) -> Transaction {
        let base = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        Transaction {
            id: id.to_string(),
            amount,
            description: "Swiggy order".to_string(),
            category: Category::Food,
            date: base - Duration::days(days_ago),
            direction,
            merchant: Some("Swiggy".to_string()),
            method: PaymentMethod::Upi,
            raw_text: None,
        }
    }

    #[test]
    fn test_risk_score_points() {
        let anomalies = vec![
            anomaly(Severity::High),
            anomaly(Severity::Medium),
            anomaly(Severity::Low),
        ];
        assert_eq!(risk_score(&anomalies, &cash_flow(1000.0, 500.0)), 26);
        assert_eq!(risk_score(&[], &cash_flow(1000.0, 850.0)), 10);
        assert_eq!(risk_score(&[], &cash_flow(1000.0, 950.0)), 20);
        assert_eq!(risk_score(&[], &cash_flow(0.0, 0.0)), 0);
    }

    #[test]
    fn test_risk_score_ignores_ratio_without_income() {
        let debit = tx("a", 100.0, Direction::Debit, 0);
        let cash_flow = CashFlowSummary::compute(&[debit], &[]);
        assert_eq!(cash_flow.total_income, 0.0);
        assert_eq!(risk_score(&[], &cash_flow), 0);
        assert_eq!(risk_score(&[anomaly(Severity::Medium)], &cash_flow), 8);
    }

    #[test]
    fn test_risk_score_is_capped() {
        let anomalies: Vec<Anomaly> = (0..10).map(|_| anomaly(Severity::High)).collect();
        assert_eq!(risk_score(&anomalies, &cash_flow(100.0, 200.0)), MAX_RISK_SCORE);
    }

    #[test]
    fn test_savings_opportunity_sums_known_savings() {
        let rec = |savings: Option<f64>| Recommendation {
            id: "r".to_string(),
            title: String::new(),
            description: String::new(),
            priority: Priority::High,
            kind: RecommendationKind::Savings,
            category: None,
            potential_savings: savings,
        };
        let recs = vec![rec(Some(400.0)), rec(None), rec(Some(150.0))];
        assert_eq!(savings_opportunity(&recs), 550.0);
        assert_eq!(savings_opportunity(&[]), 0.0);
    }

    #[test]
    fn test_build_respects_window() {
        let transactions = vec![
            tx("old", 5000.0, Direction::Debit, 200),
            tx("a", 300.0, Direction::Debit, 10),
            tx("b", 200.0, Direction::Debit, 5),
            tx("salary", 10000.0, Direction::Credit, 1),
        ];

        let report = ReportBuilder::default().build(&transactions, 90, None);
        assert_eq!(report.window_days, 90);
        assert_eq!(report.cash_flow.transaction_count, 3);
        assert_eq!(report.cash_flow.total_spending, 500.0);
        assert_eq!(report.analysis.total_spending, 500.0);
        assert_eq!(
            report.window_start,
            Some(Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap())
        );

        let everything = ReportBuilder::default().build(&transactions, 0, None);
        assert_eq!(everything.cash_flow.total_spending, 5500.0);
    }

    #[test]
    fn test_build_with_oversized_window() {
        let transactions = vec![
            tx("old", 5000.0, Direction::Debit, 200),
            tx("a", 300.0, Direction::Debit, 10),
        ];

        let report = ReportBuilder::default().build(&transactions, u32::MAX, None);
        assert_eq!(report.cash_flow.total_spending, 5300.0);
        assert_eq!(report.analysis.debit_count, 2);
        assert!(report.analysis.habits.is_some());
    }

    #[test]
    fn test_build_on_empty_input() {
        let report = ReportBuilder::default().build(&[], 90, Some(4));
        assert!(report.anomalies.is_empty());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.savings_opportunity, 0.0);
        assert_eq!(report.window_start, None);
    }
}
