//! Savings rate recommendations
//!
//! Spending with no income counts as a 0% savings rate. A window with neither
//! is left alone.

use super::engine::{RecommendationContext, RecommendationRule};
use super::types::{Priority, Recommendation, RecommendationKind};

pub struct SavingsRateRule;

impl RecommendationRule for SavingsRateRule {
    fn id(&self) -> &'static str {
        "savings_rate"
    }

    fn name(&self) -> &'static str {
        "Savings Rate"
    }

    fn evaluate(&self, ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
        let rate = match ctx.cash_flow.savings_rate {
            Some(rate) => rate,
            None if ctx.cash_flow.total_spending > 0.0 => 0.0,
            None => return Vec::new(),
        };
        let config = ctx.config;

        if rate < config.low_savings_rate {
            let shortfall = (config.low_savings_rate - rate.max(0.0)) * ctx.cash_flow.total_income;
            return vec![Recommendation {
                id: "low-savings-rate".to_string(),
                title: "Improve Savings Rate".to_string(),
                description: format!(
                    "Your savings rate is {:.0}%. Aim for at least {:.0}% to build financial security.",
                    rate.max(0.0) * 100.0,
                    config.low_savings_rate * 100.0
                ),
                priority: Priority::High,
                kind: RecommendationKind::Savings,
                category: None,
                potential_savings: (shortfall > 0.0).then(|| shortfall.round()),
            }];
        }

        if rate > config.high_savings_rate {
            return vec![Recommendation {
                id: "invest-savings".to_string(),
                title: "Start Investing Your Savings".to_string(),
                description: format!(
                    "You save {:.0}% of your income. Consider investing {:.0}% of income for long-term growth.",
                    rate * 100.0,
                    (rate - config.low_savings_rate) * 100.0
                ),
                priority: Priority::High,
                kind: RecommendationKind::Investment,
                category: None,
                potential_savings: None,
            }];
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::RecommendationConfig;
    use crate::patterns::SpendingAnalysis;
    use crate::stats::CashFlowSummary;

    fn evaluate(income: f64, spending: f64) -> Vec<Recommendation> {
        let analysis = SpendingAnalysis::default();
        let cash_flow = CashFlowSummary {
            total_income: income,
            total_spending: spending,
            savings_rate: (income > 0.0).then(|| (income - spending) / income),
            ..Default::default()
        };
        let config = RecommendationConfig::default();
        SavingsRateRule.evaluate(&RecommendationContext::new(&analysis, &cash_flow, &config))
    }

    #[test]
    fn test_low_savings_rate() {
        let recs = evaluate(10000.0, 9000.0);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "low-savings-rate");
        assert_eq!(recs[0].priority, Priority::High);
        // 20% target minus 10% actual on 10000 income
        assert_eq!(recs[0].potential_savings, Some(1000.0));
    }

    #[test]
    fn test_overspending_counts_as_zero_rate() {
        let recs = evaluate(10000.0, 15000.0);
        assert_eq!(recs[0].potential_savings, Some(2000.0));
        assert!(recs[0].description.contains("0%"));
    }

    #[test]
    fn test_high_savings_rate() {
        let recs = evaluate(10000.0, 5000.0);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "invest-savings");
        assert_eq!(recs[0].kind, RecommendationKind::Investment);
    }

    #[test]
    fn test_healthy_rate() {
        assert!(evaluate(10000.0, 7500.0).is_empty());
    }

    #[test]
    fn test_spending_without_income_counts_as_zero_rate() {
        let recs = evaluate(0.0, 500.0);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "low-savings-rate");
        assert!(recs[0].description.starts_with("Your savings rate is 0%"));
        // No income to measure a shortfall against
        assert_eq!(recs[0].potential_savings, None);

        assert!(evaluate(0.0, 0.0).is_empty());
    }
}
