//! Emergency fund recommendation
//!
//! Some savings, but not enough to build a cushion. Overspending is left to
//! the savings rate rule.

use super::engine::{RecommendationContext, RecommendationRule};
use super::types::{Priority, Recommendation, RecommendationKind};

pub struct EmergencyFundRule;

impl RecommendationRule for EmergencyFundRule {
    fn id(&self) -> &'static str {
        "emergency_fund"
    }

    fn name(&self) -> &'static str {
        "Emergency Fund"
    }

    fn evaluate(&self, ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
        let Some(rate) = ctx.cash_flow.savings_rate else {
            return Vec::new();
        };
        let target = ctx.config.emergency_fund_rate;
        if rate <= 0.0 || rate >= target {
            return Vec::new();
        }

        vec![Recommendation {
            id: "emergency-fund".to_string(),
            title: "Build Emergency Fund".to_string(),
            description: format!(
                "Your savings rate is {:.1}%. Try to save at least {:.0}% of income for emergencies and future goals.",
                rate * 100.0,
                target * 100.0
            ),
            priority: Priority::Medium,
            kind: RecommendationKind::Investment,
            category: None,
            potential_savings: None,
        }]
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
        EmergencyFundRule.evaluate(&RecommendationContext::new(&analysis, &cash_flow, &config))
    }

    #[test]
    fn test_thin_savings_suggest_emergency_fund() {
        let recs = evaluate(10000.0, 9000.0);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "emergency-fund");
        assert_eq!(recs[0].priority, Priority::Medium);
        assert!(recs[0].description.starts_with("Your savings rate is 10.0%"));
    }

    #[test]
    fn test_no_emergency_fund_outside_range() {
        // Healthy
        assert!(evaluate(10000.0, 7000.0).is_empty());
        // Overspending
        assert!(evaluate(10000.0, 12000.0).is_empty());
        // Breaking even
        assert!(evaluate(10000.0, 10000.0).is_empty());
        // No income
        assert!(evaluate(0.0, 500.0).is_empty());
    }
}
