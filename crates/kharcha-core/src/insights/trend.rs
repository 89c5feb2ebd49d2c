//! Trend-based recommendations
//!
//! - Rising categories (recent debits above the category mean)
//! - A month-over-month drop in total spending

use crate::patterns::Trend;

use super::engine::{RecommendationContext, RecommendationRule};
use super::types::{Priority, Recommendation, RecommendationKind};

pub struct TrendRule;

impl RecommendationRule for TrendRule {
    fn id(&self) -> &'static str {
        "trend"
    }

    fn name(&self) -> &'static str {
        "Spending Trends"
    }

    fn evaluate(&self, ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = ctx
            .analysis
            .trends
            .iter()
            .filter(|t| t.trend == Trend::Increasing)
            .map(|t| Recommendation {
                id: format!("trend-{}", t.category.slug()),
                title: format!("Rising {} Costs", t.category),
                description: format!(
                    "Your recent {} spending averages ₹{:.0}, up from ₹{:.0}. Review recent transactions to find savings.",
                    t.category, t.recent_mean, t.overall_mean
                ),
                priority: Priority::Medium,
                kind: RecommendationKind::Budget,
                category: Some(t.category),
                potential_savings: None,
            })
            .collect();

        if let Some(change) = &ctx.analysis.monthly_change {
            if change.change_percent < -ctx.config.spending_drop_percent {
                recommendations.push(Recommendation {
                    id: "positive-trend".to_string(),
                    title: "Great Progress!".to_string(),
                    description: format!(
                        "You spent {:.1}% less in {} than in {}. Keep up the good work!",
                        -change.change_percent, change.current_month, change.previous_month
                    ),
                    priority: Priority::Low,
                    kind: RecommendationKind::Savings,
                    category: None,
                    potential_savings: None,
                });
            }
        }

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::RecommendationConfig;
    use crate::models::Category;
    use crate::patterns::{CategoryTrend, MonthlyChange, SpendingAnalysis};
    use crate::stats::CashFlowSummary;

    fn trend(category: Category, trend: Trend) -> CategoryTrend {
        CategoryTrend {
            category,
            trend,
            recent_mean: 200.0,
            overall_mean: 150.0,
            ratio: 200.0 / 150.0,
            samples: 20,
        }
    }

    fn change(percent: f64) -> MonthlyChange {
        MonthlyChange {
            current_month: "2024-03".to_string(),
            previous_month: "2024-02".to_string(),
            current_total: 1000.0 * (1.0 + percent / 100.0),
            previous_total: 1000.0,
            change_percent: percent,
            significant: percent.abs() > 15.0,
        }
    }

    #[test]
    fn test_increasing_trends_only() {
        let analysis = SpendingAnalysis {
            trends: vec![
                trend(Category::Food, Trend::Increasing),
                trend(Category::Bills, Trend::Stable),
                trend(Category::Shopping, Trend::Decreasing),
            ],
            ..Default::default()
        };
        let cash_flow = CashFlowSummary::default();
        let config = RecommendationConfig::default();

        let recs = TrendRule.evaluate(&RecommendationContext::new(&analysis, &cash_flow, &config));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "trend-food");
        assert_eq!(recs[0].priority, Priority::Medium);
    }

    #[test]
    fn test_spending_drop_is_celebrated() {
        let cash_flow = CashFlowSummary::default();
        let config = RecommendationConfig::default();

        let dropped = SpendingAnalysis {
            monthly_change: Some(change(-12.0)),
            ..Default::default()
        };
        let recs = TrendRule.evaluate(&RecommendationContext::new(&dropped, &cash_flow, &config));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "positive-trend");
        assert_eq!(recs[0].priority, Priority::Low);

        let rose = SpendingAnalysis {
            monthly_change: Some(change(25.0)),
            ..Default::default()
        };
        assert!(TrendRule
            .evaluate(&RecommendationContext::new(&rose, &cash_flow, &config))
            .is_empty());
    }
}
