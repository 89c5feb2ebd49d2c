//! Ride-share recommendations
//!
//! Frequent cab and bike-taxi trips in the latest month of the window.

use crate::models::Category;

use super::engine::{RecommendationContext, RecommendationRule};
use super::types::{Priority, Recommendation, RecommendationKind};

pub struct RideShareRule;

impl RecommendationRule for RideShareRule {
    fn id(&self) -> &'static str {
        "ride_share"
    }

    fn name(&self) -> &'static str {
        "Ride Sharing"
    }

    fn evaluate(&self, ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
        let trips = ctx.analysis.ride_share_trips;
        if trips <= ctx.config.ride_share_trips {
            return Vec::new();
        }

        vec![Recommendation {
            id: "transport-optimization".to_string(),
            title: "Transportation Savings".to_string(),
            description: format!(
                "{} ride-share trips this month. Public transport or a monthly pass can cut transport costs by up to 60%.",
                trips
            ),
            priority: Priority::Medium,
            kind: RecommendationKind::Savings,
            category: Some(Category::Transport),
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

    fn evaluate(trips: usize) -> Vec<Recommendation> {
        let analysis = SpendingAnalysis {
            ride_share_trips: trips,
            ..Default::default()
        };
        let cash_flow = CashFlowSummary::default();
        let config = RecommendationConfig::default();
        RideShareRule.evaluate(&RecommendationContext::new(&analysis, &cash_flow, &config))
    }

    #[test]
    fn test_frequent_ride_share() {
        let recs = evaluate(16);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "transport-optimization");
        assert_eq!(recs[0].priority, Priority::Medium);
        assert_eq!(recs[0].category, Some(Category::Transport));
        assert!(recs[0].description.starts_with("16 ride-share trips"));
    }

    #[test]
    fn test_fifteen_trips_is_not_enough() {
        assert!(evaluate(15).is_empty());
        assert!(evaluate(0).is_empty());
    }
}
