//! Category share alerts
//!
//! Flags any category that takes more than its fair share of spending.

use super::engine::{RecommendationContext, RecommendationRule};
use super::types::{Priority, Recommendation, RecommendationKind};

/// High-priority alert for each category above the share threshold
pub struct CategoryShareRule;

impl RecommendationRule for CategoryShareRule {
    fn id(&self) -> &'static str {
        "category_share"
    }

    fn name(&self) -> &'static str {
        "Category Share"
    }

    fn evaluate(&self, ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
        ctx.analysis
            .concentration
            .iter()
            .filter(|c| c.percent > ctx.config.category_alert_percent)
            .map(|c| Recommendation {
                id: format!("high-category-{}", c.category.slug()),
                title: format!("{} Spending Alert", c.category),
                description: format!(
                    "{} accounts for {:.1}% of your spending. Consider setting a budget limit.",
                    c.category, c.percent
                ),
                priority: Priority::High,
                kind: RecommendationKind::Budget,
                category: Some(c.category),
                potential_savings: None,
            })
            .collect()
    }
}
