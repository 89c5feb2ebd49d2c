//! Spending optimization
//!
//! Category-specific advice with an estimated saving, for the categories
//! where everyday habits move the total most.

use crate::models::Category;

use super::engine::{RecommendationContext, RecommendationRule};
use super::types::{Priority, Recommendation, RecommendationKind};

pub struct SpendingOptimizationRule;

struct Target {
    category: Category,
    threshold: f64,
    savings_rate: f64,
    priority: Priority,
    title: &'static str,
    advice: &'static str,
}

impl SpendingOptimizationRule {
    fn targets(ctx: &RecommendationContext<'_>) -> [Target; 3] {
        let config = ctx.config;
        [
            Target {
                category: Category::Food,
                threshold: config.food_percent,
                savings_rate: config.food_savings_rate,
                priority: Priority::High,
                title: "Optimize Food Expenses",
                advice: "Consider meal planning and cooking at home.",
            },
            Target {
                category: Category::Transport,
                threshold: config.transport_percent,
                savings_rate: config.transport_savings_rate,
                priority: Priority::Medium,
                title: "Reduce Transportation Costs",
                advice: "Consider public transport or carpooling.",
            },
            Target {
                category: Category::Entertainment,
                threshold: config.entertainment_percent,
                savings_rate: config.entertainment_savings_rate,
                priority: Priority::Low,
                title: "Optimize Entertainment Spending",
                advice: "Look for budget-friendly alternatives.",
            },
        ]
    }
}

impl RecommendationRule for SpendingOptimizationRule {
    fn id(&self) -> &'static str {
        "spending_optimization"
    }

    fn name(&self) -> &'static str {
        "Spending Optimization"
    }

    fn evaluate(&self, ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        for target in Self::targets(ctx) {
            let Some(share) = ctx
                .analysis
                .concentration
                .iter()
                .find(|c| c.category == target.category)
            else {
                continue;
            };
            if share.percent <= target.threshold {
                continue;
            }

            recommendations.push(Recommendation {
                id: format!("optimize-{}", target.category.slug()),
                title: target.title.to_string(),
                description: format!(
                    "{} is {:.0}% of your spending. {}",
                    target.category, share.percent, target.advice
                ),
                priority: target.priority,
                kind: RecommendationKind::Spending,
                category: Some(target.category),
                potential_savings: Some((share.total * target.savings_rate).round()),
            });
        }

        recommendations
    }
}
