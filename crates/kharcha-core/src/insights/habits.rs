//! Habit recommendations
//!
//! - Weekend-heavy spending (share of all spending, not the weekday ratio)
//! - Frequent food orders
//! - Many subscription charges

use crate::models::Category;

use super::engine::{RecommendationContext, RecommendationRule};
use super::types::{Priority, Recommendation, RecommendationKind};

pub struct HabitRule;

impl RecommendationRule for HabitRule {
    fn id(&self) -> &'static str {
        "habits"
    }

    fn name(&self) -> &'static str {
        "Spending Habits"
    }

    fn evaluate(&self, ctx: &RecommendationContext<'_>) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();
        let analysis = ctx.analysis;

        let skew = &analysis.weekend_skew;
        let total = skew.weekend_total + skew.weekday_total;
        let weekend_percent = if total > 0.0 {
            skew.weekend_total / total * 100.0
        } else {
            0.0
        };
        if weekend_percent > ctx.config.weekend_share_percent {
            recommendations.push(Recommendation {
                id: "weekend-spending".to_string(),
                title: "Weekend Spending Control".to_string(),
                description: format!(
                    "{:.1}% of your spending happens on weekends. Plan weekend activities within a set budget.",
                    weekend_percent
                ),
                priority: Priority::Low,
                kind: RecommendationKind::Budget,
                category: None,
                potential_savings: None,
            });
        }

        let food_orders = analysis.debit_count_for(Category::Food);
        if food_orders > ctx.config.frequent_food_orders {
            recommendations.push(Recommendation {
                id: "food-delivery-optimization".to_string(),
                title: "Food Delivery Savings".to_string(),
                description: format!(
                    "You paid for food {} times. Cooking at home 2-3 times a week adds up.",
                    food_orders
                ),
                priority: Priority::Medium,
                kind: RecommendationKind::Savings,
                category: Some(Category::Food),
                potential_savings: None,
            });
        }

        if ctx.cash_flow.subscription_charges > ctx.config.subscription_charges {
            recommendations.push(Recommendation {
                id: "subscription-audit".to_string(),
                title: "Subscription Audit".to_string(),
                description: format!(
                    "{} subscription charges found. Review and cancel the ones you no longer use.",
                    ctx.cash_flow.subscription_charges
                ),
                priority: Priority::Low,
                kind: RecommendationKind::Savings,
                category: None,
                potential_savings: None,
            });
        }

        recommendations
    }
}
