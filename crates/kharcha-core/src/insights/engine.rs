//! Recommendation engine - runs every rule and ranks the results

use crate::patterns::SpendingAnalysis;
use crate::stats::CashFlowSummary;

use super::types::{Recommendation, RecommendationConfig};
use super::{
    CategoryShareRule, EmergencyFundRule, HabitRule, RideShareRule, SavingsRateRule,
    SpendingOptimizationRule, TrendRule,
};

/// Smallest cap a caller may ask for
pub const MIN_LIMIT: usize = 4;
/// Largest cap a caller may ask for
pub const MAX_LIMIT: usize = 8;

/// Aggregates a rule may look at
pub struct RecommendationContext<'a> {
    pub analysis: &'a SpendingAnalysis,
    pub cash_flow: &'a CashFlowSummary,
    pub config: &'a RecommendationConfig,
}

impl<'a> RecommendationContext<'a> {
    pub fn new(
        analysis: &'a SpendingAnalysis,
        cash_flow: &'a CashFlowSummary,
        config: &'a RecommendationConfig,
    ) -> Self {
        Self {
            analysis,
            cash_flow,
            config,
        }
    }
}

/// A threshold check over the aggregates
///
/// Rules never see each other's output.
pub trait RecommendationRule: Send + Sync {
    /// Stable identifier for logging
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &RecommendationContext<'_>) -> Vec<Recommendation>;
}

/// Runs registered rules and ranks their recommendations
pub struct RecommendationEngine {
    rules: Vec<Box<dyn RecommendationRule>>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationEngine {
    /// Create an engine with the built-in rules
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(CategoryShareRule));
        engine.register(Box::new(SpendingOptimizationRule));
        engine.register(Box::new(TrendRule));
        engine.register(Box::new(SavingsRateRule));
        engine.register(Box::new(HabitRule));
        engine.register(Box::new(RideShareRule));
        engine.register(Box::new(EmergencyFundRule));

        engine
    }

    /// Create an engine with no rules
    pub fn empty() -> Self {
        Self { rules: vec![] }
    }

    pub fn register(&mut self, rule: Box<dyn RecommendationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluate every rule, order high > medium > low, and cap the list
    ///
    /// `limit` is clamped to 4-8. Within a priority, rule order is kept.
    pub fn generate(&self, ctx: &RecommendationContext<'_>, limit: usize) -> Vec<Recommendation> {
        let mut all = Vec::new();

        for rule in &self.rules {
            let recommendations = rule.evaluate(ctx);
            tracing::debug!(
                rule = rule.id(),
                count = recommendations.len(),
                "Recommendation rule complete"
            );
            all.extend(recommendations);
        }

        // Stable sort keeps rule order within a priority
        all.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
        all.truncate(limit.clamp(MIN_LIMIT, MAX_LIMIT));
        all
    }
}
