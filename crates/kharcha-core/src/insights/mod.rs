//! Recommendation Engine
//!
//! Maps analysis output to ranked, human-readable suggestions. Each rule is an
//! independent threshold check over the aggregates (spending analysis and
//! cash-flow summary); no rule reads another rule's output.
//!
//! ## Built-in Rules
//!
//! - **Category Share** - categories taking an outsized share of spending
//! - **Spending Optimization** - food, transport and entertainment savings
//! - **Spending Trends** - rising categories, month-over-month drops
//! - **Savings Rate** - too little saved, or enough to invest
//! - **Spending Habits** - weekends, food orders, subscriptions
//! - **Ride Sharing** - frequent cab trips this month
//! - **Emergency Fund** - savings above zero but under target
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kharcha_core::insights::{RecommendationContext, RecommendationEngine};
//!
//! let engine = RecommendationEngine::new();
//! let ctx = RecommendationContext::new(&analysis, &cash_flow, &config.recommendations);
//! let recommendations = engine.generate(&ctx, 8);
//! ```

pub mod category_share;
pub mod emergency_fund;
pub mod engine;
pub mod habits;
pub mod ride_share;
pub mod savings_rate;
pub mod spending_optimization;
pub mod trend;
pub mod types;

pub use category_share::CategoryShareRule;
pub use emergency_fund::EmergencyFundRule;
pub use engine::{
    RecommendationContext, RecommendationEngine, RecommendationRule, MAX_LIMIT, MIN_LIMIT,
};
pub use habits::HabitRule;
pub use ride_share::RideShareRule;
pub use savings_rate::SavingsRateRule;
pub use spending_optimization::SpendingOptimizationRule;
pub use trend::TrendRule;
pub use types::{Priority, Recommendation, RecommendationConfig, RecommendationKind};
