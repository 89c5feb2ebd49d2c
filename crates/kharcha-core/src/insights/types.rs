//! Core types for the recommendation engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Category;

/// Priority of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// What a recommendation is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Set or tighten a budget
    Budget,
    /// Cut a specific kind of spending
    Spending,
    /// Save more of what comes in
    Savings,
    /// Put surplus savings to work
    Investment,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Budget => "budget",
            RecommendationKind::Spending => "spending",
            RecommendationKind::Savings => "savings",
            RecommendationKind::Investment => "investment",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ranked, human-readable suggestion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Stable slug such as `high-category-food`
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub kind: RecommendationKind,
    pub category: Option<Category>,
    pub potential_savings: Option<f64>,
}

/// Recommendation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Default cap on returned recommendations (4-8)
    pub limit: usize,
    /// Share of spending that triggers a category alert
    pub category_alert_percent: f64,
    pub food_percent: f64,
    pub food_savings_rate: f64,
    pub transport_percent: f64,
    pub transport_savings_rate: f64,
    pub entertainment_percent: f64,
    pub entertainment_savings_rate: f64,
    pub low_savings_rate: f64,
    pub high_savings_rate: f64,
    /// Food debits (exclusive) before suggesting cooking at home
    pub frequent_food_orders: usize,
    /// Subscription charges (exclusive) before suggesting an audit
    pub subscription_charges: usize,
    /// Month-over-month drop worth celebrating
    pub spending_drop_percent: f64,
    /// Weekend share of spending (percent, exclusive) before suggesting a
    /// weekend budget
    pub weekend_share_percent: f64,
    /// Ride-share trips in a month (exclusive) before suggesting alternatives
    pub ride_share_trips: usize,
    /// Savings rate below which (and above zero) an emergency fund is suggested
    pub emergency_fund_rate: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            limit: 8,
            category_alert_percent: 35.0,
            food_percent: 25.0,
            food_savings_rate: 0.2,
            transport_percent: 20.0,
            transport_savings_rate: 0.15,
            entertainment_percent: 15.0,
            entertainment_savings_rate: 0.25,
            low_savings_rate: 0.2,
            high_savings_rate: 0.3,
            frequent_food_orders: 20,
            subscription_charges: 5,
            spending_drop_percent: 10.0,
            weekend_share_percent: 40.0,
            ride_share_trips: 15,
            emergency_fund_rate: 0.2,
        }
    }
}
