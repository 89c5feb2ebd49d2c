//! Kharcha Core Library
//!
//! Transaction categorization and spending insights for bank and UPI
//! transactions:
//! - Rule-based category matching driven by a TOML rule set
//! - Merchant learning store that remembers corrected categories
//! - Statistical anomaly detection (z-scores, merchant frequency)
//! - Spending pattern analysis, predictions and month-over-month change
//! - Ranked recommendations and budget suggestions
//! - Bank/UPI alert parsing and JSON/CSV transaction files

pub mod budget;
pub mod categorizer;
pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod import;
pub mod insights;
pub mod learning;
pub mod models;
pub mod patterns;
pub mod report;
pub mod rules;
pub mod sms;
pub mod stats;

pub use budget::{BudgetAlert, BudgetAlertLevel, BudgetConfig, BudgetPlanner, BudgetSuggestion};
pub use categorizer::{AssignmentSource, CategorizeCounts, CategoryAssignment, Categorizer};
pub use classify::{CategoryMatcher, RuleScore};
pub use config::{AnalysisConfig, ConfigSource};
pub use detect::{Anomaly, AnomalyDetector, AnomalyType, DetectionConfig, Severity};
pub use error::{Error, Result};
pub use insights::{Priority, Recommendation, RecommendationEngine, RecommendationKind};
pub use learning::{LearningStats, LearningStore, MerchantMemory};
pub use models::{Category, Direction, PaymentMethod, Transaction};
pub use patterns::{SpendingAnalysis, SpendingAnalyzer, SpendingConsistency, SpendingHabits, Trend};
pub use report::{AnalysisReport, ReportBuilder};
pub use rules::{CategoryRule, RuleSet};
pub use sms::{AlertSource, SmsBatch, SmsParser};
pub use stats::CashFlowSummary;
