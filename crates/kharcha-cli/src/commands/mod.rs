//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared options and loaders (rules, config, memory, transactions)
//! - `classify` - Classification, categorization and teaching
//! - `memory` - Merchant memory stats, listing and reset
//! - `analysis` - Anomalies, pattern analysis, recommendations and reports
//! - `budgets` - Budget suggestions and alerts
//! - `sms` - Bank/UPI alert parsing
//! - `rules` - Rule set listing

pub mod analysis;
pub mod budgets;
pub mod classify;
pub mod core;
pub mod memory;
pub mod rules;
pub mod sms;

// Re-export command functions for main.rs
pub use analysis::*;
pub use budgets::*;
pub use classify::*;
pub use self::core::*;
pub use memory::*;
pub use rules::*;
pub use sms::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a rupee amount for tables
pub fn rupees(amount: f64) -> String {
    format!("₹{:.0}", amount)
}
