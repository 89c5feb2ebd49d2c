//! Keyword and pattern category matcher
//!
//! Scores free text against every rule in a [`RuleSet`]:
//!
//! ```text
//! score = weight * (0.4 * keyword share
//!                 + 0.3 * pattern share
//!                 + 0.2 * merchant pattern share
//!                 + 0.1 * context keyword share
//!                 + amount bonus)
//! ```
//!
//! A component with no entries contributes 0. The amount bonus only applies
//! to a rule that matched some text, so an amount alone never picks a
//! category. The strictly highest score wins; ties go to the earlier rule.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::models::Category;
use crate::rules::{CategoryRule, RuleSet};

const KEYWORD_WEIGHT: f64 = 0.4;
const PATTERN_WEIGHT: f64 = 0.3;
const MERCHANT_PATTERN_WEIGHT: f64 = 0.2;
const CONTEXT_WEIGHT: f64 = 0.1;

/// Lowercase, replace punctuation with spaces, collapse whitespace
pub fn normalize_text(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Score of one rule against one input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleScore {
    pub category: Category,
    /// Final weighted score
    pub score: f64,
    pub keyword_share: f64,
    pub pattern_share: f64,
    pub merchant_pattern_share: f64,
    pub context_share: f64,
    pub amount_bonus: f64,
}

/// Scores transactions against a rule set
#[derive(Debug, Clone)]
pub struct CategoryMatcher {
    rules: RuleSet,
}

impl CategoryMatcher {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Add a keyword to the rule for `category`
    pub fn add_keyword(&mut self, category: Category, keyword: &str) -> Result<bool> {
        self.rules.add_keyword(category, keyword)
    }

    /// Score every rule, in rule order
    pub fn scores(&self, text: &str, merchant: Option<&str>, amount: f64) -> Vec<RuleScore> {
        let merchant = merchant.unwrap_or("");
        let normalized = normalize_text(&format!("{} {}", text, merchant));
        let merchant_lower = merchant.trim().to_lowercase();

        self.rules
            .rules()
            .iter()
            .map(|rule| score_rule(rule, &normalized, &merchant_lower, amount))
            .collect()
    }

    /// Best positive-scoring rule, if any
    pub fn best_match(&self, text: &str, merchant: Option<&str>, amount: f64) -> Option<RuleScore> {
        let mut best: Option<RuleScore> = None;
        for score in self.scores(text, merchant, amount) {
            if score.score <= 0.0 {
                continue;
            }
            // Strictly greater keeps the earlier rule on ties
            let replace = match &best {
                Some(current) => score.score > current.score,
                None => true,
            };
            if replace {
                best = Some(score);
            }
        }
        best
    }

    /// Classify text into a category; `Other` when nothing matches
    pub fn classify(&self, text: &str, merchant: Option<&str>, amount: f64) -> Category {
        match self.best_match(text, merchant, amount) {
            Some(best) => {
                debug!(
                    category = %best.category,
                    score = best.score,
                    "Classified by rules"
                );
                best.category
            }
            None => Category::Other,
        }
    }
}

fn score_rule(rule: &CategoryRule, text: &str, merchant: &str, amount: f64) -> RuleScore {
    let keyword_share = if text.is_empty() {
        0.0
    } else {
        share(&rule.keywords, |k| text.contains(k.as_str()))
    };
    let pattern_share = if text.is_empty() {
        0.0
    } else {
        share(&rule.patterns, |p| p.is_match(text))
    };
    let merchant_pattern_share = if merchant.is_empty() {
        0.0
    } else {
        share(&rule.merchant_patterns, |p| p.is_match(merchant))
    };
    let context_share = if text.is_empty() {
        0.0
    } else {
        share(&rule.context_keywords, |k| text.contains(k.as_str()))
    };

    let text_score = KEYWORD_WEIGHT * keyword_share
        + PATTERN_WEIGHT * pattern_share
        + MERCHANT_PATTERN_WEIGHT * merchant_pattern_share
        + CONTEXT_WEIGHT * context_share;

    let amount_bonus = match rule.amount_range {
        Some(range) if text_score > 0.0 && range.contains(amount) => range.bonus,
        _ => 0.0,
    };

    RuleScore {
        category: rule.category,
        score: (text_score + amount_bonus) * rule.weight,
        keyword_share,
        pattern_share,
        merchant_pattern_share,
        context_share,
        amount_bonus,
    }
}

/// Fraction of entries matching; 0 for an empty set
fn share<T>(items: &[T], matches: impl Fn(&T) -> bool) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let matched = items.iter().filter(|item| matches(item)).count();
    matched as f64 / items.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> CategoryMatcher {
        CategoryMatcher::new(RuleSet::embedded().unwrap())
    }

    fn small_matcher() -> CategoryMatcher {
        let rules = RuleSet::parse(
            r#"
            [[rules]]
            category = "Food"
            keywords = ["swiggy", "zomato"]
            patterns = ["pizza"]
            amount_range = { min = 50.0, max = 2000.0, bonus = 0.1 }

            [[rules]]
            category = "Shopping"
            keywords = ["swiggy", "amazon"]
            patterns = ["pizza"]
            "#,
        )
        .unwrap();
        CategoryMatcher::new(rules)
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Swiggy*Order #123!! "), "swiggy order 123");
        assert_eq!(normalize_text("UBER-EATS"), "uber eats");
        assert_eq!(normalize_text("...   "), "");
    }

    #[test]
    fn test_classify_common_merchants() {
        let m = matcher();
        assert_eq!(
            m.classify("Swiggy food order", Some("Swiggy"), 350.0),
            Category::Food
        );
        assert_eq!(
            m.classify("Uber trip to airport", Some("Uber"), 450.0),
            Category::Transport
        );
        assert_eq!(
            m.classify("Netflix subscription", Some("Netflix"), 649.0),
            Category::Entertainment
        );
        assert_eq!(
            m.classify("Electricity bill payment", None, 1800.0),
            Category::Bills
        );
        assert_eq!(
            m.classify("Amazon purchase", Some("Amazon"), 2500.0),
            Category::Shopping
        );
    }

    #[test]
    fn test_transfer_uses_merchant_pattern() {
        let m = matcher();
        assert_eq!(
            m.classify("Money sent to friend", Some("rahul@okaxis"), 500.0),
            Category::Transfer
        );
    }

    #[test]
    fn test_empty_input_is_other() {
        let m = matcher();
        assert_eq!(m.classify("", None, 100.0), Category::Other);
        assert_eq!(m.classify("   ", Some(""), 0.0), Category::Other);
        assert!(m.scores("", None, 100.0).iter().all(|s| s.score == 0.0));
    }

    #[test]
    fn test_unmatched_text_is_other() {
        // Amount is inside several ranges but no text matches
        assert_eq!(matcher().classify("xqzv", None, 300.0), Category::Other);
    }

    #[test]
    fn test_score_formula() {
        let m = small_matcher();
        let scores = m.scores("Swiggy pizza", None, 100.0);

        // Food: 0.4 * 1/2 + 0.3 * 1/1 + 0.1 bonus
        assert!((scores[0].score - 0.6).abs() < 1e-9);
        assert!((scores[0].keyword_share - 0.5).abs() < 1e-9);
        assert_eq!(scores[0].amount_bonus, 0.1);
        // Shopping: 0.4 * 1/2 + 0.3 * 1/1, no range
        assert!((scores[1].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_ties_resolve_to_declaration_order() {
        let m = small_matcher();
        // Outside Food's range: both score 0.2 + 0.3
        let best = m.best_match("swiggy pizza", None, 5000.0).unwrap();
        assert_eq!(best.category, Category::Food);
    }

    #[test]
    fn test_weight_scales_score() {
        let rules = RuleSet::parse(
            r#"
            [[rules]]
            category = "Transfer"
            weight = 0.5
            keywords = ["neft"]
            "#,
        )
        .unwrap();
        let m = CategoryMatcher::new(rules);
        let scores = m.scores("NEFT to savings", None, 10.0);
        assert!((scores[0].score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_add_keyword_changes_classification() {
        let mut m = matcher();
        assert_eq!(m.classify("chai point", None, 80.0), Category::Other);

        m.add_keyword(Category::Food, "chai point").unwrap();
        assert_eq!(m.classify("chai point", None, 80.0), Category::Food);
    }

    #[test]
    fn test_classify_is_total() {
        let m = matcher();
        for text in ["", "!!!", "₹₹₹", "hospital visit", "random words here"] {
            let category = m.classify(text, Some("@"), -5.0);
            assert!(Category::all().contains(&category));
        }
    }
}
