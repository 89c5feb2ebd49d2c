//! Categorization pipeline
//!
//! Priority order:
//! 1. Learned merchant memory (trusted entries only)
//! 2. Rule matcher
//! 3. Fallback to Other
//!
//! Rule and fallback decisions feed back into the memory so repeated
//! merchants are eventually answered from it.

use serde::Serialize;
use tracing::debug;

use crate::classify::CategoryMatcher;
use crate::learning::LearningStore;
use crate::models::{Category, Transaction};

/// How a category was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    Learned,
    Rules,
    Fallback,
}

impl AssignmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learned => "learned",
            Self::Rules => "rules",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for AssignmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of categorizing one transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAssignment {
    pub category: Category,
    pub source: AssignmentSource,
    /// Memory confidence for learned results, rule score otherwise
    pub confidence: f64,
}

/// Counts from a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorizeCounts {
    pub total: usize,
    pub by_learned: usize,
    pub by_rules: usize,
    pub fallback_to_other: usize,
}

/// Learned memory + rule matcher
pub struct Categorizer<'a> {
    matcher: &'a CategoryMatcher,
    memory: &'a LearningStore,
}

impl<'a> Categorizer<'a> {
    pub fn new(matcher: &'a CategoryMatcher, memory: &'a LearningStore) -> Self {
        Self { matcher, memory }
    }

    /// Categorize one transaction and update the memory
    pub fn categorize(&self, tx: &Transaction) -> CategoryAssignment {
        let merchant = tx.merchant.as_deref();

        // 1. Learned memory
        if let Some(merchant) = merchant {
            if let Some(entry) = self.memory.get(merchant).filter(|e| e.is_trusted()) {
                debug!(
                    id = %tx.id,
                    merchant = %entry.merchant_key,
                    category = %entry.category,
                    "Categorized from merchant memory"
                );
                return CategoryAssignment {
                    category: entry.category,
                    source: AssignmentSource::Learned,
                    confidence: entry.confidence,
                };
            }
        }

        // 2. Rules, 3. fallback
        let assignment = match self.matcher.best_match(&tx.description, merchant, tx.amount) {
            Some(best) => CategoryAssignment {
                category: best.category,
                source: AssignmentSource::Rules,
                confidence: best.score,
            },
            None => CategoryAssignment {
                category: Category::Other,
                source: AssignmentSource::Fallback,
                confidence: 0.0,
            },
        };

        if let Some(merchant) = merchant {
            self.memory
                .reinforce(merchant, assignment.category, assignment.confidence);
        }

        debug!(
            id = %tx.id,
            category = %assignment.category,
            source = %assignment.source,
            "Categorized transaction"
        );
        assignment
    }

    /// Categorize a batch in place, returning counts by source
    pub fn categorize_all(&self, transactions: &mut [Transaction]) -> CategorizeCounts {
        let mut counts = CategorizeCounts::default();

        for tx in transactions.iter_mut() {
            let assignment = self.categorize(tx);
            tx.category = assignment.category;

            counts.total += 1;
            match assignment.source {
                AssignmentSource::Learned => counts.by_learned += 1,
                AssignmentSource::Rules => counts.by_rules += 1,
                AssignmentSource::Fallback => counts.fallback_to_other += 1,
            }
        }

        debug!(
            total = counts.total,
            learned = counts.by_learned,
            rules = counts.by_rules,
            fallback = counts.fallback_to_other,
            "Categorized batch"
        );
        counts
    }
}
