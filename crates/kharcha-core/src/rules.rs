//! Category rule set
//!
//! The rule set is the static table the matcher scores transaction text
//! against. It is built once (from `categories.toml`) and then only changed
//! through [`RuleSet::add_keyword`].
//!
//! ## Configuration Resolution
//!
//! 1. Explicit path (`--rules`)
//! 2. Override in data dir (~/.local/share/kharcha/config/categories.toml)
//! 3. Embedded defaults (compiled into binary)

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::{debug, info};

use crate::classify::normalize_text;
use crate::config::{resolve_document, ConfigSource, CATEGORIES_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::models::Category;

/// Embedded default rule set (compiled into binary)
const DEFAULT_RULES: &str = include_str!("../../../config/categories.toml");

/// Expected amount range for a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
    /// Added to the rule score when the amount falls inside the range
    pub bonus: f64,
}

impl AmountRange {
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && amount <= self.max
    }
}

/// Scoring rule for one category
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,
    /// Multiplier applied to the summed score, in [0, 1]
    pub weight: f64,
    /// Normalized keywords matched as substrings
    pub keywords: Vec<String>,
    /// Matched against the normalized description + merchant
    pub patterns: Vec<Regex>,
    /// Matched against the lowercased merchant name
    pub merchant_patterns: Vec<Regex>,
    pub context_keywords: Vec<String>,
    pub amount_range: Option<AmountRange>,
}

impl CategoryRule {
    fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}

/// Immutable table of category rules, in evaluation order
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
    source: ConfigSource,
}

// Raw TOML structures

#[derive(Debug, Deserialize)]
struct RawRuleSet {
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    category: String,
    weight: Option<f64>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    patterns: Vec<String>,
    #[serde(default)]
    merchant_patterns: Vec<String>,
    #[serde(default)]
    context_keywords: Vec<String>,
    amount_range: Option<RawAmountRange>,
}

#[derive(Debug, Deserialize)]
struct RawAmountRange {
    min: f64,
    max: f64,
    #[serde(default)]
    bonus: f64,
}

impl RuleSet {
    /// Load the rule set (explicit path, then data dir override, then embedded)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (content, source) = resolve_document(path, CATEGORIES_CONFIG_FILE, DEFAULT_RULES)?;
        let mut rule_set = Self::parse(&content)?;
        rule_set.source = source;
        info!(
            source = %rule_set.source,
            rules = rule_set.rules.len(),
            "Loaded category rules"
        );
        Ok(rule_set)
    }

    /// The rule set compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_RULES)
    }

    /// Parse and compile a rule set from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawRuleSet = toml::from_str(content)?;
        if raw.rules.is_empty() {
            return Err(Error::Config("rule set has no [[rules]] entries".to_string()));
        }

        let rules = raw
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, raw_rule)| compile_rule(index, raw_rule))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            source: ConfigSource::Embedded,
        })
    }

    /// Rules in evaluation (and tie-break) order
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Where this rule set was loaded from
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Add a keyword to the first rule for `category`
    ///
    /// Returns `false` if the keyword was already present.
    pub fn add_keyword(&mut self, category: Category, keyword: &str) -> Result<bool> {
        let keyword = normalize_text(keyword);
        if keyword.is_empty() {
            return Err(Error::InvalidData("keyword is empty".to_string()));
        }

        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.category == category)
            .ok_or_else(|| Error::NotFound(format!("No rule for category {}", category)))?;

        if rule.has_keyword(&keyword) {
            return Ok(false);
        }

        debug!(category = %category, keyword = %keyword, "Added rule keyword");
        rule.keywords.push(keyword);
        Ok(true)
    }
}

fn compile_rule(index: usize, raw: RawRule) -> Result<CategoryRule> {
    let category: Category = raw
        .category
        .parse()
        .map_err(|e: String| Error::Config(format!("rules[{}]: {}", index, e)))?;

    let weight = raw.weight.unwrap_or(1.0);
    if !(0.0..=1.0).contains(&weight) {
        return Err(Error::Config(format!(
            "rules[{}] ({}): weight {} is outside [0, 1]",
            index, category, weight
        )));
    }

    let amount_range = match raw.amount_range {
        Some(range) => {
            if range.min > range.max {
                return Err(Error::Config(format!(
                    "rules[{}] ({}): amount_range min {} exceeds max {}",
                    index, category, range.min, range.max
                )));
            }
            if range.bonus < 0.0 {
                return Err(Error::Config(format!(
                    "rules[{}] ({}): amount_range bonus must not be negative",
                    index, category
                )));
            }
            Some(AmountRange {
                min: range.min,
                max: range.max,
                bonus: range.bonus,
            })
        }
        None => None,
    };

    Ok(CategoryRule {
        category,
        weight,
        keywords: normalize_keywords(raw.keywords),
        patterns: compile_patterns(&raw.patterns)?,
        merchant_patterns: compile_patterns(&raw.merchant_patterns)?,
        context_keywords: normalize_keywords(raw.context_keywords),
        amount_range,
    })
}

/// Normalize and dedupe keywords, keeping first-seen order
fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = normalize_text(&keyword);
        if !keyword.is_empty() && !normalized.contains(&keyword) {
            normalized.push(keyword);
        }
    }
    normalized
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(Error::from)
        })
        .collect()
}
