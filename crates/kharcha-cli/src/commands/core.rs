//! Shared options and loaders
//!
//! This module contains:
//! - `Options` - Global flags every command receives
//! - Loaders for the rule set, analysis config, merchant memory and
//!   transaction files
//! - `print_json` - Shared `--json` output

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use kharcha_core::classify::CategoryMatcher;
use kharcha_core::config::{default_memory_path, AnalysisConfig};
use kharcha_core::import::{load_transactions, write_transactions};
use kharcha_core::learning::LearningStore;
use kharcha_core::models::Transaction;
use kharcha_core::rules::RuleSet;
use serde::Serialize;
use tracing::debug;

/// Global flags
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub memory: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

impl Options {
    /// Memory snapshot path: `--memory`, else the data dir default
    pub fn memory_path(&self) -> Result<PathBuf> {
        match &self.memory {
            Some(path) => Ok(path.clone()),
            None => default_memory_path()
                .ok_or_else(|| anyhow!("No data directory found; pass --memory <path>")),
        }
    }
}

pub fn load_rules(opts: &Options) -> Result<RuleSet> {
    RuleSet::load(opts.rules.as_deref()).context("Failed to load category rules")
}

pub fn load_matcher(opts: &Options) -> Result<CategoryMatcher> {
    Ok(CategoryMatcher::new(load_rules(opts)?))
}

pub fn load_analysis_config(opts: &Options) -> Result<AnalysisConfig> {
    let (config, source) =
        AnalysisConfig::load(opts.config.as_deref()).context("Failed to load analysis config")?;
    debug!(source = %source, "Using analysis config");
    Ok(config)
}

/// Open the merchant memory, starting empty if no snapshot exists yet
pub fn open_memory(opts: &Options) -> Result<(LearningStore, PathBuf)> {
    let path = opts.memory_path()?;
    let memory = LearningStore::load_or_default(&path)
        .with_context(|| format!("Failed to load merchant memory from {}", path.display()))?;
    Ok((memory, path))
}

pub fn save_memory(memory: &LearningStore, path: &Path) -> Result<()> {
    memory
        .save(path)
        .with_context(|| format!("Failed to save merchant memory to {}", path.display()))
}

pub fn read_transactions(path: &Path) -> Result<Vec<Transaction>> {
    load_transactions(path)
        .with_context(|| format!("Failed to read transactions from {}", path.display()))
}

pub fn save_transactions(path: &Path, transactions: &[Transaction]) -> Result<()> {
    write_transactions(path, transactions)
        .with_context(|| format!("Failed to write transactions to {}", path.display()))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
