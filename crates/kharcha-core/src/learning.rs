//! Merchant learning store
//!
//! Remembers which category each merchant has been classified into and how
//! confident that mapping is. Rule matches reinforce (or weaken) an entry;
//! `teach` pins one. A remembered category is only trusted once it is both
//! confident and has been seen a few times.
//!
//! The store never persists on its own. Callers flush with [`LearningStore::save`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{merchant_key, Category};

/// Minimum confidence (exclusive) before a learned category is used
pub const LOOKUP_MIN_CONFIDENCE: f64 = 0.7;
/// Minimum frequency (exclusive) before a learned category is used
pub const LOOKUP_MIN_FREQUENCY: u32 = 2;
/// Confidence step applied on agreement or disagreement
pub const REINFORCE_STEP: f64 = 0.1;
/// Floor for the confidence of a newly seen merchant
pub const NEW_ENTRY_MIN_CONFIDENCE: f64 = 0.5;
/// Frequency assigned by an explicit `teach`
pub const TAUGHT_FREQUENCY: u32 = 10;

const SNAPSHOT_VERSION: u32 = 1;

/// What the store knows about one merchant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantMemory {
    pub merchant_key: String,
    pub category: Category,
    pub confidence: f64,
    pub frequency: u32,
}

impl MerchantMemory {
    /// Whether lookups trust this entry
    pub fn is_trusted(&self) -> bool {
        self.confidence > LOOKUP_MIN_CONFIDENCE && self.frequency > LOOKUP_MIN_FREQUENCY
    }
}

/// Serialized form of the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub version: u32,
    /// Sorted by merchant key
    pub entries: Vec<MerchantMemory>,
}

/// Summary of the store's contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningStats {
    pub total_merchants: usize,
    pub category_distribution: BTreeMap<Category, usize>,
    /// 0 when the store is empty
    pub average_confidence: f64,
    /// Entries that lookups currently trust
    pub trusted_merchants: usize,
}

/// Thread-safe merchant -> category memory
#[derive(Debug, Default)]
pub struct LearningStore {
    entries: RwLock<HashMap<String, MerchantMemory>>,
}

impl LearningStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, MerchantMemory>> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, MerchantMemory>> {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Learned category for a merchant, if the entry is trusted
    pub fn lookup(&self, merchant: &str) -> Option<Category> {
        let key = merchant_key(merchant)?;
        self.read()
            .get(&key)
            .filter(|entry| entry.is_trusted())
            .map(|entry| entry.category)
    }

    /// Raw entry for a merchant, trusted or not
    pub fn get(&self, merchant: &str) -> Option<MerchantMemory> {
        let key = merchant_key(merchant)?;
        self.read().get(&key).cloned()
    }

    /// Record a classification of `merchant` as `category`
    ///
    /// A new merchant starts at `max(0.5, observed_score)`; a non-finite score
    /// counts as 0.5. For a known
    /// merchant, agreement raises confidence by 0.1 and disagreement lowers
    /// it; the stored category is kept either way. Returns the updated entry,
    /// or `None` for a blank merchant.
    pub fn reinforce(
        &self,
        merchant: &str,
        category: Category,
        observed_score: f64,
    ) -> Option<MerchantMemory> {
        let key = merchant_key(merchant)?;
        let mut entries = self.write();

        let entry = match entries.get_mut(&key) {
            Some(entry) => {
                if entry.category == category {
                    entry.confidence = (entry.confidence + REINFORCE_STEP).min(1.0);
                } else {
                    entry.confidence = (entry.confidence - REINFORCE_STEP).max(0.0);
                }
                entry.frequency = entry.frequency.saturating_add(1);
                debug!(
                    merchant = %key,
                    category = %entry.category,
                    confidence = entry.confidence,
                    frequency = entry.frequency,
                    "Reinforced merchant memory"
                );
                entry.clone()
            }
            None => {
                let entry = MerchantMemory {
                    merchant_key: key.clone(),
                    category,
                    confidence: if observed_score.is_finite() {
                        observed_score.clamp(NEW_ENTRY_MIN_CONFIDENCE, 1.0)
                    } else {
                        NEW_ENTRY_MIN_CONFIDENCE
                    },
                    frequency: 1,
                };
                debug!(
                    merchant = %key,
                    category = %category,
                    confidence = entry.confidence,
                    "Learned new merchant"
                );
                entries.insert(key, entry.clone());
                entry
            }
        };

        Some(entry)
    }

    /// Pin a merchant to a category (user override)
    pub fn teach(&self, merchant: &str, category: Category) -> Result<MerchantMemory> {
        let key = merchant_key(merchant)
            .ok_or_else(|| Error::InvalidData("merchant name is empty".to_string()))?;

        let entry = MerchantMemory {
            merchant_key: key.clone(),
            category,
            confidence: 1.0,
            frequency: TAUGHT_FREQUENCY,
        };
        self.write().insert(key.clone(), entry.clone());

        info!(merchant = %key, category = %category, "Taught merchant category");
        Ok(entry)
    }

    /// Drop every entry, returning how many were removed
    pub fn reset(&self) -> usize {
        let mut entries = self.write();
        let removed = entries.len();
        entries.clear();
        info!(removed, "Reset merchant memory");
        removed
    }

    /// All entries sorted by merchant key
    pub fn entries(&self) -> Vec<MerchantMemory> {
        let mut entries: Vec<MerchantMemory> = self.read().values().cloned().collect();
        entries.sort_by(|a, b| a.merchant_key.cmp(&b.merchant_key));
        entries
    }

    pub fn stats(&self) -> LearningStats {
        let entries = self.read();

        let mut category_distribution = BTreeMap::new();
        let mut confidence_sum = 0.0;
        let mut trusted_merchants = 0;
        for entry in entries.values() {
            *category_distribution.entry(entry.category).or_insert(0) += 1;
            confidence_sum += entry.confidence;
            if entry.is_trusted() {
                trusted_merchants += 1;
            }
        }

        let average_confidence = if entries.is_empty() {
            0.0
        } else {
            confidence_sum / entries.len() as f64
        };

        LearningStats {
            total_merchants: entries.len(),
            category_distribution,
            average_confidence,
            trusted_merchants,
        }
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            version: SNAPSHOT_VERSION,
            entries: self.entries(),
        }
    }

    /// Rebuild a store from a snapshot
    ///
    /// Keys are re-normalized; entries with blank keys are dropped,
    /// confidence is clamped to [0, 1] and a zero frequency is raised to 1.
    pub fn from_snapshot(snapshot: MemorySnapshot) -> Self {
        let mut entries = HashMap::with_capacity(snapshot.entries.len());
        for mut entry in snapshot.entries {
            let Some(key) = merchant_key(&entry.merchant_key) else {
                continue;
            };
            entry.merchant_key = key.clone();
            entry.confidence = entry.confidence.clamp(0.0, 1.0);
            entry.frequency = entry.frequency.max(1);
            entries.insert(key, entry);
        }

        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Load a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let snapshot: MemorySnapshot = serde_json::from_str(&content)?;
        let store = Self::from_snapshot(snapshot);
        info!(path = %path.display(), merchants = store.len(), "Loaded merchant memory");
        Ok(store)
    }

    /// Load a snapshot file, or start empty if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No merchant memory snapshot, starting empty");
            Ok(Self::new())
        }
    }

    /// Write a snapshot file atomically (temp file + rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let snapshot = self.snapshot();
        let mut temp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut temp, &snapshot)?;
        temp.flush()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        info!(
            path = %path.display(),
            merchants = snapshot.entries.len(),
            "Saved merchant memory"
        );
        Ok(())
    }
}
