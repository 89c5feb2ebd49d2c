//! Domain models for Kharcha

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spending category assigned to a transaction
///
/// Declaration order matters: it is the tie-break order used by the matcher
/// and the iteration order of every per-category aggregate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Bills,
    Transfer,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::Bills => "Bills",
            Self::Transfer => "Transfer",
            Self::Other => "Other",
        }
    }

    /// Lowercase slug used in ids and config keys
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
            Self::Bills => "bills",
            Self::Transfer => "transfer",
            Self::Other => "other",
        }
    }

    /// Get all categories in declaration order
    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Shopping,
            Self::Entertainment,
            Self::Bills,
            Self::Transfer,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "shopping" => Ok(Self::Shopping),
            "entertainment" => Ok(Self::Entertainment),
            "bills" => Ok(Self::Bills),
            "transfer" => Ok(Self::Transfer),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Money flow direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money leaving the account (spending)
    Debit,
    /// Money entering the account (income, refunds)
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" | "dr" => Ok(Self::Debit),
            "credit" | "cr" => Ok(Self::Credit),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment method used for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "UPI")]
    Upi,
    Card,
    #[serde(alias = "Net Banking")]
    NetBanking,
    Cash,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Card => "Card",
            Self::NetBanking => "NetBanking",
            Self::Cash => "Cash",
            Self::Wallet => "Wallet",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "upi" => Ok(Self::Upi),
            "card" => Ok(Self::Card),
            "netbanking" => Ok(Self::NetBanking),
            "cash" => Ok(Self::Cash),
            "wallet" => Ok(Self::Wallet),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bank or UPI transaction
///
/// Supplied by the caller. Nothing in this crate mutates a transaction except
/// the categorizer, which assigns `category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Always positive; the sign lives in `direction`
    pub amount: f64,
    pub description: String,
    #[serde(default)]
    pub category: Category,
    pub date: DateTime<Utc>,
    #[serde(alias = "type")]
    pub direction: Direction,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub method: PaymentMethod,
    /// Original alert text the transaction was parsed from
    #[serde(default, alias = "rawMessage")]
    pub raw_text: Option<String>,
}

impl Transaction {
    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::Credit
    }

    /// Normalized merchant key, if the transaction names a merchant
    pub fn merchant_key(&self) -> Option<String> {
        self.merchant.as_deref().and_then(merchant_key)
    }
}

/// Normalize a merchant name into a lookup key (lowercase, trimmed)
///
/// Returns `None` for blank names.
pub fn merchant_key(merchant: &str) -> Option<String> {
    let key = merchant.trim().to_lowercase();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}
