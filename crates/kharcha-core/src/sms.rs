//! Bank and UPI alert parsing
//!
//! Turns the text of a payment alert into a [`Transaction`]. Recognized
//! senders:
//! - PhonePe, Google Pay, Paytm (UPI apps)
//! - HDFC Bank, SBI
//!
//! Alerts from other senders still parse when they carry an amount and a
//! direction keyword; their source is reported as a generic bank.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, Direction, PaymentMethod, Transaction};

/// Longest counterparty name kept from an alert
const MAX_COUNTERPARTY_LEN: usize = 30;

/// Words that trail counterparty names in alerts and carry no identity
const COUNTERPARTY_STOP_WORDS: &[&str] = &["upi", "via", "on", "using", "for", "vpa"];

/// Who sent the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertSource {
    PhonePe,
    GooglePay,
    Paytm,
    Hdfc,
    Sbi,
    Bank,
}

impl AlertSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhonePe => "PhonePe",
            Self::GooglePay => "Google Pay",
            Self::Paytm => "Paytm",
            Self::Hdfc => "HDFC Bank",
            Self::Sbi => "SBI",
            Self::Bank => "Bank",
        }
    }

    /// Detect the sender from lowercased alert text (apps before banks)
    fn detect(lower: &str) -> Self {
        if lower.contains("phonepe") {
            Self::PhonePe
        } else if lower.contains("google pay") || lower.contains("gpay") {
            Self::GooglePay
        } else if lower.contains("paytm") {
            Self::Paytm
        } else if lower.contains("hdfc") {
            Self::Hdfc
        } else if lower.contains("sbi") {
            Self::Sbi
        } else {
            Self::Bank
        }
    }
}

impl fmt::Display for AlertSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of parsing a batch of alerts
#[derive(Debug, Clone, Default)]
pub struct SmsBatch {
    pub transactions: Vec<Transaction>,
    /// Non-blank lines that could not be parsed
    pub skipped: usize,
}

/// Compiled alert patterns
pub struct SmsParser {
    amount: Regex,
    direction: Regex,
    payee: Regex,
    payer: Regex,
    date: Regex,
}

impl SmsParser {
    pub fn new() -> Result<Self> {
        // Counterparty names run until a connector word, punctuation or the end
        let tail = r"([^\s.,;:!][^.,;:!\n]*?)(?:\s+(?:via|on|using|for|ref|upi|avl|info|txn)\b|[.,;:!]|$)";

        Ok(Self {
            amount: Regex::new(r"(?i)(?:\b(?:rs\.?|inr)|₹)\s*([0-9][0-9,]*(?:\.[0-9]+)?)")?,
            direction: Regex::new(
                r"(?i)\b(debited|spent|paid|sent|withdrawn|credited|received|deposited)\b",
            )?,
            payee: Regex::new(&format!(r"(?i)\b(?:to|at)\s+{}", tail))?,
            payer: Regex::new(&format!(r"(?i)\bfrom\s+{}", tail))?,
            date: Regex::new(r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{2,4})\b")?,
        })
    }

    /// Parse one alert
    ///
    /// `default_date` is used when the alert carries no `dd-mm-yyyy` date.
    pub fn parse(&self, text: &str, default_date: DateTime<Utc>) -> Result<Transaction> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidData("Empty alert text".to_string()));
        }

        let amount = self.parse_amount(text)?;
        let direction = self.parse_direction(text)?;
        let lower = text.to_lowercase();
        let source = AlertSource::detect(&lower);
        let method = detect_method(&lower);

        let counterparty_pattern = match direction {
            Direction::Debit => &self.payee,
            Direction::Credit => &self.payer,
        };
        let merchant = counterparty_pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| clean_counterparty(m.as_str()));

        let date = self.parse_date(text).unwrap_or(default_date);

        let description = match &merchant {
            Some(name) => format!("{}: {}", source, name),
            None => format!("{}: {}", source, direction),
        };

        Ok(Transaction {
            id: alert_id(text),
            amount,
            description,
            category: Category::Other,
            date,
            direction,
            merchant,
            method,
            raw_text: Some(text.to_string()),
        })
    }

    /// Parse one alert per line, skipping lines that do not parse
    pub fn parse_batch(&self, content: &str, default_date: DateTime<Utc>) -> SmsBatch {
        let mut batch = SmsBatch::default();

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match self.parse(line, default_date) {
                Ok(tx) => batch.transactions.push(tx),
                Err(e) => {
                    debug!(line = index + 1, error = %e, "Skipping unparseable alert");
                    batch.skipped += 1;
                }
            }
        }

        debug!(
            parsed = batch.transactions.len(),
            skipped = batch.skipped,
            "Parsed alert batch"
        );
        batch
    }

    fn parse_amount(&self, text: &str) -> Result<f64> {
        let raw = self
            .amount
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().replace(',', ""))
            .ok_or_else(|| Error::InvalidData("No amount found in alert".to_string()))?;

        let amount: f64 = raw
            .trim_end_matches('.')
            .parse()
            .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", raw)))?;

        if amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Alert amount must be positive: {}",
                amount
            )));
        }
        Ok(amount)
    }

    /// The earliest direction keyword decides
    fn parse_direction(&self, text: &str) -> Result<Direction> {
        let keyword = self
            .direction
            .find(text)
            .map(|m| m.as_str().to_lowercase())
            .ok_or_else(|| Error::InvalidData("No debit or credit keyword in alert".to_string()))?;

        match keyword.as_str() {
            "credited" | "received" | "deposited" => Ok(Direction::Credit),
            _ => Ok(Direction::Debit),
        }
    }

    fn parse_date(&self, text: &str) -> Option<DateTime<Utc>> {
        let caps = self.date.captures(text)?;
        let day: u32 = caps.get(1)?.as_str().parse().ok()?;
        let month: u32 = caps.get(2)?.as_str().parse().ok()?;
        let mut year: i32 = caps.get(3)?.as_str().parse().ok()?;
        if year < 100 {
            year += 2000;
        }

        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
        Some(Utc.from_utc_datetime(&naive))
    }
}

fn detect_method(lower: &str) -> PaymentMethod {
    if lower.contains("card") {
        PaymentMethod::Card
    } else if ["neft", "imps", "rtgs", "net banking", "netbanking"]
        .iter()
        .any(|k| lower.contains(k))
    {
        PaymentMethod::NetBanking
    } else {
        PaymentMethod::Upi
    }
}

/// Strip UPI handles, connector words and punctuation from a counterparty
fn clean_counterparty(raw: &str) -> Option<String> {
    let mut words = Vec::new();

    for token in raw.split_whitespace() {
        let token = token.split_once('@').map_or(token, |(handle, _)| handle);
        let token: String = token
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '&' { c } else { ' ' })
            .collect();

        for word in token.split_whitespace() {
            if !COUNTERPARTY_STOP_WORDS.contains(&word.to_lowercase().as_str()) {
                words.push(word.to_string());
            }
        }
    }

    let joined = words.join(" ");
    let truncated: String = joined.chars().take(MAX_COUNTERPARTY_LEN).collect();
    let cleaned = truncated.trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Content-derived id so re-parsing the same alert yields the same transaction
fn alert_id(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
