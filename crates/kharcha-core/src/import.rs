//! Transaction file import and export
//!
//! Two formats, picked by file extension:
//! - `.json`: an array of transactions
//! - `.csv`: header `id,date,amount,description,category,direction,merchant,method,raw_text`
//!
//! In CSV, `category`, `merchant`, `method` and `raw_text` may be missing or
//! blank, and a blank `id` is replaced by a content hash. Dates are RFC 3339
//! or plain `YYYY-MM-DD` (midnight UTC).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, Direction, PaymentMethod, Transaction};

pub const CSV_HEADER: [&str; 9] = [
    "id",
    "date",
    "amount",
    "description",
    "category",
    "direction",
    "merchant",
    "method",
    "raw_text",
];

const REQUIRED_COLUMNS: [&str; 4] = ["date", "amount", "description", "direction"];

/// Transaction file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
}

impl FileFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(Error::InvalidData(format!(
                "Unsupported transaction file {} (expected .json or .csv)",
                path.display()
            ))),
        }
    }
}

/// Read transactions from a `.json` or `.csv` file
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let format = FileFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);

    let transactions = match format {
        FileFormat::Json => parse_json(reader)?,
        FileFormat::Csv => parse_csv(reader)?,
    };

    debug!(
        path = %path.display(),
        count = transactions.len(),
        "Loaded transactions"
    );
    Ok(transactions)
}

/// Parse a JSON array of transactions
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = serde_json::from_reader(reader)?;
    for (index, tx) in transactions.iter().enumerate() {
        validate_amount(tx.amount)
            .map_err(|e| Error::InvalidData(format!("transaction {}: {}", index + 1, e)))?;
    }
    Ok(transactions)
}

/// Parse CSV transactions
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = index + 2;
        let tx = columns
            .parse_record(&record)
            .map_err(|e| Error::InvalidData(format!("line {}: {}", line, e)))?;
        transactions.push(tx);
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

/// Write transactions to a `.json` or `.csv` file
pub fn write_transactions(path: &Path, transactions: &[Transaction]) -> Result<()> {
    match FileFormat::from_path(path)? {
        FileFormat::Json => write_transactions_json(path, transactions),
        FileFormat::Csv => write_transactions_csv(path, transactions),
    }
}

/// Write transactions as a pretty-printed JSON array
pub fn write_transactions_json(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, transactions)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write transactions as CSV with the standard header
pub fn write_transactions_csv(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(CSV_HEADER)?;

    for tx in transactions {
        let amount = tx.amount.to_string();
        let date = tx.date.to_rfc3339();
        wtr.write_record([
            tx.id.as_str(),
            date.as_str(),
            amount.as_str(),
            tx.description.as_str(),
            tx.category.as_str(),
            tx.direction.as_str(),
            tx.merchant.as_deref().unwrap_or(""),
            tx.method.as_str(),
            tx.raw_text.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Column positions resolved from the CSV header
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_lowercase(), i))
            .collect();

        for column in REQUIRED_COLUMNS {
            if !index.contains_key(column) {
                return Err(Error::InvalidData(format!(
                    "CSV header is missing the '{}' column",
                    column
                )));
            }
        }

        Ok(Self { index })
    }

    /// Field value, `None` when the column is absent or blank
    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.index
            .get(column)
            .and_then(|&i| record.get(i))
            .filter(|v| !v.is_empty())
    }

    fn require<'r>(&self, record: &'r StringRecord, column: &str) -> Result<&'r str> {
        self.get(record, column)
            .ok_or_else(|| Error::InvalidData(format!("Missing {}", column)))
    }

    fn parse_record(&self, record: &StringRecord) -> Result<Transaction> {
        let date = parse_date(self.require(record, "date")?)?;
        let amount = parse_amount(self.require(record, "amount")?)?;
        let description = self.require(record, "description")?.to_string();

        let direction: Direction = self
            .require(record, "direction")?
            .parse()
            .map_err(Error::InvalidData)?;

        let category = match self.get(record, "category") {
            Some(value) => value.parse::<Category>().map_err(Error::InvalidData)?,
            None => Category::Other,
        };

        let method = match self.get(record, "method") {
            Some(value) => value.parse::<PaymentMethod>().map_err(Error::InvalidData)?,
            None => PaymentMethod::default(),
        };

        let id = match self.get(record, "id") {
            Some(id) => id.to_string(),
            None => generate_id(&date, &description, amount),
        };

        Ok(Transaction {
            id,
            amount,
            description,
            category,
            date,
            direction,
            merchant: self.get(record, "merchant").map(str::to_string),
            method,
            raw_text: self.get(record, "raw_text").map(str::to_string),
        })
    }
}

/// Generate a stable id for rows that do not carry one
fn generate_id(date: &DateTime<Utc>, description: &str, amount: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_rfc3339().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| Error::InvalidData(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, handling rupee symbols and thousands separators
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned = s.trim().replace([',', '₹', ' '], "");

    let amount = cleaned
        .parse::<f64>()
        .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", s)))?;
    validate_amount(amount)?;
    Ok(amount)
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "Amount must be positive, got {}",
            amount
        )))
    }
}
