// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::{Date, Month, OffsetDateTime, Time};
use vgrid_app::{CellValue, Record, RecordId, Transaction, TransactionStatus, iso_timestamp};

const MERCHANTS: [&str; 18] = [
    "Amazon",
    "Walmart",
    "Target",
    "Apple Store",
    "Best Buy",
    "Home Depot",
    "Costco",
    "Starbucks",
    "McDonald's",
    "Whole Foods",
    "TechCorp",
    "DataMart",
    "ShopEasy",
    "QuickBuy",
    "MegaStore",
    "FreshMarket",
    "GadgetHub",
    "FoodPlus",
];

const CATEGORIES: [&str; 10] = [
    "Electronics",
    "Groceries",
    "Clothing",
    "Home & Garden",
    "Entertainment",
    "Dining",
    "Transportation",
    "Healthcare",
    "Education",
    "Utilities",
];

const DESCRIPTIONS: [&str; 9] = [
    "Online purchase",
    "In-store transaction",
    "Subscription payment",
    "Refund processed",
    "Monthly billing",
    "One-time purchase",
    "Recurring payment",
    "Gift card redemption",
    "Promotional offer",
];

/// Largest generated amount, in cents.
const MAX_AMOUNT_CENTS: u64 = 1_000_000;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

struct Fields {
    date: OffsetDateTime,
    merchant: &'static str,
    category: &'static str,
    amount: f64,
    status: TransactionStatus,
    description: &'static str,
}

/// Reproducible transaction rows drawn from the dataset generator's
/// vocabulary.
#[derive(Debug, Clone)]
pub struct TransactionFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl TransactionFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub fn transaction(&mut self, id: i64) -> Transaction {
        let fields = self.fields();
        Transaction {
            id,
            date: iso_timestamp(fields.date),
            merchant: fields.merchant.to_owned(),
            category: fields.category.to_owned(),
            amount: fields.amount,
            status: fields.status,
            description: fields.description.to_owned(),
        }
    }

    /// Same distribution as [`Self::transaction`], built without the string
    /// round-trip through the date field.
    pub fn record(&mut self, id: i64) -> Record {
        let fields = self.fields();
        Record::new(
            RecordId::new(id),
            [
                CellValue::Integer(id),
                CellValue::Timestamp(fields.date),
                CellValue::Text(fields.merchant.to_owned()),
                CellValue::Text(fields.category.to_owned()),
                CellValue::Amount(fields.amount),
                CellValue::Status(fields.status),
                CellValue::Text(fields.description.to_owned()),
            ],
        )
    }

    pub fn transactions(&mut self, count: usize) -> Vec<Transaction> {
        (0..count).map(|id| self.transaction(id as i64)).collect()
    }

    pub fn records(&mut self, count: usize) -> Vec<Record> {
        (0..count).map(|id| self.record(id as i64)).collect()
    }

    fn fields(&mut self) -> Fields {
        Fields {
            date: self.date_between(range_start(), range_end()),
            merchant: self.pick(&MERCHANTS),
            category: self.pick(&CATEGORIES),
            amount: self.amount(),
            status: TransactionStatus::ALL[self.rng.int_n(TransactionStatus::ALL.len())],
            description: self.pick(&DESCRIPTIONS),
        }
    }

    fn pick(&mut self, items: &'static [&'static str]) -> &'static str {
        items[self.rng.int_n(items.len())]
    }

    fn amount(&mut self) -> f64 {
        let cents = self.rng.next_u64() % (MAX_AMOUNT_CENTS + 1);
        cents as f64 / 100.0
    }

    fn date_between(&mut self, start: OffsetDateTime, end: OffsetDateTime) -> OffsetDateTime {
        let start_ms = start.unix_timestamp_nanos() / 1_000_000;
        let end_ms = end.unix_timestamp_nanos() / 1_000_000;
        if end_ms <= start_ms {
            return start;
        }
        let span = (end_ms - start_ms) as u64;
        let offset = i128::from(self.rng.next_u64() % (span + 1));
        OffsetDateTime::from_unix_timestamp_nanos((start_ms + offset) * 1_000_000).unwrap_or(start)
    }
}

pub fn write_dataset(path: &Path, rows: &[Transaction]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("create dataset {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    vgrid_app::encode_transactions(&mut writer, rows)
        .with_context(|| format!("encode dataset {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush dataset {}", path.display()))?;
    Ok(())
}

pub fn write_raw_dataset(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

pub fn temp_dataset_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("transactions.json");
    Ok((dir, path))
}

/// Rows covering the degraded shapes the loader has to tolerate.
pub fn malformed_dataset_json() -> &'static str {
    r#"[
  {"id": 0, "date": "2022-03-04T05:06:07.000Z", "merchant": "Target", "category": "Clothing",
   "amount": 19.99, "status": "Completed", "description": "In-store transaction"},
  {"id": "one", "date": "yesterday", "merchant": "Costco", "amount": "12.50",
   "status": "Refunded", "description": null},
  {}
]"#
}

pub fn merchants() -> &'static [&'static str] {
    &MERCHANTS
}

pub fn categories() -> &'static [&'static str] {
    &CATEGORIES
}

pub fn descriptions() -> &'static [&'static str] {
    &DESCRIPTIONS
}

fn range_start() -> OffsetDateTime {
    midnight_utc(2020, Month::January, 1)
}

fn range_end() -> OffsetDateTime {
    midnight_utc(2024, Month::December, 31)
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    match Date::from_calendar_date(year, month, day) {
        Ok(date) => date.with_time(Time::MIDNIGHT).assume_utc(),
        Err(_) => OffsetDateTime::UNIX_EPOCH,
    }
}
