// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::columns::ColumnKey;
use crate::ids::RecordId;

const ISO_TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

impl TransactionStatus {
    pub const ALL: [Self; 3] = [Self::Completed, Self::Pending, Self::Failed];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Pending => "Pending",
            Self::Failed => "Failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Completed" => Some(Self::Completed),
            "Pending" => Some(Self::Pending),
            "Failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A single field of a record.
///
/// `Raw` holds a string sitting in a column whose native type is something
/// else: either the source value did not decode, or the cell was edited.
/// Edits always land as `Raw`, whatever the column.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Timestamp(OffsetDateTime),
    Text(String),
    Amount(f64),
    Status(TransactionStatus),
    Raw(String),
    Missing,
}

impl CellValue {
    /// The value as plain text, used for column filters and to seed edits.
    pub fn string_form(&self) -> Cow<'_, str> {
        match self {
            Self::Integer(value) => Cow::Owned(value.to_string()),
            Self::Timestamp(value) => Cow::Owned(iso_timestamp(*value)),
            Self::Text(value) | Self::Raw(value) => Cow::Borrowed(value),
            Self::Amount(value) => Cow::Owned(value.to_string()),
            Self::Status(status) => Cow::Borrowed(status.as_str()),
            Self::Missing => Cow::Borrowed(""),
        }
    }

    pub fn matches_status(&self, status: TransactionStatus) -> bool {
        match self {
            Self::Status(value) => *value == status,
            Self::Raw(value) | Self::Text(value) => value == status.as_str(),
            _ => false,
        }
    }

    /// Key under the column's natural ordering.
    pub fn sort_key(&self, column: ColumnKey) -> SortKey<'_> {
        match self {
            Self::Integer(value) => SortKey::Integer(*value),
            Self::Amount(value) => SortKey::Number(*value),
            Self::Timestamp(value) => SortKey::Instant(*value),
            Self::Status(status) => SortKey::Text(status.as_str()),
            Self::Text(value) => SortKey::Text(value),
            Self::Raw(value) => raw_sort_key(value, column),
            Self::Missing => SortKey::Missing,
        }
    }
}

fn raw_sort_key(value: &str, column: ColumnKey) -> SortKey<'_> {
    if column.is_numeric()
        && let Ok(integer) = value.trim().parse::<i64>()
    {
        return SortKey::Integer(integer);
    }
    if column.is_numeric()
        && let Ok(number) = value.trim().parse::<f64>()
        && number.is_finite()
    {
        return SortKey::Number(number);
    }
    if column == ColumnKey::Date
        && let Some(instant) = parse_timestamp(value)
    {
        return SortKey::Instant(instant);
    }
    SortKey::Text(value)
}

/// Total order used by the sort step: numbers, then instants, then text,
/// then missing values. Integers and floats share one numeric class and
/// compare exactly against each other.
#[derive(Debug, Clone, Copy)]
pub enum SortKey<'a> {
    Integer(i64),
    Number(f64),
    Instant(OffsetDateTime),
    Text(&'a str),
    Missing,
}

impl SortKey<'_> {
    const fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) | Self::Number(_) => 0,
            Self::Instant(_) => 1,
            Self::Text(_) => 2,
            Self::Missing => 3,
        }
    }
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(left), Self::Integer(right)) => left.cmp(right),
            (Self::Integer(left), Self::Number(right)) => cmp_integer_float(*left, *right),
            (Self::Number(left), Self::Integer(right)) => {
                cmp_integer_float(*right, *left).reverse()
            }
            // -0.0 and 0.0 are equal so that both stay equal to integer zero.
            (Self::Number(left), Self::Number(right)) if left == right => Ordering::Equal,
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Instant(left), Self::Instant(right)) => left.cmp(right),
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Compares without rounding the integer through `f64`. NaN sorts the way
/// `f64::total_cmp` places it: positive NaN above everything, negative below.
fn cmp_integer_float(integer: i64, float: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= TWO_POW_63 {
        return Ordering::Less;
    }
    if float < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match integer.cmp(&(whole as i64)) {
        Ordering::Equal if float > whole => Ordering::Less,
        Ordering::Equal if float < whole => Ordering::Greater,
        ordering => ordering,
    }
}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey<'_> {}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    cells: [CellValue; 7],
}

impl Record {
    pub fn new(id: RecordId, cells: [CellValue; 7]) -> Self {
        Self { id, cells }
    }

    /// Stable identity, independent of later edits to the `id` cell.
    pub const fn id(&self) -> RecordId {
        self.id
    }

    pub fn get(&self, column: ColumnKey) -> &CellValue {
        &self.cells[column.index()]
    }

    pub fn set(&mut self, column: ColumnKey, value: CellValue) {
        self.cells[column.index()] = value;
    }

    pub fn cells(&self) -> &[CellValue; 7] {
        &self.cells
    }
}

/// Well-formed dataset row, as the generator writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: String,
    pub merchant: String,
    pub category: String,
    pub amount: f64,
    pub status: TransactionStatus,
    pub description: String,
}

impl From<Transaction> for Record {
    fn from(value: Transaction) -> Self {
        let date = match parse_timestamp(&value.date) {
            Some(instant) => CellValue::Timestamp(instant),
            None => CellValue::Raw(value.date),
        };
        Self::new(
            RecordId::new(value.id),
            [
                CellValue::Integer(value.id),
                date,
                CellValue::Text(value.merchant),
                CellValue::Text(value.category),
                CellValue::Amount(value.amount),
                CellValue::Status(value.status),
                CellValue::Text(value.description),
            ],
        )
    }
}

pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value.trim(), &Rfc3339).ok()
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`, always in UTC.
pub fn iso_timestamp(value: OffsetDateTime) -> String {
    value
        .to_offset(UtcOffset::UTC)
        .format(ISO_TIMESTAMP)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{CellValue, Record, SortKey, Transaction, TransactionStatus, iso_timestamp};
    use crate::{ColumnKey, RecordId};
    use time::macros::datetime;

    fn sample_transaction() -> Transaction {
        Transaction {
            id: 7,
            date: "2023-04-05T06:07:08.090Z".to_owned(),
            merchant: "Costco".to_owned(),
            category: "Groceries".to_owned(),
            amount: 1234.5,
            status: TransactionStatus::Pending,
            description: "Online purchase".to_owned(),
        }
    }

    #[test]
    fn transaction_converts_to_typed_cells() {
        let record = Record::from(sample_transaction());
        assert_eq!(record.id(), RecordId::new(7));
        assert_eq!(record.get(ColumnKey::Id), &CellValue::Integer(7));
        assert_eq!(
            record.get(ColumnKey::Date),
            &CellValue::Timestamp(datetime!(2023-04-05 06:07:08.09 UTC))
        );
        assert_eq!(
            record.get(ColumnKey::Status),
            &CellValue::Status(TransactionStatus::Pending)
        );
    }

    #[test]
    fn unparsable_date_is_kept_as_raw_text() {
        let mut transaction = sample_transaction();
        transaction.date = "last tuesday".to_owned();
        let record = Record::from(transaction);
        assert_eq!(
            record.get(ColumnKey::Date),
            &CellValue::Raw("last tuesday".to_owned())
        );
    }

    #[test]
    fn string_form_matches_dataset_text() {
        let record = Record::from(sample_transaction());
        assert_eq!(record.get(ColumnKey::Id).string_form(), "7");
        assert_eq!(
            record.get(ColumnKey::Date).string_form(),
            "2023-04-05T06:07:08.090Z"
        );
        assert_eq!(record.get(ColumnKey::Amount).string_form(), "1234.5");
        assert_eq!(record.get(ColumnKey::Status).string_form(), "Pending");
        assert_eq!(CellValue::Missing.string_form(), "");
    }

    #[test]
    fn iso_timestamp_normalizes_to_utc() {
        let instant = datetime!(2024-12-31 23:00:00 -02:00);
        assert_eq!(iso_timestamp(instant), "2025-01-01T01:00:00.000Z");
    }

    #[test]
    fn raw_status_text_still_matches_quick_filter() {
        let raw = CellValue::Raw("Failed".to_owned());
        assert!(raw.matches_status(TransactionStatus::Failed));
        assert!(!raw.matches_status(TransactionStatus::Pending));
        assert!(CellValue::Status(TransactionStatus::Pending).matches_status(TransactionStatus::Pending));
    }

    #[test]
    fn raw_numbers_sort_with_amounts() {
        let edited = CellValue::Raw("12.5".to_owned());
        let amount = CellValue::Amount(100.0);
        assert!(edited.sort_key(ColumnKey::Amount) < amount.sort_key(ColumnKey::Amount));

        // Outside numeric columns the same text sorts lexicographically.
        assert!(matches!(
            edited.sort_key(ColumnKey::Merchant),
            SortKey::Text("12.5")
        ));
    }

    #[test]
    fn sort_key_classes_form_a_total_order() {
        let number = SortKey::Number(1.0);
        let instant = SortKey::Instant(datetime!(2020-01-01 00:00 UTC));
        let text = SortKey::Text("a");
        assert!(number < instant);
        assert!(instant < text);
        assert!(text < SortKey::Missing);
        assert_eq!(SortKey::Number(f64::NAN), SortKey::Number(f64::NAN));
    }

    #[test]
    fn large_ids_sort_exactly() {
        let above = CellValue::Integer((1 << 53) + 1);
        let at = CellValue::Integer(1 << 53);
        assert!(at.sort_key(ColumnKey::Id) < above.sort_key(ColumnKey::Id));

        let edited = CellValue::Raw("9007199254740993".to_owned());
        assert!(matches!(
            edited.sort_key(ColumnKey::Id),
            SortKey::Integer(9_007_199_254_740_993)
        ));
        assert!(at.sort_key(ColumnKey::Id) < edited.sort_key(ColumnKey::Id));
    }

    #[test]
    fn integers_and_floats_compare_exactly() {
        let boundary = 9_007_199_254_740_992.0_f64;
        assert!(SortKey::Integer((1 << 53) + 1) > SortKey::Number(boundary));
        assert_eq!(SortKey::Integer(1 << 53), SortKey::Number(boundary));
        assert!(SortKey::Integer(2) > SortKey::Number(1.5));
        assert!(SortKey::Integer(-2) < SortKey::Number(-1.5));
        assert!(SortKey::Number(-0.5) < SortKey::Integer(0));
        assert_eq!(SortKey::Number(-0.0), SortKey::Integer(0));
        assert!(SortKey::Integer(i64::MAX) < SortKey::Number(f64::INFINITY));
        assert!(SortKey::Integer(i64::MIN) > SortKey::Number(f64::NEG_INFINITY));
        assert!(SortKey::Integer(i64::MAX) < SortKey::Number(f64::NAN));
        assert!(SortKey::Integer(0) < SortKey::Instant(datetime!(2020-01-01 00:00 UTC)));
    }
}
