// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::borrow::Cow;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::columns::ColumnKey;
use crate::model::{CellValue, parse_timestamp};

pub const INVALID_DATE: &str = "Invalid Date";

const DISPLAY_DATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
);

/// Display text for a cell. Never fails: values that do not fit the
/// column's format are shown as-is or as [`INVALID_DATE`].
pub fn format_cell(column: ColumnKey, value: &CellValue) -> Cow<'_, str> {
    match (column, value) {
        (_, CellValue::Missing) => Cow::Borrowed(""),
        (ColumnKey::Date, CellValue::Timestamp(instant)) => Cow::Owned(display_date(*instant)),
        (ColumnKey::Date, CellValue::Raw(text)) => match parse_timestamp(text) {
            Some(instant) => Cow::Owned(display_date(instant)),
            None => Cow::Borrowed(INVALID_DATE),
        },
        (ColumnKey::Date, _) => Cow::Borrowed(INVALID_DATE),
        (ColumnKey::Amount, CellValue::Amount(amount)) => Cow::Owned(dollars(*amount)),
        (ColumnKey::Amount, CellValue::Raw(text)) => match text.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() => Cow::Owned(dollars(amount)),
            _ => Cow::Borrowed(text.as_str()),
        },
        _ => value.string_form(),
    }
}

fn display_date(instant: OffsetDateTime) -> String {
    instant
        .to_offset(UtcOffset::UTC)
        .format(DISPLAY_DATE)
        .unwrap_or_else(|_| INVALID_DATE.to_owned())
}

fn dollars(amount: f64) -> String {
    format!("${amount:.2}")
}

/// `1234567` → `"1,234,567"`.
pub fn format_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

pub fn row_count_label(shown: usize, total: usize) -> String {
    format!(
        "Showing {} of {} rows",
        format_thousands(shown),
        format_thousands(total)
    )
}

#[cfg(test)]
mod tests {
    use super::{format_cell, format_thousands, row_count_label};
    use crate::{CellValue, ColumnKey, TransactionStatus};
    use time::macros::datetime;

    #[test]
    fn dates_render_in_twelve_hour_utc() {
        let morning = CellValue::Timestamp(datetime!(2023-03-04 05:06:07.891 UTC));
        assert_eq!(format_cell(ColumnKey::Date, &morning), "3/4/2023, 5:06:07 AM");

        let evening = CellValue::Timestamp(datetime!(2021-12-25 23:59:00 +01:00));
        assert_eq!(
            format_cell(ColumnKey::Date, &evening),
            "12/25/2021, 10:59:00 PM"
        );

        let midnight = CellValue::Timestamp(datetime!(2020-01-01 00:00:00 UTC));
        assert_eq!(format_cell(ColumnKey::Date, &midnight), "1/1/2020, 12:00:00 AM");
    }

    #[test]
    fn unparsable_dates_render_invalid() {
        let raw = CellValue::Raw("soon".to_owned());
        assert_eq!(format_cell(ColumnKey::Date, &raw), "Invalid Date");
        assert_eq!(
            format_cell(ColumnKey::Date, &CellValue::Raw("2022-06-01T12:00:00Z".to_owned())),
            "6/1/2022, 12:00:00 PM"
        );
    }

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(
            format_cell(ColumnKey::Amount, &CellValue::Amount(1234.5)),
            "$1234.50"
        );
        assert_eq!(format_cell(ColumnKey::Amount, &CellValue::Amount(0.0)), "$0.00");
        assert_eq!(
            format_cell(ColumnKey::Amount, &CellValue::Raw(" 7.126".to_owned())),
            "$7.13"
        );
        assert_eq!(
            format_cell(ColumnKey::Amount, &CellValue::Raw("a lot".to_owned())),
            "a lot"
        );
    }

    #[test]
    fn other_columns_use_string_form() {
        assert_eq!(format_cell(ColumnKey::Id, &CellValue::Integer(42)), "42");
        assert_eq!(
            format_cell(
                ColumnKey::Status,
                &CellValue::Status(TransactionStatus::Completed)
            ),
            "Completed"
        );
        assert_eq!(format_cell(ColumnKey::Merchant, &CellValue::Missing), "");
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(12_345), "12,345");
        assert_eq!(format_thousands(1_000_000), "1,000,000");
        assert_eq!(row_count_label(333_412, 1_000_000), "Showing 333,412 of 1,000,000 rows");
    }
}
