// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Decoding of the dataset file into records.
//!
//! Decoding is lenient per field: a missing field becomes
//! [`CellValue::Missing`] and a value of the wrong JSON type is kept as
//! [`CellValue::Raw`]. Only input that is not a JSON array of objects fails.

use serde::Deserialize;
use serde_json::Value;
use std::io::{Read, Write};

use crate::columns::ColumnKey;
use crate::ids::RecordId;
use crate::model::{CellValue, Record, Transaction, TransactionStatus, parse_timestamp};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireRecord {
    id: Option<Value>,
    date: Option<Value>,
    merchant: Option<Value>,
    category: Option<Value>,
    amount: Option<Value>,
    status: Option<Value>,
    description: Option<Value>,
}

pub fn decode_records<R: Read>(reader: R) -> serde_json::Result<Vec<Record>> {
    let wire: Vec<WireRecord> = serde_json::from_reader(reader)?;
    Ok(records_from_wire(wire))
}

pub fn decode_records_from_slice(bytes: &[u8]) -> serde_json::Result<Vec<Record>> {
    let wire: Vec<WireRecord> = serde_json::from_slice(bytes)?;
    Ok(records_from_wire(wire))
}

pub fn encode_transactions<W: Write>(writer: W, rows: &[Transaction]) -> serde_json::Result<()> {
    serde_json::to_writer(writer, rows)
}

fn records_from_wire(wire: Vec<WireRecord>) -> Vec<Record> {
    let mut degraded = 0_usize;
    let records = wire
        .into_iter()
        .enumerate()
        .map(|(position, row)| {
            let record = record_from_wire(position, row);
            if record
                .cells()
                .iter()
                .any(|cell| matches!(cell, CellValue::Raw(_) | CellValue::Missing))
            {
                degraded += 1;
            }
            record
        })
        .collect::<Vec<_>>();

    if degraded > 0 {
        tracing::warn!(
            rows = records.len(),
            degraded,
            "dataset contains rows with missing or mistyped fields"
        );
    }
    records
}

fn record_from_wire(position: usize, row: WireRecord) -> Record {
    let id = row
        .id
        .as_ref()
        .and_then(Value::as_i64)
        .unwrap_or(position as i64);

    Record::new(
        RecordId::new(id),
        [
            cell_from_json(ColumnKey::Id, row.id),
            cell_from_json(ColumnKey::Date, row.date),
            cell_from_json(ColumnKey::Merchant, row.merchant),
            cell_from_json(ColumnKey::Category, row.category),
            cell_from_json(ColumnKey::Amount, row.amount),
            cell_from_json(ColumnKey::Status, row.status),
            cell_from_json(ColumnKey::Description, row.description),
        ],
    )
}

fn cell_from_json(column: ColumnKey, value: Option<Value>) -> CellValue {
    let Some(value) = value else {
        return CellValue::Missing;
    };

    match (column, value) {
        (_, Value::Null) => CellValue::Missing,
        (ColumnKey::Id, Value::Number(number)) => match number.as_i64() {
            Some(id) => CellValue::Integer(id),
            None => CellValue::Raw(number.to_string()),
        },
        (ColumnKey::Amount, Value::Number(number)) => match number.as_f64() {
            Some(amount) => CellValue::Amount(amount),
            None => CellValue::Raw(number.to_string()),
        },
        (ColumnKey::Date, Value::String(text)) => match parse_timestamp(&text) {
            Some(instant) => CellValue::Timestamp(instant),
            None => CellValue::Raw(text),
        },
        (ColumnKey::Status, Value::String(text)) => match TransactionStatus::parse(&text) {
            Some(status) => CellValue::Status(status),
            None => CellValue::Raw(text),
        },
        (ColumnKey::Merchant | ColumnKey::Category | ColumnKey::Description, Value::String(text)) => {
            CellValue::Text(text)
        }
        (_, Value::String(text)) => CellValue::Raw(text),
        (_, other) => CellValue::Raw(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_records_from_slice, encode_transactions};
    use crate::{CellValue, ColumnKey, RecordId, Transaction, TransactionStatus};

    #[test]
    fn well_formed_rows_decode_to_typed_cells() {
        let json = br#"[
            {"id": 0, "date": "2021-06-01T10:00:00.000Z", "merchant": "Target",
             "category": "Clothing", "amount": 42.1, "status": "Completed",
             "description": "In-store transaction"}
        ]"#;
        let records = decode_records_from_slice(json).expect("decode dataset");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(ColumnKey::Amount), &CellValue::Amount(42.1));
        assert_eq!(
            records[0].get(ColumnKey::Status),
            &CellValue::Status(TransactionStatus::Completed)
        );
        assert!(matches!(
            records[0].get(ColumnKey::Date),
            CellValue::Timestamp(_)
        ));
    }

    #[test]
    fn malformed_fields_degrade_instead_of_failing() {
        let json = br#"[
            {"id": "abc", "date": "not a date", "amount": "12.00", "status": "Refunded",
             "merchant": 17, "description": null}
        ]"#;
        let records = decode_records_from_slice(json).expect("decode dataset");
        let record = &records[0];
        assert_eq!(record.id(), RecordId::new(0), "falls back to position");
        assert_eq!(record.get(ColumnKey::Id), &CellValue::Raw("abc".to_owned()));
        assert_eq!(
            record.get(ColumnKey::Date),
            &CellValue::Raw("not a date".to_owned())
        );
        assert_eq!(
            record.get(ColumnKey::Amount),
            &CellValue::Raw("12.00".to_owned())
        );
        assert_eq!(
            record.get(ColumnKey::Status),
            &CellValue::Raw("Refunded".to_owned())
        );
        assert_eq!(record.get(ColumnKey::Merchant), &CellValue::Raw("17".to_owned()));
        assert_eq!(record.get(ColumnKey::Category), &CellValue::Missing);
        assert_eq!(record.get(ColumnKey::Description), &CellValue::Missing);
    }

    #[test]
    fn non_array_input_is_an_error() {
        assert!(decode_records_from_slice(br#"{"id": 1}"#).is_err());
        assert!(decode_records_from_slice(b"not json").is_err());
    }

    #[test]
    fn encoded_transactions_decode_back() {
        let rows = vec![Transaction {
            id: 3,
            date: "2020-01-01T00:00:00.000Z".to_owned(),
            merchant: "Starbucks".to_owned(),
            category: "Dining".to_owned(),
            amount: 5.25,
            status: TransactionStatus::Failed,
            description: "Monthly billing".to_owned(),
        }];
        let mut buffer = Vec::new();
        encode_transactions(&mut buffer, &rows).expect("encode dataset");
        let records = decode_records_from_slice(&buffer).expect("decode dataset");
        assert_eq!(records[0].id(), RecordId::new(3));
        assert_eq!(
            records[0].get(ColumnKey::Merchant),
            &CellValue::Text("Starbucks".to_owned())
        );
    }
}
