// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashMap;

use crate::columns::ColumnKey;
use crate::ids::RecordId;
use crate::model::{CellValue, Record};

/// A cell addressed by its position in the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: usize,
    pub column: ColumnKey,
}

impl CellRef {
    pub const fn new(row: usize, column: ColumnKey) -> Self {
        Self { row, column }
    }
}

/// Base records plus the in-session edit overlay.
///
/// `revision` changes whenever the base sequence or the overlay changes, so
/// consumers can tell whether a previously derived result is still current.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    base: Vec<Record>,
    overlay: HashMap<CellRef, CellValue>,
    revision: u64,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            base: records,
            overlay: HashMap::new(),
            revision: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn working_copy(&self) -> WorkingCopy<'_> {
        WorkingCopy {
            base: &self.base,
            overlay: &self.overlay,
        }
    }

    /// Writes `value` into the cell as raw text; the column's type is not
    /// checked. Positions past the end are ignored.
    pub fn commit_edit(&mut self, row: usize, column: ColumnKey, value: impl Into<String>) {
        if row >= self.base.len() {
            tracing::warn!(row, len = self.base.len(), "edit outside working copy ignored");
            return;
        }
        let value = value.into();
        tracing::debug!(row, column = column.as_str(), "edit committed");
        self.overlay
            .insert(CellRef::new(row, column), CellValue::Raw(value));
        self.revision = self.revision.wrapping_add(1);
    }

    /// Swaps in a new base sequence. Edits made against the old one are
    /// dropped.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.base = records;
        self.overlay.clear();
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn edit_count(&self) -> usize {
        self.overlay.len()
    }

    pub fn edited_value(&self, row: usize, column: ColumnKey) -> Option<&CellValue> {
        self.overlay.get(&CellRef::new(row, column))
    }
}

/// The record sequence with the overlay applied, read on demand.
#[derive(Debug, Clone, Copy)]
pub struct WorkingCopy<'a> {
    base: &'a [Record],
    overlay: &'a HashMap<CellRef, CellValue>,
}

impl<'a> WorkingCopy<'a> {
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn value(&self, row: usize, column: ColumnKey) -> &'a CellValue {
        if !self.overlay.is_empty()
            && let Some(edited) = self.overlay.get(&CellRef::new(row, column))
        {
            return edited;
        }
        self.base[row].get(column)
    }

    pub fn record_id(&self, row: usize) -> RecordId {
        self.base[row].id()
    }

    /// The record at `row` with its edits applied.
    pub fn record(&self, row: usize) -> Record {
        let mut record = self.base[row].clone();
        if self.overlay.is_empty() {
            return record;
        }
        for column in ColumnKey::ALL {
            if let Some(edited) = self.overlay.get(&CellRef::new(row, column)) {
                record.set(column, edited.clone());
            }
        }
        record
    }
}
