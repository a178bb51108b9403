// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Filter and sort over the working copy.
//!
//! The derived sequence is a list of working-copy positions rather than
//! cloned records; [`DerivedView::source_position`] maps a derived index back
//! to the record it shows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::columns::ColumnKey;
use crate::model::TransactionStatus;
use crate::store::WorkingCopy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: Option<ColumnKey>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn by(key: ColumnKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }
}

/// Per-column substring patterns, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    patterns: BTreeMap<ColumnKey, String>,
}

impl FilterSet {
    pub fn set(&mut self, column: ColumnKey, pattern: impl Into<String>) {
        self.patterns.insert(column, pattern.into());
    }

    pub fn get(&self, column: ColumnKey) -> Option<&str> {
        self.patterns.get(&column).map(String::as_str)
    }

    /// Entries that actually constrain rows, with patterns case-folded.
    pub fn active(&self) -> Vec<(ColumnKey, String)> {
        self.patterns
            .iter()
            .filter(|(_, pattern)| !pattern.is_empty())
            .map(|(column, pattern)| (*column, pattern.to_lowercase()))
            .collect()
    }

    pub fn is_active(&self) -> bool {
        self.patterns.values().any(|pattern| !pattern.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Criteria {
    pub filters: FilterSet,
    pub quick_filter: Option<TransactionStatus>,
    pub sort: SortSpec,
}

impl Criteria {
    fn filter_key(&self) -> FilterKey {
        FilterKey {
            quick_filter: self.quick_filter,
            active: self.filters.active(),
        }
    }
}

/// Filters then sorts the working copy. Pure; recomputes everything.
pub fn derive(copy: &WorkingCopy<'_>, criteria: &Criteria) -> Vec<usize> {
    let mut positions = filter_positions(copy, criteria.quick_filter, &criteria.filters.active());
    sort_positions(copy, &mut positions, criteria.sort);
    positions
}

fn filter_positions(
    copy: &WorkingCopy<'_>,
    quick_filter: Option<TransactionStatus>,
    active: &[(ColumnKey, String)],
) -> Vec<usize> {
    if quick_filter.is_none() && active.is_empty() {
        return (0..copy.len()).collect();
    }

    (0..copy.len())
        .filter(|row| match quick_filter {
            Some(status) => copy.value(*row, ColumnKey::Status).matches_status(status),
            None => true,
        })
        .filter(|row| {
            active.iter().all(|(column, pattern)| {
                copy.value(*row, *column)
                    .string_form()
                    .to_lowercase()
                    .contains(pattern.as_str())
            })
        })
        .collect()
}

/// Stable: rows with equal keys keep working-copy order in either
/// direction.
fn sort_positions(copy: &WorkingCopy<'_>, positions: &mut [usize], sort: SortSpec) {
    let Some(column) = sort.key else {
        return;
    };
    positions.sort_by(|left, right| {
        let left_key = copy.value(*left, column).sort_key(column);
        let right_key = copy.value(*right, column).sort_key(column);
        match sort.direction {
            SortDirection::Asc => left_key.cmp(&right_key),
            SortDirection::Desc => right_key.cmp(&left_key),
        }
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedView {
    positions: Arc<[usize]>,
    source_len: usize,
}

impl DerivedView {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Length of the working copy this view was derived from.
    pub const fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn source_position(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied()
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.positions, &other.positions)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterKey {
    quick_filter: Option<TransactionStatus>,
    active: Vec<(ColumnKey, String)>,
}

#[derive(Debug, Clone)]
struct Cached {
    revision: u64,
    filter: FilterKey,
    positions: Arc<[usize]>,
}

/// Memoizing front end to [`derive`].
///
/// Filtered positions are reused while the store revision and the effective
/// filters are unchanged, so a sort change only re-sorts. An unchanged input
/// returns the previous allocation.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    filtered: Option<Cached>,
    sorted: Option<(Cached, SortSpec)>,
    runs: u64,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of derivations that did real work.
    pub const fn runs(&self) -> u64 {
        self.runs
    }

    pub fn derive(
        &mut self,
        copy: &WorkingCopy<'_>,
        revision: u64,
        criteria: &Criteria,
    ) -> DerivedView {
        let filter = criteria.filter_key();

        if let Some((cached, sort)) = &self.sorted
            && cached.revision == revision
            && cached.filter == filter
            && *sort == criteria.sort
        {
            return DerivedView {
                positions: Arc::clone(&cached.positions),
                source_len: copy.len(),
            };
        }

        let started = Instant::now();
        let filtered = match &self.filtered {
            Some(cached) if cached.revision == revision && cached.filter == filter => {
                Arc::clone(&cached.positions)
            }
            _ => {
                let positions: Arc<[usize]> =
                    filter_positions(copy, filter.quick_filter, &filter.active).into();
                self.filtered = Some(Cached {
                    revision,
                    filter: filter.clone(),
                    positions: Arc::clone(&positions),
                });
                positions
            }
        };

        let positions = if criteria.sort.key.is_some() {
            let mut sorted = filtered.to_vec();
            sort_positions(copy, &mut sorted, criteria.sort);
            Arc::from(sorted)
        } else {
            filtered
        };

        self.runs += 1;
        self.sorted = Some((
            Cached {
                revision,
                filter,
                positions: Arc::clone(&positions),
            },
            criteria.sort,
        ));

        tracing::debug!(
            rows = copy.len(),
            derived = positions.len(),
            sort = criteria.sort.key.map(ColumnKey::as_str),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "derived view refreshed"
        );

        DerivedView {
            positions,
            source_len: copy.len(),
        }
    }
}
