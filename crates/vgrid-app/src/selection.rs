// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a selected row remembers.
///
/// `Position` keeps derived-sequence indices, so after a re-sort the
/// highlight stays on the same screen position. `Identity` keeps the rows'
/// working-copy positions and follows the records instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTracking {
    #[default]
    Position,
    Identity,
}

impl SelectionTracking {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Identity => "identity",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "position" => Some(Self::Position),
            "identity" => Some(Self::Identity),
            _ => None,
        }
    }
}

/// Selected rows.
///
/// `Sources` holds working-copy positions. Every loaded row has exactly one,
/// whatever its `id` field says, so duplicate or missing ids never select
/// two rows at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Positions(BTreeSet<usize>),
    Sources(BTreeSet<usize>),
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(SelectionTracking::default())
    }
}

impl Selection {
    pub fn new(tracking: SelectionTracking) -> Self {
        match tracking {
            SelectionTracking::Position => Self::Positions(BTreeSet::new()),
            SelectionTracking::Identity => Self::Sources(BTreeSet::new()),
        }
    }

    /// Plain click replaces the selection; modifier click toggles one row.
    /// `index` is the derived position, `source` the working-copy position.
    pub fn click(&mut self, index: usize, source: usize, modifier: bool) {
        match self {
            Self::Positions(set) => click_in(set, index, modifier),
            Self::Sources(set) => click_in(set, source, modifier),
        }
    }

    pub fn is_selected(&self, index: usize, source: usize) -> bool {
        match self {
            Self::Positions(set) => set.contains(&index),
            Self::Sources(set) => set.contains(&source),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Positions(set) => set.len(),
            Self::Sources(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        match self {
            Self::Positions(set) => set.clear(),
            Self::Sources(set) => set.clear(),
        }
    }

    /// Selected positions that still exist in a derived sequence of `len`
    /// rows. Only meaningful for positional tracking.
    pub fn positions_within(&self, len: usize) -> Vec<usize> {
        match self {
            Self::Positions(set) => set.range(..len).copied().collect(),
            Self::Sources(_) => Vec::new(),
        }
    }

    /// Selected working-copy positions. Only meaningful for identity
    /// tracking.
    pub fn sources(&self) -> Vec<usize> {
        match self {
            Self::Positions(_) => Vec::new(),
            Self::Sources(set) => set.iter().copied().collect(),
        }
    }
}

fn click_in<T: Ord>(set: &mut BTreeSet<T>, item: T, modifier: bool) {
    if !modifier {
        set.clear();
        set.insert(item);
    } else if !set.remove(&item) {
        set.insert(item);
    }
}
