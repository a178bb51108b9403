// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::columns::ColumnKey;
use crate::model::TransactionStatus;
use crate::pipeline::{Criteria, SortDirection, SortSpec};
use crate::selection::{Selection, SelectionTracking};
use crate::store::CellRef;
use crate::window::DEFAULT_VIEWPORT_HEIGHT;

/// The one cell currently open for editing. `cell.row` is a working-copy
/// position, not a derived index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub cell: CellRef,
    pub scratch: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    pub criteria: Criteria,
    pub selection: Selection,
    pub edit: Option<EditSession>,
    pub pinned: BTreeSet<ColumnKey>,
    pub scroll_offset: f64,
    pub viewport_height: f64,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new(SelectionTracking::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridCommand {
    ToggleSort(ColumnKey),
    ApplyFilter { column: ColumnKey, pattern: String },
    ToggleQuickFilter(TransactionStatus),
    ClickRow {
        index: usize,
        source: usize,
        modifier: bool,
    },
    StartEdit { cell: CellRef, current: String },
    UpdateScratch(String),
    CommitEdit,
    CancelEdit,
    TogglePin(ColumnKey),
    Scroll(f64),
    ResizeViewport(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    SortChanged(SortSpec),
    FilterApplied { column: ColumnKey, pattern: String },
    QuickFilterChanged(Option<TransactionStatus>),
    SelectionChanged,
    EditStarted(CellRef),
    EditAbandoned(CellRef),
    EditCommitted { cell: CellRef, value: String },
    EditCancelled(CellRef),
    PinToggled { column: ColumnKey, pinned: bool },
    Scrolled(f64),
    ViewportResized(f64),
}

impl GridEvent {
    /// Whether the derived sequence has to be recomputed after this event.
    pub const fn changes_derivation(&self) -> bool {
        matches!(
            self,
            Self::SortChanged(_)
                | Self::FilterApplied { .. }
                | Self::QuickFilterChanged(_)
                | Self::EditCommitted { .. }
        )
    }
}

impl GridState {
    pub fn new(tracking: SelectionTracking) -> Self {
        Self {
            criteria: Criteria::default(),
            selection: Selection::new(tracking),
            edit: None,
            pinned: BTreeSet::new(),
            scroll_offset: 0.0,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }

    pub fn dispatch(&mut self, command: GridCommand) -> Vec<GridEvent> {
        match command {
            GridCommand::ToggleSort(column) => {
                let sort = &mut self.criteria.sort;
                sort.direction = if sort.key == Some(column) {
                    sort.direction.flipped()
                } else {
                    SortDirection::Asc
                };
                sort.key = Some(column);
                vec![GridEvent::SortChanged(*sort)]
            }
            GridCommand::ApplyFilter { column, pattern } => {
                if self.criteria.filters.get(column).unwrap_or_default() == pattern {
                    return Vec::new();
                }
                self.criteria.filters.set(column, pattern.clone());
                vec![GridEvent::FilterApplied { column, pattern }]
            }
            GridCommand::ToggleQuickFilter(status) => {
                let quick = &mut self.criteria.quick_filter;
                *quick = if *quick == Some(status) {
                    None
                } else {
                    Some(status)
                };
                vec![GridEvent::QuickFilterChanged(*quick)]
            }
            GridCommand::ClickRow {
                index,
                source,
                modifier,
            } => {
                self.selection.click(index, source, modifier);
                vec![GridEvent::SelectionChanged]
            }
            GridCommand::StartEdit { cell, current } => {
                let mut events = Vec::new();
                if let Some(previous) = self.edit.take()
                    && previous.cell != cell
                {
                    events.push(GridEvent::EditAbandoned(previous.cell));
                }
                self.edit = Some(EditSession {
                    cell,
                    scratch: current,
                });
                events.push(GridEvent::EditStarted(cell));
                events
            }
            GridCommand::UpdateScratch(value) => {
                if let Some(session) = self.edit.as_mut() {
                    session.scratch = value;
                }
                Vec::new()
            }
            GridCommand::CommitEdit => match self.edit.take() {
                Some(EditSession { cell, scratch }) => vec![GridEvent::EditCommitted {
                    cell,
                    value: scratch,
                }],
                None => Vec::new(),
            },
            GridCommand::CancelEdit => match self.edit.take() {
                Some(session) => vec![GridEvent::EditCancelled(session.cell)],
                None => Vec::new(),
            },
            GridCommand::TogglePin(column) => {
                if !column.spec().pinnable {
                    return Vec::new();
                }
                let pinned = if self.pinned.remove(&column) {
                    false
                } else {
                    self.pinned.insert(column);
                    true
                };
                vec![GridEvent::PinToggled { column, pinned }]
            }
            GridCommand::Scroll(offset) => {
                self.scroll_offset = non_negative(offset);
                vec![GridEvent::Scrolled(self.scroll_offset)]
            }
            GridCommand::ResizeViewport(height) => {
                self.viewport_height = non_negative(height);
                vec![GridEvent::ViewportResized(self.viewport_height)]
            }
        }
    }

    pub fn is_editing(&self, cell: CellRef) -> bool {
        self.edit
            .as_ref()
            .is_some_and(|session| session.cell == cell)
    }

    pub fn is_pinned(&self, column: ColumnKey) -> bool {
        self.pinned.contains(&column)
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}
