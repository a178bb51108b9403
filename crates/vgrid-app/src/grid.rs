// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The grid engine: store, pipeline, window and interaction state wired
//! together behind one input boundary.
//!
//! Time is passed in by the caller, so debounce and frame behavior can be
//! driven deterministically.

use std::time::{Duration, Instant};

use crate::columns::ColumnKey;
use crate::format::{format_cell, row_count_label};
use crate::ids::RecordId;
use crate::metrics::{MetricsSink, NullSink, RenderMetrics};
use crate::model::{Record, TransactionStatus};
use crate::pipeline::{DerivedView, Pipeline};
use crate::selection::SelectionTracking;
use crate::state::{GridCommand, GridEvent, GridState};
use crate::store::{CellRef, RecordStore};
use crate::timers::{DEFAULT_FILTER_DEBOUNCE, Debouncer};
use crate::window::{
    DEFAULT_VIEWPORT_HEIGHT, ScrollCoalescer, Window, WindowSpec, compute_window,
    first_visible_row,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub window: WindowSpec,
    pub viewport_height: f64,
    pub filter_debounce: Duration,
    pub selection_tracking: SelectionTracking,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            window: WindowSpec::default(),
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            filter_debounce: DEFAULT_FILTER_DEBOUNCE,
            selection_tracking: SelectionTracking::default(),
        }
    }
}

/// Events arriving from the presentation layer. Row indices are positions
/// in the derived sequence, as displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum GridInput {
    Scroll(f64),
    Resize(f64),
    HeaderClick(ColumnKey),
    PinToggle(ColumnKey),
    QuickFilterClick(TransactionStatus),
    FilterTextChanged { column: ColumnKey, text: String },
    RowClick { index: usize, modifier: bool },
    CellDoubleClick { index: usize, column: ColumnKey },
    EditTextChanged(String),
    EditCommit,
    EditCancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub column: ColumnKey,
    pub text: String,
    pub pinned: bool,
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub index: usize,
    pub source: usize,
    pub record: RecordId,
    pub selected: bool,
    pub cells: Vec<CellView>,
}

impl RowView {
    pub fn cell(&self, column: ColumnKey) -> Option<&CellView> {
        self.cells.iter().find(|cell| cell.column == column)
    }
}

pub struct Grid<S = NullSink> {
    store: RecordStore,
    state: GridState,
    pipeline: Pipeline,
    view: DerivedView,
    window: Window,
    spec: WindowSpec,
    filters: Debouncer<ColumnKey, String>,
    scroll: ScrollCoalescer,
    sink: S,
}

impl<S: MetricsSink> Grid<S> {
    pub fn new(records: Vec<Record>, config: GridConfig, sink: S) -> Self {
        let store = RecordStore::new(records);
        let mut state = GridState::new(config.selection_tracking);
        state.dispatch(GridCommand::ResizeViewport(config.viewport_height));
        let mut pipeline = Pipeline::new();
        let view = pipeline.derive(&store.working_copy(), store.revision(), &state.criteria);
        let window = compute_window(
            config.window,
            state.scroll_offset,
            state.viewport_height,
            view.len(),
        );
        tracing::info!(
            rows = store.len(),
            row_height = config.window.row_height,
            buffer_size = config.window.buffer_size,
            "grid ready"
        );
        Self {
            store,
            state,
            pipeline,
            view,
            window,
            spec: config.window,
            filters: Debouncer::new(config.filter_debounce),
            scroll: ScrollCoalescer::new(),
            sink,
        }
    }

    pub fn handle(&mut self, input: GridInput, now: Instant) -> Vec<GridEvent> {
        let command = match input {
            GridInput::Scroll(offset) => {
                self.scroll.push(offset);
                return Vec::new();
            }
            GridInput::FilterTextChanged { column, text } => {
                self.filters.schedule(column, text, now);
                return Vec::new();
            }
            GridInput::Resize(height) => GridCommand::ResizeViewport(height),
            GridInput::HeaderClick(column) => GridCommand::ToggleSort(column),
            GridInput::PinToggle(column) => GridCommand::TogglePin(column),
            GridInput::QuickFilterClick(status) => GridCommand::ToggleQuickFilter(status),
            GridInput::RowClick { index, modifier } => {
                let Some(source) = self.view.source_position(index) else {
                    tracing::debug!(index, len = self.view.len(), "click outside derived rows");
                    return Vec::new();
                };
                GridCommand::ClickRow {
                    index,
                    source,
                    modifier,
                }
            }
            GridInput::CellDoubleClick { index, column } => {
                let Some(source) = self.view.source_position(index) else {
                    return Vec::new();
                };
                let current = self
                    .store
                    .working_copy()
                    .value(source, column)
                    .string_form()
                    .into_owned();
                GridCommand::StartEdit {
                    cell: CellRef::new(source, column),
                    current,
                }
            }
            GridInput::EditTextChanged(value) => GridCommand::UpdateScratch(value),
            GridInput::EditCommit => GridCommand::CommitEdit,
            GridInput::EditCancel => GridCommand::CancelEdit,
        };
        self.apply(command)
    }

    /// Applies every debounced filter whose quiet period has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<GridEvent> {
        let mut events = Vec::new();
        for (column, pattern) in self.filters.fire_due(now) {
            events.extend(self.apply(GridCommand::ApplyFilter { column, pattern }));
        }
        events
    }

    /// Applies the latest coalesced scroll offset, if any arrived since the
    /// previous frame.
    pub fn animation_frame(&mut self) -> Vec<GridEvent> {
        match self.scroll.take() {
            Some(offset) => self.apply(GridCommand::Scroll(offset)),
            None => Vec::new(),
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.scroll.is_pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.filters.next_deadline()
    }

    fn apply(&mut self, command: GridCommand) -> Vec<GridEvent> {
        let events = self.state.dispatch(command);
        let mut rederive = false;
        let mut rewindow = false;
        for event in &events {
            match event {
                GridEvent::EditCommitted { cell, value } => {
                    self.store.commit_edit(cell.row, cell.column, value.as_str());
                }
                GridEvent::Scrolled(_) | GridEvent::ViewportResized(_) => rewindow = true,
                _ => {}
            }
            rederive |= event.changes_derivation();
        }
        if rederive {
            self.refresh();
        } else if rewindow {
            self.recompute_window();
        }
        events
    }

    fn refresh(&mut self) {
        self.view = self.pipeline.derive(
            &self.store.working_copy(),
            self.store.revision(),
            &self.state.criteria,
        );
        self.recompute_window();
    }

    fn recompute_window(&mut self) {
        self.window = compute_window(
            self.spec,
            self.state.scroll_offset,
            self.state.viewport_height,
            self.view.len(),
        );
    }

    /// Swaps the dataset. In-session edits and the selection are dropped.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.store.replace_records(records);
        if let Some(session) = self.state.edit.take() {
            tracing::debug!(row = session.cell.row, "open edit dropped with dataset");
        }
        self.state.selection.clear();
        self.refresh();
    }

    pub fn visible_rows(&self) -> Vec<RowView> {
        let copy = self.store.working_copy();
        (self.window.start..self.window.end)
            .filter_map(|index| {
                let source = self.view.source_position(index)?;
                let record = copy.record_id(source);
                let cells = ColumnKey::ALL
                    .into_iter()
                    .map(|column| {
                        let cell = CellRef::new(source, column);
                        let editing = self.state.is_editing(cell);
                        let text = match &self.state.edit {
                            Some(session) if editing => session.scratch.clone(),
                            _ => format_cell(column, copy.value(source, column)).into_owned(),
                        };
                        CellView {
                            column,
                            text,
                            pinned: self.state.is_pinned(column),
                            editing,
                        }
                    })
                    .collect();
                Some(RowView {
                    index,
                    source,
                    record,
                    selected: self.state.selection.is_selected(index, source),
                    cells,
                })
            })
            .collect()
    }

    pub fn finish_render(&mut self, rendered_rows: usize) {
        self.sink.publish(RenderMetrics {
            rendered_rows,
            scroll_row: first_visible_row(self.spec, self.state.scroll_offset),
            total_rows: self.view.len(),
        });
    }

    pub fn row_count_label(&self) -> String {
        row_count_label(self.view.len(), self.store.len())
    }

    /// The filter text as typed, including input still waiting out the
    /// debounce.
    pub fn filter_text(&self, column: ColumnKey) -> &str {
        self.filters
            .pending_value(&column)
            .map(String::as_str)
            .or_else(|| self.state.criteria.filters.get(column))
            .unwrap_or_default()
    }

    pub const fn state(&self) -> &GridState {
        &self.state
    }

    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    pub const fn view(&self) -> &DerivedView {
        &self.view
    }

    pub const fn window(&self) -> &Window {
        &self.window
    }

    pub const fn window_spec(&self) -> WindowSpec {
        self.spec
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn pipeline_runs(&self) -> u64 {
        self.pipeline.runs()
    }
}
