// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use vgrid_app::{
    COLUMNS, ColumnKey, FrameRateSampler, Grid, GridEvent, GridInput, MetricsReadout,
    MetricsSink, RenderMetrics, RowView, SortDirection, TransactionStatus,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const STATUS_TTL: Duration = Duration::from_secs(4);
const WHEEL_ROWS: isize = 3;
/// Grid widths are in pixels; the terminal gets one cell per ten.
const PIXELS_PER_CELL: u16 = 10;
const COLUMN_SPACING: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridKeyCommand {
    MoveRow(isize),
    MoveColumn(isize),
    PageDown,
    PageUp,
    JumpFirstRow,
    JumpLastRow,
    Sort,
    Pin,
    QuickFilter(TransactionStatus),
    OpenFilter,
    Select { modifier: bool },
    Edit,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Nav,
    Filter(ColumnKey),
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastClick {
    index: usize,
    column: ColumnKey,
    at: Instant,
}

/// Terminal-side state the grid engine does not own: the cursor, the top
/// line of the table body, and what the user is currently typing into.
#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    mode: InputMode,
    cursor_row: usize,
    cursor_col: usize,
    top_row: usize,
    body: Rect,
    readout: MetricsReadout,
    status: Option<String>,
    status_token: u64,
    last_click: Option<LastClick>,
}

impl ViewData {
    fn body_lines(&self) -> usize {
        usize::from(self.body.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Areas {
    title: Rect,
    table: Rect,
    body: Rect,
    status: Rect,
}

/// Runs the terminal UI until the user quits.
///
/// `metrics_rx` receives whatever the grid's sink publishes after each frame;
/// pass the receiving half of a [`vgrid_app::ChannelSink`].
pub fn run_app<S: MetricsSink>(
    grid: &mut Grid<S>,
    metrics_rx: &Receiver<RenderMetrics>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut tui = Terminal::new(backend).context("create terminal")?;

    tracing::info!(rows = grid.store().len(), "terminal ui started");
    let result = event_loop(&mut tui, grid, metrics_rx);
    if let Err(error) = &result {
        tracing::error!(error = %format!("{error:#}"), "terminal ui failed");
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen)
        .context("leave alternate screen")?;
    result
}

fn event_loop<S: MetricsSink>(
    tui: &mut Terminal<CrosstermBackend<io::Stdout>>,
    grid: &mut Grid<S>,
    metrics_rx: &Receiver<RenderMetrics>,
) -> Result<()> {
    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    let mut sampler = FrameRateSampler::new(Instant::now());

    let (width, height) = terminal::size().context("read terminal size")?;
    resize(grid, &mut view_data, Rect::new(0, 0, width, height), Instant::now());

    loop {
        process_internal_events(&mut view_data, &internal_rx);

        let now = Instant::now();
        if !grid.tick(now).is_empty() {
            clamp_cursor(grid, &mut view_data, now);
        }
        grid.animation_frame();

        let rows = grid.visible_rows();
        tui.draw(|frame| render(frame, grid, &view_data, &rows))
            .context("draw frame")?;
        grid.finish_render(rows.len());

        while let Ok(metrics) = metrics_rx.try_recv() {
            view_data.readout.apply(metrics);
        }
        if let Some(fps) = sampler.record_frame(Instant::now()) {
            view_data.readout.set_fps(fps);
        }

        let timeout = poll_timeout(grid.next_deadline(), Instant::now());
        if !event::poll(timeout).context("poll event")? {
            continue;
        }
        let now = Instant::now();
        match event::read().context("read event")? {
            Event::Key(key) => {
                if handle_key_event(grid, &mut view_data, &internal_tx, key, now) {
                    break;
                }
            }
            Event::Mouse(mouse) => handle_mouse_event(grid, &mut view_data, mouse, now),
            Event::Resize(width, height) => {
                resize(grid, &mut view_data, Rect::new(0, 0, width, height), now);
            }
            _ => {}
        }
    }
    Ok(())
}

fn poll_timeout(next_deadline: Option<Instant>, now: Instant) -> Duration {
    match next_deadline {
        Some(deadline) => deadline
            .saturating_duration_since(now)
            .min(FRAME_INTERVAL),
        None => FRAME_INTERVAL,
    }
}

fn process_internal_events(view_data: &mut ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn layout_areas(area: Rect) -> Areas {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);
    let inner = Block::default().borders(Borders::ALL).inner(layout[1]);
    let body = Rect {
        y: inner.y.saturating_add(1),
        height: inner.height.saturating_sub(1),
        ..inner
    };
    Areas {
        title: layout[0],
        table: layout[1],
        body,
        status: layout[2],
    }
}

fn resize<S: MetricsSink>(grid: &mut Grid<S>, view_data: &mut ViewData, area: Rect, now: Instant) {
    view_data.body = layout_areas(area).body;
    tracing::debug!(
        width = area.width,
        height = area.height,
        body_lines = view_data.body_lines(),
        "terminal resized"
    );
    let row_height = grid.window_spec().row_height;
    grid.handle(
        GridInput::Resize(view_data.body_lines() as f64 * row_height),
        now,
    );
    clamp_cursor(grid, view_data, now);
}

/// Columns in display order: pinned ones first, each group in natural order.
fn display_columns<S>(grid: &Grid<S>) -> Vec<ColumnKey>
where
    S: MetricsSink,
{
    let state = grid.state();
    let (mut pinned, rest): (Vec<_>, Vec<_>) = ColumnKey::ALL
        .into_iter()
        .partition(|column| state.is_pinned(*column));
    pinned.extend(rest);
    pinned
}

fn cursor_column<S: MetricsSink>(grid: &Grid<S>, view_data: &ViewData) -> ColumnKey {
    display_columns(grid)
        .get(view_data.cursor_col)
        .copied()
        .unwrap_or(ColumnKey::Id)
}

fn column_width(column: ColumnKey) -> u16 {
    column.spec().width / PIXELS_PER_CELL
}

fn column_at<S: MetricsSink>(grid: &Grid<S>, view_data: &ViewData, x: u16) -> Option<ColumnKey> {
    let mut left = view_data.body.x;
    for column in display_columns(grid) {
        let right = left.saturating_add(column_width(column));
        if (left..right).contains(&x) {
            return Some(column);
        }
        left = right.saturating_add(COLUMN_SPACING);
    }
    None
}

/// Moves the top line so the cursor stays on screen and tells the grid the
/// new scroll offset.
fn follow_cursor<S: MetricsSink>(grid: &mut Grid<S>, view_data: &mut ViewData, now: Instant) {
    let lines = view_data.body_lines().max(1);
    let top = if view_data.cursor_row < view_data.top_row {
        view_data.cursor_row
    } else if view_data.cursor_row >= view_data.top_row + lines {
        view_data.cursor_row + 1 - lines
    } else {
        view_data.top_row
    };
    set_top_row(grid, view_data, top, now);
}

fn set_top_row<S: MetricsSink>(
    grid: &mut Grid<S>,
    view_data: &mut ViewData,
    top: usize,
    now: Instant,
) {
    if top == view_data.top_row {
        return;
    }
    view_data.top_row = top;
    let offset = top as f64 * grid.window_spec().row_height;
    grid.handle(GridInput::Scroll(offset), now);
}

fn clamp_cursor<S: MetricsSink>(grid: &mut Grid<S>, view_data: &mut ViewData, now: Instant) {
    let len = grid.view().len();
    let last = len.saturating_sub(1);
    view_data.cursor_row = view_data.cursor_row.min(last);
    let lines = view_data.body_lines().max(1);
    let max_top = len.saturating_sub(lines);
    if view_data.top_row > max_top {
        set_top_row(grid, view_data, max_top, now);
    }
    follow_cursor(grid, view_data, now);
}

fn move_row<S: MetricsSink>(grid: &mut Grid<S>, view_data: &mut ViewData, delta: isize, now: Instant) {
    let last = grid.view().len().saturating_sub(1);
    view_data.cursor_row = view_data.cursor_row.saturating_add_signed(delta).min(last);
    follow_cursor(grid, view_data, now);
}

fn scroll_lines<S: MetricsSink>(
    grid: &mut Grid<S>,
    view_data: &mut ViewData,
    delta: isize,
    now: Instant,
) {
    let max_top = grid.view().len().saturating_sub(view_data.body_lines().max(1));
    let top = view_data.top_row.saturating_add_signed(delta).min(max_top);
    set_top_row(grid, view_data, top, now);
}

fn grid_command_for_key(key: KeyEvent) -> Option<GridKeyCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(GridKeyCommand::Quit)
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(GridKeyCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(GridKeyCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(GridKeyCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(GridKeyCommand::MoveColumn(1)),
        (KeyCode::PageDown, _) => Some(GridKeyCommand::PageDown),
        (KeyCode::PageUp, _) => Some(GridKeyCommand::PageUp),
        (KeyCode::Char('g'), _) => Some(GridKeyCommand::JumpFirstRow),
        (KeyCode::Char('G'), _) => Some(GridKeyCommand::JumpLastRow),
        (KeyCode::Char('s'), _) => Some(GridKeyCommand::Sort),
        (KeyCode::Char('p'), _) => Some(GridKeyCommand::Pin),
        (KeyCode::Char('1'), _) => Some(GridKeyCommand::QuickFilter(TransactionStatus::Completed)),
        (KeyCode::Char('2'), _) => Some(GridKeyCommand::QuickFilter(TransactionStatus::Pending)),
        (KeyCode::Char('3'), _) => Some(GridKeyCommand::QuickFilter(TransactionStatus::Failed)),
        (KeyCode::Char('/'), _) => Some(GridKeyCommand::OpenFilter),
        (KeyCode::Char(' '), _) => Some(GridKeyCommand::Select { modifier: false }),
        (KeyCode::Char('x'), _) => Some(GridKeyCommand::Select { modifier: true }),
        (KeyCode::Char('e'), _) | (KeyCode::Enter, _) => Some(GridKeyCommand::Edit),
        (KeyCode::Char('q'), _) => Some(GridKeyCommand::Quit),
        _ => None,
    }
}

/// Returns `true` when the app should exit.
fn handle_key_event<S: MetricsSink>(
    grid: &mut Grid<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) -> bool {
    match view_data.mode {
        InputMode::Nav => {
            let Some(command) = grid_command_for_key(key) else {
                return false;
            };
            apply_key_command(grid, view_data, internal_tx, command, now)
        }
        InputMode::Filter(column) => {
            handle_filter_key(grid, view_data, column, key, now);
            false
        }
        InputMode::Edit => {
            handle_edit_key(grid, view_data, key, now);
            false
        }
    }
}

fn apply_key_command<S: MetricsSink>(
    grid: &mut Grid<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: GridKeyCommand,
    now: Instant,
) -> bool {
    let page = view_data.body_lines().max(1) as isize;
    match command {
        GridKeyCommand::Quit => return true,
        GridKeyCommand::MoveRow(delta) => move_row(grid, view_data, delta, now),
        GridKeyCommand::PageDown => move_row(grid, view_data, page, now),
        GridKeyCommand::PageUp => move_row(grid, view_data, -page, now),
        GridKeyCommand::JumpFirstRow => {
            view_data.cursor_row = 0;
            follow_cursor(grid, view_data, now);
        }
        GridKeyCommand::JumpLastRow => {
            view_data.cursor_row = grid.view().len().saturating_sub(1);
            follow_cursor(grid, view_data, now);
        }
        GridKeyCommand::MoveColumn(delta) => {
            let last = ColumnKey::ALL.len() - 1;
            view_data.cursor_col = view_data.cursor_col.saturating_add_signed(delta).min(last);
        }
        GridKeyCommand::Sort => {
            let column = cursor_column(grid, view_data);
            let events = grid.handle(GridInput::HeaderClick(column), now);
            clamp_cursor(grid, view_data, now);
            if let Some(message) = status_for_events(&events) {
                emit_status(view_data, internal_tx, message);
            }
        }
        GridKeyCommand::Pin => {
            let column = cursor_column(grid, view_data);
            let events = grid.handle(GridInput::PinToggle(column), now);
            // Keep the cursor on the same column after the reorder.
            if let Some(index) = display_columns(grid).iter().position(|key| *key == column) {
                view_data.cursor_col = index;
            }
            let message = status_for_events(&events)
                .unwrap_or_else(|| format!("{} cannot be pinned", column.spec().label));
            emit_status(view_data, internal_tx, message);
        }
        GridKeyCommand::QuickFilter(status) => {
            let events = grid.handle(GridInput::QuickFilterClick(status), now);
            clamp_cursor(grid, view_data, now);
            if let Some(message) = status_for_events(&events) {
                emit_status(view_data, internal_tx, message);
            }
        }
        GridKeyCommand::OpenFilter => {
            view_data.mode = InputMode::Filter(cursor_column(grid, view_data));
        }
        GridKeyCommand::Select { modifier } => {
            grid.handle(
                GridInput::RowClick {
                    index: view_data.cursor_row,
                    modifier,
                },
                now,
            );
        }
        GridKeyCommand::Edit => {
            let column = cursor_column(grid, view_data);
            start_edit(grid, view_data, view_data.cursor_row, column, now);
        }
    }
    false
}

fn start_edit<S: MetricsSink>(
    grid: &mut Grid<S>,
    view_data: &mut ViewData,
    index: usize,
    column: ColumnKey,
    now: Instant,
) {
    let events = grid.handle(GridInput::CellDoubleClick { index, column }, now);
    if events
        .iter()
        .any(|event| matches!(event, GridEvent::EditStarted(_)))
    {
        view_data.mode = InputMode::Edit;
    }
}

fn handle_filter_key<S: MetricsSink>(
    grid: &mut Grid<S>,
    view_data: &mut ViewData,
    column: ColumnKey,
    key: KeyEvent,
    now: Instant,
) {
    let mut text = grid.filter_text(column).to_owned();
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            view_data.mode = InputMode::Nav;
            return;
        }
        KeyCode::Backspace => {
            if text.pop().is_none() {
                return;
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => text.push(ch),
        _ => return,
    }
    grid.handle(GridInput::FilterTextChanged { column, text }, now);
}

fn handle_edit_key<S: MetricsSink>(
    grid: &mut Grid<S>,
    view_data: &mut ViewData,
    key: KeyEvent,
    now: Instant,
) {
    let Some(session) = grid.state().edit.as_ref() else {
        view_data.mode = InputMode::Nav;
        return;
    };
    let mut scratch = session.scratch.clone();
    match key.code {
        KeyCode::Enter => {
            grid.handle(GridInput::EditCommit, now);
            view_data.mode = InputMode::Nav;
            clamp_cursor(grid, view_data, now);
        }
        KeyCode::Esc => {
            grid.handle(GridInput::EditCancel, now);
            view_data.mode = InputMode::Nav;
        }
        KeyCode::Backspace => {
            scratch.pop();
            grid.handle(GridInput::EditTextChanged(scratch), now);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            scratch.push(ch);
            grid.handle(GridInput::EditTextChanged(scratch), now);
        }
        _ => {}
    }
}

fn handle_mouse_event<S: MetricsSink>(
    grid: &mut Grid<S>,
    view_data: &mut ViewData,
    mouse: MouseEvent,
    now: Instant,
) {
    match mouse.kind {
        MouseEventKind::ScrollDown => scroll_lines(grid, view_data, WHEEL_ROWS, now),
        MouseEventKind::ScrollUp => scroll_lines(grid, view_data, -WHEEL_ROWS, now),
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(column) = column_at(grid, view_data, mouse.column) else {
                return;
            };
            if mouse.row + 1 == view_data.body.y {
                grid.handle(GridInput::HeaderClick(column), now);
                clamp_cursor(grid, view_data, now);
                return;
            }
            if row_at(view_data, mouse.row).is_none() {
                return;
            }
            // Committing can drop the edited row from the view.
            if view_data.mode == InputMode::Edit {
                grid.handle(GridInput::EditCommit, now);
                view_data.mode = InputMode::Nav;
                clamp_cursor(grid, view_data, now);
            }
            let Some(index) = row_at(view_data, mouse.row) else {
                return;
            };
            if index >= grid.view().len() {
                return;
            }

            let click = LastClick {
                index,
                column,
                at: now,
            };
            let double = view_data.last_click.is_some_and(|last| {
                last.index == index
                    && last.column == column
                    && now.saturating_duration_since(last.at) <= DOUBLE_CLICK_WINDOW
            });
            view_data.cursor_row = index;
            if let Some(position) = display_columns(grid).iter().position(|key| *key == column) {
                view_data.cursor_col = position;
            }

            if double {
                view_data.last_click = None;
                start_edit(grid, view_data, index, column, now);
            } else {
                view_data.last_click = Some(click);
                grid.handle(
                    GridInput::RowClick {
                        index,
                        modifier: mouse.modifiers.contains(KeyModifiers::CONTROL),
                    },
                    now,
                );
            }
        }
        _ => {}
    }
}

fn row_at(view_data: &ViewData, y: u16) -> Option<usize> {
    let body = view_data.body;
    if y < body.y || y >= body.y.saturating_add(body.height) {
        return None;
    }
    Some(view_data.top_row + usize::from(y - body.y))
}

fn status_for_events(events: &[GridEvent]) -> Option<String> {
    events.iter().find_map(|event| match event {
        GridEvent::SortChanged(sort) => sort.key.map(|column| {
            let direction = match sort.direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            format!("sort {} {direction}", column.as_str())
        }),
        GridEvent::QuickFilterChanged(Some(status)) => {
            Some(format!("quick filter {}", status.as_str()))
        }
        GridEvent::QuickFilterChanged(None) => Some("quick filter off".to_owned()),
        GridEvent::PinToggled { column, pinned } => Some(format!(
            "{} {}",
            column.as_str(),
            if *pinned { "pinned" } else { "unpinned" }
        )),
        _ => None,
    })
}

fn render<S: MetricsSink>(
    frame: &mut ratatui::Frame<'_>,
    grid: &Grid<S>,
    view_data: &ViewData,
    rows: &[RowView],
) {
    let areas = layout_areas(frame.area());

    let title = Paragraph::new(title_text(grid, view_data))
        .block(Block::default().title("vgrid").borders(Borders::ALL));
    frame.render_widget(title, areas.title);

    render_table(frame, areas.table, grid, view_data, rows);

    let status = Paragraph::new(status_text(view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, areas.status);

    let overlay = metrics_overlay_area(frame.area());
    frame.render_widget(Clear, overlay);
    let metrics = Paragraph::new(metrics_overlay_text(&view_data.readout)).block(
        Block::default()
            .title("Performance Monitor")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(metrics, overlay);
}

fn render_table<S: MetricsSink>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    grid: &Grid<S>,
    view_data: &ViewData,
    rows: &[RowView],
) {
    let columns = display_columns(grid);
    let widths = columns
        .iter()
        .map(|column| Constraint::Length(column_width(*column)))
        .collect::<Vec<_>>();

    let header = Row::new(columns.iter().map(|column| {
        Cell::from(header_label(grid, *column)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let cursor_column = columns.get(view_data.cursor_col).copied();
    let body_rows = on_screen_rows(rows, view_data).map(|row| {
        let cursor_row = row.index == view_data.cursor_row;
        let cells = columns
            .iter()
            .map(|column| {
                let Some(cell) = row.cell(*column) else {
                    return Cell::from(String::new());
                };
                let mut style = Style::default();
                if cell.pinned {
                    style = style.fg(Color::Cyan);
                }
                if row.selected {
                    style = style.bg(Color::Blue);
                }
                if cursor_row {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if cursor_row && Some(*column) == cursor_column {
                    style = Style::default().fg(Color::Black).bg(Color::Cyan);
                }
                let text = if cell.editing {
                    style = Style::default().fg(Color::Black).bg(Color::Yellow);
                    format!("{}▏", cell.text)
                } else {
                    cell.text.clone()
                };
                Cell::from(text).style(style)
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let table = Table::new(body_rows, widths)
        .header(header)
        .column_spacing(COLUMN_SPACING)
        .block(
            Block::default()
                .title(grid.row_count_label())
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

/// The materialized rows that fall inside the body, top line first.
fn on_screen_rows<'a>(
    rows: &'a [RowView],
    view_data: &ViewData,
) -> impl Iterator<Item = &'a RowView> + 'a {
    let top = view_data.top_row;
    let bottom = top + view_data.body_lines();
    rows.iter()
        .filter(move |row| (top..bottom).contains(&row.index))
}

fn header_label<S: MetricsSink>(grid: &Grid<S>, column: ColumnKey) -> String {
    let state = grid.state();
    let mut label = column.spec().label.to_owned();
    if state.criteria.sort.key == Some(column) {
        label.push_str(match state.criteria.sort.direction {
            SortDirection::Asc => " ↑",
            SortDirection::Desc => " ↓",
        });
    }
    if !grid.filter_text(column).is_empty() {
        label.push_str(" *");
    }
    if state.is_pinned(column) {
        label.insert_str(0, "📌");
    }
    label
}

fn title_text<S: MetricsSink>(grid: &Grid<S>, view_data: &ViewData) -> String {
    if let InputMode::Filter(column) = view_data.mode {
        return format!(
            "filter {}: {}▏",
            column.spec().label,
            grid.filter_text(column)
        );
    }

    let quick = TransactionStatus::ALL
        .iter()
        .enumerate()
        .map(|(index, status)| {
            if grid.state().criteria.quick_filter == Some(*status) {
                format!("[{} {}]", index + 1, status.as_str())
            } else {
                format!(" {} {} ", index + 1, status.as_str())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let filters = COLUMNS
        .iter()
        .filter_map(|spec| {
            let text = grid.filter_text(spec.key);
            (!text.is_empty()).then(|| format!("{}~{text}", spec.key.as_str()))
        })
        .collect::<Vec<_>>();

    if filters.is_empty() {
        format!("quick:{quick}")
    } else {
        format!("quick:{quick}  filters: {}", filters.join(" "))
    }
}

fn status_text(view_data: &ViewData) -> String {
    if let Some(status) = &view_data.status {
        return status.clone();
    }
    match view_data.mode {
        InputMode::Nav => "j/k rows  h/l cols  s sort  p pin  1-3 quick  / filter  space/x select  e edit  q quit".to_owned(),
        InputMode::Filter(_) => "type to filter  backspace delete  enter/esc close".to_owned(),
        InputMode::Edit => "enter commit  esc cancel".to_owned(),
    }
}

fn metrics_overlay_text(readout: &MetricsReadout) -> String {
    [
        format!("FPS: {}", readout.fps_label()),
        format!("Rendered Rows: {}", readout.rendered_rows_label()),
        format!("Scroll Position: {}", readout.scroll_position_label()),
    ]
    .join("\n")
}

fn metrics_overlay_area(area: Rect) -> Rect {
    let width = 36_u16.min(area.width);
    let height = 5_u16.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 3),
        width,
        height,
    }
}
