// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use budgetboard_app::pagination::{self, Pagination};
use budgetboard_app::{
    AppCommand, AppEvent, AppMode, AppState, DEFAULT_PAGE_SIZE, EntityKind, FormDraft, FormPayload,
    Record, SearchOptions, SortDirection, SortSpec, TableCommand, TableEvent, TableProjection,
    TableStatus, TableView, ViewChange, form_fields, schema,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::collections::BTreeMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const SELECTED_MARK: &str = "●";
const FILTER_MARK_ACTIVE: &str = "▼";
const COLUMN_FILTER_MARK: &str = "▽";
const INPUT_CURSOR: &str = "▏";

/// Where screen records come from and where new ones go.
pub trait DataSource {
    fn load_records(&mut self, kind: EntityKind) -> Result<Vec<Record>>;
    fn submit_form(&mut self, payload: &FormPayload) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub search: SearchOptions,
    pub page_size: usize,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            search: SearchOptions::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

/// Sort order and page position the host keeps per screen, so they survive
/// switching screens.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SavedView {
    sorting: Vec<SortSpec>,
    pagination: Pagination,
}

impl SavedView {
    fn new(page_size: usize) -> Self {
        Self {
            sorting: Vec::new(),
            pagination: Pagination {
                page_index: 0,
                page_size: pagination::nearest_page_size(page_size),
            },
        }
    }
}

#[derive(Debug)]
struct ScreenView {
    kind: EntityKind,
    table: TableView<Record>,
    records: Vec<Record>,
}

#[derive(Debug, Default)]
struct ViewData {
    options: UiOptions,
    screen: Option<ScreenView>,
    saved: BTreeMap<EntityKind, SavedView>,
    search_input: String,
    goto_input: Option<String>,
    help_visible: bool,
    selected_row: usize,
    selected_col: usize,
    status_token: u64,
    load_error: Option<String>,
}

impl ViewData {
    fn new(options: UiOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

pub fn run_app<S: DataSource>(
    state: &mut AppState,
    source: &mut S,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(options);
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(state, source, &mut view_data) {
        emit_status(
            state,
            &mut view_data,
            &internal_tx,
            format!("load failed: {error:#} -- press r to retry"),
        );
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            if let Event::Key(key) = event::read().context("read event")?
                && handle_key_event(state, source, &mut view_data, &internal_tx, key)
            {
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_table_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    status: Option<TableStatus>,
) {
    if let Some(status) = status {
        emit_status(state, view_data, internal_tx, status.message());
    }
}

fn handle_key_event<S: DataSource>(
    state: &mut AppState,
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    if view_data.goto_input.is_some() {
        handle_goto_key(state, view_data, internal_tx, key);
        return false;
    }

    match state.mode {
        AppMode::Nav => handle_nav_key(state, source, view_data, internal_tx, key),
        AppMode::Search => {
            handle_search_key(state, view_data, internal_tx, key);
            false
        }
        AppMode::Form(_) => {
            handle_form_key(state, source, view_data, internal_tx, key);
            false
        }
    }
}

fn handle_nav_key<S: DataSource>(
    state: &mut AppState,
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if let Some(command) = table_command_for_key(key, view_data) {
        let status = run_table_command(view_data, command);
        emit_table_status(state, view_data, internal_tx, status);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Tab, _) => {
            dispatch_and_refresh(
                state,
                source,
                view_data,
                AppCommand::NextScreen,
                internal_tx,
            );
        }
        (KeyCode::BackTab, _) => {
            dispatch_and_refresh(
                state,
                source,
                view_data,
                AppCommand::PrevScreen,
                internal_tx,
            );
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => move_row(view_data, 1),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => move_row(view_data, -1),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => move_col(view_data, -1),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => move_col(view_data, 1),
        (KeyCode::Char('f'), KeyModifiers::NONE) => {
            let status = toggle_column_filter(view_data);
            emit_table_status(state, view_data, internal_tx, status);
        }
        (KeyCode::Char('/'), _) => {
            dispatch_and_refresh(
                state,
                source,
                view_data,
                AppCommand::OpenSearch,
                internal_tx,
            );
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => {
            if view_data.screen.is_some() {
                view_data.goto_input = Some(String::new());
            }
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => match state.active_screen.form_kind() {
            Some(kind) => {
                dispatch_and_refresh(
                    state,
                    source,
                    view_data,
                    AppCommand::OpenForm(kind),
                    internal_tx,
                );
            }
            None => emit_status(state, view_data, internal_tx, "add unavailable"),
        },
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            match refresh_view_data(state, source, view_data) {
                Ok(()) => emit_status(state, view_data, internal_tx, "reloaded"),
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("load failed: {error:#} -- press r to retry"),
                ),
            }
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            emit_status(state, view_data, internal_tx, "help open");
        }
        (KeyCode::Esc, _) => {
            state.dispatch(AppCommand::ClearStatus);
        }
        _ => {}
    }
    false
}

/// Keys that map straight onto a table command. Column- and row-scoped
/// commands use the cursor position.
fn table_command_for_key(key: KeyEvent, view_data: &ViewData) -> Option<TableCommand> {
    view_data.screen.as_ref()?;
    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            TableCommand::CycleSort(selected_column_key(view_data)?)
        }
        (KeyCode::Char('S'), _) => TableCommand::ClearSort,
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            TableCommand::ToggleColumn(selected_column_key(view_data)?)
        }
        (KeyCode::Char('C'), _) => TableCommand::ShowAllColumns,
        (KeyCode::Char('F'), _) => TableCommand::ClearColumnFilters,
        (KeyCode::Char(' '), _) => TableCommand::ToggleRow(selected_row_key(view_data)?),
        (KeyCode::Char('*'), _) => TableCommand::SelectAll,
        (KeyCode::Char('x'), KeyModifiers::NONE) => TableCommand::ClearSelection,
        (KeyCode::Char(']'), _) | (KeyCode::PageDown, _) => TableCommand::NextPage,
        (KeyCode::Char('['), _) | (KeyCode::PageUp, _) => TableCommand::PrevPage,
        (KeyCode::Char('{'), _) | (KeyCode::Home, _) => TableCommand::FirstPage,
        (KeyCode::Char('}'), _) | (KeyCode::End, _) => TableCommand::LastPage,
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => TableCommand::StepPageSize(1),
        (KeyCode::Char('-'), _) => TableCommand::StepPageSize(-1),
        _ => return None,
    };
    Some(command)
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.search_input.clear();
            let status = run_table_command(view_data, TableCommand::SetSearchQuery(String::new()));
            state.dispatch(AppCommand::ExitToNav);
            emit_table_status(state, view_data, internal_tx, status);
        }
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
            apply_search_input(state, view_data, internal_tx);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search_input.push(ch);
            apply_search_input(state, view_data, internal_tx);
        }
        _ => {}
    }
}

fn apply_search_input(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let query = view_data.search_input.clone();
    let status = run_table_command(view_data, TableCommand::SetSearchQuery(query));
    emit_table_status(state, view_data, internal_tx, status);
}

fn handle_form_key<S: DataSource>(
    state: &mut AppState,
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            dispatch_and_refresh(
                state,
                source,
                view_data,
                AppCommand::CancelForm,
                internal_tx,
            );
        }
        KeyCode::Enter => {
            let payload = match state.validated_form_payload() {
                Ok(payload) => payload,
                Err(error) => {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("form invalid: {error:#}"),
                    );
                    return;
                }
            };
            if let Err(error) = source.submit_form(&payload) {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("save failed: {error:#}"),
                );
                return;
            }
            dispatch_and_refresh(
                state,
                source,
                view_data,
                AppCommand::SubmitForm,
                internal_tx,
            );
        }
        KeyCode::Tab | KeyCode::Down => {
            if let Some(draft) = state.form_mut() {
                draft.move_field(1);
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(draft) = state.form_mut() {
                draft.move_field(-1);
            }
        }
        KeyCode::Backspace => {
            if let Some(draft) = state.form_mut() {
                draft.pop_char();
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(draft) = state.form_mut() {
                draft.push_char(ch);
            }
        }
        _ => {}
    }
}

fn handle_goto_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.goto_input = None;
            emit_status(state, view_data, internal_tx, "goto canceled");
        }
        KeyCode::Enter => {
            let raw = view_data.goto_input.take().unwrap_or_default();
            let status = run_table_command(view_data, TableCommand::GoToPage(raw));
            emit_table_status(state, view_data, internal_tx, status);
        }
        KeyCode::Backspace => {
            if let Some(input) = view_data.goto_input.as_mut() {
                input.pop();
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(input) = view_data.goto_input.as_mut() {
                input.push(ch);
            }
        }
        _ => {}
    }
}

fn run_table_command(view_data: &mut ViewData, command: TableCommand) -> Option<TableStatus> {
    let screen = view_data.screen.as_mut()?;
    let events = screen.table.dispatch(command, &screen.records);
    let status = apply_table_events(view_data, events);
    // Accepted changes can shrink the row set; re-clamp against it.
    if let Some(screen) = view_data.screen.as_mut() {
        let events = screen.table.sync(&screen.records);
        apply_table_events(view_data, events);
    }
    clamp_cursor(view_data);
    status
}

/// Accepts every change the table requests for host-owned slices and
/// remembers it for the screen. Returns the last status.
fn apply_table_events(view_data: &mut ViewData, events: Vec<TableEvent>) -> Option<TableStatus> {
    let mut status = None;
    for event in events {
        match event {
            TableEvent::Status(next) => status = Some(next),
            TableEvent::ChangeRequested(change) => {
                let Some(screen) = view_data.screen.as_mut() else {
                    continue;
                };
                let saved = view_data
                    .saved
                    .entry(screen.kind)
                    .or_insert_with(|| SavedView::new(view_data.options.page_size));
                match &change {
                    ViewChange::Sorting(sorting) => saved.sorting = sorting.clone(),
                    ViewChange::Pagination(next) => saved.pagination = *next,
                    ViewChange::ColumnFilters(_)
                    | ViewChange::ColumnVisibility(_)
                    | ViewChange::RowSelection(_) => {}
                }
                screen.table.accept(change);
            }
        }
    }
    status
}

fn toggle_column_filter(view_data: &mut ViewData) -> Option<TableStatus> {
    let (column, value) = {
        let screen = view_data.screen.as_ref()?;
        let projection = screen.table.project(&screen.records);
        let column = projection.columns.get(view_data.selected_col)?;
        if screen.table.column_filters().contains_key(&column.key) {
            (column.key.clone(), String::new())
        } else {
            let record = projection.rows.get(view_data.selected_row)?;
            (column.key.clone(), column.display(record))
        }
    };
    run_table_command(view_data, TableCommand::SetColumnFilter { column, value })
}

fn selected_column_key(view_data: &ViewData) -> Option<String> {
    let screen = view_data.screen.as_ref()?;
    screen
        .table
        .visible_columns()
        .get(view_data.selected_col)
        .map(|column| column.key.clone())
}

fn selected_row_key(view_data: &ViewData) -> Option<String> {
    let screen = view_data.screen.as_ref()?;
    let projection = screen.table.project(&screen.records);
    let record = projection.rows.get(view_data.selected_row)?;
    screen.table.row_key(record)
}

fn move_row(view_data: &mut ViewData, delta: isize) {
    view_data.selected_row = view_data.selected_row.saturating_add_signed(delta);
    clamp_cursor(view_data);
}

fn move_col(view_data: &mut ViewData, delta: isize) {
    view_data.selected_col = view_data.selected_col.saturating_add_signed(delta);
    clamp_cursor(view_data);
}

fn clamp_cursor(view_data: &mut ViewData) {
    let (rows, columns) = view_data
        .screen
        .as_ref()
        .map(|screen| {
            let projection = screen.table.project(&screen.records);
            (projection.rows.len(), projection.columns.len())
        })
        .unwrap_or((0, 0));
    view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));
    view_data.selected_col = view_data.selected_col.min(columns.saturating_sub(1));
}

fn dispatch_and_refresh<S: DataSource>(
    state: &mut AppState,
    source: &mut S,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    if should_refresh_view(&events)
        && let Err(error) = refresh_view_data(state, source, view_data)
    {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("load failed: {error:#} -- press r to retry"),
        );
        return;
    }
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn should_refresh_view(events: &[AppEvent]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            AppEvent::ScreenChanged(_) | AppEvent::FormSubmitted(_)
        )
    })
}

fn refresh_view_data<S: DataSource>(
    state: &AppState,
    source: &mut S,
    view_data: &mut ViewData,
) -> Result<()> {
    let kind = state.active_screen;
    if view_data.screen.as_ref().map(|screen| screen.kind) != Some(kind) {
        let saved = view_data
            .saved
            .entry(kind)
            .or_insert_with(|| SavedView::new(view_data.options.page_size))
            .clone();
        let page_size = saved.pagination.page_size;
        let mut table = schema::table_for(kind, view_data.options.search, page_size)
            .with_context(|| format!("build {} table", kind.label()))?;
        table.bind_sorting(saved.sorting);
        table.bind_pagination(saved.pagination);
        view_data.screen = Some(ScreenView {
            kind,
            table,
            records: Vec::new(),
        });
        view_data.search_input.clear();
        view_data.selected_row = 0;
        view_data.selected_col = 0;
    }

    let loaded = source
        .load_records(kind)
        .with_context(|| format!("load {}", kind.label()));
    let Some(screen) = view_data.screen.as_mut() else {
        return Ok(());
    };
    let records = match loaded {
        Ok(records) => records,
        Err(error) => {
            screen.records.clear();
            view_data.load_error = Some(format!("{error:#}"));
            clamp_cursor(view_data);
            return Err(error);
        }
    };
    screen.records = records;
    let events = screen.table.sync(&screen.records);
    view_data.load_error = None;
    apply_table_events(view_data, events);
    clamp_cursor(view_data);
    Ok(())
}

fn screen_has_filters(view_data: &ViewData) -> bool {
    view_data.screen.as_ref().is_some_and(|screen| {
        !screen.table.column_filters().is_empty() || !screen.table.search_query().trim().is_empty()
    })
}

fn tab_title(kind: EntityKind, state: &AppState, view_data: &ViewData) -> String {
    if state.active_screen == kind && screen_has_filters(view_data) {
        format!(" {} {} ", kind.label(), FILTER_MARK_ACTIVE)
    } else {
        format!(" {} ", kind.label())
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = EntityKind::ALL
        .iter()
        .position(|kind| *kind == state.active_screen)
        .unwrap_or(0);
    let tab_titles = EntityKind::ALL
        .iter()
        .map(|kind| tab_title(*kind, state, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("budgetboard").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let toolbar = Paragraph::new(toolbar_text(state, view_data))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(toolbar, layout[1]);

    render_table(frame, layout[2], state, view_data);

    frame.render_widget(
        Paragraph::new(footer_text(view_data)).style(Style::default().fg(Color::Gray)),
        layout[3],
    );

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[4]);

    if let Some(draft) = &state.form {
        let area = centered_rect(64, 50, frame.area());
        frame.render_widget(Clear, area);
        let form = Paragraph::new(render_form_overlay_text(draft)).block(
            Block::default()
                .title(format!("add {}", draft.kind().label()))
                .borders(Borders::ALL),
        );
        frame.render_widget(form, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 72, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let block = Block::default().borders(Borders::ALL);
    let Some(screen) = &view_data.screen else {
        let block = block.title(state.active_screen.label());
        frame.render_widget(Paragraph::new(String::new()).block(block), area);
        return;
    };
    if let Some(error) = &view_data.load_error {
        let text = format!("load failed: {error}\n\npress r to retry");
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::Red))
                .block(block.title(state.active_screen.label())),
            area,
        );
        return;
    }

    let projection = screen.table.project(&screen.records);
    let block = block.title(table_title(&projection, state.active_screen));
    if let Some(message) = projection.empty_message() {
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let selectable = screen.table.is_selectable();
    let mut widths = Vec::with_capacity(projection.columns.len() + 1);
    if selectable {
        widths.push(Constraint::Length(1));
    }
    widths.extend(projection.columns.iter().map(|_| Constraint::Min(8)));
    let cell_count = widths.len();

    let mut header_cells = Vec::with_capacity(cell_count);
    if selectable {
        header_cells.push(Cell::from(""));
    }
    header_cells.extend(projection.columns.iter().map(|column| {
        Cell::from(header_label(&screen.table, &column.key, &column.title)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let header = Row::new(header_cells);

    let rows = projection.rows.iter().enumerate().map(|(row_index, record)| {
        let selected_row = row_index == view_data.selected_row;
        let mut cells = Vec::with_capacity(cell_count);
        if selectable {
            let mark = if screen.table.is_selected(record) {
                SELECTED_MARK
            } else {
                ""
            };
            cells.push(Cell::from(mark).style(Style::default().fg(Color::Green)));
        }
        cells.extend(
            projection
                .columns
                .iter()
                .enumerate()
                .map(|(column_index, column)| {
                    let mut style = Style::default();
                    if selected_row {
                        style = style.bg(Color::DarkGray);
                    }
                    if selected_row && column_index == view_data.selected_col {
                        style = Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                    Cell::from(column.display(record)).style(style)
                }),
        );
        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn header_label(table: &TableView<Record>, key: &str, title: &str) -> String {
    let mut label = title.to_owned();
    if table.column_filters().contains_key(key) {
        label.push(' ');
        label.push_str(COLUMN_FILTER_MARK);
    }
    if let Some((position, direction)) = table.sort_position(key) {
        if table.sorting().len() == 1 {
            let suffix = match direction {
                SortDirection::Asc => " ↑",
                SortDirection::Desc => " ↓",
            };
            label.push_str(suffix);
        } else {
            let marker = match direction {
                SortDirection::Asc => " ▲",
                SortDirection::Desc => " ▼",
            };
            label.push_str(marker);
            label.push_str(&(position + 1).to_string());
        }
    }
    label
}

fn table_title(projection: &TableProjection<'_, Record>, kind: EntityKind) -> String {
    if projection.filtered_count == projection.total_count {
        format!("{} ({})", kind.label(), projection.total_count)
    } else {
        format!(
            "{} ({} of {})",
            kind.label(),
            projection.filtered_count,
            projection.total_count
        )
    }
}

fn toolbar_text(state: &AppState, view_data: &ViewData) -> String {
    let search = if state.mode == AppMode::Search {
        format!("search: {}{INPUT_CURSOR}", view_data.search_input)
    } else if view_data.search_input.is_empty() {
        "/ search".to_owned()
    } else {
        format!("search: {}", view_data.search_input)
    };
    let filters = view_data
        .screen
        .as_ref()
        .map_or(0, |screen| screen.table.column_filters().len());
    let add = if state.active_screen.form_kind().is_some() {
        "a add"
    } else {
        "a add (n/a)"
    };
    format!("{search} | filters: {filters} | {add}")
}

fn footer_text(view_data: &ViewData) -> String {
    if let Some(input) = &view_data.goto_input {
        return format!("go to page: {input}{INPUT_CURSOR}  enter jump | esc cancel");
    }
    let Some(screen) = &view_data.screen else {
        return String::new();
    };
    let projection = screen.table.project(&screen.records);
    format!(
        "page {}/{} | {} per page | {} of {} rows | {} selected",
        projection.pagination.page_index + 1,
        projection.page_count,
        projection.pagination.page_size,
        projection.filtered_count,
        projection.total_count,
        screen.table.selected_keys().len(),
    )
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }
    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Search => "SEARCH",
        AppMode::Form(_) => "FORM",
    };
    let hints = match state.mode {
        AppMode::Nav => {
            "j/k/h/l | s/S sort | f/F filter | c/C cols | / search | space/* select | [/] +/- g page | ? help | q"
        }
        AppMode::Search => "type to filter | enter keep | esc clear",
        AppMode::Form(_) => "tab/shift+tab field | enter save | esc cancel",
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn render_form_overlay_text(draft: &FormDraft) -> String {
    let mut lines = form_fields(draft.kind())
        .iter()
        .zip(draft.values())
        .enumerate()
        .map(|(index, (field, value))| {
            if index == draft.field_index() {
                let hint = field.hint;
                format!("> {:<14} {value}{INPUT_CURSOR}  ({hint})", field.label)
            } else {
                format!("  {:<14} {value}", field.label)
            }
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push("tab/shift+tab field | enter save | esc cancel".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
screens: tab/shift+tab next/prev | r reload | q quit\n\
cursor: j/k rows | h/l columns\n\
sort: s cycle column (asc, desc, off) | S clear all\n\
filter: f filter column by cell (again to clear) | F clear filters | / search\n\
columns: c hide column | C show all\n\
select: space toggle row | * select all matches | x clear\n\
pages: [/] prev/next | {/} first/last | +/- page size | g go to page\n\
add: a open form | tab/shift+tab field | enter save | esc cancel\n\
search: type to filter | enter keep | esc clear"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        DataSource, InternalEvent, UiOptions, ViewData, footer_text, handle_key_event,
        header_label, help_overlay_text, process_internal_events, refresh_view_data, render,
        status_text, toolbar_text,
    };
    use anyhow::bail;
    use budgetboard_app::{
        AppMode, AppState, Dataset, EMPTY_STATE_MESSAGE, EntityKind, FormKind, FormPayload,
        Record, SortDirection, Value,
    };
    use budgetboard_testkit::demo_dataset;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;
    use time::{Date, Month};

    #[derive(Debug, Default)]
    struct TestSource {
        dataset: Dataset,
        submitted: Vec<FormPayload>,
        fail_loads: bool,
        loads: usize,
    }

    impl DataSource for TestSource {
        fn load_records(&mut self, kind: EntityKind) -> anyhow::Result<Vec<Record>> {
            self.loads += 1;
            if self.fail_loads {
                bail!("backend unreachable");
            }
            Ok(self.dataset.get(&kind).cloned().unwrap_or_default())
        }

        fn submit_form(&mut self, payload: &FormPayload) -> anyhow::Result<()> {
            self.submitted.push(payload.clone());
            let records = self.dataset.entry(payload.kind().entity()).or_default();
            let id = records.len() as i64 + 1;
            records.push(payload.to_record(id));
            Ok(())
        }
    }

    fn engagement(id: i64, beneficiary: &str, status: &str) -> Record {
        Record::new()
            .with("id", id)
            .with("reference", format!("ENG-{id:03}"))
            .with("beneficiary", beneficiary)
            .with("amount_cents", Value::Money(id * 10_000))
            .with("status", status)
            .with(
                "signed_on",
                Date::from_calendar_date(2026, Month::March, 1).expect("valid date"),
            )
    }

    fn people_source() -> TestSource {
        let mut dataset = Dataset::new();
        dataset.insert(
            EntityKind::Engagements,
            vec![
                engagement(1, "Marie Curie", "approved"),
                engagement(2, "Jean Dupont", "draft"),
                engagement(3, "Albert Camus", "settled"),
                engagement(4, "DUPONT Jéan", "cancelled"),
            ],
        );
        dataset.insert(EntityKind::Payments, Vec::new());
        TestSource {
            dataset,
            ..TestSource::default()
        }
    }

    fn numbered_source(count: i64) -> TestSource {
        let mut dataset = Dataset::new();
        dataset.insert(
            EntityKind::Engagements,
            (1..=count)
                .map(|id| engagement(id, &format!("Beneficiary {id:02}"), "draft"))
                .collect(),
        );
        TestSource {
            dataset,
            ..TestSource::default()
        }
    }

    fn loaded(source: &mut TestSource) -> (AppState, ViewData) {
        let state = AppState::default();
        let mut view_data = ViewData::new(UiOptions::default());
        refresh_view_data(&state, source, &mut view_data).expect("initial load");
        (state, view_data)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(
        state: &mut AppState,
        source: &mut TestSource,
        view_data: &mut ViewData,
        keys: &[KeyEvent],
    ) -> bool {
        let (tx, _rx) = mpsc::channel();
        let mut quit = false;
        for key in keys {
            quit = handle_key_event(state, source, view_data, &tx, *key);
        }
        quit
    }

    fn type_text(
        state: &mut AppState,
        source: &mut TestSource,
        view_data: &mut ViewData,
        text: &str,
    ) {
        let keys = text
            .chars()
            .map(|ch| key(KeyCode::Char(ch)))
            .collect::<Vec<_>>();
        press(state, source, view_data, &keys);
    }

    fn visible_ids(view_data: &ViewData) -> Vec<String> {
        let screen = view_data.screen.as_ref().expect("screen loaded");
        screen
            .table
            .project(&screen.records)
            .rows
            .iter()
            .map(|record| budgetboard_app::schema::record_id(record))
            .collect()
    }

    fn rendered(state: &AppState, view_data: &ViewData) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).expect("test terminal");
        terminal
            .draw(|frame| render(frame, state, view_data))
            .expect("draw frame");
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn tab_cycles_screens_and_loads_records() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);
        assert_eq!(source.loads, 1);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Tab)],
        );
        assert_eq!(state.active_screen, EntityKind::Payments);
        assert_eq!(source.loads, 2);
        assert!(visible_ids(&view_data).is_empty());

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::BackTab)],
        );
        assert_eq!(state.active_screen, EntityKind::Engagements);
        assert_eq!(visible_ids(&view_data).len(), 4);
    }

    #[test]
    fn search_ignores_accents_case_and_word_order() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('/'))],
        );
        assert_eq!(state.mode, AppMode::Search);
        type_text(&mut state, &mut source, &mut view_data, "dupont jean");
        assert_eq!(visible_ids(&view_data), vec!["2", "4"]);
        assert!(toolbar_text(&state, &view_data).contains("dupont jean"));

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Enter)],
        );
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(visible_ids(&view_data).len(), 2);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('/')), key(KeyCode::Esc)],
        );
        assert_eq!(visible_ids(&view_data).len(), 4);
        assert!(view_data.search_input.is_empty());
    }

    #[test]
    fn sort_key_cycles_and_restores_order() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);
        let original = visible_ids(&view_data);

        // Move to the beneficiary column.
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('l')), key(KeyCode::Char('l'))],
        );
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('s'))],
        );
        assert_eq!(visible_ids(&view_data), vec!["3", "4", "2", "1"]);
        assert_eq!(state.status_line.as_deref(), Some("sort Beneficiary asc"));

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('s'))],
        );
        assert_eq!(visible_ids(&view_data), vec!["1", "2", "4", "3"]);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('s'))],
        );
        assert_eq!(visible_ids(&view_data), original);
    }

    #[test]
    fn sort_survives_switching_screens() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[
                key(KeyCode::Char('l')),
                key(KeyCode::Char('l')),
                key(KeyCode::Char('s')),
                key(KeyCode::Tab),
                key(KeyCode::BackTab),
            ],
        );
        let screen = view_data.screen.as_ref().expect("screen loaded");
        assert_eq!(
            screen.table.sort_position("beneficiary"),
            Some((0, SortDirection::Asc))
        );
        assert_eq!(visible_ids(&view_data), vec!["3", "4", "2", "1"]);
    }

    #[test]
    fn page_keys_move_and_resize_with_clamping() {
        let mut source = numbered_source(25);
        let (mut state, mut view_data) = loaded(&mut source);
        assert!(footer_text(&view_data).starts_with("page 1/3"));

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[
                key(KeyCode::Char(']')),
                key(KeyCode::Char(']')),
                key(KeyCode::Char(']')),
            ],
        );
        assert!(footer_text(&view_data).starts_with("page 3/3"));
        assert_eq!(visible_ids(&view_data).len(), 5);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[
                key(KeyCode::Char('+')),
                key(KeyCode::Char('+')),
                key(KeyCode::Char('+')),
                key(KeyCode::Char('+')),
            ],
        );
        let screen = view_data.screen.as_ref().expect("screen loaded");
        let pagination = screen.table.view_state().pagination;
        assert_eq!(pagination.page_size, 50);
        assert_eq!(pagination.page_index, 0);
        assert_eq!(visible_ids(&view_data).len(), 25);
    }

    #[test]
    fn goto_prompt_jumps_and_clamps() {
        let mut source = numbered_source(25);
        let (mut state, mut view_data) = loaded(&mut source);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('g'))],
        );
        assert!(footer_text(&view_data).starts_with("go to page"));
        type_text(&mut state, &mut source, &mut view_data, "2");
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Enter)],
        );
        assert_eq!(state.status_line.as_deref(), Some("page 2/3"));

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('g'))],
        );
        type_text(&mut state, &mut source, &mut view_data, "99");
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Enter)],
        );
        assert_eq!(state.status_line.as_deref(), Some("page 3/3"));
        assert!(view_data.goto_input.is_none());
    }

    #[test]
    fn selection_keys_toggle_and_select_all_matches() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char(' '))],
        );
        assert_eq!(state.status_line.as_deref(), Some("row selected (1)"));
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char(' '))],
        );
        assert_eq!(state.status_line.as_deref(), Some("row deselected (0)"));

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('/'))],
        );
        type_text(&mut state, &mut source, &mut view_data, "dupont");
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Enter), key(KeyCode::Char('*'))],
        );
        assert_eq!(state.status_line.as_deref(), Some("selected all (2)"));
        assert!(footer_text(&view_data).ends_with("2 selected"));

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('x'))],
        );
        assert!(footer_text(&view_data).ends_with("0 selected"));
    }

    #[test]
    fn column_filter_from_selected_cell_toggles() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);

        // Status column of the first row ("approved").
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[
                key(KeyCode::Char('l')),
                key(KeyCode::Char('l')),
                key(KeyCode::Char('l')),
                key(KeyCode::Char('l')),
                key(KeyCode::Char('l')),
                key(KeyCode::Char('f')),
            ],
        );
        assert_eq!(visible_ids(&view_data), vec!["1"]);
        let screen = view_data.screen.as_ref().expect("screen loaded");
        assert!(header_label(&screen.table, "status", "Status").contains('▽'));

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('f'))],
        );
        assert_eq!(visible_ids(&view_data).len(), 4);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('f')), key(KeyCode::Char('F'))],
        );
        assert_eq!(visible_ids(&view_data).len(), 4);
    }

    #[test]
    fn hiding_columns_keeps_one_visible() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);
        let hide_all = vec![key(KeyCode::Char('c')); 7];
        press(&mut state, &mut source, &mut view_data, &hide_all);
        assert_eq!(
            state.status_line.as_deref(),
            Some("keep one column visible")
        );
        let screen = view_data.screen.as_ref().expect("screen loaded");
        assert_eq!(screen.table.visible_columns().len(), 1);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('C'))],
        );
        let screen = view_data.screen.as_ref().expect("screen loaded");
        assert_eq!(screen.table.visible_columns().len(), 7);
    }

    #[test]
    fn add_form_submits_through_the_source() {
        let mut source = people_source();
        source.dataset.insert(EntityKind::Ministries, Vec::new());
        let (mut state, mut view_data) = loaded(&mut source);
        state.active_screen = EntityKind::Ministries;
        refresh_view_data(&state, &mut source, &mut view_data).expect("load ministries");

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('a'))],
        );
        assert_eq!(state.mode, AppMode::Form(FormKind::Ministry));

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Enter)],
        );
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.starts_with("form invalid"))
        );
        assert!(source.submitted.is_empty());

        type_text(&mut state, &mut source, &mut view_data, "MIN-SAN");
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Tab)],
        );
        type_text(&mut state, &mut source, &mut view_data, "Santé");
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Enter)],
        );

        assert_eq!(source.submitted.len(), 1);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.status_line.as_deref(), Some("ministry saved"));
        assert_eq!(visible_ids(&view_data), vec!["1"]);
    }

    #[test]
    fn add_is_unavailable_on_read_only_screens() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);
        state.active_screen = EntityKind::AuditLog;
        refresh_view_data(&state, &mut source, &mut view_data).expect("load audit");

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('a'))],
        );
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.status_line.as_deref(), Some("add unavailable"));
        assert!(toolbar_text(&state, &view_data).contains("(n/a)"));
    }

    #[test]
    fn failed_load_reports_and_retries() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);
        source.fail_loads = true;

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('r'))],
        );
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("backend unreachable"))
        );
        assert!(rendered(&state, &view_data).contains("press r to retry"));

        source.fail_loads = false;
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('r'))],
        );
        assert_eq!(state.status_line.as_deref(), Some("reloaded"));
        assert_eq!(visible_ids(&view_data).len(), 4);
    }

    #[test]
    fn empty_search_renders_empty_state() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('/'))],
        );
        type_text(&mut state, &mut source, &mut view_data, "nobody");

        let screen = rendered(&state, &view_data);
        assert!(screen.contains(EMPTY_STATE_MESSAGE));
        assert!(screen.contains("engagements"));
    }

    #[test]
    fn demo_dataset_renders_on_every_screen() {
        let mut source = TestSource {
            dataset: demo_dataset(5),
            ..TestSource::default()
        };
        let (mut state, mut view_data) = loaded(&mut source);
        for _ in EntityKind::ALL {
            let kind = state.active_screen;
            assert!(view_data.load_error.is_none());
            assert!(!visible_ids(&view_data).is_empty(), "{kind:?}");
            let screen = rendered(&state, &view_data);
            assert!(screen.contains("budgetboard"));
            press(
                &mut state,
                &mut source,
                &mut view_data,
                &[key(KeyCode::Tab)],
            );
        }
        assert_eq!(state.active_screen, EntityKind::Engagements);
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('?'))],
        );
        assert!(view_data.help_visible);
        assert!(status_text(&state, &view_data).is_empty());

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Tab)],
        );
        assert_eq!(state.active_screen, EntityKind::Engagements);

        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Esc)],
        );
        assert!(!view_data.help_visible);
        assert!(help_overlay_text().contains("select all"));
    }

    #[test]
    fn quit_keys() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);
        assert!(!press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('j'))]
        ));
        assert!(press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('q'))]
        ));
        assert!(press(
            &mut state,
            &mut source,
            &mut view_data,
            &[KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)]
        ));
    }

    #[test]
    fn stale_status_clear_tokens_are_ignored() {
        let mut source = people_source();
        let (mut state, mut view_data) = loaded(&mut source);
        press(
            &mut state,
            &mut source,
            &mut view_data,
            &[key(KeyCode::Char('S'))],
        );
        assert!(state.status_line.is_some());

        let (tx, rx) = mpsc::channel();
        tx.send(InternalEvent::ClearStatus {
            token: view_data.status_token - 1,
        })
        .expect("send stale token");
        process_internal_events(&mut state, &view_data, &rx);
        assert!(state.status_line.is_some());

        tx.send(InternalEvent::ClearStatus {
            token: view_data.status_token,
        })
        .expect("send current token");
        process_internal_events(&mut state, &view_data, &rx);
        assert!(state.status_line.is_none());
    }
}
