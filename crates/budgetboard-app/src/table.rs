// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Column-driven table controller: sorting, per-column filters, free-text
//! search, column visibility, row selection, and pagination over a record
//! collection the caller passes in on every call.
//!
//! Every view-state slice sits in a [`StateSlot`]. Owned slices change in
//! place; bound slices turn each change into a
//! [`TableEvent::ChangeRequested`] and wait for the host to push the value
//! back with one of the `bind_*` methods.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use anyhow::{Context, Result};

use crate::SortDirection;
use crate::pagination::{self, Pagination};
use crate::search::{CompiledQuery, Query, SearchOptions};
use crate::slot::StateSlot;
use crate::value::{FieldPath, FieldSource, Value};

pub const EMPTY_STATE_MESSAGE: &str = "No results.";

pub type Renderer<T> = fn(&T) -> String;
pub type Comparator<T> = fn(&T, &T) -> Ordering;
pub type RowKeyFn<T> = fn(&T) -> String;

pub struct ColumnDescriptor<T> {
    pub key: String,
    pub title: String,
    pub path: FieldPath,
    pub render: Option<Renderer<T>>,
    pub compare: Option<Comparator<T>>,
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            title: self.title.clone(),
            path: self.path.clone(),
            render: self.render,
            compare: self.compare,
        }
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("path", &self.path)
            .field("custom_render", &self.render.is_some())
            .field("custom_compare", &self.compare.is_some())
            .finish()
    }
}

impl<T: FieldSource> ColumnDescriptor<T> {
    /// A column whose key is also the dotted path it reads.
    pub fn new(key: &str, title: &str) -> Result<Self> {
        Self::at(key, title, key)
    }

    pub fn at(key: &str, title: &str, path: &str) -> Result<Self> {
        let path =
            FieldPath::parse(path).with_context(|| format!("column {key:?} has a bad path"))?;
        Ok(Self {
            key: key.to_owned(),
            title: title.to_owned(),
            path,
            render: None,
            compare: None,
        })
    }

    pub fn with_renderer(mut self, render: Renderer<T>) -> Self {
        self.render = Some(render);
        self
    }

    pub fn with_comparator(mut self, compare: Comparator<T>) -> Self {
        self.compare = Some(compare);
        self
    }

    pub fn value(&self, item: &T) -> Option<Value> {
        item.field(&self.path)
    }

    pub fn display(&self, item: &T) -> String {
        match self.render {
            Some(render) => render(item),
            None => self
                .value(item)
                .map(|value| value.display())
                .unwrap_or_default(),
        }
    }

    /// Text a column filter is matched against: the rendered cell when the
    /// column has a renderer, the raw value otherwise.
    fn filter_text(&self, item: &T) -> Option<String> {
        match self.render {
            Some(render) => Some(render(item)),
            None => self.value(item).and_then(|value| value.search_text()),
        }
    }

    fn compare_items(&self, left: &T, right: &T, direction: SortDirection) -> Ordering {
        let order = match self.compare {
            Some(compare) => compare(left, right),
            None => {
                let left_value = self.value(left).filter(|value| !value.is_null());
                let right_value = self.value(right).filter(|value| !value.is_null());
                match (left_value, right_value) {
                    (None, None) => return Ordering::Equal,
                    (None, Some(_)) => return Ordering::Greater,
                    (Some(_), None) => return Ordering::Less,
                    (Some(left), Some(right)) => left.cmp_value(&right),
                }
            }
        };
        match direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

pub type ColumnFilters = BTreeMap<String, String>;
pub type ColumnVisibility = BTreeMap<String, bool>;
pub type RowSelection = BTreeSet<String>;

/// Snapshot of every view-state slice, whichever slot holds it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub sorting: Vec<SortSpec>,
    pub column_filters: ColumnFilters,
    pub column_visibility: ColumnVisibility,
    pub row_selection: RowSelection,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    Sorting(Vec<SortSpec>),
    ColumnFilters(ColumnFilters),
    ColumnVisibility(ColumnVisibility),
    RowSelection(RowSelection),
    Pagination(Pagination),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    CycleSort(String),
    ClearSort,
    SetColumnFilter { column: String, value: String },
    ClearColumnFilters,
    SetSearchQuery(String),
    ToggleColumn(String),
    ShowAllColumns,
    SelectRow(String),
    DeselectRow(String),
    ToggleRow(String),
    SelectAll,
    ClearSelection,
    SetPageIndex(usize),
    GoToPage(String),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    SetPageSize(usize),
    StepPageSize(isize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    UnknownColumn(String),
    SortAsc(String),
    SortDesc(String),
    SortCleared(String),
    SortsCleared,
    FilterOn(String),
    FilterOff(String),
    FiltersCleared,
    SearchOn { matches: usize },
    SearchOff,
    ColumnHidden(String),
    ColumnShown(String),
    KeepOneColumnVisible,
    ColumnsShown,
    SelectionUnavailable,
    RowSelected { selected: usize },
    RowDeselected { selected: usize },
    AllSelected { selected: usize },
    SelectionCleared,
    Page { page: usize, pages: usize },
    PageSize(usize),
}

impl TableStatus {
    pub fn message(&self) -> String {
        match self {
            Self::UnknownColumn(key) => format!("unknown column {key}"),
            Self::SortAsc(column) => format!("sort {column} asc"),
            Self::SortDesc(column) => format!("sort {column} desc"),
            Self::SortCleared(column) => format!("sort {column} off"),
            Self::SortsCleared => "sort cleared".to_owned(),
            Self::FilterOn(column) => format!("filter on {column}"),
            Self::FilterOff(column) => format!("filter off {column}"),
            Self::FiltersCleared => "filters cleared".to_owned(),
            Self::SearchOn { matches } => format!("search: {matches} match(es)"),
            Self::SearchOff => "search cleared".to_owned(),
            Self::ColumnHidden(column) => format!("column hidden: {column}"),
            Self::ColumnShown(column) => format!("column shown: {column}"),
            Self::KeepOneColumnVisible => "keep one column visible".to_owned(),
            Self::ColumnsShown => "all columns shown".to_owned(),
            Self::SelectionUnavailable => "selection unavailable".to_owned(),
            Self::RowSelected { selected } => format!("row selected ({selected})"),
            Self::RowDeselected { selected } => format!("row deselected ({selected})"),
            Self::AllSelected { selected } => format!("selected all ({selected})"),
            Self::SelectionCleared => "selection cleared".to_owned(),
            Self::Page { page, pages } => format!("page {page}/{pages}"),
            Self::PageSize(size) => format!("{size} rows per page"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    Status(TableStatus),
    ChangeRequested(ViewChange),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct SearchState {
    query: String,
    fields: Vec<FieldPath>,
    options: SearchOptions,
}

/// What one page of the table looks like right now.
#[derive(Debug, Clone)]
pub struct TableProjection<'a, T> {
    pub columns: Vec<&'a ColumnDescriptor<T>>,
    pub rows: Vec<&'a T>,
    pub filtered_count: usize,
    pub total_count: usize,
    pub pagination: Pagination,
    pub page_count: usize,
}

impl<T> TableProjection<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_STATE_MESSAGE)
    }

    /// Absolute index (within the filtered set) of the first row shown.
    pub fn first_row_offset(&self) -> usize {
        self.pagination.page_index * self.pagination.page_size
    }
}

pub struct TableView<T> {
    columns: Vec<ColumnDescriptor<T>>,
    row_key: Option<RowKeyFn<T>>,
    search: SearchState,
    sorting: StateSlot<Vec<SortSpec>>,
    column_filters: StateSlot<ColumnFilters>,
    column_visibility: StateSlot<ColumnVisibility>,
    row_selection: StateSlot<RowSelection>,
    pagination: StateSlot<Pagination>,
}

impl<T> fmt::Debug for TableView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableView")
            .field("columns", &self.columns)
            .field("selectable", &self.row_key.is_some())
            .field("search", &self.search)
            .field("sorting", &self.sorting)
            .field("column_filters", &self.column_filters)
            .field("column_visibility", &self.column_visibility)
            .field("row_selection", &self.row_selection)
            .field("pagination", &self.pagination)
            .finish()
    }
}

impl<T: FieldSource> TableView<T> {
    pub fn new(columns: Vec<ColumnDescriptor<T>>) -> Self {
        Self {
            columns,
            row_key: None,
            search: SearchState::default(),
            sorting: StateSlot::default(),
            column_filters: StateSlot::default(),
            column_visibility: StateSlot::default(),
            row_selection: StateSlot::default(),
            pagination: StateSlot::default(),
        }
    }

    /// Enables row selection, keyed by `row_key`.
    pub fn with_row_key(mut self, row_key: RowKeyFn<T>) -> Self {
        self.row_key = Some(row_key);
        self
    }

    pub fn with_search_fields(mut self, fields: Vec<FieldPath>) -> Self {
        self.search.fields = fields;
        self
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search.options = options;
        self
    }

    /// Sets the starting page size, snapped to the nearest option. Applies
    /// to a bound pagination slot too; a later `bind_pagination` replaces it.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        let current = *self.pagination.get();
        self.pagination.set(Pagination {
            page_size: pagination::nearest_page_size(page_size),
            ..current
        });
        self
    }

    pub fn bind_sorting(&mut self, value: Vec<SortSpec>) {
        self.sorting.bind(value);
    }

    pub fn bind_column_filters(&mut self, value: ColumnFilters) {
        self.column_filters.bind(value);
    }

    pub fn bind_column_visibility(&mut self, value: ColumnVisibility) {
        self.column_visibility.bind(value);
    }

    pub fn bind_row_selection(&mut self, value: RowSelection) {
        self.row_selection.bind(value);
    }

    pub fn bind_pagination(&mut self, value: Pagination) {
        self.pagination.bind(value);
    }

    /// Binds the slot a change request came from to the requested value, for
    /// hosts that accept every request as-is.
    pub fn accept(&mut self, change: ViewChange) {
        match change {
            ViewChange::Sorting(value) => self.bind_sorting(value),
            ViewChange::ColumnFilters(value) => self.bind_column_filters(value),
            ViewChange::ColumnVisibility(value) => self.bind_column_visibility(value),
            ViewChange::RowSelection(value) => self.bind_row_selection(value),
            ViewChange::Pagination(value) => self.bind_pagination(value),
        }
    }

    pub fn columns(&self) -> &[ColumnDescriptor<T>] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor<T>> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn is_selectable(&self) -> bool {
        self.row_key.is_some()
    }

    pub fn search_query(&self) -> &str {
        &self.search.query
    }

    pub fn search_fields(&self) -> &[FieldPath] {
        &self.search.fields
    }

    pub fn set_search_fields(&mut self, fields: Vec<FieldPath>) {
        self.search.fields = fields;
    }

    pub fn search_options(&self) -> SearchOptions {
        self.search.options
    }

    pub fn set_search_options(&mut self, options: SearchOptions) {
        self.search.options = options;
    }

    pub fn sorting(&self) -> &[SortSpec] {
        self.sorting.get()
    }

    pub fn column_filters(&self) -> &ColumnFilters {
        self.column_filters.get()
    }

    pub fn selected_keys(&self) -> &RowSelection {
        self.row_selection.get()
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            sorting: self.sorting.get().clone(),
            column_filters: self.column_filters.get().clone(),
            column_visibility: self.column_visibility.get().clone(),
            row_selection: self.row_selection.get().clone(),
            pagination: *self.pagination.get(),
        }
    }

    /// Position (0-based) and direction of `key` in the sort list.
    pub fn sort_position(&self, key: &str) -> Option<(usize, SortDirection)> {
        self.sorting
            .get()
            .iter()
            .enumerate()
            .find(|(_, sort)| sort.column == key)
            .map(|(index, sort)| (index, sort.direction))
    }

    pub fn is_column_visible(&self, key: &str) -> bool {
        self.column_visibility
            .get()
            .get(key)
            .copied()
            .unwrap_or(true)
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor<T>> {
        self.columns
            .iter()
            .filter(|column| self.is_column_visible(&column.key))
            .collect()
    }

    pub fn row_key(&self, item: &T) -> Option<String> {
        self.row_key.map(|row_key| row_key(item))
    }

    pub fn is_selected(&self, item: &T) -> bool {
        self.row_key(item)
            .is_some_and(|key| self.row_selection.get().contains(&key))
    }

    /// Current pagination with the index clamped against `data`.
    pub fn pagination(&self, data: &[T]) -> Pagination {
        self.pagination
            .get()
            .clamped(self.filtered_rows(data).len())
    }

    /// Rows that pass the column filters and the search, in sort order.
    pub fn filtered_rows<'a>(&self, data: &'a [T]) -> Vec<&'a T> {
        let search = CompiledQuery::new(Query::from(&self.search.query), self.search.options);
        let filters = self
            .column_filters
            .get()
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .filter_map(|(key, value)| {
                let column = self.column(key)?;
                let options = SearchOptions {
                    match_all_words: true,
                    ..SearchOptions::default()
                };
                Some((column, CompiledQuery::new(value.as_str(), options)))
            })
            .collect::<Vec<_>>();

        let mut rows = data
            .iter()
            .filter(|item| {
                filters.iter().all(|(column, filter)| {
                    column
                        .filter_text(item)
                        .is_some_and(|text| filter.matches_text(&text))
                })
            })
            .filter(|item| search.matches(*item, &self.search.fields))
            .collect::<Vec<_>>();

        let sorts = self
            .sorting
            .get()
            .iter()
            .filter_map(|sort| Some((self.column(&sort.column)?, sort.direction)))
            .collect::<Vec<_>>();
        if !sorts.is_empty() {
            rows.sort_by(|left, right| {
                for (column, direction) in &sorts {
                    let order = column.compare_items(left, right, *direction);
                    if order != Ordering::Equal {
                        return order;
                    }
                }
                Ordering::Equal
            });
        }
        rows
    }

    pub fn project<'a>(&'a self, data: &'a [T]) -> TableProjection<'a, T> {
        let filtered = self.filtered_rows(data);
        let filtered_count = filtered.len();
        let pagination = self.pagination.get().clamped(filtered_count);
        let (start, end) = pagination.bounds(filtered_count);
        TableProjection {
            columns: self.visible_columns(),
            rows: filtered[start..end].to_vec(),
            filtered_count,
            total_count: data.len(),
            pagination,
            page_count: pagination::page_count(filtered_count, pagination.page_size),
        }
    }

    /// Display text of the selected rows (or every filtered row when nothing
    /// is selected) across the visible columns, in view order.
    pub fn export_rows(&self, data: &[T]) -> Vec<Vec<String>> {
        let columns = self.visible_columns();
        let rows = self.filtered_rows(data);
        let selection = self.row_selection.get();
        let use_selection = self.row_key.is_some() && !selection.is_empty();
        rows.into_iter()
            .filter(|item| !use_selection || self.is_selected(item))
            .map(|item| columns.iter().map(|column| column.display(item)).collect())
            .collect()
    }

    /// Re-clamps the page index against `data`, e.g. after the host swapped
    /// in a fresh collection.
    pub fn sync(&mut self, data: &[T]) -> Vec<TableEvent> {
        let mut events = Vec::new();
        self.reconcile_pagination(data, &mut events);
        events
    }

    pub fn dispatch(&mut self, command: TableCommand, data: &[T]) -> Vec<TableEvent> {
        let mut events = Vec::new();
        let status = match command {
            TableCommand::CycleSort(key) => self.cycle_sort(&key, &mut events),
            TableCommand::ClearSort => {
                propose(
                    &mut self.sorting,
                    Vec::new(),
                    ViewChange::Sorting,
                    &mut events,
                );
                TableStatus::SortsCleared
            }
            TableCommand::SetColumnFilter { column, value } => {
                self.set_column_filter(&column, value, &mut events)
            }
            TableCommand::ClearColumnFilters => {
                propose(
                    &mut self.column_filters,
                    ColumnFilters::new(),
                    ViewChange::ColumnFilters,
                    &mut events,
                );
                TableStatus::FiltersCleared
            }
            TableCommand::SetSearchQuery(query) => {
                self.search.query = query;
                if self.search.query.trim().is_empty() {
                    TableStatus::SearchOff
                } else {
                    TableStatus::SearchOn {
                        matches: self.filtered_rows(data).len(),
                    }
                }
            }
            TableCommand::ToggleColumn(key) => self.toggle_column(&key, &mut events),
            TableCommand::ShowAllColumns => {
                propose(
                    &mut self.column_visibility,
                    ColumnVisibility::new(),
                    ViewChange::ColumnVisibility,
                    &mut events,
                );
                TableStatus::ColumnsShown
            }
            TableCommand::SelectRow(key) => self.update_selection(&mut events, |selection| {
                selection.insert(key);
            }),
            TableCommand::DeselectRow(key) => self.update_selection(&mut events, |selection| {
                selection.remove(&key);
            }),
            TableCommand::ToggleRow(key) => self.update_selection(&mut events, |selection| {
                if !selection.remove(&key) {
                    selection.insert(key);
                }
            }),
            TableCommand::SelectAll => self.select_all(data, &mut events),
            TableCommand::ClearSelection => {
                if self.row_key.is_none() {
                    TableStatus::SelectionUnavailable
                } else {
                    propose(
                        &mut self.row_selection,
                        RowSelection::new(),
                        ViewChange::RowSelection,
                        &mut events,
                    );
                    TableStatus::SelectionCleared
                }
            }
            TableCommand::SetPageIndex(index) => self.move_page(data, &mut events, |_, _| index),
            TableCommand::GoToPage(raw) => self.move_page(data, &mut events, |current, pages| {
                pagination::parse_page_input(&raw, current, pages)
            }),
            TableCommand::NextPage => {
                self.move_page(data, &mut events, |current, _| current.saturating_add(1))
            }
            TableCommand::PrevPage => {
                self.move_page(data, &mut events, |current, _| current.saturating_sub(1))
            }
            TableCommand::FirstPage => self.move_page(data, &mut events, |_, _| 0),
            TableCommand::LastPage => {
                self.move_page(data, &mut events, |_, pages| pages.saturating_sub(1))
            }
            TableCommand::SetPageSize(size) => self.resize_page(data, &mut events, size),
            TableCommand::StepPageSize(delta) => {
                let current = self.pagination.get().page_size;
                self.resize_page(
                    data,
                    &mut events,
                    pagination::step_page_size(current, delta),
                )
            }
        };
        self.reconcile_pagination(data, &mut events);
        events.push(TableEvent::Status(status));
        events
    }

    fn title_for(&self, key: &str) -> Option<String> {
        self.column(key).map(|column| column.title.clone())
    }

    fn cycle_sort(&mut self, key: &str, events: &mut Vec<TableEvent>) -> TableStatus {
        let Some(title) = self.title_for(key) else {
            return TableStatus::UnknownColumn(key.to_owned());
        };
        let mut next = self.sorting.get().clone();
        let position = next.iter().position(|sort| sort.column == key);
        let status = match position.map(|index| (index, next[index].direction)) {
            Some((index, direction)) => match direction {
                SortDirection::Asc => {
                    next[index].direction = SortDirection::Desc;
                    TableStatus::SortDesc(title)
                }
                SortDirection::Desc => {
                    next.remove(index);
                    TableStatus::SortCleared(title)
                }
            },
            None => {
                next.push(SortSpec {
                    column: key.to_owned(),
                    direction: SortDirection::Asc,
                });
                TableStatus::SortAsc(title)
            }
        };
        propose(&mut self.sorting, next, ViewChange::Sorting, events);
        status
    }

    fn set_column_filter(
        &mut self,
        key: &str,
        value: String,
        events: &mut Vec<TableEvent>,
    ) -> TableStatus {
        let Some(title) = self.title_for(key) else {
            return TableStatus::UnknownColumn(key.to_owned());
        };
        let mut next = self.column_filters.get().clone();
        let status = if value.trim().is_empty() {
            next.remove(key);
            TableStatus::FilterOff(title)
        } else {
            next.insert(key.to_owned(), value);
            TableStatus::FilterOn(title)
        };
        propose(
            &mut self.column_filters,
            next,
            ViewChange::ColumnFilters,
            events,
        );
        status
    }

    fn toggle_column(&mut self, key: &str, events: &mut Vec<TableEvent>) -> TableStatus {
        let Some(title) = self.title_for(key) else {
            return TableStatus::UnknownColumn(key.to_owned());
        };
        let mut next = self.column_visibility.get().clone();
        let status = if self.is_column_visible(key) {
            if self.visible_columns().len() <= 1 {
                return TableStatus::KeepOneColumnVisible;
            }
            next.insert(key.to_owned(), false);
            TableStatus::ColumnHidden(title)
        } else {
            next.remove(key);
            TableStatus::ColumnShown(title)
        };
        propose(
            &mut self.column_visibility,
            next,
            ViewChange::ColumnVisibility,
            events,
        );
        status
    }

    fn update_selection(
        &mut self,
        events: &mut Vec<TableEvent>,
        update: impl FnOnce(&mut RowSelection),
    ) -> TableStatus {
        if self.row_key.is_none() {
            return TableStatus::SelectionUnavailable;
        }
        let before = self.row_selection.get().len();
        let mut next = self.row_selection.get().clone();
        update(&mut next);
        let selected = next.len();
        propose(
            &mut self.row_selection,
            next,
            ViewChange::RowSelection,
            events,
        );
        if selected < before {
            TableStatus::RowDeselected { selected }
        } else {
            TableStatus::RowSelected { selected }
        }
    }

    fn select_all(&mut self, data: &[T], events: &mut Vec<TableEvent>) -> TableStatus {
        let Some(row_key) = self.row_key else {
            return TableStatus::SelectionUnavailable;
        };
        let next = self
            .filtered_rows(data)
            .into_iter()
            .map(row_key)
            .collect::<RowSelection>();
        let selected = next.len();
        propose(
            &mut self.row_selection,
            next,
            ViewChange::RowSelection,
            events,
        );
        TableStatus::AllSelected { selected }
    }

    fn move_page(
        &mut self,
        data: &[T],
        events: &mut Vec<TableEvent>,
        target: impl FnOnce(usize, usize) -> usize,
    ) -> TableStatus {
        let row_count = self.filtered_rows(data).len();
        let current = self.pagination.get().clamped(row_count);
        let pages = pagination::page_count(row_count, current.page_size);
        let next = Pagination {
            page_index: target(current.page_index, pages),
            ..current
        }
        .clamped(row_count);
        propose(&mut self.pagination, next, ViewChange::Pagination, events);
        TableStatus::Page {
            page: next.page_index + 1,
            pages,
        }
    }

    fn resize_page(
        &mut self,
        data: &[T],
        events: &mut Vec<TableEvent>,
        size: usize,
    ) -> TableStatus {
        let row_count = self.filtered_rows(data).len();
        let next = Pagination {
            page_index: self.pagination.get().page_index,
            page_size: pagination::nearest_page_size(size),
        }
        .clamped(row_count);
        propose(&mut self.pagination, next, ViewChange::Pagination, events);
        TableStatus::PageSize(next.page_size)
    }

    fn reconcile_pagination(&mut self, data: &[T], events: &mut Vec<TableEvent>) {
        let current = *self.pagination.get();
        let clamped = current.clamped(self.filtered_rows(data).len());
        // A pending bound change already carries a clamped value.
        let already_requested = events.iter().any(|event| {
            matches!(
                event,
                TableEvent::ChangeRequested(ViewChange::Pagination(_))
            )
        });
        if clamped != current && !already_requested {
            propose(
                &mut self.pagination,
                clamped,
                ViewChange::Pagination,
                events,
            );
        }
    }
}

fn propose<S: Clone + PartialEq>(
    slot: &mut StateSlot<S>,
    next: S,
    wrap: fn(S) -> ViewChange,
    events: &mut Vec<TableEvent>,
) {
    if let Some(requested) = slot.propose(next) {
        events.push(TableEvent::ChangeRequested(wrap(requested)));
    }
}
