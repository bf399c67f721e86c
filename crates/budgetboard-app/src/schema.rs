// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Per-screen table layout: which columns each screen shows and which
//! fields its search box looks at.

use std::cmp::Ordering;

use anyhow::Result;

use crate::EngagementStatus;
use crate::EntityKind;
use crate::search::SearchOptions;
use crate::table::{ColumnDescriptor, TableView};
use crate::value::{FieldPath, Record, Value, field_paths};

type Column = ColumnDescriptor<Record>;

pub fn columns(kind: EntityKind) -> Result<Vec<Column>> {
    let columns = match kind {
        EntityKind::Ministries => vec![
            Column::new("id", "ID")?,
            Column::new("code", "Code")?,
            Column::new("name", "Name")?,
            Column::new("minister", "Minister")?,
            Column::new("created_on", "Created")?,
        ],
        EntityKind::Programs => vec![
            Column::new("id", "ID")?,
            Column::new("code", "Code")?,
            Column::new("name", "Name")?,
            Column::at("ministry", "Ministry", "ministry.code")?,
            Column::new("budget_cents", "Budget")?,
        ],
        EntityKind::Operations => vec![
            Column::new("id", "ID")?,
            Column::new("code", "Code")?,
            Column::new("label", "Label")?,
            Column::new("region", "Region")?,
            Column::at("program", "Program", "program.code")?,
            Column::new("allocated_cents", "Allocated")?,
        ],
        EntityKind::Engagements => vec![
            Column::new("id", "ID")?,
            Column::new("reference", "Reference")?,
            Column::new("beneficiary", "Beneficiary")?,
            Column::at("operation", "Operation", "operation.code")?,
            Column::new("amount_cents", "Amount")?,
            Column::new("status", "Status")?
                .with_renderer(render_status)
                .with_comparator(compare_status),
            Column::new("signed_on", "Signed")?,
        ],
        EntityKind::Payments => vec![
            Column::new("id", "ID")?,
            Column::at("reference", "Engagement", "engagement.reference")?,
            Column::at("beneficiary", "Beneficiary", "engagement.beneficiary")?,
            Column::new("amount_cents", "Amount")?,
            Column::new("method", "Method")?,
            Column::new("paid_on", "Paid")?.with_renderer(render_paid_on),
        ],
        EntityKind::Forecasts => vec![
            Column::new("id", "ID")?,
            Column::at("program", "Program", "program.name")?,
            Column::new("fiscal_year", "Year")?.with_renderer(render_fiscal_year),
            Column::new("planned_cents", "Planned")?,
        ],
        EntityKind::AuditLog => vec![
            Column::new("id", "ID")?,
            Column::new("logged_on", "Date")?,
            Column::new("actor", "Actor")?,
            Column::new("action", "Action")?,
            Column::new("entity", "Entity")?,
            Column::new("target_id", "Target")?,
            Column::new("details", "Details")?,
        ],
    };
    Ok(columns)
}

pub fn search_fields(kind: EntityKind) -> Vec<FieldPath> {
    let raw: &[&str] = match kind {
        EntityKind::Ministries => &["code", "name", "minister"],
        EntityKind::Programs => &["code", "name", "ministry.name", "ministry.code"],
        EntityKind::Operations => &["code", "label", "region", "program.name"],
        EntityKind::Engagements => &[
            "reference",
            "beneficiary",
            "status",
            "operation.label",
            "operation.program.name",
        ],
        EntityKind::Payments => &[
            "engagement.reference",
            "engagement.beneficiary",
            "method",
            "engagement.operation.label",
        ],
        EntityKind::Forecasts => &["program.name", "program.code", "fiscal_year"],
        EntityKind::AuditLog => &["actor", "action", "entity", "details"],
    };
    field_paths(raw.iter().copied())
}

/// A selectable table for `kind`, keyed by each record's `id`.
pub fn table_for(
    kind: EntityKind,
    options: SearchOptions,
    page_size: usize,
) -> Result<TableView<Record>> {
    Ok(TableView::new(columns(kind)?)
        .with_row_key(record_id)
        .with_search_fields(search_fields(kind))
        .with_search_options(options)
        .with_page_size(page_size))
}

pub fn record_id(record: &Record) -> String {
    record.get("id").map(Value::display).unwrap_or_default()
}

fn status_of(record: &Record) -> Option<EngagementStatus> {
    record
        .get("status")
        .and_then(Value::as_text)
        .and_then(EngagementStatus::parse)
}

fn render_status(record: &Record) -> String {
    match status_of(record) {
        Some(EngagementStatus::Draft) => "DRAFT".to_owned(),
        Some(EngagementStatus::Approved) => "APPROVED".to_owned(),
        Some(EngagementStatus::Settled) => "SETTLED".to_owned(),
        Some(EngagementStatus::Cancelled) => "CANCELLED".to_owned(),
        None => record.get("status").map(Value::display).unwrap_or_default(),
    }
}

/// Lifecycle order rather than alphabetical; unknown statuses go last.
fn compare_status(left: &Record, right: &Record) -> Ordering {
    match (status_of(left), status_of(right)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn render_paid_on(record: &Record) -> String {
    match record.get("paid_on") {
        Some(Value::Date(date)) => date.to_string(),
        _ => "pending".to_owned(),
    }
}

fn render_fiscal_year(record: &Record) -> String {
    record
        .get("fiscal_year")
        .and_then(Value::as_integer)
        .map(|year| format!("FY{year}"))
        .unwrap_or_default()
}
