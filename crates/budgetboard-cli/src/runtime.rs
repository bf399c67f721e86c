// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use budgetboard_app::{
    AuditAction, AuditLogEntry, AuditLogId, Dataset, EntityKind, FormKind, FormPayload, Record,
    SearchOptions, TableCommand, Value, schema,
};
use budgetboard_tui::DataSource;
use serde_json::{Map, Number};
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const AUDIT_ACTOR: &str = "budgetboard";

/// Dataset file on disk. Every load re-reads the file so edits made outside
/// the dashboard show up on reload.
pub struct JsonRuntime {
    path: PathBuf,
}

impl JsonRuntime {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for JsonRuntime {
    fn load_records(&mut self, kind: EntityKind) -> Result<Vec<Record>> {
        let mut dataset = load_dataset(&self.path)?;
        Ok(dataset.remove(&kind).unwrap_or_default())
    }

    fn submit_form(&mut self, payload: &FormPayload) -> Result<()> {
        payload.validate()?;
        let mut dataset = load_dataset(&self.path)?;
        append_payload(&mut dataset, payload, today())?;
        write_dataset(&self.path, &dataset)
    }
}

/// In-memory dataset behind `--demo`; nothing is written anywhere.
pub struct MemoryRuntime {
    dataset: Dataset,
}

impl MemoryRuntime {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }
}

impl DataSource for MemoryRuntime {
    fn load_records(&mut self, kind: EntityKind) -> Result<Vec<Record>> {
        Ok(self.dataset.get(&kind).cloned().unwrap_or_default())
    }

    fn submit_form(&mut self, payload: &FormPayload) -> Result<()> {
        payload.validate()?;
        append_payload(&mut self.dataset, payload, today())?;
        Ok(())
    }
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Reads a dataset file. A missing file is an empty dataset.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Ok(Dataset::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read dataset file {}", path.display()))?;
    parse_dataset(&raw).with_context(|| format!("parse dataset {}", path.display()))
}

pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let value: serde_json::Value = serde_json::from_str(raw).context("invalid JSON")?;
    let serde_json::Value::Object(collections) = value else {
        bail!("dataset must be a JSON object with one array per screen");
    };

    let mut dataset = Dataset::new();
    for (name, items) in collections {
        let kind = EntityKind::parse(&name).ok_or_else(|| {
            let known = EntityKind::ALL
                .iter()
                .map(|kind| kind.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow!("unknown collection {name:?}; expected one of: {known}")
        })?;
        let serde_json::Value::Array(items) = items else {
            bail!("collection {name:?} must be an array of objects");
        };
        let records = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                serde_json::Value::Object(fields) => record_from_json(fields)
                    .with_context(|| format!("{name}[{index}]")),
                _ => Err(anyhow!("{name}[{index}] is not an object")),
            })
            .collect::<Result<Vec<_>>>()?;
        dataset.insert(kind, records);
    }
    Ok(dataset)
}

fn record_from_json(fields: Map<String, serde_json::Value>) -> Result<Record> {
    let mut record = Record::new();
    for (key, json) in fields {
        let value = value_from_json(&key, json)?;
        record.insert(key, value);
    }
    Ok(record)
}

fn value_from_json(key: &str, json: serde_json::Value) -> Result<Value> {
    let value = match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(flag) => Value::Bool(flag),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(cents) if key.ends_with("_cents") => Value::Money(cents),
            Some(integer) => Value::Integer(integer),
            None if key.ends_with("_cents") => {
                bail!("field {key:?} must be a whole number of cents, got {number}")
            }
            None => Value::Decimal(number.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(text) => match Date::parse(&text, DATE_FORMAT) {
            Ok(date) => Value::Date(date),
            Err(_) => Value::Text(text),
        },
        serde_json::Value::Object(fields) => Value::Record(
            record_from_json(fields).with_context(|| format!("field {key:?}"))?,
        ),
        serde_json::Value::Array(_) => {
            bail!("field {key:?} holds an array; only scalars and nested objects are supported")
        }
    };
    Ok(value)
}

pub fn dataset_to_json(dataset: &Dataset) -> serde_json::Value {
    let collections = EntityKind::ALL
        .iter()
        .map(|kind| {
            let records = dataset
                .get(kind)
                .map(|records| records.iter().map(record_to_json).collect())
                .unwrap_or_default();
            (kind.as_str().to_owned(), serde_json::Value::Array(records))
        })
        .collect::<Map<_, _>>();
    serde_json::Value::Object(collections)
}

fn record_to_json(record: &Record) -> serde_json::Value {
    let fields = record
        .fields()
        .map(|(key, value)| (key.to_owned(), value_to_json(value)))
        .collect::<Map<_, _>>();
    serde_json::Value::Object(fields)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(flag) => serde_json::Value::Bool(*flag),
        Value::Integer(integer) | Value::Money(integer) => {
            serde_json::Value::Number(Number::from(*integer))
        }
        Value::Decimal(decimal) => Number::from_f64(*decimal)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(text) => serde_json::Value::String(text.clone()),
        Value::Date(date) => serde_json::Value::String(
            date.format(DATE_FORMAT)
                .unwrap_or_else(|_| date.to_string()),
        ),
        Value::Record(record) => record_to_json(record),
    }
}

pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create dataset directory {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(&dataset_to_json(dataset))
        .context("encode dataset as JSON")?;
    fs::write(path, body).with_context(|| format!("write dataset file {}", path.display()))
}

fn parent_kind(kind: FormKind) -> Option<EntityKind> {
    match kind {
        FormKind::Ministry => None,
        FormKind::Program => Some(EntityKind::Ministries),
        FormKind::Engagement => Some(EntityKind::Operations),
        FormKind::Payment => Some(EntityKind::Engagements),
    }
}

fn next_id(records: &[Record]) -> i64 {
    records
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_integer))
        .max()
        .unwrap_or(0)
        + 1
}

/// Stores `payload` as a new record with its parent nested, and logs the
/// creation. Returns the new id.
pub fn append_payload(dataset: &mut Dataset, payload: &FormPayload, today: Date) -> Result<i64> {
    let kind = payload.kind();
    let entity = kind.entity();
    let id = next_id(dataset.get(&entity).map(Vec::as_slice).unwrap_or_default());
    let mut record = payload.to_record(id);

    if let (Some((field, parent_id)), Some(parent_kind)) = (payload.parent(), parent_kind(kind)) {
        let parent = dataset
            .get(&parent_kind)
            .and_then(|records| {
                records
                    .iter()
                    .find(|record| record.get("id").and_then(Value::as_integer) == Some(parent_id))
            })
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "{field} {parent_id} not found -- check the id on the {} screen",
                    parent_kind.label()
                )
            })?;
        record.insert(field, parent);
    }

    dataset.entry(entity).or_default().push(record);

    let audit = dataset.entry(EntityKind::AuditLog).or_default();
    let entry = AuditLogEntry {
        id: AuditLogId::new(next_id(audit)),
        actor: AUDIT_ACTOR.to_owned(),
        action: AuditAction::Create,
        entity,
        target_id: id,
        logged_on: today,
        details: format!("added {} #{id}", kind.label()),
    };
    audit.push(Record::from(&entry));
    Ok(id)
}

/// Tab-separated export of one screen: visible column titles, then the
/// matching rows in default order.
pub fn export_tsv(
    dataset: &Dataset,
    kind: EntityKind,
    options: SearchOptions,
    query: Option<&str>,
) -> Result<String> {
    let records = dataset.get(&kind).map(Vec::as_slice).unwrap_or_default();
    let mut table = schema::table_for(kind, options, budgetboard_app::DEFAULT_PAGE_SIZE)?;
    if let Some(query) = query {
        table.dispatch(TableCommand::SetSearchQuery(query.to_owned()), records);
    }

    let header = table
        .visible_columns()
        .iter()
        .map(|column| column.title.clone())
        .collect::<Vec<_>>();
    let mut lines = vec![header.join("\t")];
    lines.extend(
        table
            .export_rows(records)
            .into_iter()
            .map(|row| row.join("\t")),
    );
    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}
