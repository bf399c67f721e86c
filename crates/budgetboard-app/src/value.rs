// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Result, bail};
use time::Date;

use crate::search::normalize;

/// A single cell of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    /// Amounts are stored in cents to keep sums exact.
    Money(i64),
    Text(String),
    Date(Date),
    Record(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) | Self::Money(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// The string a free-text search compares against. Null and nested
    /// records have no searchable text.
    pub fn search_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::Record(_) => None,
            Self::Bool(value) => Some(value.to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Decimal(value) => Some(value.to_string()),
            Self::Money(cents) => Some(format_plain_money(*cents)),
            Self::Text(value) => Some(value.clone()),
            Self::Date(value) => Some(value.to_string()),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Null | Self::Record(_) => String::new(),
            Self::Bool(true) => "yes".to_owned(),
            Self::Bool(false) => "no".to_owned(),
            Self::Integer(value) => value.to_string(),
            Self::Decimal(value) => format!("{value:.2}"),
            Self::Money(cents) => format_money(*cents),
            Self::Text(value) => value.clone(),
            Self::Date(value) => value.to_string(),
        }
    }

    /// Default ordering used by sortable columns. Values are ranked by
    /// kind first (booleans, numbers, dates, text, records, null) so a
    /// column holding mixed kinds still sorts totally. Integers, decimals
    /// and money share the numeric rank, money counted in whole units.
    /// Text compares on its accent- and case-folded form.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        self.kind_rank()
            .cmp(&other.kind_rank())
            .then_with(|| match (self, other) {
                (Self::Bool(left), Self::Bool(right)) => left.cmp(right),
                (Self::Date(left), Self::Date(right)) => left.cmp(right),
                (Self::Text(left), Self::Text(right)) => {
                    normalize(left.as_str()).cmp(&normalize(right.as_str()))
                }
                _ => match (self.numeric(), other.numeric()) {
                    (Some(left), Some(right)) => left.total_cmp(&right),
                    _ => Ordering::Equal,
                },
            })
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Integer(_) | Self::Decimal(_) | Self::Money(_) => 1,
            Self::Date(_) => 2,
            Self::Text(_) => 3,
            Self::Record(_) => 4,
            Self::Null => 5,
        }
    }

    fn numeric(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Decimal(value) => Some(*value),
            Self::Money(cents) => Some(*cents as f64 / 100.0),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One domain entity as a field-name to value mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Walks a dotted path. Any missing field, null, or non-record value on
    /// the way yields `None`.
    pub fn lookup(&self, path: &FieldPath) -> Option<&Value> {
        let (last, parents) = path.segments.split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.get(segment)?.as_record()?;
        }
        current.get(last)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// A parsed dotted field path such as `engagement.operation.code`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("field path is empty");
        }
        let segments = trimmed
            .split('.')
            .map(str::trim)
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if segments.iter().any(String::is_empty) {
            bail!("field path {raw:?} has an empty segment -- use names like `a.b`");
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Anything the search engine and table can read fields from.
pub trait FieldSource {
    fn field(&self, path: &FieldPath) -> Option<Value>;
}

impl FieldSource for Record {
    fn field(&self, path: &FieldPath) -> Option<Value> {
        self.lookup(path).cloned()
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn field(&self, path: &FieldPath) -> Option<Value> {
        (**self).field(path)
    }
}

/// Parses a list of dotted paths, skipping the ones that do not parse.
/// A malformed path can never match, so dropping it is equivalent.
pub fn field_paths<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<FieldPath> {
    raw.into_iter()
        .filter_map(|path| FieldPath::parse(path).ok())
        .collect()
}

pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    let units = (absolute / 100).to_string();
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (index, ch) in units.chars().enumerate() {
        if index > 0 && (units.len() - index) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{:02}", absolute % 100)
}

fn format_plain_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    format!("{sign}{}.{:02}", absolute / 100, absolute % 100)
}
