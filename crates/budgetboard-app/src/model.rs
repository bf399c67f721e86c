// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;
use crate::value::{FieldPath, FieldSource, Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EngagementStatus {
    Draft,
    Approved,
    Settled,
    Cancelled,
}

impl EngagementStatus {
    pub const ALL: [Self; 4] = [Self::Draft, Self::Approved, Self::Settled, Self::Cancelled];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Settled => "settled",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "approved" => Some(Self::Approved),
            "settled" => Some(Self::Settled),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Transfer,
    Cheque,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::Transfer, Self::Cheque, Self::Cash];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Cheque => "cheque",
            Self::Cash => "cash",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "transfer" => Some(Self::Transfer),
            "cheque" => Some(Self::Cheque),
            "cash" => Some(Self::Cash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub const ALL: [Self; 3] = [Self::Create, Self::Update, Self::Delete];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// One dashboard screen, each backed by a single record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Ministries,
    Programs,
    Operations,
    Engagements,
    Payments,
    Forecasts,
    AuditLog,
}

impl EntityKind {
    pub const ALL: [Self; 7] = [
        Self::Ministries,
        Self::Programs,
        Self::Operations,
        Self::Engagements,
        Self::Payments,
        Self::Forecasts,
        Self::AuditLog,
    ];

    /// Stable identifier, also the collection name in dataset files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ministries => "ministries",
            Self::Programs => "programs",
            Self::Operations => "operations",
            Self::Engagements => "engagements",
            Self::Payments => "payments",
            Self::Forecasts => "forecasts",
            Self::AuditLog => "audit_log",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ministries => "ministries",
            Self::Programs => "programs",
            Self::Operations => "operations",
            Self::Engagements => "engagements",
            Self::Payments => "payments",
            Self::Forecasts => "forecasts",
            Self::AuditLog => "audit",
        }
    }

    pub const fn form_kind(self) -> Option<FormKind> {
        match self {
            Self::Ministries => Some(FormKind::Ministry),
            Self::Programs => Some(FormKind::Program),
            Self::Engagements => Some(FormKind::Engagement),
            Self::Payments => Some(FormKind::Payment),
            Self::Operations | Self::Forecasts | Self::AuditLog => None,
        }
    }
}

/// Every screen's records, keyed by screen.
pub type Dataset = BTreeMap<EntityKind, Vec<Record>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    Ministry,
    Program,
    Engagement,
    Payment,
}

impl FormKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ministry => "ministry",
            Self::Program => "program",
            Self::Engagement => "engagement",
            Self::Payment => "payment",
        }
    }

    pub const fn entity(self) -> EntityKind {
        match self {
            Self::Ministry => EntityKind::Ministries,
            Self::Program => EntityKind::Programs,
            Self::Engagement => EntityKind::Engagements,
            Self::Payment => EntityKind::Payments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Search,
    Form(FormKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ministry {
    pub id: MinistryId,
    pub code: String,
    pub name: String,
    pub minister: String,
    pub created_on: Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub id: ProgramId,
    pub ministry_id: MinistryId,
    pub code: String,
    pub name: String,
    pub budget_cents: i64,
    pub ministry: Option<Box<Ministry>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub id: OperationId,
    pub program_id: ProgramId,
    pub code: String,
    pub label: String,
    pub region: String,
    pub allocated_cents: i64,
    pub program: Option<Box<Program>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engagement {
    pub id: EngagementId,
    pub operation_id: OperationId,
    pub reference: String,
    pub beneficiary: String,
    pub amount_cents: i64,
    pub status: EngagementStatus,
    pub signed_on: Date,
    pub operation: Option<Box<Operation>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: PaymentId,
    pub engagement_id: EngagementId,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub paid_on: Option<Date>,
    pub engagement: Option<Box<Engagement>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forecast {
    pub id: ForecastId,
    pub program_id: ProgramId,
    pub fiscal_year: i32,
    pub planned_cents: i64,
    pub program: Option<Box<Program>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    pub actor: String,
    pub action: AuditAction,
    pub entity: EntityKind,
    pub target_id: i64,
    pub logged_on: Date,
    pub details: String,
}

fn nested<T>(relation: &Option<Box<T>>) -> Value
where
    for<'a> &'a T: Into<Record>,
{
    relation
        .as_deref()
        .map_or(Value::Null, |related| Value::Record(related.into()))
}

impl From<&Ministry> for Record {
    fn from(ministry: &Ministry) -> Self {
        Record::new()
            .with("id", ministry.id.get())
            .with("code", ministry.code.as_str())
            .with("name", ministry.name.as_str())
            .with("minister", ministry.minister.as_str())
            .with("created_on", ministry.created_on)
    }
}

impl From<&Program> for Record {
    fn from(program: &Program) -> Self {
        Record::new()
            .with("id", program.id.get())
            .with("ministry_id", program.ministry_id.get())
            .with("code", program.code.as_str())
            .with("name", program.name.as_str())
            .with("budget_cents", Value::Money(program.budget_cents))
            .with("ministry", nested(&program.ministry))
    }
}

impl From<&Operation> for Record {
    fn from(operation: &Operation) -> Self {
        Record::new()
            .with("id", operation.id.get())
            .with("program_id", operation.program_id.get())
            .with("code", operation.code.as_str())
            .with("label", operation.label.as_str())
            .with("region", operation.region.as_str())
            .with("allocated_cents", Value::Money(operation.allocated_cents))
            .with("program", nested(&operation.program))
    }
}

impl From<&Engagement> for Record {
    fn from(engagement: &Engagement) -> Self {
        Record::new()
            .with("id", engagement.id.get())
            .with("operation_id", engagement.operation_id.get())
            .with("reference", engagement.reference.as_str())
            .with("beneficiary", engagement.beneficiary.as_str())
            .with("amount_cents", Value::Money(engagement.amount_cents))
            .with("status", engagement.status.as_str())
            .with("signed_on", engagement.signed_on)
            .with("operation", nested(&engagement.operation))
    }
}

impl From<&Payment> for Record {
    fn from(payment: &Payment) -> Self {
        Record::new()
            .with("id", payment.id.get())
            .with("engagement_id", payment.engagement_id.get())
            .with("amount_cents", Value::Money(payment.amount_cents))
            .with("method", payment.method.as_str())
            .with("paid_on", payment.paid_on)
            .with("engagement", nested(&payment.engagement))
    }
}

impl From<&Forecast> for Record {
    fn from(forecast: &Forecast) -> Self {
        Record::new()
            .with("id", forecast.id.get())
            .with("program_id", forecast.program_id.get())
            .with("fiscal_year", forecast.fiscal_year)
            .with("planned_cents", Value::Money(forecast.planned_cents))
            .with("program", nested(&forecast.program))
    }
}

impl From<&AuditLogEntry> for Record {
    fn from(entry: &AuditLogEntry) -> Self {
        Record::new()
            .with("id", entry.id.get())
            .with("actor", entry.actor.as_str())
            .with("action", entry.action.as_str())
            .with("entity", entry.entity.as_str())
            .with("target_id", entry.target_id)
            .with("logged_on", entry.logged_on)
            .with("details", entry.details.as_str())
    }
}

macro_rules! record_field_source {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl FieldSource for $entity {
                fn field(&self, path: &FieldPath) -> Option<Value> {
                    Record::from(self).lookup(path).cloned()
                }
            }
        )+
    };
}

record_field_source!(
    Ministry,
    Program,
    Operation,
    Engagement,
    Payment,
    Forecast,
    AuditLogEntry,
);
