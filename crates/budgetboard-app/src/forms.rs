// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::value::{Record, Value};
use crate::{EngagementId, EngagementStatus, FormKind, MinistryId, OperationId, PaymentMethod};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinistryFormInput {
    pub code: String,
    pub name: String,
    pub minister: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramFormInput {
    pub ministry_id: MinistryId,
    pub code: String,
    pub name: String,
    pub budget_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementFormInput {
    pub operation_id: OperationId,
    pub reference: String,
    pub beneficiary: String,
    pub amount_cents: i64,
    pub status: EngagementStatus,
    pub signed_on: Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFormInput {
    pub engagement_id: EngagementId,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub paid_on: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Ministry(MinistryFormInput),
    Program(ProgramFormInput),
    Engagement(EngagementFormInput),
    Payment(PaymentFormInput),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Ministry(_) => FormKind::Ministry,
            Self::Program(_) => FormKind::Program,
            Self::Engagement(_) => FormKind::Engagement,
            Self::Payment(_) => FormKind::Payment,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Ministry(ministry) => ministry.validate(),
            Self::Program(program) => program.validate(),
            Self::Engagement(engagement) => engagement.validate(),
            Self::Payment(payment) => payment.validate(),
        }
    }

    /// Id of the parent record this payload points at, with the field name
    /// the nested copy of that parent is stored under.
    pub fn parent(&self) -> Option<(&'static str, i64)> {
        match self {
            Self::Ministry(_) => None,
            Self::Program(program) => Some(("ministry", program.ministry_id.get())),
            Self::Engagement(engagement) => Some(("operation", engagement.operation_id.get())),
            Self::Payment(payment) => Some(("engagement", payment.engagement_id.get())),
        }
    }

    /// The flat record a data source stores for this payload. Relations are
    /// left for the source to nest.
    pub fn to_record(&self, id: i64) -> Record {
        let record = Record::new().with("id", id);
        match self {
            Self::Ministry(ministry) => record
                .with("code", ministry.code.trim())
                .with("name", ministry.name.trim())
                .with("minister", ministry.minister.trim()),
            Self::Program(program) => record
                .with("ministry_id", program.ministry_id.get())
                .with("code", program.code.trim())
                .with("name", program.name.trim())
                .with("budget_cents", Value::Money(program.budget_cents)),
            Self::Engagement(engagement) => record
                .with("operation_id", engagement.operation_id.get())
                .with("reference", engagement.reference.trim())
                .with("beneficiary", engagement.beneficiary.trim())
                .with("amount_cents", Value::Money(engagement.amount_cents))
                .with("status", engagement.status.as_str())
                .with("signed_on", engagement.signed_on),
            Self::Payment(payment) => record
                .with("engagement_id", payment.engagement_id.get())
                .with("amount_cents", Value::Money(payment.amount_cents))
                .with("method", payment.method.as_str())
                .with("paid_on", payment.paid_on),
        }
    }
}

impl MinistryFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            bail!("ministry code is required -- enter a code and retry");
        }
        if self.name.trim().is_empty() {
            bail!("ministry name is required -- enter a name and retry");
        }
        Ok(())
    }
}

impl ProgramFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.ministry_id.get() <= 0 {
            bail!("program ministry is required -- enter a ministry id and retry");
        }
        if self.code.trim().is_empty() {
            bail!("program code is required -- enter a code and retry");
        }
        if self.name.trim().is_empty() {
            bail!("program name is required -- enter a name and retry");
        }
        if self.budget_cents < 0 {
            bail!("program budget cannot be negative");
        }
        Ok(())
    }
}

impl EngagementFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.operation_id.get() <= 0 {
            bail!("engagement operation is required -- enter an operation id and retry");
        }
        if self.reference.trim().is_empty() {
            bail!("engagement reference is required -- enter a reference and retry");
        }
        if self.beneficiary.trim().is_empty() {
            bail!("engagement beneficiary is required -- enter a name and retry");
        }
        if self.amount_cents <= 0 {
            bail!("engagement amount must be positive");
        }
        Ok(())
    }
}

impl PaymentFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.engagement_id.get() <= 0 {
            bail!("payment engagement is required -- enter an engagement id and retry");
        }
        if self.amount_cents <= 0 {
            bail!("payment amount must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
}

const fn field(label: &'static str, hint: &'static str) -> FormField {
    FormField { label, hint }
}

pub fn form_fields(kind: FormKind) -> &'static [FormField] {
    const MINISTRY: &[FormField] = &[
        field("code", "MIN-EDU"),
        field("name", "required"),
        field("minister", "optional"),
    ];
    const PROGRAM: &[FormField] = &[
        field("ministry id", "e.g. 1"),
        field("code", "P-101"),
        field("name", "required"),
        field("budget", "12 500.00"),
    ];
    const ENGAGEMENT: &[FormField] = &[
        field("operation id", "e.g. 1"),
        field("reference", "ENG-2026-001"),
        field("beneficiary", "required"),
        field("amount", "2 500.00"),
        field("status", "draft|approved|settled|cancelled"),
        field("signed on", "YYYY-MM-DD"),
    ];
    const PAYMENT: &[FormField] = &[
        field("engagement id", "e.g. 1"),
        field("amount", "1 250.00"),
        field("method", "transfer|cheque|cash"),
        field("paid on", "YYYY-MM-DD or blank"),
    ];
    match kind {
        FormKind::Ministry => MINISTRY,
        FormKind::Program => PROGRAM,
        FormKind::Engagement => ENGAGEMENT,
        FormKind::Payment => PAYMENT,
    }
}

/// Text typed into an open form, one buffer per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    kind: FormKind,
    values: Vec<String>,
    field_index: usize,
}

impl FormDraft {
    pub fn new(kind: FormKind) -> Self {
        let mut values = vec![String::new(); form_fields(kind).len()];
        match kind {
            FormKind::Engagement => values[4] = EngagementStatus::Draft.as_str().to_owned(),
            FormKind::Payment => values[2] = PaymentMethod::Transfer.as_str().to_owned(),
            FormKind::Ministry | FormKind::Program => {}
        }
        Self {
            kind,
            values,
            field_index: 0,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn field_index(&self) -> usize {
        self.field_index
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn current_field(&self) -> FormField {
        form_fields(self.kind)[self.field_index]
    }

    /// Moves the cursor with wrap-around.
    pub fn move_field(&mut self, delta: isize) {
        let len = self.values.len() as isize;
        self.field_index = (self.field_index as isize + delta).rem_euclid(len) as usize;
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value.into();
        }
    }

    pub fn push_char(&mut self, ch: char) {
        self.values[self.field_index].push(ch);
    }

    pub fn pop_char(&mut self) {
        self.values[self.field_index].pop();
    }

    pub fn to_payload(&self) -> Result<FormPayload> {
        let value = |index: usize| self.values[index].trim();
        let payload = match self.kind {
            FormKind::Ministry => FormPayload::Ministry(MinistryFormInput {
                code: value(0).to_owned(),
                name: value(1).to_owned(),
                minister: value(2).to_owned(),
            }),
            FormKind::Program => FormPayload::Program(ProgramFormInput {
                ministry_id: MinistryId::new(parse_id(value(0), "ministry id")?),
                code: value(1).to_owned(),
                name: value(2).to_owned(),
                budget_cents: parse_money(value(3)).context("program budget")?,
            }),
            FormKind::Engagement => FormPayload::Engagement(EngagementFormInput {
                operation_id: OperationId::new(parse_id(value(0), "operation id")?),
                reference: value(1).to_owned(),
                beneficiary: value(2).to_owned(),
                amount_cents: parse_money(value(3)).context("engagement amount")?,
                status: EngagementStatus::parse(&value(4).to_lowercase()).ok_or_else(|| {
                    anyhow!(
                        "engagement status {:?} is unknown -- use draft, approved, settled or cancelled",
                        value(4)
                    )
                })?,
                signed_on: parse_date(value(5)).context("engagement signed on")?,
            }),
            FormKind::Payment => FormPayload::Payment(PaymentFormInput {
                engagement_id: EngagementId::new(parse_id(value(0), "engagement id")?),
                amount_cents: parse_money(value(1)).context("payment amount")?,
                method: PaymentMethod::parse(&value(2).to_lowercase()).ok_or_else(|| {
                    anyhow!(
                        "payment method {:?} is unknown -- use transfer, cheque or cash",
                        value(2)
                    )
                })?,
                paid_on: if value(3).is_empty() {
                    None
                } else {
                    Some(parse_date(value(3)).context("payment paid on")?)
                },
            }),
        };
        Ok(payload)
    }
}

fn parse_id(raw: &str, label: &str) -> Result<i64> {
    if raw.is_empty() {
        bail!("{label} is required -- enter a number and retry");
    }
    raw.parse::<i64>()
        .with_context(|| format!("{label} {raw:?} is not a whole number"))
}

/// Parses an amount such as `1 234.5` or `-12.30` into cents. Spaces group
/// thousands; at most two decimals.
pub fn parse_money(raw: &str) -> Result<i64> {
    let compact = raw
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>();
    if compact.is_empty() {
        bail!("amount is required -- enter a value like 1 250.00");
    }
    let (negative, digits) = match compact.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, compact.as_str()),
    };
    let (units, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let all_digits = |part: &str| part.chars().all(|ch| ch.is_ascii_digit());
    if units.is_empty() || !all_digits(units) || !all_digits(fraction) || fraction.len() > 2 {
        bail!("amount {raw:?} is not a valid amount -- use a value like 1 250.00");
    }
    let units = units
        .parse::<i64>()
        .with_context(|| format!("amount {raw:?} is too large"))?;
    let cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().unwrap_or(0) * 10,
        _ => fraction.parse::<i64>().unwrap_or(0),
    };
    let total = units
        .checked_mul(100)
        .and_then(|value| value.checked_add(cents))
        .ok_or_else(|| anyhow!("amount {raw:?} is too large"))?;
    Ok(if negative { -total } else { total })
}

pub fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("date {raw:?} is invalid -- use YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::{
        EngagementFormInput, FormDraft, FormPayload, MinistryFormInput, PaymentFormInput,
        ProgramFormInput, form_fields, parse_date, parse_money,
    };
    use crate::value::Value;
    use crate::{EngagementId, EngagementStatus, FormKind, MinistryId, OperationId, PaymentMethod};
    use time::{Date, Month};

    #[test]
    fn drafts_start_with_one_buffer_per_field() {
        for kind in [
            FormKind::Ministry,
            FormKind::Program,
            FormKind::Engagement,
            FormKind::Payment,
        ] {
            let draft = FormDraft::new(kind);
            assert_eq!(draft.values().len(), form_fields(kind).len());
            assert_eq!(draft.field_index(), 0);
        }
    }

    #[test]
    fn ministry_validation_rejects_empty_name() {
        let payload = FormPayload::Ministry(MinistryFormInput {
            code: "MIN-X".to_owned(),
            name: "  ".to_owned(),
            minister: String::new(),
        });
        let error = payload.validate().expect_err("blank name rejected");
        assert!(error.to_string().contains("name is required"));
    }

    #[test]
    fn program_validation_requires_ministry() {
        let payload = FormPayload::Program(ProgramFormInput {
            ministry_id: MinistryId::new(0),
            code: "P-1".to_owned(),
            name: "Routes".to_owned(),
            budget_cents: 0,
        });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn engagement_validation_rejects_non_positive_amount() {
        let payload = FormPayload::Engagement(EngagementFormInput {
            operation_id: OperationId::new(1),
            reference: "ENG-1".to_owned(),
            beneficiary: "Jean Dupont".to_owned(),
            amount_cents: 0,
            status: EngagementStatus::Draft,
            signed_on: Date::from_calendar_date(2026, Month::March, 1).expect("valid date"),
        });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn payment_validation_accepts_valid_payload() {
        let payload = FormPayload::Payment(PaymentFormInput {
            engagement_id: EngagementId::new(4),
            amount_cents: 99,
            method: PaymentMethod::Cash,
            paid_on: None,
        });
        assert!(payload.validate().is_ok());
        assert_eq!(payload.parent(), Some(("engagement", 4)));
    }

    #[test]
    fn draft_parses_into_payload() {
        let mut draft = FormDraft::new(FormKind::Engagement);
        for ch in "3".chars() {
            draft.push_char(ch);
        }
        draft.set_value(1, "ENG-2026-010");
        draft.set_value(2, "Hélène Martin");
        draft.set_value(3, "12 000.5");
        draft.set_value(5, "2026-04-02");

        let payload = draft.to_payload().expect("draft parses");
        payload.validate().expect("payload validates");
        let record = payload.to_record(11);
        assert_eq!(record.get("amount_cents"), Some(&Value::Money(1_200_050)));
        assert_eq!(record.get("status"), Some(&Value::from("draft")));
        assert_eq!(record.get("operation_id"), Some(&Value::Integer(3)));
    }

    #[test]
    fn draft_reports_the_field_that_failed() {
        let mut draft = FormDraft::new(FormKind::Payment);
        draft.set_value(0, "2");
        draft.set_value(1, "10");
        draft.set_value(2, "bitcoin");
        let error = draft.to_payload().expect_err("unknown method rejected");
        assert!(error.to_string().contains("payment method"));
    }

    #[test]
    fn field_cursor_wraps_both_ways() {
        let mut draft = FormDraft::new(FormKind::Ministry);
        draft.move_field(-1);
        assert_eq!(draft.current_field().label, "minister");
        draft.move_field(1);
        assert_eq!(draft.field_index(), 0);
        draft.push_char('x');
        draft.pop_char();
        draft.pop_char();
        assert_eq!(draft.values()[0], "");
    }

    #[test]
    fn money_parsing_accepts_grouped_amounts() {
        assert_eq!(parse_money("1 234.56").expect("grouped"), 123_456);
        assert_eq!(parse_money("7").expect("whole"), 700);
        assert_eq!(parse_money("-0.5").expect("negative"), -50);
        assert!(parse_money("").is_err());
        assert!(parse_money("1.234").is_err());
        assert!(parse_money("12a").is_err());
        assert!(parse_money(".5").is_err());
    }

    #[test]
    fn date_parsing_uses_iso_format() {
        assert_eq!(
            parse_date("2026-01-31").expect("valid"),
            Date::from_calendar_date(2026, Month::January, 31).expect("valid date")
        );
        assert!(parse_date("31/01/2026").is_err());
    }
}
