// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use budgetboard_app::{
    AuditAction, AuditLogEntry, AuditLogId, Dataset, Engagement, EngagementId, EngagementStatus,
    EntityKind, Forecast, ForecastId, Ministry, MinistryId, Operation, OperationId, Payment,
    PaymentId, PaymentMethod, Program, ProgramId, Record,
};
use std::path::PathBuf;
use time::Date;

const MINISTRIES: [(&str, &str); 8] = [
    ("MIN-EDU", "Éducation nationale"),
    ("MIN-SAN", "Santé et prévention"),
    ("MIN-AGR", "Agriculture et souveraineté alimentaire"),
    ("MIN-TRA", "Transports"),
    ("MIN-CUL", "Culture"),
    ("MIN-ENV", "Transition écologique"),
    ("MIN-JUS", "Justice"),
    ("MIN-ECO", "Économie et finances"),
];

const PROGRAM_THEMES: [&str; 12] = [
    "Écoles rurales",
    "Hôpitaux de proximité",
    "Irrigation durable",
    "Réseau ferré régional",
    "Patrimoine et musées",
    "Rénovation énergétique",
    "Accès au droit",
    "Soutien aux PME",
    "Numérique éducatif",
    "Prévention des crues",
    "Routes départementales",
    "Formation professionnelle",
];

const OPERATION_LABELS: [&str; 10] = [
    "Rénovation",
    "Construction",
    "Équipement",
    "Étude préalable",
    "Maintenance",
    "Mise aux normes",
    "Extension",
    "Acquisition",
    "Dématérialisation",
    "Sécurisation",
];

const REGIONS: [&str; 13] = [
    "Bretagne",
    "Normandie",
    "Occitanie",
    "Grand Est",
    "Hauts-de-France",
    "Île-de-France",
    "Auvergne-Rhône-Alpes",
    "Provence-Alpes-Côte d'Azur",
    "Nouvelle-Aquitaine",
    "Pays de la Loire",
    "Centre-Val de Loire",
    "Bourgogne-Franche-Comté",
    "Corse",
];

const FIRST_NAMES: [&str; 16] = [
    "Jean", "Hélène", "Éloïse", "François", "Chloé", "Jérôme", "Anaïs", "Noël", "Marie", "Léa",
    "Benoît", "Zoé", "Gaël", "Inès", "Théo", "Céline",
];
const LAST_NAMES: [&str; 16] = [
    "Dupont", "Martin", "Lefèvre", "Bernard", "Girard", "Rousseau", "Faure", "Mercier", "Fontaine",
    "Chevalier", "Gauthier", "Périer", "Lemaître", "Brûlé", "Moreau", "Caron",
];
const COMPANY_SUFFIXES: [&str; 5] = ["SARL", "SAS", "et Fils", "Associés", "Conseil"];

const AUDIT_ACTORS: [&str; 5] = [
    "admin",
    "controleur.budget",
    "saisie.engagements",
    "tresorerie",
    "auditeur",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of budget entities. The same seed always produces the
/// same sequence of values.
#[derive(Debug, Clone)]
pub struct BudgetFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl BudgetFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn person_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    pub fn beneficiary(&mut self) -> String {
        if self.rng.int_n(3) == 0 {
            let last_name = self.pick(&LAST_NAMES);
            let suffix = self.pick(&COMPANY_SUFFIXES);
            format!("{last_name} {suffix}")
        } else {
            self.person_name()
        }
    }

    pub fn ministry(&mut self, id: i64) -> Ministry {
        let index = usize::try_from(id.saturating_sub(1)).unwrap_or(0) % MINISTRIES.len();
        let (code, name) = MINISTRIES[index];
        Ministry {
            id: MinistryId::new(id),
            code: code.to_owned(),
            name: name.to_owned(),
            minister: self.person_name(),
            created_on: self.date_in_year(REFERENCE_YEAR - 2),
        }
    }

    pub fn program(&mut self, id: i64, ministry: &Ministry) -> Program {
        Program {
            id: ProgramId::new(id),
            ministry_id: ministry.id,
            code: format!("P-{}", 100 + id),
            name: self.pick(&PROGRAM_THEMES).to_owned(),
            budget_cents: self.int_range_i64(50_000, 900_000) * 10_000,
            ministry: Some(Box::new(ministry.clone())),
        }
    }

    pub fn operation(&mut self, id: i64, program: &Program) -> Operation {
        Operation {
            id: OperationId::new(id),
            program_id: program.id,
            code: format!("OP-{id:04}"),
            label: self.pick(&OPERATION_LABELS).to_owned(),
            region: self.pick(&REGIONS).to_owned(),
            allocated_cents: program.budget_cents / self.int_range_i64(4, 12),
            program: Some(Box::new(program.clone())),
        }
    }

    pub fn engagement(&mut self, id: i64, operation: &Operation) -> Engagement {
        let status = EngagementStatus::ALL[self.rng.int_n(EngagementStatus::ALL.len())];
        Engagement {
            id: EngagementId::new(id),
            operation_id: operation.id,
            reference: format!("ENG-{REFERENCE_YEAR}-{id:03}"),
            beneficiary: self.beneficiary(),
            amount_cents: self.int_range_i64(1_000, 250_000) * 100,
            status,
            signed_on: self.date_in_year(REFERENCE_YEAR),
            operation: Some(Box::new(operation.clone())),
        }
    }

    /// A payment against `engagement`. Unpaid ones (no date) stay pending.
    pub fn payment(&mut self, id: i64, engagement: &Engagement) -> Payment {
        let share = self.int_range_i64(20, 100);
        Payment {
            id: PaymentId::new(id),
            engagement_id: engagement.id,
            amount_cents: (engagement.amount_cents * share / 100).max(1),
            method: PaymentMethod::ALL[self.rng.int_n(PaymentMethod::ALL.len())],
            paid_on: self.rng.bool().then(|| self.date_in_year(REFERENCE_YEAR)),
            engagement: Some(Box::new(engagement.clone())),
        }
    }

    pub fn forecast(&mut self, id: i64, program: &Program, fiscal_year: i32) -> Forecast {
        let drift = self.int_range_i64(85, 115);
        Forecast {
            id: ForecastId::new(id),
            program_id: program.id,
            fiscal_year,
            planned_cents: program.budget_cents / 100 * drift,
            program: Some(Box::new(program.clone())),
        }
    }

    pub fn audit_entry(
        &mut self,
        id: i64,
        action: AuditAction,
        entity: EntityKind,
        target_id: i64,
    ) -> AuditLogEntry {
        AuditLogEntry {
            id: AuditLogId::new(id),
            actor: self.pick(&AUDIT_ACTORS).to_owned(),
            action,
            entity,
            target_id,
            logged_on: self.date_in_year(REFERENCE_YEAR),
            details: format!("{} {} #{target_id}", action.as_str(), entity.as_str()),
        }
    }

    pub fn date_in_year(&mut self, year: i32) -> Date {
        let ordinal = self.int_range_i64(1, 365) as u16;
        Date::from_ordinal_date(year, ordinal).unwrap_or(Date::MIN)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

/// A complete, internally consistent dataset for every screen.
pub fn demo_dataset(seed: u64) -> Dataset {
    let mut faker = BudgetFaker::new(seed);
    let mut dataset = Dataset::new();
    let mut audit = Vec::new();
    let mut log = |faker: &mut BudgetFaker, action, entity, target_id| {
        let id = audit.len() as i64 + 1;
        audit.push(faker.audit_entry(id, action, entity, target_id));
    };

    let mut ministries = Vec::new();
    let mut programs = Vec::new();
    let mut operations = Vec::new();
    let mut engagements = Vec::new();
    let mut payments = Vec::new();
    let mut forecasts = Vec::new();

    for ministry_id in 1..=5 {
        let ministry = faker.ministry(ministry_id);
        log(
            &mut faker,
            AuditAction::Create,
            EntityKind::Ministries,
            ministry_id,
        );
        for _ in 0..2 + faker.int_n(2) {
            let program = faker.program(programs.len() as i64 + 1, &ministry);
            log(
                &mut faker,
                AuditAction::Create,
                EntityKind::Programs,
                program.id.get(),
            );
            for year in REFERENCE_YEAR..REFERENCE_YEAR + 3 {
                let forecast = faker.forecast(forecasts.len() as i64 + 1, &program, year);
                forecasts.push(forecast);
            }
            for _ in 0..2 {
                let operation = faker.operation(operations.len() as i64 + 1, &program);
                for _ in 0..1 + faker.int_n(3) {
                    let engagement = faker.engagement(engagements.len() as i64 + 1, &operation);
                    log(
                        &mut faker,
                        AuditAction::Create,
                        EntityKind::Engagements,
                        engagement.id.get(),
                    );
                    if matches!(
                        engagement.status,
                        EngagementStatus::Approved | EngagementStatus::Settled
                    ) {
                        let payment = faker.payment(payments.len() as i64 + 1, &engagement);
                        payments.push(payment);
                    }
                    if engagement.status == EngagementStatus::Cancelled {
                        log(
                            &mut faker,
                            AuditAction::Update,
                            EntityKind::Engagements,
                            engagement.id.get(),
                        );
                    }
                    engagements.push(engagement);
                }
                operations.push(operation);
            }
            programs.push(program);
        }
        ministries.push(ministry);
    }

    dataset.insert(EntityKind::Ministries, records(&ministries));
    dataset.insert(EntityKind::Programs, records(&programs));
    dataset.insert(EntityKind::Operations, records(&operations));
    dataset.insert(EntityKind::Engagements, records(&engagements));
    dataset.insert(EntityKind::Payments, records(&payments));
    dataset.insert(EntityKind::Forecasts, records(&forecasts));
    dataset.insert(EntityKind::AuditLog, records(&audit));
    dataset
}

fn records<T>(items: &[T]) -> Vec<Record>
where
    for<'a> &'a T: Into<Record>,
{
    items.iter().map(Into::into).collect()
}

/// Numbered flat records (`id`, `name`, `amount_cents`) for table tests.
pub fn numbered_records(count: usize) -> Vec<Record> {
    (1..=count as i64)
        .map(|id| {
            Record::new()
                .with("id", id)
                .with("name", format!("Row {id:03}"))
                .with("amount_cents", budgetboard_app::Value::Money(id * 1_000))
        })
        .collect()
}

pub fn temp_dataset_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("budget.json");
    Ok((dir, path))
}

pub fn fixture_date() -> &'static str {
    "2026-02-19"
}
