// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use budgetboard_app::{
    ColumnDescriptor, EntityKind, Payment, Record, SearchOptions, TableCommand, TableEvent,
    TableView, field_paths, normalize, schema, search,
};
use budgetboard_testkit::{BudgetFaker, demo_dataset};

fn payments(seed: u64, count: i64) -> Vec<Payment> {
    let mut faker = BudgetFaker::new(seed);
    let ministry = faker.ministry(1);
    let program = faker.program(1, &ministry);
    let operation = faker.operation(1, &program);
    (1..=count)
        .map(|id| {
            let engagement = faker.engagement(id, &operation);
            faker.payment(id, &engagement)
        })
        .collect()
}

fn ids(rows: &[&Record]) -> Vec<String> {
    rows.iter().copied().map(schema::record_id).collect()
}

/// Commands a user might fire in one session.
fn session() -> Vec<TableCommand> {
    vec![
        TableCommand::CycleSort("amount_cents".to_owned()),
        TableCommand::CycleSort("beneficiary".to_owned()),
        TableCommand::StepPageSize(1),
        TableCommand::LastPage,
        TableCommand::SetColumnFilter {
            column: "method".to_owned(),
            value: "cash".to_owned(),
        },
        TableCommand::SetSearchQuery("transfer".to_owned()),
        TableCommand::ClearColumnFilters,
        TableCommand::ToggleColumn("method".to_owned()),
        TableCommand::SelectAll,
        TableCommand::PrevPage,
        TableCommand::SetSearchQuery(String::new()),
        TableCommand::GoToPage("2".to_owned()),
        TableCommand::CycleSort("amount_cents".to_owned()),
    ]
}

#[test]
fn search_reaches_nested_fields_of_typed_entities() {
    let items = payments(11, 12);
    let target = items[5]
        .engagement
        .as_ref()
        .map(|engagement| engagement.beneficiary.clone())
        .unwrap_or_default();
    let query = normalize(target.as_str()).to_uppercase();

    let found = search(
        &items,
        query.as_str(),
        &field_paths(["engagement.beneficiary"]),
        SearchOptions {
            match_all_words: true,
            ..SearchOptions::default()
        },
    );
    assert!(found.iter().any(|payment| payment.id == items[5].id));
}

#[test]
fn typed_entities_drive_a_table_directly() -> Result<()> {
    let items = payments(5, 30);
    let mut table = TableView::new(vec![
        ColumnDescriptor::<Payment>::new("id", "ID")?,
        ColumnDescriptor::at("beneficiary", "Beneficiary", "engagement.beneficiary")?,
        ColumnDescriptor::new("amount_cents", "Amount")?,
    ])
    .with_search_fields(field_paths(["engagement.beneficiary", "method"]));

    table.dispatch(TableCommand::CycleSort("amount_cents".to_owned()), &items);
    let sorted = table.filtered_rows(&items);
    assert!(
        sorted
            .windows(2)
            .all(|pair| pair[0].amount_cents <= pair[1].amount_cents)
    );

    let projection = table.project(&items);
    assert_eq!(projection.rows.len(), 10);
    assert_eq!(projection.page_count, 3);
    Ok(())
}

fn accept_all(table: &mut TableView<Record>, events: Vec<TableEvent>) {
    for event in events {
        if let TableEvent::ChangeRequested(change) = event {
            table.accept(change);
        }
    }
}

#[test]
fn bound_and_owned_tables_agree_over_a_session() -> Result<()> {
    let dataset = demo_dataset(9);
    let records = &dataset[&EntityKind::Payments];

    let mut owned = schema::table_for(EntityKind::Payments, SearchOptions::default(), 10)?;
    let mut bound = schema::table_for(EntityKind::Payments, SearchOptions::default(), 10)?;
    let initial = bound.view_state();
    bound.bind_sorting(initial.sorting);
    bound.bind_column_filters(initial.column_filters);
    bound.bind_column_visibility(initial.column_visibility);
    bound.bind_row_selection(initial.row_selection);
    bound.bind_pagination(initial.pagination);

    for command in session() {
        owned.dispatch(command.clone(), records);
        let events = bound.dispatch(command, records);
        accept_all(&mut bound, events);
        // Accepted filters can shrink the row set; the host re-clamps.
        let resync = bound.sync(records);
        accept_all(&mut bound, resync);
        assert_eq!(owned.view_state(), bound.view_state());
        assert_eq!(
            ids(&owned.project(records).rows),
            ids(&bound.project(records).rows)
        );
    }
    Ok(())
}

#[test]
fn page_index_stays_in_range_on_every_screen() -> Result<()> {
    let dataset = demo_dataset(21);
    for kind in EntityKind::ALL {
        let records = &dataset[&kind];
        let mut table = schema::table_for(kind, SearchOptions::default(), 10)?;
        for command in session() {
            table.dispatch(command, records);
            let projection = table.project(records);
            assert!(
                projection.pagination.page_index < projection.page_count,
                "{kind:?}: page {} of {}",
                projection.pagination.page_index,
                projection.page_count
            );
            assert!(projection.rows.len() <= projection.pagination.page_size);
        }
    }
    Ok(())
}

#[test]
fn ignored_change_requests_leave_a_bound_table_untouched() -> Result<()> {
    let dataset = demo_dataset(4);
    let records = &dataset[&EntityKind::Engagements];
    let mut table = schema::table_for(EntityKind::Engagements, SearchOptions::default(), 10)?;
    table.bind_sorting(Vec::new());
    let before = ids(&table.filtered_rows(records));

    let events = table.dispatch(TableCommand::CycleSort("beneficiary".to_owned()), records);
    assert!(
        events
            .iter()
            .any(|event| matches!(event, TableEvent::ChangeRequested(_)))
    );
    assert!(table.sorting().is_empty());
    assert_eq!(ids(&table.filtered_rows(records)), before);
    Ok(())
}
