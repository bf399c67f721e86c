// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::path::Path;
use std::process::{Command, Output};

fn budgetboard(config_dir: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_budgetboard"))
        .env("BUDGETBOARD_CONFIG_PATH", config_dir.join("config.toml"))
        .env_remove("BUDGETBOARD_DATA_PATH")
        .args(args)
        .output()?;
    Ok(output)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_flags() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let output = budgetboard(temp.path(), &["--help"])?;
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("--data <path>"));
    assert!(text.contains("--export <name>"));
    Ok(())
}

#[test]
fn example_config_prints_the_resolved_path() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let output = budgetboard(temp.path(), &["--print-example-config"])?;
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("version = 1"));
    assert!(text.contains(&temp.path().join("config.toml").display().to_string()));
    Ok(())
}

#[test]
fn written_demo_dataset_checks_and_exports() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let data = temp.path().join("budget.json");
    let data = data.to_string_lossy();

    let output = budgetboard(temp.path(), &["--write-demo", &data])?;
    assert!(output.status.success(), "{}", stderr(&output));

    let output = budgetboard(temp.path(), &["--data", &data, "--check"])?;
    assert!(output.status.success(), "{}", stderr(&output));

    let output = budgetboard(temp.path(), &["--data", &data, "--export", "engagements"])?;
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("ID\tReference\tBeneficiary\tOperation\tAmount\tStatus\tSigned")
    );
    assert!(lines.count() > 0);
    Ok(())
}

#[test]
fn export_query_narrows_rows() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let all = budgetboard(temp.path(), &["--demo", "--export", "payments"])?;
    let some = budgetboard(
        temp.path(),
        &["--demo", "--export", "payments", "--query", "cash"],
    )?;
    assert!(all.status.success(), "{}", stderr(&all));
    assert!(some.status.success(), "{}", stderr(&some));
    let all_rows = stdout(&all).lines().count();
    let some_rows = stdout(&some).lines().count();
    assert!(some_rows >= 1);
    assert!(some_rows <= all_rows);
    Ok(())
}

#[test]
fn malformed_dataset_fails_with_context() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let data = temp.path().join("budget.json");
    std::fs::write(&data, "{\"houses\": []}")?;

    let output = budgetboard(temp.path(), &["--data", &data.to_string_lossy(), "--check"])?;
    assert_eq!(output.status.code(), Some(1));
    let message = stderr(&output);
    assert!(message.contains("load dataset"));
    assert!(message.contains("unknown collection"));
    Ok(())
}

#[test]
fn bad_config_fails_with_a_template_hint() -> Result<()> {
    let temp = tempfile::tempdir()?;
    std::fs::write(
        temp.path().join("config.toml"),
        "version = 1\n[ui]\npage_size = 7\n",
    )?;
    let output = budgetboard(temp.path(), &["--demo", "--check"])?;
    assert_eq!(output.status.code(), Some(1));
    let message = stderr(&output);
    assert!(message.contains("--print-example-config"));
    assert!(message.contains("page_size"));
    Ok(())
}

#[test]
fn unknown_flag_fails() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let output = budgetboard(temp.path(), &["--wat"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown argument"));
    Ok(())
}
