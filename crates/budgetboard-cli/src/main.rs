// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use budgetboard_app::{AppState, EntityKind};
use budgetboard_tui::UiOptions;
use config::Config;
use runtime::{JsonRuntime, MemoryRuntime};
use std::env;
use std::path::PathBuf;

const DEMO_SEED: u64 = 2026;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `budgetboard --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    if let Some(path) = &options.write_demo {
        runtime::write_dataset(path, &budgetboard_testkit::demo_dataset(DEMO_SEED))?;
        println!("{}", path.display());
        return Ok(());
    }

    let data_path = match &options.data_path {
        Some(path) => {
            config::validate_data_path(path).context("--data")?;
            PathBuf::from(path)
        }
        None => config.data_path()?,
    };
    if options.print_data_path {
        println!("{}", data_path.display());
        return Ok(());
    }

    let dataset = if options.demo {
        budgetboard_testkit::demo_dataset(DEMO_SEED)
    } else {
        runtime::load_dataset(&data_path).with_context(|| {
            format!(
                "load dataset {} -- if this path is wrong, set [data].path or BUDGETBOARD_DATA_PATH",
                data_path.display()
            )
        })?
    };

    if let Some(kind) = options.export {
        print!(
            "{}",
            runtime::export_tsv(
                &dataset,
                kind,
                config.search_options(),
                options.query.as_deref()
            )?
        );
        return Ok(());
    }

    if options.check_only {
        return Ok(());
    }

    let mut state = AppState {
        active_screen: options.screen.unwrap_or_else(|| config.start_screen()),
        ..AppState::default()
    };
    let ui_options = UiOptions {
        search: config.search_options(),
        page_size: config.page_size(),
    };

    if options.demo {
        let mut runtime = MemoryRuntime::new(dataset);
        budgetboard_tui::run_app(&mut state, &mut runtime, ui_options)
    } else {
        let mut runtime = JsonRuntime::new(data_path);
        budgetboard_tui::run_app(&mut state, &mut runtime, ui_options).with_context(|| {
            format!("dashboard over {}", runtime.path().display())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    data_path: Option<String>,
    screen: Option<EntityKind>,
    export: Option<EntityKind>,
    query: Option<String>,
    write_demo: Option<PathBuf>,
    print_config_path: bool,
    print_data_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_screen(raw: &str, flag: &str) -> Result<EntityKind> {
    EntityKind::parse(raw).ok_or_else(|| {
        let known = EntityKind::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("{flag} got unknown screen {raw:?}; use one of: {known}")
    })
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        data_path: None,
        screen: None,
        export: None,
        query: None,
        write_demo: None,
        print_config_path: false,
        print_data_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--data requires a dataset file path"))?;
                options.data_path = Some(value.as_ref().to_owned());
            }
            "--screen" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--screen requires a screen name"))?;
                options.screen = Some(parse_screen(value.as_ref(), "--screen")?);
            }
            "--export" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--export requires a screen name"))?;
                options.export = Some(parse_screen(value.as_ref(), "--export")?);
            }
            "--query" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--query requires search text"))?;
                options.query = Some(value.as_ref().to_owned());
            }
            "--write-demo" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--write-demo requires a file path"))?;
                options.write_demo = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_data_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.query.is_some() && options.export.is_none() {
        return Err(anyhow!("--query only applies to --export <screen>"));
    }

    Ok(options)
}

fn print_help() {
    println!("budgetboard");
    println!("  --config <path>          Use a specific config path");
    println!("  --data <path>            Use a specific dataset file");
    println!("  --screen <name>          Open on this screen (e.g. payments)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved dataset path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with generated demo data (in-memory)");
    println!("  --write-demo <path>      Write the demo dataset as JSON and exit");
    println!("  --export <name>          Print a screen as tab-separated text and exit");
    println!("  --query <text>           Search applied to --export");
    println!("  --check                  Validate config and dataset, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use budgetboard_app::EntityKind;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/budgetboard-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                data_path: None,
                screen: None,
                export: None,
                query: None,
                write_demo: None,
                print_config_path: false,
                print_data_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_path_overrides() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--config",
                "/custom/config.toml",
                "--data",
                "/custom/budget.json",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.data_path.as_deref(), Some("/custom/budget.json"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for flag in ["--config", "--data", "--screen", "--export", "--write-demo"] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains("requires"), "{flag}: {error}");
        }
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_parses_screen_names() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--screen",
                "audit_log",
                "--export",
                "payments",
                "--query",
                "dupont",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.screen, Some(EntityKind::AuditLog));
        assert_eq!(options.export, Some(EntityKind::Payments));
        assert_eq!(options.query.as_deref(), Some("dupont"));

        let error = parse_cli_args(vec!["--screen", "houses"], default_options_path())
            .expect_err("unknown screen should fail");
        assert!(error.to_string().contains("engagements"));
        Ok(())
    }

    #[test]
    fn query_requires_export() {
        let error = parse_cli_args(vec!["--query", "dupont"], default_options_path())
            .expect_err("query without export should fail");
        assert!(error.to_string().contains("--export"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_data_path);
        assert!(!options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_and_data_path_print_flags() -> Result<()> {
        let options = parse_cli_args(vec!["--demo", "--print-path"], default_options_path())?;
        assert!(!options.print_config_path);
        assert!(options.print_data_path);
        assert!(options.demo);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
