// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod loader;
mod logging;

use anyhow::{Context, Result, anyhow};
use config::Config;
use loader::{DEFAULT_DEMO_ROWS, DEFAULT_GENERATED_ROWS, DEFAULT_SEED, DataSource};
use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use vgrid_app::{ChannelSink, Grid, format_thousands};

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

    if let Some(path) = &options.generate {
        let rows = options.rows.unwrap_or(DEFAULT_GENERATED_ROWS);
        loader::generate_dataset(path, rows, options.seed)?;
        println!("wrote {} transactions to {}", format_thousands(rows), path.display());
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `vgrid --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let grid_config = config.grid_config().with_context(|| {
        format!(
            "invalid [grid] config in {}",
            options.config_path.display()
        )
    })?;

    let _log_guard = logging::init(config.log_level(), &config.log_file()?)?;

    let source = match options.demo_rows {
        Some(rows) => DataSource::Demo {
            rows,
            seed: options.seed,
        },
        None => DataSource::File(
            options
                .data_path
                .clone()
                .unwrap_or_else(|| config.data_path()),
        ),
    };
    let records = loader::load_records(&source)?;
    if options.check_only {
        println!("ok: {} rows", format_thousands(records.len()));
        return Ok(());
    }

    let (metrics_tx, metrics_rx) = mpsc::channel();
    let mut grid = Grid::new(records, grid_config, ChannelSink::new(metrics_tx));
    vgrid_tui::run_app(&mut grid, &metrics_rx)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    data_path: Option<PathBuf>,
    demo_rows: Option<usize>,
    generate: Option<PathBuf>,
    rows: Option<usize>,
    seed: u64,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        data_path: None,
        demo_rows: None,
        generate: None,
        rows: None,
        seed: DEFAULT_SEED,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter().peekable();
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
                    .ok_or_else(|| anyhow!("--data requires a file path"))?;
                options.data_path = Some(PathBuf::from(value.as_ref()));
            }
            "--demo" => {
                let rows = iter
                    .next_if(|next| parse_count("--demo", next.as_ref()).is_ok())
                    .map(|value| parse_count("--demo", value.as_ref()))
                    .transpose()?;
                options.demo_rows = Some(rows.unwrap_or(DEFAULT_DEMO_ROWS));
            }
            "--generate" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--generate requires an output file path"))?;
                options.generate = Some(PathBuf::from(value.as_ref()));
            }
            "--rows" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--rows requires a row count"))?;
                options.rows = Some(parse_count("--rows", value.as_ref())?);
            }
            "--seed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--seed requires a number"))?;
                options.seed = value
                    .as_ref()
                    .parse()
                    .map_err(|_| anyhow!("--seed expects a non-negative integer, got {:?}", value.as_ref()))?;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
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

    if options.rows.is_some() && options.generate.is_none() {
        return Err(anyhow!("--rows only applies to --generate"));
    }

    Ok(options)
}

fn parse_count(flag: &str, raw: &str) -> Result<usize> {
    let digits = raw.replace('_', "");
    digits
        .parse()
        .map_err(|_| anyhow!("{flag} expects a row count, got {raw:?}"))
}

fn print_help() {
    println!("vgrid: browse a large transaction dataset in a virtualized grid");
    println!("  --config <path>          Use a specific config path");
    println!("  --data <path>            Load this dataset instead of [data].path");
    println!("  --demo [rows]            Launch with seeded demo data (default 100000 rows)");
    println!("  --generate <path>        Write a generated dataset and exit");
    println!("  --rows <n>               Rows for --generate (default 1000000)");
    println!("  --seed <n>               Seed for --demo and --generate");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and load the dataset, then exit");
    println!("  --help                   Show this help");
}
