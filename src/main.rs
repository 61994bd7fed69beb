//! refsheet - evaluate spreadsheet cells from scripts, flags or stdin

mod command;
mod config;
mod logger;

use anyhow::{Context, Result, bail};
use refsheet_core::Grid;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: refsheet [OPTIONS] [SCRIPT]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [SCRIPT]                  File of commands to run (default: stdin)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMD>       Run a command (can be repeated)");
    eprintln!("  --rows <N>                Number of rows (overrides config)");
    eprintln!("  --cols <N>                Number of columns (overrides config)");
    eprintln!("  --config <FILE>           Load settings from TOML file");
    eprintln!("  --no-config               Ignore the user config file");
    eprintln!("  -v                        Increase log verbosity (can be repeated)");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  <ADDR> = <value>          Enter a value, e.g. B1 = REF(A1) * 2");
    eprintln!("  print <ADDR>              Print a cell's display value");
    eprintln!("  show                      Print every non-empty cell as a table");
    eprintln!("  clear <ADDR>              Empty a cell");
    eprintln!("  rule <ADDR> type number|word|any");
    eprintln!("  rule <ADDR> range =|<|> <n>");
    eprintln!("  rule <ADDR> oneof <a,b,c> Attach a validation rule");
    eprintln!("  unrule <ADDR>             Remove a cell's validation rules");
    eprintln!("  insert row <n> | col <C>  Insert before a row or column");
    eprintln!("  delete row <n> | col <C>  Delete a row or column");
    eprintln!("  replace <find> [<with>]   Replace text in every entered value");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut script_path: Option<PathBuf> = None;
    let mut commands: Vec<String> = Vec::new();
    let mut rows: Option<usize> = None;
    let mut cols: Option<usize> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut no_config = false;
    let mut verbosity: u8 = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a value");
                    std::process::exit(1);
                }
                commands.push(args[i].to_string());
            }
            "--rows" => {
                i += 1;
                rows = Some(parse_count("--rows", args.get(i)));
            }
            "--cols" => {
                i += 1;
                cols = Some(parse_count("--cols", args.get(i)));
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            "--no-config" => no_config = true,
            flags
                if flags.len() > 1
                    && flags.starts_with('-')
                    && flags[1..].chars().all(|c| c == 'v') =>
            {
                verbosity = verbosity.saturating_add((flags.len() - 1) as u8);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if script_path.is_none() {
                    script_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    logger::init(verbosity);

    let mut grid_config = if no_config && config_file.is_none() {
        Default::default()
    } else {
        let (loaded, warnings) = config::load_config(config_file.as_ref());
        for warning in warnings {
            log::warn!("{}", warning);
        }
        loaded
    };
    if let Some(rows) = rows {
        grid_config.rows = rows;
    }
    if let Some(cols) = cols {
        grid_config.cols = cols;
    }

    let mut grid = match Grid::with_config(&grid_config) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("grid is {} x {}", grid.rows(), grid.cols());

    let result = if !commands.is_empty() {
        run_lines(&mut grid, commands.into_iter())
    } else if let Some(path) = script_path {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|content| {
                let lines: Vec<String> = content.lines().map(str::to_string).collect();
                run_lines(&mut grid, lines.into_iter())
            })
    } else {
        let stdin = io::stdin();
        let lines: Vec<String> = match stdin.lock().lines().collect() {
            Ok(lines) => lines,
            Err(e) => {
                eprintln!("Error: failed to read stdin: {}", e);
                std::process::exit(1);
            }
        };
        run_lines(&mut grid, lines.into_iter())
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn parse_count(flag: &str, value: Option<&String>) -> usize {
    match value.map(|v| v.parse::<usize>()) {
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            eprintln!("Error: {} requires a positive number", flag);
            std::process::exit(1);
        }
        None => {
            eprintln!("Error: {} requires a value", flag);
            std::process::exit(1);
        }
    }
}

/// Run every line, reporting failures as they happen. Fails if any line did.
fn run_lines(grid: &mut Grid, lines: impl Iterator<Item = String>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    for (number, line) in lines.enumerate() {
        let outcome = command::parse_line(&line).and_then(|parsed| match parsed {
            Some(cmd) => command::execute(grid, &cmd, &mut out),
            None => Ok(()),
        });
        if let Err(e) = outcome {
            failures += 1;
            out.flush()?;
            eprintln!("Error: line {}: {}: {:#}", number + 1, line.trim(), e);
        }
    }
    out.flush()?;

    if failures > 0 {
        bail!("{} command(s) failed", failures);
    }
    Ok(())
}
