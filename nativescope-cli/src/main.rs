mod app;
mod collect;
mod output;

use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use nativescope::analysis::{scan, ScanOptions};

use crate::{app::Cli, collect::collect_paths};

fn main() -> anyhow::Result<ExitCode> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .context("failed to set Ctrl+C handler")?;

    let cli = Cli::parse();

    // Logs go to stderr; --verbose enables debug even under --json; RUST_LOG overrides
    if !cli.json || cli.verbose {
        let level = if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("nativescope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    if !cli.json {
        output::print_banner();
    }

    let collected = collect_paths(&cli.paths);
    if !cli.json {
        for path in &collected.missing {
            output::print_path_not_found(path);
        }
        for directory in &collected.unreadable {
            output::print_unreadable(directory);
        }
    }

    if collected.files.is_empty() {
        // stdout carries only the report under --json
        if cli.json {
            eprintln!("ERROR: No files found to analyze");
            eprintln!("{}", Cli::command().render_usage());
        } else {
            println!("ERROR: No files found to analyze");
            println!("{}", Cli::command().render_usage());
        }
        return Ok(ExitCode::from(2));
    }

    let options = ScanOptions {
        parallel: cli.parallel,
    };
    let report = scan(&collected.files, &options, |file| {
        if !cli.json {
            output::print_progress(file);
        }
    });

    if cli.json {
        output::print_json(&report, &collected)?;
    } else {
        output::print_summary(&report);
    }

    Ok(ExitCode::SUCCESS)
}
