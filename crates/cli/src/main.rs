use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use stepwright_engine::{RefactoringResult, perform_rephrase_refactoring};
use stepwright_util::display_relative;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("refactor", sub)) => run_refactor(sub).await,
        _ => {
            build_cli().print_help()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    Command::new("stepwright")
        .about("Specification tooling")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new("refactor")
                .about("Rename a step in specifications, concepts and its implementation")
                .arg(Arg::new("old").required(true).help("Current step phrase, e.g. 'enter <amount> dollars'"))
                .arg(Arg::new("new").required(true).help("New step phrase, e.g. 'deposit <amount> dollars'"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the result as JSON"),
                ),
        )
}

async fn run_refactor(m: &ArgMatches) -> Result<ExitCode> {
    let old = m.get_one::<String>("old").context("missing old step phrase")?;
    let new = m.get_one::<String>("new").context("missing new step phrase")?;

    let result = perform_rephrase_refactoring(old, new).await;

    if m.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        print!("{}", render_summary(&result, &cwd));
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Human readable account of a refactor; changed files are shown relative to `root`.
fn render_summary(result: &RefactoringResult, root: &Path) -> String {
    let mut out = String::new();
    if result.is_success() {
        out.push_str("Refactoring completed.\n");
    } else {
        out.push_str("Refactoring failed.\n");
    }

    for error in result.error_messages() {
        out.push_str(&format!("  error: {error}\n"));
    }
    for warning in &result.warnings {
        out.push_str(&format!("  warning: {warning}\n"));
    }

    let sections: [(&str, Vec<String>); 3] = [
        (
            "Specifications changed",
            result.specs_changed.iter().map(|file| display_relative(file, root)).collect(),
        ),
        (
            "Concepts changed",
            result.concepts_changed.iter().map(|file| display_relative(file, root)).collect(),
        ),
        ("Implementation files changed", result.runner_files_changed.clone()),
    ];
    for (title, files) in sections {
        if files.is_empty() {
            continue;
        }
        out.push_str(&format!("{title}:\n"));
        for file in files {
            out.push_str(&format!("  {file}\n"));
        }
    }

    if result.concept_renamed {
        out.push_str("Note: a concept heading was renamed. Concepts have no step implementation, so runner errors about it can be ignored.\n");
    }
    out
}
