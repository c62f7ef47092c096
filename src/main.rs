use std::fs;
use std::path::PathBuf;

use miette::{bail, Diagnostic, IntoDiagnostic, Result};

use clap::{Parser, ValueEnum};

use thiserror::Error;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use quillc::{analyze, parse, AnalysisError, ParsingError};

#[derive(Debug, Parser)]
#[command(version, about = None, long_about = None)]
#[command(propagate_version = true)]
struct CliArgs {
    /// Path to the source code file
    input_file: PathBuf,

    /// Execution mode
    #[arg(value_enum)]
    #[arg(short, long)]
    #[arg(default_value_t = ExecutionMode::Analyze)]
    mode: ExecutionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExecutionMode {
    /// Run the full semantic analysis and dump the mid-level IR
    Analyze,

    /// Inspect the syntax tree of the parsed source code
    Parse,

    /// Inspect the def/use table of the resolved source code
    Resolve,
}

#[derive(Debug, Error, Diagnostic)]
#[error("Oops, something went wrong")]
struct ParseFailure {
    #[related]
    errs: Vec<ParsingError>,

    #[source_code]
    code: String,
}

#[derive(Debug, Error, Diagnostic)]
#[error("Semantic analysis failed")]
struct AnalysisFailure {
    #[related]
    errs: Vec<AnalysisError>,

    #[source_code]
    code: String,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().without_time())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let args = CliArgs::parse();

    if !args.input_file.is_file() {
        bail!("No proper input file: {:?}", args.input_file);
    }

    let source = fs::read_to_string(&args.input_file).into_diagnostic()?;
    let tree = match parse(&source) {
        Ok(tree) => {
            info!("Parsing successful");
            tree
        }
        Err(reports) => {
            return Err(ParseFailure {
                errs: reports,
                code: source,
            }
            .into())
        }
    };

    if args.mode == ExecutionMode::Parse {
        tree.pretty_print().into_diagnostic()?;
        return Ok(());
    }

    let ir = match analyze(&tree) {
        Ok(ir) => {
            info!("Semantic analysis successful");
            ir
        }
        Err(err) => {
            return Err(AnalysisFailure {
                errs: vec![err],
                code: source,
            }
            .into())
        }
    };

    match args.mode {
        ExecutionMode::Parse => unreachable!("handled above"),
        ExecutionMode::Resolve => {
            for (lookup, (def, bound)) in &ir.defuse {
                let flavor = if *bound { "bound" } else { "free" };
                println!("{lookup} -> {def} ({flavor})");
            }
        }
        ExecutionMode::Analyze => println!("{ir:#?}"),
    }

    Ok(())
}
