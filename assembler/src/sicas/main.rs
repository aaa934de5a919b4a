use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::ArgAction::{Set, SetTrue};
use clap::Parser;
use tracing::{Level, event, span};
use tracing_subscriber::prelude::*;

use assembler::*;

/// Two-pass assembler for SIC/XE programs
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// File from which assembly source is read.
    #[clap(action = Set)]
    input: PathBuf,

    /// File to which the object program is written.
    #[clap(action = Set, short = 'o', long, default_value = "output.obj")]
    output: PathBuf,

    /// When set, write the symbol table of each section to this file.
    #[clap(action = Set, long)]
    symtab: Option<PathBuf>,

    /// When set, write the literal table of each section to this file.
    #[clap(action = Set, long)]
    littab: Option<PathBuf>,

    /// Read the instruction table from this file instead of using
    /// the built-in one.
    #[clap(action = Set, long)]
    instructions: Option<PathBuf>,

    /// Fail (writing nothing) if any error is diagnosed.
    #[clap(action = SetTrue, long)]
    strict: bool,
}

#[derive(Debug)]
enum Fail {
    /// The assembler started but then failed.
    AsmFail(AssemblerFailure),
    /// We were not able to correctly initialise the assembler.
    InitialisationFailure(String),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::AsmFail(assembler_failure) => assembler_failure.fmt(f),
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
        }
    }
}

impl Error for Fail {}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
}

fn run_assembler() -> Result<(), Fail> {
    let cli = Cli::parse();

    // Set RUST_LOG (for example RUST_LOG=debug) to select which
    // trace messages get printed.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("error"))
    {
        Err(e) => {
            return Err(Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
            )));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let span = span!(Level::ERROR, "assemble", input=?cli.input, output=?cli.output);
    let _enter = span.enter();
    let catalog = match &cli.instructions {
        Some(path) => Catalog::load(path).map_err(Fail::AsmFail)?,
        None => Catalog::standard(),
    };
    event!(
        Level::DEBUG,
        "instruction table has {} entries",
        catalog.len()
    );
    let options = AssemblyOptions { strict: cli.strict };
    let outputs = OutputOptions {
        symtab: cli.symtab,
        littab: cli.littab,
    };
    match assemble_file(&cli.input, &cli.output, &catalog, &options, &outputs) {
        Ok(diagnostics) => {
            print_diagnostics(&diagnostics);
            event!(
                Level::INFO,
                "assembly succeeded with {} diagnostic(s)",
                diagnostics.len()
            );
            Ok(())
        }
        Err(e) => {
            if let AssemblerFailure::StrictModeViolation(diagnostics) = &e {
                print_diagnostics(diagnostics);
            }
            event!(Level::ERROR, "assembly failed: {:?}", e);
            Err(Fail::AsmFail(e))
        }
    }
}

fn main() {
    match run_assembler() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
