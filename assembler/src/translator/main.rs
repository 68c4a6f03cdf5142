use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction::{Set, SetTrue};
use clap::Parser;
use tracing::{event, span, Level};

use assembler::{assemble_file, init_logging, AssemblerFailure, OutputOptions};

/// Translate assembly source into a program for the simulated machine
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// File from which assembly source is read.
    #[clap(action = Set)]
    input: OsString,

    /// File to which the program is written.
    #[clap(action = Set, short = 'o', long)]
    output: OsString,

    /// Also print a listing (the address, labels and contents of
    /// each memory cell) on standard output.
    #[clap(action = SetTrue, long)]
    list: bool,
}

fn translate(cli: &Cli) -> Result<(), AssemblerFailure> {
    let span = span!(Level::ERROR, "translate", input=?cli.input, output=?cli.output);
    let _enter = span.enter();
    let output_path = PathBuf::from(&cli.output);
    assemble_file(&cli.input, &output_path, OutputOptions { list: cli.list })?;
    event!(Level::INFO, "wrote {}", output_path.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging() {
        eprintln!("failed to set up logging: {e}");
        return ExitCode::FAILURE;
    }
    match translate(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            event!(Level::ERROR, "translation failed: {e:?}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
