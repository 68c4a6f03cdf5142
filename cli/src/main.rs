use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::fs::{self, File};
use std::io;

use clap::ArgAction::{Set, SetTrue};
use clap::{Args, Parser, Subcommand};
use tracing::{event, span, Level};

use assembler::{assemble_with_listing, init_logging, AssemblerFailure};
use base::prelude::*;
use cpu::{simulate, SimulationConfig, SimulationFailure, SimulationReport};

/// Simulate the processor
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program file (as written by the translator).
    Run {
        /// File containing the program.
        #[clap(action = Set)]
        program: OsString,

        /// File whose contents are the program's input.
        #[clap(action = Set)]
        input: OsString,

        #[clap(flatten)]
        options: SimulationOptions,

        /// Print the result as JSON.
        #[clap(action = SetTrue, long)]
        json: bool,
    },
    /// Translate an assembly source file and run the result,
    /// showing the source and the program listing.
    Demo {
        /// File from which assembly source is read.
        #[clap(action = Set)]
        source: OsString,

        /// File whose contents are the program's input.
        #[clap(action = Set)]
        input: OsString,

        #[clap(flatten)]
        options: SimulationOptions,
    },
}

#[derive(Args, Debug)]
struct SimulationOptions {
    /// Stop after executing this many instructions.
    #[clap(long, default_value_t = SimulationConfig::default().instruction_limit)]
    limit: u64,

    /// The data memory size (must be non-zero).
    #[clap(long, default_value_t = SimulationConfig::default().data_memory_size)]
    data_memory_size: usize,

    /// The number of general-purpose registers (including r0).
    #[clap(long, default_value_t = DEFAULT_REGISTER_COUNT)]
    registers: usize,
}

impl From<&SimulationOptions> for SimulationConfig {
    fn from(options: &SimulationOptions) -> SimulationConfig {
        SimulationConfig {
            data_memory_size: options.data_memory_size,
            instruction_limit: options.limit,
            register_count: options.registers,
        }
    }
}

#[derive(Debug)]
enum Fail {
    /// We were not able to correctly initialise the simulator.
    InitialisationFailure(String),
    Io { filename: OsString, error: io::Error },
    BadProgram {
        filename: OsString,
        error: ProgramFormatError,
    },
    Assembly(AssemblerFailure),
    Simulation(SimulationFailure),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
            Fail::Io { filename, error } => {
                write!(f, "failed to read {}: {error}", filename.to_string_lossy())
            }
            Fail::BadProgram { filename, error } => {
                write!(f, "{} is not a valid program: {error}", filename.to_string_lossy())
            }
            Fail::Assembly(e) => e.fmt(f),
            Fail::Simulation(e) => e.fmt(f),
        }
    }
}

impl Error for Fail {}

fn read_text(filename: &OsString) -> Result<String, Fail> {
    fs::read_to_string(filename).map_err(|error| Fail::Io {
        filename: filename.clone(),
        error,
    })
}

fn load_program(filename: &OsString) -> Result<Vec<MemoryCell>, Fail> {
    let file = File::open(filename).map_err(|error| Fail::Io {
        filename: filename.clone(),
        error,
    })?;
    read_program(file).map_err(|error| Fail::BadProgram {
        filename: filename.clone(),
        error,
    })
}

fn print_report(report: &SimulationReport) {
    println!("Output is `{}`", report.output);
    println!(
        "instr_counter: {} ticks: {}",
        report.instructions, report.ticks
    );
}

fn run_program(
    program_file: &OsString,
    input_file: &OsString,
    config: &SimulationConfig,
    json: bool,
) -> Result<(), Fail> {
    let memory = load_program(program_file)?;
    let input = read_text(input_file)?;
    let report = simulate(memory, &input, config).map_err(Fail::Simulation)?;
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                return Err(Fail::InitialisationFailure(format!(
                    "failed to convert the report to JSON: {e}"
                )));
            }
        }
    } else {
        print_report(&report);
    }
    Ok(())
}

fn run_demo(
    source_file: &OsString,
    input_file: &OsString,
    config: &SimulationConfig,
) -> Result<(), Fail> {
    let source = read_text(source_file)?;
    let input = read_text(input_file)?;
    println!("Source code:\n{source}");
    let (memory, listing) = assemble_with_listing(&source).map_err(Fail::Assembly)?;
    println!("Program:\n{listing}");
    println!("Input is `{input}`");
    let report = simulate(memory, &input, config).map_err(Fail::Simulation)?;
    print_report(&report);
    Ok(())
}

fn run_simulator() -> Result<(), Fail> {
    let cli = Cli::parse();

    init_logging().map_err(|e| {
        Fail::InitialisationFailure(format!(
            "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
        ))
    })?;

    let result = match &cli.command {
        Command::Run {
            program,
            input,
            options,
            json,
        } => {
            let span = span!(Level::ERROR, "run", program=?program, input=?input);
            let _enter = span.enter();
            run_program(program, input, &SimulationConfig::from(options), *json)
        }
        Command::Demo {
            source,
            input,
            options,
        } => {
            let span = span!(Level::ERROR, "demo", source=?source, input=?input);
            let _enter = span.enter();
            run_demo(source, input, &SimulationConfig::from(options))
        }
    };
    if let Err(e) = &result {
        event!(Level::ERROR, "simulation failed: {e}");
    }
    result
}

fn main() {
    match run_simulator() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
