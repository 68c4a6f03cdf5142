//! This crate simulates the processor.
//!
//! The simulation is split the way the hardware would be.  The
//! [`DataPath`] holds all of the machine state (registers, ALU,
//! branch comparator, memory and I/O buffers) and offers only
//! primitive latch and compute operations.  The [`ControlUnit`]
//! sequences those operations for each instruction, counting clock
//! ticks as it goes.  [`Machine`] owns one of each and runs a
//! program to completion.
#![crate_name = "cpu"]

mod alarm;
mod control;
mod datapath;
mod diagnostics;
mod io;
mod machine;
mod memory;

pub use alarm::{Alarm, BadMemOp};
pub use control::timing::instruction_ticks;
pub use control::{ControlUnit, Outcome, Phase};
pub use datapath::{Alu, BranchComparator, DataPath, RegisterUnit};
pub use diagnostics::CurrentInstructionDiagnostics;
pub use io::{EndOfInput, IoUnit};
pub use machine::{
    simulate, ConfigurationFailure, Machine, SimulationConfig, SimulationFailure,
    SimulationReport, StopReason,
};
pub use memory::{MemoryOpFailure, MemoryUnit};
