//! Alarms are the fatal conditions which stop the simulation.
//!
//! Running out of input, executing `HALT` and exceeding the
//! instruction limit are not alarms; they are normal ways for a
//! simulation to finish (see [`crate::StopReason`]).
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use base::prelude::*;

use super::memory::MemoryOpFailure;

/// A memory access which failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadMemOp {
    /// Describes a failure to fetch an instruction from an address.
    Fetch(Value),
    /// Describes a failure to read data from an address.
    Read(Value),
    /// Describes a failure to write to an address.
    Write(Value),
}

impl Display for BadMemOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            BadMemOp::Fetch(addr) => write!(f, "instruction fetch from {addr} failed"),
            BadMemOp::Read(addr) => write!(f, "memory read from {addr} failed"),
            BadMemOp::Write(addr) => write!(f, "memory write to {addr} failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alarm {
    /// A memory access was out of range, or found the wrong kind of
    /// cell.
    Memory {
        op: BadMemOp,
        failure: MemoryOpFailure,
    },

    /// An instruction named a register which doesn't exist.
    BadRegister { index: Value, count: usize },

    /// `DIV` or `REM` with a zero divisor.
    DivideByZero { dividend: Value },

    /// The operands of an instruction don't fit its opcode.  The
    /// program loader validates instructions, so this indicates a
    /// program built some other way.
    MalformedInstruction { instruction: Instruction },

    /// Indicates a bug in the simulator.
    Bug(String),
}

impl Display for Alarm {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Alarm::Memory { op, failure } => write!(f, "{op}: {failure}"),
            Alarm::BadRegister { index, count } => write!(
                f,
                "register r{index} does not exist (the machine has {count} registers)"
            ),
            Alarm::DivideByZero { dividend } => write!(f, "division of {dividend} by zero"),
            Alarm::MalformedInstruction { instruction } => {
                write!(f, "malformed instruction {instruction}")
            }
            Alarm::Bug(msg) => write!(f, "simulator bug: {msg}"),
        }
    }
}

impl Error for Alarm {}

#[test]
fn test_alarm_display() {
    let alarm = Alarm::Memory {
        op: BadMemOp::Read(300),
        failure: MemoryOpFailure::NotMapped {
            address: 300,
            memory_size: 20,
        },
    };
    assert_eq!(
        alarm.to_string(),
        "memory read from 300 failed: address 300 is outside memory (which has 20 cells)"
    );
    assert_eq!(
        Alarm::DivideByZero { dividend: 7 }.to_string(),
        "division of 7 by zero"
    );
}
