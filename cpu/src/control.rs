//! Emulates the control unit.
//!
//! The control unit owns no machine state other than its counters.
//! It sequences the primitive operations of the [`DataPath`] for
//! each instruction, and counts the clock ticks this takes.  Within
//! this simulator, the control unit performs the following functions:
//!
//! - Instruction fetch and decoding
//! - Latching the operands each opcode needs
//! - Running the microsteps of each opcode category
//! - Counting ticks and instructions
//!
//! The work for each group of opcodes lives in the `op_*` submodules.
use tracing::{event, span, Level};

mod op_arith;
mod op_io;
mod op_jump;
mod op_loadstore;
pub mod timing;

#[cfg(test)]
mod tests;

use base::prelude::*;

use crate::alarm::Alarm;
use crate::datapath::DataPath;
use crate::diagnostics::CurrentInstructionDiagnostics;

/// The step of the instruction cycle the control unit is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Decoding,
    Executing(Opcode),
    Committing,
    Halted,
}

/// What happened as a result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The instruction completed and the next one can be fetched.
    Continue,
    /// HALT was executed.
    Halted,
    /// IN found the input buffer empty.
    EndOfInput,
}

#[derive(Debug, Clone)]
pub struct ControlUnit {
    ticks: u64,
    instructions: u64,
    phase: Phase,
}

impl Default for ControlUnit {
    fn default() -> ControlUnit {
        ControlUnit::new()
    }
}

impl ControlUnit {
    #[must_use]
    pub fn new() -> ControlUnit {
        ControlUnit {
            ticks: 0,
            instructions: 0,
            phase: Phase::Fetching,
        }
    }

    /// The number of clock ticks elapsed so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The number of instructions fetched so far.
    #[must_use]
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn tick(&mut self, dp: &DataPath) {
        self.ticks += 1;
        event!(Level::TRACE, "tick {}: {}", self.ticks, dp);
    }

    /// Fetch the instruction at the instruction pointer and run it
    /// to completion.
    ///
    /// # Errors
    ///
    /// Any [`Alarm`] raised while fetching or executing the
    /// instruction.  The counters then reflect the work done before
    /// the alarm.
    pub fn decode_and_execute(&mut self, dp: &mut DataPath) -> Result<Outcome, Alarm> {
        let address = dp.instruction_pointer();
        let span = span!(Level::TRACE, "instruction", address);
        let _enter = span.enter();
        let start_ticks = self.ticks;

        self.phase = Phase::Fetching;
        let inst = dp.fetch_instruction()?;
        self.instructions += 1;
        let diagnostics = CurrentInstructionDiagnostics {
            current_instruction: inst.clone(),
            instruction_address: address,
        };
        event!(Level::DEBUG, "executing {diagnostics}");

        self.phase = Phase::Decoding;
        latch_operands(&inst, dp)?;
        self.tick(dp);

        let opcode = inst.opcode();
        self.phase = Phase::Executing(opcode);
        let outcome = match opcode {
            Opcode::Halt => Outcome::Halted,
            Opcode::Jmp => self.op_jmp(dp),
            Opcode::Beq
            | Opcode::Bne
            | Opcode::Blt
            | Opcode::Bgt
            | Opcode::Bnl
            | Opcode::Bng => self.op_branch(opcode, dp)?,
            Opcode::Lw => self.op_lw(inst.is_immediate(), dp)?,
            Opcode::Sw => self.op_sw(inst.is_immediate(), dp)?,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Rem => {
                self.op_arith(opcode, inst.is_immediate(), dp)?
            }
            Opcode::In => self.op_in(dp),
            Opcode::Out => self.op_out(dp),
        };

        match outcome {
            Outcome::Continue => {
                self.phase = Phase::Committing;
                self.tick(dp);
                debug_assert_eq!(
                    self.ticks - start_ticks,
                    timing::instruction_ticks(opcode),
                    "tick count for {diagnostics}"
                );
                self.phase = Phase::Fetching;
            }
            Outcome::Halted | Outcome::EndOfInput => {
                self.phase = Phase::Halted;
            }
        }
        Ok(outcome)
    }
}

/// Select the registers and load the immediate latch with the
/// values the instruction needs.
fn latch_operands(inst: &Instruction, dp: &mut DataPath) -> Result<(), Alarm> {
    let immediate = inst.is_immediate();
    match (inst.opcode().category(), inst.opcode(), inst.operands()) {
        (None, Opcode::Halt, []) => Ok(()),
        (Some(OpcodeCategory::Branch), Opcode::Jmp, &[target]) => {
            dp.load_immediate(target);
            Ok(())
        }
        (Some(OpcodeCategory::Branch), _, &[left, right, target]) => {
            dp.select_src1(left)?;
            dp.select_src2(right)?;
            dp.load_immediate(target);
            Ok(())
        }
        (Some(OpcodeCategory::Mem), Opcode::Lw, &[dest, address]) => {
            dp.select_dest(dest)?;
            if immediate {
                dp.load_immediate(address);
                Ok(())
            } else {
                dp.select_src1(address)
            }
        }
        (Some(OpcodeCategory::Mem), Opcode::Sw, &[address, source]) => {
            dp.select_src1(address)?;
            if immediate {
                dp.load_immediate(source);
                Ok(())
            } else {
                dp.select_src2(source)
            }
        }
        (Some(OpcodeCategory::Io), Opcode::In, &[dest, port]) => {
            dp.select_dest(dest)?;
            dp.load_immediate(port);
            Ok(())
        }
        (Some(OpcodeCategory::Io), Opcode::Out, &[source, port]) => {
            dp.select_src1(source)?;
            dp.load_immediate(port);
            Ok(())
        }
        (Some(OpcodeCategory::Arith), _, &[dest, left, right]) => {
            dp.select_dest(dest)?;
            dp.select_src1(left)?;
            if immediate {
                dp.load_immediate(right);
                Ok(())
            } else {
                dp.select_src2(right)
            }
        }
        _ => Err(Alarm::MalformedInstruction {
            instruction: inst.clone(),
        }),
    }
}
