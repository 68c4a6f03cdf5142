//! The simulation driver.
//!
//! A [`Machine`] owns one [`ControlUnit`] and one [`DataPath`] and
//! runs a program until it halts, runs out of input, exceeds its
//! instruction limit, or raises an alarm.  Each machine is
//! independent of every other, so separate simulations can run
//! concurrently.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use tracing::{event, span, Level};

use base::prelude::*;

use crate::alarm::Alarm;
use crate::control::{ControlUnit, Outcome};
use crate::datapath::DataPath;
use crate::diagnostics::CurrentInstructionDiagnostics;
use crate::io::IoUnit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// The size of the data memory.  This must be non-zero, but the
    /// program is loaded exactly as assembled; addresses beyond the
    /// last cell of the program are not mapped.
    pub data_memory_size: usize,
    /// The simulation stops once this many instructions have been
    /// executed.
    pub instruction_limit: u64,
    pub register_count: usize,
}

impl Default for SimulationConfig {
    fn default() -> SimulationConfig {
        SimulationConfig {
            data_memory_size: 250,
            instruction_limit: 12000,
            register_count: DEFAULT_REGISTER_COUNT,
        }
    }
}

impl SimulationConfig {
    /// # Errors
    ///
    /// Fails when the data memory size or the register count is zero.
    pub fn validate(&self) -> Result<(), ConfigurationFailure> {
        if self.data_memory_size == 0 {
            Err(ConfigurationFailure::ZeroDataMemory)
        } else if self.register_count == 0 {
            Err(ConfigurationFailure::ZeroRegisters)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationFailure {
    ZeroDataMemory,
    ZeroRegisters,
}

impl Display for ConfigurationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            ConfigurationFailure::ZeroDataMemory => "data memory size should be non-zero",
            ConfigurationFailure::ZeroRegisters => "register count should be non-zero",
        })
    }
}

impl Error for ConfigurationFailure {}

/// Why a simulation which did not raise an alarm stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Halted,
    EndOfInput,
    LimitExceeded,
}

impl Display for StopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            StopReason::Halted => "halted",
            StopReason::EndOfInput => "input buffer is empty",
            StopReason::LimitExceeded => "instruction limit exceeded",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub output: String,
    pub instructions: u64,
    pub ticks: u64,
    pub stop: StopReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationFailure {
    Configuration(ConfigurationFailure),
    Alarm(Alarm),
}

impl Display for SimulationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            SimulationFailure::Configuration(e) => write!(f, "bad configuration: {e}"),
            SimulationFailure::Alarm(a) => write!(f, "alarm: {a}"),
        }
    }
}

impl Error for SimulationFailure {}

impl From<ConfigurationFailure> for SimulationFailure {
    fn from(e: ConfigurationFailure) -> SimulationFailure {
        SimulationFailure::Configuration(e)
    }
}

impl From<Alarm> for SimulationFailure {
    fn from(a: Alarm) -> SimulationFailure {
        SimulationFailure::Alarm(a)
    }
}

#[derive(Debug, Clone)]
pub struct Machine {
    control: ControlUnit,
    datapath: DataPath,
    instruction_limit: u64,
}

impl Machine {
    /// Load `memory` and queue `input` (followed by the NUL
    /// sentinel) for `IN`.
    ///
    /// # Errors
    ///
    /// Fails when `config` is not valid.
    pub fn new(
        memory: Vec<MemoryCell>,
        input: &str,
        config: &SimulationConfig,
    ) -> Result<Machine, ConfigurationFailure> {
        config.validate()?;
        let data_cells = memory
            .iter()
            .filter(|cell| matches!(cell, MemoryCell::Data(_)))
            .count();
        event!(
            Level::INFO,
            "loaded {} memory cells ({} data), {} input characters",
            memory.len(),
            data_cells,
            input.chars().count()
        );
        Ok(Machine {
            control: ControlUnit::new(),
            datapath: DataPath::new(memory, IoUnit::from_text(input), config.register_count),
            instruction_limit: config.instruction_limit,
        })
    }

    /// Execute a single instruction.
    ///
    /// # Errors
    ///
    /// Any alarm raised by the instruction.
    pub fn step(&mut self) -> Result<Outcome, Alarm> {
        self.control.decode_and_execute(&mut self.datapath)
    }

    /// Run until the program stops.
    ///
    /// # Errors
    ///
    /// Returns the alarm which stopped the program.  The machine
    /// remains available for inspection (for example the output
    /// written so far).
    pub fn run(&mut self) -> Result<SimulationReport, Alarm> {
        let span = span!(Level::INFO, "run", limit = self.instruction_limit);
        let _enter = span.enter();
        let stop = loop {
            if self.control.instructions() >= self.instruction_limit {
                event!(Level::WARN, "too long execution, increase limit");
                break StopReason::LimitExceeded;
            }
            let address = self.datapath.instruction_pointer();
            match self.step() {
                Ok(Outcome::Continue) => (),
                Ok(Outcome::Halted) => break StopReason::Halted,
                Ok(Outcome::EndOfInput) => {
                    event!(Level::WARN, "input buffer is empty");
                    break StopReason::EndOfInput;
                }
                Err(alarm) => {
                    match self.datapath.current_instruction() {
                        Some(inst) => {
                            let diagnostics = CurrentInstructionDiagnostics {
                                current_instruction: inst.clone(),
                                instruction_address: address,
                            };
                            event!(Level::ERROR, "{diagnostics}: {alarm}");
                        }
                        None => event!(Level::ERROR, "at address {address}: {alarm}"),
                    }
                    return Err(alarm);
                }
            }
        };
        event!(Level::DEBUG, "data memory:\n{}", self.data_memory_dump());
        let report = self.report(stop);
        event!(
            Level::INFO,
            "simulation finished ({}): instr_counter: {} ticks: {}",
            report.stop,
            report.instructions,
            report.ticks
        );
        Ok(report)
    }

    fn report(&self, stop: StopReason) -> SimulationReport {
        SimulationReport {
            output: self.output_text(),
            instructions: self.control.instructions(),
            ticks: self.control.ticks(),
            stop,
        }
    }

    #[must_use]
    pub fn output_text(&self) -> String {
        self.datapath.io().output_text()
    }

    /// Render the data cells of memory, highest address first.
    #[must_use]
    pub fn data_memory_dump(&self) -> String {
        self.datapath.memory().data_dump()
    }

    #[must_use]
    pub fn control(&self) -> &ControlUnit {
        &self.control
    }

    #[must_use]
    pub fn datapath(&self) -> &DataPath {
        &self.datapath
    }
}

/// Run `memory` against `input` to completion.
///
/// # Errors
///
/// Fails if the configuration is invalid or the program raises an
/// alarm.
pub fn simulate(
    memory: Vec<MemoryCell>,
    input: &str,
    config: &SimulationConfig,
) -> Result<SimulationReport, SimulationFailure> {
    let mut machine = Machine::new(memory, input, config)?;
    Ok(machine.run()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::BadMemOp;
    use crate::memory::MemoryOpFailure;

    fn inst(opcode: Opcode, operands: &[Value], addr_type: Option<AddrType>) -> MemoryCell {
        MemoryCell::Instruction(
            Instruction::new(opcode, operands.to_vec(), addr_type).expect("valid test data"),
        )
    }

    /// Echo the input until the NUL sentinel.
    fn echo() -> Vec<MemoryCell> {
        vec![
            inst(Opcode::In, &[1, STDIN_PORT], None),
            inst(Opcode::Beq, &[1, 0, 4], None),
            inst(Opcode::Out, &[1, STDOUT_PORT], None),
            inst(Opcode::Jmp, &[0], None),
            inst(Opcode::Halt, &[], None),
        ]
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
        let zero_data = SimulationConfig {
            data_memory_size: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            simulate(echo(), "", &zero_data),
            Err(SimulationFailure::Configuration(
                ConfigurationFailure::ZeroDataMemory
            ))
        );
        let zero_regs = SimulationConfig {
            register_count: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            zero_regs.validate(),
            Err(ConfigurationFailure::ZeroRegisters)
        );
    }

    #[test]
    fn test_echo_halts() {
        let report = simulate(echo(), "ab", &SimulationConfig::default()).expect("echo runs");
        assert_eq!(report.output, "ab");
        assert_eq!(report.stop, StopReason::Halted);
        // Two characters each take IN, BEQ, OUT, JMP; then IN, BEQ, HALT.
        assert_eq!(report.instructions, 11);
        assert_eq!(report.ticks, 2 * (2 + 3 + 2 + 2) + 2 + 3 + 1);
    }

    #[test]
    fn test_end_of_input() {
        // Without the BEQ test the program reads past the sentinel.
        let program = vec![
            inst(Opcode::In, &[1, STDIN_PORT], None),
            inst(Opcode::Out, &[1, STDOUT_PORT], None),
            inst(Opcode::Jmp, &[0], None),
        ];
        let report = simulate(program, "A", &SimulationConfig::default()).expect("program runs");
        assert_eq!(report.stop, StopReason::EndOfInput);
        assert_eq!(report.output, "A\0");
        assert_eq!(report.instructions, 7);
        assert_eq!(report.ticks, 2 * 6 + 1);
    }

    #[test]
    fn test_in_on_output_port_writes_output() {
        let program = vec![
            inst(Opcode::Add, &[1, 0, 72], Some(AddrType::Immediate)),
            inst(Opcode::Out, &[1, STDOUT_PORT], None),
            inst(Opcode::In, &[2, STDOUT_PORT], None),
            inst(Opcode::Halt, &[], None),
        ];
        let report = simulate(program, "", &SimulationConfig::default()).expect("program runs");
        assert_eq!(report.output, "HH");
        assert_eq!(report.stop, StopReason::Halted);
        assert_eq!(report.ticks, 3 + 2 + 2 + 1);
    }

    #[test]
    fn test_limit_exceeded() {
        let config = SimulationConfig {
            instruction_limit: 10,
            ..SimulationConfig::default()
        };
        let report = simulate(vec![inst(Opcode::Jmp, &[0], None)], "", &config)
            .expect("program runs");
        assert_eq!(report.stop, StopReason::LimitExceeded);
        assert_eq!(report.instructions, 10);
        assert_eq!(report.ticks, 20);
    }

    #[test]
    fn test_alarm_keeps_partial_output() {
        let program = vec![
            inst(Opcode::Out, &[1, STDOUT_PORT], None),
            inst(Opcode::Div, &[1, 1, 0], Some(AddrType::Immediate)),
        ];
        let mut machine = Machine::new(program, "", &SimulationConfig::default())
            .expect("default config is valid");
        machine.run().expect_err("division by zero");
        assert_eq!(machine.output_text(), "\0");
        assert_eq!(machine.control().instructions(), 2);
    }

    #[test]
    fn test_load_beyond_program_is_an_alarm() {
        let program = vec![
            inst(Opcode::Lw, &[1, 50], Some(AddrType::Immediate)),
            inst(Opcode::Halt, &[], None),
            MemoryCell::Data(5),
        ];
        let mut machine = Machine::new(program, "", &SimulationConfig::default())
            .expect("default config is valid");
        assert_eq!(machine.datapath().memory().len(), 3);
        assert_eq!(
            machine.run(),
            Err(Alarm::Memory {
                op: BadMemOp::Read(50),
                failure: MemoryOpFailure::NotMapped {
                    address: 50,
                    memory_size: 3,
                },
            })
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = SimulationReport {
            output: "hi".to_string(),
            instructions: 3,
            ticks: 7,
            stop: StopReason::EndOfInput,
        };
        assert_eq!(
            serde_json::to_string(&report).expect("report serializes"),
            r#"{"output":"hi","instructions":3,"ticks":7,"stop":"end_of_input"}"#
        );
    }
}
