//! The datapath holds all of the machine's mutable state.
//!
//! It has no control logic of its own.  Everything it does is a
//! primitive operation (select a register, latch a value, compute,
//! read or write a cell) requested by the control unit.
use std::fmt::{self, Display, Formatter};

use base::prelude::*;

use super::alarm::{Alarm, BadMemOp};
use super::io::{EndOfInput, IoUnit};
use super::memory::MemoryUnit;

/// The register file together with its three select latches.
///
/// Register 0 always reads as zero; writes to it are discarded.
#[derive(Debug, Clone)]
pub struct RegisterUnit {
    registers: Vec<Value>,
    rd: usize,
    rs1: usize,
    rs2: usize,
}

impl RegisterUnit {
    /// Create a register file.  There is always at least register 0.
    #[must_use]
    pub fn new(count: usize) -> RegisterUnit {
        RegisterUnit {
            registers: vec![0; count.max(1)],
            rd: 0,
            rs1: 0,
            rs2: 0,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.registers.len()
    }

    fn check(&self, index: Value) -> Result<usize, Alarm> {
        match usize::try_from(index) {
            Ok(i) if i < self.registers.len() => Ok(i),
            _ => Err(Alarm::BadRegister {
                index,
                count: self.registers.len(),
            }),
        }
    }

    /// # Errors
    ///
    /// Fails if there is no such register.
    pub fn select_dest(&mut self, index: Value) -> Result<(), Alarm> {
        self.rd = self.check(index)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if there is no such register.
    pub fn select_src1(&mut self, index: Value) -> Result<(), Alarm> {
        self.rs1 = self.check(index)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if there is no such register.
    pub fn select_src2(&mut self, index: Value) -> Result<(), Alarm> {
        self.rs2 = self.check(index)?;
        Ok(())
    }

    #[must_use]
    pub fn read_src1(&self) -> Value {
        self.registers[self.rs1]
    }

    #[must_use]
    pub fn read_src2(&self) -> Value {
        self.registers[self.rs2]
    }

    pub fn write_dest(&mut self, value: Value) {
        if self.rd != 0 {
            self.registers[self.rd] = value;
        }
    }

    /// Returns the value of a register, or `None` if there is no such
    /// register.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.registers.get(index).copied()
    }

    /// Set a register directly, for example to establish a starting
    /// state.  As with `write_dest`, register 0 is unaffected.
    ///
    /// # Errors
    ///
    /// Fails if there is no such register.
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), Alarm> {
        let i = self.check(Value::try_from(index).unwrap_or(Value::MAX))?;
        if i != 0 {
            self.registers[i] = value;
        }
        Ok(())
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.registers
    }
}

/// The arithmetic and logic unit.
#[derive(Debug, Clone, Default)]
pub struct Alu {
    left: Value,
    right: Value,
    output: Value,
}

impl Alu {
    pub fn load(&mut self, left: Value, right: Value) {
        self.left = left;
        self.right = right;
    }

    /// Apply `op` to the loaded operands.  Division truncates toward
    /// zero and the remainder takes the sign of the dividend.
    /// Arithmetic wraps on overflow.
    ///
    /// # Errors
    ///
    /// Fails when dividing by zero.
    pub fn compute(&mut self, op: ArithOp) -> Result<Value, Alarm> {
        let (a, b) = (self.left, self.right);
        self.output = match op {
            ArithOp::Add => a.wrapping_add(b),
            ArithOp::Sub => a.wrapping_sub(b),
            ArithOp::Mul => a.wrapping_mul(b),
            ArithOp::Div | ArithOp::Rem if b == 0 => {
                return Err(Alarm::DivideByZero { dividend: a });
            }
            ArithOp::Div => a.wrapping_div(b),
            ArithOp::Rem => a.wrapping_rem(b),
        };
        Ok(self.output)
    }

    #[must_use]
    pub fn output(&self) -> Value {
        self.output
    }
}

#[derive(Debug, Clone, Default)]
pub struct BranchComparator {
    left: Value,
    right: Value,
}

impl BranchComparator {
    pub fn load(&mut self, left: Value, right: Value) {
        self.left = left;
        self.right = right;
    }

    /// Returns `(equals, less_than)`.
    #[must_use]
    pub fn compare(&self) -> (bool, bool) {
        (self.left == self.right, self.left < self.right)
    }
}

#[derive(Debug, Clone)]
pub struct DataPath {
    memory: MemoryUnit,
    io: IoUnit,
    registers: RegisterUnit,
    alu: Alu,
    comparator: BranchComparator,
    instruction_pointer: Value,
    instruction_register: Option<Instruction>,
    immediate: Value,
    memory_address: Value,
    memory_data: Value,
}

impl DataPath {
    #[must_use]
    pub fn new(memory: Vec<MemoryCell>, io: IoUnit, register_count: usize) -> DataPath {
        DataPath {
            memory: MemoryUnit::new(memory),
            io,
            registers: RegisterUnit::new(register_count),
            alu: Alu::default(),
            comparator: BranchComparator::default(),
            instruction_pointer: 0,
            instruction_register: None,
            immediate: 0,
            memory_address: 0,
            memory_data: 0,
        }
    }

    /// Load the instruction register from the cell at the
    /// instruction pointer, and advance the instruction pointer.
    ///
    /// # Errors
    ///
    /// Fails if the instruction pointer does not address an
    /// instruction.
    pub fn fetch_instruction(&mut self) -> Result<Instruction, Alarm> {
        let address = self.instruction_pointer;
        let inst = self
            .memory
            .fetch_instruction(address)
            .map_err(|failure| Alarm::Memory {
                op: BadMemOp::Fetch(address),
                failure,
            })?
            .clone();
        self.instruction_pointer += 1;
        self.instruction_register = Some(inst.clone());
        Ok(inst)
    }

    #[must_use]
    pub fn instruction_pointer(&self) -> Value {
        self.instruction_pointer
    }

    #[must_use]
    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.instruction_register.as_ref()
    }

    /// # Errors
    ///
    /// Fails if there is no such register.
    pub fn select_dest(&mut self, index: Value) -> Result<(), Alarm> {
        self.registers.select_dest(index)
    }

    /// # Errors
    ///
    /// Fails if there is no such register.
    pub fn select_src1(&mut self, index: Value) -> Result<(), Alarm> {
        self.registers.select_src1(index)
    }

    /// # Errors
    ///
    /// Fails if there is no such register.
    pub fn select_src2(&mut self, index: Value) -> Result<(), Alarm> {
        self.registers.select_src2(index)
    }

    #[must_use]
    pub fn read_src1(&self) -> Value {
        self.registers.read_src1()
    }

    #[must_use]
    pub fn read_src2(&self) -> Value {
        self.registers.read_src2()
    }

    pub fn write_dest(&mut self, value: Value) {
        self.registers.write_dest(value);
    }

    pub fn load_immediate(&mut self, value: Value) {
        self.immediate = value;
    }

    #[must_use]
    pub fn immediate(&self) -> Value {
        self.immediate
    }

    /// Jump: copy the immediate latch into the instruction pointer.
    pub fn write_program_counter(&mut self) {
        self.instruction_pointer = self.immediate;
    }

    pub fn alu_mut(&mut self) -> &mut Alu {
        &mut self.alu
    }

    pub fn comparator_mut(&mut self) -> &mut BranchComparator {
        &mut self.comparator
    }

    /// # Errors
    ///
    /// Fails if `address` is outside memory or holds an instruction.
    pub fn read_cell(&mut self, address: Value) -> Result<Value, Alarm> {
        self.memory_address = address;
        self.memory_data = self.memory.read(address).map_err(|failure| Alarm::Memory {
            op: BadMemOp::Read(address),
            failure,
        })?;
        Ok(self.memory_data)
    }

    /// # Errors
    ///
    /// Fails if `address` is outside memory.
    pub fn write_cell(&mut self, address: Value, value: Value) -> Result<(), Alarm> {
        self.memory_address = address;
        self.memory_data = value;
        self.memory
            .write(address, value)
            .map_err(|failure| Alarm::Memory {
                op: BadMemOp::Write(address),
                failure,
            })
    }

    #[must_use]
    pub fn input_empty(&self) -> bool {
        self.io.input_empty()
    }

    /// # Errors
    ///
    /// Fails with [`EndOfInput`] when there is no more input.
    pub fn pop_input(&mut self) -> Result<Value, EndOfInput> {
        self.io.pop_input()
    }

    pub fn push_output(&mut self, value: Value) {
        self.io.push_output(value);
    }

    #[must_use]
    pub fn registers(&self) -> &RegisterUnit {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterUnit {
        &mut self.registers
    }

    #[must_use]
    pub fn memory(&self) -> &MemoryUnit {
        &self.memory
    }

    #[must_use]
    pub fn io(&self) -> &IoUnit {
        &self.io
    }
}

/// A one-line summary of the state, for trace logging.
impl Display for DataPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "IP: {}", self.instruction_pointer)?;
        if let Some(inst) = &self.instruction_register {
            write!(f, " IR: {inst}")?;
        }
        write!(
            f,
            " regs: {:?} rd: {} rs1: {} rs2: {} imm: {} ALU: {} MAR: {} MDR: {} in: {} out: {}",
            self.registers.values(),
            self.registers.rd,
            self.registers.rs1,
            self.registers.rs2,
            self.immediate,
            self.alu.output(),
            self.memory_address,
            self.memory_data,
            self.io.input_remaining(),
            self.io.output().len(),
        )
    }
}
