//! This module emulates the unified memory.
//!
//! Memory holds the program's instructions followed by its data, in
//! one flat address space.  Instructions can only be fetched from
//! instruction cells and data can only be read from data cells.  A
//! store to any address within the memory replaces the cell with a
//! data cell.
use std::error;
use std::fmt::{self, Display, Formatter, Write};

use tracing::{event, Level};

use base::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryOpFailure {
    NotMapped { address: Value, memory_size: usize },
    NotData(Value),
    NotInstruction(Value),
}

impl Display for MemoryOpFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            MemoryOpFailure::NotMapped {
                address,
                memory_size,
            } => write!(
                f,
                "address {address} is outside memory (which has {memory_size} cells)"
            ),
            MemoryOpFailure::NotData(address) => {
                write!(f, "address {address} holds an instruction, not data")
            }
            MemoryOpFailure::NotInstruction(address) => {
                write!(f, "address {address} holds data, not an instruction")
            }
        }
    }
}

impl error::Error for MemoryOpFailure {}

#[derive(Debug, Clone)]
pub struct MemoryUnit {
    cells: Vec<MemoryCell>,
}

impl MemoryUnit {
    #[must_use]
    pub fn new(cells: Vec<MemoryCell>) -> MemoryUnit {
        MemoryUnit { cells }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn cells(&self) -> &[MemoryCell] {
        &self.cells
    }

    fn index(&self, address: Value) -> Result<usize, MemoryOpFailure> {
        match usize::try_from(address) {
            Ok(i) if i < self.cells.len() => Ok(i),
            _ => Err(MemoryOpFailure::NotMapped {
                address,
                memory_size: self.cells.len(),
            }),
        }
    }

    /// # Errors
    ///
    /// Fails if the address is outside memory or holds data.
    pub fn fetch_instruction(&self, address: Value) -> Result<&Instruction, MemoryOpFailure> {
        let i = self.index(address)?;
        self.cells[i]
            .as_instruction()
            .ok_or(MemoryOpFailure::NotInstruction(address))
    }

    /// # Errors
    ///
    /// Fails if the address is outside memory or holds an instruction.
    pub fn read(&self, address: Value) -> Result<Value, MemoryOpFailure> {
        let i = self.index(address)?;
        self.cells[i]
            .as_data()
            .ok_or(MemoryOpFailure::NotData(address))
    }

    /// # Errors
    ///
    /// Fails if the address is outside memory.
    pub fn write(&mut self, address: Value, value: Value) -> Result<(), MemoryOpFailure> {
        let i = self.index(address)?;
        if let MemoryCell::Instruction(inst) = &self.cells[i] {
            event!(
                Level::WARN,
                "store to address {address} overwrites the instruction {inst}"
            );
        }
        self.cells[i] = MemoryCell::Data(value);
        Ok(())
    }

    /// Render the data cells, highest address first, with the address
    /// and value in both decimal and binary.
    #[must_use]
    pub fn data_dump(&self) -> String {
        let mut result = String::new();
        for (address, cell) in self.cells.iter().enumerate().rev() {
            if let MemoryCell::Data(value) = cell {
                // Writing to a String cannot fail.
                let _ = writeln!(
                    result,
                    "[{address:5}]    [{address:010b}]  -> [{value:08b}] = ({value:10})"
                );
            }
        }
        result
    }
}
