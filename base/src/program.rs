//! The program file format.
//!
//! A program is written as a JSON array with one record per line,
//! so that two versions of a program can be compared with `diff`.
//! An instruction record looks like
//! `{"opcode":"ADD","args":[1,2,3,0]}`, where the last element of
//! `args` is the addressing tag (only memory and arithmetic
//! instructions have one).  A data record looks like `{"data":72}`.
//!
//! Older versions of the translator also emitted an `addr_type` key
//! next to `args`.  We accept that on input (it must agree with the
//! trailing argument) but never write it.
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use super::instruction::{Instruction, MemoryCell, Opcode};
use super::types::Value;

#[derive(Debug)]
pub enum ProgramFormatError {
    Io(io::Error),
    Json(serde_json::Error),
    BadRecord { index: usize, msg: String },
}

impl Display for ProgramFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ProgramFormatError::Io(e) => write!(f, "I/O error: {e}"),
            ProgramFormatError::Json(e) => write!(f, "program is not well-formed: {e}"),
            ProgramFormatError::BadRecord { index, msg } => {
                write!(f, "bad program record at index {index}: {msg}")
            }
        }
    }
}

impl Error for ProgramFormatError {}

impl From<io::Error> for ProgramFormatError {
    fn from(e: io::Error) -> ProgramFormatError {
        ProgramFormatError::Io(e)
    }
}

impl From<serde_json::Error> for ProgramFormatError {
    fn from(e: serde_json::Error) -> ProgramFormatError {
        ProgramFormatError::Json(e)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    opcode: Option<Opcode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    args: Option<Vec<Value>>,
    #[serde(default, skip_serializing)]
    addr_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl From<&MemoryCell> for Record {
    fn from(cell: &MemoryCell) -> Record {
        match cell {
            MemoryCell::Instruction(inst) => Record {
                opcode: Some(inst.opcode()),
                args: Some(inst.encoded_args()),
                ..Record::default()
            },
            MemoryCell::Data(n) => Record {
                data: Some(*n),
                ..Record::default()
            },
        }
    }
}

impl Record {
    fn into_cell(self, index: usize) -> Result<MemoryCell, ProgramFormatError> {
        let bad = |msg: String| ProgramFormatError::BadRecord { index, msg };
        match self {
            Record {
                opcode: Some(opcode),
                args: Some(args),
                addr_type,
                data: None,
            } => {
                let inst = Instruction::from_encoded_args(opcode, &args)
                    .map_err(|e| bad(e.to_string()))?;
                match addr_type {
                    Some(tag) if inst.addr_type().map(Value::from) != Some(tag) => Err(bad(
                        format!("addr_type {tag} disagrees with the arguments {args:?}"),
                    )),
                    _ => Ok(MemoryCell::Instruction(inst)),
                }
            }
            Record {
                opcode: None,
                args: None,
                addr_type: None,
                data: Some(n),
            } => Ok(MemoryCell::Data(n)),
            _ => Err(bad(
                "a record needs either both opcode and args, or only data".to_string(),
            )),
        }
    }
}

/// Write the program, one record per line.
///
/// # Errors
///
/// Fails when the underlying writer fails.
pub fn write_program<W: Write>(mut w: W, cells: &[MemoryCell]) -> Result<(), ProgramFormatError> {
    w.write_all(b"[")?;
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            w.write_all(b",\n ")?;
        }
        serde_json::to_writer(&mut w, &Record::from(cell))?;
    }
    w.write_all(b"]")?;
    w.flush()?;
    Ok(())
}

/// # Errors
///
/// Fails when the input is not valid JSON, contains an unknown
/// opcode, or contains a record whose arguments don't fit its opcode.
pub fn read_program<R: Read>(r: R) -> Result<Vec<MemoryCell>, ProgramFormatError> {
    let records: Vec<Record> = serde_json::from_reader(r)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_cell(index))
        .collect()
}

#[must_use]
pub fn program_to_string(cells: &[MemoryCell]) -> String {
    let mut buf: Vec<u8> = Vec::new();
    match write_program(&mut buf, cells) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        // Writing into a Vec only fails if serialization does, and
        // none of our records can fail to serialize.
        Err(e) => unreachable!("serializing a program into memory failed: {e}"),
    }
}

/// # Errors
///
/// As for [`read_program`].
pub fn program_from_str(s: &str) -> Result<Vec<MemoryCell>, ProgramFormatError> {
    read_program(s.as_bytes())
}
