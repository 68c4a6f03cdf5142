//! The prelude exports the types which almost every user of the
//! instruction set needs.
pub use super::instruction::*;
pub use super::program::{
    program_from_str, program_to_string, read_program, write_program, ProgramFormatError,
};
pub use super::types::*;
