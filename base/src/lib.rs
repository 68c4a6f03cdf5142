//! The `base` crate defines the instruction set which is shared by
//! the translator (assembler) and by the simulator.  The idea is that
//! the assembler depends on the base crate but does not need to
//! depend on the simulator library itself.
//!
//! Besides the opcode catalogue this crate owns the program
//! representation, that is, the format of the file which the
//! translator writes and the simulator reads.

mod types;

pub mod instruction;
pub mod prelude;
pub mod program;

pub use types::*;
