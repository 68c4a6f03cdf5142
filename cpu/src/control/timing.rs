//! Instruction timing.
//!
//! Each instruction costs one tick to latch its operands, one
//! further tick if its category needs a compute step (comparator,
//! memory read or ALU), and one tick to commit.  HALT stops after
//! the operand latch.
//!
//! | Opcodes                   | Ticks |
//! |---------------------------|-------|
//! | HALT                      | 1     |
//! | JMP                       | 2     |
//! | BEQ BNE BLT BGT BNL BNG   | 3     |
//! | LW                        | 3     |
//! | SW                        | 2     |
//! | ADD SUB MUL DIV REM       | 3     |
//! | IN OUT                    | 2     |
//!
//! An `IN` which finds the input buffer empty stops the machine after
//! its operand latch, and so costs 1 tick rather than 2.

use base::prelude::*;

const LATCH: u64 = 1;
const COMPUTE: u64 = 1;
const COMMIT: u64 = 1;

/// The number of ticks a completed instruction with this opcode
/// takes.  The cost does not depend on operand values; for example
/// a branch costs the same whether or not it is taken.
#[must_use]
pub fn instruction_ticks(opcode: Opcode) -> u64 {
    match (opcode.category(), opcode) {
        (None, _) => LATCH,
        (Some(OpcodeCategory::Branch), Opcode::Jmp)
        | (Some(OpcodeCategory::Mem), Opcode::Sw)
        | (Some(OpcodeCategory::Io), _) => LATCH + COMMIT,
        (Some(OpcodeCategory::Branch | OpcodeCategory::Mem | OpcodeCategory::Arith), _) => {
            LATCH + COMPUTE + COMMIT
        }
    }
}

#[test]
fn test_instruction_ticks() {
    let expected = |op: Opcode| -> u64 {
        match op {
            Opcode::Halt => 1,
            Opcode::Jmp | Opcode::Sw | Opcode::In | Opcode::Out => 2,
            _ => 3,
        }
    };
    for op in Opcode::ALL {
        assert_eq!(instruction_ticks(op), expected(op), "ticks for {op}");
    }
}
