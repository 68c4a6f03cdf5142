/// Human-oriented formatting for instructions (or parts of instructions).
use std::fmt::{self, Display, Formatter};

use crate::instruction::{AddrType, Instruction, Opcode, OpcodeCategory};

/// Convert an opcode to its mnemonic.
impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        use Opcode::*;
        f.write_str(match self {
            Lw => "LW",
            Sw => "SW",
            Jmp => "JMP",
            Beq => "BEQ",
            Bne => "BNE",
            Blt => "BLT",
            Bgt => "BGT",
            Bnl => "BNL",
            Bng => "BNG",
            In => "IN",
            Out => "OUT",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Rem => "REM",
            Halt => "HALT",
        })
    }
}

impl Display for AddrType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            AddrType::Direct => "direct",
            AddrType::Indirect => "indirect",
            AddrType::Immediate => "immediate",
        })
    }
}

/// Render the instruction in assembly syntax, so `ADD r1, r2, 5`
/// rather than the encoded argument list.
impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let op = self.opcode();
        let imm = self.is_immediate();
        match (op, op.category(), self.operands()) {
            (Opcode::Halt, _, _) => write!(f, "{op}"),
            (Opcode::Jmp, _, [target]) => write!(f, "{op} {target}"),
            (Opcode::Lw, _, [rd, addr]) if imm => write!(f, "{op} r{rd}, {addr}"),
            (Opcode::Lw, _, [rd, rs]) => write!(f, "{op} r{rd}, [r{rs}]"),
            (Opcode::Sw, _, [rs1, value]) if imm => write!(f, "{op} [r{rs1}], {value}"),
            (Opcode::Sw, _, [rs1, rs2]) => write!(f, "{op} [r{rs1}], r{rs2}"),
            (_, Some(OpcodeCategory::Branch), [a, b, target]) => {
                write!(f, "{op} r{a}, r{b}, {target}")
            }
            (_, Some(OpcodeCategory::Arith), [rd, rs1, value]) if imm => {
                write!(f, "{op} r{rd}, r{rs1}, {value}")
            }
            (_, Some(OpcodeCategory::Arith), [rd, rs1, rs2]) => {
                write!(f, "{op} r{rd}, r{rs1}, r{rs2}")
            }
            (_, Some(OpcodeCategory::Io), [reg, port]) => write!(f, "{op} r{reg}, {port}"),
            (_, _, operands) => write!(f, "{op} {operands:?}"),
        }
    }
}

#[test]
fn test_display_instruction() {
    let show = |op: Opcode, operands: Vec<i64>, t: Option<AddrType>| {
        Instruction::new(op, operands, t)
            .expect("valid test data")
            .to_string()
    };
    assert_eq!(show(Opcode::Halt, vec![], None), "HALT");
    assert_eq!(show(Opcode::Jmp, vec![4], None), "JMP 4");
    assert_eq!(
        show(Opcode::Lw, vec![1, 2], Some(AddrType::Indirect)),
        "LW r1, [r2]"
    );
    assert_eq!(
        show(Opcode::Lw, vec![1, 9], Some(AddrType::Immediate)),
        "LW r1, 9"
    );
    assert_eq!(
        show(Opcode::Sw, vec![3, 4], Some(AddrType::Indirect)),
        "SW [r3], r4"
    );
    assert_eq!(show(Opcode::Bne, vec![1, 0, 6], None), "BNE r1, r0, 6");
    assert_eq!(
        show(Opcode::Sub, vec![1, 1, 1], Some(AddrType::Immediate)),
        "SUB r1, r1, 1"
    );
    assert_eq!(
        show(Opcode::Mul, vec![1, 2, 3], Some(AddrType::Direct)),
        "MUL r1, r2, r3"
    );
    assert_eq!(show(Opcode::Out, vec![2, 1], None), "OUT r2, 1");
}
