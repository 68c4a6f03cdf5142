//! Symbolic representation of instructions.
//!
//! There is no binary encoding of instructions; a program is an
//! ordered sequence of [`MemoryCell`] values, each of which is either
//! an instruction or an integer datum.  Instructions are stored in
//! program order at the start of memory, and the data follows them.
//!
//! Each opcode belongs to at most one [`OpcodeCategory`].  The
//! category decides how many operands the instruction takes and
//! whether it carries an [`AddrType`] tag.
//!
//! | Category | Opcodes                       | Operands | Tagged |
//! |----------|-------------------------------|----------|--------|
//! | mem      | LW, SW                        | 2        | yes    |
//! | branch   | JMP                           | 1        | no     |
//! | branch   | BEQ, BNE, BLT, BGT, BNL, BNG  | 3        | no     |
//! | arith    | ADD, SUB, MUL, DIV, REM       | 3        | yes    |
//! | io       | IN, OUT                       | 2        | no     |
//! | (none)   | HALT                          | 0        | no     |

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
#[cfg(test)]
use test_strategy::{proptest, Arbitrary};

use super::types::Value;

mod format;

/// The complete set of operations the machine understands.
///
/// The serialized form of each variant is its upper-case mnemonic.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    Lw,
    Sw,
    Jmp,
    Beq,
    Bne,
    Blt,
    Bgt,
    Bnl,
    Bng,
    In,
    Out,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Halt,
}

/// Groups of opcodes which share operand layout and microcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpcodeCategory {
    Mem,
    Branch,
    Arith,
    Io,
}

/// The operations the ALU can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// The condition under which a conditional branch is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BranchCondition {
    Equal,
    NotEqual,
    Less,
    Greater,
    NotLess,
    NotGreater,
}

impl BranchCondition {
    /// Decide whether the branch is taken, given the outputs of the
    /// branch comparator.
    #[must_use]
    pub fn is_taken(self, equals: bool, less_than: bool) -> bool {
        match self {
            BranchCondition::Equal => equals,
            BranchCondition::NotEqual => !equals,
            BranchCondition::Less => less_than,
            BranchCondition::NotLess => !less_than,
            BranchCondition::Greater => !less_than && !equals,
            BranchCondition::NotGreater => less_than || equals,
        }
    }
}

impl Opcode {
    pub const ALL: [Opcode; 17] = [
        Opcode::Lw,
        Opcode::Sw,
        Opcode::Jmp,
        Opcode::Beq,
        Opcode::Bne,
        Opcode::Blt,
        Opcode::Bgt,
        Opcode::Bnl,
        Opcode::Bng,
        Opcode::In,
        Opcode::Out,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Rem,
        Opcode::Halt,
    ];

    /// HALT is the only opcode which belongs to no category.
    #[must_use]
    pub fn category(self) -> Option<OpcodeCategory> {
        use Opcode::*;
        match self {
            Lw | Sw => Some(OpcodeCategory::Mem),
            Jmp | Beq | Bne | Blt | Bgt | Bnl | Bng => Some(OpcodeCategory::Branch),
            Add | Sub | Mul | Div | Rem => Some(OpcodeCategory::Arith),
            In | Out => Some(OpcodeCategory::Io),
            Halt => None,
        }
    }

    /// The number of operands written in assembly source (not
    /// counting the addressing tag).
    #[must_use]
    pub fn operand_count(self) -> usize {
        match (self, self.category()) {
            (_, None) => 0,
            (Opcode::Jmp, _) => 1,
            (_, Some(OpcodeCategory::Mem | OpcodeCategory::Io)) => 2,
            (_, Some(OpcodeCategory::Branch | OpcodeCategory::Arith)) => 3,
        }
    }

    /// Memory and arithmetic instructions carry an [`AddrType`]
    /// describing their last operand.
    #[must_use]
    pub fn takes_addr_type(self) -> bool {
        matches!(
            self.category(),
            Some(OpcodeCategory::Mem | OpcodeCategory::Arith)
        )
    }

    #[must_use]
    pub fn arith_op(self) -> Option<ArithOp> {
        match self {
            Opcode::Add => Some(ArithOp::Add),
            Opcode::Sub => Some(ArithOp::Sub),
            Opcode::Mul => Some(ArithOp::Mul),
            Opcode::Div => Some(ArithOp::Div),
            Opcode::Rem => Some(ArithOp::Rem),
            _ => None,
        }
    }

    /// Returns the condition of a conditional branch.  `JMP` is
    /// unconditional and so yields `None`, like every opcode outside
    /// the branch category.
    #[must_use]
    pub fn branch_condition(self) -> Option<BranchCondition> {
        match self {
            Opcode::Beq => Some(BranchCondition::Equal),
            Opcode::Bne => Some(BranchCondition::NotEqual),
            Opcode::Blt => Some(BranchCondition::Less),
            Opcode::Bgt => Some(BranchCondition::Greater),
            Opcode::Bnl => Some(BranchCondition::NotLess),
            Opcode::Bng => Some(BranchCondition::NotGreater),
            _ => None,
        }
    }
}

/// Signals that some text is not the mnemonic of any opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOpcode(pub String);

impl Display for UnknownOpcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "unknown instruction {}", self.0)
    }
}

impl Error for UnknownOpcode {}

/// Mnemonics are not case-sensitive.
impl FromStr for Opcode {
    type Err = UnknownOpcode;

    fn from_str(s: &str) -> Result<Opcode, UnknownOpcode> {
        let upper = s.to_ascii_uppercase();
        Opcode::ALL
            .into_iter()
            .find(|op| op.to_string() == upper)
            .ok_or_else(|| UnknownOpcode(s.to_string()))
    }
}

/// Describes how the last operand of a memory or arithmetic
/// instruction is interpreted.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddrType {
    /// The operand names a register whose value is used.
    Direct = 0,
    /// The operand names a register holding a memory address.
    Indirect = 1,
    /// The operand is a literal value (perhaps a resolved label).
    Immediate = 2,
}

impl From<AddrType> for Value {
    fn from(t: AddrType) -> Value {
        match t {
            AddrType::Direct => 0,
            AddrType::Indirect => 1,
            AddrType::Immediate => 2,
        }
    }
}

impl TryFrom<Value> for AddrType {
    type Error = BadInstruction;

    fn try_from(n: Value) -> Result<AddrType, BadInstruction> {
        match n {
            0 => Ok(AddrType::Direct),
            1 => Ok(AddrType::Indirect),
            2 => Ok(AddrType::Immediate),
            other => Err(BadInstruction::UnknownAddrType(other)),
        }
    }
}

/// Signals that an instruction's operands don't fit its opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadInstruction {
    WrongOperandCount {
        opcode: Opcode,
        expected: usize,
        got: usize,
    },
    MissingAddrType(Opcode),
    UnexpectedAddrType(Opcode),
    UnknownAddrType(Value),
}

impl Display for BadInstruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            BadInstruction::WrongOperandCount {
                opcode,
                expected,
                got,
            } => write!(f, "{opcode} takes {expected} operands but {got} were given"),
            BadInstruction::MissingAddrType(opcode) => {
                write!(f, "{opcode} needs an addressing type")
            }
            BadInstruction::UnexpectedAddrType(opcode) => {
                write!(f, "{opcode} does not take an addressing type")
            }
            BadInstruction::UnknownAddrType(n) => write!(f, "{n} is not a valid addressing type"),
        }
    }
}

impl Error for BadInstruction {}

/// A decoded instruction.
///
/// The fields are private so that every `Instruction` has exactly
/// the number of operands its opcode requires, and an addressing tag
/// if and only if the opcode takes one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    opcode: Opcode,
    operands: Vec<Value>,
    addr_type: Option<AddrType>,
}

impl Instruction {
    /// # Errors
    ///
    /// Fails when the operand count or the presence of the addressing
    /// tag is wrong for `opcode`.
    pub fn new(
        opcode: Opcode,
        operands: Vec<Value>,
        addr_type: Option<AddrType>,
    ) -> Result<Instruction, BadInstruction> {
        let expected = opcode.operand_count();
        if operands.len() != expected {
            return Err(BadInstruction::WrongOperandCount {
                opcode,
                expected,
                got: operands.len(),
            });
        }
        match (opcode.takes_addr_type(), addr_type) {
            (true, None) => Err(BadInstruction::MissingAddrType(opcode)),
            (false, Some(_)) => Err(BadInstruction::UnexpectedAddrType(opcode)),
            _ => Ok(Instruction {
                opcode,
                operands,
                addr_type,
            }),
        }
    }

    /// Decode the operand list used in the program file, where the
    /// addressing tag (if any) is the last element.
    ///
    /// # Errors
    ///
    /// As for [`Instruction::new`], and also when the trailing tag is
    /// not a valid [`AddrType`].
    pub fn from_encoded_args(opcode: Opcode, args: &[Value]) -> Result<Instruction, BadInstruction> {
        if opcode.takes_addr_type() {
            match args.split_last() {
                Some((tag, operands)) => {
                    let addr_type = AddrType::try_from(*tag)?;
                    Instruction::new(opcode, operands.to_vec(), Some(addr_type))
                }
                None => Err(BadInstruction::MissingAddrType(opcode)),
            }
        } else {
            Instruction::new(opcode, args.to_vec(), None)
        }
    }

    /// The inverse of [`Instruction::from_encoded_args`].
    #[must_use]
    pub fn encoded_args(&self) -> Vec<Value> {
        let mut args = self.operands.clone();
        if let Some(t) = self.addr_type {
            args.push(Value::from(t));
        }
        args
    }

    #[must_use]
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    #[must_use]
    pub fn operands(&self) -> &[Value] {
        &self.operands
    }

    #[must_use]
    pub fn addr_type(&self) -> Option<AddrType> {
        self.addr_type
    }

    /// True when the last operand is a literal rather than a register.
    #[must_use]
    pub fn is_immediate(&self) -> bool {
        self.addr_type == Some(AddrType::Immediate)
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Instruction({self})")
    }
}

/// One location in the unified memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemoryCell {
    Instruction(Instruction),
    Data(Value),
}

impl MemoryCell {
    #[must_use]
    pub fn as_data(&self) -> Option<Value> {
        match self {
            MemoryCell::Data(n) => Some(*n),
            MemoryCell::Instruction(_) => None,
        }
    }

    #[must_use]
    pub fn as_instruction(&self) -> Option<&Instruction> {
        match self {
            MemoryCell::Instruction(inst) => Some(inst),
            MemoryCell::Data(_) => None,
        }
    }
}

impl From<Instruction> for MemoryCell {
    fn from(inst: Instruction) -> MemoryCell {
        MemoryCell::Instruction(inst)
    }
}

#[cfg(test)]
#[proptest]
fn mnemonic_round_trip(op: Opcode) {
    let mnemonic = op.to_string();
    assert_eq!(Opcode::from_str(&mnemonic), Ok(op));
    assert_eq!(Opcode::from_str(&mnemonic.to_ascii_lowercase()), Ok(op));
}

#[cfg(test)]
#[proptest]
fn addressing_tags_follow_category(op: Opcode, tag: AddrType) {
    let operands = vec![1; op.operand_count()];
    let result = Instruction::new(op, operands.clone(), Some(tag));
    if op.takes_addr_type() {
        assert!(result.is_ok());
        assert!(Instruction::new(op, operands, None).is_err());
    } else {
        assert_eq!(result, Err(BadInstruction::UnexpectedAddrType(op)));
        assert!(Instruction::new(op, operands, None).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_partition_the_opcodes() {
        let count = |c: OpcodeCategory| {
            Opcode::ALL
                .iter()
                .filter(|op| op.category() == Some(c))
                .count()
        };
        assert_eq!(count(OpcodeCategory::Mem), 2);
        assert_eq!(count(OpcodeCategory::Branch), 7);
        assert_eq!(count(OpcodeCategory::Arith), 5);
        assert_eq!(count(OpcodeCategory::Io), 2);
        assert_eq!(Opcode::Halt.category(), None);
    }

    #[test]
    fn unknown_mnemonic_is_named() {
        let e = Opcode::from_str("FROB").expect_err("FROB is not an opcode");
        assert_eq!(e.to_string(), "unknown instruction FROB");
    }

    #[test]
    fn branch_conditions() {
        // (equals, less_than) for a == b, a < b, a > b.
        const EQ: (bool, bool) = (true, false);
        const LT: (bool, bool) = (false, true);
        const GT: (bool, bool) = (false, false);
        let taken = |op: Opcode, (e, l): (bool, bool)| {
            op.branch_condition()
                .expect("conditional branch")
                .is_taken(e, l)
        };
        assert!(taken(Opcode::Beq, EQ));
        assert!(!taken(Opcode::Beq, LT));
        assert!(taken(Opcode::Bne, GT));
        assert!(!taken(Opcode::Bne, EQ));
        assert!(taken(Opcode::Blt, LT));
        assert!(!taken(Opcode::Blt, EQ));
        assert!(taken(Opcode::Bgt, GT));
        assert!(!taken(Opcode::Bgt, EQ));
        assert!(!taken(Opcode::Bgt, LT));
        assert!(taken(Opcode::Bnl, EQ));
        assert!(taken(Opcode::Bnl, GT));
        assert!(!taken(Opcode::Bnl, LT));
        assert!(taken(Opcode::Bng, EQ));
        assert!(taken(Opcode::Bng, LT));
        assert!(!taken(Opcode::Bng, GT));
        assert_eq!(Opcode::Jmp.branch_condition(), None);
    }

    #[test]
    fn encoded_args_carry_trailing_tag() {
        let inst = Instruction::new(Opcode::Add, vec![1, 2, 5], Some(AddrType::Immediate))
            .expect("valid test data");
        assert_eq!(inst.encoded_args(), vec![1, 2, 5, 2]);
        assert_eq!(
            Instruction::from_encoded_args(Opcode::Add, &[1, 2, 5, 2]),
            Ok(inst)
        );
        assert_eq!(
            Instruction::from_encoded_args(Opcode::Lw, &[1, 2, 7]),
            Err(BadInstruction::UnknownAddrType(7))
        );
        assert_eq!(
            Instruction::from_encoded_args(Opcode::Jmp, &[]),
            Err(BadInstruction::WrongOperandCount {
                opcode: Opcode::Jmp,
                expected: 1,
                got: 0
            })
        );
    }
}
