//! Construction of the label tables, the data list and the
//! (unresolved) instruction list from the tokens of each section.
use std::str::FromStr;

use tracing::{event, Level};

use base::prelude::*;

use super::lexer::rx::{INDIRECT_REGISTER, REGISTER};
use super::lexer::Token;
use super::symtab::{Section, SymbolTable};
use super::types::{AssemblerFailure, SyntaxErrorKind};


/// An instruction whose operands are still the tokens from the
/// source.  Labels are resolved once the whole program has been
/// read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingInstruction {
    pub(crate) opcode: Opcode,
    pub(crate) operands: Vec<String>,
    pub(crate) addr_type: Option<AddrType>,
}

/// Classify an operand by its surface syntax.  Anything which is not
/// a register (bare or bracketed) is an immediate.
pub(crate) fn detect_addr_type(operand: &str) -> AddrType {
    if REGISTER.is_match(operand) {
        AddrType::Direct
    } else if INDIRECT_REGISTER.is_match(operand) {
        AddrType::Indirect
    } else {
        AddrType::Immediate
    }
}

/// Decide the addressing tag of an instruction from its operands.
fn addr_type_for(opcode: Opcode, operands: &[String]) -> Result<Option<AddrType>, AssemblerFailure> {
    let Some(last) = operands.last() else {
        return Ok(None);
    };
    match opcode.category() {
        Some(OpcodeCategory::Mem) => Ok(Some(match detect_addr_type(last) {
            // A bare register is never itself a memory address; it
            // means the same as the bracketed form.
            AddrType::Direct | AddrType::Indirect => AddrType::Indirect,
            AddrType::Immediate => AddrType::Immediate,
        })),
        Some(OpcodeCategory::Arith) => match detect_addr_type(last) {
            AddrType::Indirect => Err(AssemblerFailure::syntax(
                SyntaxErrorKind::BadAddressing,
                last,
            )),
            t => Ok(Some(t)),
        },
        Some(OpcodeCategory::Branch | OpcodeCategory::Io) | None => Ok(None),
    }
}

/// Every operand but the last one names a register.  Only the
/// address register of SW may also be bracketed.
fn check_registers(opcode: Opcode, operands: &[String]) -> Result<(), AssemblerFailure> {
    let register_operands = operands.len().saturating_sub(1);
    for operand in &operands[..register_operands] {
        let bracketed_ok = opcode == Opcode::Sw && INDIRECT_REGISTER.is_match(operand);
        if !(REGISTER.is_match(operand) || bracketed_ok) {
            return Err(AssemblerFailure::syntax(
                SyntaxErrorKind::ExpectedRegister,
                operand,
            ));
        }
    }
    Ok(())
}

/// Build the data list, recording data labels in `symtab`.
pub(crate) fn parse_data(
    tokens: Vec<Token>,
    symtab: &mut SymbolTable,
) -> Result<Vec<Value>, AssemblerFailure> {
    let mut data: Vec<Value> = Vec::new();
    for token in tokens {
        match token {
            Token::LabelDeclaration(name) => symtab.define(Section::Data, &name, data.len())?,
            Token::Word(w) => match w.parse::<Value>() {
                Ok(n) => data.push(n),
                Err(_) => {
                    return Err(AssemblerFailure::syntax(SyntaxErrorKind::BadDataValue, &w));
                }
            },
        }
    }
    event!(Level::DEBUG, "data section holds {} values", data.len());
    Ok(data)
}

/// Build the instruction list, recording code labels in `symtab`.
pub(crate) fn parse_text(
    tokens: Vec<Token>,
    symtab: &mut SymbolTable,
) -> Result<Vec<PendingInstruction>, AssemblerFailure> {
    let mut code: Vec<PendingInstruction> = Vec::new();
    let mut tokens = tokens.into_iter();
    while let Some(token) = tokens.next() {
        let mnemonic = match token {
            Token::LabelDeclaration(name) => {
                symtab.define(Section::Text, &name, code.len())?;
                continue;
            }
            Token::Word(w) => w,
        };
        let opcode = Opcode::from_str(&mnemonic).map_err(|_| {
            AssemblerFailure::syntax(SyntaxErrorKind::UnknownInstruction, &mnemonic)
        })?;
        let mut operands: Vec<String> = Vec::with_capacity(opcode.operand_count());
        for _ in 0..opcode.operand_count() {
            match tokens.next() {
                Some(Token::Word(w)) => operands.push(w),
                Some(Token::LabelDeclaration(name)) => {
                    return Err(AssemblerFailure::syntax(
                        SyntaxErrorKind::UnexpectedLabel,
                        &format!("{name}:"),
                    ));
                }
                None => {
                    return Err(AssemblerFailure::syntax(
                        SyntaxErrorKind::MissingOperand,
                        &mnemonic,
                    ));
                }
            }
        }
        check_registers(opcode, &operands)?;
        let addr_type = addr_type_for(opcode, &operands)?;
        code.push(PendingInstruction {
            opcode,
            operands,
            addr_type,
        });
    }
    event!(Level::DEBUG, "text section holds {} instructions", code.len());
    Ok(code)
}
