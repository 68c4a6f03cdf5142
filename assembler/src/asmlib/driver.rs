use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

use tracing::{event, span, Level};

use base::prelude::*;

use super::lexer::{expand_char_literals, split_sections, tokenize};
use super::listing::Listing;
use super::parser::{parse_data, parse_text, PendingInstruction};
use super::source::normalize;
use super::symtab::SymbolTable;
use super::types::{AssemblerFailure, SyntaxErrorKind};

mod output;
#[cfg(test)]
mod tests;

#[derive(Debug, Default, Clone, Copy)]
pub struct OutputOptions {
    /// When set, print a listing of the program on stdout.
    pub list: bool,
}

/// The result of assembling a program, before it is written out.
struct Assembly {
    memory: Vec<MemoryCell>,
    symbols: SymbolTable,
    code_len: usize,
}

/// Turn one operand token into a number.  Labels take priority over
/// the other forms; then a register (bare or bracketed) becomes its
/// index; and anything else must be a numeral.
fn resolve_operand(
    token: &str,
    symbols: &SymbolTable,
    code_len: usize,
) -> Result<Value, AssemblerFailure> {
    if let Some(address) = symbols.lookup(token, code_len) {
        return Ok(address);
    }
    let inner = token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(token);
    let number = match inner.strip_prefix('r') {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits,
        _ => inner,
    };
    number
        .parse::<Value>()
        .map_err(|_| AssemblerFailure::syntax(SyntaxErrorKind::UndefinedSymbol, token))
}

fn resolve_instruction(
    pending: PendingInstruction,
    symbols: &SymbolTable,
    code_len: usize,
) -> Result<Instruction, AssemblerFailure> {
    let operands: Vec<Value> = pending
        .operands
        .iter()
        .map(|token| resolve_operand(token, symbols, code_len))
        .collect::<Result<Vec<Value>, AssemblerFailure>>()?;
    match Instruction::new(pending.opcode, operands, pending.addr_type) {
        Ok(inst) => Ok(inst),
        // The parser consumes exactly the right number of operands
        // and tags exactly the opcodes which take a tag.
        Err(e) => unreachable!("parser produced an invalid {}: {e}", pending.opcode),
    }
}

fn assemble_source(source: &str) -> Result<Assembly, AssemblerFailure> {
    let normalized = normalize(source);
    let expanded = expand_char_literals(&normalized);
    let sections = split_sections(&expanded)?;

    let mut symbols = SymbolTable::new();
    let data = parse_data(tokenize(sections.data)?, &mut symbols)?;
    let pending = parse_text(tokenize(sections.text)?, &mut symbols)?;

    let code_len = pending.len();
    let mut memory: Vec<MemoryCell> = Vec::with_capacity(code_len + data.len());
    for p in pending {
        memory.push(MemoryCell::Instruction(resolve_instruction(
            p, &symbols, code_len,
        )?));
    }
    memory.extend(data.into_iter().map(MemoryCell::Data));
    event!(
        Level::DEBUG,
        "assembled {} instructions and {} data cells",
        code_len,
        memory.len() - code_len
    );
    Ok(Assembly {
        memory,
        symbols,
        code_len,
    })
}

/// Assemble a program.  The instructions come first in the result,
/// followed by the data.
///
/// # Errors
///
/// Fails on any syntax error; the error names the offending token.
pub fn assemble(source: &str) -> Result<Vec<MemoryCell>, AssemblerFailure> {
    assemble_source(source).map(|assembly| assembly.memory)
}

/// As [`assemble`], but also return a human-readable listing of the
/// result, showing addresses and labels.
///
/// # Errors
///
/// As for [`assemble`].
pub fn assemble_with_listing(source: &str) -> Result<(Vec<MemoryCell>, String), AssemblerFailure> {
    let assembly = assemble_source(source)?;
    let listing = Listing::new(&assembly.memory, &assembly.symbols, assembly.code_len).to_string();
    Ok((assembly.memory, listing))
}

/// Assemble the source file `input_file_name` and write the program
/// to `output_file_name`.
///
/// # Errors
///
/// Fails when the input cannot be read, the source contains a syntax
/// error, or the output cannot be written.
pub fn assemble_file(
    input_file_name: &OsStr,
    output_file_name: &Path,
    options: OutputOptions,
) -> Result<(), AssemblerFailure> {
    let span = span!(Level::INFO, "assemble_file", input=?input_file_name);
    let _enter = span.enter();

    let source = {
        let read_failed = |error| AssemblerFailure::IoErrorOnInput {
            filename: input_file_name.to_owned(),
            error,
        };
        let mut source_file = OpenOptions::new()
            .read(true)
            .open(input_file_name)
            .map_err(read_failed)?;
        let mut source = String::new();
        source_file
            .read_to_string(&mut source)
            .map_err(read_failed)?;
        source
    };

    let assembly = assemble_source(&source)?;
    if options.list {
        let listing = Listing::new(&assembly.memory, &assembly.symbols, assembly.code_len);
        output::write_listing_to_stdout(&listing)?;
    }
    output::write_program_file(output_file_name, &assembly.memory)
}
