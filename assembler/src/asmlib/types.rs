use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::fmt::{self, Display, Formatter};
use std::io::Error as IoError;
use std::path::PathBuf;

use base::prelude::ProgramFormatError;

/// The ways in which assembly source can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A mnemonic outside the instruction set.
    UnknownInstruction,
    /// The source ended before an instruction had all its operands.
    MissingOperand,
    /// A label declaration appeared where an operand was needed.
    UnexpectedLabel,
    /// An operand is neither a label, a register nor a number.
    UndefinedSymbol,
    /// The label was already declared.
    DuplicateLabel,
    /// A data-section token which is not an integer.
    BadDataValue,
    /// The operand's addressing mode is not allowed here.
    BadAddressing,
    /// A mandatory section marker is absent.
    MissingSection,
    /// Text which is not inside any section.
    UnrecognisedInput,
    /// A label spelled like a register.
    RegisterLabel,
    /// An operand which must name a register does not.
    ExpectedRegister,
}

impl Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            SyntaxErrorKind::UnknownInstruction => "unknown instruction",
            SyntaxErrorKind::MissingOperand => "missing operand",
            SyntaxErrorKind::UnexpectedLabel => "label declaration where an operand was expected",
            SyntaxErrorKind::UndefinedSymbol => "undefined symbol",
            SyntaxErrorKind::DuplicateLabel => "label is already defined",
            SyntaxErrorKind::BadDataValue => "data value is not an integer",
            SyntaxErrorKind::BadAddressing => "addressing mode not allowed here",
            SyntaxErrorKind::MissingSection => "missing section",
            SyntaxErrorKind::UnrecognisedInput => "input outside any section",
            SyntaxErrorKind::RegisterLabel => "a register name cannot be a label",
            SyntaxErrorKind::ExpectedRegister => "operand must be a register",
        })
    }
}

#[derive(Debug)]
pub enum AssemblerFailure {
    SyntaxError {
        kind: SyntaxErrorKind,
        /// The offending token (for a missing operand, the mnemonic
        /// of the incomplete instruction).
        token: String,
    },
    IoErrorOnStdout {
        error: IoError,
    },
    IoErrorOnInput {
        filename: OsString,
        error: IoError,
    },
    IoErrorOnOutput {
        filename: PathBuf,
        error: IoError,
    },
    BadProgramFormat(ProgramFormatError),
}

impl AssemblerFailure {
    pub(crate) fn syntax(kind: SyntaxErrorKind, token: &str) -> AssemblerFailure {
        AssemblerFailure::SyntaxError {
            kind,
            token: token.to_string(),
        }
    }
}

fn write_os_string(f: &mut Formatter<'_>, s: &OsStr) -> Result<(), fmt::Error> {
    match s.to_str() {
        Some(unicode_name) => f.write_str(unicode_name),
        None => write!(
            f,
            "{} (some non-Unicode characters changed to make it printable)",
            s.to_string_lossy(),
        ),
    }
}

impl Display for AssemblerFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            AssemblerFailure::SyntaxError { kind, token } => {
                write!(f, "syntax error: {kind}: {token}")
            }
            AssemblerFailure::IoErrorOnStdout { error } => {
                write!(f, "error writing on stdout: {error}")
            }
            AssemblerFailure::IoErrorOnInput { filename, error } => {
                f.write_str("I/O error reading input file ")?;
                write_os_string(f, filename)?;
                write!(f, ": {error}")
            }
            AssemblerFailure::IoErrorOnOutput { filename, error } => {
                write!(
                    f,
                    "I/O error writing output file {}: {error}",
                    filename.display(),
                )
            }
            AssemblerFailure::BadProgramFormat(e) => write!(f, "failed to write program: {e}"),
        }
    }
}

impl Error for AssemblerFailure {}

#[test]
fn test_syntax_error_names_token() {
    let e = AssemblerFailure::syntax(SyntaxErrorKind::UnknownInstruction, "FROB");
    assert_eq!(e.to_string(), "syntax error: unknown instruction: FROB");
}
