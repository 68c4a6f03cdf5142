//! Literal expansion, sectioning and tokenization.
//!
//! By the time text reaches this module it has been normalized into
//! a single line (see [`super::source::normalize`]).
use logos::Logos;
use regex::Captures;
use tracing::{event, Level};

use super::types::{AssemblerFailure, SyntaxErrorKind};

pub(crate) mod rx;

use rx::CHAR_LITERAL;

pub(crate) const DATA_MARKER: &str = "section data:";
pub(crate) const TEXT_MARKER: &str = "section text:";

/// Tokens are separated by spaces and/or commas.
#[derive(Debug, PartialEq, Eq, Logos, Clone)]
#[logos(skip r"[ ,]+")]
pub(crate) enum Token {
    /// `name:` declares a label.  The colon is not part of the name.
    ///
    /// Must be higher-priority than `Word`, which can match the same
    /// text.
    #[regex("[^ ,]+:", capture_label_name, priority = 5)]
    LabelDeclaration(String),

    /// A mnemonic, register, number or label reference.
    #[regex("[^ ,]+", capture_word, priority = 1)]
    Word(String),
}

fn capture_label_name(lex: &mut logos::Lexer<Token>) -> String {
    let text = lex.slice();
    text.strip_suffix(':').unwrap_or(text).to_string()
}

fn capture_word(lex: &mut logos::Lexer<Token>) -> String {
    lex.slice().to_string()
}

/// Replace each quoted literal with the comma-separated character
/// codes of its contents, so `'Hi'` becomes `72,105`.
pub(crate) fn expand_char_literals(text: &str) -> String {
    CHAR_LITERAL
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .chars()
                .map(|ch| u32::from(ch).to_string())
                .collect::<Vec<String>>()
                .join(",")
        })
        .into_owned()
}

/// The contents of the two sections of a program, without their
/// markers.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Sections<'a> {
    pub(crate) data: &'a str,
    pub(crate) text: &'a str,
}

/// Split the (normalized) program into its sections.  Both must be
/// present, but they may appear in either order.
pub(crate) fn split_sections(program: &str) -> Result<Sections<'_>, AssemblerFailure> {
    let find = |marker: &str| {
        program
            .find(marker)
            .ok_or_else(|| AssemblerFailure::syntax(SyntaxErrorKind::MissingSection, marker))
    };
    let data_pos = find(DATA_MARKER)?;
    let text_pos = find(TEXT_MARKER)?;
    let prelude = &program[..data_pos.min(text_pos)];
    if !prelude.trim().is_empty() {
        return Err(AssemblerFailure::syntax(
            SyntaxErrorKind::UnrecognisedInput,
            prelude.trim(),
        ));
    }
    let sections = if data_pos < text_pos {
        Sections {
            data: &program[data_pos + DATA_MARKER.len()..text_pos],
            text: &program[text_pos + TEXT_MARKER.len()..],
        }
    } else {
        Sections {
            data: &program[data_pos + DATA_MARKER.len()..],
            text: &program[text_pos + TEXT_MARKER.len()..data_pos],
        }
    };
    Ok(sections)
}

pub(crate) fn tokenize(section: &str) -> Result<Vec<Token>, AssemblerFailure> {
    let mut lexer = Token::lexer(section);
    let mut tokens = Vec::new();
    while let Some(item) = lexer.next() {
        match item {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(AssemblerFailure::syntax(
                    SyntaxErrorKind::UnrecognisedInput,
                    lexer.slice(),
                ));
            }
        }
    }
    event!(Level::TRACE, "tokens: {:?}", tokens);
    Ok(tokens)
}
