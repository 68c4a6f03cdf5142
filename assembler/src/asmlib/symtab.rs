use std::collections::BTreeMap;

use tracing::{event, Level};

use base::prelude::*;

use super::lexer::rx::{INDIRECT_REGISTER, REGISTER};
use super::types::{AssemblerFailure, SyntaxErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Data,
    Text,
}

/// Labels declared in the data and text sections.
///
/// A data label maps to an index into the data list, and a code
/// label to an index into the instruction list.  Neither is an
/// absolute address until the length of the code is known (see
/// [`SymbolTable::lookup`]).
#[derive(Debug, Default)]
pub(crate) struct SymbolTable {
    data: BTreeMap<String, usize>,
    code: BTreeMap<String, usize>,
}

impl SymbolTable {
    pub(crate) fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Labels cannot be redefined, even in the other section.  A
    /// label may not look like a register either, since operands are
    /// looked up as labels first.
    pub(crate) fn define(
        &mut self,
        section: Section,
        name: &str,
        index: usize,
    ) -> Result<(), AssemblerFailure> {
        if REGISTER.is_match(name) || INDIRECT_REGISTER.is_match(name) {
            return Err(AssemblerFailure::syntax(
                SyntaxErrorKind::RegisterLabel,
                name,
            ));
        }
        if self.data.contains_key(name) || self.code.contains_key(name) {
            return Err(AssemblerFailure::syntax(
                SyntaxErrorKind::DuplicateLabel,
                name,
            ));
        }
        event!(Level::TRACE, "defining {section:?} label {name} at index {index}");
        let table = match section {
            Section::Data => &mut self.data,
            Section::Text => &mut self.code,
        };
        table.insert(name.to_string(), index);
        Ok(())
    }

    /// Return the absolute address of a label, given the length of
    /// the code which precedes the data.
    pub(crate) fn lookup(&self, name: &str, code_len: usize) -> Option<Value> {
        let address = match (self.data.get(name), self.code.get(name)) {
            (Some(data_index), _) => data_index + code_len,
            (None, Some(code_index)) => *code_index,
            (None, None) => {
                return None;
            }
        };
        Value::try_from(address).ok()
    }

    /// All labels with their absolute addresses, ordered by address.
    pub(crate) fn addresses(&self, code_len: usize) -> Vec<(usize, &str)> {
        let mut result: Vec<(usize, &str)> = self
            .code
            .iter()
            .map(|(name, index)| (*index, name.as_str()))
            .chain(
                self.data
                    .iter()
                    .map(|(name, index)| (index + code_len, name.as_str())),
            )
            .collect();
        result.sort_unstable();
        result
    }
}
