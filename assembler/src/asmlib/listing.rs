use std::fmt::{self, Display, Formatter};

use base::prelude::*;

use super::symtab::SymbolTable;

/// A human-readable rendering of an assembled program: one line per
/// memory cell, showing its address, any labels declared there and
/// its contents.
#[derive(Debug)]
pub(crate) struct Listing<'a> {
    memory: &'a [MemoryCell],
    labels: Vec<(usize, &'a str)>,
}

impl<'a> Listing<'a> {
    pub(crate) fn new(memory: &'a [MemoryCell], symbols: &'a SymbolTable, code_len: usize) -> Self {
        Listing {
            memory,
            labels: symbols.addresses(code_len),
        }
    }

    fn labels_at(&self, address: usize) -> String {
        self.labels
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, name)| format!("{name}:"))
            .collect::<Vec<String>>()
            .join(" ")
    }
}

/// Show a datum as a character too, when it is a printable one.
fn describe_datum(n: Value) -> Option<char> {
    u8::try_from(n)
        .ok()
        .filter(|b| b.is_ascii_graphic() || *b == b' ')
        .map(char::from)
}

impl Display for Listing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        for (address, cell) in self.memory.iter().enumerate() {
            write!(f, "{address:>5} {:<16}", self.labels_at(address))?;
            match cell {
                MemoryCell::Instruction(inst) => writeln!(f, "{inst}")?,
                MemoryCell::Data(n) => match describe_datum(*n) {
                    Some(ch) => writeln!(f, "{n:<12} ; {ch:?}")?,
                    None => writeln!(f, "{n}")?,
                },
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::driver::assemble_with_listing;

    #[test]
    fn listing_shows_labels_and_data() {
        let (_, listing) = assemble_with_listing(
            "section data: greeting: 'H' 5 section text: start: LW r1, greeting HALT",
        )
        .expect("valid test data");
        let lines: Vec<&str> = listing.lines().map(str::trim_end).collect();
        assert_eq!(
            lines,
            vec![
                "    0 start:          LW r1, 2",
                "    1                 HALT",
                "    2 greeting:       72           ; 'H'",
                "    3                 5",
            ]
        );
    }
}
