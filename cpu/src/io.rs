//! The I/O buffers of the machine.
//!
//! Input is a queue of character codes which is filled before the
//! simulation starts and drained by `IN`.  Output is the sequence of
//! character codes written by `OUT`.
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use base::prelude::*;

/// `IN` found the input queue empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfInput;

impl Display for EndOfInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str("input buffer is empty")
    }
}

impl Error for EndOfInput {}

#[derive(Debug, Clone, Default)]
pub struct IoUnit {
    input: VecDeque<Value>,
    output: Vec<Value>,
}

impl IoUnit {
    #[must_use]
    pub fn new(input: Vec<Value>) -> IoUnit {
        IoUnit {
            input: input.into(),
            output: Vec::new(),
        }
    }

    /// Queue the characters of `text`, followed by the NUL sentinel.
    #[must_use]
    pub fn from_text(text: &str) -> IoUnit {
        IoUnit::new(
            text.chars()
                .chain(std::iter::once(INPUT_SENTINEL))
                .map(|ch| Value::from(u32::from(ch)))
                .collect(),
        )
    }

    #[must_use]
    pub fn input_empty(&self) -> bool {
        self.input.is_empty()
    }

    #[must_use]
    pub fn input_remaining(&self) -> usize {
        self.input.len()
    }

    /// # Errors
    ///
    /// Fails with [`EndOfInput`] when the queue is empty.
    pub fn pop_input(&mut self) -> Result<Value, EndOfInput> {
        self.input.pop_front().ok_or(EndOfInput)
    }

    pub fn push_output(&mut self, value: Value) {
        self.output.push(value);
    }

    #[must_use]
    pub fn output(&self) -> &[Value] {
        &self.output
    }

    /// Convert the output to text.  Values which are not character
    /// codes are shown as U+FFFD.
    #[must_use]
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .map(|&code| {
                u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_ends_with_sentinel() {
        let mut io = IoUnit::from_text("hi");
        assert_eq!(io.input_remaining(), 3);
        assert_eq!(io.pop_input(), Ok(104));
        assert_eq!(io.pop_input(), Ok(105));
        assert_eq!(io.pop_input(), Ok(0));
        assert!(io.input_empty());
        assert_eq!(io.pop_input(), Err(EndOfInput));
    }

    #[test]
    fn output_text() {
        let mut io = IoUnit::default();
        for code in [72, 105, 0x263a, -1, 0xD800] {
            io.push_output(code);
        }
        assert_eq!(io.output(), &[72, 105, 0x263a, -1, 0xD800]);
        assert_eq!(io.output_text(), "Hi\u{263a}\u{fffd}\u{fffd}");
    }
}
