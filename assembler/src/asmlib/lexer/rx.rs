//! Regular expressions used by the translator.
//!
//! Each expression is compiled on first use.
use std::{ops::Deref, sync::OnceLock};

use regex::Regex;

/// A register operand, such as `r3`.
pub(crate) static REGISTER: LazyRegex = LazyRegex::new(r"^r[0-9]{1,2}$");

/// A bracketed register operand, such as `[r3]`, meaning the memory
/// cell whose address is in the register.
pub(crate) static INDIRECT_REGISTER: LazyRegex = LazyRegex::new(r"^\[r[0-9]{1,2}\]$");

/// A quoted character literal.  This is deliberately not greedy, so
/// that two literals on the same line remain separate.
pub(crate) static CHAR_LITERAL: LazyRegex = LazyRegex::new(r"'([^']*)'");

pub(crate) static WHITESPACE: LazyRegex = LazyRegex::new(r"\s+");

pub(crate) struct LazyRegex {
    once: OnceLock<Regex>,
    pattern: &'static str,
}

impl LazyRegex {
    pub(crate) const fn new(pattern: &'static str) -> Self {
        LazyRegex {
            once: OnceLock::new(),
            pattern,
        }
    }
}

impl Deref for LazyRegex {
    type Target = Regex;

    fn deref(&self) -> &Regex {
        // The patterns are all constants in this file, so a failure
        // here is a bug which every test run would reveal.
        self.once.get_or_init(|| match Regex::new(self.pattern) {
            Ok(r) => r,
            Err(e) => {
                panic!("'{}' is not a valid regular expression: {e}", self.pattern);
            }
        })
    }
}

#[test]
fn test_register_patterns() {
    assert!(REGISTER.is_match("r0"));
    assert!(REGISTER.is_match("r12"));
    assert!(!REGISTER.is_match("r123"));
    assert!(!REGISTER.is_match("[r1]"));
    assert!(!REGISTER.is_match("rest"));
    assert!(INDIRECT_REGISTER.is_match("[r4]"));
    assert!(!INDIRECT_REGISTER.is_match("[r4"));
    assert!(!INDIRECT_REGISTER.is_match("r4"));
}
