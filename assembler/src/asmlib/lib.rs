//! The translator turns assembly source into a program for the
//! simulated machine.
//!
//! Assembly runs as a short pipeline:
//!
//! 1. normalization strips comments and joins the source into a
//!    single line ([`source`]);
//! 2. quoted character literals are expanded and the text is split
//!    into its data and text sections, then tokenized ([`lexer`]);
//! 3. tokens are consumed to build the label tables, the data list
//!    and the list of unresolved instructions ([`parser`]);
//! 4. labels are resolved and the instructions are laid out ahead of
//!    the data in a single unified memory ([`driver`]).
#![deny(unreachable_pub)]
#![deny(unsafe_code)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::manual_string_new)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::wildcard_imports)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::items_after_statements)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // fix soon
#![allow(clippy::needless_pass_by_value)] // fix soon

mod driver;
mod lexer;
mod listing;
mod logging;
mod parser;
mod source;
mod symtab;
mod types;

pub use driver::{assemble, assemble_file, assemble_with_listing, OutputOptions};
pub use logging::init_logging;
pub use types::{AssemblerFailure, SyntaxErrorKind};
