//! Line-oriented command protocol.
//!
//! One command per line, whitespace-separated tokens, symbol first:
//!
//! ```text
//! <symbol> BUY <tif> <price> <qty> <client_id> [MIN <q>]
//! <symbol> SELL <tif> <price> <qty> <client_id> [MIN <q>]
//! <symbol> CANCEL <client_id>
//! <symbol> MODIFY <client_id> <BUY|SELL> <price> <qty> [MIN <q>]
//! <symbol> PRINT
//! ```
//!
//! Parsing borrows from the input line and allocates nothing; malformed
//! lines surface a [`ParseError`] for the dispatcher to drop.

#![no_std]

pub mod parser;

pub use parser::{parse_line, Line, ParseError, Verb};
