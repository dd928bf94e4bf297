//! S-expressions as a format for saved data and configuration.
//!
//! # Syntax
//!
//! The notation is line oriented and byte based:
//!
//! - **Lists** are sequences of values, delimited on the outside by `(` and `)`
//!   and separated by whitespace.
//!
//! - **Strings** are enclosed within double quotes and may span lines. Within
//!   strings, `\n` and `\t` stand for the newline and tab characters; any other
//!   character preceded by a backslash stands for itself, so `\"` and `\\`
//!   escape `"` and `\`.
//!
//! - **Booleans** are written `#t` and `#f`.
//!
//! - **Numbers** and **symbols** are runs of characters other than whitespace
//!   and `"`, `(`, `)`, `;`. A run starting with a digit or `-` that consists of
//!   digits with at most one `.` is an integer or a real; everything else is a
//!   symbol. See [`lexer::classify_word`].
//!
//! - **Translatable forms** `_( ... )` mark text shown to users. They read as a
//!   list headed by the symbol `_`.
//!
//! - **Comments** begin with a `;` and extend to the end of the line.
//!
//! A document is a sequence of values, normally *headed forms* naming a field:
//!
//! ```
//! let root = lispdata::from_str(r#"
//!     ; saved by version 0.4
//!     (highscores
//!       (file-version 3)
//!       (player "Tux"))
//! "#).unwrap();
//!
//! let highscores = root.get_list("highscores").unwrap();
//! assert_eq!(Some(3), highscores.value::<i64>("file-version"));
//! assert_eq!(None, highscores.value::<i64>("player"));
//! ```
//!
//! Documents are written back with a [`Writer`], or printed in one go from a
//! tree with [`to_string`] and [`to_string_pretty`].

pub(crate) mod escape;
pub mod lexer;
pub mod node;
pub mod options;
pub mod parser;
pub mod printer;
pub mod writer;

pub use node::{Atom, Forms, FromNode, Node};
pub use options::{ReadOptions, WriteOptions};
pub use parser::{from_str, parse, parse_file, ParseError};
pub use printer::{to_string, to_string_pretty};
pub use writer::{WriteError, Writer};
