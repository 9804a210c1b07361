//! Structured-document support: value tree, parser and writer.
//!
//! ```ignore
//! use glint_core::document::{parse_document, to_string_pretty};
//!
//! let doc = parse_document(r#"{"asset": {"version": "2.0"}}"#)?;
//! println!("{}", to_string_pretty(&doc));
//! ```

mod parser;
mod value;
mod writer;

pub use parser::*;
pub use value::*;
pub use writer::*;
