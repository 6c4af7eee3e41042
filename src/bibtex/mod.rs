//! BibTeX record codec.
//!
//! Converts between raw BibTeX text and a sequence of [`Record`]s. Parsing is
//! strict: the first grammar violation fails the whole document with a
//! [`ParseError`] carrying its line and column, so the caller can hand the
//! text to an operator for repair instead of silently dropping entries.
//!
//! # Example
//!
//! ```
//! use biblio_export::bibtex::{parse_records, serialize_records};
//!
//! let records = parse_records("@article{smith2024, title = {A Title}, year = 2024}").unwrap();
//! assert_eq!(records[0].tags.get("year"), Some("2024"));
//! assert_eq!(
//!     serialize_records(&records),
//!     "@article{smith2024,\n  title = {A Title},\n  year = {2024}\n}\n"
//! );
//! ```

mod error;
mod parse;
mod record;
mod serialize;

pub use error::ParseError;
pub use parse::parse_records;
pub use record::{Record, Tags};
pub use serialize::{serialize_record, serialize_records};
