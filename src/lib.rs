//! Parsing core for flat-file biological database records.
//!
//! Turns UniProt/SwissProt and EMBL flat-file entries into a structured
//! [`record::Record`], including the derived sequence segmentation used for
//! feature highlighting, and formats OMIM `*FIELD*` records into labelled
//! sections. Everything degrades gracefully on malformed input: a field
//! that does not match its expected shape is omitted, never fatal.

pub mod de_grammar;
pub mod decoders;
pub mod dialect;
pub mod feature_table;
pub mod field;
pub mod record;
pub mod record_parser;
pub mod segmentation;
pub mod utils;

pub use dialect::Dialect;
pub use record::Record;

/// Compact string for the many short tokens a record carries (tags,
/// feature keys, qualifier names).
pub type SmartStr = smartstring::SmartString<smartstring::LazyCompact>;
