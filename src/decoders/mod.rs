//! Per-dialect field decoders.
//!
//! Each dialect owns one decode table selected once per record; a tag the
//! table does not know is ignored, and a known field whose sub-pattern does
//! not match simply contributes nothing (tolerant-parsing policy).

pub mod embl;
pub mod omim;
pub mod uniprot;

use lazy_static::lazy_static;
use regex::Regex;

use crate::dialect::Dialect;
use crate::record::Record;

/// Decode one record with the decoder table of the given dialect.
pub fn parse_record(text: &str, dialect: Dialect) -> Record {
    match dialect {
        Dialect::Uniprot => uniprot::parse(text),
        Dialect::Embl => embl::parse(text),
    }
}

/// The sequence body: the run of five-space-indented lines following the
/// SQ header. Layout characters are still present in the result.
pub(crate) fn extract_sequence_body(text: &str) -> Option<String> {
    lazy_static! {
        static ref BODY: Regex = Regex::new(r"(?m)^SQ   .*\n((?:     .+\n?)+)").unwrap();
    }
    BODY.captures(text).map(|caps| caps[1].to_string())
}

/// Three-letter English month abbreviations, the only form DT lines use.
pub(crate) fn month_from_abbr(abbr: &str) -> Option<u32> {
    match abbr {
        "JAN" => Some(1),
        "FEB" => Some(2),
        "MAR" => Some(3),
        "APR" => Some(4),
        "MAY" => Some(5),
        "JUN" => Some(6),
        "JUL" => Some(7),
        "AUG" => Some(8),
        "SEP" => Some(9),
        "OCT" => Some(10),
        "NOV" => Some(11),
        "DEC" => Some(12),
        _ => None,
    }
}

/// Split a `;`-separated list, dropping the terminal `.` and empty tokens.
pub(crate) fn split_semicolon_list(text: &str) -> Vec<String> {
    lazy_static! {
        static ref SEP: Regex = Regex::new(r";\s*").unwrap();
    }
    let text = text.trim();
    let text = text.strip_suffix('.').unwrap_or(text);
    SEP.split(text)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
