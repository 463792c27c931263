//! Field decoders for the EMBL dialect.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::feature_table::parse_embl_features;
use crate::field::{Field, FieldScanner};
use crate::record::{
    AssemblyRow, Comment, CrossReference, DateEntry, GeneName, Record, Reference, SequenceInfo,
};
use crate::segmentation::segment_sequence;

use super::{extract_sequence_body, month_from_abbr, split_semicolon_list};

/// Default AS column offsets, replaced by whatever the AH header declares.
const ASSEMBLY_OFFSETS: [usize; 4] = [5, 21, 42, 57];

const ASSEMBLY_MARKERS: [&str; 4] = [
    "LOCAL_SPAN",
    "PRIMARY_IDENTIFIER",
    "PRIMARY_SPAN",
    "COMP",
];

/// Decode one EMBL record. Malformed pieces are omitted, never fatal.
pub fn parse(text: &str) -> Record {
    let mut record = Record::default();
    let mut offsets = ASSEMBLY_OFFSETS;

    for field in FieldScanner::new(text) {
        match field.tag() {
            "ID" => decode_id(&field, &mut record),
            "AC" => decode_accessions(&field, &mut record),
            "SV" => {
                record.entry.sequence_version =
                    field.content_lines().next().map(|line| line.trim().to_string());
            }
            "DT" => decode_dates(&field, &mut record),
            "PE" => {
                record.entry.protein_existence =
                    field.content_lines().next().map(|line| line.trim().to_string());
            }
            "DE" => {
                // EMBL descriptions are opaque text, no grammar.
                record.description.raw = field.content().trim_end().to_string();
            }
            "OS" => {
                record.organism.species = joined_lines(&field);
            }
            "OC" => {
                record.organism.lineage = split_semicolon_list(&field.content());
            }
            "OG" => {
                record.organism.organelle = Some(joined_lines(&field));
            }
            "GN" => decode_gene_names(&field, &mut record),
            "KW" => {
                record.keywords = split_semicolon_list(&field.content());
            }
            "RN" => open_reference(&field, &mut record),
            // EMBL RX keeps the raw tag lines; the DOI/PUBMED extraction
            // in Reference::links works on the prefixed form.
            "RX" => super::uniprot::append_to_reference(&mut record, "RX", field.text()),
            tag @ ("RP" | "RC" | "RG" | "RA" | "RT" | "RL") => {
                super::uniprot::append_to_reference(&mut record, tag, field.content_concat());
            }
            "CC" => {
                record
                    .comments
                    .push(Comment::Block(field.content().trim_end().to_string()));
            }
            "DR" => decode_cross_references(&field, &mut record),
            "AH" => {
                let text = field.text();
                for (offset, marker) in offsets.iter_mut().zip(ASSEMBLY_MARKERS) {
                    if let Some(found) = text.find(marker) {
                        *offset = found;
                    }
                }
            }
            "AS" => decode_assembly_rows(&field, &offsets, &mut record),
            "FT" => {
                record.features = parse_embl_features(&field.content());
            }
            "SQ" => decode_sequence_header(&field, &mut record),
            _ => {}
        }
    }

    if let Some(body) = extract_sequence_body(text) {
        record.sequence = body
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_ascii_digit())
            .collect();
        record.segmentation =
            segment_sequence(record.sequence.chars().count(), &record.features);
    }

    record
}

fn joined_lines(field: &Field) -> String {
    field
        .content_lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_id(field: &Field, record: &mut Record) {
    lazy_static! {
        static ref ID: Regex = Regex::new(r"^ID\s+([^;]+)(;.+)").unwrap();
    }
    if let Some(caps) = ID.captures(&field.lines()[0]) {
        record.entry.entry_name = caps[1].trim().to_string();
        record.entry.descriptor = caps[2].trim_end().to_string();
    }
}

fn decode_accessions(field: &Field, record: &mut Record) {
    let mut accessions = split_semicolon_list(&field.content()).into_iter();
    if let Some(primary) = accessions.next() {
        record.entry.primary_accession = primary;
    }
    record.entry.secondary_accessions = accessions.collect();
}

fn decode_dates(field: &Field, record: &mut Record) {
    lazy_static! {
        static ref DT: Regex =
            Regex::new(r"DT   (\d+)-([A-Z]+)-(\d+) \(Rel\. (\d+), ([^),]+)(.*)\)").unwrap();
    }
    for line in field.lines() {
        let Some(caps) = DT.captures(line) else {
            continue;
        };
        let (Ok(day), Some(month), Ok(year)) = (
            caps[1].parse::<u32>(),
            month_from_abbr(&caps[2]),
            caps[3].parse::<i32>(),
        ) else {
            continue;
        };
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        record.entry.dates.push(DateEntry {
            label: caps[5].to_string(),
            date,
            release: Some(format!("Release {}{}", &caps[4], &caps[6])),
        });
    }
}

fn decode_gene_names(field: &Field, record: &mut Record) {
    for token in split_semicolon_list(&field.content()) {
        let gene = match token.split_once('=') {
            Some((name, value)) => GeneName {
                name: name.to_string(),
                value: Some(value.to_string()),
            },
            None => GeneName {
                name: token,
                value: None,
            },
        };
        record.gene_names.push(gene);
    }
}

fn open_reference(field: &Field, record: &mut Record) {
    lazy_static! {
        static ref NR: Regex = Regex::new(r"\[(\d+)\]").unwrap();
    }
    let first = field.content_lines().next().unwrap_or_default();
    let nr = match NR.captures(first) {
        Some(caps) => caps[1].to_string(),
        None => first.trim().to_string(),
    };
    record.references.push(Reference {
        nr,
        ..Default::default()
    });
}

fn decode_cross_references(field: &Field, record: &mut Record) {
    lazy_static! {
        static ref DR: Regex = Regex::new(r"(?m)^DR   ([^;]+);\s*(.+)").unwrap();
    }
    for caps in DR.captures_iter(&field.text()) {
        record.cross_references.push(CrossReference {
            database: caps[1].to_string(),
            value: caps[2].trim_end().to_string(),
        });
    }
}

/// Fixed-column slicing of AS rows at the offsets the AH header declared.
/// The tag prefix is part of the line on both AH and AS, so the columns
/// line up; slices are clamped at the line end.
fn decode_assembly_rows(field: &Field, offsets: &[usize; 4], record: &mut Record) {
    for line in field.lines() {
        let local_span = slice(line, offsets[0], offsets[1]);
        let primary_identifier = slice(line, offsets[1], offsets[2]);
        let primary_span = slice(line, offsets[2], offsets[3]);
        let complement = line
            .get(offsets[3].min(line.len())..)
            .unwrap_or("")
            .trim()
            == "c";
        record.assembly.push(AssemblyRow {
            local_span,
            primary_identifier,
            primary_span,
            complement,
        });
    }
}

fn slice(line: &str, start: usize, end: usize) -> String {
    let len = line.len();
    let start = start.min(len);
    let end = end.min(len).max(start);
    line.get(start..end).unwrap_or("").trim().to_string()
}

fn decode_sequence_header(field: &Field, record: &mut Record) {
    lazy_static! {
        static ref SQ: Regex = Regex::new(r"^SQ   Sequence\s*(\d+)\s*BP;\s*(.+)").unwrap();
        static ref COUNT_A: Regex = Regex::new(r"(\d+)\s*A;").unwrap();
        static ref COUNT_C: Regex = Regex::new(r"(\d+)\s*C;").unwrap();
        static ref COUNT_G: Regex = Regex::new(r"(\d+)\s*G;").unwrap();
        static ref COUNT_T: Regex = Regex::new(r"(\d+)\s*T;").unwrap();
        static ref COUNT_OTHER: Regex = Regex::new(r"(\d+)\s*other;").unwrap();
    }

    let Some(caps) = SQ.captures(&field.lines()[0]) else {
        return;
    };
    let Ok(length) = caps[1].parse::<u32>() else {
        return;
    };
    let tallies = caps[2].to_string();

    // Each count is extracted independently; a missing one stays empty
    // instead of failing the header.
    let count = |re: &Regex| -> Option<u64> {
        re.captures(&tallies).and_then(|c| c[1].parse().ok())
    };

    record.sequence_info = Some(SequenceInfo::Nucleotide {
        length,
        a: count(&COUNT_A),
        c: count(&COUNT_C),
        g: count(&COUNT_G),
        t: count(&COUNT_T),
        other: count(&COUNT_OTHER),
    });
}
