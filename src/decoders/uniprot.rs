//! Field decoders for the UniProt/SwissProt dialect.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::de_grammar;
use crate::feature_table::parse_uniprot_features;
use crate::field::{Field, FieldScanner};
use crate::record::{
    AlternativeProducts, Comment, CrossReference, DateEntry, GeneName, Isoform, Record,
    Reference, SequenceInfo,
};
use crate::segmentation::segment_sequence;

use super::{extract_sequence_body, month_from_abbr, split_semicolon_list};

// DT lines are fixed-column: `DT   08-NOV-2023, entry version 44.`
const DT_DAY: std::ops::Range<usize> = 5..7;
const DT_MONTH: std::ops::Range<usize> = 8..11;
const DT_YEAR: std::ops::Range<usize> = 12..16;
const DT_LABEL_START: usize = 18;

/// Decode one UniProt record. Malformed pieces are omitted, never fatal.
pub fn parse(text: &str) -> Record {
    let mut record = Record::default();

    for field in FieldScanner::new(text) {
        match field.tag() {
            "ID" => decode_id(&field, &mut record),
            "AC" => decode_accessions(&field, &mut record),
            "DT" => decode_dates(&field, &mut record),
            "PE" => {
                record.entry.protein_existence =
                    field.content_lines().next().map(|line| line.trim().to_string());
            }
            "DE" => decode_description(&field, &mut record),
            "OS" => {
                record.organism.species = joined_lines(&field);
            }
            "OC" => {
                record.organism.lineage = split_semicolon_list(&field.content());
            }
            "OX" => decode_taxonomy(&field, &mut record),
            "GN" => decode_gene_names(&field, &mut record),
            "KW" => {
                record.keywords = split_semicolon_list(&field.content());
            }
            "RN" => open_reference(&field, &mut record),
            tag @ ("RP" | "RX" | "RC" | "RG" | "RA" | "RT" | "RL") => {
                append_to_reference(&mut record, tag, field.content_concat());
            }
            "CC" => decode_comments(&field, &mut record),
            "DR" => decode_cross_references(&field, &mut record),
            "FT" => {
                record.features = parse_uniprot_features(&field.content());
            }
            "SQ" => decode_sequence_header(&field, &mut record),
            _ => {}
        }
    }

    if let Some(body) = extract_sequence_body(text) {
        record.sequence = body.split_whitespace().collect();
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
        static ref ID: Regex = Regex::new(r"^ID\s+(\S+)\s+(.+)").unwrap();
    }
    if let Some(caps) = ID.captures(&field.lines()[0]) {
        record.entry.entry_name = caps[1].to_string();
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
    for line in field.lines() {
        let line = line.trim_end().trim_end_matches('.');
        let (Some(day), Some(month), Some(year), Some(label)) = (
            line.get(DT_DAY),
            line.get(DT_MONTH),
            line.get(DT_YEAR),
            line.get(DT_LABEL_START..),
        ) else {
            continue;
        };
        let (Ok(day), Some(month), Ok(year)) = (
            day.trim().parse::<u32>(),
            month_from_abbr(month),
            year.parse::<i32>(),
        ) else {
            continue;
        };
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        record.entry.dates.push(DateEntry {
            label: label.to_string(),
            date,
            release: None,
        });
    }
}

fn decode_description(field: &Field, record: &mut Record) {
    let content = field.content();
    record.description.raw = content.trim_end().to_string();
    match de_grammar::parse(&content) {
        Ok(tree) => record.description.parsed = Some(tree),
        // Non-fatal: the record keeps rendering from the raw text.
        Err(error) => record.description.parse_error = Some(error.to_string()),
    }
}

fn decode_taxonomy(field: &Field, record: &mut Record) {
    lazy_static! {
        static ref TAXID: Regex = Regex::new(r"NCBI_TaxID=(\d+);").unwrap();
    }
    if let Some(caps) = TAXID.captures(&field.text()) {
        record.organism.taxonomy_id = Some(caps[1].to_string());
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

/// Append an accumulating reference tag to the currently open reference;
/// a dangling tag with no open reference is dropped.
pub(crate) fn append_to_reference(record: &mut Record, tag: &str, text: String) {
    let Some(reference) = record.references.last_mut() else {
        return;
    };
    let slot = match tag {
        "RP" => &mut reference.rp,
        "RX" => &mut reference.rx,
        "RC" => &mut reference.rc,
        "RG" => &mut reference.rg,
        "RA" => &mut reference.ra,
        "RT" => &mut reference.rt,
        "RL" => &mut reference.rl,
        _ => return,
    };
    slot.push_str(&text);
}

fn decode_comments(field: &Field, record: &mut Record) {
    lazy_static! {
        static ref TOPIC: Regex =
            Regex::new(r"(?m)^-!- ([A-Z ]+):(.*\n(?:    .+\n)*)").unwrap();
        static ref COPYRIGHT: Regex =
            Regex::new(r"(?m)^-{2,}\n((?:[^-\n].*\n)+)-{2,}\n").unwrap();
    }

    let mut content = field.content();
    if !content.ends_with('\n') {
        content.push('\n');
    }

    for caps in TOPIC.captures_iter(&content) {
        let topic = caps[1].to_string();
        if topic == "ALTERNATIVE PRODUCTS" {
            if let Some(products) = parse_alternative_products(&caps[2]) {
                record
                    .comments
                    .push(Comment::AlternativeProducts(products));
            }
        } else {
            record.comments.push(Comment::Topic {
                topic,
                text: collapse_whitespace(&caps[2]),
            });
        }
    }

    if let Some(caps) = COPYRIGHT.captures(&content) {
        record.copyright = Some(caps[1].trim_end().to_string());
    }
}

/// The `Event=`/`Name=` sub-grammar of an ALTERNATIVE PRODUCTS block.
/// A block without an event or without isoforms is dropped entirely.
fn parse_alternative_products(body: &str) -> Option<AlternativeProducts> {
    lazy_static! {
        static ref ENTRY: Regex =
            Regex::new(r"(?m)^    (\w+)=([^;]+);[ \t]*(.*\n(?:      .+\n)*)").unwrap();
        static ref COMMENT: Regex = Regex::new(r"Comment=(.+(?:\n.+)*)").unwrap();
        static ref PAIR: Regex = Regex::new(r"(\w+)=([^;]+);").unwrap();
    }

    let mut event = None;
    let mut comment = None;
    let mut isoforms = Vec::new();

    for caps in ENTRY.captures_iter(body) {
        match &caps[1] {
            "Event" => {
                event = Some(collapse_whitespace(&caps[2]));
                if let Some(c) = COMMENT.captures(&caps[3]) {
                    let text = collapse_whitespace(&c[1]);
                    comment = Some(text.trim_end_matches(';').to_string());
                }
            }
            "Name" => {
                let mut isoform = Isoform {
                    name: collapse_whitespace(&caps[2]),
                    ..Default::default()
                };
                for pair in PAIR.captures_iter(&caps[3]) {
                    let value = collapse_whitespace(&pair[2]);
                    match &pair[1] {
                        "Synonyms" => isoform.synonyms = Some(value),
                        "IsoId" => isoform.iso_id = Some(value),
                        "Sequence" => isoform.sequence = Some(value),
                        "Note" => {
                            if !isoform.note.is_empty() {
                                isoform.note.push(' ');
                            }
                            isoform.note.push_str(&value);
                        }
                        _ => {}
                    }
                }
                isoforms.push(isoform);
            }
            _ => {}
        }
    }

    let event = event?;
    if isoforms.is_empty() {
        return None;
    }
    Some(AlternativeProducts {
        event,
        comment,
        isoforms,
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
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

fn decode_sequence_header(field: &Field, record: &mut Record) {
    lazy_static! {
        static ref SQ: Regex =
            Regex::new(r"^SQ   SEQUENCE\s*(\d+)\s*AA;\s*(\d+)\s*MW;\s*(\S+)\s+CRC64;").unwrap();
    }
    if let Some(caps) = SQ.captures(&field.lines()[0]) {
        let (Ok(length), Ok(molecular_weight)) =
            (caps[1].parse::<u32>(), caps[2].parse::<u64>())
        else {
            return;
        };
        record.sequence_info = Some(SequenceInfo::Protein {
            length,
            molecular_weight,
            crc64: caps[3].to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RxLink;
    use crate::Dialect;

    fn example_entry() -> String {
        let features = format!(
            "FT   {:<8} {:>6} {:>6}       {}\nFT   {:<8} {:>6} {:>6}       {}\n",
            "CHAIN", 1, 60, "Putative transcription factor 001R.",
            "DOMAIN", 21, 30, "Leucine zipper."
        );
        format!(
            "{}{}{}",
            "\
ID   001R_FRG3G              Reviewed;         256 AA.
AC   P9WPY2; L0TBI1; P0A4Z2;
DT   28-JUN-2011, integrated into UniProtKB/Swiss-Prot.
DT   19-JUL-2004, sequence version 1.
DT   08-NOV-2023, entry version 44.
DE   RecName: Full=Putative transcription factor 001R;
DE            Short=TF1;
DE            EC=1.1.1.1;
GN   ORFNames=FV3-001R;
OS   Frog virus 3 (isolate Goorha) (FV-3).
OC   Viruses; Varidnaviria; Bamfordvirae.
OX   NCBI_TaxID=654924;
RN   [1]
RP   NUCLEOTIDE SEQUENCE [LARGE SCALE GENOMIC DNA].
RX   PubMed=15165820; DOI=10.1016/j.virol.2004.02.019;
RA   Tan W.G., Barkman T.J.;
RT   \"Comparative genomic analyses of frog virus 3.\";
RL   Virology 323:70-84(2004).
RN   [2]
RP   INDUCTION.
RA   Smith J.;
RT   \"Second study.\";
RL   Virology 400:1-10(2010).
CC   -!- FUNCTION: Transcription activation.
CC   -!- ALTERNATIVE PRODUCTS:
CC       Event=Alternative splicing; Named isoforms=2;
CC         Comment=Additional isoforms seem to exist.;
CC       Name=1;
CC         IsoId=P9WPY2-1; Sequence=Displayed;
CC       Name=2; Synonyms=Short form;
CC         IsoId=P9WPY2-2; Sequence=VSP_000001;
CC         Note=Lacks the N-terminal region.;
CC   ---------------------------------------------------------------------------
CC   Copyrighted by the UniProt Consortium.
CC   Distributed under the Creative Commons Attribution (CC BY 4.0) License.
CC   ---------------------------------------------------------------------------
DR   EMBL; AY548484; AAT09660.1; -; Genomic_DNA.
DR   GO; GO:0046782; P:regulation of viral transcription; IEA:InterPro.
PE   4: Predicted;
KW   Activator; Transcription; Transcription regulation.
",
            features,
            "\
SQ   SEQUENCE   60 AA;  6000 MW;  B4840739BF7D4121 CRC64;
     MAFSAEDVLK EYDRRRRMEA LLLSLYYPND RKLLDYKEWS PPRVQVECPK APVEWNNPPS
//
"
        )
    }

    #[test]
    fn entry_information() {
        let record = parse(&example_entry());
        assert_eq!(record.entry.entry_name, "001R_FRG3G");
        assert_eq!(record.entry.descriptor, "Reviewed;         256 AA.");
        assert_eq!(record.entry.primary_accession, "P9WPY2");
        assert_eq!(record.entry.secondary_accessions, vec!["L0TBI1", "P0A4Z2"]);
        assert_eq!(record.entry.protein_existence.as_deref(), Some("4: Predicted;"));
    }

    #[test]
    fn accession_splitting() {
        let record = parse("AC   P12345; P54321; Q99999;\n");
        assert_eq!(record.entry.primary_accession, "P12345");
        assert_eq!(record.entry.secondary_accession_display(), "P54321 Q99999");
    }

    #[test]
    fn dates_are_fixed_column() {
        let record = parse(&example_entry());
        assert_eq!(record.entry.dates.len(), 3);
        assert_eq!(
            record.entry.dates[0].label,
            "integrated into UniProtKB/Swiss-Prot"
        );
        assert_eq!(record.entry.dates[0].display(), "Tue Jun 28 2011");
        assert_eq!(record.entry.dates[2].label, "entry version 44");
    }

    #[test]
    fn malformed_date_line_is_skipped() {
        let entry = "DT   28-JUN-2011, integrated into UniProtKB/Swiss-Prot.\nDT   not a date at all\n";
        let record = parse(entry);
        assert_eq!(record.entry.dates.len(), 1);
    }

    #[test]
    fn description_parses_the_de_grammar() {
        let record = parse(&example_entry());
        assert!(record.description.parse_error.is_none());
        assert_eq!(
            record.description.display_name(),
            "Putative transcription factor 001R (TF1), 1.1.1.1"
        );
        assert!(record.description.raw.starts_with("RecName:"));
    }

    #[test]
    fn broken_de_line_keeps_raw_fallback() {
        let entry = "DE   RecName: Full=A; Flags: EC=1.1.1.1;\n";
        let record = parse(entry);
        assert!(record.description.parsed.is_none());
        assert!(record.description.parse_error.is_some());
        assert!(record.description.display_name().contains("RecName:"));
    }

    #[test]
    fn organism_and_taxonomy() {
        let record = parse(&example_entry());
        assert_eq!(record.organism.species, "Frog virus 3 (isolate Goorha) (FV-3).");
        assert_eq!(
            record.organism.lineage,
            vec!["Viruses", "Varidnaviria", "Bamfordvirae"]
        );
        assert_eq!(record.organism.taxonomy_id.as_deref(), Some("654924"));
    }

    #[test]
    fn gene_names_split_on_equals() {
        let record = parse(&example_entry());
        assert_eq!(record.gene_names.len(), 1);
        assert_eq!(record.gene_names[0].name, "ORFNames");
        assert_eq!(record.gene_names[0].value.as_deref(), Some("FV3-001R"));
    }

    #[test]
    fn keywords_drop_terminal_dot() {
        let record = parse(&example_entry());
        assert_eq!(
            record.keywords,
            vec!["Activator", "Transcription", "Transcription regulation"]
        );
    }

    #[test]
    fn references_scope_to_their_rn_block() {
        let record = parse(&example_entry());
        assert_eq!(record.references.len(), 2);

        let first = &record.references[0];
        assert_eq!(first.nr, "1");
        assert!(first.ra.contains("Tan W.G."));
        assert!(first.rt.contains("Comparative genomic"));
        assert!(first.rl.contains("Virology 323"));
        assert_eq!(
            first.links(Dialect::Uniprot),
            vec![
                RxLink::Pair {
                    key: "PubMed".to_string(),
                    value: "15165820".to_string()
                },
                RxLink::Pair {
                    key: "DOI".to_string(),
                    value: "10.1016/j.virol.2004.02.019".to_string()
                },
            ]
        );

        let second = &record.references[1];
        assert_eq!(second.nr, "2");
        assert!(second.ra.contains("Smith J."));
        assert!(second.rx.is_empty());
        assert!(second.rl.contains("Virology 400"));
    }

    #[test]
    fn dangling_reference_tag_is_dropped() {
        let record = parse("RA   Orphan A.;\n");
        assert!(record.references.is_empty());
    }

    #[test]
    fn comments_and_copyright() {
        let record = parse(&example_entry());
        assert_eq!(record.comments.len(), 2);

        match &record.comments[0] {
            Comment::Topic { topic, text } => {
                assert_eq!(topic, "FUNCTION");
                assert_eq!(text, "Transcription activation.");
            }
            other => panic!("expected a topic comment, got {:?}", other),
        }

        match &record.comments[1] {
            Comment::AlternativeProducts(products) => {
                assert_eq!(products.event, "Alternative splicing");
                assert_eq!(
                    products.comment.as_deref(),
                    Some("Additional isoforms seem to exist.")
                );
                assert_eq!(products.isoforms.len(), 2);
                assert_eq!(products.isoforms[0].name, "1");
                assert_eq!(products.isoforms[0].iso_id.as_deref(), Some("P9WPY2-1"));
                assert_eq!(products.isoforms[0].sequence.as_deref(), Some("Displayed"));
                assert_eq!(products.isoforms[1].synonyms.as_deref(), Some("Short form"));
                assert_eq!(products.isoforms[1].note, "Lacks the N-terminal region.");
            }
            other => panic!("expected alternative products, got {:?}", other),
        }

        assert!(record
            .copyright
            .as_deref()
            .unwrap()
            .starts_with("Copyrighted by the UniProt Consortium."));
    }

    #[test]
    fn alternative_products_without_isoforms_is_dropped() {
        let entry = "CC   -!- ALTERNATIVE PRODUCTS:\nCC       Event=Alternative initiation;\n";
        let record = parse(entry);
        assert!(record.comments.is_empty());
    }

    #[test]
    fn cross_references_keep_order_and_duplicates() {
        let record = parse(&example_entry());
        assert_eq!(record.cross_references.len(), 2);
        assert_eq!(record.cross_references[0].database, "EMBL");
        assert_eq!(
            record.cross_references[1].value,
            "GO:0046782; P:regulation of viral transcription; IEA:InterPro."
        );
    }

    #[test]
    fn sequence_header_and_body() {
        let record = parse(&example_entry());
        assert_eq!(
            record.sequence_info,
            Some(SequenceInfo::Protein {
                length: 60,
                molecular_weight: 6000,
                crc64: "B4840739BF7D4121".to_string(),
            })
        );
        assert_eq!(record.sequence.len(), 60);
        assert!(record.sequence.starts_with("MAFSAEDVLK"));
    }

    #[test]
    fn features_and_segmentation() {
        let record = parse(&example_entry());
        assert_eq!(record.features.len(), 2);
        assert_eq!(record.features[0].key, "chain");
        assert_eq!(record.features[0].location.span(), Some((1, 60)));
        assert_eq!(record.features[1].location.span(), Some((21, 30)));

        let segments = &record.segmentation.segments;
        assert_eq!(segments.len(), 3);
        assert_eq!((segments[0].from, segments[0].to), (0, 19));
        assert_eq!(segments[0].features, vec![0]);
        assert_eq!((segments[1].from, segments[1].to), (20, 29));
        assert_eq!(segments[1].features, vec![0, 1]);
        assert_eq!((segments[2].from, segments[2].to), (30, 59));
        assert_eq!(segments[2].features, vec![0]);

        assert_eq!(record.segmentation.feature_segments, vec![vec![0, 1, 2], vec![1]]);
    }

    #[test]
    fn record_without_sequence_skips_segmentation() {
        let record = parse("ID   TEST_ENTRY              Unreviewed;       10 AA.\n");
        assert!(record.sequence.is_empty());
        assert!(record.segmentation.segments.is_empty());
    }
}
