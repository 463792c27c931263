//! The structured record model produced by the field decoders.
//!
//! All ordered lists preserve file order. A missing or malformed piece of
//! a field leaves its slot empty rather than failing the record.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::de_grammar::NameTree;
use crate::decoders;
use crate::dialect::Dialect;
use crate::feature_table::Feature;
use crate::segmentation::Segmentation;

/// Entry-information block: ID, AC, SV, DT and PE derived values.
#[derive(Debug, Clone, Default)]
pub struct EntryInfo {
    pub entry_name: String,
    /// Trailing text of the ID line after the entry name.
    pub descriptor: String,
    pub primary_accession: String,
    pub secondary_accessions: Vec<String>,
    /// EMBL SV line.
    pub sequence_version: Option<String>,
    pub dates: Vec<DateEntry>,
    /// PE line.
    pub protein_existence: Option<String>,
}

impl EntryInfo {
    /// Secondary accessions as displayed: joined by single spaces.
    pub fn secondary_accession_display(&self) -> String {
        self.secondary_accessions.join(" ")
    }
}

/// One decoded DT line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEntry {
    pub label: String,
    pub date: NaiveDate,
    /// EMBL release annotation, e.g. `Release 85, Version 6`.
    pub release: Option<String>,
}

impl DateEntry {
    pub fn display(&self) -> String {
        let date = self.date.format("%a %b %d %Y");
        match &self.release {
            Some(release) => format!("{}; {}", date, release),
            None => date.to_string(),
        }
    }
}

/// The DE field: raw text always, the parsed name tree when the UniProt
/// grammar accepted it, and the parse error when it did not.
#[derive(Debug, Clone, Default)]
pub struct Description {
    pub raw: String,
    pub parsed: Option<NameTree>,
    pub parse_error: Option<String>,
}

impl Description {
    /// One-line display name: the rendered primary (or first submitted)
    /// name when parsed, the whitespace-collapsed raw text otherwise.
    pub fn display_name(&self) -> String {
        if let Some(tree) = &self.parsed {
            if let Some(block) = &tree.name {
                return block.name.render();
            }
            if let Some(first) = tree.sub.first() {
                return first.name.render();
            }
        }
        self.raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// OS/OC/OX/OG derived values.
#[derive(Debug, Clone, Default)]
pub struct Organism {
    pub species: String,
    pub lineage: Vec<String>,
    /// UniProt OX NCBI_TaxID.
    pub taxonomy_id: Option<String>,
    /// EMBL OG line.
    pub organelle: Option<String>,
}

/// One `;`-separated GN token, split at its first `=` when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneName {
    pub name: String,
    pub value: Option<String>,
}

/// A literature reference accumulated from the RN/RP/RX/RC/RG/RA/RT/RL
/// tags. A new RN opens a reference; the other tags append to the most
/// recently opened one and are dropped when none is open.
#[derive(Debug, Clone, Default)]
pub struct Reference {
    pub nr: String,
    pub rp: String,
    pub rx: String,
    pub rc: String,
    pub rg: String,
    pub ra: String,
    pub rt: String,
    pub rl: String,
}

/// A cross-reference extracted from an RX field, either a recognized
/// `key=value` pair or a raw leftover the UI shows as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RxLink {
    Pair { key: String, value: String },
    Raw(String),
}

impl Reference {
    /// Decode the accumulated RX text into link entries.
    ///
    /// UniProt values may hide `;` inside DOI strings, so separators are
    /// rewritten to newlines before splitting; a piece without exactly one
    /// `=` stays raw. EMBL only ever links `DOI; ...` and `PUBMED; ...`
    /// lines.
    pub fn links(&self, dialect: Dialect) -> Vec<RxLink> {
        lazy_static! {
            static ref RX_SEP: Regex = Regex::new(r";\s+").unwrap();
            static ref EMBL_RX: Regex =
                Regex::new(r"(?m)^RX   (DOI|PUBMED); (.+)\.$").unwrap();
        }

        match dialect {
            Dialect::Uniprot => {
                let rewritten = RX_SEP.replace_all(&self.rx, "\n");
                let rewritten = rewritten
                    .as_ref()
                    .strip_suffix(';')
                    .unwrap_or_else(|| rewritten.as_ref());
                rewritten
                    .split('\n')
                    .filter(|piece| !piece.is_empty())
                    .map(|piece| {
                        let parts: Vec<&str> = piece.split('=').collect();
                        if parts.len() == 2 {
                            RxLink::Pair {
                                key: parts[0].to_string(),
                                value: parts[1].to_string(),
                            }
                        } else {
                            RxLink::Raw(piece.to_string())
                        }
                    })
                    .collect()
            }
            Dialect::Embl => EMBL_RX
                .captures_iter(&self.rx)
                .map(|caps| RxLink::Pair {
                    key: caps[1].to_string(),
                    value: caps[2].to_string(),
                })
                .collect(),
        }
    }
}

/// A CC-derived comment.
#[derive(Debug, Clone)]
pub enum Comment {
    /// UniProt `-!- TOPIC: text` block.
    Topic { topic: String, text: String },
    /// UniProt `ALTERNATIVE PRODUCTS` isoform table.
    AlternativeProducts(AlternativeProducts),
    /// EMBL opaque comment block.
    Block(String),
}

#[derive(Debug, Clone, Default)]
pub struct AlternativeProducts {
    pub event: String,
    pub comment: Option<String>,
    pub isoforms: Vec<Isoform>,
}

#[derive(Debug, Clone, Default)]
pub struct Isoform {
    pub name: String,
    pub synonyms: Option<String>,
    pub iso_id: Option<String>,
    pub sequence: Option<String>,
    pub note: String,
}

/// One DR line: `DATABASE; VALUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReference {
    pub database: String,
    pub value: String,
}

/// One EMBL AS row, sliced at the column offsets the AH header declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRow {
    pub local_span: String,
    pub primary_identifier: String,
    pub primary_span: String,
    pub complement: bool,
}

/// SQ header counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceInfo {
    /// UniProt: residue count, molecular weight, CRC64 checksum.
    Protein {
        length: u32,
        molecular_weight: u64,
        crc64: String,
    },
    /// EMBL: base-pair count plus per-letter tallies; each tally is
    /// extracted independently and may be missing.
    Nucleotide {
        length: u32,
        a: Option<u64>,
        c: Option<u64>,
        g: Option<u64>,
        t: Option<u64>,
        other: Option<u64>,
    },
}

/// A fully decoded flat-file record.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub entry: EntryInfo,
    pub description: Description,
    pub organism: Organism,
    pub gene_names: Vec<GeneName>,
    pub keywords: Vec<String>,
    pub references: Vec<Reference>,
    pub comments: Vec<Comment>,
    pub copyright: Option<String>,
    pub cross_references: Vec<CrossReference>,
    pub assembly: Vec<AssemblyRow>,
    pub features: Vec<Feature>,
    pub sequence_info: Option<SequenceInfo>,
    /// Sequence letters with all layout characters removed.
    pub sequence: String,
    /// Segment partition and feature -> segment index; empty when the
    /// record has no sequence body.
    pub segmentation: Segmentation,
}

impl Record {
    /// Decode one record of the given dialect. Never fails: malformed
    /// pieces are omitted per the tolerant-decoder policy.
    pub fn parse(text: &str, dialect: Dialect) -> Record {
        decoders::parse_record(text, dialect)
    }

    /// FASTA projection: identifier, display name, sequence at 60 columns.
    pub fn fasta(&self) -> String {
        let mut out = String::from(">");
        if self.entry.primary_accession.is_empty() {
            out.push_str(&self.entry.entry_name);
        } else {
            out.push_str(&self.entry.primary_accession);
            if !self.entry.entry_name.is_empty() {
                out.push('|');
                out.push_str(&self.entry.entry_name);
            }
        }
        let name = self.description.display_name();
        if !name.is_empty() {
            out.push(' ');
            out.push_str(&name);
        }
        out.push('\n');

        let mut column = 0;
        for ch in self.sequence.chars() {
            if column == 60 {
                out.push('\n');
                column = 0;
            }
            out.push(ch);
            column += 1;
        }
        if column > 0 {
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniprot_rx_links_protect_doi_semicolons() {
        let reference = Reference {
            rx: "PubMed=15165820; DOI=10.1016/j.virol.2004.02.019;".to_string(),
            ..Default::default()
        };
        let links = reference.links(Dialect::Uniprot);
        assert_eq!(
            links,
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
    }

    #[test]
    fn uniprot_rx_odd_piece_stays_raw() {
        let reference = Reference {
            rx: "MEDLINE=92111264; AGRICOLA=IND=20551642;".to_string(),
            ..Default::default()
        };
        let links = reference.links(Dialect::Uniprot);
        assert_eq!(links.len(), 2);
        assert_eq!(
            links[1],
            RxLink::Raw("AGRICOLA=IND=20551642".to_string())
        );
    }

    #[test]
    fn embl_rx_links_take_doi_and_pubmed_only() {
        let reference = Reference {
            rx: "RX   DOI; 10.1007/BF00039495.\nRX   PUBMED; 2103443.\nRX   AGRICOLA; IND20551642.\n"
                .to_string(),
            ..Default::default()
        };
        let links = reference.links(Dialect::Embl);
        assert_eq!(
            links,
            vec![
                RxLink::Pair {
                    key: "DOI".to_string(),
                    value: "10.1007/BF00039495".to_string()
                },
                RxLink::Pair {
                    key: "PUBMED".to_string(),
                    value: "2103443".to_string()
                },
            ]
        );
    }

    #[test]
    fn date_entry_display_forms() {
        let plain = DateEntry {
            label: "integrated into UniProtKB/Swiss-Prot".to_string(),
            date: NaiveDate::from_ymd_opt(2011, 6, 28).unwrap(),
            release: None,
        };
        assert_eq!(plain.display(), "Tue Jun 28 2011");

        let with_release = DateEntry {
            label: "Last updated".to_string(),
            date: NaiveDate::from_ymd_opt(1999, 5, 5).unwrap(),
            release: Some("Release 59".to_string()),
        };
        assert_eq!(with_release.display(), "Wed May 05 1999; Release 59");
    }

    #[test]
    fn fasta_projection_wraps_at_sixty() {
        let mut record = Record::default();
        record.entry.primary_accession = "P12345".to_string();
        record.entry.entry_name = "TEST_HUMAN".to_string();
        record.description.raw = "Test  protein".to_string();
        record.sequence = "A".repeat(70);

        let fasta = record.fasta();
        let lines: Vec<&str> = fasta.lines().collect();
        assert_eq!(lines[0], ">P12345|TEST_HUMAN Test protein");
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 10);
    }

    #[test]
    fn display_name_falls_back_to_raw() {
        let description = Description {
            raw: "Putative transcription\nfactor 001R".to_string(),
            parsed: None,
            parse_error: Some("parse error in DE record".to_string()),
        };
        assert_eq!(
            description.display_name(),
            "Putative transcription factor 001R"
        );
    }
}
