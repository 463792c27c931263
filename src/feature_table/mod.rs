//! Feature table (FT) parsing for both flat-file dialects.
//!
//! UniProt features are fixed-column header lines with free-text
//! description continuations; EMBL features carry a location expression
//! and `/name=value` qualifier continuations. Both produce the same
//! `Feature` shape for the segmentation engine and the presentation layer.

use lazy_static::lazy_static;
use regex::Regex;

use crate::SmartStr;

/// A feature location. `from`/`to` are 1-based inclusive positions; both
/// are absent for non-linear expressions such as `join(...)`, which keep
/// only their display text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub from: Option<u32>,
    pub to: Option<u32>,
    pub raw: String,
}

impl Location {
    pub fn numeric(from: u32, to: u32) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            raw: format!("{}..{}", from, to),
        }
    }

    pub fn complex(raw: &str) -> Self {
        Self {
            from: None,
            to: None,
            raw: raw.to_string(),
        }
    }

    /// The numeric span, when present and not inverted.
    pub fn span(&self) -> Option<(u32, u32)> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from <= to => Some((from, to)),
            _ => None,
        }
    }

    /// `to - from + 1`, absent for non-numeric or inverted locations.
    pub fn length(&self) -> Option<u32> {
        self.span().map(|(from, to)| to - from + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    pub name: SmartStr,
    pub value: String,
}

impl Qualifier {
    /// Display form of the value. A `translation` is stripped of
    /// whitespace and wrapped into 40-column blocks; everything else is
    /// passed through.
    pub fn display_value(&self) -> String {
        if self.name != "translation" {
            return self.value.clone();
        }
        let stripped: String = self.value.split_whitespace().collect();
        let mut out = String::new();
        let mut i = 0;
        while i + 40 <= stripped.len() {
            out.push_str(&stripped[i..i + 40]);
            out.push('\n');
            i += 40;
        }
        out.push_str(&stripped[i..]);
        out
    }
}

/// One feature-table row: lowercase key, location, qualifiers in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub key: SmartStr,
    pub location: Location,
    pub qualifiers: Vec<Qualifier>,
}

/// Split a UniProt feature description into display lines: continuation
/// text starting with a `/` marker begins a fresh line, all other
/// continuations fold into the running line.
pub fn description_display_lines(value: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in value.split('\n') {
        let piece = raw.trim();
        if piece.is_empty() {
            continue;
        }
        if lines.is_empty() || piece.starts_with('/') {
            lines.push(piece.to_string());
        } else {
            let last = lines.last_mut().expect("non-empty");
            last.push(' ');
            last.push_str(piece);
        }
    }
    lines
}

/// Parse the UniProt FT body (tag prefixes stripped, one feature per
/// fixed-column header line, continuations indented to the description
/// column).
pub fn parse_uniprot_features(content: &str) -> Vec<Feature> {
    lazy_static! {
        static ref FEATURE: Regex =
            Regex::new(r"(?m)^(?P<key>[^ ].{7}) (?P<from>.{6}) (?P<to>.{6})(?: (?P<desc>.+(?:\n {29}.+)*))?")
                .unwrap();
    }

    let mut features = Vec::new();
    for caps in FEATURE.captures_iter(content) {
        let key: SmartStr = caps["key"].trim().to_lowercase().into();
        let from_text = caps["from"].trim();
        let to_text = caps["to"].trim();
        let from = from_text.parse::<u32>().ok();
        let to = to_text.parse::<u32>().ok();

        let location = Location {
            from,
            to,
            raw: format!("{}..{}", from_text, to_text),
        };

        let qualifiers = match caps.name("desc") {
            Some(desc) => vec![Qualifier {
                name: SmartStr::new(),
                value: desc.as_str().trim().to_string(),
            }],
            None => Vec::new(),
        };

        features.push(Feature {
            key,
            location,
            qualifiers,
        });
    }
    features
}

/// Parse the EMBL FT body (tag prefixes stripped). The location is either
/// `N..M` with optional `<`/`>` open-end markers or a non-linear
/// expression; continuation lines hold `/name="value"` or `/name=123`
/// qualifiers. Header lines that match neither location form are skipped.
pub fn parse_embl_features(content: &str) -> Vec<Feature> {
    lazy_static! {
        static ref FEATURE: Regex = Regex::new(
            r"(?m)^(?P<key>[^ ].{14}) (?P<loc>join\([^)]+?\)|(?P<from><?\d+)(?:\.\.(?P<to>>?\d+))?)(?P<quals>(?:\n {15}.+)*)"
        )
        .unwrap();
        static ref QUALIFIER: Regex =
            Regex::new(r#"/(?P<name>[^=]+)=(?:"(?P<quoted>[^"]*)"|(?P<number>\d+))"#).unwrap();
    }

    let mut features = Vec::new();
    for caps in FEATURE.captures_iter(content) {
        let key: SmartStr = caps["key"].trim().to_lowercase().into();
        let raw = caps["loc"].to_string();

        // Open-end markers are stripped before the arithmetic; a bare
        // single position (no `..`) stays non-numeric.
        let location = match (caps.name("from"), caps.name("to")) {
            (Some(from), Some(to)) => Location {
                from: from.as_str().trim_start_matches('<').parse().ok(),
                to: to.as_str().trim_start_matches('>').parse().ok(),
                raw,
            },
            _ => Location::complex(&raw),
        };

        let mut qualifiers = Vec::new();
        if let Some(quals) = caps.name("quals") {
            for q in QUALIFIER.captures_iter(quals.as_str()) {
                let value = q
                    .name("quoted")
                    .or_else(|| q.name("number"))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                qualifiers.push(Qualifier {
                    name: q["name"].trim().into(),
                    value,
                });
            }
        }

        features.push(Feature {
            key,
            location,
            qualifiers,
        });
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniprot_row(key: &str, from: &str, to: &str, desc: &str) -> String {
        format!("{:<8} {:>6} {:>6}       {}", key, from, to, desc)
    }

    #[test]
    fn uniprot_fixed_columns() {
        let body = format!(
            "{}\n{}\n",
            uniprot_row("CHAIN", "1", "256", "Putative transcription factor 001R."),
            uniprot_row("DOMAIN", "21", "30", "Leucine zipper.")
        );
        let features = parse_uniprot_features(&body);

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].key, "chain");
        assert_eq!(features[0].location.span(), Some((1, 256)));
        assert_eq!(features[0].location.length(), Some(256));
        assert_eq!(
            features[1].qualifiers[0].value,
            "Leucine zipper."
        );
    }

    #[test]
    fn uniprot_continuation_lines() {
        let body = format!(
            "{}\n{}{}\n{}{}\n",
            uniprot_row("VAR_SEQ", "23", "24", "Missing (in isoform 2)."),
            " ".repeat(29),
            "More text on the next line.",
            " ".repeat(29),
            "/FTId=VSP_000123."
        );
        let features = parse_uniprot_features(&body);

        assert_eq!(features.len(), 1);
        let lines = description_display_lines(&features[0].qualifiers[0].value);
        assert_eq!(
            lines,
            vec![
                "Missing (in isoform 2). More text on the next line.",
                "/FTId=VSP_000123."
            ]
        );
    }

    #[test]
    fn uniprot_non_numeric_position() {
        let body = format!("{}\n", uniprot_row("CONFLICT", "?", "12", "Uncertain."));
        let features = parse_uniprot_features(&body);

        assert_eq!(features[0].location.from, None);
        assert_eq!(features[0].location.to, Some(12));
        assert_eq!(features[0].location.span(), None);
        assert_eq!(features[0].location.length(), None);
    }

    fn embl_row(key: &str, location: &str) -> String {
        format!("{:<15} {}", key, location)
    }

    fn embl_qualifier(text: &str) -> String {
        format!("{}{}", " ".repeat(16), text)
    }

    #[test]
    fn embl_locations_and_qualifiers() {
        let body = format!(
            "{}\n{}\n{}\n{}\n{}\n",
            embl_row("source", "1..1859"),
            embl_qualifier("/organism=\"Vicia faba\""),
            embl_qualifier("/mol_type=\"mRNA\""),
            embl_row("CDS", "join(50..112,200..350)"),
            embl_qualifier("/codon_start=1"),
        );
        let features = parse_embl_features(&body);

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].key, "source");
        assert_eq!(features[0].location.span(), Some((1, 1859)));
        assert_eq!(features[0].qualifiers.len(), 2);
        assert_eq!(features[0].qualifiers[0].name, "organism");
        assert_eq!(features[0].qualifiers[0].value, "Vicia faba");

        assert_eq!(features[1].location.span(), None);
        assert_eq!(features[1].location.raw, "join(50..112,200..350)");
        assert_eq!(features[1].qualifiers[0].name, "codon_start");
        assert_eq!(features[1].qualifiers[0].value, "1");
    }

    #[test]
    fn embl_open_end_markers_stripped() {
        let body = format!("{}\n", embl_row("mRNA", "<1..>1859"));
        let features = parse_embl_features(&body);

        assert_eq!(features[0].location.span(), Some((1, 1859)));
        assert_eq!(features[0].location.raw, "<1..>1859");
    }

    #[test]
    fn embl_single_position_is_non_numeric() {
        let body = format!("{}\n", embl_row("polyA_site", "1759"));
        let features = parse_embl_features(&body);

        assert_eq!(features[0].location.span(), None);
        assert_eq!(features[0].location.raw, "1759");
    }

    #[test]
    fn embl_multi_line_quoted_value() {
        let body = format!(
            "{}\n{}\n{}\n",
            embl_row("CDS", "50..112"),
            embl_qualifier("/note=\"legumin B; spans"),
            embl_qualifier("two lines\""),
        );
        let features = parse_embl_features(&body);

        assert_eq!(features[0].qualifiers.len(), 1);
        assert!(features[0].qualifiers[0].value.starts_with("legumin B; spans"));
        assert!(features[0].qualifiers[0].value.ends_with("two lines"));
    }

    #[test]
    fn translation_wraps_at_forty_columns() {
        let residues = "MKVL".repeat(25);
        let q = Qualifier {
            name: "translation".into(),
            value: residues.clone(),
        };
        let display = q.display_value();
        let lines: Vec<&str> = display.split('\n').collect();
        assert_eq!(lines[0].len(), 40);
        assert_eq!(lines[1].len(), 40);
        assert_eq!(lines[2].len(), 20);
        assert_eq!(display.replace('\n', ""), residues);
    }

    #[test]
    fn unmatched_header_is_skipped() {
        let body = format!("{}\n", embl_row("variation", "complement(12..40)"));
        assert!(parse_embl_features(&body).is_empty());
    }
}
