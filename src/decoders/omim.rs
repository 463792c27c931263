//! OMIM record formatting.
//!
//! OMIM entries are not tag-line flat files: a record is a stream of
//! `*FIELD* XX` sections with free-text bodies. The formatter maps the
//! two-letter codes to display labels and keeps the section order.

/// One `*FIELD*` section of an OMIM record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmimSection {
    pub code: String,
    pub label: String,
    pub text: String,
}

impl OmimSection {
    /// Body paragraphs, split on blank lines. `CS` (Clinical Synopsis)
    /// sections are preformatted and should be displayed verbatim instead.
    pub fn paragraphs(&self) -> Vec<String> {
        self.text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OmimRecord {
    pub sections: Vec<OmimSection>,
}

/// Display label for a field code.
pub fn field_label(code: &str) -> Option<&'static str> {
    match code {
        "AV" => Some("Allelic variation"),
        "CD" => Some("Creation date"),
        "CN" => Some("Contributor name"),
        "CS" => Some("Clinical Synopsis"),
        "ED" => Some("Edit history"),
        "MN" => Some("Mini-Mim"),
        "NO" => Some("Number"),
        "RF" => Some("References"),
        "SA" => Some("See Also"),
        "TI" => Some("Title"),
        "TX" => Some("Text"),
        _ => None,
    }
}

/// Split an OMIM record into labelled sections. Text before the first
/// `*FIELD*` marker (including the `*RECORD*` line) is dropped; an unknown
/// field code keeps the code itself as label.
pub fn parse(text: &str) -> OmimRecord {
    let mut sections = Vec::new();
    let mut current: Option<OmimSection> = None;

    for line in text.lines() {
        if line.trim() == "*RECORD*" {
            continue;
        }
        if let Some(code) = line.strip_prefix("*FIELD* ") {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            let code = code.trim().to_string();
            let label = field_label(&code)
                .map(str::to_string)
                .unwrap_or_else(|| code.clone());
            current = Some(OmimSection {
                code,
                label,
                text: String::new(),
            });
        } else if let Some(section) = current.as_mut() {
            section.text.push_str(line);
            section.text.push('\n');
        }
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }

    OmimRecord { sections }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = "\
*RECORD*
*FIELD* NO
100050
*FIELD* TI
100050 AARSKOG SYNDROME, AUTOSOMAL DOMINANT
*FIELD* TX

Grier et al. (1983) reported father and 2 sons with typical Aarskog
syndrome.

*Some starred line that is not a field marker.

The inheritance pattern suggests autosomal dominant transmission.
*FIELD* ZZ
Unmapped code.
";

    #[test]
    fn sections_in_order_with_labels() {
        let record = parse(RECORD);
        let codes: Vec<&str> = record.sections.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["NO", "TI", "TX", "ZZ"]);
        assert_eq!(record.sections[0].label, "Number");
        assert_eq!(record.sections[1].label, "Title");
        assert_eq!(record.sections[3].label, "ZZ");
    }

    #[test]
    fn starred_non_field_lines_stay_in_the_body() {
        let record = parse(RECORD);
        let tx = &record.sections[2];
        assert!(tx.text.contains("*Some starred line"));
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let record = parse(RECORD);
        let paragraphs = record.sections[2].paragraphs();
        assert_eq!(paragraphs.len(), 3);
        assert!(paragraphs[0].starts_with("Grier et al."));
        assert!(paragraphs[2].starts_with("The inheritance"));
    }

    #[test]
    fn record_marker_and_preamble_dropped() {
        let record = parse("garbage before\n*RECORD*\n*FIELD* NO\n100050\n");
        assert_eq!(record.sections.len(), 1);
        assert_eq!(record.sections[0].text, "100050\n");
    }
}
