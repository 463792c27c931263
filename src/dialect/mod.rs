use strum_macros::{Display, EnumString};

/// Enum for the two flat-file grammars built from two-letter tag lines.
///
/// OMIM is deliberately not a variant: its `*FIELD*` records share nothing
/// with the tag-line syntax and are handled by `decoders::omim`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
pub enum Dialect {
    #[strum(serialize = "uniprot")]
    Uniprot,
    #[strum(serialize = "embl")]
    Embl,
}

impl Dialect {
    pub fn to_str(&self) -> &str {
        match self {
            Dialect::Uniprot => "uniprot",
            Dialect::Embl => "embl",
        }
    }
}
