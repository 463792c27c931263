//! Recursive descent parser for the UniProt DE (description) mini-language.
//!
//! The DE field declares protein names as `Keyword=value;` pairs grouped
//! under `RecName:`/`AltName:`/`SubName:` headers, with optional
//! `Includes:`/`Contains:` sections and `Flags:`. A parse failure is
//! reported to the caller as a normal error; the record still renders with
//! the raw DE text as fallback.

use anyhow::{bail, Result};
use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    End,
    RecName,
    AltName,
    SubName,
    Full,
    Short,
    Ec,
    Allergen,
    Biotech,
    CdAntigen,
    Inn,
    Includes,
    Contains,
    Flags,
    Text(String),
}

impl Token {
    fn label(&self) -> &'static str {
        match self {
            Token::End => "end of input",
            Token::RecName => "RecName",
            Token::AltName => "AltName",
            Token::SubName => "SubName",
            Token::Full => "Full",
            Token::Short => "Short",
            Token::Ec => "EC",
            Token::Allergen => "Allergen",
            Token::Biotech => "Biotech",
            Token::CdAntigen => "CD_antigen",
            Token::Inn => "INN",
            Token::Includes => "Includes",
            Token::Contains => "Contains",
            Token::Flags => "Flags",
            Token::Text(_) => "text",
        }
    }
}

struct Lexer<'a> {
    rest: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn next_token(&mut self) -> Token {
        lazy_static! {
            static ref KEYWORD: Regex = Regex::new(r"^([^\s=:;]+)[:=]\s*").unwrap();
        }

        loop {
            self.rest = self.rest.trim_start();
            if self.rest.is_empty() {
                return Token::End;
            }

            if let Some(m) = KEYWORD.captures(self.rest) {
                let token = match &m[1] {
                    "RecName" => Some(Token::RecName),
                    "AltName" => Some(Token::AltName),
                    "SubName" => Some(Token::SubName),
                    "Full" => Some(Token::Full),
                    "Short" => Some(Token::Short),
                    "EC" => Some(Token::Ec),
                    "Allergen" => Some(Token::Allergen),
                    "Biotech" => Some(Token::Biotech),
                    "CD_antigen" => Some(Token::CdAntigen),
                    "INN" => Some(Token::Inn),
                    "Includes" => Some(Token::Includes),
                    "Contains" => Some(Token::Contains),
                    "Flags" => Some(Token::Flags),
                    _ => None,
                };
                if let Some(token) = token {
                    self.rest = &self.rest[m.get(0).expect("whole match").end()..];
                    return token;
                }
            }

            // Not a known label: the run up to the next ';' or end of line
            // is a literal text value. The terminating ';' is consumed.
            let end = self
                .rest
                .find(|c| c == ';' || c == '\n')
                .unwrap_or(self.rest.len());
            let value = self.rest[..end].trim_end().to_string();
            let mut consumed = end;
            if self.rest[consumed..].starts_with(';') {
                consumed += 1;
            }
            self.rest = &self.rest[consumed..];
            if !value.is_empty() {
                return Token::Text(value);
            }
            if consumed == 0 {
                return Token::End;
            }
        }
    }
}

/// One name declaration: an optional full name, short forms, EC numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    pub full: Option<String>,
    pub short: Vec<String>,
    pub ec: Vec<String>,
}

impl Name {
    pub fn is_empty(&self) -> bool {
        self.full.is_none() && self.short.is_empty() && self.ec.is_empty()
    }

    /// Display form: full name with short forms in parentheses, or the
    /// short forms alone, with EC numbers appended after a comma.
    pub fn render(&self) -> String {
        let mut result = match &self.full {
            Some(full) if !self.short.is_empty() => {
                format!("{} ({})", full, self.short.join("; "))
            }
            Some(full) => full.clone(),
            None => self.short.join("; "),
        };
        if !self.ec.is_empty() {
            if result.is_empty() {
                result = self.ec.join("; ");
            } else {
                result.push_str(", ");
                result.push_str(&self.ec.join("; "));
            }
        }
        result
    }
}

/// Alternate-name entry under an `AltName:` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltEntry {
    Allergen(String),
    Biotech(String),
    CdAntigen(String),
    Inn(String),
    Name(Name),
}

impl AltEntry {
    pub fn render(&self) -> String {
        match self {
            AltEntry::Allergen(v) => format!("allergen: {}", v),
            AltEntry::Biotech(v) => format!("biotech: {}", v),
            AltEntry::CdAntigen(v) => format!("cd antigen: {}", v),
            AltEntry::Inn(v) => format!("INN: {}", v),
            AltEntry::Name(name) => name.render(),
        }
    }
}

/// A name plus its alternate names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameBlock {
    pub name: Name,
    pub alt: Vec<AltEntry>,
}

/// The parsed DE field: primary name, submitted names, included and
/// contained components, and flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTree {
    pub name: Option<NameBlock>,
    pub sub: Vec<NameBlock>,
    pub includes: Vec<NameBlock>,
    pub contains: Vec<NameBlock>,
    pub flags: Vec<String>,
}

/// Parse a DE field (tag prefixes already stripped) into a [`NameTree`].
pub fn parse(text: &str) -> Result<NameTree> {
    let mut lexer = Lexer::new(text);
    let lookahead = lexer.next_token();
    Parser { lexer, lookahead }.parse()
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Token,
}

impl<'a> Parser<'a> {
    fn parse(mut self) -> Result<NameTree> {
        let mut tree = NameTree::default();

        if self.lookahead == Token::RecName {
            self.advance();
            tree.name = Some(self.name_block()?);
        }

        loop {
            match &self.lookahead {
                Token::Includes => {
                    self.advance();
                    tree.includes.push(self.name_block()?);
                }
                Token::Contains => {
                    self.advance();
                    tree.contains.push(self.name_block()?);
                }
                Token::SubName => {
                    self.advance();
                    tree.sub.push(self.name_block()?);
                }
                _ => break,
            }
        }

        while self.lookahead == Token::Flags {
            self.advance();
            tree.flags.push(self.expect_text()?);
        }

        // Trailing unrecognized tokens are left unconsumed, like trailing
        // garbage after the last field of a record.
        Ok(tree)
    }

    fn name_block(&mut self) -> Result<NameBlock> {
        // `Includes:`/`Contains:` sections repeat the RecName/SubName header.
        if self.lookahead == Token::RecName || self.lookahead == Token::SubName {
            self.advance();
        }

        let mut block = NameBlock {
            name: self.name()?,
            alt: Vec::new(),
        };

        while self.lookahead == Token::AltName {
            self.advance();
            let entry = match &self.lookahead {
                Token::Allergen => {
                    self.advance();
                    AltEntry::Allergen(self.expect_text()?)
                }
                Token::Biotech => {
                    self.advance();
                    AltEntry::Biotech(self.expect_text()?)
                }
                Token::CdAntigen => {
                    self.advance();
                    AltEntry::CdAntigen(self.expect_text()?)
                }
                Token::Inn => {
                    self.advance();
                    AltEntry::Inn(self.expect_text()?)
                }
                _ => AltEntry::Name(self.name()?),
            };
            block.alt.push(entry);
        }

        Ok(block)
    }

    fn name(&mut self) -> Result<Name> {
        let mut name = Name::default();
        loop {
            match &self.lookahead {
                Token::Full => {
                    self.advance();
                    name.full = Some(self.expect_text()?);
                }
                Token::Short => {
                    self.advance();
                    name.short.push(self.expect_text()?);
                }
                Token::Ec => {
                    self.advance();
                    name.ec.push(self.expect_text()?);
                }
                _ => break,
            }
        }
        Ok(name)
    }

    fn advance(&mut self) {
        self.lookahead = self.lexer.next_token();
    }

    fn expect_text(&mut self) -> Result<String> {
        match std::mem::replace(&mut self.lookahead, Token::End) {
            Token::Text(value) => {
                self.advance();
                Ok(value)
            }
            other => bail!(
                "parse error in DE record: expected a value, found {}",
                other.label()
            ),
        }
    }
}
