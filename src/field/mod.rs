/// Length of the tag prefix on a flat-file line, e.g. `"ID   "`.
pub const TAG_PREFIX_LEN: usize = "ID   ".len();

/// A maximal run of consecutive lines sharing the same two-letter tag.
///
/// The lines are stored complete, tag prefix included, because several
/// decoders (UniProt DT, EMBL AH/AS) slice fixed columns out of the full
/// line. Use [`Field::content_lines`] for the tag-stripped view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    tag: String,
    lines: Vec<String>,
}

impl Field {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The complete lines of this field, tag prefix included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The full field text, one trailing newline per line.
    pub fn text(&self) -> String {
        let mut s = String::new();
        for line in &self.lines {
            s.push_str(line);
            s.push('\n');
        }
        s
    }

    /// The lines of this field with the `XX   ` prefix removed.
    ///
    /// A continuation line that carries the tag but not the full
    /// three-space padding is passed through untouched.
    pub fn content_lines(&self) -> impl Iterator<Item = &str> {
        let prefix = format!("{}   ", self.tag);
        self.lines.iter().map(move |line| {
            line.strip_prefix(prefix.as_str()).unwrap_or(line.as_str())
        })
    }

    /// The tag-stripped content as a single newline-joined string.
    pub fn content(&self) -> String {
        let mut s = String::new();
        for line in self.content_lines() {
            s.push_str(line);
            s.push('\n');
        }
        s
    }

    /// The tag-stripped lines concatenated without any separator.
    ///
    /// This is how the reference tags (RP/RX/RA/RT/RL/...) accumulate.
    pub fn content_concat(&self) -> String {
        self.content_lines().collect()
    }
}

/// Iterator splitting one record's text into [`Field`]s in file order.
///
/// A field starts on a line with two uppercase letters followed by three
/// spaces and at least one content character; it extends over consecutive
/// lines that repeat the same two letters. Anything else (sequence body
/// lines, `XX` spacers, trailing garbage) is skipped, never an error.
pub struct FieldScanner<'a> {
    lines: std::iter::Peekable<std::str::Lines<'a>>,
}

impl<'a> FieldScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().peekable(),
        }
    }
}

/// Check for the `XX   content` shape that opens a field.
fn tag_of(line: &str) -> Option<&str> {
    let bytes = line.as_bytes();
    if bytes.len() <= TAG_PREFIX_LEN {
        return None;
    }
    if bytes[0].is_ascii_uppercase()
        && bytes[1].is_ascii_uppercase()
        && &bytes[2..TAG_PREFIX_LEN] == b"   "
    {
        Some(&line[..2])
    } else {
        None
    }
}

/// A continuation only needs the same two letters plus some content.
fn continues(line: &str, tag: &str) -> bool {
    line.len() > 2 && line.starts_with(tag)
}

impl<'a> Iterator for FieldScanner<'a> {
    type Item = Field;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = *self.lines.peek()?;
            let Some(tag) = tag_of(line) else {
                self.lines.next();
                continue;
            };

            let tag = tag.to_string();
            let mut lines = vec![self.lines.next().expect("peeked line").to_string()];
            while let Some(next) = self.lines.peek() {
                if !continues(next, &tag) {
                    break;
                }
                lines.push(self.lines.next().expect("peeked line").to_string());
            }
            return Some(Field { tag, lines });
        }
    }
}
