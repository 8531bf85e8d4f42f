//! A minimal parser and writer for Java `.properties` files.
//!
//! Covers the subset the region configuration tables use: `#`/`!` comments,
//! `=`/`:`/whitespace key separators, backslash line continuations, and the
//! standard escape sequences.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyEntry {
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertiesFile {
    pub entries: Vec<PropertyEntry>,
}

impl PropertiesFile {
    /// First value recorded under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}

/// Parse a `.properties` file into key/value entries, in file order.
/// Repeated keys are kept; callers decide how to merge them.
#[must_use]
pub fn parse(text: &str) -> PropertiesFile {
    let bytes = text.as_bytes();
    let mut offset = 0usize;
    let mut entries = Vec::new();

    while offset < bytes.len() {
        let line_start = offset;
        let logical = read_logical_line(bytes, &mut offset);
        if let Some((key, value)) = parse_logical_line(&logical) {
            entries.push(PropertyEntry { key, value });
        }

        // Ensure we always make progress even on pathological inputs.
        if offset == line_start {
            offset += 1;
        }
    }

    PropertiesFile { entries }
}

/// Render entries back into properties syntax, escaping separators and
/// whitespace so that `parse` round-trips the result.
#[must_use]
pub fn write_properties(entries: &[PropertyEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        escape_into(&mut out, &entry.key, true);
        out.push('=');
        escape_into(&mut out, &entry.value, false);
        out.push('\n');
    }
    out
}

fn escape_into(out: &mut String, text: &str, is_key: bool) {
    use std::fmt::Write as _;

    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0C' => out.push_str("\\f"),
            '=' | ':' | ' ' if is_key => {
                out.push('\\');
                out.push(ch);
            }
            '#' | '!' if is_key && (out.ends_with('\n') || out.is_empty()) => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => {
                // Everything outside printable ASCII goes out as `\uXXXX`,
                // one escape per UTF-16 code unit, the way Java stores it.
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
        }
    }
}

fn read_logical_line(bytes: &[u8], offset: &mut usize) -> Vec<u8> {
    let mut out = Vec::new();

    loop {
        let segment_start = *offset;
        let mut line_end = segment_start;
        while line_end < bytes.len() && bytes[line_end] != b'\n' {
            line_end += 1;
        }

        let mut content_end = line_end;
        if content_end > segment_start && bytes[content_end - 1] == b'\r' {
            content_end -= 1;
        }

        // Does the physical line end with an unescaped `\`?
        let continues = ends_with_unescaped_backslash(&bytes[segment_start..content_end]);
        let copy_end = if continues {
            // Skip the final backslash.
            content_end.saturating_sub(1)
        } else {
            content_end
        };
        out.extend_from_slice(&bytes[segment_start..copy_end]);

        // Consume the newline if present.
        *offset = if line_end < bytes.len() {
            line_end + 1
        } else {
            line_end
        };

        if !continues {
            break;
        }

        // Continuation: skip leading whitespace on the next physical line.
        while *offset < bytes.len() && is_whitespace(bytes[*offset]) {
            *offset += 1;
        }
    }

    out
}

fn ends_with_unescaped_backslash(line: &[u8]) -> bool {
    let mut i = line.len();
    let mut backslashes = 0usize;
    while i > 0 && line[i - 1] == b'\\' {
        backslashes += 1;
        i -= 1;
    }
    backslashes % 2 == 1
}

fn parse_logical_line(line: &[u8]) -> Option<(String, String)> {
    let mut i = 0usize;
    while i < line.len() && is_whitespace(line[i]) {
        i += 1;
    }

    if i >= line.len() {
        return None;
    }

    if line[i] == b'#' || line[i] == b'!' {
        return None;
    }

    let key_start = i;
    while i < line.len() {
        match line[i] {
            b'\\' => {
                // Escaped character.
                i += 2;
            }
            b'=' | b':' => break,
            b if is_whitespace(b) => break,
            _ => i += 1,
        }
    }
    // An escape may have stepped past the end.
    i = i.min(line.len());
    let key_end = i;

    // Skip whitespace between key and separator.
    while i < line.len() && is_whitespace(line[i]) {
        i += 1;
    }

    // Optional `:` / `=`.
    if i < line.len() && (line[i] == b'=' || line[i] == b':') {
        i += 1;
    }

    // Skip whitespace after separator.
    while i < line.len() && is_whitespace(line[i]) {
        i += 1;
    }

    let key = unescape(&line[key_start..key_end]);
    let value = unescape(&line[i..]);
    Some((key, value))
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\x0C')
}

fn unescape(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' {
            out.push(b as char);
            i += 1;
            continue;
        }

        i += 1;
        if i >= bytes.len() {
            out.push('\\');
            break;
        }

        match bytes[i] {
            b't' => out.push('\t'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b'f' => out.push('\x0C'),
            b'\\' => out.push('\\'),
            b'u' => {
                if i + 4 < bytes.len() {
                    let mut value = read_hex4(bytes, i + 1);
                    i += 4;
                    // A high surrogate pairs with an immediately following
                    // `\uXXXX` low surrogate to form one scalar value.
                    if (0xD800..=0xDBFF).contains(&value)
                        && i + 6 < bytes.len()
                        && bytes[i + 1] == b'\\'
                        && bytes[i + 2] == b'u'
                    {
                        let low = read_hex4(bytes, i + 3);
                        if (0xDC00..=0xDFFF).contains(&low) {
                            value = 0x10000 + ((value - 0xD800) << 10) + (low - 0xDC00);
                            i += 6;
                        }
                    }
                    if let Some(ch) = char::from_u32(value) {
                        out.push(ch);
                    }
                } else {
                    out.push('u');
                }
            }
            other => out.push(other as char),
        }
        i += 1;
    }

    out
}

fn read_hex4(bytes: &[u8], start: usize) -> u32 {
    let mut value = 0u32;
    for j in 0..4 {
        value <<= 4;
        value |= from_hex(bytes[start + j]) as u32;
    }
    value
}

fn from_hex(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => 10 + (b - b'a'),
        b'A'..=b'F' => 10 + (b - b'A'),
        _ => 0,
    }
}
