//! JSON renderings of the record map.
//!
//! | mode      | shape                                                  |
//! |-----------|--------------------------------------------------------|
//! | `Compact` | one line, no whitespace                                |
//! | `Indent`  | fully pretty-printed with a caller-chosen indent/prefix |
//! | `Hybrid`  | one record per line, each record compact               |
//!
//! Records are held in a `BTreeMap`, so every mode emits keys in sorted
//! order and unchanged data always renders to identical bytes.  `Hybrid`
//! keeps diffs to one line per changed record:
//!
//! ```text
//! {
//!   "a": {"n":1},
//!   "b": {"n":2}
//! }
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// How the record map is rendered when saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Marshaling {
    Compact,
    /// Every line after the first starts with `prefix`; each nesting level
    /// adds one `indent`.
    Indent { prefix: String, indent: String },
    #[default]
    Hybrid,
}

impl Marshaling {
    pub fn indent(prefix: impl Into<String>, indent: impl Into<String>) -> Self {
        Marshaling::Indent {
            prefix: prefix.into(),
            indent: indent.into(),
        }
    }
}

/// Renders `records` in `mode`.
pub fn marshal<T: Serialize>(
    records: &BTreeMap<String, T>,
    mode: &Marshaling,
) -> Result<Vec<u8>, serde_json::Error> {
    match mode {
        Marshaling::Compact => serde_json::to_vec(records),
        Marshaling::Indent { prefix, indent } => indented(records, prefix, indent),
        Marshaling::Hybrid => hybrid(records),
    }
}

fn indented<T: Serialize>(
    records: &BTreeMap<String, T>,
    prefix: &str,
    indent: &str,
) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    records.serialize(&mut serializer)?;
    if prefix.is_empty() {
        return Ok(out);
    }

    // String values escape their newlines, so every raw '\n' is structural.
    let mut prefixed = Vec::with_capacity(out.len());
    for byte in out {
        prefixed.push(byte);
        if byte == b'\n' {
            prefixed.extend_from_slice(prefix.as_bytes());
        }
    }
    Ok(prefixed)
}

fn hybrid<T: Serialize>(records: &BTreeMap<String, T>) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = b"{\n".to_vec();
    let mut entries = records.iter().peekable();
    while let Some((key, value)) = entries.next() {
        out.extend_from_slice(b"  ");
        serde_json::to_writer(&mut out, key)?;
        out.extend_from_slice(b": ");
        serde_json::to_writer(&mut out, value)?;
        if entries.peek().is_some() {
            out.push(b',');
        }
        out.push(b'\n');
    }
    out.push(b'}');
    Ok(out)
}
