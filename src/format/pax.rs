//! Pax extended header records.
//!
//! A record is `"<len> <key>=<value>\n"` where `<len>` counts the whole
//! record, its own digits included.

/// Keys that the sink derives from the entry itself and never forwards.
pub const DERIVED_KEYS: &[&str] = &["path", "linkpath", "size", SPARSE_NAME];

/// Pathname record.
pub const PATH: &str = "path";
/// Link target record.
pub const LINKPATH: &str = "linkpath";
/// Real pathname of a GNU sparse file (formats 0.1 and 1.0).
///
/// The ustar name of such an entry is a `GNUSparseFile.N` placeholder.
pub const SPARSE_NAME: &str = "GNU.sparse.name";

/// One pax record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaxRecord {
    /// The record key.
    pub key: String,
    /// The raw record value.
    pub value: Vec<u8>,
}

impl PaxRecord {
    /// Creates a record.
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Appends the encoded record to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        // ' ' + '=' + '\n'
        let body = self.key.len() + self.value.len() + 3;
        let mut len = body + 1;
        loop {
            let total = body + decimal_digits(len);
            if total == len {
                break;
            }
            len = total;
        }
        out.extend_from_slice(len.to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.key.as_bytes());
        out.push(b'=');
        out.extend_from_slice(&self.value);
        out.push(b'\n');
    }
}

fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Encodes a list of records into the body of an extended header.
pub fn encode_records(records: &[PaxRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        record.encode_into(&mut out);
    }
    out
}
