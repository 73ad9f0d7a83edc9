//! Header encoding for the output archive.
//!
//! Pathnames and owner names are copied into the ustar fields as raw bytes.
//! When one does not fit, the field keeps a truncated copy and the full value
//! goes into a pax extended header written just before.

use std::io;

use crate::format::pax::{self, PaxRecord};
use crate::format::{USTAR_NAME_LEN, USTAR_OWNER_NAME_LEN};
use crate::read::Entry;

/// Name of the pax extended header pseudo-entry.
const PAX_HEADER_NAME: &[u8] = b"././@PaxHeader";

/// Mode of the pax extended header pseudo-entry.
const PAX_HEADER_MODE: u32 = 0o644;

/// Directory holding the ustar placeholder name of a pax sparse file.
const SPARSE_PLACEHOLDER_DIR: &[u8] = b"GNUSparseFile.0";

/// The encoded headers of one entry.
pub(crate) struct EncodedHeader {
    /// Extended header and its record body, if any field needed one.
    pub(crate) extended: Option<(tar::Header, Vec<u8>)>,
    /// The ustar header.
    pub(crate) header: tar::Header,
}

/// Copies `value` into a fixed-width field, truncating if needed.
///
/// Returns `false` if the value was truncated.
fn fill_field(field: &mut [u8], value: &[u8]) -> bool {
    let len = value.len().min(field.len());
    field.fill(0);
    field[..len].copy_from_slice(&value[..len]);
    value.len() <= field.len()
}

/// Builds the `DIR/GNUSparseFile.0/BASE` name GNU tar writes in the ustar
/// name field of a sparse file whose real pathname is in `GNU.sparse.name`.
fn sparse_placeholder(path: &[u8]) -> Vec<u8> {
    let (dir, base) = match path.iter().rposition(|&b| b == b'/') {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => (&b"."[..], path),
    };
    let mut name = Vec::with_capacity(dir.len() + SPARSE_PLACEHOLDER_DIR.len() + base.len() + 2);
    name.extend_from_slice(dir);
    name.push(b'/');
    name.extend_from_slice(SPARSE_PLACEHOLDER_DIR);
    name.push(b'/');
    name.extend_from_slice(base);
    name
}

/// Encodes the headers for `entry` under its current pathname.
pub(crate) fn encode_entry_header(entry: &Entry) -> io::Result<EncodedHeader> {
    let metadata = entry.metadata();
    let mut records: Vec<PaxRecord> = Vec::new();

    let mut header = tar::Header::new_ustar();
    header.set_entry_type(entry.kind().to_entry_type());
    header.set_size(entry.size());
    header.set_mode(metadata.mode());
    header.set_uid(metadata.uid());
    header.set_gid(metadata.gid());
    header.set_mtime(metadata.mtime());

    let name = if metadata.uses_sparse_placeholder() {
        records.push(PaxRecord::new(pax::SPARSE_NAME, entry.path()));
        sparse_placeholder(entry.path())
    } else {
        entry.path().to_vec()
    };

    let old = header.as_old_mut();
    if !fill_field(&mut old.name[..USTAR_NAME_LEN], &name) {
        records.push(PaxRecord::new(pax::PATH, name));
    }
    if let Some(target) = metadata.link_target() {
        if !fill_field(&mut old.linkname[..USTAR_NAME_LEN], target) {
            records.push(PaxRecord::new(pax::LINKPATH, target));
        }
    }

    if let Some(ustar) = header.as_ustar_mut() {
        if !fill_field(&mut ustar.uname[..USTAR_OWNER_NAME_LEN], metadata.user_name()) {
            records.push(PaxRecord::new("uname", metadata.user_name()));
        }
        if !fill_field(&mut ustar.gname[..USTAR_OWNER_NAME_LEN], metadata.group_name()) {
            records.push(PaxRecord::new("gname", metadata.group_name()));
        }
    }

    if let Some((major, minor)) = metadata.device() {
        header.set_device_major(major)?;
        header.set_device_minor(minor)?;
    }
    header.set_cksum();

    let forwarded: Vec<PaxRecord> = metadata
        .pax_records()
        .iter()
        .filter(|record| !records_contain(&records, &record.key))
        .cloned()
        .collect();
    records.extend(forwarded);

    let extended = if records.is_empty() {
        None
    } else {
        let body = pax::encode_records(&records);
        let mut extended = tar::Header::new_ustar();
        extended.set_entry_type(tar::EntryType::XHeader);
        extended.set_size(body.len() as u64);
        extended.set_mode(PAX_HEADER_MODE);
        extended.set_mtime(metadata.mtime());
        fill_field(&mut extended.as_old_mut().name, PAX_HEADER_NAME);
        extended.set_cksum();
        Some((extended, body))
    };

    Ok(EncodedHeader { extended, header })
}

fn records_contain(records: &[PaxRecord], key: &str) -> bool {
    records.iter().any(|record| record.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::{EntryKind, Metadata};

    #[test]
    fn test_short_path_needs_no_extended_header() {
        let entry = Entry::new("dir/file.txt", EntryKind::File, 5, Metadata::default());
        let encoded = encode_entry_header(&entry).unwrap();
        assert!(encoded.extended.is_none());
        assert_eq!(encoded.header.path_bytes().as_ref(), b"dir/file.txt");
        assert_eq!(encoded.header.size().unwrap(), 5);
        assert!(encoded.header.as_ustar().is_some());
    }

    #[test]
    fn test_exactly_one_hundred_bytes_fits() {
        let path = vec![b'a'; USTAR_NAME_LEN];
        let entry = Entry::new(path.clone(), EntryKind::File, 0, Metadata::default());
        let encoded = encode_entry_header(&entry).unwrap();
        assert!(encoded.extended.is_none());
        assert_eq!(&encoded.header.as_old().name[..], &path[..]);
    }

    #[test]
    fn test_long_path_goes_to_pax() {
        let path = vec![b'p'; USTAR_NAME_LEN + 1];
        let entry = Entry::new(path.clone(), EntryKind::File, 0, Metadata::default());
        let encoded = encode_entry_header(&entry).unwrap();
        let (extended, body) = encoded.extended.unwrap();
        assert_eq!(extended.entry_type(), tar::EntryType::XHeader);
        assert_eq!(extended.size().unwrap(), body.len() as u64);

        let mut expected = Vec::new();
        PaxRecord::new(pax::PATH, path).encode_into(&mut expected);
        assert_eq!(body, expected);
    }

    #[test]
    fn test_forwarded_records_do_not_duplicate_derived_ones() {
        let metadata = Metadata::default()
            .with_pax_record("mtime", b"1700000000.25")
            .with_pax_record("SCHILY.xattr.user.k", b"v");
        let entry = Entry::new("f", EntryKind::File, 0, metadata);
        let (_, body) = encode_entry_header(&entry).unwrap().extended.unwrap();
        let keys: Vec<String> = tar::PaxExtensions::new(&body)
            .map(|ext| ext.unwrap().key().unwrap().to_string())
            .collect();
        assert_eq!(keys, ["mtime", "SCHILY.xattr.user.k"]);
    }

    #[test]
    fn test_sparse_name_carries_the_pathname() {
        let metadata = Metadata::default()
            .with_pax_record("GNU.sparse.major", b"1")
            .with_pax_record("GNU.sparse.realsize", b"1048580")
            .with_sparse_placeholder();
        let entry = Entry::new("new/dir/disk.img", EntryKind::File, 516, metadata);
        let encoded = encode_entry_header(&entry).unwrap();
        assert_eq!(
            encoded.header.path_bytes().as_ref(),
            b"new/dir/GNUSparseFile.0/disk.img"
        );

        let (_, body) = encoded.extended.unwrap();
        let records: Vec<(String, Vec<u8>)> = tar::PaxExtensions::new(&body)
            .map(|ext| {
                let ext = ext.unwrap();
                (ext.key().unwrap().to_string(), ext.value_bytes().to_vec())
            })
            .collect();
        assert_eq!(records[0], (pax::SPARSE_NAME.to_string(), b"new/dir/disk.img".to_vec()));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_sparse_placeholder_without_directory() {
        assert_eq!(sparse_placeholder(b"sp"), b"./GNUSparseFile.0/sp");
        assert_eq!(sparse_placeholder(b"/abs"), b"/GNUSparseFile.0/abs");
    }

    #[test]
    fn test_long_owner_name() {
        let user = vec![b'u'; USTAR_OWNER_NAME_LEN + 3];
        let metadata = Metadata::default().with_owner(1000, 1000, &user, b"staff");
        let entry = Entry::new("f", EntryKind::File, 0, metadata);
        let encoded = encode_entry_header(&entry).unwrap();
        assert_eq!(
            encoded.header.groupname_bytes().unwrap_or_default(),
            b"staff"
        );
        let (_, body) = encoded.extended.unwrap();
        assert!(body.windows(6).any(|w| w == b"uname="));
    }
}
