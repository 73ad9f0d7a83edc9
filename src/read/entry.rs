//! Archive entry types.

use std::io;

use tar::EntryType;

use crate::format::pax::{self, DERIVED_KEYS, PaxRecord};

/// The type of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Hard link to an earlier entry.
    HardLink,
    /// Character device.
    CharDevice,
    /// Block device.
    BlockDevice,
    /// Named pipe.
    Fifo,
    /// Any other type flag, carried through as-is.
    Other(u8),
}

impl EntryKind {
    /// Returns the tar entry type for this kind.
    pub fn to_entry_type(self) -> EntryType {
        match self {
            EntryKind::File => EntryType::Regular,
            EntryKind::Directory => EntryType::Directory,
            EntryKind::Symlink => EntryType::Symlink,
            EntryKind::HardLink => EntryType::Link,
            EntryKind::CharDevice => EntryType::Char,
            EntryKind::BlockDevice => EntryType::Block,
            EntryKind::Fifo => EntryType::Fifo,
            EntryKind::Other(flag) => EntryType::new(flag),
        }
    }

    /// Returns `true` for device nodes, which carry major/minor numbers.
    pub fn is_device(self) -> bool {
        matches!(self, EntryKind::CharDevice | EntryKind::BlockDevice)
    }
}

impl From<EntryType> for EntryKind {
    fn from(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => EntryKind::File,
            EntryType::Directory => EntryKind::Directory,
            EntryType::Symlink => EntryKind::Symlink,
            EntryType::Link => EntryKind::HardLink,
            EntryType::Char => EntryKind::CharDevice,
            EntryType::Block => EntryKind::BlockDevice,
            EntryType::Fifo => EntryKind::Fifo,
            other => EntryKind::Other(other.as_byte()),
        }
    }
}

/// Format-specific entry metadata, carried from input to output unchanged.
///
/// The transcoder never looks inside; only the source fills it and only the
/// sink reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub(crate) mode: u32,
    pub(crate) uid: u64,
    pub(crate) gid: u64,
    pub(crate) mtime: u64,
    pub(crate) user_name: Vec<u8>,
    pub(crate) group_name: Vec<u8>,
    pub(crate) link_target: Option<Vec<u8>>,
    pub(crate) device: Option<(u32, u32)>,
    pub(crate) pax_records: Vec<PaxRecord>,
    pub(crate) sparse_placeholder: bool,
}

impl Metadata {
    /// Permission bits.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Owner user id.
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// Owner group id.
    pub fn gid(&self) -> u64 {
        self.gid
    }

    /// Modification time in seconds since the Unix epoch.
    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    /// Owner user name, empty if absent.
    pub fn user_name(&self) -> &[u8] {
        &self.user_name
    }

    /// Owner group name, empty if absent.
    pub fn group_name(&self) -> &[u8] {
        &self.group_name
    }

    /// Target of a symbolic or hard link.
    pub fn link_target(&self) -> Option<&[u8]> {
        self.link_target.as_deref()
    }

    /// Device major and minor numbers.
    pub fn device(&self) -> Option<(u32, u32)> {
        self.device
    }

    /// Pax records forwarded to the output.
    pub fn pax_records(&self) -> &[PaxRecord] {
        &self.pax_records
    }

    /// Sets the permission bits.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the owner ids and names.
    pub fn with_owner(mut self, uid: u64, gid: u64, user: &[u8], group: &[u8]) -> Self {
        self.uid = uid;
        self.gid = gid;
        self.user_name = user.to_vec();
        self.group_name = group.to_vec();
        self
    }

    /// Sets the modification time.
    pub fn with_mtime(mut self, mtime: u64) -> Self {
        self.mtime = mtime;
        self
    }

    /// Sets the link target.
    pub fn with_link_target(mut self, target: &[u8]) -> Self {
        self.link_target = Some(target.to_vec());
        self
    }

    /// Sets the device numbers.
    pub fn with_device(mut self, major: u32, minor: u32) -> Self {
        self.device = Some((major, minor));
        self
    }

    /// Adds a pax record to forward.
    pub fn with_pax_record(mut self, key: &str, value: &[u8]) -> Self {
        self.pax_records.push(PaxRecord::new(key, value));
        self
    }

    /// Marks the pathname as belonging in `GNU.sparse.name`, with a
    /// placeholder in the ustar name field.
    pub fn with_sparse_placeholder(mut self) -> Self {
        self.sparse_placeholder = true;
        self
    }

    /// Returns `true` for pax sparse files whose real pathname is carried in
    /// `GNU.sparse.name`.
    pub fn uses_sparse_placeholder(&self) -> bool {
        self.sparse_placeholder
    }
}

/// Parses a numeric header field, reading a blank field as zero.
///
/// `tar` rejects fields that hold only NULs or spaces, which several writers
/// emit for ids and times they do not know.
fn numeric_field<T: Default>(raw: &[u8], parse: impl FnOnce() -> io::Result<T>) -> io::Result<T> {
    if raw.iter().all(|&b| b == 0 || b == b' ') {
        Ok(T::default())
    } else {
        parse()
    }
}

fn device_numbers(header: &tar::Header) -> io::Result<(u32, u32)> {
    let (major, minor) = if let Some(ustar) = header.as_ustar() {
        (&ustar.dev_major, &ustar.dev_minor)
    } else if let Some(gnu) = header.as_gnu() {
        (&gnu.dev_major, &gnu.dev_minor)
    } else {
        return Ok((0, 0));
    };
    Ok((
        numeric_field(major, || Ok(header.device_major()?.unwrap_or(0)))?,
        numeric_field(minor, || Ok(header.device_minor()?.unwrap_or(0)))?,
    ))
}

/// One entry of an archive: a pathname, a declared size, a kind and the
/// metadata that travels with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    path: Vec<u8>,
    size: u64,
    kind: EntryKind,
    metadata: Metadata,
}

impl Entry {
    /// Reads the header of a tar entry.
    ///
    /// GNU sparse entries come out as regular files: `tar` expands their data
    /// to the real size, and a `GNU.sparse.name` record replaces the
    /// placeholder pathname.
    pub(crate) fn from_tar<R: io::Read>(entry: &mut tar::Entry<'_, R>) -> io::Result<Self> {
        let kind = EntryKind::from(entry.header().entry_type());
        let mut path = entry.path_bytes().into_owned();
        let link_target = entry.link_name_bytes().map(|name| name.into_owned());

        let mut pax_records = Vec::new();
        let mut sparse_placeholder = false;
        if let Some(extensions) = entry.pax_extensions()? {
            for extension in extensions {
                let extension = extension?;
                let key = extension
                    .key()
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                if key == pax::SPARSE_NAME {
                    path = extension.value_bytes().to_vec();
                    sparse_placeholder = true;
                } else if !DERIVED_KEYS.contains(&key) {
                    pax_records.push(PaxRecord::new(key, extension.value_bytes()));
                }
            }
        }

        let header = entry.header();
        let old = header.as_old();
        let device = if kind.is_device() {
            Some(device_numbers(header)?)
        } else {
            None
        };
        let metadata = Metadata {
            mode: numeric_field(&old.mode, || header.mode())?,
            uid: numeric_field(&old.uid, || header.uid())?,
            gid: numeric_field(&old.gid, || header.gid())?,
            mtime: numeric_field(&old.mtime, || header.mtime())?,
            user_name: header.username_bytes().unwrap_or_default().to_vec(),
            group_name: header.groupname_bytes().unwrap_or_default().to_vec(),
            link_target,
            device,
            pax_records,
            sparse_placeholder,
        };
        Ok(Self::new(path, kind, entry.size(), metadata))
    }

    /// Creates an entry.
    pub fn new(path: impl Into<Vec<u8>>, kind: EntryKind, size: u64, metadata: Metadata) -> Self {
        Self {
            path: path.into(),
            size,
            kind,
            metadata,
        }
    }

    /// The pathname, as raw bytes.
    pub fn path(&self) -> &[u8] {
        &self.path
    }

    /// Replaces the pathname.
    pub fn set_path(&mut self, path: Vec<u8>) {
        self.path = path;
    }

    /// The pathname, lossily decoded for display.
    pub fn display_path(&self) -> String {
        crate::error::display_path(&self.path)
    }

    /// Declared data length in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The entry type.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The carried-through metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
