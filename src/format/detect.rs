//! Input format detection.
//!
//! Inputs are streams (possibly standard input), so detection works on a
//! peeked prefix instead of seeking. Detection happens in two layers: the
//! compression filter from the first bytes of the raw input, then the
//! container from the first block of the decompressed stream.

use super::TAR_BLOCK_SIZE;

/// Compression filter wrapped around an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionFilter {
    /// Uncompressed.
    None,
    /// gzip compressed stream.
    Gzip,
    /// bzip2 compressed stream.
    Bzip2,
    /// Zstandard compressed stream.
    Zstd,
    /// Legacy LZMA ("lzma alone") stream.
    Lzma,
    /// XZ compressed stream.
    Xz,
    /// LZ4 frame stream.
    Lz4,
    /// Unix `compress` (.Z) stream.
    Compress,
}

impl CompressionFilter {
    /// Returns a human-readable name for this filter.
    pub fn name(&self) -> &'static str {
        match self {
            CompressionFilter::None => "none",
            CompressionFilter::Gzip => "gzip",
            CompressionFilter::Bzip2 => "bzip2",
            CompressionFilter::Zstd => "zstd",
            CompressionFilter::Lzma => "lzma",
            CompressionFilter::Xz => "xz",
            CompressionFilter::Lz4 => "lz4",
            CompressionFilter::Compress => "compress",
        }
    }

    /// Returns whether this build can decode the filter.
    pub fn is_supported(&self) -> bool {
        match self {
            CompressionFilter::None => true,
            CompressionFilter::Gzip => cfg!(feature = "deflate"),
            CompressionFilter::Bzip2 => cfg!(feature = "bzip2"),
            CompressionFilter::Zstd => cfg!(feature = "zstd"),
            CompressionFilter::Lzma => cfg!(feature = "lzma"),
            CompressionFilter::Xz | CompressionFilter::Lz4 | CompressionFilter::Compress => false,
        }
    }
}

impl std::fmt::Display for CompressionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Number of leading bytes needed to recognize every filter.
pub const FILTER_PROBE_LEN: usize = 13;

/// Known compression filter signatures.
const FILTER_SIGNATURES: &[(&[u8], CompressionFilter)] = &[
    // gzip: 0x1F 0x8B
    (&[0x1F, 0x8B], CompressionFilter::Gzip),
    // bzip2: 'B' 'Z' 'h'
    (&[0x42, 0x5A, 0x68], CompressionFilter::Bzip2),
    // Zstd: 0x28 0xB5 0x2F 0xFD
    (&[0x28, 0xB5, 0x2F, 0xFD], CompressionFilter::Zstd),
    // XZ: 0xFD '7' 'z' 'X' 'Z' 0x00
    (&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00], CompressionFilter::Xz),
    // LZ4: 0x04 0x22 0x4D 0x18 (frame format)
    (&[0x04, 0x22, 0x4D, 0x18], CompressionFilter::Lz4),
    // compress: 0x1F 0x9D
    (&[0x1F, 0x9D], CompressionFilter::Compress),
];

/// Detects the compression filter from the first bytes of an input.
///
/// Inputs shorter than a signature, and inputs that match nothing, are
/// reported as [`CompressionFilter::None`]; the container probe decides
/// whether they are usable.
pub fn detect_filter(head: &[u8]) -> CompressionFilter {
    for (signature, filter) in FILTER_SIGNATURES {
        if head.starts_with(signature) {
            return *filter;
        }
    }
    if looks_like_lzma_alone(head) {
        return CompressionFilter::Lzma;
    }
    CompressionFilter::None
}

/// Heuristic for the magic-less legacy LZMA header.
///
/// The header is a properties byte, a little-endian dictionary size and a
/// little-endian uncompressed size (all ones when unknown).
fn looks_like_lzma_alone(head: &[u8]) -> bool {
    if head.len() < FILTER_PROBE_LEN {
        return false;
    }
    // lc=3 lp=0 pb=2 is what every common encoder writes
    if head[0] != 0x5D {
        return false;
    }
    let dict_size = u32::from_le_bytes([head[1], head[2], head[3], head[4]]);
    if dict_size < 4096 {
        return false;
    }
    let dict_ok = dict_size.is_power_of_two() || (dict_size / 3 * 2).is_power_of_two();
    let mut size_bytes = [0u8; 8];
    size_bytes.copy_from_slice(&head[5..13]);
    let size = u64::from_le_bytes(size_bytes);
    dict_ok && (size == u64::MAX || size < (1 << 48))
}

/// Outcome of probing the first block of a decompressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerProbe {
    /// No data at all, or an end-of-archive block: an archive with no entries.
    Empty,
    /// A tar header with a valid checksum.
    Tar,
    /// A recognized archive format this crate does not read.
    Foreign(&'static str),
    /// Data that is not a tar header.
    Unrecognized,
    /// Fewer bytes than one tar block.
    Truncated,
}

/// Known non-tar container signatures.
const CONTAINER_SIGNATURES: &[(&[u8], &str)] = &[
    (&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C], "7-Zip"),
    (&[0x50, 0x4B, 0x03, 0x04], "ZIP"),
    (&[0x50, 0x4B, 0x05, 0x06], "ZIP"),
    (&[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07], "RAR"),
    (b"070707", "cpio"),
    (b"070701", "cpio"),
    (b"070702", "cpio"),
    (b"!<arch>\n", "ar"),
];

/// Classifies the first block of a decompressed stream.
pub fn probe_container(block: &[u8]) -> ContainerProbe {
    if block.is_empty() {
        return ContainerProbe::Empty;
    }
    for (signature, name) in CONTAINER_SIGNATURES {
        if block.starts_with(signature) {
            return ContainerProbe::Foreign(name);
        }
    }
    if block.len() < TAR_BLOCK_SIZE {
        return ContainerProbe::Truncated;
    }
    let block = &block[..TAR_BLOCK_SIZE];
    if block.iter().all(|&b| b == 0) {
        return ContainerProbe::Empty;
    }
    if tar_checksum_matches(block) {
        ContainerProbe::Tar
    } else {
        ContainerProbe::Unrecognized
    }
}

/// Verifies the checksum field of a 512-byte tar header.
pub fn tar_checksum_matches(block: &[u8]) -> bool {
    if block.len() < TAR_BLOCK_SIZE {
        return false;
    }
    let header = tar::Header::from_byte_slice(&block[..TAR_BLOCK_SIZE]);
    let Ok(stored) = header.cksum() else {
        return false;
    };
    // The checksum field itself counts as eight spaces.
    let computed: u32 = block[..148]
        .iter()
        .chain(&[b' '; 8])
        .chain(&block[156..TAR_BLOCK_SIZE])
        .map(|&b| u32::from(b))
        .sum();
    stored == computed
}

/// Chooses an output filter from a file name extension.
///
/// Used to mirror the compression of the file standard output points to.
pub fn filter_from_file_name(name: &str) -> CompressionFilter {
    let name = name.to_lowercase();
    let suffixes: &[(&str, CompressionFilter)] = &[
        (".tar.gz", CompressionFilter::Gzip),
        (".tgz", CompressionFilter::Gzip),
        (".tar.bz2", CompressionFilter::Bzip2),
        (".tbz2", CompressionFilter::Bzip2),
        (".tbz", CompressionFilter::Bzip2),
        (".tar.zst", CompressionFilter::Zstd),
        (".tzst", CompressionFilter::Zstd),
    ];
    suffixes
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(_, filter)| *filter)
        .unwrap_or(CompressionFilter::None)
}
