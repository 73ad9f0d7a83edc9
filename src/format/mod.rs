//! Tar format constants and input format detection.
//!
//! The output container is POSIX tar: ustar headers, preceded by a pax
//! extended header when a field does not fit.

pub mod detect;
pub mod pax;

pub use detect::{CompressionFilter, ContainerProbe, detect_filter, probe_container};

/// Size of a tar block; headers and data are padded to this boundary.
pub const TAR_BLOCK_SIZE: usize = 512;

/// Width of the ustar `name` and `linkname` fields.
pub const USTAR_NAME_LEN: usize = 100;

/// Width of the ustar `uname` and `gname` fields.
pub const USTAR_OWNER_NAME_LEN: usize = 32;

/// Number of zero blocks marking the end of an archive.
pub const END_OF_ARCHIVE_BLOCKS: usize = 2;

/// Returns the number of padding bytes needed after `len` bytes of data.
pub fn padding_for(len: u64) -> usize {
    let rem = (len % TAR_BLOCK_SIZE as u64) as usize;
    if rem == 0 { 0 } else { TAR_BLOCK_SIZE - rem }
}
