use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use sha2::{Digest, Sha256};

use crate::error::{HashError, HashResult};

/// Computes the lowercase hex SHA-256 digest of an in-memory buffer.
///
/// # Example
///
/// ```
/// use galaxy_utils::hash::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Streams a reader through SHA-256, returning the hex digest and the number of bytes read.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<(String, u64)> {
    let mut hasher = Sha256::new();
    let total = io::copy(&mut reader, &mut hasher)?;
    Ok((format!("{:x}", hasher.finalize()), total))
}

/// Calculates the checksum and size of a file.
///
/// The file is read back from disk in full, so the result always reflects what was
/// actually persisted rather than what was intended to be written.
///
/// # Errors
///
/// * [`HashError::ReadFailed`] if the file cannot be opened or read.
///
/// # Example
///
/// ```no_run
/// use galaxy_utils::error::HashResult;
/// use galaxy_utils::hash::calculate_checksum;
///
/// fn main() -> HashResult<()> {
///     let (checksum, size) = calculate_checksum("/path/to/file")?;
///     println!("{checksum} ({size} bytes)");
///     Ok(())
/// }
/// ```
pub fn calculate_checksum<P: AsRef<Path>>(file_path: P) -> HashResult<(String, u64)> {
    let file_path = file_path.as_ref();
    let read_failed = |err| {
        HashError::ReadFailed {
            path: file_path.to_path_buf(),
            source: err,
        }
    };

    let file = File::open(file_path).map_err(read_failed)?;
    sha256_reader(file).map_err(read_failed)
}
