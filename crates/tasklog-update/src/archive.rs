//! Binary extraction from `.tar.gz` release assets

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tar::Archive;
use tracing::debug;

/// Whether an asset name denotes a gzipped tarball
pub fn is_archive(name: &str) -> bool {
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}

/// Copy the binary out of a tarball into `dest`
///
/// `names` are tried in order; the first one present as a regular file wins.
pub fn extract_binary<W: Write>(
    archive_path: &Path,
    names: &[&str],
    dest: &mut W,
) -> io::Result<u64> {
    for name in names {
        debug!("Looking for {} in {:?}", name, archive_path);
        if let Some(written) = copy_entry(archive_path, name, dest)? {
            return Ok(written);
        }
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("binary '{}' not found in archive", names.join("' or '")),
    ))
}

fn copy_entry<W: Write>(
    archive_path: &Path,
    name: &str,
    dest: &mut W,
) -> io::Result<Option<u64>> {
    let file = File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let matches = entry.header().entry_type().is_file()
            && entry.path()?.file_name().and_then(|n| n.to_str()) == Some(name);

        if matches {
            return io::copy(&mut entry, dest).map(Some);
        }
    }

    Ok(None)
}
