//! Backup archive extraction and directory replacement.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

use super::error::PublishResult;

/// Extract every entry of `zip_path` into `dest`.
///
/// Entries whose names would escape `dest` are skipped. Returns the number
/// of files written.
pub fn extract_zip(zip_path: &Path, dest: &Path) -> PublishResult<usize> {
    let file = fs::File::open(zip_path)?;
    let mut archive = ZipArchive::new(io::BufReader::new(file))?;
    fs::create_dir_all(dest)?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                warn!(name = entry.name(), "Skipping archive entry outside the target directory");
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;
            written += 1;
        }
    }

    debug!(files = written, dest = %dest.display(), "Archive extracted");
    Ok(written)
}

/// Replace `dest` with a recursive copy of `src`.
///
/// Anything previously under `dest` is removed first, so files dropped from
/// the new backup do not linger.
pub fn replace_dir(src: &Path, dest: &Path) -> io::Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    copy_dir_all(src, dest)
}

fn copy_dir_all(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}
