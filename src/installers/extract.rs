//! Zip extraction into the install workspace

use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::Logger;

use super::common::InstallError;

/// Subdirectory of the workspace the archive is unpacked into.
pub const EXTRACT_DIR: &str = "extracted";

/// Unpack `archive` into a fresh `extracted/` directory under `work_dir`.
///
/// Either the whole archive is extracted or the directory is removed again.
/// Entries whose names would land outside the directory are rejected by the
/// zip reader and fail the extraction.
pub fn extract_archive(
    archive: &Path,
    work_dir: &Path,
    logger: &Logger,
) -> Result<PathBuf, InstallError> {
    let out = work_dir.join(EXTRACT_DIR);
    logger.install(&format!("Extracting {}", archive.display()));

    if out.exists() {
        fs::remove_dir_all(&out)
            .map_err(InstallError::io(format!("Failed to clear {}", out.display())))?;
    }
    fs::create_dir_all(&out)
        .map_err(InstallError::io(format!("Failed to create {}", out.display())))?;

    let file = fs::File::open(archive)
        .map_err(InstallError::io(format!("Failed to open {}", archive.display())))?;

    let result = zip::ZipArchive::new(file).and_then(|mut zip| {
        let entries = zip.len();
        zip.extract(&out).map(|_| entries)
    });

    match result {
        Ok(entries) => {
            logger.install(&format!("Extracted {} entries", entries));
            Ok(out)
        }
        Err(e) => {
            logger.error(&format!("Failed to extract archive: {}", e));
            let _ = fs::remove_dir_all(&out);
            Err(InstallError::CorruptArchive {
                path: archive.to_path_buf(),
                reason: e.to_string(),
            })
        }
    }
}
